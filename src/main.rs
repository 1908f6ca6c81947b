use anyhow::{anyhow, bail, Context};
use autopath::config::Settings;
use autopath::logging::{self, LogLevel, Logger};
use autopath::{CompletionList, MemoryView, PathCompleter};
use std::path::PathBuf;
use unicode_width::UnicodeWidthStr;

const USAGE: &str = "usage: autopath --file <path> [--line <n> --column <n>] [--text <buffer>] \
[--scope <scope name>] [--settings <path>] [--folder <dir>]... [--log-level <level>]";

#[derive(Debug, Default)]
struct Options {
    file: Option<PathBuf>,
    text: Option<String>,
    line: Option<usize>,
    column: Option<usize>,
    scope: Option<String>,
    settings: Option<PathBuf>,
    folders: Vec<PathBuf>,
    log_level: Option<LogLevel>,
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        println!("{}", USAGE);
        return Ok(());
    }

    let options = parse_args(&args)?;
    logging::init(Logger::new(options.log_level.unwrap_or(LogLevel::Warning)));

    let file = options
        .file
        .clone()
        .ok_or_else(|| anyhow!("--file is required\n{}", USAGE))?;
    let text = match &options.text {
        Some(text) => text.clone(),
        None => std::fs::read_to_string(&file)
            .with_context(|| format!("cannot read {}", file.display()))?,
    };

    let caret = caret_offset(&text, options.line, options.column)?;
    let scope = options
        .scope
        .clone()
        .unwrap_or_else(|| default_scope(&file));

    let mut view = MemoryView::with_caret(&text, caret)
        .with_file_name(&file)
        .with_scope(scope);
    for folder in &options.folders {
        view = view.with_folder(folder);
    }

    let settings = Settings::load_or_default(options.settings.as_deref());
    let mut completer = PathCompleter::new(settings);

    match completer.on_query_completions(&view) {
        Some(list) => print_list(&list),
        None => println!("(caret is not in a completable scope)"),
    }
    Ok(())
}

fn parse_args(args: &[String]) -> anyhow::Result<Options> {
    let mut options = Options::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        let mut value = || {
            iter.next()
                .cloned()
                .ok_or_else(|| anyhow!("{} needs a value", arg))
        };
        match arg.as_str() {
            "--file" => options.file = Some(PathBuf::from(value()?)),
            "--text" => options.text = Some(value()?),
            "--line" => options.line = Some(value()?.parse().context("--line")?),
            "--column" => options.column = Some(value()?.parse().context("--column")?),
            "--scope" => options.scope = Some(value()?),
            "--settings" => options.settings = Some(PathBuf::from(value()?)),
            "--folder" => options.folders.push(PathBuf::from(value()?)),
            "--log-level" => {
                let level = value()?;
                options.log_level = Some(level.parse().map_err(|err: String| anyhow!(err))?);
            }
            other => bail!("unknown argument: {}\n{}", other, USAGE),
        }
    }

    Ok(options)
}

/// 1始まりの行・桁を文字オフセットに変換（未指定ならテキスト末尾）
fn caret_offset(text: &str, line: Option<usize>, column: Option<usize>) -> anyhow::Result<usize> {
    let Some(line) = line else {
        return Ok(text.chars().count());
    };

    let mut offset = 0;
    for (index, content) in text.split('\n').enumerate() {
        let width = content.chars().count();
        if index + 1 == line {
            let column = column.unwrap_or(width + 1).max(1);
            return Ok(offset + (column - 1).min(width));
        }
        offset += width + 1;
    }
    bail!("line {} is past the end of the buffer", line)
}

/// 拡張子から推定するスコープ名（文字列内として扱う）
fn default_scope(file: &std::path::Path) -> String {
    let extension = file
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    let language = match extension.as_str() {
        "html" | "htm" => "text.html.basic".to_string(),
        "" => "source".to_string(),
        other => format!("source.{}", other),
    };
    format!("{} string.quoted.double", language)
}

fn print_list(list: &CompletionList) {
    if list.is_empty() {
        println!("(no completions)");
        return;
    }

    let label_width = list
        .entries
        .iter()
        .map(|entry| entry.label.width())
        .max()
        .unwrap_or(0);

    for entry in &list.entries {
        let padding = " ".repeat(label_width - entry.label.width());
        println!(
            "{} {}{}  {:<5} {}",
            entry.kind.icon(),
            entry.label,
            padding,
            entry.annotation,
            entry.details_text()
        );
    }

    if list.truncated {
        println!("(listing stopped at the time limit)");
    }
}
