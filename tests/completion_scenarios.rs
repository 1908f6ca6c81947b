//! 補完シナリオの結合テスト
//!
//! 実ディレクトリ（tempfile）に対して、補完要求から候補・寸法挿入までを通しで確認する。

use autopath::config::keys;
use autopath::context::{extract, LineContext};
use autopath::platform::{FixedDrives, Platform};
use autopath::{EditorAdapter, EntryKind, MemoryView, PathCompleter, Region, Settings};
use serde_json::json;
use std::fs;
use std::path::Path;

/// 64x32 など任意寸法の PNG ヘッダ
fn png_header(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    bytes.extend_from_slice(&13u32.to_be_bytes());
    bytes.extend_from_slice(b"IHDR");
    bytes.extend_from_slice(&width.to_be_bytes());
    bytes.extend_from_slice(&height.to_be_bytes());
    bytes.extend_from_slice(&[8, 6, 0, 0, 0, 0, 0, 0, 0]);
    bytes
}

fn js_view(text: &str, caret: usize, file: &Path) -> MemoryView {
    MemoryView::with_caret(text, caret)
        .with_scope("source.js string.quoted.double.js")
        .with_file_name(file)
}

#[test]
fn import_statement_lists_current_directory() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("components")).unwrap();
    fs::write(dir.path().join("config.json"), b"{\"debug\": true}\n").unwrap();

    let text = "import \"./comp";
    let view = js_view(text, text.len(), &dir.path().join("app.js"));

    let parsed = extract(&LineContext::capture(&view, text.len()));
    assert!(parsed.is_valid);
    assert_eq!(parsed.needle, "./comp");
    assert_eq!(parsed.prefix(), Some("import"));

    let mut completer = PathCompleter::new(Settings::new());
    let list = completer.on_query_completions(&view).unwrap();

    let components = list.find("components/").unwrap();
    assert_eq!(components.kind, EntryKind::Directory);
    assert_eq!(components.annotation, "Dir");

    let config = list.find("config.json").unwrap();
    assert_eq!(config.kind, EntryKind::File);
    assert_eq!(config.details_text(), "Size: 16 Bytes");
    assert_eq!(list.len(), 2);
}

#[test]
fn selecting_an_image_inserts_its_dimensions() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("photo.png"), png_header(64, 32)).unwrap();

    let mut view = MemoryView::with_caret("<img src=\"photo\">", 15)
        .with_scope("text.html.basic string.quoted.double.html")
        .with_file_name(dir.path().join("index.html"));
    let mut completer = PathCompleter::new(Settings::new());

    let list = completer.on_query_completions(&view).unwrap();
    let photo = list.find("photo.png").unwrap();
    assert_eq!(photo.kind, EntryKind::Image);
    assert_eq!(photo.details_text(), "Size: 33 Bytes, Height: 32, Width: 64");

    // ホストは入力中の単語を選んだ候補で置き換える
    let word = view.word(view.caret());
    view.replace(word, &photo.insertion_text);
    assert_eq!(view.caret(), 19);

    assert!(completer.insert_dimensions(&mut view));
    assert_eq!(
        view.text(),
        "<img src=\"photo.png\" width=\"64\" height=\"32\">"
    );
}

#[test]
fn existing_dimension_values_are_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("photo.png"), png_header(64, 32)).unwrap();

    let text = "<img width=\"1\" height=\"1\" src=\"photo.png\">";
    let caret = text.rfind('"').unwrap();
    let mut view = MemoryView::with_caret(text, caret)
        .with_scope("text.html.basic string.quoted.double.html")
        .with_file_name(dir.path().join("index.html"));
    let mut completer = PathCompleter::new(Settings::new());

    assert!(completer.on_query_completions(&view).is_some());
    assert!(completer.insert_dimensions(&mut view));
    assert_eq!(
        view.text(),
        "<img width=\"64\" height=\"32\" src=\"photo.png\">"
    );
}

#[test]
fn unc_prefix_on_windows_lists_logical_drives() {
    let text = "src=\"\\\\\"";
    let view = MemoryView::with_caret(text, 7)
        .with_scope("text.html.basic string.quoted.double.html")
        .with_file_name("C:\\site\\index.html");
    let mut completer = PathCompleter::new(Settings::new())
        .with_platform(Platform::Windows)
        .with_drives(FixedDrives::from_bitmask((1 << 2) | (1 << 3)));

    let list = completer.on_query_completions(&view).unwrap();
    assert!(list.drives);
    assert_eq!(list.directory, None);

    let labels: Vec<&str> = list.entries.iter().map(|entry| entry.label.as_str()).collect();
    assert_eq!(labels, vec!["C:\\", "D:\\"]);
    assert!(list.entries.iter().all(|entry| entry.kind == EntryKind::Drive));
}

#[test]
fn alias_rewrites_to_project_directory() {
    let root = tempfile::tempdir().unwrap();
    fs::create_dir_all(root.path().join("src/utils")).unwrap();
    fs::create_dir_all(root.path().join("src/pages")).unwrap();
    fs::write(root.path().join("src/utils/helper.js"), b"").unwrap();

    let mut settings = Settings::new();
    settings.set(
        keys::SCOPES,
        json!([{ "scope": "source\\.js", "aliases": [["^@app/", "<project_root>/src/"]] }]),
    );

    let text = "import x from \"@app/utils/he\"";
    let caret = text.len() - 1;
    let view = js_view(text, caret, &root.path().join("src/pages/home.js"))
        .with_folder(root.path());
    let mut completer = PathCompleter::new(settings);

    let list = completer.on_query_completions(&view).unwrap();
    assert!(list.find("helper.js").is_some());
    assert_eq!(
        list.directory.as_deref(),
        Some(root.path().join("src/utils/").as_path())
    );
}

#[test]
fn zero_budget_still_returns_one_entry() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["a.js", "b.js", "c.js"] {
        fs::write(dir.path().join(name), b"").unwrap();
    }

    let text = "require(\"./\")";
    let view = js_view(text, 11, &dir.path().join("main.js"))
        .with_setting(keys::MAXIMUM_WAIT_TIME, json!(0.0));
    let mut completer = PathCompleter::new(Settings::new());

    let list = completer.on_query_completions(&view).unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list.entries[0].label, "a.js");
    assert!(list.truncated);
}

#[test]
fn insertion_text_completes_the_string_literal() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("widgets")).unwrap();
    fs::write(dir.path().join("button.js"), b"").unwrap();
    fs::write(dir.path().join("theme.css"), b"").unwrap();

    let mut settings = Settings::new();
    settings.set(
        keys::SCOPES,
        json!([{ "scope": "source\\.js", "replace_on_insert": [["\\.js$", ""]] }]),
    );

    let text = "require(\"./\")";
    let view = js_view(text, 11, &dir.path().join("main.js"));
    let mut completer = PathCompleter::new(settings);
    let list = completer.on_query_completions(&view).unwrap();
    assert_eq!(list.len(), 3);

    let before_needle = view.substr(Region::new(0, 11));
    for entry in &list.entries {
        let literal = format!("{}{}\")", before_needle, entry.insertion_text);
        let inner = &literal["require(\"".len()..literal.len() - 2];
        assert!(!inner.contains(&['"', '\n'][..]), "{:?}", literal);

        let target = dir.path().join(inner.trim_end_matches('/'));
        let exists = target.exists() || target.with_extension("js").exists();
        assert!(exists, "{} does not resolve", inner);
    }

    assert_eq!(list.find("button.js").unwrap().insertion_text, "button");
    assert_eq!(list.find("theme.css").unwrap().insertion_text, "theme.css");
}

#[test]
fn unreadable_directory_yields_no_entries() {
    let dir = tempfile::tempdir().unwrap();
    let text = "require(\"./missing/\")";
    let caret = text.len() - 2;
    let view = js_view(text, caret, &dir.path().join("main.js"));
    let mut completer = PathCompleter::new(Settings::new());

    let list = completer.on_query_completions(&view).unwrap();
    assert!(list.is_empty());
    assert!(!list.truncated);
}
