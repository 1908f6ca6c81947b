//! エイリアス置換
//!
//! スコープ設定の `aliases` に従って入力パスを書き換える。
//! 置換先の `<project_root>` は最初に開いているプロジェクトフォルダに置き換わる。

use crate::error::PatternError;
use regex::Regex;
use std::path::Path;

/// 置換先テンプレート内のプロジェクトルート
pub const PROJECT_ROOT_PLACEHOLDER: &str = "<project_root>";

/// (パターン, 置換先) の組
pub type RewriteRule = (String, String);

fn compile_rule(pattern: &str) -> Result<Regex, PatternError> {
    Regex::new(pattern).map_err(|err| PatternError::from_regex(pattern, &err))
}

/// 設定ファイルの置換テンプレートを regex crate の記法に揃える
///
/// `\1` 形式の後方参照は `${1}` に変換し、それ以外の `\` はそのまま残す
/// （Windows パスをテンプレートに書けるように）。
pub fn normalize_template(template: &str) -> String {
    let mut chars = template.chars().peekable();
    let mut output = String::with_capacity(template.len());

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            output.push(ch);
            continue;
        }

        let mut digits = String::new();
        while let Some(&digit) = chars.peek() {
            if digit.is_ascii_digit() {
                digits.push(digit);
                chars.next();
            } else {
                break;
            }
        }

        if digits.is_empty() {
            output.push('\\');
        } else {
            output.push_str("${");
            output.push_str(&digits);
            output.push('}');
        }
    }

    output
}

fn substitute_project_root(template: &str, project_root: Option<&Path>) -> Option<String> {
    if !template.contains(PROJECT_ROOT_PLACEHOLDER) {
        return Some(template.to_string());
    }
    let root = project_root?.to_string_lossy().replace('$', "$$");
    Some(template.replace(PROJECT_ROOT_PLACEHOLDER, &root))
}

/// パターンが先頭で一致するか
fn matches_at_start(regex: &Regex, text: &str) -> bool {
    regex.find(text).map_or(false, |m| m.start() == 0)
}

/// エイリアスを順に適用する
///
/// 各ルールは直前のルールの結果に対して適用される。
/// 入力から変化がなければ `None`（呼び出し側は通常の解決にフォールバックする）。
pub fn resolve_alias(
    entered_path: &str,
    rules: &[RewriteRule],
    project_root: Option<&Path>,
) -> Option<String> {
    let mut result = entered_path.to_string();

    for (pattern, target) in rules {
        let regex = match compile_rule(pattern) {
            Ok(regex) => regex,
            Err(err) => {
                log::warn!("skipping alias rule: {}", err);
                continue;
            }
        };

        if !matches_at_start(&regex, &result) {
            continue;
        }

        let template = normalize_template(target);
        let Some(template) = substitute_project_root(&template, project_root) else {
            log::debug!("alias {:?} needs a project folder; none is open", pattern);
            continue;
        };

        result = regex.replace_all(&result, template.as_str()).into_owned();
    }

    (result != entered_path).then_some(result)
}

/// 挿入テキストへの置換を順に適用する（`replace_on_insert`）
pub fn apply_replacements(text: &str, rules: &[RewriteRule]) -> String {
    let mut result = text.to_string();
    for (pattern, target) in rules {
        match compile_rule(pattern) {
            Ok(regex) => {
                let template = normalize_template(target);
                result = regex.replace_all(&result, template.as_str()).into_owned();
            }
            Err(err) => log::warn!("skipping insertion rule: {}", err),
        }
    }
    result
}

/// エイリアス結果からディレクトリ部分（最後の `/` まで）を取り出す
pub fn alias_directory(resolved: &str) -> &str {
    match resolved.rfind('/') {
        Some(index) => &resolved[..=index],
        None => "",
    }
}
