//! 文脈解析ルール
//!
//! 正規表現ヒューリスティックを「名前付きルールの順序付きリスト」として表現する。
//! 各ルールは `Matched(value)` か `NoMatch` を返し、先に一致したルールが優先される。

use super::{LineContext, ParsedContext};
use regex::Regex;
use std::sync::OnceLock;

/// needle に含まれてはならない文字
const NEEDLE_INVALID_CHARACTERS: &[char] = &['"', '\'', ')', '=', ':', '(', '<', '>', '\n', '{', '}'];

/// 単語末尾から取り除く閉じ記号
const TRAILING_CLOSERS: &[char] = &['"', '\'', ';', ')', ']', '}'];

/// ルールの評価結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleMatch<T> {
    Matched(T),
    NoMatch,
}

impl<T> RuleMatch<T> {
    fn from_option(value: Option<T>) -> Self {
        match value {
            Some(value) => RuleMatch::Matched(value),
            None => RuleMatch::NoMatch,
        }
    }
}

/// 名前付きの解析ルール
#[derive(Clone, Copy)]
pub struct ContextRule<T> {
    pub name: &'static str,
    apply: fn(&str) -> RuleMatch<T>,
}

impl<T> ContextRule<T> {
    pub fn apply(&self, input: &str) -> RuleMatch<T> {
        (self.apply)(input)
    }
}

impl<T> std::fmt::Debug for ContextRule<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextRule").field("name", &self.name).finish()
    }
}

/// 区切り文字の一致結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeparatorMatch {
    /// 区切り文字
    pub separator: char,
    /// 区切り文字から pre 末尾までの文字列
    pub run: String,
    /// pre 内での区切り文字のバイト位置
    pub offset: usize,
}

/// needle の区切り文字を探すルール（優先順）
pub const SEPARATOR_RULES: [ContextRule<SeparatorMatch>; 2] = [
    ContextRule {
        name: "quote-separator",
        apply: quote_separator,
    },
    ContextRule {
        name: "whitespace-separator",
        apply: whitespace_separator,
    },
];

/// prefix を探すルール（優先順）
pub const PREFIX_RULES: [ContextRule<String>; 2] = [
    ContextRule {
        name: "trailing-prefix",
        apply: trailing_prefix,
    },
    ContextRule {
        name: "array-prefix",
        apply: array_prefix,
    },
];

fn compiled(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("built-in context pattern must compile"))
}

fn enquoted_symbols() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    compiled(&CELL, r#"(\(?['"`])(\W+)(['"`]\)?)"#)
}

fn separator_match(regex: &Regex, pre: &str) -> RuleMatch<SeparatorMatch> {
    RuleMatch::from_option(regex.captures(pre).and_then(|caps| {
        let separator = caps.get(1)?;
        Some(SeparatorMatch {
            separator: separator.as_str().chars().next()?,
            run: caps.get(2).map_or("", |m| m.as_str()).to_string(),
            offset: separator.start(),
        })
    }))
}

// <">path/to/<caret>
fn quote_separator(pre: &str) -> RuleMatch<SeparatorMatch> {
    static CELL: OnceLock<Regex> = OnceLock::new();
    let regex = compiled(&CELL, r#"(["'({])([^>"'(){}]*)$"#);
    separator_match(regex, pre)
}

fn whitespace_separator(pre: &str) -> RuleMatch<SeparatorMatch> {
    static CELL: OnceLock<Regex> = OnceLock::new();
    let regex = compiled(&CELL, r#"(\s)([^>"'(){}\s]*)$"#);
    separator_match(regex, pre)
}

/// カーソル後ろのパス残り（閉じ記号の手前まで）
fn path_remainder(post: &str) -> RuleMatch<String> {
    static CELL: OnceLock<Regex> = OnceLock::new();
    let regex = compiled(&CELL, r#"^([^"')}]*)"#);
    RuleMatch::from_option(
        regex
            .captures(post)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string()),
    )
}

fn prefix_match(regex: &Regex, text: &str) -> RuleMatch<String> {
    RuleMatch::from_option(
        regex
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string()),
    )
}

// ABC =:([ の形
fn trailing_prefix(text: &str) -> RuleMatch<String> {
    static CELL: OnceLock<Regex> = OnceLock::new();
    let regex = compiled(&CELL, r"\s*([.A-Za-z0-9\-_$]+)[\s:(\[={]*$");
    prefix_match(regex, text)
}

// define(["...", "<caret>"]) の形
fn array_prefix(text: &str) -> RuleMatch<String> {
    static CELL: OnceLock<Regex> = OnceLock::new();
    let regex = compiled(&CELL, r"^\s*([.A-Za-z0-9\-_$]+)[\s:(\[={]+");
    prefix_match(regex, text)
}

/// 最初に一致したルールの名前と値
pub fn first_match<T>(rules: &[ContextRule<T>], input: &str) -> Option<(&'static str, T)> {
    rules.iter().find_map(|rule| match rule.apply(input) {
        RuleMatch::Matched(value) => Some((rule.name, value)),
        RuleMatch::NoMatch => None,
    })
}

fn contains_invalid(text: &str) -> bool {
    text.contains(NEEDLE_INVALID_CHARACTERS)
}

/// カーソル周辺テキストを解析
///
/// 不正・曖昧な入力では例外を出さず `is_valid = false` を返す。
pub fn extract(context: &LineContext) -> ParsedContext {
    let mut word = context.word.clone();
    let mut pre = context.pre.clone();
    let mut post = context.post.clone();

    // require('./') のように記号だけのパスは単語に引用符ごと入ってくる
    if let Some(caps) = enquoted_symbols().captures(&context.word) {
        pre.push_str(&caps[1]);
        post.push_str(&caps[3]);
        word = caps[2].to_string();
    }

    let word = word.trim_end_matches(TRAILING_CLOSERS).to_string();
    let word_error = contains_invalid(&word);

    let mut remainder_missing = false;
    let (needle, separator, prefix_end) = match first_match(&SEPARATOR_RULES, &pre) {
        Some((rule, found)) => {
            log::trace!("separator {:?} matched by {}", found.separator, rule);
            let mut needle = format!("{}{}", found.run, word);
            match path_remainder(&post) {
                RuleMatch::Matched(rest) => needle.push_str(&rest),
                RuleMatch::NoMatch => remainder_missing = true,
            }
            (needle, Some(found.separator), found.offset)
        }
        None => {
            let joined = format!("{}{}", pre, word);
            let needle = if contains_invalid(&joined) {
                word.clone()
            } else {
                joined
            };
            (needle, None, pre.len())
        }
    };

    let prefix = first_match(&PREFIX_RULES, &pre[..prefix_end]).map(|(_, prefix)| prefix);

    let is_valid = match separator {
        None => false,
        Some(_) if contains_invalid(&needle) => false,
        Some(separator) if prefix.is_none() && separator.is_whitespace() => false,
        Some(_) => !word_error && !remainder_missing,
    };

    log::trace!(
        "context line={:?} needle={:?} prefix={:?} valid={}",
        context.line,
        needle,
        prefix,
        is_valid
    );

    ParsedContext {
        is_valid,
        needle,
        word,
        prefix,
        separator,
    }
}
