//! メモリ上のビュー
//!
//! ホストエディタを持たない環境（テスト・CLI）向けの `EditorAdapter` 実装。
//! スコープ名は明示的に与え、`extract_scope` は行内の引用符・括弧・タグから推定する。

use super::adapter::{EditorAdapter, Region, ViewId};
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_VIEW_ID: AtomicU64 = AtomicU64::new(1);

/// ポップアップ操作の記録
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PopupRequests {
    pub shown: usize,
    pub hidden: usize,
    pub committed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Word,
    Punctuation,
    Space,
}

fn classify(ch: char) -> CharClass {
    if ch.is_alphanumeric() || ch == '_' {
        CharClass::Word
    } else if ch.is_whitespace() {
        CharClass::Space
    } else {
        CharClass::Punctuation
    }
}

/// メモリ上のビュー
#[derive(Debug, Clone)]
pub struct MemoryView {
    id: ViewId,
    text: Vec<char>,
    selections: Vec<Region>,
    file_name: Option<PathBuf>,
    folders: Vec<PathBuf>,
    has_window: bool,
    settings: Map<String, Value>,
    base_scope: String,
    scopes: Vec<(Region, String)>,
    popup: PopupRequests,
}

impl MemoryView {
    /// テキスト末尾にカーソルを置いたビュー
    pub fn new(text: &str) -> Self {
        let text: Vec<char> = text.chars().collect();
        let caret = text.len();
        Self {
            id: ViewId(NEXT_VIEW_ID.fetch_add(1, Ordering::Relaxed)),
            text,
            selections: vec![Region::point(caret)],
            file_name: None,
            folders: Vec::new(),
            has_window: true,
            settings: Map::new(),
            base_scope: "source".to_string(),
            scopes: Vec::new(),
            popup: PopupRequests::default(),
        }
    }

    pub fn with_caret(text: &str, caret: usize) -> Self {
        let view = Self::new(text);
        let caret = caret.min(view.text.len());
        view.with_selection(Region::point(caret))
    }

    pub fn with_selection(mut self, region: Region) -> Self {
        self.selections = vec![region];
        self
    }

    pub fn with_id(mut self, id: ViewId) -> Self {
        self.id = id;
        self
    }

    pub fn with_file_name(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_name = Some(path.into());
        self
    }

    pub fn with_folder(mut self, folder: impl Into<PathBuf>) -> Self {
        self.folders.push(folder.into());
        self
    }

    pub fn without_window(mut self) -> Self {
        self.has_window = false;
        self
    }

    pub fn with_setting(mut self, key: &str, value: Value) -> Self {
        self.settings.insert(key.to_string(), value);
        self
    }

    /// 全体のスコープ名
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.base_scope = scope.into();
        self
    }

    /// 範囲に追加のスコープ名を付ける
    pub fn with_scope_at(mut self, region: Region, scope: impl Into<String>) -> Self {
        self.scopes.push((region, scope.into()));
        self
    }

    pub fn text(&self) -> String {
        self.text.iter().collect()
    }

    /// メインカーソル位置
    pub fn caret(&self) -> usize {
        self.selections.first().map_or(0, |region| region.b)
    }

    pub fn set_caret(&mut self, caret: usize) {
        self.selections = vec![Region::point(caret.min(self.text.len()))];
    }

    pub fn popup(&self) -> PopupRequests {
        self.popup
    }

    fn clamp(&self, point: usize) -> usize {
        point.min(self.text.len())
    }

    fn shift_selections(&mut self, map: impl Fn(usize) -> usize) {
        for region in &mut self.selections {
            region.a = map(region.a);
            region.b = map(region.b);
        }
    }
}

fn quoted_span(chars: &[char], point: usize) -> Option<(usize, usize)> {
    let mut index = 0;
    while index < chars.len() {
        let quote = chars[index];
        if !matches!(quote, '"' | '\'' | '`') {
            index += 1;
            continue;
        }

        let close = chars[index + 1..].iter().position(|&ch| ch == quote);
        let end = close.map_or(chars.len(), |offset| index + 1 + offset + 1);
        let unterminated = close.is_none();

        if index <= point && (point < end || (unterminated && point == end)) {
            return Some((index, end));
        }
        index = end;
    }
    None
}

fn delimited_span(chars: &[char], point: usize, open: char, close: char) -> Option<(usize, usize)> {
    let start = if chars.get(point) == Some(&open) {
        point
    } else {
        let mut depth = 0usize;
        let mut found = None;
        for index in (0..point.min(chars.len())).rev() {
            if chars[index] == close {
                depth += 1;
            } else if chars[index] == open {
                if depth == 0 {
                    found = Some(index);
                    break;
                }
                depth -= 1;
            }
        }
        found?
    };

    let mut depth = 0usize;
    let mut end = chars.len();
    for (index, &ch) in chars.iter().enumerate().skip(start + 1) {
        if ch == open {
            depth += 1;
        } else if ch == close {
            if depth == 0 {
                end = index + 1;
                break;
            }
            depth -= 1;
        }
    }

    (point < end || end == chars.len()).then_some((start, end))
}

fn token_span(chars: &[char], point: usize) -> (usize, usize) {
    let is_token = |index: usize| chars.get(index).map_or(false, |ch| !ch.is_whitespace());
    let anchor = if is_token(point) {
        point
    } else if point > 0 && is_token(point - 1) {
        point - 1
    } else {
        return (point, point);
    };

    let mut start = anchor;
    while start > 0 && is_token(start - 1) {
        start -= 1;
    }
    let mut end = anchor;
    while is_token(end) {
        end += 1;
    }
    (start, end)
}

impl EditorAdapter for MemoryView {
    fn id(&self) -> ViewId {
        self.id
    }

    fn selections(&self) -> Vec<Region> {
        self.selections.clone()
    }

    fn substr(&self, region: Region) -> String {
        let begin = self.clamp(region.begin());
        let end = self.clamp(region.end());
        self.text[begin..end].iter().collect()
    }

    fn line(&self, point: usize) -> Region {
        let point = self.clamp(point);
        let start = self.text[..point]
            .iter()
            .rposition(|&ch| ch == '\n')
            .map_or(0, |index| index + 1);
        let end = self.text[point..]
            .iter()
            .position(|&ch| ch == '\n')
            .map_or(self.text.len(), |offset| point + offset);
        Region::new(start, end)
    }

    fn word(&self, point: usize) -> Region {
        let point = self.clamp(point);
        let before = point.checked_sub(1).map(|index| classify(self.text[index]));
        let at = self.text.get(point).map(|&ch| classify(ch));

        let class = match (before, at) {
            (Some(CharClass::Word), _) | (_, Some(CharClass::Word)) => CharClass::Word,
            (Some(CharClass::Punctuation), _) | (_, Some(CharClass::Punctuation)) => {
                CharClass::Punctuation
            }
            _ => return Region::point(point),
        };

        let mut start = point;
        while start > 0 && classify(self.text[start - 1]) == class {
            start -= 1;
        }
        let mut end = point;
        while end < self.text.len() && classify(self.text[end]) == class {
            end += 1;
        }
        Region::new(start, end)
    }

    fn extract_scope(&self, point: usize) -> Region {
        let point = self.clamp(point);
        let line = self.line(point);
        let chars = &self.text[line.a..line.b];
        let relative = point - line.a;

        let (start, end) = quoted_span(chars, relative)
            .or_else(|| delimited_span(chars, relative, '(', ')'))
            .or_else(|| delimited_span(chars, relative, '<', '>'))
            .unwrap_or_else(|| token_span(chars, relative));
        Region::new(line.a + start, line.a + end)
    }

    fn scope_name(&self, point: usize) -> String {
        let mut name = self.base_scope.clone();
        for (region, scope) in &self.scopes {
            if region.begin() <= point && point < region.end() {
                name.push(' ');
                name.push_str(scope);
            }
        }
        name
    }

    fn setting(&self, key: &str) -> Option<Value> {
        self.settings.get(key).cloned()
    }

    fn file_name(&self) -> Option<PathBuf> {
        self.file_name.clone()
    }

    fn folders(&self) -> Vec<PathBuf> {
        if self.has_window {
            self.folders.clone()
        } else {
            Vec::new()
        }
    }

    fn has_window(&self) -> bool {
        self.has_window
    }

    fn size(&self) -> usize {
        self.text.len()
    }

    fn insert(&mut self, point: usize, text: &str) -> usize {
        let point = self.clamp(point);
        let inserted: Vec<char> = text.chars().collect();
        let count = inserted.len();
        self.text.splice(point..point, inserted);
        self.shift_selections(|pos| if pos >= point { pos + count } else { pos });
        count
    }

    fn erase(&mut self, region: Region) {
        self.replace(region, "");
    }

    fn replace(&mut self, region: Region, text: &str) {
        let begin = self.clamp(region.begin());
        let end = self.clamp(region.end());
        let replacement: Vec<char> = text.chars().collect();
        let count = replacement.len();
        self.text.splice(begin..end, replacement);
        self.shift_selections(|pos| {
            if pos >= end {
                pos - (end - begin) + count
            } else if pos > begin {
                begin
            } else {
                pos
            }
        });
    }

    fn add_selection(&mut self, region: Region) {
        if !self.selections.contains(&region) {
            self.selections.push(region);
        }
    }

    fn left_delete(&mut self) {
        let Some(main) = self.selections.first().copied() else {
            return;
        };
        if !main.is_empty() {
            self.erase(main);
        } else if main.b > 0 {
            self.erase(Region::new(main.b - 1, main.b));
        }
    }

    fn run_auto_complete(&mut self) {
        self.popup.shown += 1;
    }

    fn hide_auto_complete(&mut self) {
        self.popup.hidden += 1;
    }

    fn commit_completion(&mut self) {
        self.popup.committed += 1;
    }
}
