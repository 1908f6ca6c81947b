//! カーソル周辺テキストの解析
//!
//! 行テキスト・単語・前後テキストから、カーソルがパス文字列の中にあるかを判定し、
//! 入力途中のパス（needle）と直前の識別子（prefix）を取り出す。

pub mod extractor;

pub use extractor::{extract, ContextRule, RuleMatch};

use crate::editor::adapter::{EditorAdapter, Region};

/// カーソル位置周辺の生テキスト
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineContext {
    /// カーソル行全体
    pub line: String,
    /// カーソル位置の単語（記号で始まる場合は左へ拡張済み）
    pub word: String,
    /// 行頭から単語の直前まで
    pub pre: String,
    /// 単語の直後から行末まで
    pub post: String,
    /// カーソル位置（文字オフセット）
    pub caret: usize,
}

impl LineContext {
    pub fn new(
        line: impl Into<String>,
        word: impl Into<String>,
        pre: impl Into<String>,
        post: impl Into<String>,
        caret: usize,
    ) -> Self {
        Self {
            line: line.into(),
            word: word.into(),
            pre: pre.into(),
            post: post.into(),
            caret,
        }
    }

    /// エディタビューからカーソル周辺テキストを取得
    ///
    /// `@scope/pkg` や `~/file` のように記号で始まる名前も補完できるよう、
    /// 単語範囲の直前が記号である限り左へ広げる。
    pub fn capture<V: EditorAdapter + ?Sized>(view: &V, caret: usize) -> Self {
        let line_region = view.line(caret);
        let mut word_region = view.word(caret);

        word_region.a = word_region.a.max(line_region.a);
        word_region.b = word_region.b.min(line_region.b).max(word_region.a);

        while word_region.a > line_region.a {
            let previous = view.substr(Region::new(word_region.a - 1, word_region.a));
            match previous.chars().next() {
                Some(ch) if is_word_symbol(ch) => word_region.a -= 1,
                _ => break,
            }
        }

        Self {
            line: view.substr(line_region),
            word: view.substr(word_region),
            pre: view.substr(Region::new(line_region.a, word_region.a)),
            post: view.substr(Region::new(word_region.b, line_region.b)),
            caret,
        }
    }
}

/// 単語の先頭に付き得る記号か（`/` `\` 空白 単語文字 引用符 は除く）
pub fn is_word_symbol(ch: char) -> bool {
    !(ch == '/'
        || ch == '\\'
        || ch.is_whitespace()
        || ch.is_alphanumeric()
        || ch == '_'
        || ch == '\''
        || ch == '"'
        || ch == '`')
}

/// 解析結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedContext {
    /// 補完を行ってよい文脈か
    pub is_valid: bool,
    /// 入力途中のパス
    pub needle: String,
    /// 末尾の閉じ記号を除いた単語
    pub word: String,
    /// 区切り文字の直前にある識別子（`require` `import` `url` など）
    pub prefix: Option<String>,
    /// needle の直前で見つかった区切り文字
    pub separator: Option<char>,
}

impl ParsedContext {
    /// 空でない prefix
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref().filter(|prefix| !prefix.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::memory::MemoryView;

    #[test]
    fn capture_splits_line_around_word() {
        let view = MemoryView::with_caret("import \"./comp", 14);
        let context = LineContext::capture(&view, 14);

        assert_eq!(context.line, "import \"./comp");
        assert_eq!(context.word, "comp");
        assert_eq!(context.pre, "import \"./");
        assert_eq!(context.post, "");
    }

    #[test]
    fn capture_expands_word_over_leading_symbols() {
        let text = "import x from \"@scope";
        let view = MemoryView::with_caret(text, text.chars().count());
        let context = LineContext::capture(&view, text.chars().count());

        assert_eq!(context.word, "@scope");
        assert_eq!(context.pre, "import x from \"");
    }

    #[test]
    fn capture_uses_caret_line_only() {
        let text = "first line\nurl(~/img\nlast";
        let caret = "first line\nurl(~/img".chars().count();
        let view = MemoryView::with_caret(text, caret);
        let context = LineContext::capture(&view, caret);

        assert_eq!(context.line, "url(~/img");
        assert_eq!(context.word, "img");
        assert_eq!(context.pre, "url(~/");
    }

    #[test]
    fn word_symbols_exclude_path_and_quote_characters() {
        assert!(is_word_symbol('@'));
        assert!(is_word_symbol('~'));
        assert!(!is_word_symbol('/'));
        assert!(!is_word_symbol('"'));
        assert!(!is_word_symbol('a'));
        assert!(!is_word_symbol(' '));
    }
}
