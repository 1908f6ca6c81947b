//! ホストエディタとの境界
//!
//! 補完エンジンはエディタのビューをこのトレイト越しにだけ操作する。
//! 位置はすべて文字オフセット。

use crate::config::selector;
use serde_json::Value;
use std::path::PathBuf;

/// テキスト範囲（`a` は始点、`b` は終点。`a > b` の逆向きも許す）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Region {
    pub a: usize,
    pub b: usize,
}

impl Region {
    pub fn new(a: usize, b: usize) -> Self {
        Self { a, b }
    }

    /// 空の範囲（カーソル）
    pub fn point(point: usize) -> Self {
        Self::new(point, point)
    }

    pub fn begin(&self) -> usize {
        self.a.min(self.b)
    }

    pub fn end(&self) -> usize {
        self.a.max(self.b)
    }

    pub fn len(&self) -> usize {
        self.end() - self.begin()
    }

    pub fn is_empty(&self) -> bool {
        self.a == self.b
    }

    /// 位置が範囲内か（終点を含む）
    pub fn contains(&self, point: usize) -> bool {
        self.begin() <= point && point <= self.end()
    }
}

/// ビュー識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(pub u64);

/// ホストエディタのビュー
pub trait EditorAdapter {
    fn id(&self) -> ViewId;

    /// 選択範囲（先頭がメインカーソル）
    fn selections(&self) -> Vec<Region>;

    fn substr(&self, region: Region) -> String;

    fn char_at(&self, point: usize) -> Option<char> {
        self.substr(Region::new(point, point + 1)).chars().next()
    }

    /// 位置を含む行（改行を含まない）
    fn line(&self, point: usize) -> Region;

    /// 位置の単語
    fn word(&self, point: usize) -> Region;

    /// 位置を含む構文スコープの範囲（文字列リテラル・括弧・タグなど）
    fn extract_scope(&self, point: usize) -> Region;

    /// 位置のスコープ名（空白区切りの階層）
    fn scope_name(&self, point: usize) -> String;

    fn match_selector(&self, point: usize, selector: &str) -> bool {
        selector::matches(selector, &self.scope_name(point))
    }

    /// ビュー固有の設定上書き
    fn setting(&self, key: &str) -> Option<Value>;

    /// 保存先のパス（未保存なら `None`）
    fn file_name(&self) -> Option<PathBuf>;

    /// ウィンドウで開いているプロジェクトフォルダ
    fn folders(&self) -> Vec<PathBuf>;

    fn has_window(&self) -> bool;

    fn size(&self) -> usize;

    /// 挿入した文字数を返す
    fn insert(&mut self, point: usize, text: &str) -> usize;

    fn erase(&mut self, region: Region);

    fn replace(&mut self, region: Region, text: &str);

    fn add_selection(&mut self, region: Region);

    /// カーソル直前の1文字を削除（選択があれば選択を削除）
    fn left_delete(&mut self);

    fn run_auto_complete(&mut self);

    fn hide_auto_complete(&mut self);

    fn commit_completion(&mut self);
}
