//! 補完候補の生成
//!
//! 解決済みディレクトリ（またはドライブ一覧）から、種別・サイズ・画像寸法の
//! 注釈付き候補を作る。候補は要求ごとの値として返す。

pub mod budget;
pub mod builder;
pub mod image;
pub mod size;

pub use budget::Budgeted;
pub use builder::CompletionBuilder;
pub use image::{HeaderDecoder, ImageDecoder, ImageDimensions};
pub use size::natural_size;

use std::path::PathBuf;

/// 候補の種別
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
    Image,
    Drive,
    Unknown,
}

impl EntryKind {
    pub fn icon(self) -> &'static str {
        match self {
            EntryKind::Directory => "📁",
            EntryKind::File | EntryKind::Image => "📄",
            EntryKind::Drive => "🖴",
            EntryKind::Unknown => "",
        }
    }

    /// 詳細欄の見出し
    pub fn title(self) -> &'static str {
        match self {
            EntryKind::Directory => "Directory",
            EntryKind::File => "File",
            EntryKind::Image => "Image",
            EntryKind::Drive => "Drive",
            EntryKind::Unknown => "",
        }
    }

    /// 候補一覧の注釈
    pub fn annotation(self) -> &'static str {
        match self {
            EntryKind::Directory => "Dir",
            EntryKind::File | EntryKind::Image => "File",
            EntryKind::Drive => "Drive",
            EntryKind::Unknown => "",
        }
    }
}

/// 補完候補
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionEntry {
    /// 一覧に表示する名前（拡張子のない名前には区切り文字が付く）
    pub label: String,
    pub kind: EntryKind,
    pub annotation: String,
    pub details: Vec<String>,
    /// 確定時に挿入するテキスト
    pub insertion_text: String,
}

impl CompletionEntry {
    pub fn details_text(&self) -> String {
        self.details.join(", ")
    }
}

/// 補完結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionList {
    pub entries: Vec<CompletionEntry>,
    /// 一覧したディレクトリ
    pub directory: Option<PathBuf>,
    /// ドライブ一覧か
    pub drives: bool,
    /// 時間予算で打ち切られたか
    pub truncated: bool,
}

impl CompletionList {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// ラベルで候補を探す
    pub fn find(&self, label: &str) -> Option<&CompletionEntry> {
        self.entries.iter().find(|entry| entry.label == label)
    }
}
