//! 候補一覧の構築

use super::budget::Budgeted;
use super::image::{is_image_name, read_dimensions, ImageDecoder};
use super::size::natural_size;
use super::{CompletionEntry, CompletionList, EntryKind};
use crate::config::settings::DEFAULT_WAIT_TIME;
use crate::error::FileError;
use crate::resolve::alias::apply_replacements;
use crate::resolve::RewriteRule;
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

/// 補完候補の構築器
pub struct CompletionBuilder<'a> {
    images: &'a dyn ImageDecoder,
    separator: char,
    replacements: &'a [RewriteRule],
    budget: Duration,
    started_at: Instant,
}

impl<'a> CompletionBuilder<'a> {
    pub fn new(images: &'a dyn ImageDecoder) -> Self {
        Self {
            images,
            separator: '/',
            replacements: &[],
            budget: DEFAULT_WAIT_TIME,
            started_at: Instant::now(),
        }
    }

    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    /// 挿入テキストへの置換（`replace_on_insert`）
    pub fn with_replacements(mut self, replacements: &'a [RewriteRule]) -> Self {
        self.replacements = replacements;
        self
    }

    pub fn with_budget(mut self, budget: Duration) -> Self {
        self.budget = budget;
        self
    }

    /// 時間予算の起点（既定は構築時刻）
    pub fn started_at(mut self, started_at: Instant) -> Self {
        self.started_at = started_at;
        self
    }

    /// ディレクトリの候補一覧
    ///
    /// 読めないディレクトリは空の一覧になる。
    pub fn build(&self, directory: &Path) -> CompletionList {
        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(err) => {
                log::debug!("{}", FileError::from_io(&err, directory));
                return CompletionList::empty();
            }
        };

        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| !name.starts_with('.'))
            .collect();
        names.sort();

        let mut budgeted = Budgeted::new(names.into_iter(), self.started_at, self.budget);
        let entries = budgeted
            .by_ref()
            .map(|name| self.prepare(directory, &name))
            .collect();

        CompletionList {
            entries,
            directory: Some(directory.to_path_buf()),
            drives: false,
            truncated: budgeted.truncated(),
        }
    }

    /// ドライブ一覧
    pub fn build_drives(&self, letters: &[char]) -> CompletionList {
        let mut budgeted = Budgeted::new(letters.iter(), self.started_at, self.budget);
        let entries = budgeted
            .by_ref()
            .map(|letter| {
                let label = format!("{}:{}", letter, self.separator);
                CompletionEntry {
                    insertion_text: label.clone(),
                    label,
                    kind: EntryKind::Drive,
                    annotation: EntryKind::Drive.annotation().to_string(),
                    details: Vec::new(),
                }
            })
            .collect();

        CompletionList {
            entries,
            directory: None,
            drives: true,
            truncated: budgeted.truncated(),
        }
    }

    fn prepare(&self, directory: &Path, name: &str) -> CompletionEntry {
        let path = directory.join(name);
        let label = if name.contains('.') {
            name.to_string()
        } else {
            format!("{}{}", name, self.separator)
        };

        let metadata = fs::metadata(&path).ok();
        let mut kind = match &metadata {
            Some(metadata) if metadata.is_dir() => EntryKind::Directory,
            Some(metadata) if metadata.is_file() => EntryKind::File,
            _ => EntryKind::Unknown,
        };

        let mut details = Vec::new();
        if let Some(metadata) = metadata.filter(|metadata| metadata.is_file()) {
            details.push(format!("Size: {}", natural_size(metadata.len())));
        }

        if kind == EntryKind::File && is_image_name(name) {
            kind = EntryKind::Image;
            match read_dimensions(self.images, &path) {
                Ok(dimensions) => {
                    details.push(format!("Height: {}", dimensions.height));
                    details.push(format!("Width: {}", dimensions.width));
                }
                Err(err) => log::debug!("no dimensions for {}: {}", path.display(), err),
            }
        }

        CompletionEntry {
            insertion_text: apply_replacements(&label, self.replacements),
            label,
            kind,
            annotation: kind.annotation().to_string(),
            details,
        }
    }
}
