//! 一覧対象ディレクトリの解決
//!
//! 入力パス・現在のファイル・プロジェクトルート設定・エイリアスから、
//! 補完候補を列挙するディレクトリ（またはドライブ一覧モード）を決定する。

use super::alias::{alias_directory, resolve_alias, RewriteRule, PROJECT_ROOT_PLACEHOLDER};
use super::expand::{expand_full, expand_tilde};
use crate::platform::Platform;
use std::path::{Path, PathBuf};

/// 解決済みの一覧対象
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    pub absolute_dir: PathBuf,
    pub separator: char,
    pub is_project_relative: bool,
}

/// 解決結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// 通常のディレクトリ一覧
    Directory(ResolvedPath),
    /// Windows の論理ドライブ一覧
    DriveListing,
    /// 一覧対象なし
    Nothing,
}

/// 解決の入力
#[derive(Debug, Clone)]
pub struct ResolveRequest<'a> {
    /// スコープから取り出した入力パス（引用符除去済み）
    pub entered_path: &'a str,
    /// 現在のファイル（未保存バッファは `None`）
    pub current_file: Option<&'a Path>,
    pub use_project_root: bool,
    /// `afp_proj_root`（`<project_root>` を含められる）
    pub project_root_template: Option<&'a str>,
    pub project_folders: &'a [PathBuf],
    pub aliases: &'a [RewriteRule],
    pub separator: char,
    pub platform: Platform,
    /// カーソル位置のスコープの長さ（文字数）
    pub scope_extent: usize,
}

impl<'a> ResolveRequest<'a> {
    pub fn new(entered_path: &'a str) -> Self {
        Self {
            entered_path,
            current_file: None,
            use_project_root: false,
            project_root_template: None,
            project_folders: &[],
            aliases: &[],
            separator: '/',
            platform: Platform::current(),
            scope_extent: entered_path.chars().count(),
        }
    }
}

/// 入力パスのディレクトリ部分（最後の区切り文字まで、なければ空）
pub fn directory_portion(entered_path: &str, separator: char) -> &str {
    match entered_path.rfind(separator) {
        Some(index) => &entered_path[..index + separator.len_utf8()],
        None => "",
    }
}

/// スコープ内容の1行目から区切り文字を推定
pub fn infer_separator(scope_text: &str) -> char {
    let first_line = scope_text.lines().next().unwrap_or("");
    if first_line.contains('\\') && !first_line.contains('/') {
        '\\'
    } else {
        '/'
    }
}

/// スコープ内容から入力パスを取り出す
///
/// 前後の空白を除いた1行目から、先頭の引用符・括弧と対応する閉じ記号を外す。
pub fn entered_path(scope_text: &str) -> String {
    let trimmed = scope_text.trim();
    let first_line = trimmed.lines().next().unwrap_or("");

    let mut chars = first_line.chars();
    let closer = match chars.next() {
        Some('"') => '"',
        Some('\'') => '\'',
        Some('(') => ')',
        _ => return first_line.to_string(),
    };

    let inner = chars.as_str();
    inner.strip_suffix(closer).unwrap_or(inner).to_string()
}

fn project_directory(request: &ResolveRequest<'_>, current_file: &Path, cur_path: &str) -> Option<PathBuf> {
    let folder = request
        .project_folders
        .iter()
        .find(|folder| current_file.starts_with(folder))?;

    let template = request
        .project_root_template
        .filter(|template| !template.is_empty())
        .unwrap_or(PROJECT_ROOT_PLACEHOLDER);
    let root = PathBuf::from(expand_full(
        &template.replace(PROJECT_ROOT_PLACEHOLDER, &folder.to_string_lossy()),
    ));
    let root = if root.is_absolute() { root } else { folder.join(root) };

    Some(root.join(cur_path.trim_start_matches(['/', '\\'])))
}

/// 一覧対象を解決
pub fn resolve(request: &ResolveRequest<'_>) -> Resolution {
    let windows = request.platform.is_windows();
    let cur_path = expand_tilde(directory_portion(request.entered_path, request.separator));

    if windows && cur_path.starts_with("\\\\") && !cur_path.starts_with("\\\\\\") {
        return Resolution::DriveListing;
    }

    let mut is_project_relative = false;
    let mut directory: Option<PathBuf> = if cur_path.starts_with(['/', '\\']) {
        match request.current_file {
            Some(file) if request.use_project_root => {
                let resolved = project_directory(request, file, &cur_path);
                is_project_relative = resolved.is_some();
                resolved
            }
            _ => None,
        }
    } else if let Some(file) = request.current_file {
        let base = file.parent().unwrap_or_else(|| Path::new(""));
        let mut resolved = base.join(&*cur_path);

        if !request.aliases.is_empty() {
            let project_root = request.project_folders.first().map(PathBuf::as_path);
            if let Some(aliased) = resolve_alias(request.entered_path, request.aliases, project_root) {
                log::debug!("alias rewrote {:?} to {:?}", request.entered_path, aliased);
                resolved = PathBuf::from(alias_directory(&aliased));
            }
        }
        Some(resolved)
    } else {
        Some(PathBuf::from(&*cur_path))
    };

    directory = directory.filter(|dir| !dir.as_os_str().is_empty());

    if request.platform.is_absolute(&cur_path) && (!request.use_project_root || directory.is_none()) {
        if windows && request.scope_extent < 4 {
            return Resolution::DriveListing;
        }
        if !windows {
            directory = Some(PathBuf::from(&*cur_path));
            is_project_relative = false;
        }
    }

    match directory {
        Some(absolute_dir) => Resolution::Directory(ResolvedPath {
            absolute_dir,
            separator: request.separator,
            is_project_relative,
        }),
        None => Resolution::Nothing,
    }
}
