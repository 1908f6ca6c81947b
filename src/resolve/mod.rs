//! 入力パスの解決
//!
//! エイリアス置換・パス展開・一覧対象ディレクトリの決定を行う。

pub mod alias;
pub mod directory;
pub mod expand;

pub use alias::{apply_replacements, resolve_alias, RewriteRule, PROJECT_ROOT_PLACEHOLDER};
pub use directory::{
    directory_portion, entered_path, infer_separator, resolve, Resolution, ResolveRequest,
    ResolvedPath,
};
