//! エラーハンドリングシステム
//!
//! autopath 全体で使用される統一されたエラー型を定義
//! 補完処理そのものは失敗を呼び出し元へ伝播せず、「候補なし」に縮退する。
//! ここで定義する型は設定読み込みや内部処理の境界で利用する。

use thiserror::Error;

/// アプリケーション全体のエラー型
#[derive(Error, Debug, Clone)]
pub enum AfpError {
    /// ファイル操作エラー
    #[error("File operation failed: {0}")]
    File(#[from] FileError),

    /// 設定エラー
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// 正規表現パターンエラー
    #[error("Pattern error: {0}")]
    Pattern(#[from] PatternError),

    /// 画像ヘッダ解析エラー
    #[error("Image decode error: {0}")]
    Image(#[from] ImageDecodeError),
}

/// ファイル操作固有のエラー
#[derive(Error, Debug, Clone)]
pub enum FileError {
    #[error("File not found: {path}")]
    NotFound { path: String },

    #[error("Permission denied: {path}")]
    PermissionDenied { path: String },

    #[error("IO error: {message}")]
    Io { message: String },
}

impl FileError {
    /// `std::io::Error` をパス情報付きで分類
    pub fn from_io(error: &std::io::Error, path: &std::path::Path) -> Self {
        let path = path.display().to_string();
        match error.kind() {
            std::io::ErrorKind::NotFound => FileError::NotFound { path },
            std::io::ErrorKind::PermissionDenied => FileError::PermissionDenied { path },
            _ => FileError::Io {
                message: format!("{}: {}", path, error),
            },
        }
    }
}

/// 設定固有のエラー
#[derive(Error, Debug, Clone)]
pub enum ConfigError {
    #[error("Invalid configuration file: {path}: {message}")]
    InvalidFile { path: String, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Malformed settings document: {0}")]
    Malformed(String),
}

/// 正規表現パターン固有のエラー
#[derive(Error, Debug, Clone)]
pub enum PatternError {
    #[error("Invalid pattern `{pattern}`: {message}")]
    Invalid { pattern: String, message: String },
}

/// 画像ヘッダ解析のエラー（寸法表示を省略するだけで補完候補は残す）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageDecodeError {
    #[error("Unsupported or corrupt image header")]
    UnrecognizedHeader,

    #[error("Image header is truncated")]
    Truncated,
}

/// プロジェクト標準のResult型
pub type Result<T> = std::result::Result<T, AfpError>;

// std::io::Error から AfpError への変換
impl From<std::io::Error> for AfpError {
    fn from(error: std::io::Error) -> Self {
        AfpError::File(FileError::Io {
            message: error.to_string(),
        })
    }
}

// serde_json::Error から AfpError への変換
impl From<serde_json::Error> for AfpError {
    fn from(error: serde_json::Error) -> Self {
        AfpError::Config(ConfigError::Malformed(error.to_string()))
    }
}

// regex::Error から AfpError への変換（パターン文字列は不明）
impl From<regex::Error> for AfpError {
    fn from(error: regex::Error) -> Self {
        AfpError::Pattern(PatternError::Invalid {
            pattern: String::new(),
            message: error.to_string(),
        })
    }
}

impl PatternError {
    /// コンパイル失敗したパターンからエラーを構築
    pub fn from_regex(pattern: &str, error: &regex::Error) -> Self {
        PatternError::Invalid {
            pattern: pattern.to_string(),
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_io_error_classification() {
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        match FileError::from_io(&err, Path::new("/tmp/missing")) {
            FileError::NotFound { path } => assert_eq!(path, "/tmp/missing"),
            other => panic!("Expected NotFound, got {:?}", other),
        }

        let err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "no");
        assert!(matches!(
            FileError::from_io(&err, Path::new("/root")),
            FileError::PermissionDenied { .. }
        ));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: AfpError = json_error.into();
        assert!(matches!(error, AfpError::Config(ConfigError::Malformed(_))));
    }

    #[test]
    fn test_pattern_error_message() {
        let regex_error = regex::Regex::new("(").unwrap_err();
        let error = AfpError::from(PatternError::from_regex("(", &regex_error));
        assert!(error.to_string().contains("`(`"));
    }
}
