//! autopath - エディタ向けファイルパス自動補完エンジン
//!
//! カーソル周辺のテキストからパス文字列を見つけ、プロジェクトルート・現在のファイル・
//! エイリアスを基準にディレクトリを解決して、注釈付きの補完候補を返す。

// 解析層
pub mod context;
pub mod resolve;

// 候補生成
pub mod completion;

// エディタ連携
pub mod editor;

// 設定・基盤
pub mod config;
pub mod error;
pub mod logging;
pub mod platform;

// 公開API
pub use completion::{CompletionEntry, CompletionList, EntryKind};
pub use config::Settings;
pub use context::{extract, LineContext, ParsedContext};
pub use editor::{EditorAdapter, MemoryView, PathCompleter, Region, ViewId};
pub use error::{AfpError, Result};
pub use platform::Platform;
