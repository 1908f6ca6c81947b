//! エディタ連携
//!
//! ホストエディタとの境界（`EditorAdapter`）、メモリ上の実装、
//! ビューごとのセッション、イベント駆動の補完エンジンと付随コマンド。

pub mod adapter;
pub mod commands;
pub mod engine;
pub mod memory;
pub mod session;

// 公開API
pub use adapter::{EditorAdapter, Region, ViewId};
pub use commands::DimensionRequest;
pub use engine::{PathCompleter, DELETING_SLASH_CONTEXT};
pub use memory::{MemoryView, PopupRequests};
pub use session::{SessionRegistry, SessionState};
