//! 設定システム
//!
//! 埋め込みの既定値・ユーザー設定ファイル・スコープ別設定・ビュー上書きを
//! 優先順位付きで解決する。

pub mod selector;
pub mod settings;

pub use settings::{ScopeSettings, SettingSource, Settings, SettingsResolver, DEFAULT_SETTINGS};

/// 設定キー
pub mod keys {
    pub const USE_KEYBINDING: &str = "afp_use_keybinding";
    pub const VALID_SCOPES: &str = "afp_valid_scopes";
    pub const BLACKLIST_SCOPES: &str = "afp_blacklist_scopes";
    pub const USE_PROJECT_ROOT: &str = "afp_use_project_root";
    pub const PROJECT_ROOT: &str = "afp_proj_root";
    pub const SCOPES: &str = "afp_scopes";
    pub const INSERT_DIMENSIONS: &str = "afp_insert_dimensions";
    pub const INSERT_WIDTH_FIRST: &str = "afp_insert_width_first";
    pub const TEMPLATE_LANGUAGES: &str = "afp_template_languages";
    pub const MAXIMUM_WAIT_TIME: &str = "afp_maximum_wait_time";
}
