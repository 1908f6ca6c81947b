//! 設定の読み込みと解決
//!
//! 優先順位: ビュー上書き → スコープ別設定 → ユーザー設定 → 埋め込み既定値

use super::keys;
use crate::editor::adapter::EditorAdapter;
use crate::error::{ConfigError, FileError, Result};
use crate::resolve::expand::expand_full;
use crate::resolve::RewriteRule;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 埋め込みの既定設定
pub const DEFAULT_SETTINGS: &str = r#"{
    "afp_use_keybinding": false,
    "afp_valid_scopes": ["string", "source.css", "source.scss", "source.sass", "source.less"],
    "afp_blacklist_scopes": ["string.regexp", "comment"],
    "afp_use_project_root": false,
    "afp_proj_root": "<project_root>",
    "afp_insert_dimensions": true,
    "afp_insert_width_first": true,
    "afp_template_languages": false,
    "afp_maximum_wait_time": 0.3,
    "afp_scopes": [
        {
            "scope": "\\.css",
            "prefixes": ["url", "import"]
        },
        {
            "scope": "source\\.(js|ts|jsx|tsx)",
            "prefixes": ["require", "import", "from", "define"]
        },
        {
            "scope": "text\\.html",
            "prefixes": ["src", "href", "data", "poster"]
        }
    ]
}"#;

/// 補完の待ち時間の既定値
pub const DEFAULT_WAIT_TIME: Duration = Duration::from_millis(300);

/// スコープ別設定（`afp_scopes` の1要素）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScopeSettings {
    /// スコープ名に対して検索する正規表現
    pub scope: String,
    /// 許可する prefix（未指定・空なら制限なし）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefixes: Option<Vec<String>>,
    #[serde(default)]
    pub aliases: Vec<RewriteRule>,
    #[serde(default)]
    pub replace_on_insert: Vec<RewriteRule>,
    /// その他のキー（通常の設定を上書きする）
    #[serde(flatten)]
    pub overrides: Map<String, Value>,
}

impl ScopeSettings {
    pub fn new(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            ..Self::default()
        }
    }

    /// prefix が許可されているか（空の prefix・空の一覧は常に許可）
    pub fn allows_prefix(&self, prefix: Option<&str>) -> bool {
        match (&self.prefixes, prefix) {
            (Some(prefixes), Some(prefix)) if !prefixes.is_empty() && !prefix.is_empty() => {
                prefixes.iter().any(|allowed| allowed == prefix)
            }
            _ => true,
        }
    }
}

/// 設定値の出所
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingSource {
    View,
    Scope,
    Global,
    Default,
}

/// グローバル設定
#[derive(Debug, Clone)]
pub struct Settings {
    user: Map<String, Value>,
    defaults: Map<String, Value>,
    scopes: Vec<ScopeSettings>,
    /// `scopes` と同じ順のコンパイル済みパターン（不正なものは `None`）
    scope_patterns: Vec<Option<Regex>>,
}

impl Settings {
    /// 既定値のみの設定
    pub fn new() -> Self {
        // 埋め込み文書は常に正しい JSON オブジェクト
        let defaults = match serde_json::from_str::<Value>(DEFAULT_SETTINGS) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        let mut settings = Self {
            user: Map::new(),
            defaults,
            scopes: Vec::new(),
            scope_patterns: Vec::new(),
        };
        settings.refresh_scopes();
        settings
    }

    /// JSON 文字列からユーザー設定を構築
    pub fn from_json_str(document: &str) -> Result<Self> {
        let user = match serde_json::from_str::<Value>(document)? {
            Value::Object(map) => map,
            other => {
                return Err(ConfigError::Malformed(format!(
                    "expected a JSON object, found {}",
                    json_kind(&other)
                ))
                .into())
            }
        };

        if let Some(scopes) = user.get(keys::SCOPES) {
            serde_json::from_value::<Vec<ScopeSettings>>(scopes.clone()).map_err(|err| {
                ConfigError::InvalidValue {
                    key: keys::SCOPES.to_string(),
                    value: err.to_string(),
                }
            })?;
        }

        let mut settings = Self::new();
        settings.user = user;
        settings.refresh_scopes();
        Ok(settings)
    }

    /// 設定ファイルを読み込む
    pub fn load(path: &Path) -> Result<Self> {
        let document =
            std::fs::read_to_string(path).map_err(|err| FileError::from_io(&err, path))?;
        Self::from_json_str(&document).map_err(|err| {
            ConfigError::InvalidFile {
                path: path.display().to_string(),
                message: err.to_string(),
            }
            .into()
        })
    }

    /// 設定ファイルを読み込み、失敗したら既定値を使う
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let path = match path.map(Path::to_path_buf).or_else(Self::default_path) {
            Some(path) => path,
            None => return Self::new(),
        };

        if !path.exists() {
            log::debug!("no settings file at {}", path.display());
            return Self::new();
        }

        match Self::load(&path) {
            Ok(settings) => {
                log::info!("loaded settings from {}", path.display());
                settings
            }
            Err(err) => {
                log::warn!("falling back to default settings: {}", err);
                Self::new()
            }
        }
    }

    /// ユーザー設定ファイルの既定の場所
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("autopath").join("settings.json"))
    }

    /// ユーザー設定を変更
    pub fn set(&mut self, key: &str, value: Value) {
        self.user.insert(key.to_string(), value);
        if key == keys::SCOPES {
            self.refresh_scopes();
        }
    }

    /// グローバル（ユーザー → 既定値）の値
    pub fn global(&self, key: &str) -> Option<(SettingSource, &Value)> {
        self.user
            .get(key)
            .map(|value| (SettingSource::Global, value))
            .or_else(|| self.defaults.get(key).map(|value| (SettingSource::Default, value)))
    }

    /// スコープ別設定の一覧
    pub fn scopes(&self) -> &[ScopeSettings] {
        &self.scopes
    }

    /// スコープ名に最初に一致したスコープ別設定
    pub fn scope_settings_for(&self, scope_name: &str) -> Option<&ScopeSettings> {
        self.scopes
            .iter()
            .zip(&self.scope_patterns)
            .find(|(_, pattern)| matches!(pattern, Some(regex) if regex.is_match(scope_name)))
            .map(|(scope, _)| scope)
    }

    /// ビューとスコープを加味した解決器
    pub fn resolver<'a>(
        &'a self,
        view: Option<&'a dyn EditorAdapter>,
        scope: Option<&'a ScopeSettings>,
    ) -> SettingsResolver<'a> {
        SettingsResolver {
            settings: self,
            view,
            scope,
        }
    }

    fn refresh_scopes(&mut self) {
        let value = self.global(keys::SCOPES).map(|(_, value)| value.clone());
        self.scopes = match value.map(serde_json::from_value::<Vec<ScopeSettings>>) {
            Some(Ok(scopes)) => scopes,
            Some(Err(err)) => {
                log::warn!("invalid {}: {}", keys::SCOPES, err);
                Vec::new()
            }
            None => Vec::new(),
        };
        self.scope_patterns = self
            .scopes
            .iter()
            .map(|scope| match Regex::new(&scope.scope) {
                Ok(regex) => Some(regex),
                Err(err) => {
                    log::warn!("ignoring scope settings {:?}: {}", scope.scope, err);
                    None
                }
            })
            .collect();
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// 設定値の解決器
pub struct SettingsResolver<'a> {
    settings: &'a Settings,
    view: Option<&'a dyn EditorAdapter>,
    scope: Option<&'a ScopeSettings>,
}

impl<'a> SettingsResolver<'a> {
    /// 値と出所を解決
    pub fn resolve(&self, key: &str) -> Option<(SettingSource, Value)> {
        if let Some(value) = self.view.and_then(|view| view.setting(key)) {
            return Some((SettingSource::View, value));
        }
        if let Some(value) = self.scope.and_then(|scope| scope.overrides.get(key)) {
            return Some((SettingSource::Scope, value.clone()));
        }
        self.settings
            .global(key)
            .map(|(source, value)| (source, value.clone()))
    }

    pub fn value(&self, key: &str) -> Option<Value> {
        self.resolve(key).map(|(_, value)| value)
    }

    /// 型付きで取得（型が合わない値は無視する）
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let (source, value) = self.resolve(key)?;
        match serde_json::from_value(value) {
            Ok(typed) => Some(typed),
            Err(err) => {
                log::warn!("ignoring {:?} setting {}: {}", source, key, err);
                None
            }
        }
    }

    /// 真偽値設定（未設定・型違いは false）
    pub fn flag(&self, key: &str) -> bool {
        self.get::<bool>(key).unwrap_or(false)
    }

    pub fn use_keybinding(&self) -> bool {
        self.flag(keys::USE_KEYBINDING)
    }

    pub fn valid_scopes(&self) -> Vec<String> {
        self.get(keys::VALID_SCOPES).unwrap_or_default()
    }

    pub fn blacklist_scopes(&self) -> Vec<String> {
        self.get(keys::BLACKLIST_SCOPES).unwrap_or_default()
    }

    pub fn use_project_root(&self) -> bool {
        self.flag(keys::USE_PROJECT_ROOT)
    }

    /// プロジェクトルートのテンプレート（`~` と環境変数は展開済み）
    pub fn project_root_template(&self) -> Option<String> {
        self.get::<String>(keys::PROJECT_ROOT)
            .filter(|template| !template.is_empty())
            .map(|template| expand_full(&template))
    }

    pub fn insert_dimensions(&self) -> bool {
        self.flag(keys::INSERT_DIMENSIONS)
    }

    pub fn insert_width_first(&self) -> bool {
        self.flag(keys::INSERT_WIDTH_FIRST)
    }

    pub fn template_languages(&self) -> bool {
        self.flag(keys::TEMPLATE_LANGUAGES)
    }

    /// 補完一覧の時間予算
    pub fn time_budget(&self) -> Duration {
        let seconds = match self.get::<f64>(keys::MAXIMUM_WAIT_TIME) {
            Some(seconds) => seconds,
            None => return DEFAULT_WAIT_TIME,
        };
        match Duration::try_from_secs_f64(seconds) {
            Ok(budget) => budget,
            Err(_) => {
                log::warn!("invalid {}: {}", keys::MAXIMUM_WAIT_TIME, seconds);
                DEFAULT_WAIT_TIME
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::memory::MemoryView;
    use serde_json::json;

    #[test]
    fn defaults_are_embedded() {
        let settings = Settings::new();
        let resolver = settings.resolver(None, None);

        assert!(!resolver.use_keybinding());
        assert!(resolver.insert_dimensions());
        assert!(resolver.insert_width_first());
        assert_eq!(resolver.time_budget(), Duration::from_millis(300));
        assert!(resolver.valid_scopes().contains(&"string".to_string()));
        assert_eq!(settings.scopes().len(), 3);
    }

    #[test]
    fn scope_lookup_first_match_wins() {
        let settings = Settings::new();
        let scope = settings
            .scope_settings_for("source.tsx meta.import string.quoted.double.tsx")
            .unwrap();
        assert!(scope.allows_prefix(Some("import")));
        assert!(!scope.allows_prefix(Some("url")));
        assert!(scope.allows_prefix(None));
        assert!(scope.allows_prefix(Some("")));

        assert!(settings.scope_settings_for("source.python string").is_none());
    }

    #[test]
    fn empty_prefix_list_is_unrestricted() {
        let scope = ScopeSettings {
            prefixes: Some(vec![]),
            ..ScopeSettings::new("source\\.js")
        };
        assert!(scope.allows_prefix(Some("require")));
        assert!(scope.allows_prefix(None));
    }

    #[test]
    fn invalid_scope_pattern_is_skipped() {
        let mut settings = Settings::new();
        settings.set(
            keys::SCOPES,
            json!([{ "scope": "source\\.(js" }, { "scope": "source\\.js", "prefixes": ["require"] }]),
        );
        let scope = settings.scope_settings_for("source.js string").unwrap();
        assert_eq!(scope.scope, "source\\.js");

        settings.set(keys::SCOPES, json!([{ "scope": "text\\.html" }]));
        assert!(settings.scope_settings_for("source.js string").is_none());
        assert!(settings.scope_settings_for("text.html.basic").is_some());
    }

    #[test]
    fn user_document_overrides_defaults() {
        let settings = Settings::from_json_str(
            r#"{
                "afp_use_keybinding": true,
                "afp_maximum_wait_time": 0.05,
                "afp_scopes": [
                    {"scope": "source\\.js", "aliases": [["^@/", "<project_root>/src/"]]}
                ]
            }"#,
        )
        .unwrap();

        let resolver = settings.resolver(None, None);
        assert!(resolver.use_keybinding());
        assert_eq!(resolver.time_budget(), Duration::from_millis(50));
        assert_eq!(
            resolver.resolve(keys::INSERT_DIMENSIONS).map(|(source, _)| source),
            Some(SettingSource::Default)
        );

        let scope = settings.scope_settings_for("source.js string").unwrap();
        assert_eq!(scope.prefixes, None);
        assert_eq!(
            scope.aliases,
            vec![("^@/".to_string(), "<project_root>/src/".to_string())]
        );
    }

    #[test]
    fn priority_chain_view_scope_global() {
        let mut settings = Settings::new();
        settings.set(keys::INSERT_WIDTH_FIRST, json!(true));

        let mut scope = ScopeSettings::new("text\\.html");
        scope
            .overrides
            .insert(keys::INSERT_WIDTH_FIRST.to_string(), json!(false));

        let resolver = settings.resolver(None, Some(&scope));
        assert_eq!(
            resolver.resolve(keys::INSERT_WIDTH_FIRST),
            Some((SettingSource::Scope, json!(false)))
        );

        let view = MemoryView::new("").with_setting(keys::INSERT_WIDTH_FIRST, json!(true));
        let resolver = settings.resolver(Some(&view as &dyn EditorAdapter), Some(&scope));
        assert_eq!(
            resolver.resolve(keys::INSERT_WIDTH_FIRST).map(|(source, _)| source),
            Some(SettingSource::View)
        );
        assert!(resolver.insert_width_first());
    }

    #[test]
    fn view_false_still_wins() {
        let settings = Settings::new();
        let view = MemoryView::new("").with_setting(keys::INSERT_DIMENSIONS, json!(false));
        assert!(!settings.resolver(Some(&view as &dyn EditorAdapter), None).insert_dimensions());
    }

    #[test]
    fn malformed_values_fall_back() {
        let mut settings = Settings::new();
        settings.set(keys::MAXIMUM_WAIT_TIME, json!(-1.0));
        assert_eq!(settings.resolver(None, None).time_budget(), DEFAULT_WAIT_TIME);

        settings.set(keys::MAXIMUM_WAIT_TIME, json!("soon"));
        assert_eq!(settings.resolver(None, None).time_budget(), DEFAULT_WAIT_TIME);

        settings.set(keys::USE_KEYBINDING, json!("yes"));
        assert!(!settings.resolver(None, None).use_keybinding());
    }

    #[test]
    fn invalid_documents_are_rejected() {
        assert!(Settings::from_json_str("[1, 2]").is_err());
        assert!(Settings::from_json_str("{").is_err());
        assert!(Settings::from_json_str(r#"{"afp_scopes": [{"prefixes": []}]}"#).is_err());
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"afp_use_project_root": true}"#).unwrap();

        let settings = Settings::load(&path).unwrap();
        assert!(settings.resolver(None, None).use_project_root());

        let missing = dir.path().join("missing.json");
        assert!(Settings::load(&missing).is_err());
        assert_eq!(Settings::load_or_default(Some(missing.as_path())).scopes().len(), 3);
    }

    #[test]
    fn project_root_template_is_expanded() {
        std::env::set_var("AUTOPATH_TEST_WEBROOT", "/srv/www");
        let mut settings = Settings::new();
        settings.set(keys::PROJECT_ROOT, json!("$AUTOPATH_TEST_WEBROOT/public"));
        assert_eq!(
            settings.resolver(None, None).project_root_template().as_deref(),
            Some("/srv/www/public")
        );
    }
}
