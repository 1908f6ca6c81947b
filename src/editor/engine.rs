//! 補完エンジン
//!
//! エディタのイベント（補完要求・変更・選択変更・コンテキスト問い合わせ）を受け、
//! 文脈解析 → パス解決 → 候補生成 を行う。ビューごとの状態は `SessionRegistry` に持つ。

use super::adapter::{EditorAdapter, Region, ViewId};
use super::commands::{self, DimensionRequest};
use super::session::{SessionRegistry, SessionState};
use crate::completion::{CompletionBuilder, CompletionList, HeaderDecoder, ImageDecoder};
use crate::config::{keys, selector, Settings};
use crate::context::{extract, LineContext};
use crate::platform::{DriveProvider, Platform, SystemDrives};
use crate::resolve::directory::{entered_path, infer_separator, resolve, Resolution, ResolveRequest};
use std::time::Instant;

/// コンテキストキー: パス末尾で区切り文字を消そうとしている
pub const DELETING_SLASH_CONTEXT: &str = "afp_deleting_slash";

/// パス補完エンジン
pub struct PathCompleter {
    settings: Settings,
    sessions: SessionRegistry,
    platform: Platform,
    drives: Box<dyn DriveProvider>,
    images: Box<dyn ImageDecoder>,
}

impl PathCompleter {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            sessions: SessionRegistry::new(),
            platform: Platform::current(),
            drives: Box::new(SystemDrives),
            images: Box::new(HeaderDecoder),
        }
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_drives(mut self, drives: impl DriveProvider + 'static) -> Self {
        self.drives = Box::new(drives);
        self
    }

    pub fn with_image_decoder(mut self, images: impl ImageDecoder + 'static) -> Self {
        self.images = Box::new(images);
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn session(&self, id: ViewId) -> Option<&SessionState> {
        self.sessions.get(id)
    }

    /// 外部パッケージ向け: 全ビューで補完を強制的に有効化
    pub fn enable_autocomplete(&mut self) {
        self.sessions.set_forced(true);
    }

    pub fn disable_autocomplete(&mut self) {
        self.sessions.set_forced(false);
    }

    /// ビューがアクティブになった
    pub fn on_activated(&mut self, view: &dyn EditorAdapter) {
        self.sessions.attach(view.id()).reset();
    }

    /// ビューが閉じられた
    pub fn on_close(&mut self, view: &dyn EditorAdapter) {
        self.sessions.detach(view.id());
    }

    /// 補完要求
    ///
    /// 補完対象外の位置では `None`。対象だが候補がない場合は空の一覧を返す。
    pub fn on_query_completions(&mut self, view: &dyn EditorAdapter) -> Option<CompletionList> {
        let started_at = Instant::now();
        let caret = view.selections().first()?.a;

        let resolver = self.settings.resolver(Some(view), None);
        let keybinding_only = resolver.use_keybinding();
        let valid_scopes = resolver.valid_scopes();
        let blacklist = resolver.blacklist_scopes();

        if keybinding_only && !self.sessions.attach(view.id()).is_enabled() {
            return None;
        }

        let matches = |selectors: &[String]| {
            selectors
                .iter()
                .any(|selector| view.match_selector(caret, selector))
        };
        if !matches(&valid_scopes) || matches(&blacklist) {
            log::trace!("caret scope {:?} is not completed", view.scope_name(caret));
            return None;
        }

        Some(self.complete(view, caret, started_at))
    }

    fn complete(&mut self, view: &dyn EditorAdapter, caret: usize, started_at: Instant) -> CompletionList {
        let parsed = extract(&LineContext::capture(view, caret));
        if !parsed.is_valid {
            return CompletionList::empty();
        }

        let scope = self.settings.scope_settings_for(&view.scope_name(caret));
        if let Some(scope) = scope {
            if !scope.allows_prefix(parsed.prefix()) {
                log::debug!("prefix {:?} is not enabled for {}", parsed.prefix(), scope.scope);
                return CompletionList::empty();
            }
        }

        let resolver = self.settings.resolver(Some(view), scope);
        let scope_text = view.substr(view.extract_scope(caret.saturating_sub(1)));
        let separator = infer_separator(&scope_text);
        let entered = entered_path(&scope_text);
        let current_file = view.file_name();
        let folders = view.folders();
        let template = resolver.project_root_template();

        let request = ResolveRequest {
            entered_path: &entered,
            current_file: current_file.as_deref(),
            use_project_root: resolver.use_project_root(),
            project_root_template: template.as_deref(),
            project_folders: &folders,
            aliases: scope.map(|scope| scope.aliases.as_slice()).unwrap_or_default(),
            separator,
            platform: self.platform,
            scope_extent: view.extract_scope(caret).len(),
        };

        let builder = CompletionBuilder::new(self.images.as_ref())
            .with_separator(separator)
            .with_replacements(
                scope
                    .map(|scope| scope.replace_on_insert.as_slice())
                    .unwrap_or_default(),
            )
            .with_budget(resolver.time_budget())
            .started_at(started_at);

        let list = match resolve(&request) {
            Resolution::Directory(resolved) => {
                log::debug!("listing {}", resolved.absolute_dir.display());
                builder.build(&resolved.absolute_dir)
            }
            Resolution::DriveListing => builder.build_drives(&self.drives.logical_drive_letters()),
            Resolution::Nothing => CompletionList::empty(),
        };

        let session = self.sessions.attach(view.id());
        session.separator = separator;
        session.showing_drive_list = list.drives;
        if let Some(directory) = &list.directory {
            session.last_directory = Some(directory.clone());
        }
        list
    }

    /// テキスト変更: ドライブ補完の直後なら先頭の区切り文字を消す
    pub fn on_modified(&mut self, view: &mut dyn EditorAdapter) {
        let selections = view.selections();
        if selections.len() != 1 {
            return;
        }

        let caret = selections[0].a;
        let before: Vec<char> = view
            .substr(Region::new(caret.saturating_sub(4), caret))
            .chars()
            .collect();

        let session = self.sessions.attach(view.id());
        let completed_drive = matches!(
            before.as_slice(),
            ['/' | '\\', drive, ':', '/' | '\\'] if drive.is_ascii_alphabetic()
        );
        if session.showing_drive_list && completed_drive {
            session.showing_drive_list = false;
            commands::delete_prefixed_slash(view);
        }
    }

    /// 選択変更: 有効化中なら区切り文字の直後などで補完ポップアップを開く
    pub fn on_selection_modified(&mut self, view: &mut dyn EditorAdapter) {
        if !view.has_window() {
            return;
        }

        let session = self.sessions.attach(view.id());
        if !session.is_enabled() {
            return;
        }
        let Some(region) = view.selections().first().copied() else {
            return;
        };

        if !region.is_empty() {
            session.is_active = false;
            return;
        }

        let scope_text = view.substr(view.extract_scope(region.a.saturating_sub(1)));
        session.separator = infer_separator(&scope_text);

        let previous = region.a.checked_sub(1).and_then(|point| view.char_at(point));
        if previous == Some(session.separator)
            || view.extract_scope(region.a).len() < 3
            || view.file_name().is_none()
        {
            view.run_auto_complete();
        }
    }

    /// キーバインドのコンテキスト問い合わせ（未知のキーは `None`）
    pub fn on_query_context(&mut self, view: &dyn EditorAdapter, key: &str, operand: bool) -> Option<bool> {
        match key {
            DELETING_SLASH_CONTEXT => {
                let separator = self.sessions.attach(view.id()).separator;
                let valid = view.selections().first().map_or(false, |selection| {
                    selection.is_empty()
                        && commands::at_path_end(view)
                        && selection
                            .a
                            .checked_sub(1)
                            .and_then(|point| view.char_at(point))
                            == Some(separator)
                });
                Some(valid == operand)
            }
            keys::USE_KEYBINDING => {
                let enabled = self.settings.resolver(Some(view), None).use_keybinding();
                Some(enabled == operand)
            }
            _ => None,
        }
    }

    /// ファイル名補完を明示的に開く
    pub fn show_filenames(&mut self, view: &mut dyn EditorAdapter) {
        self.sessions.attach(view.id()).is_active = true;
        view.run_auto_complete();
    }

    /// パス中でのバックスペース
    pub fn reload_auto_complete(&mut self, view: &mut dyn EditorAdapter) {
        let separator = self.sessions.attach(view.id()).separator;
        commands::reload_auto_complete(view, separator);
    }

    pub fn delete_prefixed_slash(&mut self, view: &mut dyn EditorAdapter) {
        commands::delete_prefixed_slash(view);
    }

    /// 補完を確定し、画像の寸法を `<img>` タグへ書き込む
    ///
    /// `afp_insert_dimensions` が無効なら確定だけ行う。
    pub fn insert_dimensions(&mut self, view: &mut dyn EditorAdapter) -> bool {
        let (enabled, template_languages, width_first) = {
            let resolver = self.settings.resolver(Some(&*view), None);
            (
                resolver.insert_dimensions(),
                resolver.template_languages(),
                resolver.insert_width_first(),
            )
        };
        if !enabled {
            view.commit_completion();
            return false;
        }

        let session = self.sessions.attach(view.id());
        let request = DimensionRequest {
            directory: session.last_directory.clone(),
            separator: session.separator,
            template_languages,
            width_first,
        };
        commands::insert_dimensions(view, &request, self.images.as_ref())
    }

    /// 有効スコープ判定（ホストがイベントを絞り込むため）
    pub fn is_completable_scope(&self, scope_name: &str) -> bool {
        let resolver = self.settings.resolver(None, None);
        selector::matches_any(&resolver.valid_scopes(), scope_name)
            && !selector::matches_any(&resolver.blacklist_scopes(), scope_name)
    }
}
