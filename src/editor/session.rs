//! ビューごとの補完セッション

use super::adapter::ViewId;
use std::collections::HashMap;
use std::path::PathBuf;

/// 補完セッションの状態
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    /// 外部パッケージから強制的に有効化されている
    pub is_forced: bool,
    /// `show_filenames` などで一時的に有効化されている
    pub is_active: bool,
    /// 現在のパス区切り文字
    pub separator: char,
    /// ドライブ一覧を表示中
    pub showing_drive_list: bool,
    /// 直近に一覧したディレクトリ（寸法挿入で使う）
    pub last_directory: Option<PathBuf>,
}

impl SessionState {
    pub fn new(is_forced: bool) -> Self {
        Self {
            is_forced,
            is_active: false,
            separator: '/',
            showing_drive_list: false,
            last_directory: None,
        }
    }

    /// ビューの再アクティブ化時の初期化（強制フラグは維持）
    pub fn reset(&mut self) {
        *self = Self {
            last_directory: self.last_directory.take(),
            ..Self::new(self.is_forced)
        };
    }

    /// 補完を行ってよい状態か
    pub fn is_enabled(&self) -> bool {
        self.is_forced || self.is_active
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(false)
    }
}

/// セッションの登録簿
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<ViewId, SessionState>,
    forced: bool,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// セッションを取得（なければ作成）
    pub fn attach(&mut self, id: ViewId) -> &mut SessionState {
        let forced = self.forced;
        self.sessions
            .entry(id)
            .or_insert_with(|| SessionState::new(forced))
    }

    pub fn get(&self, id: ViewId) -> Option<&SessionState> {
        self.sessions.get(&id)
    }

    pub fn get_mut(&mut self, id: ViewId) -> Option<&mut SessionState> {
        self.sessions.get_mut(&id)
    }

    /// ビューを閉じたときにセッションを破棄
    pub fn detach(&mut self, id: ViewId) -> Option<SessionState> {
        self.sessions.remove(&id)
    }

    /// 全セッションの強制フラグを設定（以降に作るセッションにも適用）
    pub fn set_forced(&mut self, forced: bool) {
        self.forced = forced;
        for session in self.sessions.values_mut() {
            session.is_forced = forced;
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
