//! パス展開ユーティリティ
//!
//! 入力パスの `~` と環境変数を展開する。展開できない場合は入力をそのまま返す。

use std::borrow::Cow;

/// チルダ展開（`~` / `~/...`）
pub fn expand_tilde(path: &str) -> Cow<'_, str> {
    if path == "~" || path.starts_with("~/") || path.starts_with("~\\") {
        shellexpand::tilde(path)
    } else {
        Cow::Borrowed(path)
    }
}

/// 環境変数展開
pub fn expand_env_vars(path: &str) -> Cow<'_, str> {
    if !path.contains('$') {
        return Cow::Borrowed(path);
    }
    match shellexpand::env(path) {
        Ok(expanded) => expanded,
        Err(err) => {
            log::debug!("environment expansion failed for {:?}: {}", path, err);
            Cow::Borrowed(path)
        }
    }
}

/// 完全なパス展開（チルダ → 環境変数）
pub fn expand_full(path: &str) -> String {
    let tilde_expanded = expand_tilde(path);
    expand_env_vars(&tilde_expanded).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_tilde() {
        if let Some(home) = dirs::home_dir() {
            let expanded = expand_tilde("~/notes/");
            assert!(expanded.starts_with(&*home.to_string_lossy()));
            assert!(expanded.ends_with("notes/"));
        }
        assert_eq!(expand_tilde("./~/x"), "./~/x");
        assert_eq!(expand_tilde("~user/x"), "~user/x");
    }

    #[test]
    fn test_expand_env_vars() {
        std::env::set_var("AUTOPATH_TEST_ROOT", "/srv/site");
        assert_eq!(expand_env_vars("$AUTOPATH_TEST_ROOT/www"), "/srv/site/www");
        assert_eq!(expand_env_vars("plain/path"), "plain/path");
        // 未定義の変数は展開せずに残す
        assert_eq!(
            expand_env_vars("$AUTOPATH_SURELY_UNDEFINED_VAR/x"),
            "$AUTOPATH_SURELY_UNDEFINED_VAR/x"
        );
    }

    #[test]
    fn test_expand_full() {
        std::env::set_var("AUTOPATH_TEST_SUBDIR", "assets");
        let expanded = expand_full("static/$AUTOPATH_TEST_SUBDIR/");
        assert_eq!(expanded, "static/assets/");
    }
}
