//! スコープセレクタ
//!
//! `afp_valid_scopes` などで使うセレクタの簡易マッチャ。
//! `,` で区切った候補のどれかが一致すればよく、候補内の空白区切りの各要素は
//! スコープ名の要素へ順に（ドット境界で）前方一致しなければならない。

/// セレクタがスコープ名に一致するか
pub fn matches(selector: &str, scope_name: &str) -> bool {
    let components: Vec<&str> = scope_name.split_whitespace().collect();
    selector
        .split(',')
        .any(|alternative| alternative_matches(alternative, &components))
}

/// いずれかのセレクタが一致するか
pub fn matches_any<S: AsRef<str>>(selectors: &[S], scope_name: &str) -> bool {
    selectors
        .iter()
        .any(|selector| matches(selector.as_ref(), scope_name))
}

fn alternative_matches(alternative: &str, components: &[&str]) -> bool {
    let atoms: Vec<&str> = alternative.split_whitespace().collect();
    if atoms.is_empty() {
        return false;
    }

    let mut remaining = components.iter();
    atoms
        .iter()
        .all(|atom| remaining.any(|component| atom_matches(atom, component)))
}

fn atom_matches(atom: &str, component: &str) -> bool {
    match component.strip_prefix(atom) {
        Some(rest) => rest.is_empty() || rest.starts_with('.'),
        None => false,
    }
}
