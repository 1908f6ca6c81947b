//! 補完に付随する編集コマンド

use super::adapter::{EditorAdapter, Region};
use crate::completion::image::{is_image_name, read_dimensions, ImageDecoder};
use crate::resolve::directory::entered_path;
use regex::Regex;
use std::path::PathBuf;

/// メインカーソルの位置
fn caret(view: &dyn EditorAdapter) -> Option<usize> {
    view.selections().first().map(|region| region.a)
}

/// カーソルがパス文字列の末尾にあるか
pub fn at_path_end(view: &dyn EditorAdapter) -> bool {
    let Some(selection) = view.selections().first().copied() else {
        return false;
    };
    let name = view.scope_name(selection.a);

    if selection.is_empty() && (name.contains("string.end") || name.contains("string.quoted.end.js")) {
        return true;
    }

    name.contains(".css") && view.char_at(selection.a) == Some(')')
}

/// ドライブ補完後の `/C:/` から先頭の `/`（`\\C:\` なら `\\`）を取り除く
pub fn delete_prefixed_slash(view: &mut dyn EditorAdapter) {
    let Some(selection) = caret(view) else {
        return;
    };
    if selection < 4 {
        return;
    }

    let doubled = selection >= 5 && view.substr(Region::new(selection - 5, selection - 3)) == "\\\\";
    let length = if doubled { 5 } else { 4 };
    view.erase(Region::new(selection - length, selection - 3));
}

/// パス中でのバックスペース: 1文字消して直前の区切り文字以降を選択する
pub fn reload_auto_complete(view: &mut dyn EditorAdapter, separator: char) {
    view.hide_auto_complete();
    view.left_delete();

    let Some(selection) = caret(view) else {
        return;
    };
    let scope = view.extract_scope(selection.saturating_sub(1));
    let scope_text: Vec<char> = view.substr(scope).chars().collect();
    let upto = selection.saturating_sub(scope.begin()).min(scope_text.len());

    let slash_pos = scope_text[..upto]
        .iter()
        .rposition(|&ch| ch == separator)
        .unwrap_or(0);
    view.add_selection(Region::new(scope.begin() + slash_pos + 1, selection));
}

/// `img` タグを含む範囲か（テンプレート言語の `img ...` 形式も含む）
pub fn is_img_tag(text: &str) -> bool {
    text.trim().starts_with("img") || text.contains("<img")
}

/// 寸法挿入の入力
#[derive(Debug, Clone)]
pub struct DimensionRequest {
    /// 直近に一覧したディレクトリ
    pub directory: Option<PathBuf>,
    pub separator: char,
    /// タグ範囲として現在行を使う
    pub template_languages: bool,
    /// width を先に並べる
    pub width_first: bool,
}

/// 属性値 `name="123` の位置（`"` から数字の終わりまで、文字オフセット）
fn attribute_value(tag_text: &str, name: &str) -> Option<(usize, usize)> {
    let pattern = format!(r#"{}=(\s*"\d{{1,5}})"#, regex::escape(name));
    let regex = Regex::new(&pattern).ok()?;
    let value = regex.captures(tag_text)?.get(1)?;
    let start = tag_text[..value.start()].chars().count();
    Some((start, start + value.as_str().chars().count()))
}

/// 寸法属性を1つ書き込み、編集後のタグ範囲を返す
pub fn insert_dimension(view: &mut dyn EditorAdapter, value: usize, name: &str, tag: Region) -> Region {
    let tag_text = view.substr(tag);

    if tag_text.contains(name) {
        let Some((start, end)) = attribute_value(&tag_text, name) else {
            log::debug!("{} is present but has no numeric value", name);
            return tag;
        };
        let replacement = format!("\"{}", value);
        let replaced = replacement.chars().count();
        view.replace(Region::new(tag.begin() + start, tag.begin() + end), &replacement);
        return Region::new(tag.begin(), tag.end() + replaced - (end - start));
    }

    let Some(selection) = caret(view) else {
        return tag;
    };
    let point = selection + 1;
    let inserted = view.insert(point, &format!(" {}=\"{}\"", name, value));
    if point <= tag.end() {
        Region::new(tag.begin(), tag.end() + inserted)
    } else {
        tag
    }
}

/// 補完を確定し、`<img>` タグに画像の width / height を書き込む
///
/// 書き込んだら `true`。
pub fn insert_dimensions(
    view: &mut dyn EditorAdapter,
    request: &DimensionRequest,
    decoder: &dyn ImageDecoder,
) -> bool {
    view.commit_completion();

    let Some(selection) = caret(view) else {
        return false;
    };
    if !view.scope_name(selection).contains("html") {
        return false;
    }

    let scope = view.extract_scope(selection.saturating_sub(1));
    let tag = if request.template_languages {
        view.line(selection)
    } else {
        view.extract_scope(scope.begin().saturating_sub(1))
    };

    let path = entered_path(&view.substr(scope));
    let name = match path.rfind(request.separator) {
        Some(index) => &path[index + request.separator.len_utf8()..],
        None => path.as_str(),
    };

    if !is_img_tag(&view.substr(tag)) || !is_image_name(name) {
        return false;
    }

    let Some(directory) = &request.directory else {
        log::debug!("no listed directory for {:?}", name);
        return false;
    };

    let dimensions = match read_dimensions(decoder, &directory.join(name)) {
        Ok(dimensions) => dimensions,
        Err(err) => {
            log::debug!("cannot insert dimensions for {}: {}", name, err);
            return false;
        }
    };

    // 同じ位置に挿入するため、先に挿入した属性が後ろに並ぶ
    let order = if request.width_first {
        [("height", dimensions.height), ("width", dimensions.width)]
    } else {
        [("width", dimensions.width), ("height", dimensions.height)]
    };

    let mut tag = tag;
    for (name, value) in order {
        tag = insert_dimension(view, value, name, tag);
    }
    true
}
