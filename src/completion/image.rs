//! 画像の寸法取得
//!
//! 画像ヘッダの解析は `ImageDecoder` 越しに行う。既定実装は `imagesize` を使う。

use crate::error::{FileError, ImageDecodeError, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// 寸法を表示する画像の拡張子
pub const IMAGE_EXTENSIONS: [&str; 4] = ["gif", "jpeg", "jpg", "png"];

/// PNG / GIF の寸法はこのバイト数までに収まる
const HEADER_LEN: u64 = 24;

/// 画像の寸法
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDimensions {
    pub width: usize,
    pub height: usize,
}

/// 画像ヘッダのデコーダ
pub trait ImageDecoder {
    fn decode(&self, header: &[u8]) -> std::result::Result<ImageDimensions, ImageDecodeError>;
}

/// `imagesize` によるデコーダ
#[derive(Debug, Default, Clone, Copy)]
pub struct HeaderDecoder;

impl ImageDecoder for HeaderDecoder {
    fn decode(&self, header: &[u8]) -> std::result::Result<ImageDimensions, ImageDecodeError> {
        match imagesize::blob_size(header) {
            Ok(size) => Ok(ImageDimensions {
                width: size.width,
                height: size.height,
            }),
            Err(imagesize::ImageError::IoError(_)) => Err(ImageDecodeError::Truncated),
            Err(_) => Err(ImageDecodeError::UnrecognizedHeader),
        }
    }
}

fn extension(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
}

/// 画像として扱うファイル名か（拡張子の大文字小文字は区別しない）
pub fn is_image_name(name: &str) -> bool {
    extension(name).map_or(false, |ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

fn is_jpeg_name(name: &str) -> bool {
    matches!(extension(name).as_deref(), Some("jpg" | "jpeg"))
}

/// 寸法の解析に必要なバイト列を読む（JPEG はファイル全体、その他は先頭 24 バイト）
pub fn read_header(path: &Path) -> Result<Vec<u8>> {
    let name = path.to_string_lossy();
    let mut file = File::open(path).map_err(|err| FileError::from_io(&err, path))?;

    let mut bytes = Vec::new();
    let read = if is_jpeg_name(&name) {
        file.read_to_end(&mut bytes)
    } else {
        file.take(HEADER_LEN).read_to_end(&mut bytes)
    };
    read.map_err(|err| FileError::from_io(&err, path))?;
    Ok(bytes)
}

/// ファイルから寸法を取得
pub fn read_dimensions(decoder: &dyn ImageDecoder, path: &Path) -> Result<ImageDimensions> {
    let header = read_header(path)?;
    Ok(decoder.decode(&header)?)
}
