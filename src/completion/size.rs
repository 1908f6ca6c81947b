//! ファイルサイズの表示

const UNITS: [&str; 8] = ["KiB", "MiB", "GiB", "TiB", "PiB", "EiB", "ZiB", "YiB"];

/// 二進接頭辞でのサイズ表記（`1 Byte` `532 Bytes` `1.2 KiB` …）
pub fn natural_size(bytes: u64) -> String {
    match bytes {
        1 => return "1 Byte".to_string(),
        0..=1023 => return format!("{} Bytes", bytes),
        _ => {}
    }

    let bytes = bytes as f64;
    let mut unit = 1024.0_f64;
    for suffix in UNITS {
        let next = unit * 1024.0;
        if bytes < next {
            return format!("{:.1} {}", bytes / unit, suffix);
        }
        unit = next;
    }
    format!("{:.1} {}", bytes / (unit / 1024.0), UNITS[UNITS.len() - 1])
}
