//! プラットフォーム依存処理
//!
//! Windows の論理ドライブ列挙と、パス解決で参照するプラットフォーム種別。

/// パス解決の対象プラットフォーム
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Unix,
}

impl Platform {
    /// 実行中のプラットフォーム
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Unix
        }
    }

    pub fn is_windows(self) -> bool {
        self == Platform::Windows
    }

    /// `os.path.isabs` 相当の絶対パス判定（文字列ベース）
    pub fn is_absolute(self, path: &str) -> bool {
        match self {
            Platform::Unix => path.starts_with('/'),
            Platform::Windows => {
                if path.starts_with(['/', '\\']) {
                    return true;
                }
                let mut chars = path.chars();
                matches!(
                    (chars.next(), chars.next(), chars.next()),
                    (Some(drive), Some(':'), Some('/' | '\\')) if drive.is_ascii_alphabetic()
                )
            }
        }
    }
}

/// 論理ドライブの提供元
pub trait DriveProvider {
    /// 利用可能なドライブ文字（A から順）
    fn logical_drive_letters(&self) -> Vec<char>;
}

/// OS から論理ドライブを取得する実装（Windows 以外では常に空）
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemDrives;

impl DriveProvider for SystemDrives {
    #[cfg(windows)]
    fn logical_drive_letters(&self) -> Vec<char> {
        // SAFETY: GetLogicalDrives は引数を取らず、ビットマスクを返すだけ
        let mask = unsafe { kernel32::GetLogicalDrives() };
        letters_from_bitmask(mask)
    }

    #[cfg(not(windows))]
    fn logical_drive_letters(&self) -> Vec<char> {
        Vec::new()
    }
}

#[cfg(windows)]
mod kernel32 {
    #[link(name = "kernel32")]
    extern "system" {
        pub fn GetLogicalDrives() -> u32;
    }
}

/// ビットマスク（bit0 = A:）をドライブ文字に変換
pub fn letters_from_bitmask(mask: u32) -> Vec<char> {
    (0u8..26)
        .filter(|bit| mask & (1u32 << *bit) != 0)
        .map(|bit| char::from(b'A' + bit))
        .collect()
}

/// 固定のドライブ一覧を返す実装（テスト・埋め込み用）
#[derive(Debug, Clone, Default)]
pub struct FixedDrives {
    mask: u32,
}

impl FixedDrives {
    pub fn from_bitmask(mask: u32) -> Self {
        Self { mask }
    }
}

impl DriveProvider for FixedDrives {
    fn logical_drive_letters(&self) -> Vec<char> {
        letters_from_bitmask(self.mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bitmask_maps_to_letters() {
        // C: D: Z:
        let mask = (1 << 2) | (1 << 3) | (1 << 25);
        assert_eq!(letters_from_bitmask(mask), vec!['C', 'D', 'Z']);
        assert!(letters_from_bitmask(0).is_empty());
    }

    #[test]
    fn bits_above_z_are_ignored() {
        assert_eq!(letters_from_bitmask(1 | (1 << 30)), vec!['A']);
    }

    #[test]
    fn absolute_path_detection_per_platform() {
        assert!(Platform::Unix.is_absolute("/usr/lib/"));
        assert!(!Platform::Unix.is_absolute("C:\\Users\\"));
        assert!(!Platform::Unix.is_absolute("./src/"));

        assert!(Platform::Windows.is_absolute("C:\\Users\\"));
        assert!(Platform::Windows.is_absolute("d:/work/"));
        assert!(Platform::Windows.is_absolute("\\\\"));
        assert!(!Platform::Windows.is_absolute("C:"));
        assert!(!Platform::Windows.is_absolute("src\\"));
    }

    #[test]
    fn system_drives_are_empty_off_windows() {
        if !cfg!(windows) {
            assert!(SystemDrives.logical_drive_letters().is_empty());
        }
    }
}
