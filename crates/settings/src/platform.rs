use std::fmt;

/// 預設值可依平台覆寫的主機平台。 / Host platforms that defaults can be overridden for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Other,
    Windows,
    MacOs9,
    MacOsX,
    Linux,
}

impl Platform {
    pub const ALL: [Platform; 5] = [
        Platform::Other,
        Platform::Windows,
        Platform::MacOs9,
        Platform::MacOsX,
        Platform::Linux,
    ];

    /// 目前編譯目標的平台。 / The platform this binary was built for.
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOsX
        } else if cfg!(target_os = "linux") {
            Platform::Linux
        } else {
            Platform::Other
        }
    }

    /// Suffix used by `key.<suffix>` entries in the bundled defaults.
    pub fn suffix(self) -> &'static str {
        match self {
            Platform::Other => "other",
            Platform::Windows => "windows",
            Platform::MacOs9 => "macos9",
            Platform::MacOsX => "macosx",
            Platform::Linux => "linux",
        }
    }

    pub fn from_suffix(suffix: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|platform| platform.suffix() == suffix)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffixes_round_trip() {
        for platform in Platform::ALL {
            assert_eq!(Platform::from_suffix(platform.suffix()), Some(platform));
        }
        assert_eq!(Platform::from_suffix("beos"), None);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn current_platform_on_linux() {
        assert_eq!(Platform::current(), Platform::Linux);
    }
}
