use std::env;
use std::error::Error;
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};

use crate::color::Color;
use crate::platform::Platform;

/// Defaults shipped with the application.
pub const BUNDLED_DEFAULTS: &str = include_str!("../assets/preferences.txt");

/// Overrides the settings directory resolved by [`DesktopEnvironment::detect`].
pub const SETTINGS_DIR_ENV: &str = "SKETCHPAD_SETTINGS_DIR";

const APP_DIR_NAME: &str = "sketchpad";

/// 偏好設定初始化所需的主機服務。 / Host services the preference store needs during initialization.
pub trait Environment {
    /// Absolute path of a writable file inside the settings directory.
    fn settings_file(&self, name: &str) -> PathBuf;

    /// Opens the packaged default preferences.
    fn open_defaults(&self) -> io::Result<Box<dyn Read + '_>>;

    fn platform(&self) -> Platform;

    /// Background color of system controls, used for the run window.
    fn control_color(&self) -> Color;
}

/// 向使用者回報錯誤與警告。 / Surfaces load/save failures to the user.
pub trait Reporter {
    fn show_error(&self, title: &str, message: &str, cause: Option<&dyn Error>);
    fn show_warning(&self, title: &str, message: &str, cause: Option<&dyn Error>);
}

/// Reporter that only writes to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn show_error(&self, title: &str, message: &str, cause: Option<&dyn Error>) {
        match cause {
            Some(cause) => tracing::error!(%title, cause = %cause, "{message}"),
            None => tracing::error!(%title, "{message}"),
        }
    }

    fn show_warning(&self, title: &str, message: &str, cause: Option<&dyn Error>) {
        match cause {
            Some(cause) => tracing::warn!(%title, cause = %cause, "{message}"),
            None => tracing::warn!(%title, "{message}"),
        }
    }
}

/// 桌面環境：設定目錄與內建預設值。 / Production environment backed by the user's config directory.
#[derive(Debug, Clone)]
pub struct DesktopEnvironment {
    settings_dir: PathBuf,
    platform: Platform,
}

impl DesktopEnvironment {
    /// Resolves the settings directory from `SKETCHPAD_SETTINGS_DIR`, then the
    /// platform config directory, then the working directory.
    pub fn detect() -> Self {
        let settings_dir = env::var_os(SETTINGS_DIR_ENV)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                dirs::config_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(APP_DIR_NAME)
            });
        Self::with_settings_dir(settings_dir)
    }

    pub fn with_settings_dir(settings_dir: impl Into<PathBuf>) -> Self {
        Self {
            settings_dir: settings_dir.into(),
            platform: Platform::current(),
        }
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn settings_dir(&self) -> &Path {
        &self.settings_dir
    }
}

impl Environment for DesktopEnvironment {
    fn settings_file(&self, name: &str) -> PathBuf {
        self.settings_dir.join(name)
    }

    fn open_defaults(&self) -> io::Result<Box<dyn Read + '_>> {
        Ok(Box::new(Cursor::new(BUNDLED_DEFAULTS.as_bytes())))
    }

    fn platform(&self) -> Platform {
        self.platform
    }

    fn control_color(&self) -> Color {
        match self.platform {
            Platform::Windows => Color::new(0xf0, 0xf0, 0xf0),
            Platform::MacOs9 | Platform::MacOsX => Color::new(0xec, 0xec, 0xec),
            Platform::Linux => Color::new(0xef, 0xef, 0xef),
            Platform::Other => Color::new(0xd4, 0xd0, 0xc8),
        }
    }
}
