use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use encoding_rs::WINDOWS_1252;
use thiserror::Error;

use crate::color::Color;
use crate::environment::{Environment, Reporter};
use crate::font::{FontSpec, StyleParseError, SyntaxStyle};
use crate::keys;
use crate::platform::Platform;

#[derive(Debug, Error)]
pub enum PreferencesError {
    #[error("failed to read preferences {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read preferences: {0}")]
    Io(#[from] io::Error),
    #[error("failed to write preferences {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to prepare directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("preferences file location has not been resolved")]
    NoPath,
    #[error("expected an integer for '{key}', found {value:?}")]
    InvalidInteger { key: String, value: Option<String> },
    #[error("invalid font spec for '{key}': {value:?}")]
    InvalidFont { key: String, value: Option<String> },
    #[error("missing syntax style '{key}'")]
    MissingStyle { key: String },
    #[error("invalid syntax style '{key}' = {value:?}: {source}")]
    InvalidStyle {
        key: String,
        value: String,
        #[source]
        source: StyleParseError,
    },
}

impl PreferencesError {
    /// `true` for malformed values, `false` for I/O failures.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            PreferencesError::InvalidInteger { .. }
                | PreferencesError::InvalidFont { .. }
                | PreferencesError::MissingStyle { .. }
                | PreferencesError::InvalidStyle { .. }
        )
    }
}

/// 字串鍵值偏好設定，附帶預設值快照。 / String key/value preferences plus the defaults snapshot.
#[derive(Debug, Clone, Default)]
pub struct PreferencesStore {
    path: Option<PathBuf>,
    table: BTreeMap<String, String>,
    defaults: BTreeMap<String, String>,
}

impl PreferencesStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty store that saves to `path`.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// 啟動流程：預設值、平台覆寫、快照、使用者檔案。 / Startup sequence: defaults, platform overlay, snapshot, user file.
    ///
    /// Failures are reported through `reporter` and never abort; a store
    /// whose defaults could not be read is returned in a degraded state.
    pub fn initialize(env: &dyn Environment, reporter: &dyn Reporter) -> Self {
        let mut store = Self::new();

        let defaults = env
            .open_defaults()
            .map_err(PreferencesError::from)
            .and_then(|reader| store.load(reader));
        if let Err(err) = defaults {
            reporter.show_error(
                "Error",
                "Could not read default settings.\nYou'll need to reinstall Sketchpad.",
                Some(&err),
            );
        }

        store.apply_platform_overlay(env.platform());
        store.snapshot_defaults();

        // Theme dependent, so it cannot live in the bundled file.
        store.set_color(keys::RUN_WINDOW_BGCOLOR, env.control_color());

        let path = env.settings_file(keys::PREFERENCES_FILE);
        store.path = Some(path.clone());
        if !path.exists() {
            tracing::info!(path = %path.display(), "creating preferences file from defaults");
            store.save(reporter);
        } else if let Err(err) = store.load_file(&path) {
            reporter.show_error(
                "Error reading preferences",
                &format!(
                    "Error reading the preferences file. Please delete (or move)\n{} and restart Sketchpad.",
                    path.display()
                ),
                Some(&err),
            );
        }
        store
    }

    /// Parses `key=value` lines from `input` into the mapping. Later values
    /// replace earlier ones; lines without `=` are skipped.
    pub fn load(&mut self, input: impl Read) -> Result<(), PreferencesError> {
        self.read_lines(input)?;
        Ok(())
    }

    pub fn load_str(&mut self, contents: &str) {
        for line in contents.lines() {
            self.ingest_line(line);
        }
    }

    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<(), PreferencesError> {
        let path = path.as_ref();
        let read_error = |source| PreferencesError::Read {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(read_error)?;
        self.read_lines(file).map_err(read_error)
    }

    fn read_lines(&mut self, input: impl Read) -> io::Result<()> {
        let mut reader = BufReader::new(input);
        let mut raw = Vec::new();
        loop {
            raw.clear();
            if reader.read_until(b'\n', &mut raw)? == 0 {
                return Ok(());
            }
            let line = decode_line(&raw);
            self.ingest_line(line.trim_end_matches(['\n', '\r']));
        }
    }

    fn ingest_line(&mut self, line: &str) {
        if line.is_empty() || line.starts_with('#') {
            return;
        }
        if let Some((key, value)) = line.split_once('=') {
            self.table
                .insert(key.trim().to_string(), value.trim().to_string());
        }
    }

    /// Copies every `key.<platform>` entry over `key` for the given platform.
    pub fn apply_platform_overlay(&mut self, platform: Platform) {
        let suffix = format!(".{}", platform.suffix());
        let overrides: Vec<(String, String)> = self
            .table
            .iter()
            .filter_map(|(key, value)| {
                key.strip_suffix(suffix.as_str())
                    .map(|base| (base.to_string(), value.clone()))
            })
            .collect();
        for (key, value) in overrides {
            self.table.insert(key, value);
        }
    }

    /// Freezes the current mapping as the defaults used for fallbacks.
    pub fn snapshot_defaults(&mut self) {
        self.defaults = self.table.clone();
    }

    /// Best-effort save; failures are reported as a warning.
    pub fn save(&self, reporter: &dyn Reporter) {
        if let Err(err) = self.try_save() {
            reporter.show_warning(
                "Settings",
                "Error while saving the settings file",
                Some(&err),
            );
        }
    }

    pub fn try_save(&self) -> Result<(), PreferencesError> {
        let path = self.path.as_deref().ok_or(PreferencesError::NoPath)?;
        write_replacing(path, self.serialize().as_bytes())
    }

    /// Writes the full mapping to another file.
    pub fn export_to(&self, path: impl AsRef<Path>) -> Result<(), PreferencesError> {
        write_replacing(path.as_ref(), self.serialize().as_bytes())
    }

    /// Loads an external preferences file over the current mapping.
    pub fn import_from(&mut self, path: impl AsRef<Path>) -> Result<(), PreferencesError> {
        self.load_file(path)
    }

    /// `key=value` lines in key order.
    pub fn serialize(&self) -> String {
        let mut payload = String::new();
        for (key, value) in &self.table {
            payload.push_str(key);
            payload.push('=');
            payload.push_str(value);
            payload.push('\n');
        }
        payload
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.path = Some(path.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.table.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn defaults(&self) -> impl Iterator<Item = (&str, &str)> {
        self.defaults.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.table.get(key).map(String::as_str)
    }

    pub fn get_default(&self, key: &str) -> Option<&str> {
        self.defaults.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.table.insert(key.into(), value.into());
    }

    /// `true` only for the literal `true`, ignoring ASCII case.
    pub fn get_boolean(&self, key: &str) -> bool {
        self.get(key)
            .is_some_and(|value| value.eq_ignore_ascii_case("true"))
    }

    pub fn set_boolean(&mut self, key: impl Into<String>, value: bool) {
        self.set(key, if value { "true" } else { "false" });
    }

    pub fn get_integer(&self, key: &str) -> Result<i32, PreferencesError> {
        let value = self.get(key);
        value
            .and_then(|value| value.parse::<i32>().ok())
            .ok_or_else(|| PreferencesError::InvalidInteger {
                key: key.to_string(),
                value: value.map(str::to_string),
            })
    }

    pub fn set_integer(&mut self, key: impl Into<String>, value: i32) {
        self.set(key, value.to_string());
    }

    /// `None` unless the value is `#` followed by six hex digits.
    pub fn get_color(&self, key: &str) -> Option<Color> {
        self.get(key).and_then(|value| Color::from_hex(value).ok())
    }

    pub fn set_color(&mut self, key: impl Into<String>, color: Color) {
        self.set(key, color.to_hex());
    }

    /// 讀取字型；缺少或格式錯誤時退回預設值。 / Reads a font spec, falling back to the default when missing or malformed.
    ///
    /// After a fallback, the value that was finally parsed is written back
    /// under `key` so later reads see a usable spec.
    pub fn get_font(&mut self, key: &str) -> Result<FontSpec, PreferencesError> {
        let mut replace = false;
        let mut value = match self.get(key) {
            Some(value) => Some(value.to_string()),
            None => {
                replace = true;
                self.get_default(key).map(str::to_string)
            }
        };

        let mut font = value.as_deref().and_then(FontSpec::parse);
        if font.is_none() {
            value = self.get_default(key).map(str::to_string);
            font = value.as_deref().and_then(FontSpec::parse);
            replace = true;
        }

        let font = font.ok_or_else(|| PreferencesError::InvalidFont {
            key: key.to_string(),
            value: value.clone(),
        })?;
        if replace {
            if let Some(value) = value {
                tracing::debug!(%key, %value, "replacing unusable font spec");
                self.set(key, value);
            }
        }
        Ok(font)
    }

    /// Reads `editor.<token>.style`. There is no fallback to the defaults.
    pub fn get_style(&self, token: &str) -> Result<SyntaxStyle, PreferencesError> {
        let key = keys::style_key(token);
        let value = self
            .get(&key)
            .ok_or_else(|| PreferencesError::MissingStyle { key: key.clone() })?;
        SyntaxStyle::parse(value).map_err(|source| PreferencesError::InvalidStyle {
            key,
            value: value.to_string(),
            source,
        })
    }
}

/// UTF-8 when valid, otherwise windows-1252, so a Latin-1 line never stops the load.
fn decode_line(raw: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(raw) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => WINDOWS_1252.decode_without_bom_handling(raw).0,
    }
}

fn write_replacing(path: &Path, data: &[u8]) -> Result<(), PreferencesError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| PreferencesError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, data).map_err(|source| PreferencesError::Write {
        path: tmp_path.clone(),
        source,
    })?;
    fs::rename(&tmp_path, path).map_err(|source| PreferencesError::Write {
        path: path.to_path_buf(),
        source,
    })
}
