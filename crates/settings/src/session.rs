use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::color::Color;
use crate::font::{FontSpec, FontStyle, SyntaxStyle, DEFAULT_FONT_SIZE};
use crate::keys;
use crate::preferences::PreferencesStore;

/// 偏好設定對話框通知的編輯器工作階段。 / The editor session the preferences dialog reports to.
///
/// The session caches what it needs from the store and never re-reads it on
/// its own, so both notifications must be delivered.
pub trait EditorSession {
    /// The sketchbook location is about to change.
    fn rebuild_sketchbook_menu(&mut self, store: &PreferencesStore);

    /// Dialog values were written to the store; re-pull cached settings.
    fn apply_preferences(&mut self, store: &mut PreferencesStore);
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryOptions {
    pub override_enabled: bool,
    pub initial_mb: Option<i32>,
    pub maximum_mb: Option<i32>,
}

/// Values an editor session caches from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorSettings {
    pub font: FontSpec,
    pub external_editor: bool,
    pub memory: MemoryOptions,
    pub run_background: Option<Color>,
    pub sketchbook_path: Option<PathBuf>,
    pub styles: BTreeMap<String, SyntaxStyle>,
}

impl EditorSettings {
    pub fn from_store(store: &mut PreferencesStore) -> Self {
        let font = store.get_font(keys::EDITOR_FONT).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "editor font unusable, using built-in font");
            fallback_font()
        });

        let mut styles = BTreeMap::new();
        for token in keys::SYNTAX_TOKENS {
            match store.get_style(token) {
                Ok(style) => {
                    styles.insert(token.to_string(), style);
                }
                Err(err) => tracing::warn!(error = %err, "skipping syntax style"),
            }
        }

        Self {
            font,
            external_editor: store.get_boolean(keys::EDITOR_EXTERNAL),
            memory: MemoryOptions {
                override_enabled: store.get_boolean(keys::MEMORY_OVERRIDE),
                initial_mb: store.get_integer(keys::MEMORY_INITIAL).ok(),
                maximum_mb: store.get_integer(keys::MEMORY_MAXIMUM).ok(),
            },
            run_background: store.get_color(keys::RUN_WINDOW_BGCOLOR),
            sketchbook_path: store
                .get(keys::SKETCHBOOK_PATH)
                .filter(|path| !path.is_empty())
                .map(PathBuf::from),
            styles,
        }
    }

    /// JVM-style memory flags for launching a sketch, when the override is on.
    pub fn memory_arguments(&self) -> Vec<String> {
        if !self.memory.override_enabled {
            return Vec::new();
        }
        let mut args = Vec::new();
        if let Some(initial) = self.memory.initial_mb {
            args.push(format!("-Xms{initial}m"));
        }
        if let Some(maximum) = self.memory.maximum_mb {
            args.push(format!("-Xmx{maximum}m"));
        }
        args
    }
}

fn fallback_font() -> FontSpec {
    FontSpec {
        name: "Monospaced".to_string(),
        style: FontStyle::PLAIN,
        size: DEFAULT_FONT_SIZE,
    }
}
