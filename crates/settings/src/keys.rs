//! Preference keys read and written by the editor and the preferences dialog.

/// Name of the preferences file, both bundled and in the settings directory.
pub const PREFERENCES_FILE: &str = "preferences.txt";

pub const EXPORT_SEPARATE_JARS: &str = "export.applet.separate_jar_files";
pub const CLOSING_LAST_WINDOW_QUITS: &str = "sketchbook.closing_last_window_quits";
pub const SKETCHBOOK_PATH: &str = "sketchbook.path";
pub const EDITOR_FONT: &str = "editor.font";
pub const EDITOR_EXTERNAL: &str = "editor.external";
pub const UPDATE_CHECK: &str = "update.check";
pub const MEMORY_OVERRIDE: &str = "run.options.memory";
pub const MEMORY_INITIAL: &str = "run.options.memory.initial";
pub const MEMORY_MAXIMUM: &str = "run.options.memory.maximum";
pub const RUN_WINDOW_BGCOLOR: &str = "run.window.bgcolor";

/// Token names with an `editor.<token>.style` entry in the defaults.
pub const SYNTAX_TOKENS: [&str; 10] = [
    "comment1", "comment2", "keyword1", "keyword2", "keyword3", "literal1", "literal2",
    "operator", "label", "invalid",
];

pub fn style_key(token: &str) -> String {
    format!("editor.{token}.style")
}
