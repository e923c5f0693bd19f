use std::path::{Path, PathBuf};

use crate::font::replace_font_size;
use crate::keys;
use crate::preferences::PreferencesStore;
use crate::session::EditorSession;

/// 對話框可編輯的欄位。 / Editable fields of the preferences dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreferencesForm {
    pub separate_jar_files: bool,
    pub closing_last_window_quits: bool,
    pub sketchbook_path: String,
    pub font_size: String,
    pub memory_override: bool,
    pub memory_maximum: String,
    pub external_editor: bool,
    pub check_updates: bool,
}

impl PreferencesForm {
    /// Populates every field from the store's current values.
    pub fn from_store(store: &mut PreferencesStore) -> Self {
        let font_size = match store.get_font(keys::EDITOR_FONT) {
            Ok(font) => font.size.to_string(),
            Err(err) => {
                tracing::warn!(error = %err, "cannot show editor font size");
                String::new()
            }
        };
        Self {
            separate_jar_files: store.get_boolean(keys::EXPORT_SEPARATE_JARS),
            closing_last_window_quits: store.get_boolean(keys::CLOSING_LAST_WINDOW_QUITS),
            sketchbook_path: store
                .get(keys::SKETCHBOOK_PATH)
                .unwrap_or_default()
                .to_string(),
            font_size,
            memory_override: store.get_boolean(keys::MEMORY_OVERRIDE),
            memory_maximum: store
                .get(keys::MEMORY_MAXIMUM)
                .unwrap_or_default()
                .to_string(),
            external_editor: store.get_boolean(keys::EDITOR_EXTERNAL),
            check_updates: store.get_boolean(keys::UPDATE_CHECK),
        }
    }

    /// Writes the fields into `store`, then tells `session` to re-read it.
    ///
    /// A bad memory or font size value is skipped with a warning; the other
    /// fields are still applied.
    pub fn apply(&self, store: &mut PreferencesStore, session: &mut dyn EditorSession) {
        store.set_boolean(keys::EXPORT_SEPARATE_JARS, self.separate_jar_files);
        store.set_boolean(keys::CLOSING_LAST_WINDOW_QUITS, self.closing_last_window_quits);

        // The session is told before the new path is stored.
        if store.get(keys::SKETCHBOOK_PATH) != Some(self.sketchbook_path.as_str()) {
            session.rebuild_sketchbook_menu(store);
            store.set(keys::SKETCHBOOK_PATH, self.sketchbook_path.clone());
        }

        store.set_boolean(keys::EDITOR_EXTERNAL, self.external_editor);
        store.set_boolean(keys::UPDATE_CHECK, self.check_updates);
        store.set_boolean(keys::MEMORY_OVERRIDE, self.memory_override);
        self.apply_memory_maximum(store);
        self.apply_font_size(store);

        session.apply_preferences(store);
    }

    fn apply_memory_maximum(&self, store: &mut PreferencesStore) {
        let Ok(mut maximum) = self.memory_maximum.trim().parse::<i32>() else {
            tracing::warn!(value = %self.memory_maximum, "ignoring bad memory setting");
            return;
        };
        match store.get_integer(keys::MEMORY_INITIAL) {
            Ok(minimum) if maximum < minimum => maximum = minimum,
            Ok(_) => {}
            Err(err) => tracing::warn!(error = %err, "no usable minimum memory setting"),
        }
        store.set_integer(keys::MEMORY_MAXIMUM, maximum);
    }

    fn apply_font_size(&self, store: &mut PreferencesStore) {
        let updated = self
            .font_size
            .trim()
            .parse::<i32>()
            .ok()
            .and_then(|size| replace_font_size(store.get(keys::EDITOR_FONT)?, size));
        match updated {
            Some(spec) => store.set(keys::EDITOR_FONT, spec),
            None => tracing::warn!(value = %self.font_size, "ignoring invalid font size"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogState {
    Closed,
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogOutcome {
    Applied,
    Discarded,
}

/// 偏好設定對話框狀態機。 / Closed → Open → {Applied, Discarded} → Closed.
#[derive(Debug, Default)]
pub struct PreferencesDialog {
    form: Option<PreferencesForm>,
    preferences_file: Option<PathBuf>,
}

impl PreferencesDialog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens the dialog with fields reflecting the store. Reopening an open
    /// dialog discards pending edits.
    pub fn open(&mut self, store: &mut PreferencesStore) {
        self.form = Some(PreferencesForm::from_store(store));
        self.preferences_file = store.path().map(Path::to_path_buf);
    }

    pub fn state(&self) -> DialogState {
        if self.form.is_some() {
            DialogState::Open
        } else {
            DialogState::Closed
        }
    }

    pub fn is_open(&self) -> bool {
        self.state() == DialogState::Open
    }

    pub fn form(&self) -> Option<&PreferencesForm> {
        self.form.as_ref()
    }

    pub fn form_mut(&mut self) -> Option<&mut PreferencesForm> {
        self.form.as_mut()
    }

    /// File the remaining preferences can be edited in by hand.
    pub fn preferences_file(&self) -> Option<&Path> {
        self.preferences_file.as_deref()
    }

    /// OK: applies the form and closes. `None` when the dialog was closed.
    pub fn confirm(
        &mut self,
        store: &mut PreferencesStore,
        session: &mut dyn EditorSession,
    ) -> Option<DialogOutcome> {
        let form = self.form.take()?;
        form.apply(store, session);
        Some(DialogOutcome::Applied)
    }

    /// Cancel, Escape or closing the window: drops the edits.
    pub fn cancel(&mut self) -> Option<DialogOutcome> {
        self.form.take().map(|_| DialogOutcome::Discarded)
    }
}
