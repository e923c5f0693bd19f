use std::fs;
use std::path::{Path, PathBuf};

use sketchpad_settings::{EditorSession, EditorSettings, PreferencesStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sketch {
    pub name: String,
    pub main_file: PathBuf,
}

/// 編輯器視窗快取的偏好設定。 / The running editor and the preference values it caches.
#[derive(Debug)]
pub struct Editor {
    pub settings: EditorSettings,
    pub sketches: Vec<Sketch>,
    sketchbook_stale: bool,
}

impl Editor {
    pub fn new(store: &mut PreferencesStore) -> Self {
        let mut editor = Self {
            settings: EditorSettings::from_store(store),
            sketches: Vec::new(),
            sketchbook_stale: false,
        };
        editor.rescan_sketchbook();
        editor
    }

    pub fn rescan_sketchbook(&mut self) {
        self.sketchbook_stale = false;
        self.sketches = match &self.settings.sketchbook_path {
            Some(path) => list_sketches(path),
            None => Vec::new(),
        };
    }
}

impl EditorSession for Editor {
    fn rebuild_sketchbook_menu(&mut self, store: &PreferencesStore) {
        tracing::info!(
            previous = store.get(sketchpad_settings::keys::SKETCHBOOK_PATH).unwrap_or_default(),
            "sketchbook location changing"
        );
        self.sketchbook_stale = true;
    }

    fn apply_preferences(&mut self, store: &mut PreferencesStore) {
        self.settings = EditorSettings::from_store(store);
        if self.sketchbook_stale {
            self.rescan_sketchbook();
        }
    }
}

/// Sketch folders are subdirectories holding a `<name>.pde` file.
fn list_sketches(sketchbook: &Path) -> Vec<Sketch> {
    let entries = match fs::read_dir(sketchbook) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::warn!(path = %sketchbook.display(), error = %err, "cannot read sketchbook");
            return Vec::new();
        }
    };

    let mut sketches: Vec<Sketch> = entries
        .filter_map(Result::ok)
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| {
            let name = entry.file_name().to_str()?.to_string();
            let main_file = entry.path().join(format!("{name}.pde"));
            main_file.is_file().then_some(Sketch { name, main_file })
        })
        .collect();
    sketches.sort_by(|a, b| a.name.cmp(&b.name));
    sketches
}

#[cfg(test)]
mod tests {
    use super::*;
    use sketchpad_settings::PreferencesForm;
    use tempfile::tempdir;

    #[test]
    fn list_sketches_finds_folders_with_main_file() {
        let dir = tempdir().unwrap();
        for name in ["beta", "alpha"] {
            let folder = dir.path().join(name);
            fs::create_dir_all(&folder).unwrap();
            fs::write(folder.join(format!("{name}.pde")), "void setup() {}").unwrap();
        }
        fs::create_dir_all(dir.path().join("libraries")).unwrap();

        let names: Vec<_> = list_sketches(dir.path())
            .into_iter()
            .map(|sketch| sketch.name)
            .collect();
        assert_eq!(names, vec!["alpha", "beta"]);
    }

    #[test]
    fn applying_new_sketchbook_rescans() {
        let dir = tempdir().unwrap();
        let folder = dir.path().join("orbit");
        fs::create_dir_all(&folder).unwrap();
        fs::write(folder.join("orbit.pde"), "").unwrap();

        let mut store = PreferencesStore::new();
        store.load_str("editor.font=Monaco,plain,12\nsketchbook.path=\n");
        let mut editor = Editor::new(&mut store);
        assert!(editor.sketches.is_empty());

        let form = PreferencesForm {
            sketchbook_path: dir.path().display().to_string(),
            font_size: "20".to_string(),
            ..PreferencesForm::from_store(&mut store)
        };
        form.apply(&mut store, &mut editor);

        assert_eq!(editor.sketches.len(), 1);
        assert_eq!(editor.settings.font.size, 20);
    }
}
