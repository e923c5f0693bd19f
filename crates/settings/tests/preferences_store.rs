use std::cell::RefCell;
use std::error::Error;
use std::fs;
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};

use sketchpad_settings::{
    Color, DesktopEnvironment, Environment, Platform, PreferencesError, PreferencesStore,
    Reporter,
};
use tempfile::tempdir;

const DEFAULTS: &str = "\
# bundled defaults
editor.font=Monaco,plain,12
editor.font.macosx=Monaco,plain,14
editor.external=false
run.options.memory.initial=64
run.options.memory.maximum=256
editor.keyword1.style=#cc6600,bold
";

struct TestEnvironment {
    dir: PathBuf,
    defaults: Option<&'static str>,
    platform: Platform,
}

impl TestEnvironment {
    fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
            defaults: Some(DEFAULTS),
            platform: Platform::Linux,
        }
    }
}

impl Environment for TestEnvironment {
    fn settings_file(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    fn open_defaults(&self) -> io::Result<Box<dyn Read + '_>> {
        match self.defaults {
            Some(contents) => Ok(Box::new(Cursor::new(contents.as_bytes()))),
            None => Err(io::Error::new(io::ErrorKind::NotFound, "no bundled defaults")),
        }
    }

    fn platform(&self) -> Platform {
        self.platform
    }

    fn control_color(&self) -> Color {
        Color::new(0xee, 0xee, 0xee)
    }
}

#[derive(Default)]
struct RecordingReporter {
    errors: RefCell<Vec<String>>,
    warnings: RefCell<Vec<String>>,
}

impl Reporter for RecordingReporter {
    fn show_error(&self, title: &str, _message: &str, _cause: Option<&dyn Error>) {
        self.errors.borrow_mut().push(title.to_string());
    }

    fn show_warning(&self, title: &str, _message: &str, _cause: Option<&dyn Error>) {
        self.warnings.borrow_mut().push(title.to_string());
    }
}

#[test]
fn first_run_materializes_defaults_as_user_file() {
    let temp = tempdir().expect("tempdir");
    let env = TestEnvironment::new(temp.path());
    let reporter = RecordingReporter::default();

    let store = PreferencesStore::initialize(&env, &reporter);

    let path = temp.path().join("preferences.txt");
    assert_eq!(store.path(), Some(path.as_path()));
    let written = fs::read_to_string(&path).expect("user file written");
    assert!(written.contains("editor.font=Monaco,plain,12\n"));
    assert!(written.contains("run.window.bgcolor=#eeeeee\n"));
    assert!(!written.contains("# bundled"));
    assert!(reporter.errors.borrow().is_empty());
    assert!(reporter.warnings.borrow().is_empty());
}

#[test]
fn user_file_overrides_defaults_but_not_snapshot() {
    let temp = tempdir().expect("tempdir");
    fs::write(
        temp.path().join("preferences.txt"),
        "editor.external=true\ncustom.key=hand edited\n",
    )
    .expect("write user prefs");
    let env = TestEnvironment::new(temp.path());

    let store = PreferencesStore::initialize(&env, &RecordingReporter::default());
    assert!(store.get_boolean("editor.external"));
    assert_eq!(store.get("custom.key"), Some("hand edited"));
    assert_eq!(store.get_default("editor.external"), Some("false"));
    assert_eq!(store.get_default("custom.key"), None);
    // Every default key survives the user overlay.
    for (key, _) in store.defaults() {
        assert!(store.get(key).is_some(), "{key} missing after init");
    }
}

#[test]
fn platform_overlay_applies_before_snapshot() {
    let temp = tempdir().expect("tempdir");
    let mut env = TestEnvironment::new(temp.path());
    env.platform = Platform::MacOsX;

    let store = PreferencesStore::initialize(&env, &RecordingReporter::default());
    assert_eq!(store.get("editor.font"), Some("Monaco,plain,14"));
    assert_eq!(store.get_default("editor.font"), Some("Monaco,plain,14"));
    assert_eq!(store.get("editor.font.macosx"), Some("Monaco,plain,14"));
}

#[test]
fn computed_background_is_not_a_default() {
    let temp = tempdir().expect("tempdir");
    let env = TestEnvironment::new(temp.path());

    let store = PreferencesStore::initialize(&env, &RecordingReporter::default());
    assert_eq!(
        store.get_color("run.window.bgcolor"),
        Some(Color::new(0xee, 0xee, 0xee))
    );
    assert_eq!(store.get_default("run.window.bgcolor"), None);
}

#[test]
fn missing_defaults_are_reported_and_init_continues() {
    let temp = tempdir().expect("tempdir");
    fs::write(temp.path().join("preferences.txt"), "editor.external=true\n")
        .expect("write user prefs");
    let mut env = TestEnvironment::new(temp.path());
    env.defaults = None;
    let reporter = RecordingReporter::default();

    let store = PreferencesStore::initialize(&env, &reporter);
    assert_eq!(reporter.errors.borrow().len(), 1);
    assert!(store.get_boolean("editor.external"));
    assert_eq!(store.get_default("editor.font"), None);
}

#[test]
fn unreadable_user_file_is_reported_and_defaults_remain() {
    let temp = tempdir().expect("tempdir");
    // A directory in place of the file cannot be read.
    fs::create_dir(temp.path().join("preferences.txt")).expect("create blocker dir");
    let env = TestEnvironment::new(temp.path());
    let reporter = RecordingReporter::default();

    let store = PreferencesStore::initialize(&env, &reporter);
    assert_eq!(
        reporter.errors.borrow().as_slice(),
        ["Error reading preferences"]
    );
    assert_eq!(store.get("editor.font"), Some("Monaco,plain,12"));
}

#[test]
fn latin1_user_file_keeps_every_key() {
    let temp = tempdir().expect("tempdir");
    let mut contents = b"sketchbook.path=C:\\Users\\Jos".to_vec();
    contents.push(0xe9);
    contents.extend_from_slice(b"\\sketchbook\r\neditor.external=true\r\nrun.options.memory.maximum=512\r\n");
    fs::write(temp.path().join("preferences.txt"), contents).expect("write latin-1 prefs");
    let env = TestEnvironment::new(temp.path());
    let reporter = RecordingReporter::default();

    let store = PreferencesStore::initialize(&env, &reporter);
    assert!(reporter.errors.borrow().is_empty());
    assert_eq!(
        store.get("sketchbook.path"),
        Some("C:\\Users\\Jos\u{e9}\\sketchbook")
    );
    assert!(store.get_boolean("editor.external"));
    assert_eq!(store.get_integer("run.options.memory.maximum").unwrap(), 512);

    store.try_save().expect("save");
    let saved = fs::read_to_string(temp.path().join("preferences.txt")).expect("utf-8 on disk");
    assert!(saved.contains("sketchbook.path=C:\\Users\\Jos\u{e9}\\sketchbook\n"));
}

#[test]
fn save_failure_is_reported_as_warning() {
    let temp = tempdir().expect("tempdir");
    let blocker = temp.path().join("not-a-dir");
    fs::write(&blocker, "file").expect("write blocker");

    let mut store = PreferencesStore::with_path(blocker.join("preferences.txt"));
    store.set("a", "1");
    let reporter = RecordingReporter::default();
    store.save(&reporter);

    assert_eq!(reporter.warnings.borrow().as_slice(), ["Settings"]);
    assert!(matches!(
        store.try_save(),
        Err(PreferencesError::CreateDir { .. })
    ));
}

#[test]
fn save_and_reload_roundtrip() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("nested").join("preferences.txt");

    let mut store = PreferencesStore::with_path(&path);
    store.load_str(DEFAULTS);
    store.set("sketchbook.path", "/Users/ada/Documents/Sketchpad");
    store.set("run.args", "-Dfoo=bar");
    store.try_save().expect("save");

    let mut reloaded = PreferencesStore::new();
    reloaded.load_file(&path).expect("reload");
    let original: Vec<_> = store.iter().collect();
    let restored: Vec<_> = reloaded.iter().collect();
    assert_eq!(original, restored);
    assert!(!path.with_extension("tmp").exists());
}

#[test]
fn export_and_import_use_the_same_format() {
    let temp = tempdir().expect("tempdir");
    let export_path = temp.path().join("exported.txt");

    let mut store = PreferencesStore::new();
    store.load_str("editor.external=true\nupdate.check=false\n");
    store.export_to(&export_path).expect("export");

    let mut target = PreferencesStore::new();
    target.load_str("update.check=true\nother=kept\n");
    target.import_from(&export_path).expect("import");
    assert_eq!(target.get("update.check"), Some("false"));
    assert_eq!(target.get("editor.external"), Some("true"));
    assert_eq!(target.get("other"), Some("kept"));
}

#[test]
fn malformed_font_falls_back_to_default_and_replaces_value() {
    let temp = tempdir().expect("tempdir");
    fs::write(temp.path().join("preferences.txt"), "editor.font=Monaco,14\n")
        .expect("write user prefs");
    let env = TestEnvironment::new(temp.path());
    let mut store = PreferencesStore::initialize(&env, &RecordingReporter::default());

    let font = store.get_font("editor.font").expect("font from defaults");
    assert_eq!(font.name, "Monaco");
    assert_eq!(font.size, 12);
    // The value that was parsed is written back over the malformed one.
    assert_eq!(store.get("editor.font"), Some("Monaco,plain,12"));
}

#[test]
fn missing_font_with_no_default_is_a_parse_error() {
    let mut store = PreferencesStore::new();
    store.set("console.font", "only,two");
    let err = store.get_font("console.font").unwrap_err();
    assert!(err.is_parse_error());
    assert_eq!(store.get("console.font"), Some("only,two"));
}

#[test]
fn get_style_has_no_fallback() {
    let temp = tempdir().expect("tempdir");
    fs::write(
        temp.path().join("preferences.txt"),
        "editor.keyword1.style=#cc6600\n",
    )
    .expect("write user prefs");
    let env = TestEnvironment::new(temp.path());
    let store = PreferencesStore::initialize(&env, &RecordingReporter::default());

    assert!(matches!(
        store.get_style("keyword1"),
        Err(PreferencesError::InvalidStyle { .. })
    ));
    assert!(matches!(
        store.get_style("keyword9"),
        Err(PreferencesError::MissingStyle { .. })
    ));
}

#[test]
fn desktop_environment_initializes_from_bundled_defaults() {
    let temp = tempdir().expect("tempdir");
    let env = DesktopEnvironment::with_settings_dir(temp.path()).with_platform(Platform::Windows);

    let mut store = PreferencesStore::initialize(&env, &RecordingReporter::default());
    assert_eq!(store.get("editor.font"), Some("Consolas,plain,13"));
    assert_eq!(store.get_integer("run.options.memory.initial").unwrap(), 64);
    assert!(store.get_font("editor.font").is_ok());
    assert!(store.get_style("keyword1").is_ok());
    assert!(temp.path().join("preferences.txt").exists());
}
