use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use serde_json::{Map, Value as SerdeValue};
use sketchpad_settings::{
    DesktopEnvironment, EditorSession, EditorSettings, LogReporter, PreferencesDialog,
    PreferencesForm, PreferencesStore,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "sketchpad-cli",
    about = "Inspect and edit Sketchpad preferences",
    author,
    version
)]
struct Cli {
    /// 設定資料夾；預設為使用者設定目錄。 / Settings folder (defaults to the user config directory).
    #[arg(long, global = true, value_name = "PATH")]
    settings_dir: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 讀寫偏好設定。 / Read and write preferences.
    #[command(subcommand)]
    Prefs(PrefsCommand),
}

#[derive(Subcommand)]
enum PrefsCommand {
    /// Print the location of the preferences file.
    Path,
    /// List every preference as key=value.
    List(ListArgs),
    /// Print one preference, optionally coerced to a type.
    Get(GetArgs),
    /// Set one preference and save.
    Set(SetArgs),
    /// Apply preferences-dialog fields without opening a window.
    Apply(ApplyArgs),
    /// 匯出偏好設定。 / Export preferences to another file.
    Export(ExportArgs),
    /// 匯入偏好設定。 / Import preferences from another file.
    Import(ImportArgs),
}

#[derive(Args)]
struct ListArgs {
    /// Show the bundled defaults instead of the current values.
    #[arg(long)]
    defaults: bool,

    /// Emit a JSON object.
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct GetArgs {
    /// Preference key; for `--as style` the token name (e.g. keyword1).
    key: String,

    #[arg(long = "as", value_enum, default_value = "string")]
    kind: ValueKind,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ValueKind {
    String,
    Bool,
    Int,
    Color,
    Font,
    Style,
}

#[derive(Args)]
struct SetArgs {
    key: String,
    value: String,
}

#[derive(Args)]
struct ApplyArgs {
    /// Use multiple .jar files when exporting applets.
    #[arg(long, value_name = "true|false")]
    separate_jars: Option<bool>,

    /// Quit after closing the last sketch window.
    #[arg(long, value_name = "true|false")]
    quit_after_last: Option<bool>,

    #[arg(long, value_name = "PATH")]
    sketchbook: Option<String>,

    /// Editor font size in points.
    #[arg(long, value_name = "SIZE")]
    font_size: Option<String>,

    #[arg(long, value_name = "true|false")]
    memory_override: Option<bool>,

    /// Maximum available memory in MB.
    #[arg(long, value_name = "MB")]
    memory_max: Option<String>,

    #[arg(long, value_name = "true|false")]
    external_editor: Option<bool>,

    #[arg(long, value_name = "true|false")]
    check_updates: Option<bool>,
}

#[derive(Args)]
struct ExportArgs {
    /// 輸出檔案路徑。 / Destination file path.
    #[arg(long, value_name = "FILE")]
    output: PathBuf,
}

#[derive(Args)]
struct ImportArgs {
    /// 輸入檔案路徑。 / Source preferences file.
    #[arg(value_name = "FILE")]
    input: PathBuf,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    if let Err(err) = run(cli) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };
    let filter = EnvFilter::from_default_env().add_directive(level.into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let Cli {
        settings_dir,
        command,
        ..
    } = cli;
    let env = match settings_dir {
        Some(dir) => DesktopEnvironment::with_settings_dir(dir),
        None => DesktopEnvironment::detect(),
    };
    let mut store = PreferencesStore::initialize(&env, &LogReporter);

    match command {
        Commands::Prefs(command) => execute_prefs_command(command, &mut store),
    }
}

fn execute_prefs_command(command: PrefsCommand, store: &mut PreferencesStore) -> Result<()> {
    match command {
        PrefsCommand::Path => {
            println!("{}", preferences_path(store)?.display());
            Ok(())
        }
        PrefsCommand::List(args) => list_preferences(args, store),
        PrefsCommand::Get(args) => get_preference(args, store),
        PrefsCommand::Set(args) => {
            store.set(args.key, args.value);
            save(store)
        }
        PrefsCommand::Apply(args) => apply_preferences(args, store),
        PrefsCommand::Export(args) => export_preferences(args, store),
        PrefsCommand::Import(args) => import_preferences(args, store),
    }
}

fn list_preferences(args: ListArgs, store: &PreferencesStore) -> Result<()> {
    let pairs: Vec<(&str, &str)> = if args.defaults {
        store.defaults().collect()
    } else {
        store.iter().collect()
    };

    if args.json {
        let object: Map<String, SerdeValue> = pairs
            .into_iter()
            .map(|(key, value)| (key.to_string(), SerdeValue::String(value.to_string())))
            .collect();
        println!("{}", serde_json::to_string_pretty(&SerdeValue::Object(object))?);
    } else {
        for (key, value) in pairs {
            println!("{key}={value}");
        }
    }
    Ok(())
}

fn get_preference(args: GetArgs, store: &mut PreferencesStore) -> Result<()> {
    let key = args.key.as_str();
    match args.kind {
        ValueKind::String => {
            let value = store
                .get(key)
                .ok_or_else(|| anyhow!("preference '{key}' is not set"))?;
            println!("{value}");
        }
        ValueKind::Bool => println!("{}", store.get_boolean(key)),
        ValueKind::Int => println!("{}", store.get_integer(key)?),
        ValueKind::Color => {
            let color = store
                .get_color(key)
                .ok_or_else(|| anyhow!("preference '{key}' is not a #rrggbb color"))?;
            println!("{color}");
        }
        ValueKind::Font => {
            let font = store.get_font(key)?;
            println!("{font}");
        }
        ValueKind::Style => {
            let style = store.get_style(key)?;
            println!(
                "color={} bold={} italic={}",
                style.color, style.bold, style.italic
            );
        }
    }
    Ok(())
}

/// Prints what an editor session would pick up from the dialog.
#[derive(Default)]
struct CliSession {
    previous_sketchbook: Option<String>,
    sketchbook_changed: bool,
}

impl EditorSession for CliSession {
    fn rebuild_sketchbook_menu(&mut self, store: &PreferencesStore) {
        self.sketchbook_changed = true;
        self.previous_sketchbook = store
            .get(sketchpad_settings::keys::SKETCHBOOK_PATH)
            .map(str::to_string);
    }

    fn apply_preferences(&mut self, store: &mut PreferencesStore) {
        let settings = EditorSettings::from_store(store);
        tracing::info!(
            font = %settings.font,
            external_editor = settings.external_editor,
            memory = ?settings.memory_arguments(),
            "session settings refreshed"
        );
    }
}

fn apply_preferences(args: ApplyArgs, store: &mut PreferencesStore) -> Result<()> {
    let mut dialog = PreferencesDialog::new();
    dialog.open(store);
    let form = dialog
        .form_mut()
        .ok_or_else(|| anyhow!("preferences dialog did not open"))?;
    override_fields(form, args);

    let mut session = CliSession::default();
    dialog.confirm(store, &mut session);
    if session.sketchbook_changed {
        println!(
            "Sketchbook location changed (was '{}')",
            session.previous_sketchbook.unwrap_or_default()
        );
    }
    save(store)
}

fn override_fields(form: &mut PreferencesForm, args: ApplyArgs) {
    let ApplyArgs {
        separate_jars,
        quit_after_last,
        sketchbook,
        font_size,
        memory_override,
        memory_max,
        external_editor,
        check_updates,
    } = args;
    if let Some(value) = separate_jars {
        form.separate_jar_files = value;
    }
    if let Some(value) = quit_after_last {
        form.closing_last_window_quits = value;
    }
    if let Some(value) = sketchbook {
        form.sketchbook_path = value;
    }
    if let Some(value) = font_size {
        form.font_size = value;
    }
    if let Some(value) = memory_override {
        form.memory_override = value;
    }
    if let Some(value) = memory_max {
        form.memory_maximum = value;
    }
    if let Some(value) = external_editor {
        form.external_editor = value;
    }
    if let Some(value) = check_updates {
        form.check_updates = value;
    }
}

fn export_preferences(args: ExportArgs, store: &PreferencesStore) -> Result<()> {
    let output = resolve_input_path(&args.output)?;
    store
        .export_to(&output)
        .with_context(|| format!("failed to export preferences to {}", output.display()))?;
    println!("Exported preferences to {}", output.display());
    Ok(())
}

fn import_preferences(args: ImportArgs, store: &mut PreferencesStore) -> Result<()> {
    let input = resolve_input_path(&args.input)?;
    if !input.exists() {
        bail!("preferences file '{}' does not exist", input.display());
    }
    store
        .import_from(&input)
        .with_context(|| format!("failed to import preferences from {}", input.display()))?;
    save(store)?;
    println!("Imported preferences from {}", input.display());
    Ok(())
}

fn save(store: &PreferencesStore) -> Result<()> {
    let path = preferences_path(store)?;
    store
        .try_save()
        .with_context(|| format!("failed to save preferences to {}", path.display()))
}

fn preferences_path(store: &PreferencesStore) -> Result<&Path> {
    store
        .path()
        .ok_or_else(|| anyhow!("preferences file location is unknown"))
}

fn resolve_input_path(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("failed to resolve current directory")?;
    Ok(cwd.join(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_fields_only_touches_given_values() {
        let mut form = PreferencesForm {
            font_size: "12".to_string(),
            memory_maximum: "256".to_string(),
            check_updates: true,
            ..PreferencesForm::default()
        };
        let args = ApplyArgs {
            separate_jars: None,
            quit_after_last: Some(true),
            sketchbook: None,
            font_size: Some("14".to_string()),
            memory_override: None,
            memory_max: None,
            external_editor: None,
            check_updates: Some(false),
        };
        override_fields(&mut form, args);
        assert_eq!(form.font_size, "14");
        assert_eq!(form.memory_maximum, "256");
        assert!(form.closing_last_window_quits);
        assert!(!form.check_updates);
    }

    #[test]
    fn cli_parses_nested_prefs_commands() {
        let cli = Cli::try_parse_from([
            "sketchpad-cli",
            "--settings-dir",
            "/tmp/prefs",
            "prefs",
            "get",
            "editor.font",
            "--as",
            "font",
        ])
        .expect("parse");
        assert_eq!(cli.settings_dir, Some(PathBuf::from("/tmp/prefs")));
        match cli.command {
            Commands::Prefs(PrefsCommand::Get(args)) => {
                assert_eq!(args.key, "editor.font");
                assert!(matches!(args.kind, ValueKind::Font));
            }
            _ => panic!("expected prefs get"),
        }
    }
}
