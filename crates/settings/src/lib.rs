pub mod color;
pub mod dialog;
pub mod environment;
pub mod font;
pub mod keys;
pub mod platform;
pub mod preferences;
pub mod session;

pub use color::{Color, ColorParseError};
pub use dialog::{DialogOutcome, DialogState, PreferencesDialog, PreferencesForm};
pub use environment::{DesktopEnvironment, Environment, LogReporter, Reporter, BUNDLED_DEFAULTS};
pub use font::{FontSpec, FontStyle, StyleParseError, SyntaxStyle};
pub use platform::Platform;
pub use preferences::{PreferencesError, PreferencesStore};
pub use session::{EditorSession, EditorSettings, MemoryOptions};
