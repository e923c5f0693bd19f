mod session;

use std::cell::RefCell;
use std::error::Error;
use std::fs;
use std::path::PathBuf;

use eframe::{egui, App, Frame, NativeOptions};
use egui::{Color32, FontId, RichText};
use session::Editor;
use sketchpad_settings::{
    Color, DesktopEnvironment, LogReporter, PreferencesDialog, PreferencesForm, PreferencesStore,
    Reporter,
};
use tracing_subscriber::EnvFilter;

const APP_TITLE: &str = "Sketchpad";
const SAMPLE_SKETCH: &str = "void setup() {\n  size(200, 200);\n}\n\nvoid draw() {\n  background(204);\n  ellipse(mouseX, mouseY, 20, 20);\n}\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NoticeKind {
    Error,
    Warning,
}

#[derive(Debug, Clone)]
struct Notice {
    kind: NoticeKind,
    title: String,
    message: String,
}

/// 以視窗顯示錯誤的回報器。 / Queues load/save failures for display as blocking notices.
#[derive(Debug, Default)]
struct NoticeReporter {
    pending: RefCell<Vec<Notice>>,
}

impl NoticeReporter {
    fn push(&self, kind: NoticeKind, title: &str, message: &str, cause: Option<&dyn Error>) {
        let message = match cause {
            Some(cause) => format!("{message}\n\n{cause}"),
            None => message.to_string(),
        };
        self.pending.borrow_mut().push(Notice {
            kind,
            title: title.to_string(),
            message,
        });
    }
}

impl Reporter for NoticeReporter {
    fn show_error(&self, title: &str, message: &str, cause: Option<&dyn Error>) {
        LogReporter.show_error(title, message, cause);
        self.push(NoticeKind::Error, title, message, cause);
    }

    fn show_warning(&self, title: &str, message: &str, cause: Option<&dyn Error>) {
        LogReporter.show_warning(title, message, cause);
        self.push(NoticeKind::Warning, title, message, cause);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DialogAction {
    Confirm,
    Cancel,
}

struct SketchpadApp {
    store: PreferencesStore,
    editor: Editor,
    dialog: PreferencesDialog,
    reporter: NoticeReporter,
    text: String,
    current_file: Option<PathBuf>,
}

impl SketchpadApp {
    fn new(store: PreferencesStore, reporter: NoticeReporter) -> Self {
        let mut store = store;
        let editor = Editor::new(&mut store);
        Self {
            store,
            editor,
            dialog: PreferencesDialog::new(),
            reporter,
            text: SAMPLE_SKETCH.to_string(),
            current_file: None,
        }
    }

    fn open_sketch(&mut self, path: PathBuf) {
        match fs::read_to_string(&path) {
            Ok(contents) => {
                self.text = contents;
                self.current_file = Some(path);
            }
            Err(err) => self.reporter.show_error(
                "Error",
                &format!("Could not open {}", path.display()),
                Some(&err),
            ),
        }
    }

    fn save_sketch(&mut self) {
        let Some(path) = &self.current_file else {
            return;
        };
        if let Err(err) = fs::write(path, &self.text) {
            self.reporter.show_error(
                "Error",
                &format!("Could not save {}", path.display()),
                Some(&err),
            );
        }
    }

    fn show_menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    let save_enabled = self.current_file.is_some();
                    if ui.add_enabled(save_enabled, egui::Button::new("Save")).clicked() {
                        self.save_sketch();
                        ui.close_menu();
                    }
                    if ui.button("Preferences...").clicked() {
                        self.dialog.open(&mut self.store);
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
                ui.menu_button("Sketchbook", |ui| {
                    if self.editor.sketches.is_empty() {
                        ui.label(RichText::new("No sketches").italics());
                    }
                    let mut chosen = None;
                    for sketch in &self.editor.sketches {
                        if ui.button(&sketch.name).clicked() {
                            chosen = Some(sketch.main_file.clone());
                            ui.close_menu();
                        }
                    }
                    if let Some(path) = chosen {
                        self.open_sketch(path);
                    }
                });
            });
        });
    }

    fn show_status_bar(&self, ctx: &egui::Context) {
        let settings = &self.editor.settings;
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(format!(
                    "{} {}pt",
                    settings.font.name, settings.font.size
                ));
                ui.separator();
                let external = if settings.external_editor {
                    "External editor"
                } else {
                    "Built-in editor"
                };
                ui.label(external);
                let memory = settings.memory_arguments();
                if !memory.is_empty() {
                    ui.separator();
                    ui.label(memory.join(" "));
                }
                if let Some(color) = settings.run_background {
                    ui.separator();
                    ui.label("Run window");
                    draw_color_badge(ui, color32_from_color(color));
                }
            });
        });
    }

    fn show_style_legend(&self, ctx: &egui::Context) {
        egui::SidePanel::right("syntax_styles")
            .resizable(false)
            .default_width(140.0)
            .show(ctx, |ui| {
                ui.heading("Syntax");
                ui.separator();
                for (token, style) in &self.editor.settings.styles {
                    let mut text = RichText::new(token).color(color32_from_color(style.color));
                    if style.bold {
                        text = text.strong();
                    }
                    if style.italic {
                        text = text.italics();
                    }
                    ui.label(text);
                }
            });
    }

    fn show_editor_area(&mut self, ctx: &egui::Context) {
        let blocked = self.dialog.is_open();
        let font_size = self.editor.settings.font.size.max(1) as f32;
        let external = self.editor.settings.external_editor;
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_enabled_ui(!blocked, |ui| {
                if external {
                    ui.label(
                        RichText::new("Editing is disabled while an external editor is in use.")
                            .italics(),
                    );
                }
                let text_edit = egui::TextEdit::multiline(&mut self.text)
                    .desired_width(f32::INFINITY)
                    .desired_rows(25)
                    .font(FontId::monospace(font_size));
                ui.add_enabled(!external, text_edit);
            });
        });
    }

    fn show_preferences_window(&mut self, ctx: &egui::Context) {
        if !self.dialog.is_open() {
            return;
        }
        let preferences_file = self
            .dialog
            .preferences_file()
            .map(|path| path.display().to_string());
        let mut open = true;
        let mut action = None;
        if let Some(form) = self.dialog.form_mut() {
            egui::Window::new("Preferences")
                .collapsible(false)
                .resizable(false)
                .open(&mut open)
                .show(ctx, |ui| {
                    action = render_preferences_form(ui, form, preferences_file.as_deref());
                });
        }
        if action.is_none() && (!open || ctx.input(|i| i.key_pressed(egui::Key::Escape))) {
            action = Some(DialogAction::Cancel);
        }

        match action {
            Some(DialogAction::Confirm) => {
                self.dialog.confirm(&mut self.store, &mut self.editor);
            }
            Some(DialogAction::Cancel) => {
                self.dialog.cancel();
            }
            None => {}
        }
    }

    fn show_notices(&mut self, ctx: &egui::Context) {
        let mut dismissed = false;
        if let Some(notice) = self.reporter.pending.borrow().first() {
            let heading = match notice.kind {
                NoticeKind::Error => RichText::new(&notice.title).color(Color32::LIGHT_RED),
                NoticeKind::Warning => RichText::new(&notice.title).color(Color32::YELLOW),
            };
            egui::Window::new(notice.title.as_str())
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
                .show(ctx, |ui| {
                    ui.label(heading);
                    ui.label(&notice.message);
                    if ui.button("OK").clicked() {
                        dismissed = true;
                    }
                });
        }
        if dismissed {
            self.reporter.pending.borrow_mut().remove(0);
        }
    }
}

fn render_preferences_form(
    ui: &mut egui::Ui,
    form: &mut PreferencesForm,
    preferences_file: Option<&str>,
) -> Option<DialogAction> {
    let mut action = None;
    ui.checkbox(
        &mut form.separate_jar_files,
        "Use multiple .jar files when exporting applets",
    );
    ui.checkbox(
        &mut form.closing_last_window_quits,
        "Quit after closing last sketch window",
    );

    ui.add_space(6.0);
    ui.label("Sketchbook location:");
    ui.horizontal(|ui| {
        ui.add(egui::TextEdit::singleline(&mut form.sketchbook_path).desired_width(320.0));
        if ui.button("Browse").clicked() {
            let picked = rfd::FileDialog::new()
                .set_title("Select new sketchbook location")
                .set_directory(&form.sketchbook_path)
                .pick_folder();
            if let Some(path) = picked {
                form.sketchbook_path = path.display().to_string();
            }
        }
    });

    ui.add_space(6.0);
    ui.horizontal(|ui| {
        ui.label("Editor font size:");
        ui.add(egui::TextEdit::singleline(&mut form.font_size).desired_width(40.0));
    });
    ui.horizontal(|ui| {
        ui.checkbox(&mut form.memory_override, "Set maximum available memory to");
        ui.add(egui::TextEdit::singleline(&mut form.memory_maximum).desired_width(48.0));
        ui.label("MB");
    });
    ui.checkbox(&mut form.external_editor, "Use external editor");
    ui.checkbox(&mut form.check_updates, "Check for updates on startup");

    ui.add_space(6.0);
    ui.label(RichText::new("More preferences can be edited directly in the file").weak());
    if let Some(path) = preferences_file {
        ui.label(path);
    }
    ui.label(RichText::new("(edit only when Sketchpad is not running)").weak());

    ui.separator();
    ui.horizontal(|ui| {
        if ui.button("OK").clicked() {
            action = Some(DialogAction::Confirm);
        }
        if ui.button("Cancel").clicked() {
            action = Some(DialogAction::Cancel);
        }
    });
    action
}

impl App for SketchpadApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        self.show_menu_bar(ctx);
        self.show_status_bar(ctx);
        self.show_style_legend(ctx);
        self.show_editor_area(ctx);
        self.show_preferences_window(ctx);
        self.show_notices(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.store.save(&LogReporter);
    }
}

fn color32_from_color(color: Color) -> Color32 {
    Color32::from_rgb(color.r, color.g, color.b)
}

fn draw_color_badge(ui: &mut egui::Ui, color: Color32) {
    let (rect, _) = ui.allocate_exact_size(egui::vec2(12.0, 12.0), egui::Sense::hover());
    ui.painter().rect_filled(rect, 2.0, color);
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let env = DesktopEnvironment::detect();
    let reporter = NoticeReporter::default();
    let store = PreferencesStore::initialize(&env, &reporter);

    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([960.0, 640.0])
            .with_title(APP_TITLE),
        ..Default::default()
    };
    eframe::run_native(
        APP_TITLE,
        options,
        Box::new(move |_cc| Box::new(SketchpadApp::new(store, reporter))),
    )
}
