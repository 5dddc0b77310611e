use std::path::PathBuf;
use std::time::{Duration, Instant};

use eframe::egui;

use crate::buddy::{self, BuddyKind};
use crate::config::{self, Settings};
use crate::cycle::{Cycle, CycleEvent, Decision, Phase};
use crate::scanner::Candidate;
use crate::scheduler::Scheduler;
use crate::settings_form::SettingsForm;
use crate::tray::{Tray, TrayCommand};
use crate::utils;

const PICTURE_SIZE: f32 = 200.0;

/// Upper bound on how long the UI sleeps between frames while idle.
const IDLE_TICK: Duration = Duration::from_secs(1);

/// Which question the deletion dialog is asking.
#[derive(Clone, Copy, PartialEq)]
enum ConfirmStage {
    List,
    AreYouSure,
}

/// Viewport commands for a tray choice. Hide minimizes: an invisible window
/// may stop getting frames, and then nothing drains the tray channel.
fn window_commands(cmd: TrayCommand) -> Vec<egui::ViewportCommand> {
    match cmd {
        TrayCommand::Show => vec![
            egui::ViewportCommand::Minimized(false),
            egui::ViewportCommand::Focus,
        ],
        TrayCommand::Hide => vec![egui::ViewportCommand::Minimized(true)],
        TrayCommand::Quit => vec![egui::ViewportCommand::Close],
        TrayCommand::Settings => vec![],
    }
}

/// Right-hand text of a deletion dialog row.
fn candidate_detail(candidate: &Candidate) -> String {
    format!(
        "{} days old, {}, {}",
        candidate.age_days,
        utils::format_modified(candidate.modified),
        utils::format_size(candidate.size_bytes)
    )
}

pub struct BuddyApp {
    settings: Settings,
    cycle: Cycle,
    scheduler: Scheduler,
    tray: Option<Tray>,
    message: String,
    last_failures: Vec<(PathBuf, String)>,
    confirm_stage: ConfirmStage,
    settings_form: Option<SettingsForm>,
}

impl BuddyApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let settings = Settings::default();
        log::info!("Settings loaded (defaults)");
        log::info!("Monitoring paths: {:?}", settings.scan.roots);

        Self {
            settings,
            cycle: Cycle::new(),
            scheduler: Scheduler::new(config::SCAN_INTERVAL),
            tray: Tray::new(&cc.egui_ctx),
            message: buddy::GREETING.to_string(),
            last_failures: vec![],
            confirm_stage: ConfirmStage::List,
            settings_form: None,
        }
    }

    fn handle_tray(&mut self, ctx: &egui::Context) {
        let commands: Vec<TrayCommand> = match &self.tray {
            Some(tray) => std::iter::from_fn(|| tray.poll()).collect(),
            None => return,
        };
        for cmd in commands {
            match cmd {
                TrayCommand::Settings => self.open_settings(),
                TrayCommand::Quit => log::info!("Quit requested from tray"),
                TrayCommand::Show | TrayCommand::Hide => {}
            }
            for command in window_commands(cmd) {
                ctx.send_viewport_cmd(command);
            }
        }
    }

    /// Start a cycle when the scheduler says so and nothing else is running.
    fn run_scheduler(&mut self) {
        let now = Instant::now();
        if !self.scheduler.is_due(now) || !self.cycle.is_idle() {
            return;
        }
        match self.cycle.start(self.settings.scan.clone()) {
            Ok(()) => {
                self.scheduler.mark_started(now);
                self.message = buddy::CHECKING.to_string();
            }
            Err(e) => log::debug!("Scan deferred: {e}"),
        }
    }

    fn drain_cycle(&mut self) {
        while let Some(event) = self.cycle.poll() {
            self.message = buddy::speech_for(&event);
            match event {
                CycleEvent::AwaitingConfirmation(_) => {
                    self.confirm_stage = ConfirmStage::List;
                }
                CycleEvent::Deleted(result) => {
                    self.last_failures = result.failures;
                }
                CycleEvent::NoneFound | CycleEvent::AutoDeleting(_) => {}
            }
        }
    }

    fn open_settings(&mut self) {
        if self.settings_form.is_none() {
            self.settings_form = Some(SettingsForm::from_settings(&self.settings));
        }
    }

    fn apply_settings(&mut self, new_settings: Settings) {
        log::info!(
            "Settings saved in memory: {} folders, {} days, auto-delete {}",
            new_settings.scan.roots.len(),
            new_settings.scan.age_threshold_days,
            new_settings.scan.auto_delete
        );
        self.settings = new_settings;
        self.message = buddy::SETTINGS_UPDATED.to_string();
        self.scheduler.trigger_now();
    }

    fn render_buddy(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default()
            .frame(egui::Frame::default())
            .show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    ui.add_space(8.0);
                    Self::render_picture(ui, self.settings.buddy);
                    ui.add_space(8.0);

                    let bubble = egui::Frame::group(ui.style())
                        .fill(ui.visuals().window_fill())
                        .inner_margin(10.0)
                        .show(ui, |ui| {
                            ui.label(egui::RichText::new(&self.message).size(14.0));
                            if self.cycle.phase() == Phase::Scanning
                                || self.cycle.phase() == Phase::Deleting
                            {
                                ui.spinner();
                            }
                        });
                    let warnings = self.cycle.warnings();
                    if !self.last_failures.is_empty() || !warnings.is_empty() {
                        bubble.response.on_hover_ui(|ui| {
                            if !self.last_failures.is_empty() {
                                ui.label(format!(
                                    "{} could not be deleted:",
                                    self.last_failures.len()
                                ));
                                for (path, reason) in &self.last_failures {
                                    ui.label(format!("{}: {reason}", utils::display_path(path)));
                                }
                            }
                            for warning in warnings {
                                ui.label(
                                    egui::RichText::new(format!("Warning: {warning}"))
                                        .color(egui::Color32::from_rgb(220, 100, 50)),
                                );
                            }
                        });
                    }

                    ui.add_space(8.0);
                    if ui.button("Settings").clicked() {
                        self.open_settings();
                    }
                });
            });
    }

    /// Placeholder picture; pressing on it drags the frameless window.
    fn render_picture(ui: &mut egui::Ui, kind: BuddyKind) {
        let (rect, response) = ui.allocate_exact_size(
            egui::vec2(PICTURE_SIZE, PICTURE_SIZE),
            egui::Sense::click_and_drag(),
        );
        let [r, g, b] = kind.color();
        let painter = ui.painter();
        painter.rect_filled(rect, 12.0, egui::Color32::from_rgb(r, g, b));
        painter.text(
            rect.center(),
            egui::Align2::CENTER_CENTER,
            buddy::FACE,
            egui::FontId::proportional(64.0),
            egui::Color32::WHITE,
        );

        if response.drag_started() {
            ui.ctx().send_viewport_cmd(egui::ViewportCommand::StartDrag);
        }
    }

    fn render_confirm_dialog(&mut self, ctx: &egui::Context) {
        let mut decision: Option<Decision> = None;
        let mut next_stage = self.confirm_stage;
        let count = self.cycle.candidates().len();

        ctx.show_viewport_immediate(
            egui::ViewportId::from_hash_of("files_to_delete"),
            egui::ViewportBuilder::default()
                .with_title("Files to Delete?")
                .with_inner_size([500.0, 400.0])
                .with_window_level(egui::WindowLevel::AlwaysOnTop),
            |ctx, _class| {
                if ctx.input(|i| i.viewport().close_requested()) {
                    decision = Some(Decision::KeepAll);
                }

                egui::TopBottomPanel::bottom("confirm_buttons").show(ctx, |ui| {
                    ui.add_space(6.0);
                    match self.confirm_stage {
                        ConfirmStage::List => {
                            ui.horizontal(|ui| {
                                if ui
                                    .button(
                                        egui::RichText::new("Delete All")
                                            .color(egui::Color32::from_rgb(220, 60, 60)),
                                    )
                                    .clicked()
                                {
                                    next_stage = ConfirmStage::AreYouSure;
                                }
                                if ui.button("Keep All").clicked() {
                                    decision = Some(Decision::KeepAll);
                                }
                            });
                        }
                        ConfirmStage::AreYouSure => {
                            ui.label(
                                egui::RichText::new(format!(
                                    "Are you sure you want to delete all {count} listed files?"
                                ))
                                .strong(),
                            );
                            ui.label(
                                egui::RichText::new("This action cannot be undone.")
                                    .small()
                                    .color(egui::Color32::from_rgb(200, 100, 100)),
                            );
                            ui.horizontal(|ui| {
                                if ui.button("No").clicked() {
                                    next_stage = ConfirmStage::List;
                                }
                                if ui.button("Yes").clicked() {
                                    decision = Some(Decision::DeleteAll);
                                }
                            });
                        }
                    }
                    ui.add_space(6.0);
                });

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.label(
                        "I found these files that haven't been used in a while. \
                         Would you like to delete them?",
                    );
                    ui.add_space(4.0);
                    egui::ScrollArea::vertical()
                        .auto_shrink([false, false])
                        .show(ui, |ui| {
                            for candidate in self.cycle.candidates() {
                                ui.horizontal(|ui| {
                                    ui.label(
                                        egui::RichText::new(utils::display_path(&candidate.path))
                                            .color(egui::Color32::from_rgb(160, 160, 170)),
                                    );
                                    ui.with_layout(
                                        egui::Layout::right_to_left(egui::Align::Center),
                                        |ui| {
                                            ui.label(
                                                egui::RichText::new(candidate_detail(candidate))
                                                .color(egui::Color32::from_rgb(220, 180, 50)),
                                            );
                                        },
                                    );
                                });
                            }
                        });
                });
            },
        );

        self.confirm_stage = next_stage;
        if let Some(decision) = decision {
            if let Err(e) = self.cycle.confirm(decision) {
                log::warn!("{e}");
            }
            if decision == Decision::KeepAll {
                self.message = buddy::KEPT.to_string();
            }
        }
    }

    fn render_settings(&mut self, ctx: &egui::Context) {
        let Some(form) = self.settings_form.as_mut() else {
            return;
        };
        let mut close = false;
        let mut saved: Option<Settings> = None;

        ctx.show_viewport_immediate(
            egui::ViewportId::from_hash_of("buddy_settings"),
            egui::ViewportBuilder::default()
                .with_title("Desktop Buddy Settings")
                .with_inner_size([400.0, 420.0]),
            |ctx, _class| {
                if ctx.input(|i| i.viewport().close_requested()) {
                    close = true;
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    egui::Grid::new("settings_grid")
                        .num_columns(2)
                        .spacing([12.0, 8.0])
                        .show(ui, |ui| {
                            ui.label("Delete files older than (days):");
                            ui.add(
                                egui::DragValue::new(&mut form.threshold_days)
                                    .range(config::MIN_THRESHOLD_DAYS..=config::MAX_THRESHOLD_DAYS),
                            );
                            ui.end_row();

                            ui.label("Ignore file types:");
                            ui.add(
                                egui::TextEdit::singleline(&mut form.ignored_text)
                                    .hint_text(".lnk, .ini, .log (comma-separated)"),
                            );
                            ui.end_row();

                            ui.label("Choose your buddy:");
                            egui::ComboBox::from_id_salt("buddy_kind")
                                .selected_text(form.buddy.label())
                                .show_ui(ui, |ui| {
                                    for kind in BuddyKind::ALL {
                                        ui.selectable_value(&mut form.buddy, kind, kind.label());
                                    }
                                });
                            ui.end_row();
                        });

                    ui.checkbox(
                        &mut form.auto_delete,
                        "Enable automatic deletion without prompt",
                    );
                    ui.separator();

                    ui.label("Folders to monitor:");
                    egui::ScrollArea::vertical()
                        .max_height(140.0)
                        .auto_shrink([false, true])
                        .show(ui, |ui| {
                            for (root, selected) in form.roots.iter().zip(form.selected.iter_mut()) {
                                ui.checkbox(selected, root.display().to_string());
                            }
                        });

                    ui.horizontal(|ui| {
                        ui.add(
                            egui::TextEdit::singleline(&mut form.new_root)
                                .hint_text("/path/to/folder"),
                        );
                        if ui.button("Add Path").clicked() {
                            form.add_root();
                        }
                    });
                    if ui.button("Remove Selected Paths").clicked() {
                        form.remove_selected();
                    }

                    if let Some(err) = &form.error {
                        ui.label(
                            egui::RichText::new(err).color(egui::Color32::from_rgb(220, 100, 50)),
                        );
                    }

                    ui.add_space(8.0);
                    if ui.button("Save Settings").clicked() {
                        match form.to_settings() {
                            Ok(settings) => saved = Some(settings),
                            Err(e) => form.error = Some(e.to_string()),
                        }
                    }
                });
            },
        );

        if let Some(settings) = saved {
            self.apply_settings(settings);
            close = true;
        }
        if close {
            self.settings_form = None;
        }
    }
}

impl eframe::App for BuddyApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_tray(ctx);
        self.drain_cycle();
        self.run_scheduler();

        if self.cycle.phase() == Phase::AwaitingConfirmation {
            self.render_confirm_dialog(ctx);
        }
        if self.settings_form.is_some() {
            self.render_settings(ctx);
        }

        self.render_buddy(ctx);

        let wait = if self.cycle.is_idle() {
            self.scheduler.time_until_due(Instant::now()).min(IDLE_TICK)
        } else {
            Duration::from_millis(100)
        };
        ctx.request_repaint_after(wait);
    }

    fn clear_color(&self, _visuals: &egui::Visuals) -> [f32; 4] {
        [0.0, 0.0, 0.0, 0.0]
    }
}
