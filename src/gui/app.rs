use super::{charts, maps};
use crate::api::{
    compose_occurrence_timestamp, AdminUser, ApiClient, ApiError, CrimeBatch, CrimeSubmission,
    Hotspot, SafetyReport,
};
use crate::csv_export;
use crate::feed::LiveFeed;
use crate::records::CrimeDb;
use crate::session::{self, SessionIdentity};
use crate::settings::{save_settings, Settings};
use crate::table::{build_rows, format_date, TypeFilter};
use crate::theme::{
    apply_theme, ensure_theme_files, load_presets, load_theme, save_theme, ThemeConfig,
};
use chrono::{Local, NaiveDateTime};
use eframe::{
    egui::{
        self, Align, CentralPanel, Color32, Context, Layout, RichText, ScrollArea, SidePanel,
        TopBottomPanel,
    },
    App, CreationContext,
};
use rfd::FileDialog;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;
use std::time::Duration;

const CRIME_TYPE_OPTIONS: &[&str] = &[
    "Theft",
    "Assault",
    "Robbery",
    "Burglary",
    "Vandalism",
    "Fraud",
    "Other",
];

const REPORT_RECORD_LIMIT: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Panel {
    Dashboard,
    Map,
    Trends,
    Predictions,
    Reports,
    Admin,
}

impl Panel {
    const ALL: [Panel; 6] = [
        Panel::Dashboard,
        Panel::Map,
        Panel::Trends,
        Panel::Predictions,
        Panel::Reports,
        Panel::Admin,
    ];

    fn title(&self) -> &'static str {
        match self {
            Panel::Dashboard => "Dashboard",
            Panel::Map => "Crime Map",
            Panel::Trends => "Trends",
            Panel::Predictions => "Predictions",
            Panel::Reports => "Reports",
            Panel::Admin => "Admin",
        }
    }
}

/// One message per finished backend call, sent from a worker thread back to
/// the GUI thread. Superseded results simply overwrite earlier ones.
enum ApiEvent {
    Crimes(Result<CrimeBatch, ApiError>),
    DashboardHotspots(Result<Vec<Hotspot>, ApiError>),
    PredictionHotspots(Result<Vec<Hotspot>, ApiError>),
    Submitted(Result<(), ApiError>),
    Safety(Result<SafetyReport, ApiError>),
    Users(Result<Vec<AdminUser>, ApiError>),
    UserDeleted(i64, Result<(), ApiError>),
    DbReset(Result<(), ApiError>),
    Login(Result<SessionIdentity, ApiError>),
}

#[derive(Clone)]
enum Notice {
    Info(String),
    Error(String),
}

#[derive(Default)]
struct SubmissionForm {
    crime_type: String,
    date: String,
    time: String,
    location: String,
    lat: String,
    lng: String,
    description: String,
}

impl SubmissionForm {
    fn reset(&mut self) {
        *self = SubmissionForm::default();
    }
}

pub struct CrimeDeskApp {
    pub settings: Settings,
    base_path: PathBuf,
    theme: ThemeConfig,
    presets: Vec<ThemeConfig>,
    api: ApiClient,
    tx: Sender<ApiEvent>,
    rx: Receiver<ApiEvent>,

    session: Option<SessionIdentity>,
    login_username: String,
    login_password: String,
    login_in_flight: bool,
    login_status: Option<String>,

    panel: Panel,
    db: CrimeDb,
    refreshing: bool,
    fetch_notice: Option<Notice>,

    dashboard_hotspots: Vec<Hotspot>,
    prediction_hotspots: Vec<Hotspot>,
    prediction_map_started: bool,
    selected_crime: Option<i64>,

    filter: TypeFilter,
    feed: LiveFeed,

    form: SubmissionForm,
    submitting: bool,
    submit_notice: Option<Notice>,
    export_notice: Option<Notice>,

    safety_area: String,
    safety_in_flight: bool,
    safety_result: Option<SafetyReport>,
    safety_notice: Option<Notice>,

    show_users_modal: bool,
    users: Vec<AdminUser>,
    users_loading: bool,
    users_notice: Option<Notice>,
    pending_user_delete: Option<i64>,
    confirm_reset: bool,
    reset_in_flight: bool,
    admin_notice: Option<Notice>,
}

impl CrimeDeskApp {
    pub fn new(cc: &CreationContext<'_>, base_path: PathBuf, settings: Settings) -> Self {
        if let Err(e) = ensure_theme_files(&base_path) {
            eprintln!("[theme] Could not prepare theme files: {e}");
        }
        let presets = load_presets(&base_path);
        let theme = load_theme(&base_path, settings.ui.last_theme.as_deref());
        apply_theme(&theme, &cc.egui_ctx);

        let api = ApiClient::new(&settings.server_url);
        let (tx, rx) = channel();
        let session = session::load_session(&base_path);
        let feed = LiveFeed::new(settings.feed.interval_secs, settings.feed.fade_ms);

        let mut app = Self {
            settings,
            base_path,
            theme,
            presets,
            api,
            tx,
            rx,
            session,
            login_username: String::new(),
            login_password: String::new(),
            login_in_flight: false,
            login_status: None,
            panel: Panel::Dashboard,
            db: CrimeDb::default(),
            refreshing: false,
            fetch_notice: None,
            dashboard_hotspots: Vec::new(),
            prediction_hotspots: Vec::new(),
            prediction_map_started: false,
            selected_crime: None,
            filter: TypeFilter::All,
            feed,
            form: SubmissionForm::default(),
            submitting: false,
            submit_notice: None,
            export_notice: None,
            safety_area: String::new(),
            safety_in_flight: false,
            safety_result: None,
            safety_notice: None,
            show_users_modal: false,
            users: Vec::new(),
            users_loading: false,
            users_notice: None,
            pending_user_delete: None,
            confirm_reset: false,
            reset_in_flight: false,
            admin_notice: None,
        };

        if app.session.is_some() {
            app.start_initial_fetches();
        }

        app
    }

    fn start_initial_fetches(&mut self) {
        self.spawn_fetch_crimes();
        self.spawn_fetch_dashboard_hotspots();
    }

    // ---- worker threads ------------------------------------------------

    fn spawn_fetch_crimes(&mut self) {
        self.refreshing = true;
        let api = self.api.clone();
        let tx = self.tx.clone();
        thread::spawn(move || {
            let _ = tx.send(ApiEvent::Crimes(api.fetch_crimes()));
        });
    }

    fn spawn_fetch_dashboard_hotspots(&mut self) {
        let api = self.api.clone();
        let tx = self.tx.clone();
        thread::spawn(move || {
            let _ = tx.send(ApiEvent::DashboardHotspots(api.fetch_hotspots()));
        });
    }

    fn spawn_fetch_prediction_hotspots(&mut self) {
        let api = self.api.clone();
        let tx = self.tx.clone();
        thread::spawn(move || {
            let _ = tx.send(ApiEvent::PredictionHotspots(api.fetch_hotspots()));
        });
    }

    fn spawn_submit(&mut self, report: CrimeSubmission) {
        self.submitting = true;
        let api = self.api.clone();
        let tx = self.tx.clone();
        thread::spawn(move || {
            let _ = tx.send(ApiEvent::Submitted(api.submit_crime(&report)));
        });
    }

    fn spawn_safety(&mut self, area: String) {
        self.safety_in_flight = true;
        let api = self.api.clone();
        let tx = self.tx.clone();
        thread::spawn(move || {
            let _ = tx.send(ApiEvent::Safety(api.predict_safety(&area)));
        });
    }

    fn spawn_fetch_users(&mut self) {
        self.users_loading = true;
        let api = self.api.clone();
        let tx = self.tx.clone();
        thread::spawn(move || {
            let _ = tx.send(ApiEvent::Users(api.fetch_users()));
        });
    }

    fn spawn_delete_user(&mut self, id: i64) {
        let api = self.api.clone();
        let tx = self.tx.clone();
        thread::spawn(move || {
            let _ = tx.send(ApiEvent::UserDeleted(id, api.delete_user(id)));
        });
    }

    fn spawn_db_reset(&mut self) {
        self.reset_in_flight = true;
        let api = self.api.clone();
        let tx = self.tx.clone();
        thread::spawn(move || {
            let _ = tx.send(ApiEvent::DbReset(api.reset_database()));
        });
    }

    fn spawn_login(&mut self, username: String, password: String) {
        self.login_in_flight = true;
        let api = self.api.clone();
        let tx = self.tx.clone();
        thread::spawn(move || {
            let _ = tx.send(ApiEvent::Login(api.login(&username, &password)));
        });
    }

    // ---- event handling --------------------------------------------------

    fn drain_events(&mut self) {
        while let Ok(event) = self.rx.try_recv() {
            match event {
                ApiEvent::Crimes(Ok(batch)) => {
                    self.refreshing = false;
                    self.fetch_notice = None;
                    self.db.replace(batch.count, batch.crimes);
                }
                ApiEvent::Crimes(Err(e)) => {
                    self.refreshing = false;
                    eprintln!("[api] Failed to fetch crimes: {e}");
                    // Explicit empty state instead of stale rows.
                    self.db.clear();
                    self.fetch_notice =
                        Some(Notice::Error(format!("Could not load crime records: {e}")));
                }
                ApiEvent::DashboardHotspots(Ok(spots)) => {
                    self.dashboard_hotspots = spots;
                }
                ApiEvent::DashboardHotspots(Err(e)) => {
                    // Decorative overlay; log and move on.
                    eprintln!("[api] Dashboard hotspot fetch failed: {e}");
                }
                ApiEvent::PredictionHotspots(Ok(spots)) => {
                    self.prediction_hotspots = spots;
                }
                ApiEvent::PredictionHotspots(Err(e)) => {
                    eprintln!("[api] Prediction hotspot fetch failed: {e}");
                }
                ApiEvent::Submitted(Ok(())) => {
                    self.submitting = false;
                    self.form.reset();
                    self.submit_notice = Some(Notice::Info(
                        "Crime report submitted successfully.".to_string(),
                    ));
                    // Exactly one full refresh per accepted submission.
                    self.spawn_fetch_crimes();
                }
                ApiEvent::Submitted(Err(e)) => {
                    self.submitting = false;
                    eprintln!("[api] Submission failed: {e}");
                    // Form values stay put so the user can correct and retry.
                    self.submit_notice =
                        Some(Notice::Error(format!("Error submitting report: {e}")));
                }
                ApiEvent::Safety(Ok(report)) => {
                    self.safety_in_flight = false;
                    self.safety_notice = None;
                    self.safety_result = Some(report);
                }
                ApiEvent::Safety(Err(e)) => {
                    self.safety_in_flight = false;
                    self.safety_result = None;
                    eprintln!("[api] Safety lookup failed: {e}");
                    self.safety_notice = Some(Notice::Error(format!("Safety lookup failed: {e}")));
                }
                ApiEvent::Users(Ok(users)) => {
                    self.users_loading = false;
                    self.users_notice = None;
                    self.users = users;
                }
                ApiEvent::Users(Err(e)) => {
                    self.users_loading = false;
                    eprintln!("[api] User list fetch failed: {e}");
                    self.users.clear();
                    self.users_notice = Some(Notice::Error(format!("Could not load users: {e}")));
                }
                ApiEvent::UserDeleted(id, Ok(())) => {
                    self.users_notice = Some(Notice::Info(format!("User {id} deleted.")));
                    self.spawn_fetch_users();
                }
                ApiEvent::UserDeleted(id, Err(e)) => {
                    eprintln!("[api] Delete of user {id} failed: {e}");
                    self.users_notice =
                        Some(Notice::Error(format!("Could not delete user {id}: {e}")));
                }
                ApiEvent::DbReset(Ok(())) => {
                    self.reset_in_flight = false;
                    self.confirm_reset = false;
                    self.admin_notice = Some(Notice::Info(
                        "Database reset complete. Reloading records.".to_string(),
                    ));
                    self.spawn_fetch_crimes();
                }
                ApiEvent::DbReset(Err(e)) => {
                    // Back to the armed state so the reset can be retried.
                    self.reset_in_flight = false;
                    eprintln!("[api] Database reset failed: {e}");
                    self.admin_notice =
                        Some(Notice::Error(format!("Database reset failed: {e}")));
                }
                ApiEvent::Login(Ok(identity)) => {
                    self.login_in_flight = false;
                    if let Err(e) = session::save_session(&self.base_path, &identity) {
                        eprintln!("[session] Could not persist session: {e}");
                    }
                    self.session = Some(identity);
                    self.login_username.clear();
                    self.login_password.clear();
                    self.login_status = None;
                    self.panel = Panel::Dashboard;
                    self.start_initial_fetches();
                }
                ApiEvent::Login(Err(e)) => {
                    self.login_in_flight = false;
                    self.login_status = Some(format!("Sign in failed: {e}"));
                }
            }
        }
    }

    fn logout(&mut self) {
        if let Err(e) = session::clear_session(&self.base_path) {
            eprintln!("[session] Could not clear session: {e}");
        }
        self.session = None;
        self.db.clear();
        self.dashboard_hotspots.clear();
        self.prediction_hotspots.clear();
        self.prediction_map_started = false;
        self.selected_crime = None;
        self.panel = Panel::Dashboard;
    }

    fn set_panel(&mut self, panel: Panel) {
        if self.panel == panel {
            return;
        }
        self.panel = panel;
        match panel {
            Panel::Predictions => {
                // Prediction hotspots are fetched once, on first entry.
                if !self.prediction_map_started {
                    self.prediction_map_started = true;
                    self.spawn_fetch_prediction_hotspots();
                }
            }
            Panel::Reports => {
                // Reports always re-fetch so the table reflects the backend.
                self.spawn_fetch_crimes();
            }
            _ => {}
        }
    }

    fn switch_theme(&mut self, name: &str, ctx: &Context) {
        self.theme = load_theme(&self.base_path, Some(name));
        apply_theme(&self.theme, ctx);
        self.settings.ui.last_theme = Some(self.theme.name.clone());
        if let Err(e) = save_theme(&self.base_path, &self.theme) {
            eprintln!("[theme] Could not save active theme: {e}");
        }
        if let Err(e) = save_settings(&self.settings, &self.base_path) {
            eprintln!("[settings] Could not save settings: {e}");
        }
    }

    // ---- shared widgets ---------------------------------------------------

    fn render_notice(&self, ui: &mut egui::Ui, notice: &Option<Notice>) {
        match notice {
            Some(Notice::Info(msg)) => {
                ui.colored_label(self.theme.success_color(), msg);
            }
            Some(Notice::Error(msg)) => {
                ui.colored_label(self.theme.danger_color(), msg);
            }
            None => {}
        }
    }

    fn stat_card(&self, ui: &mut egui::Ui, label: &str, value: String, accent: Color32) {
        egui::Frame::none()
            .fill(self.theme.surface_color())
            .stroke(egui::Stroke::new(1.0, self.theme.border_color()))
            .rounding(egui::Rounding::same(self.theme.radius))
            .inner_margin(egui::vec2(16.0, 12.0))
            .show(ui, |ui| {
                ui.set_min_width(150.0);
                ui.label(RichText::new(label).color(self.theme.muted_color()));
                ui.label(RichText::new(value).size(26.0).strong().color(accent));
            });
    }

    fn badge(&self, ui: &mut egui::Ui, text: &str, color: Color32) {
        egui::Frame::none()
            .fill(color.gamma_multiply(0.25))
            .rounding(egui::Rounding::same(4.0))
            .inner_margin(egui::vec2(6.0, 2.0))
            .show(ui, |ui| {
                ui.label(RichText::new(text).color(color).small());
            });
    }

    // ---- panels -------------------------------------------------------

    fn render_login(&mut self, ctx: &Context) {
        CentralPanel::default().show(ctx, |ui| {
            ui.add_space(ui.available_height() * 0.25);
            ui.vertical_centered(|ui| {
                ui.heading("CrimeDesk");
                ui.label(
                    RichText::new("Sign in to access the crime records console")
                        .color(self.theme.muted_color()),
                );
                ui.add_space(16.0);

                ui.scope(|ui| {
                    ui.set_max_width(320.0);
                    ui.add(
                        egui::TextEdit::singleline(&mut self.login_username)
                            .hint_text("Username")
                            .desired_width(f32::INFINITY),
                    );
                    ui.add_space(6.0);
                    ui.add(
                        egui::TextEdit::singleline(&mut self.login_password)
                            .password(true)
                            .hint_text("Password")
                            .desired_width(f32::INFINITY),
                    );
                    ui.add_space(10.0);

                    let label = if self.login_in_flight {
                        "Signing in..."
                    } else {
                        "Sign in"
                    };
                    let clicked = ui
                        .add_enabled(!self.login_in_flight, egui::Button::new(label))
                        .clicked();
                    if clicked {
                        if self.login_username.trim().is_empty() {
                            self.login_status = Some("Enter a username first.".to_string());
                        } else {
                            self.login_status = None;
                            let username = self.login_username.trim().to_string();
                            let password = self.login_password.clone();
                            self.spawn_login(username, password);
                        }
                    }

                    if let Some(status) = self.login_status.clone() {
                        ui.add_space(6.0);
                        ui.colored_label(self.theme.danger_color(), status);
                    }
                });
            });
        });
    }

    fn render_top_bar(&mut self, ctx: &Context, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(
                RichText::new("CrimeDesk")
                    .strong()
                    .color(self.theme.accent_color()),
            );
            ui.label(RichText::new(self.panel.title()).color(self.theme.muted_color()));

            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                if ui.button("Logout").clicked() {
                    self.logout();
                    return;
                }
                if let Some(session) = &self.session {
                    ui.label(format!("{} ({})", session.username, session.role));
                }
                let preset_names: Vec<String> =
                    self.presets.iter().map(|p| p.name.clone()).collect();
                let current = self.theme.name.clone();
                egui::ComboBox::from_id_source("theme_select")
                    .selected_text(current.clone())
                    .show_ui(ui, |ui| {
                        for name in preset_names {
                            if ui.selectable_label(current == name, name.clone()).clicked() {
                                self.switch_theme(&name, ctx);
                            }
                        }
                    });
            });
        });
    }

    fn render_nav(&mut self, ui: &mut egui::Ui) {
        ui.add_space(8.0);
        for panel in Panel::ALL {
            let active = self.panel == panel;
            if ui.selectable_label(active, panel.title()).clicked() {
                self.set_panel(panel);
            }
        }
        ui.add_space(12.0);
        ui.separator();
        if ui
            .add_enabled(!self.refreshing, egui::Button::new("Refresh data"))
            .clicked()
        {
            self.spawn_fetch_crimes();
        }
        if self.refreshing {
            ui.label(RichText::new("Refreshing...").color(self.theme.muted_color()));
        }
    }

    fn render_dashboard(&mut self, ui: &mut egui::Ui) {
        ScrollArea::vertical().auto_shrink([false; 2]).show(ui, |ui| {
            ui.heading("Command overview");
            self.render_notice(ui, &self.fetch_notice.clone());

            ui.add_space(8.0);
            ui.horizontal_wrapped(|ui| {
                self.stat_card(
                    ui,
                    "Crime records",
                    self.db.total_count().to_string(),
                    self.theme.accent_color(),
                );
                self.stat_card(
                    ui,
                    "Open cases",
                    self.db.open_cases().to_string(),
                    self.theme.warning_color(),
                );
                self.stat_card(
                    ui,
                    "Officers on duty",
                    self.settings.officers_on_duty.to_string(),
                    self.theme.success_color(),
                );
                self.stat_card(
                    ui,
                    "Active hotspots",
                    self.settings.active_hotspots.to_string(),
                    self.theme.danger_color(),
                );
            });

            ui.add_space(12.0);
            let hotspots = self.dashboard_hotspots.clone();
            let type_counts = self.db.type_counts().to_vec();
            let theme = self.theme.clone();
            ui.columns(2, |columns| {
                columns[0].label(RichText::new("Hotspot preview").strong());
                maps::render_hotspot_map(
                    &mut columns[0],
                    "dashboard_map",
                    &hotspots,
                    maps::PREVIEW_HOTSPOT_RADIUS_M,
                    280.0,
                );

                columns[1].label(RichText::new("Crime type distribution").strong());
                charts::render_type_donut(&mut columns[1], &theme, &type_counts);
            });

            ui.add_space(12.0);
            ui.label(RichText::new("Live dispatch feed").strong());
            let (message, alpha) = self.feed.current();
            let message = message.to_string();
            egui::Frame::none()
                .fill(self.theme.surface_color())
                .stroke(egui::Stroke::new(1.0, self.theme.border_color()))
                .rounding(egui::Rounding::same(self.theme.radius))
                .inner_margin(egui::vec2(12.0, 8.0))
                .show(ui, |ui| {
                    ui.label(
                        RichText::new(message)
                            .color(self.theme.text_color().gamma_multiply(alpha)),
                    );
                });
        });
    }

    fn render_map(&mut self, ui: &mut egui::Ui) {
        ui.heading("Crime map");
        if self.db.is_empty() {
            ui.label(
                RichText::new("No crime records loaded. Refresh to populate the map.")
                    .color(self.theme.muted_color()),
            );
        }

        let mut selected = self.selected_crime;
        maps::render_crime_map(ui, self.db.crimes(), &mut selected, 420.0);
        self.selected_crime = selected;

        match self.selected_crime.and_then(|id| self.db.find(id)).cloned() {
            Some(crime) => {
                ui.add_space(8.0);
                egui::Frame::none()
                    .fill(self.theme.surface_color())
                    .stroke(egui::Stroke::new(1.0, self.theme.border_color()))
                    .rounding(egui::Rounding::same(self.theme.radius))
                    .inner_margin(egui::vec2(12.0, 8.0))
                    .show(ui, |ui| {
                        ui.label(
                            RichText::new(&crime.crime_type)
                                .strong()
                                .color(self.theme.accent_color()),
                        );
                        ui.label(
                            RichText::new(format_date(&crime.occurrence_date))
                                .color(self.theme.muted_color()),
                        );
                        if let Some(description) = &crime.description {
                            ui.label(description);
                        }
                        ui.horizontal(|ui| {
                            ui.label("Arrested:");
                            if crime.arrested {
                                self.badge(ui, "Yes", self.theme.success_color());
                            } else {
                                self.badge(ui, "No", self.theme.danger_color());
                            }
                        });
                    });
            }
            None => {
                self.selected_crime = None;
                ui.label(
                    RichText::new("Click a marker to see the record details.")
                        .color(self.theme.muted_color()),
                );
            }
        }
    }

    fn render_trends(&mut self, ui: &mut egui::Ui) {
        ui.heading("Crime trends");
        ui.label(
            RichText::new(
                "Static illustrative series; a live time-series endpoint is not wired up yet.",
            )
            .color(self.theme.muted_color()),
        );
        ui.add_space(8.0);
        charts::render_trend_chart(ui, &self.theme, 360.0);

        ui.add_space(16.0);
        ui.label(RichText::new("Type distribution (current snapshot)").strong());
        let type_counts = self.db.type_counts().to_vec();
        charts::render_type_donut(ui, &self.theme, &type_counts);
    }

    fn render_predictions(&mut self, ui: &mut egui::Ui) {
        ScrollArea::vertical().auto_shrink([false; 2]).show(ui, |ui| {
            ui.heading("Area safety check");
            ui.horizontal(|ui| {
                ui.add(
                    egui::TextEdit::singleline(&mut self.safety_area)
                        .hint_text("Area name, e.g. Connaught Place")
                        .desired_width(280.0),
                );
                let label = if self.safety_in_flight {
                    "Checking..."
                } else {
                    "Check safety"
                };
                if ui
                    .add_enabled(!self.safety_in_flight, egui::Button::new(label))
                    .clicked()
                {
                    let area = self.safety_area.trim().to_string();
                    if area.is_empty() {
                        self.safety_notice =
                            Some(Notice::Error("Enter an area name first.".to_string()));
                    } else {
                        self.safety_notice = None;
                        self.safety_result = None;
                        self.spawn_safety(area);
                    }
                }
            });
            self.render_notice(ui, &self.safety_notice.clone());

            if let Some(report) = self.safety_result.clone() {
                let band =
                    charts::severity_color(report.score, &self.settings.safety, &self.theme);
                ui.add_space(8.0);
                egui::Frame::none()
                    .fill(self.theme.surface_color())
                    .stroke(egui::Stroke::new(1.0, band))
                    .rounding(egui::Rounding::same(self.theme.radius))
                    .inner_margin(egui::vec2(14.0, 10.0))
                    .show(ui, |ui| {
                        ui.horizontal(|ui| {
                            ui.label(
                                RichText::new(format!("{:.1} / 10", report.score))
                                    .size(28.0)
                                    .strong()
                                    .color(band),
                            );
                            ui.label(RichText::new(&report.label).strong());
                        });
                        ui.label(&report.summary);
                        if !report.source.is_empty() {
                            ui.label(
                                RichText::new(format!("Source: {}", report.source))
                                    .small()
                                    .color(self.theme.muted_color()),
                            );
                        }
                    });
            }

            ui.add_space(16.0);
            ui.label(RichText::new("Predicted hotspots").strong());
            if self.prediction_hotspots.is_empty() {
                ui.label(
                    RichText::new("No hotspot predictions available.")
                        .color(self.theme.muted_color()),
                );
            }
            let hotspots = self.prediction_hotspots.clone();
            maps::render_hotspot_map(
                ui,
                "prediction_map",
                &hotspots,
                maps::PREDICTION_HOTSPOT_RADIUS_M,
                360.0,
            );
        });
    }

    fn render_reports(&mut self, ui: &mut egui::Ui) {
        ScrollArea::vertical().auto_shrink([false; 2]).show(ui, |ui| {
            ui.heading("Crime records");
            self.render_notice(ui, &self.fetch_notice.clone());

            ui.horizontal(|ui| {
                ui.label("Filter by type:");
                let type_labels: Vec<String> = self
                    .db
                    .type_counts()
                    .iter()
                    .map(|(label, _)| label.clone())
                    .collect();
                egui::ComboBox::from_id_source("crime_filter")
                    .selected_text(self.filter.label().to_string())
                    .show_ui(ui, |ui| {
                        if ui
                            .selectable_label(self.filter == TypeFilter::All, "ALL")
                            .clicked()
                        {
                            self.filter = TypeFilter::All;
                        }
                        for label in type_labels {
                            let selected = self.filter == TypeFilter::Only(label.clone());
                            if ui.selectable_label(selected, label.clone()).clicked() {
                                self.filter = TypeFilter::Only(label);
                            }
                        }
                    });

                if ui.button("Export CSV").clicked() {
                    self.export_csv();
                }
            });
            self.render_notice(ui, &self.export_notice.clone());

            ui.add_space(8.0);
            self.render_records_table(ui);

            ui.add_space(20.0);
            ui.separator();
            self.render_submission_form(ui);
        });
    }

    fn render_records_table(&mut self, ui: &mut egui::Ui) {
        let rows = build_rows(self.db.crimes(), &self.filter);
        egui::Grid::new("records_grid")
            .striped(true)
            .num_columns(5)
            .min_col_width(90.0)
            .show(ui, |ui| {
                for header in ["ID", "Type", "Date", "Location", "Arrested"] {
                    ui.label(
                        RichText::new(header)
                            .strong()
                            .color(self.theme.muted_color()),
                    );
                }
                ui.end_row();

                for row in &rows {
                    if row.is_placeholder {
                        ui.label("");
                        ui.label(RichText::new(&row.crime_type).color(self.theme.muted_color()));
                        ui.label("");
                        ui.label("");
                        ui.label("");
                        ui.end_row();
                        continue;
                    }
                    ui.label(&row.id);
                    ui.label(&row.crime_type);
                    ui.label(&row.date);
                    ui.label(&row.coords);
                    if row.arrested {
                        self.badge(ui, "Yes", self.theme.success_color());
                    } else {
                        self.badge(ui, "No", self.theme.danger_color());
                    }
                    ui.end_row();
                }
            });
    }

    fn render_submission_form(&mut self, ui: &mut egui::Ui) {
        ui.heading("Report a crime");
        ui.horizontal(|ui| {
            ui.label("Type");
            egui::ComboBox::from_id_source("entry_type")
                .selected_text(if self.form.crime_type.is_empty() {
                    "Select...".to_string()
                } else {
                    self.form.crime_type.clone()
                })
                .show_ui(ui, |ui| {
                    for option in CRIME_TYPE_OPTIONS {
                        if ui
                            .selectable_label(self.form.crime_type == *option, *option)
                            .clicked()
                        {
                            self.form.crime_type = option.to_string();
                        }
                    }
                });
            ui.label("Date");
            ui.add(
                egui::TextEdit::singleline(&mut self.form.date)
                    .hint_text("YYYY-MM-DD")
                    .desired_width(110.0),
            );
            ui.label("Time");
            ui.add(
                egui::TextEdit::singleline(&mut self.form.time)
                    .hint_text("HH:MM")
                    .desired_width(70.0),
            );
        });
        ui.horizontal(|ui| {
            ui.label("Location");
            ui.add(
                egui::TextEdit::singleline(&mut self.form.location)
                    .hint_text("Area or landmark")
                    .desired_width(220.0),
            );
            ui.label("Lat");
            ui.add(
                egui::TextEdit::singleline(&mut self.form.lat)
                    .hint_text("28.6139")
                    .desired_width(90.0),
            );
            ui.label("Lng");
            ui.add(
                egui::TextEdit::singleline(&mut self.form.lng)
                    .hint_text("77.2090")
                    .desired_width(90.0),
            );
        });
        ui.label("Description");
        ui.add(
            egui::TextEdit::multiline(&mut self.form.description)
                .hint_text("What happened?")
                .desired_rows(3)
                .desired_width(f32::INFINITY),
        );

        let label = if self.submitting {
            "Submitting..."
        } else {
            "Submit report"
        };
        if ui
            .add_enabled(!self.submitting, egui::Button::new(label))
            .clicked()
        {
            match self.validated_submission() {
                Ok(report) => {
                    self.submit_notice = None;
                    self.spawn_submit(report);
                }
                Err(msg) => {
                    self.submit_notice = Some(Notice::Error(msg));
                }
            }
        }
        self.render_notice(ui, &self.submit_notice.clone());
    }

    fn validated_submission(&self) -> Result<CrimeSubmission, String> {
        let form = &self.form;
        if form.crime_type.trim().is_empty() {
            return Err("Select a crime type first.".to_string());
        }
        if form.location.trim().is_empty() {
            return Err("Enter a location label.".to_string());
        }
        let lat: f64 = form
            .lat
            .trim()
            .parse()
            .map_err(|_| "Latitude must be a number.".to_string())?;
        let lng: f64 = form
            .lng
            .trim()
            .parse()
            .map_err(|_| "Longitude must be a number.".to_string())?;

        let timestamp = compose_occurrence_timestamp(form.date.trim(), form.time.trim());
        NaiveDateTime::parse_from_str(&timestamp, "%Y-%m-%d %H:%M:%S")
            .map_err(|_| "Date must be YYYY-MM-DD and time HH:MM.".to_string())?;

        Ok(CrimeSubmission {
            kind: form.crime_type.trim().to_string(),
            date: timestamp,
            location: form.location.trim().to_string(),
            lat,
            lng,
            description: form.description.trim().to_string(),
        })
    }

    fn render_admin(&mut self, ui: &mut egui::Ui) {
        ui.heading("Administration");
        if let Some(session) = &self.session {
            ui.label(
                RichText::new(format!(
                    "Signed in as {} ({})",
                    session.username, session.role
                ))
                .color(self.theme.muted_color()),
            );
        }
        self.render_notice(ui, &self.admin_notice.clone());
        ui.add_space(12.0);

        ui.horizontal(|ui| {
            if ui.button("Generate report").clicked() {
                match self.write_report() {
                    Ok(path) => {
                        self.admin_notice = Some(Notice::Info(format!(
                            "Report written to {} - open it in a browser to print.",
                            path.display()
                        )));
                    }
                    Err(e) => {
                        eprintln!("[admin] Report generation failed: {e}");
                        self.admin_notice =
                            Some(Notice::Error(format!("Could not write report: {e}")));
                    }
                }
            }

            if ui.button("Manage users").clicked() {
                // The list is fetched fresh on every open, never cached
                // across opens.
                self.users.clear();
                self.pending_user_delete = None;
                self.users_notice = None;
                self.show_users_modal = true;
                self.spawn_fetch_users();
            }
        });

        ui.add_space(16.0);
        ui.label(
            RichText::new("Danger zone")
                .strong()
                .color(self.theme.danger_color()),
        );
        if !self.confirm_reset {
            if ui.button("Reset database").clicked() {
                self.confirm_reset = true;
            }
        } else {
            ui.horizontal(|ui| {
                ui.colored_label(
                    self.theme.danger_color(),
                    "This wipes every crime record. Continue?",
                );
                let label = if self.reset_in_flight {
                    "Resetting..."
                } else {
                    "Confirm reset"
                };
                if ui
                    .add_enabled(!self.reset_in_flight, egui::Button::new(label))
                    .clicked()
                {
                    self.spawn_db_reset();
                }
                if ui
                    .add_enabled(!self.reset_in_flight, egui::Button::new("Cancel"))
                    .clicked()
                {
                    self.confirm_reset = false;
                }
            });
        }
    }

    fn render_users_modal(&mut self, ctx: &Context) {
        if !self.show_users_modal {
            return;
        }
        let mut open = true;
        egui::Window::new("User management")
            .open(&mut open)
            .resizable(true)
            .default_width(380.0)
            .show(ctx, |ui| {
                if self.users_loading {
                    ui.label("Loading users...");
                }
                self.render_notice(ui, &self.users_notice.clone());

                let users = self.users.clone();
                ScrollArea::vertical().max_height(300.0).show(ui, |ui| {
                    for user in &users {
                        ui.horizontal(|ui| {
                            ui.label(format!("#{}", user.id));
                            ui.label(RichText::new(&user.username).strong());
                            ui.label(RichText::new(&user.role).color(self.theme.muted_color()));
                            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                                if self.pending_user_delete == Some(user.id) {
                                    if ui.button("Confirm").clicked() {
                                        self.pending_user_delete = None;
                                        self.spawn_delete_user(user.id);
                                    }
                                    if ui.button("Keep").clicked() {
                                        self.pending_user_delete = None;
                                    }
                                } else if ui.button("Delete").clicked() {
                                    self.pending_user_delete = Some(user.id);
                                }
                            });
                        });
                        ui.separator();
                    }
                    if users.is_empty() && !self.users_loading {
                        ui.label(
                            RichText::new("No users found.").color(self.theme.muted_color()),
                        );
                    }
                });
            });
        if !open {
            self.show_users_modal = false;
        }
    }

    fn export_csv(&mut self) {
        if self.db.is_empty() {
            self.export_notice = Some(Notice::Error("No records to export.".to_string()));
            return;
        }

        let picked = FileDialog::new()
            .add_filter("csv", &["csv"])
            .set_directory(self.base_path.join("exports"))
            .set_file_name("crime_records.csv")
            .save_file();
        let Some(path) = picked else {
            return;
        };

        let csv = csv_export::render_csv(self.db.crimes());
        match fs::write(&path, csv) {
            Ok(()) => {
                self.export_notice = Some(Notice::Info(format!(
                    "Exported {} records to {}",
                    self.db.crimes().len(),
                    path.display()
                )));
            }
            Err(e) => {
                eprintln!("[export] CSV write failed: {e}");
                self.export_notice = Some(Notice::Error(format!("Could not write CSV: {e}")));
            }
        }
    }

    /// Static HTML report of the first records in the snapshot, written to
    /// the reports folder for printing from a browser.
    fn write_report(&self) -> io::Result<PathBuf> {
        let dir = self.base_path.join("reports");
        fs::create_dir_all(&dir)?;
        let path = dir.join(format!(
            "crime_report_{}.html",
            Local::now().format("%Y%m%d_%H%M%S")
        ));

        let mut rows = String::new();
        for crime in self.db.crimes().iter().take(REPORT_RECORD_LIMIT) {
            rows.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                crime.crime_id,
                escape_html(&crime.crime_type),
                escape_html(&format_date(&crime.occurrence_date)),
                escape_html(crime.description.as_deref().unwrap_or("")),
                if crime.arrested { "Yes" } else { "No" },
            ));
        }

        let html = format!(
            "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\">\n\
             <title>CrimeDesk report</title>\n\
             <style>body{{font-family:sans-serif}}table{{border-collapse:collapse}}\
             td,th{{border:1px solid #999;padding:4px 8px}}</style></head>\n\
             <body><h1>CrimeDesk report</h1>\n\
             <p>Generated {} - first {} of {} records</p>\n\
             <table><tr><th>ID</th><th>Type</th><th>Date</th><th>Description</th>\
             <th>Arrested</th></tr>\n{}</table></body></html>\n",
            Local::now().format("%Y-%m-%d %H:%M"),
            self.db.crimes().len().min(REPORT_RECORD_LIMIT),
            self.db.crimes().len(),
            rows,
        );

        fs::write(&path, html)?;
        Ok(path)
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

impl App for CrimeDeskApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.drain_events();

        if self.session.is_none() {
            self.render_login(ctx);
            if self.login_in_flight {
                ctx.request_repaint_after(Duration::from_millis(150));
            }
            return;
        }

        TopBottomPanel::top("top_bar").show(ctx, |ui| self.render_top_bar(ctx, ui));

        SidePanel::left("nav")
            .resizable(false)
            .default_width(150.0)
            .show(ctx, |ui| self.render_nav(ui));

        CentralPanel::default().show(ctx, |ui| match self.panel {
            Panel::Dashboard => self.render_dashboard(ui),
            Panel::Map => self.render_map(ui),
            Panel::Trends => self.render_trends(ui),
            Panel::Predictions => self.render_predictions(ui),
            Panel::Reports => self.render_reports(ui),
            Panel::Admin => self.render_admin(ui),
        });

        self.render_users_modal(ctx);

        let busy = self.refreshing
            || self.submitting
            || self.safety_in_flight
            || self.users_loading
            || self.reset_in_flight;
        if self.panel == Panel::Dashboard {
            // Keep the feed animation moving.
            ctx.request_repaint_after(Duration::from_millis(50));
        } else if busy {
            ctx.request_repaint_after(Duration::from_millis(150));
        }
    }
}

pub fn launch_gui(base_path: PathBuf, settings: Settings) -> Result<(), eframe::Error> {
    let (width, height) = settings.ui.window_size.unwrap_or((1200.0, 760.0));
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("CrimeDesk")
            .with_inner_size([width, height])
            .with_min_inner_size([960.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "CrimeDesk",
        native_options,
        Box::new(move |cc| Box::new(CrimeDeskApp::new(cc, base_path, settings))),
    )
}
