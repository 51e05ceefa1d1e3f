//! TUI event loop and application state.

mod handlers;
mod render;

use anyhow::Result;
use chrono::Datelike;
use crossterm::event::{self, Event};
use std::{path::PathBuf, sync::Arc, time::Duration};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::{
    config::Config,
    events::UiState,
    input::InputBoxState,
    landing::LandingState,
    lead::{LeadForm, SubmitStatus},
    photos::{PhotoTray, PreviewRegistry},
    pricing::{PriceBreakdown, PriceEstimator},
    shortcuts::Shortcuts,
    ui::Tui,
    validation::{FormValidator, ValidationErrors},
    worker::{self, WorkerCmd, WorkerEvent},
};

use handlers::{handle_key, is_ctrl_c};
use render::draw;

/// Confirmation shown once a lead is delivered.
pub const CONFIRMATION: &str = "Request sent! Our expert will contact you within 10 minutes.";

/// State shared between input handling and rendering.
pub struct App {
    /// Path to the persisted config file.
    pub cfg_path: PathBuf,
    pub cfg: Config,
    pub ui: UiState,
    /// Current form snapshot.
    pub form: LeadForm,
    pub estimator: PriceEstimator,
    pub validator: FormValidator,
    pub photos: PhotoTray,
    /// Outstanding previews; checked at teardown.
    pub previews: Arc<PreviewRegistry>,
    pub submit: SubmitStatus,
    /// Lead the worker is currently delivering.
    pub pending_lead: Option<Uuid>,
    /// Form as it was when the pending lead was built.
    pub sent_form: Option<LeadForm>,
    pub worker_tx: mpsc::Sender<WorkerCmd>,
    pub worker_rx: mpsc::Receiver<WorkerEvent>,

    /// Settings screen buffer for the endpoint.
    pub endpoint: String,
    /// Settings screen buffer for the outbox directory.
    pub outbox_dir: String,

    /// Open input box, if any.
    pub input_box: Option<InputBoxState>,
    pub landing: LandingState,
    pub shortcuts: Shortcuts,
}

impl App {
    /// Build the state; fails when the pricing rules do not compile.
    pub fn new(
        cfg_path: PathBuf,
        cfg: Config,
        shortcuts: Shortcuts,
        worker_tx: mpsc::Sender<WorkerCmd>,
        worker_rx: mpsc::Receiver<WorkerEvent>,
        current_year: i32,
    ) -> Result<Self> {
        let estimator =
            PriceEstimator::new(cfg.pricing.clone(), cfg.catalog.clone(), current_year)?;
        let validator = FormValidator::new(cfg.validation.clone(), current_year);
        let previews = PreviewRegistry::new();
        Ok(Self {
            form: LeadForm::new(cfg.catalog.default_city()),
            photos: PhotoTray::new(cfg.validation.max_photos, previews.clone()),
            previews,
            estimator,
            validator,
            submit: SubmitStatus::Idle,
            pending_lead: None,
            sent_form: None,
            worker_tx,
            worker_rx,
            endpoint: cfg.submission.endpoint.clone(),
            outbox_dir: cfg.submission.outbox_dir.clone(),
            input_box: None,
            landing: LandingState::new(),
            ui: UiState::new(),
            shortcuts,
            cfg_path,
            cfg,
        })
    }

    /// Estimate for the current snapshot.
    pub fn breakdown(&self) -> PriceBreakdown {
        self.estimator.estimate(&self.form.vehicle)
    }

    pub fn errors(&self) -> ValidationErrors {
        self.validator
            .validate(&self.form, self.form.contact.consent)
    }

    /// Errors to display: none until the first submit attempt.
    pub fn visible_errors(&self) -> ValidationErrors {
        if self.ui.submitted {
            self.errors()
        } else {
            ValidationErrors::new()
        }
    }

    /// Whether a lead is in flight; form and photo edits wait until it lands.
    pub fn is_sending(&self) -> bool {
        self.pending_lead.is_some()
    }

    /// Start over with a blank form and no photos.
    pub fn reset_form(&mut self) {
        self.form = LeadForm::new(self.cfg.catalog.default_city());
        self.photos.clear();
        self.ui.submitted = false;
        self.ui.form_cursor = 0;
        self.ui.photo_cursor = 0;
    }
}

/// Run the main TUI loop until the user exits.
pub async fn run_app(terminal: &mut Tui) -> Result<()> {
    let cfg_path = PathBuf::from("config.toml");
    let cfg = Config::load_or_default(&cfg_path)?;
    let shortcuts = Shortcuts::load_or_default("shortcut.toml")?;

    let (tx_cmd, rx_cmd) = mpsc::channel::<WorkerCmd>(64);
    let (tx_ev, rx_ev) = mpsc::channel::<WorkerEvent>(256);
    tokio::spawn(worker::run(rx_cmd, tx_ev, cfg.clone()));

    let current_year = chrono::Local::now().year();
    let mut app = App::new(cfg_path, cfg, shortcuts, tx_cmd, rx_ev, current_year)?;

    loop {
        terminal.draw(|f| draw(f, &app))?;

        // Drain worker events before handling the next input.
        while let Ok(ev) = app.worker_rx.try_recv() {
            handle_worker_event(&mut app, ev);
        }

        if event::poll(Duration::from_millis(50))?
            && let Event::Key(k) = event::read()?
        {
            if is_ctrl_c(&k) {
                break;
            }
            if handle_key(&mut app, k).await? {
                break;
            }
        }
    }

    app.photos.clear();
    tracing::info!("previews still held at exit: {}", app.previews.live());
    Ok(())
}

/// Apply a worker event to the UI state.
fn handle_worker_event(app: &mut App, ev: WorkerEvent) {
    match ev {
        WorkerEvent::Submitted {
            lead_id,
            destination,
        } => {
            if app.pending_lead != Some(lead_id) {
                tracing::warn!("delivery report for unknown lead {lead_id}");
                return;
            }
            app.pending_lead = None;
            app.submit = SubmitStatus::Sent(destination.clone());
            app.ui.error = None;
            // Only clear what was actually sent.
            if app.sent_form.take().as_ref() == Some(&app.form) {
                app.reset_form();
                app.ui.status = CONFIRMATION.into();
            } else {
                tracing::info!("form changed while sending, keeping it");
                app.ui.status = format!("{CONFIRMATION} Later changes were kept.");
            }
            app.ui.push_log(format!("lead {lead_id} -> {destination}"));
        }
        WorkerEvent::SubmitFailed { lead_id, error } => {
            if app.pending_lead == Some(lead_id) {
                app.pending_lead = None;
                app.sent_form = None;
            }
            app.submit = SubmitStatus::Failed(error.clone());
            app.ui.error = Some(format!("Sending failed: {error}"));
            app.ui.push_log(format!("lead {lead_id} failed"));
        }
        WorkerEvent::Log(s) => app.ui.push_log(s),
        WorkerEvent::Error(s) => app.ui.status = format!("Error: {s}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// App with default config; the worker side of the channels is returned.
    pub(crate) fn test_app() -> (App, mpsc::Receiver<WorkerCmd>, mpsc::Sender<WorkerEvent>) {
        let (tx_cmd, rx_cmd) = mpsc::channel(8);
        let (tx_ev, rx_ev) = mpsc::channel(8);
        let app = App::new(
            PathBuf::from("unused.toml"),
            Config::default(),
            Shortcuts::default(),
            tx_cmd,
            rx_ev,
            2026,
        )
        .unwrap();
        (app, rx_cmd, tx_ev)
    }

    #[test]
    fn test_errors_hidden_until_first_submit() {
        let (mut app, _rx, _tx) = test_app();
        assert!(!app.errors().is_empty());
        assert!(app.visible_errors().is_empty());
        app.ui.submitted = true;
        assert_eq!(app.visible_errors().len(), app.errors().len());
    }

    #[test]
    fn test_delivery_resets_form() {
        let (mut app, _rx, _tx) = test_app();
        let id = Uuid::new_v4();
        app.form = app.form.with_make("BMW");
        app.pending_lead = Some(id);
        app.sent_form = Some(app.form.clone());
        app.ui.submitted = true;

        handle_worker_event(
            &mut app,
            WorkerEvent::Submitted {
                lead_id: id,
                destination: "leads/x.json".into(),
            },
        );

        assert_eq!(app.form.vehicle.make, "");
        assert!(!app.ui.submitted);
        assert_eq!(app.ui.status, CONFIRMATION);
        assert_eq!(app.submit, SubmitStatus::Sent("leads/x.json".into()));
    }

    #[test]
    fn test_delivery_keeps_edits_made_while_sending() {
        let (mut app, _rx, _tx) = test_app();
        let id = Uuid::new_v4();
        app.form = app.form.with_make("BMW");
        app.pending_lead = Some(id);
        app.sent_form = Some(app.form.clone());
        app.form = app.form.with_model("X5 changed later");

        handle_worker_event(
            &mut app,
            WorkerEvent::Submitted {
                lead_id: id,
                destination: "leads/x.json".into(),
            },
        );

        assert_eq!(app.form.vehicle.model, "X5 changed later");
        assert!(app.sent_form.is_none());
        assert!(!app.is_sending());
        assert!(app.ui.status.starts_with(CONFIRMATION));
    }

    #[test]
    fn test_failure_keeps_form() {
        let (mut app, _rx, _tx) = test_app();
        let id = Uuid::new_v4();
        app.form = app.form.with_make("Audi");
        app.pending_lead = Some(id);

        handle_worker_event(
            &mut app,
            WorkerEvent::SubmitFailed {
                lead_id: id,
                error: "HTTP status 500".into(),
            },
        );

        assert_eq!(app.form.vehicle.make, "Audi");
        assert!(app.pending_lead.is_none());
        assert!(app.ui.error.as_deref().unwrap_or("").contains("500"));
    }
}
