//! Screens, form fields, and UI state shared with the renderer.

use crate::validation::Field;

/// Screen currently shown in the TUI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    /// Lead form with the live estimate.
    Form,
    /// Price breakdown.
    Breakdown,
    /// Attached photos.
    Photos,
    /// Landing-page sections.
    About,
    /// Submission settings.
    Settings,
}

impl Screen {
    pub fn name(self) -> &'static str {
        match self {
            Screen::Form => "Form",
            Screen::Breakdown => "Breakdown",
            Screen::Photos => "Photos",
            Screen::About => "About",
            Screen::Settings => "Settings",
        }
    }
}

/// How a form field is edited.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    /// Opens an input box.
    Text,
    /// Cycles through catalog options.
    Select,
    /// Flips on/off.
    Toggle,
}

/// Rows of the lead form, in display order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormField {
    Make,
    Model,
    Year,
    Mileage,
    Condition,
    City,
    Name,
    Phone,
    Vin,
    Comment,
    OnCredit,
    TradeIn,
    Consent,
}

impl FormField {
    pub const ALL: [FormField; 13] = [
        FormField::Make,
        FormField::Model,
        FormField::Year,
        FormField::Mileage,
        FormField::Condition,
        FormField::City,
        FormField::Name,
        FormField::Phone,
        FormField::Vin,
        FormField::Comment,
        FormField::OnCredit,
        FormField::TradeIn,
        FormField::Consent,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FormField::Make => "Make*",
            FormField::Model => "Model*",
            FormField::Year => "Year*",
            FormField::Mileage => "Mileage, km*",
            FormField::Condition => "Condition",
            FormField::City => "City",
            FormField::Name => "Name*",
            FormField::Phone => "Phone*",
            FormField::Vin => "VIN (optional)",
            FormField::Comment => "Comment",
            FormField::OnCredit => "Car is under a loan",
            FormField::TradeIn => "Considering trade-in",
            FormField::Consent => "I agree to be contacted and to data processing",
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            FormField::Make | FormField::Condition | FormField::City => FieldKind::Select,
            FormField::OnCredit | FormField::TradeIn | FormField::Consent => FieldKind::Toggle,
            _ => FieldKind::Text,
        }
    }

    /// Validation key whose error is shown on this row.
    pub fn error_key(self) -> Option<Field> {
        match self {
            FormField::Make => Some(Field::Make),
            FormField::Model => Some(Field::Model),
            FormField::Year => Some(Field::Year),
            FormField::Mileage => Some(Field::Mileage),
            FormField::Name => Some(Field::Name),
            FormField::Phone => Some(Field::Phone),
            FormField::Vin => Some(Field::Vin),
            FormField::Consent => Some(Field::Agreed),
            _ => None,
        }
    }
}

/// Log lines kept for the side panels; older ones are dropped.
pub const LOG_LIMIT: usize = 200;

/// UI state shared with the renderer.
#[derive(Clone, Debug)]
pub struct UiState {
    pub screen: Screen,
    /// Selected row on the form.
    pub form_cursor: usize,
    /// Selected row on the photos screen.
    pub photo_cursor: usize,
    /// Messages shown in the side panel, at most `LOG_LIMIT`.
    pub log: Vec<String>,
    /// Status bar text.
    pub status: String,
    /// Error shown highlighted in the status bar.
    pub error: Option<String>,
    /// Set on the first submit attempt; field errors show from then on.
    pub submitted: bool,
}

impl UiState {
    pub fn new() -> Self {
        Self {
            screen: Screen::Form,
            form_cursor: 0,
            photo_cursor: 0,
            log: vec![],
            status: "Ready".into(),
            error: None,
            submitted: false,
        }
    }

    pub fn current_field(&self) -> FormField {
        FormField::ALL[self.form_cursor.min(FormField::ALL.len() - 1)]
    }

    /// Append a log line, dropping the oldest past `LOG_LIMIT`.
    pub fn push_log(&mut self, line: impl Into<String>) {
        self.log.push(line.into());
        if self.log.len() > LOG_LIMIT {
            let excess = self.log.len() - LOG_LIMIT;
            self.log.drain(..excess);
        }
    }
}

impl Default for UiState {
    fn default() -> Self {
        Self::new()
    }
}
