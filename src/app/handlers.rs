//! Key handlers for each screen.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::path::PathBuf;

use crate::{
    events::{FieldKind, FormField, Screen},
    input::{InputBoxState, InputCallbackId, InputMask},
    lead::{LeadRecord, SubmitStatus},
    shortcuts::matches_shortcut,
    worker::WorkerCmd,
};

use super::App;

/// Handle one key press; returns true when the app should exit.
pub async fn handle_key(app: &mut App, k: KeyEvent) -> Result<bool> {
    if app.input_box.is_some() {
        return handle_input_box_key(app, k).await;
    }

    let sc = &app.shortcuts.global;
    if matches_shortcut(&k, &sc.quit) {
        return Ok(true);
    }
    let target = if matches_shortcut(&k, &sc.form) {
        Some(Screen::Form)
    } else if matches_shortcut(&k, &sc.breakdown) {
        Some(Screen::Breakdown)
    } else if matches_shortcut(&k, &sc.photos) {
        Some(Screen::Photos)
    } else if matches_shortcut(&k, &sc.about) {
        Some(Screen::About)
    } else if matches_shortcut(&k, &sc.settings) {
        Some(Screen::Settings)
    } else {
        None
    };
    if let Some(screen) = target {
        if screen == Screen::Settings {
            reload_settings_buffers(app);
        }
        app.ui.screen = screen;
        app.ui.status = screen.name().into();
        return Ok(false);
    }

    match app.ui.screen {
        Screen::Form => handle_form_key(app, k).await?,
        Screen::Breakdown => {}
        Screen::Photos => handle_photos_key(app, k),
        Screen::About => handle_about_key(app, k),
        Screen::Settings => handle_settings_key(app, k).await?,
    }
    Ok(false)
}

pub fn is_ctrl_c(k: &KeyEvent) -> bool {
    k.modifiers.contains(KeyModifiers::CONTROL) && k.code == KeyCode::Char('c')
}

async fn handle_form_key(app: &mut App, k: KeyEvent) -> Result<()> {
    let sc = app.shortcuts.form.clone();
    let field = app.ui.current_field();

    if matches_shortcut(&k, &sc.down) {
        if app.ui.form_cursor + 1 < FormField::ALL.len() {
            app.ui.form_cursor += 1;
        }
    } else if matches_shortcut(&k, &sc.up) {
        app.ui.form_cursor = app.ui.form_cursor.saturating_sub(1);
    } else if edit_locked(app) {
        // Cursor moves only until the pending lead lands.
    } else if matches_shortcut(&k, &sc.submit) {
        attempt_submit(app).await?;
    } else if matches_shortcut(&k, &sc.edit) {
        match field.kind() {
            FieldKind::Text => open_field_input(app, field),
            FieldKind::Select => cycle_select(app, field, true),
            FieldKind::Toggle => flip_toggle(app, field),
        }
    } else if matches_shortcut(&k, &sc.next_option) || matches_shortcut(&k, &sc.prev_option) {
        let forward = matches_shortcut(&k, &sc.next_option);
        match field.kind() {
            FieldKind::Select => cycle_select(app, field, forward),
            FieldKind::Toggle => flip_toggle(app, field),
            FieldKind::Text => {}
        }
    }
    Ok(())
}

/// Raw text currently held by a text field.
fn field_text(app: &App, field: FormField) -> String {
    let v = &app.form.vehicle;
    let c = &app.form.contact;
    match field {
        FormField::Model => v.model.clone(),
        FormField::Year => v.year.map(|y| y.to_string()).unwrap_or_default(),
        FormField::Mileage => v.mileage_km.map(|m| m.to_string()).unwrap_or_default(),
        FormField::Name => c.name.clone(),
        FormField::Phone => c.phone.clone(),
        FormField::Vin => v.vin.clone(),
        FormField::Comment => c.comment.clone(),
        _ => String::new(),
    }
}

fn open_field_input(app: &mut App, field: FormField) {
    let (prompt, mask) = match field {
        FormField::Model => ("Model (Camry, A4, Rio...):", InputMask::None),
        FormField::Year => ("Year of manufacture:", InputMask::None),
        FormField::Mileage => ("Mileage, km:", InputMask::None),
        FormField::Name => ("Your name:", InputMask::None),
        FormField::Phone => ("Phone +7 (___) ___-__-__:", InputMask::Phone),
        FormField::Vin => ("VIN (17 characters, no I/O/Q):", InputMask::Vin),
        FormField::Comment => ("Comment (one owner, dealer service...):", InputMask::None),
        _ => return,
    };
    app.input_box = Some(InputBoxState::new(
        prompt,
        field_text(app, field),
        InputCallbackId::Form(field),
        mask,
    ));
}

/// Next (or previous) option after `current`, wrapping; an unknown value
/// starts at the first (or last) option.
pub fn cycle<'a>(options: &'a [String], current: &str, forward: bool) -> Option<&'a str> {
    if options.is_empty() {
        return None;
    }
    let n = options.len();
    let idx = match options.iter().position(|o| o == current) {
        Some(i) if forward => (i + 1) % n,
        Some(i) => (i + n - 1) % n,
        None if forward => 0,
        None => n - 1,
    };
    Some(options[idx].as_str())
}

fn cycle_select(app: &mut App, field: FormField, forward: bool) {
    let catalog = &app.cfg.catalog;
    let next = match field {
        FormField::Make => cycle(&catalog.makes, &app.form.vehicle.make, forward)
            .map(|m| app.form.with_make(m)),
        FormField::City => cycle(&catalog.cities, &app.form.vehicle.city, forward)
            .map(|c| app.form.with_city(c)),
        FormField::Condition => {
            let tags: Vec<String> = catalog
                .conditions
                .iter()
                .map(|c| c.value.as_str().to_string())
                .collect();
            let current = app
                .form
                .vehicle
                .condition
                .map(|c| c.as_str())
                .unwrap_or("");
            cycle(&tags, current, forward).and_then(|tag| {
                catalog
                    .conditions
                    .iter()
                    .find(|c| c.value.as_str() == tag)
                    .map(|c| app.form.with_condition(Some(c.value)))
            })
        }
        _ => None,
    };
    if let Some(form) = next {
        app.form = form;
    }
}

fn flip_toggle(app: &mut App, field: FormField) {
    app.form = match field {
        FormField::OnCredit => app.form.with_on_credit(!app.form.on_credit),
        FormField::TradeIn => app.form.with_trade_in(!app.form.trade_in),
        FormField::Consent => app.form.with_consent(!app.form.contact.consent),
        _ => return,
    };
}

/// True while a lead is in flight; tells the user why the key did nothing.
fn edit_locked(app: &mut App) -> bool {
    if app.is_sending() {
        app.ui.status = "Sending request, please wait".into();
        true
    } else {
        false
    }
}

/// Validate and, when clean, hand the lead to the worker.
async fn attempt_submit(app: &mut App) -> Result<()> {
    // From now on field errors are shown.
    app.ui.submitted = true;

    let errors = app.errors();
    if !errors.is_empty() {
        let keys: Vec<&str> = errors.keys().map(|f| f.as_str()).collect();
        tracing::info!("submit blocked: {}", keys.join(", "));
        app.ui.status = format!("Please fix {} field(s)", errors.len());
        return Ok(());
    }
    if edit_locked(app) {
        return Ok(());
    }

    // Freeze the snapshot that goes out, with the estimate shown right now.
    let estimate = app.breakdown().final_value;
    let lead = LeadRecord::from_form(&app.form, estimate, app.photos.paths());
    tracing::info!("submit lead {} (estimate {estimate})", lead.id);
    app.pending_lead = Some(lead.id);
    app.sent_form = Some(app.form.clone());
    app.submit = SubmitStatus::Sending;
    app.ui.error = None;
    // Delivery happens on the worker; the result comes back as an event.
    app.worker_tx.send(WorkerCmd::Submit(lead)).await?;
    app.ui.status = "Sending request...".into();
    Ok(())
}

fn handle_photos_key(app: &mut App, k: KeyEvent) {
    let sc = app.shortcuts.photos.clone();

    if matches_shortcut(&k, &sc.down) {
        if app.ui.photo_cursor + 1 < app.photos.len() {
            app.ui.photo_cursor += 1;
        }
    } else if matches_shortcut(&k, &sc.up) {
        app.ui.photo_cursor = app.ui.photo_cursor.saturating_sub(1);
    } else if edit_locked(app) {
        // The pending lead carries the current photo list.
    } else if matches_shortcut(&k, &sc.add) {
        if app.photos.len() >= app.photos.max() {
            app.ui.status = format!("Up to {} photos", app.photos.max());
            return;
        }
        app.input_box = Some(InputBoxState::new(
            "Photo paths (separate with ;):",
            "",
            InputCallbackId::AddPhotos,
            InputMask::None,
        ));
    } else if matches_shortcut(&k, &sc.replace) {
        app.input_box = Some(InputBoxState::new(
            "New photo paths (separate with ;):",
            "",
            InputCallbackId::ReplacePhotos,
            InputMask::None,
        ));
    } else if matches_shortcut(&k, &sc.remove) {
        if let Some(path) = app.photos.remove(app.ui.photo_cursor) {
            app.ui.status = format!("Removed {}", path.display());
            app.ui.photo_cursor = app
                .ui
                .photo_cursor
                .min(app.photos.len().saturating_sub(1));
        }
    } else if matches_shortcut(&k, &sc.clear) {
        app.photos.clear();
        app.ui.photo_cursor = 0;
        app.ui.status = "Photos cleared".into();
    }
}

fn attach_photos(app: &mut App, value: &str, replace: bool) {
    // Paths are `;`-separated; blanks are skipped.
    let paths: Vec<PathBuf> = value
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .collect();
    let outcome = if replace {
        app.ui.photo_cursor = 0;
        app.photos.replace_all(paths)
    } else {
        app.photos.add_files(paths)
    };

    // Over-limit drops stay silent; rejected files are listed in the log.
    app.ui.status = if outcome.rejected.is_empty() {
        format!("Attached {} photo(s)", outcome.accepted)
    } else {
        format!(
            "Attached {} photo(s), {} not an image",
            outcome.accepted,
            outcome.rejected.len()
        )
    };
    for (path, reason) in outcome.rejected {
        app.ui.push_log(format!("{}: {reason}", path.display()));
    }
}

fn handle_about_key(app: &mut App, k: KeyEvent) {
    let sc = &app.shortcuts.about;
    if matches_shortcut(&k, &sc.next) {
        app.landing.next();
    } else if matches_shortcut(&k, &sc.prev) {
        app.landing.prev();
    }
}

async fn handle_settings_key(app: &mut App, k: KeyEvent) -> Result<()> {
    let sc = &app.shortcuts.settings;

    if matches_shortcut(&k, &sc.cancel) {
        reload_settings_buffers(app);
        app.ui.screen = Screen::Form;
    } else if matches_shortcut(&k, &sc.save) {
        app.cfg.submission.endpoint = app.endpoint.trim().to_string();
        app.cfg.submission.outbox_dir = app.outbox_dir.trim().to_string();
        app.cfg.save(&app.cfg_path)?;

        app.worker_tx
            .send(WorkerCmd::SaveSettings(app.cfg.clone()))
            .await?;
        app.ui.screen = Screen::Form;
        app.ui.status = "Saved settings".into();
    } else if matches_shortcut(&k, &sc.endpoint) {
        app.input_box = Some(InputBoxState::new(
            "Submission endpoint (empty = local outbox):",
            app.endpoint.clone(),
            InputCallbackId::SettingsEndpoint,
            InputMask::None,
        ));
    } else if matches_shortcut(&k, &sc.outbox) {
        app.input_box = Some(InputBoxState::new(
            "Outbox directory:",
            app.outbox_dir.clone(),
            InputCallbackId::SettingsOutbox,
            InputMask::None,
        ));
    }
    Ok(())
}

async fn handle_input_box_key(app: &mut App, k: KeyEvent) -> Result<bool> {
    let Some(input_state) = &mut app.input_box else {
        return Ok(false);
    };
    let sc = &app.shortcuts.input_box;

    if matches_shortcut(&k, &sc.confirm) {
        let value = input_state.value.clone();
        let callback_id = input_state.callback_id;
        app.input_box = None;
        apply_input_callback(app, callback_id, value);
    } else if matches_shortcut(&k, &sc.cancel) {
        app.input_box = None;
    } else if matches_shortcut(&k, &sc.backspace) {
        input_state.backspace();
    } else if matches_shortcut(&k, &sc.delete) {
        input_state.delete();
    } else if matches_shortcut(&k, &sc.left) {
        input_state.move_left();
    } else if matches_shortcut(&k, &sc.right) {
        input_state.move_right();
    } else if matches_shortcut(&k, &sc.home) {
        input_state.move_home();
    } else if matches_shortcut(&k, &sc.end) {
        input_state.move_end();
    } else if matches_shortcut(&k, &sc.clear_line) {
        input_state.clear_line();
    } else if let KeyCode::Char(c) = k.code
        && !k.modifiers.contains(KeyModifiers::CONTROL)
    {
        input_state.insert_char(c);
    }

    Ok(false)
}

fn apply_input_callback(app: &mut App, callback_id: InputCallbackId, value: String) {
    match callback_id {
        InputCallbackId::Form(field) => {
            let f = &app.form;
            app.form = match field {
                FormField::Model => f.with_model(value.trim()),
                FormField::Year => f.with_year(&value),
                FormField::Mileage => f.with_mileage(&value),
                FormField::Name => f.with_name(value.trim()),
                FormField::Phone => f.with_phone(&value),
                FormField::Vin => f.with_vin(value.trim()),
                FormField::Comment => f.with_comment(value),
                _ => return,
            };
        }
        InputCallbackId::AddPhotos => attach_photos(app, &value, false),
        InputCallbackId::ReplacePhotos => attach_photos(app, &value, true),
        InputCallbackId::SettingsEndpoint => app.endpoint = value,
        InputCallbackId::SettingsOutbox => app.outbox_dir = value,
    }
}

/// Refill the settings buffers from the saved config.
fn reload_settings_buffers(app: &mut App) {
    app.endpoint = app.cfg.submission.endpoint.clone();
    app.outbox_dir = app.cfg.submission.outbox_dir.clone();
}
