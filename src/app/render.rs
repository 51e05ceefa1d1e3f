//! Drawing for every screen.

use ratatui::{
    Frame,
    prelude::*,
    widgets::{Block, Borders, Paragraph, Row, Table, TableState, Wrap},
};

use crate::{
    events::{FormField, Screen},
    input,
    landing::{self, Section},
    layout,
    lead::SubmitStatus,
    money,
    shortcuts::Shortcuts,
    validation::ValidationErrors,
    vin,
};

use super::{App, CONFIRMATION};

fn highlight() -> Style {
    Style::default()
        .bg(Color::Rgb(255, 140, 0))
        .fg(Color::Black)
        .add_modifier(Modifier::BOLD)
}

/// Draw the whole frame.
pub fn draw(f: &mut Frame, app: &App) {
    let main_layout = layout::create_main_layout(f.area());

    match app.ui.screen {
        Screen::Form => draw_form_screen(f, app, main_layout.body),
        Screen::Breakdown => draw_breakdown_screen(f, app, main_layout.body),
        Screen::Photos => draw_photos_screen(f, app, main_layout.body),
        Screen::About => draw_about_screen(f, app, main_layout.body),
        Screen::Settings => draw_settings_screen(f, app, main_layout.body),
    }

    let help_bar = Paragraph::new(get_help_text(app.ui.screen, &app.shortcuts))
        .block(Block::default().borders(Borders::ALL).title("HELP"))
        .wrap(Wrap { trim: true });
    f.render_widget(help_bar, main_layout.help_bar);

    f.render_widget(build_status_bar(app), main_layout.status_bar);

    if let Some(input_state) = &app.input_box {
        input::render_input_box(f, input_state);
    }
}

/// Text shown in the value column of a form row.
fn field_value(app: &App, field: FormField) -> String {
    let v = &app.form.vehicle;
    let c = &app.form.contact;
    let toggle = |on: bool| if on { "[x]" } else { "[ ]" }.to_string();
    let or_dash = |s: &str| {
        if s.is_empty() {
            "-".to_string()
        } else {
            s.to_string()
        }
    };
    match field {
        FormField::Make => {
            if v.make.is_empty() {
                "< select >".into()
            } else {
                format!("< {} >", v.make)
            }
        }
        FormField::Model => or_dash(&v.model),
        FormField::Year => v.year.map(|y| y.to_string()).unwrap_or_else(|| "-".into()),
        FormField::Mileage => v
            .mileage_km
            .map(money::group_digits)
            .unwrap_or_else(|| "-".into()),
        FormField::Condition => {
            let label = v
                .condition
                .and_then(|cond| app.cfg.catalog.condition_label(cond))
                .unwrap_or("-");
            format!("< {label} >")
        }
        FormField::City => format!("< {} >", v.city),
        FormField::Name => or_dash(&c.name),
        FormField::Phone => or_dash(&c.phone),
        FormField::Vin => or_dash(&v.vin),
        FormField::Comment => or_dash(&c.comment),
        FormField::OnCredit => toggle(app.form.on_credit),
        FormField::TradeIn => toggle(app.form.trade_in),
        FormField::Consent => toggle(c.consent),
    }
}

fn draw_form_screen(f: &mut Frame, app: &App, area: Rect) {
    let body = layout::create_body_layout(area);
    let errors = app.visible_errors();

    let rows = FormField::ALL.iter().map(|&field| {
        let err = field
            .error_key()
            .and_then(|k| errors.get(&k))
            .cloned()
            .unwrap_or_default();
        let row = Row::new(vec![field.label().to_string(), field_value(app, field), err]);
        if field.error_key().is_some_and(|k| errors.contains_key(&k)) {
            row.style(Style::default().fg(Color::Red))
        } else {
            row
        }
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(22),
            Constraint::Min(16),
            Constraint::Length(28),
        ],
    )
    .block(Block::default().borders(Borders::ALL).title("REQUEST"))
    .header(Row::new(vec!["field", "value", ""]).bold())
    .row_highlight_style(highlight());

    let mut table_state = TableState::default();
    table_state.select(Some(app.ui.form_cursor));
    f.render_stateful_widget(table, body.main, &mut table_state);

    draw_estimate_panel(f, app, body.side, &errors);
}

/// Side panel: price headline, then VIN hint, submit state, and log.
fn draw_estimate_panel(f: &mut Frame, app: &App, area: Rect, errors: &ValidationErrors) {
    let (head, details) = layout::split_side(area);
    let breakdown = app.breakdown();

    let headline = Paragraph::new(vec![
        Line::from(money::format_rub(breakdown.final_value)).bold(),
        Line::from(format!(
            "base {} {}",
            money::format_rub(breakdown.base_value),
            money::format_factor(breakdown.combined_multiplier())
        )),
    ])
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL).title("ESTIMATE"));
    f.render_widget(headline, head);

    let mut lines = vec![format!("VIN: {}", vin::check_vin(&app.form.vehicle.vin).hint())];
    match &app.submit {
        SubmitStatus::Idle => {}
        SubmitStatus::Sending => lines.push("Sending...".into()),
        SubmitStatus::Sent(dest) => {
            lines.push(CONFIRMATION.into());
            lines.push(format!("Saved as {dest}"));
        }
        SubmitStatus::Failed(e) => lines.push(format!("Not sent: {e}")),
    }
    if !errors.is_empty() {
        lines.push(format!("{} field(s) need attention", errors.len()));
    }
    lines.push(String::new());
    lines.push("Log:".into());
    lines.extend(app.ui.log.iter().rev().take(8).rev().cloned());

    let info = Paragraph::new(lines.join("\n"))
        .block(Block::default().borders(Borders::ALL).title("INFO"))
        .wrap(Wrap { trim: true });
    f.render_widget(info, details);
}

fn draw_breakdown_screen(f: &mut Frame, app: &App, area: Rect) {
    let body = layout::create_body_layout(area);
    let breakdown = app.breakdown();

    let mut rows: Vec<Row> = breakdown
        .rows()
        .into_iter()
        .map(|(label, note, value)| Row::new(vec![label, note, value]))
        .collect();
    rows.push(
        Row::new(vec![
            "Estimate".to_string(),
            String::new(),
            money::format_rub(breakdown.final_value),
        ])
        .bold(),
    );

    let table = Table::new(
        rows,
        [
            Constraint::Length(22),
            Constraint::Min(12),
            Constraint::Length(14),
        ],
    )
    .block(Block::default().borders(Borders::ALL).title("HOW THE PRICE IS FORMED"))
    .header(Row::new(vec!["factor", "why", "value"]).bold());
    f.render_widget(table, body.main);

    let tips = format!(
        "{}\n\n{}",
        Section::PriceTips.title(),
        landing::section_body(Section::PriceTips, &app.cfg.catalog.cities)
    );
    let panel = Paragraph::new(tips)
        .block(Block::default().borders(Borders::ALL).title("TIPS"))
        .wrap(Wrap { trim: true });
    f.render_widget(panel, body.side);
}

fn draw_photos_screen(f: &mut Frame, app: &App, area: Rect) {
    let body = layout::create_body_layout(area);

    let rows = app.photos.iter().enumerate().map(|(i, p)| {
        Row::new(vec![
            format!("{}", i + 1),
            p.name.clone(),
            p.kind.as_str().to_string(),
            format!("{} KB", money::group_digits((p.size_bytes as i64 + 1023) / 1024)),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(6),
            Constraint::Length(10),
        ],
    )
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("PHOTOS {}/{}", app.photos.len(), app.photos.max())),
    )
    .header(Row::new(vec!["#", "file", "type", "size"]).bold())
    .row_highlight_style(highlight());

    let mut table_state = TableState::default();
    if !app.photos.is_empty() {
        table_state.select(Some(app.ui.photo_cursor));
    }
    f.render_stateful_widget(table, body.main, &mut table_state);

    let selected = app
        .photos
        .iter()
        .nth(app.ui.photo_cursor)
        .map(|p| format!("{}\npreview {}", p.path.display(), p.preview_id()))
        .unwrap_or_else(|| "No photos yet".into());
    let info = format!(
        "{selected}\n\nPreviews held: {}\n\nPhotos of the exterior, interior, odometer and service book \
         help refine the price.",
        app.previews.live()
    );
    let panel = Paragraph::new(info)
        .block(Block::default().borders(Borders::ALL).title("INFO"))
        .wrap(Wrap { trim: true });
    f.render_widget(panel, body.side);
}

fn draw_about_screen(f: &mut Frame, app: &App, area: Rect) {
    let section = app.landing.section();
    let title = format!(
        "{} ({}/{})",
        section.title(),
        app.landing.page_number(),
        app.landing.total()
    );
    let content = Paragraph::new(app.landing.body(&app.cfg.catalog.cities))
        .block(Block::default().borders(Borders::ALL).title(title))
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true });
    f.render_widget(content, area);
}

fn draw_settings_screen(f: &mut Frame, app: &App, area: Rect) {
    let body = layout::create_body_layout(area);

    let endpoint = if app.endpoint.trim().is_empty() {
        "(none, leads go to the outbox)".to_string()
    } else {
        app.endpoint.clone()
    };
    let text = format!(
        "Endpoint: {endpoint}\nOutbox:   {}\nTimeout:  {} s\nMax photos: {}\n\nConfig file: {}",
        app.outbox_dir,
        app.cfg.submission.timeout_secs,
        app.cfg.validation.max_photos,
        app.cfg_path.display()
    );
    let panel = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("SUBMISSION"))
        .wrap(Wrap { trim: true });
    f.render_widget(panel, body.main);

    let recent: Vec<String> = app.ui.log.iter().rev().take(12).rev().cloned().collect();
    let log = Paragraph::new(recent.join("\n"))
        .block(Block::default().borders(Borders::ALL).title("LOG"))
        .wrap(Wrap { trim: true });
    f.render_widget(log, body.side);
}

fn build_status_bar(app: &App) -> Paragraph<'static> {
    let info = format!(
        "{} | photos {}/{}",
        money::format_rub(app.breakdown().final_value),
        app.photos.len(),
        app.photos.max()
    );

    let status_text = if let Some(err) = &app.ui.error {
        format!("[{}] {} | ERROR: {}", app.ui.screen.name(), info, err)
    } else {
        format!("[{}] {} | {}", app.ui.screen.name(), info, app.ui.status)
    };

    let mut status_bar = Paragraph::new(status_text)
        .block(Block::default().borders(Borders::ALL).title("STATUS"))
        .wrap(Wrap { trim: true });
    if app.ui.error.is_some() {
        status_bar = status_bar.style(Style::default().fg(Color::Red));
    }
    status_bar
}

fn get_help_text(screen: Screen, shortcuts: &Shortcuts) -> String {
    let g = &shortcuts.global;
    let screens = format!(
        "{}/{}/{}/{}/{}: screens | {}: quit",
        format_keys(&g.form),
        format_keys(&g.breakdown),
        format_keys(&g.photos),
        format_keys(&g.about),
        format_keys(&g.settings),
        format_keys(&g.quit)
    );
    let local = match screen {
        Screen::Form => {
            let s = &shortcuts.form;
            format!(
                "{}/{}: move | {}: edit | {}/{}: option | {}: send",
                format_keys(&s.up),
                format_keys(&s.down),
                format_keys(&s.edit),
                format_keys(&s.prev_option),
                format_keys(&s.next_option),
                format_keys(&s.submit)
            )
        }
        Screen::Breakdown => "live breakdown of the current form".to_string(),
        Screen::Photos => {
            let s = &shortcuts.photos;
            format!(
                "{}/{}: move | {}: add | {}: replace | {}: remove | {}: clear",
                format_keys(&s.up),
                format_keys(&s.down),
                format_keys(&s.add),
                format_keys(&s.replace),
                format_keys(&s.remove),
                format_keys(&s.clear)
            )
        }
        Screen::About => format!(
            "{}: previous | {}: next",
            format_keys(&shortcuts.about.prev),
            format_keys(&shortcuts.about.next)
        ),
        Screen::Settings => {
            let s = &shortcuts.settings;
            format!(
                "{}: endpoint | {}: outbox | {}: save | {}: cancel",
                format_keys(&s.endpoint),
                format_keys(&s.outbox),
                format_keys(&s.save),
                format_keys(&s.cancel)
            )
        }
    };
    format!("{local} | {screens}")
}

fn format_keys(keys: &[String]) -> String {
    keys.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::test_app;
    use ratatui::{Terminal, backend::TestBackend};

    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content
            .iter()
            .map(|c| c.symbol())
            .collect::<String>()
    }

    #[test]
    fn test_help_lists_submit_keys() {
        let help = get_help_text(Screen::Form, &Shortcuts::default());
        assert!(help.contains("s/Ctrl+s: send"));
        assert!(help.contains("q: quit"));
    }

    #[test]
    fn test_form_screen_shows_estimate() {
        let (mut app, _rx, _tx) = test_app();
        app.form = app.form.with_make("BMW").with_model("M5").with_year("2015");
        let expected = money::format_rub(app.breakdown().final_value);
        let screen = render(&app);
        assert!(screen.contains("ESTIMATE"));
        assert!(screen.contains(&expected));
    }

    #[test]
    fn test_every_screen_renders() {
        let (mut app, _rx, _tx) = test_app();
        for screen in [
            Screen::Form,
            Screen::Breakdown,
            Screen::Photos,
            Screen::About,
            Screen::Settings,
        ] {
            app.ui.screen = screen;
            assert!(render(&app).contains("STATUS"));
        }
    }

    #[test]
    fn test_toggle_and_select_values() {
        let (app, _rx, _tx) = test_app();
        assert_eq!(field_value(&app, FormField::Consent), "[x]");
        assert_eq!(field_value(&app, FormField::Make), "< select >");
        assert_eq!(field_value(&app, FormField::Condition), "< Good >");
    }
}
