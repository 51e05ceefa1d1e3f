//! Popup text input used for every free-text field.

use ratatui::{
    layout::Alignment,
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::{events::FormField, layout, phone, vin};

/// What the confirmed value is applied to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputCallbackId {
    /// A text field of the lead form.
    Form(FormField),
    /// `;`-separated photo paths to attach.
    AddPhotos,
    /// `;`-separated photo paths replacing the current set.
    ReplacePhotos,
    SettingsEndpoint,
    SettingsOutbox,
}

/// Reformatting applied after every edit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputMask {
    None,
    /// `+7 (XXX) XXX-XX-XX`.
    Phone,
    /// Uppercase, at most 17 characters.
    Vin,
}

/// Input box state.
#[derive(Clone, Debug)]
pub struct InputBoxState {
    pub prompt: String,
    pub value: String,
    /// Cursor position in characters.
    pub cursor: usize,
    pub callback_id: InputCallbackId,
    pub mask: InputMask,
}

impl InputBoxState {
    /// Open with `value` prefilled and the cursor at the end.
    pub fn new(
        prompt: impl Into<String>,
        value: impl Into<String>,
        callback_id: InputCallbackId,
        mask: InputMask,
    ) -> Self {
        let value = value.into();
        Self {
            prompt: prompt.into(),
            cursor: value.chars().count(),
            value,
            callback_id,
            mask,
        }
    }

    pub fn insert_char(&mut self, c: char) {
        let mut chars: Vec<char> = self.value.chars().collect();
        chars.insert(self.cursor.min(chars.len()), c);
        self.value = chars.into_iter().collect();
        self.cursor += 1;
        self.apply_mask();
    }

    /// Remove the character before the cursor.
    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            let mut chars: Vec<char> = self.value.chars().collect();
            chars.remove(self.cursor - 1);
            self.value = chars.into_iter().collect();
            self.cursor -= 1;
            self.apply_mask();
        }
    }

    /// Remove the character under the cursor.
    pub fn delete(&mut self) {
        let mut chars: Vec<char> = self.value.chars().collect();
        if self.cursor < chars.len() {
            chars.remove(self.cursor);
            self.value = chars.into_iter().collect();
            self.apply_mask();
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.value.chars().count() {
            self.cursor += 1;
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.value.chars().count();
    }

    pub fn clear_line(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    /// Reformat masked inputs; the cursor follows the end of the text.
    fn apply_mask(&mut self) {
        let masked = match self.mask {
            InputMask::None => return,
            InputMask::Phone => phone::format_phone(&self.value),
            InputMask::Vin => vin::mask(&self.value),
        };
        self.value = masked;
        self.cursor = self.value.chars().count();
    }
}

/// Draw the input box as a centered popup.
pub fn render_input_box(f: &mut Frame, state: &InputBoxState) {
    let popup_area = layout::centered_popup(f.area(), 70, 7);
    f.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title("Input")
        .style(Style::default().bg(Color::DarkGray));
    f.render_widget(block, popup_area);

    let inner_layout = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(1), // prompt
            Constraint::Length(1), // value
            Constraint::Length(1),
            Constraint::Length(1), // help
        ])
        .split(popup_area);

    let prompt_widget = Paragraph::new(state.prompt.clone()).style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    );
    f.render_widget(prompt_widget, inner_layout[0]);

    // Scroll horizontally so the cursor stays visible.
    let display_width = inner_layout[1].width as usize;
    let scroll_offset = state.cursor.saturating_sub(display_width.saturating_sub(2));
    let visible: Vec<char> = state
        .value
        .chars()
        .skip(scroll_offset)
        .take(display_width)
        .collect();
    let at = state.cursor.saturating_sub(scroll_offset).min(visible.len());
    let before: String = visible[..at].iter().collect();
    let after: String = visible[at..].iter().collect();

    let input_widget =
        Paragraph::new(format!("{before}|{after}")).style(Style::default().fg(Color::Green));
    f.render_widget(input_widget, inner_layout[1]);

    let help = Paragraph::new("Enter=confirm | Esc=cancel | Ctrl+U=clear")
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Center);
    f.render_widget(help, inner_layout[3]);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(value: &str) -> InputBoxState {
        InputBoxState::new("Model:", value, InputCallbackId::Form(FormField::Model), InputMask::None)
    }

    #[test]
    fn test_insert_and_delete_around_cursor() {
        let mut s = plain("Cmry");
        s.move_home();
        s.move_right();
        s.insert_char('a');
        assert_eq!(s.value, "Camry");
        assert_eq!(s.cursor, 2);

        s.backspace();
        assert_eq!(s.value, "Cmry");
        s.delete();
        assert_eq!(s.value, "Cry");
        s.move_end();
        assert_eq!(s.cursor, 3);
    }

    #[test]
    fn test_multibyte_input() {
        let mut s = plain("");
        for c in "Лада".chars() {
            s.insert_char(c);
        }
        s.backspace();
        assert_eq!(s.value, "Лад");
        assert_eq!(s.cursor, 3);
    }

    #[test]
    fn test_phone_mask_applies_while_typing() {
        let mut s = InputBoxState::new(
            "Phone:",
            "",
            InputCallbackId::Form(FormField::Phone),
            InputMask::Phone,
        );
        for c in "89990001234".chars() {
            s.insert_char(c);
        }
        assert_eq!(s.value, "+7 (999) 000-12-34");
        assert_eq!(s.cursor, s.value.chars().count());

        for _ in 0..3 {
            s.backspace();
        }
        assert_eq!(s.value, "+7 (999) 000-1");
    }

    #[test]
    fn test_vin_mask_uppercases_and_caps() {
        let mut s = InputBoxState::new(
            "VIN:",
            "",
            InputCallbackId::Form(FormField::Vin),
            InputMask::Vin,
        );
        for c in "wvwzzz1jzxw000001xyz".chars() {
            s.insert_char(c);
        }
        assert_eq!(s.value, "WVWZZZ1JZXW000001");
    }

    #[test]
    fn test_clear_line() {
        let mut s = plain("M5");
        s.clear_line();
        assert_eq!(s.value, "");
        assert_eq!(s.cursor, 0);
    }
}
