//! Single-line message composer

use crate::conversation::InputBuffer;
use crate::conversation::routing::strip_command_token;
use crate::ui::commands::{ParsedCommand, parse_slash_command};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

const PLACEHOLDER: &str = "Type your message...";

/// Result of feeding a key to the composer
#[derive(Debug, PartialEq, Eq)]
pub enum ComposerResult {
    /// Enter on a draft meant for the endpoints
    Submit,
    /// Enter on a local slash command; the draft has been cleared
    Command(ParsedCommand),
    None,
}

/// Apply a key press to the draft.
///
/// The command token is checked before local commands so that `/image ...`
/// is always a submission.
pub fn handle_key(input: &mut InputBuffer, key: KeyEvent, command_token: &str) -> ComposerResult {
    if key.kind != KeyEventKind::Press {
        return ComposerResult::None;
    }

    match key.code {
        KeyCode::Enter => {
            if input.is_blank() {
                return ComposerResult::None;
            }
            if strip_command_token(input.content(), command_token).is_none() {
                if let Some(command) = parse_slash_command(input.content()) {
                    input.clear();
                    return ComposerResult::Command(command);
                }
            }
            return ComposerResult::Submit;
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            input.insert_char(c);
        }
        KeyCode::Backspace => {
            input.backspace();
        }
        KeyCode::Delete => {
            input.delete();
        }
        KeyCode::Left => input.move_left(),
        KeyCode::Right => input.move_right(),
        KeyCode::Home => input.move_home(),
        KeyCode::End => input.move_end(),
        _ => {}
    }

    ComposerResult::None
}

/// Renders the draft with a cursor, or a placeholder
pub struct ComposerView<'a> {
    pub input: &'a InputBuffer,
    pub busy: bool,
}

impl Widget for ComposerView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (title, style) = if self.busy {
            ("Processing...", Style::default().fg(Color::Yellow))
        } else {
            ("Send (Enter)", Style::default().fg(Color::Green))
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .style(style);
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let line = if self.input.content().is_empty() {
            Line::from(vec![
                Span::styled("▌", Style::default().fg(Color::White)),
                Span::styled(PLACEHOLDER, Style::default().fg(Color::DarkGray)),
            ])
        } else {
            let visible = visible_with_cursor(self.input, inner.width as usize);
            Line::from(vec![Span::styled(
                visible,
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            )])
        };
        buf.set_line(inner.x, inner.y, &line, inner.width);
    }
}

/// The draft with a cursor glyph, scrolled so the cursor stays in view
fn visible_with_cursor(input: &InputBuffer, width: usize) -> String {
    let mut chars: Vec<char> = input.content().chars().collect();
    let cursor = input.cursor().min(chars.len());
    chars.insert(cursor, '▌');

    if chars.len() <= width {
        return chars.into_iter().collect();
    }
    let start = (cursor + 1).saturating_sub(width);
    chars[start..start + width].iter().collect()
}
