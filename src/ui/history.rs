//! Conversation history display component

use crate::conversation::{Message, MessageKind};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

/// Renders the message list, newest at the bottom
pub struct HistoryView<'a> {
    pub messages: &'a [Message],
    /// Lines scrolled up from the bottom
    pub scroll_offset: usize,
    pub show_timestamps: bool,
}

impl Widget for HistoryView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title("Chat Assistant");
        let inner = block.inner(area);
        block.render(area, buf);

        let lines = if self.messages.is_empty() {
            welcome_lines()
        } else {
            history_lines(self.messages, inner.width as usize, self.show_timestamps)
        };

        let height = inner.height as usize;
        let start = visible_start(lines.len(), height, self.scroll_offset);
        for (i, line) in lines.iter().skip(start).take(height).enumerate() {
            buf.set_line(inner.x, inner.y + i as u16, line, inner.width);
        }
    }
}

/// First line to draw so that the bottom of the history shows, moved up by
/// `offset` and clamped to the top
pub fn visible_start(total: usize, height: usize, offset: usize) -> usize {
    let bottom = total.saturating_sub(height);
    bottom.saturating_sub(offset)
}

fn welcome_lines() -> Vec<Line<'static>> {
    vec![
        Line::from(Span::styled("Welcome!", Style::default().fg(Color::Green))),
        Line::from(""),
        Line::from(Span::styled(
            "Ask anything, or start with /image to generate a picture.",
            Style::default().fg(Color::Gray),
        )),
        Line::from(Span::styled(
            "Type /help for commands.",
            Style::default().fg(Color::DarkGray),
        )),
    ]
}

/// Lay out every message as display lines
pub fn history_lines(messages: &[Message], width: usize, show_timestamps: bool) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let mut images = 0;
    for message in messages {
        if message.is_image() {
            images += 1;
        }
        lines.extend(message_lines(message, images, width, show_timestamps));
        lines.push(Line::from(""));
    }
    lines
}

/// `image_number` is the 1-based number `/save` uses for this image
fn message_lines(
    message: &Message,
    image_number: usize,
    width: usize,
    show_timestamps: bool,
) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    let who = if message.is_user { "You" } else { "Assistant" };
    let header = if show_timestamps {
        format!("{} {}", who, message.timestamp.format("%H:%M:%S"))
    } else {
        who.to_string()
    };
    lines.push(Line::from(Span::styled(header, Style::default().fg(Color::DarkGray))));

    match message.kind {
        MessageKind::Text => {
            let style = if message.is_user {
                Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            let text = message.text.as_deref().unwrap_or_default();
            for content_line in wrap_text(text, width.saturating_sub(2)) {
                lines.push(Line::from(vec![Span::raw("  "), Span::styled(content_line, style)]));
            }
        }
        MessageKind::Image => {
            let url = message.image_url.clone().unwrap_or_default();
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(
                    format!("[image {}] ", image_number),
                    Style::default().fg(Color::Yellow),
                ),
                Span::styled(
                    url,
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::UNDERLINED),
                ),
            ]));
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(
                    format!("/save {} to download", image_number),
                    Style::default().fg(Color::DarkGray),
                ),
            ]));
        }
    }

    lines
}

/// Wrap text to fit within the given width, keeping explicit line breaks
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut current_line = String::new();
        let mut current_len = 0;

        for word in paragraph.split_whitespace() {
            let word_len = word.chars().count();
            if current_len > 0 && current_len + 1 + word_len > width {
                lines.push(std::mem::take(&mut current_line));
                current_len = 0;
            }
            if current_len > 0 {
                current_line.push(' ');
                current_len += 1;
            }
            current_line.push_str(word);
            current_len += word_len;
        }

        lines.push(current_line);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}
