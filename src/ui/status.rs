use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Widget,
};
use std::time::{Duration, Instant};

const SPINNER: [&str; 4] = [".", "..", "...", "   "];
const NOTICE_TTL: Duration = Duration::from_secs(6);

/// Busy indicator and transient notices shown above the composer
#[derive(Debug, Clone, Default)]
pub struct StatusLine {
    frame: usize,
    notice: Option<Notice>,
}

#[derive(Debug, Clone)]
struct Notice {
    text: String,
    is_error: bool,
    shown_at: Instant,
}

impl StatusLine {
    /// Advance the spinner and expire old notices
    pub fn tick(&mut self) {
        self.frame = (self.frame + 1) % SPINNER.len();
        if self
            .notice
            .as_ref()
            .is_some_and(|n| n.shown_at.elapsed() >= NOTICE_TTL)
        {
            self.notice = None;
        }
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.set(text.into(), false);
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.set(text.into(), true);
    }

    #[cfg(test)]
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_ref().map(|n| n.text.as_str())
    }

    fn set(&mut self, text: String, is_error: bool) {
        self.notice = Some(Notice {
            text,
            is_error,
            shown_at: Instant::now(),
        });
    }

    pub fn view(&self, busy: bool) -> StatusView<'_> {
        StatusView { status: self, busy }
    }
}

pub struct StatusView<'a> {
    status: &'a StatusLine,
    busy: bool,
}

impl Widget for StatusView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut spans = Vec::new();
        if self.busy {
            spans.push(Span::styled("Thinking", Style::default().fg(Color::Green)));
            spans.push(Span::styled(
                SPINNER[self.status.frame],
                Style::default().fg(Color::Yellow),
            ));
            spans.push(Span::raw("  "));
        }
        if let Some(notice) = &self.status.notice {
            let color = if notice.is_error { Color::Red } else { Color::Cyan };
            spans.push(Span::styled(notice.text.clone(), Style::default().fg(color)));
        }
        buf.set_line(area.x, area.y, &Line::from(spans), area.width);
    }
}
