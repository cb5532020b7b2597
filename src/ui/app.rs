use crate::api::CompletionApi;
use crate::config::Config;
use crate::conversation::{ConversationController, RouteSettings, exchange};
use crate::download::download_image;
use crate::events::{AppEvent, LoopControl};
use crate::ui::commands::{ParsedCommand, SlashCommand, get_help_text};
use crate::ui::composer::{self, ComposerResult, ComposerView};
use crate::ui::history::{HistoryView, history_lines};
use crate::ui::status::StatusLine;
use anyhow::{Context, Result};
use crossterm::event::{
    DisableBracketedPaste, EnableBracketedPaste, Event, EventStream, KeyCode, KeyEvent,
    KeyEventKind, KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use futures::StreamExt;
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use std::io::{self, Stdout};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::Duration;
use tracing::{error, info};

const DOWNLOAD_FAILED: &str = "Failed to download the image. Please try again.";
const SCROLL_STEP: usize = 5;

/// Terminal chat application: the controller plus the view state around it
pub struct ChatApp {
    controller: ConversationController,
    api: Arc<dyn CompletionApi>,
    download_dir: PathBuf,
    show_timestamps: bool,
    status: StatusLine,
    scroll_offset: usize,
    /// Inner (width, height) of the history pane at the last draw
    history_size: (u16, u16),
    show_help: bool,
    events_tx: mpsc::UnboundedSender<AppEvent>,
    events_rx: mpsc::UnboundedReceiver<AppEvent>,
}

impl ChatApp {
    pub fn new(config: &Config, api: Arc<dyn CompletionApi>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            controller: ConversationController::new(RouteSettings::from(config)),
            api,
            download_dir: config.resolved_download_dir(),
            show_timestamps: config.ui.show_timestamps,
            status: StatusLine::default(),
            scroll_offset: 0,
            history_size: (0, 0),
            show_help: false,
            events_tx,
            events_rx,
        }
    }

    pub fn controller(&self) -> &ConversationController {
        &self.controller
    }

    /// Handle a key press from the terminal
    pub fn handle_key(&mut self, key: KeyEvent) -> LoopControl {
        if key.kind != KeyEventKind::Press {
            return LoopControl::Continue;
        }

        if self.show_help {
            self.show_help = false;
            return LoopControl::Continue;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') if ctrl => return LoopControl::Exit,
            KeyCode::Esc => return LoopControl::Exit,
            KeyCode::Char('s') if ctrl => {
                self.save_image(None);
                return LoopControl::Continue;
            }
            KeyCode::PageUp => {
                self.scroll_offset = (self.scroll_offset + SCROLL_STEP).min(self.max_scroll());
                return LoopControl::Continue;
            }
            KeyCode::PageDown => {
                self.scroll_offset = self.scroll_offset.saturating_sub(SCROLL_STEP);
                return LoopControl::Continue;
            }
            _ => {}
        }

        let token = self.controller.settings().command_token.clone();
        match composer::handle_key(self.controller.input_mut(), key, &token) {
            ComposerResult::Submit => {
                self.submit();
                LoopControl::Continue
            }
            ComposerResult::Command(command) => self.run_command(command),
            ComposerResult::None => LoopControl::Continue,
        }
    }

    /// Handle pasted text
    pub fn handle_paste(&mut self, text: &str) {
        let single_line = text.replace(['\r', '\n'], " ");
        self.controller.input_mut().insert_str(&single_line);
    }

    /// Apply the result of a spawned task
    pub fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::ExchangeFinished(reply) => {
                self.controller.finish(reply);
                self.scroll_offset = 0;
            }
            AppEvent::DownloadFinished(Ok(path)) => {
                self.status.info(format!("Saved image to {}", path.display()));
            }
            AppEvent::DownloadFinished(Err(err)) => {
                error!(error = %err, "image download failed");
                self.status.error(DOWNLOAD_FAILED);
            }
        }
    }

    /// Wait for the next result from a spawned task
    pub async fn next_app_event(&mut self) -> Option<AppEvent> {
        self.events_rx.recv().await
    }

    fn submit(&mut self) {
        let Some(route) = self.controller.submit_input() else {
            return;
        };
        self.scroll_offset = 0;

        let api = Arc::clone(&self.api);
        let settings = self.controller.settings().clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let reply = exchange::run(api.as_ref(), route, &settings).await;
            let _ = tx.send(AppEvent::ExchangeFinished(reply));
        });
    }

    /// Furthest the history can scroll up before its first line reaches the top
    fn max_scroll(&self) -> usize {
        if self.controller.messages().is_empty() {
            return 0;
        }
        let (width, height) = self.history_size;
        let total = history_lines(self.controller.messages(), width as usize, self.show_timestamps).len();
        total.saturating_sub(height as usize)
    }

    fn run_command(&mut self, parsed: ParsedCommand) -> LoopControl {
        match parsed.command {
            SlashCommand::Help => self.show_help = true,
            SlashCommand::Save => self.save_image(parsed.image),
            SlashCommand::Quit => return LoopControl::Exit,
        }
        LoopControl::Continue
    }

    /// Download image `number` (1-based), or the latest one
    fn save_image(&mut self, number: Option<usize>) {
        let Some(url) = self.controller.image_url(number).map(str::to_string) else {
            match number {
                Some(n) => self.status.error(format!("There is no image {}.", n)),
                None => self.status.info("No image to save yet."),
            }
            return;
        };
        self.status.info("Downloading image...");

        let api = Arc::clone(&self.api);
        let dir = self.download_dir.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = download_image(api.as_ref(), &url, &dir)
                .await
                .map_err(|e| e.to_string());
            let _ = tx.send(AppEvent::DownloadFinished(result));
        });
    }

    fn draw(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(5),    // History
                Constraint::Length(1), // Status
                Constraint::Length(3), // Composer
            ])
            .split(frame.size());

        let history_inner = Block::default().borders(Borders::ALL).inner(chunks[0]);
        self.history_size = (history_inner.width, history_inner.height);
        self.scroll_offset = self.scroll_offset.min(self.max_scroll());

        frame.render_widget(
            HistoryView {
                messages: self.controller.messages(),
                scroll_offset: self.scroll_offset,
                show_timestamps: self.show_timestamps,
            },
            chunks[0],
        );
        frame.render_widget(self.status.view(self.controller.is_busy()), chunks[1]);
        frame.render_widget(
            ComposerView {
                input: self.controller.input(),
                busy: self.controller.is_busy(),
            },
            chunks[2],
        );

        if self.show_help {
            let area = centered(frame.size(), 70, 14);
            let help = Paragraph::new(get_help_text(&self.controller.settings().command_token))
                .wrap(Wrap { trim: false })
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title("Help (any key to close)")
                        .style(Style::default().fg(Color::Cyan)),
                );
            frame.render_widget(Clear, area);
            frame.render_widget(help, area);
        }
    }

    async fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        let mut events = EventStream::new();
        let mut tick = tokio::time::interval(Duration::from_millis(250));

        loop {
            terminal
                .draw(|frame| self.draw(frame))
                .context("Failed to draw terminal")?;

            tokio::select! {
                maybe_event = events.next() => match maybe_event {
                    Some(Ok(Event::Key(key))) => {
                        if self.handle_key(key) == LoopControl::Exit {
                            break;
                        }
                    }
                    Some(Ok(Event::Paste(text))) => self.handle_paste(&text),
                    Some(Ok(_)) => {}
                    Some(Err(err)) => return Err(err).context("Failed to read terminal event"),
                    None => break,
                },
                Some(event) = self.events_rx.recv() => self.handle_app_event(event),
                _ = tick.tick() => self.status.tick(),
            }
        }

        Ok(())
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Run the full-screen chat until the user quits
pub async fn run(config: &Config, api: Arc<dyn CompletionApi>) -> Result<()> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)
        .context("Failed to enter alternate screen")?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))
        .context("Failed to create terminal")?;

    info!("chat session started");
    let mut app = ChatApp::new(config, api);
    let result = app.event_loop(&mut terminal).await;

    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableBracketedPaste)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to restore cursor")?;
    info!(messages = app.controller().messages().len(), "chat session ended");

    result
}
