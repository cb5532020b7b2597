use crate::conversation::Reply;
use std::path::PathBuf;

/// Results delivered back to the UI loop from spawned tasks
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// A request chain finished
    ExchangeFinished(Reply),

    /// An image download finished
    DownloadFinished(Result<PathBuf, String>),
}

/// What the UI loop should do after handling input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Exit,
}
