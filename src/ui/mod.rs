//! Full-screen terminal front-end

pub mod app;
pub mod commands;
pub mod composer;
pub mod history;
pub mod status;

pub use app::run;
