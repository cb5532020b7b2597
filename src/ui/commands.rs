use std::str::FromStr;

use strum::{EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// Local commands, typed with a leading slash. These never reach an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum SlashCommand {
    /// Show help
    Help,
    /// Save an image, the most recent one unless numbered
    Save,
    /// Exit the application
    Quit,
}

impl SlashCommand {
    /// User-visible description shown in help.
    pub fn description(self) -> &'static str {
        match self {
            SlashCommand::Help => "show available commands",
            SlashCommand::Save => "download image n, or the most recent one",
            SlashCommand::Quit => "exit the application",
        }
    }

    /// Command string without the leading '/'.
    pub fn command(self) -> &'static str {
        self.into()
    }
}

/// A slash command with its argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedCommand {
    pub command: SlashCommand,
    /// 1-based image number given to `/save`
    pub image: Option<usize>,
}

impl From<SlashCommand> for ParsedCommand {
    fn from(command: SlashCommand) -> Self {
        Self {
            command,
            image: None,
        }
    }
}

/// Parse a local slash command. Unknown commands, and arguments a command
/// does not take, are `None` and get sent as ordinary text.
pub fn parse_slash_command(input: &str) -> Option<ParsedCommand> {
    let rest = input.trim().strip_prefix('/')?;
    let mut parts = rest.split_whitespace();
    let head = parts.next()?;
    let argument = parts.next();
    if parts.next().is_some() {
        return None;
    }

    let command = SlashCommand::from_str(head)
        .ok()
        .or_else(|| match head.to_lowercase().as_str() {
            "q" | "exit" | "bye" => Some(SlashCommand::Quit),
            "h" | "?" => Some(SlashCommand::Help),
            "download" | "s" => Some(SlashCommand::Save),
            _ => None,
        })?;

    let image = match (command, argument) {
        (_, None) => None,
        (SlashCommand::Save, Some(arg)) => Some(arg.parse::<usize>().ok().filter(|n| *n > 0)?),
        (_, Some(_)) => return None,
    };
    Some(ParsedCommand { command, image })
}

/// Help text listing commands and key bindings
pub fn get_help_text(command_token: &str) -> String {
    let mut help = String::from("Available commands:\n\n");
    help.push_str(&format!("{} <description> - generate an image\n", command_token));
    for command in SlashCommand::iter() {
        let usage = match command {
            SlashCommand::Save => format!("/{} [n]", command.command()),
            _ => format!("/{}", command.command()),
        };
        help.push_str(&format!("{} - {}\n", usage, command.description()));
    }

    help.push_str("\nKeys: Enter send, Ctrl+S save latest image, PgUp/PgDn scroll, Esc or Ctrl+C quit");
    help.push_str("\nAnything else is sent to the assistant, which may answer with an image.");

    help
}
