//! Command-token detection and endpoint selection

use crate::config::Config;

/// Which endpoint a submission goes to, and with what prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Text { prompt: String },
    Image { prompt: String },
}

/// How prompts are routed, taken from [`Config`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSettings {
    pub command_token: String,
    pub text_prompt_prefix: String,
}

impl From<&Config> for RouteSettings {
    fn from(config: &Config) -> Self {
        Self {
            command_token: config.command_token.clone(),
            text_prompt_prefix: config.text_prompt_prefix.clone(),
        }
    }
}

impl RouteSettings {
    /// Pick the endpoint for a user submission.
    ///
    /// The token is matched against the input exactly as typed; leading
    /// whitespace means a text request.
    pub fn route(&self, input: &str) -> Route {
        match strip_command_token(input, &self.command_token) {
            Some(prompt) => Route::Image {
                prompt: prompt.to_string(),
            },
            None => Route::Text {
                prompt: format!("{}{}", self.text_prompt_prefix, input),
            },
        }
    }

    /// If the model answered with the command token, the image prompt it asked for
    pub fn image_request_in_reply<'a>(&self, reply: &'a str) -> Option<&'a str> {
        strip_command_token(reply.trim_start(), &self.command_token)
    }
}

/// Strip a leading command token (ASCII case-insensitive) and return the
/// trimmed remainder
pub fn strip_command_token<'a>(text: &'a str, token: &str) -> Option<&'a str> {
    if token.is_empty() {
        return None;
    }
    let head = text.get(..token.len())?;
    if !head.eq_ignore_ascii_case(token) {
        return None;
    }
    Some(text[token.len()..].trim())
}
