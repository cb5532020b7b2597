use crate::api::CompletionApi;
use crate::config::Config;
use crate::conversation::{ConversationController, ERROR_MESSAGE, Reply, RouteSettings, exchange};
use crate::download::download_image;
use anyhow::{Context, Result, bail};
use std::path::Path;

/// Send one prompt without the terminal UI and print the reply.
///
/// Returns an error when the exchange failed, so the process exits non-zero.
pub async fn say(
    config: &Config,
    api: &dyn CompletionApi,
    prompt: &str,
    save: bool,
    out: &mut impl std::io::Write,
) -> Result<()> {
    if prompt.trim().is_empty() {
        bail!("Nothing to send: the prompt is empty");
    }

    let mut controller = ConversationController::new(RouteSettings::from(config));
    let route = controller
        .begin_submit(prompt)
        .context("Prompt was not submitted")?;
    let reply = exchange::run(api, route, controller.settings()).await;
    controller.finish(reply.clone());

    match reply {
        Reply::Text(text) => writeln!(out, "{}", text)?,
        Reply::Image(url) => {
            writeln!(out, "{}", url)?;
            if save {
                let path = download_image(api, &url, &config.resolved_download_dir())
                    .await
                    .context("Failed to download the image")?;
                writeln!(out, "Saved image to {}", path.display())?;
            }
        }
        Reply::Failed => {
            writeln!(out, "{}", ERROR_MESSAGE)?;
            bail!("Request failed; see the log for details");
        }
    }

    Ok(())
}

/// Write the default configuration unless a file already exists
pub fn init_config(path: &Path, out: &mut impl std::io::Write) -> Result<()> {
    if path.exists() {
        writeln!(out, "Config already exists at {}", path.display())?;
        return Ok(());
    }
    Config::default().save(path)?;
    writeln!(out, "Wrote default config to {}", path.display())?;
    Ok(())
}

/// Print the resolved configuration as TOML
pub fn show_config(config: &Config, out: &mut impl std::io::Write) -> Result<()> {
    let content = toml::to_string_pretty(config).context("Failed to serialize config")?;
    write!(out, "{}", content)?;
    Ok(())
}
