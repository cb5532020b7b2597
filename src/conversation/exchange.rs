//! One request chain: text or image, plus the optional follow-up image request

use crate::api::CompletionApi;
use crate::conversation::routing::{Route, RouteSettings};
use crate::error::{ChatError, Endpoint};
use tracing::{debug, info, warn};

/// Outcome of a request chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Image(String),
    Failed,
}

/// Run the chain for `route`. Every failure is logged and folded into [`Reply::Failed`].
pub async fn run(api: &dyn CompletionApi, route: Route, settings: &RouteSettings) -> Reply {
    match exchange(api, route, settings).await {
        Ok(reply) => reply,
        Err(err) => {
            warn!(error = %err, endpoint = ?err.endpoint(), "request chain failed");
            Reply::Failed
        }
    }
}

async fn exchange(
    api: &dyn CompletionApi,
    route: Route,
    settings: &RouteSettings,
) -> Result<Reply, ChatError> {
    match route {
        Route::Image { prompt } => generate(api, &prompt).await,
        Route::Text { prompt } => {
            let response = api.complete_text(&prompt).await?;
            if !response.is_success() {
                return Err(ChatError::Status {
                    endpoint: Endpoint::Text,
                    status: response.status,
                });
            }
            let text = response.text.ok_or(ChatError::MissingField {
                endpoint: Endpoint::Text,
                field: "text",
            })?;

            if let Some(description) = settings.image_request_in_reply(&text) {
                info!("model requested an image, following up");
                return generate(api, description).await;
            }
            debug!(len = text.len(), "text reply");
            Ok(Reply::Text(text))
        }
    }
}

async fn generate(api: &dyn CompletionApi, prompt: &str) -> Result<Reply, ChatError> {
    let response = api.generate_image(prompt).await?;
    if !response.is_success() {
        return Err(ChatError::Status {
            endpoint: Endpoint::Image,
            status: response.status,
        });
    }
    let url = response.image_url.ok_or(ChatError::MissingField {
        endpoint: Endpoint::Image,
        field: "imageUrl",
    })?;
    debug!(%url, "image generated");
    Ok(Reply::Image(url))
}
