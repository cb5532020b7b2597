use crate::api::CompletionApi;
use crate::error::ChatError;
use std::path::{Path, PathBuf};
use tracing::info;

/// Every download is saved under this name, replacing the previous one
pub const DOWNLOAD_FILE_NAME: &str = "generated-image.png";

/// Fetch the image at `url` and write it to `dir/generated-image.png`
pub async fn download_image(
    api: &dyn CompletionApi,
    url: &str,
    dir: &Path,
) -> Result<PathBuf, ChatError> {
    let bytes = api.fetch_image(url).await?;
    let path = dir.join(DOWNLOAD_FILE_NAME);

    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| ChatError::Save {
            path: path.clone(),
            source,
        })?;
    tokio::fs::write(&path, &bytes)
        .await
        .map_err(|source| ChatError::Save {
            path: path.clone(),
            source,
        })?;

    info!(%url, path = %path.display(), bytes = bytes.len(), "image saved");
    Ok(path)
}
