pub mod init;
pub mod run;
pub mod topics;
pub mod units;

use std::path::Path;

use anyhow::Result;
use tracing::debug;

use tessbot_client::{load_config_from, HttpQuizClient, TessbotConfig};

/// Load configuration and build an authenticated client.
pub(crate) fn connect(
    token: Option<String>,
    config_path: Option<&Path>,
) -> Result<(TessbotConfig, HttpQuizClient)> {
    let config = load_config_from(config_path)?;
    let token = config.resolve_token(token)?;
    let client = HttpQuizClient::from_config(&config, &token)?;
    debug!(?client, "client configured");
    Ok((config, client))
}
