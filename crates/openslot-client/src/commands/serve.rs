//! `openslot serve` - run the daemon in the foreground.

use std::path::PathBuf;

use openslot_providers::GroupwareConfig;
use openslot_server::{ServerConfig, run_daemon};

use crate::config::ClientConfig;
use crate::error::ClientResult;

/// Builds the daemon configuration from the client config and runs it
/// until a shutdown request arrives.
pub async fn run(
    config: &ClientConfig,
    account_override: Option<&str>,
    socket_override: Option<PathBuf>,
) -> ClientResult<()> {
    let window = config.working_window()?;
    let account = config.account(account_override)?;

    let groupware = GroupwareConfig::new(account.clone(), window.timezone)
        .with_helper(config.auth.helper.clone());

    let mut server_config = ServerConfig::new(account, window);
    if let Some(path) = socket_override.or_else(|| config.server.socket_path.clone()) {
        server_config = server_config.with_socket_path(path);
    }

    run_daemon(server_config, groupware).await?;
    Ok(())
}
