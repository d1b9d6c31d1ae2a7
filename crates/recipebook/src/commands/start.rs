//! Start command - launches the Recipebook server.

use std::net::{IpAddr, SocketAddr};

use anyhow::{Context as _, Result};
use clap::Args;
use tracing::{info, warn};

use recipebook_config::RecipebookConfig;
use recipebook_server::{Server, ServerConfig};
use recipebook_session::{CleanupTask, SessionStore};

use super::{Context, SessionArgs, database_path, load_config, open_database, session_config};

/// Arguments for the start command.
///
/// CLI arguments override config file values.
#[derive(Args, Debug, Clone, Default)]
pub struct StartArgs {
    /// Port to listen on (overrides config)
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,

    /// Address to bind to (overrides config)
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Disable API rate limiting
    #[arg(long)]
    pub no_rate_limit: bool,

    #[command(flatten)]
    pub session: SessionArgs,
}

/// Run the start command.
pub async fn run(args: StartArgs, ctx: &Context) -> Result<()> {
    let config = load_config(ctx)?;
    let server_config = server_config(&config, &args)?;

    let db = open_database(&database_path(&config, &args.session))?;
    let sessions = SessionStore::new(session_config(&config.session(), &args.session), db.clone());

    if ctx.verbose {
        let session = sessions.config();
        info!(
            cookie = %session.cookie_name,
            max_life_secs = session.max_life_time.as_secs(),
            cleanup_secs = session.cleanup_interval.as_secs(),
            repopulate = session.repopulate_on_fallback,
            "Session settings"
        );
    }

    let cleanup = CleanupTask::spawn(sessions.clone());
    let server = Server::new(db, sessions, server_config);

    info!(addr = %server.bind_address(), "Recipebook listening");
    let result = server.run(shutdown_signal()).await;

    cleanup.shutdown().await;
    info!("Shutdown complete");

    result.context("server failed")
}

/// Resolve server settings: CLI first, then config.
fn server_config(config: &RecipebookConfig, args: &StartArgs) -> Result<ServerConfig> {
    let section = config.server();

    let bind = args.bind.as_deref().unwrap_or(&section.bind);
    let ip: IpAddr = bind
        .parse()
        .with_context(|| format!("invalid bind address '{bind}'"))?;
    let port = args.port.unwrap_or(section.port);

    Ok(ServerConfig::new()
        .with_bind_address(SocketAddr::new(ip, port))
        .with_rate_limiting(section.rate_limiting && !args.no_rate_limit)
        .with_api_rpm(section.api_rpm)
        .with_request_logging(section.request_logging))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_from_file() {
        let config = RecipebookConfig::from_toml(
            "[server]\nbind = \"0.0.0.0\"\nport = 9000\napi_rpm = 30\nrequest_logging = false\n",
        )
        .unwrap();

        let server = server_config(&config, &StartArgs::default()).unwrap();
        assert_eq!(server.bind_address, "0.0.0.0:9000".parse::<SocketAddr>().unwrap());
        assert_eq!(server.api_rpm, 30);
        assert!(server.rate_limiting);
        assert!(!server.request_logging);
    }

    #[test]
    fn test_cli_overrides_file() {
        let config = RecipebookConfig::from_toml("[server]\nport = 9000\n").unwrap();
        let args = StartArgs {
            port: Some(7000),
            bind: Some("::1".to_string()),
            no_rate_limit: true,
            ..Default::default()
        };

        let server = server_config(&config, &args).unwrap();
        assert_eq!(server.bind_address, "[::1]:7000".parse::<SocketAddr>().unwrap());
        assert!(!server.rate_limiting);
    }

    #[test]
    fn test_invalid_bind_rejected() {
        let args = StartArgs {
            bind: Some("not-an-ip".to_string()),
            ..Default::default()
        };
        assert!(server_config(&RecipebookConfig::new(), &args).is_err());
    }
}
