//! Cleanup command - deletes expired sessions once.

use anyhow::{Context as _, Result};
use clap::Args;
use tracing::info;

use recipebook_session::SessionStore;

use super::{Context, SessionArgs, database_path, load_config, open_database, session_config};

/// Arguments for the cleanup command.
#[derive(Args, Debug, Clone, Default)]
pub struct CleanupArgs {
    #[command(flatten)]
    pub session: SessionArgs,
}

/// Run the cleanup command.
pub async fn run(args: CleanupArgs, ctx: &Context) -> Result<()> {
    let config = load_config(ctx)?;
    let db = open_database(&database_path(&config, &args.session))?;
    let sessions = SessionStore::new(session_config(&config.session(), &args.session), db);

    let removed = tokio::task::spawn_blocking(move || sessions.cleanup_now())
        .await
        .context("cleanup task panicked")?
        .context("session cleanup failed")?;

    info!(removed, "Session cleanup finished");
    println!("Removed {removed} expired session(s)");
    Ok(())
}
