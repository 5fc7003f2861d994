//! Write a seed snapshot of students and courses into the Firebase store.
//!
//! ```text
//! seed-store --snapshot fixtures/seed.json --database-url https://project.firebaseio.com/
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::{Context, Result, eyre};
use reqwest::Url;
use tokio::runtime::Builder;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

use cs_assistant::outbound::record_store::{FirebaseRecordStore, load_snapshot};

/// `seed-store` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "seed-store",
    about = "Upload a student and course snapshot to the Firebase record store",
    version
)]
struct CliArgs {
    /// Snapshot document with `users` and `courses` maps.
    #[arg(long, value_name = "path")]
    snapshot: PathBuf,
    /// Realtime Database root URL.
    #[arg(long = "database-url", value_name = "url", env = "CS_ASSISTANT_FIREBASE_DATABASE_URL")]
    database_url: String,
    /// Database secret or ID token.
    #[arg(long = "auth-token", value_name = "token", env = "CS_ASSISTANT_FIREBASE_AUTH_TOKEN")]
    auth_token: Option<String>,
    /// Per-request timeout in seconds.
    #[arg(long = "timeout-secs", value_name = "secs", default_value_t = 10)]
    timeout_secs: u64,
    /// Validate the snapshot without writing it.
    #[arg(long)]
    dry_run: bool,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(error) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init()
    {
        return Err(eyre!("tracing init failed: {error}"));
    }

    let args = CliArgs::parse();
    let snapshot = load_snapshot(&args.snapshot)
        .wrap_err_with(|| format!("load snapshot {}", args.snapshot.display()))?;
    info!(
        users = snapshot.users.len(),
        courses = snapshot.courses.len(),
        "snapshot validated"
    );
    if args.dry_run {
        return Ok(());
    }

    let url = Url::parse(&args.database_url).wrap_err("parse database URL")?;
    let mut store = FirebaseRecordStore::new(url, Duration::from_secs(args.timeout_secs.max(1)))
        .wrap_err("build Firebase client")?;
    if let Some(token) = args.auth_token {
        store = store.with_auth_token(token);
    }

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("create Tokio runtime")?;
    runtime
        .block_on(store.put_snapshot(&snapshot))
        .wrap_err("write snapshot")?;
    info!("snapshot written");
    Ok(())
}
