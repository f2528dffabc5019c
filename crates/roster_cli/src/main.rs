//! `roster` server entry point.
//!
//! # Responsibility
//! - Resolve configuration from flags, environment and `.env`.
//! - Bootstrap logging and the database, optionally seed members, then
//!   serve the HTTP API until the process is stopped.

use clap::Parser;
use log::{error, info};
use roster_core::db::{open_db, open_db_in_memory};
use roster_core::{
    default_log_level, init_logging, Auditing, FixedAuditor, LoggingConfig, MemberService,
    RandomUuidAuditor, SqliteMemberRepository, SystemClock,
};
use roster_web::{create_router, AppState};
use rusqlite::Connection;
use std::error::Error;
use std::path::PathBuf;
use tokio::net::TcpListener;

/// Member/team roster service over SQLite.
#[derive(Debug, Parser)]
#[command(name = "roster")]
#[command(version, about, long_about = None)]
struct Args {
    /// SQLite database file; in-memory when omitted
    #[arg(long, env = "ROSTER_DB")]
    db: Option<PathBuf>,

    /// Address the HTTP server listens on
    #[arg(long, env = "ROSTER_BIND", default_value = "127.0.0.1:8080")]
    bind: String,

    /// trace|debug|info|warn|error
    #[arg(long, env = "ROSTER_LOG_LEVEL")]
    log_level: Option<String>,

    /// Directory for log files; `./logs` when omitted
    #[arg(long, env = "ROSTER_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// Insert `user0..user{n-1}` before serving
    #[arg(long, env = "ROSTER_SEED", default_value_t = 0)]
    seed: u32,

    /// Fixed auditor name for writes; a random UUID per write when omitted
    #[arg(long, env = "ROSTER_AUDITOR")]
    auditor: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let cwd = std::env::current_dir()?;
    let log_dir = match &args.log_dir {
        Some(dir) if dir.is_absolute() => dir.clone(),
        Some(dir) => cwd.join(dir),
        None => cwd.join("logs"),
    };
    let level = args
        .log_level
        .clone()
        .unwrap_or_else(|| default_log_level().to_string());
    init_logging(&LoggingConfig {
        level,
        log_dir,
        echo_stderr: true,
    })?;

    if let Err(err) = run(args).await {
        error!("event=server_exit module=cli status=error reason={err}");
        return Err(err);
    }
    Ok(())
}

async fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let auditing = match &args.auditor {
        Some(name) => Auditing::new(FixedAuditor::new(name.as_str()), SystemClock),
        None => Auditing::new(RandomUuidAuditor, SystemClock),
    };

    let conn = open_connection(&args)?;
    if args.seed > 0 {
        let repo = SqliteMemberRepository::with_auditing(&conn, auditing.clone());
        MemberService::new(repo).seed_members(args.seed)?;
    }

    let app = create_router(AppState::new(conn, auditing));
    let listener = TcpListener::bind(&args.bind).await?;
    info!(
        "event=server_start module=cli status=ok addr={}",
        listener.local_addr()?
    );
    axum::serve(listener, app).await?;
    Ok(())
}

fn open_connection(args: &Args) -> Result<Connection, Box<dyn Error>> {
    let conn = match &args.db {
        Some(path) => open_db(path)?,
        None => open_db_in_memory()?,
    };
    Ok(conn)
}
