use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use runtime::DatabaseConfig;
use sea_orm::{DatabaseConnection, SqlxSqliteConnector};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use url::Url;

const MEMORY_DSN: &str = "sqlite::memory:";
const DEFAULT_MAX_CONNS: u32 = 10;
const DEFAULT_BUSY_TIMEOUT_MS: u32 = 5000;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

fn is_memory_dsn(dsn: &str) -> bool {
    dsn.eq_ignore_ascii_case(MEMORY_DSN) || dsn.eq_ignore_ascii_case("sqlite://:memory:")
}

/// Only SQLite is wired in; anything else is a configuration error.
pub fn ensure_sqlite(dsn: &str) -> Result<()> {
    let raw = dsn.trim();
    if raw.is_empty() {
        bail!("Database URL not configured");
    }
    let url = Url::parse(raw).map_err(|e| anyhow!("Invalid database DSN '{}': {}", raw, e))?;
    match url.scheme() {
        "sqlite" | "sqlite3" => Ok(()),
        other => bail!("Unsupported database type: {}", other),
    }
}

/// Expand a sqlite DSN into an absolute-path DSN using a base directory.
/// In-memory DSNs are returned in canonical form.
pub fn absolutize_sqlite_dsn(dsn: &str, base_dir: &Path, create_dirs: bool) -> Result<String> {
    if is_memory_dsn(dsn) {
        return Ok(MEMORY_DSN.to_string());
    }
    let db_path = dsn
        .strip_prefix("sqlite://")
        .ok_or_else(|| anyhow!("DSN must start with sqlite:// (got: {})", dsn))?;

    let (path_str, query) = match db_path.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (db_path, None),
    };

    let mut p = PathBuf::from(path_str);
    if p.as_os_str().is_empty() {
        bail!("Empty SQLite path in DSN");
    }
    if p.is_relative() {
        p = base_dir.join(p);
    }

    if create_dirs {
        if let Some(dir) = p.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create database directory {}", dir.display()))?;
        }
    }

    let mut out = String::from("sqlite://");
    out.push_str(&p.to_string_lossy().replace('\\', "/"));
    if let Some(q) = query {
        out.push('?');
        out.push_str(q);
    }
    Ok(out)
}

/// Open the SQLite pool described by `cfg` and hand it to SeaORM.
pub async fn connect(cfg: &DatabaseConfig, base_dir: &Path) -> Result<DatabaseConnection> {
    ensure_sqlite(&cfg.url)?;
    let dsn = absolutize_sqlite_dsn(cfg.url.trim(), base_dir, true)?;
    let in_memory = dsn == MEMORY_DSN;

    let mut connect_opts = SqliteConnectOptions::from_str(&dsn)
        .with_context(|| format!("Invalid SQLite DSN '{dsn}'"))?;
    let mut pool_opts = SqlitePoolOptions::new().acquire_timeout(ACQUIRE_TIMEOUT);

    if in_memory {
        // Every connection would see its own empty database, and a recycled
        // connection would drop the data.
        pool_opts = pool_opts
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    } else {
        let busy_ms = cfg.busy_timeout_ms.unwrap_or(DEFAULT_BUSY_TIMEOUT_MS);
        connect_opts = connect_opts
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_millis(u64::from(busy_ms)));
        pool_opts = pool_opts.max_connections(cfg.max_conns.unwrap_or(DEFAULT_MAX_CONNS));
    }

    tracing::info!("Connecting to database: {}", dsn);
    let pool = pool_opts
        .connect_with(connect_opts)
        .await
        .with_context(|| format!("Failed to open database {dsn}"))?;
    Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
}
