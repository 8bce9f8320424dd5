use dirs::home_dir;
use std::{env, fs, path::Path, path::PathBuf, sync::Once};

use crate::errors::Result;

const DEFAULT_DIR_NAME: &str = ".ledger_core";
const LEDGER_DIR: &str = "ledgers";
const BACKUP_DIR: &str = "backups";

static TRACING_INIT: Once = Once::new();

/// Initializes the global tracing subscriber with sensible defaults.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter =
            EnvFilter::from_default_env().add_directive("ledger_core=info".parse().unwrap());

        fmt().with_env_filter(filter).init();
    });
}

/// Returns the application-specific data directory, defaulting to
/// `~/.ledger_core`. `LEDGER_CORE_HOME` overrides it.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os("LEDGER_CORE_HOME") {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

/// Absolute path to the managed ledgers directory.
pub fn ledgers_dir() -> PathBuf {
    app_data_dir().join(LEDGER_DIR)
}

/// Base directory for backup snapshots.
pub fn backups_root() -> PathBuf {
    app_data_dir().join(BACKUP_DIR)
}

pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}
