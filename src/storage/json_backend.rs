use chrono::{DateTime, NaiveDateTime, Utc};
use std::{
    collections::HashSet,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::errors::{LedgerError, Result};
use crate::ledger::{Ledger, CURRENT_SCHEMA_VERSION};
use crate::utils::{backups_root, ensure_dir, ledgers_dir};

use super::StorageBackend;

const BACKUP_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const TMP_SUFFIX: &str = "tmp";
const DEFAULT_RETENTION: usize = 5;

/// File-per-ledger JSON persistence with timestamped backup snapshots.
///
/// Saves never write the target in place: data goes to a sibling tmp file
/// first and is renamed over the original, and the previous file is copied
/// into the backup directory before being replaced.
#[derive(Clone)]
pub struct JsonStorage {
    ledgers_dir: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
}

impl JsonStorage {
    pub fn new(root: Option<PathBuf>, retention: Option<usize>) -> Result<Self> {
        let (ledgers, backups) = match root {
            Some(base) => (base.join("ledgers"), base.join("backups")),
            None => (ledgers_dir(), backups_root()),
        };
        ensure_dir(&ledgers)?;
        ensure_dir(&backups)?;
        Ok(Self {
            ledgers_dir: ledgers,
            backups_dir: backups,
            retention: retention.unwrap_or(DEFAULT_RETENTION).max(1),
        })
    }

    pub fn new_default() -> Result<Self> {
        Self::new(None, None)
    }

    pub fn ledger_path(&self, name: &str) -> PathBuf {
        self.ledgers_dir
            .join(format!("{}.json", canonical_name(name)))
    }

    fn backup_dir(&self, name: &str) -> PathBuf {
        self.backups_dir.join(canonical_name(name))
    }

    pub fn backup_path(&self, name: &str, backup_name: &str) -> PathBuf {
        self.backup_dir(name).join(backup_name)
    }

    fn write_backup_file(&self, ledger: &Ledger, name: &str, note: Option<&str>) -> Result<()> {
        let dir = self.backup_dir(name);
        ensure_dir(&dir)?;
        let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let mut file_stem = format!("{}_{}", canonical_name(name), timestamp);
        if let Some(label) = sanitize_backup_note(note) {
            file_stem.push('_');
            file_stem.push_str(&label);
        }
        let path = unique_backup_path(&dir, &file_stem);
        let json = serde_json::to_string_pretty(ledger)?;
        write_atomic(&path, &json)?;
        self.prune_backups(name)?;
        Ok(())
    }

    fn backup_existing_file(&self, name: &str, path: &Path) -> Result<()> {
        if !path.exists() {
            return Ok(());
        }
        let dir = self.backup_dir(name);
        ensure_dir(&dir)?;
        let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let file_stem = format!("{}_{}", canonical_name(name), timestamp);
        fs::copy(path, unique_backup_path(&dir, &file_stem))?;
        self.prune_backups(name)?;
        Ok(())
    }

    fn prune_backups(&self, name: &str) -> Result<()> {
        let backups = self.list_backups(name)?;
        if backups.len() <= self.retention {
            return Ok(());
        }
        for entry in backups.iter().skip(self.retention) {
            let path = self.backup_path(name, entry);
            let _ = fs::remove_file(path);
        }
        Ok(())
    }
}

impl StorageBackend for JsonStorage {
    fn save(&self, ledger: &Ledger, name: &str) -> Result<()> {
        let path = self.ledger_path(name);
        if let Some(parent) = path.parent() {
            ensure_dir(parent)?;
        }
        if path.exists() {
            self.backup_existing_file(name, &path)?;
        }
        save_ledger_to_path(ledger, &path)?;
        tracing::debug!(ledger = %ledger.name, path = %path.display(), "ledger saved");
        Ok(())
    }

    fn load(&self, name: &str) -> Result<Ledger> {
        let path = self.ledger_path(name);
        load_ledger_from_path(&path)
    }

    fn list_backups(&self, name: &str) -> Result<Vec<String>> {
        let dir = self.backup_dir(name);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(BACKUP_EXTENSION) {
                continue;
            }
            let file_name = match path.file_name().and_then(|stem| stem.to_str()) {
                Some(name) => name.to_string(),
                None => continue,
            };
            entries.push(file_name);
        }
        entries.sort_by(|a, b| parse_backup_timestamp(b).cmp(&parse_backup_timestamp(a)));
        Ok(entries)
    }

    fn backup(&self, ledger: &Ledger, name: &str, note: Option<&str>) -> Result<()> {
        self.write_backup_file(ledger, name, note)
    }

    fn restore(&self, name: &str, backup_name: &str) -> Result<Ledger> {
        let backup_path = self.backup_path(name, backup_name);
        if !backup_path.exists() {
            return Err(LedgerError::Storage(format!(
                "backup `{}` not found",
                backup_name
            )));
        }
        let target = self.ledger_path(name);
        fs::copy(&backup_path, &target)?;
        load_ledger_from_path(&target)
    }
}

pub fn save_ledger_to_path(ledger: &Ledger, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(ledger)?;
    write_atomic(path, &json)
}

pub fn load_ledger_from_path(path: &Path) -> Result<Ledger> {
    let data = fs::read_to_string(path)?;
    let ledger: Ledger = serde_json::from_str(&data)?;
    if ledger.schema_version > CURRENT_SCHEMA_VERSION {
        return Err(LedgerError::Storage(format!(
            "ledger `{}` uses schema version {} but this build reads up to {}",
            ledger.name, ledger.schema_version, CURRENT_SCHEMA_VERSION
        )));
    }
    Ok(ledger)
}

fn canonical_name(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' => c,
            _ => '_',
        })
        .collect();
    if sanitized.trim_matches('_').is_empty() {
        "ledger".into()
    } else {
        sanitized
    }
}

fn sanitize_backup_note(note: Option<&str>) -> Option<String> {
    let raw = note?.trim();
    if raw.is_empty() {
        return None;
    }
    let mut sanitized = String::new();
    let mut last_dash = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            sanitized.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if ch.is_whitespace() || matches!(ch, '-' | '.') {
            if !sanitized.is_empty() && !last_dash {
                sanitized.push('-');
                last_dash = true;
            }
        }
    }
    let trimmed = sanitized.trim_matches('-').to_string();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

fn parse_backup_timestamp(name: &str) -> Option<DateTime<Utc>> {
    let stem = name.strip_suffix(".json")?;
    let mut parts = stem.split('_');
    // canonical name may itself contain underscores; scan for the
    // date_time pair instead of assuming a fixed position.
    let mut date_part = None;
    let mut time_part = None;
    while let Some(part) = parts.next() {
        if is_digits(part, 8) {
            if let Some(next) = parts.next() {
                if is_digits(next, 6) {
                    date_part = Some(part);
                    time_part = Some(next);
                    break;
                }
            }
        }
    }
    let raw = format!("{}{}", date_part?, time_part?);
    NaiveDateTime::parse_from_str(&raw, "%Y%m%d%H%M%S")
        .ok()
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}

/// Picks a backup file name that does not collide with an existing one,
/// so several snapshots taken within one timestamp tick all survive.
fn unique_backup_path(dir: &Path, stem: &str) -> PathBuf {
    let mut path = dir.join(format!("{}.{}", stem, BACKUP_EXTENSION));
    let mut counter = 1u32;
    while path.exists() {
        path = dir.join(format!("{}_{:02}.{}", stem, counter, BACKUP_EXTENSION));
        counter += 1;
    }
    path
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

/// Writes to a sibling tmp file first and renames it over the target, so a
/// failure partway through never clobbers an existing file.
fn write_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let tmp = tmp_path(path);
    let mut file = File::create(&tmp)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Non-fatal referential checks run after loading a ledger from disk.
/// Dangling references are reported, never repaired.
pub fn ledger_warnings(ledger: &Ledger) -> Vec<String> {
    let account_ids: HashSet<_> = ledger.accounts.iter().map(|a| a.id).collect();
    let category_ids: HashSet<_> = ledger.categories.iter().map(|c| c.id).collect();
    let card_ids: HashSet<_> = ledger.cards.iter().map(|c| c.id).collect();
    let purchase_ids: HashSet<_> = ledger.purchases.iter().map(|p| p.id).collect();
    let transaction_ids: HashSet<_> = ledger.transactions.iter().map(|t| t.id).collect();
    let mut warnings = Vec::new();

    for txn in &ledger.transactions {
        if !account_ids.contains(&txn.account_id) {
            warnings.push(format!(
                "transaction {} references unknown account {}",
                txn.id, txn.account_id
            ));
        }
        if !category_ids.contains(&txn.category_id) {
            warnings.push(format!(
                "transaction {} references missing category {}",
                txn.id, txn.category_id
            ));
        }
        if let Some(pair_id) = txn.pair_id() {
            if !transaction_ids.contains(&pair_id) {
                warnings.push(format!(
                    "transaction {} references missing paired leg {}",
                    txn.id, pair_id
                ));
            }
        }
    }
    for purchase in &ledger.purchases {
        if !card_ids.contains(&purchase.card_id) {
            warnings.push(format!(
                "purchase {} references unknown card {}",
                purchase.id, purchase.card_id
            ));
        }
        if !category_ids.contains(&purchase.category_id) {
            warnings.push(format!(
                "purchase {} references missing category {}",
                purchase.id, purchase.category_id
            ));
        }
    }
    for installment in &ledger.installments {
        if !purchase_ids.contains(&installment.purchase_id) {
            warnings.push(format!(
                "installment {} references missing purchase {}",
                installment.id, installment.purchase_id
            ));
        }
    }
    for goal in &ledger.goals {
        if !category_ids.contains(&goal.category_id) {
            warnings.push(format!(
                "goal {} references missing category {}",
                goal.id, goal.category_id
            ));
        }
    }
    warnings
}
