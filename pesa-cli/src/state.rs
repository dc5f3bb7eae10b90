use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use pesa_core::{BudgetSettings, CategoryRule, Transaction};
use pesa_finance::{Ledger, LedgerStore};

/// `$PESA_HOME`, else `~/.pesa`
pub fn pesa_home() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os("PESA_HOME") {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".pesa"))
}

pub fn ensure_pesa_home() -> Result<PathBuf> {
    let dir = pesa_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn ledger_path() -> Result<PathBuf> {
    Ok(ensure_pesa_home()?.join("ledger.json"))
}

pub fn outbox_path() -> Result<PathBuf> {
    Ok(ensure_pesa_home()?.join("outbox.jsonl"))
}

/// A `Ledger` persisted as one JSON file. Inserts write through; other
/// edits go through `ledger_mut` followed by `save`.
#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    ledger: Ledger,
}

impl JsonStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let ledger = if path.exists() {
            let s = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
            let mut ledger: Ledger = serde_json::from_str(&s)
                .with_context(|| format!("parse {}", path.display()))?;
            ledger.repair();
            ledger
        } else {
            Ledger::new()
        };
        Ok(Self { path, ledger })
    }

    pub fn open_default() -> Result<Self> {
        Self::open(ledger_path()?)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut Ledger {
        &mut self.ledger
    }

    pub fn save(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.ledger)?;
        // Write-then-rename so a crash never leaves a truncated ledger.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).with_context(|| format!("write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path).with_context(|| format!("replace {}", self.path.display()))?;
        Ok(())
    }
}

impl LedgerStore for JsonStore {
    fn insert_transaction(&mut self, txn: Transaction) -> Result<u64> {
        let id = self.ledger.insert_transaction(txn)?;
        self.save()?;
        Ok(id)
    }

    fn list_category_rules(&self) -> Result<Vec<CategoryRule>> {
        self.ledger.list_category_rules()
    }

    fn budget_settings(&self) -> Result<BudgetSettings> {
        self.ledger.budget_settings()
    }
}
