//! Storage collaborator seam, plus `Ledger`: the in-memory store the CLI
//! persists as JSON and tests use directly.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use pesa_core::{BudgetSettings, Category, CategoryBook, CategoryId, CategoryRule, Transaction};

/// What the pipeline needs from storage during a single run.
pub trait LedgerStore {
    fn insert_transaction(&mut self, txn: Transaction) -> Result<u64>;
    /// Rules in insertion order.
    fn list_category_rules(&self) -> Result<Vec<CategoryRule>>;
    fn budget_settings(&self) -> Result<BudgetSettings>;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredTransaction {
    pub id: u64,
    pub transaction: Transaction,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Ledger {
    #[serde(default)]
    next_id: u64,
    #[serde(default)]
    transactions: Vec<StoredTransaction>,
    #[serde(default)]
    rules: Vec<CategoryRule>,
    #[serde(default)]
    categories: CategoryBook,
    #[serde(default)]
    budget: BudgetSettings,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Newest first.
    pub fn transactions(&self) -> Vec<&StoredTransaction> {
        let mut out: Vec<_> = self.transactions.iter().collect();
        out.sort_by(|a, b| b.transaction.timestamp.cmp(&a.transaction.timestamp));
        out
    }

    pub fn transaction(&self, id: u64) -> Option<&StoredTransaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    pub fn delete_transaction(&mut self, id: u64) -> bool {
        let before = self.transactions.len();
        self.transactions.retain(|t| t.id != id);
        self.transactions.len() != before
    }

    pub fn categories(&self) -> &[Category] {
        self.categories.all()
    }

    pub fn add_category(&mut self, name: &str, color: &str) -> Result<CategoryId> {
        Ok(self.categories.add(name, color)?)
    }

    pub fn rename_category(&mut self, id: CategoryId, name: &str) -> Result<()> {
        Ok(self.categories.rename(id, name)?)
    }

    /// Delete a category. Member transactions and rules pointing at it move to
    /// "Other" first.
    pub fn delete_category(&mut self, id: CategoryId) -> Result<Category> {
        if id.is_default() || !self.categories.contains(id) {
            // Surface the book's own error without touching transactions.
            return Ok(self.categories.delete(id)?);
        }
        for stored in &mut self.transactions {
            if stored.transaction.category == Some(id) {
                stored.transaction.assign_category(CategoryId::OTHER);
            }
        }
        for rule in &mut self.rules {
            if rule.category_id == id {
                rule.category_id = CategoryId::OTHER;
            }
        }
        Ok(self.categories.delete(id)?)
    }

    /// Re-assign one stored transaction's category.
    pub fn recategorize(&mut self, id: u64, category: CategoryId) -> Result<()> {
        anyhow::ensure!(self.categories.contains(category), "unknown category: {category}");
        let stored = self
            .transactions
            .iter_mut()
            .find(|t| t.id == id)
            .with_context(|| format!("no transaction with id {id}"))?;
        stored.transaction.assign_category(category);
        Ok(())
    }

    pub fn add_rule(&mut self, rule: CategoryRule) -> Result<()> {
        anyhow::ensure!(
            rule.counterparty_pattern.is_some() || rule.description_pattern.is_some(),
            "a rule needs a counterparty or description pattern"
        );
        anyhow::ensure!(
            self.categories.contains(rule.category_id),
            "unknown category: {}",
            rule.category_id
        );
        self.rules.push(rule);
        Ok(())
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    pub fn budget(&self) -> &BudgetSettings {
        &self.budget
    }

    pub fn set_budget(&mut self, budget: BudgetSettings) {
        self.budget = budget;
    }

    /// Re-seed invariants after deserializing from disk.
    pub fn repair(&mut self) {
        self.categories.ensure_default();
        let max_id = self.transactions.iter().map(|t| t.id).max().unwrap_or(0);
        self.next_id = self.next_id.max(max_id);
    }
}

impl LedgerStore for Ledger {
    fn insert_transaction(&mut self, txn: Transaction) -> Result<u64> {
        self.next_id += 1;
        let id = self.next_id;
        self.transactions.push(StoredTransaction { id, transaction: txn });
        Ok(id)
    }

    fn list_category_rules(&self) -> Result<Vec<CategoryRule>> {
        Ok(self.rules.clone())
    }

    fn budget_settings(&self) -> Result<BudgetSettings> {
        Ok(self.budget.clone())
    }
}
