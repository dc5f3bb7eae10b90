//! Ordered, user-defined category rules.
//!
//! Patterns follow SQL `LIKE`: `%` matches any run of characters (including
//! none), `_` matches exactly one, and letters compare ASCII case-insensitively.
//! A rule fires when its counterparty pattern matches the counterparty OR its
//! description pattern matches the description. First rule wins; no match
//! falls back to "Other".

use pesa_core::{CategoryId, CategoryRule, Transaction};

/// Whole-string SQL `LIKE` match.
pub fn like_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();

    let (mut pi, mut ti) = (0, 0);
    // Position of the last `%` seen, and the text index it is currently absorbing up to.
    let mut backtrack: Option<(usize, usize)> = None;

    while ti < t.len() {
        if pi < p.len() && p[pi] == '%' {
            backtrack = Some((pi, ti));
            pi += 1;
        } else if pi < p.len() && (p[pi] == '_' || p[pi].eq_ignore_ascii_case(&t[ti])) {
            pi += 1;
            ti += 1;
        } else if let Some((star, absorbed)) = backtrack {
            pi = star + 1;
            ti = absorbed + 1;
            backtrack = Some((star, ti));
        } else {
            return false;
        }
    }

    p[pi..].iter().all(|c| *c == '%')
}

fn pattern_matches(pattern: Option<&str>, text: &str) -> bool {
    pattern.is_some_and(|p| like_match(p, text))
}

fn rule_matches(rule: &CategoryRule, txn: &Transaction) -> bool {
    pattern_matches(rule.counterparty_pattern.as_deref(), &txn.counterparty)
        || pattern_matches(rule.description_pattern.as_deref(), &txn.description)
}

/// Category for `txn` under `rules`, scanned in stored order.
pub fn resolve_category(txn: &Transaction, rules: &[CategoryRule]) -> CategoryId {
    rules
        .iter()
        .find(|rule| rule_matches(rule, txn))
        .map(|rule| rule.category_id)
        .unwrap_or(CategoryId::OTHER)
}

/// Resolve and assign the category, returning it.
pub fn categorize(txn: &mut Transaction, rules: &[CategoryRule]) -> CategoryId {
    let category = resolve_category(txn, rules);
    txn.assign_category(category);
    category
}
