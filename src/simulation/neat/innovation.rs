//! Population-wide table of historical markings.
//!
//! Every genome that shares a ledger gets the same innovation id for the same
//! `(source, target)` node pair, no matter when or where the connection is
//! created. The ledger only grows; an id is never reassigned.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Maps `(source, target)` node id pairs to stable innovation ids.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "LedgerRecord", into = "LedgerRecord")]
pub struct InnovationLedger {
    ids: HashMap<(usize, usize), usize>,
    last_id: usize,
}

impl InnovationLedger {
    /// Creates an empty ledger. The first assigned id is 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id for a pair, assigning the next id on first sight.
    pub fn innovation_id(&mut self, source: usize, target: usize) -> usize {
        if let Some(&id) = self.ids.get(&(source, target)) {
            return id;
        }
        self.last_id += 1;
        self.ids.insert((source, target), self.last_id);
        self.last_id
    }

    /// Looks up a pair without assigning.
    pub fn get(&self, source: usize, target: usize) -> Option<usize> {
        self.ids.get(&(source, target)).copied()
    }

    /// The most recently assigned id (0 when empty).
    pub fn last_id(&self) -> usize {
        self.last_id
    }

    /// Number of distinct pairs seen so far.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns `true` if no id has been assigned yet.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// JSON cannot key maps by tuples, so the ledger travels as a flat list.
#[derive(Serialize, Deserialize)]
struct LedgerRecord {
    last_id: usize,
    entries: Vec<(usize, usize, usize)>,
}

impl From<InnovationLedger> for LedgerRecord {
    fn from(ledger: InnovationLedger) -> Self {
        let mut entries: Vec<_> = ledger
            .ids
            .into_iter()
            .map(|((source, target), id)| (source, target, id))
            .collect();
        entries.sort_unstable_by_key(|&(_, _, id)| id);
        Self {
            last_id: ledger.last_id,
            entries,
        }
    }
}

impl From<LedgerRecord> for InnovationLedger {
    fn from(record: LedgerRecord) -> Self {
        let last_id = record
            .entries
            .iter()
            .map(|&(_, _, id)| id)
            .max()
            .unwrap_or(0)
            .max(record.last_id);
        Self {
            ids: record
                .entries
                .into_iter()
                .map(|(source, target, id)| ((source, target), id))
                .collect(),
            last_id,
        }
    }
}
