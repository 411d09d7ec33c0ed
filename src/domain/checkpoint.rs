use std::collections::BTreeSet;

use crate::domain::ticket::TicketId;

/// Identifiers that have already been announced. Append-only: there is no way
/// to remove an identifier once inserted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckpointSet {
    ids: BTreeSet<TicketId>,
}

impl CheckpointSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when the identifier was not present before.
    pub fn insert(&mut self, id: TicketId) -> bool {
        self.ids.insert(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TicketId> {
        self.ids.iter()
    }
}

impl FromIterator<TicketId> for CheckpointSet {
    fn from_iter<I: IntoIterator<Item = TicketId>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}
