use std::collections::BTreeMap;

use model::RecordKind;

/// How the initial sync of a session went.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InitialSync {
    /// The owner had remote data; local tables were replaced with it.
    Downloaded { records: usize },
    /// The owner had no remote data; every local record was uploaded.
    Uploaded { records: usize },
    /// The remote was unreachable or rejected the data. The session runs on
    /// local data and the background push takes over.
    LocalOnly,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KindOutcome {
    Pushed { upserted: usize, deleted: usize },
    Failed(String),
}

/// Per-kind result of one background cycle.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CycleReport {
    kinds: BTreeMap<RecordKind, KindOutcome>,
}

impl CycleReport {
    pub(crate) fn pushed(&mut self, kind: RecordKind, upserted: usize, deleted: usize) {
        self.kinds
            .insert(kind, KindOutcome::Pushed { upserted, deleted });
    }

    pub(crate) fn failed(&mut self, kind: RecordKind, message: String) {
        self.kinds.insert(kind, KindOutcome::Failed(message));
    }

    #[must_use]
    pub fn outcome(&self, kind: RecordKind) -> Option<&KindOutcome> {
        self.kinds.get(&kind)
    }

    pub fn failures(&self) -> impl Iterator<Item = (RecordKind, &str)> {
        self.kinds.iter().filter_map(|(kind, outcome)| match outcome {
            KindOutcome::Failed(message) => Some((*kind, message.as_str())),
            KindOutcome::Pushed { .. } => None,
        })
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures().next().is_none()
    }

    #[must_use]
    pub fn upserted(&self) -> usize {
        self.totals().0
    }

    #[must_use]
    pub fn deleted(&self) -> usize {
        self.totals().1
    }

    fn totals(&self) -> (usize, usize) {
        self.kinds
            .values()
            .fold((0, 0), |(up, del), outcome| match outcome {
                KindOutcome::Pushed { upserted, deleted } => (up + upserted, del + deleted),
                KindOutcome::Failed(_) => (up, del),
            })
    }
}
