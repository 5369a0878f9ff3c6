// src/state.rs

use crate::models::HierarchyIndex;

/// Represents the state of the hierarchy index.
/// It holds the current state and, once mutated, a snapshot of the original state.
#[derive(Debug)]
enum IndexState {
    /// No mutation has been requested yet.
    Pristine(HierarchyIndex),
    /// A mutation has been requested. We hold both the original snapshot
    /// and the current, mutable state.
    Dirty {
        original: HierarchyIndex,
        current: HierarchyIndex,
    },
}

/// A hierarchy index that remembers whether it diverged from what was loaded.
#[derive(Debug)]
pub struct JournaledIndex {
    state: IndexState,
}

impl JournaledIndex {
    pub fn new(index: HierarchyIndex) -> Self {
        Self {
            state: IndexState::Pristine(index),
        }
    }

    /// Compares the current state against the original snapshot, if one exists.
    pub fn needs_saving(&self) -> bool {
        match &self.state {
            IndexState::Pristine(_) => false,
            IndexState::Dirty { original, current } => original != current,
        }
    }

    /// Read-only access to the current index state.
    pub fn index(&self) -> &HierarchyIndex {
        match &self.state {
            IndexState::Pristine(index) => index,
            IndexState::Dirty { current, .. } => current,
        }
    }

    /// Mutable access. The first call snapshots the original state.
    pub fn index_mut(&mut self) -> &mut HierarchyIndex {
        if let IndexState::Pristine(_) = self.state {
            let taken = std::mem::replace(
                &mut self.state,
                IndexState::Pristine(HierarchyIndex::default()),
            );
            if let IndexState::Pristine(index) = taken {
                self.state = IndexState::Dirty {
                    original: index.clone(),
                    current: index,
                };
            }
        }

        match &mut self.state {
            IndexState::Dirty { current, .. } => current,
            IndexState::Pristine(index) => index,
        }
    }

    /// Records that the current state has been persisted.
    pub fn mark_saved(&mut self) {
        let taken = std::mem::replace(
            &mut self.state,
            IndexState::Pristine(HierarchyIndex::default()),
        );
        self.state = match taken {
            IndexState::Dirty { current, .. } => IndexState::Pristine(current),
            pristine => pristine,
        };
    }
}
