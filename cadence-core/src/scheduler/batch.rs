//! Update Batcher

use std::collections::VecDeque;

use crate::hooks::Update;
use crate::tree::NodeId;

/// The state slot an update is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UpdateTarget {
    pub node: NodeId,
    pub slot: usize,
}

#[derive(Debug)]
pub(crate) struct PendingUpdate {
    pub(crate) target: UpdateTarget,
    pub(crate) update: Update,
    /// Monotonic enqueue order.
    pub(crate) seq: u64,
}

/// Updates applied together in one render pass.
#[derive(Debug)]
pub(crate) struct Batch {
    pub(crate) updates: Vec<PendingUpdate>,
    /// Raised inside a batched scope (event handler or engine callback).
    pub(crate) scoped: bool,
}

/// Collects updates into batches.
///
/// `depth` counts open batched scopes. While it is non-zero, updates go
/// into `open`; closing the outermost scope seals `open` into one batch.
/// With no scope open, each update is sealed immediately as its own batch,
/// so distinct outside triggers never coalesce.
#[derive(Debug, Default)]
pub(crate) struct Batcher {
    seq: u64,
    depth: usize,
    open: Vec<PendingUpdate>,
    ready: VecDeque<Batch>,
}

impl Batcher {
    pub(crate) fn enqueue(&mut self, target: UpdateTarget, update: Update) {
        self.seq += 1;
        let pending = PendingUpdate {
            target,
            update,
            seq: self.seq,
        };
        if self.depth > 0 {
            self.open.push(pending);
        } else {
            self.ready.push_back(Batch {
                updates: vec![pending],
                scoped: false,
            });
        }
    }

    pub(crate) fn enter(&mut self) {
        self.depth += 1;
    }

    pub(crate) fn exit(&mut self) {
        debug_assert!(self.depth > 0, "batched scope closed twice");
        self.depth = self.depth.saturating_sub(1);
        if self.depth == 0 && !self.open.is_empty() {
            self.ready.push_back(Batch {
                updates: std::mem::take(&mut self.open),
                scoped: true,
            });
        }
    }

    #[cfg(test)]
    pub(crate) fn in_scope(&self) -> bool {
        self.depth > 0
    }

    pub(crate) fn next_batch(&mut self) -> Option<Batch> {
        self.ready.pop_front()
    }

    pub(crate) fn clear(&mut self) {
        self.open.clear();
        self.ready.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn target() -> UpdateTarget {
        UpdateTarget {
            node: NodeId::new(),
            slot: 0,
        }
    }

    #[test]
    fn outside_updates_stay_separate_and_ordered() {
        let mut batcher = Batcher::default();
        for n in 0..3 {
            batcher.enqueue(target(), Update::Replace(Value::new(n)));
        }
        let seqs: Vec<u64> = std::iter::from_fn(|| batcher.next_batch())
            .map(|batch| {
                assert_eq!(batch.updates.len(), 1);
                assert!(!batch.scoped);
                batch.updates[0].seq
            })
            .collect();
        assert_eq!(seqs, vec![1, 2, 3]);
    }

    #[test]
    fn empty_scope_produces_no_batch() {
        let mut batcher = Batcher::default();
        batcher.enter();
        batcher.exit();
        assert!(batcher.next_batch().is_none());
    }
}
