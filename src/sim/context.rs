//! Per-work-item execution context on the host.

use crate::kernel::context::ExecutionContext;
use crate::kernel::types::{WorkDim, WorkGroupID, WorkItemID};
use crate::sim::barrier::GroupBarrier;

/// Execution context of one simulated work item.
///
/// Holds the injected identity values and a reference to its workgroup's
/// barrier. The values never change after construction, so every query is
/// idempotent.
#[derive(Debug, Clone, Copy)]
pub struct SimContext<'a> {
    item: WorkItemID,
    group: WorkGroupID,
    dim: WorkDim,
    barrier: &'a GroupBarrier,
}

impl<'a> SimContext<'a> {
    /// Builds a context with hand-picked identity values.
    ///
    /// The simulator constructs these itself; direct construction is for
    /// injecting a specific position into kernel code under test.
    /// `sync_threads` rendezvous with however many participants `barrier`
    /// was built for.
    ///
    /// ## Panics
    /// If `item >= dim`.
    pub fn new(item: WorkItemID, group: WorkGroupID, dim: WorkDim, barrier: &'a GroupBarrier) -> Self {
        assert!(item < dim, "work item {item} outside workgroup of {dim}");
        Self { item, group, dim, barrier }
    }

    /// The workgroup barrier this context synchronizes on.
    #[inline]
    pub fn barrier(&self) -> &'a GroupBarrier {
        self.barrier
    }
}

impl ExecutionContext for SimContext<'_> {
    #[inline]
    fn work_item_x(&self) -> WorkItemID {
        self.item
    }

    #[inline]
    fn work_group_x(&self) -> WorkGroupID {
        self.group
    }

    #[inline]
    fn work_dim_x(&self) -> WorkDim {
        self.dim
    }

    #[inline]
    fn sync_threads(&self) {
        self.barrier.wait();
    }
}
