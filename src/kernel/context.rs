//! # Execution-Context Accessor
//!
//! The portable contract every backend implements: three identity queries
//! along the X axis and one collective barrier.
//!
//! ## Contract
//!
//! * [`ExecutionContext::work_item_x`] is in `[0, work_dim_x())`.
//! * [`ExecutionContext::work_group_x`] is identical for every thread of a
//!   workgroup and distinct between workgroups of one dispatch.
//! * [`ExecutionContext::work_dim_x`] is constant for the whole dispatch.
//! * [`ExecutionContext::sync_threads`] returns only once every thread of
//!   the calling workgroup has reached it; workgroup-shared writes issued
//!   before it are visible to the whole group after it.
//!
//! The queries are pure: repeated calls from one thread return the same
//! value.
//!
//! ## No error channel
//!
//! None of these operations can fail on conforming hardware, so none of them
//! return `Option` or `Result`. Calling them outside a kernel, or reaching
//! `sync_threads` under divergent control flow, is the caller's obligation
//! and is neither detected nor reported.
//!
//! ## Kernel code
//!
//! Kernels take the context explicitly, which keeps the ambient hardware
//! state visible in signatures and lets host tests inject synthetic
//! contexts:
//!
//! ```
//! use workgroup_intrinsics::ExecutionContext;
//!
//! fn scale<C: ExecutionContext>(ctx: &C, data: &mut [f32]) {
//!     let i = ctx.global_item_x() as usize;
//!     if i < data.len() {
//!         data[i] *= 2.0;
//!     }
//! }
//! ```

use crate::kernel::types::{WorkDim, WorkGroupID, WorkItemID};

/// Read-only view of the calling thread's position in the execution grid,
/// plus the workgroup barrier.
///
/// Implemented once per backend: the device intrinsics ([`crate::Device`]),
/// and the host simulator's per-thread context.
pub trait ExecutionContext {
    /// Zero-based index of the calling thread within its workgroup.
    fn work_item_x(&self) -> WorkItemID;

    /// Zero-based index of the calling thread's workgroup within the grid.
    fn work_group_x(&self) -> WorkGroupID;

    /// Thread count of the workgroup, as configured by the dispatch.
    fn work_dim_x(&self) -> WorkDim;

    /// Collective workgroup barrier.
    ///
    /// Every thread of the workgroup must call this; none proceeds until all
    /// have arrived.
    fn sync_threads(&self);

    /// Flattened index of the calling thread across the whole dispatch:
    /// `work_group_x * work_dim_x + work_item_x`.
    #[inline]
    fn global_item_x(&self) -> u32 {
        self.work_group_x()
            .wrapping_mul(self.work_dim_x())
            .wrapping_add(self.work_item_x())
    }

    /// `true` for work item 0 of each workgroup.
    #[inline]
    fn is_group_leader(&self) -> bool {
        self.work_item_x() == 0
    }
}

impl<C: ExecutionContext + ?Sized> ExecutionContext for &C {
    #[inline]
    fn work_item_x(&self) -> WorkItemID {
        (**self).work_item_x()
    }

    #[inline]
    fn work_group_x(&self) -> WorkGroupID {
        (**self).work_group_x()
    }

    #[inline]
    fn work_dim_x(&self) -> WorkDim {
        (**self).work_dim_x()
    }

    #[inline]
    fn sync_threads(&self) {
        (**self).sync_threads()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed {
        item: u32,
        group: u32,
        dim: u32,
    }

    impl ExecutionContext for Fixed {
        fn work_item_x(&self) -> u32 { self.item }
        fn work_group_x(&self) -> u32 { self.group }
        fn work_dim_x(&self) -> u32 { self.dim }
        fn sync_threads(&self) {}
    }

    #[test]
    fn global_item_flattens_group_and_item() {
        let ctx = Fixed { item: 5, group: 3, dim: 64 };
        assert_eq!(ctx.global_item_x(), 3 * 64 + 5);
        assert!(!ctx.is_group_leader());
    }

    #[test]
    fn leader_is_item_zero() {
        let ctx = Fixed { item: 0, group: 7, dim: 32 };
        assert!(ctx.is_group_leader());
        assert_eq!(ctx.global_item_x(), 224);
    }

    #[test]
    fn references_forward_to_the_context() {
        let ctx = Fixed { item: 2, group: 1, dim: 4 };
        let by_ref = &ctx;
        assert_eq!(ExecutionContext::work_item_x(&by_ref), 2);
        assert_eq!(ExecutionContext::global_item_x(&by_ref), 6);
    }
}
