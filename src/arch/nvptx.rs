//! NVPTX (`nvptx64-nvidia-cuda`) execution-context builtins.
//!
//! CUDA naming: work item = thread, workgroup = block.

use core::arch::nvptx;

use crate::kernel::context::ExecutionContext;
use crate::kernel::types::{WorkDim, WorkGroupID, WorkItemID};

/// Execution context of the current CUDA thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct Device;

// SAFETY (all methods): the special registers and `bar.sync 0` are only
// meaningful inside a kernel; calling them elsewhere is the caller's
// obligation, as for every method of `ExecutionContext`.
impl ExecutionContext for Device {
    #[inline(always)]
    fn work_item_x(&self) -> WorkItemID {
        unsafe { nvptx::_thread_idx_x() }
    }

    #[inline(always)]
    fn work_group_x(&self) -> WorkGroupID {
        unsafe { nvptx::_block_idx_x() }
    }

    #[inline(always)]
    fn work_dim_x(&self) -> WorkDim {
        unsafe { nvptx::_block_dim_x() }
    }

    #[inline(always)]
    fn sync_threads(&self) {
        unsafe { nvptx::_syncthreads() }
    }
}
