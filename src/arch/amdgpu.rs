//! AMDGPU (`amdgcn-amd-amdhsa`) execution-context builtins.
//!
//! Identity queries and the barrier map to `core::arch::amdgpu`. The
//! workgroup size has no LLVM intrinsic of its own: it is read from the HSA
//! kernel dispatch packet, the same source `__builtin_amdgcn_workgroup_size_x`
//! lowers to, reached through `core::intrinsics::gpu`.

use core::arch::amdgpu;
use core::intrinsics::gpu::amdgpu_dispatch_ptr;

use crate::kernel::context::ExecutionContext;
use crate::kernel::types::{WorkDim, WorkGroupID, WorkItemID};

/// Byte offset of `workgroup_size_x` (`u16`) in `hsa_kernel_dispatch_packet_t`.
const DISPATCH_WORKGROUP_SIZE_X: usize = 4;

/// Execution context of the current AMDGPU work item.
#[derive(Debug, Clone, Copy, Default)]
pub struct Device;

impl ExecutionContext for Device {
    #[inline(always)]
    fn work_item_x(&self) -> WorkItemID {
        amdgpu::workitem_id_x()
    }

    #[inline(always)]
    fn work_group_x(&self) -> WorkGroupID {
        amdgpu::workgroup_id_x()
    }

    #[inline(always)]
    fn work_dim_x(&self) -> WorkDim {
        // SAFETY: the dispatch packet is valid for the lifetime of every
        // kernel launched through HSA and `workgroup_size_x` is 2-byte aligned.
        unsafe {
            let packet = amdgpu_dispatch_ptr().cast::<u8>();
            let size = packet.add(DISPATCH_WORKGROUP_SIZE_X).cast::<u16>().read();
            WorkDim::from(size)
        }
    }

    #[inline(always)]
    fn sync_threads(&self) {
        amdgpu::s_barrier()
    }
}
