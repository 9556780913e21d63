//! # Workgroup Intrinsics
//!
//! Execution-context primitives for GPU compute kernels, along one axis (X):
//!
//! - `work_item_x`: index of the calling thread within its workgroup
//! - `work_group_x`: index of the calling thread's workgroup in the grid
//! - `work_dim_x`: workgroup size, fixed by the dispatch
//! - `sync_threads`: collective workgroup barrier
//!
//! ## Design Goals
//! - One portable contract ([`ExecutionContext`]), one implementation per backend
//! - Zero-overhead, infallible device operations (one builtin each)
//! - Explicit context parameters instead of hidden ambient state
//! - Host-side verification through a threaded simulator and a `wgpu` probe
//!
//! ## Backends
//!
//! | Build | What implements the contract |
//! |---|---|
//! | `--target amdgcn-amd-amdhsa` | [`Device`] over `llvm.amdgcn.*` |
//! | `--target nvptx64-nvidia-cuda` | [`Device`] over PTX special registers |
//! | host | [`sim::SimContext`] driven by [`sim::Simulator`] |
//! | host, `--features gpu` | WGSL probes in [`gpu`] |
//!
//! Device builds are `no_std` and contain only the contract and the
//! intrinsic backend.

#![cfg_attr(any(target_arch = "amdgpu", target_arch = "nvptx64"), no_std)]
#![cfg_attr(target_arch = "amdgpu", feature(stdarch_amdgpu, core_intrinsics, gpu_intrinsics))]
#![cfg_attr(target_arch = "nvptx64", feature(stdarch_nvptx))]
#![forbid(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]
#![deny(dead_code)]

pub mod kernel;
pub mod arch;

#[cfg(not(any(target_arch = "amdgpu", target_arch = "nvptx64")))]
pub mod sim;

#[cfg(all(feature = "gpu", not(any(target_arch = "amdgpu", target_arch = "nvptx64"))))]
pub mod gpu;

// ─────────────────────────────────────────────────────────────────────────────
// Re-exports (Public API)
// ─────────────────────────────────────────────────────────────────────────────

pub use kernel::context::ExecutionContext;

pub use kernel::types::{
    WorkItemID,
    WorkGroupID,
    WorkDim,
    MAX_WORKGROUP_SIZE,
    DEFAULT_WORKGROUP_SIZE,
};

pub use arch::Backend;

#[cfg(any(target_arch = "amdgpu", target_arch = "nvptx64"))]
pub use arch::{
    Device,
    work_item_x,
    work_group_x,
    work_dim_x,
    sync_threads,
};

#[cfg(not(any(target_arch = "amdgpu", target_arch = "nvptx64")))]
pub use kernel::config::DispatchConfig;

#[cfg(not(any(target_arch = "amdgpu", target_arch = "nvptx64")))]
pub use kernel::error::{
    KernelResult,
    KernelError,
    ConfigError,
    ExecutionError,
};

// ─────────────────────────────────────────────────────────────────────────────
// Prelude
// ─────────────────────────────────────────────────────────────────────────────

/// Commonly used types.
///
/// Import with:
/// ```rust
/// use workgroup_intrinsics::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        Backend,
        ExecutionContext,
        WorkDim,
        WorkGroupID,
        WorkItemID,
    };

    #[cfg(any(target_arch = "amdgpu", target_arch = "nvptx64"))]
    pub use crate::{
        Device,
        work_item_x,
        work_group_x,
        work_dim_x,
        sync_threads,
    };

    #[cfg(not(any(target_arch = "amdgpu", target_arch = "nvptx64")))]
    pub use crate::{
        DispatchConfig,
        KernelResult,
        sim::{SimContext, Simulator, WorkgroupShared},
    };
}
