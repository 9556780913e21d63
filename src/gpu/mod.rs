//! # GPU Probe Backend
//!
//! Checks the execution-context contract on a real compute device through
//! `wgpu`. Feature-gated (`feature = "gpu"`).
//!
//! Kernels here are WGSL, not Rust: the probes express the same four
//! operations with WGSL builtins (`local_invocation_id.x`, `workgroup_id.x`,
//! the pipeline's `@workgroup_size`, `workgroupBarrier()`) and report what
//! each work item observed. Host tests then assert the same properties they
//! assert against the simulator.
//!
//! ## Module structure
//!
//! * [`context`] - adapter, device and queue initialization
//! * [`pipeline`] - probe WGSL sources and the compute pipeline cache
//! * [`dispatch`] - probe execution and readback
//!
//! ## Public API
//!
//! * [`run_identity_probe`] - `(work_item_x, work_group_x, work_dim_x)` per work item
//! * [`run_neighbor_exchange_probe`] - barrier visibility check
//! * [`is_available`] - whether a device could be initialized

#![cfg(feature = "gpu")]

pub mod context;
pub mod pipeline;
pub mod dispatch;

pub use context::GPUContext;
pub use dispatch::{
    adapter_name,
    is_available,
    run_identity_probe,
    run_neighbor_exchange_probe,
    ProbeRecord,
};
pub use pipeline::{PipelineCache, ProbeKind};
