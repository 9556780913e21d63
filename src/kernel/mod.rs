//! # Kernel Module
//!
//! The portable execution-context contract and the host-side types that
//! describe a dispatch.
//!
//! - `types`: grid identifiers and limits
//! - `context`: the [`ExecutionContext`](context::ExecutionContext) trait
//! - `config`: validated launch shapes (host only)
//! - `error`: dispatch infrastructure errors (host only)
//!
//! Public API exposure is controlled by `lib.rs`.

pub mod types;
pub mod context;

#[cfg(not(any(target_arch = "amdgpu", target_arch = "nvptx64")))]
pub mod error;
#[cfg(not(any(target_arch = "amdgpu", target_arch = "nvptx64")))]
pub mod config;
