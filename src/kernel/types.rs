//! Core identifiers and limits of the execution grid.
//!
//! The grid is one-dimensional: every identifier here refers to the X axis.
//!
//! ```text
//! | group 0           | group 1           | ... | group N-1         |
//! | item 0 .. dim - 1 | item 0 .. dim - 1 | ... | item 0 .. dim - 1 |
//! ```
//!
//! All values are `u32`, matching the register width the hardware builtins
//! report on every supported backend.

/// Index of a work item (thread) within its workgroup.
pub type WorkItemID = u32;

/// Index of a workgroup within the dispatch grid.
pub type WorkGroupID = u32;

/// Number of work items in one workgroup.
pub type WorkDim = u32;

/// Largest workgroup size accepted by host-side dispatch configuration.
///
/// This is the common upper bound across the supported device families
/// (CUDA `maxThreadsPerBlock`, HSA `workgroup_max_size`, wgpu
/// `max_compute_invocations_per_workgroup` on desktop adapters).
pub const MAX_WORKGROUP_SIZE: WorkDim = 1024;

/// Workgroup size used when a caller has no preference.
pub const DEFAULT_WORKGROUP_SIZE: WorkDim = 256;
