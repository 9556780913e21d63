//! # Host Simulation Backend
//!
//! Executes kernels written against
//! [`ExecutionContext`](crate::kernel::context::ExecutionContext) on host
//! threads, so the execution-context contract can be exercised without a
//! GPU.
//!
//! ## Module structure
//!
//! * [`barrier`] - collective workgroup barrier
//! * [`shared`] - workgroup-local memory
//! * [`context`] - per-work-item context with injected identity values
//! * [`dispatch`] - grid execution and reporting
//!
//! ## Example
//!
//! ```
//! use workgroup_intrinsics::prelude::*;
//!
//! let config = DispatchConfig::single_group(64).unwrap();
//! let items = Simulator::new()
//!     .dispatch_collect(config, |ctx| ctx.work_item_x())
//!     .unwrap();
//! assert_eq!(items, (0..64).collect::<Vec<u32>>());
//! ```

pub mod barrier;
pub mod shared;
pub mod context;
pub mod dispatch;

pub use barrier::GroupBarrier;
pub use context::SimContext;
pub use dispatch::{simulate, DispatchReport, Simulator};
pub use shared::WorkgroupShared;
