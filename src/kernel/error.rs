//! Error types for host-side dispatch infrastructure.
//!
//! The four execution-context operations are infallible and have no error
//! type. Everything here belongs to the machinery *around* them: validating
//! a dispatch configuration, running a simulated dispatch on host threads,
//! and driving the wgpu probe backend.
//!
//! ## Layout
//! * [`ConfigError`] - a dispatch configuration was rejected before anything ran.
//! * [`ExecutionError`] - a dispatch started but the host or GPU runtime failed.
//! * [`KernelError`] - aggregate of both, returned through [`KernelResult`].
//!
//! `From` conversions let lower layers use `?` and still return the
//! aggregate type.
//!
//! ## Display vs. Debug
//! * [`fmt::Display`] is short and log-friendly.
//! * [`fmt::Debug`] (derived) keeps the full structure.

use std::borrow::Cow;
use std::fmt;

use crate::kernel::types::{WorkDim, WorkGroupID};

/// Convenience alias for results produced by dispatch infrastructure.
pub type KernelResult<T> = Result<T, KernelError>;

/// Returned when a dispatch configuration cannot describe a valid grid.
///
/// ### Example
/// ```ignore
/// if workgroup_size == 0 {
///     return Err(ConfigError::ZeroWorkgroupSize.into());
/// }
/// ```

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {

    /// A workgroup must contain at least one work item.
    ZeroWorkgroupSize,

    /// The requested workgroup size exceeds the supported maximum.
    WorkgroupTooLarge {
        /// Size the caller asked for.
        requested: WorkDim,

        /// Largest accepted size.
        max: WorkDim,
    },

    /// A dispatch must launch at least one workgroup.
    ZeroWorkgroupCount,

    /// `workgroup_size * workgroup_count` does not fit a `u32` global index.
    GridOverflow {
        /// Requested workgroup size.
        workgroup_size: WorkDim,

        /// Requested workgroup count.
        workgroup_count: u32,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroWorkgroupSize => f.write_str("workgroup size must be at least 1"),
            ConfigError::WorkgroupTooLarge { requested, max } => write!(
                f,
                "workgroup size {} exceeds maximum {}",
                requested, max
            ),
            ConfigError::ZeroWorkgroupCount => f.write_str("dispatch must launch at least one workgroup"),
            ConfigError::GridOverflow { workgroup_size, workgroup_count } => write!(
                f,
                "grid of {} workgroups x {} items overflows a 32-bit global index",
                workgroup_count, workgroup_size
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Errors raised while a dispatch is executing.
///
/// ## Notes
/// Simulator failures (`ThreadSpawnFailed`, `KernelPanicked`) come from the
/// host OS. GPU failures carry the backend's message verbatim.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {

    /// The OS refused to start a simulated work-item thread.
    ThreadSpawnFailed {
        /// Workgroup being started.
        group: WorkGroupID,

        /// OS error message.
        message: Cow<'static, str>,
    },

    /// The worker pool running workgroups in parallel could not be built.
    PoolBuildFailed {
        /// Pool builder message.
        message: Cow<'static, str>,
    },

    /// Kernel code panicked on at least one work item of a workgroup.
    KernelPanicked {
        /// Workgroup in which the panic happened.
        group: WorkGroupID,
    },

    /// No usable GPU adapter or device could be created.
    GpuInitFailed {
        /// Backend message.
        message: Cow<'static, str>,
    },

    /// Pipeline creation, submission or device polling failed.
    GpuDispatchFailed {
        /// Backend message.
        message: Cow<'static, str>,
    },

    /// Mapping a result buffer back to the host failed.
    GpuReadbackFailed {
        /// Backend message.
        message: Cow<'static, str>,
    },

    /// A shared runtime lock was poisoned by a panicking holder.
    LockPoisoned {
        /// Name of the lock.
        what: &'static str,
    },
}

impl fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionError::ThreadSpawnFailed { group, message } => {
                write!(f, "failed to spawn work items for workgroup {}: {}", group, message)
            }
            ExecutionError::PoolBuildFailed { message } => {
                write!(f, "failed to build workgroup pool: {}", message)
            }
            ExecutionError::KernelPanicked { group } => {
                write!(f, "kernel panicked in workgroup {}", group)
            }
            ExecutionError::GpuInitFailed { message } => {
                write!(f, "gpu initialization failed: {}", message)
            }
            ExecutionError::GpuDispatchFailed { message } => {
                write!(f, "gpu dispatch failed: {}", message)
            }
            ExecutionError::GpuReadbackFailed { message } => {
                write!(f, "gpu readback failed: {}", message)
            }
            ExecutionError::LockPoisoned { what } => {
                write!(f, "{} lock poisoned", what)
            }
        }
    }
}

impl std::error::Error for ExecutionError {}

/// Aggregate error for dispatch infrastructure.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KernelError {

    /// The dispatch configuration was invalid.
    Config(ConfigError),

    /// The dispatch failed while running.
    Execution(ExecutionError),
}

impl fmt::Display for KernelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KernelError::Config(e) => write!(f, "invalid dispatch configuration: {e}"),
            KernelError::Execution(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for KernelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            KernelError::Config(e) => Some(e),
            KernelError::Execution(e) => Some(e),
        }
    }
}

impl From<ConfigError> for KernelError {
    fn from(e: ConfigError) -> Self { KernelError::Config(e) }
}

impl From<ExecutionError> for KernelError {
    fn from(e: ExecutionError) -> Self { KernelError::Execution(e) }
}
