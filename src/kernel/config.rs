//! Dispatch configuration.
//!
//! A [`DispatchConfig`] fixes the two numbers the execution context reports
//! for a whole dispatch: the workgroup size (`work_dim_x`) and how many
//! workgroups are launched (the range of `work_group_x`).
//!
//! Values are validated once, at construction, so backends can trust them.

use crate::kernel::error::{ConfigError, KernelResult};
use crate::kernel::types::{WorkDim, DEFAULT_WORKGROUP_SIZE, MAX_WORKGROUP_SIZE};

/// Validated one-dimensional launch shape.
///
/// ## Invariants
/// * `1 <= workgroup_size <= MAX_WORKGROUP_SIZE`
/// * `workgroup_count >= 1`
/// * `workgroup_size * workgroup_count` fits in `u32`

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DispatchConfig {
    workgroup_size: WorkDim,
    workgroup_count: u32,
}

impl DispatchConfig {
    /// Creates a configuration of `workgroup_count` groups of
    /// `workgroup_size` work items each.
    ///
    /// ## Errors
    /// Returns a [`ConfigError`] if any invariant is violated.
    pub fn new(workgroup_size: WorkDim, workgroup_count: u32) -> KernelResult<Self> {
        if workgroup_size == 0 {
            return Err(ConfigError::ZeroWorkgroupSize.into());
        }
        if workgroup_size > MAX_WORKGROUP_SIZE {
            return Err(ConfigError::WorkgroupTooLarge {
                requested: workgroup_size,
                max: MAX_WORKGROUP_SIZE,
            }
            .into());
        }
        if workgroup_count == 0 {
            return Err(ConfigError::ZeroWorkgroupCount.into());
        }
        if workgroup_size.checked_mul(workgroup_count).is_none() {
            return Err(ConfigError::GridOverflow { workgroup_size, workgroup_count }.into());
        }

        Ok(Self { workgroup_size, workgroup_count })
    }

    /// A dispatch of exactly one workgroup.
    pub fn single_group(workgroup_size: WorkDim) -> KernelResult<Self> {
        Self::new(workgroup_size, 1)
    }

    /// The smallest grid of `workgroup_size`-sized groups that covers
    /// `total_items` work items (`ceil(total_items / workgroup_size)` groups).
    ///
    /// Kernels launched this way must bounds-check `global_item_x()` since
    /// the last group may be partially out of range.
    pub fn covering(total_items: u32, workgroup_size: WorkDim) -> KernelResult<Self> {
        if workgroup_size == 0 {
            return Err(ConfigError::ZeroWorkgroupSize.into());
        }
        let groups = total_items.div_ceil(workgroup_size).max(1);
        Self::new(workgroup_size, groups)
    }

    /// Work items per workgroup.
    #[inline]
    pub fn workgroup_size(&self) -> WorkDim {
        self.workgroup_size
    }

    /// Number of workgroups in the grid.
    #[inline]
    pub fn workgroup_count(&self) -> u32 {
        self.workgroup_count
    }

    /// Total work items launched.
    #[inline]
    pub fn total_items(&self) -> u32 {
        self.workgroup_size * self.workgroup_count
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            workgroup_size: DEFAULT_WORKGROUP_SIZE,
            workgroup_count: 1,
        }
    }
}
