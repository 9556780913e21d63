//! # Backends
//!
//! One [`ExecutionContext`] implementation per target, selected at compile
//! time:
//!
//! | Target arch | Context type | Source of the values |
//! |---|---|---|
//! | `amdgpu` | [`Device`] | `llvm.amdgcn.*` builtins, HSA dispatch packet |
//! | `nvptx64` | [`Device`] | PTX special registers, `bar.sync` |
//! | host | `sim::SimContext` | injected by the host simulator |
//! | host + `gpu` | WGSL builtins | probed through `wgpu` |
//!
//! On device targets the zero-argument functions [`work_item_x`],
//! [`work_group_x`], [`work_dim_x`] and [`sync_threads`] forward to
//! [`Device`], each being a single builtin invocation.
//!
//! [`Backend`] is the capability table describing which of these a build
//! carries.

#[cfg(target_arch = "amdgpu")]
mod amdgpu;
#[cfg(target_arch = "amdgpu")]
pub use amdgpu::Device;

#[cfg(target_arch = "nvptx64")]
mod nvptx;
#[cfg(target_arch = "nvptx64")]
pub use nvptx::Device;

#[cfg(any(target_arch = "amdgpu", target_arch = "nvptx64"))]
use crate::kernel::context::ExecutionContext;
#[cfg(any(target_arch = "amdgpu", target_arch = "nvptx64"))]
use crate::kernel::types::{WorkDim, WorkGroupID, WorkItemID};

/// Backend that can evaluate the execution-context operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// AMD GCN/RDNA through LLVM `amdgcn` intrinsics.
    Amdgpu,

    /// NVIDIA PTX through special registers.
    Nvptx,

    /// Host threads driven by the simulator.
    HostSimulation,

    /// Any adapter reachable through `wgpu`, exercised with WGSL probes.
    Wgpu,
}

impl Backend {
    /// The backend whose builtins this build compiles against.
    pub const fn native() -> Self {
        #[cfg(target_arch = "amdgpu")]
        {
            Backend::Amdgpu
        }
        #[cfg(target_arch = "nvptx64")]
        {
            Backend::Nvptx
        }
        #[cfg(not(any(target_arch = "amdgpu", target_arch = "nvptx64")))]
        {
            Backend::HostSimulation
        }
    }

    /// Backends compiled into this build, native first.
    pub fn available() -> &'static [Backend] {
        #[cfg(target_arch = "amdgpu")]
        {
            &[Backend::Amdgpu]
        }
        #[cfg(target_arch = "nvptx64")]
        {
            &[Backend::Nvptx]
        }
        #[cfg(all(not(any(target_arch = "amdgpu", target_arch = "nvptx64")), feature = "gpu"))]
        {
            &[Backend::HostSimulation, Backend::Wgpu]
        }
        #[cfg(all(not(any(target_arch = "amdgpu", target_arch = "nvptx64")), not(feature = "gpu")))]
        {
            &[Backend::HostSimulation]
        }
    }

    /// Short lowercase name, suitable for logs.
    pub const fn name(self) -> &'static str {
        match self {
            Backend::Amdgpu => "amdgpu",
            Backend::Nvptx => "nvptx",
            Backend::HostSimulation => "host-sim",
            Backend::Wgpu => "wgpu",
        }
    }

    /// `true` when the operations map directly to hardware builtins in the
    /// calling code, rather than being injected or probed.
    pub const fn has_native_intrinsics(self) -> bool {
        matches!(self, Backend::Amdgpu | Backend::Nvptx)
    }
}

/// Zero-based index of the calling thread within its workgroup along X.
#[cfg(any(target_arch = "amdgpu", target_arch = "nvptx64"))]
#[inline(always)]
pub fn work_item_x() -> WorkItemID {
    Device.work_item_x()
}

/// Zero-based index of the calling thread's workgroup along X.
#[cfg(any(target_arch = "amdgpu", target_arch = "nvptx64"))]
#[inline(always)]
pub fn work_group_x() -> WorkGroupID {
    Device.work_group_x()
}

/// Workgroup size along X for the current dispatch.
#[cfg(any(target_arch = "amdgpu", target_arch = "nvptx64"))]
#[inline(always)]
pub fn work_dim_x() -> WorkDim {
    Device.work_dim_x()
}

/// Workgroup execution barrier.
#[cfg(any(target_arch = "amdgpu", target_arch = "nvptx64"))]
#[inline(always)]
pub fn sync_threads() {
    Device.sync_threads()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_builds_simulate() {
        assert_eq!(Backend::native(), Backend::HostSimulation);
        assert!(!Backend::native().has_native_intrinsics());
        assert_eq!(Backend::available()[0], Backend::native());
    }

    #[test]
    fn wgpu_listed_only_with_the_gpu_feature() {
        let listed = Backend::available().contains(&Backend::Wgpu);
        assert_eq!(listed, cfg!(feature = "gpu"));
    }

    #[test]
    fn names_are_distinct() {
        let names = [
            Backend::Amdgpu.name(),
            Backend::Nvptx.name(),
            Backend::HostSimulation.name(),
            Backend::Wgpu.name(),
        ];
        for (i, a) in names.iter().enumerate() {
            for b in &names[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert!(Backend::Nvptx.has_native_intrinsics());
    }
}
