//! GPU device and queue initialization.

#![cfg(feature = "gpu")]

use crate::kernel::error::{ExecutionError, KernelResult};
use crate::kernel::types::WorkDim;

/// A `wgpu` adapter's device and queue, plus the compute limits probes are
/// checked against.
#[derive(Debug)]
pub struct GPUContext {
    /// Logical device.
    pub device: wgpu::Device,

    /// Submission queue of `device`.
    pub queue: wgpu::Queue,

    /// Adapter description, for diagnostics.
    pub adapter_info: wgpu::AdapterInfo,

    /// Largest workgroup size along X the device accepts.
    pub max_workgroup_size_x: WorkDim,

    /// Largest number of workgroups along X in one dispatch.
    pub max_workgroups_x: u32,
}

impl GPUContext {
    /// Requests a high-performance adapter and creates a device with the
    /// adapter's own limits.
    ///
    /// ## Errors
    /// [`ExecutionError::GpuInitFailed`] if no adapter is found or the device
    /// request is refused.
    pub fn new() -> KernelResult<Self> {
        pollster::block_on(Self::new_async())
    }

    async fn new_async() -> KernelResult<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                force_fallback_adapter: false,
                compatible_surface: None,
            })
            .await
            .map_err(|e| ExecutionError::GpuInitFailed {
                message: format!("no compatible adapter: {e}").into(),
            })?;

        let adapter_info = adapter.get_info();
        let limits = adapter.limits();

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("workgroup_probe_device"),
                required_features: wgpu::Features::empty(),
                required_limits: limits.clone(),
                ..Default::default()
            })
            .await
            .map_err(|e| ExecutionError::GpuInitFailed {
                message: format!("device request failed: {e}").into(),
            })?;

        let max_workgroup_size_x = limits
            .max_compute_workgroup_size_x
            .min(limits.max_compute_invocations_per_workgroup);

        log::info!(
            "gpu probe device: {} ({:?}), max workgroup size x = {}",
            adapter_info.name,
            adapter_info.backend,
            max_workgroup_size_x
        );

        Ok(Self {
            device,
            queue,
            adapter_info,
            max_workgroup_size_x,
            max_workgroups_x: limits.max_compute_workgroups_per_dimension,
        })
    }
}
