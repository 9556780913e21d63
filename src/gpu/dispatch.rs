//! # GPU Probe Runtime
//!
//! Runs the WGSL probe kernels on a real device and reads their output back,
//! so the execution-context contract can be checked against hardware.
//!
//! ## Execution flow
//!
//! For each probe:
//!
//! 1. Lock the global runtime (device, queue, pipeline cache).
//! 2. Check the dispatch shape against the device limits.
//! 3. Fetch or compile the pipeline for `(probe, workgroup_size)`.
//! 4. Bind an output storage buffer and a `{ total_items }` uniform.
//! 5. Dispatch `workgroup_count` workgroups and copy the output to a
//!    mappable staging buffer.
//! 6. Wait for the submission via `device.poll` and map the staging buffer.
//!
//! ## Concurrency
//!
//! The runtime is created lazily on first use and shared behind a `Mutex`;
//! probes from several threads are serialized. An initialization failure is
//! cached and returned on every later call.

#![cfg(feature = "gpu")]

use std::sync::{mpsc, Mutex, MutexGuard, OnceLock};

use wgpu::util::DeviceExt;

use crate::gpu::context::GPUContext;
use crate::gpu::pipeline::{PipelineCache, ProbeKind};
use crate::kernel::config::DispatchConfig;
use crate::kernel::error::{ExecutionError, KernelResult};

/// Identity values observed by one work item on the device.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ProbeRecord {
    /// `work_item_x`
    pub item: u32,

    /// `work_group_x`
    pub group: u32,

    /// `work_dim_x`
    pub dim: u32,
}

struct Runtime {
    context: GPUContext,
    pipelines: PipelineCache,
}

static RUNTIME: OnceLock<KernelResult<Mutex<Runtime>>> = OnceLock::new();

fn runtime() -> KernelResult<MutexGuard<'static, Runtime>> {
    let cell = RUNTIME.get_or_init(|| {
        let context = GPUContext::new().inspect_err(|e| log::warn!("gpu probe runtime unavailable: {e}"))?;
        Ok(Mutex::new(Runtime { context, pipelines: PipelineCache::new() }))
    });

    let mutex = match cell {
        Ok(mutex) => mutex,
        Err(e) => return Err(e.clone()),
    };

    mutex
        .lock()
        .map_err(|_| ExecutionError::LockPoisoned { what: "gpu probe runtime" }.into())
}

/// `true` if a GPU device could be initialized.
pub fn is_available() -> bool {
    runtime().is_ok()
}

/// Human-readable name of the adapter the probes run on.
pub fn adapter_name() -> KernelResult<String> {
    Ok(runtime()?.context.adapter_info.name.clone())
}

/// Runs the identity probe: one [`ProbeRecord`] per work item, ordered by
/// global index `work_group_x * work_dim_x + work_item_x`.
pub fn run_identity_probe(config: DispatchConfig) -> KernelResult<Vec<ProbeRecord>> {
    let bytes = run_probe(ProbeKind::Identity, config)?;
    Ok(bytemuck::pod_collect_to_vec(&bytes))
}

/// Runs the barrier-visibility probe: each work item writes its
/// `work_item_x` to workgroup memory, calls the barrier, and reports the
/// value at slot `(i + 1) % work_dim_x`. Ordered by global index.
pub fn run_neighbor_exchange_probe(config: DispatchConfig) -> KernelResult<Vec<u32>> {
    let bytes = run_probe(ProbeKind::NeighborExchange, config)?;
    Ok(bytemuck::pod_collect_to_vec(&bytes))
}

fn run_probe(kind: ProbeKind, config: DispatchConfig) -> KernelResult<Vec<u8>> {
    let mut guard = runtime()?;
    let Runtime { context, pipelines } = &mut *guard;

    check_limits(context, config)?;

    let (pipeline, layout) = pipelines.get_or_create(context, kind, config.workgroup_size())?;

    let device = &context.device;
    let output_size = u64::from(config.total_items()) * kind.record_size();

    let output = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("workgroup_probe_output"),
        size: output_size,
        usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
        mapped_at_creation: false,
    });

    let staging = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("workgroup_probe_staging"),
        size: output_size,
        usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    // Matches WGSL `Params { total_items, _p0, _p1, _p2 }` (uniforms are 16-byte aligned).
    let params: [u32; 4] = [config.total_items(), 0, 0, 0];
    let params_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("workgroup_probe_params"),
        contents: bytemuck::cast_slice(&params),
        usage: wgpu::BufferUsages::UNIFORM,
    });

    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("workgroup_probe_bind_group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry { binding: 0, resource: output.as_entire_binding() },
            wgpu::BindGroupEntry { binding: 1, resource: params_buffer.as_entire_binding() },
        ],
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("workgroup_probe_encoder"),
    });

    {
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some(kind.label()),
            timestamp_writes: None,
        });
        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, &bind_group, &[]);
        pass.dispatch_workgroups(config.workgroup_count(), 1, 1);
    }

    encoder.copy_buffer_to_buffer(&output, 0, &staging, 0, output_size);

    log::debug!(
        "gpu {}: {} workgroups x {} items",
        kind.label(),
        config.workgroup_count(),
        config.workgroup_size()
    );

    let submission = context.queue.submit(Some(encoder.finish()));

    let slice = staging.slice(..);
    let (tx, rx) = mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = tx.send(result);
    });

    device
        .poll(wgpu::PollType::Wait {
            submission_index: Some(submission),
            timeout: None,
        })
        .map_err(|e| ExecutionError::GpuDispatchFailed {
            message: format!("wgpu device poll failed: {e:?}").into(),
        })?;

    rx.recv()
        .map_err(|_| ExecutionError::GpuReadbackFailed {
            message: "map callback dropped".into(),
        })?
        .map_err(|e| ExecutionError::GpuReadbackFailed {
            message: format!("{e}").into(),
        })?;

    let bytes = slice.get_mapped_range().to_vec();
    staging.unmap();

    Ok(bytes)
}

fn check_limits(context: &GPUContext, config: DispatchConfig) -> KernelResult<()> {
    if config.workgroup_size() > context.max_workgroup_size_x {
        return Err(ExecutionError::GpuDispatchFailed {
            message: format!(
                "workgroup size {} exceeds device limit {}",
                config.workgroup_size(),
                context.max_workgroup_size_x
            )
            .into(),
        }
        .into());
    }
    if config.workgroup_count() > context.max_workgroups_x {
        return Err(ExecutionError::GpuDispatchFailed {
            message: format!(
                "{} workgroups exceed device limit {}",
                config.workgroup_count(),
                context.max_workgroups_x
            )
            .into(),
        }
        .into());
    }
    Ok(())
}
