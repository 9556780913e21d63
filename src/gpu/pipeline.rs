//! # Probe Pipeline Cache
//!
//! Compiles the WGSL probe kernels and caches one compute pipeline per
//! `(ProbeKind, workgroup_size)`.
//!
//! ## Why the size is part of the key
//!
//! WGSL fixes `@workgroup_size` in the shader, so `work_dim_x` is a
//! compile-time constant of the pipeline. Each probe source is generated with
//! the requested size baked in as `WG_SIZE`.
//!
//! ## Binding model
//!
//! Every probe uses the same layout:
//!
//! * Binding `0`: `read_write` storage buffer receiving per-work-item output
//! * Binding `1`: uniform buffer with `{ total_items }`
//!
//! ## Execution-context mapping
//!
//! | Operation | WGSL |
//! |---|---|
//! | `work_item_x` | `local_invocation_id.x` |
//! | `work_group_x` | `workgroup_id.x` |
//! | `work_dim_x` | `WG_SIZE` (the pipeline's `@workgroup_size`) |
//! | `sync_threads` | `workgroupBarrier()` |

#![cfg(feature = "gpu")]

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::gpu::context::GPUContext;
use crate::kernel::error::{ExecutionError, KernelResult};
use crate::kernel::types::WorkDim;

/// Which probe kernel to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeKind {
    /// Every work item writes `(work_item_x, work_group_x, work_dim_x)`.
    Identity,

    /// Every work item writes its `work_item_x` to workgroup memory, crosses
    /// the barrier, and reports the value in its right-hand neighbour's slot.
    NeighborExchange,
}

impl ProbeKind {
    /// Bytes written per work item.
    pub const fn record_size(self) -> u64 {
        match self {
            ProbeKind::Identity => 12,
            ProbeKind::NeighborExchange => 4,
        }
    }

    /// Stable label used for wgpu object names and logs.
    pub const fn label(self) -> &'static str {
        match self {
            ProbeKind::Identity => "identity_probe",
            ProbeKind::NeighborExchange => "neighbor_exchange_probe",
        }
    }

    /// WGSL source with `workgroup_size` baked in.
    pub fn shader(self, workgroup_size: WorkDim) -> String {
        let body = match self {
            ProbeKind::Identity => IDENTITY_PROBE_WGSL,
            ProbeKind::NeighborExchange => NEIGHBOR_EXCHANGE_PROBE_WGSL,
        };
        format!("const WG_SIZE: u32 = {workgroup_size}u;\n{PROBE_PRELUDE_WGSL}{body}")
    }
}

const PROBE_PRELUDE_WGSL: &str = r#"
struct Params { total_items: u32, _p0: u32, _p1: u32, _p2: u32 };
@group(0) @binding(1) var<uniform> params : Params;
"#;

const IDENTITY_PROBE_WGSL: &str = r#"
struct Record { item: u32, group: u32, dim: u32 };
@group(0) @binding(0) var<storage, read_write> records : array<Record>;

@compute @workgroup_size(WG_SIZE)
fn main(
    @builtin(local_invocation_id) lid : vec3<u32>,
    @builtin(workgroup_id) wid : vec3<u32>,
) {
    let global = wid.x * WG_SIZE + lid.x;
    if (global >= params.total_items) { return; }
    records[global] = Record(lid.x, wid.x, WG_SIZE);
}
"#;

// No early return before the barrier: it must be reached in uniform control flow.
const NEIGHBOR_EXCHANGE_PROBE_WGSL: &str = r#"
@group(0) @binding(0) var<storage, read_write> observed : array<u32>;
var<workgroup> tile : array<u32, WG_SIZE>;

@compute @workgroup_size(WG_SIZE)
fn main(
    @builtin(local_invocation_id) lid : vec3<u32>,
    @builtin(workgroup_id) wid : vec3<u32>,
) {
    let i = lid.x;
    tile[i] = i;
    workgroupBarrier();
    let neighbor = tile[(i + 1u) % WG_SIZE];
    let global = wid.x * WG_SIZE + i;
    if (global < params.total_items) {
        observed[global] = neighbor;
    }
}
"#;

/// Cache of probe pipelines and their bind group layouts.
///
/// Not internally synchronized; owned by the GPU runtime behind its mutex.
#[derive(Debug, Default)]
pub struct PipelineCache {
    map: HashMap<(ProbeKind, WorkDim), (wgpu::ComputePipeline, wgpu::BindGroupLayout)>,
}

impl PipelineCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of compiled pipelines.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// `true` if nothing has been compiled yet.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns the pipeline for `(kind, workgroup_size)`, compiling it on
    /// first use.
    ///
    /// ## Errors
    /// [`ExecutionError::GpuDispatchFailed`] if WGSL validation or pipeline
    /// creation fails.
    pub fn get_or_create(
        &mut self,
        context: &GPUContext,
        kind: ProbeKind,
        workgroup_size: WorkDim,
    ) -> KernelResult<(&wgpu::ComputePipeline, &wgpu::BindGroupLayout)> {
        let entry = match self.map.entry((kind, workgroup_size)) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(v) => {
                log::debug!("compiling {} pipeline for workgroup size {}", kind.label(), workgroup_size);
                v.insert(create_pipeline(context, kind, workgroup_size)?)
            }
        };
        Ok((&entry.0, &entry.1))
    }
}

fn storage_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only: false },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn uniform_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn create_pipeline(
    context: &GPUContext,
    kind: ProbeKind,
    workgroup_size: WorkDim,
) -> KernelResult<(wgpu::ComputePipeline, wgpu::BindGroupLayout)> {
    let device = &context.device;
    let source = kind.shader(workgroup_size);

    device.push_error_scope(wgpu::ErrorFilter::Validation);

    let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("workgroup_probe_bgl"),
        entries: &[storage_entry(0), uniform_entry(1)],
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("workgroup_probe_pipeline_layout"),
        bind_group_layouts: &[&layout],
        push_constant_ranges: &[],
    });

    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(kind.label()),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });

    let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
        label: Some(kind.label()),
        layout: Some(&pipeline_layout),
        module: &module,
        entry_point: Some("main"),
        compilation_options: wgpu::PipelineCompilationOptions::default(),
        cache: None,
    });

    if let Some(err) = pollster::block_on(device.pop_error_scope()) {
        return Err(ExecutionError::GpuDispatchFailed {
            message: format!("{} pipeline creation failed: {err}", kind.label()).into(),
        }
        .into());
    }

    Ok((pipeline, layout))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shader_bakes_in_the_workgroup_size() {
        let src = ProbeKind::NeighborExchange.shader(64);
        assert!(src.starts_with("const WG_SIZE: u32 = 64u;"));
        assert!(src.contains("workgroupBarrier()"));
        assert!(src.contains("array<u32, WG_SIZE>"));
    }

    #[test]
    fn identity_probe_reads_all_three_ids() {
        let src = ProbeKind::Identity.shader(32);
        assert!(src.contains("local_invocation_id"));
        assert!(src.contains("workgroup_id"));
        assert!(src.contains("Record(lid.x, wid.x, WG_SIZE)"));
    }

    #[test]
    fn record_sizes_match_host_layout() {
        assert_eq!(
            ProbeKind::Identity.record_size(),
            std::mem::size_of::<crate::gpu::ProbeRecord>() as u64
        );
        assert_eq!(ProbeKind::NeighborExchange.record_size(), 4);
    }
}
