//! # Simulated Dispatch
//!
//! Runs kernel code written against [`ExecutionContext`](crate::ExecutionContext)
//! on host threads.
//!
//! ## Execution model
//!
//! For a [`DispatchConfig`] of `count` workgroups of `size` work items:
//!
//! 1. Workgroups are independent and run in parallel on a rayon pool.
//! 2. Inside a workgroup, every work item gets its own OS thread, and all of
//!    them are live at once. A collective barrier needs every participant
//!    scheduled, which a fixed-size task pool cannot guarantee.
//! 3. Each work item receives a [`SimContext`] carrying its injected
//!    `(work_item_x, work_group_x, work_dim_x)` and the group's
//!    [`GroupBarrier`].
//! 4. Optionally, each workgroup gets a fresh [`WorkgroupShared`].
//!
//! Work items do not start running kernel code until all threads of their
//! group exist, so a failed spawn never leaves a partial group blocked on the
//! barrier.
//!
//! ## Failure model
//!
//! * A panic in kernel code poisons the group's barrier, unwinds the other
//!   work items of that group, and is reported as
//!   [`ExecutionError::KernelPanicked`].
//! * A work item that returns without reaching a barrier its peers wait on
//!   leaves them blocked, exactly like divergent control flow on hardware.

use std::sync::{Condvar, Mutex, PoisonError};

use rayon::prelude::*;

use crate::kernel::config::DispatchConfig;
use crate::kernel::error::{ExecutionError, KernelResult};
use crate::kernel::types::{WorkDim, WorkGroupID};
use crate::sim::barrier::GroupBarrier;
use crate::sim::context::SimContext;
use crate::sim::shared::WorkgroupShared;

/// Summary of a completed simulated dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    /// Launch shape that ran.
    pub config: DispatchConfig,

    /// Number of work items that ran to completion.
    pub threads_run: u64,

    /// Barrier rounds completed, summed over all workgroups.
    pub barrier_generations: u64,

    /// Final contents of each workgroup's shared memory, indexed by
    /// `work_group_x`. Empty when the dispatch had no shared memory.
    pub shared_snapshots: Vec<Vec<u32>>,
}

/// Host-side dispatcher for kernels written against
/// [`ExecutionContext`](crate::ExecutionContext).
///
/// By default workgroups run on rayon's global pool; use
/// [`Simulator::with_parallel_groups`] to bound how many run at once.
#[derive(Debug, Default)]
pub struct Simulator {
    pool: Option<rayon::ThreadPool>,
}

struct GroupOutcome<T> {
    outputs: Vec<T>,
    generations: u64,
    shared: Vec<u32>,
}

impl Simulator {
    /// Creates a simulator using rayon's global pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a simulator that runs at most `groups` workgroups at a time.
    ///
    /// ## Errors
    /// Returns [`ExecutionError::PoolBuildFailed`] if the pool cannot be built.
    pub fn with_parallel_groups(groups: usize) -> KernelResult<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(groups.max(1))
            .thread_name(|i| format!("workgroup-pool-{i}"))
            .build()
            .map_err(|e| ExecutionError::PoolBuildFailed { message: e.to_string().into() })?;
        Ok(Self { pool: Some(pool) })
    }

    /// Runs `kernel` once per work item of `config`.
    pub fn dispatch<F>(&self, config: DispatchConfig, kernel: F) -> KernelResult<DispatchReport>
    where
        F: Fn(&SimContext<'_>) + Sync,
    {
        let (_, report) = self.execute(config, 0, |ctx, _| kernel(ctx))?;
        Ok(report)
    }

    /// Runs `kernel` once per work item, giving every workgroup its own
    /// `slots`-entry shared memory.
    pub fn dispatch_with_shared<F>(
        &self,
        config: DispatchConfig,
        slots: usize,
        kernel: F,
    ) -> KernelResult<DispatchReport>
    where
        F: Fn(&SimContext<'_>, &WorkgroupShared) + Sync,
    {
        let (_, report) = self.execute(config, slots, kernel)?;
        Ok(report)
    }

    /// Runs `kernel` once per work item and returns each work item's result,
    /// ordered by `global_item_x()`.
    pub fn dispatch_collect<T, F>(&self, config: DispatchConfig, kernel: F) -> KernelResult<Vec<T>>
    where
        T: Send,
        F: Fn(&SimContext<'_>) -> T + Sync,
    {
        let (outputs, _) = self.execute(config, 0, |ctx, _| kernel(ctx))?;
        Ok(outputs)
    }

    fn execute<T, F>(
        &self,
        config: DispatchConfig,
        slots: usize,
        kernel: F,
    ) -> KernelResult<(Vec<T>, DispatchReport)>
    where
        T: Send,
        F: Fn(&SimContext<'_>, &WorkgroupShared) -> T + Sync,
    {
        log::debug!(
            "simulated dispatch: {} workgroups x {} items, {} shared slots",
            config.workgroup_count(),
            config.workgroup_size(),
            slots
        );

        let dim = config.workgroup_size();
        let run = || {
            (0..config.workgroup_count())
                .into_par_iter()
                .map(|group| run_group(group, dim, slots, &kernel))
                .collect::<KernelResult<Vec<GroupOutcome<T>>>>()
        };

        let groups = match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        }?;

        let mut outputs = Vec::with_capacity(config.total_items() as usize);
        let mut barrier_generations = 0u64;
        let mut shared_snapshots = Vec::new();

        for outcome in groups {
            barrier_generations += outcome.generations;
            outputs.extend(outcome.outputs);
            if slots > 0 {
                shared_snapshots.push(outcome.shared);
            }
        }

        let report = DispatchReport {
            config,
            threads_run: outputs.len() as u64,
            barrier_generations,
            shared_snapshots,
        };

        log::debug!(
            "simulated dispatch finished: {} work items, {} barrier rounds",
            report.threads_run,
            report.barrier_generations
        );

        Ok((outputs, report))
    }
}

/// Holds work items back until the whole group has been spawned.
struct StartGate {
    open: Mutex<Option<bool>>,
    changed: Condvar,
}

impl StartGate {
    fn new() -> Self {
        Self { open: Mutex::new(None), changed: Condvar::new() }
    }

    fn set(&self, run: bool) {
        *self.open.lock().unwrap_or_else(PoisonError::into_inner) = Some(run);
        self.changed.notify_all();
    }

    /// Blocks until the gate is set; `true` means "run the kernel".
    fn pass(&self) -> bool {
        let mut open = self.open.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            if let Some(run) = *open {
                return run;
            }
            open = self.changed.wait(open).unwrap_or_else(PoisonError::into_inner);
        }
    }
}

/// Poisons the barrier if the work item unwinds, so peers do not hang.
struct PoisonOnUnwind<'a>(&'a GroupBarrier);

impl Drop for PoisonOnUnwind<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.0.poison();
        }
    }
}

fn run_group<T, F>(
    group: WorkGroupID,
    dim: WorkDim,
    slots: usize,
    kernel: &F,
) -> KernelResult<GroupOutcome<T>>
where
    T: Send,
    F: Fn(&SimContext<'_>, &WorkgroupShared) -> T + Sync,
{
    let barrier = GroupBarrier::new(dim);
    let shared = WorkgroupShared::new(slots);
    let gate = StartGate::new();

    let outputs = std::thread::scope(|scope| {
        let mut handles = Vec::with_capacity(dim as usize);

        for item in 0..dim {
            let (barrier, shared, gate) = (&barrier, &shared, &gate);
            let spawned = std::thread::Builder::new()
                .name(format!("wg{group}-item{item}"))
                .spawn_scoped(scope, move || {
                    if !gate.pass() {
                        return None;
                    }
                    let _guard = PoisonOnUnwind(barrier);
                    let ctx = SimContext::new(item, group, dim, barrier);
                    Some(kernel(&ctx, shared))
                });

            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    gate.set(false);
                    return Err(ExecutionError::ThreadSpawnFailed {
                        group,
                        message: e.to_string().into(),
                    });
                }
            }
        }

        gate.set(true);

        let mut outputs = Vec::with_capacity(handles.len());
        let mut panicked = false;
        for handle in handles {
            match handle.join() {
                Ok(Some(output)) => outputs.push(output),
                Ok(None) | Err(_) => panicked = true,
            }
        }

        if panicked {
            log::warn!("kernel panicked in simulated workgroup {group}");
            return Err(ExecutionError::KernelPanicked { group });
        }
        Ok(outputs)
    })?;

    Ok(GroupOutcome {
        outputs,
        generations: barrier.generation(),
        shared: if slots > 0 { shared.snapshot() } else { Vec::new() },
    })
}

/// Convenience: runs `kernel` on a one-off [`Simulator`] using the global pool.
pub fn simulate<F>(config: DispatchConfig, kernel: F) -> KernelResult<DispatchReport>
where
    F: Fn(&SimContext<'_>) + Sync,
{
    Simulator::new().dispatch(config, kernel)
}
