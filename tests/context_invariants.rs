// Run:
//   cargo test --test context_invariants -- --nocapture

mod common;

use std::sync::Mutex;

use common::{assert_identity_invariants, Observed};

use workgroup_intrinsics::prelude::*;
use workgroup_intrinsics::sim::GroupBarrier;
use workgroup_intrinsics::{ConfigError, KernelError, MAX_WORKGROUP_SIZE};

fn observe(config: DispatchConfig) -> Vec<Observed> {
    Simulator::new()
        .dispatch_collect(config, |ctx| Observed {
            item: ctx.work_item_x(),
            group: ctx.work_group_x(),
            dim: ctx.work_dim_x(),
        })
        .unwrap()
}

#[test]
fn single_group_of_64_sees_each_item_once() {
    let config = DispatchConfig::single_group(64).unwrap();
    let observed = observe(config);

    let mut items: Vec<u32> = observed.iter().map(|o| o.item).collect();
    items.sort_unstable();
    assert_eq!(items, (0..64).collect::<Vec<u32>>());

    assert_identity_invariants(&observed, config);
}

#[test]
fn identity_invariants_hold_across_many_groups() {
    for (size, count) in [(1, 1), (1, 17), (7, 5), (32, 8), (128, 3)] {
        let config = DispatchConfig::new(size, count).unwrap();
        assert_identity_invariants(&observe(config), config);
    }
}

#[test]
fn queries_are_idempotent_within_a_thread() {
    let config = DispatchConfig::new(16, 4).unwrap();
    let stable = Simulator::new()
        .dispatch_collect(config, |ctx| {
            let first = (ctx.work_item_x(), ctx.work_group_x(), ctx.work_dim_x());
            ctx.sync_threads();
            let second = (ctx.work_item_x(), ctx.work_group_x(), ctx.work_dim_x());
            let third = (ctx.work_item_x(), ctx.work_group_x(), ctx.work_dim_x());
            first == second && second == third
        })
        .unwrap();
    assert!(stable.into_iter().all(|same| same));
}

#[test]
fn global_item_matches_collection_order() {
    let config = DispatchConfig::new(10, 6).unwrap();
    let globals = Simulator::new()
        .dispatch_collect(config, |ctx| ctx.global_item_x())
        .unwrap();
    assert_eq!(globals, (0..60).collect::<Vec<u32>>());
}

#[test]
fn one_leader_per_group() {
    let config = DispatchConfig::new(8, 5).unwrap();
    let leaders = Mutex::new(Vec::new());

    Simulator::new()
        .dispatch(config, |ctx| {
            if ctx.is_group_leader() {
                leaders.lock().unwrap().push(ctx.work_group_x());
            }
        })
        .unwrap();

    let mut leaders = leaders.into_inner().unwrap();
    leaders.sort_unstable();
    assert_eq!(leaders, vec![0, 1, 2, 3, 4]);
}

// Kernel code is generic over the context, so a hand-built context can
// stand in for a specific work item.
fn bounds_checked_double<C: ExecutionContext>(ctx: &C, data: &mut [u32]) {
    let i = ctx.global_item_x() as usize;
    if i < data.len() {
        data[i] *= 2;
    }
}

#[test]
fn injected_context_drives_generic_kernel_code() {
    let barrier = GroupBarrier::new(1);
    let mut data = vec![1u32; 10];

    bounds_checked_double(&SimContext::new(1, 2, 4, &barrier), &mut data);
    assert_eq!(data[9], 2);
    assert_eq!(data.iter().sum::<u32>(), 11);

    // Past the end of the buffer: the last group of a covering grid.
    bounds_checked_double(&SimContext::new(3, 2, 4, &barrier), &mut data);
    assert_eq!(data.iter().sum::<u32>(), 11);
}

#[test]
fn covering_grid_runs_every_element() {
    let data: Vec<Mutex<u32>> = (0..1000).map(Mutex::new).collect();
    let config = DispatchConfig::covering(1000, 64).unwrap();
    assert_eq!(config.workgroup_count(), 16);

    Simulator::new()
        .dispatch(config, |ctx| {
            let i = ctx.global_item_x() as usize;
            if i < data.len() {
                *data[i].lock().unwrap() += 1;
            }
        })
        .unwrap();

    for (i, cell) in data.into_iter().enumerate() {
        assert_eq!(cell.into_inner().unwrap(), i as u32 + 1);
    }
}

#[test]
fn invalid_configs_are_rejected_before_running() {
    assert_eq!(
        DispatchConfig::new(0, 4).unwrap_err(),
        KernelError::Config(ConfigError::ZeroWorkgroupSize)
    );
    assert_eq!(
        DispatchConfig::new(4, 0).unwrap_err(),
        KernelError::Config(ConfigError::ZeroWorkgroupCount)
    );
    assert!(matches!(
        DispatchConfig::single_group(MAX_WORKGROUP_SIZE + 1),
        Err(KernelError::Config(ConfigError::WorkgroupTooLarge { .. }))
    ));
}
