// Run:
//   cargo test --test barrier_visibility -- --nocapture

mod common;

use common::assert_neighbor_exchange;

use workgroup_intrinsics::prelude::*;

fn neighbor_exchange(config: DispatchConfig) -> Vec<u32> {
    let size = config.workgroup_size() as usize;
    let observed = std::sync::Mutex::new(vec![0u32; config.total_items() as usize]);

    Simulator::new()
        .dispatch_with_shared(config, size, |ctx, shared| {
            let i = ctx.work_item_x() as usize;
            shared.store(i, ctx.work_item_x());
            ctx.sync_threads();
            let neighbor = shared.load((i + 1) % ctx.work_dim_x() as usize);
            observed.lock().unwrap()[ctx.global_item_x() as usize] = neighbor;
        })
        .unwrap();

    observed.into_inner().unwrap()
}

#[test]
fn every_thread_sees_its_right_neighbor_after_the_barrier() {
    let config = DispatchConfig::single_group(64).unwrap();
    assert_neighbor_exchange(&neighbor_exchange(config), config);
}

#[test]
fn exchange_is_isolated_per_workgroup() {
    let config = DispatchConfig::new(32, 6).unwrap();
    assert_neighbor_exchange(&neighbor_exchange(config), config);
}

#[test]
fn single_item_group_sees_itself() {
    let config = DispatchConfig::new(1, 3).unwrap();
    assert_eq!(neighbor_exchange(config), vec![0, 0, 0]);
}

#[test]
fn tree_reduction_over_shared_memory() {
    const SIZE: u32 = 128;
    let config = DispatchConfig::new(SIZE, 4).unwrap();

    let report = Simulator::new()
        .dispatch_with_shared(config, SIZE as usize, |ctx, shared| {
            let i = ctx.work_item_x();
            shared.store(i as usize, ctx.global_item_x());
            ctx.sync_threads();

            let mut stride = ctx.work_dim_x() / 2;
            while stride > 0 {
                if i < stride {
                    let sum = shared.load(i as usize) + shared.load((i + stride) as usize);
                    shared.store(i as usize, sum);
                }
                ctx.sync_threads();
                stride /= 2;
            }
        })
        .unwrap();

    // log2(128) = 7 reduction rounds plus the initial barrier, per group.
    assert_eq!(report.barrier_generations, 8 * 4);

    for (group, slots) in report.shared_snapshots.iter().enumerate() {
        let base = group as u32 * SIZE;
        let expected: u32 = (base..base + SIZE).sum();
        assert_eq!(slots[0], expected, "group {group}");
    }
}

#[test]
fn repeated_phases_keep_workgroups_in_lockstep() {
    const ROUNDS: u32 = 10;
    let config = DispatchConfig::new(16, 2).unwrap();

    let report = Simulator::new()
        .dispatch_with_shared(config, 1, |ctx, shared| {
            for round in 0..ROUNDS {
                shared.fetch_add(0, 1);
                ctx.sync_threads();
                assert_eq!(shared.load(0), (round + 1) * ctx.work_dim_x());
                ctx.sync_threads();
            }
        })
        .unwrap();

    assert_eq!(report.barrier_generations, u64::from(ROUNDS) * 2 * 2);
    assert_eq!(report.shared_snapshots, vec![vec![160], vec![160]]);
}

#[test]
fn leader_sums_float_slots_after_the_barrier() {
    let config = DispatchConfig::new(8, 2).unwrap();

    let report = Simulator::new()
        .dispatch_with_shared(config, 8, |ctx, shared| {
            let i = ctx.work_item_x() as usize;
            shared.store_f32(i, ctx.work_item_x() as f32 * 0.5);
            ctx.sync_threads();

            if ctx.is_group_leader() {
                let total: f32 = (0..ctx.work_dim_x() as usize).map(|s| shared.load_f32(s)).sum();
                shared.store_f32(0, total);
            }
        })
        .unwrap();

    for slots in &report.shared_snapshots {
        assert_eq!(f32::from_bits(slots[0]), 14.0);
    }
}
