//! Shared assertions for the execution-context properties.
//!
//! Both the simulator tests and the GPU probe tests reduce what every work
//! item observed to `(item, group, dim)` triples, ordered by global index,
//! and check them here.

#![allow(dead_code)]

use std::collections::BTreeSet;

use workgroup_intrinsics::DispatchConfig;

/// What one work item reported about itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observed {
    pub item: u32,
    pub group: u32,
    pub dim: u32,
}

/// Checks the identity invariants for a whole dispatch.
///
/// * `0 <= item < dim` for every work item
/// * `dim` equals the configured workgroup size everywhere
/// * within a group, `group` is identical; across groups it covers
///   `[0, workgroup_count)` without gaps
/// * within a group, items are exactly `{0, .., dim - 1}`
pub fn assert_identity_invariants(observed: &[Observed], config: DispatchConfig) {
    let size = config.workgroup_size();
    assert_eq!(observed.len() as u32, config.total_items());

    for o in observed {
        assert!(o.item < o.dim, "item {} outside workgroup of {}", o.item, o.dim);
        assert_eq!(o.dim, size);
    }

    let mut groups = BTreeSet::new();
    for chunk in observed.chunks(size as usize) {
        let group = chunk[0].group;
        assert!(chunk.iter().all(|o| o.group == group), "mixed group ids in one workgroup");
        assert!(groups.insert(group), "workgroup id {group} reported twice");

        let items: BTreeSet<u32> = chunk.iter().map(|o| o.item).collect();
        assert_eq!(items.len(), size as usize, "duplicate work-item ids in group {group}");
        assert_eq!(items, (0..size).collect::<BTreeSet<u32>>());
    }

    assert_eq!(groups, (0..config.workgroup_count()).collect::<BTreeSet<u32>>());
}

/// Checks the neighbour-exchange result: work item `i` saw `(i + 1) % dim`.
pub fn assert_neighbor_exchange(observed: &[u32], config: DispatchConfig) {
    let size = config.workgroup_size();
    assert_eq!(observed.len() as u32, config.total_items());

    for (global, &value) in observed.iter().enumerate() {
        let item = global as u32 % size;
        assert_eq!(
            value,
            (item + 1) % size,
            "work item {global} observed a stale or foreign value"
        );
    }
}
