use criterion::*;
use std::hint::black_box;

use workgroup_intrinsics::gpu;
use workgroup_intrinsics::DispatchConfig;

fn gpu_probe_benchmark(c: &mut Criterion) {
    if !gpu::is_available() {
        eprintln!("no gpu adapter available; skipping gpu_probe bench");
        return;
    }

    let config = DispatchConfig::new(256, 1024).unwrap();

    // Warm the pipeline cache so only dispatch and readback are measured.
    gpu::run_identity_probe(config).unwrap();
    gpu::run_neighbor_exchange_probe(config).unwrap();

    let mut group = c.benchmark_group("gpu_probe");

    group.bench_function("identity_256x1024", |b| {
        b.iter(|| black_box(gpu::run_identity_probe(config).unwrap()));
    });

    group.bench_function("neighbor_exchange_256x1024", |b| {
        b.iter(|| black_box(gpu::run_neighbor_exchange_probe(config).unwrap()));
    });

    group.finish();
}

criterion_group!(benches, gpu_probe_benchmark);
criterion_main!(benches);
