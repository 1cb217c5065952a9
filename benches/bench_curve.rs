use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use std::time::Duration;

use curve_engine_core::curve::types::{Wad, WAD};
use curve_engine_core::curve::{power, ratio};

#[inline]
fn w(n: u128) -> Wad {
    n * WAD
}

fn bench_curve(c: &mut Criterion) {
    let mut g = c.benchmark_group("curve");
    g.warm_up_time(Duration::from_secs(2));
    g.measurement_time(Duration::from_secs(5));
    g.sample_size(300);
    g.throughput(Throughput::Elements(1));

    // casos com rótulo único: (supply, balance, peso ppm, aporte)
    let cases: [(&str, Wad, Wad, u32, Wad); 6] = [
        ("half_small", w(1_000_000), w(1_000_000), 500_000, w(1_000)),
        ("half_large", w(5_000_000_000), w(5_000_000_000), 500_000, w(1_000_000)),
        ("quarter_asym", w(1_000_000_000), w(1_000_000), 250_000, w(1_000)),
        ("steep_weight", w(1_000_000), w(1_000_000_000), 900_000, w(1_000)),
        ("extreme_weight", w(1_000_000), w(1_000_000), 10_000, w(1_000)),
        ("linear", w(1_000_000), w(1_000_000), 1_000_000, w(1_000)),
    ];

    for (label, s, b, weight, a) in cases {
        g.bench_function(format!("purchase_power_{}", label), |bench| {
            bench.iter(|| {
                let out = power::purchase_return(
                    black_box(s),
                    black_box(b),
                    black_box(weight),
                    black_box(a),
                )
                .unwrap();
                black_box(out);
            });
        });
    }

    g.bench_function("sale_power_half_small", |bench| {
        bench.iter(|| {
            let out = power::sale_return(
                black_box(w(1_000_000)),
                black_box(w(1_000_000)),
                black_box(500_000u32),
                black_box(w(1_000)),
            )
            .unwrap();
            black_box(out);
        });
    });

    g.bench_function("purchase_ratio_half_small", |bench| {
        bench.iter(|| {
            let out = ratio::purchase_return(
                black_box(w(1_000_000)),
                black_box(w(1_000_000)),
                black_box(500_000u32),
                black_box(w(1_000)),
            )
            .unwrap();
            black_box(out);
        });
    });

    g.finish();
}

criterion_group!(benches, bench_curve);
criterion_main!(benches);
