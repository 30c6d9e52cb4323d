use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

use flowviz_flow::{calc_optical_flow_farneback, FarnebackParams};
use flowviz_image::{Image, ImageSize};

fn make_blob(size: usize, cx: f32, cy: f32, radius: f32) -> Image<f32, 1> {
    let mut data = Vec::with_capacity(size * size);
    for y in 0..size {
        for x in 0..size {
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            data.push(255.0 * (-(dx * dx + dy * dy) / (2.0 * radius * radius)).exp());
        }
    }
    Image::new(
        ImageSize {
            width: size,
            height: size,
        },
        data,
    )
    .unwrap()
}

fn bench_farneback(c: &mut Criterion) {
    let mut group = c.benchmark_group("Farneback");
    group.sample_size(10);

    for size in [128usize, 256, 512].iter() {
        let center = *size as f32 / 2.0;
        let prev = make_blob(*size, center, center, *size as f32 / 8.0);
        let next = make_blob(*size, center + 3.0, center + 1.0, *size as f32 / 8.0);
        let params = FarnebackParams::default();

        group.bench_with_input(BenchmarkId::new("dense_flow", size), size, |b, _| {
            let mut flow = Image::<f32, 2>::from_size_val(prev.size(), 0.0).unwrap();
            b.iter(|| {
                calc_optical_flow_farneback(
                    black_box(&prev),
                    black_box(&next),
                    black_box(&mut flow),
                    &params,
                )
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_farneback);
criterion_main!(benches);
