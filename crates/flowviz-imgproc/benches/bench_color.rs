use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

use flowviz_image::{Image, ImageSize};
use flowviz_imgproc::color::{gray_from_rgb, gray_from_rgb_u8};

fn bench_gray_from_rgb(c: &mut Criterion) {
    let mut group = c.benchmark_group("Gray");

    for (width, height) in [(256, 224), (512, 448), (1024, 896)].iter() {
        let id = format!("{}x{}", width, height);
        let size = ImageSize {
            width: *width,
            height: *height,
        };

        let image_f32 = Image::<f32, 3>::new(size, vec![0.5f32; width * height * 3]).unwrap();
        let mut gray_f32 = Image::<f32, 1>::from_size_val(size, 0.0).unwrap();

        let image_u8 = Image::<u8, 3>::new(size, vec![128u8; width * height * 3]).unwrap();
        let mut gray_u8 = Image::<u8, 1>::from_size_val(size, 0).unwrap();

        group.bench_with_input(BenchmarkId::new("f32", &id), &image_f32, |b, i| {
            b.iter(|| gray_from_rgb(black_box(i), black_box(&mut gray_f32)))
        });

        group.bench_with_input(BenchmarkId::new("u8", &id), &image_u8, |b, i| {
            b.iter(|| gray_from_rgb_u8(black_box(i), black_box(&mut gray_u8)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_gray_from_rgb);
criterion_main!(benches);
