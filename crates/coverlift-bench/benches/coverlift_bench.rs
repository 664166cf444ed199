//! Benchmarks for coverlift filter stages and pipelines.
//!
//! Run with: `cargo bench`

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

use coverlift_core::PixelBuffer;
use coverlift_ops::filter::{blur, sharpen_preset};
use coverlift_ops::{SharpenPreset, denoise, tone, unsharp};
use coverlift_worker::{Algorithm, Orchestrator, ProcessingOptions};

/// Deterministic textured test image.
fn test_image(width: u32, height: u32) -> PixelBuffer {
    let mut img = PixelBuffer::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let v = ((x * 31 + y * 17) ^ (x * y)) as u8;
            img.set_pixel(x, y, [v, v.wrapping_mul(3), 255 - v, 255]);
        }
    }
    img
}

const SIZES: [u32; 3] = [256, 512, 1024];

fn bench_blur(c: &mut Criterion) {
    let mut group = c.benchmark_group("blur");

    for size in SIZES {
        let img = test_image(size, size);
        group.throughput(Throughput::Elements((size * size) as u64));

        for radius in [1.0f32, 4.0] {
            group.bench_with_input(
                BenchmarkId::new(format!("r{radius}"), size),
                &img,
                |b, img| b.iter(|| blur(black_box(img), radius)),
            );
        }
    }

    group.finish();
}

fn bench_sharpen(c: &mut Criterion) {
    let mut group = c.benchmark_group("sharpen");

    for size in SIZES {
        let img = test_image(size, size);
        group.throughput(Throughput::Elements((size * size) as u64));

        group.bench_with_input(BenchmarkId::new("unsharp", size), &img, |b, img| {
            b.iter(|| unsharp::unsharp_mask(black_box(img), 1.2, 1.0, 1.0))
        });

        group.bench_with_input(BenchmarkId::new("kernel_strong", size), &img, |b, img| {
            b.iter(|| sharpen_preset(black_box(img), SharpenPreset::Strong, 1.0))
        });
    }

    group.finish();
}

fn bench_denoise_tone(c: &mut Criterion) {
    let mut group = c.benchmark_group("denoise_tone");

    for size in SIZES {
        let img = test_image(size, size);
        group.throughput(Throughput::Elements((size * size) as u64));

        group.bench_with_input(BenchmarkId::new("denoise", size), &img, |b, img| {
            b.iter(|| denoise::denoise(black_box(img), 0.3))
        });

        group.bench_with_input(BenchmarkId::new("contrast_vibrance", size), &img, |b, img| {
            b.iter_batched(
                || img.clone(),
                |img| tone::contrast(img, 0.1).and_then(|img| tone::vibrance(img, 0.2)),
                criterion::BatchSize::LargeInput,
            )
        });
    }

    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    group.sample_size(20);

    let orchestrator = Orchestrator::default();
    let mut upscale = ProcessingOptions::default();
    upscale.pre_process.denoise = true;
    upscale.post_process.contrast = true;
    upscale.post_process.vibrance = true;
    let restore = ProcessingOptions::restore(Algorithm::Unsharp, 1.0);

    for size in [128u32, 512] {
        let img = test_image(size, size);
        group.throughput(Throughput::Elements((size * size) as u64));

        group.bench_with_input(BenchmarkId::new("upscale_2x", size), &img, |b, img| {
            b.iter(|| orchestrator.upscale(black_box(img), &upscale))
        });

        group.bench_with_input(BenchmarkId::new("restore", size), &img, |b, img| {
            b.iter(|| orchestrator.restore(black_box(img), &restore))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_blur,
    bench_sharpen,
    bench_denoise_tone,
    bench_pipeline,
);

criterion_main!(benches);
