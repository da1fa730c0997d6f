use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fb_presenter::core::{CpuTextureDevice, DirtyUpdate, TextureSize, TextureStore};

const WIDTH: u32 = 1920;
const HEIGHT: u32 = 1080;
const SIZE: TextureSize = TextureSize::new(WIDTH, HEIGHT);

fn store() -> TextureStore<CpuTextureDevice> {
    let store = TextureStore::new(CpuTextureDevice::new());
    let pixels = vec![0u8; SIZE.buffer_size()];
    store
        .upload_region(&DirtyUpdate::full(&pixels, SIZE), Some(SIZE))
        .expect("initial frame");
    store
}

/// Dirty rectangles of growing size against a 1080p display texture
fn bench_partial_uploads(c: &mut Criterion) {
    let store = store();
    let mut group = c.benchmark_group("partial_upload");

    for &side in &[1u32, 16, 64, 256] {
        let pixels = vec![0x7Fu8; (side * side * 4) as usize];
        group.bench_with_input(BenchmarkId::from_parameter(side), &side, |b, &side| {
            b.iter(|| {
                store
                    .upload_region(
                        &DirtyUpdate::new(black_box(&pixels), 100, 100, side, side, side * 4),
                        Some(SIZE),
                    )
                    .expect("upload")
            })
        });
    }
    group.finish();
}

/// Full frames versus one scanline, the case partial uploads exist for
fn bench_full_vs_scanline(c: &mut Criterion) {
    let store = store();
    let full = vec![0x40u8; (WIDTH * HEIGHT * 4) as usize];
    let line = vec![0x40u8; (WIDTH * 4) as usize];

    c.bench_function("full_frame", |b| {
        b.iter(|| {
            store
                .upload_region(&DirtyUpdate::full(black_box(&full), SIZE), Some(SIZE))
                .expect("upload")
        })
    });
    c.bench_function("single_scanline", |b| {
        b.iter(|| {
            store
                .upload_region(&DirtyUpdate::new(black_box(&line), 0, 540, WIDTH, 1, WIDTH * 4), Some(SIZE))
                .expect("upload")
        })
    });
}

criterion_group!(benches, bench_partial_uploads, bench_full_vs_scanline);
criterion_main!(benches);
