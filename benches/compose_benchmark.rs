//! Benchmarks for block composition and scene editing.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use pdfblocks::{
    compose, Affine, BaseTransform, Block, EditState, Page, Point, ReorderDirection, SceneModel,
    Size, TextContent,
};

/// A single page holding `count` text blocks laid out in rows.
fn create_scene(count: usize) -> SceneModel {
    let mut scene = SceneModel::new();
    scene.add_page(Page::new(0, 816.0, 1056.0));
    for i in 0..count {
        let x = 40.0 + (i % 8) as f64 * 90.0;
        let y = 40.0 + (i / 8) as f64 * 20.0;
        let base = BaseTransform::new(Affine::new([16.0, 0.0, 0.0, 16.0, x, y]));
        let block = Block::text(0, base, Size::new(80.0, 16.0), TextContent::new("Cell", 16.0));
        if scene.add_block(block).is_err() {
            break;
        }
    }
    scene
}

fn bench_compose(c: &mut Criterion) {
    let base = BaseTransform::new(Affine::new([11.3, 4.1, -2.7, 15.9, 120.0, 300.0]));
    let edit = EditState::translated(12.0, -4.0)
        .with_rotation(37.5)
        .with_scale(1.5, 0.75);

    c.bench_function("compose", |b| {
        b.iter(|| compose(black_box(&base), black_box(&edit)))
    });
    c.bench_function("compose_identity", |b| {
        b.iter(|| compose(black_box(&base), black_box(&EditState::IDENTITY)))
    });
}

fn bench_scene(c: &mut Criterion) {
    let mut group = c.benchmark_group("scene");

    for count in [50, 500] {
        let scene = create_scene(count);
        group.bench_with_input(BenchmarkId::new("hit_test", count), &scene, |b, scene| {
            b.iter(|| scene.hit_test(0, black_box(Point::new(400.0, 200.0))))
        });

        group.bench_with_input(BenchmarkId::new("reorder", count), &scene, |b, scene| {
            let mut scene = scene.clone();
            let id = scene.blocks_on_page(0)[count / 2].id();
            b.iter(|| {
                scene.reorder(id, ReorderDirection::Forward);
                scene.reorder(id, ReorderDirection::Backward);
            })
        });

        group.bench_with_input(BenchmarkId::new("duplicate", count), &scene, |b, scene| {
            b.iter_batched(
                || scene.clone(),
                |mut scene| {
                    let id = scene.blocks_on_page(0)[0].id();
                    scene.duplicate_block(id)
                },
                criterion::BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

criterion_group!(benches, bench_compose, bench_scene);
criterion_main!(benches);
