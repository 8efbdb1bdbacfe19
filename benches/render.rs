//! Benchmarks for frame rendering.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use search_replay::{
    Cell, Frame, SolutionPath,
    render::{PixmapRaster, RasterBackend, RenderRequest, render},
    schema::Coord,
};

fn test_frame(size: usize) -> Frame {
    let rows = (0..size)
        .map(|r| {
            (0..size)
                .map(|c| match (r + c) % 7 {
                    0 => Cell::Wall,
                    1 | 2 => Cell::VisitedPath,
                    _ => Cell::Empty,
                })
                .collect()
        })
        .collect();
    Frame::from_rows(rows).unwrap()
}

fn diagonal(size: usize) -> SolutionPath {
    (0..size).map(|i| Coord::new(i, i)).collect()
}

fn bench_render_commands(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_commands");

    for size in [16, 64, 128, 256] {
        let frame = test_frame(size);
        let path = diagonal(size);

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", size, size)),
            &size,
            |b, _| {
                b.iter(|| {
                    render(black_box(&RenderRequest {
                        frame: &frame,
                        is_last_frame: true,
                        solution: &path,
                        annotation: Some("Path length: 42"),
                        cell_size: 8.5,
                    }))
                });
            },
        );
    }

    group.finish();
}

fn bench_rasterize(c: &mut Criterion) {
    let mut group = c.benchmark_group("rasterize");
    group.sample_size(20);

    for size in [16, 64, 128] {
        let frame = test_frame(size);
        let path = diagonal(size);
        let commands = render(&RenderRequest {
            frame: &frame,
            is_last_frame: true,
            solution: &path,
            annotation: None,
            cell_size: 10.0,
        });

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", size, size)),
            &size,
            |b, _| {
                b.iter(|| {
                    let mut raster = PixmapRaster::new();
                    raster.execute(black_box(&commands)).unwrap();
                    raster
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_render_commands, bench_rasterize);
criterion_main!(benches);
