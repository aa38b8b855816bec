use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use retrorast::bench::{
    apply_bloom, BloomBuffer, RasterTriangle, Renderer, Rgb, ScanlineRasterizer, ScreenVertex,
    Texture, TEXTURE_SIZE,
};
use retrorast::math::Vec2;
use retrorast::RenderConfig;

const RESOLUTION: usize = 512;

fn vertex(x: f32, y: f32, inv_z: f32) -> ScreenVertex {
    ScreenVertex {
        x,
        y,
        inv_z,
        uv: Vec2::new(x, y),
        light: Rgb::BLACK,
    }
}

/// A triangle centered on screen covering roughly `span` of the unit square.
fn triangle(span: f32) -> RasterTriangle {
    let half = span / 2.0;
    RasterTriangle::new(
        [
            vertex(0.5 - half, 0.5 + half, 0.2),
            vertex(0.5 + half, 0.5 + half, 0.2),
            vertex(0.5, 0.5 - half, 0.2),
        ],
        100,
    )
}

fn checker_texture() -> Texture {
    let mut texels = vec![Rgb::BLACK; TEXTURE_SIZE * TEXTURE_SIZE];
    for y in 0..TEXTURE_SIZE {
        for x in 0..TEXTURE_SIZE {
            if (x / 8 + y / 8) % 2 == 0 {
                texels[y * TEXTURE_SIZE + x] = Rgb::WHITE;
            }
        }
    }
    Texture::from_texels(texels)
}

fn benchmark_fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("fill_triangle");

    let rasterizer = ScanlineRasterizer::new();
    let texture = checker_texture();

    let textured = RenderConfig::default();
    let flat = RenderConfig {
        shade_flat: true,
        ..RenderConfig::default()
    };

    for (name, span) in [("small", 0.05), ("medium", 0.3), ("large", 0.9)] {
        let tri = triangle(span);

        group.bench_with_input(BenchmarkId::new("textured", name), &tri, |b, tri| {
            let mut renderer = Renderer::new(RESOLUTION);
            b.iter(|| {
                renderer.clear();
                let mut fb = renderer.as_framebuffer();
                rasterizer.draw_triangle(black_box(tri), &mut fb, &texture, &textured);
            });
        });

        group.bench_with_input(BenchmarkId::new("flat", name), &tri, |b, tri| {
            let mut renderer = Renderer::new(RESOLUTION);
            b.iter(|| {
                renderer.clear();
                let mut fb = renderer.as_framebuffer();
                rasterizer.draw_triangle(black_box(tri), &mut fb, &texture, &flat);
            });
        });
    }

    group.finish();
}

fn benchmark_bloom(c: &mut Criterion) {
    c.bench_function("bloom_pass", |b| {
        let mut color = vec![Rgb::new(180, 120, 60); RESOLUTION * RESOLUTION];
        let mut bloom = BloomBuffer::default();
        b.iter(|| {
            apply_bloom(black_box(&mut color), RESOLUTION, &mut bloom);
        });
    });
}

criterion_group!(benches, benchmark_fill, benchmark_bloom);
criterion_main!(benches);
