use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use geojson::feature::Id;
use geojson::{Feature, FeatureCollection, Geometry, Value};

use traffic_dash::data::county_regions;
use traffic_dash::map::{render_layer, Layer, Viewport};
use traffic_dash::metric::{color_for, MetricType};

/// A 60x30 grid of half-degree "counties" over the lower 48, ids
/// spread over ten state prefixes.
fn synthetic_counties() -> FeatureCollection {
    let mut features = Vec::new();
    for row in 0..30 {
        for col in 0..60 {
            let (x, y) = (-125.0 + col as f64 * 0.5, 25.0 + row as f64 * 0.5);
            let ring = vec![
                vec![x, y],
                vec![x + 0.5, y],
                vec![x + 0.5, y + 0.5],
                vec![x, y + 0.5],
                vec![x, y],
            ];
            let state = 1 + (col / 6);
            let fips = state * 1000 + row * 60 + col % 6;
            features.push(Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::Polygon(vec![ring]))),
                id: Some(Id::String(format!("{fips:05}"))),
                properties: None,
                foreign_members: None,
            });
        }
    }
    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

fn bench_color_for(c: &mut Criterion) {
    let values: Vec<Option<f64>> = (0..1000).map(|i| Some(i as f64 * 0.06)).collect();
    c.bench_function("color_for_1000", |b| {
        b.iter(|| {
            for metric in MetricType::ALL {
                for v in &values {
                    black_box(color_for(*v, metric));
                }
            }
        })
    });
}

fn bench_county_filter(c: &mut Criterion) {
    let fc = synthetic_counties();
    c.bench_function("county_regions_prefix", |b| {
        b.iter_batched(
            || fc.clone(),
            |fc| black_box(county_regions(fc, "05")),
            BatchSize::SmallInput,
        )
    });
}

fn bench_render_layer(c: &mut Criterion) {
    let layer = Layer::new(1, county_regions(synthetic_counties(), ""), 0.25);
    let viewport = Viewport::new(-98.5, 39.8, 5.0, 400, 200);
    c.bench_function("render_layer_200x50", |b| {
        b.iter(|| black_box(render_layer(&layer, &viewport)))
    });
}

criterion_group!(benches, bench_color_for, bench_county_filter, bench_render_layer);
criterion_main!(benches);
