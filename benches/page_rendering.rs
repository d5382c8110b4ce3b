//! Benchmarks for page rendering
//!
//! Measures placeholder substitution and full catalog pages.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pixly_core::ImageId;
use pixly_db::models::Image;
use pixly_server::pages::{self, PageContext};

/// Template with no placeholders (baseline)
const TEMPLATE_NO_VARS: &str = "<p>Nothing to substitute here, just markup.</p>";

/// Template with a handful of placeholders and a CSS block
const TEMPLATE_MIXED: &str = "<style>p { margin: 0 }</style>\
    <h1>{name}</h1><img src=\"{url}\" alt=\"{name}\"><p>{notes}</p><p>{missing}</p>";

fn create_context() -> PageContext {
    PageContext::new()
        .with_text("name", "Harbor at dusk <wide>")
        .with_text("url", "/media/abc/harbor.png")
        .with_text("notes", "Shot from the pier & edited later")
}

fn sample_images(n: usize) -> Vec<Image> {
    (0..n)
        .map(|i| Image {
            id: ImageId::new(),
            image_name: format!("Image {i}"),
            uploaded_by: "bench".into(),
            notes: "notes".into(),
            filename: format!("image_{i}.jpg"),
            storage_url: format!("/media/{i}/image_{i}.jpg"),
            created_at: "2024-01-01T00:00:00Z".into(),
            updated_at: "2024-01-01T00:00:00Z".into(),
        })
        .collect()
}

fn bench_substitute(c: &mut Criterion) {
    let mut group = c.benchmark_group("substitute");
    let ctx = create_context();

    for (name, template) in [("no_vars", TEMPLATE_NO_VARS), ("mixed", TEMPLATE_MIXED)] {
        group.throughput(Throughput::Bytes(template.len() as u64));
        group.bench_with_input(BenchmarkId::new("template", name), &template, |b, t| {
            b.iter(|| ctx.substitute(black_box(t)));
        });
    }

    group.finish();
}

fn bench_home_page(c: &mut Criterion) {
    let mut group = c.benchmark_group("home_page");

    for count in [0usize, 10, 50] {
        let images = sample_images(count);
        group.bench_with_input(BenchmarkId::new("images", count), &images, |b, images| {
            b.iter(|| pages::catalog::home(black_box(images), None, &[]));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_substitute, bench_home_page);
criterion_main!(benches);
