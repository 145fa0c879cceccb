//! Benchmark for document assembly and slug generation

use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use postforge::document::{assemble, slugify, PostMetadata, Section};

fn sections(count: usize) -> Vec<Section> {
    let body = format!("<p>{}</p>", "steep the leaves gently ".repeat(60));
    (0..count)
        .map(|i| {
            let section = Section::new(format!("Section heading number {}", i), body.clone());
            if i > 0 && i % 3 == 0 {
                section.with_image(format!("https://img.test/{}.png", i), "Illustration")
            } else {
                section
            }
        })
        .collect()
}

fn bench_assemble_eight_sections(c: &mut Criterion) {
    let sections = sections(8);
    let metadata = PostMetadata {
        excerpt: "A practical guide to brewing green tea at home.".to_string(),
        faq_html: Some("<h3>Hot or cold?</h3><p>Either.</p>".repeat(6)),
        hero_image_url: Some("https://img.test/hero.png".to_string()),
        generated_at: Utc::now(),
    };

    c.bench_function("assemble_8_sections", |b| {
        b.iter(|| assemble(black_box("Green Tea Brewing Guide"), black_box(&sections), &metadata))
    });
}

fn bench_slugify(c: &mut Criterion) {
    c.bench_function("slugify_title", |b| {
        b.iter(|| slugify(black_box("10 Best SEO Tools for 2025! (Updated & Reviewed)")))
    });
}

criterion_group!(benches, bench_assemble_eight_sections, bench_slugify);
criterion_main!(benches);
