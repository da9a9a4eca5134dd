//! Benchmarks for the conversion pipeline.
//!
//! Run with: cargo bench

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};

use jsxkit::css::{self, CssOptions};
use jsxkit::{
    AssetOptions, CodeGenerator, ComponentSplitter, ConversionOptions, Converter, CssStrategy,
    GeneratorOptions, ParseOptions, SplitOptions, parse,
};

const LANDING: &str = include_str!("../tests/fixtures/landing.html");

/// The landing page with its pricing list repeated to a few hundred cards.
fn large_page() -> String {
    let cards: String = (0..300)
        .map(|i| {
            format!(
                r#"<li class="card"><h3>Plan {i}</h3><span class="price">{i}</span><a href="/signup?plan={i}">Choose</a></li>"#
            )
        })
        .collect();
    LANDING.replace("<ul class=\"plans\">", &format!("<ul class=\"plans\">{cards}"))
}

// ============================================================================
// Stage Benchmarks
// ============================================================================

fn bench_parse(c: &mut Criterion) {
    let page = large_page();
    c.bench_function("parse", |b| {
        b.iter(|| parse(black_box(&page), &ParseOptions::default()).unwrap());
    });
}

fn bench_split(c: &mut Criterion) {
    let doc = parse(&large_page(), &ParseOptions::default()).unwrap();
    let splitter = ComponentSplitter::new(SplitOptions::default());
    c.bench_function("split", |b| {
        b.iter(|| splitter.split(black_box(&doc)).unwrap());
    });
}

fn bench_generate(c: &mut Criterion) {
    let doc = parse(&large_page(), &ParseOptions::default()).unwrap();
    let split = ComponentSplitter::new(SplitOptions::default()).split(&doc).unwrap();
    let styles = css::converter(&doc, &CssOptions::default());
    let generator = CodeGenerator::new(GeneratorOptions::default().with_typescript(true));
    c.bench_function("generate_tsx", |b| {
        b.iter(|| generator.generate(&doc, &split, styles.as_ref()).unwrap());
    });
}

fn bench_css(c: &mut Criterion) {
    let page = large_page();
    for strategy in [CssStrategy::Tailwind, CssStrategy::CssModules, CssStrategy::Vanilla] {
        let options = CssOptions::new(strategy);
        c.bench_function(&format!("css_{strategy}"), |b| {
            b.iter(|| css::convert(black_box(&page), &options).unwrap());
        });
    }
}

fn bench_assets(c: &mut Criterion) {
    c.bench_function("extract_assets", |b| {
        b.iter(|| jsxkit::assets::extract_from_html(black_box(LANDING), &AssetOptions::default()));
    });
}

// ============================================================================
// End to End
// ============================================================================

fn bench_convert(c: &mut Criterion) {
    let page = large_page();
    let converter = Converter::new().without_fetcher();
    c.bench_function("convert_to_zip", |b| {
        b.iter(|| converter.convert_markup(black_box(&page), ConversionOptions::default()));
    });
}

criterion_group!(
    benches,
    // Stages
    bench_parse,
    bench_split,
    bench_generate,
    bench_css,
    bench_assets,
    // Pipeline
    bench_convert,
);
criterion_main!(benches);
