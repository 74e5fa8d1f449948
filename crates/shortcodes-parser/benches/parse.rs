//! Benchmarks for shortcode parsing throughput.

#![allow(clippy::format_push_string)] // Benchmark setup code, performance not critical

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use shortcodes_parser::{
    ExpectedResult, HandlerOutput, ParserConfig, ShortcodeOptions, ShortcodeParser,
};

fn parser() -> ShortcodeParser {
    let mut parser = ShortcodeParser::new(ParserConfig::default());
    parser
        .register_fn(
            "image",
            |call, _| {
                let src = call.attrs.get("src").unwrap_or("missing.png");
                HandlerOutput::html(format!(r#"<img src="{src}">"#))
            },
            None,
        )
        .register_fn(
            "callout",
            |call, _| HandlerOutput::html(format!(r#"<aside class="callout">{}</aside>"#, call.content)),
            Some(
                ShortcodeOptions::new()
                    .paired()
                    .with_expected_result(ExpectedResult::Block),
            ),
        );
    parser
}

/// Generate editor-style HTML with shortcodes in every section.
fn generate_content(sections: usize, paragraphs_per_section: usize) -> String {
    let mut html = String::with_capacity(sections * paragraphs_per_section * 200);
    for i in 0..sections {
        html.push_str(&format!("<h2>Section {i}</h2>\n"));
        for j in 0..paragraphs_per_section {
            html.push_str(&format!(
                "<p>Paragraph {j} with <em>inline [image src=\"{i}-{j}.png\"] image</em>.</p>\n"
            ));
        }
        html.push_str("<p>[callout]</p>\n<p>Note text.</p>\n<p>[/callout]</p>\n");
        html.push_str(&format!(
            "<p>Before <span>[image src=\"wide-{i}.png\" class=\"center\"]</span> after</p>\n"
        ));
    }
    html
}

fn bench_parse_plain(c: &mut Criterion) {
    let parser = parser();
    let html = "<p>No shortcodes here, just <b>markup</b>.</p>".repeat(50);

    c.bench_function("parse_without_shortcodes", |b| {
        b.iter(|| parser.parse(&html));
    });
}

fn bench_parse_nested(c: &mut Criterion) {
    let parser = parser();
    let html = "[callout]outer [callout]inner [image src=a.png][/callout][/callout]";

    c.bench_function("parse_nested_paired", |b| {
        b.iter(|| parser.parse(html));
    });
}

fn bench_parse_varying_sizes(c: &mut Criterion) {
    let parser = parser();
    let mut group = c.benchmark_group("parse_by_size");

    for (sections, paragraphs) in [(5, 2), (20, 3), (50, 5)] {
        let html = generate_content(sections, paragraphs);
        group.throughput(Throughput::Bytes(html.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("html", format!("{sections}s_{paragraphs}p")),
            &html,
            |b, html| b.iter(|| parser.parse(html)),
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_parse_plain,
    bench_parse_nested,
    bench_parse_varying_sizes
);
criterion_main!(benches);
