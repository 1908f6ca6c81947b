use autopath::context::{extract, LineContext};
use autopath::resolve::{resolve_alias, RewriteRule};
use autopath::MemoryView;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::path::Path;
use std::time::Duration;

/// 文脈解析のベンチマーク
fn bench_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract");
    group.measurement_time(Duration::from_secs(5));

    // 短い import 文
    let import = LineContext::new("import \"./comp", "comp", "import \"./", "", 14);
    group.bench_function("import_statement", |b| {
        b.iter(|| extract(black_box(&import)))
    });

    // 長い行の末尾にある属性
    let pre = format!("{}<img src=\"assets/images/", " ".repeat(400));
    let line = format!("{}logo\" alt=\"logo\">", pre);
    let attribute = LineContext::new(line.clone(), "logo", pre.clone(), "\" alt=\"logo\">", pre.len() + 4);
    group.bench_function("long_line_attribute", |b| {
        b.iter(|| extract(black_box(&attribute)))
    });

    group.finish();
}

/// ビューからの取得と解析
fn bench_capture(c: &mut Criterion) {
    let mut group = c.benchmark_group("capture");

    let mut text = "const a = 1;\n".repeat(500);
    text.push_str("import helper from \"@app/utils/he\";");
    let caret = text.chars().count() - 2;
    let view = MemoryView::with_caret(&text, caret);

    group.bench_function("capture_and_extract", |b| {
        b.iter(|| extract(&LineContext::capture(black_box(&view), caret)))
    });

    group.finish();
}

/// エイリアス置換
fn bench_alias(c: &mut Criterion) {
    let rules: Vec<RewriteRule> = vec![
        ("^~/".to_string(), "<project_root>/".to_string()),
        ("^@app/".to_string(), "<project_root>/src/".to_string()),
        ("^@lib/(\\w+)/".to_string(), "<project_root>/lib/\\1/".to_string()),
    ];
    let root = Path::new("/work/site");

    c.bench_function("resolve_alias_chain", |b| {
        b.iter(|| resolve_alias(black_box("@lib/core/index"), &rules, Some(root)))
    });
}

criterion_group!(benches, bench_extract, bench_capture, bench_alias);
criterion_main!(benches);
