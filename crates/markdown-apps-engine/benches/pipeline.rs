use std::rc::Rc;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use markdown_apps_engine::apps::Registry;
use markdown_apps_engine::editing::{EditRequest, Page};
use markdown_apps_engine::parsing::parse_to_tree;
use markdown_apps_engine::render::{RenderContext, render};
use markdown_apps_engine::transform::transform;
mod common;

fn bench_pipeline_stages(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    group.sample_size(20);

    let content = common::generate_page(100);
    let registry = Registry::builtin();
    let context = RenderContext::new(&registry, Rc::new(|_, _| {}));

    group.bench_function("parse", |b| {
        b.iter(|| black_box(parse_to_tree(black_box(&content))));
    });

    let tree = parse_to_tree(&content);
    group.bench_function("transform", |b| {
        b.iter(|| black_box(transform(black_box(&tree), &registry).into_owned()));
    });

    let transformed = transform(&tree, &registry).into_owned();
    group.bench_function("render", |b| {
        b.iter(|| black_box(render(black_box(&transformed), &context).unwrap()));
    });

    group.finish();
}

fn bench_edit_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("edit_cycle");
    group.sample_size(20);

    let content = common::generate_page(100);
    let registry = Registry::builtin();

    group.bench_function("apply_edit_then_render", |b| {
        b.iter(|| {
            let mut page = Page::from_text(&content);
            let context = page.applications(&registry).remove(0);
            page.apply_edit(&EditRequest {
                text: "* Todo\n  * benchmarked".to_string(),
                context,
            });
            let render_context = RenderContext::new(&registry, Rc::new(|_, _| {}));
            black_box(page.render(&render_context).unwrap());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_pipeline_stages, bench_edit_cycle);
criterion_main!(benches);
