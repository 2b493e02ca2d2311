//! Benchmarks for the response-to-HTML path
//!
//! This benchmark measures:
//! - Dedent + strip of model output
//! - Markdown subset to HTML conversion
//! - Full page rendering

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use daily_english::render::{markdown_to_html, render_page};
use daily_english::text::tidy;
use daily_english::{Lesson, Page};

const SAMPLE_RESPONSE: &str = "
    🎬 대화:
    A: I can't believe you finished the whole project over the weekend.
    B: Well, I had a lot of coffee and zero social life.

    📝 해설:
    **문맥**: 주말 동안 큰 일을 끝낸 동료에게 감탄하는 상황입니다.
    **핵심 표현**: zero social life - 사회생활이 전혀 없다는 과장된 농담
    ";

fn bench_tidy(c: &mut Criterion) {
    let mut group = c.benchmark_group("tidy");
    for repeat in [1usize, 8, 64] {
        let input = SAMPLE_RESPONSE.repeat(repeat);
        group.throughput(Throughput::Bytes(input.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(repeat), &input, |b, input| {
            b.iter(|| tidy(black_box(input)))
        });
    }
    group.finish();
}

fn bench_markdown(c: &mut Criterion) {
    let md = tidy(SAMPLE_RESPONSE);
    c.bench_function("markdown_to_html", |b| {
        b.iter(|| markdown_to_html(black_box(&md)))
    });
}

fn bench_page(c: &mut Criterion) {
    let page = Page {
        show_key_input: true,
        configured: true,
        notices: vec![],
        lesson: Some(Lesson::from_raw(SAMPLE_RESPONSE)),
    };
    c.bench_function("render_page", |b| b.iter(|| render_page(black_box(&page))));
}

criterion_group!(benches, bench_tidy, bench_markdown, bench_page);
criterion_main!(benches);
