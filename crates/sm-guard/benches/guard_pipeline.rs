//! Criterion benchmarks for `sm-guard`.
//!
//! Focus on the full pipeline over message sizes typical of chat input.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sm_common::{PreSendContext, RulePolicyMap, SendTrigger};
use sm_guard::{detect, is_valid_luhn, pre_send_guard, EnabledCategories};

const SAMPLE: &str = "我叫张三，电话13800138000，邮箱zhang.san@example.cn，\
    卡号 4532 0151 1283 0366，key sk-proj-abcdefghijklmnopqrstuvwxyz. ";

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("guard");
    let policies = RulePolicyMap::default();

    for (name, repeat) in [("short", 1), ("paragraph", 10), ("long", 100)] {
        let text = SAMPLE.repeat(repeat);
        let context = PreSendContext::new("chatgpt.com", SendTrigger::Enter, text.clone());

        group.bench_with_input(BenchmarkId::new("detect", name), &text, |b, text| {
            let enabled = EnabledCategories::all();
            b.iter(|| black_box(detect(black_box(text), &enabled)));
        });

        group.bench_with_input(
            BenchmarkId::new("pre_send_guard", name),
            &context,
            |b, context| {
                b.iter(|| black_box(pre_send_guard(black_box(context), &policies)));
            },
        );
    }

    group.bench_function("luhn", |b| {
        b.iter(|| black_box(is_valid_luhn(black_box("4532015112830366"))));
    });

    group.finish();
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
