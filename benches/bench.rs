// Criterion benchmarks for Ethical Guardrail

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ethical_guardrail::core::{AuditPolicy, FeatureContract, GatewayHandle, Guardrail};
use ethical_guardrail::models::{parse_applicant, ApplicantRecord, Decision, Label};
use ethical_guardrail::services::LogisticModel;
use serde_json::json;

const MODEL: &str = r#"{
    "name": "bench_model",
    "feature_names": ["age", "education-num", "sex", "hours-per-week"],
    "coefficients": [0.045, 0.33, 1.3, 0.03],
    "intercept": -8.3
}"#;

fn create_record(i: i64) -> ApplicantRecord {
    ApplicantRecord {
        age: 18 + (i % 50),
        education_num: 1 + (i % 16),
        sex: i % 2,
        hours_per_week: 20 + (i % 40),
    }
}

fn bench_parse(c: &mut Criterion) {
    let body = json!({"age": 35, "education_num": 13, "sex": 0, "hours_per_week": 40});
    c.bench_function("parse_applicant", |b| {
        b.iter(|| parse_applicant(black_box(&body)))
    });
}

fn bench_encode(c: &mut Criterion) {
    let contract = FeatureContract::default();
    let record = create_record(7);
    c.bench_function("encode_features", |b| {
        b.iter(|| contract.encode(black_box(&record)))
    });
}

fn bench_audit(c: &mut Criterion) {
    let policy = AuditPolicy::default();
    let record = create_record(3);
    c.bench_function("audit_evaluate", |b| {
        b.iter(|| {
            policy
                .evaluate(black_box(Label::Zero), black_box(Decision::Denied), black_box(&record))
                .note
                .len()
        })
    });
}

fn bench_assess(c: &mut Criterion) {
    let model = LogisticModel::from_json_str(MODEL).unwrap();
    let guardrail = Guardrail::with_defaults(GatewayHandle::loaded(model));
    let records: Vec<ApplicantRecord> = (0..1000).map(create_record).collect();

    c.bench_function("assess_1000", |b| {
        b.iter(|| {
            for record in &records {
                let _ = black_box(guardrail.assess(record));
            }
        })
    });
}

criterion_group!(benches, bench_parse, bench_encode, bench_audit, bench_assess);
criterion_main!(benches);
