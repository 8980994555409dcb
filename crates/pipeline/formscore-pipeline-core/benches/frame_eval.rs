use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use formscore_api::KeypointFrame;
use formscore_pipeline::{
    AiJudge, FormPipeline, ReferenceLibrary, RuleTable, Schedule, StaticGenerator,
};
use formscore_test_fixtures::{reference_poses, rule_tables};

fn pipeline(schedule: Schedule) -> FormPipeline {
    let rules = RuleTable::from_json_str(&rule_tables::json("gym-basics").expect("rule table"))
        .expect("parse rule table");
    let refs = ReferenceLibrary::from_json_str(
        &reference_poses::json("trainer-averages").expect("reference library"),
    )
    .expect("parse reference library");
    let ai = AiJudge::new(Arc::new(StaticGenerator::new(
        "Score: 0.8. Feedback: steady tempo",
    )));
    FormPipeline::new(Arc::new(rules), Arc::new(refs), ai).with_schedule(schedule)
}

fn bench_evaluate_frame(c: &mut Criterion) {
    let frame = KeypointFrame::from([("knee_angle", 172.0), ("hip_angle", 50.0)]);

    let sequential = pipeline(Schedule::Sequential);
    c.bench_function("evaluate_frame_sequential", |b| {
        b.iter(|| sequential.evaluate_frame(black_box("squat"), black_box(&frame)))
    });

    let concurrent = pipeline(Schedule::Concurrent);
    c.bench_function("evaluate_frame_concurrent", |b| {
        b.iter(|| concurrent.evaluate_frame(black_box("squat"), black_box(&frame)))
    });
}

criterion_group!(benches, bench_evaluate_frame);
criterion_main!(benches);
