use std::sync::Arc;

use formscore_api::KeypointFrame;
use formscore_pipeline::{FormPipeline, PipelineConfig, UnavailableGenerator};
use formscore_test_fixtures::{reference_poses, rule_tables};

fn main() -> anyhow::Result<()> {
    let cfg = PipelineConfig {
        rules_path: Some(rule_tables::path("gym-basics")?),
        references_path: Some(reference_poses::path("trainer-averages")?),
        ..PipelineConfig::default()
    };

    // No AI service wired in: the generative judge falls back to its neutral score.
    let pipeline = FormPipeline::from_config(&cfg, Arc::new(UnavailableGenerator));

    let frame = KeypointFrame::from([("knee_angle", 180.0), ("hip_angle", 62.0)]);
    let result = pipeline.evaluate_frame("squat", &frame);
    println!("{}", serde_json::to_string_pretty(&result)?);

    let workout = pipeline.evaluate_workout(&[result.final_score, 0.8, 0.95]);
    println!("workout: {}%", workout.percentage);
    Ok(())
}
