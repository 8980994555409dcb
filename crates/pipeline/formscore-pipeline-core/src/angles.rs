//! Articulation measurements derived from 2D landmarks.
//!
//! The middle frame of a repetition is the most stable one, so it alone is
//! measured. Missing landmarks or degenerate geometry leave the affected
//! articulation out of the frame rather than inventing a value.

use formscore_api::{KeypointFrame, Landmark, LandmarkFrame, LandmarkIndex};

pub const KNEE_ANGLE: &str = "knee_angle";
pub const HIP_ANGLE: &str = "hip_angle";
pub const ELBOW_ANGLE: &str = "elbow_angle";
pub const BODY_LINE: &str = "body_line";
pub const KNEE_FORWARD: &str = "knee_forward";

/// Expected hip position along the head-to-ankle line.
const HIP_LINE_RATIO: f64 = 0.7;

/// Measure the middle frame of `sequence`. Empty input yields an empty frame.
pub fn extract(sequence: &[LandmarkFrame]) -> KeypointFrame {
    match sequence.get(sequence.len() / 2) {
        Some(frame) => measure(frame),
        None => KeypointFrame::new(),
    }
}

/// Measure a single landmark frame.
pub fn measure(frame: &LandmarkFrame) -> KeypointFrame {
    use LandmarkIndex::*;
    let mut out = KeypointFrame::new();
    let lm = |i| frame.get(i);

    if let (Some(hip), Some(knee), Some(ankle)) = (lm(LeftHip), lm(LeftKnee), lm(LeftAnkle)) {
        if let Some(angle) = joint_angle(hip, knee, ankle) {
            out.insert(KNEE_ANGLE, angle);
        }
    }

    if let (Some(lh), Some(rh), Some(lk), Some(rk)) =
        (lm(LeftHip), lm(RightHip), lm(LeftKnee), lm(RightKnee))
    {
        out.insert(HIP_ANGLE, hip_flexion(lh, rh, lk, rk));
    }

    if let (Some(shoulder), Some(elbow), Some(wrist)) =
        (lm(LeftShoulder), lm(LeftElbow), lm(LeftWrist))
    {
        if let Some(angle) = joint_angle(shoulder, elbow, wrist) {
            out.insert(ELBOW_ANGLE, angle);
        }
    }

    if let (Some(head), Some(hip), Some(ankle)) = (lm(Head), lm(LeftHip), lm(LeftAnkle)) {
        let expected_hip_y = head.y + (ankle.y - head.y) * HIP_LINE_RATIO;
        out.insert(BODY_LINE, (hip.y - expected_hip_y).abs() * 100.0);
    }

    if let (Some(knee), Some(ankle)) = (lm(LeftKnee), lm(LeftAnkle)) {
        out.insert(KNEE_FORWARD, (knee.x - ankle.x).abs() * 100.0);
    }

    out
}

/// Angle at `vertex` between the rays to `a` and `b`, in degrees.
/// `None` when either ray has zero length.
pub fn joint_angle(a: &Landmark, vertex: &Landmark, b: &Landmark) -> Option<f64> {
    let (v1x, v1y) = (a.x - vertex.x, a.y - vertex.y);
    let (v2x, v2y) = (b.x - vertex.x, b.y - vertex.y);
    let mag1 = v1x.hypot(v1y);
    let mag2 = v2x.hypot(v2y);
    if mag1 == 0.0 || mag2 == 0.0 {
        return None;
    }
    let cos = ((v1x * v2x + v1y * v2y) / (mag1 * mag2)).clamp(-1.0, 1.0);
    Some(cos.acos().to_degrees())
}

/// Deviation of the hip-centre to knee-centre segment from vertical, in degrees.
fn hip_flexion(left_hip: &Landmark, right_hip: &Landmark, left_knee: &Landmark, right_knee: &Landmark) -> f64 {
    let hip = ((left_hip.x + right_hip.x) / 2.0, (left_hip.y + right_hip.y) / 2.0);
    let knee = ((left_knee.x + right_knee.x) / 2.0, (left_knee.y + right_knee.y) / 2.0);
    let dx = knee.0 - hip.0;
    let dy = knee.1 - hip.1;
    dx.atan2(dy).to_degrees().abs()
}
