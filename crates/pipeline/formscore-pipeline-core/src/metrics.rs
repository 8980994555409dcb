//! Whole-repetition movement metrics over a landmark sequence.

use serde::{Deserialize, Serialize};

use formscore_api::{LandmarkFrame, LandmarkIndex};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MovementMetrics {
    /// Vertical extent covered by any landmark, in percent of frame height.
    pub range_of_motion: f64,
    /// 100 minus mean hip displacement per frame (x100), floored at 0.
    pub stability: f64,
    /// 100 minus the left/right movement gap (x100), floored at 0.
    pub symmetry: f64,
    /// 100 minus the coefficient of variation of per-frame movement (x100).
    pub tempo: f64,
}

/// Compute [`MovementMetrics`] for one repetition. All values are rounded.
pub fn movement_metrics(sequence: &[LandmarkFrame]) -> MovementMetrics {
    if sequence.is_empty() {
        return MovementMetrics::default();
    }

    let hips = [LandmarkIndex::LeftHip, LandmarkIndex::RightHip];
    let hip_movement = mean_displacement(sequence, &hips);
    let left = mean_displacement(sequence, &LandmarkIndex::LEFT_SIDE);
    let right = mean_displacement(sequence, &LandmarkIndex::RIGHT_SIDE);

    MovementMetrics {
        range_of_motion: (vertical_extent(sequence) * 100.0).round(),
        stability: (100.0 - hip_movement * 100.0).max(0.0).round(),
        symmetry: (100.0 - (left - right).abs() * 100.0).max(0.0).round(),
        tempo: (100.0 - tempo_variation(sequence) * 100.0).max(0.0).round(),
    }
}

fn vertical_extent(sequence: &[LandmarkFrame]) -> f64 {
    let mut ys = sequence.iter().flat_map(|f| f.landmarks.iter().map(|l| l.y));
    let Some(first) = ys.next() else {
        return 0.0;
    };
    let (min, max) = ys.fold((first, first), |(lo, hi), y| (lo.min(y), hi.max(y)));
    max - min
}

/// Mean frame-to-frame displacement of the given landmarks.
fn mean_displacement(sequence: &[LandmarkFrame], indices: &[LandmarkIndex]) -> f64 {
    let mut total = 0.0;
    let mut count = 0usize;
    for pair in sequence.windows(2) {
        for &idx in indices {
            if let (Some(prev), Some(curr)) = (pair[0].get(idx), pair[1].get(idx)) {
                total += curr.distance(prev);
                count += 1;
            }
        }
    }
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

/// Coefficient of variation of the per-frame mean movement.
fn tempo_variation(sequence: &[LandmarkFrame]) -> f64 {
    if sequence.len() < 3 {
        return 0.0;
    }
    let movements: Vec<f64> = sequence
        .windows(2)
        .filter_map(|pair| {
            let (prev, curr) = (&pair[0], &pair[1]);
            let n = prev.landmarks.len().min(curr.landmarks.len());
            if n == 0 {
                return None;
            }
            let sum: f64 = (0..n)
                .map(|i| curr.landmarks[i].distance(&prev.landmarks[i]))
                .sum();
            Some(sum / n as f64)
        })
        .collect();
    if movements.len() < 2 {
        return 0.0;
    }
    let mean = movements.iter().sum::<f64>() / movements.len() as f64;
    if mean <= 0.0 {
        return 0.0;
    }
    let variance = movements.iter().map(|m| (m - mean).powi(2)).sum::<f64>() / movements.len() as f64;
    variance.sqrt() / mean
}

#[cfg(test)]
mod tests {
    use super::*;
    use formscore_api::Landmark;

    fn frame_at(dy: f64) -> LandmarkFrame {
        let lms = (0..LandmarkIndex::COUNT)
            .map(|i| Landmark::new(0.3 + i as f64 * 0.02, 0.2 + i as f64 * 0.05 + dy, 1.0))
            .collect();
        LandmarkFrame::new(lms, 0.0)
    }

    #[test]
    fn empty_sequence_is_all_zero() {
        assert_eq!(movement_metrics(&[]), MovementMetrics::default());
    }

    #[test]
    fn still_pose_is_stable_symmetric_and_steady() {
        let seq = vec![frame_at(0.0), frame_at(0.0), frame_at(0.0)];
        let m = movement_metrics(&seq);
        assert_eq!(m.stability, 100.0);
        assert_eq!(m.symmetry, 100.0);
        assert_eq!(m.tempo, 100.0);
        // 0.2 .. 0.8 across the 13 landmarks
        assert_eq!(m.range_of_motion, 60.0);
    }

    #[test]
    fn uniform_motion_keeps_tempo() {
        let seq = vec![frame_at(0.0), frame_at(0.01), frame_at(0.02), frame_at(0.03)];
        let m = movement_metrics(&seq);
        assert_eq!(m.tempo, 100.0);
        assert_eq!(m.stability, 99.0);
        assert_eq!(m.symmetry, 100.0);
    }

    #[test]
    fn jerky_motion_lowers_tempo() {
        let seq = vec![frame_at(0.0), frame_at(0.001), frame_at(0.1), frame_at(0.101)];
        let m = movement_metrics(&seq);
        assert!(m.tempo < 100.0);
    }
}
