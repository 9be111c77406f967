//! Pure functions mapping raw values and baseline statistics onto 0-100.
//!
//! Every function here is total: degenerate input (non-finite values,
//! non-positive means, empty baselines) yields the neutral score 50 rather
//! than an error.

use crate::baseline::RunningStat;
use crate::config::TransformParams;

pub const NEUTRAL_SCORE: f64 = 50.0;

/// Spread below this in log space is treated as no spread at all.
const MIN_LOG_SPREAD: f64 = 1e-6;

/// Result of scoring one metric against its baseline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatScore {
    pub score: f64,
    /// Present only when a real z-score (not the ratio fallback) was used.
    pub z: Option<f64>,
}

impl StatScore {
    pub fn neutral() -> Self {
        StatScore {
            score: NEUTRAL_SCORE,
            z: None,
        }
    }
}

/// `100 / (1 + e^(-k z))`: 50 at z = 0, strictly increasing, never reaches
/// 0 or 100 for finite z.
pub fn sigmoid_score(z: f64, k: f64) -> f64 {
    if z.is_nan() {
        return NEUTRAL_SCORE;
    }
    100.0 / (1.0 + (-k * z).exp())
}

/// z-score computed in `log1p` space for right-skewed metrics. The log-space
/// spread comes from the coefficient of variation (capped at `max_cv`) using
/// the log-normal relation `sigma^2 = ln(1 + cv^2)`.
pub fn log_z_score(value: f64, mean: f64, std_dev: f64, max_cv: f64) -> f64 {
    if !(value.is_finite() && mean.is_finite() && std_dev.is_finite()) || mean <= 0.0 {
        return 0.0;
    }
    let cv = (std_dev / mean).clamp(0.0, max_cv);
    let log_spread = (1.0 + cv * cv).ln().sqrt();
    if log_spread < MIN_LOG_SPREAD {
        return 0.0;
    }
    (value.max(0.0).ln_1p() - mean.ln_1p()) / log_spread
}

/// Scores `value` against a baseline. A z-score is used when the baseline
/// has at least `params.min_sample` observations and a standard deviation
/// above `params.meaningful_spread` of the mean; otherwise the ratio to the
/// mean is converted to an equivalent z with an assumed relative spread.
pub fn stat_score(
    value: f64,
    baseline_mean: f64,
    baseline: Option<&RunningStat>,
    use_log: bool,
    params: &TransformParams,
) -> StatScore {
    if !value.is_finite() || !baseline_mean.is_finite() || baseline_mean <= 0.0 {
        return StatScore::neutral();
    }

    if let Some(stat) = baseline {
        let std_dev = stat.std_dev();
        if stat.count >= params.min_sample && std_dev > params.meaningful_spread * baseline_mean {
            let z = if use_log {
                log_z_score(value, baseline_mean, std_dev, params.max_cv)
            } else {
                (value - baseline_mean) / std_dev
            };
            return StatScore {
                score: sigmoid_score(z, params.sigmoid_k),
                z: Some(z),
            };
        }
    }

    if params.assumed_relative_std <= 0.0 {
        return StatScore::neutral();
    }
    let equivalent_z = (value / baseline_mean - 1.0) / params.assumed_relative_std;
    StatScore {
        score: sigmoid_score(equivalent_z, params.sigmoid_k),
        z: None,
    }
}

/// Crowd control is only scored for champions whose baseline shows real CC
/// usage. `None` means "not a CC champion": neutral score, zero weight.
pub fn cc_score(cc_per_min: f64, baseline: &RunningStat, use_log: bool, params: &TransformParams) -> Option<StatScore> {
    if !baseline.mean.is_finite() || baseline.mean < params.cc_activity {
        return None;
    }
    Some(stat_score(cc_per_min, baseline.mean, Some(baseline), use_log, params))
}

/// Deaths per minute inside the optimal band score 100. Fewer deaths than
/// the band is mildly penalized (passive play); more is penalized steeply,
/// with up to `max_death_relief` of that penalty forgiven by a high
/// death-quality score.
pub fn death_score(deaths_per_min: f64, death_quality: Option<f64>, params: &TransformParams) -> f64 {
    if !deaths_per_min.is_finite() || deaths_per_min < 0.0 {
        return NEUTRAL_SCORE;
    }

    let penalty = if deaths_per_min < params.death_band_low {
        if params.death_band_low <= 0.0 {
            0.0
        } else {
            params.passive_penalty * (params.death_band_low - deaths_per_min) / params.death_band_low
        }
    } else if deaths_per_min > params.death_band_high {
        let excess = (deaths_per_min - params.death_band_high) * params.excess_death_slope;
        let relief = death_quality
            .filter(|q| q.is_finite())
            .map(|q| params.max_death_relief * q.clamp(0.0, 100.0) / 100.0)
            .unwrap_or(0.0);
        excess * (1.0 - relief)
    } else {
        0.0
    };

    (100.0 - penalty).clamp(0.0, 100.0)
}

/// Capped power curve: participation at or above `kp_optimal` is full marks.
pub fn kill_participation_score(kill_participation: Option<f64>, params: &TransformParams) -> f64 {
    let kp = match kill_participation {
        Some(kp) if kp.is_finite() && params.kp_optimal > 0.0 => kp,
        _ => return NEUTRAL_SCORE,
    };
    let ratio = (kp / params.kp_optimal).clamp(0.0, 1.0);
    100.0 * ratio.powf(params.kp_exponent)
}

/// Weight for a situational metric (healing, CC): zero while the champion's
/// baseline average sits below `activity`, ramping from
/// `situational_floor` to `situational_ceiling` up to three times the
/// threshold, then boosted when the metric's CV signals skill expression.
pub fn situational_relevance(stat: &RunningStat, activity: f64, params: &TransformParams) -> f64 {
    if !stat.mean.is_finite() || activity <= 0.0 || stat.mean < activity {
        return 0.0;
    }
    let ramp = ((stat.mean - activity) / (2.0 * activity)).clamp(0.0, 1.0);
    let mut weight = params.situational_floor + (params.situational_ceiling - params.situational_floor) * ramp;
    if stat.cv() >= params.high_cv {
        weight *= params.high_cv_boost;
    }
    weight.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> TransformParams {
        TransformParams::default()
    }

    #[test]
    fn sigmoid_is_centered_and_bounded() {
        let k = params().sigmoid_k;
        assert_eq!(sigmoid_score(0.0, k), 50.0);
        assert!(sigmoid_score(1.0, k) > sigmoid_score(0.5, k));
        assert!(sigmoid_score(10.0, k) <= 100.0);
        assert!(sigmoid_score(-10.0, k) >= 0.0);
        assert_eq!(sigmoid_score(f64::NAN, k), NEUTRAL_SCORE);
    }

    #[test]
    fn at_baseline_mean_scores_fifty() {
        let stat = RunningStat::new(200, 800.0, 250.0);
        for use_log in [false, true] {
            let s = stat_score(800.0, stat.mean, Some(&stat), use_log, &params());
            assert!((s.score - 50.0).abs() < 1e-9);
            assert_eq!(s.z, Some(0.0));
        }
    }

    #[test]
    fn stat_score_is_monotonic() {
        let stat = RunningStat::new(200, 800.0, 250.0);
        for use_log in [false, true] {
            let mut last = f64::NEG_INFINITY;
            for v in (0..40).map(|i| i as f64 * 50.0) {
                let s = stat_score(v, stat.mean, Some(&stat), use_log, &params()).score;
                assert!(s >= last, "score dropped at {}", v);
                last = s;
            }
        }
    }

    #[test]
    fn small_sample_uses_ratio_fallback() {
        let stat = RunningStat::new(5, 800.0, 250.0);
        let s = stat_score(1000.0, stat.mean, Some(&stat), false, &params());
        assert_eq!(s.z, None);
        assert!(s.score > 50.0);

        let flat = RunningStat::new(500, 800.0, 10.0);
        assert_eq!(stat_score(1000.0, 800.0, Some(&flat), false, &params()).z, None);
    }

    #[test]
    fn degenerate_means_are_neutral() {
        assert_eq!(stat_score(100.0, 0.0, None, false, &params()), StatScore::neutral());
        assert_eq!(stat_score(100.0, -5.0, None, true, &params()), StatScore::neutral());
        assert_eq!(stat_score(f64::NAN, 10.0, None, true, &params()), StatScore::neutral());
        assert_eq!(log_z_score(10.0, 0.0, 1.0, 1.5), 0.0);
        assert_eq!(log_z_score(10.0, 5.0, 0.0, 1.5), 0.0);
    }

    #[test]
    fn log_transform_softens_high_outliers() {
        let stat = RunningStat::new(500, 400.0, 400.0);
        let linear = stat_score(2400.0, stat.mean, Some(&stat), false, &params()).z.unwrap();
        let log = stat_score(2400.0, stat.mean, Some(&stat), true, &params()).z.unwrap();
        assert!(log < linear);
        assert!(log > 0.0);
    }

    #[test]
    fn cc_below_activity_threshold_is_ignored() {
        let low = RunningStat::new(500, 0.3, 0.2);
        assert_eq!(cc_score(5.0, &low, true, &params()), None);
        assert_eq!(cc_score(0.0, &low, true, &params()), None);

        let active = RunningStat::new(500, 4.0, 2.0);
        assert!(cc_score(6.0, &active, true, &params()).unwrap().score > 50.0);
    }

    #[test]
    fn death_tempo_rewards_the_band() {
        let p = params();
        assert_eq!(death_score(0.15, None, &p), 100.0);
        assert_eq!(death_score(0.0, None, &p), 100.0 - p.passive_penalty);
        assert!(death_score(0.4, None, &p) < death_score(0.3, None, &p));
        assert_eq!(death_score(2.0, None, &p), 0.0);
        assert_eq!(death_score(f64::NAN, None, &p), NEUTRAL_SCORE);
    }

    #[test]
    fn death_quality_reduces_excess_penalty() {
        let p = params();
        let plain = death_score(0.35, None, &p);
        let good_trades = death_score(0.35, Some(100.0), &p);
        assert!(good_trades > plain);
        assert!((100.0 - good_trades - (100.0 - plain) * 0.5).abs() < 1e-9);
    }

    #[test]
    fn kill_participation_caps_at_optimal() {
        let p = params();
        assert_eq!(kill_participation_score(Some(0.95), &p), 100.0);
        assert_eq!(kill_participation_score(Some(0.9), &p), 100.0);
        assert!(kill_participation_score(Some(0.45), &p) < 100.0);
        assert_eq!(kill_participation_score(Some(0.0), &p), 0.0);
        assert_eq!(kill_participation_score(None, &p), NEUTRAL_SCORE);
    }

    #[test]
    fn situational_weight_ramps_and_boosts() {
        let p = params();
        assert_eq!(situational_relevance(&RunningStat::new(500, 0.3, 0.1), p.cc_activity, &p), 0.0);
        let at = situational_relevance(&RunningStat::new(500, 0.5, 0.1), p.cc_activity, &p);
        let high = situational_relevance(&RunningStat::new(500, 3.0, 0.5), p.cc_activity, &p);
        let spread = situational_relevance(&RunningStat::new(500, 3.0, 4.0), p.cc_activity, &p);
        assert!((at - p.situational_floor).abs() < 1e-12);
        assert!(high > at);
        assert!(spread > high);
        assert!(spread <= 1.0);
    }
}
