//! ABC analysis: rank keys by a single metric and cut the cumulative share
//! into tiers A, B and C.

use serde::Serialize;
use std::cmp::Ordering;
use std::fmt::Display;

use tracing::debug;

use crate::error::{SegmentError, SegmentResult};
use crate::types::{AbcResult, Tier};

/// Absolute slack applied to tier boundary comparisons so that float
/// accumulation cannot push an exact boundary share into the next tier.
const SHARE_TOLERANCE: f64 = 1e-9;

/// Cumulative-share cutoffs. A key is tier A while its cumulative share is
/// at most `a`, tier B while at most `b`, tier C otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AbcThresholds {
    pub a: f64,
    pub b: f64,
}

impl Default for AbcThresholds {
    fn default() -> Self {
        AbcThresholds { a: 0.7, b: 0.9 }
    }
}

impl AbcThresholds {
    pub fn new(a: f64, b: f64) -> SegmentResult<Self> {
        let t = AbcThresholds { a, b };
        t.validate()?;
        Ok(t)
    }

    /// Requires `0 < a < b < 1`.
    pub fn validate(&self) -> SegmentResult<()> {
        let ok = self.a.is_finite() && self.b.is_finite() && 0.0 < self.a && self.a < self.b && self.b < 1.0;
        if ok {
            Ok(())
        } else {
            Err(SegmentError::invalid_input(
                "abc_thresholds",
                format!("expected 0 < A < B < 1, got A={} B={}", self.a, self.b),
            ))
        }
    }

    pub fn tier_for(&self, cumulative_share: f64) -> Tier {
        if cumulative_share <= self.a + SHARE_TOLERANCE {
            Tier::A
        } else if cumulative_share <= self.b + SHARE_TOLERANCE {
            Tier::B
        } else {
            Tier::C
        }
    }
}

/// Classify `(key, metric)` pairs.
///
/// Pairs are sorted by metric descending, ties broken by key ascending, and
/// the result comes back in that order. Empty input returns an empty result.
/// Negative or non-finite metrics, a zero total and a total too large to
/// represent are rejected.
pub fn classify<K>(items: &[(K, f64)], thresholds: &AbcThresholds) -> SegmentResult<Vec<AbcResult<K>>>
where
    K: Ord + Clone + Display,
{
    thresholds.validate()?;
    if items.is_empty() {
        return Ok(Vec::new());
    }

    for (key, value) in items {
        if !value.is_finite() {
            return Err(SegmentError::invalid_input(key.to_string(), format!("metric is not finite ({})", value)));
        }
        if *value < 0.0 {
            return Err(SegmentError::invalid_input(key.to_string(), format!("metric is negative ({})", value)));
        }
    }

    let total: f64 = items.iter().map(|(_, v)| v).sum();
    if !total.is_finite() {
        return Err(SegmentError::invalid_input(
            items[0].0.to_string(),
            format!("metric total overflows ({})", total),
        ));
    }
    if total <= 0.0 {
        return Err(SegmentError::invalid_input(
            items[0].0.to_string(),
            "metric total is zero; shares are undefined",
        ));
    }

    let mut ranked: Vec<&(K, f64)> = items.iter().collect();
    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });

    let mut running = 0.0;
    let results: Vec<AbcResult<K>> = ranked
        .into_iter()
        .map(|(key, value)| {
            running += value;
            let cumulative_share = running / total;
            AbcResult {
                key: key.clone(),
                metric_value: *value,
                share: value / total,
                cumulative_share,
                tier: thresholds.tier_for(cumulative_share),
            }
        })
        .collect();

    debug!(
        keys = results.len(),
        total,
        a = results.iter().filter(|r| r.tier == Tier::A).count(),
        b = results.iter().filter(|r| r.tier == Tier::B).count(),
        "abc classification complete"
    );
    Ok(results)
}
