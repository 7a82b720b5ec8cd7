//! Kraljic's matrix: place each supplier in one of four quadrants from its
//! purchase value (against the dataset median) and its risk index (against
//! a fixed cutoff).

use tracing::debug;

use crate::error::{SegmentError, SegmentResult};
use crate::types::{KraljicResult, Quadrant, SupplierRecord};
use crate::util::median;

pub const DEFAULT_RISK_CUTOFF: f64 = 1.0;

impl Quadrant {
    /// The four comparison outcomes map to exactly one quadrant each.
    pub fn classify(value: f64, value_median: f64, risk_index: f64, risk_cutoff: f64) -> Quadrant {
        let high_value = value >= value_median;
        let high_risk = risk_index >= risk_cutoff;
        match (high_value, high_risk) {
            (true, true) => Quadrant::Strategic,
            (true, false) => Quadrant::Leverage,
            (false, false) => Quadrant::NonCritical,
            (false, true) => Quadrant::Bottleneck,
        }
    }
}

/// One supplier's position on the matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct SupplierPosition {
    pub supplier_id: String,
    pub value: f64,
    pub risk_index: f64,
}

impl From<&SupplierRecord> for SupplierPosition {
    fn from(s: &SupplierRecord) -> Self {
        SupplierPosition {
            supplier_id: s.supplier_id.clone(),
            value: s.value(),
            risk_index: s.risk_index(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct KraljicOutcome {
    /// `None` for an empty input set.
    pub value_median: Option<f64>,
    pub results: Vec<KraljicResult>,
}

/// Classify every supplier. The value median is computed once over the full
/// input before any supplier is placed. Non-finite values or risk indices
/// are rejected rather than left unlabeled.
pub fn classify(positions: &[SupplierPosition], risk_cutoff: f64) -> SegmentResult<KraljicOutcome> {
    if !risk_cutoff.is_finite() {
        return Err(SegmentError::invalid_input("risk_cutoff", format!("not finite ({})", risk_cutoff)));
    }
    if positions.is_empty() {
        return Ok(KraljicOutcome {
            value_median: None,
            results: Vec::new(),
        });
    }

    for p in positions {
        if !p.value.is_finite() {
            return Err(SegmentError::invalid_input(&p.supplier_id, format!("value is not finite ({})", p.value)));
        }
        if !p.risk_index.is_finite() {
            return Err(SegmentError::invalid_input(
                &p.supplier_id,
                format!("risk index is not finite ({})", p.risk_index),
            ));
        }
    }

    let value_median = median(positions.iter().map(|p| p.value).collect());
    debug!(suppliers = positions.len(), value_median, risk_cutoff, "kraljic median computed");

    let results = positions
        .iter()
        .map(|p| KraljicResult {
            supplier_id: p.supplier_id.clone(),
            value: p.value,
            risk_index: p.risk_index,
            quadrant: Quadrant::classify(p.value, value_median, p.risk_index, risk_cutoff),
        })
        .collect();

    Ok(KraljicOutcome {
        value_median: Some(value_median),
        results,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(id: &str, value: f64, risk: f64) -> SupplierPosition {
        SupplierPosition {
            supplier_id: id.to_string(),
            value,
            risk_index: risk,
        }
    }

    #[test]
    fn quadrant_table() {
        assert_eq!(Quadrant::classify(500.0, 400.0, 1.2, 1.0), Quadrant::Strategic);
        assert_eq!(Quadrant::classify(500.0, 400.0, 0.8, 1.0), Quadrant::Leverage);
        assert_eq!(Quadrant::classify(300.0, 400.0, 0.8, 1.0), Quadrant::NonCritical);
        assert_eq!(Quadrant::classify(300.0, 400.0, 1.2, 1.0), Quadrant::Bottleneck);
        // Ties go to the high side of both axes.
        assert_eq!(Quadrant::classify(400.0, 400.0, 1.0, 1.0), Quadrant::Strategic);
    }

    #[test]
    fn risk_cutoff_boundary_flips_deterministically() {
        assert_eq!(Quadrant::classify(500.0, 400.0, 0.99, 1.0), Quadrant::Leverage);
        assert_eq!(Quadrant::classify(500.0, 400.0, 1.0, 1.0), Quadrant::Strategic);
        assert_eq!(Quadrant::classify(100.0, 400.0, 0.99, 1.0), Quadrant::NonCritical);
        assert_eq!(Quadrant::classify(100.0, 400.0, 1.0, 1.0), Quadrant::Bottleneck);
    }

    #[test]
    fn median_is_taken_over_whole_dataset() {
        let input = vec![
            pos("s1", 500.0, 1.2),
            pos("s2", 300.0, 0.4),
            pos("s3", 400.0, 0.8),
            pos("s4", 350.0, 1.5),
            pos("s5", 450.0, 0.3),
        ];
        let out = classify(&input, DEFAULT_RISK_CUTOFF).unwrap();
        assert_eq!(out.value_median, Some(400.0));
        let quadrants: Vec<Quadrant> = out.results.iter().map(|r| r.quadrant).collect();
        assert_eq!(
            quadrants,
            vec![
                Quadrant::Strategic,
                Quadrant::NonCritical,
                Quadrant::Leverage,
                Quadrant::Bottleneck,
                Quadrant::Leverage,
            ]
        );
    }

    #[test]
    fn every_supplier_gets_one_quadrant() {
        let input: Vec<SupplierPosition> = (0..40)
            .map(|i| pos(&format!("s{}", i), (i * 37 % 11) as f64 * 100.0, (i % 21) as f64 / 10.0))
            .collect();
        let out = classify(&input, DEFAULT_RISK_CUTOFF).unwrap();
        assert_eq!(out.results.len(), input.len());
        let counted: usize = Quadrant::ALL
            .iter()
            .map(|q| out.results.iter().filter(|r| r.quadrant == *q).count())
            .sum();
        assert_eq!(counted, input.len());
    }

    #[test]
    fn nan_is_rejected_not_defaulted() {
        let input = vec![pos("ok", 1.0, 0.5), pos("broken", f64::NAN, 0.5)];
        match classify(&input, DEFAULT_RISK_CUTOFF) {
            Err(SegmentError::InvalidInput { key, .. }) => assert_eq!(key, "broken"),
            other => panic!("expected InvalidInput, got {:?}", other),
        }
        let input = vec![pos("r", 1.0, f64::INFINITY)];
        assert!(classify(&input, DEFAULT_RISK_CUTOFF).is_err());
    }

    #[test]
    fn empty_input_has_no_median() {
        let out = classify(&[], DEFAULT_RISK_CUTOFF).unwrap();
        assert_eq!(out.value_median, None);
        assert!(out.results.is_empty());
    }
}
