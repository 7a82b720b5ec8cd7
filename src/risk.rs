//! Supplier risk scoring.
//!
//! Every survey question is answered `N` (risk factor absent, 0.0) or `Y`
//! (present, 0.1). A dimension sums its five answers and the risk index
//! sums the four dimensions, giving a score in [0.0, 2.0].

use once_cell::sync::Lazy;

use crate::error::{SegmentError, SegmentResult};
use crate::types::{DimensionScore, RawSupplierRow, RiskDimension, SupplierRecord};
use crate::util::{non_empty, parse_f64_safe};

pub const PRICE_COLUMN: &str = "PRICEEACH";
pub const QUANTITY_COLUMN: &str = "QUANTITYORDERED";

/// Survey column names in dimension order, `AVAILABILITY_Q1` first.
pub static SURVEY_COLUMNS: Lazy<Vec<(RiskDimension, usize, String)>> = Lazy::new(|| {
    RiskDimension::ALL
        .iter()
        .flat_map(|&dim| (0..RiskDimension::QUESTIONS).map(move |q| (dim, q, dim.question_column(q + 1))))
        .collect()
});

/// Read one survey answer. `true` means the risk factor is present.
pub fn parse_answer(raw: Option<&str>, key: &str, field: &str) -> SegmentResult<bool> {
    match non_empty(raw) {
        None => Err(SegmentError::missing(key, field)),
        Some("N") => Ok(false),
        Some("Y") => Ok(true),
        Some(other) => Err(SegmentError::InvalidCategory {
            key: key.to_string(),
            field: field.to_string(),
            value: other.to_string(),
        }),
    }
}

fn parse_amount(raw: Option<&str>, key: &str, field: &str) -> SegmentResult<f64> {
    let text = non_empty(raw).ok_or_else(|| SegmentError::missing(key, field))?;
    let v = parse_f64_safe(Some(text))
        .ok_or_else(|| SegmentError::invalid_input(key, format!("{} is not a number ('{}')", field, text)))?;
    if v < 0.0 {
        return Err(SegmentError::invalid_input(key, format!("{} is negative ({})", field, v)));
    }
    Ok(v)
}

/// Score one survey row. Rows with empty cells are rejected even though the
/// loader already drops incomplete rows.
pub fn score_supplier(raw: &RawSupplierRow) -> SegmentResult<SupplierRecord> {
    let key = raw.supplier_id.trim();
    if key.is_empty() {
        return Err(SegmentError::missing("<unnamed supplier>", "SUPPLIER"));
    }

    let mut dimensions = [DimensionScore::default(); 4];
    for (dim, q, column) in SURVEY_COLUMNS.iter() {
        let answer = raw.answers[dim.index()][*q].as_deref();
        if parse_answer(answer, key, column)? {
            dimensions[dim.index()].present += 1;
        }
    }

    Ok(SupplierRecord {
        supplier_id: key.to_string(),
        dimensions,
        unit_price: parse_amount(raw.price_each.as_deref(), key, PRICE_COLUMN)?,
        quantity: parse_amount(raw.quantity_ordered.as_deref(), key, QUANTITY_COLUMN)?,
    })
}

/// Score every row, stopping at the first invalid one.
pub fn score_all(rows: &[RawSupplierRow]) -> SegmentResult<Vec<SupplierRecord>> {
    rows.iter().map(score_supplier).collect()
}
