use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Serialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{SegmentError, SegmentResult};
use crate::risk::{PRICE_COLUMN, QUANTITY_COLUMN, SURVEY_COLUMNS};
use crate::types::{RawSalesRow, RawSupplierRow, TransactionRecord};
use crate::util::{non_empty, parse_f64_safe};

pub const SALES_COLUMNS: [&str; 4] = ["PRODUCTCODE", "COUNTRY", "QUANTITYORDERED", "SALES"];
pub const DEFAULT_SUPPLIER_ID_COLUMN: &str = "SUPPLIER";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoadReport {
    pub total_rows: usize,
    pub duplicate_rows: usize,
    pub incomplete_rows: usize,
    pub loaded_rows: usize,
}

fn open(path: &Path) -> SegmentResult<File> {
    File::open(path).map_err(|e| {
        SegmentError::Io(std::io::Error::new(
            e.kind(),
            format!("failed to open '{}': {}", path.display(), e),
        ))
    })
}

fn column_index(headers: &StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h == name)
}

fn require_column(headers: &StringRecord, name: &str) -> SegmentResult<usize> {
    column_index(headers, name).ok_or_else(|| SegmentError::missing_column(name))
}

/// Walk every data record once, dropping rows identical to one already seen.
/// `setup` checks the header row before any record is read, so a header-only
/// file is validated too; its output is handed to `visit` together with the
/// 1-based data row number of each kept record.
fn for_each_unique<R, C, S, F>(reader: R, report: &mut LoadReport, setup: S, mut visit: F) -> SegmentResult<C>
where
    R: Read,
    S: FnOnce(&StringRecord) -> SegmentResult<C>,
    F: FnMut(usize, &C, &StringRecord) -> SegmentResult<()>,
{
    let mut rdr = ReaderBuilder::new().flexible(true).trim(Trim::All).from_reader(reader);
    let layout = setup(rdr.headers()?)?;
    let mut seen: HashSet<Vec<String>> = HashSet::new();

    for (idx, result) in rdr.records().enumerate() {
        let record = result?;
        report.total_rows += 1;
        let fingerprint: Vec<String> = record.iter().map(str::to_string).collect();
        if !seen.insert(fingerprint) {
            report.duplicate_rows += 1;
            continue;
        }
        visit(idx + 1, &layout, &record)?;
    }
    Ok(layout)
}

fn parse_number(raw: Option<&str>, key: &str, field: &str) -> SegmentResult<f64> {
    let text = non_empty(raw).ok_or_else(|| SegmentError::missing(key, field))?;
    parse_f64_safe(Some(text))
        .ok_or_else(|| SegmentError::invalid_input(key, format!("{} is not a number ('{}')", field, text)))
}

fn parse_sales_row(row: RawSalesRow, key: &str) -> SegmentResult<TransactionRecord> {
    let product_id = non_empty(row.product_code.as_deref())
        .ok_or_else(|| SegmentError::missing(key, "PRODUCTCODE"))?
        .to_string();
    let country = non_empty(row.country.as_deref())
        .ok_or_else(|| SegmentError::missing(key, "COUNTRY"))?
        .to_string();
    Ok(TransactionRecord {
        product_id,
        country,
        quantity: parse_number(row.quantity_ordered.as_deref(), key, "QUANTITYORDERED")?,
        sales_value: parse_number(row.sales.as_deref(), key, "SALES")?,
    })
}

/// Read the sales table. Duplicate rows are dropped; any other problem
/// (missing column, empty cell, unparsable number) fails the whole load.
pub fn read_sales<R: Read>(reader: R) -> SegmentResult<(Vec<TransactionRecord>, LoadReport)> {
    let mut report = LoadReport::default();
    let mut records = Vec::new();

    let check_headers = |headers: &StringRecord| -> SegmentResult<StringRecord> {
        for name in SALES_COLUMNS {
            require_column(headers, name)?;
        }
        Ok(headers.clone())
    };
    for_each_unique(reader, &mut report, check_headers, |row_no, headers, record| {
        let key = format!("line {}", row_no + 1);
        let raw: RawSalesRow = record.deserialize(Some(headers))?;
        records.push(parse_sales_row(raw, &key)?);
        Ok(())
    })?;

    report.loaded_rows = records.len();
    info!(
        total = report.total_rows,
        duplicates = report.duplicate_rows,
        loaded = report.loaded_rows,
        "sales table loaded"
    );
    Ok((records, report))
}

pub fn load_sales(path: &Path) -> SegmentResult<(Vec<TransactionRecord>, LoadReport)> {
    read_sales(open(path)?)
}

struct SupplierColumns {
    width: usize,
    id: Option<usize>,
    survey: Vec<usize>,
    price: usize,
    quantity: usize,
}

impl SupplierColumns {
    fn resolve(headers: &StringRecord, id_column: &str) -> SegmentResult<Self> {
        let survey = SURVEY_COLUMNS
            .iter()
            .map(|(_, _, name)| require_column(headers, name))
            .collect::<SegmentResult<Vec<usize>>>()?;
        let id = column_index(headers, id_column);
        if id.is_none() {
            debug!(id_column, "supplier id column absent; using row numbers");
        }
        Ok(SupplierColumns {
            width: headers.len(),
            id,
            survey,
            price: require_column(headers, PRICE_COLUMN)?,
            quantity: require_column(headers, QUANTITY_COLUMN)?,
        })
    }
}

/// Read the supplier survey table. Duplicate rows and rows with any empty
/// cell are dropped and counted; the remaining rows are returned unscored.
pub fn read_suppliers<R: Read>(reader: R, id_column: &str) -> SegmentResult<(Vec<RawSupplierRow>, LoadReport)> {
    let mut report = LoadReport::default();
    let mut rows = Vec::new();
    let mut incomplete = 0usize;

    let resolve = |headers: &StringRecord| SupplierColumns::resolve(headers, id_column);
    for_each_unique(reader, &mut report, resolve, |row_no, cols, record| {
        let short = record.len() < cols.width;
        if short || record.iter().any(|f| f.is_empty()) {
            incomplete += 1;
            return Ok(());
        }

        let cell = |idx: usize| record.get(idx).map(str::to_string);
        let mut raw = RawSupplierRow {
            supplier_id: match cols.id {
                Some(idx) => record.get(idx).unwrap_or_default().to_string(),
                None => format!("row-{}", row_no),
            },
            price_each: cell(cols.price),
            quantity_ordered: cell(cols.quantity),
            ..RawSupplierRow::default()
        };
        for ((dim, q, _), &idx) in SURVEY_COLUMNS.iter().zip(cols.survey.iter()) {
            raw.answers[dim.index()][*q] = cell(idx);
        }
        rows.push(raw);
        Ok(())
    })?;

    report.incomplete_rows = incomplete;
    report.loaded_rows = rows.len();
    info!(
        total = report.total_rows,
        duplicates = report.duplicate_rows,
        incomplete = report.incomplete_rows,
        loaded = report.loaded_rows,
        "supplier table loaded"
    );
    Ok((rows, report))
}

pub fn load_suppliers(path: &Path, id_column: &str) -> SegmentResult<(Vec<RawSupplierRow>, LoadReport)> {
    read_suppliers(open(path)?, id_column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MISSING_COLUMN_KEY;
    use crate::types::RiskDimension;

    const SALES_CSV: &str = "\
ORDERNUMBER,QUANTITYORDERED,PRICEEACH,SALES,PRODUCTCODE,COUNTRY
10107,30,95.7,2871,S10_1678,USA
10121,34,81.35,2765.9,S10_1678,France
10107,30,95.7,2871,S10_1678,USA
10134,41,94.74,\"3,884.34\",S10_1949,France
";

    fn supplier_header() -> String {
        let mut cols: Vec<String> = vec!["SUPPLIER".to_string()];
        cols.extend(SURVEY_COLUMNS.iter().map(|(_, _, name)| name.clone()));
        cols.push("PRICEEACH".to_string());
        cols.push("QUANTITYORDERED".to_string());
        cols.join(",")
    }

    fn supplier_line(id: &str, answer: &str, price: &str, qty: &str) -> String {
        let mut cells = vec![id.to_string()];
        cells.extend(std::iter::repeat(answer.to_string()).take(20));
        cells.push(price.to_string());
        cells.push(qty.to_string());
        cells.join(",")
    }

    #[test]
    fn sales_drop_exact_duplicates() {
        let (records, report) = read_sales(SALES_CSV.as_bytes()).unwrap();
        assert_eq!(report.total_rows, 4);
        assert_eq!(report.duplicate_rows, 1);
        assert_eq!(report.loaded_rows, 3);
        assert_eq!(records[2].product_id, "S10_1949");
        assert!((records[2].sales_value - 3884.34).abs() < 1e-9);
    }

    #[test]
    fn sales_missing_cell_fails_with_line() {
        let csv = "PRODUCTCODE,COUNTRY,QUANTITYORDERED,SALES\nP1,USA,3,10\nP2,,4,20\n";
        match read_sales(csv.as_bytes()) {
            Err(SegmentError::MissingData { key, field }) => {
                assert_eq!(key, "line 3");
                assert_eq!(field, "COUNTRY");
            }
            other => panic!("expected MissingData, got {:?}", other),
        }
    }

    #[test]
    fn sales_bad_number_is_invalid_input() {
        let csv = "PRODUCTCODE,COUNTRY,QUANTITYORDERED,SALES\nP1,USA,three,10\n";
        assert!(matches!(read_sales(csv.as_bytes()), Err(SegmentError::InvalidInput { .. })));
    }

    #[test]
    fn sales_missing_column_is_reported() {
        let csv = "PRODUCTCODE,QUANTITYORDERED,SALES\nP1,3,10\n";
        match read_sales(csv.as_bytes()) {
            Err(SegmentError::MissingData { field, .. }) => assert_eq!(field, "COUNTRY"),
            other => panic!("expected MissingData, got {:?}", other),
        }
    }

    #[test]
    fn empty_sales_table_loads_nothing() {
        let (records, report) = read_sales("PRODUCTCODE,COUNTRY,QUANTITYORDERED,SALES\n".as_bytes()).unwrap();
        assert!(records.is_empty());
        assert_eq!(report, LoadReport::default());
    }

    #[test]
    fn header_only_sales_table_still_needs_every_column() {
        match read_sales("PRODUCTCODE,SALES\n".as_bytes()) {
            Err(SegmentError::MissingData { key, field }) => {
                assert_eq!(key, MISSING_COLUMN_KEY);
                assert_eq!(field, "COUNTRY");
            }
            other => panic!("expected MissingData, got {:?}", other),
        }
    }

    #[test]
    fn missing_column_is_checked_before_rows() {
        // Row 2 has an empty cell, but the absent column is reported first.
        let csv = "PRODUCTCODE,QUANTITYORDERED,SALES\nP1,3,10\nP2,,4\n";
        let err = read_sales(csv.as_bytes()).unwrap_err();
        assert_eq!(err.to_string(), "Missing data for header: required column COUNTRY is absent");
    }

    #[test]
    fn suppliers_drop_duplicates_and_incomplete_rows() {
        let csv = [
            supplier_header(),
            supplier_line("Acme", "Y", "95.7", "30"),
            supplier_line("Acme", "Y", "95.7", "30"),
            supplier_line("Borealis", "N", "", "12"),
            supplier_line("Cobalt", "N", "20", "5"),
        ]
        .join("\n");
        let (rows, report) = read_suppliers(csv.as_bytes(), DEFAULT_SUPPLIER_ID_COLUMN).unwrap();
        assert_eq!(report.total_rows, 4);
        assert_eq!(report.duplicate_rows, 1);
        assert_eq!(report.incomplete_rows, 1);
        assert_eq!(report.loaded_rows, 2);
        assert_eq!(rows[0].supplier_id, "Acme");
        assert_eq!(rows[1].price_each.as_deref(), Some("20"));
        assert_eq!(
            rows[0].answers[RiskDimension::PriceStability.index()][4].as_deref(),
            Some("Y")
        );
    }

    #[test]
    fn suppliers_without_id_column_use_row_numbers() {
        let header = supplier_header().replacen("SUPPLIER,", "", 1);
        let line = supplier_line("", "N", "10", "2");
        let csv = format!("{}\n{}\n", header, &line[1..]);
        let (rows, _) = read_suppliers(csv.as_bytes(), DEFAULT_SUPPLIER_ID_COLUMN).unwrap();
        assert_eq!(rows[0].supplier_id, "row-1");
    }

    #[test]
    fn suppliers_require_survey_columns() {
        let csv = "SUPPLIER,PRICEEACH,QUANTITYORDERED\n";
        match read_suppliers(csv.as_bytes(), DEFAULT_SUPPLIER_ID_COLUMN) {
            Err(SegmentError::MissingData { field, .. }) => assert_eq!(field, "AVAILABILITY_Q1"),
            other => panic!("expected MissingData, got {:?}", other),
        }
    }
}
