use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use tabled::Tabled;

use crate::abc::AbcThresholds;
use crate::loader::LoadReport;
use crate::util::{display_money, display_score, display_share};

// ---------------------------------------------------------------------------
// Raw input rows
// ---------------------------------------------------------------------------

/// One sales CSV row as read from disk. Only the columns the product
/// segmentation needs are mapped; every other column is ignored.
#[derive(Debug, Deserialize)]
pub struct RawSalesRow {
    #[serde(rename = "PRODUCTCODE")]
    pub product_code: Option<String>,
    #[serde(rename = "COUNTRY")]
    pub country: Option<String>,
    #[serde(rename = "QUANTITYORDERED")]
    pub quantity_ordered: Option<String>,
    #[serde(rename = "SALES")]
    pub sales: Option<String>,
}

/// The four supplier-survey risk dimensions. Each has five Y/N questions
/// stored in columns `<PREFIX>_Q1` .. `<PREFIX>_Q5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RiskDimension {
    Availability,
    Suppliers,
    ProductComplexity,
    PriceStability,
}

impl RiskDimension {
    pub const ALL: [RiskDimension; 4] = [
        RiskDimension::Availability,
        RiskDimension::Suppliers,
        RiskDimension::ProductComplexity,
        RiskDimension::PriceStability,
    ];

    pub const QUESTIONS: usize = 5;

    pub fn column_prefix(self) -> &'static str {
        match self {
            RiskDimension::Availability => "AVAILABILITY",
            RiskDimension::Suppliers => "SUPPLIERS",
            RiskDimension::ProductComplexity => "PRODUCT_COMPLEXITY",
            RiskDimension::PriceStability => "PRICE_STABILITY",
        }
    }

    pub fn index(self) -> usize {
        match self {
            RiskDimension::Availability => 0,
            RiskDimension::Suppliers => 1,
            RiskDimension::ProductComplexity => 2,
            RiskDimension::PriceStability => 3,
        }
    }

    /// Column name of question `q` (1-based).
    pub fn question_column(self, q: usize) -> String {
        format!("{}_Q{}", self.column_prefix(), q)
    }
}

/// A supplier survey row before scoring. Answers are kept as the raw
/// strings so the scorer can reject anything outside the N/Y domain.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSupplierRow {
    pub supplier_id: String,
    /// Indexed by `RiskDimension::index()`, then question 0..5.
    pub answers: [[Option<String>; 5]; 4],
    pub price_each: Option<String>,
    pub quantity_ordered: Option<String>,
}

// ---------------------------------------------------------------------------
// Domain records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    pub product_id: String,
    pub country: String,
    pub quantity: f64,
    pub sales_value: f64,
}

/// Grouping key for store-level analysis: a product within one country.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CountryProduct {
    pub country: String,
    pub product_id: String,
}

impl fmt::Display for CountryProduct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.country, self.product_id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregateGroup<K> {
    pub key: K,
    pub total_quantity: f64,
    pub total_revenue: f64,
}

/// Score of one risk dimension, kept as the number of risk factors present
/// (0..=5) so sums stay exact. Each present factor is worth 0.1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DimensionScore {
    pub present: u8,
}

impl DimensionScore {
    pub fn score(self) -> f64 {
        f64::from(self.present) / 10.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SupplierRecord {
    pub supplier_id: String,
    /// Indexed by `RiskDimension::index()`.
    pub dimensions: [DimensionScore; 4],
    pub unit_price: f64,
    pub quantity: f64,
}

impl SupplierRecord {
    pub fn dimension(&self, dim: RiskDimension) -> f64 {
        self.dimensions[dim.index()].score()
    }

    /// Sum of the four dimension scores, in [0.0, 2.0].
    pub fn risk_index(&self) -> f64 {
        let present: u32 = self.dimensions.iter().map(|d| u32::from(d.present)).sum();
        f64::from(present) / 10.0
    }

    pub fn value(&self) -> f64 {
        self.unit_price * self.quantity
    }
}

// ---------------------------------------------------------------------------
// Classification results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Tier {
    A,
    B,
    C,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::A, Tier::B, Tier::C];
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Tier::A => "A",
            Tier::B => "B",
            Tier::C => "C",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AbcResult<K> {
    pub key: K,
    pub metric_value: f64,
    pub share: f64,
    pub cumulative_share: f64,
    pub tier: Tier,
}

/// Pair of independently computed tiers, rendered as `"<sales>_<revenue>"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CompositeTier {
    pub sales: Tier,
    pub revenue: Tier,
}

impl CompositeTier {
    /// The nine possible composites in A_A, A_B, .. C_C order.
    pub fn all() -> Vec<CompositeTier> {
        Tier::ALL
            .iter()
            .flat_map(|&sales| Tier::ALL.iter().map(move |&revenue| CompositeTier { sales, revenue }))
            .collect()
    }
}

impl fmt::Display for CompositeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.sales, self.revenue)
    }
}

impl Serialize for CompositeTier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MultiCriteriaResult<K> {
    /// Set when the classification was run per sub-population (country).
    pub partition: Option<String>,
    pub key: K,
    pub sales: f64,
    pub revenue: f64,
    pub sales_tier: Tier,
    pub revenue_tier: Tier,
    pub composite: CompositeTier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Quadrant {
    Strategic,
    Leverage,
    NonCritical,
    Bottleneck,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::Strategic,
        Quadrant::Leverage,
        Quadrant::NonCritical,
        Quadrant::Bottleneck,
    ];
}

impl fmt::Display for Quadrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Quadrant::Strategic => "strategic",
            Quadrant::Leverage => "leverage",
            Quadrant::NonCritical => "non-critical",
            Quadrant::Bottleneck => "bottleneck",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct KraljicResult {
    pub supplier_id: String,
    pub value: f64,
    pub risk_index: f64,
    pub quadrant: Quadrant,
}

// ---------------------------------------------------------------------------
// Report rows (CSV + console preview)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct AbcRow {
    #[serde(rename = "PRODUCTCODE")]
    #[tabled(rename = "PRODUCTCODE")]
    pub product_code: String,
    #[serde(rename = "total_sales")]
    #[tabled(rename = "total_sales", display_with = "display_money")]
    pub total_sales: f64,
    #[serde(rename = "Share")]
    #[tabled(rename = "Share", display_with = "display_share")]
    pub share: f64,
    #[serde(rename = "CumulativeShare")]
    #[tabled(rename = "CumulativeShare", display_with = "display_share")]
    pub cumulative_share: f64,
    #[serde(rename = "Category")]
    #[tabled(rename = "Category")]
    pub category: Tier,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct TierSummaryRow {
    #[serde(rename = "Category")]
    #[tabled(rename = "Category")]
    pub category: Tier,
    #[serde(rename = "Count")]
    #[tabled(rename = "Count")]
    pub count: usize,
    #[serde(rename = "MeanTotalSales")]
    #[tabled(rename = "MeanTotalSales", display_with = "display_money")]
    pub mean_total_sales: f64,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ProductMixRow {
    #[serde(rename = "sku")]
    #[tabled(rename = "sku")]
    pub sku: String,
    #[serde(rename = "sales")]
    #[tabled(rename = "sales", display_with = "display_money")]
    pub sales: f64,
    #[serde(rename = "revenue")]
    #[tabled(rename = "revenue", display_with = "display_money")]
    pub revenue: f64,
    #[serde(rename = "sales_category")]
    #[tabled(rename = "sales_category")]
    pub sales_category: Tier,
    #[serde(rename = "revenue_category")]
    #[tabled(rename = "revenue_category")]
    pub revenue_category: Tier,
    #[serde(rename = "product_mix")]
    #[tabled(rename = "product_mix")]
    pub product_mix: CompositeTier,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct MixSummaryRow {
    #[serde(rename = "product_mix")]
    #[tabled(rename = "product_mix")]
    pub product_mix: CompositeTier,
    #[serde(rename = "Count")]
    #[tabled(rename = "Count")]
    pub count: usize,
    #[serde(rename = "MeanSales")]
    #[tabled(rename = "MeanSales", display_with = "display_money")]
    pub mean_sales: f64,
    #[serde(rename = "MeanRevenue")]
    #[tabled(rename = "MeanRevenue", display_with = "display_money")]
    pub mean_revenue: f64,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct StoreMixRow {
    #[serde(rename = "storeofsku")]
    #[tabled(rename = "storeofsku")]
    pub store: String,
    #[serde(rename = "sku")]
    #[tabled(rename = "sku")]
    pub sku: String,
    #[serde(rename = "sales")]
    #[tabled(rename = "sales", display_with = "display_money")]
    pub sales: f64,
    #[serde(rename = "revenue")]
    #[tabled(rename = "revenue", display_with = "display_money")]
    pub revenue: f64,
    #[serde(rename = "sales_category")]
    #[tabled(rename = "sales_category")]
    pub sales_category: Tier,
    #[serde(rename = "revenue_category")]
    #[tabled(rename = "revenue_category")]
    pub revenue_category: Tier,
    #[serde(rename = "product_mix")]
    #[tabled(rename = "product_mix")]
    pub product_mix: CompositeTier,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct StoreMixCountRow {
    #[serde(rename = "storeofsku")]
    #[tabled(rename = "storeofsku")]
    pub store: String,
    #[serde(rename = "product_mix")]
    #[tabled(rename = "product_mix")]
    pub product_mix: CompositeTier,
    #[serde(rename = "sku")]
    #[tabled(rename = "sku")]
    pub sku_count: usize,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct KraljicRow {
    #[serde(rename = "SUPPLIER")]
    #[tabled(rename = "SUPPLIER")]
    pub supplier: String,
    #[serde(rename = "AVAILABILITY")]
    #[tabled(rename = "AVAILABILITY", display_with = "display_score")]
    pub availability: f64,
    #[serde(rename = "SUPPLIERS")]
    #[tabled(rename = "SUPPLIERS", display_with = "display_score")]
    pub suppliers: f64,
    #[serde(rename = "PRODUCT_COMPLEXITY")]
    #[tabled(rename = "PRODUCT_COMPLEXITY", display_with = "display_score")]
    pub product_complexity: f64,
    #[serde(rename = "PRICE_STABILITY")]
    #[tabled(rename = "PRICE_STABILITY", display_with = "display_score")]
    pub price_stability: f64,
    #[serde(rename = "risk_index")]
    #[tabled(rename = "risk_index", display_with = "display_score")]
    pub risk_index: f64,
    #[serde(rename = "value")]
    #[tabled(rename = "value", display_with = "display_money")]
    pub value: f64,
    #[serde(rename = "category")]
    #[tabled(rename = "category")]
    pub category: Quadrant,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct QuadrantSummaryRow {
    #[serde(rename = "category")]
    #[tabled(rename = "category")]
    pub category: Quadrant,
    #[serde(rename = "Count")]
    #[tabled(rename = "Count")]
    pub count: usize,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct RiskDistributionRow {
    #[serde(rename = "risk_index")]
    #[tabled(rename = "risk_index", display_with = "display_score")]
    pub risk_index: f64,
    #[serde(rename = "Count")]
    #[tabled(rename = "Count")]
    pub count: usize,
}

/// `describe()`-style statistics over supplier value.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ValueStats {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub max: f64,
}

#[derive(Debug, Serialize)]
pub struct ProductSummary {
    pub generated_at: DateTime<Utc>,
    pub load: LoadReport,
    pub thresholds: AbcThresholds,
    pub total_products: usize,
    pub total_countries: usize,
    pub abc_counts: BTreeMap<String, usize>,
    pub product_mix_counts: BTreeMap<String, usize>,
    pub store_level_rows: usize,
}

#[derive(Debug, Serialize)]
pub struct SupplierSummary {
    pub generated_at: DateTime<Utc>,
    pub load: LoadReport,
    pub risk_cutoff: f64,
    pub value_median: Option<f64>,
    pub value_stats: ValueStats,
    pub quadrant_counts: BTreeMap<String, usize>,
}
