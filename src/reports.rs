use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet};

use crate::abc::AbcThresholds;
use crate::kraljic::KraljicOutcome;
use crate::loader::LoadReport;
use crate::types::{
    AbcResult, AbcRow, CompositeTier, CountryProduct, KraljicResult, KraljicRow, MixSummaryRow,
    MultiCriteriaResult, ProductMixRow, ProductSummary, Quadrant, QuadrantSummaryRow, RiskDimension,
    RiskDistributionRow, StoreMixCountRow, StoreMixRow, SupplierRecord, SupplierSummary, Tier,
    TierSummaryRow,
};
use crate::util::{average, describe};

pub fn abc_rows(results: &[AbcResult<String>]) -> Vec<AbcRow> {
    results
        .iter()
        .map(|r| AbcRow {
            product_code: r.key.clone(),
            total_sales: r.metric_value,
            share: r.share,
            cumulative_share: r.cumulative_share,
            category: r.tier,
        })
        .collect()
}

/// Product count and mean metric per tier. All three tiers are listed,
/// including empty ones.
pub fn tier_summary<K>(results: &[AbcResult<K>]) -> Vec<TierSummaryRow> {
    Tier::ALL
        .iter()
        .map(|&tier| {
            let values: Vec<f64> = results
                .iter()
                .filter(|r| r.tier == tier)
                .map(|r| r.metric_value)
                .collect();
            TierSummaryRow {
                category: tier,
                count: values.len(),
                mean_total_sales: average(&values),
            }
        })
        .collect()
}

pub fn product_mix_rows(results: &[MultiCriteriaResult<String>]) -> Vec<ProductMixRow> {
    results
        .iter()
        .map(|r| ProductMixRow {
            sku: r.key.clone(),
            sales: r.sales,
            revenue: r.revenue,
            sales_category: r.sales_tier,
            revenue_category: r.revenue_tier,
            product_mix: r.composite,
        })
        .collect()
}

/// Count, mean quantity and mean revenue per composite tier that occurs.
pub fn mix_summary<K>(results: &[MultiCriteriaResult<K>]) -> Vec<MixSummaryRow> {
    let mut acc: BTreeMap<CompositeTier, (Vec<f64>, Vec<f64>)> = BTreeMap::new();
    for r in results {
        let e = acc.entry(r.composite).or_default();
        e.0.push(r.sales);
        e.1.push(r.revenue);
    }
    acc.into_iter()
        .map(|(product_mix, (sales, revenue))| MixSummaryRow {
            product_mix,
            count: sales.len(),
            mean_sales: average(&sales),
            mean_revenue: average(&revenue),
        })
        .collect()
}

pub fn store_mix_rows(results: &[MultiCriteriaResult<CountryProduct>]) -> Vec<StoreMixRow> {
    results
        .iter()
        .map(|r| StoreMixRow {
            store: r.partition.clone().unwrap_or_else(|| r.key.country.clone()),
            sku: r.key.product_id.clone(),
            sales: r.sales,
            revenue: r.revenue,
            sales_category: r.sales_tier,
            revenue_category: r.revenue_tier,
            product_mix: r.composite,
        })
        .collect()
}

/// Number of products per (country, composite tier).
pub fn store_mix_counts(results: &[MultiCriteriaResult<CountryProduct>]) -> Vec<StoreMixCountRow> {
    let mut counts: BTreeMap<(String, CompositeTier), usize> = BTreeMap::new();
    for r in results {
        *counts.entry((r.key.country.clone(), r.composite)).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|((store, product_mix), sku_count)| StoreMixCountRow {
            store,
            product_mix,
            sku_count,
        })
        .collect()
}

pub fn country_mix(counts: &[StoreMixCountRow], country: &str) -> Vec<StoreMixCountRow> {
    counts.iter().filter(|r| r.store == country).cloned().collect()
}

/// Join scored suppliers with their quadrant. Both slices are in the same
/// order because the classifier preserves input order.
pub fn kraljic_rows(suppliers: &[SupplierRecord], results: &[KraljicResult]) -> Vec<KraljicRow> {
    suppliers
        .iter()
        .zip(results.iter())
        .map(|(s, k)| KraljicRow {
            supplier: k.supplier_id.clone(),
            availability: s.dimension(RiskDimension::Availability),
            suppliers: s.dimension(RiskDimension::Suppliers),
            product_complexity: s.dimension(RiskDimension::ProductComplexity),
            price_stability: s.dimension(RiskDimension::PriceStability),
            risk_index: k.risk_index,
            value: k.value,
            category: k.quadrant,
        })
        .collect()
}

pub fn quadrant_summary(results: &[KraljicResult]) -> Vec<QuadrantSummaryRow> {
    Quadrant::ALL
        .iter()
        .map(|&q| QuadrantSummaryRow {
            category: q,
            count: results.iter().filter(|r| r.quadrant == q).count(),
        })
        .collect()
}

/// Supplier count per distinct risk index, lowest risk first.
pub fn risk_distribution(results: &[KraljicResult]) -> Vec<RiskDistributionRow> {
    // Risk indices are multiples of 0.1, so tenths make an exact key.
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for r in results {
        *counts.entry((r.risk_index * 10.0).round() as i64).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|(tenths, count)| RiskDistributionRow {
            risk_index: tenths as f64 / 10.0,
            count,
        })
        .collect()
}

pub fn generate_product_summary(
    load: &LoadReport,
    thresholds: &AbcThresholds,
    abc: &[AbcResult<String>],
    mix: &[MultiCriteriaResult<String>],
    store_mix: &[MultiCriteriaResult<CountryProduct>],
) -> ProductSummary {
    let countries: BTreeSet<&str> = store_mix.iter().map(|r| r.key.country.as_str()).collect();
    let mut abc_counts = BTreeMap::new();
    for row in tier_summary(abc) {
        abc_counts.insert(row.category.to_string(), row.count);
    }
    let mut product_mix_counts: BTreeMap<String, usize> =
        CompositeTier::all().iter().map(|c| (c.to_string(), 0)).collect();
    for row in mix_summary(mix) {
        product_mix_counts.insert(row.product_mix.to_string(), row.count);
    }
    ProductSummary {
        generated_at: Utc::now(),
        load: load.clone(),
        thresholds: *thresholds,
        total_products: abc.len(),
        total_countries: countries.len(),
        abc_counts,
        product_mix_counts,
        store_level_rows: store_mix.len(),
    }
}

pub fn generate_supplier_summary(load: &LoadReport, risk_cutoff: f64, outcome: &KraljicOutcome) -> SupplierSummary {
    let values: Vec<f64> = outcome.results.iter().map(|r| r.value).collect();
    let mut quadrant_counts = BTreeMap::new();
    for row in quadrant_summary(&outcome.results) {
        quadrant_counts.insert(row.category.to_string(), row.count);
    }
    SupplierSummary {
        generated_at: Utc::now(),
        load: load.clone(),
        risk_cutoff,
        value_median: outcome.value_median,
        value_stats: describe(&values),
        quadrant_counts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DimensionScore;

    fn abc(key: &str, value: f64, tier: Tier) -> AbcResult<String> {
        AbcResult {
            key: key.to_string(),
            metric_value: value,
            share: 0.0,
            cumulative_share: 0.0,
            tier,
        }
    }

    fn store(country: &str, product: &str, sales: Tier, revenue: Tier) -> MultiCriteriaResult<CountryProduct> {
        MultiCriteriaResult {
            partition: Some(country.to_string()),
            key: CountryProduct {
                country: country.to_string(),
                product_id: product.to_string(),
            },
            sales: 1.0,
            revenue: 2.0,
            sales_tier: sales,
            revenue_tier: revenue,
            composite: CompositeTier { sales, revenue },
        }
    }

    fn kraljic(id: &str, value: f64, risk: f64, quadrant: Quadrant) -> KraljicResult {
        KraljicResult {
            supplier_id: id.to_string(),
            value,
            risk_index: risk,
            quadrant,
        }
    }

    #[test]
    fn tier_summary_lists_every_tier() {
        let results = vec![abc("P1", 100.0, Tier::A), abc("P2", 30.0, Tier::C), abc("P3", 10.0, Tier::C)];
        let rows = tier_summary(&results);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].count, 1);
        assert_eq!(rows[1].count, 0);
        assert_eq!(rows[1].mean_total_sales, 0.0);
        assert_eq!(rows[2].count, 2);
        assert_eq!(rows[2].mean_total_sales, 20.0);
    }

    #[test]
    fn store_counts_group_by_country_and_mix() {
        let results = vec![
            store("Australia", "P1", Tier::A, Tier::A),
            store("Australia", "P2", Tier::A, Tier::A),
            store("Australia", "P3", Tier::C, Tier::B),
            store("USA", "P1", Tier::A, Tier::A),
        ];
        let counts = store_mix_counts(&results);
        assert_eq!(counts.len(), 3);
        assert_eq!(counts[0].store, "Australia");
        assert_eq!(counts[0].product_mix.to_string(), "A_A");
        assert_eq!(counts[0].sku_count, 2);

        let australia = country_mix(&counts, "Australia");
        assert_eq!(australia.len(), 2);
        assert!(country_mix(&counts, "Spain").is_empty());
    }

    #[test]
    fn quadrant_summary_uses_fixed_order() {
        let results = vec![
            kraljic("a", 10.0, 1.2, Quadrant::Bottleneck),
            kraljic("b", 90.0, 0.2, Quadrant::Leverage),
            kraljic("c", 80.0, 0.3, Quadrant::Leverage),
        ];
        let rows = quadrant_summary(&results);
        let counts: Vec<usize> = rows.iter().map(|r| r.count).collect();
        assert_eq!(counts, vec![0, 2, 0, 1]);
        assert_eq!(rows[2].category.to_string(), "non-critical");
    }

    #[test]
    fn risk_distribution_groups_equal_indices() {
        let results = vec![
            kraljic("a", 1.0, 0.7, Quadrant::NonCritical),
            kraljic("b", 1.0, 1.2, Quadrant::Bottleneck),
            kraljic("c", 1.0, 0.7, Quadrant::NonCritical),
        ];
        let rows = risk_distribution(&results);
        assert_eq!(rows, vec![
            RiskDistributionRow { risk_index: 0.7, count: 2 },
            RiskDistributionRow { risk_index: 1.2, count: 1 },
        ]);
    }

    #[test]
    fn kraljic_rows_carry_dimension_scores() {
        let supplier = SupplierRecord {
            supplier_id: "Acme".to_string(),
            dimensions: [
                DimensionScore { present: 5 },
                DimensionScore { present: 2 },
                DimensionScore { present: 0 },
                DimensionScore { present: 3 },
            ],
            unit_price: 10.0,
            quantity: 50.0,
        };
        let result = kraljic("Acme", 500.0, supplier.risk_index(), Quadrant::Strategic);
        let rows = kraljic_rows(&[supplier], &[result]);
        assert_eq!(rows[0].availability, 0.5);
        assert_eq!(rows[0].suppliers, 0.2);
        assert_eq!(rows[0].risk_index, 1.0);
        assert_eq!(rows[0].category, Quadrant::Strategic);
    }

    #[test]
    fn empty_inputs_produce_empty_or_zero_tables() {
        let abc_results: Vec<AbcResult<String>> = Vec::new();
        assert!(abc_rows(&abc_results).is_empty());
        assert!(tier_summary(&abc_results).iter().all(|r| r.count == 0));
        assert!(store_mix_counts(&[]).is_empty());
        assert!(risk_distribution(&[]).is_empty());

        let outcome = KraljicOutcome {
            value_median: None,
            results: Vec::new(),
        };
        let summary = generate_supplier_summary(&LoadReport::default(), 1.0, &outcome);
        assert_eq!(summary.value_stats.count, 0);
        assert_eq!(summary.quadrant_counts["strategic"], 0);
    }
}
