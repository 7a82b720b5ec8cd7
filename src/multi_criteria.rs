//! Multi-criteria ABC: classify every key on quantity and on revenue
//! independently, then pair the two tier letters into a composite.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt::Display;
use std::hash::Hash;

use tracing::debug;

use crate::abc::{self, AbcThresholds};
use crate::error::{SegmentError, SegmentResult};
use crate::types::{AggregateGroup, CompositeTier, MultiCriteriaResult, Tier};

/// Classify all groups as one population. Results follow the quantity
/// ranking (largest total quantity first). Every key must appear once.
pub fn classify<K>(
    groups: &[AggregateGroup<K>],
    thresholds: &AbcThresholds,
) -> SegmentResult<Vec<MultiCriteriaResult<K>>>
where
    K: Ord + Hash + Clone + Display,
{
    let mut seen = HashSet::with_capacity(groups.len());
    for g in groups {
        if !seen.insert(&g.key) {
            return Err(SegmentError::invalid_input(g.key.to_string(), "key appears in more than one group"));
        }
    }

    let sales: Vec<(K, f64)> = groups.iter().map(|g| (g.key.clone(), g.total_quantity)).collect();
    let revenue: Vec<(K, f64)> = groups.iter().map(|g| (g.key.clone(), g.total_revenue)).collect();

    let sales_abc = abc::classify(&sales, thresholds)?;
    let revenue_tiers: HashMap<K, (f64, Tier)> = abc::classify(&revenue, thresholds)?
        .into_iter()
        .map(|r| (r.key, (r.metric_value, r.tier)))
        .collect();

    let mut out = Vec::with_capacity(sales_abc.len());
    for s in sales_abc {
        let &(revenue, revenue_tier) = revenue_tiers
            .get(&s.key)
            .ok_or_else(|| SegmentError::invalid_input(s.key.to_string(), "no revenue tier"))?;
        out.push(MultiCriteriaResult {
            partition: None,
            key: s.key,
            sales: s.metric_value,
            revenue,
            sales_tier: s.tier,
            revenue_tier,
            composite: CompositeTier {
                sales: s.tier,
                revenue: revenue_tier,
            },
        });
    }
    Ok(out)
}

/// Classify each partition (e.g. country) on its own. A key's tiers in one
/// partition never depend on the groups of another. Partitions come back in
/// name order.
pub fn classify_partitioned<K, F>(
    groups: &[AggregateGroup<K>],
    partition_of: F,
    thresholds: &AbcThresholds,
) -> SegmentResult<Vec<MultiCriteriaResult<K>>>
where
    K: Ord + Hash + Clone + Display,
    F: Fn(&K) -> String,
{
    let mut partitions: BTreeMap<String, Vec<AggregateGroup<K>>> = BTreeMap::new();
    for g in groups {
        partitions.entry(partition_of(&g.key)).or_default().push(g.clone());
    }

    let mut out = Vec::with_capacity(groups.len());
    for (name, members) in partitions {
        debug!(partition = %name, keys = members.len(), "classifying partition");
        for mut r in classify(&members, thresholds)? {
            r.partition = Some(name.clone());
            out.push(r);
        }
    }
    Ok(out)
}
