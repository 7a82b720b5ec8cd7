//! Group transaction records and reduce them to per-key totals.

use std::collections::HashMap;
use std::hash::Hash;

use crate::types::{AggregateGroup, CountryProduct, TransactionRecord};

/// Sum quantity and sales value for every distinct key produced by
/// `key_fn`. Output is sorted by key so reports are stable across runs.
pub fn aggregate<K, F>(records: &[TransactionRecord], key_fn: F) -> Vec<AggregateGroup<K>>
where
    K: Eq + Hash + Ord + Clone,
    F: Fn(&TransactionRecord) -> K,
{
    let mut map: HashMap<K, (f64, f64)> = HashMap::new();
    for r in records {
        let e = map.entry(key_fn(r)).or_insert((0.0, 0.0));
        e.0 += r.quantity;
        e.1 += r.sales_value;
    }
    let mut groups: Vec<AggregateGroup<K>> = map
        .into_iter()
        .map(|(key, (total_quantity, total_revenue))| AggregateGroup {
            key,
            total_quantity,
            total_revenue,
        })
        .collect();
    groups.sort_by(|a, b| a.key.cmp(&b.key));
    groups
}

pub fn by_product(records: &[TransactionRecord]) -> Vec<AggregateGroup<String>> {
    aggregate(records, |r| r.product_id.clone())
}

pub fn by_country_product(records: &[TransactionRecord]) -> Vec<AggregateGroup<CountryProduct>> {
    aggregate(records, |r| CountryProduct {
        country: r.country.clone(),
        product_id: r.product_id.clone(),
    })
}
