//! Grouping and partitioning of mapped records for list views.

use serde::Serialize;

/// Non-persisted aggregate of same-key rows, used for list display and
/// batch operations. The first record encountered for a key supplies the
/// summary columns.
#[derive(Debug, Clone, Serialize)]
pub struct GroupedView<T> {
    pub key: String,
    pub items: Vec<T>,
    pub item_count: usize,
    pub display_item: T,
}

/// Groups records by a shared business key, preserving first-encounter
/// order of both groups and members.
pub fn group_by_key<T, F>(records: Vec<T>, key_fn: F) -> Vec<GroupedView<T>>
where
    T: Clone,
    F: Fn(&T) -> String,
{
    let mut order: Vec<String> = Vec::new();
    let mut buckets: std::collections::HashMap<String, Vec<T>> = std::collections::HashMap::new();
    for record in records {
        let key = key_fn(&record);
        if !buckets.contains_key(&key) {
            order.push(key.clone());
        }
        buckets.entry(key).or_default().push(record);
    }
    order
        .into_iter()
        .filter_map(|key| {
            let items = buckets.remove(&key)?;
            let display_item = items.first()?.clone();
            Some(GroupedView {
                key,
                item_count: items.len(),
                display_item,
                items,
            })
        })
        .collect()
}

/// Merges text fields across grouped rows into one `", "`-joined summary,
/// de-duplicating by case-sensitive substring containment: a candidate
/// already contained in the accumulated text is skipped.
pub fn merge_names<I, S>(names: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut merged = String::new();
    for name in names {
        let name = name.as_ref().trim();
        if name.is_empty() || merged.contains(name) {
            continue;
        }
        if !merged.is_empty() {
            merged.push_str(", ");
        }
        merged.push_str(name);
    }
    merged
}

/// Splits records into (pending, history) on the presence of a status or
/// actual-date field: empty means pending, non-empty means history. Always
/// recomputed from the full fetched set, never cached on its own.
pub fn partition_pending<T, F>(records: Vec<T>, settled_field: F) -> (Vec<T>, Vec<T>)
where
    F: Fn(&T) -> &str,
{
    records
        .into_iter()
        .partition(|record| settled_field(record).trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize)]
    struct Line {
        planning_no: String,
        item: String,
        actual: String,
    }

    fn line(pn: &str, item: &str, actual: &str) -> Line {
        Line {
            planning_no: pn.into(),
            item: item.into(),
            actual: actual.into(),
        }
    }

    #[test]
    fn first_record_becomes_display_item() {
        let groups = group_by_key(
            vec![line("PN-01", "panel", ""), line("PN-01", "cable", "")],
            |l| l.planning_no.clone(),
        );
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].display_item.item, "panel");
        assert_eq!(groups[0].item_count, 2);
    }

    #[test]
    fn group_order_follows_first_encounter() {
        let groups = group_by_key(
            vec![
                line("PN-02", "a", ""),
                line("PN-01", "b", ""),
                line("PN-02", "c", ""),
            ],
            |l| l.planning_no.clone(),
        );
        let keys: Vec<&str> = groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, ["PN-02", "PN-01"]);
    }

    #[test]
    fn grouping_is_complete() {
        let records = vec![
            line("PN-01", "a", ""),
            line("PN-02", "b", ""),
            line("PN-01", "c", ""),
            line("PN-03", "d", ""),
        ];
        let total = records.len();
        let groups = group_by_key(records, |l| l.planning_no.clone());
        assert_eq!(groups.iter().map(|g| g.item_count).sum::<usize>(), total);
    }

    #[test]
    fn merge_deduplicates_repeated_names() {
        assert_eq!(merge_names(["Panel", "Panel", "Panel"]), "Panel");
    }

    #[test]
    fn merge_skips_contained_substrings() {
        assert_eq!(merge_names(["Solar Panel 250W", "Panel"]), "Solar Panel 250W");
        assert_eq!(merge_names(["Cable", "Inverter"]), "Cable, Inverter");
    }

    #[test]
    fn merge_is_case_sensitive() {
        assert_eq!(merge_names(["panel", "Panel"]), "panel, Panel");
    }

    #[test]
    fn partition_is_exhaustive_and_exclusive() {
        let records = vec![
            line("PN-01", "a", ""),
            line("PN-02", "b", "12/01/2024"),
            line("PN-03", "c", "  "),
        ];
        let total = records.len();
        let (pending, history) = partition_pending(records, |l| l.actual.as_str());
        assert_eq!(pending.len() + history.len(), total);
        assert_eq!(pending.len(), 2);
        assert_eq!(history[0].planning_no, "PN-02");
    }
}
