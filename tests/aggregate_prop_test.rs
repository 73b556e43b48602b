//! Property tests for the grouping and sequence-derivation invariants.

use proptest::prelude::*;

use procure_api::aggregate::{group_by_key, merge_names};
use procure_api::calc::next_sequence_number;

proptest! {
    // Every record lands in exactly one group and group keys are unique.
    #[test]
    fn grouping_is_complete_and_disjoint(keys in prop::collection::vec("PN-[0-9]{1,2}", 0..50)) {
        let total = keys.len();
        let groups = group_by_key(keys, |k| k.clone());

        prop_assert_eq!(groups.iter().map(|g| g.item_count).sum::<usize>(), total);
        let mut seen: Vec<&str> = groups.iter().map(|g| g.key.as_str()).collect();
        seen.sort_unstable();
        seen.dedup();
        prop_assert_eq!(seen.len(), groups.len());
        for group in &groups {
            prop_assert_eq!(group.items.len(), group.item_count);
            prop_assert!(group.items.iter().all(|k| k == &group.key));
        }
    }

    // The derived next code is strictly greater than every well-formed code
    // already in the ledger.
    #[test]
    fn next_sequence_exceeds_all_existing(numbers in prop::collection::vec(1u64..500, 0..30)) {
        let codes: Vec<String> = numbers.iter().map(|n| format!("PN-{n:02}")).collect();
        let next = next_sequence_number(&codes, "PN", 2);
        let next_value: u64 = next
            .strip_prefix("PN-")
            .and_then(|n| n.parse().ok())
            .expect("derived code is well-formed");
        prop_assert_eq!(next_value, numbers.iter().copied().max().unwrap_or(0) + 1);
    }

    // Merging never loses information: every input name is present in the
    // merged text.
    #[test]
    fn merged_names_contain_every_input(names in prop::collection::vec("[A-Za-z]{1,8}", 0..10)) {
        let merged = merge_names(names.iter());
        for name in &names {
            prop_assert!(merged.contains(name.as_str()));
        }
    }
}
