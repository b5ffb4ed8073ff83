//! Duplicate-path merge pass.
//!
//! Two records are equivalent when they belong to the same story and carry
//! an identical page sequence. Re-converging branches produce exactly this
//! situation: two different walks arrive at the same linear sequence, and
//! without a merge the collection silently accumulates duplicates,
//! corrupting "which path is the reader on" for resumption and
//! back-navigation.
//!
//! The pass runs in two phases: first identify all equivalence classes by
//! value over the frozen collection, then rebuild the collection keeping
//! the earliest-positioned representative of each class. The collection is
//! never mutated while it is being scanned. One pass handles any number of
//! simultaneous equivalence classes of any size.
//!
//! Tie-break: the earlier-positioned record survives. Arbitrary, but
//! applied consistently so repeated merges are deterministic.

use crate::model::{History, PageId, StoryId};
use std::collections::HashMap;

/// Collapse structurally equivalent records, remapping `active` to the
/// surviving record's post-rebuild position.
///
/// A survivor that absorbed at least one duplicate gets its
/// `last_updated_us` re-confirmed to `now_us`.
#[must_use]
pub fn merge_pass(
    histories: Vec<History>,
    active: Option<usize>,
    now_us: i64,
) -> (Vec<History>, Option<usize>) {
    let len = histories.len();

    // Phase 1: equivalence classes by (story, pages) value.
    let mut survivor_of = vec![0_usize; len];
    let mut absorbed = vec![false; len];
    {
        let mut first_seen: HashMap<(&StoryId, &[PageId]), usize> = HashMap::new();
        for (i, h) in histories.iter().enumerate() {
            let survivor = *first_seen.entry((&h.story, h.pages.as_slice())).or_insert(i);
            survivor_of[i] = survivor;
            if survivor != i {
                absorbed[survivor] = true;
            }
        }
    }

    // Post-rebuild position of every survivor. Entries for non-survivors
    // stay 0 and are never read: survivor_of always resolves to an index
    // with survivor_of[s] == s.
    let mut new_pos = vec![0_usize; len];
    let mut next = 0_usize;
    for (i, &s) in survivor_of.iter().enumerate() {
        if s == i {
            new_pos[i] = next;
            next += 1;
        }
    }

    let remapped_active = active.map(|a| new_pos[survivor_of[a]]);

    // Phase 2: rebuild, keeping one representative per class.
    let mut kept = Vec::with_capacity(next);
    for (i, mut h) in histories.into_iter().enumerate() {
        if survivor_of[i] == i {
            if absorbed[i] {
                h.last_updated_us = now_us;
            }
            kept.push(h);
        }
    }

    if kept.len() < len {
        tracing::debug!(removed = len - kept.len(), "merged duplicate history paths");
    }

    (kept, remapped_active)
}

#[cfg(test)]
mod tests {
    use super::merge_pass;
    use crate::model::{History, PageId, StoryId};

    const NOW: i64 = 50_000;

    fn hist(story: &str, pages: &[&str], ts: i64) -> History {
        History {
            story: StoryId::from(story),
            pages: pages.iter().map(|p| PageId::from(*p)).collect(),
            last_updated_us: ts,
        }
    }

    #[test]
    fn no_duplicates_is_a_no_op() {
        let input = vec![hist("s1", &["a"], 1), hist("s1", &["a", "b"], 2)];
        let (out, active) = merge_pass(input.clone(), Some(1), NOW);
        assert_eq!(out, input);
        assert_eq!(active, Some(1));
    }

    #[test]
    fn earlier_positioned_record_survives() {
        let input = vec![
            hist("s1", &["a", "b", "d"], 1),
            hist("s1", &["x"], 2),
            hist("s1", &["a", "b", "d"], 3),
        ];
        let (out, active) = merge_pass(input, Some(2), NOW);

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].pages, vec![PageId::from("a"), PageId::from("b"), PageId::from("d")]);
        assert_eq!(out[1].pages, vec![PageId::from("x")]);
        // the survivor was re-confirmed
        assert_eq!(out[0].last_updated_us, NOW);
        // active pointed at the removed record: retargeted to the survivor
        assert_eq!(active, Some(0));
    }

    #[test]
    fn active_index_shifts_with_removals_before_it() {
        let input = vec![
            hist("s1", &["a"], 1),
            hist("s1", &["a"], 2),
            hist("s1", &["b"], 3),
        ];
        let (out, active) = merge_pass(input, Some(2), NOW);

        assert_eq!(out.len(), 2);
        assert_eq!(out[1].pages, vec![PageId::from("b")]);
        assert_eq!(active, Some(1));
    }

    #[test]
    fn same_pages_in_different_stories_are_not_equivalent() {
        let input = vec![hist("s1", &["a", "b"], 1), hist("s2", &["a", "b"], 2)];
        let (out, active) = merge_pass(input.clone(), Some(0), NOW);
        assert_eq!(out, input);
        assert_eq!(active, Some(0));
    }

    #[test]
    fn multiple_equivalence_classes_collapse_in_one_pass() {
        let input = vec![
            hist("s1", &["a"], 1),
            hist("s1", &["b"], 2),
            hist("s1", &["a"], 3),
            hist("s1", &["b"], 4),
            hist("s1", &["a"], 5),
        ];
        let (out, active) = merge_pass(input, Some(4), NOW);

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].pages, vec![PageId::from("a")]);
        assert_eq!(out[1].pages, vec![PageId::from("b")]);
        assert_eq!(out[0].last_updated_us, NOW);
        assert_eq!(out[1].last_updated_us, NOW);
        assert_eq!(active, Some(0));
    }

    #[test]
    fn untouched_survivors_keep_their_timestamps() {
        let input = vec![hist("s1", &["a"], 7), hist("s1", &["b"], 8)];
        let (out, _) = merge_pass(input, None, NOW);
        assert_eq!(out[0].last_updated_us, 7);
        assert_eq!(out[1].last_updated_us, 8);
    }

    #[test]
    fn merge_is_idempotent() {
        let input = vec![
            hist("s1", &["a"], 1),
            hist("s1", &["a"], 2),
            hist("s1", &["c"], 3),
        ];
        let (once, active) = merge_pass(input, Some(1), NOW);
        let (twice, active2) = merge_pass(once.clone(), active, NOW);
        assert_eq!(once, twice);
        assert_eq!(active, active2);
    }
}
