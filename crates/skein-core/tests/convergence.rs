//! Multi-step navigation scenarios exercising the engine across whole
//! reading sessions: re-converging branches, replay storms, and interleaved
//! stories. These complement the per-function unit tests with walks a real
//! reader would produce.

use skein_core::engine::{NavEvent, Visitor, apply};
use skein_core::model::{History, PageId, StoryId};

fn sid(s: &str) -> StoryId {
    StoryId::from(s)
}

fn pages(ids: &[&str]) -> Vec<PageId> {
    ids.iter().map(|p| PageId::from(*p)).collect()
}

fn root(story: &str, page: &str) -> NavEvent {
    NavEvent::Root {
        story: sid(story),
        page: PageId::from(page),
    }
}

fn linked(story: &str, page: &str, prev: &str, history_id: usize) -> NavEvent {
    NavEvent::Linked {
        story: sid(story),
        page: PageId::from(page),
        prev_page: PageId::from(prev),
        history_id: Some(history_id),
        forward: true,
    }
}

/// Fold a sequence of events through the engine, asserting the collection
/// invariants after every step.
fn walk(events: &[NavEvent]) -> (Vec<History>, Option<usize>) {
    let mut histories = Vec::new();
    let mut active = None;
    for (step, event) in events.iter().enumerate() {
        let out = apply(histories, event, Visitor::reader(), 1_000 + step as i64);
        histories = out.histories;
        active = out.active;
        assert_invariants(&histories);
    }
    (histories, active)
}

fn assert_invariants(histories: &[History]) {
    for h in histories {
        h.check().expect("per-record invariants hold");
    }
    for (i, a) in histories.iter().enumerate() {
        for b in &histories[i + 1..] {
            assert!(
                !a.same_path(b),
                "duplicate paths survived: {:?} vs {:?}",
                a.pages,
                b.pages
            );
        }
    }
}

#[test]
fn two_branches_reconverging_collapse_to_one_record() {
    // Graph: R -> {P, Q}, P -> Z, Q -> Z. Walk both branches to Z, then
    // re-walk the second branch; the collection must settle at two records
    // (one per branch) despite sharing the endpoint page id Z only via
    // different paths.
    let (histories, active) = walk(&[
        root("s1", "R"),
        linked("s1", "P", "R", 0),
        linked("s1", "Z", "P", 0),
        // back to R, take the other branch: forks [R, Q]
        linked("s1", "Q", "R", 0),
        linked("s1", "Z", "Q", 1),
    ]);

    assert_eq!(histories.len(), 2);
    assert_eq!(histories[0].pages, pages(&["R", "P", "Z"]));
    assert_eq!(histories[1].pages, pages(&["R", "Q", "Z"]));
    assert_eq!(active, Some(1));
}

#[test]
fn rewalking_an_abandoned_branch_merges_instead_of_duplicating() {
    let (histories, active) = walk(&[
        root("s1", "R"),
        linked("s1", "P", "R", 0), // [R, P]
        linked("s1", "Q", "R", 0), // fork -> [R, Q]
        linked("s1", "P", "R", 1), // fork off [R, Q] back to P -> recreates [R, P]
    ]);

    assert_eq!(histories.len(), 2);
    assert_eq!(histories[0].pages, pages(&["R", "P"]));
    assert_eq!(histories[1].pages, pages(&["R", "Q"]));
    // the recreated path merged into the original record
    assert_eq!(active, Some(0));
}

#[test]
fn replaying_a_whole_session_changes_nothing_structural() {
    let session = [
        root("s1", "R"),
        linked("s1", "P", "R", 0),
        linked("s1", "Q", "P", 0),
    ];
    let (first, _) = walk(&session);

    // Replay every page of the recorded path in order against history 0.
    let mut histories = first.clone();
    for (step, page) in ["R", "P", "Q"].iter().enumerate() {
        let out = apply(
            histories,
            &linked("s1", page, "R", 0),
            Visitor::reader(),
            9_000 + step as i64,
        );
        histories = out.histories;
        assert_eq!(out.active, Some(0));
    }

    assert_eq!(histories.len(), first.len());
    assert_eq!(histories[0].pages, first[0].pages);
}

#[test]
fn stories_do_not_interfere() {
    let (histories, _) = walk(&[
        root("s1", "R"),
        root("s2", "R"),
        linked("s1", "A", "R", 0),
        linked("s2", "B", "R", 1),
    ]);

    assert_eq!(histories.len(), 2);
    assert_eq!(histories[0].story, sid("s1"));
    assert_eq!(histories[0].pages, pages(&["R", "A"]));
    assert_eq!(histories[1].story, sid("s2"));
    assert_eq!(histories[1].pages, pages(&["R", "B"]));
}

#[test]
fn deep_fork_keeps_every_earlier_record_intact() {
    let (histories, active) = walk(&[
        root("s1", "a"),
        linked("s1", "b", "a", 0),
        linked("s1", "c", "b", 0),
        linked("s1", "d", "c", 0), // [a, b, c, d]
        linked("s1", "x", "b", 0), // fork at b -> [a, b, x]
        linked("s1", "y", "a", 1), // fork at a off the fork -> [a, y]
    ]);

    assert_eq!(histories.len(), 3);
    assert_eq!(histories[0].pages, pages(&["a", "b", "c", "d"]));
    assert_eq!(histories[1].pages, pages(&["a", "b", "x"]));
    assert_eq!(histories[2].pages, pages(&["a", "y"]));
    assert_eq!(active, Some(2));
}

#[test]
fn guest_steps_in_the_middle_of_a_session_leave_no_trace() {
    let (histories, _) = walk(&[root("s1", "R"), linked("s1", "P", "R", 0)]);

    let snapshot = histories.clone();
    let out = apply(
        histories,
        &linked("s1", "Q", "R", 0),
        Visitor {
            guest: true,
            preview: false,
        },
        99_000,
    );
    assert_eq!(out.histories, snapshot);
    assert_eq!(out.active, None);
}
