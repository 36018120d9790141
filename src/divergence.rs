use std::collections::{BTreeSet, HashMap};

use log::debug;
use serde::Serialize;

use crate::{
    cancel::CancelFlag,
    error::GraphError,
    graph::{CommitGraph, CommitId, Reference},
    merge_base::find_merge_base,
    walk::PaintedWalk,
};

const FROM_TIP: u8 = 1;
const BEHIND_BASE: u8 = 2;

/// How far two references have moved apart since their merge base.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Divergence {
    pub base: Reference,
    pub other: Reference,
    pub merge_base: CommitId,
    /// Commits reachable from `base` but not from the merge base.
    pub ahead: usize,
    /// Commits reachable from `other` but not from the merge base.
    pub behind: usize,
}

impl Divergence {
    /// Whether `other` has commits `base` lacks, which cannot happen when
    /// `other` is an ancestor of `base`.
    pub fn is_anomalous(&self) -> bool {
        self.behind > 0
    }
}

pub fn calculate_divergence<G>(
    graph: &G,
    base: &Reference,
    other: &Reference,
    cancel: &CancelFlag,
) -> Result<Divergence, GraphError>
where
    G: CommitGraph + ?Sized,
{
    let merge_base = find_merge_base(graph, &base.target, &other.target, cancel)?.ok_or_else(
        || GraphError::NoCommonAncestor {
            base: base.short_name().to_string(),
            other: other.short_name().to_string(),
        },
    )?;

    let ahead = count_since(graph, &base.target, &merge_base, cancel)?;
    let behind = count_since(graph, &other.target, &merge_base, cancel)?;
    debug!(
        "{} vs {}: ahead {ahead}, behind {behind} (merge base {})",
        base.short_name(),
        other.short_name(),
        merge_base.short()
    );

    Ok(Divergence {
        base: base.clone(),
        other: other.clone(),
        merge_base,
        ahead,
        behind,
    })
}

/// Resolves both names and compares them.
pub fn compare_references<G>(
    graph: &G,
    base: &str,
    other: &str,
    cancel: &CancelFlag,
) -> Result<Divergence, GraphError>
where
    G: CommitGraph + ?Sized,
{
    let base = graph.resolve_reference(base)?;
    let other = graph.resolve_reference(other)?;
    calculate_divergence(graph, &base, &other, cancel)
}

/// Counts commits reachable from `tip` that are not reachable from `stop`.
/// Commits reached through several paths are counted once.
///
/// A counted commit stays provisional while some queued commit is at least
/// as recent, since that commit may still carry the mark from `stop` down to
/// it.
pub fn count_since<G>(
    graph: &G,
    tip: &CommitId,
    stop: &CommitId,
    cancel: &CancelFlag,
) -> Result<usize, GraphError>
where
    G: CommitGraph + ?Sized,
{
    let mut walk = PaintedWalk::new(graph);
    walk.paint(tip.clone(), FROM_TIP)?;
    walk.paint(stop.clone(), BEHIND_BASE)?;

    let mut counted: HashMap<CommitId, i64> = HashMap::new();
    let mut oldest_counted: BTreeSet<(i64, CommitId)> = BTreeSet::new();
    while let Some(timestamp) = walk.peek_timestamp() {
        let may_reach_counted = oldest_counted
            .first()
            .is_some_and(|&(oldest, _)| oldest <= timestamp);
        if !may_reach_counted && !walk.any_queued(|flags| flags == FROM_TIP) {
            break;
        }

        let Some((id, flags)) = walk.pop() else {
            break;
        };
        cancel.check()?;
        if flags & BEHIND_BASE == 0 {
            if counted.insert(id.clone(), timestamp).is_none() {
                oldest_counted.insert((timestamp, id.clone()));
            }
        } else if let Some(seen_at) = counted.remove(&id) {
            oldest_counted.remove(&(seen_at, id.clone()));
        }
        walk.paint_parents(&id, flags)?;
    }

    Ok(counted.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::memory::{id, MemoryGraph};

    fn compare(graph: &MemoryGraph, base: &str, other: &str) -> Divergence {
        compare_references(graph, base, other, &CancelFlag::default()).unwrap()
    }

    fn linear() -> MemoryGraph {
        let mut graph = MemoryGraph::new();
        graph
            .chain(&["root", "c1", "c2", "c3", "c4"], 1)
            .tag("v1", "c2")
            .tag("v2", "c4")
            .branch("main", "c4");
        graph
    }

    #[test]
    fn comparing_a_reference_with_itself_is_even() {
        let graph = linear();
        let result = compare(&graph, "v2", "v2");

        assert_eq!(result.merge_base, id("c4"));
        assert_eq!((result.ahead, result.behind), (0, 0));
        assert!(!result.is_anomalous());
    }

    #[test]
    fn ancestor_counts_commits_after_it() {
        let graph = linear();
        let result = compare(&graph, "v2", "v1");

        assert_eq!(result.merge_base, id("c2"));
        assert_eq!(result.ahead, 2);
        assert_eq!(result.behind, 0);
        assert_eq!(result.base.short_name(), "v2");
        assert_eq!(result.other.short_name(), "v1");
    }

    #[test]
    fn swapping_sides_swaps_counts() {
        let mut graph = MemoryGraph::new();
        graph
            .chain(&["root", "fork"], 1)
            .commit("a1", 3, &["fork"])
            .commit("b1", 4, &["fork"])
            .commit("a2", 5, &["a1"])
            .commit("b2", 6, &["b1"])
            .commit("a3", 7, &["a2"]);

        let forward = compare(&graph, "a3", "b2");
        let backward = compare(&graph, "b2", "a3");

        assert_eq!((forward.ahead, forward.behind), (3, 2));
        assert_eq!(forward.ahead, backward.behind);
        assert_eq!(forward.behind, backward.ahead);
        assert!(forward.is_anomalous());
    }

    #[test]
    fn merge_commit_counts_each_commit_once() {
        // root -> a1 -> a2 -> a3 (p1)
        // root -> p2 (v1)
        // m = merge(p1, p2)
        let mut graph = MemoryGraph::new();
        graph
            .commit("root", 1, &[])
            .commit("p2", 2, &["root"])
            .commit("a1", 3, &["root"])
            .commit("a2", 4, &["a1"])
            .commit("a3", 5, &["a2"])
            .commit("m", 6, &["a3", "p2"])
            .tag("v1", "p2");

        let result = compare(&graph, "m", "v1");

        assert_eq!(result.merge_base, id("p2"));
        assert_eq!(result.ahead, 4);
        assert_eq!(result.behind, 0);
    }

    #[test]
    fn commits_behind_the_base_through_another_path_are_excluded() {
        // s is reachable from tip both around and through mid.
        let mut graph = MemoryGraph::new();
        graph
            .commit("s", 1, &[])
            .commit("mid", 2, &["s"])
            .commit("side", 3, &["s"])
            .commit("tip", 4, &["side", "mid"]);

        let count = count_since(&graph, &id("tip"), &id("mid"), &CancelFlag::default()).unwrap();

        assert_eq!(count, 2);
    }

    #[test]
    fn equal_timestamps_do_not_count_commits_behind_the_base() {
        // x is an ancestor of stop, and every commit shares one timestamp,
        // so tip reaches x before the mark from stop does.
        let mut graph = MemoryGraph::new();
        graph
            .commit("x", 5, &[])
            .commit("y", 5, &["x"])
            .commit("stop", 5, &["y"])
            .commit("tip", 5, &["x", "stop"])
            .tag("v1", "stop")
            .tag("v2", "tip");

        let result = compare(&graph, "v2", "v1");

        assert_eq!(result.merge_base, id("stop"));
        assert_eq!((result.ahead, result.behind), (1, 0));
    }

    #[test]
    fn unrelated_histories_fail_with_no_common_ancestor() {
        let mut graph = MemoryGraph::new();
        graph
            .chain(&["root-a", "a1"], 1)
            .chain(&["root-b", "b1"], 1)
            .branch("left", "a1")
            .branch("right", "b1");

        let result = compare_references(&graph, "left", "right", &CancelFlag::default());

        assert!(matches!(
            result,
            Err(GraphError::NoCommonAncestor { ref base, ref other }) if base == "left" && other == "right"
        ));
    }

    #[test]
    fn unknown_reference_is_reported_by_name() {
        let graph = linear();
        let result = compare_references(&graph, "main", "nope", &CancelFlag::default());

        assert!(matches!(result, Err(GraphError::ReferenceNotFound(name)) if name == "nope"));
    }

    #[test]
    fn cancellation_aborts_counting() {
        let graph = linear();
        let cancel = CancelFlag::new();
        cancel.cancel();

        let result = compare_references(&graph, "v2", "v1", &cancel);

        assert!(matches!(result, Err(GraphError::Cancelled)));
    }
}
