//! Walks back from a tag and reports the other tags found in its history.

use log::{debug, warn};
use serde::Serialize;

use crate::{
    cancel::CancelFlag,
    divergence::{calculate_divergence, Divergence},
    error::GraphError,
    graph::{find_tag, CommitGraph, Reference, TagIndex},
    walk::AncestorWalk,
};

pub const DEFAULT_DEPTH: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WalkState {
    Initialized,
    Resolving,
    IndexingTags,
    Walking,
    /// History exhausted before `depth` tags were found.
    Completed,
    DepthReached,
}

/// An ancestor tag that has commits the starting tag lacks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AnomalousDivergence {
    pub behind: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct TagHistoryEntry {
    pub divergence: Divergence,
    pub anomaly: Option<AnomalousDivergence>,
}

impl TagHistoryEntry {
    fn new(divergence: Divergence) -> Self {
        let anomaly = divergence
            .is_anomalous()
            .then_some(AnomalousDivergence {
                behind: divergence.behind,
            });
        Self {
            divergence,
            anomaly,
        }
    }

    pub fn tag(&self) -> &Reference {
        &self.divergence.other
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct TagHistoryReport {
    pub start: Reference,
    pub depth: usize,
    /// Most recent ancestor tag first.
    pub entries: Vec<TagHistoryEntry>,
    pub outcome: WalkState,
}

pub struct TagHistory<'a, G: ?Sized> {
    graph: &'a G,
    depth: usize,
    cancel: CancelFlag,
    state: WalkState,
}

impl<'a, G> TagHistory<'a, G>
where
    G: CommitGraph + ?Sized,
{
    pub fn new(graph: &'a G, depth: usize) -> Result<Self, GraphError> {
        if depth == 0 {
            return Err(GraphError::InvalidDepth(depth));
        }

        Ok(Self {
            graph,
            depth,
            cancel: CancelFlag::default(),
            state: WalkState::Initialized,
        })
    }

    pub fn with_cancel(mut self, cancel: &CancelFlag) -> Self {
        self.cancel = cancel.clone();
        self
    }

    fn transition(&mut self, next: WalkState) {
        debug!("Tag history: {:?} -> {next:?}", self.state);
        self.state = next;
    }

    /// Finds up to `depth` tags among the ancestors of `tag_name`, in the
    /// order the ancestor traversal reaches them, each compared against the
    /// starting tag.
    pub fn run(mut self, tag_name: &str) -> Result<TagHistoryReport, GraphError> {
        self.transition(WalkState::Resolving);
        let tags = self.graph.list_tags()?;
        let start = find_tag(&tags, tag_name)?;

        self.transition(WalkState::IndexingTags);
        let index = TagIndex::build(tags);
        debug!("Indexed {} tagged commits", index.commit_count());

        self.transition(WalkState::Walking);
        let mut entries = Vec::new();
        let walk =
            AncestorWalk::new(self.graph, [start.target.clone()]).with_cancel(&self.cancel);
        for visited in walk {
            let commit = visited?;
            let Some(tag) = index.get(&commit) else {
                continue;
            };
            if tag.name == start.name {
                continue;
            }

            let entry = TagHistoryEntry::new(calculate_divergence(
                self.graph,
                &start,
                tag,
                &self.cancel,
            )?);
            if let Some(anomaly) = &entry.anomaly {
                warn!(
                    "{} is {} commits ahead of its descendant {}",
                    tag.short_name(),
                    anomaly.behind,
                    start.short_name()
                );
            }
            entries.push(entry);

            if entries.len() >= self.depth {
                self.transition(WalkState::DepthReached);
                return Ok(self.report(start, entries));
            }
        }

        self.transition(WalkState::Completed);
        Ok(self.report(start, entries))
    }

    fn report(&self, start: Reference, entries: Vec<TagHistoryEntry>) -> TagHistoryReport {
        TagHistoryReport {
            start,
            depth: self.depth,
            entries,
            outcome: self.state,
        }
    }
}
