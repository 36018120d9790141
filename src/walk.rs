//! Timestamp-ordered ancestor traversal.
//!
//! Every graph algorithm in the crate pulls commits from a [`Frontier`], so
//! visit order (and therefore merge-base tie-breaking and the order tags are
//! reported in) is the same everywhere: most recent commit first, and
//! commits with equal timestamps in the order they were first queued.

use std::{
    cmp::Reverse,
    collections::{BinaryHeap, HashMap, HashSet},
};

use log::debug;

use crate::{
    cancel::CancelFlag,
    error::GraphError,
    graph::{CommitGraph, CommitId},
};

#[derive(Debug, Default)]
pub struct Frontier {
    heap: BinaryHeap<(i64, Reverse<u64>, CommitId)>,
    sequence: u64,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<G>(&mut self, graph: &G, id: CommitId) -> Result<(), GraphError>
    where
        G: CommitGraph + ?Sized,
    {
        let timestamp = graph.commit_timestamp(&id)?;
        self.heap.push((timestamp, Reverse(self.sequence), id));
        self.sequence += 1;
        Ok(())
    }

    pub fn pop(&mut self) -> Option<CommitId> {
        self.heap.pop().map(|(_, _, id)| id)
    }

    /// Timestamp of the commit the next `pop` returns.
    pub fn peek_timestamp(&self) -> Option<i64> {
        self.heap.peek().map(|(timestamp, _, _)| *timestamp)
    }

    /// Queued commits in no particular order.
    pub fn queued(&self) -> impl Iterator<Item = &CommitId> {
        self.heap.iter().map(|(_, _, id)| id)
    }
}

/// Iterator over every ancestor of the start commits (starts included),
/// each yielded once.
pub struct AncestorWalk<'a, G: ?Sized> {
    graph: &'a G,
    frontier: Frontier,
    seen: HashSet<CommitId>,
    cancel: CancelFlag,
    pending: Option<GraphError>,
    finished: bool,
}

impl<'a, G> AncestorWalk<'a, G>
where
    G: CommitGraph + ?Sized,
{
    pub fn new(graph: &'a G, starts: impl IntoIterator<Item = CommitId>) -> Self {
        let mut walk = Self {
            graph,
            frontier: Frontier::new(),
            seen: HashSet::new(),
            cancel: CancelFlag::default(),
            pending: None,
            finished: false,
        };
        for start in starts {
            walk.enqueue(start);
        }
        walk
    }

    pub fn with_cancel(mut self, cancel: &CancelFlag) -> Self {
        self.cancel = cancel.clone();
        self
    }

    fn enqueue(&mut self, id: CommitId) {
        if self.pending.is_some() || !self.seen.insert(id.clone()) {
            return;
        }
        if let Err(e) = self.frontier.push(self.graph, id) {
            self.pending = Some(e);
        }
    }

    fn fail(&mut self, error: GraphError) -> Option<Result<CommitId, GraphError>> {
        self.finished = true;
        Some(Err(error))
    }
}

impl<G> Iterator for AncestorWalk<'_, G>
where
    G: CommitGraph + ?Sized,
{
    type Item = Result<CommitId, GraphError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        if let Some(error) = self.pending.take() {
            return self.fail(error);
        }
        if let Err(error) = self.cancel.check() {
            return self.fail(error);
        }

        let id = self.frontier.pop()?;
        let parents = match self.graph.parents_of(&id) {
            Ok(parents) => parents,
            Err(error) => return self.fail(error),
        };
        debug!("Visiting {} ({} parents)", id.short(), parents.len());
        for parent in parents {
            self.enqueue(parent);
        }

        Some(Ok(id))
    }
}

/// Frontier walk that carries a set of flag bits per commit and pushes
/// them down to parents. A commit whose flags grow after it was popped is
/// queued again, so late-arriving marks still reach its ancestors.
pub struct PaintedWalk<'a, G: ?Sized> {
    graph: &'a G,
    frontier: Frontier,
    marks: HashMap<CommitId, u8>,
    queued: HashSet<CommitId>,
}

impl<'a, G> PaintedWalk<'a, G>
where
    G: CommitGraph + ?Sized,
{
    pub fn new(graph: &'a G) -> Self {
        Self {
            graph,
            frontier: Frontier::new(),
            marks: HashMap::new(),
            queued: HashSet::new(),
        }
    }

    pub fn paint(&mut self, id: CommitId, flags: u8) -> Result<(), GraphError> {
        let marks = self.marks.entry(id.clone()).or_default();
        if *marks & flags == flags {
            return Ok(());
        }
        *marks |= flags;
        if self.queued.insert(id.clone()) {
            self.frontier.push(self.graph, id)?;
        }
        Ok(())
    }

    pub fn paint_parents(&mut self, id: &CommitId, flags: u8) -> Result<(), GraphError> {
        for parent in self.graph.parents_of(id)? {
            self.paint(parent, flags)?;
        }
        Ok(())
    }

    /// Most recent queued commit with its flags at the time of the pop.
    pub fn pop(&mut self) -> Option<(CommitId, u8)> {
        let id = self.frontier.pop()?;
        self.queued.remove(&id);
        let flags = self.flags(&id);
        Some((id, flags))
    }

    pub fn peek_timestamp(&self) -> Option<i64> {
        self.frontier.peek_timestamp()
    }

    pub fn flags(&self, id: &CommitId) -> u8 {
        self.marks.get(id).copied().unwrap_or_default()
    }

    pub fn any_queued(&self, predicate: impl Fn(u8) -> bool) -> bool {
        self.frontier.queued().any(|id| predicate(self.flags(id)))
    }
}
