use std::{collections::HashMap, fmt};

use log::{debug, warn};
use serde::Serialize;

use crate::error::GraphError;

const REF_PREFIXES: [&str; 3] = ["refs/tags/", "refs/heads/", "refs/remotes/"];

/// Content-derived identifier of a commit, kept as its hex form so the
/// algorithms never depend on a particular object store.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CommitId(String);

impl CommitId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First eight characters, for log lines.
    pub fn short(&self) -> &str {
        self.0.get(0..8).unwrap_or(&self.0)
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<git2::Oid> for CommitId {
    fn from(oid: git2::Oid) -> Self {
        Self(oid.to_string())
    }
}

/// A named pointer (branch, tag, or raw revision) already peeled to the
/// commit it ultimately targets.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Reference {
    pub name: String,
    pub target: CommitId,
}

impl Reference {
    pub fn new(name: impl Into<String>, target: CommitId) -> Self {
        Self {
            name: name.into(),
            target,
        }
    }

    pub fn short_name(&self) -> &str {
        REF_PREFIXES
            .iter()
            .find_map(|prefix| self.name.strip_prefix(prefix))
            .unwrap_or(&self.name)
    }

    /// Matches either the full ref name or its short form.
    pub fn is_named(&self, name: &str) -> bool {
        self.name == name || self.short_name() == name
    }
}

/// Read-only view of a repository's commit storage.
///
/// Lookups report absence through [`GraphError::ReferenceNotFound`] and
/// [`GraphError::ObjectNotFound`], distinct from storage failures.
pub trait CommitGraph {
    /// Resolves a branch, tag, or revision name, peeling annotated tags.
    fn resolve_reference(&self, name: &str) -> Result<Reference, GraphError>;

    fn parents_of(&self, id: &CommitId) -> Result<Vec<CommitId>, GraphError>;

    /// Commit time in seconds. Only used to order traversals.
    fn commit_timestamp(&self, id: &CommitId) -> Result<i64, GraphError>;

    /// Every tag, peeled to its commit, in the store's enumeration order.
    fn list_tags(&self) -> Result<Vec<Reference>, GraphError>;
}

/// Finds a tag by short or full name.
pub fn find_tag(tags: &[Reference], name: &str) -> Result<Reference, GraphError> {
    tags.iter()
        .find(|tag| tag.is_named(name))
        .cloned()
        .ok_or_else(|| GraphError::TagNotFound(name.to_string()))
}

/// Peeled commit id to the tag that targets it.
///
/// When several tags peel to the same commit the last one in enumeration
/// order wins.
#[derive(Debug, Default)]
pub struct TagIndex {
    by_commit: HashMap<CommitId, Reference>,
}

impl TagIndex {
    pub fn build(tags: impl IntoIterator<Item = Reference>) -> Self {
        let mut by_commit = HashMap::new();
        for tag in tags {
            debug!("Indexing {} at {}", tag.name, tag.target.short());
            if let Some(previous) = by_commit.insert(tag.target.clone(), tag) {
                warn!(
                    "{} shares commit {} with another tag, it will not be reported",
                    previous.name,
                    previous.target.short()
                );
            }
        }

        Self { by_commit }
    }

    pub fn get(&self, id: &CommitId) -> Option<&Reference> {
        self.by_commit.get(id)
    }

    /// Number of distinct tagged commits.
    pub fn commit_count(&self) -> usize {
        self.by_commit.len()
    }
}


#[cfg(test)]
mod tests {
    use super::memory::id;
    use super::*;

    #[test]
    fn short_name_strips_known_prefixes() {
        assert_eq!(Reference::new("refs/tags/v1.0", id("a")).short_name(), "v1.0");
        assert_eq!(Reference::new("refs/heads/main", id("a")).short_name(), "main");
        assert_eq!(
            Reference::new("refs/remotes/origin/main", id("a")).short_name(),
            "origin/main"
        );
        assert_eq!(Reference::new("HEAD", id("a")).short_name(), "HEAD");
    }

    #[test]
    fn find_tag_accepts_short_and_full_names() {
        let tags = vec![Reference::new("refs/tags/v1", id("a"))];

        assert_eq!(find_tag(&tags, "v1").unwrap().target, id("a"));
        assert_eq!(find_tag(&tags, "refs/tags/v1").unwrap().target, id("a"));
        assert!(matches!(
            find_tag(&tags, "v2"),
            Err(GraphError::TagNotFound(name)) if name == "v2"
        ));
    }

    #[test]
    fn tag_index_keeps_last_tag_for_shared_commit() {
        let index = TagIndex::build(vec![
            Reference::new("refs/tags/v1", id("c1")),
            Reference::new("refs/tags/v1-annotated", id("c1")),
            Reference::new("refs/tags/v2", id("c2")),
        ]);

        assert_eq!(index.commit_count(), 2);
        assert_eq!(index.get(&id("c1")).unwrap().name, "refs/tags/v1-annotated");
        assert_eq!(index.get(&id("c2")).unwrap().name, "refs/tags/v2");
        assert!(index.get(&id("c3")).is_none());
    }

    #[test]
    fn short_commit_id_handles_short_input() {
        assert_eq!(CommitId::new("abc").short(), "abc");
        assert_eq!(
            CommitId::new("0123456789abcdef").short(),
            "01234567"
        );
    }
}
