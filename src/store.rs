use std::path::Path;

use git2::{Commit, ErrorCode, Oid, Repository};
use log::debug;

use crate::{
    error::GraphError,
    graph::{CommitGraph, CommitId, Reference},
};

/// Commit graph backed by an on-disk git repository.
pub struct GitStore {
    repo: Repository,
}

fn is_not_found(err: &git2::Error) -> bool {
    matches!(err.code(), ErrorCode::NotFound | ErrorCode::InvalidSpec)
}

/// The reference exists but points at a tree or blob.
fn is_not_a_commit(err: &git2::Error) -> bool {
    matches!(err.code(), ErrorCode::Peel | ErrorCode::InvalidSpec)
}

/// Maps any other peel failure of an existing reference. A missing target
/// object means the store is broken.
fn peel_failure(reference: &git2::Reference<'_>, err: git2::Error) -> GraphError {
    if err.code() != ErrorCode::NotFound {
        return GraphError::Store(err);
    }
    let target = reference.target().map_or_else(
        || CommitId::new(reference.name().unwrap_or_default()),
        CommitId::from,
    );
    GraphError::ObjectNotFound(target)
}

impl GitStore {
    /// Opens the repository containing `path`, searching parent directories.
    /// Accepts a working tree, its `.git` directory, or a bare repository.
    pub fn open(path: &Path) -> Result<Self, GraphError> {
        let repo = Repository::discover(path)?;
        debug!("Opened repository at {}", repo.path().display());
        Ok(Self { repo })
    }

    fn find_commit(&self, id: &CommitId) -> Result<Commit<'_>, GraphError> {
        let not_found = || GraphError::ObjectNotFound(id.clone());
        let oid = Oid::from_str(id.as_str()).map_err(|_| not_found())?;
        self.repo.find_commit(oid).map_err(|err| {
            if is_not_found(&err) {
                not_found()
            } else {
                GraphError::Store(err)
            }
        })
    }

    fn resolve_revision(&self, name: &str) -> Result<Reference, GraphError> {
        let commit = self
            .repo
            .revparse_single(name)
            .and_then(|object| object.peel_to_commit())
            .map_err(|err| {
                if is_not_found(&err)
                    || matches!(err.code(), ErrorCode::Ambiguous | ErrorCode::Peel)
                {
                    GraphError::ReferenceNotFound(name.to_string())
                } else {
                    GraphError::Store(err)
                }
            })?;

        Ok(Reference::new(name, commit.id().into()))
    }
}

impl CommitGraph for GitStore {
    fn resolve_reference(&self, name: &str) -> Result<Reference, GraphError> {
        match self.repo.resolve_reference_from_short_name(name) {
            Ok(reference) => {
                let full_name = reference.name().unwrap_or(name).to_string();
                let commit = match reference.peel_to_commit() {
                    Ok(commit) => commit,
                    Err(err) if is_not_a_commit(&err) => {
                        return Err(GraphError::ReferenceNotFound(name.to_string()));
                    }
                    Err(err) => return Err(peel_failure(&reference, err)),
                };
                debug!("Resolved {full_name} to {}", commit.id());
                Ok(Reference::new(full_name, commit.id().into()))
            }
            Err(err) if is_not_found(&err) => self.resolve_revision(name),
            Err(err) => Err(err.into()),
        }
    }

    fn parents_of(&self, id: &CommitId) -> Result<Vec<CommitId>, GraphError> {
        Ok(self
            .find_commit(id)?
            .parent_ids()
            .map(CommitId::from)
            .collect())
    }

    fn commit_timestamp(&self, id: &CommitId) -> Result<i64, GraphError> {
        Ok(self.find_commit(id)?.time().seconds())
    }

    fn list_tags(&self) -> Result<Vec<Reference>, GraphError> {
        let tag_names = self.repo.tag_names(None)?;
        let mut tags = Vec::with_capacity(tag_names.len());
        for short_name in tag_names.iter().flatten() {
            let full_name = format!("refs/tags/{short_name}");
            let reference = self.repo.find_reference(&full_name)?;
            match reference.peel_to_commit() {
                Ok(commit) => tags.push(Reference::new(full_name, commit.id().into())),
                Err(err) if is_not_a_commit(&err) => {
                    debug!("Skipping {full_name}, it does not point at a commit: {err}");
                }
                Err(err) => return Err(peel_failure(&reference, err)),
            }
        }

        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }
}
