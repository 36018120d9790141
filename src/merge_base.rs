use log::debug;

use crate::{
    cancel::CancelFlag,
    error::GraphError,
    graph::{CommitGraph, CommitId},
    walk::PaintedWalk,
};

const FROM_A: u8 = 1;
const FROM_B: u8 = 2;
const FROM_BOTH: u8 = FROM_A | FROM_B;

/// Finds a merge base of `a` and `b`: the first commit, in frontier order,
/// reached from both sides. With criss-cross merges several commits qualify
/// and only the first one visited is returned.
///
/// Returns `None` when the two histories share no commit.
pub fn find_merge_base<G>(
    graph: &G,
    a: &CommitId,
    b: &CommitId,
    cancel: &CancelFlag,
) -> Result<Option<CommitId>, GraphError>
where
    G: CommitGraph + ?Sized,
{
    let mut walk = PaintedWalk::new(graph);
    walk.paint(a.clone(), FROM_A)?;
    walk.paint(b.clone(), FROM_B)?;

    while let Some((id, flags)) = walk.pop() {
        cancel.check()?;
        if flags == FROM_BOTH {
            debug!("Merge base of {} and {} is {}", a.short(), b.short(), id.short());
            return Ok(Some(id));
        }
        walk.paint_parents(&id, flags)?;
    }

    debug!("{} and {} have disjoint histories", a.short(), b.short());
    Ok(None)
}
