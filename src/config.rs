use log::debug;

use crate::{
    error::{fail, Maybe},
    tag_history::DEFAULT_DEPTH,
};

pub const DEPTH_VAR: &str = "LINEAGE_DEPTH";

/// Depth used when none is given on the command line.
pub fn default_depth() -> Maybe<usize> {
    let configured = match std::env::var(DEPTH_VAR) {
        Ok(v) => Some(v),
        Err(std::env::VarError::NotPresent) => None,
        Err(std::env::VarError::NotUnicode(_)) => {
            return fail(&format!("{DEPTH_VAR} is not valid unicode"));
        }
    };
    debug!("{DEPTH_VAR}: {configured:?}");

    parse_depth(configured.as_deref())
}

fn parse_depth(configured: Option<&str>) -> Maybe<usize> {
    match configured.map(str::trim) {
        None | Some("") => Ok(DEFAULT_DEPTH),
        Some(value) => match value.parse::<usize>() {
            Ok(depth) if depth > 0 => Ok(depth),
            _ => fail(&format!(
                "{DEPTH_VAR} must be a positive number, got {value:?}"
            )),
        },
    }
}
