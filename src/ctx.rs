use std::{
    env,
    io::{stdout, IsTerminal},
    path::{Path, PathBuf},
};

use crate::{error::Maybe, store::GitStore};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Cli,
    Pipe,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Text,
    Json,
}

pub struct Ctx {
    pub store: GitStore,
    pub repo_path: PathBuf,
    mode: Mode,
    format: Format,
    color: bool,
}

impl Ctx {
    pub fn color_enabled(&self) -> bool {
        self.color && self.mode == Mode::Cli
    }

    pub fn is_json(&self) -> bool {
        self.format == Format::Json
    }
}

pub fn init_ctx(repo_path: &Path, json: bool) -> Maybe<Ctx> {
    let store = GitStore::open(repo_path)?;

    Ok(Ctx {
        store,
        repo_path: repo_path.to_path_buf(),
        mode: if stdout().lock().is_terminal() {
            Mode::Cli
        } else {
            Mode::Pipe
        },
        format: if json { Format::Json } else { Format::Text },
        color: env::var_os("NO_COLOR").is_none(),
    })
}
