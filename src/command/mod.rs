use crate::{
    cancel::CancelFlag,
    cli::{Cli, Commands},
    ctx::init_ctx,
    error::Attempt,
};

use self::{branch_compare::branch_compare_command, tag_history::tag_history_command};

mod branch_compare;
mod tag_history;

fn ctrlc_cancel(cancel: &CancelFlag) {
    let cancel = cancel.clone();
    let _ = ctrlc::set_handler(move || {
        cancel.cancel();
    });
}

pub fn run_command(cli: &Cli) -> Attempt {
    let cancel = CancelFlag::new();
    ctrlc_cancel(&cancel);

    match &cli.command {
        Commands::BranchCompare(args) => {
            let ctx = init_ctx(&args.repo_path, cli.json)?;
            branch_compare_command(&ctx, args, &cancel)
        }
        Commands::TagHistory(args) => {
            let ctx = init_ctx(&args.repo_path, cli.json)?;
            tag_history_command(&ctx, args, &cancel)
        }
    }
}
