use std::{
    fmt::{self, Write},
    path::Path,
};

use crate::{
    cancel::CancelFlag,
    cli::BranchCompareArgs,
    ctx::Ctx,
    divergence::{compare_references, Divergence},
    error::Attempt,
    print::show_diagnostic,
};

fn write_header(
    out: &mut impl Write,
    repo_path: &Path,
    args: &BranchCompareArgs,
) -> fmt::Result {
    writeln!(out, "Analysing git repository at {}", repo_path.display())?;
    writeln!(out, "Comparing {} with {}", args.base, args.other)?;
    writeln!(out)
}

fn write_divergence(out: &mut impl Write, result: &Divergence) -> fmt::Result {
    let base = result.base.short_name();
    let other = result.other.short_name();
    writeln!(out, "{base} is {} commits ahead of {other}", result.ahead)?;
    writeln!(out, "{base} is {} commits behind {other}", result.behind)
}

pub fn branch_compare_command(
    ctx: &Ctx,
    args: &BranchCompareArgs,
    cancel: &CancelFlag,
) -> Attempt {
    if !ctx.is_json() {
        let mut header = String::new();
        write_header(&mut header, &ctx.repo_path, args)?;
        print!("{header}");
    }

    match compare_references(&ctx.store, &args.base, &args.other, cancel) {
        Ok(result) => {
            if ctx.is_json() {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                let mut output = String::new();
                write_divergence(&mut output, &result)?;
                print!("{output}");
            }
            Ok(())
        }
        Err(e) if e.is_recoverable() => {
            show_diagnostic(ctx, &e.to_string());
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
