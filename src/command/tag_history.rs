use std::fmt::{self, Write};

use crate::{
    cancel::CancelFlag,
    cli::TagHistoryArgs,
    config::default_depth,
    ctx::Ctx,
    error::Attempt,
    print::{show_diagnostic, warning_text},
    tag_history::{TagHistory, TagHistoryReport},
};

/// Renders a finished walk. The header names the resolved tag, so nothing
/// here is printed for a tag that does not exist.
fn write_report(out: &mut impl Write, report: &TagHistoryReport, color: bool) -> fmt::Result {
    writeln!(
        out,
        "Finding ancestor tags of {} (to a max depth of {} tags in the past)",
        report.start.short_name(),
        report.depth
    )?;
    writeln!(out)?;

    if report.entries.is_empty() {
        return writeln!(out, "No ancestor tags found");
    }

    for entry in &report.entries {
        writeln!(out, "Includes changes from: {}", entry.tag().short_name())?;
        writeln!(out, "  - Ahead: {} commits", entry.divergence.ahead)?;
        if let Some(anomaly) = &entry.anomaly {
            let line = format!("  - Behind: {} commits", anomaly.behind);
            writeln!(out, "{}", warning_text(color, &line))?;
        }
    }
    Ok(())
}

pub fn tag_history_command(
    ctx: &Ctx,
    args: &TagHistoryArgs,
    cancel: &CancelFlag,
) -> Attempt {
    let depth = match args.depth {
        Some(depth) => usize::try_from(depth)?,
        None => default_depth()?,
    };

    if !ctx.is_json() {
        println!("Analysing git repository at {}", ctx.repo_path.display());
    }

    let history = TagHistory::new(&ctx.store, depth)?.with_cancel(cancel);
    match history.run(&args.tag) {
        Ok(report) => {
            if ctx.is_json() {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                let mut output = String::new();
                write_report(&mut output, &report, ctx.color_enabled())?;
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        divergence::Divergence,
        graph::{CommitId, Reference},
        tag_history::{AnomalousDivergence, TagHistoryEntry, WalkState},
    };

    fn report(entries: Vec<TagHistoryEntry>) -> TagHistoryReport {
        TagHistoryReport {
            start: Reference::new("refs/tags/v2", CommitId::new("c4")),
            depth: 3,
            entries,
            outcome: WalkState::Completed,
        }
    }

    fn entry(tag: &str, ahead: usize, behind: usize) -> TagHistoryEntry {
        TagHistoryEntry {
            divergence: Divergence {
                base: Reference::new("refs/tags/v2", CommitId::new("c4")),
                other: Reference::new(format!("refs/tags/{tag}"), CommitId::new("c1")),
                merge_base: CommitId::new("c1"),
                ahead,
                behind,
            },
            anomaly: (behind > 0).then_some(AnomalousDivergence { behind }),
        }
    }

    fn render(report: &TagHistoryReport, color: bool) -> String {
        let mut output = String::new();
        write_report(&mut output, report, color).unwrap();
        output
    }

    #[test]
    fn header_names_the_resolved_tag() {
        let output = render(&report(vec![entry("v1", 2, 0)]), false);

        assert_eq!(
            output,
            "Finding ancestor tags of v2 (to a max depth of 3 tags in the past)\n\
             \n\
             Includes changes from: v1\n  - Ahead: 2 commits\n"
        );
    }

    #[test]
    fn empty_history_says_so() {
        let output = render(&report(Vec::new()), false);

        assert!(output.ends_with("\n\nNo ancestor tags found\n"));
    }

    #[test]
    fn anomalous_entry_prints_highlighted_behind_line() {
        let output = render(&report(vec![entry("v1", 3, 1)]), true);

        assert!(output.ends_with(
            "  - Ahead: 3 commits\n\x1b[38;5;214m  - Behind: 1 commits\x1b[0m\n"
        ));
    }
}
