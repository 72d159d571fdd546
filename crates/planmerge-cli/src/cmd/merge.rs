use crate::output::print_table;
use anyhow::Context;
use clap::Args;
use planmerge_core::merge::SkipReason;
use planmerge_core::report::MergeReport;
use planmerge_core::{MatchPolicy, PlanMerger};
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Arguments
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct MergeArgs {
    /// Master plan whose headings receive the subplans
    #[arg(required = true)]
    pub master_file: Option<PathBuf>,

    /// Directory holding the subplan documents (not searched recursively)
    #[arg(required = true)]
    pub subplans_dir: Option<PathBuf>,

    /// Where to write the merged document
    #[arg(required = true)]
    pub output_file: Option<PathBuf>,

    /// Also write a JSON match report to this path
    #[arg(long, short = 'r')]
    pub report: Option<PathBuf>,

    /// Match policy YAML (weights, thresholds, block format)
    #[arg(long, env = "PLAN_MERGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Show progress and full error detail
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(args: &MergeArgs) -> anyhow::Result<()> {
    let (Some(master_file), Some(subplans_dir), Some(output_file)) =
        (&args.master_file, &args.subplans_dir, &args.output_file)
    else {
        anyhow::bail!("usage: plan-merge <MASTER_FILE> <SUBPLANS_DIR> <OUTPUT_FILE>");
    };

    let policy =
        MatchPolicy::resolve(args.config.as_deref()).context("failed to load match policy")?;

    if args.verbose {
        println!("Merging plans");
        println!("  master:   {}", master_file.display());
        println!("  subplans: {}", subplans_dir.display());
        println!("  output:   {}", output_file.display());
        println!();
    }

    let merger = PlanMerger::new(policy);
    let outcome = merger
        .run(master_file, subplans_dir, output_file)
        .context("merge failed")?;
    outcome
        .write(output_file, args.report.as_deref())
        .context("failed to write output")?;

    print_summary(&outcome.report, args.verbose);
    if let Some(path) = &args.report {
        println!("Report saved to: {}", path.display());
    }
    Ok(())
}

fn print_summary(report: &MergeReport, verbose: bool) {
    println!("Merge complete: {}", report.output_file);
    println!("Processed {} subplan(s)", report.subplans_count);
    println!("Matched {} subplan(s) to sections", report.matches_found);

    if verbose && !report.matching_details.is_empty() {
        println!();
        let rows = report
            .matching_details
            .iter()
            .map(|d| {
                vec![
                    d.result.subplan_name.clone(),
                    d.result.section_title.clone(),
                    format!("{:.3}", d.result.similarity),
                    if d.inserted { "yes" } else { "no" }.to_string(),
                    d.result.reason.clone(),
                ]
            })
            .collect();
        print_table(
            &["SUBPLAN", "SECTION", "SIMILARITY", "INSERTED", "REASON"],
            rows,
        );
        println!();
    }

    for reason in SkipReason::ALL {
        let skipped: Vec<_> = report.skipped_for(reason).collect();
        if skipped.is_empty() {
            continue;
        }
        println!("Not inserted, {reason}: {}", skipped.len());
        for d in skipped {
            println!("  - {} -> {}", d.result.subplan_name, d.result.section_title);
        }
    }

    if !report.unmatched_subplans.is_empty() {
        println!("Unmatched subplans: {}", report.unmatched_subplans.len());
        for name in &report.unmatched_subplans {
            println!("  - {name}");
        }
    }
}
