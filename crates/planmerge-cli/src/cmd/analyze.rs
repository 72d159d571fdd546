use crate::output::print_json;
use anyhow::Context;
use clap::{Args, ValueEnum};
use planmerge_core::analyze::StructureAnalysis;
use planmerge_core::io::atomic_write;
use planmerge_core::{MatchPolicy, PlanMerger};
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    Json,
}

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Markdown document to analyze
    pub file: PathBuf,

    /// Write the analysis here instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "text")]
    pub format: Format,

    /// Match policy YAML (keyword settings)
    #[arg(long, env = "PLAN_MERGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Show progress and full error detail
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

pub fn run(args: &AnalyzeArgs) -> anyhow::Result<()> {
    let policy =
        MatchPolicy::resolve(args.config.as_deref()).context("failed to load match policy")?;
    let analysis = PlanMerger::new(policy)
        .analyze_file(&args.file)
        .with_context(|| format!("failed to analyze {}", args.file.display()))?;

    match (&args.output, args.format) {
        (None, Format::Json) => print_json(&analysis)?,
        (None, Format::Text) => println!("{}", format_text(&analysis)),
        (Some(path), format) => {
            let body = match format {
                Format::Json => serde_json::to_string_pretty(&analysis)?,
                Format::Text => format_text(&analysis),
            };
            atomic_write(path, body.as_bytes())
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Analysis saved to: {}", path.display());
        }
    }
    Ok(())
}

fn format_text(a: &StructureAnalysis) -> String {
    let rule = "=".repeat(50);
    let mut out = vec![
        rule.clone(),
        format!("Structure of {}", a.file_path),
        rule,
        String::new(),
        "Overview:".to_string(),
        format!("  headings:      {}", a.total_headings),
        format!("  main sections: {}", a.main_sections.len()),
        String::new(),
        "Heading levels:".to_string(),
    ];
    for (level, count) in &a.heading_levels {
        out.push(format!("  {} {count}", "#".repeat(*level as usize)));
    }
    out.push(String::new());

    out.push("Main sections:".to_string());
    for s in &a.main_sections {
        out.push(format!("  {} {}", "#".repeat(s.level as usize), s.title));
        if !s.content_preview.is_empty() {
            let preview: String = s.content_preview.chars().take(50).collect();
            out.push(format!("    preview: {preview}..."));
        }
    }
    out.push(String::new());

    out.push("Themes:".to_string());
    for t in &a.themes {
        out.push(format!("  {} {}", "#".repeat(t.level as usize), t.title));
        let keywords: Vec<&str> = t.keywords.iter().take(5).map(String::as_str).collect();
        out.push(format!("    keywords: {}", keywords.join(", ")));
    }

    out.join("\n")
}
