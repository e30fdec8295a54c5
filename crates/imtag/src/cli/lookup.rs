//! The `imtag search` and `imtag hierarchy` commands.

use clap::Args;
use imtag_core::tagger::{SearchReport, SenseHierarchy};
use imtag_core::{Config, Tagger};

/// Arguments for the `search` command.
#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Word to look up
    pub word: String,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `hierarchy` command.
#[derive(Args, Debug)]
pub struct HierarchyArgs {
    /// Word or synset id whose broader concepts to show
    pub word: String,

    /// Print the hierarchy as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute the search command.
pub fn search(args: SearchArgs, config: Config) -> anyhow::Result<()> {
    let tagger = Tagger::load(config)?;
    let report = tagger.search(&args.word)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", format_report(&report));
    }
    Ok(())
}

/// Execute the hierarchy command.
pub fn hierarchy(args: HierarchyArgs, config: Config) -> anyhow::Result<()> {
    let tagger = Tagger::load(config)?;
    let senses = tagger.label_hierarchy(&args.word)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&senses)?);
    } else {
        for sense in &senses {
            print!("{}", format_hierarchy(sense));
        }
    }
    Ok(())
}

fn format_report(report: &SearchReport) -> String {
    let yes_no = |b: bool| if b { "yes" } else { "no" };
    let mut out = format!(
        "{}\n  word vector: {}\n  senses:      {}\n",
        report.word,
        yes_no(report.in_vectors),
        report.senses.len()
    );
    for sense in &report.senses {
        out.push_str(&format!("    {}  {}\n", sense.id, sense.terms.join(", ")));
        if let Some(gloss) = &sense.gloss {
            out.push_str(&format!("               {}\n", gloss));
        }
    }
    out
}

fn format_hierarchy(sense: &SenseHierarchy) -> String {
    let mut out = format!("{} ({})\n", sense.id, sense.terms.join(", "));
    for entry in &sense.ancestors {
        out.push_str(&format!("  {:>2}  {}\n", entry.level, entry.label));
    }
    out
}
