//! The `imtag add-label` and `imtag labels` commands.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use imtag_core::{Config, Registration, Tagger};

/// Arguments for the `add-label` command.
#[derive(Args, Debug)]
pub struct AddLabelArgs {
    /// Words or synset ids (e.g. n02084071) to register
    #[arg(required_unless_present = "file")]
    pub words: Vec<String>,

    /// Also register every line of this file
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Print registrations as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `labels` command.
#[derive(Args, Debug)]
pub struct LabelsArgs {
    #[command(subcommand)]
    pub command: LabelsCommand,
}

/// Subcommands for the label registry.
#[derive(Subcommand, Debug)]
pub enum LabelsCommand {
    /// List registered labels
    List,

    /// Remove registered labels by their stored entry
    Remove {
        #[arg(required = true)]
        entries: Vec<String>,
    },

    /// Show the registry file path
    Path,
}

/// Execute the add-label command.
pub fn add(args: AddLabelArgs, config: Config) -> anyhow::Result<()> {
    let tagger = Tagger::load(config)?;

    let mut registrations = Vec::new();
    if !args.words.is_empty() {
        let mut registry = tagger.open_registry()?;
        for word in &args.words {
            registrations.push(tagger.register(&mut registry, word)?);
        }
        registry.save()?;
    }
    if let Some(file) = &args.file {
        registrations.extend(tagger.add_labels_from_file(file)?);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&registrations)?);
    } else {
        for registration in &registrations {
            print!("{}", format_registration(registration));
        }
    }

    let added: usize = registrations
        .iter()
        .flat_map(|r| &r.senses)
        .filter(|s| s.newly_added)
        .count();
    tracing::info!("Registered {} new label(s)", added);
    Ok(())
}

/// Execute the labels command.
pub fn execute(args: LabelsArgs, config: Config) -> anyhow::Result<()> {
    let path = config.registry_path();
    let mut registry = imtag_core::LabelRegistry::open(&path)?;

    match args.command {
        LabelsCommand::List => {
            for label in registry.labels() {
                println!("{}", label);
            }
            tracing::debug!("{} label(s) in {:?}", registry.len(), path);
        }

        LabelsCommand::Remove { entries } => {
            let mut removed = 0;
            for entry in &entries {
                if registry.remove(entry) {
                    removed += 1;
                } else {
                    tracing::warn!("{} is not registered", entry);
                }
            }
            if removed > 0 {
                registry.save()?;
            }
            println!("Removed {} label(s)", removed);
        }

        LabelsCommand::Path => {
            println!("{}", path.display());
        }
    }

    Ok(())
}

/// Human-readable summary of one registration.
fn format_registration(registration: &Registration) -> String {
    let mut out = String::new();
    for sense in &registration.senses {
        let status = if sense.newly_added {
            "registered"
        } else {
            "already registered"
        };
        out.push_str(&format!(
            "{} {} as {} ({})",
            registration.word,
            status,
            sense.id,
            sense.terms.join(", ")
        ));
        if !sense.has_vector {
            out.push_str(" [no word vector]");
        }
        out.push('\n');
        if !sense.ancestors.is_empty() {
            out.push_str(&format!("    implies: {}\n", sense.ancestors.join(", ")));
        }
    }
    out
}
