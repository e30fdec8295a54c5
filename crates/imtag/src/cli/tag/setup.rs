//! Tagger setup: config overrides, engine and classifier loading.

use std::sync::Arc;
use std::time::Duration;

use imtag_core::classifier::ClassifierRegistry;
use imtag_core::{Config, LabelSet, OutputFormat as CoreOutputFormat, Tagger};

use super::types::OutputFormat;
use super::{TagArgs, TagContext};

/// Apply CLI overrides to the loaded config.
pub fn apply_overrides(config: &mut Config, args: &TagArgs) -> anyhow::Result<()> {
    if let Some(k) = args.k {
        config.tagging.k = k;
    }
    if let Some(metric) = args.metric {
        config.tagging.metric = metric;
    }
    if args.raw {
        config.tagging.raw_results = true;
    }
    if let Some(name) = &args.classifier {
        config.classifier.name = name.clone();
    }
    if let Some(top_k) = args.top_k {
        config.classifier.top_k = top_k;
    }
    if let Some(min_confidence) = args.min_confidence {
        config.classifier.min_confidence = min_confidence;
    }
    if args.pretty {
        config.output.pretty = true;
    }
    config.validate()?;
    Ok(())
}

/// Output format: the flag if given, else the config default.
pub fn resolve_format(config: &Config, args: &TagArgs) -> OutputFormat {
    args.format.unwrap_or_else(|| {
        CoreOutputFormat::parse(&config.output.format)
            .unwrap_or(CoreOutputFormat::Json)
            .into()
    })
}

/// Validate input, load the engine and classifier, and prepare labels.
pub fn setup_tagger(args: &TagArgs, mut config: Config) -> anyhow::Result<TagContext> {
    if !args.input.exists() {
        anyhow::bail!(
            "Input path does not exist: {:?}\n\n  Hint: Check the file path and try again.",
            args.input
        );
    }

    apply_overrides(&mut config, args)?;
    let format = resolve_format(&config, args);
    let timeout = Duration::from_millis(config.limits.classify_timeout_ms);

    let registry = ClassifierRegistry::builtin();
    let descriptor = registry.get(&config.classifier.name)?;
    if !descriptor.is_available(&config.data_dir()) {
        anyhow::bail!(
            "Classifier '{}' is not installed.\n\n  Expected {} and {} in {}.\n  \
             Run `imtag classifiers` to see what is available.",
            descriptor.name,
            descriptor.model_file,
            descriptor.labels_file,
            config.data_dir().display()
        );
    }

    let mut tagger = Tagger::load(config)?;
    tagger.load_classifier(&registry)?;

    let labels = if tagger.config().tagging.raw_results {
        LabelSet::default()
    } else {
        let labels = tagger.prepare_labels()?;
        if labels.is_empty() {
            tracing::warn!("No usable labels registered. Run `imtag add-label <word>` first.");
        } else {
            tracing::info!("Tagging against {} label(s)", labels.len());
        }
        labels
    };

    Ok(TagContext {
        tagger: Arc::new(tagger),
        labels: Arc::new(labels),
        format,
        timeout,
        straggler: None,
    })
}
