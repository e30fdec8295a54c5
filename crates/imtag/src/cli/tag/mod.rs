//! The `imtag tag` command for tagging images.

mod batch;
mod setup;
pub mod types;

pub use types::OutputFormat;

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use tokio::task::JoinHandle;
use imtag_core::discovery::DiscoveredFile;
use imtag_core::{Config, DistanceMetric, LabelSet, OutputWriter, TaggedImage, Tagger};

use batch::tag_batch;
use setup::setup_tagger;

/// Arguments for the `tag` command.
#[derive(Args, Debug)]
pub struct TagArgs {
    /// Image file or directory to tag
    #[arg(required = true)]
    pub input: PathBuf,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format (defaults to output.format in the config)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Number of registered labels to return per image
    #[arg(short)]
    pub k: Option<usize>,

    /// Distance metric: cosine, euclidean, manhattan or chi_squared
    #[arg(short, long)]
    pub metric: Option<DistanceMetric>,

    /// Report the classifier's own tags instead of registered labels
    #[arg(long)]
    pub raw: bool,

    /// Classifier to use (see `imtag classifiers`)
    #[arg(short, long)]
    pub classifier: Option<String>,

    /// Classifier tags aggregated per image (0 keeps all)
    #[arg(long)]
    pub top_k: Option<usize>,

    /// Drop classifier tags below this confidence
    #[arg(long)]
    pub min_confidence: Option<f32>,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

/// Tagging context assembled by setup_tagger().
pub(crate) struct TagContext {
    pub tagger: Arc<Tagger>,
    pub labels: Arc<LabelSet>,
    pub format: OutputFormat,
    pub timeout: Duration,
    /// Classification abandoned at its deadline and still running
    pub straggler: Option<JoinHandle<imtag_core::Result<TaggedImage>>>,
}

/// Execute the tag command.
pub async fn execute(args: TagArgs, config: Config) -> anyhow::Result<()> {
    let ctx = setup_tagger(&args, config)?;

    let files = ctx.tagger.discover(&args.input)?;
    if files.is_empty() {
        tracing::warn!("No supported image files found at {:?}", args.input);
        return Ok(());
    }
    tracing::info!("Found {} image(s) to tag", files.len());

    if args.input.is_file() {
        tag_single(ctx, &args, files.into_iter().next()).await
    } else {
        tag_batch(ctx, &args, files).await
    }
}

/// Tag one file on a blocking thread, giving up after `timeout`.
///
/// A timed-out classification keeps running and holds the classifier until
/// it finishes, so the next call waits for it before starting its own
/// deadline. The abandoned result is discarded.
pub(crate) async fn tag_with_deadline(
    ctx: &mut TagContext,
    file: DiscoveredFile,
) -> anyhow::Result<TaggedImage> {
    if let Some(straggler) = ctx.straggler.take() {
        tracing::debug!("Waiting for a timed-out classification to finish");
        let _ = straggler.await;
    }

    let tagger = Arc::clone(&ctx.tagger);
    let labels = Arc::clone(&ctx.labels);
    let path = file.path.clone();

    let mut task = tokio::task::spawn_blocking(move || tagger.tag_file(&file, &labels));
    match tokio::time::timeout(ctx.timeout, &mut task).await {
        Ok(joined) => Ok(joined??),
        Err(_) => {
            ctx.straggler = Some(task);
            anyhow::bail!("Timed out after {:?} tagging {:?}", ctx.timeout, path)
        }
    }
}

// --- Single-file tagging ---

async fn tag_single(
    mut ctx: TagContext,
    args: &TagArgs,
    file: Option<DiscoveredFile>,
) -> anyhow::Result<()> {
    let Some(file) = file else {
        return Ok(());
    };
    let result = tag_with_deadline(&mut ctx, file).await?;
    let pretty = ctx.tagger.config().output.pretty;

    if let Some(output_path) = &args.output {
        let file = File::create(output_path)?;
        let mut writer = OutputWriter::new(BufWriter::new(file), ctx.format.into(), pretty);
        writer.write(&result)?;
        writer.flush()?;
        tracing::info!("Output written to {:?}", output_path);
    } else {
        let mut writer = OutputWriter::new(std::io::stdout().lock(), ctx.format.into(), pretty);
        writer.write(&result)?;
        writer.flush()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use imtag_core::classifier::ImageClassifier;
    use imtag_core::vectors::write_store;
    use imtag_core::{ClassifierError, ConfidenceTag, Label, VectorStore};
    use std::path::Path;
    use std::sync::Mutex;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: TagArgs,
    }

    fn parse(argv: &[&str]) -> TagArgs {
        TestCli::try_parse_from(std::iter::once("tag").chain(argv.iter().copied()))
            .unwrap()
            .args
    }

    #[test]
    fn test_defaults_defer_to_config() {
        let args = parse(&["photo.jpg"]);
        assert_eq!(args.input, PathBuf::from("photo.jpg"));
        assert!(args.k.is_none());
        assert!(args.metric.is_none());
        assert!(args.format.is_none());
        assert!(!args.raw);
    }

    #[test]
    fn test_metric_aliases_parse() {
        let args = parse(&["photos", "-k", "5", "--metric", "l2", "--format", "jsonl"]);
        assert_eq!(args.k, Some(5));
        assert_eq!(args.metric, Some(DistanceMetric::Euclidean));
        assert_eq!(args.format, Some(OutputFormat::Jsonl));
    }

    #[test]
    fn test_unknown_metric_rejected() {
        assert!(
            TestCli::try_parse_from(["tag", "photos", "--metric", "hamming"]).is_err()
        );
    }

    #[test]
    fn test_overrides_applied() {
        let args = parse(&[
            "photos",
            "-k",
            "3",
            "--raw",
            "--classifier",
            "resnet_v2_152",
            "--top-k",
            "5",
            "--min-confidence",
            "0.2",
        ]);
        let mut config = Config::default();
        setup::apply_overrides(&mut config, &args).unwrap();
        assert_eq!(config.tagging.k, 3);
        assert!(config.tagging.raw_results);
        assert_eq!(config.classifier.name, "resnet_v2_152");
        assert_eq!(config.classifier.top_k, 5);
        assert!((config.classifier.min_confidence - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let args = parse(&["photos", "--min-confidence", "1.5"]);
        let mut config = Config::default();
        assert!(setup::apply_overrides(&mut config, &args).is_err());
    }

    #[test]
    fn test_format_falls_back_to_config() {
        let args = parse(&["photos"]);
        let mut config = Config::default();
        config.output.format = "jsonl".to_string();
        assert_eq!(setup::resolve_format(&config, &args), OutputFormat::Jsonl);

        let args = parse(&["photos", "-f", "json"]);
        assert_eq!(setup::resolve_format(&config, &args), OutputFormat::Json);
    }

    /// Serializes calls like a model session; `b"slow"` takes 300ms.
    struct SlowClassifier {
        session: Mutex<()>,
    }

    impl ImageClassifier for SlowClassifier {
        fn name(&self) -> &str {
            "slow"
        }

        fn classify(&self, image: &[u8]) -> Result<Vec<ConfidenceTag>, ClassifierError> {
            let _session = self.session.lock().unwrap();
            if image == b"slow" {
                std::thread::sleep(Duration::from_millis(300));
            }
            Ok(vec![ConfidenceTag::new("cat", 0.9)])
        }
    }

    fn slow_context(dir: &Path) -> TagContext {
        write_store(dir, &[Label::new("cat", vec![1.0, 0.0])]).unwrap();
        let store = VectorStore::open(dir).unwrap();
        let mut config = Config::default();
        config.general.data_dir = dir.to_path_buf();
        config.tagging.raw_results = true;
        let tagger = Tagger::new(config, Box::new(store)).with_classifier(Box::new(
            SlowClassifier {
                session: Mutex::new(()),
            },
        ));
        TagContext {
            tagger: Arc::new(tagger),
            labels: Arc::new(LabelSet::default()),
            format: OutputFormat::Jsonl,
            timeout: Duration::from_millis(100),
            straggler: None,
        }
    }

    fn image(dir: &Path, name: &str, bytes: &[u8]) -> DiscoveredFile {
        let path = dir.join(name);
        std::fs::write(&path, bytes).unwrap();
        DiscoveredFile {
            path,
            size: bytes.len() as u64,
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_timeout_does_not_spill_into_next_image() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = slow_context(dir.path());
        let slow = image(dir.path(), "slow.jpg", b"slow");
        let fast = image(dir.path(), "fast.jpg", b"fast");

        let err = tag_with_deadline(&mut ctx, slow).await.unwrap_err();
        assert!(err.to_string().contains("Timed out"));
        assert!(ctx.straggler.is_some());

        let tagged = tag_with_deadline(&mut ctx, fast).await.unwrap();
        assert!(tagged.file_path.ends_with("fast.jpg"));
        assert_eq!(tagged.classifier_tags[0].term, "cat");
        assert!(ctx.straggler.is_none());
    }
}
