//! Batch tagging: directory traversal with progress and streaming output.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::time::{Duration, Instant};

use imtag_core::discovery::DiscoveredFile;
use imtag_core::{OutputWriter, TaggedImage, TaggingStats};

use super::types::OutputFormat;
use super::{tag_with_deadline, TagArgs, TagContext};

/// Tag a directory of images with progress tracking.
///
/// JSON Lines output is streamed as images finish; JSON output is written
/// as one array at the end. Failed images are logged and counted.
pub async fn tag_batch(
    mut ctx: TagContext,
    args: &TagArgs,
    files: Vec<DiscoveredFile>,
) -> anyhow::Result<()> {
    let progress = create_progress_bar(files.len() as u64);
    let pretty = ctx.tagger.config().output.pretty;

    let sink: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(std::io::stdout()),
    };
    let mut writer = OutputWriter::new(sink, ctx.format.into(), pretty);
    let streaming = ctx.format == OutputFormat::Jsonl;

    let mut results: Vec<TaggedImage> = Vec::new();
    let mut stats = TaggingStats::default();
    let mut total_bytes: u64 = 0;
    let start_time = Instant::now();

    for file in files {
        let size = file.size;
        let path = file.path.clone();
        match tag_with_deadline(&mut ctx, file).await {
            Ok(result) => {
                stats.succeeded += 1;
                total_bytes += size;
                if streaming {
                    progress.suspend(|| writer.write(&result))?;
                } else {
                    results.push(result);
                }
            }
            Err(e) => {
                stats.failed += 1;
                progress.suspend(|| tracing::error!("Failed: {:?} - {}", path, e));
            }
        }

        progress.inc(1);
        let elapsed = start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            let done = stats.succeeded + stats.failed;
            progress.set_message(format!("{:.1} img/sec", done as f64 / elapsed));
        }
    }

    if !streaming {
        writer.write_all(&results)?;
    }
    writer.flush()?;
    if let Some(output_path) = &args.output {
        tracing::info!("Output written to {:?}", output_path);
    }

    let elapsed = start_time.elapsed();
    stats.total_seconds = elapsed.as_secs_f64();
    if stats.total_seconds > 0.0 {
        stats.images_per_second = stats.succeeded as f64 / stats.total_seconds;
    }

    progress.finish_and_clear();
    print_summary(&stats, total_bytes, elapsed);

    Ok(())
}

/// Create a progress bar for batch tagging.
fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
    pb.set_style(style);
    pb.set_message("starting...");
    pb
}

/// Print a formatted summary table after batch tagging.
fn print_summary(stats: &TaggingStats, total_bytes: u64, elapsed: Duration) {
    eprint!("{}", format_summary(stats, total_bytes, elapsed));
}

fn format_summary(stats: &TaggingStats, total_bytes: u64, elapsed: Duration) -> String {
    let total = stats.succeeded + stats.failed;
    let mb_processed = total_bytes as f64 / 1_000_000.0;
    let throughput = if elapsed.as_secs_f64() > 0.0 {
        mb_processed / elapsed.as_secs_f64()
    } else {
        0.0
    };

    let mut out = String::new();
    out.push('\n');
    out.push_str("  ====================================\n");
    out.push_str("               Summary\n");
    out.push_str("  ====================================\n");
    out.push_str(&format!("    Succeeded:    {:>8}\n", stats.succeeded));
    if stats.failed > 0 {
        out.push_str(&format!("    Failed:       {:>8}\n", stats.failed));
    }
    out.push_str("  ------------------------------------\n");
    out.push_str(&format!("    Total:        {:>8}\n", total));
    out.push_str(&format!("    Duration:     {:>7.1}s\n", elapsed.as_secs_f64()));
    out.push_str(&format!(
        "    Rate:         {:>7.1} img/sec\n",
        stats.images_per_second
    ));
    out.push_str(&format!("    Throughput:   {:>7.1} MB/sec\n", throughput));
    out.push_str("  ====================================\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts() {
        let stats = TaggingStats {
            succeeded: 8,
            failed: 2,
            images_per_second: 4.0,
            total_seconds: 2.0,
        };
        let text = format_summary(&stats, 4_000_000, Duration::from_secs(2));
        assert!(text.contains("Succeeded:           8"));
        assert!(text.contains("Failed:              2"));
        assert!(text.contains("Total:              10"));
        assert!(text.contains("Throughput:       2.0 MB/sec"));
    }

    #[test]
    fn test_summary_hides_zero_failures() {
        let stats = TaggingStats {
            succeeded: 1,
            ..Default::default()
        };
        let text = format_summary(&stats, 0, Duration::ZERO);
        assert!(!text.contains("Failed"));
        assert!(text.contains("Throughput:       0.0 MB/sec"));
    }
}
