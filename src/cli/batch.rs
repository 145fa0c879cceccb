//! Batch command implementation

use crate::cli::generate::{
    build_orchestrator, cancel_on_ctrl_c, init_tracing, load_config_with_overrides,
};
use crate::cli::output::{format_batch_json, format_batch_table};
use crate::cli::BatchArgs;
use crate::pipeline::{parse_topics, BatchItem, BatchRunner, BatchStatus};
use crate::throttle::{Throttler, TokioSleeper};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// File name for the post at batch position `index`.
///
/// The position prefix keeps names unique when slugs collide or are empty.
pub fn post_file_name(index: usize, slug: &str) -> String {
    let slug = if slug.is_empty() { "post" } else { slug };
    format!("{:03}-{}.json", index + 1, slug)
}

/// Write every finished post under `dir`, returning the paths written.
pub fn write_posts(
    items: &[BatchItem],
    dir: &Path,
) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::new();
    for (index, item) in items.iter().enumerate() {
        let Some(output) = &item.output else {
            continue;
        };
        let path = dir.join(post_file_name(index, &output.post.slug));
        std::fs::write(&path, serde_json::to_string_pretty(&output.post)?)?;
        tracing::debug!(path = %path.display(), topic = %item.topic, "post written");
        written.push(path);
    }
    Ok(written)
}

/// Main batch command handler
///
/// Exits with an error when any topic failed, after every topic was attempted.
pub async fn run_batch(args: BatchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config_with_overrides(&args.run)?;
    config.validate()?;
    init_tracing(&config.logging)?;

    let topics = parse_topics(&std::fs::read_to_string(&args.file)?);
    if topics.is_empty() {
        return Err(format!("No topics found in {}", args.file.display()).into());
    }

    let cancel = CancellationToken::new();
    cancel_on_ctrl_c(cancel.clone());
    let orchestrator = build_orchestrator(&config, cancel)?;
    let runner = BatchRunner::new(
        orchestrator,
        Throttler::new(config.pipeline.topic_interval(), Arc::new(TokioSleeper)),
    );

    let total = topics.len();
    let quiet = args.json;
    let items = runner
        .run(topics, |index, status| {
            if !quiet {
                eprintln!("  [{}/{}] {}", index + 1, total, status);
            }
        })
        .await;

    if let Some(dir) = &args.output_dir {
        let written = write_posts(&items, dir)?;
        if !quiet {
            eprintln!("Wrote {} post(s) to {}", written.len(), dir.display());
        }
    }

    if args.json {
        println!("{}", format_batch_json(&items)?);
    } else {
        println!("{}", format_batch_table(&items));
    }

    let failed = items
        .iter()
        .filter(|item| item.status != BatchStatus::Done)
        .count();
    if failed > 0 {
        return Err(format!("{} of {} topic(s) did not complete", failed, total).into());
    }

    Ok(())
}
