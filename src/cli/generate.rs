//! Generate command implementation

use crate::cli::{GenerateArgs, RunArgs};
use crate::config::{LogFormat, PostforgeConfig};
use crate::pipeline::PipelineOrchestrator;
use crate::provider::{
    GeminiProvider, ImageClient, ImageGenerator, KeylessClient, TextGenerator,
};
use crate::routing::ProviderRouter;
use crate::throttle::{Sleeper, Throttler, TokioSleeper};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Load configuration with CLI overrides
///
/// Precedence: CLI flags, then `POSTFORGE_*` variables, then the file, then defaults.
pub fn load_config_with_overrides(
    args: &RunArgs,
) -> Result<PostforgeConfig, Box<dyn std::error::Error>> {
    // Load from file if it exists, otherwise use defaults
    let mut config = if args.config.exists() {
        PostforgeConfig::load(Some(&args.config))?
    } else {
        tracing::debug!("Config file not found, using defaults");
        PostforgeConfig::default()
    };

    config = config.with_env_overrides();

    if let Some(ref log_level) = args.log_level {
        config.logging.level = log_level.clone();
    }
    if args.no_throttle {
        config.pipeline.section_interval_secs = 0;
        config.pipeline.topic_interval_secs = 0;
    }
    if args.no_images {
        config.images.enabled = false;
    }

    Ok(config)
}

/// Initialize tracing based on configuration
///
/// Logs go to stderr so stdout stays free for JSON output.
pub fn init_tracing(
    config: &crate::config::LoggingConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let filter_str = crate::logging::build_filter_directives(config);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    if config.enable_content_logging {
        eprintln!("WARNING: Content logging is enabled. Prompt text will be logged (truncated).");
    }

    match config.format {
        LogFormat::Compact => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .compact()
                        .with_writer(std::io::stderr),
                )
                .try_init()?;
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .pretty()
                        .with_writer(std::io::stderr),
                )
                .try_init()?;
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .try_init()?;
        }
    }

    Ok(())
}

/// Wire the router, keyless client, image client and throttler from configuration.
///
/// Without a credential the router never touches the primary provider.
pub fn build_orchestrator(
    config: &PostforgeConfig,
    cancel: CancellationToken,
) -> Result<PipelineOrchestrator, Box<dyn std::error::Error>> {
    let client = Arc::new(reqwest::Client::builder().build()?);
    let sleeper: Arc<dyn Sleeper> = Arc::new(TokioSleeper);

    let keyless: Arc<dyn TextGenerator> = Arc::new(KeylessClient::new(
        config.keyless.clone(),
        client.clone(),
        sleeper.clone(),
    ));

    let router = match config.primary.api_key() {
        Some(api_key) => {
            tracing::info!(
                candidates = config.routing.candidates.len(),
                "primary credential found"
            );
            let primary = Arc::new(GeminiProvider::new(
                config.primary.base_url.clone(),
                api_key,
                client,
                config.primary.timeout(),
            ));
            ProviderRouter::new(
                primary,
                config.routing.candidates.clone(),
                keyless,
                sleeper.clone(),
            )
            .with_retry_policy(config.routing.max_retries, config.routing.retry_delay())
        }
        None => {
            tracing::info!(
                env = %config.primary.api_key_env,
                "no primary credential, using keyless provider only"
            );
            ProviderRouter::keyless_only(keyless, sleeper.clone())
        }
    };

    let images: Option<Arc<dyn ImageGenerator>> = if config.images.enabled {
        Some(Arc::new(ImageClient::new(&config.images)))
    } else {
        None
    };

    let throttler = Throttler::new(config.pipeline.section_interval(), sleeper);

    Ok(PipelineOrchestrator::new(
        Arc::new(router),
        images,
        throttler,
        config.pipeline.clone(),
    )
    .with_cancellation(cancel)
    .with_content_logging(config.logging.enable_content_logging))
}

/// Cancel `token` on Ctrl-C.
pub fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("Cancelling...");
            token.cancel();
        }
    });
}

/// Main generate command handler
pub async fn run_generate(args: GenerateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config_with_overrides(&args.run)?;
    config.validate()?;
    init_tracing(&config.logging)?;

    let cancel = CancellationToken::new();
    cancel_on_ctrl_c(cancel.clone());
    let orchestrator = build_orchestrator(&config, cancel)?;

    let quiet = args.json;
    let output = orchestrator
        .generate_full_post(&args.topic, |status| {
            if !quiet {
                eprintln!("  {}", status);
            }
        })
        .await?;

    if let Some(path) = &args.output {
        std::fs::write(path, serde_json::to_string_pretty(&output.post)?)?;
    }

    if args.json {
        println!("{}", super::output::format_output_json(&output)?);
    } else {
        println!("{}", super::output::format_post_summary(&output));
        if let Some(path) = &args.output {
            println!("Written to {}", path.display());
        }
    }

    Ok(())
}
