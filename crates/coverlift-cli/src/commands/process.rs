//! Upscale, restore and run commands.
//!
//! All three build a [`ProcessingOptions`], submit one job to a worker and
//! write the `COMPLETE` payload to the output path.

use std::path::Path;

use anyhow::{Context, Result, bail};
use coverlift_worker::{
    Inbound, Outbound, PostProcess, PreProcess, ProcessingOptions, Worker, WorkerConfig,
};
use tracing::debug;

use crate::{RestoreArgs, RunArgs, UpscaleArgs};

pub fn upscale(args: UpscaleArgs, mut config: WorkerConfig, verbose: bool) -> Result<()> {
    if let Some(filter) = args.filter {
        config.resample_filter = filter.into();
    }
    let options = ProcessingOptions {
        pre_process: PreProcess {
            denoise: args.denoise,
            denoise_strength: args.denoise_strength,
        },
        post_process: PostProcess {
            contrast: args.contrast,
            contrast_amount: args.contrast_amount,
            vibrance: args.vibrance,
            vibrance_amount: args.vibrance_amount,
        },
        ..ProcessingOptions::upscale(args.scale, args.algorithm.into(), args.sharpness)
    };
    process(&args.input, &args.output, options, config, verbose)
}

pub fn restore(args: RestoreArgs, config: WorkerConfig, verbose: bool) -> Result<()> {
    let options = ProcessingOptions::restore(args.algorithm.into(), args.sharpness);
    process(&args.input, &args.output, options, config, verbose)
}

pub fn run(args: RunArgs, config: WorkerConfig, verbose: bool) -> Result<()> {
    let options = ProcessingOptions::from_json_file(&args.options)
        .with_context(|| format!("Failed to load options: {}", args.options.display()))?;
    process(&args.input, &args.output, options, config, verbose)
}

fn process(
    input: &Path,
    output: &Path,
    options: ProcessingOptions,
    config: WorkerConfig,
    verbose: bool,
) -> Result<()> {
    let file = super::read_input(input)?;
    let job_id = input.display().to_string();
    debug!(?options, ?config, "submitting");

    if verbose {
        println!("Processing {} ({:?})", input.display(), options.mode);
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .build()
        .context("Failed to start runtime")?;

    let result = runtime.block_on(async {
        let (worker, mut replies) = Worker::spawn(config);
        worker
            .submit(Inbound::process_image(job_id, file, options))
            .await?;

        let mut result = None;
        while let Some(msg) = replies.recv().await {
            match msg {
                Outbound::Progress { progress, .. } => {
                    if verbose {
                        println!("  [{progress:>3}%]");
                    }
                }
                Outbound::Complete { result: bytes, .. } => {
                    result = Some(Ok(bytes));
                    break;
                }
                Outbound::Error { error, .. } => {
                    result = Some(Err(error));
                    break;
                }
            }
        }
        worker.shutdown().await?;
        anyhow::Ok(result)
    })?;

    let bytes = match result {
        Some(Ok(bytes)) => bytes,
        Some(Err(error)) => bail!("{}: {error}", input.display()),
        None => bail!("worker exited without a result"),
    };

    std::fs::write(output, &bytes)
        .with_context(|| format!("Failed to save: {}", output.display()))?;

    if verbose {
        println!("Wrote {} ({} bytes)", output.display(), bytes.len());
    }

    Ok(())
}
