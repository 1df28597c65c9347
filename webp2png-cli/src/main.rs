use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use std::io;
use std::path::PathBuf;

use webp2png::{
    Backend, ConvertConfig, Converter, DataUrlSink, DirectorySink, DownloadSink, FailurePolicy,
    HttpFetcher, PngCompression, SourceFile, WebpDecoder,
};

#[derive(Parser)]
#[command(name = "webp2png")]
#[command(about = "Convert webp images to png in one click", long_about = None)]
#[command(version)]
struct Args {
    /// Input webp files
    #[arg(value_name = "INPUT")]
    inputs: Vec<PathBuf>,

    /// Remote webp resource to fetch and convert (repeatable)
    #[arg(long, value_name = "URL")]
    url: Vec<String>,

    /// Output directory
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Drawing surface to paint on
    #[arg(long, value_name = "ID")]
    surface: Option<String>,

    /// PNG compression level
    #[arg(long, value_enum)]
    png_compression: Option<PngCompressionArg>,

    /// What to do when a file fails to decode
    #[arg(long, value_enum)]
    on_failure: Option<FailurePolicyArg>,

    /// Print data URLs to stdout instead of writing files
    #[arg(long, default_value_t)]
    data_url: bool,

    /// Persist the effective settings as the new defaults
    #[arg(long, default_value_t)]
    save_config: bool,

    /// Verbose output
    #[arg(short, long, default_value_t)]
    verbose: bool,

    /// Quiet mode (minimal output)
    #[arg(short, long, default_value_t)]
    quiet: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum PngCompressionArg {
    Fast,
    Default,
    Best,
}

impl From<PngCompressionArg> for PngCompression {
    fn from(arg: PngCompressionArg) -> Self {
        match arg {
            PngCompressionArg::Fast => PngCompression::Fast,
            PngCompressionArg::Default => PngCompression::Default,
            PngCompressionArg::Best => PngCompression::Best,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum FailurePolicyArg {
    Download,
    Abort,
}

impl From<FailurePolicyArg> for FailurePolicy {
    fn from(arg: FailurePolicyArg) -> Self {
        match arg {
            FailurePolicyArg::Download => FailurePolicy::DownloadAnyway,
            FailurePolicyArg::Abort => FailurePolicy::Abort,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging
    setup_logging(args.verbose, args.quiet);

    let config = build_config(&args);
    if args.save_config && config.save().is_none() {
        log::warn!("Failed to save config");
    }

    if args.inputs.is_empty() && args.url.is_empty() {
        if args.save_config {
            return Ok(());
        }
        anyhow::bail!("Nothing to convert: pass webp files or --url");
    }

    let failures = if args.data_url {
        let sink = DataUrlSink::new(io::stdout().lock());
        run(&args, config, sink)?
    } else {
        if !args.output_dir.exists() {
            std::fs::create_dir_all(&args.output_dir)
                .context("Failed to create output directory")?;
        }
        run(&args, config, DirectorySink::new(&args.output_dir))?
    };

    if failures > 0 {
        anyhow::bail!("{failures} conversion(s) failed");
    }

    Ok(())
}

/// Convert every input in order, returning how many failed
fn run<S: DownloadSink>(args: &Args, config: ConvertConfig, sink: S) -> Result<usize> {
    let surface_id = config.surface_id.clone();
    let mut converter = Converter::new(config, Backend::ready(WebpDecoder), sink);
    let mut failures = 0;

    for input in &args.inputs {
        let result = SourceFile::open(input, converter.config())
            .and_then(|source| converter.convert_file(&source));
        match result {
            Ok(conversion) => report(args, &conversion),
            Err(e) => {
                log::error!("{}: {e}", input.display());
                failures += 1;
            }
        }
    }

    if !args.url.is_empty() {
        let fetcher = HttpFetcher::new().context("Failed to build HTTP client")?;
        for url in &args.url {
            match converter.load_from_url(&fetcher, url, &surface_id) {
                Ok(conversion) => report(args, &conversion),
                Err(e) => {
                    log::error!("{url}: {e}");
                    failures += 1;
                }
            }
        }
    }

    Ok(failures)
}

fn report(args: &Args, conversion: &webp2png::Conversion) {
    if args.quiet {
        return;
    }

    let (width, height) = conversion.dimensions;
    if conversion.status.is_success() {
        log::info!(
            "Done: {} ({width}x{height}, {} bytes, decoded in {:?})",
            conversion.file_name,
            conversion.bytes,
            conversion.decode_time
        );
    } else {
        log::warn!(
            "Downloaded {} although decoding failed (status {})",
            conversion.file_name,
            conversion.status
        );
    }
}

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return;
    }

    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn build_config(args: &Args) -> ConvertConfig {
    build_config_from(ConvertConfig::load().unwrap_or_default(), args)
}

/// Apply command-line overrides on top of `config`
fn build_config_from(mut config: ConvertConfig, args: &Args) -> ConvertConfig {

    if let Some(surface) = &args.surface {
        config.surface_id = surface.clone();
    }
    if let Some(compression) = args.png_compression {
        config.png_compression = compression.into();
    }
    if let Some(policy) = args.on_failure {
        config.failure_policy = policy.into();
    }

    config
}
