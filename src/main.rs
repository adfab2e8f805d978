use clap::{Parser, Subcommand};
use sendable::config::{self, MediaConfig};
use sendable::{Converter, MediaKind, output};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sendable")]
#[command(about = "Make photos and videos acceptable to a messaging platform")]
#[command(long_about = "\
Make photos and videos acceptable to a messaging platform

Each file is probed, checked against the platform limits, and converted
only when it does not already conform:

  photo    width + height <= 9999, aspect ratio < 20, size < 10 MiB,
           jpg/jpeg/png; otherwise resized and/or re-encoded to JPEG
  video    mp4/mov with h264/hevc; otherwise re-encoded to H.264/AAC MP4
  preview  a 320x320-bounded JPEG of the frame halfway through a video

Without --to, converted files are written to the temp directory and their
path is printed; a file that already conforms is left alone.

Needs ImageMagick (convert) and FFmpeg (ffmpeg, ffprobe) on PATH, or their
paths in the config file. Run 'sendable gen-config' for a documented one.")]
#[command(version)]
struct Cli {
    /// Config file (TOML); stock defaults when absent
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log tool invocations and classification steps
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Make a photo sendable
    Photo(ConvertArgs),
    /// Make a video sendable
    Video(ConvertArgs),
    /// Cut a thumbnail from the middle of a video
    Preview(ConvertArgs),
    /// Print what the probe sees and the resulting verdict
    Stat {
        path: PathBuf,
        /// Classify as a video instead of a photo
        #[arg(long)]
        video: bool,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print a stock config file with all options documented
    GenConfig,
}

#[derive(clap::Args)]
struct ConvertArgs {
    path: PathBuf,
    /// Write the result here instead of a temp file
    #[arg(long)]
    to: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let converter = Converter::new(load(cli.config.as_deref())?);

    match cli.command {
        Command::Photo(args) => match args.to {
            Some(dest) => {
                converter.photo_to(&args.path, &dest)?;
                output::print_written(&args.path, &dest);
            }
            None => output::print_outcome(&args.path, &converter.photo(&args.path)?),
        },
        Command::Video(args) => match args.to {
            Some(dest) => {
                converter.video_to(&args.path, &dest)?;
                output::print_written(&args.path, &dest);
            }
            None => output::print_outcome(&args.path, &converter.video(&args.path)?),
        },
        Command::Preview(args) => {
            let dest = match args.to {
                Some(dest) => {
                    converter.generate_preview_to(&args.path, &dest)?;
                    dest
                }
                None => converter.generate_preview(&args.path)?,
            };
            output::print_written(&args.path, &dest);
        }
        Command::Stat { path, video, json } => {
            let kind = if video {
                MediaKind::Video
            } else {
                MediaKind::Image
            };
            let (stat, verdict) = converter.check(&path, kind)?;
            if json {
                println!("{}", output::stat_json(&stat, verdict)?);
            } else {
                output::print_stat(&stat, verdict);
            }
        }
        Command::GenConfig => {}
    }

    Ok(())
}

/// Log to stderr. `RUST_LOG` wins over `--verbose` when set.
fn init_logging(verbose: bool) {
    let default = if verbose { "sendable=debug" } else { "sendable=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load(path: Option<&Path>) -> Result<MediaConfig, config::ConfigError> {
    match path {
        Some(path) => config::load_config(path),
        None => Ok(MediaConfig::default()),
    }
}
