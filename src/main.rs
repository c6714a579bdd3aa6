use clap::{Parser, Subcommand, ValueEnum};
use printcrop::catalog::{Orientation, SizeCatalog};
use printcrop::config::{self, Settings};
use printcrop::run::{self, RunOptions};
use printcrop::{output, process::ProgressSink};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "printcrop")]
#[command(about = "Batch-crop photos into a catalog of print sizes")]
#[command(long_about = "\
Batch-crop photos into a catalog of print sizes

Every source image becomes one PNG and one JPEG per print size, center-cropped
to the print's aspect ratio and resized to its exact pixel size at the
configured DPI. The finished output tree is bundled into a zip archive.

Output structure (vertical source):

  output/
  ├── 2x3/      beach_4x6.png, beach_4x6.jpg, ... beach_24x36.jpg
  ├── 4x5/      beach_4x5.png, ... beach_24x30.jpg
  ├── ISO/      beach_A5.png, ... beach_A0.jpg
  ├── 11x14/    beach_11x14.png, beach_11x14.jpg
  └── processed_images.zip

Horizontal and square sources use 3x2, 5x4, ISO and 14x11 instead.

Run 'printcrop gen-config' to generate a documented printcrop.toml.
Set RUST_LOG=debug for per-file diagnostics.")]
#[command(version)]
struct Cli {
    /// Settings file [default: printcrop.toml, skipped when absent]
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate prints for one image or every image in a directory
    Run {
        /// Image file or directory of images (not recursive)
        input: PathBuf,

        /// Output directory
        #[arg(long, short, default_value = "output")]
        output: PathBuf,

        /// Text drawn in the bottom-right corner of every print
        #[arg(long, short)]
        watermark: Option<String>,

        /// Override the configured print resolution
        #[arg(long)]
        dpi: Option<u32>,
    },
    /// List the print sizes for an orientation
    Sizes {
        #[arg(long, value_enum, default_value_t = OrientationArg::Vertical)]
        orientation: OrientationArg,

        /// Override the configured print resolution
        #[arg(long)]
        dpi: Option<u32>,
    },
    /// Print a stock printcrop.toml with all options documented
    GenConfig,
}

#[derive(Clone, Copy, ValueEnum)]
enum OrientationArg {
    Vertical,
    Horizontal,
}

impl From<OrientationArg> for Orientation {
    fn from(arg: OrientationArg) -> Self {
        match arg {
            OrientationArg::Vertical => Orientation::Vertical,
            OrientationArg::Horizontal => Orientation::Horizontal,
        }
    }
}

/// Progress bar redrawn in place on stderr, one line per image.
struct ConsoleProgress;

impl ProgressSink for ConsoleProgress {
    fn report(&mut self, percent: f64) {
        let mut stderr = std::io::stderr().lock();
        let _ = write!(stderr, "\r{}", output::format_progress(percent));
        if percent >= 100.0 {
            let _ = writeln!(stderr);
        }
        let _ = stderr.flush();
    }
}

/// An explicit `--config` must exist; the default file is optional.
fn load_settings(path: Option<&Path>, dpi: Option<u32>) -> Result<Settings, config::ConfigError> {
    let mut settings = match path {
        Some(path) => config::load_required_config_file(path)?,
        None => config::load_config_file(Path::new(config::CONFIG_FILE_NAME))?,
    };
    if let Some(dpi) = dpi {
        settings.dpi = dpi;
        settings.validate()?;
    }
    Ok(settings)
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run {
            input,
            output: output_dir,
            watermark,
            dpi,
        } => {
            let settings = load_settings(cli.config.as_deref(), dpi)?;
            let mut progress = ConsoleProgress;
            let report = run::run(
                &input,
                &output_dir,
                &settings,
                RunOptions {
                    watermark,
                    progress: Some(&mut progress),
                    ..RunOptions::default()
                },
            )?;
            output::print_run_report(&report);
            if report.failed_count() > 0 {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Sizes { orientation, dpi } => {
            let settings = load_settings(cli.config.as_deref(), dpi)?;
            output::print_catalog(SizeCatalog::standard(), orientation.into(), settings.dpi);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(ExitCode::SUCCESS)
}
