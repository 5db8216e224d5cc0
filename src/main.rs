use clap::{Parser, Subcommand, ValueEnum};
use photochute::export::{
    ExportSettings, Focus, ImageBackend, OutputFormat, Quality, ResizeMode, RustBackend,
    export_image,
};
use photochute::{config, intake, output};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "photochute")]
#[command(about = "Convert, resize, and file away photos exported from a phone")]
#[command(long_about = "\
Convert, resize, and file away photos exported from a phone

Two ways to use it:

  photochute intake              Sweep the drop folder once: every photo is
                                 box-fitted to the configured canvas, written
                                 as a compressed JPEG (metadata stripped),
                                 and the original is filed away under a
                                 timestamped name. Wire this command to
                                 Hazel, cron, or a folder-watch trigger.

  photochute export photo.png    One-shot export of a single image with a
                                 chosen resize mode:

                                   exact    crop-and-scale to exactly WxH,
                                            anchored by --focus
                                   max      bound one or both dimensions,
                                            aspect preserved
                                   box      fit inside WxH, aspect
                                            preserved, no crop
                                   default  re-encode only

Input formats: JPEG, PNG, TIFF, WebP, and AVIF (the phone container with a
pure-Rust decoder). HEVC-encoded .heic is not supported — export from the
phone as AVIF or JPEG instead.

Run 'photochute gen-config' to generate a documented photochute.toml.")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Export a single image with a chosen resize mode
    Export(ExportArgs),
    /// Sweep the drop folder once and file originals away
    Intake(IntakeArgs),
    /// Print a stock photochute.toml with all options documented
    GenConfig,
}

#[derive(clap::Args)]
struct ExportArgs {
    /// Source image
    input: PathBuf,

    /// Resize mode
    #[arg(long, value_enum, default_value_t = ModeArg::Default)]
    mode: ModeArg,

    /// Target width (exact and box modes)
    #[arg(long)]
    width: Option<u32>,

    /// Target height (exact and box modes)
    #[arg(long)]
    height: Option<u32>,

    /// Width bound (max mode)
    #[arg(long)]
    max_width: Option<u32>,

    /// Height bound (max mode)
    #[arg(long)]
    max_height: Option<u32>,

    /// Crop anchor for exact mode: center, top, bottom, or a percentage like 45%
    #[arg(long, default_value = "center")]
    focus: String,

    /// Output format (default: inferred from the input extension)
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// JPEG quality (1-100)
    #[arg(long, default_value_t = 85)]
    quality: u32,

    /// Explicit output path (default: derived next to the input)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Carry EXIF metadata into the output instead of stripping it
    #[arg(long)]
    keep_metadata: bool,
}

#[derive(clap::Args)]
struct IntakeArgs {
    /// Config file; must exist when given. Without it, photochute.toml is
    /// used when present, else defaults plus INPUT_FOLDER/OUTPUT_FOLDER.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Emit the sweep report as JSON instead of the per-file listing
    #[arg(long)]
    json: bool,
}

#[derive(ValueEnum, Clone, Copy)]
enum ModeArg {
    Exact,
    Max,
    Box,
    Default,
}

#[derive(ValueEnum, Clone, Copy)]
enum FormatArg {
    Jpg,
    Png,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Jpg => OutputFormat::Jpeg,
            FormatArg::Png => OutputFormat::Png,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Export(args) => run_export(args)?,
        Command::Intake(args) => {
            let config = match &args.config {
                Some(path) => config::IntakeConfig::load(path)?,
                None => config::IntakeConfig::load_or_default(Path::new("photochute.toml"))?,
            };
            config.validate()?;

            let backend = RustBackend::new();
            let report = intake::run(&backend, &config)?;

            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                output::print_intake_report(&report);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn run_export(args: ExportArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mode = resolve_mode(&args)?;

    let settings = ExportSettings {
        format: args.format.map(OutputFormat::from),
        quality: Quality::new(args.quality),
        output: args.output.clone(),
        keep_metadata: args.keep_metadata,
    };

    let backend = RustBackend::new();
    let written = export_image(&backend, &args.input, mode, &settings)?;

    let dims = backend.identify(&written)?;
    let bytes = std::fs::metadata(&written)?.len();
    output::print_export_summary(&written, (dims.width, dims.height), bytes);

    Ok(())
}

/// Map the flat CLI flags onto the closed mode enum, rejecting combinations
/// the chosen mode cannot use.
fn resolve_mode(args: &ExportArgs) -> Result<ResizeMode, String> {
    match args.mode {
        ModeArg::Exact => {
            let (Some(width), Some(height)) = (args.width, args.height) else {
                return Err("exact mode requires --width and --height".to_string());
            };
            let focus: Focus = args.focus.parse()?;
            Ok(ResizeMode::Exact {
                width,
                height,
                focus,
            })
        }
        ModeArg::Max => Ok(ResizeMode::MaxBound {
            max_width: args.max_width,
            max_height: args.max_height,
        }),
        ModeArg::Box => {
            let (Some(width), Some(height)) = (args.width, args.height) else {
                return Err("box mode requires --width and --height".to_string());
            };
            Ok(ResizeMode::Box { width, height })
        }
        ModeArg::Default => Ok(ResizeMode::Passthrough),
    }
}
