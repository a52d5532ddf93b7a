use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use chromaswap_core::compositing::domain::background_spec::{BackgroundSpec, FitMode};
use chromaswap_core::compositing::infrastructure::background_loader;
use chromaswap_core::keying::domain::key_color::KeyColorSpec;
use chromaswap_core::keying::domain::keying_config::KeyingConfig;
use chromaswap_core::keying::infrastructure::chroma_keyer::ChromaKeyer;
use chromaswap_core::pipeline::batch_manifest::{BatchJob, BatchManifest};
use chromaswap_core::pipeline::compose_video_use_case::ComposeVideoUseCase;
use chromaswap_core::pipeline::extract_matte_use_case::ExtractMatteUseCase;
use chromaswap_core::pipeline::infrastructure::threaded_batch_runner::ThreadedBatchRunner;
use chromaswap_core::pipeline::job_result::JobResult;
use chromaswap_core::pipeline::pipeline_logger::{
    NullPipelineLogger, PipelineLogger, StdoutPipelineLogger,
};
use chromaswap_core::pipeline::replace_background_use_case::{
    FrameStorage, ReplaceBackgroundUseCase,
};
use chromaswap_core::shared::constants::{DEFAULT_BACKGROUND_COLOR, FALLBACK_FPS};
use chromaswap_core::shared::error::ChromaKeyError;
use chromaswap_core::shared::remote_fetch;
use chromaswap_core::video::domain::frame_sequence::MattedFrameSequence;
use chromaswap_core::video::infrastructure::ffmpeg_reader::FfmpegReader;
use chromaswap_core::video::infrastructure::ffmpeg_writer::FfmpegWriter;
use chromaswap_core::video::infrastructure::png_frame_sequence::PngFrameSequence;

/// Chroma-key background replacement for green-screen video.
#[derive(Parser)]
#[command(name = "chromaswap", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Key the source and composite it over a new background in one go.
    Replace {
        /// Source video path or http(s) URL.
        input: String,
        /// Output video file.
        output: PathBuf,
        #[command(flatten)]
        background: BackgroundArgs,
        #[command(flatten)]
        keying: KeyingArgs,
        /// Keep matted frames in memory instead of a temp directory.
        #[arg(long)]
        in_memory: bool,
        /// Print the job result as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Key the source into a folder of RGBA PNG frames.
    Extract {
        /// Source video path or http(s) URL.
        input: String,
        /// Folder for frame_00001.png, frame_00002.png, ...
        frames_dir: PathBuf,
        #[command(flatten)]
        keying: KeyingArgs,
        #[arg(long)]
        json: bool,
    },
    /// Composite a folder of PNG frames over a background and encode it.
    Compose {
        frames_dir: PathBuf,
        output: PathBuf,
        /// Output frame rate.
        #[arg(long, default_value_t = FALLBACK_FPS)]
        fps: f64,
        #[command(flatten)]
        background: BackgroundArgs,
        #[arg(long)]
        json: bool,
    },
    /// Run the jobs of a JSON manifest concurrently.
    Batch {
        manifest: PathBuf,
        /// Number of jobs processed at the same time.
        #[arg(long, default_value = "2")]
        workers: usize,
        #[command(flatten)]
        keying: KeyingArgs,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct BackgroundArgs {
    /// Solid background color.
    #[arg(long, num_args = 3, value_names = ["R", "G", "B"])]
    bg: Option<Vec<u8>>,

    /// Background image: file path, http(s) URL or base64 data URL.
    #[arg(long)]
    bg_image: Option<String>,

    /// How the image is fitted: stretch, fit, fill or tile.
    #[arg(long, default_value = "fill")]
    bg_mode: FitMode,
}

#[derive(Args)]
struct KeyingArgs {
    /// Color to key out.
    #[arg(long, num_args = 3, value_names = ["R", "G", "B"])]
    key_color: Option<Vec<u8>>,

    /// JSON keying config (defaults to the user config file if present).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Similarity threshold (0.0-1.0); lower keeps more of the subject.
    #[arg(long)]
    threshold: Option<f32>,

    /// Width of the soft-edge ramp above the threshold.
    #[arg(long)]
    smoothness: Option<f32>,

    /// Hue tolerance in 8-bit hue units (half degrees).
    #[arg(long)]
    hue_tolerance: Option<f32>,

    /// Minimum saturation (0.0-1.0) for a pixel to count as key color.
    #[arg(long)]
    min_saturation: Option<f32>,

    /// Spill suppression strength (0.0-1.0).
    #[arg(long)]
    spill: Option<f32>,

    /// Matte blur radius in pixels (0 disables).
    #[arg(long)]
    edge_blur: Option<usize>,

    /// Grow the matte by this many pixels.
    #[arg(long)]
    dilate: Option<usize>,

    /// Key on RGB distance only.
    #[arg(long)]
    no_smart_keying: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    match Cli::parse().command {
        Command::Replace {
            input,
            output,
            background,
            keying,
            in_memory,
            json,
        } => {
            let config = keying_config(&keying)?;
            let key = key_color(keying.key_color.as_deref())?;
            let workspace = tempfile::tempdir()?;
            let background = background_spec(&background, workspace.path())?;
            let storage = if in_memory {
                FrameStorage::Memory
            } else {
                FrameStorage::TempPng
            };

            let mut logger = StdoutPipelineLogger::default();
            let result = replace(
                &input,
                &output,
                key,
                &config,
                &background,
                storage,
                workspace.path(),
                &mut logger,
            )?;
            report(&result, json)
        }
        Command::Extract {
            input,
            frames_dir,
            keying,
            json,
        } => {
            let config = keying_config(&keying)?;
            let key = key_color(keying.key_color.as_deref())?;
            let workspace = tempfile::tempdir()?;
            let source = fetch_source(&input, workspace.path())?;

            let mut sequence = PngFrameSequence::in_dir(&frames_dir);
            let mut use_case = ExtractMatteUseCase::new(
                Box::new(FfmpegReader::new()),
                Box::new(ChromaKeyer::new(key, &config)),
            );
            let mut logger = StdoutPipelineLogger::default();
            let summary = use_case.execute(&source, &mut sequence, &mut logger)?;
            logger.summary();

            report(
                &ExtractReport {
                    frame_count: summary.frame_count,
                    skipped: summary.skipped,
                    fps: summary.fps,
                    width: summary.width,
                    height: summary.height,
                    frames_dir: frames_dir.clone(),
                },
                json,
            )
        }
        Command::Compose {
            frames_dir,
            output,
            fps,
            background,
            json,
        } => {
            if !frames_dir.is_dir() {
                return Err(format!("Frames folder not found: {}", frames_dir.display()).into());
            }
            let workspace = tempfile::tempdir()?;
            let background = background_spec(&background, workspace.path())?;
            let sequence = PngFrameSequence::open_existing(&frames_dir)
                .map_err(|e| ChromaKeyError::Storage(e.to_string()))?;
            if sequence.is_empty() {
                return Err(ChromaKeyError::EmptySource(frames_dir).into());
            }

            let mut use_case = ComposeVideoUseCase::new(Box::new(FfmpegWriter::new()));
            let mut logger = StdoutPipelineLogger::default();
            let result = use_case.execute(&sequence, &background, fps, &output, &mut logger)?;
            logger.summary();
            report(&result, json)
        }
        Command::Batch {
            manifest,
            workers,
            keying,
            json,
        } => {
            let config = keying_config(&keying)?;
            let manifest = BatchManifest::from_file(&manifest)?;
            let results = ThreadedBatchRunner::new(workers)
                .run(&manifest.jobs, |_, job| run_batch_job(job, &config));

            let failed = results.iter().filter(|r| r.is_err()).count();
            if json {
                let entries: Vec<_> = results
                    .iter()
                    .map(|r| match r {
                        Ok(result) => serde_json::json!({ "ok": result }),
                        Err(e) => serde_json::json!({ "error": e }),
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                for (job, result) in manifest.jobs.iter().zip(&results) {
                    match result {
                        Ok(r) => log::info!(
                            "{} -> {} ({} frames, {})",
                            job.input,
                            r.output_path.display(),
                            r.frame_count,
                            r.codec
                        ),
                        Err(e) => log::error!("{}: {e}", job.input),
                    }
                }
            }

            if failed > 0 {
                return Err(format!("{failed} of {} jobs failed", results.len()).into());
            }
            Ok(())
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn replace(
    input: &str,
    output: &Path,
    key: KeyColorSpec,
    config: &KeyingConfig,
    background: &BackgroundSpec,
    storage: FrameStorage,
    workspace: &Path,
    logger: &mut dyn PipelineLogger,
) -> Result<JobResult, ChromaKeyError> {
    let source = fetch_source(input, workspace)?;
    let mut use_case = ReplaceBackgroundUseCase::new(
        Box::new(FfmpegReader::new()),
        Box::new(FfmpegWriter::new()),
        Box::new(ChromaKeyer::new(key, config)),
    )
    .with_storage(storage);
    use_case.execute(&source, output, background, logger)
}

fn run_batch_job(job: &BatchJob, config: &KeyingConfig) -> Result<JobResult, ChromaKeyError> {
    let workspace = tempfile::tempdir().map_err(|e| ChromaKeyError::Storage(e.to_string()))?;
    let image_source = match job.bg_image.as_deref() {
        Some(source) => Some(fetch_background(source, workspace.path())?),
        None => None,
    };
    let background = job.background(image_source.as_deref())?;

    replace(
        &job.input,
        &job.output,
        job.key_color(),
        config,
        &background,
        FrameStorage::TempPng,
        workspace.path(),
        &mut NullPipelineLogger,
    )
}

#[derive(Serialize)]
struct ExtractReport {
    frame_count: usize,
    skipped: usize,
    fps: f64,
    width: u32,
    height: u32,
    frames_dir: PathBuf,
}

trait Describe {
    fn describe(&self) -> String;
}

impl Describe for JobResult {
    fn describe(&self) -> String {
        format!(
            "Output written to {} ({} frames at {:.2} fps, codec {})",
            self.output_path.display(),
            self.frame_count,
            self.fps,
            self.codec
        )
    }
}

impl Describe for ExtractReport {
    fn describe(&self) -> String {
        format!(
            "Extracted {} frames ({}x{}) to {}",
            self.frame_count,
            self.width,
            self.height,
            self.frames_dir.display()
        )
    }
}

fn report<T: Serialize + Describe>(value: &T, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        log::info!("{}", value.describe());
    }
    Ok(())
}

fn keying_config(args: &KeyingArgs) -> Result<KeyingConfig, ChromaKeyError> {
    let mut config = match &args.config {
        Some(path) => KeyingConfig::from_file(path)?,
        None => KeyingConfig::load_user_default()?,
    };

    if let Some(v) = args.threshold {
        config.threshold = v;
    }
    if let Some(v) = args.smoothness {
        config.smoothness = v;
    }
    if let Some(v) = args.hue_tolerance {
        config.hue_tolerance = v;
    }
    if let Some(v) = args.min_saturation {
        config.min_saturation = v;
    }
    if let Some(v) = args.spill {
        config.spill_strength = v;
    }
    if let Some(v) = args.edge_blur {
        config.edge_blur = v;
    }
    if let Some(amount) = args.dilate {
        config.edge_dilation = amount > 0;
        config.dilation_amount = amount;
    }
    if args.no_smart_keying {
        config.smart_keying = false;
    }

    config.validate()?;
    Ok(config)
}

fn key_color(rgb: Option<&[u8]>) -> Result<KeyColorSpec, ChromaKeyError> {
    match rgb {
        Some(values) => Ok(KeyColorSpec::new(rgb_triplet(values, "--key-color")?)),
        None => Ok(KeyColorSpec::default()),
    }
}

fn background_spec(args: &BackgroundArgs, workspace: &Path) -> Result<BackgroundSpec, ChromaKeyError> {
    if let Some(source) = &args.bg_image {
        let local = fetch_background(source, workspace)?;
        return Ok(BackgroundSpec::Image(
            background_loader::load(&local)?,
            args.bg_mode,
        ));
    }
    let rgb = match &args.bg {
        Some(values) => rgb_triplet(values, "--bg")?,
        None => DEFAULT_BACKGROUND_COLOR,
    };
    Ok(BackgroundSpec::SolidColor(rgb))
}

fn rgb_triplet(values: &[u8], flag: &str) -> Result<[u8; 3], ChromaKeyError> {
    values
        .try_into()
        .map_err(|_| ChromaKeyError::InvalidConfig(format!("{flag} takes exactly three values")))
}

/// Downloads a remote source; local paths must exist.
fn fetch_source(input: &str, workspace: &Path) -> Result<PathBuf, ChromaKeyError> {
    if !remote_fetch::is_remote(input) && !Path::new(input).exists() {
        return Err(ChromaKeyError::SourceOpen {
            path: PathBuf::from(input),
            source: "file not found".into(),
        });
    }
    remote_fetch::resolve_input(input, workspace, "source.mp4")
}

/// Returns a local path or data URL for a background image argument.
fn fetch_background(source: &str, workspace: &Path) -> Result<String, ChromaKeyError> {
    if !remote_fetch::is_remote(source) {
        return Ok(source.to_string());
    }
    let path = remote_fetch::resolve_input(source, workspace, "background")?;
    Ok(path.to_string_lossy().into_owned())
}
