use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use image::{GrayImage, ImageBuffer, Luma};
use serde::Serialize;

use ratio_assay::{
    Analysis, AnalysisConfig, DistanceBinning, Frame, ReductionMode, Stack, ThresholdMethod,
    analyse,
};

const MICRON: &str = "\u{00b5}m";

#[derive(Parser, Debug)]
#[command(name = "ra_runner")]
#[command(about = "Analyse paired time-lapse stacks for ratio profiles and front velocity")]
struct Cli {
    /// First channel: image file or directory of frames (sorted by name).
    #[arg(long, required = true)]
    stack1: PathBuf,
    /// Second channel, same shape as the first.
    #[arg(long, required = true)]
    stack2: PathBuf,
    #[arg(long, default_value = "results")]
    out: PathBuf,

    /// Physical length per pixel, in microns.
    #[arg(long, default_value_t = 1.0)]
    spatial_res: f32,
    /// Seconds per frame.
    #[arg(long, default_value_t = 1.0)]
    time_res: f32,
    /// Threshold fraction of the profile range for region-width search.
    #[arg(long, default_value_t = 0.5)]
    active_threshold: f32,
    /// Gaussian sigma for mask segmentation blur.
    #[arg(long, default_value_t = 1.0)]
    mask_blur: f32,
    /// Gaussian sigma for profile smoothing.
    #[arg(long, default_value_t = 20.0)]
    signal_blur: f32,
    /// Minimum connected-component area kept during mask cleanup.
    #[arg(long, default_value_t = 10)]
    hole_size: usize,
    /// Auto-threshold method: triangle, otsu, isodata or mean.
    #[arg(long, default_value = "triangle")]
    threshold_method: String,
    /// Profile reduction: distance or column.
    #[arg(long, default_value = "distance")]
    reduction: String,
    /// Distance-bucket statistic: last or mean.
    #[arg(long, default_value = "last")]
    binning: String,
    /// Also write per-frame ratio and EDM images.
    #[arg(long, default_value_t = false)]
    emit_stacks: bool,
}

#[derive(Debug, Serialize)]
struct MetaSummary<'a> {
    config: &'a AnalysisConfig,
    frames: usize,
    profile_buckets: usize,
    mean_velocity: f32,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let cfg = build_config(&cli)?;
    cfg.validate().context("configuration rejected")?;

    let stack1 = load_stack(&cli.stack1)?;
    let stack2 = load_stack(&cli.stack2)?;

    let analysis = analyse(&stack1, &stack2, &cfg).context("analysis failed")?;

    fs::create_dir_all(&cli.out)
        .with_context(|| format!("creating output directory {}", cli.out.display()))?;

    write_profile_table(cli.out.join("map.csv"), &analysis.profiles)?;
    write_feature_table(cli.out.join("profile_points.csv"), &analysis, &cfg)?;
    write_velocities(cli.out.join("velocities.csv"), &analysis, &cfg)?;
    write_json(
        cli.out.join("meta.json"),
        &MetaSummary {
            config: &cfg,
            frames: stack1.len(),
            profile_buckets: analysis.profiles.first().map_or(0, Vec::len),
            mean_velocity: analysis.velocity.mean,
        },
    )?;

    if cli.emit_stacks {
        write_stacks(&cli.out, &analysis)?;
    }

    Ok(())
}

fn build_config(cli: &Cli) -> Result<AnalysisConfig> {
    let threshold_method = ThresholdMethod::parse(&cli.threshold_method)
        .with_context(|| format!("unknown threshold method '{}'", cli.threshold_method))?;

    let reduction = match cli.reduction.as_str() {
        "distance" => ReductionMode::DistanceIndexed,
        "column" => ReductionMode::ColumnMean,
        other => bail!("unknown reduction '{other}' (expected distance or column)"),
    };

    let binning = match cli.binning.as_str() {
        "last" => DistanceBinning::LastWriteWins,
        "mean" => DistanceBinning::Mean,
        other => bail!("unknown binning '{other}' (expected last or mean)"),
    };

    Ok(AnalysisConfig {
        spatial_res: cli.spatial_res,
        time_res: cli.time_res,
        active_threshold: cli.active_threshold,
        mask_blur_radius: cli.mask_blur,
        signal_blur_radius: cli.signal_blur,
        hole_size: cli.hole_size,
        threshold_method,
        reduction,
        binning,
        emit_stacks: cli.emit_stacks,
    })
}

fn load_stack(path: &Path) -> Result<Stack<f32>> {
    let mut files = Vec::new();
    if path.is_dir() {
        for entry in
            fs::read_dir(path).with_context(|| format!("reading directory {}", path.display()))?
        {
            let entry = entry?;
            if entry.path().is_file() {
                files.push(entry.path());
            }
        }
        files.sort();
        if files.is_empty() {
            bail!("no frames found in {}", path.display());
        }
    } else {
        files.push(path.to_path_buf());
    }

    let mut frames = Vec::with_capacity(files.len());
    for file in &files {
        frames.push(load_frame(file)?);
    }

    Stack::from_frames(frames)
        .with_context(|| format!("frames in {} must share dimensions", path.display()))
}

fn load_frame(path: &Path) -> Result<Frame<f32>> {
    let dyn_img =
        image::open(path).with_context(|| format!("opening frame {}", path.display()))?;
    let luma = dyn_img.to_luma16();
    let (w, h) = luma.dimensions();
    let data = luma.into_raw().into_iter().map(f32::from).collect();

    Frame::from_vec(w as usize, h as usize, data)
        .with_context(|| format!("constructing frame from {}", path.display()))
}

fn write_profile_table(path: PathBuf, profiles: &[Vec<f32>]) -> Result<()> {
    let mut file =
        fs::File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    for row in profiles {
        let mut first = true;
        for v in row {
            if !first {
                write!(file, ",").context("writing profile row")?;
            }
            write!(file, "{v}").context("writing profile row")?;
            first = false;
        }
        writeln!(file).context("writing profile row")?;
    }
    Ok(())
}

fn write_feature_table(path: PathBuf, analysis: &Analysis, cfg: &AnalysisConfig) -> Result<()> {
    let mut file =
        fs::File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    writeln!(
        file,
        "Time (seconds),Peak {MICRON},x1 {MICRON},x2 {MICRON},Width {MICRON}"
    )
    .context("writing feature header")?;

    for (i, feature) in analysis.features.iter().enumerate() {
        let time = i as f32 * cfg.time_res;
        write!(file, "{time}").context("writing feature row")?;
        match feature {
            Some(f) => {
                write!(file, ",{}", f.max_idx as f32 * cfg.spatial_res)
                    .context("writing feature row")?;
                write_position(&mut file, f.left, cfg.spatial_res)?;
                write_position(&mut file, f.right, cfg.spatial_res)?;
                match f.width() {
                    Some(w) => write!(file, ",{}", w as f32 * cfg.spatial_res),
                    None => write!(file, ",not found"),
                }
                .context("writing feature row")?;
            }
            None => {
                write!(file, ",not found,not found,not found,not found")
                    .context("writing feature row")?;
            }
        }
        writeln!(file).context("writing feature row")?;
    }
    Ok(())
}

fn write_position(file: &mut fs::File, idx: Option<usize>, spatial_res: f32) -> Result<()> {
    match idx {
        Some(i) => write!(file, ",{}", i as f32 * spatial_res),
        None => write!(file, ",not found"),
    }
    .context("writing feature row")
}

fn write_velocities(path: PathBuf, analysis: &Analysis, cfg: &AnalysisConfig) -> Result<()> {
    let mut file =
        fs::File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    writeln!(
        file,
        "Time (seconds),Velocity ({MICRON}/s),Smoothed ({MICRON}/s)"
    )
    .context("writing velocity header")?;

    let series = &analysis.velocity;
    for (i, (&v, &s)) in series.values.iter().zip(&series.smoothed).enumerate() {
        writeln!(file, "{},{v},{s}", i as f32 * cfg.time_res).context("writing velocity row")?;
    }
    Ok(())
}

fn write_stacks(out: &Path, analysis: &Analysis) -> Result<()> {
    if let Some(ratio) = &analysis.ratio {
        let (min, max) = finite_range(ratio);
        for (i, frame) in ratio.iter().enumerate() {
            let path = out.join(format!("ratio_{i:03}.png"));
            save_normalized(&path, frame, min, max)?;
        }
    }

    if let Some(edm) = &analysis.edm {
        for (i, frame) in edm.iter().enumerate() {
            let path = out.join(format!("edm_{i:03}.png"));
            let img: ImageBuffer<Luma<u16>, Vec<u16>> = ImageBuffer::from_raw(
                frame.width() as u32,
                frame.height() as u32,
                frame.data().to_vec(),
            )
            .context("constructing EDM image from frame")?;
            img.save(&path)
                .with_context(|| format!("saving {}", path.display()))?;
        }
    }

    Ok(())
}

fn finite_range(stack: &Stack<f32>) -> (f32, f32) {
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for frame in stack.iter() {
        for &v in frame.data() {
            if !v.is_finite() {
                continue;
            }
            if v < min {
                min = v;
            }
            if v > max {
                max = v;
            }
        }
    }
    if min > max { (0.0, 0.0) } else { (min, max) }
}

fn save_normalized(path: &Path, frame: &Frame<f32>, min: f32, max: f32) -> Result<()> {
    let scale = if max > min { 255.0 / (max - min) } else { 0.0 };
    let data: Vec<u8> = frame
        .data()
        .iter()
        .map(|&v| {
            if v.is_finite() {
                ((v - min) * scale).round().clamp(0.0, 255.0) as u8
            } else {
                0
            }
        })
        .collect();

    let gray = GrayImage::from_raw(frame.width() as u32, frame.height() as u32, data)
        .context("constructing ratio image from frame")?;
    gray.save(path)
        .with_context(|| format!("saving {}", path.display()))
}

fn write_json(path: PathBuf, value: &impl Serialize) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value).context("serializing json")?;
    fs::write(&path, bytes).with_context(|| format!("writing json {}", path.display()))
}
