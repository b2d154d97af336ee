use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use image::{DynamicImage, GrayImage, ImageReader, Luma, Rgba};
use imageproc::drawing::draw_hollow_circle_mut;
use log::info;
use thiserror::Error;
use vo_frame::vo_core::{init_thread_pool, CoreError};
use vo_frame::{BriefExtractor, Frame, FrameConfig, FrameError, FrameIdAllocator, Image, PinholeCamera};

#[derive(Debug, Error)]
enum CliError {
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Configuration error: {0}")]
    Config(#[from] CoreError),
    #[error("Frame error: {0}")]
    Frame(#[from] FrameError),
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Build a frame from an image and report its corners
#[derive(Debug, Parser)]
#[command(name = "vo", version)]
struct Args {
    /// Grayscale input image (color images are converted)
    image: PathBuf,

    /// Frame configuration, TOML or JSON by extension
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the grid cell size used for filtering
    #[arg(long)]
    cell_size: Option<usize>,

    /// Focal length in pixels of the pinhole camera
    #[arg(long, default_value_t = 500.0)]
    focal: f64,

    /// Worker threads, defaults to the number of CPUs
    #[arg(long)]
    threads: Option<usize>,

    /// Write the image with filtered corners drawn on it
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn load_config(path: Option<&Path>) -> Result<FrameConfig, CoreError> {
    match path {
        None => Ok(FrameConfig::default()),
        Some(p) if p.extension().is_some_and(|e| e == "json") => FrameConfig::load_json(p),
        Some(p) => FrameConfig::load_toml(p),
    }
}

fn run(args: Args) -> Result<(), CliError> {
    init_thread_pool(args.threads.unwrap_or_else(vo_frame::vo_core::default_threads))?;

    let mut cfg = load_config(args.config.as_deref())?;
    if let Some(cell_size) = args.cell_size {
        cfg.cell_size = cell_size;
    }
    info!("{}", cfg.summary());

    let gray = ImageReader::open(&args.image)?.decode()?.to_luma8();
    let (w, h) = gray.dimensions();
    let img = Image::new(w as usize, h as usize, gray.into_raw())?;

    let ids = FrameIdAllocator::new();
    let camera = Arc::new(PinholeCamera::simple(args.focal, w as usize, h as usize));
    let extractor = Arc::new(BriefExtractor::new());

    let t0 = Instant::now();
    let mut frame = Frame::new(&ids, camera, extractor, img, &cfg)?;
    let built = t0.elapsed();
    frame.filter_corners_default()?;
    let filtered = t0.elapsed() - built;

    println!("Frame {}: {}x{}, {} pyramid levels", frame.id(), frame.width(), frame.height(), frame.pyramid_levels());
    for (level, corners) in frame.corners().corners().iter().enumerate() {
        let img = frame.image(level);
        println!("  level {}: {}x{}, {} corners", level, img.width(), img.height(), corners.len());
    }
    println!(
        "Filtered {} corners (cell {}), {} descriptors",
        frame.filtered_corners().len(),
        cfg.cell_size,
        frame.filtered_descriptors().map_or(0, <[_]>::len)
    );
    println!("Construction {:.2?}, filtering {:.2?}", built, filtered);

    if let Some(output) = args.output {
        let base = frame.image(0);
        let gray = GrayImage::from_fn(base.width() as u32, base.height() as u32, |x, y| {
            Luma([base.get(x as usize, y as usize)])
        });
        let mut canvas = DynamicImage::ImageLuma8(gray).into_rgba8();
        for corner in frame.filtered_corners() {
            let (x, y) = corner.level0_position();
            draw_hollow_circle_mut(
                &mut canvas,
                (x as i32, y as i32),
                3 << corner.level,
                Rgba([255, 0, 0, 255]),
            );
        }
        canvas.save(&output)?;
        println!("Saved result image as {}", output.display());
    }

    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run(Args::parse()) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
