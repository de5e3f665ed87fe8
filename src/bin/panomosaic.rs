use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use panomosaic::{
    AlignStatus, BlendStatus, CpuBackend, EngineParams, FrameSize, Gl4x4, Mat3, MosaicConfig,
    MosaicEngine, MosaicImage, MosaicPipeline, MosaicResult, ProgressTracker, rgb_to_yvu,
};

#[derive(Parser, Debug)]
#[command(name = "panomosaic", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Capture a synthetic horizontal sweep and write the mosaic and the last preview as PNGs.
    Sweep(SweepArgs),
    /// Print the effective configuration as JSON.
    Config(ConfigArgs),
}

#[derive(Parser, Debug)]
struct SweepArgs {
    /// Output directory for `mosaic.png` and `preview.png`.
    #[arg(long)]
    out: PathBuf,

    /// Configuration JSON; missing fields take their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// High-tier frame width.
    #[arg(long, default_value_t = 320)]
    width: u32,

    /// High-tier frame height.
    #[arg(long, default_value_t = 240)]
    height: u32,

    /// Number of frames in the sweep.
    #[arg(long, default_value_t = 12)]
    frames: u32,

    /// Horizontal camera motion between frames, in high-tier pixels.
    #[arg(long, default_value_t = 32)]
    step: u32,

    /// Where submitted frames come from.
    #[arg(long, value_enum, default_value_t = FrameSource::Nv21)]
    source: FrameSource,

    /// Blend the high tier instead of the low tier.
    #[arg(long)]
    high_res: bool,
}

#[derive(Parser, Debug)]
struct ConfigArgs {
    /// Configuration JSON to merge over the defaults.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FrameSource {
    /// Encode each frame as NV21 and submit the bytes.
    Nv21,
    /// Render each frame through the preview surfaces and submit the readback.
    Texture,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Sweep(args) => cmd_sweep(args),
        Command::Config(args) => cmd_config(args),
    }
}

fn read_config(path: Option<&Path>) -> anyhow::Result<MosaicConfig> {
    let Some(path) = path else {
        return Ok(MosaicConfig::default());
    };
    let s = std::fs::read_to_string(path)
        .with_context(|| format!("read config '{}'", path.display()))?;
    let cfg = MosaicConfig::from_json_str(&s)
        .with_context(|| format!("parse config '{}'", path.display()))?;
    Ok(cfg)
}

fn cmd_config(args: ConfigArgs) -> anyhow::Result<()> {
    let cfg = read_config(args.config.as_deref())?;
    println!("{}", serde_json::to_string_pretty(&cfg)?);
    Ok(())
}

fn cmd_sweep(args: SweepArgs) -> anyhow::Result<()> {
    let cfg = read_config(args.config.as_deref())?;
    if args.frames == 0 {
        anyhow::bail!("--frames must be at least 1");
    }
    let scene_width = (args.frames - 1)
        .checked_mul(args.step)
        .and_then(|travel| travel.checked_add(args.width))
        .context("sweep too wide: width + (frames - 1) * step overflows u32")?;
    let scene = Scene {
        width: scene_width,
        height: args.height,
    };

    let mut pipeline = MosaicPipeline::new(cfg, CpuBackend::new(), shift_aligner)?;
    pipeline.allocate_buffers(args.width, args.height)?;
    pipeline.init_graphics()?;
    let canvas = pipeline
        .compositor()
        .map(|c| c.canvas_size())
        .context("compositor missing after init_graphics")?;
    pipeline.reset_viewport(canvas.width, canvas.height, true)?;
    pipeline.set_warp_enabled(true)?;

    for k in 0..args.frames {
        let rgb = scene.crop(k * args.step, args.width);
        pipeline.load_camera_frame(&rgb_to_rgba(&rgb))?;
        pipeline.preprocess(Gl4x4::IDENTITY)?;

        let submission = match args.source {
            FrameSource::Nv21 => {
                pipeline.submit_frame(&rgb_to_nv21(&rgb, args.width, args.height))?
            }
            FrameSource::Texture => {
                pipeline.transfer_to_cpu()?;
                pipeline.submit_frame_from_texture()?
            }
        };
        pipeline.update_transform_matrix()?;
        pipeline.render_step()?;
        eprintln!(
            "frame {k}: status={:?} count={} tx={:.1}",
            submission.status,
            submission.frame_count,
            submission.transform.tx()
        );
    }

    let status = pipeline.create_mosaic(args.high_res)?;
    eprintln!("create_mosaic: {status:?} (code {})", status.code());
    if pipeline.is_degraded() {
        eprintln!("warning: preview backend reported errors");
    }

    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("create output dir '{}'", args.out.display()))?;

    let preview_path = args.out.join("preview.png");
    let screen = pipeline
        .compositor()
        .and_then(|c| c.screen_id())
        .context("no screen surface")?;
    let pixels = pipeline
        .backend()
        .pixels(screen)
        .context("screen surface released")?;
    image::save_buffer_with_format(
        &preview_path,
        pixels,
        canvas.width,
        canvas.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", preview_path.display()))?;
    eprintln!("wrote {}", preview_path.display());

    if status.is_accepted() {
        let mosaic_path = args.out.join("mosaic.png");
        pipeline
            .result_image()?
            .save(&mosaic_path)
            .with_context(|| format!("write png '{}'", mosaic_path.display()))?;
        eprintln!("wrote {}", mosaic_path.display());
    }
    Ok(())
}

/// Procedural wide image the sweep is cropped from.
struct Scene {
    width: u32,
    height: u32,
}

impl Scene {
    fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let cell = mix32((x / 6).wrapping_mul(0x9E37_79B9) ^ (y / 6));
        let r = (cell & 0xFF) as u8;
        let g = (u64::from(x) * 255 / u64::from(self.width.max(1))) as u8;
        let b = (u64::from(y) * 255 / u64::from(self.height.max(1))) as u8
            ^ ((cell >> 8) & 0x3F) as u8;
        [r, g, b]
    }

    fn crop(&self, x0: u32, width: u32) -> Vec<u8> {
        let mut out = Vec::with_capacity(width as usize * self.height as usize * 3);
        for y in 0..self.height {
            for x in x0..x0 + width {
                out.extend_from_slice(&self.pixel(x, y));
            }
        }
        out
    }
}

fn mix32(mut z: u32) -> u32 {
    z = (z ^ (z >> 16)).wrapping_mul(0x7FEB_352D);
    z = (z ^ (z >> 15)).wrapping_mul(0x846C_A68B);
    z ^ (z >> 16)
}

fn rgb_to_rgba(rgb: &[u8]) -> Vec<u8> {
    rgb.chunks_exact(3)
        .flat_map(|p| [p[0], p[1], p[2], 255])
        .collect()
}

fn rgb_to_nv21(rgb: &[u8], width: u32, height: u32) -> Vec<u8> {
    let (w, h) = (width as usize, height as usize);
    let yvu: Vec<[u8; 3]> = rgb
        .chunks_exact(3)
        .map(|p| rgb_to_yvu(p[0], p[1], p[2]))
        .collect();
    let mut out: Vec<u8> = yvu.iter().map(|p| p[0]).collect();
    for y in (0..h).step_by(2) {
        for x in (0..w).step_by(2) {
            let p = yvu[y * w + x];
            out.extend_from_slice(&[p[1], p[2]]);
        }
    }
    out
}

fn shift_aligner(params: &EngineParams) -> MosaicResult<Box<dyn MosaicEngine>> {
    Ok(Box::new(ShiftAligner::new(params)))
}

/// Brute-force horizontal aligner and painter's-order blender for the synthetic sweep.
struct ShiftAligner {
    size: FrameSize,
    blend_percent: f64,
    frames: Vec<(i64, Vec<u8>)>,
    offset: i64,
    last_dx: i64,
    mosaic: Option<MosaicImage>,
}

impl ShiftAligner {
    fn new(params: &EngineParams) -> Self {
        Self {
            size: params.size,
            blend_percent: params.blend_percent,
            frames: Vec::new(),
            offset: 0,
            last_dx: 0,
            mosaic: None,
        }
    }

    /// Shift `dx` minimizing mean absolute luma difference where `next(x) ~ prev(x + dx)`.
    fn best_shift(&self, prev: &[u8], next: &[u8]) -> (i64, f64) {
        let w = self.size.width as i64;
        let h = self.size.height as usize;
        let max = w / 2;
        let mut best = (0, f64::MAX);
        for dx in -max..=max {
            let (lo, hi) = (0.max(-dx), w.min(w - dx));
            let mut sum = 0u64;
            for y in 0..h {
                let row = y * w as usize;
                for x in lo..hi {
                    let a = next[row + x as usize];
                    let b = prev[row + (x + dx) as usize];
                    sum += u64::from(a.abs_diff(b));
                }
            }
            let cost = sum as f64 / ((hi - lo) as usize * h) as f64;
            if cost < best.1 {
                best = (dx, cost);
            }
        }
        best
    }

    fn paint(&self, min: i64, out: &mut [u8], width: usize, (offset, yvu): &(i64, Vec<u8>)) {
        let w = self.size.width as usize;
        let h = self.size.height as usize;
        let px = w * h;
        let mosaic_px = width * h;
        let x0 = (offset - min) as usize;
        for plane in 0..3 {
            for y in 0..h {
                let src = &yvu[plane * px + y * w..][..w];
                out[plane * mosaic_px + y * width + x0..][..w].copy_from_slice(src);
            }
        }
    }
}

impl MosaicEngine for ShiftAligner {
    fn add_frame(&mut self, yvu: &[u8]) -> AlignStatus {
        let px = self.size.pixel_count();
        let Some((_, prev)) = self.frames.last() else {
            self.last_dx = 0;
            self.frames.push((0, yvu.to_vec()));
            return AlignStatus::Ok;
        };
        let (dx, cost) = self.best_shift(&prev[..px], &yvu[..px]);
        if cost > 48.0 {
            return AlignStatus::Failed;
        }
        self.last_dx = dx;
        self.offset += dx;
        self.frames.push((self.offset, yvu.to_vec()));
        if cost > 12.0 {
            AlignStatus::FewInliers
        } else {
            AlignStatus::Ok
        }
    }

    fn last_trs(&self) -> Mat3 {
        Mat3::translation(self.last_dx as f64, 0.0)
    }

    fn create_mosaic(&mut self, progress: &ProgressTracker) -> BlendStatus {
        let Some(first) = self.frames.first() else {
            return BlendStatus::Error;
        };
        let luma = &first.1[..self.size.pixel_count()];
        let (lo, hi) = luma
            .iter()
            .fold((u8::MAX, u8::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        if hi.saturating_sub(lo) < 8 {
            return BlendStatus::LowTexture;
        }

        let min = self.frames.iter().map(|f| f.0).min().unwrap_or(0);
        let max = self.frames.iter().map(|f| f.0).max().unwrap_or(0);
        let width = (max - min) as usize + self.size.width as usize;
        let Ok(size) = FrameSize::new(width as u32, self.size.height) else {
            return BlendStatus::Error;
        };
        let mut out = vec![0u8; size.pixel_count() * 3];
        let step = self.blend_percent / self.frames.len() as f64;
        for frame in &self.frames {
            if progress.is_cancelled() {
                return BlendStatus::Cancelled;
            }
            self.paint(min, &mut out, width, frame);
            progress.advance(step);
        }
        match MosaicImage::new(size, out) {
            Ok(image) => {
                self.mosaic = Some(image);
                BlendStatus::Ok
            }
            Err(_) => BlendStatus::Error,
        }
    }

    fn take_mosaic(&mut self) -> Option<MosaicImage> {
        self.mosaic.take()
    }
}
