//! overlay_render - paint saved detections over an image as the page shows it
//!
//! Loads a local image, replays detections from a coco-ssd style JSON file,
//! lays the image out in a CSS box with contain fit and renders the overlay
//! at the configured device pixel ratio. Each `--resize` simulates a layout
//! change and redraws the stored detections without re-running detection.

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use detection_overlay::compose::{composite_overlay, letterboxed_preview};
use detection_overlay::config::OverlayConfig;
use detection_overlay::ingest::{is_local_file_path, load_image, looks_like_image_url};
use detection_overlay::{
    CssSize, DetectorBackend, DevicePixelRatio, DisplayedImage, ImageSource, JsonFileBackend,
    OverlayRenderer, RasterSurface, RedrawOutcome, RedrawReport,
};

#[path = "../ui.rs"]
mod ui;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Local image file to draw over.
    #[arg(long)]
    image: String,
    /// Detections JSON: [{"class": "...", "score": 0.9, "bbox": [x, y, w, h]}, ...].
    #[arg(long)]
    detections: PathBuf,
    /// Layout box of the image element in CSS pixels.
    #[arg(long, default_value = "640x480", value_parser = parse_size)]
    layout: CssSize,
    /// Device pixel ratio (overrides config / OVERLAY_DPR).
    #[arg(long)]
    dpr: Option<f64>,
    /// Later layout boxes to redraw at, in order (repeatable).
    #[arg(long = "resize", value_parser = parse_size)]
    resizes: Vec<CssSize>,
    /// Output PNG for the overlay surface.
    #[arg(long, default_value = "overlay.png")]
    out: PathBuf,
    /// Optional PNG with the letterboxed image and overlay composited.
    #[arg(long)]
    preview: Option<PathBuf>,
    /// UI mode for stderr progress (auto|plain|pretty)
    #[arg(long, default_value = "auto", value_name = "MODE")]
    ui: String,
}

fn parse_size(value: &str) -> std::result::Result<CssSize, String> {
    let (w, h) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {value:?}"))?;
    let parse = |s: &str| {
        s.trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v >= 0.0)
            .ok_or_else(|| format!("invalid dimension {s:?} in {value:?}"))
    };
    Ok(CssSize::new(parse(w)?, parse(h)?))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let ui = ui::Ui::new(
        ui::UiMode::parse(&args.ui),
        std::io::stderr().is_terminal(),
        std::io::stdout().is_terminal(),
    );

    if !is_local_file_path(&args.image) {
        if looks_like_image_url(&args.image) {
            return Err(anyhow!(
                "{} is a remote image; download it and pass the local file",
                args.image
            ));
        }
        return Err(anyhow!(
            "{} is not a local image path (page URLs are not images)",
            args.image
        ));
    }

    let mut cfg = OverlayConfig::load()?;
    if let Some(dpr) = args.dpr {
        cfg.device_pixel_ratio = dpr;
    }
    let dpr = DevicePixelRatio::new(cfg.device_pixel_ratio);
    let style = cfg.overlay_style()?;

    let mut displayed = {
        let _stage = ui.stage("Load image");
        load_image(&args.image, args.layout)?
    };

    let detections = {
        let _stage = ui.stage("Detect");
        let mut backend = JsonFileBackend::new(&args.detections);
        backend.warm_up()?;
        let pixels = displayed.pixels().map(|p| p.as_raw().as_slice()).unwrap_or(&[]);
        let raw = backend.detect(pixels, displayed.natural_width, displayed.natural_height)?;
        cfg.filter.apply(raw)
    };

    println!("OK ({} objects)", detections.len());
    for detection in &detections {
        println!("  {}", detection.summary_line());
    }

    let mut surface = match &cfg.font_path {
        Some(path) => RasterSurface::new().with_font_file(path)?,
        None => {
            log::warn!("no label font configured (OVERLAY_FONT_PATH); labels are drawn without text");
            RasterSurface::new()
        }
    };
    let mut renderer = OverlayRenderer::new(style);

    let report = {
        let _stage = ui.stage("Render overlay");
        renderer.on_detections_ready(detections, &displayed, dpr, &mut surface)?
    };
    write_outputs(&args.out, args.preview.as_deref(), &cfg, &displayed, &surface, dpr, &report)?;

    for layout in &args.resizes {
        displayed.set_layout(*layout);
        let _stage = ui.stage(&format!("Redraw at {}x{}", layout.width, layout.height));
        match renderer.on_layout_changed(&displayed, dpr, &mut surface)? {
            RedrawOutcome::Drawn(report) => {
                let out = suffixed(&args.out, *layout);
                let preview = args.preview.as_deref().map(|p| suffixed(p, *layout));
                write_outputs(&out, preview.as_deref(), &cfg, &displayed, &surface, dpr, &report)?;
            }
            RedrawOutcome::Skipped => log::warn!("image not decoded, redraw skipped"),
        }
    }
    Ok(())
}

fn write_outputs(
    out: &Path,
    preview: Option<&Path>,
    cfg: &OverlayConfig,
    displayed: &DisplayedImage,
    surface: &RasterSurface,
    dpr: DevicePixelRatio,
    report: &RedrawReport,
) -> Result<()> {
    if report.size.backing.is_empty() {
        log::warn!(
            "layout {}x{} has no area, nothing painted; skipping {}",
            report.size.css.width,
            report.size.css.height,
            out.display()
        );
        return Ok(());
    }
    surface.save_png(out)?;
    log::info!(
        "overlay {}x{} (css {}x{}) painted {} rejected {} -> {} [{}]",
        report.size.backing.width,
        report.size.backing.height,
        report.size.css.width,
        report.size.css.height,
        report.painted,
        report.rejected,
        out.display(),
        &surface.fingerprint()[..12]
    );

    if let Some(path) = preview {
        let pixels = displayed
            .pixels()
            .ok_or_else(|| anyhow!("preview requires decoded image pixels"))?;
        let mut composed = letterboxed_preview(
            pixels,
            &report.geometry,
            report.size,
            dpr,
            cfg.preview_background()?,
        );
        composite_overlay(&mut composed, surface.pixels());
        composed
            .save_with_format(path, image::ImageFormat::Png)
            .with_context(|| format!("failed to write preview {}", path.display()))?;
        log::info!(
            "preview for layout {:?} -> {}",
            displayed.layout_box(),
            path.display()
        );
    }
    Ok(())
}

/// `overlay.png` + 800x600 -> `overlay_800x600.png`.
fn suffixed(path: &Path, layout: CssSize) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "overlay".to_string());
    let ext = path
        .extension()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "png".to_string());
    path.with_file_name(format!("{}_{}x{}.{}", stem, layout.width, layout.height, ext))
}
