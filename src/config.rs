use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::detect::{DetectionFilter, DEFAULT_MAX_DETECTIONS, DEFAULT_MIN_SCORE};
use crate::overlay::{
    OverlayStyle, DEFAULT_BASELINE_INSET, DEFAULT_FONT_PX, DEFAULT_LABEL_HEIGHT,
    DEFAULT_LABEL_PADDING, DEFAULT_LINE_WIDTH,
};
use crate::surface::{Color, DevicePixelRatio, FontSpec};

const DEFAULT_DEVICE_PIXEL_RATIO: f64 = 1.0;
const DEFAULT_BOX_COLOR: &str = "#000000";
const DEFAULT_LABEL_BACKGROUND: &str = "#000000";
const DEFAULT_LABEL_TEXT: &str = "#ffffff";
const DEFAULT_PREVIEW_BACKGROUND: &str = "#f0f0f0";

#[derive(Debug, Deserialize, Default)]
struct OverlayConfigFile {
    device_pixel_ratio: Option<f64>,
    font_path: Option<PathBuf>,
    style: Option<StyleConfigFile>,
    filter: Option<FilterConfigFile>,
    preview: Option<PreviewConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct StyleConfigFile {
    line_width: Option<f64>,
    font_px: Option<f64>,
    label_height: Option<f64>,
    label_padding: Option<f64>,
    baseline_inset: Option<f64>,
    box_color: Option<String>,
    label_background: Option<String>,
    label_text: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct FilterConfigFile {
    max_detections: Option<usize>,
    min_score: Option<f64>,
}

#[derive(Debug, Deserialize, Default)]
struct PreviewConfigFile {
    background: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OverlayConfig {
    pub device_pixel_ratio: f64,
    pub font_path: Option<PathBuf>,
    pub style: StyleSettings,
    pub filter: DetectionFilter,
    pub preview_background: String,
}

/// Style as configured; colors stay as strings until validated.
#[derive(Debug, Clone)]
pub struct StyleSettings {
    pub line_width: f64,
    pub font_px: f64,
    pub label_height: f64,
    pub label_padding: f64,
    pub baseline_inset: f64,
    pub box_color: String,
    pub label_background: String,
    pub label_text: String,
}

impl OverlayConfig {
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("OVERLAY_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) => Some(read_config_file(Path::new(path))?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: OverlayConfigFile) -> Self {
        let style = file.style.unwrap_or_default();
        let filter = file.filter.unwrap_or_default();
        Self {
            device_pixel_ratio: file
                .device_pixel_ratio
                .unwrap_or(DEFAULT_DEVICE_PIXEL_RATIO),
            font_path: file.font_path,
            style: StyleSettings {
                line_width: style.line_width.unwrap_or(DEFAULT_LINE_WIDTH),
                font_px: style.font_px.unwrap_or(DEFAULT_FONT_PX),
                label_height: style.label_height.unwrap_or(DEFAULT_LABEL_HEIGHT),
                label_padding: style.label_padding.unwrap_or(DEFAULT_LABEL_PADDING),
                baseline_inset: style.baseline_inset.unwrap_or(DEFAULT_BASELINE_INSET),
                box_color: style
                    .box_color
                    .unwrap_or_else(|| DEFAULT_BOX_COLOR.to_string()),
                label_background: style
                    .label_background
                    .unwrap_or_else(|| DEFAULT_LABEL_BACKGROUND.to_string()),
                label_text: style
                    .label_text
                    .unwrap_or_else(|| DEFAULT_LABEL_TEXT.to_string()),
            },
            filter: DetectionFilter {
                max_detections: filter.max_detections.unwrap_or(DEFAULT_MAX_DETECTIONS),
                min_score: filter.min_score.unwrap_or(DEFAULT_MIN_SCORE),
            },
            preview_background: file
                .preview
                .and_then(|preview| preview.background)
                .unwrap_or_else(|| DEFAULT_PREVIEW_BACKGROUND.to_string()),
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(dpr) = std::env::var("OVERLAY_DPR") {
            self.device_pixel_ratio = dpr
                .trim()
                .parse()
                .map_err(|_| anyhow!("OVERLAY_DPR must be a number"))?;
        }
        if let Ok(path) = std::env::var("OVERLAY_FONT_PATH") {
            if !path.trim().is_empty() {
                self.font_path = Some(PathBuf::from(path));
            }
        }
        if let Ok(score) = std::env::var("OVERLAY_MIN_SCORE") {
            self.filter.min_score = score
                .trim()
                .parse()
                .map_err(|_| anyhow!("OVERLAY_MIN_SCORE must be a number between 0 and 1"))?;
        }
        if let Ok(max) = std::env::var("OVERLAY_MAX_DETECTIONS") {
            self.filter.max_detections = max
                .trim()
                .parse()
                .map_err(|_| anyhow!("OVERLAY_MAX_DETECTIONS must be a positive integer"))?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if !(self.device_pixel_ratio.is_finite() && self.device_pixel_ratio > 0.0) {
            return Err(anyhow!("device_pixel_ratio must be a positive number"));
        }
        if !(0.0..=1.0).contains(&self.filter.min_score) {
            return Err(anyhow!("min_score must be within [0, 1]"));
        }
        if self.filter.max_detections == 0 {
            return Err(anyhow!("max_detections must be greater than zero"));
        }
        for (name, value) in [
            ("line_width", self.style.line_width),
            ("font_px", self.style.font_px),
            ("label_height", self.style.label_height),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(anyhow!("style.{} must be a positive number", name));
            }
        }
        for (name, value) in [
            ("label_padding", self.style.label_padding),
            ("baseline_inset", self.style.baseline_inset),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(anyhow!("style.{} must not be negative", name));
            }
        }
        self.overlay_style()?;
        self.preview_background()?;
        Ok(())
    }

    pub fn device_pixel_ratio(&self) -> DevicePixelRatio {
        DevicePixelRatio::new(self.device_pixel_ratio)
    }

    pub fn overlay_style(&self) -> Result<OverlayStyle> {
        Ok(OverlayStyle {
            line_width: self.style.line_width,
            font: FontSpec::new(self.style.font_px),
            label_height: self.style.label_height,
            label_padding: self.style.label_padding,
            baseline_inset: self.style.baseline_inset,
            box_color: parse_color("style.box_color", &self.style.box_color)?,
            label_background: parse_color(
                "style.label_background",
                &self.style.label_background,
            )?,
            label_text: parse_color("style.label_text", &self.style.label_text)?,
        })
    }

    pub fn preview_background(&self) -> Result<Color> {
        parse_color("preview.background", &self.preview_background)
    }
}

fn parse_color(name: &str, value: &str) -> Result<Color> {
    Color::from_hex(value)
        .ok_or_else(|| anyhow!("{} must be #rrggbb or #rrggbbaa, got {:?}", name, value))
}

fn read_config_file(path: &Path) -> Result<OverlayConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}
