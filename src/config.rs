use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::{CursorSpace, PixelFormat};

/// Texture sampling used when the backing scale is not 1:1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SamplerFilter {
    #[default]
    Nearest,
    Linear,
}

impl SamplerFilter {
    pub fn filter_mode(self) -> wgpu::FilterMode {
        match self {
            SamplerFilter::Nearest => wgpu::FilterMode::Nearest,
            SamplerFilter::Linear => wgpu::FilterMode::Linear,
        }
    }
}

/// Presenter settings, loadable from JSON. Missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresenterConfig {
    pub pixel_format: PixelFormat,
    /// RGBA clear colour for the "no content yet" state and the chrome band
    pub clear_color: [f64; 4],
    pub filter: SamplerFilter,
    pub vsync: bool,
    pub cursor_space: CursorSpace,
}

impl Default for PresenterConfig {
    fn default() -> Self {
        Self {
            pixel_format: PixelFormat::Bgra8,
            clear_color: [0.0, 0.0, 0.0, 1.0],
            filter: SamplerFilter::Nearest,
            vsync: true,
            cursor_space: CursorSpace::Content,
        }
    }
}

impl PresenterConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("invalid presenter config")
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn clear_color(&self) -> wgpu::Color {
        let [r, g, b, a] = self.clear_color;
        wgpu::Color { r, g, b, a }
    }

    pub fn present_mode(&self) -> wgpu::PresentMode {
        if self.vsync {
            wgpu::PresentMode::Fifo
        } else {
            wgpu::PresentMode::AutoNoVsync
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_is_default() {
        assert_eq!(PresenterConfig::from_json("{}").unwrap(), PresenterConfig::default());
    }

    #[test]
    fn partial_json_overrides_fields() {
        let config = PresenterConfig::from_json(
            r#"{ "pixel_format": "rgba8", "cursor_space": "drawable", "vsync": false }"#,
        )
        .unwrap();

        assert_eq!(config.pixel_format, PixelFormat::Rgba8);
        assert_eq!(config.cursor_space, CursorSpace::Drawable);
        assert_eq!(config.present_mode(), wgpu::PresentMode::AutoNoVsync);
        assert_eq!(config.filter, SamplerFilter::Nearest);
    }

    #[test]
    fn unknown_variant_is_rejected() {
        assert!(PresenterConfig::from_json(r#"{ "filter": "cubic" }"#).is_err());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = PresenterConfig::from_file("/nonexistent/presenter.json").unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/presenter.json"));
    }
}
