// =============================================================================
// CONFIGURATION - Load settings from config.toml
// =============================================================================
//
// Every field has a default, so a missing file or a missing key still gives
// a working setup. A file that fails to parse is reported and ignored.

use crate::backend::{DeviceRequirements, InstanceRequest, SetupParams};
use anyhow::{Context, Result};
use ash::vk;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "config.toml";

/// Root configuration structure
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub device: DeviceConfig,
    pub graphics: GraphicsConfig,
    pub shaders: ShaderConfig,
    pub debug: DebugConfig,
}

/// Window settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "App Window".to_string(),
            width: 400,
            height: 400,
        }
    }
}

/// What the selected GPU must offer
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub discrete_only: bool,
    pub geometry_shader: bool,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            discrete_only: true,
            geometry_shader: true,
        }
    }
}

/// Graphics settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GraphicsConfig {
    pub clear_color: [f32; 4],
    pub preferred_present_mode: String,
}

impl Default for GraphicsConfig {
    fn default() -> Self {
        Self {
            clear_color: [0.0, 0.0, 0.0, 1.0],
            preferred_present_mode: "fifo".to_string(),
        }
    }
}

/// Compiled SPIR-V locations
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ShaderConfig {
    pub vertex: String,
    pub fragment: String,
}

impl Default for ShaderConfig {
    fn default() -> Self {
        Self {
            vertex: "shaders/triangle.vert.spv".to_string(),
            fragment: "shaders/triangle.frag.spv".to_string(),
        }
    }
}

/// Debug settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Only honoured in debug builds
    pub validation_layers: bool,
    pub log_level: String,
    pub application_name: String,
    pub engine_name: String,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            validation_layers: true,
            log_level: "info".to_string(),
            application_name: "Hello Triangle".to_string(),
            engine_name: "No Engine".to_string(),
        }
    }
}

/// Where `Config::load` got its settings from. Logged by the caller once
/// a logger exists.
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded(PathBuf),
    Missing(PathBuf),
    Invalid(anyhow::Error),
}

impl LoadOutcome {
    pub fn log(&self) {
        match self {
            LoadOutcome::Loaded(path) => log::info!("Loaded configuration from {:?}", path),
            LoadOutcome::Missing(path) => log::info!("Config file not found at {:?}, using defaults", path),
            LoadOutcome::Invalid(e) => log::warn!("{:#}. Using defaults.", e),
        }
    }
}

impl Config {
    /// Load config.toml, falling back to defaults if it is missing or broken
    pub fn load() -> (Self, LoadOutcome) {
        Self::load_from_path(CONFIG_FILE)
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> (Self, LoadOutcome) {
        let path = path.as_ref();

        if !path.exists() {
            return (Config::default(), LoadOutcome::Missing(path.to_path_buf()));
        }

        match Self::read(path) {
            Ok(config) => (config, LoadOutcome::Loaded(path.to_path_buf())),
            Err(e) => (Config::default(), LoadOutcome::Invalid(e)),
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        Self::parse(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Validation needs a debug build and the config flag
    pub fn validation_enabled(&self) -> bool {
        cfg!(debug_assertions) && self.debug.validation_layers
    }

    /// Get present mode as Vulkan enum
    pub fn present_mode(&self) -> vk::PresentModeKHR {
        match self.graphics.preferred_present_mode.to_lowercase().as_str() {
            "immediate" => vk::PresentModeKHR::IMMEDIATE,
            "mailbox" => vk::PresentModeKHR::MAILBOX,
            "fifo" => vk::PresentModeKHR::FIFO,
            "fifo_relaxed" => vk::PresentModeKHR::FIFO_RELAXED,
            _ => {
                log::warn!(
                    "Unknown present mode '{}', defaulting to FIFO",
                    self.graphics.preferred_present_mode
                );
                vk::PresentModeKHR::FIFO
            }
        }
    }

    pub fn log_filter(&self) -> log::LevelFilter {
        self.debug.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }

    /// Setup parameters for a window whose drawable area is `extent`
    pub fn setup_params(&self, extent: vk::Extent2D) -> SetupParams {
        SetupParams {
            instance: InstanceRequest {
                application_name: self.debug.application_name.clone(),
                engine_name: self.debug.engine_name.clone(),
                enable_validation: self.validation_enabled(),
            },
            requirements: DeviceRequirements {
                discrete_only: self.device.discrete_only,
                geometry_shader: self.device.geometry_shader,
                ..Default::default()
            },
            window_extent: extent,
            preferred_present_mode: self.present_mode(),
            clear_color: self.graphics.clear_color,
        }
    }
}
