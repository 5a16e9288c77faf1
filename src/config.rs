use std::fs;
use std::path::Path;

use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub replay: ReplayConfig,
    #[serde(default)]
    pub snapshot: SnapshotConfig,
}

/// Stream geometry and pacing for the replay rig.
#[derive(Debug, Deserialize, Clone)]
pub struct ReplayConfig {
    #[serde(default = "default_color_width")]
    pub color_width: u32,
    #[serde(default = "default_color_height")]
    pub color_height: u32,
    #[serde(default = "default_depth_width")]
    pub depth_width: u32,
    #[serde(default = "default_depth_height")]
    pub depth_height: u32,
    /// Frame pacing; 0 runs unpaced.
    #[serde(default = "default_fps")]
    pub fps: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SnapshotConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

fn default_color_width() -> u32 {
    1920
}
fn default_color_height() -> u32 {
    1080
}
fn default_depth_width() -> u32 {
    512
}
fn default_depth_height() -> u32 {
    424
}
fn default_fps() -> u32 {
    30
}
fn default_output_dir() -> String {
    ".".to_string()
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            color_width: default_color_width(),
            color_height: default_color_height(),
            depth_width: default_depth_width(),
            depth_height: default_depth_height(),
            fps: default_fps(),
        }
    }
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_gets_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.replay.color_width, 1920);
        assert_eq!(config.replay.depth_height, 424);
        assert_eq!(config.snapshot.output_dir, ".");
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config: Config = toml::from_str(
            "[replay]\ncolor_width = 640\ncolor_height = 480\nfps = 0\n",
        )
        .unwrap();
        assert_eq!(config.replay.color_width, 640);
        assert_eq!(config.replay.fps, 0);
        assert_eq!(config.replay.depth_width, 512);
    }
}
