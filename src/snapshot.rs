use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result, anyhow};
use image::RgbaImage;

use crate::types::ColorFrame;

/// Serializes a composited frame to a timestamped PNG under `dir` and
/// returns the written path. A failure here is reported to the caller and
/// never disturbs the pipeline.
pub fn save_composite(frame: &ColorFrame, dir: &Path) -> Result<PathBuf> {
    // Composite buffers are BGRA; the PNG encoder wants RGBA.
    let mut rgba = frame.bgra.clone();
    for pixel in rgba.chunks_exact_mut(4) {
        pixel.swap(0, 2);
    }

    let image = RgbaImage::from_raw(frame.width, frame.height, rgba)
        .ok_or_else(|| anyhow!("composite buffer does not match {}x{}", frame.width, frame.height))?;

    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let path = dir.join(format!("bodyscreen-composite-{stamp}.png"));
    image
        .save(&path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn saves_a_readable_png() {
        let frame = ColorFrame {
            bgra: vec![255u8; 8 * 4 * 4],
            width: 8,
            height: 4,
            timestamp: Instant::now(),
        };
        let dir = std::env::temp_dir();
        let path = save_composite(&frame, &dir).unwrap();
        let loaded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(loaded.dimensions(), (8, 4));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn rejects_a_buffer_that_does_not_match_its_dimensions() {
        let frame = ColorFrame {
            bgra: vec![0u8; 7],
            width: 8,
            height: 4,
            timestamp: Instant::now(),
        };
        assert!(save_composite(&frame, &std::env::temp_dir()).is_err());
    }
}
