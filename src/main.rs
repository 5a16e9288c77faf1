use std::{env, path::Path, sync::Arc, time::Duration};

use anyhow::Result;
use crossbeam_channel::bounded;

use bodyscreen::config::Config;
use bodyscreen::mapper::PinholeMapper;
use bodyscreen::pipeline::start_pipeline;
use bodyscreen::sensor::ReplaySensor;
use bodyscreen::snapshot;

/// Demo frames to pull from the pipeline before writing a snapshot.
const DEMO_FRAMES: usize = 90;

fn main() -> Result<()> {
    env_logger::init();

    let config = match env::args().nth(1) {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let replay = config.replay;

    let sensor = ReplaySensor::new(
        replay.color_width,
        replay.color_height,
        replay.depth_width,
        replay.depth_height,
        replay.fps,
    );
    let mapper = Arc::new(PinholeMapper::with_depth_dimensions(
        replay.depth_width,
        replay.depth_height,
    ));

    let (composite_tx, composite_rx) = bounded(1);
    let (overlay_tx, overlay_rx) = bounded(1);
    let (status_tx, status_rx) = bounded(4);

    let pipeline = start_pipeline(sensor, mapper, composite_tx, overlay_tx, status_tx);

    let mut last_composite = None;
    for _ in 0..DEMO_FRAMES {
        match composite_rx.recv_timeout(Duration::from_secs(5)) {
            Ok(frame) => last_composite = Some(frame),
            Err(err) => {
                log::error!("pipeline stopped producing composites: {err}");
                break;
            }
        }
        if let Ok(status) = status_rx.try_recv() {
            log::info!("sensor status: {status:?}");
        }
        if let Ok(overlays) = overlay_rx.try_recv() {
            log::debug!("overlay update: {overlays:?}");
        }
    }
    pipeline.stop();

    if let Some(frame) = last_composite {
        let path = snapshot::save_composite(&frame, Path::new(&config.snapshot.output_dir))?;
        log::info!("wrote {}", path.display());
    }

    Ok(())
}
