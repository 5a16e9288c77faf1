use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::Duration,
};

use crossbeam_channel::Sender;

use super::{fusion, overlay};
use crate::error::PipelineError;
use crate::mapper::CoordinateMapper;
use crate::sensor::DepthSensor;
use crate::types::{
    BODY_COUNT, Body, ColorFrame, DepthSpacePoint, FrameTriple, OverlaySet, SensorStatus,
};

/// Running fusion/overlay pipeline. Dropping the handle stops the worker
/// thread and joins it.
#[derive(Debug)]
pub struct PipelineHandle {
    stop: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl PipelineHandle {
    pub fn stop(mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for PipelineHandle {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Starts the pipeline worker. One thread owns the sensor, the reusable
/// color→depth table, the body slots, and the overlay state; fusion ticks and
/// skeletal ticks both run to completion on it, so nothing here needs a lock.
///
/// Composites and overlay sets are pushed with `try_send`: if the display
/// side is busy the frame is dropped, never queued up.
pub fn start_pipeline<S: DepthSensor>(
    mut sensor: S,
    mapper: Arc<dyn CoordinateMapper>,
    composite_tx: Sender<ColorFrame>,
    overlay_tx: Sender<OverlaySet>,
    status_tx: Sender<SensorStatus>,
) -> PipelineHandle {
    let stop = Arc::new(AtomicBool::new(false));
    let stop_flag = stop.clone();

    let handle = thread::spawn(move || {
        let (color_width, color_height) = sensor.color_dimensions();
        let mut color_to_depth: Vec<DepthSpacePoint> =
            Vec::with_capacity(color_width as usize * color_height as usize);
        let mut bodies: [Body; BODY_COUNT] = Default::default();
        let mut overlays = OverlaySet::default();
        let mut last_status: Option<SensorStatus> = None;

        while !stop_flag.load(Ordering::Relaxed) {
            let status = if sensor.is_available() {
                SensorStatus::Running
            } else {
                SensorStatus::NotAvailable
            };
            if last_status != Some(status) {
                last_status = Some(status);
                let _ = status_tx.try_send(status);
            }

            let mut idle = true;

            match run_fusion_tick(&mut sensor, mapper.as_ref(), &mut color_to_depth) {
                Ok(Some(composite)) => {
                    idle = false;
                    let _ = composite_tx.try_send(composite);
                }
                // Frame unavailable: a normal tick-skip, not worth logging.
                Ok(None) => {}
                Err(err) => {
                    log::warn!("fusion tick skipped: {err}");
                }
            }

            if sensor.acquire_bodies(&mut bodies) {
                idle = false;
                if overlay::update_overlays(&mut overlays, mapper.as_ref(), &bodies) {
                    let _ = overlay_tx.try_send(overlays.clone());
                }
            }

            if idle {
                thread::sleep(Duration::from_millis(1));
            }
        }
    });

    PipelineHandle {
        stop,
        handle: Some(handle),
    }
}

/// One fusion tick: acquire the matched triple, rebuild the color→depth
/// table, mask the color buffer, hand it back as the composite.
///
/// Returns `Ok(None)` when any of the three frames missed the tick; whatever
/// was acquired inside the sensor is released when the partial state drops.
fn run_fusion_tick<S: DepthSensor>(
    sensor: &mut S,
    mapper: &dyn CoordinateMapper,
    color_to_depth: &mut Vec<DepthSpacePoint>,
) -> Result<Option<ColorFrame>, PipelineError> {
    let Some(triple) = sensor.acquire_frame_triple() else {
        return Ok(None);
    };
    let FrameTriple {
        mut color,
        depth,
        body_index,
    } = triple;

    mapper.map_color_frame_to_depth_space(&depth, color.width, color.height, color_to_depth)?;
    // The depth frame is only needed for the mapping; release it before the
    // pixel scan.
    drop(depth);

    fusion::fuse(&mut color.bgra, color_to_depth, &body_index)?;
    Ok(Some(color))
}
