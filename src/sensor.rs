use std::time::{Duration, Instant};

use crate::types::{
    BODY_COUNT, Body, BodyIndexFrame, CameraSpacePoint, ColorFrame, DepthFrame, FrameTriple,
    HandState, JointType, NO_BODY_INDEX,
};

/// Per-tick frame acquisition surface of the depth rig.
///
/// `None` / `false` returns are normal, high-frequency conditions (the frame
/// reference expired before we got to it), not errors. The skeletal stream
/// runs at its own, usually lower, rate than the frame triple.
pub trait DepthSensor: Send + 'static {
    fn color_dimensions(&self) -> (u32, u32);

    fn depth_dimensions(&self) -> (u32, u32);

    /// Acquires one logically matched color/depth/body-index triple, or
    /// `None` when any of the three streams missed this tick.
    fn acquire_frame_triple(&mut self) -> Option<FrameTriple>;

    /// Refreshes the body slots from the skeletal stream. Returns `false`
    /// when no body frame arrived this tick; the slots are left untouched.
    fn acquire_bodies(&mut self, bodies: &mut [Body; BODY_COUNT]) -> bool;

    fn is_available(&self) -> bool;
}

/// Deterministic stand-in for the hardware rig.
///
/// Synthesizes a gradient color frame, a flat depth field with a dead band on
/// the left edge, and one tracked body whose silhouette is a disc sweeping
/// horizontally across the frame. Paces itself to `fps` (0 disables pacing,
/// which the tests use).
pub struct ReplaySensor {
    color_width: u32,
    color_height: u32,
    depth_width: u32,
    depth_height: u32,
    fps: u32,
    tick: u64,
    last_frame: Option<Instant>,
}

/// Raw depth value, in millimeters, of everything the replay rig "sees".
const REPLAY_DEPTH_MM: u16 = 2000;

/// Width of the no-reading band on the left edge, as a fraction of the
/// depth frame width.
const DEAD_BAND_DIVISOR: u32 = 16;

impl ReplaySensor {
    pub fn new(
        color_width: u32,
        color_height: u32,
        depth_width: u32,
        depth_height: u32,
        fps: u32,
    ) -> Self {
        ReplaySensor {
            color_width,
            color_height,
            depth_width,
            depth_height,
            fps,
            tick: 0,
            last_frame: None,
        }
    }

    /// Center of the synthetic person's silhouette in depth space.
    fn person_center(&self) -> (f32, f32) {
        let sweep = self.depth_width as f32 / 4.0;
        let phase = (self.tick as f32 / 30.0).sin();
        (
            self.depth_width as f32 / 2.0 + sweep * phase,
            self.depth_height as f32 / 2.0,
        )
    }

    fn person_radius(&self) -> f32 {
        self.depth_height as f32 / 4.0
    }

    fn pace(&mut self) {
        if self.fps == 0 {
            return;
        }
        let interval = Duration::from_secs(1) / self.fps;
        if let Some(last) = self.last_frame {
            let elapsed = last.elapsed();
            if elapsed < interval {
                std::thread::sleep(interval - elapsed);
            }
        }
        self.last_frame = Some(Instant::now());
    }

    fn synthesize_color(&self) -> ColorFrame {
        let (w, h) = (self.color_width as usize, self.color_height as usize);
        let mut bgra = vec![0u8; w * h * 4];
        for y in 0..h {
            for x in 0..w {
                let i = (y * w + x) * 4;
                bgra[i] = (x * 255 / w.max(1)) as u8;
                bgra[i + 1] = (y * 255 / h.max(1)) as u8;
                bgra[i + 2] = ((self.tick as usize) % 256) as u8;
                bgra[i + 3] = 255;
            }
        }
        ColorFrame {
            bgra,
            width: self.color_width,
            height: self.color_height,
            timestamp: Instant::now(),
        }
    }

    fn synthesize_depth_and_index(&self) -> (DepthFrame, BodyIndexFrame) {
        let (w, h) = (self.depth_width as usize, self.depth_height as usize);
        let dead_band = (self.depth_width / DEAD_BAND_DIVISOR) as usize;
        let (cx, cy) = self.person_center();
        let radius_sq = self.person_radius() * self.person_radius();

        let mut depth = vec![REPLAY_DEPTH_MM; w * h];
        let mut index = vec![NO_BODY_INDEX; w * h];
        for y in 0..h {
            for x in 0..w {
                let i = y * w + x;
                if x < dead_band {
                    depth[i] = 0;
                    continue;
                }
                let dx = x as f32 - cx;
                let dy = y as f32 - cy;
                if dx * dx + dy * dy <= radius_sq {
                    index[i] = 0;
                }
            }
        }

        (
            DepthFrame {
                data: depth,
                width: self.depth_width,
                height: self.depth_height,
            },
            BodyIndexFrame {
                data: index,
                width: self.depth_width,
                height: self.depth_height,
            },
        )
    }

    /// Camera-space position that projects onto the given depth pixel under
    /// the replay rig's pinhole geometry.
    fn camera_point_at(&self, px: f32, py: f32) -> CameraSpacePoint {
        let z = REPLAY_DEPTH_MM as f32 / 1000.0;
        let fx = 366.6;
        let fy = 366.6;
        let cx = self.depth_width as f32 / 2.0;
        let cy = self.depth_height as f32 / 2.0;
        CameraSpacePoint::new((px - cx) * z / fx, (cy - py) * z / fy, z)
    }
}

impl DepthSensor for ReplaySensor {
    fn color_dimensions(&self) -> (u32, u32) {
        (self.color_width, self.color_height)
    }

    fn depth_dimensions(&self) -> (u32, u32) {
        (self.depth_width, self.depth_height)
    }

    fn acquire_frame_triple(&mut self) -> Option<FrameTriple> {
        self.pace();
        self.tick += 1;
        let color = self.synthesize_color();
        let (depth, body_index) = self.synthesize_depth_and_index();
        Some(FrameTriple {
            color,
            depth,
            body_index,
        })
    }

    fn acquire_bodies(&mut self, bodies: &mut [Body; BODY_COUNT]) -> bool {
        // Skeletal stream runs at half the frame rate.
        if self.tick % 2 != 0 {
            return false;
        }

        let (cx, cy) = self.person_center();
        let radius = self.person_radius();

        let body = &mut bodies[0];
        body.is_tracked = true;
        body.hand_left_state = HandState::Open;
        body.hand_right_state = HandState::Open;
        for joint in JointType::ALL {
            body.joints[joint.index()] = self.camera_point_at(cx, cy);
        }
        body.joints[JointType::Neck.index()] = self.camera_point_at(cx, cy - radius * 0.8);
        body.joints[JointType::SpineShoulder.index()] = self.camera_point_at(cx, cy - radius * 0.6);
        body.joints[JointType::SpineBase.index()] = self.camera_point_at(cx, cy + radius * 0.8);
        body.joints[JointType::ShoulderLeft.index()] =
            self.camera_point_at(cx - radius * 0.7, cy - radius * 0.6);
        body.joints[JointType::ShoulderRight.index()] =
            self.camera_point_at(cx + radius * 0.7, cy - radius * 0.6);
        body.joints[JointType::HandLeft.index()] =
            self.camera_point_at(cx - radius * 0.9, cy + radius * 0.2);
        body.joints[JointType::HandRight.index()] =
            self.camera_point_at(cx + radius * 0.9, cy + radius * 0.2);

        for slot in bodies.iter_mut().skip(1) {
            slot.is_tracked = false;
        }
        true
    }

    fn is_available(&self) -> bool {
        true
    }
}
