use crate::error::PipelineError;
use crate::types::{CameraSpacePoint, DepthFrame, DepthSpacePoint};

/// Depth floor, in meters, applied to joints before projection. Inferred
/// joints sometimes report a negative Z, which would make the mapper return
/// the (-inf, -inf) sentinel.
pub const INFERRED_Z_CLAMP: f32 = 0.1;

/// Camera-space → depth-space projection capability of the rig.
///
/// The rig owns the calibration data; this crate only consumes the output
/// contract. The bulk form writes one entry per color pixel, row-major, into
/// `out`, reusing its allocation; entries with no depth correspondence carry
/// [`DepthSpacePoint::NONE`].
pub trait CoordinateMapper: Send + Sync {
    fn map_camera_point_to_depth_space(&self, point: CameraSpacePoint) -> DepthSpacePoint;

    fn map_color_frame_to_depth_space(
        &self,
        depth: &DepthFrame,
        color_width: u32,
        color_height: u32,
        out: &mut Vec<DepthSpacePoint>,
    ) -> Result<(), PipelineError>;
}

/// Projects a joint position, clamping a negative depth to
/// [`INFERRED_Z_CLAMP`] first. The clamp applies only to joint projection,
/// never to the bulk color→depth mapping.
pub fn project_joint(mapper: &dyn CoordinateMapper, mut position: CameraSpacePoint) -> DepthSpacePoint {
    if position.z < 0.0 {
        position.z = INFERRED_Z_CLAMP;
    }
    mapper.map_camera_point_to_depth_space(position)
}

/// Pinhole-model mapper for the replay rig and for tests.
///
/// Real hardware ships a calibrated mapper; this one assumes the color and
/// depth cameras share an optical axis, so the bulk mapping is a proportional
/// resample of the color grid onto the depth grid.
#[derive(Clone, Debug)]
pub struct PinholeMapper {
    pub fx: f32,
    pub fy: f32,
    pub cx: f32,
    pub cy: f32,
    pub depth_width: u32,
    pub depth_height: u32,
}

impl PinholeMapper {
    /// Typical intrinsics for a 512x424 depth stream.
    pub fn with_depth_dimensions(depth_width: u32, depth_height: u32) -> Self {
        PinholeMapper {
            fx: 366.6,
            fy: 366.6,
            cx: depth_width as f32 / 2.0,
            cy: depth_height as f32 / 2.0,
            depth_width,
            depth_height,
        }
    }
}

impl CoordinateMapper for PinholeMapper {
    fn map_camera_point_to_depth_space(&self, point: CameraSpacePoint) -> DepthSpacePoint {
        if point.z <= 0.0 {
            return DepthSpacePoint::NONE;
        }
        DepthSpacePoint {
            x: self.fx * point.x / point.z + self.cx,
            // Camera space Y grows upward, pixel rows grow downward.
            y: self.cy - self.fy * point.y / point.z,
        }
    }

    fn map_color_frame_to_depth_space(
        &self,
        depth: &DepthFrame,
        color_width: u32,
        color_height: u32,
        out: &mut Vec<DepthSpacePoint>,
    ) -> Result<(), PipelineError> {
        if depth.data.len() != depth.pixel_count() {
            return Err(PipelineError::DepthBufferSize {
                actual: depth.data.len(),
                width: depth.width,
                height: depth.height,
            });
        }

        let depth_w = depth.width as usize;
        out.clear();
        out.reserve(color_width as usize * color_height as usize);

        for color_y in 0..color_height {
            let depth_y = color_y as u64 * depth.height as u64 / color_height as u64;
            let row = depth_y as usize * depth_w;
            for color_x in 0..color_width {
                let depth_x = (color_x as u64 * depth.width as u64 / color_width as u64) as usize;
                // A zero reading means the depth sensor saw nothing there, so
                // the color pixel has no correspondence.
                if depth.data[row + depth_x] == 0 {
                    out.push(DepthSpacePoint::NONE);
                } else {
                    out.push(DepthSpacePoint::new(depth_x as f32, depth_y as f32));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_mapper() -> PinholeMapper {
        PinholeMapper::with_depth_dimensions(512, 424)
    }

    #[test]
    fn negative_joint_depth_is_clamped_to_floor() {
        struct Probe;
        impl CoordinateMapper for Probe {
            fn map_camera_point_to_depth_space(&self, point: CameraSpacePoint) -> DepthSpacePoint {
                // Echo Z back so the test can observe what was projected.
                DepthSpacePoint::new(point.z, point.z)
            }
            fn map_color_frame_to_depth_space(
                &self,
                _depth: &DepthFrame,
                _color_width: u32,
                _color_height: u32,
                _out: &mut Vec<DepthSpacePoint>,
            ) -> Result<(), PipelineError> {
                unreachable!()
            }
        }

        let projected = project_joint(&Probe, CameraSpacePoint::new(0.0, 0.0, -0.5));
        assert_eq!(projected.x, INFERRED_Z_CLAMP);

        let projected = project_joint(&Probe, CameraSpacePoint::new(0.0, 0.0, 1.8));
        assert_eq!(projected.x, 1.8);

        let projected = project_joint(&Probe, CameraSpacePoint::new(0.0, 0.0, 0.0));
        assert_eq!(projected.x, 0.0);
    }

    #[test]
    fn point_on_optical_axis_projects_to_principal_point() {
        let mapper = test_mapper();
        let p = mapper.map_camera_point_to_depth_space(CameraSpacePoint::new(0.0, 0.0, 2.0));
        assert_eq!(p.x, 256.0);
        assert_eq!(p.y, 212.0);
    }

    #[test]
    fn nonpositive_depth_projects_to_sentinel() {
        let mapper = test_mapper();
        let p = mapper.map_camera_point_to_depth_space(CameraSpacePoint::new(0.3, 0.1, 0.0));
        assert!(p.is_none());
    }

    #[test]
    fn bulk_mapping_marks_missing_depth_with_sentinel() {
        let mapper = test_mapper();
        let mut depth = DepthFrame {
            data: vec![2000u16; 512 * 424],
            width: 512,
            height: 424,
        };
        // Kill the reading under the first color pixel.
        depth.data[0] = 0;

        let mut map = Vec::new();
        mapper
            .map_color_frame_to_depth_space(&depth, 1024, 848, &mut map)
            .unwrap();

        assert_eq!(map.len(), 1024 * 848);
        assert!(map[0].is_none());
        assert!(map[1].is_none()); // color (1,0) also resamples to depth (0,0)
        assert_eq!(map[2], DepthSpacePoint::new(1.0, 0.0));
    }

    #[test]
    fn bulk_mapping_rejects_malformed_depth_buffer() {
        let mapper = test_mapper();
        let depth = DepthFrame {
            data: vec![2000u16; 10],
            width: 512,
            height: 424,
        };
        let mut map = Vec::new();
        let err = mapper
            .map_color_frame_to_depth_space(&depth, 1024, 848, &mut map)
            .unwrap_err();
        assert!(matches!(err, PipelineError::DepthBufferSize { .. }));
    }
}
