use rayon::prelude::*;

use crate::error::PipelineError;
use crate::types::{BYTES_PER_PIXEL, BodyIndexFrame, DepthSpacePoint, NO_BODY_INDEX};

/// Masks the color buffer in place: every pixel whose mapped depth coordinate
/// does not land on a tracked body is zeroed (fully transparent black), every
/// pixel that does is left byte-for-byte untouched.
///
/// `map` carries one depth-space entry per color pixel, row-major. This is a
/// full scan of the color frame and the latency-critical path of a tick, so
/// the pixels are walked with the parallel chunk iterator.
pub fn fuse(
    color: &mut [u8],
    map: &[DepthSpacePoint],
    body_index: &BodyIndexFrame,
) -> Result<(), PipelineError> {
    if color.len() != map.len() * BYTES_PER_PIXEL {
        return Err(PipelineError::ColorBufferSize {
            expected: map.len() * BYTES_PER_PIXEL,
            actual: color.len(),
            pixels: map.len(),
        });
    }
    if body_index.data.len() != body_index.pixel_count() {
        return Err(PipelineError::BodyIndexSize {
            actual: body_index.data.len(),
            width: body_index.width,
            height: body_index.height,
        });
    }

    let depth_width = body_index.width as i32;
    let depth_height = body_index.height as i32;
    let index_data = body_index.data.as_slice();

    color
        .par_chunks_exact_mut(BYTES_PER_PIXEL)
        .zip(map.par_iter())
        .for_each(|(pixel, mapped)| {
            if !covers_body(mapped, index_data, depth_width, depth_height) {
                pixel.fill(0);
            }
        });

    Ok(())
}

/// Whether the mapped depth coordinate lands on a pixel owned by a tracked
/// body. A sentinel entry, an out-of-bounds coordinate, or a malformed
/// mapping all resolve to "background" here, never to a failure.
fn covers_body(mapped: &DepthSpacePoint, index_data: &[u8], width: i32, height: i32) -> bool {
    if mapped.is_none() {
        return false;
    }

    // Round half-up to the nearest depth pixel.
    let depth_x = (mapped.x + 0.5).floor() as i32;
    let depth_y = (mapped.y + 0.5).floor() as i32;

    if depth_x < 0 || depth_x >= width || depth_y < 0 || depth_y >= height {
        return false;
    }

    index_data[(depth_y * width + depth_x) as usize] != NO_BODY_INDEX
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEPTH_W: u32 = 4;
    const DEPTH_H: u32 = 3;

    fn body_index_frame(data: Vec<u8>) -> BodyIndexFrame {
        BodyIndexFrame {
            data,
            width: DEPTH_W,
            height: DEPTH_H,
        }
    }

    fn all_background() -> BodyIndexFrame {
        body_index_frame(vec![NO_BODY_INDEX; (DEPTH_W * DEPTH_H) as usize])
    }

    fn all_body() -> BodyIndexFrame {
        body_index_frame(vec![0u8; (DEPTH_W * DEPTH_H) as usize])
    }

    fn color_for(pixels: usize) -> Vec<u8> {
        (0..pixels * BYTES_PER_PIXEL).map(|i| (i % 251 + 1) as u8).collect()
    }

    #[test]
    fn sentinel_entries_zero_their_pixels() {
        let mut color = color_for(2);
        let map = vec![DepthSpacePoint::NONE, DepthSpacePoint::new(1.0, 1.0)];

        fuse(&mut color, &map, &all_body()).unwrap();

        assert_eq!(&color[..4], &[0, 0, 0, 0]);
        assert_ne!(&color[4..8], &[0, 0, 0, 0]);
    }

    #[test]
    fn out_of_bounds_coordinates_zero_their_pixels() {
        let out_of_bounds = [
            DepthSpacePoint::new(-1.0, 0.0),
            DepthSpacePoint::new(0.0, -1.0),
            DepthSpacePoint::new(DEPTH_W as f32, 0.0),
            DepthSpacePoint::new(0.0, DEPTH_H as f32),
            // 3.6 rounds half-up to 4 == DEPTH_W, which is out of range.
            DepthSpacePoint::new(3.6, 0.0),
        ];
        let mut color = color_for(out_of_bounds.len());

        fuse(&mut color, &out_of_bounds, &all_body()).unwrap();

        assert!(color.iter().all(|&b| b == 0));
    }

    #[test]
    fn rounding_is_half_up() {
        // 0.5 rounds to 1, 0.49 rounds to 0, -0.5 rounds to 0 (in bounds).
        let map = [
            DepthSpacePoint::new(0.5, 0.49),
            DepthSpacePoint::new(-0.5, -0.5),
        ];
        let mut index = all_background();
        index.data[1] = 2; // depth (1, 0)
        index.data[0] = 4; // depth (0, 0)
        let mut color = color_for(map.len());
        let original = color.clone();

        fuse(&mut color, &map, &index).unwrap();

        assert_eq!(color, original);
    }

    #[test]
    fn body_pixels_are_left_untouched() {
        let pixels = (DEPTH_W * DEPTH_H) as usize;
        let map: Vec<DepthSpacePoint> = (0..pixels)
            .map(|i| {
                DepthSpacePoint::new((i as u32 % DEPTH_W) as f32, (i as u32 / DEPTH_W) as f32)
            })
            .collect();
        let mut index = all_background();
        index.data[5] = 1;
        index.data[7] = 3;

        let mut color = color_for(pixels);
        let original = color.clone();

        fuse(&mut color, &map, &index).unwrap();

        for i in 0..pixels {
            let slice = &color[i * 4..i * 4 + 4];
            if i == 5 || i == 7 {
                assert_eq!(slice, &original[i * 4..i * 4 + 4]);
            } else {
                assert_eq!(slice, &[0, 0, 0, 0]);
            }
        }
    }

    #[test]
    fn full_body_coverage_leaves_composite_equal_to_input() {
        let pixels = (DEPTH_W * DEPTH_H) as usize;
        let map: Vec<DepthSpacePoint> = (0..pixels)
            .map(|i| {
                DepthSpacePoint::new((i as u32 % DEPTH_W) as f32, (i as u32 / DEPTH_W) as f32)
            })
            .collect();
        let mut color = color_for(pixels);
        let original = color.clone();

        fuse(&mut color, &map, &all_body()).unwrap();

        assert_eq!(color, original);
    }

    #[test]
    fn fusion_is_idempotent() {
        let pixels = (DEPTH_W * DEPTH_H) as usize;
        let map: Vec<DepthSpacePoint> = (0..pixels)
            .map(|i| {
                if i % 3 == 0 {
                    DepthSpacePoint::NONE
                } else {
                    DepthSpacePoint::new((i as u32 % DEPTH_W) as f32, (i as u32 / DEPTH_W) as f32)
                }
            })
            .collect();
        let mut index = all_background();
        index.data[2] = 0;
        index.data[10] = 5;

        let mut color = color_for(pixels);
        fuse(&mut color, &map, &index).unwrap();
        let once = color.clone();
        fuse(&mut color, &map, &index).unwrap();

        assert_eq!(color, once);
    }

    #[test]
    fn mismatched_buffers_are_rejected() {
        let mut color = color_for(3);
        let map = vec![DepthSpacePoint::NONE; 2];
        let err = fuse(&mut color, &map, &all_body()).unwrap_err();
        assert!(matches!(err, PipelineError::ColorBufferSize { .. }));

        let mut color = color_for(2);
        let bad_index = body_index_frame(vec![NO_BODY_INDEX; 3]);
        let err = fuse(&mut color, &map, &bad_index).unwrap_err();
        assert!(matches!(err, PipelineError::BodyIndexSize { .. }));
    }
}
