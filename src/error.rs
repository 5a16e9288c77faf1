use thiserror::Error;

/// Buffer-shape defects. A frame that is simply unavailable this tick is not
/// an error; these fire only when a collaborator hands over buffers whose
/// lengths disagree with their declared dimensions.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("color buffer holds {actual} bytes, expected {expected} for {pixels} pixels")]
    ColorBufferSize {
        expected: usize,
        actual: usize,
        pixels: usize,
    },

    #[error("color-to-depth map holds {actual} entries, expected {expected}")]
    MapSize { expected: usize, actual: usize },

    #[error("depth buffer holds {actual} readings, expected {width}x{height}")]
    DepthBufferSize {
        actual: usize,
        width: u32,
        height: u32,
    },

    #[error("body-index buffer holds {actual} bytes, expected {width}x{height}")]
    BodyIndexSize {
        actual: usize,
        width: u32,
        height: u32,
    },
}
