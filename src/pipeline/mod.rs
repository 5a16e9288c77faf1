pub mod fusion;
pub mod overlay;
pub mod worker;

// Re-exports for convenience
pub use fusion::fuse;
pub use overlay::{garment_rect, hand_item_rect, project_body_joints, update_overlays};
pub use worker::{PipelineHandle, start_pipeline};
