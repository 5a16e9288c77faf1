use crate::mapper::{CoordinateMapper, project_joint};
use crate::types::{Body, HandState, JOINT_COUNT, JointType, OverlayRect, OverlaySet};

// Logical canvas the overlays are placed on. The canvas is a fixed coordinate
// system for the render layer, independent of screen or frame resolution, and
// the clamp bounds below are tied to the fixed sizes of the overlay bitmaps
// (2000-unit hand items, 3000-unit garment), not derived from anything at
// runtime.
pub const CANVAS_WIDTH: f32 = 25000.0;
pub const CANVAS_HEIGHT: f32 = 16000.0;

const HAND_SCALE_X: f32 = 50.0;
const HAND_SCALE_Y: f32 = 38.0;
const HAND_MAX_LEFT: f32 = 23000.0;
const HAND_MAX_TOP: f32 = 14000.0;

const GARMENT_SCALE_X: f32 = 43.0;
const GARMENT_SCALE_Y: f32 = 26.5;
const GARMENT_SPAN_SCALE_X: f32 = 90.0;
const GARMENT_SPAN_SCALE_Y: f32 = 65.0;
const GARMENT_MAX_LEFT: f32 = 22000.0;
const GARMENT_MAX_TOP: f32 = 13000.0;

/// A joint projected into depth/display space.
pub type DisplayPoint = (f32, f32);

/// Projects every joint of a body into display space, with the negative-depth
/// clamp applied per joint.
pub fn project_body_joints(
    mapper: &dyn CoordinateMapper,
    body: &Body,
) -> [DisplayPoint; JOINT_COUNT] {
    let mut points = [(0.0f32, 0.0f32); JOINT_COUNT];
    for joint in JointType::ALL {
        let projected = project_joint(mapper, body.joint(joint));
        points[joint.index()] = (projected.x, projected.y);
    }
    points
}

/// Anchor rectangle for a hand-held item. A hand the rig is not tracking
/// emits no update, so the previously published rectangle stays in place.
pub fn hand_item_rect(state: HandState, hand: DisplayPoint) -> Option<OverlayRect> {
    if state == HandState::NotTracked {
        return None;
    }

    let left = hand.0 * HAND_SCALE_X;
    let top = hand.1 * HAND_SCALE_Y;
    let mut rect = OverlayRect {
        left,
        top,
        right: HAND_MAX_LEFT - left,
        bottom: HAND_MAX_TOP - top,
    };
    clamp_margins(&mut rect, HAND_MAX_LEFT, HAND_MAX_TOP);
    Some(rect)
}

/// Anchor rectangle for the torso garment, sized from the shoulder and torso
/// spans so the asset stretches with the person.
pub fn garment_rect(points: &[DisplayPoint; JOINT_COUNT]) -> OverlayRect {
    let left_shoulder = points[JointType::ShoulderLeft.index()];
    let right_shoulder = points[JointType::ShoulderRight.index()];
    let spine_base = points[JointType::SpineBase.index()];
    let spine_shoulder = points[JointType::SpineShoulder.index()];
    let neck = points[JointType::Neck.index()];

    let span_x = right_shoulder.0 - left_shoulder.0;
    let span_y = spine_base.1 - spine_shoulder.1;

    let left = left_shoulder.0 * GARMENT_SCALE_X;
    let top = neck.1 * GARMENT_SCALE_Y;
    let mut rect = OverlayRect {
        left,
        top,
        right: CANVAS_WIDTH - left - span_x * GARMENT_SPAN_SCALE_X,
        bottom: CANVAS_HEIGHT - top - span_y * GARMENT_SPAN_SCALE_Y,
    };
    clamp_margins(&mut rect, GARMENT_MAX_LEFT, GARMENT_MAX_TOP);
    rect
}

/// Shared edge clamp keeping a margin rectangle on the canvas. Check order
/// matches the placement contract: negative margins first, then overshoot.
fn clamp_margins(rect: &mut OverlayRect, max_left: f32, max_top: f32) {
    if rect.left < 0.0 {
        rect.left = 0.0;
        rect.right = max_left;
    }
    if rect.top < 0.0 {
        rect.top = 0.0;
        rect.bottom = max_top;
    }
    if rect.left > max_left {
        rect.left = max_left;
        rect.right = 0.0;
    }
    if rect.top > max_top {
        rect.top = max_top;
        rect.bottom = 0.0;
    }
}

/// Recomputes the overlay set from one skeletal tick. Untracked bodies are
/// skipped; when several bodies are tracked the last slot wins (single-user
/// rig assumption). Returns whether any tracked body was processed.
pub fn update_overlays(
    overlays: &mut OverlaySet,
    mapper: &dyn CoordinateMapper,
    bodies: &[Body],
) -> bool {
    let mut updated = false;
    for body in bodies {
        if !body.is_tracked {
            continue;
        }

        let points = project_body_joints(mapper, body);
        if let Some(rect) =
            hand_item_rect(body.hand_left_state, points[JointType::HandLeft.index()])
        {
            overlays.left_hand_item = Some(rect);
        }
        if let Some(rect) =
            hand_item_rect(body.hand_right_state, points[JointType::HandRight.index()])
        {
            overlays.right_hand_item = Some(rect);
        }
        overlays.garment = Some(garment_rect(&points));
        updated = true;
    }
    updated
}
