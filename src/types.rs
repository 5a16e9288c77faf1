use std::time::Instant;

/// Bytes per pixel in the color/composite buffer (BGRA).
pub const BYTES_PER_PIXEL: usize = 4;

/// Number of body slots the rig reports per skeletal tick.
pub const BODY_COUNT: usize = 6;

/// Body-index value meaning "no tracked body owns this depth pixel".
pub const NO_BODY_INDEX: u8 = 0xff;

#[derive(Clone, Debug)]
pub struct ColorFrame {
    pub bgra: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub timestamp: Instant,
}

impl ColorFrame {
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Per-pixel distance readings in millimeters; 0 means "no reading".
#[derive(Clone, Debug)]
pub struct DepthFrame {
    pub data: Vec<u16>,
    pub width: u32,
    pub height: u32,
}

impl DepthFrame {
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// One byte per depth pixel naming the body slot (0..=5) that owns it,
/// or [`NO_BODY_INDEX`].
#[derive(Clone, Debug)]
pub struct BodyIndexFrame {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl BodyIndexFrame {
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// One logically matched color + depth + body-index acquisition.
///
/// Owned exclusively by the fusion tick that acquired it; dropping it on any
/// exit path releases all three frames. Never retained across ticks.
#[derive(Debug)]
pub struct FrameTriple {
    pub color: ColorFrame,
    pub depth: DepthFrame,
    pub body_index: BodyIndexFrame,
}

/// 3-D point in the sensor-centered camera coordinate system, in meters.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CameraSpacePoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl CameraSpacePoint {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        CameraSpacePoint { x, y, z }
    }
}

/// 2-D point on the depth sensor's pixel grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DepthSpacePoint {
    pub x: f32,
    pub y: f32,
}

impl DepthSpacePoint {
    /// "No depth correspondence" sentinel, negative infinity on both axes.
    pub const NONE: DepthSpacePoint = DepthSpacePoint {
        x: f32::NEG_INFINITY,
        y: f32::NEG_INFINITY,
    };

    pub fn new(x: f32, y: f32) -> Self {
        DepthSpacePoint { x, y }
    }

    /// True when either axis carries the sentinel.
    pub fn is_none(&self) -> bool {
        self.x == f32::NEG_INFINITY || self.y == f32::NEG_INFINITY
    }
}

/// Skeletal landmarks reported by the rig, one tracked 3-D position each.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JointType {
    SpineBase,
    SpineMid,
    Neck,
    Head,
    ShoulderLeft,
    ElbowLeft,
    WristLeft,
    HandLeft,
    ShoulderRight,
    ElbowRight,
    WristRight,
    HandRight,
    HipLeft,
    KneeLeft,
    AnkleLeft,
    FootLeft,
    HipRight,
    KneeRight,
    AnkleRight,
    FootRight,
    SpineShoulder,
    HandTipLeft,
    ThumbLeft,
    HandTipRight,
    ThumbRight,
}

pub const JOINT_COUNT: usize = 25;

impl JointType {
    pub const ALL: [JointType; JOINT_COUNT] = [
        JointType::SpineBase,
        JointType::SpineMid,
        JointType::Neck,
        JointType::Head,
        JointType::ShoulderLeft,
        JointType::ElbowLeft,
        JointType::WristLeft,
        JointType::HandLeft,
        JointType::ShoulderRight,
        JointType::ElbowRight,
        JointType::WristRight,
        JointType::HandRight,
        JointType::HipLeft,
        JointType::KneeLeft,
        JointType::AnkleLeft,
        JointType::FootLeft,
        JointType::HipRight,
        JointType::KneeRight,
        JointType::AnkleRight,
        JointType::FootRight,
        JointType::SpineShoulder,
        JointType::HandTipLeft,
        JointType::ThumbLeft,
        JointType::HandTipRight,
        JointType::ThumbRight,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HandState {
    #[default]
    Unknown,
    NotTracked,
    Open,
    Closed,
    Lasso,
}

/// One body slot as reported by the skeletal stream. Slots for people the rig
/// has lost stay allocated with `is_tracked == false`.
#[derive(Clone, Debug)]
pub struct Body {
    pub is_tracked: bool,
    pub joints: [CameraSpacePoint; JOINT_COUNT],
    pub hand_left_state: HandState,
    pub hand_right_state: HandState,
}

impl Body {
    pub fn joint(&self, joint: JointType) -> CameraSpacePoint {
        self.joints[joint.index()]
    }
}

impl Default for Body {
    fn default() -> Self {
        Body {
            is_tracked: false,
            joints: [CameraSpacePoint::default(); JOINT_COUNT],
            hand_left_state: HandState::default(),
            hand_right_state: HandState::default(),
        }
    }
}

/// Margins of an overlay element inside the fixed logical canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct OverlayRect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

/// Current anchor rectangles for the three overlay elements. `None` means the
/// element has never been placed; a rectangle, once emitted, persists until a
/// later tick replaces it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OverlaySet {
    pub left_hand_item: Option<OverlayRect>,
    pub right_hand_item: Option<OverlayRect>,
    pub garment: Option<OverlayRect>,
}

/// Sensor availability, pushed to the render layer on transitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SensorStatus {
    Running,
    NotAvailable,
}
