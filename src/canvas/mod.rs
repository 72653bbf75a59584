mod canvas_transform;

pub use canvas_transform::{CanvasTransform, MAX_SCALE, MIN_SCALE};
