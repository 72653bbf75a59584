use crate::drawing::Layer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UserInputState {
    #[default]
    Idle,
    Panning,
    Drawing,
    Dragging,
}

/// Pointer bookkeeping between `pointer_down` and `pointer_up`.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Last pointer position, screen space
    pub pointer_pos: [f64; 2],
    pub state: UserInputState,
    /// Pointer position and view offset when a pan started
    pub pan_start: Option<([f64; 2], [f64; 2])>,
    /// Canvas-space position where the current draw or drag started
    pub drag_start: Option<[f64; 2]>,
    pub dragged_element: Option<String>,
    pub element_start_pos: Option<[f64; 2]>,
    /// Whether the current drag has already pushed an undo snapshot
    pub drag_recorded: bool,
}

#[derive(Debug, Clone, Default)]
pub struct TextInput {
    pub active: bool,
    pub buffer: String,
    pub pos_canvas: [f64; 2],
}

/// One undo/redo entry.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub layers: Vec<Layer>,
    pub active_layer: String,
    pub selected: Option<String>,
}
