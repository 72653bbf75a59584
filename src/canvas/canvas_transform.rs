pub const MIN_SCALE: f64 = 0.1;
pub const MAX_SCALE: f64 = 10.0;

/// Pan/zoom of the editor view. Pointer input arrives in screen space and is
/// mapped into canvas space before it touches the model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasTransform {
    pub offset: [f64; 2],
    pub scale: f64,
}

impl Default for CanvasTransform {
    fn default() -> Self {
        Self::new()
    }
}

impl CanvasTransform {
    pub fn new() -> Self {
        Self {
            offset: [0.0, 0.0],
            scale: 1.0,
        }
    }

    pub fn screen_to_canvas(&self, screen_pos: [f64; 2]) -> [f64; 2] {
        [
            (screen_pos[0] - self.offset[0]) / self.scale,
            (screen_pos[1] - self.offset[1]) / self.scale,
        ]
    }

    pub fn canvas_to_screen(&self, canvas_pos: [f64; 2]) -> [f64; 2] {
        [
            canvas_pos[0] * self.scale + self.offset[0],
            canvas_pos[1] * self.scale + self.offset[1],
        ]
    }

    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.offset[0] += dx;
        self.offset[1] += dy;
    }

    /// Zooms by `factor` keeping the canvas point under `anchor` (screen space) fixed.
    pub fn zoom_at(&mut self, anchor: [f64; 2], factor: f64) {
        let before = self.screen_to_canvas(anchor);
        self.scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        let after = self.screen_to_canvas(anchor);

        self.offset[0] += (after[0] - before[0]) * self.scale;
        self.offset[1] += (after[1] - before[1]) * self.scale;
    }
}
