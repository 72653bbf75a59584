use crate::drawing::{self, Element, ElementKind, Tool};
use crate::math;
use crate::session::Session;
use crate::state::UserInputState::{Dragging, Drawing, Idle, Panning};

/// Id given to the transient element shown while a drag is in progress.
pub const PREVIEW_ID: &str = "preview";

impl Session {
    /// Starts a gesture at `screen_pos`. With `pan` set (shift or middle button)
    /// the gesture always pans the view; otherwise the current tool decides.
    pub fn pointer_down(&mut self, screen_pos: [f64; 2], pan: bool) {
        self.input.pointer_pos = screen_pos;

        if self.typing.active {
            self.commit_text();
        }

        if pan {
            self.start_pan(screen_pos);
            return;
        }

        let canvas_pos = self.transform.screen_to_canvas(screen_pos);
        match self.current_tool {
            Tool::Select => match self.select_at(canvas_pos) {
                Some(id) => {
                    log::debug!("Selected element {} at {:?}", id, canvas_pos);
                    self.input.element_start_pos =
                        self.find_element(&id).map(Element::position);
                    self.input.state = Dragging;
                    self.input.dragged_element = Some(id);
                    self.input.drag_start = Some(canvas_pos);
                    self.input.drag_recorded = false;
                }
                None => self.start_pan(screen_pos),
            },
            Tool::Text => {
                self.typing.active = true;
                self.typing.pos_canvas = canvas_pos;
                self.typing.buffer.clear();
            }
            Tool::Line | Tool::Arrow | Tool::Rectangle | Tool::Circle => {
                self.input.state = Drawing;
                self.input.drag_start = Some(canvas_pos);
            }
        }
    }

    fn start_pan(&mut self, screen_pos: [f64; 2]) {
        self.input.state = Panning;
        self.input.pan_start = Some((screen_pos, self.transform.offset));
    }

    pub fn pointer_move(&mut self, screen_pos: [f64; 2]) {
        self.input.pointer_pos = screen_pos;

        match self.input.state {
            Panning => {
                if let Some((start_pointer, start_offset)) = self.input.pan_start {
                    self.transform.offset = [
                        start_offset[0] + (screen_pos[0] - start_pointer[0]),
                        start_offset[1] + (screen_pos[1] - start_pointer[1]),
                    ];
                }
            }
            Dragging => {
                let canvas_pos = self.transform.screen_to_canvas(screen_pos);
                if let (Some(id), Some(start), Some(orig)) = (
                    self.input.dragged_element.clone(),
                    self.input.drag_start,
                    self.input.element_start_pos,
                ) {
                    let target = [
                        orig[0] + canvas_pos[0] - start[0],
                        orig[1] + canvas_pos[1] - start[1],
                    ];
                    self.move_dragged_element(&id, target);
                }
            }
            Drawing | Idle => {}
        }
    }

    /// Moves the dragged element's anchor to `target`. The whole drag is one
    /// undo step, recorded on the first movement.
    fn move_dragged_element(&mut self, id: &str, target: [f64; 2]) {
        let Some(current) = self.find_element(id).map(Element::position) else {
            return;
        };
        let (dx, dy) = (target[0] - current[0], target[1] - current[1]);
        if dx == 0.0 && dy == 0.0 {
            return;
        }

        if !self.input.drag_recorded {
            self.save_state();
            self.input.drag_recorded = true;
        }
        if let Some(element) = self.element_mut(id) {
            element.translate(dx, dy);
        }
    }

    /// Ends the gesture. Returns the id of the element a drawing tool created,
    /// if any.
    pub fn pointer_up(&mut self, screen_pos: [f64; 2]) -> Option<String> {
        self.input.pointer_pos = screen_pos;

        let created = match self.input.state {
            Drawing => self.finish_drawing(),
            Panning | Dragging | Idle => None,
        };

        self.input.state = Idle;
        self.input.pan_start = None;
        self.input.drag_start = None;
        self.input.dragged_element = None;
        self.input.element_start_pos = None;
        self.input.drag_recorded = false;
        created
    }

    /// Element the current drawing gesture would produce if released at the
    /// last pointer position.
    fn drawn_element(&self) -> Option<Element> {
        let start = self.input.drag_start?;
        let end = self.transform.screen_to_canvas(self.input.pointer_pos);

        let (x, y, kind) = match self.current_tool {
            Tool::Rectangle => {
                let width = (end[0] - start[0]).abs();
                let height = (end[1] - start[1]).abs();
                if width == 0.0 || height == 0.0 {
                    return None;
                }
                (
                    start[0].min(end[0]),
                    start[1].min(end[1]),
                    ElementKind::Rectangle { width, height },
                )
            }
            Tool::Circle => {
                let radius = math::distance(start, end);
                if radius == 0.0 {
                    return None;
                }
                (
                    start[0] - radius,
                    start[1] - radius,
                    ElementKind::Circle { width: radius * 2.0, height: radius * 2.0 },
                )
            }
            Tool::Line | Tool::Arrow => {
                if start == end {
                    return None;
                }
                let kind = if self.current_tool == Tool::Line {
                    ElementKind::Line { end_x: end[0], end_y: end[1] }
                } else {
                    ElementKind::Arrow { end_x: end[0], end_y: end[1] }
                };
                (start[0], start[1], kind)
            }
            Tool::Select | Tool::Text => return None,
        };

        Some(
            Element::new(PREVIEW_ID, x, y, kind)
                .with_color(self.current_color.clone())
                .with_stroke_width(self.stroke_width),
        )
    }

    fn finish_drawing(&mut self) -> Option<String> {
        let mut element = self.drawn_element()?;
        element.id = drawing::new_element_id();
        Some(self.push_element(element))
    }

    /// The in-progress shape or text, for display only. Never part of the model.
    pub fn preview_element(&self) -> Option<Element> {
        if self.typing.active {
            if self.typing.buffer.is_empty() {
                return None;
            }
            let [x, y] = self.typing.pos_canvas;
            let kind = ElementKind::Text {
                content: self.typing.buffer.clone(),
                font_size: self.config.default_font_size,
            };
            return Some(
                Element::new(PREVIEW_ID, x, y, kind).with_color(self.current_color.clone()),
            );
        }

        match self.input.state {
            Drawing => self.drawn_element(),
            Idle | Panning | Dragging => None,
        }
    }

    pub fn is_typing(&self) -> bool {
        self.typing.active
    }

    /// Appends typed characters to the pending text. Control characters are
    /// dropped. Returns whether anything was added.
    pub fn text_input(&mut self, text: &str) -> bool {
        if !self.typing.active {
            return false;
        }
        let before = self.typing.buffer.len();
        self.typing
            .buffer
            .extend(text.chars().filter(|ch| !ch.is_control()));
        self.typing.buffer.len() != before
    }

    pub fn backspace(&mut self) -> bool {
        self.typing.active && self.typing.buffer.pop().is_some()
    }

    /// Finishes typing. A non-empty buffer becomes a text element in the active
    /// layer; an empty one is discarded.
    pub fn commit_text(&mut self) -> Option<String> {
        if !self.typing.active {
            return None;
        }
        self.typing.active = false;
        let content = std::mem::take(&mut self.typing.buffer);
        if content.is_empty() {
            return None;
        }

        let [x, y] = self.typing.pos_canvas;
        let font_size = self.config.default_font_size;
        Some(self.add_element(ElementKind::Text { content, font_size }, x, y))
    }

    pub fn cancel_text(&mut self) {
        self.typing.active = false;
        self.typing.buffer.clear();
    }

    /// Zooms by `factor` around `screen_pos`, within the transform's scale limits.
    pub fn zoom(&mut self, screen_pos: [f64; 2], factor: f64) {
        self.transform.zoom_at(screen_pos, factor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn session_with(tool: Tool) -> Session {
        let mut session = Session::new(Config::default());
        session.current_tool = tool;
        session
    }

    fn drag(session: &mut Session, from: [f64; 2], to: [f64; 2]) -> Option<String> {
        session.pointer_down(from, false);
        session.pointer_move(to);
        session.pointer_up(to)
    }

    #[test]
    fn test_rectangle_from_any_drag_direction() {
        let mut session = session_with(Tool::Rectangle);
        let id = drag(&mut session, [60.0, 80.0], [10.0, 20.0]).unwrap();

        let rect = session.find_element(&id).unwrap();
        assert_eq!(rect.position(), [10.0, 20.0]);
        assert_eq!(rect.kind, ElementKind::Rectangle { width: 50.0, height: 60.0 });
        assert_eq!(rect.stroke_width, 2.0);
        assert_eq!(rect.layer_id, session.active_layer_id());
    }

    #[test]
    fn test_circle_from_center_and_radius() {
        let mut session = session_with(Tool::Circle);
        let id = drag(&mut session, [100.0, 100.0], [103.0, 104.0]).unwrap();

        let circle = session.find_element(&id).unwrap();
        assert_eq!(circle.position(), [95.0, 95.0]);
        assert_eq!(circle.kind, ElementKind::Circle { width: 10.0, height: 10.0 });
    }

    #[test]
    fn test_line_and_arrow() {
        let mut session = session_with(Tool::Arrow);
        let id = drag(&mut session, [0.0, 0.0], [30.0, 40.0]).unwrap();
        assert_eq!(
            session.find_element(&id).unwrap().kind,
            ElementKind::Arrow { end_x: 30.0, end_y: 40.0 }
        );

        session.current_tool = Tool::Line;
        let id = drag(&mut session, [5.0, 5.0], [6.0, 5.0]).unwrap();
        assert_eq!(session.find_element(&id).unwrap().kind.name(), "line");
    }

    #[test]
    fn test_degenerate_drags_create_nothing() {
        for tool in [Tool::Rectangle, Tool::Circle, Tool::Line, Tool::Arrow] {
            let mut session = session_with(tool);
            assert_eq!(drag(&mut session, [10.0, 10.0], [10.0, 10.0]), None);
            assert_eq!(session.element_count(), 0);
            assert!(!session.can_undo());
        }

        let mut session = session_with(Tool::Rectangle);
        assert_eq!(drag(&mut session, [10.0, 10.0], [50.0, 10.0]), None);
    }

    #[test]
    fn test_drawing_maps_through_transform() {
        let mut session = session_with(Tool::Rectangle);
        session.transform.offset = [100.0, 100.0];
        session.transform.scale = 2.0;

        let id = drag(&mut session, [100.0, 100.0], [140.0, 120.0]).unwrap();
        let rect = session.find_element(&id).unwrap();
        assert_eq!(rect.position(), [0.0, 0.0]);
        assert_eq!(rect.kind, ElementKind::Rectangle { width: 20.0, height: 10.0 });
    }

    #[test]
    fn test_preview_follows_pointer() {
        let mut session = session_with(Tool::Rectangle);
        assert!(session.preview_element().is_none());

        session.pointer_down([0.0, 0.0], false);
        session.pointer_move([20.0, 10.0]);
        let preview = session.preview_element().unwrap();
        assert_eq!(preview.id, PREVIEW_ID);
        assert_eq!(preview.kind, ElementKind::Rectangle { width: 20.0, height: 10.0 });
        assert_eq!(session.element_count(), 0);

        session.pointer_up([20.0, 10.0]);
        assert!(session.preview_element().is_none());
    }

    #[test]
    fn test_select_and_drag_is_one_undo_step() {
        let mut session = session_with(Tool::Select);
        let id = session.add_element(ElementKind::Rectangle { width: 20.0, height: 20.0 }, 0.0, 0.0);

        session.pointer_down([10.0, 10.0], false);
        assert_eq!(session.selected_id(), Some(id.as_str()));
        session.pointer_move([15.0, 10.0]);
        session.pointer_move([40.0, 30.0]);
        assert_eq!(session.pointer_up([40.0, 30.0]), None);

        assert_eq!(session.find_element(&id).unwrap().position(), [30.0, 20.0]);
        assert!(session.undo());
        assert_eq!(session.find_element(&id).unwrap().position(), [0.0, 0.0]);
    }

    #[test]
    fn test_dragging_a_line_moves_both_ends() {
        let mut session = session_with(Tool::Select);
        let id = session.add_element(ElementKind::Line { end_x: 100.0, end_y: 0.0 }, 0.0, 0.0);

        drag(&mut session, [50.0, 0.0], [50.0, 25.0]);
        let line = session.find_element(&id).unwrap();
        assert_eq!(line.position(), [0.0, 25.0]);
        assert_eq!(line.kind, ElementKind::Line { end_x: 100.0, end_y: 25.0 });
    }

    #[test]
    fn test_select_on_empty_space_pans() {
        let mut session = session_with(Tool::Select);
        session.pointer_down([10.0, 10.0], false);
        session.pointer_move([30.0, 5.0]);
        session.pointer_up([30.0, 5.0]);

        assert_eq!(session.transform.offset, [20.0, -5.0]);
        assert_eq!(session.selected_id(), None);
        assert!(!session.can_undo());
    }

    #[test]
    fn test_pan_modifier_overrides_tool() {
        let mut session = session_with(Tool::Rectangle);
        session.pointer_down([0.0, 0.0], true);
        session.pointer_move([50.0, 50.0]);
        assert_eq!(session.pointer_up([50.0, 50.0]), None);

        assert_eq!(session.transform.offset, [50.0, 50.0]);
        assert_eq!(session.element_count(), 0);
    }

    #[test]
    fn test_typing_text() {
        let mut session = session_with(Tool::Text);
        assert!(!session.text_input("ignored"));

        session.pointer_down([10.0, 40.0], false);
        assert!(session.is_typing());
        assert!(session.text_input("Hem\nline"));
        assert!(session.backspace());
        assert_eq!(
            session.preview_element().unwrap().kind,
            ElementKind::Text { content: "Hemlin".into(), font_size: 16.0 }
        );

        let id = session.commit_text().unwrap();
        let text = session.find_element(&id).unwrap();
        assert_eq!(text.position(), [10.0, 40.0]);
        assert_eq!(text.kind, ElementKind::Text { content: "Hemlin".into(), font_size: 16.0 });
        assert!(!session.is_typing());
    }

    #[test]
    fn test_clicking_elsewhere_commits_text() {
        let mut session = session_with(Tool::Text);
        session.pointer_down([0.0, 20.0], false);
        session.text_input("A");
        session.pointer_down([0.0, 80.0], false);
        assert_eq!(session.element_count(), 1);

        // Empty text is discarded
        assert_eq!(session.commit_text(), None);
        assert_eq!(session.element_count(), 1);

        session.pointer_down([0.0, 120.0], false);
        session.text_input("B");
        session.cancel_text();
        assert_eq!(session.element_count(), 1);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut session = Session::new(Config::default());
        session.zoom([0.0, 0.0], 1000.0);
        assert_eq!(session.transform.scale, crate::canvas::MAX_SCALE);
        session.zoom([0.0, 0.0], 0.0001);
        assert_eq!(session.transform.scale, crate::canvas::MIN_SCALE);
    }
}
