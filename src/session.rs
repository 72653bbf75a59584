use std::collections::HashSet;

use anyhow::{bail, Context};

use crate::canvas::CanvasTransform;
use crate::config::Config;
use crate::drawing::{self, Element, ElementKind, Layer, Tool};
use crate::state::{InputState, Snapshot, TextInput};
use crate::svg;

const MAX_HISTORY: usize = 100;

/// One editor's working copy of a drawing.
///
/// The session always holds at least one layer, and `active_layer` always names
/// one of them. Persisting is done by encoding back to SVG (see `to_svg`).
pub struct Session {
    pub(crate) config: Config,
    pub(crate) layers: Vec<Layer>,
    pub(crate) active_layer: String,
    pub(crate) selected: Option<String>,
    pub(crate) undo_stack: Vec<Snapshot>,
    pub(crate) redo_stack: Vec<Snapshot>,

    pub transform: CanvasTransform,
    pub current_tool: Tool,
    pub current_color: String,
    pub stroke_width: f64,

    pub(crate) input: InputState,
    pub(crate) typing: TextInput,
}

impl Session {
    pub fn new(config: Config) -> Session {
        Self::from_layers(vec![Layer::default_layer()], config)
    }

    pub fn from_svg(svg_text: &str, config: Config) -> Session {
        Self::from_layers(svg::decode(svg_text), config)
    }

    /// Loads layers from the JSON form produced by [`Session::to_json`].
    pub fn from_json(json: &str, config: Config) -> anyhow::Result<Session> {
        let layers: Vec<Layer> = serde_json::from_str(json).context("invalid layer JSON")?;
        validate(&layers)?;
        Ok(Self::from_layers(layers, config))
    }

    /// Builds a session around `layers`, repairing the document invariants: an
    /// empty list gets the default layer and every element's `layer_id` is
    /// pointed at the layer that holds it.
    pub fn from_layers(mut layers: Vec<Layer>, config: Config) -> Session {
        if layers.is_empty() {
            layers.push(Layer::default_layer());
        }
        for layer in &mut layers {
            for element in &mut layer.elements {
                element.layer_id.clone_from(&layer.id);
            }
        }
        let active_layer = layers[0].id.clone();

        Session {
            current_color: config.default_color.clone(),
            stroke_width: config.default_stroke_width,
            config,
            layers,
            active_layer,
            selected: None,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            transform: CanvasTransform::new(),
            current_tool: Tool::Select,
            input: InputState::default(),
            typing: TextInput::default(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn active_layer_id(&self) -> &str {
        &self.active_layer
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn element_count(&self) -> usize {
        drawing::element_count(&self.layers)
    }

    pub fn find_element(&self, id: &str) -> Option<&Element> {
        self.layers
            .iter()
            .flat_map(|l| &l.elements)
            .find(|e| e.id == id)
    }

    pub(crate) fn element_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.layers
            .iter_mut()
            .flat_map(|l| &mut l.elements)
            .find(|e| e.id == id)
    }

    fn layer_index(&self, id: &str) -> anyhow::Result<usize> {
        self.layers
            .iter()
            .position(|l| l.id == id)
            .with_context(|| format!("no layer with id {:?}", id))
    }

    // History

    pub(crate) fn save_state(&mut self) {
        self.undo_stack.push(self.snapshot());
        if self.undo_stack.len() > MAX_HISTORY {
            self.undo_stack.remove(0);
        }
        self.redo_stack.clear();
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            layers: self.layers.clone(),
            active_layer: self.active_layer.clone(),
            selected: self.selected.clone(),
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.layers = snapshot.layers;
        self.active_layer = snapshot.active_layer;
        self.selected = snapshot.selected;
    }

    pub fn undo(&mut self) -> bool {
        match self.undo_stack.pop() {
            Some(prev) => {
                let current = self.snapshot();
                self.redo_stack.push(current);
                self.restore(prev);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.redo_stack.pop() {
            Some(next) => {
                let current = self.snapshot();
                self.undo_stack.push(current);
                self.restore(next);
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    // Layers

    /// Appends a new layer and makes it the active one.
    pub fn add_layer(&mut self, name: &str) -> String {
        self.save_state();
        let id = drawing::new_layer_id();
        self.layers.push(Layer::new(id.clone(), name));
        self.active_layer.clone_from(&id);
        log::debug!("Added layer {} ({})", id, name);
        id
    }

    pub fn remove_layer(&mut self, id: &str) -> anyhow::Result<()> {
        let index = self.layer_index(id)?;
        if self.layers.len() == 1 {
            bail!("cannot remove the last layer");
        }

        self.save_state();
        let removed = self.layers.remove(index);
        if self
            .selected
            .as_ref()
            .is_some_and(|sel| removed.elements.iter().any(|e| &e.id == sel))
        {
            self.selected = None;
        }
        if self.active_layer == removed.id {
            let next = index.min(self.layers.len() - 1);
            self.active_layer.clone_from(&self.layers[next].id);
        }
        Ok(())
    }

    pub fn set_active_layer(&mut self, id: &str) -> anyhow::Result<()> {
        self.layer_index(id)?;
        self.active_layer = id.to_string();
        Ok(())
    }

    pub fn set_layer_visible(&mut self, id: &str, visible: bool) -> anyhow::Result<()> {
        let index = self.layer_index(id)?;
        if self.layers[index].visible == visible {
            return Ok(());
        }

        self.save_state();
        let layer = &mut self.layers[index];
        layer.visible = visible;
        // A hidden element can't stay selected
        if !visible
            && self
                .selected
                .as_ref()
                .is_some_and(|sel| layer.elements.iter().any(|e| &e.id == sel))
        {
            self.selected = None;
        }
        Ok(())
    }

    /// Flips a layer's visibility and returns the new value.
    pub fn toggle_layer_visibility(&mut self, id: &str) -> anyhow::Result<bool> {
        let visible = !self.layers[self.layer_index(id)?].visible;
        self.set_layer_visible(id, visible)?;
        Ok(visible)
    }

    pub fn rename_layer(&mut self, id: &str, name: &str) -> anyhow::Result<()> {
        let index = self.layer_index(id)?;
        self.save_state();
        self.layers[index].name = name.to_string();
        Ok(())
    }

    // Elements

    /// Adds an element of `kind` at `(x, y)` to the active layer, styled with the
    /// session's current colour and stroke width. Returns its new id.
    pub fn add_element(&mut self, kind: ElementKind, x: f64, y: f64) -> String {
        let element = Element::new(drawing::new_element_id(), x, y, kind)
            .with_color(self.current_color.clone())
            .with_stroke_width(self.stroke_width);
        self.push_element(element)
    }

    pub(crate) fn push_element(&mut self, element: Element) -> String {
        self.save_state();
        let id = element.id.clone();
        let index = self
            .layers
            .iter()
            .position(|l| l.id == self.active_layer)
            .unwrap_or(0);
        self.layers[index].push(element);
        log::debug!("Added element {} to layer {}", id, self.layers[index].id);
        id
    }

    pub fn remove_element(&mut self, id: &str) -> anyhow::Result<()> {
        let Some((li, ei)) = self.layers.iter().enumerate().find_map(|(li, layer)| {
            layer.elements.iter().position(|e| e.id == id).map(|ei| (li, ei))
        }) else {
            bail!("no element with id {:?}", id);
        };

        self.save_state();
        self.layers[li].elements.remove(ei);
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        }
        Ok(())
    }

    pub fn move_element_by(&mut self, id: &str, dx: f64, dy: f64) -> anyhow::Result<()> {
        if self.find_element(id).is_none() {
            bail!("no element with id {:?}", id);
        }
        self.save_state();
        if let Some(element) = self.element_mut(id) {
            element.translate(dx, dy);
        }
        Ok(())
    }

    pub fn set_element_color(&mut self, id: &str, color: &str) -> anyhow::Result<()> {
        if self.find_element(id).is_none() {
            bail!("no element with id {:?}", id);
        }
        self.save_state();
        if let Some(element) = self.element_mut(id) {
            element.color = color.to_string();
        }
        Ok(())
    }

    // Selection

    pub fn select(&mut self, id: Option<&str>) -> anyhow::Result<()> {
        match id {
            Some(id) if self.find_element(id).is_none() => bail!("no element with id {:?}", id),
            _ => {
                self.selected = id.map(str::to_string);
                Ok(())
            }
        }
    }

    /// Id of the front-most element under `pos` (canvas space) in a visible
    /// layer. Later layers paint over earlier ones, later elements over earlier
    /// elements.
    pub fn element_at(&self, pos: [f64; 2]) -> Option<&Element> {
        self.layers
            .iter()
            .rev()
            .filter(|l| l.visible)
            .flat_map(|l| l.elements.iter().rev())
            .find(|e| e.hit_test(pos))
    }

    /// Selects the front-most element under `pos`, or clears the selection.
    pub fn select_at(&mut self, pos: [f64; 2]) -> Option<String> {
        self.selected = self.element_at(pos).map(|e| e.id.clone());
        self.selected.clone()
    }
}

/// Rejects models whose ids collide or whose styles are out of range.
fn validate(layers: &[Layer]) -> anyhow::Result<()> {
    let mut layer_ids = HashSet::new();
    let mut element_ids = HashSet::new();
    for layer in layers {
        if !layer_ids.insert(layer.id.as_str()) {
            bail!("duplicate layer id {:?}", layer.id);
        }
        for element in &layer.elements {
            if !element_ids.insert(element.id.as_str()) {
                bail!("duplicate element id {:?}", element.id);
            }
            if element.stroke_width < 0.0 {
                bail!("element {:?} has a negative stroke width", element.id);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drawing::DEFAULT_LAYER_ID;

    fn rect(session: &mut Session, x: f64, y: f64) -> String {
        session.add_element(ElementKind::Rectangle { width: 20.0, height: 20.0 }, x, y)
    }

    #[test]
    fn test_new_session_has_default_layer() {
        let session = Session::new(Config::default());
        assert_eq!(session.layers().len(), 1);
        assert_eq!(session.active_layer_id(), DEFAULT_LAYER_ID);
        assert_eq!(session.element_count(), 0);
    }

    #[test]
    fn test_add_element_uses_session_style() {
        let mut session = Session::new(Config::default());
        session.current_color = "#ff0000".into();
        let id = rect(&mut session, 5.0, 5.0);

        let element = session.find_element(&id).unwrap();
        assert_eq!(element.color, "#ff0000");
        assert_eq!(element.stroke_width, 2.0);
        assert_eq!(element.layer_id, DEFAULT_LAYER_ID);
    }

    #[test]
    fn test_layers_and_active_layer() {
        let mut session = Session::new(Config::default());
        let details = session.add_layer("Details");
        assert_eq!(session.active_layer_id(), details);

        let id = rect(&mut session, 0.0, 0.0);
        assert_eq!(session.find_element(&id).unwrap().layer_id, details);

        session.set_active_layer(DEFAULT_LAYER_ID).unwrap();
        assert!(session.set_active_layer("missing").is_err());

        session.select(Some(&id)).unwrap();
        session.remove_layer(&details).unwrap();
        assert_eq!(session.layers().len(), 1);
        assert_eq!(session.selected_id(), None);
        assert!(session.remove_layer(DEFAULT_LAYER_ID).is_err());
    }

    #[test]
    fn test_removing_active_layer_moves_active() {
        let mut session = Session::new(Config::default());
        let a = session.add_layer("A");
        let b = session.add_layer("B");
        session.set_active_layer(&a).unwrap();
        session.remove_layer(&a).unwrap();
        assert_eq!(session.active_layer_id(), b);
    }

    #[test]
    fn test_visibility_toggle_and_hit_testing() {
        let mut session = Session::new(Config::default());
        let id = rect(&mut session, 0.0, 0.0);

        assert_eq!(session.select_at([10.0, 10.0]), Some(id.clone()));
        assert!(!session.toggle_layer_visibility(DEFAULT_LAYER_ID).unwrap());
        assert_eq!(session.selected_id(), None);
        assert_eq!(session.select_at([10.0, 10.0]), None);

        // Hidden elements are still part of the document
        assert_eq!(session.element_count(), 1);
        assert!(session.toggle_layer_visibility(DEFAULT_LAYER_ID).unwrap());
    }

    #[test]
    fn test_front_most_element_wins() {
        let mut session = Session::new(Config::default());
        let _back = rect(&mut session, 0.0, 0.0);
        let front = rect(&mut session, 10.0, 10.0);
        assert_eq!(session.select_at([15.0, 15.0]), Some(front));
    }

    #[test]
    fn test_move_remove_and_recolor() {
        let mut session = Session::new(Config::default());
        let id = session.add_element(ElementKind::Line { end_x: 10.0, end_y: 0.0 }, 0.0, 0.0);

        session.move_element_by(&id, 5.0, 5.0).unwrap();
        let line = session.find_element(&id).unwrap();
        assert_eq!(line.position(), [5.0, 5.0]);
        assert_eq!(line.kind, ElementKind::Line { end_x: 15.0, end_y: 5.0 });

        session.set_element_color(&id, "#00ff00").unwrap();
        assert_eq!(session.find_element(&id).unwrap().color, "#00ff00");

        session.select(Some(&id)).unwrap();
        session.remove_element(&id).unwrap();
        assert_eq!(session.selected_id(), None);
        assert!(session.remove_element(&id).is_err());
        assert!(session.move_element_by(&id, 1.0, 1.0).is_err());
        assert!(session.select(Some(&id)).is_err());
    }

    #[test]
    fn test_undo_redo() {
        let mut session = Session::new(Config::default());
        assert!(!session.undo());

        let id = rect(&mut session, 0.0, 0.0);
        session.move_element_by(&id, 10.0, 0.0).unwrap();

        assert!(session.undo());
        assert_eq!(session.find_element(&id).unwrap().x, 0.0);
        assert!(session.undo());
        assert!(session.find_element(&id).is_none());
        assert!(!session.can_undo());

        assert!(session.redo());
        assert!(session.redo());
        assert_eq!(session.find_element(&id).unwrap().x, 10.0);
        assert!(!session.redo());

        session.undo();
        rect(&mut session, 50.0, 50.0);
        assert!(!session.can_redo());
    }

    #[test]
    fn test_history_is_bounded() {
        let mut session = Session::new(Config::default());
        for i in 0..(MAX_HISTORY + 20) {
            rect(&mut session, i as f64, 0.0);
        }
        let mut undone = 0;
        while session.undo() {
            undone += 1;
        }
        assert_eq!(undone, MAX_HISTORY);
        assert_eq!(session.element_count(), 20);
    }

    #[test]
    fn test_svg_with_repeated_ids_reloads_from_json() {
        let svg = r#"<svg>
            <g data-layer-id="a"><rect data-element-id="e" width="1" height="1"/></g>
            <g data-layer-id="a"><rect data-element-id="e" width="2" height="2"/></g>
        </svg>"#;
        let session = Session::from_svg(svg, Config::default());
        assert_eq!(session.layers().len(), 2);
        assert_ne!(session.layers()[0].id, session.layers()[1].id);

        let reloaded = Session::from_json(&session.to_json().unwrap(), Config::default()).unwrap();
        assert_eq!(reloaded.layers(), session.layers());
        assert_eq!(reloaded.element_count(), 2);
    }

    #[test]
    fn test_from_json_validates_and_repairs() {
        let json = r##"[{"id":"L1","name":"Outline","visible":true,"elements":[
            {"id":"r1","type":"rectangle","x":0,"y":0,"color":"#000000","strokeWidth":1,
             "layerId":"somewhere-else","width":5,"height":5}]}]"##;
        let session = Session::from_json(json, Config::default()).unwrap();
        assert_eq!(session.find_element("r1").unwrap().layer_id, "L1");

        let empty = Session::from_json("[]", Config::default()).unwrap();
        assert_eq!(empty.layers()[0].id, DEFAULT_LAYER_ID);

        let duplicate = r#"[{"id":"L1","name":"a","visible":true,"elements":[]},
                            {"id":"L1","name":"b","visible":true,"elements":[]}]"#;
        assert!(Session::from_json(duplicate, Config::default()).is_err());
        assert!(Session::from_json("{", Config::default()).is_err());
    }
}
