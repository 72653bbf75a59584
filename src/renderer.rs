use std::borrow::Cow;

use anyhow::Context;

use crate::drawing::Layer;
use crate::event_handler::PREVIEW_ID;
use crate::session::Session;
use crate::svg;

impl Session {
    /// SVG for display: the selection is highlighted and any in-progress shape
    /// or text is drawn in a temporary layer on top of everything, visible even
    /// when the active layer is hidden.
    pub fn render(&self) -> String {
        let layers = match self.preview_element() {
            Some(preview) => {
                let mut overlay = Layer::new(PREVIEW_ID, "Preview");
                overlay.push(preview);
                let mut layers = self.layers.clone();
                layers.push(overlay);
                Cow::Owned(layers)
            }
            None => Cow::Borrowed(self.layers.as_slice()),
        };
        svg::encode_with(&self.config.encode, &layers, self.selected.as_deref())
    }

    /// SVG for persistence. Carries no selection styling or preview.
    pub fn to_svg(&self) -> String {
        svg::encode_with(&self.config.encode, &self.layers, None)
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        serde_json::to_string_pretty::<[Layer]>(&self.layers).context("failed to serialize layers")
    }
}
