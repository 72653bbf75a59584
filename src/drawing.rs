use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::math::{self, Bounds};
use crate::svg::number;

pub const DEFAULT_LAYER_ID: &str = "default";
pub const DEFAULT_LAYER_NAME: &str = "Default Layer";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Tool {
    Select,
    Line,
    Arrow,
    Rectangle,
    Circle,
    Text,
}

/// A named group of drawables, painted in `elements` order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer {
    pub id: String,
    pub name: String,
    pub visible: bool,
    pub elements: Vec<Element>,
}

impl Layer {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            visible: true,
            elements: Vec::new(),
        }
    }

    /// The layer every document falls back to when it declares none.
    pub fn default_layer() -> Self {
        Self::new(DEFAULT_LAYER_ID, DEFAULT_LAYER_NAME)
    }

    /// Appends `element`, rewriting its back-reference to this layer.
    pub fn push(&mut self, mut element: Element) {
        element.layer_id = self.id.clone();
        self.elements.push(element);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub color: String,
    pub stroke_width: f64,
    pub layer_id: String,
    #[serde(flatten)]
    pub kind: ElementKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ElementKind {
    Path {
        path_data: String,
    },
    Line {
        end_x: f64,
        end_y: f64,
    },
    Text {
        content: String,
        font_size: f64,
    },
    Image {
        width: f64,
        height: f64,
        image_url: String,
    },
    Rectangle {
        width: f64,
        height: f64,
    },
    Circle {
        width: f64,
        height: f64,
    },
    Arrow {
        end_x: f64,
        end_y: f64,
    },
}

impl ElementKind {
    pub fn name(&self) -> &'static str {
        match self {
            ElementKind::Path { .. } => "path",
            ElementKind::Line { .. } => "line",
            ElementKind::Text { .. } => "text",
            ElementKind::Image { .. } => "image",
            ElementKind::Rectangle { .. } => "rectangle",
            ElementKind::Circle { .. } => "circle",
            ElementKind::Arrow { .. } => "arrow",
        }
    }
}

impl Element {
    pub fn new(id: impl Into<String>, x: f64, y: f64, kind: ElementKind) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            color: "#000000".to_string(),
            stroke_width: 1.0,
            layer_id: String::new(),
            kind,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_stroke_width(mut self, stroke_width: f64) -> Self {
        self.stroke_width = stroke_width.max(0.0);
        self
    }

    pub fn position(&self) -> [f64; 2] {
        [self.x, self.y]
    }

    /// Extent used for the export viewport and for hit testing.
    pub fn bounds(&self) -> Bounds {
        match &self.kind {
            ElementKind::Line { end_x, end_y } | ElementKind::Arrow { end_x, end_y } => {
                Bounds::from_corners([self.x, self.y], [*end_x, *end_y])
            }
            ElementKind::Rectangle { width, height }
            | ElementKind::Circle { width, height }
            | ElementKind::Image { width, height, .. } => {
                Bounds::from_corners([self.x, self.y], [self.x + width, self.y + height])
            }
            // Text is anchored on its baseline
            ElementKind::Text { font_size, .. } => {
                Bounds::from_corners([self.x, self.y - font_size], [self.x, self.y])
            }
            // Path data is drawn translated by the anchor
            ElementKind::Path { path_data } => match number::path_points(path_data) {
                Some(points) => points
                    .iter()
                    .map(|p| Bounds::from_point([p[0] + self.x, p[1] + self.y]))
                    .fold(Bounds::from_point([self.x, self.y]), Bounds::union),
                None => Bounds::from_point([self.x, self.y]),
            },
        }
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
        if let ElementKind::Line { end_x, end_y } | ElementKind::Arrow { end_x, end_y } =
            &mut self.kind
        {
            *end_x += dx;
            *end_y += dy;
        }
    }

    pub fn hit_test(&self, pos: [f64; 2]) -> bool {
        let tolerance = (self.stroke_width * 2.0).max(4.0);
        match &self.kind {
            ElementKind::Line { end_x, end_y } | ElementKind::Arrow { end_x, end_y } => {
                math::point_to_line_distance(pos, [self.x, self.y], [*end_x, *end_y]) <= tolerance
            }
            ElementKind::Circle { width, height } => {
                let center = [self.x + width / 2.0, self.y + height / 2.0];
                math::distance(pos, center) <= width.min(*height) / 2.0 + tolerance / 2.0
            }
            ElementKind::Rectangle { .. } | ElementKind::Image { .. } => {
                self.bounds().contains(pos, tolerance / 2.0)
            }
            ElementKind::Text { content, font_size } => {
                let char_width = font_size * 0.6;
                let text_width = content.chars().count() as f64 * char_width;
                let text_height = font_size * 1.2;

                pos[0] >= self.x - 5.0
                    && pos[0] <= self.x + text_width + 5.0
                    && pos[1] >= self.y - text_height
                    && pos[1] <= self.y + 5.0
            }
            ElementKind::Path { .. } => self.bounds().contains(pos, tolerance),
        }
    }
}

pub fn new_layer_id() -> String {
    format!("layer-{}", Uuid::new_v4())
}

pub fn new_element_id() -> String {
    format!("element-{}", Uuid::new_v4())
}

/// Total element count across `layers`.
pub fn element_count(layers: &[Layer]) -> usize {
    layers.iter().map(|l| l.elements.len()).sum()
}
