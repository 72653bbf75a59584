use std::collections::HashSet;

use roxmltree::Node;

use super::number::{self, parse_number};
use super::XLINK_NS;
use crate::drawing::{new_element_id, new_layer_id, Element, ElementKind, Layer};

const DEFAULT_COLOR: &str = "#000000";
const DEFAULT_STROKE_WIDTH: f64 = 1.0;
const DEFAULT_FONT_SIZE: f64 = 16.0;
const DEFAULT_IMAGE_SIZE: f64 = 100.0;

/// Drawable SVG tags the layer model understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Drawable {
    Rect,
    Circle,
    Ellipse,
    Line,
    Path,
    Text,
    Image,
}

/// What the walker does with an element node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Group,
    Drawable(Drawable),
    /// Never rendered directly; its subtree is not searched
    Resource,
    /// Anything else: no element of its own, children are still visited
    Other,
}

impl Tag {
    fn of(node: Node) -> Tag {
        match node.tag_name().name() {
            "g" => Tag::Group,
            "rect" => Tag::Drawable(Drawable::Rect),
            "circle" => Tag::Drawable(Drawable::Circle),
            "ellipse" => Tag::Drawable(Drawable::Ellipse),
            "line" => Tag::Drawable(Drawable::Line),
            "path" => Tag::Drawable(Drawable::Path),
            "text" => Tag::Drawable(Drawable::Text),
            "image" => Tag::Drawable(Drawable::Image),
            "defs" | "style" | "script" | "title" | "desc" | "metadata" | "clipPath" | "mask"
            | "marker" | "pattern" | "symbol" | "linearGradient" | "radialGradient" | "filter" => {
                Tag::Resource
            }
            _ => Tag::Other,
        }
    }
}

/// Deepest tag nesting accepted. Deeper documents fall back to the default
/// layer before they reach the parser.
const MAX_DEPTH: usize = 256;

/// Parses SVG markup into layers. Never fails: malformed input, input nested
/// deeper than `MAX_DEPTH`, or input without any layer group produces one empty
/// default layer.
///
/// Every top-level `<g>` becomes a layer. Groups nested inside a layer do not
/// start layers of their own; their drawables join the enclosing layer.
/// Drawables outside every group are ignored. Layer and element ids are unique
/// in the result: a repeated id is replaced with a generated one.
pub fn decode(svg: &str) -> Vec<Layer> {
    if exceeds_depth(svg, MAX_DEPTH) {
        log::warn!("SVG nests deeper than {} levels, using an empty default layer", MAX_DEPTH);
        return vec![Layer::default_layer()];
    }

    let doc = match roxmltree::Document::parse(svg) {
        Ok(doc) => doc,
        Err(e) => {
            log::warn!("Could not parse SVG ({}), using an empty default layer", e);
            return vec![Layer::default_layer()];
        }
    };

    let mut layers = Walker::default().walk(doc.root_element());

    if layers.is_empty() {
        log::debug!("SVG declares no layer groups, using an empty default layer");
        layers.push(Layer::default_layer());
    }
    layers
}

/// Upper bound on how deeply tags in `svg` nest, checked without parsing.
/// Markup inside comments or CDATA may be counted too, which only makes the
/// check stricter.
fn exceeds_depth(svg: &str, limit: usize) -> bool {
    let bytes = svg.as_bytes();
    let mut depth = 0usize;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'<' => match bytes.get(i + 1) {
                Some(b'/') => depth = depth.saturating_sub(1),
                Some(b'!' | b'?') | None => {}
                Some(_) => {
                    depth += 1;
                    if depth > limit {
                        return true;
                    }
                }
            },
            b'/' if bytes.get(i + 1) == Some(&b'>') => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    false
}

/// Depth-first walk over the element tree, collecting layers and keeping ids
/// unique.
#[derive(Default)]
struct Walker {
    layers: Vec<Layer>,
    layer_ids: HashSet<String>,
    element_ids: HashSet<String>,
}

impl Walker {
    fn walk(mut self, root: Node) -> Vec<Layer> {
        // Children are pushed in reverse so they pop in document order
        let mut stack = vec![(root, None)];
        while let Some((node, current)) = stack.pop() {
            let children_layer = match Tag::of(node) {
                Tag::Group => Some(match current {
                    Some(index) => index,
                    None => self.start_layer(node),
                }),
                Tag::Drawable(drawable) => {
                    match current {
                        Some(index) => self.add_element(node, drawable, index),
                        None => {
                            log::debug!("Skipping <{}> outside of any layer", node.tag_name().name())
                        }
                    }
                    continue;
                }
                Tag::Resource => continue,
                Tag::Other => current,
            };

            let children: Vec<_> = node.children().filter(|n| n.is_element()).collect();
            stack.extend(children.into_iter().rev().map(|child| (child, children_layer)));
        }
        self.layers
    }

    fn start_layer(&mut self, node: Node) -> usize {
        let mut layer = layer_from_group(node, self.layers.len());
        if !self.layer_ids.insert(layer.id.clone()) {
            let fresh = new_layer_id();
            log::debug!("Duplicate layer id {:?}, using {}", layer.id, fresh);
            layer.id = fresh.clone();
            self.layer_ids.insert(fresh);
        }
        self.layers.push(layer);
        self.layers.len() - 1
    }

    fn add_element(&mut self, node: Node, drawable: Drawable, layer_index: usize) {
        let Some(mut element) = element_from_node(node, drawable) else {
            return;
        };
        if !self.element_ids.insert(element.id.clone()) {
            let fresh = new_element_id();
            log::debug!("Duplicate element id {:?}, using {}", element.id, fresh);
            element.id = fresh.clone();
            self.element_ids.insert(fresh);
        }
        self.layers[layer_index].push(element);
    }
}

fn layer_from_group(node: Node, ordinal: usize) -> Layer {
    let id = non_empty_attr(node, "data-layer-id")
        .map(str::to_string)
        .unwrap_or_else(new_layer_id);
    let name = node
        .attribute("data-layer-name")
        .map(str::to_string)
        .unwrap_or_else(|| format!("Layer {}", ordinal + 1));

    let hidden = node.attribute("data-layer-visible") == Some("false")
        || presentation(node, "display") == Some("none")
        || has_class(node, "layer-hidden");

    let mut layer = Layer::new(id, name);
    layer.visible = !hidden;
    layer
}

fn element_from_node(node: Node, drawable: Drawable) -> Option<Element> {
    let num = |name: &str, default: f64| node.attribute(name).and_then(parse_number).unwrap_or(default);

    let (x, y, kind) = match drawable {
        Drawable::Rect => (
            num("x", 0.0),
            num("y", 0.0),
            ElementKind::Rectangle {
                width: num("width", 0.0),
                height: num("height", 0.0),
            },
        ),
        Drawable::Circle => {
            let r = num("r", 0.0);
            (
                num("cx", 0.0) - r,
                num("cy", 0.0) - r,
                ElementKind::Circle {
                    width: r * 2.0,
                    height: r * 2.0,
                },
            )
        }
        Drawable::Ellipse => {
            let (rx, ry) = (num("rx", 0.0), num("ry", 0.0));
            (
                num("cx", 0.0) - rx,
                num("cy", 0.0) - ry,
                ElementKind::Circle {
                    width: rx * 2.0,
                    height: ry * 2.0,
                },
            )
        }
        Drawable::Line => {
            // Arrowhead strokes are regenerated from the arrow on every encode
            if node.has_attribute("data-arrowhead") {
                return None;
            }
            let end_x = num("x2", 0.0);
            let end_y = num("y2", 0.0);
            let kind = if node.attribute("data-element-type") == Some("arrow") {
                ElementKind::Arrow { end_x, end_y }
            } else {
                ElementKind::Line { end_x, end_y }
            };
            (num("x1", 0.0), num("y1", 0.0), kind)
        }
        Drawable::Path => {
            let [x, y] = node
                .attribute("transform")
                .and_then(number::parse_translate)
                .unwrap_or([0.0, 0.0]);
            let path_data = node.attribute("d").unwrap_or_default().to_string();
            (x, y, ElementKind::Path { path_data })
        }
        Drawable::Text => {
            let content: String = node
                .descendants()
                .filter(|n| n.is_text())
                .filter_map(|n| n.text())
                .collect();
            (
                num("x", 0.0),
                num("y", 0.0),
                ElementKind::Text {
                    content,
                    font_size: presentation(node, "font-size")
                        .and_then(parse_number)
                        .unwrap_or(DEFAULT_FONT_SIZE),
                },
            )
        }
        Drawable::Image => {
            let image_url = node
                .attribute("href")
                .or_else(|| node.attribute((XLINK_NS, "href")))
                .unwrap_or_default()
                .to_string();
            (
                num("x", 0.0),
                num("y", 0.0),
                ElementKind::Image {
                    width: num("width", DEFAULT_IMAGE_SIZE),
                    height: num("height", DEFAULT_IMAGE_SIZE),
                    image_url,
                },
            )
        }
    };

    let id = non_empty_attr(node, "data-element-id")
        .or_else(|| non_empty_attr(node, "id"))
        .map(str::to_string)
        .unwrap_or_else(new_element_id);

    // Text is painted with its fill, everything else with its stroke
    let paint_order: [&str; 2] = if drawable == Drawable::Text {
        ["fill", "stroke"]
    } else {
        ["stroke", "fill"]
    };
    let color = paint_order
        .iter()
        .filter_map(|name| presentation(node, name))
        .find(|value| !value.is_empty() && *value != "none")
        .unwrap_or(DEFAULT_COLOR);

    let stroke_width = presentation(node, "stroke-width")
        .and_then(parse_number)
        .unwrap_or(DEFAULT_STROKE_WIDTH);

    Some(
        Element::new(id, x, y, kind)
            .with_color(color)
            .with_stroke_width(stroke_width),
    )
}

fn non_empty_attr<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.attribute(name).filter(|v| !v.trim().is_empty())
}

/// Looks up a presentation property, letting an inline `style` declaration
/// override the attribute of the same name.
fn presentation<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    let from_style = node.attribute("style").and_then(|style| {
        style.split(';').rev().find_map(|decl| {
            let (key, value) = decl.split_once(':')?;
            (key.trim() == name).then(|| value.trim())
        })
    });
    from_style.or_else(|| node.attribute(name).map(str::trim))
}

fn has_class(node: Node, class: &str) -> bool {
    node.attribute("class")
        .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
}
