use std::fmt::Write;

use super::{escape_xml, SVG_NS};
use crate::config::EncodeOptions;
use crate::drawing::{Element, ElementKind, Layer};
use crate::math::{self, Bounds};

/// Encodes `layers` with the default [`EncodeOptions`].
pub fn encode(layers: &[Layer], selected: Option<&str>) -> String {
    encode_with(&EncodeOptions::default(), layers, selected)
}

/// Produces a standalone SVG document for `layers`.
///
/// Hidden layers are still written (marked `layer-hidden`) so that hiding a
/// layer and saving never drops its contents. The element whose id equals
/// `selected` gets the `selected` class; nothing else about the output depends
/// on the selection.
pub fn encode_with(opts: &EncodeOptions, layers: &[Layer], selected: Option<&str>) -> String {
    let [vx, vy, vw, vh] = viewport(opts, layers);

    let mut out = String::new();
    let _ = writeln!(
        out,
        r#"<svg xmlns="{}" width="{}" height="{}" viewBox="{} {} {} {}">"#,
        SVG_NS, vw, vh, vx, vy, vw, vh
    );
    write_style(&mut out, opts);

    for layer in layers {
        let class = if layer.visible { "layer" } else { "layer layer-hidden" };
        let _ = writeln!(
            out,
            r#"<g class="{}" data-layer-id="{}" data-layer-name="{}" data-layer-visible="{}">"#,
            class,
            escape_xml(&layer.id),
            escape_xml(&layer.name),
            layer.visible
        );
        for element in &layer.elements {
            let is_selected = selected.is_some_and(|id| id == element.id);
            write_element(&mut out, opts, element, is_selected);
        }
        let _ = writeln!(out, "</g>");
    }

    let _ = writeln!(out, "</svg>");
    out
}

/// `[x, y, width, height]` of the document's view box: the drawing's extent
/// plus margin, always containing the origin, never smaller than the minimum
/// canvas size.
fn viewport(opts: &EncodeOptions, layers: &[Layer]) -> [f64; 4] {
    let extent = layers
        .iter()
        .flat_map(|layer| &layer.elements)
        .map(Element::bounds)
        .reduce(Bounds::union);

    let Some(extent) = extent else {
        return [0.0, 0.0, opts.min_width, opts.min_height];
    };

    let x = (extent.min[0] - opts.margin).min(0.0);
    let y = (extent.min[1] - opts.margin).min(0.0);
    let width = (extent.max[0] + opts.margin - x).max(opts.min_width);
    let height = (extent.max[1] + opts.margin - y).max(opts.min_height);
    [x, y, width, height]
}

fn write_style(out: &mut String, opts: &EncodeOptions) {
    let selection = escape_xml(&opts.selection_color);
    let hover = escape_xml(&opts.hover_color);
    let _ = writeln!(out, "<style>");
    let _ = writeln!(out, ".element {{ cursor: pointer; }}");
    let _ = writeln!(out, ".element:hover {{ stroke: {}; opacity: 0.8; }}", hover);
    let _ = writeln!(
        out,
        ".element.selected {{ stroke: {}; stroke-dasharray: 5,5; filter: drop-shadow(0 0 3px {}); }}",
        selection, selection
    );
    let _ = writeln!(out, ".layer-hidden {{ display: none; }}");
    let _ = writeln!(out, "</style>");
}

fn write_element(out: &mut String, opts: &EncodeOptions, element: &Element, selected: bool) {
    let id = escape_xml(&element.id);
    let color = escape_xml(&element.color);
    let class = if selected { "element selected" } else { "element" };
    let common = format!(r#"data-element-id="{}" class="{}""#, id, class);
    let stroke = format!(
        r#"stroke="{}" stroke-width="{}" fill="none""#,
        color, element.stroke_width
    );
    let (x, y) = (element.x, element.y);

    match &element.kind {
        ElementKind::Line { end_x, end_y } => {
            let _ = writeln!(
                out,
                r#"<line {} x1="{}" y1="{}" x2="{}" y2="{}" {}/>"#,
                common, x, y, end_x, end_y, stroke
            );
        }
        ElementKind::Arrow { end_x, end_y } => {
            let _ = writeln!(
                out,
                r#"<line {} data-element-type="arrow" x1="{}" y1="{}" x2="{}" y2="{}" {}/>"#,
                common, x, y, end_x, end_y, stroke
            );
            let heads = math::arrowhead_points(
                [x, y],
                [*end_x, *end_y],
                opts.arrowhead_length,
                opts.arrowhead_angle_deg.to_radians(),
            );
            for head in heads {
                let _ = writeln!(
                    out,
                    r#"<line data-arrowhead="{}" class="arrowhead" x1="{}" y1="{}" x2="{}" y2="{}" {}/>"#,
                    id, end_x, end_y, head[0], head[1], stroke
                );
            }
        }
        ElementKind::Text { content, font_size } => {
            let _ = writeln!(
                out,
                r#"<text {} x="{}" y="{}" font-size="{}" fill="{}" stroke-width="{}">{}</text>"#,
                common,
                x,
                y,
                font_size,
                color,
                element.stroke_width,
                escape_xml(content)
            );
        }
        ElementKind::Rectangle { width, height } => {
            let _ = writeln!(
                out,
                r#"<rect {} x="{}" y="{}" width="{}" height="{}" {}/>"#,
                common, x, y, width, height, stroke
            );
        }
        ElementKind::Circle { width, height } => {
            let _ = writeln!(
                out,
                r#"<circle {} cx="{}" cy="{}" r="{}" {}/>"#,
                common,
                x + width / 2.0,
                y + height / 2.0,
                width.min(*height) / 2.0,
                stroke
            );
        }
        ElementKind::Path { path_data } => {
            let transform = if x != 0.0 || y != 0.0 {
                format!(r#" transform="translate({} {})""#, x, y)
            } else {
                String::new()
            };
            let _ = writeln!(
                out,
                r#"<path {} d="{}"{} {}/>"#,
                common,
                escape_xml(path_data),
                transform,
                stroke
            );
        }
        ElementKind::Image { width, height, image_url } => {
            if image_url.is_empty() {
                log::debug!("Skipping image {} without a URL", element.id);
                return;
            }
            let _ = writeln!(
                out,
                r#"<image {} x="{}" y="{}" width="{}" height="{}" href="{}" stroke="{}" stroke-width="{}"/>"#,
                common,
                x,
                y,
                width,
                height,
                escape_xml(image_url),
                color,
                element.stroke_width
            );
        }
    }
}
