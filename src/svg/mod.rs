//! Conversion between SVG markup and the layer model.
//!
//! The markup convention is fixed: each layer is a top-level `<g>` carrying
//! `data-layer-id`, `data-layer-name` and `data-layer-visible`, and each drawable
//! carries `data-element-id`. Decoding is total: unparseable or layer-less input
//! yields a single empty default layer.

mod decode;
mod encode;
pub mod number;

pub use decode::decode;
pub use encode::{encode, encode_with};

use std::borrow::Cow;

pub(crate) const SVG_NS: &str = "http://www.w3.org/2000/svg";
pub(crate) const XLINK_NS: &str = "http://www.w3.org/1999/xlink";

/// Escapes the five XML-significant characters so `input` is safe both as
/// text content and inside a double-quoted attribute.
pub fn escape_xml(input: &str) -> Cow<'_, str> {
    if !input.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(input);
    }

    let mut s = String::with_capacity(input.len() + 8);
    for ch in input.chars() {
        match ch {
            '&' => s.push_str("&amp;"),
            '<' => s.push_str("&lt;"),
            '>' => s.push_str("&gt;"),
            '"' => s.push_str("&quot;"),
            '\'' => s.push_str("&apos;"),
            _ => s.push(ch),
        }
    }
    Cow::Owned(s)
}
