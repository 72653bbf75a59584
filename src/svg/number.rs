//! Lenient number reading for SVG attribute values and path data.

/// Reads the longest float literal at the start of `s`, returning the value and
/// the number of bytes consumed. The value may be non-finite (`"1e999"`).
fn leading_number(s: &str) -> Option<(f64, usize)> {
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut mantissa_digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if mantissa_digits > 0 || frac_end > frac_start {
            mantissa_digits += frac_end - frac_start;
            end = frac_end;
        }
    }

    if mantissa_digits == 0 {
        return None;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok().map(|v| (v, end))
}

/// Parses a numeric attribute the way browsers do for lengths: leading
/// whitespace is skipped and trailing units or junk are ignored (`"12px"` is 12).
/// Returns `None` when no finite number starts the string.
pub fn parse_number(s: &str) -> Option<f64> {
    leading_number(s.trim_start())
        .map(|(v, _)| v)
        .filter(|v| v.is_finite())
}

/// Iterator over every finite number embedded in `s`, skipping separators,
/// command letters and anything else that isn't part of a number.
pub struct Numbers<'a> {
    rest: &'a str,
}

pub fn numbers(s: &str) -> Numbers<'_> {
    Numbers { rest: s }
}

impl Iterator for Numbers<'_> {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        while let Some(ch) = self.rest.chars().next() {
            match leading_number(self.rest) {
                Some((value, len)) => {
                    self.rest = &self.rest[len..];
                    if value.is_finite() {
                        return Some(value);
                    }
                }
                None => self.rest = &self.rest[ch.len_utf8()..],
            }
        }
        None
    }
}

/// Points of a path made only of absolute commands that take coordinate pairs
/// (`M L C Q S T Z`). Returns `None` for anything else, where the numbers alone
/// don't describe positions.
pub fn path_points(d: &str) -> Option<Vec<[f64; 2]>> {
    let absolute_pairs_only = d
        .chars()
        .filter(|c| c.is_ascii_alphabetic() && !matches!(c, 'e' | 'E'))
        .all(|c| matches!(c, 'M' | 'L' | 'C' | 'Q' | 'S' | 'T' | 'Z'));
    if !absolute_pairs_only {
        return None;
    }

    let values: Vec<f64> = numbers(d).collect();
    let points: Vec<[f64; 2]> = values.chunks_exact(2).map(|p| [p[0], p[1]]).collect();
    if points.is_empty() { None } else { Some(points) }
}

/// Reads `translate(tx ty)` (or `translate(tx)`) from a `transform` attribute.
pub fn parse_translate(transform: &str) -> Option<[f64; 2]> {
    let inner = transform.trim().strip_prefix("translate")?.trim_start().strip_prefix('(')?;
    let inner = &inner[..inner.find(')')?];
    let mut values = numbers(inner);
    let tx = values.next()?;
    Some([tx, values.next().unwrap_or(0.0)])
}
