//! Bounding boxes of SVG path data.
//!
//! Curves are bounded by their control points, so a box may be slightly
//! larger than the drawn outline. Arcs contribute their end points only.

use crate::error::{Error, Result};
use crate::model::BoundingBox;
use regex::Regex;
use std::sync::OnceLock;

fn number_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?").unwrap())
}

fn is_command(c: char) -> bool {
    matches!(
        c,
        'M' | 'm' | 'L' | 'l' | 'H' | 'h' | 'V' | 'v' | 'C' | 'c' | 'S' | 's' | 'Q' | 'q' | 'T'
            | 't' | 'A' | 'a' | 'Z' | 'z'
    )
}

/// Cursor over path data. Whitespace and commas separate operands.
struct Scanner<'a> {
    d: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(d: &'a str) -> Self {
        Self { d, pos: 0 }
    }

    fn rest(&mut self) -> &'a str {
        let d = self.d;
        let rest = &d[self.pos..];
        let trimmed = rest.trim_start_matches(|c: char| c.is_whitespace() || c == ',');
        self.pos += rest.len() - trimmed.len();
        trimmed
    }

    fn at_end(&mut self) -> bool {
        self.rest().is_empty()
    }

    fn command(&mut self) -> Option<char> {
        let c = self.rest().chars().next().filter(|c| is_command(*c))?;
        self.pos += 1;
        Some(c)
    }

    fn number(&mut self) -> Result<f64> {
        let rest = self.rest();
        let Some(m) = number_regex().find(rest) else {
            return Err(match rest.chars().next() {
                Some(bad) => Error::MalformedGeometry(format!("unexpected '{bad}' in path data")),
                None => Error::MalformedGeometry("path data ends inside a command".to_string()),
            });
        };
        let value = m.as_str().parse::<f64>().map_err(|_| {
            Error::MalformedGeometry(format!("invalid number '{}' in path data", m.as_str()))
        })?;
        self.pos += m.end();
        Ok(value)
    }

    fn numbers<const N: usize>(&mut self) -> Result<[f64; N]> {
        let mut values = [0.0; N];
        for slot in values.iter_mut() {
            *slot = self.number()?;
        }
        Ok(values)
    }

    /// Arc flags are single characters and may run into the next operand.
    fn flag(&mut self) -> Result<bool> {
        let flag = match self.rest().chars().next() {
            Some('0') => false,
            Some('1') => true,
            Some(bad) => {
                return Err(Error::MalformedGeometry(format!(
                    "arc flag must be 0 or 1, found '{bad}'"
                )))
            }
            None => return Err(Error::MalformedGeometry("missing arc flag".to_string())),
        };
        self.pos += 1;
        Ok(flag)
    }
}

/// Running min/max over the points of a path.
#[derive(Debug, Default)]
struct Extent {
    bounds: Option<(f64, f64, f64, f64)>,
}

impl Extent {
    fn add(&mut self, x: f64, y: f64) {
        self.bounds = Some(match self.bounds {
            None => (x, y, x, y),
            Some((x1, y1, x2, y2)) => (x1.min(x), y1.min(y), x2.max(x), y2.max(y)),
        });
    }
}

/// Bounding box of path data `d` on `page`.
///
/// Returns `Ok(None)` when the path has no area (a straight line, a
/// single point or no drawing command at all).
pub fn path_bounds(d: &str, page: u32) -> Result<Option<BoundingBox>> {
    let mut scanner = Scanner::new(d);
    let mut extent = Extent::default();

    let (mut cx, mut cy) = (0.0f64, 0.0f64);
    let (mut start_x, mut start_y) = (0.0f64, 0.0f64);
    let mut command: Option<char> = None;

    while !scanner.at_end() {
        let cmd = match scanner.command() {
            Some(c) => c,
            None => match command {
                // implicit repetition; a repeated moveto is a lineto
                Some('M') => 'L',
                Some('m') => 'l',
                Some('Z' | 'z') => {
                    return Err(Error::MalformedGeometry(
                        "closepath takes no numbers".to_string(),
                    ))
                }
                Some(c) => c,
                None => {
                    return Err(Error::MalformedGeometry(
                        "path data must start with a command".to_string(),
                    ))
                }
            },
        };
        command = Some(cmd);

        let relative = cmd.is_ascii_lowercase();
        let (ox, oy) = if relative { (cx, cy) } else { (0.0, 0.0) };

        match cmd.to_ascii_uppercase() {
            'Z' => {
                cx = start_x;
                cy = start_y;
            }
            'M' | 'L' | 'T' => {
                let [x, y] = scanner.numbers::<2>()?;
                cx = ox + x;
                cy = oy + y;
                extent.add(cx, cy);
                if cmd.eq_ignore_ascii_case(&'M') {
                    start_x = cx;
                    start_y = cy;
                }
            }
            'H' => {
                let [x] = scanner.numbers::<1>()?;
                cx = ox + x;
                extent.add(cx, cy);
            }
            'V' => {
                let [y] = scanner.numbers::<1>()?;
                cy = oy + y;
                extent.add(cx, cy);
            }
            'C' => {
                let v = scanner.numbers::<6>()?;
                extent.add(ox + v[0], oy + v[1]);
                extent.add(ox + v[2], oy + v[3]);
                cx = ox + v[4];
                cy = oy + v[5];
                extent.add(cx, cy);
            }
            'S' | 'Q' => {
                let v = scanner.numbers::<4>()?;
                extent.add(ox + v[0], oy + v[1]);
                cx = ox + v[2];
                cy = oy + v[3];
                extent.add(cx, cy);
            }
            'A' => {
                // radii and rotation, then the large-arc and sweep flags
                scanner.numbers::<3>()?;
                scanner.flag()?;
                scanner.flag()?;
                let [x, y] = scanner.numbers::<2>()?;
                cx = ox + x;
                cy = oy + y;
                extent.add(cx, cy);
            }
            other => {
                return Err(Error::MalformedGeometry(format!(
                    "unsupported path command '{other}'"
                )))
            }
        }
    }

    Ok(extent.bounds.and_then(|(x1, y1, x2, y2)| {
        let (w, h) = (x2 - x1, y2 - y1);
        (w > 0.0 && h > 0.0).then(|| BoundingBox::from_point_and_dimensions(page, x1, y1, w, h))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(d: &str) -> BoundingBox {
        path_bounds(d, 1).unwrap().unwrap()
    }

    #[test]
    fn test_absolute_polygon() {
        assert_eq!(
            bounds("M 10 20 L 110 20 L 110 70 Z"),
            BoundingBox::from_point_and_dimensions(1, 10.0, 20.0, 100.0, 50.0)
        );
    }

    #[test]
    fn test_relative_and_compact_syntax() {
        assert_eq!(
            bounds("m10,20h100v50h-100z"),
            BoundingBox::from_point_and_dimensions(1, 10.0, 20.0, 100.0, 50.0)
        );
        assert_eq!(
            bounds("M0 0 10 10 20-5"),
            BoundingBox::from_point_and_dimensions(1, 0.0, -5.0, 20.0, 15.0)
        );
    }

    #[test]
    fn test_curve_includes_control_points() {
        assert_eq!(
            bounds("M0 0 C 0 -10 10 -10 10 0"),
            BoundingBox::from_point_and_dimensions(1, 0.0, -10.0, 10.0, 10.0)
        );
    }

    #[test]
    fn test_scientific_notation() {
        assert_eq!(
            bounds("M1e1 2E1 L 3.5e1 .5e2"),
            BoundingBox::from_point_and_dimensions(1, 10.0, 20.0, 25.0, 30.0)
        );
    }

    #[test]
    fn test_arc_end_points() {
        assert_eq!(
            bounds("M 0 0 A 5 5 0 0 1 10 10"),
            BoundingBox::from_point_and_dimensions(1, 0.0, 0.0, 10.0, 10.0)
        );
    }

    #[test]
    fn test_compact_arc_flags() {
        assert_eq!(
            bounds("M0 0a5 5 0 0110 10"),
            BoundingBox::from_point_and_dimensions(1, 0.0, 0.0, 10.0, 10.0)
        );
        assert_eq!(
            bounds("M0 0 A5,5,0,1,0,20,-10"),
            BoundingBox::from_point_and_dimensions(1, 0.0, -10.0, 20.0, 10.0)
        );
        assert!(matches!(
            path_bounds("M0 0 A5 5 0 2 1 10 10", 1),
            Err(Error::MalformedGeometry(_))
        ));
    }

    #[test]
    fn test_numbers_after_closepath() {
        assert!(matches!(
            path_bounds("M0 0 L10 0 L10 10 Z 5 5", 1),
            Err(Error::MalformedGeometry(_))
        ));
        assert!(matches!(
            path_bounds("m0 0 l10 0 l0 10 z 1", 1),
            Err(Error::MalformedGeometry(_))
        ));
        assert_eq!(
            bounds("M0 0 L10 0 L10 10 Z M20 20 L30 30"),
            BoundingBox::from_point_and_dimensions(1, 0.0, 0.0, 30.0, 30.0)
        );
    }

    #[test]
    fn test_degenerate_path_has_no_box() {
        assert_eq!(path_bounds("M 0 0 L 100 0", 1).unwrap(), None);
        assert_eq!(path_bounds("", 1).unwrap(), None);
    }

    #[test]
    fn test_malformed_path() {
        assert!(matches!(
            path_bounds("M 0 0 L 10", 1),
            Err(Error::MalformedGeometry(_))
        ));
        assert!(matches!(
            path_bounds("10 10 L 20 20", 1),
            Err(Error::MalformedGeometry(_))
        ));
        assert!(matches!(
            path_bounds("M 0 0 X 4 4", 1),
            Err(Error::MalformedGeometry(_))
        ));
    }
}
