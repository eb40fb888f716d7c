//! Text input and output.
//!
//! Sites are read one per line:
//!
//! ```text
//! # comment
//! p 0 0
//! s 1 0 3 2
//! ```
//!
//! Dual edges are written one per line as a kind tag followed by its
//! parameters, optionally followed by the four defining sites:
//!
//! | primitive      | line                                 |
//! |----------------|--------------------------------------|
//! | line           | `l a b c`                            |
//! | segment        | `s x1 y1 x2 y2`                      |
//! | ray            | `r ox oy dx dy`                      |
//! | parabolic arc  | `p x1 y1 x2 y2 fx fy a b c`          |
//!
//! Numbers use ten significant digits.

use std::io::{BufRead, Write};

use thiserror::Error;

use crate::core::dual::{DualEdge, DualPrimitive, DualSite};
use crate::geometry::point::Point;
use crate::geometry::site::{DegenerateInputError, Site};

/// Significant digits of formatted numbers.
pub const SIGNIFICANT_DIGITS: usize = 10;

/// Errors while reading sites.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SiteParseError {
    /// The reader failed.
    #[error("I/O error: {message}")]
    Io {
        /// Underlying error message.
        message: String,
    },
    /// A line is not a site record.
    #[error("Line {line}: {message}")]
    Syntax {
        /// 1-based line number.
        line: usize,
        /// What is wrong.
        message: String,
    },
    /// A record describes a site that cannot be built.
    #[error("Line {line}: {source}")]
    Degenerate {
        /// 1-based line number.
        line: usize,
        /// Why the site is rejected.
        source: DegenerateInputError,
    },
}

/// Options of [`read_sites`].
///
/// # Examples
///
/// ```rust
/// use segment_voronoi::io::{ReadOptionsBuilder, parse_sites_with};
///
/// let options = ReadOptionsBuilder::default()
///     .collapse_point_segments(true)
///     .build()
///     .unwrap();
/// let sites = parse_sites_with("s 1 1 1 1\n", &options).unwrap();
/// assert!(sites[0].is_point());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Builder)]
#[builder(default)]
pub struct ReadOptions {
    /// Read a segment with identical endpoints as a point instead of failing.
    pub collapse_point_segments: bool,
}

// =============================================================================
// READING
// =============================================================================

fn parse_coordinates(fields: &[&str], line: usize) -> Result<Vec<f64>, SiteParseError> {
    fields
        .iter()
        .map(|field| {
            field.parse::<f64>().map_err(|_| SiteParseError::Syntax {
                line,
                message: format!("'{field}' is not a number"),
            })
        })
        .collect()
}

/// Parse one line; `Ok(None)` for blank and comment lines.
///
/// # Errors
///
/// Returns [`SiteParseError`] for malformed records and degenerate sites.
pub fn parse_site_line(
    text: &str,
    line: usize,
    options: &ReadOptions,
) -> Result<Option<Site>, SiteParseError> {
    let text = text.trim();
    if text.is_empty() || text.starts_with('#') {
        return Ok(None);
    }
    let fields: Vec<&str> = text.split_whitespace().collect();
    let degenerate = |source| SiteParseError::Degenerate { line, source };
    let arity = |expected: usize| {
        if fields.len() == expected + 1 {
            Ok(())
        } else {
            Err(SiteParseError::Syntax {
                line,
                message: format!(
                    "'{}' record takes {expected} numbers, found {}",
                    fields[0],
                    fields.len() - 1
                ),
            })
        }
    };

    match fields[0] {
        "p" => {
            arity(2)?;
            let c = parse_coordinates(&fields[1..], line)?;
            Site::point(c[0], c[1]).map(Some).map_err(degenerate)
        }
        "s" => {
            arity(4)?;
            let c = parse_coordinates(&fields[1..], line)?;
            let (p, q) = (Point::new(c[0], c[1]), Point::new(c[2], c[3]));
            if p == q && options.collapse_point_segments {
                tracing::debug!("line {line}: reading zero-length segment as point {p}");
                return Site::point(p.x(), p.y()).map(Some).map_err(degenerate);
            }
            Site::segment(p, q).map(Some).map_err(degenerate)
        }
        tag => Err(SiteParseError::Syntax {
            line,
            message: format!("unknown record type '{tag}' (expected 'p' or 's')"),
        }),
    }
}

/// Read sites from `reader`, one per line.
///
/// # Errors
///
/// Returns the first [`SiteParseError`].
pub fn read_sites<R: BufRead>(reader: R, options: &ReadOptions) -> Result<Vec<Site>, SiteParseError> {
    let mut sites = Vec::new();
    for (index, text) in reader.lines().enumerate() {
        let text = text.map_err(|e| SiteParseError::Io {
            message: e.to_string(),
        })?;
        if let Some(site) = parse_site_line(&text, index + 1, options)? {
            sites.push(site);
        }
    }
    Ok(sites)
}

/// Parse sites from a string with the given options.
///
/// # Errors
///
/// Returns the first [`SiteParseError`].
pub fn parse_sites_with(text: &str, options: &ReadOptions) -> Result<Vec<Site>, SiteParseError> {
    read_sites(text.as_bytes(), options)
}

/// Parse sites from a string with default options.
///
/// # Errors
///
/// Returns the first [`SiteParseError`].
pub fn parse_sites(text: &str) -> Result<Vec<Site>, SiteParseError> {
    parse_sites_with(text, &ReadOptions::default())
}

// =============================================================================
// WRITING
// =============================================================================

fn trim_fraction(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

/// Format `value` like C's `%.10g`.
///
/// # Examples
///
/// ```rust
/// use segment_voronoi::io::format_number;
///
/// assert_eq!(format_number(1.0), "1");
/// assert_eq!(format_number(-0.0), "0");
/// assert_eq!(format_number(0.75), "0.75");
/// assert_eq!(format_number(1.0 / 3.0), "0.3333333333");
/// assert_eq!(format_number(1e-7), "1e-07");
/// assert_eq!(format_number(12_345_678_901.0), "1.23456789e+10");
/// ```
#[must_use]
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if !value.is_finite() {
        return value.to_string();
    }
    let scientific = format!("{value:.prec$e}", prec = SIGNIFICANT_DIGITS - 1);
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    #[allow(clippy::cast_possible_wrap)]
    let max_exponent = SIGNIFICANT_DIGITS as i32;
    if exponent < -4 || exponent >= max_exponent {
        format!("{}e{exponent:+03}", trim_fraction(mantissa))
    } else {
        #[allow(clippy::cast_sign_loss)]
        let decimals = (max_exponent - 1 - exponent) as usize;
        trim_fraction(&format!("{value:.decimals$}")).to_string()
    }
}

fn format_point(p: &Point) -> String {
    format!("{} {}", format_number(p.x()), format_number(p.y()))
}

/// One primitive as `kind params...`.
#[must_use]
pub fn format_primitive(primitive: &DualPrimitive) -> String {
    match primitive {
        DualPrimitive::Line(line) => format!(
            "l {} {} {}",
            format_number(line.a),
            format_number(line.b),
            format_number(line.c)
        ),
        DualPrimitive::Segment { source, target } => {
            format!("s {} {}", format_point(source), format_point(target))
        }
        DualPrimitive::Ray { origin, direction } => {
            format!("r {} {}", format_point(origin), format_point(direction))
        }
        DualPrimitive::ParabolicArc(arc) => format!(
            "p {} {} {} {} {} {}",
            format_point(&arc.source),
            format_point(&arc.target),
            format_point(&arc.focus),
            format_number(arc.directrix.a),
            format_number(arc.directrix.b),
            format_number(arc.directrix.c)
        ),
    }
}

/// A defining site as `p x y`, `s x1 y1 x2 y2` or `inf`.
#[must_use]
pub fn format_dual_site(site: &DualSite) -> String {
    match site {
        DualSite::Site(Site::Point(p)) => format!("p {}", format_point(p)),
        DualSite::Site(Site::Segment(s)) => {
            format!("s {} {}", format_point(&s.source()), format_point(&s.target()))
        }
        DualSite::AtInfinity => "inf".to_string(),
    }
}

/// One dual edge, with its defining sites separated by `|` when `with_sites` is set.
#[must_use]
pub fn format_dual_edge(edge: &DualEdge, with_sites: bool) -> String {
    let mut text = format_primitive(&edge.primitive);
    if with_sites {
        for site in &edge.sites {
            text.push_str(" | ");
            text.push_str(&format_dual_site(site));
        }
    }
    text
}

/// Write dual edges one per line.
///
/// # Errors
///
/// Returns any error of `writer`.
pub fn write_dual_edges<'a, W, I>(writer: &mut W, edges: I, with_sites: bool) -> std::io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a DualEdge>,
{
    for edge in edges {
        writeln!(writer, "{}", format_dual_edge(edge, with_sites))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dual::ParabolicArc;
    use crate::geometry::constructions::Line;

    #[test]
    fn reads_points_segments_and_comments() {
        let text = "# sites\np 0 0\n\n  s 1 2 3 4  \np -1.5 2e3\n";
        let sites = parse_sites(text).unwrap();
        assert_eq!(sites.len(), 3);
        assert_eq!(sites[0], Site::point(0.0, 0.0).unwrap());
        assert_eq!(
            sites[1],
            Site::segment(Point::new(1.0, 2.0), Point::new(3.0, 4.0)).unwrap()
        );
        assert_eq!(sites[2], Site::point(-1.5, 2000.0).unwrap());
    }

    #[test]
    fn parse_errors_report_line_numbers() {
        assert_eq!(
            parse_sites("p 0 0\nq 1 1\n"),
            Err(SiteParseError::Syntax {
                line: 2,
                message: "unknown record type 'q' (expected 'p' or 's')".to_string(),
            })
        );
        assert!(matches!(
            parse_sites("p 0\n"),
            Err(SiteParseError::Syntax { line: 1, .. })
        ));
        assert!(matches!(
            parse_sites("\np 0 zero\n"),
            Err(SiteParseError::Syntax { line: 2, .. })
        ));
        assert!(matches!(
            parse_sites("p 0 0\ns 1 1 1 1\n"),
            Err(SiteParseError::Degenerate {
                line: 2,
                source: DegenerateInputError::ZeroLengthSegment { .. }
            })
        ));
        assert!(matches!(
            parse_sites("p nan 0\n"),
            Err(SiteParseError::Degenerate { line: 1, .. })
        ));
    }

    #[test]
    fn collapsing_point_segments() {
        let options = ReadOptionsBuilder::default()
            .collapse_point_segments(true)
            .build()
            .unwrap();
        let sites = parse_sites_with("s 2 3 2 3\n", &options).unwrap();
        assert_eq!(sites, vec![Site::point(2.0, 3.0).unwrap()]);
    }

    #[test]
    fn number_formatting() {
        assert_eq!(format_number(2.0), "2");
        assert_eq!(format_number(-1.25), "-1.25");
        assert_eq!(format_number(100.0), "100");
        assert_eq!(format_number(0.0001), "0.0001");
        assert_eq!(format_number(0.00001), "1e-05");
        assert_eq!(format_number(1_234_567_890.0), "1234567890");
        assert_eq!(format_number(2.0 / 3.0), "0.6666666667");
        assert_eq!(format_number(-2.5e-300), "-2.5e-300");
    }

    #[test]
    fn primitive_formatting() {
        let line = DualPrimitive::Line(Line {
            a: 1.0,
            b: 0.0,
            c: -1.0,
        });
        assert_eq!(format_primitive(&line), "l 1 0 -1");

        let ray = DualPrimitive::Ray {
            origin: Point::new(1.0, 0.75),
            direction: Point::new(0.0, -1.0),
        };
        assert_eq!(format_primitive(&ray), "r 1 0.75 0 -1");

        let arc = DualPrimitive::ParabolicArc(ParabolicArc {
            focus: Point::new(1.0, 2.0),
            directrix: Line {
                a: 0.0,
                b: -1.0,
                c: 0.0,
            },
            source: Point::new(0.0, 1.25),
            target: Point::new(2.0, 1.25),
        });
        assert_eq!(format_primitive(&arc), "p 0 1.25 2 1.25 1 2 0 -1 0");
    }

    #[test]
    fn edge_formatting_with_sites() {
        let edge = DualEdge {
            sites: [
                DualSite::Site(Site::point(0.0, 0.0).unwrap()),
                DualSite::Site(
                    Site::segment(Point::new(1.0, 1.0), Point::new(2.0, 1.0)).unwrap(),
                ),
                DualSite::AtInfinity,
                DualSite::Site(Site::point(3.0, 0.0).unwrap()),
            ],
            primitive: DualPrimitive::Segment {
                source: Point::new(0.5, 0.5),
                target: Point::new(1.5, -0.5),
            },
        };
        assert_eq!(
            format_dual_edge(&edge, true),
            "s 0.5 0.5 1.5 -0.5 | p 0 0 | s 1 1 2 1 | inf | p 3 0"
        );

        let mut out = Vec::new();
        write_dual_edges(&mut out, [&edge, &edge], false).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "s 0.5 0.5 1.5 -0.5\ns 0.5 0.5 1.5 -0.5\n");
    }
}
