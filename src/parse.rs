//! Reader for the puzzle text format.
//!
//! The input starts with shape blocks, each a header line `N:` followed by the
//! rows of the shape's pattern, and ends with one region per line:
//!
//! ```text
//! 0:
//! ###
//! #..
//! ###
//!
//! 4x4: 2
//! 12x5: 1 0 1
//! ```
//!
//! The `i`-th count on a region line is the number of copies of shape `i`
//! the region must hold. Blank lines are ignored everywhere.

use crate::{ParseError, Polyomino, Region};
use std::collections::BTreeSet;

/// A parsed puzzle: the shape catalogue and the regions to pack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Puzzle {
    /// Shapes in the order they were declared.
    pub shapes: Vec<Polyomino>,
    /// Regions in the order they were listed.
    pub regions: Vec<Region>,
}

/// Parse the full puzzle text.
///
/// Line numbers in errors are 1-based.
pub fn parse_input(text: &str) -> Result<Puzzle, ParseError> {
    let lines: Vec<&str> = text.lines().collect();
    let mut shapes = Vec::new();
    let mut declared = BTreeSet::new();
    let mut index = 0;

    // Shape section, up to the first region line
    while index < lines.len() {
        let line = lines[index].trim();
        if line.is_empty() {
            index += 1;
            continue;
        }
        if is_region_line(line) {
            break;
        }

        let header_line = index + 1;
        let shape_id = shape_header(line).ok_or_else(|| ParseError::InvalidShapeHeader {
            line: header_line,
            text: line.to_string(),
        })?;
        if !declared.insert(shape_id) {
            return Err(ParseError::DuplicateShape {
                line: header_line,
                shape_id,
            });
        }

        index += 1;
        let start = index;
        while index < lines.len() {
            let row = lines[index].trim();
            if row.is_empty() || shape_header(row).is_some() || is_region_line(row) {
                break;
            }
            index += 1;
        }

        let pattern = lines[start..index].join("\n");
        let shape = Polyomino::from_pattern(&pattern, shape_id).map_err(|_| {
            ParseError::EmptyShape {
                line: header_line,
                shape_id,
            }
        })?;
        shapes.push(shape);
    }

    let mut regions = Vec::new();
    for (offset, line) in lines[index..].iter().enumerate() {
        let line = line.trim();
        if !line.is_empty() {
            regions.push(parse_region(index + offset + 1, line)?);
        }
    }

    log::debug!(
        "Parsed [{}] shapes and [{}] regions.",
        shapes.len(),
        regions.len()
    );

    Ok(Puzzle { shapes, regions })
}

fn parse_region(line: usize, text: &str) -> Result<Region, ParseError> {
    let invalid = || ParseError::InvalidRegion {
        line,
        text: text.to_string(),
    };

    let (size, counts) = text.split_once(':').ok_or_else(invalid)?;
    let (width, height) = size.trim().split_once('x').ok_or_else(invalid)?;
    let width = number(width).ok_or_else(invalid)?;
    let height = number(height).ok_or_else(invalid)?;

    if width == 0 || height == 0 {
        return Err(ParseError::ZeroDimension { line });
    }

    let counts = counts
        .split_whitespace()
        .map(|token| {
            number(token).ok_or_else(|| ParseError::InvalidCount {
                line,
                token: token.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Region::from_counts(width, height, &counts))
}

fn shape_header(line: &str) -> Option<usize> {
    line.strip_suffix(':').and_then(number)
}

fn is_region_line(line: &str) -> bool {
    line.split_once(':')
        .and_then(|(size, _)| size.trim().split_once('x'))
        .is_some_and(|(width, height)| number(width).is_some() && number(height).is_some())
}

// Plain decimal digits only, no sign.
fn number(text: &str) -> Option<usize> {
    if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
        text.parse().ok()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INPUT: &str = "\
0:
###
#..
###

1:
.#.
###

4x4: 2
3x2: 0 2
";

    #[test]
    fn parses_shapes_and_regions() {
        let puzzle = parse_input(INPUT).unwrap();

        assert_eq!(puzzle.shapes.len(), 2);
        assert_eq!(puzzle.shapes[0].shape_id(), 0);
        assert_eq!(puzzle.shapes[0].area(), 7);
        assert_eq!(puzzle.shapes[1].to_string(), ".#.\n###");

        assert_eq!(
            puzzle.regions,
            vec![
                Region::from_counts(4, 4, &[2]),
                Region::from_counts(3, 2, &[0, 2]),
            ]
        );
    }

    #[test]
    fn header_followed_directly_by_header() {
        let input = "0:\n1:\n##\n";

        assert_eq!(
            parse_input(input),
            Err(ParseError::EmptyShape {
                line: 1,
                shape_id: 0
            })
        );
    }

    #[test]
    fn pattern_without_cells() {
        let input = "0:\n##\n\n1:\n...\n";

        assert_eq!(
            parse_input(input),
            Err(ParseError::EmptyShape {
                line: 4,
                shape_id: 1
            })
        );
    }

    #[test]
    fn duplicate_shape() {
        let input = "0:\n#\n\n0:\n##\n";

        assert_eq!(
            parse_input(input),
            Err(ParseError::DuplicateShape {
                line: 4,
                shape_id: 0
            })
        );
    }

    #[test]
    fn stray_text_in_shape_section() {
        let input = "0:\n#\n\nshape one\n";

        assert_eq!(
            parse_input(input),
            Err(ParseError::InvalidShapeHeader {
                line: 4,
                text: "shape one".to_string()
            })
        );
    }

    #[test]
    fn bad_regions() {
        assert_eq!(
            parse_input("0:\n#\n4x4: 1\n4 by 4: 1\n"),
            Err(ParseError::InvalidRegion {
                line: 4,
                text: "4 by 4: 1".to_string()
            })
        );
        assert_eq!(
            parse_input("0:\n#\n4x4: 1 -2\n"),
            Err(ParseError::InvalidCount {
                line: 3,
                token: "-2".to_string()
            })
        );
        assert_eq!(
            parse_input("0x4: 1\n"),
            Err(ParseError::ZeroDimension { line: 1 })
        );
    }

    #[test]
    fn regions_without_shapes() {
        let puzzle = parse_input("\n\n2x3:\n").unwrap();

        assert!(puzzle.shapes.is_empty());
        assert_eq!(puzzle.regions, vec![Region::from_counts(2, 3, &[])]);
    }
}
