//! [Polyominoes](https://en.wikipedia.org/wiki/Polyomino) as normalized sets
//! of integer grid cells, with the rotations and reflections needed to place
//! them.
//!
//! Cells do not have to be connected; any non-empty set of cells is a valid
//! shape.

use crate::PolyominoError;
use std::{
    collections::BTreeSet,
    fmt::{self, Display},
    ops::Add,
};

/// The default character marking a filled cell in a pattern.
pub const FILLED: char = '#';

/// A point on the integer grid, `x` growing to the right and `y` downwards.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Coord {
    /// Column offset.
    pub x: i32,
    /// Row offset.
    pub y: i32,
}

impl Coord {
    /// Create a new coordinate.
    pub const fn new(x: i32, y: i32) -> Self {
        Coord { x, y }
    }

    /// Rotate 90° clockwise around the origin.
    pub const fn rotate_cw(self) -> Self {
        Coord::new(-self.y, self.x)
    }

    /// Mirror over the vertical axis.
    pub const fn flip_horizontal(self) -> Self {
        Coord::new(-self.x, self.y)
    }
}

/// Component-wise sum. Overflow behaves like `i32` addition: it panics in
/// debug builds.
impl Add for Coord {
    type Output = Coord;

    fn add(self, other: Coord) -> Coord {
        Coord::new(self.x + other.x, self.y + other.y)
    }
}

/// Available transformations for polyomino shapes during packing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ShapeTransform {
    /// No transformation applied to the shape.
    NoTransform,
    /// Allow rotations of the shape.
    PureRotation,
    /// Allow rotations and reflections of the shape.
    #[default]
    FullSymmetry,
}

/// An immutable polyomino.
///
/// Shapes built by [`new`](Polyomino::new) or
/// [`from_pattern`](Polyomino::from_pattern) are normalized so that the
/// smallest `x` and the smallest `y` of their cells are both zero.
///
/// Two polyominoes are equal when their cells, `shape_id` and `instance_id`
/// are all equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Polyomino {
    cells: BTreeSet<Coord>,
    shape_id: usize,
    instance_id: usize,
}

impl Polyomino {
    /// Create a normalized polyomino from a list of cells.
    pub fn new(
        cells: impl IntoIterator<Item = Coord>,
        shape_id: usize,
    ) -> Result<Self, PolyominoError> {
        let cells: BTreeSet<_> = cells.into_iter().collect();
        if cells.is_empty() {
            return Err(PolyominoError::Empty { shape_id });
        }

        // Normalized cells lie in 0..=span, and width is span + 1.
        let span = |axis: fn(&Coord) -> i32| {
            let min = cells.iter().map(axis).min().unwrap_or(0);
            let max = cells.iter().map(axis).max().unwrap_or(0);
            i64::from(max) - i64::from(min)
        };
        if span(|c| c.x) >= i64::from(i32::MAX) || span(|c| c.y) >= i64::from(i32::MAX) {
            return Err(PolyominoError::TooLarge { shape_id });
        }

        Ok(Polyomino {
            cells,
            shape_id,
            instance_id: 0,
        }
        .normalize())
    }

    /// Parse a polyomino from rows of `#` (filled) and any other character
    /// (empty).
    ///
    /// ```
    /// use polyomino_packing::Polyomino;
    ///
    /// let shape = Polyomino::from_pattern("###\n#..\n###", 4).unwrap();
    /// assert_eq!(shape.area(), 7);
    /// assert_eq!((shape.width(), shape.height()), (3, 3));
    /// ```
    pub fn from_pattern(pattern: &str, shape_id: usize) -> Result<Self, PolyominoError> {
        Self::from_pattern_with(pattern, shape_id, FILLED)
    }

    /// Parse a polyomino from rows where `marker` marks a filled cell.
    pub fn from_pattern_with(
        pattern: &str,
        shape_id: usize,
        marker: char,
    ) -> Result<Self, PolyominoError> {
        let cells = pattern.lines().enumerate().flat_map(|(y, line)| {
            line.chars()
                .enumerate()
                .filter(move |&(_, c)| c == marker)
                .map(move |(x, _)| Coord::new(x as i32, y as i32))
        });

        Self::new(cells, shape_id)
    }

    fn normalize(self) -> Self {
        let min_x = self.cells.iter().map(|c| c.x).min().unwrap_or(0);
        let min_y = self.cells.iter().map(|c| c.y).min().unwrap_or(0);

        self.map_cells(|c| Coord::new(c.x - min_x, c.y - min_y))
    }

    fn map_cells(&self, f: impl Fn(Coord) -> Coord) -> Self {
        Polyomino {
            cells: self.cells.iter().copied().map(f).collect(),
            shape_id: self.shape_id,
            instance_id: self.instance_id,
        }
    }

    /// Return a copy rotated 90° clockwise.
    pub fn rotate_cw(&self) -> Self {
        self.map_cells(Coord::rotate_cw).normalize()
    }

    /// Return a copy mirrored left to right.
    pub fn flip_horizontal(&self) -> Self {
        self.map_cells(Coord::flip_horizontal).normalize()
    }

    /// Return a copy shifted by `offset`.
    ///
    /// The result is positioned rather than normalized, which is how a
    /// placement inside a region is described.
    ///
    /// # Panics
    ///
    /// Panics on overflow if a shifted cell leaves the `i32` range.
    pub fn translate(&self, offset: Coord) -> Self {
        self.map_cells(|c| c + offset)
    }

    /// Return a copy tagged as a different physical piece of the same shape.
    pub fn with_instance_id(&self, instance_id: usize) -> Self {
        Polyomino {
            cells: self.cells.clone(),
            shape_id: self.shape_id,
            instance_id,
        }
    }

    /// Return the distinct orientations allowed by `transform`.
    ///
    /// Duplicates produced by symmetric shapes collapse, so there are between
    /// 1 and 8 of them.
    pub fn orientations(&self, transform: ShapeTransform) -> BTreeSet<Polyomino> {
        let mut orientations = BTreeSet::new();

        let rotations = |start: Polyomino, orientations: &mut BTreeSet<Polyomino>| {
            let mut current = start;
            for _ in 0..4 {
                let next = current.rotate_cw();
                orientations.insert(current);
                current = next;
            }
        };

        match transform {
            ShapeTransform::NoTransform => {
                orientations.insert(self.clone());
            }
            ShapeTransform::PureRotation => rotations(self.clone(), &mut orientations),
            ShapeTransform::FullSymmetry => {
                rotations(self.clone(), &mut orientations);
                rotations(self.flip_horizontal(), &mut orientations);
            }
        }

        orientations
    }

    /// Return all distinct rotations and reflections of this shape.
    pub fn all_orientations(&self) -> BTreeSet<Polyomino> {
        self.orientations(ShapeTransform::FullSymmetry)
    }

    /// Return the cells of the shape, ordered by `x` then `y`.
    pub fn cells(&self) -> &BTreeSet<Coord> {
        &self.cells
    }

    /// Get the id of the shape type.
    pub fn shape_id(&self) -> usize {
        self.shape_id
    }

    /// Get the id distinguishing copies of the same shape.
    pub fn instance_id(&self) -> usize {
        self.instance_id
    }

    /// One more than the largest `x` of any cell.
    pub fn width(&self) -> usize {
        self.cells.iter().map(|c| c.x + 1).max().unwrap_or(0).max(0) as usize
    }

    /// One more than the largest `y` of any cell.
    pub fn height(&self) -> usize {
        self.cells.iter().map(|c| c.y + 1).max().unwrap_or(0).max(0) as usize
    }

    /// Number of cells.
    pub fn area(&self) -> usize {
        self.cells.len()
    }
}

impl Display for Polyomino {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for y in 0..self.height() as i32 {
            if y > 0 {
                writeln!(f)?;
            }
            for x in 0..self.width() as i32 {
                let c = if self.cells.contains(&Coord::new(x, y)) {
                    FILLED
                } else {
                    '.'
                };
                write!(f, "{c}")?;
            }
        }

        Ok(())
    }
}
