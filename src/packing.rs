//! A polyomino packing puzzle asks whether a multiset of polyominoes fits
//! inside a rectangular region without overlaps, where each piece may be
//! rotated and reflected and gaps are allowed.
//!
//! The puzzle is encoded as an exact cover problem with one primary
//! constraint per physical piece and one secondary constraint per grid cell.

use crate::{
    polyomino::{Coord, Polyomino, ShapeTransform},
    ExactCover, PackError, SearchStats,
};
use std::{
    collections::{BTreeMap, BTreeSet},
    ops::ControlFlow,
};

/// A rectangular region and the pieces that have to fit into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    width: usize,
    height: usize,
    required: BTreeMap<usize, usize>,
}

impl Region {
    /// Create a region of the given size requiring `count` copies of each
    /// listed shape id.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero.
    pub fn new(
        width: usize,
        height: usize,
        required: impl IntoIterator<Item = (usize, usize)>,
    ) -> Self {
        assert!(
            width > 0 && height > 0,
            "Region dimensions must be positive."
        );

        Region {
            width,
            height,
            required: required.into_iter().collect(),
        }
    }

    /// Create a region where `counts[i]` is the number of copies of shape `i`.
    pub fn from_counts(width: usize, height: usize, counts: &[usize]) -> Self {
        Self::new(width, height, counts.iter().copied().enumerate())
    }

    /// Get region width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Get region height.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of cells in the region.
    pub fn area(&self) -> usize {
        self.width * self.height
    }

    /// Required number of copies per shape id.
    pub fn required(&self) -> &BTreeMap<usize, usize> {
        &self.required
    }

    /// Required number of copies of one shape, zero if it is not listed.
    pub fn count(&self, shape_id: usize) -> usize {
        self.required.get(&shape_id).copied().unwrap_or(0)
    }
}

/// A possible placement of one piece in the region.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Placement {
    /// The normalized orientation of the piece, tagged with its shape and
    /// instance ids.
    pub orientation: Polyomino,
    /// Offset of the orientation's bounding box from the region's top-left
    /// corner.
    pub anchor: Coord,
}

impl Placement {
    /// Get the id of the shape being placed.
    pub fn shape_id(&self) -> usize {
        self.orientation.shape_id()
    }

    /// Get the id of the physical piece being placed.
    pub fn instance_id(&self) -> usize {
        self.orientation.instance_id()
    }

    /// Return an iterator over the region cells covered by this placement.
    pub fn occupied_cells(&self) -> impl Iterator<Item = Coord> + '_ {
        self.orientation
            .cells()
            .iter()
            .map(move |&cell| cell + self.anchor)
    }

    /// Return an iterator over all `Constraint`s that are satisfied by this
    /// `Placement`.
    pub fn satisfied_constraints(&self) -> impl Iterator<Item = Constraint> + '_ {
        let piece = Constraint::Piece {
            shape_id: self.shape_id(),
            instance: self.instance_id(),
        };

        std::iter::once(piece).chain(self.occupied_cells().map(Constraint::Cell))
    }
}

/// A condition that a packing has to satisfy.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Constraint {
    /// A specific physical piece must be placed exactly once.
    Piece {
        /// The shape of the piece.
        shape_id: usize,
        /// Which copy of the shape this is.
        instance: usize,
    },
    /// A cell of the region may be covered at most once.
    Cell(Coord),
}

/// Instance of a packing puzzle, ready to be handed to the solver.
#[derive(Debug, Clone)]
pub struct PackingProblem {
    /// The region being packed.
    pub region: Region,
    /// Every physical piece to place, one entry per required copy.
    pub pieces: Vec<Polyomino>,
    /// All placements of every piece that fit in the region.
    pub possibilities: Vec<Placement>,
    /// Cell constraints followed by piece constraints.
    pub constraints: Vec<Constraint>,
}

impl PackingProblem {
    /// Create the packing problem for the given pieces.
    ///
    /// `orientations` is queried with each piece's shape id, and each
    /// orientation is tried at every anchor where it fits, scanning `x` in the
    /// outer loop and `y` in the inner loop.
    pub fn new<'o>(
        region: Region,
        pieces: Vec<Polyomino>,
        orientations: impl Fn(usize) -> &'o [Polyomino],
    ) -> Self {
        let possibilities = pieces
            .iter()
            .flat_map(|piece| {
                orientations(piece.shape_id())
                    .iter()
                    .map(move |orientation| orientation.with_instance_id(piece.instance_id()))
            })
            .flat_map(|orientation| {
                Self::anchors(&region, &orientation).map(move |anchor| Placement {
                    orientation: orientation.clone(),
                    anchor,
                })
            })
            .collect();

        let cells = (0..region.width).flat_map(|x| {
            (0..region.height).map(move |y| Constraint::Cell(Coord::new(x as i32, y as i32)))
        });
        let piece_constraints = pieces.iter().map(|piece| Constraint::Piece {
            shape_id: piece.shape_id(),
            instance: piece.instance_id(),
        });
        let constraints = cells.chain(piece_constraints).collect();

        PackingProblem {
            region,
            pieces,
            possibilities,
            constraints,
        }
    }

    /// Return every anchor at which `orientation` fits inside `region`.
    fn anchors(region: &Region, orientation: &Polyomino) -> impl Iterator<Item = Coord> {
        let x_range = 0..(region.width + 1).saturating_sub(orientation.width());
        let y_range = 0..(region.height + 1).saturating_sub(orientation.height());

        x_range.flat_map(move |x| {
            y_range
                .clone()
                .map(move |y| Coord::new(x as i32, y as i32))
        })
    }
}

impl ExactCover for PackingProblem {
    type Constraint = Constraint;
    type Possibility = Placement;

    fn satisfied_constraints(&self, poss: &Self::Possibility) -> Vec<Self::Constraint> {
        poss.satisfied_constraints().collect()
    }

    fn is_optional(&self, cons: &Self::Constraint) -> bool {
        matches!(cons, Constraint::Cell(_))
    }

    fn possibilities(&self) -> &[Self::Possibility] {
        &self.possibilities
    }

    fn constraints(&self) -> &[Self::Constraint] {
        &self.constraints
    }
}

/// Result of preparing a region for the solver.
#[derive(Debug, Clone)]
pub enum PackOutcome {
    /// The pieces need more cells than the region has, so no search is
    /// needed.
    TooLarge {
        /// Total area of the required pieces.
        needed: usize,
        /// Area of the region.
        available: usize,
    },
    /// The region passed the area check and was encoded.
    Problem(PackingProblem),
}

/// Solves polyomino packing problems over a fixed catalogue of shapes.
#[derive(Debug, Clone)]
pub struct Packer {
    shapes: BTreeMap<usize, Polyomino>,
    orientations: BTreeMap<usize, Vec<Polyomino>>,
    transform: ShapeTransform,
    strict_shapes: bool,
}

impl Packer {
    /// Create a packer for the given shapes, keyed by their shape ids.
    ///
    /// Pieces may be rotated and reflected, and regions requiring shapes that
    /// are not in the catalogue skip them. Two shapes with the same id are a
    /// [`PackError::DuplicateShape`].
    pub fn new(shapes: impl IntoIterator<Item = Polyomino>) -> Result<Self, PackError> {
        let mut catalogue = BTreeMap::new();
        for shape in shapes {
            let shape_id = shape.shape_id();
            if catalogue.insert(shape_id, shape).is_some() {
                return Err(PackError::DuplicateShape { shape_id });
            }
        }

        let mut packer = Packer {
            shapes: catalogue,
            orientations: BTreeMap::new(),
            transform: ShapeTransform::default(),
            strict_shapes: false,
        };
        packer.orientations = packer.compute_orientations();
        Ok(packer)
    }

    /// Restrict or widen the transformations pieces may undergo.
    pub fn with_transform(mut self, transform: ShapeTransform) -> Self {
        self.transform = transform;
        self.orientations = self.compute_orientations();
        self
    }

    /// When `strict`, a region requiring a shape missing from the catalogue
    /// is an error instead of being ignored.
    pub fn with_strict_shapes(mut self, strict: bool) -> Self {
        self.strict_shapes = strict;
        self
    }

    fn compute_orientations(&self) -> BTreeMap<usize, Vec<Polyomino>> {
        self.shapes
            .iter()
            .map(|(&shape_id, shape)| {
                let orientations: BTreeSet<_> = shape.orientations(self.transform);
                (shape_id, orientations.into_iter().collect())
            })
            .collect()
    }

    /// Get the shape catalogue.
    pub fn shapes(&self) -> &BTreeMap<usize, Polyomino> {
        &self.shapes
    }

    /// Get the distinct orientations used for a shape.
    pub fn orientations(&self, shape_id: usize) -> Option<&[Polyomino]> {
        self.orientations.get(&shape_id).map(Vec::as_slice)
    }

    /// Return the pieces a region requires, one per physical copy, in order
    /// of shape id.
    fn pieces(&self, region: &Region) -> Result<Vec<Polyomino>, PackError> {
        let mut pieces = Vec::new();

        for (&shape_id, &count) in region.required() {
            if count == 0 {
                continue;
            }

            match self.shapes.get(&shape_id) {
                Some(shape) => {
                    pieces.extend((0..count).map(|instance| shape.with_instance_id(instance)))
                }
                None if self.strict_shapes => return Err(PackError::UnknownShape { shape_id }),
                None => log::warn!(
                    "Region requires [{}] copies of unknown shape [{}], ignoring them.",
                    count,
                    shape_id
                ),
            }
        }

        Ok(pieces)
    }

    /// Total area of the pieces a region requires.
    pub fn required_area(&self, region: &Region) -> Result<usize, PackError> {
        Ok(self.pieces(region)?.iter().map(Polyomino::area).sum())
    }

    /// Encode a region as an exact cover problem, unless the required pieces
    /// cannot possibly fit by area.
    pub fn problem(&self, region: &Region) -> Result<PackOutcome, PackError> {
        let pieces = self.pieces(region)?;
        let needed: usize = pieces.iter().map(Polyomino::area).sum();

        if needed > region.area() {
            log::debug!(
                "Region {}x{} needs [{}] cells but only has [{}], skipping search.",
                region.width(),
                region.height(),
                needed,
                region.area()
            );
            return Ok(PackOutcome::TooLarge {
                needed,
                available: region.area(),
            });
        }

        let problem = PackingProblem::new(region.clone(), pieces, |shape_id| {
            self.orientations(shape_id).unwrap_or_default()
        });
        log::debug!(
            "Region {}x{} encoded with [{}] pieces and [{}] placements.",
            region.width(),
            region.height(),
            problem.pieces.len(),
            problem.possibilities.len()
        );

        Ok(PackOutcome::Problem(problem))
    }

    /// Return true if all required pieces fit in the region.
    pub fn can_pack(&self, region: &Region) -> Result<bool, PackError> {
        match self.problem(region)? {
            PackOutcome::TooLarge { .. } => Ok(false),
            PackOutcome::Problem(problem) => Ok(problem.matrix()?.has_solution()),
        }
    }

    /// Return the first packing found, or `None` if the pieces do not fit.
    pub fn find_packing(&self, region: &Region) -> Result<Option<Vec<Placement>>, PackError> {
        let problem = match self.problem(region)? {
            PackOutcome::TooLarge { .. } => return Ok(None),
            PackOutcome::Problem(problem) => problem,
        };

        let mut matrix = problem.matrix()?;
        let packing = matrix
            .solve_first()
            .map(|placements| placements.into_iter().cloned().collect());

        Ok(packing)
    }

    /// Call `visit` with every packing of the region until it returns
    /// [`ControlFlow::Break`], then return the search counters.
    pub fn for_each_packing<F>(&self, region: &Region, mut visit: F) -> Result<SearchStats, PackError>
    where
        F: FnMut(&[&Placement]) -> ControlFlow<()>,
    {
        let problem = match self.problem(region)? {
            PackOutcome::TooLarge { .. } => return Ok(SearchStats::default()),
            PackOutcome::Problem(problem) => problem,
        };

        let mut matrix = problem.matrix()?;
        let mut solver = matrix.solver();
        while let Some(packing) = solver.next() {
            if visit(&packing).is_break() {
                break;
            }
        }

        let stats = solver.stats();
        Ok(stats)
    }

    /// Return how many of the regions can fit all of their pieces.
    pub fn count_packable<'r>(
        &self,
        regions: impl IntoIterator<Item = &'r Region>,
    ) -> Result<usize, PackError> {
        let mut count = 0;

        for (index, region) in regions.into_iter().enumerate() {
            let packable = self.can_pack(region)?;
            log::info!(
                "Region {} ({}x{}): {}",
                index + 1,
                region.width(),
                region.height(),
                if packable { "can pack" } else { "cannot pack" }
            );

            if packable {
                count += 1;
            }
        }

        Ok(count)
    }
}

/// Draw a packing, labelling the pieces `A`, `B`, ... in the order given and
/// leaving uncovered cells as `.`.
///
/// Labels wrap back to `A` after `Z`, so the 27th piece shares a letter with
/// the first. Cells outside the region are not drawn.
pub fn render<'p>(region: &Region, placements: impl IntoIterator<Item = &'p Placement>) -> String {
    let mut grid = vec![vec!['.'; region.width()]; region.height()];

    for (index, placement) in placements.into_iter().enumerate() {
        let label = char::from(b'A' + (index % 26) as u8);
        for cell in placement.occupied_cells() {
            let (Ok(x), Ok(y)) = (usize::try_from(cell.x), usize::try_from(cell.y)) else {
                continue;
            };
            if let Some(slot) = grid.get_mut(y).and_then(|row| row.get_mut(x)) {
                *slot = label;
            }
        }
    }

    grid.into_iter()
        .map(|row| row.into_iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}
