#![deny(missing_docs)]

//! Pack [polyominoes](https://en.wikipedia.org/wiki/Polyomino) into
//! rectangular regions by reducing each region to an
//! [exact cover](https://en.wikipedia.org/wiki/Exact_cover) problem and
//! searching it with [Dancing Links](https://en.wikipedia.org/wiki/Dancing_Links)
//! and [Algorithm X](https://en.wikipedia.org/wiki/Knuth%27s_Algorithm_X).
//!
//! ```
//! use polyomino_packing::{Packer, Polyomino, Region};
//!
//! let domino = Polyomino::from_pattern("##", 0).unwrap();
//! let packer = Packer::new([domino]).unwrap();
//!
//! assert_eq!(packer.can_pack(&Region::from_counts(2, 3, &[3])), Ok(true));
//! assert_eq!(packer.can_pack(&Region::from_counts(3, 3, &[5])), Ok(false));
//! ```

pub mod error;
pub mod indices;
pub mod matrix;
pub mod packing;
pub mod parse;
pub mod polyomino;
pub(crate) mod solver;

pub use error::{MatrixError, PackError, ParseError, PolyominoError};
pub use indices::{ColumnId, RowId};
pub use matrix::Matrix;
pub use packing::{PackOutcome, Packer, Placement, Region};
pub use parse::{parse_input, Puzzle};
pub use polyomino::{Coord, Polyomino, ShapeTransform};
pub use solver::{SearchStats, Solver};

use core::{fmt::Debug, hash::Hash};

/// An instance of an exact cover problem.
pub trait ExactCover {
    /// The type of values that are elements of a solution to the exact cover
    /// problem.
    type Possibility: Debug + Clone;

    /// The type of value that are constraints on a given instance of an exact
    /// cover problem.
    type Constraint: Debug + Clone + Eq + Hash;

    /// Return every `Constraint` that the given `Possibility` satisfies.
    fn satisfied_constraints(&self, poss: &Self::Possibility) -> Vec<Self::Constraint>;

    /// Return true if the given `Constraint` is optional.
    fn is_optional(&self, cons: &Self::Constraint) -> bool;

    /// Return a list of possibilities for this instance of the problem.
    fn possibilities(&self) -> &[Self::Possibility];

    /// Return a list of constraints that must be satisfied for this instance of
    /// the problem.
    fn constraints(&self) -> &[Self::Constraint];

    /// Build the dancing links matrix for this instance, with one column per
    /// constraint and one row per possibility, both in the order listed.
    fn matrix(&self) -> Result<Matrix<Self::Constraint, Self::Possibility>, MatrixError> {
        let mut matrix = Matrix::new();

        for cons in self.constraints() {
            matrix.add_column(cons.clone(), !self.is_optional(cons))?;
        }
        for poss in self.possibilities() {
            matrix.add_row(self.satisfied_constraints(poss), poss.clone())?;
        }

        log::trace!(
            "Built matrix with [{}] columns and [{}] rows.",
            matrix.num_columns(),
            matrix.num_rows()
        );

        Ok(matrix)
    }
}

impl<E> ExactCover for &E
where
    E: ExactCover,
{
    type Constraint = E::Constraint;
    type Possibility = E::Possibility;

    fn satisfied_constraints(&self, poss: &Self::Possibility) -> Vec<Self::Constraint> {
        <E as ExactCover>::satisfied_constraints(self, poss)
    }

    fn is_optional(&self, cons: &Self::Constraint) -> bool {
        <E as ExactCover>::is_optional(self, cons)
    }

    fn possibilities(&self) -> &[Self::Possibility] {
        <E as ExactCover>::possibilities(self)
    }

    fn constraints(&self) -> &[Self::Constraint] {
        <E as ExactCover>::constraints(self)
    }
}
