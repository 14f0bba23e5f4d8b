//! Error types for every fallible operation in the crate.
//!
//! An infeasible packing is not an error: it is reported through normal
//! return values such as `false`, `None` or
//! [`PackOutcome::TooLarge`](crate::packing::PackOutcome::TooLarge).

use thiserror::Error;

/// Errors raised while building a polyomino.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolyominoError {
    /// The pattern or coordinate list contained no cells.
    #[error("shape {shape_id} has no cells")]
    Empty {
        /// The id the shape was going to receive.
        shape_id: usize,
    },
    /// The cells span more than `i32::MAX` columns or rows.
    #[error("shape {shape_id} is too large to normalize")]
    TooLarge {
        /// The id the shape was going to receive.
        shape_id: usize,
    },
}

/// Errors raised while building a [`Matrix`](crate::Matrix).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatrixError {
    /// A column with the same name already exists.
    #[error("duplicate column [{0}]")]
    DuplicateColumn(String),
    /// A row referenced a column that was never added.
    #[error("unknown column [{0}]")]
    UnknownColumn(String),
    /// A row referenced the same column more than once.
    #[error("column [{0}] appears more than once in a row")]
    RepeatedColumn(String),
    /// A row referenced no columns at all.
    #[error("rows must touch at least one column")]
    EmptyRow,
}

/// Errors raised by the [`Packer`](crate::Packer).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PackError {
    /// A region required a shape that is not in the catalogue, and the packer
    /// was configured to treat that as an error.
    #[error("region requires unknown shape {shape_id}")]
    UnknownShape {
        /// The missing shape id.
        shape_id: usize,
    },
    /// Two shapes in the catalogue share an id.
    #[error("shape {shape_id} appears more than once in the catalogue")]
    DuplicateShape {
        /// The repeated id.
        shape_id: usize,
    },
    /// Building the exact cover matrix failed.
    #[error(transparent)]
    Matrix(#[from] MatrixError),
}

/// Errors raised while reading the puzzle text format.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A line in the shape section was neither a header nor a pattern row.
    #[error("line {line}: expected a shape header like `3:`, found [{text}]")]
    InvalidShapeHeader {
        /// 1-based line number.
        line: usize,
        /// The offending line.
        text: String,
    },
    /// A shape header was followed by a pattern with no cells.
    #[error("line {line}: shape {shape_id} has no cells")]
    EmptyShape {
        /// 1-based line number of the header.
        line: usize,
        /// The id of the empty shape.
        shape_id: usize,
    },
    /// Two shapes were declared with the same id.
    #[error("line {line}: shape {shape_id} is declared twice")]
    DuplicateShape {
        /// 1-based line number of the second header.
        line: usize,
        /// The repeated id.
        shape_id: usize,
    },
    /// A region line did not match `WIDTHxHEIGHT: counts`.
    #[error("line {line}: expected a region like `12x5: 1 0 2`, found [{text}]")]
    InvalidRegion {
        /// 1-based line number.
        line: usize,
        /// The offending line.
        text: String,
    },
    /// A count on a region line was not a non-negative integer.
    #[error("line {line}: invalid piece count [{token}]")]
    InvalidCount {
        /// 1-based line number.
        line: usize,
        /// The token that failed to parse.
        token: String,
    },
    /// A region had zero width or height.
    #[error("line {line}: region dimensions must be positive")]
    ZeroDimension {
        /// 1-based line number.
        line: usize,
    },
}
