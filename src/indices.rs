//! Index types into the arenas of a [`Matrix`](crate::Matrix).

/// The position of a column in a [`Matrix`](crate::Matrix).
///
/// Column ids are handed out by
/// [`Matrix::add_column`](crate::Matrix::add_column) in insertion order,
/// starting from zero.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ColumnId(usize);

impl ColumnId {
    pub(crate) const fn new(ix: usize) -> Self {
        Self(ix)
    }

    /// Returns the index value as a primitive type.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// The position of a row in a [`Matrix`](crate::Matrix).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct RowId(usize);

impl RowId {
    /// Placeholder stored in column header nodes, which belong to no row.
    pub(crate) const HEADER: RowId = RowId(usize::MAX);

    pub(crate) const fn new(ix: usize) -> Self {
        Self(ix)
    }

    /// Returns the index value as a primitive type.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// The position of a node in the link arena.
pub(crate) type NodeIndex = usize;
