//! Sparse exact cover matrix using the dancing links representation.
//!
//! Every node lives in a single arena and refers to its four neighbours by
//! index, so the toroidal structure never needs raw pointers or reference
//! counting. Column headers are nodes too; their horizontal links form the
//! ring of uncovered columns rooted at the node at index [`ROOT`].

use crate::{
    indices::{ColumnId, NodeIndex, RowId},
    solver::Solver,
    MatrixError,
};
use std::{borrow::Borrow, collections::HashMap, fmt::Debug, hash::Hash, iter};

/// Position of the root header in the node arena.
pub(crate) const ROOT: NodeIndex = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Node {
    left: NodeIndex,
    right: NodeIndex,
    up: NodeIndex,
    down: NodeIndex,
    column: ColumnId,
    row: RowId,
}

impl Node {
    fn self_ref(index: NodeIndex, column: ColumnId, row: RowId) -> Self {
        Node {
            left: index,
            right: index,
            up: index,
            down: index,
            column,
            row,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ColumnHeader {
    head: NodeIndex,
    size: usize,
    primary: bool,
    covered: bool,
}

/// The link structure of a [`Matrix`], without names or payloads.
///
/// This is the part of the matrix that Algorithm X mutates, kept separate so
/// a [`Solver`] can hold it mutably while handing out references to payloads.
#[derive(Debug, Clone)]
pub(crate) struct Links {
    nodes: Vec<Node>,
    columns: Vec<ColumnHeader>,
    row_heads: Vec<NodeIndex>,
    covers: Vec<ColumnId>,
}

impl Links {
    fn new() -> Self {
        // The root belongs to no column and no row.
        let root = Node::self_ref(ROOT, ColumnId::new(usize::MAX), RowId::HEADER);

        Links {
            nodes: vec![root],
            columns: Vec::new(),
            row_heads: Vec::new(),
            covers: Vec::new(),
        }
    }

    fn add_column(&mut self, primary: bool) -> ColumnId {
        let column = ColumnId::new(self.columns.len());
        let head = self.nodes.len();

        let mut node = Node::self_ref(head, column, RowId::HEADER);
        // Insert at the end of the header ring, just left of the root.
        node.left = self.nodes[ROOT].left;
        node.right = ROOT;
        self.nodes.push(node);

        let last = self.nodes[ROOT].left;
        self.nodes[last].right = head;
        self.nodes[ROOT].left = head;

        self.columns.push(ColumnHeader {
            head,
            size: 0,
            primary,
            covered: false,
        });

        column
    }

    fn add_row(&mut self, columns: &[ColumnId]) -> RowId {
        debug_assert!(!columns.is_empty());

        let row = RowId::new(self.row_heads.len());
        let first = self.nodes.len();

        for (offset, &column) in columns.iter().enumerate() {
            let index = first + offset;
            let head = self.columns[column.index()].head;

            let mut node = Node::self_ref(index, column, row);
            // Vertical: insert at the bottom of the column, just above the header.
            node.up = self.nodes[head].up;
            node.down = head;
            // Horizontal: link to the previously inserted node, and close the
            // ring back to the first node of the row.
            if offset > 0 {
                node.left = index - 1;
                node.right = first;
            }
            self.nodes.push(node);

            let above = self.nodes[head].up;
            self.nodes[above].down = index;
            self.nodes[head].up = index;
            if offset > 0 {
                self.nodes[index - 1].right = index;
                self.nodes[first].left = index;
            }

            self.columns[column.index()].size += 1;
        }

        self.row_heads.push(first);
        row
    }

    pub(crate) fn head(&self, column: ColumnId) -> NodeIndex {
        self.columns[column.index()].head
    }

    pub(crate) fn size(&self, column: ColumnId) -> usize {
        self.columns[column.index()].size
    }

    pub(crate) fn is_primary(&self, column: ColumnId) -> bool {
        self.columns[column.index()].primary
    }

    pub(crate) fn down(&self, node: NodeIndex) -> NodeIndex {
        self.nodes[node].down
    }

    pub(crate) fn row_of(&self, node: NodeIndex) -> RowId {
        self.nodes[node].row
    }

    pub(crate) fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub(crate) fn num_rows(&self) -> usize {
        self.row_heads.len()
    }

    fn ring(&self, origin: NodeIndex, step: fn(&Node) -> NodeIndex) -> Ring<'_> {
        Ring {
            nodes: &self.nodes,
            origin,
            current: origin,
            step,
        }
    }

    pub(crate) fn uncovered_columns(&self) -> impl Iterator<Item = ColumnId> + '_ {
        self.ring(ROOT, |node| node.right)
            .map(move |index| self.nodes[index].column)
    }

    fn unlink_horizontal(&mut self, index: NodeIndex) {
        let Node { left, right, .. } = self.nodes[index];
        self.nodes[left].right = right;
        self.nodes[right].left = left;
    }

    fn relink_horizontal(&mut self, index: NodeIndex) {
        let Node { left, right, .. } = self.nodes[index];
        self.nodes[left].right = index;
        self.nodes[right].left = index;
    }

    fn unlink_vertical(&mut self, index: NodeIndex) {
        let Node { up, down, .. } = self.nodes[index];
        self.nodes[up].down = down;
        self.nodes[down].up = up;
    }

    fn relink_vertical(&mut self, index: NodeIndex) {
        let Node { up, down, .. } = self.nodes[index];
        self.nodes[up].down = index;
        self.nodes[down].up = index;
    }

    /// Cover a column, and remove every row that appears in it from all other
    /// columns.
    ///
    /// # Panics
    ///
    /// Panics if the column is already covered.
    pub(crate) fn cover(&mut self, column: ColumnId) {
        let header = &mut self.columns[column.index()];
        assert!(!header.covered, "column {column:?} is already covered");
        header.covered = true;

        let head = header.head;
        self.unlink_horizontal(head);

        let mut row_node = self.nodes[head].down;
        while row_node != head {
            let mut node = self.nodes[row_node].right;
            while node != row_node {
                self.unlink_vertical(node);
                let other = self.nodes[node].column;
                self.columns[other.index()].size -= 1;

                node = self.nodes[node].right;
            }

            row_node = self.nodes[row_node].down;
        }

        self.covers.push(column);
    }

    /// Undo the most recent [`cover`](Links::cover), which must have been of
    /// the same column.
    ///
    /// # Panics
    ///
    /// Panics if `column` is not the most recently covered column.
    pub(crate) fn uncover(&mut self, column: ColumnId) {
        match self.covers.last() {
            Some(&last) if last == column => {
                self.covers.pop();
            }
            last => panic!(
                "mismatched uncover of column {column:?}, last covered column is {last:?}"
            ),
        }

        let head = self.columns[column.index()].head;

        let mut row_node = self.nodes[head].up;
        while row_node != head {
            let mut node = self.nodes[row_node].left;
            while node != row_node {
                let other = self.nodes[node].column;
                self.columns[other.index()].size += 1;
                self.relink_vertical(node);

                node = self.nodes[node].left;
            }

            row_node = self.nodes[row_node].up;
        }

        self.relink_horizontal(head);
        self.columns[column.index()].covered = false;
    }

    /// Cover every column of the row containing `node`, except the column of
    /// `node` itself, walking to the right.
    pub(crate) fn cover_row(&mut self, node: NodeIndex) {
        let mut current = self.nodes[node].right;
        while current != node {
            let column = self.nodes[current].column;
            self.cover(column);
            current = self.nodes[current].right;
        }
    }

    /// Mirror of [`cover_row`](Links::cover_row), walking to the left.
    pub(crate) fn uncover_row(&mut self, node: NodeIndex) {
        let mut current = self.nodes[node].left;
        while current != node {
            let column = self.nodes[current].column;
            self.uncover(column);
            current = self.nodes[current].left;
        }
    }

    /// Return the uncovered primary column with the fewest rows, preferring
    /// the earliest one in ring order on ties.
    pub(crate) fn choose_column(&self) -> Option<ColumnId> {
        let mut best: Option<(ColumnId, usize)> = None;

        for column in self.uncovered_columns() {
            let ColumnHeader { size, primary, .. } = self.columns[column.index()];
            if primary && best.map_or(true, |(_, best_size)| size < best_size) {
                best = Some((column, size));
                if size == 0 {
                    break;
                }
            }
        }

        best.map(|(column, _)| column)
    }
}

/// Iterator over one of the circular lists of the matrix, excluding the node
/// it started from.
struct Ring<'a> {
    nodes: &'a [Node],
    origin: NodeIndex,
    current: NodeIndex,
    step: fn(&Node) -> NodeIndex,
}

impl Iterator for Ring<'_> {
    type Item = NodeIndex;

    fn next(&mut self) -> Option<Self::Item> {
        let next = (self.step)(&self.nodes[self.current]);
        if next == self.origin {
            None
        } else {
            self.current = next;
            Some(next)
        }
    }
}

/// A sparse exact cover matrix.
///
/// Columns are constraints identified by a name of type `N`. Primary columns
/// must be covered exactly once by a solution, secondary columns at most once.
/// Rows are candidate elements of a solution and carry a payload of type `T`,
/// which is what a [`Solver`] hands back for every selected row.
#[derive(Debug, Clone)]
pub struct Matrix<N, T> {
    links: Links,
    names: Vec<N>,
    by_name: HashMap<N, ColumnId>,
    rows: Vec<T>,
}

impl<N, T> Default for Matrix<N, T>
where
    N: Debug + Clone + Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<N, T> Matrix<N, T>
where
    N: Debug + Clone + Eq + Hash,
{
    /// Create an empty matrix.
    pub fn new() -> Self {
        Matrix {
            links: Links::new(),
            names: Vec::new(),
            by_name: HashMap::new(),
            rows: Vec::new(),
        }
    }

    /// Append a new column at the end of the column ring.
    pub fn add_column(&mut self, name: N, primary: bool) -> Result<ColumnId, MatrixError> {
        if self.by_name.contains_key(&name) {
            return Err(MatrixError::DuplicateColumn(format!("{name:?}")));
        }

        let column = self.links.add_column(primary);
        self.names.push(name.clone());
        self.by_name.insert(name, column);

        Ok(column)
    }

    /// Add a row that touches each of the named columns, keeping `payload`
    /// to report when the row is part of a solution.
    ///
    /// The row's nodes are linked left to right in the order the names are
    /// given.
    pub fn add_row<I>(&mut self, column_names: I, payload: T) -> Result<RowId, MatrixError>
    where
        I: IntoIterator,
        I::Item: Borrow<N>,
    {
        let mut columns = Vec::new();
        for name in column_names {
            let name = name.borrow();
            let column = *self
                .by_name
                .get(name)
                .ok_or_else(|| MatrixError::UnknownColumn(format!("{name:?}")))?;
            if columns.contains(&column) {
                return Err(MatrixError::RepeatedColumn(format!("{name:?}")));
            }
            columns.push(column);
        }

        if columns.is_empty() {
            return Err(MatrixError::EmptyRow);
        }

        let row = self.links.add_row(&columns);
        self.rows.push(payload);

        Ok(row)
    }

    /// Return the id of the column with the given name.
    pub fn column(&self, name: &N) -> Option<ColumnId> {
        self.by_name.get(name).copied()
    }
}

impl<N, T> Matrix<N, T> {
    /// Return the name a column was created with.
    pub fn column_name(&self, column: ColumnId) -> &N {
        &self.names[column.index()]
    }

    /// Return true if the column must be covered exactly once.
    pub fn is_primary(&self, column: ColumnId) -> bool {
        self.links.is_primary(column)
    }

    /// Return the number of rows currently linked into the column.
    pub fn column_size(&self, column: ColumnId) -> usize {
        self.links.size(column)
    }

    /// Return the number of columns ever added.
    pub fn num_columns(&self) -> usize {
        self.links.num_columns()
    }

    /// Return the number of rows ever added.
    pub fn num_rows(&self) -> usize {
        self.links.num_rows()
    }

    /// Return the payload stored with a row.
    pub fn payload(&self, row: RowId) -> &T {
        &self.rows[row.index()]
    }

    /// Return an iterator over the columns that are not covered, in the order
    /// they were added.
    pub fn uncovered_columns(&self) -> impl Iterator<Item = ColumnId> + '_ {
        self.links.uncovered_columns()
    }

    /// Return an iterator over the rows still linked into the column, top to
    /// bottom.
    pub fn rows_in_column(&self, column: ColumnId) -> impl Iterator<Item = RowId> + '_ {
        let links = &self.links;
        links
            .ring(links.head(column), |node| node.down)
            .map(move |index| links.row_of(index))
    }

    /// Return the columns touched by a row, in the order they were given to
    /// [`add_row`](Matrix::add_row).
    pub fn columns_in_row(&self, row: RowId) -> impl Iterator<Item = ColumnId> + '_ {
        let links = &self.links;
        let first = links.row_heads[row.index()];
        iter::once(first)
            .chain(links.ring(first, |node| node.right))
            .map(move |index| links.nodes[index].column)
    }

    /// Cover entire column, and any rows that that appear in this column.
    ///
    /// # Panics
    ///
    /// Panics if the column is already covered.
    pub fn cover(&mut self, column: ColumnId) {
        self.links.cover(column)
    }

    /// Uncover entire column, and any rows that appear in this column.
    ///
    /// Covers must be undone in the reverse order they were made.
    ///
    /// # Panics
    ///
    /// Panics if `column` is not the most recently covered column that is
    /// still covered.
    pub fn uncover(&mut self, column: ColumnId) {
        self.links.uncover(column)
    }

    /// Select the uncovered primary column with the least number of rows.
    ///
    /// Returns `None` when no primary column is left, which means the current
    /// selection of rows is a complete solution.
    pub fn choose_column(&self) -> Option<ColumnId> {
        self.links.choose_column()
    }

    /// Return an iterator over all solutions of this matrix.
    ///
    /// The matrix is restored to its current state once the solver is
    /// dropped, whether or not it was run to completion.
    pub fn solver(&mut self) -> Solver<'_, T> {
        log::debug!(
            "Starting search over [{}] columns and [{}] rows.",
            self.links.num_columns(),
            self.rows.len()
        );

        Solver::new(&mut self.links, &self.rows)
    }

    /// Return the first solution, if there is one.
    pub fn solve_first(&mut self) -> Option<Vec<&T>> {
        let mut solver = self.solver();
        solver.next()
    }

    /// Return true if the matrix has at least one exact cover.
    pub fn has_solution(&mut self) -> bool {
        self.solver().next().is_some()
    }

    /// Return the number of exact covers of the matrix.
    pub fn count_solutions(&mut self) -> usize {
        self.solver().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Snapshot = (Vec<ColumnId>, Vec<(usize, Vec<RowId>)>);

    fn snapshot<N, T>(matrix: &Matrix<N, T>) -> Snapshot {
        let columns = (0..matrix.num_columns())
            .map(ColumnId::new)
            .map(|column| {
                (
                    matrix.column_size(column),
                    matrix.rows_in_column(column).collect(),
                )
            })
            .collect();

        (matrix.uncovered_columns().collect(), columns)
    }

    // Knuth's example from "Dancing Links", columns A through G.
    fn knuth_matrix() -> Matrix<char, usize> {
        let mut matrix = Matrix::new();
        for name in ['A', 'B', 'C', 'D', 'E', 'F', 'G'] {
            matrix.add_column(name, true).unwrap();
        }

        let rows: [&[char]; 6] = [
            &['C', 'E', 'F'],
            &['A', 'D', 'G'],
            &['B', 'C', 'F'],
            &['A', 'D'],
            &['B', 'G'],
            &['D', 'E', 'G'],
        ];
        for (index, row) in rows.into_iter().enumerate() {
            matrix.add_row(row, index + 1).unwrap();
        }

        matrix
    }

    #[test]
    fn add_column_links_into_ring_in_order() {
        let mut matrix: Matrix<&str, ()> = Matrix::new();
        let a = matrix.add_column("a", true).unwrap();
        let b = matrix.add_column("b", false).unwrap();

        assert_eq!(matrix.uncovered_columns().collect::<Vec<_>>(), vec![a, b]);
        assert!(matrix.is_primary(a));
        assert!(!matrix.is_primary(b));
        assert_eq!(matrix.column(&"b"), Some(b));
        assert_eq!(*matrix.column_name(a), "a");
    }

    #[test]
    fn add_row_updates_sizes_and_rings() {
        let matrix = knuth_matrix();
        let d = matrix.column(&'D').unwrap();

        assert_eq!(matrix.num_rows(), 6);
        assert_eq!(matrix.column_size(d), 3);
        assert_eq!(
            matrix.rows_in_column(d).collect::<Vec<_>>(),
            vec![RowId::new(1), RowId::new(3), RowId::new(5)]
        );
        assert_eq!(
            matrix
                .columns_in_row(RowId::new(5))
                .map(|column| *matrix.column_name(column))
                .collect::<String>(),
            "DEG"
        );
    }

    #[test]
    fn add_row_rejects_bad_input() {
        let mut matrix = knuth_matrix();

        assert_eq!(
            matrix.add_row(['A', 'Z'], 0),
            Err(MatrixError::UnknownColumn("'Z'".to_string()))
        );
        assert_eq!(
            matrix.add_row(['A', 'A'], 0),
            Err(MatrixError::RepeatedColumn("'A'".to_string()))
        );
        assert_eq!(
            matrix.add_row(Vec::<char>::new(), 0),
            Err(MatrixError::EmptyRow)
        );
        assert_eq!(
            matrix.add_column('A', true),
            Err(MatrixError::DuplicateColumn("'A'".to_string()))
        );
        // Failed inserts leave nothing behind.
        assert_eq!(matrix.num_rows(), 6);
    }

    #[test]
    fn single_node_row_links_to_itself() {
        let mut matrix: Matrix<u8, ()> = Matrix::new();
        let column = matrix.add_column(0, true).unwrap();
        let row = matrix.add_row([0], ()).unwrap();

        assert_eq!(matrix.columns_in_row(row).collect::<Vec<_>>(), vec![column]);
        assert_eq!(matrix.rows_in_column(column).collect::<Vec<_>>(), vec![row]);
    }

    #[test]
    fn cover_removes_conflicting_rows() {
        let mut matrix = knuth_matrix();
        let a = matrix.column(&'A').unwrap();
        let d = matrix.column(&'D').unwrap();
        let g = matrix.column(&'G').unwrap();

        matrix.cover(a);

        assert!(!matrix.uncovered_columns().any(|column| column == a));
        // Rows 2 (A D G) and 4 (A D) are gone from D.
        assert_eq!(matrix.column_size(d), 1);
        assert_eq!(matrix.column_size(g), 2);

        matrix.uncover(a);
        assert_eq!(matrix.column_size(d), 3);
        assert_eq!(matrix.column_size(g), 3);
    }

    #[test]
    fn cover_uncover_restores_everything() {
        let mut matrix = knuth_matrix();
        let before = snapshot(&matrix);

        for column in (0..matrix.num_columns()).map(ColumnId::new) {
            matrix.cover(column);
            matrix.uncover(column);
            assert_eq!(snapshot(&matrix), before);
        }

        let a = matrix.column(&'A').unwrap();
        let e = matrix.column(&'E').unwrap();
        matrix.cover(a);
        matrix.cover(e);
        matrix.uncover(e);
        matrix.uncover(a);
        assert_eq!(snapshot(&matrix), before);
    }

    #[test]
    #[should_panic(expected = "is already covered")]
    fn double_cover_panics() {
        let mut matrix = knuth_matrix();
        let a = matrix.column(&'A').unwrap();
        matrix.cover(a);
        matrix.cover(a);
    }

    #[test]
    #[should_panic(expected = "mismatched uncover")]
    fn out_of_order_uncover_panics() {
        let mut matrix = knuth_matrix();
        let a = matrix.column(&'A').unwrap();
        let b = matrix.column(&'B').unwrap();
        matrix.cover(a);
        matrix.cover(b);
        matrix.uncover(a);
    }

    #[test]
    #[should_panic(expected = "mismatched uncover")]
    fn uncover_without_cover_panics() {
        let mut matrix = knuth_matrix();
        let a = matrix.column(&'A').unwrap();
        matrix.uncover(a);
    }

    #[test]
    fn choose_column_prefers_smallest_primary() {
        let mut matrix: Matrix<&str, ()> = Matrix::new();
        matrix.add_column("wide", true).unwrap();
        let narrow = matrix.add_column("narrow", true).unwrap();
        let tie = matrix.add_column("tie", true).unwrap();
        let secondary = matrix.add_column("secondary", false).unwrap();

        matrix.add_row(["wide", "narrow"], ()).unwrap();
        matrix.add_row(["wide", "tie"], ()).unwrap();
        matrix.add_row(["wide", "secondary"], ()).unwrap();

        assert_eq!(matrix.column_size(secondary), 1);
        // `narrow` and `tie` both have one row, ring order decides.
        assert_eq!(matrix.choose_column(), Some(narrow));

        matrix.cover(narrow);
        assert_eq!(matrix.choose_column(), Some(tie));
        matrix.uncover(narrow);
    }

    #[test]
    fn choose_column_ignores_secondary_columns() {
        let mut matrix: Matrix<&str, ()> = Matrix::new();
        matrix.add_column("cell", false).unwrap();

        assert_eq!(matrix.choose_column(), None);
    }

    #[test]
    fn solve_knuth_example() {
        let mut matrix = knuth_matrix();
        let before = snapshot(&matrix);

        let mut solution: Vec<usize> = matrix
            .solve_first()
            .unwrap()
            .into_iter()
            .copied()
            .collect();
        solution.sort();

        assert_eq!(solution, vec![1, 4, 5]);
        assert_eq!(matrix.count_solutions(), 1);
        assert_eq!(snapshot(&matrix), before);
    }
}
