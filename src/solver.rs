use crate::{
    indices::{ColumnId, NodeIndex},
    matrix::Links,
};

/// Counters describing the work a [`Solver`] has done so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Number of rows tried as part of a partial solution.
    pub nodes: u64,
    /// Number of solutions emitted.
    pub solutions: u64,
    /// Number of times the chosen column had no rows left.
    pub dead_ends: u64,
    /// Whether the search stopped because it hit the node limit.
    pub limit_reached: bool,
}

/// Solver that iteratively returns solutions to exact cover problems.
///
/// The search is Algorithm X driven by an explicit stack instead of
/// recursion, so it can pause after each solution and resume on the next
/// call. Dropping the solver, or calling [`reset`](Solver::reset), undoes every
/// pending cover in reverse order and leaves the matrix as it was found.
#[derive(Debug)]
pub struct Solver<'m, T> {
    links: &'m mut Links,
    rows: &'m [T],

    // Values used to track the state of solving
    partial_solution: Vec<NodeIndex>,
    stack: Vec<Frame>,
    state: SolverState,
    stats: SearchStats,
    node_limit: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SolverState {
    // Nothing has been chosen yet
    Fresh,
    Running,
    Exhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameState {
    // Before covering the current row
    Cover,
    // After checking, before uncovering
    Uncover,
}

#[derive(Debug)]
struct Frame {
    column: ColumnId,
    // Current node in the vertical ring of `column`
    node: NodeIndex,
    state: FrameState,
}

impl<'m, T> Solver<'m, T> {
    pub(crate) fn new(links: &'m mut Links, rows: &'m [T]) -> Self {
        Solver {
            links,
            rows,

            partial_solution: Vec::new(),
            stack: Vec::new(),
            state: SolverState::Fresh,
            stats: SearchStats::default(),
            node_limit: None,
        }
    }

    /// Stop the search once `limit` rows have been tried.
    ///
    /// When the limit is hit the solver unwinds and reports no further
    /// solutions, and [`SearchStats::limit_reached`] is set.
    pub fn with_node_limit(mut self, limit: u64) -> Self {
        self.node_limit = Some(limit);
        self
    }

    /// Return the counters accumulated since the solver was created or reset.
    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Undo all pending covers and restart the enumeration from scratch.
    pub fn reset(&mut self) {
        self.unwind();
        self.state = SolverState::Fresh;
        self.stats = SearchStats::default();
    }

    /// Return all remaining solutions.
    pub fn all_solutions(&mut self) -> Vec<Vec<&'m T>> {
        self.collect()
    }

    /// Compute up to the next solution, returning `None` if there are no more.
    pub fn next_solution(&mut self) -> Option<Vec<&'m T>> {
        match self.state {
            SolverState::Exhausted => return None,
            SolverState::Fresh => {
                self.state = SolverState::Running;
                // With no primary columns at all the empty selection is the
                // only solution.
                if self.descend() {
                    return Some(self.emit());
                }
            }
            SolverState::Running => {}
        }

        while let Some(frame) = self.stack.last_mut() {
            match frame.state {
                // For the current row of this frame, cover the other columns of the
                // row and add the row to the solution.
                FrameState::Cover => {
                    let (column, node) = (frame.column, frame.node);
                    if node == self.links.head(column) {
                        // Every row of this column was tried
                        self.stack.pop();
                        self.links.uncover(column);
                        continue;
                    }

                    if self
                        .node_limit
                        .is_some_and(|limit| self.stats.nodes >= limit)
                    {
                        log::debug!("Node limit reached after [{}] rows.", self.stats.nodes);
                        self.stats.limit_reached = true;
                        self.unwind();
                        self.state = SolverState::Exhausted;
                        return None;
                    }

                    frame.state = FrameState::Uncover;
                    self.partial_solution.push(node);
                    self.links.cover_row(node);
                    self.stats.nodes += 1;

                    // This is where the recursion happens
                    if self.descend() {
                        return Some(self.emit());
                    }
                }
                // Cleanup the current row, uncover its columns, remove the row from the
                // solution and move down to the next row.
                FrameState::Uncover => {
                    let node = frame.node;
                    frame.node = self.links.down(node);
                    frame.state = FrameState::Cover;

                    self.links.uncover_row(node);
                    self.partial_solution.pop();
                }
            }
        }

        self.state = SolverState::Exhausted;
        None
    }

    /// Pick the next column to branch on.
    ///
    /// Returns true if the current partial solution is complete. Otherwise
    /// either the column is empty and nothing happens, or the column is
    /// covered and a frame for it is pushed.
    fn descend(&mut self) -> bool {
        match self.links.choose_column() {
            None => true,
            Some(column) if self.links.size(column) == 0 => {
                log::trace!(
                    "Dead end at depth [{}], column {:?} is empty.",
                    self.partial_solution.len(),
                    column
                );
                self.stats.dead_ends += 1;
                false
            }
            Some(column) => {
                self.links.cover(column);
                self.stack.push(Frame {
                    column,
                    node: self.links.down(self.links.head(column)),
                    state: FrameState::Cover,
                });
                false
            }
        }
    }

    fn emit(&mut self) -> Vec<&'m T> {
        self.stats.solutions += 1;
        log::trace!(
            "Found solution #{} with [{}] rows.",
            self.stats.solutions,
            self.partial_solution.len()
        );

        let rows = self.rows;
        self.partial_solution
            .iter()
            .map(|&node| &rows[self.links.row_of(node).index()])
            .collect()
    }

    fn unwind(&mut self) {
        while let Some(frame) = self.stack.pop() {
            if frame.state == FrameState::Uncover {
                self.links.uncover_row(frame.node);
            }
            self.links.uncover(frame.column);
        }
        self.partial_solution.clear();
    }
}

impl<'m, T> Iterator for Solver<'m, T> {
    type Item = Vec<&'m T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_solution()
    }
}

impl<T> Drop for Solver<'_, T> {
    fn drop(&mut self) {
        // A panic mid-search may have broken the cover nesting already.
        if !std::thread::panicking() {
            self.unwind();
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{indices::ColumnId, Matrix};

    fn rows_of(solution: Vec<&&'static str>) -> Vec<&'static str> {
        let mut rows: Vec<&'static str> = solution.into_iter().copied().collect();
        rows.sort();
        rows
    }

    // Columns 1..=4 primary, row payloads name the columns they touch.
    fn small_matrix() -> Matrix<u8, &'static str> {
        let mut matrix = Matrix::new();
        for column in 1..=4 {
            matrix.add_column(column, true).unwrap();
        }
        for (columns, name) in [
            (&[1u8, 2][..], "12"),
            (&[3, 4][..], "34"),
            (&[1][..], "1"),
            (&[2, 3][..], "23"),
            (&[4][..], "4"),
            (&[1, 3][..], "13"),
        ] {
            matrix.add_row(columns, name).unwrap();
        }
        matrix
    }

    fn column_sizes<N, T>(matrix: &Matrix<N, T>) -> Vec<usize> {
        (0..matrix.num_columns())
            .map(|index| matrix.column_size(ColumnId::new(index)))
            .collect()
    }

    #[test]
    fn enumerates_all_solutions() {
        let mut matrix = small_matrix();
        let mut solutions: Vec<_> = matrix.solver().map(rows_of).collect();
        solutions.sort();

        assert_eq!(solutions, vec![vec!["1", "23", "4"], vec!["12", "34"]]);
    }

    #[test]
    fn empty_matrix_has_one_empty_solution() {
        let mut matrix: Matrix<u8, ()> = Matrix::new();
        let mut solver = matrix.solver();

        assert_eq!(solver.next(), Some(vec![]));
        assert_eq!(solver.next(), None);
        assert_eq!(solver.stats().solutions, 1);
    }

    #[test]
    fn only_secondary_columns_has_one_empty_solution() {
        let mut matrix = Matrix::new();
        matrix.add_column("cell", false).unwrap();
        matrix.add_row(["cell"], ()).unwrap();

        assert_eq!(matrix.count_solutions(), 1);
        assert_eq!(matrix.solve_first(), Some(vec![]));
    }

    #[test]
    fn empty_primary_column_is_a_dead_end() {
        let mut matrix = small_matrix();
        matrix.add_column(5, true).unwrap();

        let mut solver = matrix.solver();
        assert_eq!(solver.next(), None);
        assert_eq!(solver.stats().dead_ends, 1);
        assert_eq!(solver.stats().nodes, 0);
    }

    #[test]
    fn secondary_columns_are_covered_at_most_once() {
        let mut matrix = Matrix::new();
        matrix.add_column("a", true).unwrap();
        matrix.add_column("b", true).unwrap();
        matrix.add_column("shared", false).unwrap();
        matrix.add_row(["a", "shared"], "a+shared").unwrap();
        matrix.add_row(["b", "shared"], "b+shared").unwrap();
        matrix.add_row(["a"], "a").unwrap();
        matrix.add_row(["b"], "b").unwrap();

        let mut solutions: Vec<_> = matrix.solver().map(rows_of).collect();
        solutions.sort();

        assert_eq!(
            solutions,
            vec![
                vec!["a", "b"],
                vec!["a", "b+shared"],
                vec!["a+shared", "b"],
            ]
        );
    }

    #[test]
    fn early_drop_leaves_no_trace() {
        let mut matrix = small_matrix();
        let before = column_sizes(&matrix);

        {
            let mut solver = matrix.solver();
            assert!(solver.next().is_some());
            // Dropped while frames are still on the stack.
        }

        assert_eq!(column_sizes(&matrix), before);
        assert_eq!(matrix.uncovered_columns().count(), 4);
        assert_eq!(matrix.count_solutions(), 2);
    }

    #[test]
    fn reset_restarts_enumeration() {
        let mut matrix = small_matrix();
        let mut solver = matrix.solver();

        let first = solver.next().map(rows_of);
        assert!(solver.next().is_some());
        assert_eq!(solver.stats().solutions, 2);

        solver.reset();
        assert_eq!(solver.stats().solutions, 0);
        assert_eq!(solver.next().map(rows_of), first);
    }

    #[test]
    fn node_limit_stops_search() {
        let mut matrix = small_matrix();
        let before = column_sizes(&matrix);

        {
            let mut solver = matrix.solver().with_node_limit(1);
            while solver.next().is_some() {}
            assert!(solver.stats().limit_reached);
            assert_eq!(solver.stats().nodes, 1);
        }

        assert_eq!(column_sizes(&matrix), before);
    }

    #[test]
    fn exhausted_solver_keeps_returning_none() {
        let mut matrix = small_matrix();
        let mut solver = matrix.solver();

        assert_eq!(solver.by_ref().count(), 2);
        assert_eq!(solver.next(), None);
        assert!(!solver.stats().limit_reached);
    }
}
