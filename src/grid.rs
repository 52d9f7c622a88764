//! Grid of paper rolls and the erosion process that keeps stripping rolls
//! with too few neighbors until nothing more can be taken.

use std::fmt;
use std::io::{self, Write};

use log::{debug, trace};
use thiserror::Error;

pub const ROLL: u8 = b'@';
pub const EMPTY: u8 = b'.';
const MARKED: u8 = b'x';

#[rustfmt::skip]
pub const NEIGHBORS_8: [(isize, isize); 8] = [
    (-1, -1), (-1, 0), (-1, 1),
    ( 0, -1),          ( 0, 1),
    ( 1, -1), ( 1, 0), ( 1, 1),
];

/// `(row, column)`
pub type Cell = (usize, usize);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("row {row} has length {found} but the first row has length {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("row {row} has a non-ASCII symbol at byte {byte}; cells must be single ASCII characters")]
    NonAscii { row: usize, byte: usize },
}

/// Rectangular grid of single-byte symbols, stored row-major.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Grid {
    cells: Vec<u8>,
    width: usize,
    height: usize,
}

impl Grid {
    /// Builds a grid from puzzle text. Blank lines are skipped.
    pub fn parse(input: &str) -> Result<Self, GridError> {
        Self::from_rows(
            input
                .lines()
                .map(|line| line.trim_end_matches('\r'))
                .filter(|line| !line.trim().is_empty()),
        )
    }

    pub fn from_rows<I, R>(rows: I) -> Result<Self, GridError>
    where
        I: IntoIterator<Item = R>,
        R: AsRef<[u8]>,
    {
        let mut grid = Self::default();
        for (row, line) in rows.into_iter().enumerate() {
            let line = line.as_ref();
            if let Some(byte) = line.iter().position(|b| !b.is_ascii()) {
                return Err(GridError::NonAscii { row, byte });
            }
            if row == 0 {
                grid.width = line.len();
            } else if line.len() != grid.width {
                return Err(GridError::Ragged {
                    row,
                    expected: grid.width,
                    found: line.len(),
                });
            }
            grid.cells.extend_from_slice(line);
            grid.height += 1;
        }
        Ok(grid)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, (row, col): Cell) -> Option<u8> {
        (row < self.height && col < self.width).then(|| self.cells[row * self.width + col])
    }

    pub fn is_roll(&self, cell: Cell) -> bool {
        self.get(cell) == Some(ROLL)
    }

    pub fn roll_count(&self) -> usize {
        self.cells.iter().filter(|&&b| b == ROLL).count()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        // width is only 0 when there are no cells at all
        self.cells.chunks(self.width.max(1))
    }

    /// All roll cells in row-major order.
    pub fn rolls(&self) -> impl Iterator<Item = Cell> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &b)| b == ROLL)
            .map(|(i, _)| (i / self.width, i % self.width))
    }

    /// Number of rolls among the cells reachable through `rules.directions`.
    /// Positions off the edge of the grid count as empty.
    pub fn roll_neighbors(&self, (row, col): Cell, rules: &ErosionRules) -> usize {
        rules
            .directions
            .iter()
            .filter_map(|&(dr, dc)| Some((row.checked_add_signed(dr)?, col.checked_add_signed(dc)?)))
            .filter(|&cell| self.is_roll(cell))
            .count()
    }

    /// Empties every listed cell. The outcome does not depend on the order of `cells`.
    ///
    /// Panics if a cell lies outside the grid.
    pub fn clear_cells(&mut self, cells: &[Cell]) {
        for &(row, col) in cells {
            assert!(row < self.height && col < self.width, "cell {:?} outside grid", (row, col));
            self.cells[row * self.width + col] = EMPTY;
        }
    }

    /// Copy of the grid with the given rolls drawn as `x`.
    fn marked(&self, cells: &[Cell]) -> Grid {
        let mut marked = self.clone();
        for &(row, col) in cells {
            let cell = &mut marked.cells[row * self.width + col];
            if *cell == ROLL {
                *cell = MARKED;
            }
        }
        marked
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.rows().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            f.write_str(&String::from_utf8_lossy(row))?;
        }
        Ok(())
    }
}

/// When a roll counts as accessible: it has fewer than `threshold` rolls
/// among the neighbors listed in `directions`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ErosionRules {
    pub threshold: usize,
    pub directions: &'static [(isize, isize)],
}

impl ErosionRules {
    pub const DEFAULT: Self = Self {
        threshold: 4,
        directions: &NEIGHBORS_8,
    };

    fn is_accessible(&self, grid: &Grid, cell: Cell) -> bool {
        grid.roll_neighbors(cell, self) < self.threshold
    }
}

impl Default for ErosionRules {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Every accessible roll, judged against `grid` as it is right now.
pub fn accessible_rolls(grid: &Grid, rules: &ErosionRules) -> Vec<Cell> {
    grid.rolls().filter(|&cell| rules.is_accessible(grid, cell)).collect()
}

pub fn count_accessible_rolls(grid: &Grid) -> usize {
    count_accessible_rolls_with(grid, &ErosionRules::DEFAULT)
}

pub fn count_accessible_rolls_with(grid: &Grid, rules: &ErosionRules) -> usize {
    grid.rolls().filter(|&cell| rules.is_accessible(grid, cell)).count()
}

/// Hooks into [`simulate_with`]. Nothing an observer does changes the result.
pub trait RoundObserver {
    fn on_start(&mut self, _grid: &Grid) {}

    /// Called before `removals` are applied. `grid` is the state the round was computed from.
    fn on_round(&mut self, _round: usize, _grid: &Grid, _removals: &[Cell]) {}

    fn on_removed(&mut self, _round: usize, _grid: &Grid) {}

    fn on_fixed_point(&mut self, _grid: &Grid, _total_removed: usize) {}
}

impl RoundObserver for () {}

impl<F> RoundObserver for F
where
    F: FnMut(usize, &Grid, &[Cell]),
{
    fn on_round(&mut self, round: usize, grid: &Grid, removals: &[Cell]) {
        self(round, grid, removals)
    }
}

/// Outcome of an erosion run. The grid is left in its fixed-point state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Erosion {
    pub grid: Grid,
    pub removed: usize,
    /// Rounds that removed at least one roll.
    pub rounds: usize,
}

pub fn simulate(grid: Grid) -> Erosion {
    simulate_with(grid, &ErosionRules::DEFAULT, &mut ())
}

/// Removes accessible rolls round after round until a round finds none.
///
/// Each round's removal set is computed from the grid as it stood when the
/// round began, and only then applied as a whole.
pub fn simulate_with<O>(mut grid: Grid, rules: &ErosionRules, observer: &mut O) -> Erosion
where
    O: RoundObserver + ?Sized,
{
    observer.on_start(&grid);

    let mut removed = 0;
    let mut rounds = 0;
    loop {
        let removals = accessible_rolls(&grid, rules);
        if removals.is_empty() {
            break;
        }
        rounds += 1;
        debug!("round {rounds}: removing {} rolls", removals.len());
        trace!("round {rounds} removal set: {removals:?}");

        observer.on_round(rounds, &grid, &removals);
        grid.clear_cells(&removals);
        removed += removals.len();
        observer.on_removed(rounds, &grid);
    }

    debug!("fixed point after {rounds} rounds, {removed} rolls removed");
    observer.on_fixed_point(&grid, removed);
    Erosion {
        grid,
        removed,
        rounds,
    }
}

/// Writes every step of a simulation as text.
///
/// Printing stops at the first write error, which [`GridPrinter::finish`] reports.
pub struct GridPrinter<W> {
    out: W,
    error: Option<io::Error>,
}

impl<W: Write> GridPrinter<W> {
    pub fn new(out: W) -> Self {
        Self { out, error: None }
    }

    pub fn finish(mut self) -> io::Result<W> {
        match self.error.take() {
            Some(err) => Err(err),
            None => {
                self.out.flush()?;
                Ok(self.out)
            }
        }
    }

    fn emit(&mut self, write: impl FnOnce(&mut W) -> io::Result<()>) {
        if self.error.is_none() {
            if let Err(err) = write(&mut self.out) {
                self.error = Some(err);
            }
        }
    }
}

impl<W: Write> RoundObserver for GridPrinter<W> {
    fn on_start(&mut self, grid: &Grid) {
        self.emit(|out| writeln!(out, "Initial state:\n{grid}\n"));
    }

    fn on_round(&mut self, round: usize, grid: &Grid, removals: &[Cell]) {
        let marked = grid.marked(removals);
        self.emit(|out| {
            writeln!(
                out,
                "Round {round} (removing {} rolls):\n{marked}\n",
                removals.len()
            )
        });
    }

    fn on_removed(&mut self, _round: usize, grid: &Grid) {
        self.emit(|out| writeln!(out, "After removal:\n{grid}\n"));
    }

    fn on_fixed_point(&mut self, _grid: &Grid, _total_removed: usize) {
        self.emit(|out| writeln!(out, "No more removable rolls."));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use indoc::indoc;

    const EXAMPLE: &str = indoc! {"
        ..@@.@@@@.
        @@@.@.@.@@
        @@@@@.@.@@
        @.@@@@..@.
        @@.@@@@.@@
        .@@@@@@@.@
        .@.@.@.@@@
        @.@@@.@@@@
        .@@@@@@@@.
        @.@.@@@.@.
    "};

    #[test]
    fn parse_skips_blank_lines() {
        let grid = Grid::parse("\n@.@\r\n\n .. \n...\n\n").unwrap();
        assert_eq!((grid.height(), grid.width()), (3, 3));
        assert_eq!(grid.to_string(), "@.@\n .. \n...");
        assert_eq!(grid.roll_count(), 2);
    }

    #[test]
    fn parse_rejects_ragged_rows() {
        assert_eq!(
            Grid::parse("@@@\n@@\n@@@"),
            Err(GridError::Ragged {
                row: 1,
                expected: 3,
                found: 2
            })
        );
    }

    #[test]
    fn parse_rejects_multibyte_symbols() {
        // two characters but three bytes, so it must not pass as a 3-wide row
        assert_eq!(
            Grid::parse("é@\n@@@"),
            Err(GridError::NonAscii { row: 0, byte: 0 })
        );
        assert_eq!(
            Grid::parse("@@@\n.·."),
            Err(GridError::NonAscii { row: 1, byte: 1 })
        );
    }

    #[test]
    fn empty_input_is_an_empty_grid() {
        let grid = Grid::parse("\n\n").unwrap();
        assert!(grid.is_empty());
        assert_eq!(grid.rows().count(), 0);
        assert_eq!(count_accessible_rolls(&grid), 0);

        let erosion = simulate(grid);
        assert_eq!((erosion.removed, erosion.rounds), (0, 0));
    }

    #[test]
    fn neighbors_stop_at_the_edges() {
        let grid = Grid::parse("@@@\n@@@\n@@@").unwrap();
        let rules = ErosionRules::default();
        assert_eq!(grid.roll_neighbors((0, 0), &rules), 3);
        assert_eq!(grid.roll_neighbors((0, 1), &rules), 5);
        assert_eq!(grid.roll_neighbors((1, 1), &rules), 8);
        assert_eq!(grid.roll_neighbors((2, 2), &rules), 3);
    }

    #[test]
    fn example_single_pass() {
        let grid = Grid::parse(EXAMPLE).unwrap();
        assert_eq!(count_accessible_rolls(&grid), 13);
        assert_eq!(accessible_rolls(&grid, &ErosionRules::DEFAULT).len(), 13);
    }

    #[test]
    fn example_until_fixed_point() {
        let grid = Grid::parse(EXAMPLE).unwrap();
        let initial = grid.roll_count();
        let erosion = simulate(grid);
        assert_eq!(erosion.removed, 43);
        assert_eq!(erosion.grid.roll_count(), initial - 43);
        assert!(accessible_rolls(&erosion.grid, &ErosionRules::DEFAULT).is_empty());
    }

    #[test]
    fn full_block_erodes_from_the_corners() {
        let mut per_round = Vec::new();
        let erosion = simulate_with(
            Grid::parse("@@@\n@@@\n@@@").unwrap(),
            &ErosionRules::DEFAULT,
            &mut |round: usize, _: &Grid, removals: &[Cell]| per_round.push((round, removals.len())),
        );
        // corners first, then the edges once the corners are gone, then the lone center
        assert_eq!(per_round, [(1, 4), (2, 4), (3, 1)]);
        assert_eq!((erosion.removed, erosion.rounds), (9, 3));
    }

    #[test]
    fn stable_shapes_lose_nothing() {
        // every roll here already has at least 4 roll neighbors
        let octagon = Grid::parse(".@@.\n@@@@\n@@@@\n.@@.").unwrap();
        assert_eq!(count_accessible_rolls(&octagon), 0);
        let erosion = simulate(octagon.clone());
        assert_eq!((erosion.removed, erosion.rounds), (0, 0));
        assert_eq!(erosion.grid, octagon);

        let settled = simulate(Grid::parse(EXAMPLE).unwrap()).grid;
        let again = simulate(settled.clone());
        assert_eq!((again.removed, again.rounds), (0, 0));
        assert_eq!(again.grid, settled);
    }

    #[test]
    fn isolated_roll() {
        let erosion = simulate(Grid::parse("...\n.@.\n...").unwrap());
        assert_eq!((erosion.removed, erosion.rounds), (1, 1));
        assert_eq!(erosion.grid.roll_count(), 0);
    }

    #[test]
    fn single_row() {
        let erosion = simulate(Grid::parse("@@@@@@@").unwrap());
        assert_eq!((erosion.removed, erosion.rounds), (7, 1));
    }

    #[test]
    fn no_rolls_means_no_rounds() {
        let erosion = simulate(Grid::parse("....\n.xx.\n....").unwrap());
        assert_eq!((erosion.removed, erosion.rounds), (0, 0));
    }

    #[test]
    fn rounds_use_the_start_of_round_state() {
        // Clearing (0, 2) on the spot would leave (1, 2) with only 3 neighbors.
        let grid = Grid::parse("@@@\n@@@\n@@.").unwrap();
        let removals = accessible_rolls(&grid, &ErosionRules::DEFAULT);
        assert_eq!(removals, [(0, 0), (0, 2), (2, 0)]);
        assert!(!removals.contains(&(1, 2)));
    }

    #[test]
    fn custom_rules() {
        const ORTHOGONAL: [(isize, isize); 4] = [(-1, 0), (0, -1), (0, 1), (1, 0)];
        let rules = ErosionRules {
            threshold: 1,
            directions: &ORTHOGONAL,
        };
        let grid = Grid::parse("@.@\n.@.\n@@.").unwrap();
        assert_eq!(count_accessible_rolls_with(&grid, &rules), 2);
        assert_eq!(count_accessible_rolls(&grid), 5);

        let erosion = simulate_with(grid, &rules, &mut ());
        assert_eq!(erosion.grid.to_string(), "...\n.@.\n@@.");
        assert_eq!((erosion.removed, erosion.rounds), (2, 1));
    }

    #[test]
    fn printer_shows_every_round() {
        let mut printer = GridPrinter::new(Vec::new());
        let erosion = simulate_with(Grid::parse("@@.\n...").unwrap(), &ErosionRules::DEFAULT, &mut printer);
        assert_eq!(erosion.removed, 2);

        let out = String::from_utf8(printer.finish().unwrap()).unwrap();
        assert_eq!(
            out,
            indoc! {"
                Initial state:
                @@.
                ...

                Round 1 (removing 2 rolls):
                xx.
                ...

                After removal:
                ...
                ...

                No more removable rolls.
            "}
        );
    }

    #[test]
    fn printer_does_not_change_the_result() {
        let grid = Grid::parse(EXAMPLE).unwrap();
        let plain = simulate(grid.clone());
        let printed = simulate_with(grid, &ErosionRules::DEFAULT, &mut GridPrinter::new(io::sink()));
        assert_eq!(plain, printed);
    }
}
