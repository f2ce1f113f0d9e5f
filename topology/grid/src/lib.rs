#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Hex-offset board topology: storage, adjacency, placement and collapse.
//!
//! The board is a fixed `rows x columns` array of optional tokens indexed
//! with hex-offset coordinates: odd rows shift half a cell to the right, so
//! every interior cell touches six neighbors. Row zero is the ceiling; any
//! token transitively adjacent to an occupied ceiling cell is supported, and
//! everything else must be swept away after a mutation.

use std::collections::{HashSet, VecDeque};

use cascade_core::{
    rng::GameRng, GridPos, Palette, Position, Token, TokenColor, TopologyError,
};

/// Radius of a grid token in world units.
pub const TOKEN_RADIUS: f32 = 20.0;

/// Number of columns on a standard board.
pub const DEFAULT_COLUMNS: u32 = 8;

/// Number of rows on a standard board.
pub const DEFAULT_ROWS: u32 = 12;

/// Vertical distance between row centers, as a multiple of the token radius.
const ROW_PITCH: f32 = 1.7;

/// Probability that an opening-board cell receives a token.
const FILL_PROBABILITY: f32 = 0.8;

/// Neighbor offsets `(row, column)` for cells on odd rows.
const ODD_ROW_NEIGHBORS: [(i64, i64); 6] = [(-1, 0), (-1, 1), (0, -1), (0, 1), (1, 0), (1, 1)];

/// Neighbor offsets `(row, column)` for cells on even rows.
const EVEN_ROW_NEIGHBORS: [(i64, i64); 6] = [(-1, -1), (-1, 0), (0, -1), (0, 1), (1, -1), (1, 0)];

/// Fixed-size hex-offset board owning every committed token.
#[derive(Clone, Debug, PartialEq)]
pub struct HexBoard {
    columns: u32,
    rows: u32,
    cells: Vec<Option<Token>>,
}

impl HexBoard {
    /// Creates an empty board with the provided dimensions.
    #[must_use]
    pub fn new(columns: u32, rows: u32) -> Self {
        let capacity = columns as usize * rows as usize;
        Self {
            columns,
            rows,
            cells: vec![None; capacity],
        }
    }

    /// Number of columns contained in the board.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows contained in the board.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    fn index(&self, position: GridPos) -> Option<usize> {
        if position.row() < self.rows && position.column() < self.columns {
            Some(position.row() as usize * self.columns as usize + position.column() as usize)
        } else {
            None
        }
    }

    fn checked_index(&self, position: GridPos) -> Result<usize, TopologyError> {
        self.index(position)
            .ok_or(TopologyError::OutOfBounds(Position::Grid(position)))
    }

    /// Returns the token occupying the provided cell, if any.
    pub fn get(&self, position: GridPos) -> Result<Option<Token>, TopologyError> {
        Ok(self.cells[self.checked_index(position)?])
    }

    /// Stores or clears the token at the provided cell.
    pub fn set(&mut self, position: GridPos, token: Option<Token>) -> Result<(), TopologyError> {
        let index = self.checked_index(position)?;
        self.cells[index] = token;
        Ok(())
    }

    /// Enumerates every cell position in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = GridPos> + '_ {
        let columns = self.columns;
        (0..self.rows).flat_map(move |row| (0..columns).map(move |column| GridPos::new(row, column)))
    }

    /// Enumerates every occupied cell with its token, in row-major order.
    pub fn occupied(&self) -> impl Iterator<Item = (GridPos, Token)> + '_ {
        self.positions().filter_map(|position| {
            self.cells[self.index(position).unwrap_or_default()].map(|token| (position, token))
        })
    }

    /// Number of occupied cells.
    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    /// Reports whether the board holds no tokens at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    /// Distinct colors currently present on the board, in index order.
    #[must_use]
    pub fn active_colors(&self) -> Vec<TokenColor> {
        let mut colors: Vec<TokenColor> = self
            .cells
            .iter()
            .flatten()
            .map(|token| token.color())
            .collect();
        colors.sort_unstable();
        colors.dedup();
        colors
    }

    /// Returns the in-bounds neighbors of the provided cell.
    ///
    /// The offset table depends on row parity; enumeration order within a
    /// parity class is fixed, which keeps placement search deterministic.
    #[must_use]
    pub fn neighbors(&self, position: GridPos) -> Vec<GridPos> {
        let offsets = if position.row() % 2 == 1 {
            &ODD_ROW_NEIGHBORS
        } else {
            &EVEN_ROW_NEIGHBORS
        };
        offsets
            .iter()
            .filter_map(|(row_delta, column_delta)| {
                let row = i64::from(position.row()) + row_delta;
                let column = i64::from(position.column()) + column_delta;
                if row >= 0 && row < i64::from(self.rows) && column >= 0 && column < i64::from(self.columns)
                {
                    Some(GridPos::new(row as u32, column as u32))
                } else {
                    None
                }
            })
            .collect()
    }

    /// Center of the provided cell in world units.
    #[must_use]
    pub fn cell_center(&self, position: GridPos, radius: f32) -> (f32, f32) {
        let parity_offset = if position.row() % 2 == 1 { radius } else { 0.0 };
        let x = position.column() as f32 * radius * 2.0 + radius + parity_offset;
        let y = position.row() as f32 * radius * ROW_PITCH + radius;
        (x, y)
    }

    /// Reports whether a projectile centered at `(x, y)` touches any token.
    #[must_use]
    pub fn contacts_token(&self, x: f32, y: f32, radius: f32) -> bool {
        let contact_distance = radius * 2.0;
        self.occupied().any(|(position, _)| {
            let (cell_x, cell_y) = self.cell_center(position, radius);
            let dx = x - cell_x;
            let dy = y - cell_y;
            dx * dx + dy * dy < contact_distance * contact_distance
        })
    }

    /// Maps a projectile's terminal position to the nearest candidate cell.
    #[must_use]
    pub fn impact_cell(&self, x: f32, y: f32, radius: f32) -> GridPos {
        let row = ((y - radius) / (radius * ROW_PITCH)).round().max(0.0) as u32;
        let row = row.min(self.rows.saturating_sub(1));
        let parity_offset = if row % 2 == 1 { radius } else { 0.0 };
        let column = ((x - radius - parity_offset) / (radius * 2.0))
            .round()
            .max(0.0) as u32;
        let column = column.min(self.columns.saturating_sub(1));
        GridPos::new(row, column)
    }

    /// Finds the open cell closest to the candidate by breadth-first search.
    ///
    /// Hop count, not Euclidean distance, decides "closest"; ties break on
    /// the fixed neighbor enumeration order.
    pub fn nearest_open_cell(&self, candidate: GridPos) -> Result<GridPos, TopologyError> {
        let _ = self.checked_index(candidate)?;
        let mut queue = VecDeque::new();
        let mut visited = HashSet::new();
        queue.push_back(candidate);
        let _ = visited.insert(candidate);

        while let Some(position) = queue.pop_front() {
            if self.cells[self.checked_index(position)?].is_none() {
                return Ok(position);
            }
            for neighbor in self.neighbors(position) {
                if visited.insert(neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }

        Err(TopologyError::BoardFull)
    }

    /// Commits a projectile token at its terminal position.
    ///
    /// The continuous coordinates are snapped to a candidate cell and the
    /// token lands on the nearest open cell reachable from it.
    pub fn place(
        &mut self,
        x: f32,
        y: f32,
        radius: f32,
        token: Token,
    ) -> Result<GridPos, TopologyError> {
        let candidate = self.impact_cell(x, y, radius);
        let target = self.nearest_open_cell(candidate)?;
        self.set(target, Some(token))?;
        Ok(target)
    }

    /// Returns the maximal same-color region connected to the seed.
    ///
    /// The region always includes the seed when it is occupied; callers
    /// decide whether its size qualifies as a match.
    #[must_use]
    pub fn find_match(&self, seed: GridPos) -> Vec<GridPos> {
        let Some(seed_index) = self.index(seed) else {
            return Vec::new();
        };
        let Some(seed_token) = self.cells[seed_index] else {
            return Vec::new();
        };
        let color = seed_token.color();

        let mut region = Vec::new();
        let mut queue = VecDeque::new();
        let mut visited = HashSet::new();
        queue.push_back(seed);
        let _ = visited.insert(seed);

        while let Some(position) = queue.pop_front() {
            let index = match self.index(position) {
                Some(index) => index,
                None => continue,
            };
            match self.cells[index] {
                Some(token) if token.color() == color => {}
                _ => continue,
            }
            region.push(position);
            for neighbor in self.neighbors(position) {
                if visited.insert(neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }

        region
    }

    /// Removes the provided cells, ignoring ones that are already vacant.
    pub fn remove_all(&mut self, positions: &[GridPos]) -> Result<(), TopologyError> {
        for position in positions {
            self.set(*position, None)?;
        }
        Ok(())
    }

    /// Sweeps away every token no longer supported by the ceiling.
    ///
    /// Support ignores color entirely: a token survives when some path of
    /// occupied neighbors reaches an occupied cell on row zero. Removed
    /// positions are returned in row-major order. Calling this twice without
    /// an intervening mutation removes nothing the second time.
    pub fn collapse(&mut self) -> Vec<GridPos> {
        let mut supported = HashSet::new();
        let mut queue = VecDeque::new();

        for column in 0..self.columns {
            let position = GridPos::new(0, column);
            if let Some(index) = self.index(position) {
                if self.cells[index].is_some() && supported.insert(position) {
                    queue.push_back(position);
                }
            }
        }

        while let Some(position) = queue.pop_front() {
            for neighbor in self.neighbors(position) {
                if let Some(index) = self.index(neighbor) {
                    if self.cells[index].is_some() && supported.insert(neighbor) {
                        queue.push_back(neighbor);
                    }
                }
            }
        }

        let floating: Vec<GridPos> = self
            .positions()
            .filter(|position| {
                self.index(*position)
                    .map(|index| self.cells[index].is_some())
                    .unwrap_or(false)
                    && !supported.contains(position)
            })
            .collect();

        for position in &floating {
            if let Some(index) = self.index(*position) {
                self.cells[index] = None;
            }
        }

        floating
    }

    /// Reports whether any token occupies the forbidden bottom row.
    #[must_use]
    pub fn bottom_row_occupied(&self) -> bool {
        if self.rows == 0 {
            return false;
        }
        (0..self.columns).any(|column| {
            self.index(GridPos::new(self.rows - 1, column))
                .map(|index| self.cells[index].is_some())
                .unwrap_or(false)
        })
    }
}

/// Per-level tuning for the grid topology.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridLevel {
    /// Number of rows populated when the level opens.
    pub initial_rows: u32,
    /// Palette active for the level.
    pub palette: Palette,
}

impl GridLevel {
    /// Derives the tuning for the provided one-based level.
    #[must_use]
    pub fn for_level(level: u32) -> Self {
        let initial_rows = (5 + level / 3).min(8);
        let colors = (3 + level / 2).min(8) as u8;
        Self {
            initial_rows,
            palette: Palette::new(colors),
        }
    }
}

/// Generates the opening board for the provided level and seed.
#[must_use]
pub fn generate(level: u32, seed: u64) -> HexBoard {
    let tuning = GridLevel::for_level(level);
    let mut rng = GameRng::new(seed);
    let mut board = HexBoard::new(DEFAULT_COLUMNS, DEFAULT_ROWS);

    for row in 0..tuning.initial_rows.min(board.rows) {
        for column in 0..board.columns {
            if rng.next_f32() < FILL_PROBABILITY {
                let token = Token::plain(tuning.palette.sample(&mut rng));
                let index = board
                    .index(GridPos::new(row, column))
                    .unwrap_or_default();
                board.cells[index] = Some(token);
            }
        }
    }

    board
}
