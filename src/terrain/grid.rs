//! Terrain grid of `(height, density)` cells

use std::{io::Write, path::Path};

use serde::{Deserialize, Serialize};

use crate::{Error, Result, types::StateId};

/// One cell of the mountain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cell {
    /// Terrain height
    pub height: u32,
    /// Obstacle density (0-3)
    pub density: u8,
}

impl Cell {
    pub fn new(height: u32, density: u8) -> Self {
        Self { height, density }
    }
}

/// Row used by the terrain CSV export
#[derive(Debug, Serialize)]
struct CellRow {
    row: usize,
    column: usize,
    height: u32,
    density: u8,
}

/// Maxima over the grid, used to scale heat maps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainSummary {
    pub max_height: u32,
    pub max_density: u8,
}

/// Immutable rectangular grid of cells, stored row-major.
///
/// Construction only checks that the grid is non-empty and rectangular. The dataset
/// builder additionally requires it to be square.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainGrid {
    rows: usize,
    columns: usize,
    cells: Vec<Cell>,
}

impl TerrainGrid {
    /// Build a grid from nested rows.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSize`] for an empty grid or ragged rows.
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Result<Self> {
        let row_count = rows.len();
        let columns = rows.first().map_or(0, Vec::len);
        if row_count == 0 || columns == 0 {
            return Err(Error::InvalidSize {
                rows: row_count,
                columns,
            });
        }
        if let Some(ragged) = rows.iter().find(|row| row.len() != columns) {
            return Err(Error::InvalidSize {
                rows: row_count,
                columns: ragged.len(),
            });
        }
        Ok(Self {
            rows: row_count,
            columns,
            cells: rows.into_iter().flatten().collect(),
        })
    }

    /// A `size x size` grid where every cell is `cell`
    pub fn uniform(size: usize, cell: Cell) -> Result<Self> {
        Self::from_rows(vec![vec![cell; size]; size])
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.columns
    }

    pub fn num_states(&self) -> usize {
        self.cells.len()
    }

    /// Cell at `(row, column)`, if inside the grid
    pub fn get(&self, row: usize, column: usize) -> Option<Cell> {
        if row < self.rows && column < self.columns {
            self.cells.get(row * self.columns + column).copied()
        } else {
            None
        }
    }

    /// Cell for a state id, if inside the grid
    pub fn cell(&self, state: StateId) -> Option<Cell> {
        self.cells.get(state.index()).copied()
    }

    /// Replace one cell, returning the modified grid.
    pub fn with_cell(mut self, state: StateId, cell: Cell) -> Result<Self> {
        let rows = self.rows;
        let columns = self.columns;
        let slot = self
            .cells
            .get_mut(state.index())
            .ok_or(Error::InvalidSize { rows, columns })?;
        *slot = cell;
        Ok(self)
    }

    /// Rows of cells, top to bottom
    pub fn iter_rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.columns)
    }

    pub fn summary(&self) -> TerrainSummary {
        TerrainSummary {
            max_height: self.cells.iter().map(|c| c.height).max().unwrap_or(0),
            max_density: self.cells.iter().map(|c| c.density).max().unwrap_or(0),
        }
    }

    /// Write `row,column,height,density` rows for external heat-map plotting
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for (row, cells) in self.iter_rows().enumerate() {
            for (column, cell) in cells.iter().enumerate() {
                csv_writer.serialize(CellRow {
                    row,
                    column,
                    height: cell.height,
                    density: cell.density,
                })?;
            }
        }
        csv_writer.flush()?;
        Ok(())
    }

    pub fn save_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = std::fs::File::create(path)
            .map_err(|source| Error::io(format!("create {}", path.display()), source))?;
        self.write_csv(std::io::BufWriter::new(file))
    }
}
