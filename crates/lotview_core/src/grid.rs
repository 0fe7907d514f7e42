//! Static parking-lot layout
//!
//! The layout is consumed once per session and handed to renderers by
//! reference. Cells the document does not list are walls.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Type of a single grid cell
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CellType {
    #[default]
    Wall,
    Road,
    Parking,
    Entry,
    Exit,
}

impl CellType {
    pub const ALL: [CellType; 5] = [
        CellType::Wall,
        CellType::Road,
        CellType::Parking,
        CellType::Entry,
        CellType::Exit,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CellType::Wall => "WALL",
            CellType::Road => "ROAD",
            CellType::Parking => "PARKING",
            CellType::Entry => "ENTRY",
            CellType::Exit => "EXIT",
        }
    }
}

/// A typed cell at integer grid coordinates
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub x: u32,
    pub y: u32,
    #[serde(rename = "type")]
    pub cell_type: CellType,
    /// Editor-supplied annotations (e.g. `parking_id`)
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

impl Cell {
    pub fn new(x: u32, y: u32, cell_type: CellType) -> Self {
        Self {
            x,
            y,
            cell_type,
            metadata: Map::new(),
        }
    }
}

/// Dense, immutable grid of typed cells
/// Largest number of cells a loaded layout may have
pub const MAX_GRID_CELLS: usize = 1 << 22;

#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    width: u32,
    height: u32,
    /// Row-major: index = y * width + x
    cells: Vec<Cell>,
}

impl Grid {
    /// Create a grid of the given size filled with walls
    pub fn new(width: u32, height: u32) -> Self {
        let mut cells = Vec::with_capacity((width as usize) * (height as usize));
        for y in 0..height {
            for x in 0..width {
                cells.push(Cell::new(x, y, CellType::Wall));
            }
        }
        Self {
            width,
            height,
            cells,
        }
    }

    /// Build a grid from a sparse cell list.
    ///
    /// Unlisted positions stay walls; cells outside the bounds are dropped.
    pub fn from_cells(width: u32, height: u32, cells: impl IntoIterator<Item = Cell>) -> Self {
        let mut grid = Self::new(width, height);
        let mut dropped = 0usize;

        for cell in cells {
            match grid.slot(cell.x, cell.y) {
                Some(slot) => grid.cells[slot] = cell,
                None => dropped += 1,
            }
        }

        if dropped > 0 {
            tracing::warn!(
                dropped,
                width,
                height,
                "layout lists cells outside the grid bounds; ignoring them"
            );
        }

        grid
    }

    fn slot(&self, x: u32, y: u32) -> Option<usize> {
        if x < self.width && y < self.height {
            Some((y as usize) * (self.width as usize) + x as usize)
        } else {
            None
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn cell(&self, x: u32, y: u32) -> Option<&Cell> {
        self.slot(x, y).map(|slot| &self.cells[slot])
    }

    pub fn cell_type(&self, x: u32, y: u32) -> Option<CellType> {
        self.cell(x, y).map(|c| c.cell_type)
    }

    /// Iterate all cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Count cells of a given type
    pub fn count(&self, cell_type: CellType) -> usize {
        self.cells
            .iter()
            .filter(|c| c.cell_type == cell_type)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_grid_is_all_walls() {
        let grid = Grid::new(3, 2);
        assert_eq!(grid.cells().count(), 6);
        assert_eq!(grid.count(CellType::Wall), 6);
        assert_eq!(grid.cell_type(2, 1), Some(CellType::Wall));
        assert_eq!(grid.cell_type(3, 0), None);
    }

    #[test]
    fn test_from_cells_fills_and_drops() {
        let grid = Grid::from_cells(
            2,
            2,
            vec![
                Cell::new(0, 0, CellType::Entry),
                Cell::new(1, 1, CellType::Parking),
                Cell::new(5, 5, CellType::Road),
            ],
        );

        assert_eq!(grid.cell_type(0, 0), Some(CellType::Entry));
        assert_eq!(grid.cell_type(1, 1), Some(CellType::Parking));
        assert_eq!(grid.cell_type(1, 0), Some(CellType::Wall));
        assert_eq!(grid.count(CellType::Road), 0);
    }

    #[test]
    fn test_cell_type_serde_names() {
        let cell: Cell = serde_json::from_str(
            r#"{"x": 1, "y": 2, "type": "EXIT", "metadata": {"parking_id": "P1"}}"#,
        )
        .unwrap();
        assert_eq!(cell.cell_type, CellType::Exit);
        assert_eq!(cell.metadata["parking_id"], "P1");
        assert_eq!(CellType::Parking.name(), "PARKING");
    }
}
