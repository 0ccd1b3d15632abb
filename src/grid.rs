//! Regular rectangular grid over the data extent.
//!
//! Cells are square in degrees, numbered row-major from the south-west corner
//! (`id = row * cols + col`, row 0 is the southernmost row). Every cell is
//! half-open, `[min_x, max_x) x [min_y, max_y)`, so each position inside the
//! grid belongs to exactly one cell. The grid gets one extra row and column
//! beyond `extent / cell_size` so positions on the extent's north and east
//! edges are still covered.
//!
//! Uses an R-tree of cell envelopes for segment and point lookups.

use geo::{Coord, Polygon, Rect};
use log::info;
use rstar::{AABB, RTree, RTreeObject};

use crate::error::{FieldError, Result};
use crate::Bounds;

/// Upper bound on generated cells; guards against a tiny cell size over a large extent.
pub const MAX_GRID_CELLS: f64 = 4_000_000.0;

/// One cell of the grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridCell {
    pub id: u32,
    pub row: u32,
    pub col: u32,
    pub rect: Rect<f64>,
}

impl GridCell {
    /// Half-open containment test (west and south edges inclusive).
    pub fn contains(&self, c: Coord<f64>) -> bool {
        let min = self.rect.min();
        let max = self.rect.max();
        c.x >= min.x && c.x < max.x && c.y >= min.y && c.y < max.y
    }

    pub fn centroid(&self) -> Coord<f64> {
        self.rect.center()
    }

    pub fn polygon(&self) -> Polygon<f64> {
        self.rect.to_polygon()
    }
}

impl RTreeObject for GridCell {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        let min = self.rect.min();
        let max = self.rect.max();
        AABB::from_corners([min.x, min.y], [max.x, max.y])
    }
}

/// A complete tiling of the extent with stable cell ids.
#[derive(Debug)]
pub struct Grid {
    origin: Coord<f64>,
    cell_size: f64,
    rows: u32,
    cols: u32,
    cells: Vec<GridCell>,
    index: RTree<GridCell>,
}

impl Grid {
    /// Build a grid anchored at the south-west corner of `bounds`.
    ///
    /// # Example
    /// ```
    /// use stormfield::{Bounds, Grid};
    ///
    /// let bounds = Bounds { min_lat: 10.0, max_lat: 20.0, min_lng: -90.0, max_lng: -70.0 };
    /// let grid = Grid::covering(&bounds, 5.0).unwrap();
    /// assert_eq!(grid.cols(), 5);
    /// assert_eq!(grid.rows(), 3);
    /// assert_eq!(grid.len(), 15);
    /// ```
    pub fn covering(bounds: &Bounds, cell_size: f64) -> Result<Self> {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(FieldError::InvalidConfig(format!(
                "cell size must be a positive number of degrees, got {}",
                cell_size
            )));
        }
        if !(bounds.width().is_finite() && bounds.height().is_finite())
            || bounds.width() < 0.0
            || bounds.height() < 0.0
        {
            return Err(FieldError::InvalidConfig(format!(
                "invalid grid extent {:?}",
                bounds
            )));
        }

        let cols_f = (bounds.width() / cell_size).floor() + 1.0;
        let rows_f = (bounds.height() / cell_size).floor() + 1.0;
        if cols_f * rows_f > MAX_GRID_CELLS {
            return Err(FieldError::InvalidConfig(format!(
                "cell size {} yields {} x {} cells, limit is {}",
                cell_size, cols_f, rows_f, MAX_GRID_CELLS
            )));
        }
        let cols = cols_f as u32;
        let rows = rows_f as u32;

        let origin = Coord {
            x: bounds.min_lng,
            y: bounds.min_lat,
        };

        let mut cells = Vec::with_capacity((rows * cols) as usize);
        for row in 0..rows {
            for col in 0..cols {
                // Neighbours compute shared edges with the same expression
                let min = Coord {
                    x: origin.x + col as f64 * cell_size,
                    y: origin.y + row as f64 * cell_size,
                };
                let max = Coord {
                    x: origin.x + (col + 1) as f64 * cell_size,
                    y: origin.y + (row + 1) as f64 * cell_size,
                };
                cells.push(GridCell {
                    id: row * cols + col,
                    row,
                    col,
                    rect: Rect::new(min, max),
                });
            }
        }

        let index = RTree::bulk_load(cells.clone());

        info!(
            "[Grid] {} x {} cells of {} deg from ({:.3}, {:.3})",
            cols, rows, cell_size, origin.x, origin.y
        );

        Ok(Self {
            origin,
            cell_size,
            rows,
            cols,
            cells,
            index,
        })
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// South-west corner of cell 0.
    pub fn origin(&self) -> Coord<f64> {
        self.origin
    }

    /// All cells in id order.
    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    pub fn cell(&self, id: u32) -> Option<&GridCell> {
        self.cells.get(id as usize)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Extent covered by the whole grid (may exceed the data extent).
    pub fn bounds(&self) -> Bounds {
        Bounds {
            min_lat: self.origin.y,
            max_lat: self.origin.y + self.rows as f64 * self.cell_size,
            min_lng: self.origin.x,
            max_lng: self.origin.x + self.cols as f64 * self.cell_size,
        }
    }

    /// The cell containing a position, using the half-open rule.
    pub fn locate(&self, c: Coord<f64>) -> Option<&GridCell> {
        self.index
            .locate_in_envelope_intersecting(&AABB::from_point([c.x, c.y]))
            .filter(|cell| cell.contains(c))
            .min_by_key(|cell| cell.id)
    }

    /// Cells whose closed rectangle intersects the envelope spanned by two corners.
    pub fn cells_intersecting(
        &self,
        a: Coord<f64>,
        b: Coord<f64>,
    ) -> impl Iterator<Item = &GridCell> {
        self.index
            .locate_in_envelope_intersecting(&AABB::from_corners([a.x, a.y], [b.x, b.y]))
    }
}
