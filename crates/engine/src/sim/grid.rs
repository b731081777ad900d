use std::ops::Range;

use thiserror::Error;

use super::config::SimConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridCell {
    pub row: usize,
    pub column: i32,
}

impl GridCell {
    pub const fn new(row: usize, column: i32) -> Self {
        Self { row, column }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("row {row} is outside a grid of {rows} rows")]
    RowOutOfRange { row: usize, rows: usize },
    #[error("column {column} is negative")]
    NegativeColumn { column: i32 },
}

/// Fixed-height, column-indexed grid of optional cells.
///
/// Rows grow to the right on demand, so a short or missing row simply reads
/// as empty. Lookups never fail: anything outside the stored data is `None`.
#[derive(Debug)]
pub struct TileGrid<T> {
    rows: Vec<Vec<Option<T>>>,
}

impl<T> TileGrid<T> {
    pub fn new(row_count: usize) -> Self {
        let mut rows = Vec::with_capacity(row_count);
        rows.resize_with(row_count, Vec::new);
        Self { rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// One past the right-most column that was ever written.
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn get(&self, row: usize, column: i32) -> Option<&T> {
        let column = usize::try_from(column).ok()?;
        self.rows.get(row)?.get(column)?.as_ref()
    }

    pub fn get_mut(&mut self, row: usize, column: i32) -> Option<&mut T> {
        let column = usize::try_from(column).ok()?;
        self.rows.get_mut(row)?.get_mut(column)?.as_mut()
    }

    pub fn is_occupied(&self, row: usize, column: i32) -> bool {
        self.get(row, column).is_some()
    }

    /// Stores `value`, returning whatever occupied the cell before.
    pub fn set(&mut self, row: usize, column: i32, value: T) -> Result<Option<T>, GridError> {
        let rows = self.rows.len();
        let column_index =
            usize::try_from(column).map_err(|_| GridError::NegativeColumn { column })?;
        let cells = self
            .rows
            .get_mut(row)
            .ok_or(GridError::RowOutOfRange { row, rows })?;
        if cells.len() <= column_index {
            cells.resize_with(column_index + 1, || None);
        }
        Ok(cells[column_index].replace(value))
    }

    pub fn take(&mut self, row: usize, column: i32) -> Option<T> {
        let column = usize::try_from(column).ok()?;
        self.rows.get_mut(row)?.get_mut(column)?.take()
    }

    /// Puts a value back into a cell previously emptied by [`TileGrid::take`].
    /// Writes outside the grid are dropped.
    pub(crate) fn restore(&mut self, row: usize, column: i32, value: T) {
        let _ = self.set(row, column, value);
    }

    pub fn clear(&mut self) {
        for cells in &mut self.rows {
            cells.clear();
        }
    }

    pub fn occupied_cells(&self) -> impl Iterator<Item = (GridCell, &T)> {
        self.rows.iter().enumerate().flat_map(|(row, cells)| {
            cells.iter().enumerate().filter_map(move |(column, cell)| {
                let column = i32::try_from(column).ok()?;
                cell.as_ref().map(|value| (GridCell::new(row, column), value))
            })
        })
    }
}

/// Column range scanned by a render pass.
///
/// Derived only from the scroll position, never from the surface size, with
/// a buffer column on each side so tiles do not pop in at the edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnWindow {
    pub start: i32,
    pub end: i32,
}

impl ColumnWindow {
    pub fn around(scroll_x: f32, config: &SimConfig) -> Self {
        let first_visible = (scroll_x / config.tile_size).floor() as i32;
        let start = first_visible - config.overscan_columns;
        Self {
            start,
            end: start + config.window_columns,
        }
    }

    pub fn columns(&self) -> Range<i32> {
        self.start..self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_rows_and_columns_read_as_empty() {
        let mut grid = TileGrid::new(15);
        grid.set(3, 4, 'x').expect("set");

        assert_eq!(grid.get(3, 4), Some(&'x'));
        assert_eq!(grid.get(3, 5), None);
        assert_eq!(grid.get(3, -1), None);
        assert_eq!(grid.get(14, 4), None);
        assert_eq!(grid.get(40, 4), None);
    }

    #[test]
    fn set_rejects_rows_beyond_fixed_height() {
        let mut grid = TileGrid::new(15);

        assert_eq!(
            grid.set(15, 0, 1u8),
            Err(GridError::RowOutOfRange { row: 15, rows: 15 })
        );
        assert_eq!(
            grid.set(0, -2, 1u8),
            Err(GridError::NegativeColumn { column: -2 })
        );
    }

    #[test]
    fn set_replaces_previous_occupant() {
        let mut grid = TileGrid::new(2);
        assert_eq!(grid.set(1, 7, "brick").expect("first"), None);
        assert_eq!(grid.set(1, 7, "coin").expect("second"), Some("brick"));
        assert_eq!(grid.width(), 8);
    }

    #[test]
    fn take_and_restore_leave_cell_unchanged() {
        let mut grid = TileGrid::new(15);
        grid.set(12, 30, 5u32).expect("set");

        let value = grid.take(12, 30).expect("occupied");
        assert!(!grid.is_occupied(12, 30));
        grid.restore(12, 30, value);

        assert_eq!(grid.get(12, 30), Some(&5));
    }

    #[test]
    fn occupied_cells_scan_row_major() {
        let mut grid = TileGrid::new(3);
        grid.set(2, 0, 'c').expect("set");
        grid.set(0, 5, 'b').expect("set");
        grid.set(0, 1, 'a').expect("set");

        let cells: Vec<_> = grid
            .occupied_cells()
            .map(|(cell, value)| (cell.row, cell.column, *value))
            .collect();

        assert_eq!(cells, vec![(0, 1, 'a'), (0, 5, 'b'), (2, 0, 'c')]);
    }

    #[test]
    fn window_at_origin_starts_one_column_left() {
        let window = ColumnWindow::around(0.0, &SimConfig::default());

        assert_eq!(window, ColumnWindow { start: -1, end: 20 });
        assert_eq!(window.columns().len(), 21);
    }

    #[test]
    fn window_follows_scroll_by_whole_tiles() {
        let config = SimConfig::default();

        assert_eq!(ColumnWindow::around(15.9, &config).start, -1);
        assert_eq!(ColumnWindow::around(16.0, &config).start, 0);
        assert_eq!(ColumnWindow::around(420.0, &config), ColumnWindow { start: 25, end: 46 });
    }
}
