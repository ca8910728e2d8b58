//! Uniform grid with a counting-sort rebuild and half-stencil pair traversal
//!
//! The grid owns a contiguous copy of the objects handed to [`SpatialGrid::rebuild`],
//! reordered so every cell's objects occupy one `[start, start + count)` range and
//! the cells tile the buffer in row-major order. That layout is what makes the pair
//! traversal cheap: the stencil cells of one row are adjacent in the buffer, so a
//! whole row of candidates is a single slice.

use std::ops::Range;

use glam::DVec2;

use crate::error::{GridError, Result};

/// Anything the grid can bucket by position
pub trait GridObject {
    fn grid_position(&self) -> DVec2;
}

impl GridObject for DVec2 {
    fn grid_position(&self) -> DVec2 {
        *self
    }
}

/// Range of the grid buffer owned by one cell
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cell {
    pub start: usize,
    pub count: usize,
}

impl Cell {
    pub fn end(&self) -> usize {
        self.start + self.count
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end()
    }
}

/// Uniform spatial grid over `[0, width] x [0, height]`
pub struct SpatialGrid<T> {
    width: f64,
    height: f64,
    cell_size: f64,
    horizontal_cells: usize,
    vertical_cells: usize,
    max_objects: usize,

    /// Row-major cell table, `row * horizontal_cells + col`
    cells: Vec<Cell>,
    /// Source index for every destination slot, reused between rebuilds
    order: Vec<usize>,
    /// Objects grouped by cell
    objects: Vec<T>,
}

impl<T: GridObject + Clone> SpatialGrid<T> {
    pub fn new(width: f64, height: f64, cell_size: f64, max_objects: usize) -> Result<Self> {
        for (name, value) in [("width", width), ("height", height), ("cell_size", cell_size)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(GridError::InvalidConfiguration(format!(
                    "{name} must be positive and finite, got {value}"
                )));
            }
        }
        if max_objects == 0 {
            return Err(GridError::InvalidConfiguration(
                "max_objects must be at least 1".to_string(),
            ));
        }

        let horizontal_cells = (width / cell_size).ceil() as usize;
        let vertical_cells = (height / cell_size).ceil() as usize;
        let num_cells = horizontal_cells
            .checked_mul(vertical_cells)
            .ok_or_else(|| {
                GridError::InvalidConfiguration(format!(
                    "{horizontal_cells}x{vertical_cells} cells overflow the cell table"
                ))
            })?;

        let mut cells = Vec::new();
        cells.try_reserve_exact(num_cells).map_err(|err| {
            GridError::InvalidConfiguration(format!("cannot allocate {num_cells} cells: {err}"))
        })?;
        cells.resize(num_cells, Cell::default());

        let mut objects = Vec::new();
        objects.try_reserve_exact(max_objects).map_err(|err| {
            GridError::InvalidConfiguration(format!(
                "cannot allocate room for {max_objects} objects: {err}"
            ))
        })?;

        log::info!(
            "Spatial grid: {}x{} cells ({} total), cell size {}, capacity {}",
            horizontal_cells,
            vertical_cells,
            num_cells,
            cell_size,
            max_objects
        );

        Ok(Self {
            width,
            height,
            cell_size,
            horizontal_cells,
            vertical_cells,
            max_objects,
            cells,
            order: Vec::with_capacity(max_objects),
            objects,
        })
    }

    /// Repartition the grid around `objects`.
    ///
    /// Three passes: count objects per cell, turn the counts into start offsets with
    /// a row-major prefix sum, then scatter objects into their cell ranges in input
    /// order. Objects sharing a cell keep their relative order.
    ///
    /// On error the grid is left empty.
    pub fn rebuild(&mut self, objects: &[T]) -> Result<()> {
        let result = self.partition(objects);
        if result.is_err() {
            self.clear();
        }
        result
    }

    fn partition(&mut self, objects: &[T]) -> Result<()> {
        if objects.len() > self.max_objects {
            return Err(GridError::CapacityExceeded {
                count: objects.len(),
                max_objects: self.max_objects,
            });
        }

        self.cells.fill(Cell::default());
        for (index, object) in objects.iter().enumerate() {
            let cell = self.locate(index, object)?;
            self.cells[cell].count += 1;
        }

        let mut offset = 0;
        for cell in &mut self.cells {
            cell.start = offset;
            offset += cell.count;
            // Reused as the insertion cursor below
            cell.count = 0;
        }

        self.order.clear();
        self.order.resize(objects.len(), 0);
        for (index, object) in objects.iter().enumerate() {
            let cell = self.locate(index, object)?;
            let cell = &mut self.cells[cell];
            self.order[cell.start + cell.count] = index;
            cell.count += 1;
        }

        self.objects.clear();
        self.objects
            .extend(self.order.iter().map(|&index| objects[index].clone()));

        Ok(())
    }

    fn locate(&self, index: usize, object: &T) -> Result<usize> {
        let position = object.grid_position();
        self.cell_coords(position)
            .map(|(col, row)| row * self.horizontal_cells + col)
            .ok_or(GridError::OutOfBounds {
                index,
                x: position.x,
                y: position.y,
                width: self.width,
                height: self.height,
            })
    }

    /// Empty the grid without touching its configuration
    pub fn clear(&mut self) {
        self.cells.fill(Cell::default());
        self.order.clear();
        self.objects.clear();
    }

    /// Cell `(col, row)` containing `position`, or `None` outside the domain.
    ///
    /// Positions exactly on the far edge belong to the last column or row.
    pub fn cell_coords(&self, position: DVec2) -> Option<(usize, usize)> {
        let inside = (0.0..=self.width).contains(&position.x)
            && (0.0..=self.height).contains(&position.y);
        if !inside {
            return None;
        }

        let col = ((position.x / self.cell_size).floor() as usize).min(self.horizontal_cells - 1);
        let row = ((position.y / self.cell_size).floor() as usize).min(self.vertical_cells - 1);
        Some((col, row))
    }

    /// Number of cells scanned outward in each direction for a given interaction radius
    pub fn stencil_radius(&self, max_distance: f64) -> usize {
        if max_distance > 0.0 {
            (max_distance / self.cell_size).ceil() as usize
        } else {
            0
        }
    }

    /// Visit every object in buffer order
    pub fn for_each_ordered<F>(&self, mut f: F)
    where
        F: FnMut(usize, &T),
    {
        for (slot, object) in self.objects.iter().enumerate() {
            f(slot, object);
        }
    }

    /// Visit every object in buffer order with mutable access
    pub fn for_each_ordered_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(usize, &mut T),
    {
        for (slot, object) in self.objects.iter_mut().enumerate() {
            f(slot, object);
        }
    }

    /// Visit every unordered pair of distinct slots whose cells lie within
    /// `stencil_radius(max_distance)` cells of each other, exactly once.
    ///
    /// For the object in slot `i` the candidates are every object in the stencil
    /// columns of the rows strictly above it, plus the objects of its own row
    /// whose slot is lower than `i`. Pairs with objects further right in the same
    /// row, or in rows below, are produced when those objects take the role of `i`.
    ///
    /// The stencil is a superset of the true radius: callers must check the exact
    /// distance. The callback receives `(i, j, object_i, object_j)` with `j < i`.
    pub fn for_each_pair<F>(&mut self, max_distance: f64, mut f: F)
    where
        F: FnMut(usize, usize, &mut T, &mut T),
    {
        let reach = self.stencil_radius(max_distance);
        let columns = self.horizontal_cells;

        for row in 0..self.vertical_cells {
            let first_row = row.saturating_sub(reach);
            for col in 0..columns {
                let home = self.cells[row * columns + col];
                if home.count == 0 {
                    continue;
                }
                let min_col = col.saturating_sub(reach);
                let max_col = col.saturating_add(reach).min(columns - 1);
                let row_start = self.cells[row * columns + min_col].start;

                for i in home.range() {
                    for above in first_row..row {
                        let span = self.span(above, min_col, max_col);
                        for j in span {
                            if let Some((a, b)) = disjoint_pair_mut(&mut self.objects, i, j) {
                                f(i, j, a, b);
                            }
                        }
                    }
                    for j in row_start..i {
                        if let Some((a, b)) = disjoint_pair_mut(&mut self.objects, i, j) {
                            f(i, j, a, b);
                        }
                    }
                }
            }
        }
    }

    /// Buffer range covered by cells `min_col..=max_col` of `row`
    fn span(&self, row: usize, min_col: usize, max_col: usize) -> Range<usize> {
        let first = self.cells[row * self.horizontal_cells + min_col];
        let last = self.cells[row * self.horizontal_cells + max_col];
        first.start..last.end()
    }
}

impl<T> SpatialGrid<T> {
    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn horizontal_cells(&self) -> usize {
        self.horizontal_cells
    }

    pub fn vertical_cells(&self) -> usize {
        self.vertical_cells
    }

    pub fn max_objects(&self) -> usize {
        self.max_objects
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, col: usize, row: usize) -> Option<Cell> {
        if col >= self.horizontal_cells || row >= self.vertical_cells {
            return None;
        }
        Some(self.cells[row * self.horizontal_cells + col])
    }

    /// Objects in bucketed order
    pub fn objects(&self) -> &[T] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// Two mutable references into `items`, or `None` unless `i` and `j` are distinct
/// valid indices. Returned in `(items[i], items[j])` order.
pub fn disjoint_pair_mut<T>(items: &mut [T], i: usize, j: usize) -> Option<(&mut T, &mut T)> {
    if i == j || i >= items.len() || j >= items.len() {
        return None;
    }
    if i < j {
        let (lower, upper) = items.split_at_mut(j);
        Some((&mut lower[i], &mut upper[0]))
    } else {
        let (lower, upper) = items.split_at_mut(i);
        Some((&mut upper[0], &mut lower[j]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::collections::HashSet;

    #[derive(Clone, Debug, PartialEq)]
    struct Tagged {
        position: DVec2,
        id: usize,
        hits: u32,
    }

    impl GridObject for Tagged {
        fn grid_position(&self) -> DVec2 {
            self.position
        }
    }

    fn tagged(points: &[(f64, f64)]) -> Vec<Tagged> {
        points
            .iter()
            .enumerate()
            .map(|(id, &(x, y))| Tagged {
                position: DVec2::new(x, y),
                id,
                hits: 0,
            })
            .collect()
    }

    fn random_cloud(seed: u64, count: usize, width: f64, height: f64) -> Vec<Tagged> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..count)
            .map(|id| Tagged {
                position: DVec2::new(rng.random_range(0.0..=width), rng.random_range(0.0..=height)),
                id,
                hits: 0,
            })
            .collect()
    }

    fn collect_pairs(grid: &mut SpatialGrid<Tagged>, max_distance: f64) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        grid.for_each_pair(max_distance, |i, j, _, _| pairs.push((i, j)));
        pairs
    }

    #[test]
    fn test_new_rejects_invalid_configuration() {
        let cases = [
            (0.0, 10.0, 1.0, 10),
            (10.0, -1.0, 1.0, 10),
            (10.0, 10.0, 0.0, 10),
            (10.0, 10.0, -2.0, 10),
            (f64::NAN, 10.0, 1.0, 10),
            (10.0, f64::INFINITY, 1.0, 10),
            (10.0, 10.0, 1.0, 0),
        ];
        for (width, height, cell_size, max_objects) in cases {
            let result = SpatialGrid::<DVec2>::new(width, height, cell_size, max_objects);
            assert!(
                matches!(result, Err(GridError::InvalidConfiguration(_))),
                "expected rejection for {width} {height} {cell_size} {max_objects}"
            );
        }
    }

    #[test]
    fn test_cell_counts_round_up() {
        let grid = SpatialGrid::<DVec2>::new(100.0, 100.0, 4.0, 10).unwrap();
        assert_eq!(grid.horizontal_cells(), 25);
        assert_eq!(grid.vertical_cells(), 25);
        assert_eq!(grid.cells().len(), 625);

        let grid = SpatialGrid::<DVec2>::new(10.0, 7.0, 3.0, 10).unwrap();
        assert_eq!(grid.horizontal_cells(), 4);
        assert_eq!(grid.vertical_cells(), 3);
    }

    #[test]
    fn test_cell_coords() {
        let grid = SpatialGrid::<DVec2>::new(100.0, 100.0, 4.0, 10).unwrap();
        assert_eq!(grid.cell_coords(DVec2::new(0.0, 0.0)), Some((0, 0)));
        assert_eq!(grid.cell_coords(DVec2::new(10.0, 10.0)), Some((2, 2)));
        assert_eq!(grid.cell_coords(DVec2::new(3.999, 4.0)), Some((0, 1)));
        assert_eq!(grid.cell_coords(DVec2::new(100.0, 100.0)), Some((24, 24)));
        assert_eq!(grid.cell_coords(DVec2::new(-0.001, 5.0)), None);
        assert_eq!(grid.cell_coords(DVec2::new(5.0, 100.5)), None);
        assert_eq!(grid.cell_coords(DVec2::new(f64::NAN, 5.0)), None);
    }

    #[test]
    fn test_rebuild_partitions_buffer() {
        let mut grid = SpatialGrid::new(50.0, 30.0, 4.0, 1000).unwrap();
        let cloud = random_cloud(11, 700, 50.0, 30.0);
        grid.rebuild(&cloud).unwrap();

        assert_eq!(grid.len(), cloud.len());
        let total: usize = grid.cells().iter().map(|cell| cell.count).sum();
        assert_eq!(total, cloud.len());

        // Row-major cells tile [0, N) without gaps or overlaps
        let mut expected_start = 0;
        for cell in grid.cells() {
            assert_eq!(cell.start, expected_start);
            expected_start = cell.end();
        }
        assert_eq!(expected_start, cloud.len());

        // Every object sits inside the range of its own cell
        for row in 0..grid.vertical_cells() {
            for col in 0..grid.horizontal_cells() {
                let cell = grid.cell(col, row).unwrap();
                for slot in cell.range() {
                    let position = grid.objects()[slot].position;
                    assert_eq!(grid.cell_coords(position), Some((col, row)));
                }
            }
        }

        // Nothing lost or duplicated
        let ids: HashSet<usize> = grid.objects().iter().map(|object| object.id).collect();
        assert_eq!(ids.len(), cloud.len());
    }

    #[test]
    fn test_rebuild_is_stable_within_cell() {
        let mut grid = SpatialGrid::new(20.0, 20.0, 10.0, 10).unwrap();
        let objects = tagged(&[(15.0, 15.0), (1.0, 1.0), (2.0, 2.0), (16.0, 1.0), (3.0, 3.0)]);
        grid.rebuild(&objects).unwrap();

        let ids: Vec<usize> = grid.objects().iter().map(|object| object.id).collect();
        assert_eq!(ids, vec![1, 2, 4, 3, 0]);
        assert_eq!(grid.cell(0, 0), Some(Cell { start: 0, count: 3 }));
        assert_eq!(grid.cell(1, 0), Some(Cell { start: 3, count: 1 }));
        assert_eq!(grid.cell(0, 1), Some(Cell { start: 4, count: 0 }));
        assert_eq!(grid.cell(1, 1), Some(Cell { start: 4, count: 1 }));
        assert_eq!(grid.cell(2, 0), None);
    }

    #[test]
    fn test_rebuild_rejects_over_capacity() {
        let mut grid = SpatialGrid::new(10.0, 10.0, 1.0, 2).unwrap();
        let objects = tagged(&[(1.0, 1.0), (2.0, 2.0), (3.0, 3.0)]);
        assert_eq!(
            grid.rebuild(&objects),
            Err(GridError::CapacityExceeded {
                count: 3,
                max_objects: 2
            })
        );

        // Exactly at capacity is fine
        grid.rebuild(&objects[..2]).unwrap();
        assert_eq!(grid.len(), 2);
    }

    #[test]
    fn test_rebuild_rejects_out_of_bounds() {
        let mut grid = SpatialGrid::new(10.0, 10.0, 1.0, 10).unwrap();
        grid.rebuild(&tagged(&[(1.0, 1.0)])).unwrap();
        assert_eq!(grid.len(), 1);

        let result = grid.rebuild(&tagged(&[(1.0, 1.0), (-0.5, 3.0)]));
        assert!(matches!(
            result,
            Err(GridError::OutOfBounds { index: 1, .. })
        ));
        assert!(grid.is_empty());
        assert!(grid.cells().iter().all(|cell| cell.count == 0));

        let result = grid.rebuild(&tagged(&[(4.0, 10.5)]));
        assert!(matches!(result, Err(GridError::OutOfBounds { index: 0, .. })));
    }

    #[test]
    fn test_rebuild_accepts_lower_edge_and_far_edge() {
        let mut grid = SpatialGrid::new(8.0, 8.0, 4.0, 10).unwrap();
        grid.rebuild(&tagged(&[(0.0, 0.0), (8.0, 8.0), (0.0, 8.0)])).unwrap();
        assert_eq!(grid.cell(0, 0).unwrap().count, 1);
        assert_eq!(grid.cell(1, 1).unwrap().count, 1);
        assert_eq!(grid.cell(0, 1).unwrap().count, 1);
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let mut grid = SpatialGrid::new(40.0, 40.0, 3.0, 500).unwrap();
        let cloud = random_cloud(5, 400, 40.0, 40.0);

        grid.rebuild(&cloud).unwrap();
        let first_cells = grid.cells().to_vec();
        let first_objects = grid.objects().to_vec();

        grid.rebuild(&cloud).unwrap();
        assert_eq!(grid.cells(), first_cells.as_slice());
        assert_eq!(grid.objects(), first_objects.as_slice());
    }

    #[test]
    fn test_for_each_ordered_visits_buffer_order() {
        let mut grid = SpatialGrid::new(20.0, 20.0, 10.0, 10).unwrap();
        grid.rebuild(&tagged(&[(15.0, 15.0), (1.0, 1.0), (16.0, 1.0)])).unwrap();

        let mut visited = Vec::new();
        grid.for_each_ordered(|slot, object| visited.push((slot, object.id)));
        assert_eq!(visited, vec![(0, 1), (1, 2), (2, 0)]);
    }

    #[test]
    fn test_for_each_ordered_mut_updates_buffer() {
        let mut grid = SpatialGrid::new(20.0, 20.0, 10.0, 10).unwrap();
        grid.rebuild(&tagged(&[(15.0, 15.0), (1.0, 1.0)])).unwrap();
        grid.for_each_ordered_mut(|slot, object| object.hits = slot as u32 + 10);
        let hits: Vec<u32> = grid.objects().iter().map(|object| object.hits).collect();
        assert_eq!(hits, vec![10, 11]);
    }

    #[test]
    fn test_stencil_radius() {
        let grid = SpatialGrid::<DVec2>::new(100.0, 100.0, 4.0, 10).unwrap();
        assert_eq!(grid.stencil_radius(5.0), 2);
        assert_eq!(grid.stencil_radius(4.0), 1);
        assert_eq!(grid.stencil_radius(0.5), 1);
        assert_eq!(grid.stencil_radius(0.0), 0);
        assert_eq!(grid.stencil_radius(-3.0), 0);
        assert_eq!(grid.stencil_radius(f64::NAN), 0);
    }

    #[test]
    fn test_concrete_pair_scenario() {
        let mut grid = SpatialGrid::new(100.0, 100.0, 4.0, 1000).unwrap();
        let objects = tagged(&[(10.0, 10.0), (11.0, 10.0), (90.0, 90.0)]);
        grid.rebuild(&objects).unwrap();

        let mut calls = Vec::new();
        grid.for_each_pair(5.0, |_, _, a, b| {
            let mut ids = [a.id, b.id];
            ids.sort();
            calls.push(ids);
        });
        assert_eq!(calls, vec![[0, 1]]);
    }

    #[test]
    fn test_pairs_match_stencil_exactly_once() {
        let mut grid = SpatialGrid::new(60.0, 45.0, 4.0, 2000).unwrap();
        let cloud = random_cloud(42, 900, 60.0, 45.0);
        grid.rebuild(&cloud).unwrap();

        for max_distance in [0.0, 3.0, 5.0, 9.5] {
            let reach = grid.stencil_radius(max_distance);
            let coords: Vec<(usize, usize)> = grid
                .objects()
                .iter()
                .map(|object| grid.cell_coords(object.position).unwrap())
                .collect();

            let mut expected = HashSet::new();
            for a in 0..coords.len() {
                for b in (a + 1)..coords.len() {
                    let dc = coords[a].0.abs_diff(coords[b].0);
                    let dr = coords[a].1.abs_diff(coords[b].1);
                    if dc.max(dr) <= reach {
                        expected.insert((a, b));
                    }
                }
            }

            let pairs = collect_pairs(&mut grid, max_distance);
            let mut seen = HashSet::new();
            for &(i, j) in &pairs {
                assert_ne!(i, j, "self pair emitted");
                assert!(j < i);
                assert!(seen.insert((j, i)), "pair ({i}, {j}) emitted twice");
            }
            assert_eq!(pairs.len(), expected.len());
            assert_eq!(seen, expected);
        }
    }

    #[test]
    fn test_pairs_cover_true_radius() {
        let mut grid = SpatialGrid::new(30.0, 30.0, 2.5, 1000).unwrap();
        let cloud = random_cloud(3, 600, 30.0, 30.0);
        grid.rebuild(&cloud).unwrap();
        let max_distance = 5.0;

        let mut found = HashSet::new();
        grid.for_each_pair(max_distance, |_, _, a, b| {
            found.insert((a.id.min(b.id), a.id.max(b.id)));
        });

        for a in 0..cloud.len() {
            for b in (a + 1)..cloud.len() {
                if cloud[a].position.distance(cloud[b].position) < max_distance {
                    assert!(found.contains(&(a, b)), "missed neighbors {a} and {b}");
                }
            }
        }
    }

    #[test]
    fn test_pair_callback_mutations_persist() {
        let mut grid = SpatialGrid::new(10.0, 10.0, 2.0, 10).unwrap();
        grid.rebuild(&tagged(&[(1.0, 1.0), (1.5, 1.0), (2.5, 1.0), (9.0, 9.0)])).unwrap();
        grid.for_each_pair(1.0, |_, _, a, b| {
            a.hits += 1;
            b.hits += 1;
        });

        let mut hits: Vec<(usize, u32)> = grid
            .objects()
            .iter()
            .map(|object| (object.id, object.hits))
            .collect();
        hits.sort();
        assert_eq!(hits, vec![(0, 2), (1, 2), (2, 2), (3, 0)]);
    }

    #[test]
    fn test_pairs_on_empty_grid() {
        let mut grid = SpatialGrid::<Tagged>::new(10.0, 10.0, 2.0, 10).unwrap();
        grid.rebuild(&[]).unwrap();
        assert!(collect_pairs(&mut grid, 5.0).is_empty());
    }

    #[test]
    fn test_disjoint_pair_mut() {
        let mut items = [1, 2, 3, 4];
        assert!(disjoint_pair_mut(&mut items, 2, 2).is_none());
        assert!(disjoint_pair_mut(&mut items, 0, 4).is_none());

        let (a, b) = disjoint_pair_mut(&mut items, 3, 1).unwrap();
        assert_eq!((*a, *b), (4, 2));
        *a += 10;
        *b += 20;

        let (a, b) = disjoint_pair_mut(&mut items, 0, 2).unwrap();
        assert_eq!((*a, *b), (1, 3));
        assert_eq!(items, [1, 22, 3, 14]);
    }
}
