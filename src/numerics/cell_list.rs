use nalgebra::Point2;

/// Uniform grid over [0, l]^2 bucketing particle indices by position.
///
/// Cells are at least `min_dist` wide, so every particle within `min_dist` of
/// a point lies in that point's cell or one of its eight neighbours.
#[derive(Debug, Clone)]
pub struct CellList {
    n_cells: usize,
    cell_size: f64,
    cells: Vec<Vec<usize>>,
}

impl CellList {
    pub fn new(l: f64, min_dist: f64, n_particles: usize) -> Self {
        // Beyond about one particle per cell, more cells only cost memory.
        let max_cells = ((n_particles as f64).sqrt().ceil() as usize).max(1);
        let n_cells = ((l / min_dist).floor() as usize).clamp(1, max_cells);
        CellList {
            n_cells,
            cell_size: l / n_cells as f64,
            cells: vec![Vec::new(); n_cells * n_cells],
        }
    }

    pub fn n_cells(&self) -> usize {
        self.n_cells
    }

    // Out-of-domain and non-finite coordinates land in the edge cells.
    fn axis_cell(&self, x: f64) -> usize {
        ((x / self.cell_size).floor() as usize).min(self.n_cells - 1)
    }

    fn cell_of(&self, r: &Point2<f64>) -> (usize, usize) {
        (self.axis_cell(r.x), self.axis_cell(r.y))
    }

    pub fn rebuild(&mut self, rs: &[Point2<f64>]) {
        for cell in self.cells.iter_mut() {
            cell.clear();
        }
        for (i, r) in rs.iter().enumerate() {
            let (cx, cy) = self.cell_of(r);
            self.cells[cy * self.n_cells + cx].push(i);
        }
    }

    /// Indices of all particles in the 3x3 block of cells around `r`, ascending.
    pub fn candidates(&self, r: &Point2<f64>, out: &mut Vec<usize>) {
        out.clear();
        let (cx, cy) = self.cell_of(r);
        let last = self.n_cells - 1;
        for ny in cy.saturating_sub(1)..=(cy + 1).min(last) {
            for nx in cx.saturating_sub(1)..=(cx + 1).min(last) {
                out.extend_from_slice(&self.cells[ny * self.n_cells + nx]);
            }
        }
        out.sort_unstable();
    }
}
