//! Risk propagation matrices between product elements.

use crate::ValidationError;
use serde::{Deserialize, Serialize};

/// Element count used for systems without a dedicated matrix.
pub const FALLBACK_ELEMENT_COUNT: usize = 10;

/// Number of product elements in the matrix of the given 1-based system.
pub fn element_count(system: usize) -> usize {
    match system {
        1 => 16,
        2 => 18,
        3 => 25,
        _ => FALLBACK_ELEMENT_COUNT,
    }
}

/// Workshop heatmap values, rows 0..7 by columns 0..24. Shared by every
/// system; cells outside a system's matrix or on its diagonal are dropped.
const SEED_CELLS: [[u8; 24]; 7] = [
    [5, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 2, 4, 1, 1, 3, 4, 6, 4, 4, 3, 3, 2, 5],
    [7, 0, 0, 0, 0, 0, 0, 0, 0, 0, 5, 2, 2, 6, 9, 11, 6, 7, 8, 12, 5, 5, 7, 2],
    [1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 3, 2, 1, 9, 8, 10, 6, 5, 5, 5, 7, 4, 2, 4],
    [7, 3, 0, 0, 0, 0, 0, 0, 1, 0, 5, 4, 7, 14, 13, 12, 9, 5, 5, 10, 6, 4, 4, 1],
    [1, 3, 0, 0, 0, 1, 0, 0, 0, 2, 4, 4, 2, 4, 4, 14, 12, 1, 8, 5, 3, 7, 3, 0],
    [2, 1, 0, 3, 0, 0, 0, 0, 2, 0, 4, 1, 5, 10, 5, 7, 11, 6, 0, 5, 3, 4, 2, 0],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 2, 1, 3, 4, 0, 0, 0, 0, 1, 2, 2, 6],
];

/// Seeded matrix shown for the given 1-based system.
pub fn default_matrix(system: usize) -> RiskMatrix {
    let mut m = RiskMatrix::new(element_count(system));
    for (row, values) in SEED_CELLS.iter().enumerate() {
        for (col, &value) in values.iter().enumerate() {
            if let Ok(i) = m.index(row, col) {
                m.values[i] = Some(value);
            }
        }
    }
    m
}

/// One non-diagonal cell of a risk matrix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskCell {
    pub row: usize,
    pub col: usize,
    pub value: u8,
}

/// Square risk propagation matrix with an undefined diagonal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskMatrix {
    size: usize,
    // row-major, diagonal stays None
    values: Vec<Option<u8>>,
}

impl RiskMatrix {
    /// Zero matrix of `size` elements.
    pub fn new(size: usize) -> Self {
        let mut values = vec![Some(0); size * size];
        for i in 0..size {
            values[i * size + i] = None;
        }
        Self { size, values }
    }

    /// Build a matrix from sparse cells; later cells overwrite earlier ones.
    pub fn from_cells(size: usize, cells: &[RiskCell]) -> Result<Self, ValidationError> {
        let mut m = Self::new(size);
        for c in cells {
            m.set(c.row, c.col, c.value)?;
        }
        Ok(m)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    fn index(&self, row: usize, col: usize) -> Result<usize, ValidationError> {
        if row >= self.size || col >= self.size {
            return Err(ValidationError::CellOutOfBounds {
                row,
                col,
                size: self.size,
            });
        }
        if row == col {
            return Err(ValidationError::DiagonalCell(row));
        }
        Ok(row * self.size + col)
    }

    pub fn set(&mut self, row: usize, col: usize, value: u8) -> Result<(), ValidationError> {
        let i = self.index(row, col)?;
        self.values[i] = Some(value);
        Ok(())
    }

    /// Cell value; `None` on the diagonal or outside the matrix.
    pub fn get(&self, row: usize, col: usize) -> Option<u8> {
        self.index(row, col).ok().and_then(|i| self.values[i])
    }

    /// Sum of a row's defined cells.
    pub fn row_total(&self, row: usize) -> u32 {
        if row >= self.size {
            return 0;
        }
        self.values[row * self.size..(row + 1) * self.size]
            .iter()
            .flatten()
            .map(|&v| u32::from(v))
            .sum()
    }

    /// The `k` largest non-zero cells, ties broken by position.
    pub fn hotspots(&self, k: usize) -> Vec<RiskCell> {
        let mut cells: Vec<RiskCell> = self
            .values
            .iter()
            .enumerate()
            .filter_map(|(i, v)| match v {
                Some(value) if *value > 0 => Some(RiskCell {
                    row: i / self.size,
                    col: i % self.size,
                    value: *value,
                }),
                _ => None,
            })
            .collect();
        cells.sort_by(|a, b| {
            b.value
                .cmp(&a.value)
                .then(a.row.cmp(&b.row))
                .then(a.col.cmp(&b.col))
        });
        cells.truncate(k);
        cells
    }

    /// Axis labels, `Element 1` .. `Element n`.
    pub fn labels(&self) -> Vec<String> {
        (1..=self.size).map(|i| format!("Element {i}")).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(row: usize, col: usize, value: u8) -> RiskCell {
        RiskCell { row, col, value }
    }

    #[test]
    fn diagonal_is_undefined() {
        let m = RiskMatrix::new(4);
        assert_eq!(m.get(2, 2), None);
        assert_eq!(m.get(2, 3), Some(0));
        assert_eq!(m.get(4, 0), None);
    }

    #[test]
    fn element_counts_per_system() {
        assert_eq!(element_count(1), 16);
        assert_eq!(element_count(2), 18);
        assert_eq!(element_count(3), 25);
        assert_eq!(element_count(7), FALLBACK_ELEMENT_COUNT);
        let m = RiskMatrix::new(element_count(1));
        assert_eq!(m.labels().first().map(String::as_str), Some("Element 1"));
        assert_eq!(m.labels().last().map(String::as_str), Some("Element 16"));
    }

    #[test]
    fn from_cells_rejects_bad_cells() {
        assert_eq!(
            RiskMatrix::from_cells(3, &[cell(1, 1, 2)]),
            Err(ValidationError::DiagonalCell(1))
        );
        assert!(matches!(
            RiskMatrix::from_cells(3, &[cell(0, 3, 2)]),
            Err(ValidationError::CellOutOfBounds { .. })
        ));
    }

    #[test]
    fn seeded_matrix_is_clipped_to_the_system() {
        let small = default_matrix(1);
        assert_eq!(small.size(), 16);
        assert_eq!(small.get(0, 0), None);
        assert_eq!(small.get(0, 15), Some(3));
        assert_eq!(small.get(0, 23), None);
        assert_eq!(small.get(6, 15), Some(4));
        assert_eq!(small.row_total(0), 12);
        assert_eq!(small.row_total(7), 0);

        let large = default_matrix(3);
        assert_eq!(large.size(), 25);
        assert_eq!(large.get(0, 23), Some(5));
        assert_eq!(large.get(1, 0), Some(7));
        assert_eq!(large.get(6, 23), Some(6));
        assert_eq!(large.row_total(0), 43);

        let fallback = default_matrix(9);
        assert_eq!(fallback.size(), FALLBACK_ELEMENT_COUNT);
        assert_eq!(fallback.get(3, 8), Some(1));
        assert_eq!(fallback.row_total(6), 1);
    }

    #[test]
    fn seeded_hotspots() {
        let top = default_matrix(1).hotspots(3);
        assert_eq!(top, vec![cell(3, 13, 14), cell(4, 15, 14), cell(3, 14, 13)]);
    }

    #[test]
    fn totals_and_hotspots() {
        let m = RiskMatrix::from_cells(
            4,
            &[cell(0, 1, 5), cell(0, 2, 1), cell(1, 0, 7), cell(3, 2, 5)],
        )
        .unwrap();
        assert_eq!(m.row_total(0), 6);
        assert_eq!(m.row_total(2), 0);
        let top = m.hotspots(2);
        assert_eq!(top, vec![cell(1, 0, 7), cell(0, 1, 5)]);
        assert_eq!(m.hotspots(10).len(), 4);
    }
}
