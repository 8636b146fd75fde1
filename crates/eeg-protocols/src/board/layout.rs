//! Row layout of the captured data block.
//!
//! The SDK returns a 2-D array where each row is a channel (or a bookkeeping
//! series such as the package counter) and each column is one sample.
//! Layout of the 8-channel OpenBCI Cyton board as reported by the SDK:
//!
//! | Rows | Content |
//! |------|---------|
//! | 0 | package number |
//! | 1–8 | EXG: Fp1, Fp2, C3, C4, P7, P8, O1, O2 |
//! | 9–11 | accelerometer X, Y, Z |
//! | 12–18 | other |
//! | 19–21 | analog |
//! | 22 | timestamp (UNIX seconds) |
//! | 23 | marker |

use ndarray::Array2;

/// Named row indices of a board's data block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelLayout {
    pub package_num: usize,
    pub exg: &'static [usize],
    pub exg_names: &'static [&'static str],
    pub accel: &'static [usize],
    pub other: &'static [usize],
    pub analog: &'static [usize],
    pub timestamp: usize,
    pub marker: usize,
}

/// A marker found in a captured data block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerEvent {
    /// Column (sample index) the marker is attached to.
    pub sample: usize,
    pub value: f64,
}

/// Cyton layout (board id 0); the synthetic board mirrors it.
pub const CYTON: ChannelLayout = ChannelLayout {
    package_num: 0,
    exg: &[1, 2, 3, 4, 5, 6, 7, 8],
    exg_names: &["Fp1", "Fp2", "C3", "C4", "P7", "P8", "O1", "O2"],
    accel: &[9, 10, 11],
    other: &[12, 13, 14, 15, 16, 17, 18],
    analog: &[19, 20, 21],
    timestamp: 22,
    marker: 23,
};

impl ChannelLayout {
    /// Number of rows in a data block with this layout.
    #[must_use]
    pub fn num_rows(&self) -> usize {
        let max_of = |rows: &[usize]| rows.iter().copied().max().unwrap_or(0);
        [
            self.package_num,
            max_of(self.exg),
            max_of(self.accel),
            max_of(self.other),
            max_of(self.analog),
            self.timestamp,
            self.marker,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
            + 1
    }

    /// Electrode name of an EXG row, if `row` is one.
    #[must_use]
    pub fn exg_name(&self, row: usize) -> Option<&'static str> {
        self.exg
            .iter()
            .position(|&r| r == row)
            .and_then(|i| self.exg_names.get(i).copied())
    }

    /// Non-zero entries of the marker row, in sample order.
    ///
    /// Returns an empty list when the block has no marker row.
    #[must_use]
    pub fn marker_events(&self, data: &Array2<f64>) -> Vec<MarkerEvent> {
        if self.marker >= data.nrows() {
            return Vec::new();
        }
        data.row(self.marker)
            .iter()
            .enumerate()
            .filter(|&(_, &value)| value != 0.0)
            .map(|(sample, &value)| MarkerEvent { sample, value })
            .collect()
    }
}
