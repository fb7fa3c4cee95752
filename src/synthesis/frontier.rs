//! Onion-skin growth order
//!
//! The frontier is the one-pixel square dilation of the filled region minus
//! the region itself. It is rebuilt from the mask on every pass since filling
//! pixels changes which positions become eligible next.

use bitvec::prelude::*;
use ndarray::Array2;

static NEIGHBOR_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Positions of the 8-connected neighbors of a pixel that lie inside the grid
pub fn neighbors(
    position: [usize; 2],
    dims: (usize, usize),
) -> impl Iterator<Item = [usize; 2]> {
    NEIGHBOR_OFFSETS.iter().filter_map(move |&(dr, dc)| {
        let r = position[0].checked_add_signed(dr)?;
        let c = position[1].checked_add_signed(dc)?;
        (r < dims.0 && c < dims.1).then_some([r, c])
    })
}

/// Count filled 8-neighbors of a pixel
pub fn filled_neighbor_count(filled: &Array2<bool>, position: [usize; 2]) -> usize {
    neighbors(position, filled.dim())
        .filter(|&p| filled.get(p).copied().unwrap_or(false))
        .count()
}

/// Compute the next layer of pixels eligible for synthesis
///
/// Returns every unfilled pixel with at least one filled 8-neighbor. Pixels
/// with more filled neighbors come first since they carry the most context;
/// ties keep row-major order. An empty result means the mask is full (or
/// holds nothing to grow from).
pub fn growth_frontier(filled: &Array2<bool>) -> Vec<[usize; 2]> {
    let (rows, cols) = filled.dim();
    let mut eligible = bitvec![0; rows * cols];

    for ((r, c), &is_filled) in filled.indexed_iter() {
        if !is_filled {
            continue;
        }
        for [nr, nc] in neighbors([r, c], (rows, cols)) {
            if !filled.get([nr, nc]).copied().unwrap_or(true) {
                eligible.set(nr * cols + nc, true);
            }
        }
    }

    let mut frontier: Vec<([usize; 2], usize)> = eligible
        .iter_ones()
        .map(|flat| {
            let position = [flat / cols, flat % cols];
            (position, filled_neighbor_count(filled, position))
        })
        .collect();

    // Stable sort keeps row-major order among equally constrained pixels
    frontier.sort_by(|a, b| b.1.cmp(&a.1));
    frontier.into_iter().map(|(position, _)| position).collect()
}

/// Number of filled pixels in a mask
pub fn filled_count(filled: &Array2<bool>) -> usize {
    filled.iter().filter(|&&is_filled| is_filled).count()
}
