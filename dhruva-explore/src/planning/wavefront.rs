//! Cost-ordered multi-source propagation shared by every transform.
//!
//! Dijkstra on the 8-connected grid with two base edge weights. Labels are
//! `(cost, owner)` pairs compared in that order, where the owner is the seed
//! a wave started from. A cell equally close to two seeds therefore belongs
//! to the lower-indexed one, and the heap key `(cost, owner, index)` keeps
//! the result deterministic.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use super::field::TransformField;
use super::{DIAGONAL_COST, STRAIGHT_COST};
use crate::grid::OccupancyGrid;

/// Counters from one propagation run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct WavefrontStats {
    /// Seeds that were inside the field
    pub seeded: usize,
    /// Cells popped and expanded (each at most once)
    pub finalized: usize,
}

/// Spread costs outward from `seeds` into `field`.
///
/// * `passable` - whether the wave may enter a cell (seeds are exempt)
/// * `extra_cost` - surcharge for entering a cell, added to the base step
/// * `cutoff` - cells whose cost exceeds this are finalized but not expanded
pub(crate) fn propagate<S, P, C>(
    grid: &OccupancyGrid,
    field: &mut TransformField,
    seeds: S,
    passable: P,
    extra_cost: C,
    cutoff: Option<u32>,
) -> WavefrontStats
where
    S: IntoIterator<Item = (usize, u32)>,
    P: Fn(usize) -> bool,
    C: Fn(usize) -> u32,
{
    let mut stats = WavefrontStats::default();
    let mut heap = BinaryHeap::new();
    let mut finalized = vec![false; field.len()];

    for (index, cost) in seeds {
        if !grid.is_valid(index) || !field.relax(index, cost, index) {
            continue;
        }
        field.mark_seed(index);
        heap.push(Reverse((cost, index, index)));
        stats.seeded += 1;
    }

    while let Some(Reverse((cost, owner, index))) = heap.pop() {
        // Stale entry: a better label already replaced this one
        if finalized[index] || (cost, owner) != (field.cost(index), field.owner_key(index)) {
            continue;
        }
        finalized[index] = true;
        stats.finalized += 1;

        if cutoff.is_some_and(|limit| cost > limit) {
            continue;
        }

        for (slot, neighbor) in grid.adjacent(index).into_iter().enumerate() {
            let Some(neighbor) = neighbor else {
                continue;
            };
            if finalized[neighbor] || !passable(neighbor) {
                continue;
            }
            let step = if slot < 4 { STRAIGHT_COST } else { DIAGONAL_COST };
            let candidate = cost
                .saturating_add(step)
                .saturating_add(extra_cost(neighbor));
            if field.relax(neighbor, candidate, owner) {
                heap.push(Reverse((candidate, owner, neighbor)));
            }
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::WorldPoint;
    use crate::grid::CellClass;

    fn open_grid(w: usize, h: usize) -> OccupancyGrid {
        OccupancyGrid::filled(w, h, 0.05, WorldPoint::ZERO, CellClass::Free).unwrap()
    }

    #[test]
    fn test_single_source_octile_costs() {
        let grid = open_grid(5, 5);
        let mut field = TransformField::new(5, 5);
        let stats = propagate(&grid, &mut field, [(0, 0)], |_| true, |_| 0, None);

        assert_eq!(stats.seeded, 1);
        assert_eq!(stats.finalized, 25);
        // (1, 0) straight, (1, 1) diagonal, (4, 2) = 2 diagonals + 2 straights
        assert_eq!(field.cost(1), STRAIGHT_COST);
        assert_eq!(field.cost(6), DIAGONAL_COST);
        assert_eq!(field.cost(2 * 5 + 4), 2 * DIAGONAL_COST + 2 * STRAIGHT_COST);
    }

    #[test]
    fn test_extra_cost_is_added_per_entered_cell() {
        let grid = open_grid(3, 1);
        let mut field = TransformField::new(3, 1);
        propagate(&grid, &mut field, [(0, 0)], |_| true, |_| 10, None);
        assert_eq!(field.cost(0), 0);
        assert_eq!(field.cost(1), 13);
        assert_eq!(field.cost(2), 26);
    }

    #[test]
    fn test_cutoff_stops_expansion() {
        let grid = open_grid(6, 1);
        let mut field = TransformField::new(6, 1);
        propagate(&grid, &mut field, [(0, 0)], |_| true, |_| 0, Some(3));
        assert_eq!(field.cost(1), 3);
        // Cost 6 is finalized but never expanded past
        assert_eq!(field.cost(2), 6);
        assert!(!field.is_reached(3));
    }

    #[test]
    fn test_duplicate_seeds_keep_lowest_cost() {
        let grid = open_grid(4, 1);
        let mut field = TransformField::new(4, 1);
        let stats = propagate(
            &grid,
            &mut field,
            [(3, 9), (3, 2), (0, 0)],
            |_| true,
            |_| 0,
            None,
        );
        assert_eq!(stats.seeded, 3);
        assert_eq!(field.cost(3), 2);
        assert_eq!(field.seeds(), &[3, 0]);
    }

    #[test]
    fn test_out_of_grid_seed_is_ignored() {
        let grid = open_grid(2, 2);
        let mut field = TransformField::new(2, 2);
        let stats = propagate(&grid, &mut field, [(99, 0)], |_| true, |_| 0, None);
        assert_eq!(stats.seeded, 0);
        assert_eq!(field.reached_count(), 0);
    }

    #[test]
    fn test_equidistant_cells_belong_to_lower_seed() {
        let grid = open_grid(5, 1);
        let mut field = TransformField::new(5, 1);
        propagate(&grid, &mut field, [(4, 0), (0, 0)], |_| true, |_| 0, None);
        assert_eq!(field.cost(2), 2 * STRAIGHT_COST);
        assert_eq!(field.owner(2), Some(0));
        assert_eq!(field.owner(1), Some(0));
        assert_eq!(field.owner(3), Some(4));
        assert_eq!(field.owner(4), Some(4));
    }
}
