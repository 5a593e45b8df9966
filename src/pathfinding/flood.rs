//! Single-source reachability (Dijkstra flood)
//!
//! Used where there is no single destination: the cost map needs the cost of
//! reaching every hex, not one route.

use ordered_float::OrderedFloat;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::map::Location;
use crate::pathfinding::astar::CostCalculator;

/// Cheapest cost from one origin to every hex of a width x height grid
#[derive(Debug, Clone, PartialEq)]
pub struct ReachMap {
    width: u32,
    height: u32,
    costs: Vec<Option<f64>>,
}

impl ReachMap {
    fn index(&self, loc: Location) -> Option<usize> {
        if loc.x < 0 || loc.y < 0 || loc.x as u32 >= self.width || loc.y as u32 >= self.height {
            return None;
        }
        Some(loc.y as usize * self.width as usize + loc.x as usize)
    }

    pub fn cost_at(&self, loc: Location) -> Option<f64> {
        self.index(loc).and_then(|i| self.costs[i])
    }

    /// Reached hexes with their costs, row-major
    pub fn reached(&self) -> impl Iterator<Item = (Location, f64)> + '_ {
        let width = self.width as usize;
        self.costs.iter().enumerate().filter_map(move |(i, cost)| {
            cost.map(|c| (Location::new((i % width) as i32, (i / width) as i32), c))
        })
    }

    pub fn reached_count(&self) -> usize {
        self.costs.iter().filter(|c| c.is_some()).count()
    }
}

/// Flood outwards from `origin`. Only costs strictly below `limit` are kept.
pub fn flood<C: CostCalculator + ?Sized>(
    calc: &C,
    origin: Location,
    width: u32,
    height: u32,
    limit: f64,
) -> ReachMap {
    let mut reach = ReachMap {
        width,
        height,
        costs: vec![None; (width * height) as usize],
    };
    let Some(start) = reach.index(origin) else {
        return reach;
    };
    let no_path = calc.no_path_value();

    let mut best = vec![f64::INFINITY; reach.costs.len()];
    let mut heap = BinaryHeap::new();
    best[start] = 0.0;
    heap.push(Reverse((OrderedFloat(0.0), origin)));

    while let Some(Reverse((OrderedFloat(cost), loc))) = heap.pop() {
        let Some(index) = reach.index(loc) else {
            continue;
        };
        if reach.costs[index].is_some() || cost > best[index] {
            continue;
        }
        reach.costs[index] = Some(cost);

        for next in loc.neighbors() {
            let Some(next_index) = reach.index(next) else {
                continue;
            };
            if reach.costs[next_index].is_some() {
                continue;
            }
            let step = calc.cost(loc, next, cost, false);
            if step >= no_path {
                continue;
            }
            let next_cost = cost + step;
            if next_cost < limit && next_cost < best[next_index] {
                best[next_index] = next_cost;
                heap.push(Reverse((OrderedFloat(next_cost), next)));
            }
        }
    }

    reach
}
