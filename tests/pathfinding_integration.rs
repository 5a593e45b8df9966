//! Pathfinding integration tests
//!
//! A* against a brute-force relaxation on random weighted grids, plus the
//! board-aware move cost calculator.

use proptest::prelude::*;

use keep_recruiter::board::{GameBoard, Side};
use keep_recruiter::core::{SideId, TeamId};
use keep_recruiter::map::{GameMap, Location, Terrain};
use keep_recruiter::pathfinding::{CostCalculator, MoveCostCalculator, SearchContext, NO_PATH_VALUE};
use keep_recruiter::units::UnitType;

/// Per-hex entry cost; 0 marks a wall
struct Grid {
    width: u32,
    costs: Vec<u8>,
}

impl Grid {
    fn height(&self) -> u32 {
        self.costs.len() as u32 / self.width
    }

    fn index(&self, loc: Location) -> Option<usize> {
        let on_board = loc.x >= 0 && loc.y >= 0 && (loc.x as u32) < self.width && (loc.y as u32) < self.height();
        on_board.then(|| loc.y as usize * self.width as usize + loc.x as usize)
    }

    /// Entry cost of `loc`, `None` for walls and off-board hexes
    fn entry(&self, loc: Location) -> Option<u32> {
        match self.index(loc).map(|i| self.costs[i]) {
            Some(0) | None => None,
            Some(cost) => Some(cost as u32),
        }
    }

    /// Shortest costs from `src` by relaxing every edge until nothing changes
    fn relaxed_costs(&self, src: Location) -> Vec<Option<u32>> {
        let mut best: Vec<Option<u32>> = vec![None; self.costs.len()];
        best[self.index(src).unwrap()] = Some(0);
        let mut changed = true;
        while changed {
            changed = false;
            for y in 0..self.height() as i32 {
                for x in 0..self.width as i32 {
                    let from = Location::new(x, y);
                    let Some(so_far) = best[self.index(from).unwrap()] else {
                        continue;
                    };
                    for to in from.neighbors() {
                        let Some(step) = self.entry(to) else {
                            continue;
                        };
                        let slot = &mut best[self.index(to).unwrap()];
                        if slot.map_or(true, |known| so_far + step < known) {
                            *slot = Some(so_far + step);
                            changed = true;
                        }
                    }
                }
            }
        }
        best
    }
}

impl CostCalculator for Grid {
    fn cost(&self, _from: Location, to: Location, _so_far: f64, _is_dst: bool) -> f64 {
        self.entry(to).map_or(NO_PATH_VALUE, |cost| cost as f64)
    }
}

fn grid_strategy() -> impl Strategy<Value = (u32, u32, Vec<u8>)> {
    (2u32..10, 2u32..10).prop_flat_map(|(w, h)| {
        // one hex in five is a wall
        let cell = prop_oneof![1 => Just(0u8), 4 => 1u8..5];
        (Just(w), Just(h), proptest::collection::vec(cell, (w * h) as usize))
    })
}

proptest! {
    #[test]
    fn astar_matches_brute_force(
        (width, height, costs) in grid_strategy(),
        sx in 0u32..10, sy in 0u32..10, dx in 0u32..10, dy in 0u32..10,
    ) {
        let src = Location::new((sx % width) as i32, (sy % height) as i32);
        let dst = Location::new((dx % width) as i32, (dy % height) as i32);
        let grid = Grid { width, costs };

        let expected = grid.relaxed_costs(src)[grid.index(dst).unwrap()];
        let mut ctx = SearchContext::new();
        let route = ctx.search(src, dst, f64::INFINITY, &grid, width, height, None);

        match expected {
            Some(expected) => {
                prop_assert!(route.is_reachable());
                prop_assert_eq!(route.move_cost, expected as f64);
                prop_assert_eq!(route.steps.first(), Some(&src));
                prop_assert_eq!(route.steps.last(), Some(&dst));
                // adjacent steps whose entry costs add up to the route cost
                let mut walked = 0;
                for pair in route.steps.windows(2) {
                    prop_assert!(pair[0].is_adjacent(&pair[1]));
                    let step = grid.entry(pair[1]);
                    prop_assert!(step.is_some());
                    walked += step.unwrap_or(0);
                }
                prop_assert_eq!(walked, expected);
            }
            None => {
                prop_assert!(!route.is_reachable());
                prop_assert_eq!(route.move_cost, NO_PATH_VALUE);
            }
        }
    }

    #[test]
    fn cutoff_never_returns_expensive_routes(
        (width, height, costs) in grid_strategy(),
        cutoff in 1.0f64..20.0,
    ) {
        let grid = Grid { width, costs };
        let src = Location::new(0, 0);
        let dst = Location::new(width as i32 - 1, height as i32 - 1);
        let mut ctx = SearchContext::new();
        let route = ctx.search(src, dst, cutoff, &grid, width, height, None);
        if route.is_reachable() {
            prop_assert!(route.move_cost < cutoff);
        }
    }
}

#[test]
fn test_enemy_units_block_the_way() {
    let map = GameMap::from_ascii(
        "
        . . .
        . . .
        ",
    )
    .unwrap();
    let mut walker = UnitType::new("Walker", 14, 30, 5);
    for terrain in Terrain::ALL {
        walker.movement_costs.insert(terrain, 1);
    }
    let mut board = GameBoard::new(map);
    board.add_side(Side::new(SideId(1), TeamId(1), 0)).unwrap();
    board.add_side(Side::new(SideId(2), TeamId(2), 0)).unwrap();

    let src = Location::new(0, 0);
    let dst = Location::new(2, 0);
    let mut ctx = SearchContext::new();
    let open = ctx.search(src, dst, 10.0, &MoveCostCalculator::new(&board, &walker, SideId(1)), 3, 2, None);
    assert_eq!(open.move_cost, 2.0);

    // wall of enemies in the middle column
    board.spawn_unit(&walker, SideId(2), Location::new(1, 0)).unwrap();
    board.spawn_unit(&walker, SideId(2), Location::new(1, 1)).unwrap();
    let blocked = ctx.search(src, dst, 10.0, &MoveCostCalculator::new(&board, &walker, SideId(1)), 3, 2, None);
    assert!(!blocked.is_reachable());

    let ghost = MoveCostCalculator::new(&board, &walker, SideId(1)).ignoring_units();
    assert_eq!(ctx.search(src, dst, 10.0, &ghost, 3, 2, None).move_cost, 2.0);
}
