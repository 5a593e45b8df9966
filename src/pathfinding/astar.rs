//! A* search over the hex grid
//!
//! The search context owns a node arena and a dense location -> node table.
//! Both survive between searches and are reset rather than reallocated, so a
//! caller that keeps one `SearchContext` around pays for allocation once.
//!
//! The open list is a binary min-heap of arena indices ordered by `g + h`.
//! Decreasing the key of an open node is repaired with a sift-up. When an
//! expansion reopens an already closed node the heap is rebuilt in one pass
//! instead.

use std::collections::BTreeSet;

use crate::map::Location;

/// Default cost meaning "cannot get there"
pub const NO_PATH_VALUE: f64 = 10_000_000.0;

const NO_NODE: u32 = u32::MAX;
const NOT_IN_HEAP: usize = usize::MAX;

/// Edge costs and the search heuristic
pub trait CostCalculator {
    /// Cost of stepping from `from` into the adjacent (or teleport-linked) `to`.
    /// `so_far` is the cost accumulated up to `from`. Anything at or above
    /// `no_path_value()` is impassable. Passable steps must cost at least 1.
    fn cost(&self, from: Location, to: Location, so_far: f64, is_dst: bool) -> f64;

    fn no_path_value(&self) -> f64 {
        NO_PATH_VALUE
    }

    /// Lower bound on the remaining cost. Hex distance is admissible as long as
    /// every step costs at least 1.
    fn heuristic(&self, from: Location, to: Location) -> f64 {
        from.distance(&to) as f64
    }
}

/// Result of a search
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    /// Source to destination inclusive; empty when unreachable
    pub steps: Vec<Location>,
    /// Total cost, or the calculator's no-path value when unreachable
    pub move_cost: f64,
}

impl Route {
    fn unreachable(no_path_value: f64) -> Self {
        Self {
            steps: Vec::new(),
            move_cost: no_path_value,
        }
    }

    pub fn is_reachable(&self) -> bool {
        !self.steps.is_empty()
    }
}

/// Counters from the most recent search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub nodes_created: usize,
    pub expansions: usize,
    pub reopened: usize,
    pub heap_rebuilds: usize,
}

#[derive(Debug, Clone)]
struct SearchNode {
    loc: Location,
    g: f64,
    h: f64,
    /// Arena index of the predecessor, `NO_NODE` for the source
    parent: u32,
    closed: bool,
    heap_pos: usize,
}

impl SearchNode {
    fn total(&self) -> f64 {
        self.g + self.h
    }
}

/// Arena of search nodes, reused across searches
#[derive(Debug, Default)]
struct NodePool {
    nodes: Vec<SearchNode>,
    used: usize,
}

impl NodePool {
    fn reset(&mut self) {
        self.used = 0;
    }

    fn alloc(&mut self, node: SearchNode) -> u32 {
        let index = self.used;
        if index < self.nodes.len() {
            self.nodes[index] = node;
        } else {
            self.nodes.push(node);
        }
        self.used += 1;
        index as u32
    }

    fn get(&self, index: u32) -> &SearchNode {
        &self.nodes[index as usize]
    }

    fn get_mut(&mut self, index: u32) -> &mut SearchNode {
        &mut self.nodes[index as usize]
    }
}

/// Dense width x height table of arena indices
#[derive(Debug, Default)]
struct SearchWorld {
    width: usize,
    height: usize,
    cells: Vec<u32>,
}

impl SearchWorld {
    fn prepare(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.cells.clear();
        self.cells.resize(width * height, NO_NODE);
    }

    fn index(&self, loc: Location) -> Option<usize> {
        if loc.x < 0 || loc.y < 0 || loc.x as usize >= self.width || loc.y as usize >= self.height {
            return None;
        }
        Some(loc.y as usize * self.width + loc.x as usize)
    }

    fn node_at(&self, cell: usize) -> Option<u32> {
        match self.cells[cell] {
            NO_NODE => None,
            index => Some(index),
        }
    }
}

/// Reusable A* state. Not shared between threads; give each its own.
#[derive(Debug, Default)]
pub struct SearchContext {
    pool: NodePool,
    world: SearchWorld,
    open: Vec<u32>,
    stats: SearchStats,
}

impl SearchContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_stats(&self) -> SearchStats {
        self.stats
    }

    /// Drop all per-search state but keep the allocations
    pub fn reset(&mut self) {
        self.pool.reset();
        self.open.clear();
        self.stats = SearchStats::default();
    }

    /// Find the cheapest route from `src` to `dst`.
    ///
    /// Only routes costing strictly less than `cutoff` are returned. Teleport
    /// locations are linked to each other by an extra edge, priced by the
    /// calculator like any other step.
    #[allow(clippy::too_many_arguments)]
    pub fn search<C: CostCalculator + ?Sized>(
        &mut self,
        src: Location,
        dst: Location,
        cutoff: f64,
        calc: &C,
        width: u32,
        height: u32,
        teleports: Option<&BTreeSet<Location>>,
    ) -> Route {
        self.reset();
        self.world.prepare(width as usize, height as usize);

        let no_path = calc.no_path_value();
        let (Some(src_cell), Some(_)) = (self.world.index(src), self.world.index(dst)) else {
            tracing::warn!("A* search with off-board endpoint: {} -> {}", src, dst);
            return Route::unreachable(no_path);
        };

        if src == dst {
            return Route {
                steps: vec![src],
                move_cost: 0.0,
            };
        }

        if calc.cost(src, dst, 0.0, true) >= cutoff {
            tracing::debug!("A* search {} -> {} rejected: destination out of budget", src, dst);
            return Route::unreachable(no_path);
        }

        let teleports = teleports.filter(|t| !t.is_empty());

        let src_node = self.new_node(src, dst, 0.0, NO_NODE, calc, teleports);
        self.world.cells[src_cell] = src_node;
        self.heap_push(src_node);

        let mut candidates: Vec<Location> = Vec::with_capacity(6);
        let mut pending: Vec<u32> = Vec::new();
        let mut decreased: Vec<u32> = Vec::new();

        while let Some(current) = self.heap_pop() {
            let (loc, g) = {
                let node = self.pool.get_mut(current);
                node.closed = true;
                (node.loc, node.g)
            };

            if loc == dst {
                return self.reconstruct(current, src);
            }
            self.stats.expansions += 1;

            candidates.clear();
            candidates.extend(loc.neighbors());
            if let Some(teleports) = teleports {
                if teleports.contains(&loc) {
                    candidates.extend(teleports.iter().copied().filter(|t| *t != loc));
                }
            }

            pending.clear();
            decreased.clear();
            let mut reopened = false;

            for &next in &candidates {
                let Some(cell) = self.world.index(next) else {
                    continue;
                };

                let step = calc.cost(loc, next, g, next == dst);
                if step >= no_path {
                    continue;
                }
                let new_g = g + step;
                if new_g >= cutoff {
                    continue;
                }

                match self.world.node_at(cell) {
                    None => {
                        let index = self.new_node(next, dst, new_g, current, calc, teleports);
                        self.world.cells[cell] = index;
                        pending.push(index);
                    }
                    Some(index) => {
                        let node = self.pool.get_mut(index);
                        if new_g >= node.g {
                            continue;
                        }
                        node.g = new_g;
                        node.parent = current;
                        if node.closed {
                            node.closed = false;
                            reopened = true;
                            self.stats.reopened += 1;
                            pending.push(index);
                        } else if node.heap_pos != NOT_IN_HEAP {
                            decreased.push(index);
                        }
                        // otherwise it is already queued in `pending` with the new key
                    }
                }
            }

            if reopened {
                for &index in &pending {
                    self.pool.get_mut(index).heap_pos = self.open.len();
                    self.open.push(index);
                }
                self.make_heap();
            } else {
                for &index in &decreased {
                    let pos = self.pool.get(index).heap_pos;
                    self.sift_up(pos);
                }
                for &index in &pending {
                    self.heap_push(index);
                }
            }
        }

        tracing::debug!("A* search {} -> {}: no route", src, dst);
        Route::unreachable(no_path)
    }

    fn new_node<C: CostCalculator + ?Sized>(
        &mut self,
        loc: Location,
        dst: Location,
        g: f64,
        parent: u32,
        calc: &C,
        teleports: Option<&BTreeSet<Location>>,
    ) -> u32 {
        let mut h = calc.heuristic(loc, dst);
        if let Some(teleports) = teleports {
            // Walk to the nearest teleport, hop, walk from the teleport nearest the goal
            let to_teleport = teleports
                .iter()
                .map(|t| calc.heuristic(loc, *t))
                .fold(f64::INFINITY, f64::min);
            let from_teleport = teleports
                .iter()
                .map(|t| calc.heuristic(*t, dst))
                .fold(f64::INFINITY, f64::min);
            h = h.min(to_teleport + from_teleport + 1.0);
        }

        self.stats.nodes_created += 1;
        self.pool.alloc(SearchNode {
            loc,
            g,
            h,
            parent,
            closed: false,
            heap_pos: NOT_IN_HEAP,
        })
    }

    fn reconstruct(&self, dst_node: u32, src: Location) -> Route {
        let move_cost = self.pool.get(dst_node).g;
        let mut steps = Vec::new();
        let mut current = dst_node;
        while current != NO_NODE {
            let node = self.pool.get(current);
            steps.push(node.loc);
            current = node.parent;
        }
        steps.reverse();
        debug_assert_eq!(steps.first(), Some(&src));
        Route { steps, move_cost }
    }

    // --- binary min-heap over `open` ---

    fn before(&self, a: u32, b: u32) -> bool {
        let (a, b) = (self.pool.get(a), self.pool.get(b));
        let (ta, tb) = (a.total(), b.total());
        if ta != tb {
            return ta < tb;
        }
        // Prefer the node closer to the goal, then a fixed spatial order
        if a.h != b.h {
            return a.h < b.h;
        }
        a.loc < b.loc
    }

    fn set_slot(&mut self, pos: usize, index: u32) {
        self.open[pos] = index;
        self.pool.get_mut(index).heap_pos = pos;
    }

    fn sift_up(&mut self, mut pos: usize) {
        let index = self.open[pos];
        while pos > 0 {
            let parent = (pos - 1) / 2;
            let parent_index = self.open[parent];
            if !self.before(index, parent_index) {
                break;
            }
            self.set_slot(pos, parent_index);
            pos = parent;
        }
        self.set_slot(pos, index);
    }

    fn sift_down(&mut self, mut pos: usize) {
        let len = self.open.len();
        let index = self.open[pos];
        loop {
            let left = 2 * pos + 1;
            if left >= len {
                break;
            }
            let right = left + 1;
            let child = if right < len && self.before(self.open[right], self.open[left]) {
                right
            } else {
                left
            };
            if !self.before(self.open[child], index) {
                break;
            }
            let child_index = self.open[child];
            self.set_slot(pos, child_index);
            pos = child;
        }
        self.set_slot(pos, index);
    }

    fn heap_push(&mut self, index: u32) {
        self.open.push(index);
        let pos = self.open.len() - 1;
        self.sift_up(pos);
    }

    fn heap_pop(&mut self) -> Option<u32> {
        if self.open.is_empty() {
            return None;
        }
        let top = self.open.swap_remove(0);
        self.pool.get_mut(top).heap_pos = NOT_IN_HEAP;
        if !self.open.is_empty() {
            self.sift_down(0);
        }
        Some(top)
    }

    fn make_heap(&mut self) {
        self.stats.heap_rebuilds += 1;
        for pos in 0..self.open.len() {
            let index = self.open[pos];
            self.pool.get_mut(index).heap_pos = pos;
        }
        for pos in (0..self.open.len() / 2).rev() {
            self.sift_down(pos);
        }
    }
}
