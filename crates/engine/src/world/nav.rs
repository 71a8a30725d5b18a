use glam::Vec3;
use tracing::debug;

use super::grid::{GridCoord, TileGrid};

/// Neighbour visiting order: cardinals first, then diagonals.
const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (-1, -1),
    (-1, 1),
    (1, -1),
    (1, 1),
];

/// Plans a walk between two world points.
///
/// The result holds the centres of the cells after the start cell up to and including the
/// goal cell. When start and goal share a cell the result is that single centre. An empty
/// result means either endpoint lies outside the grid or the goal cannot be reached.
pub fn find_path(grid: &TileGrid, start: Vec3, goal: Vec3) -> Vec<Vec3> {
    let start_cell = grid.world_to_grid(start.x, start.z);
    let goal_cell = grid.world_to_grid(goal.x, goal.z);
    if !grid.is_valid_grid_pos(start_cell) || !grid.is_valid_grid_pos(goal_cell) {
        debug!(
            start = ?start_cell,
            goal = ?goal_cell,
            reason = "out_of_bounds",
            "path_rejected"
        );
        return Vec::new();
    }

    let Some(cells) = find_cell_path(grid, start_cell, goal_cell) else {
        debug!(
            start = ?start_cell,
            goal = ?goal_cell,
            reason = "unreachable",
            "path_rejected"
        );
        return Vec::new();
    };

    let waypoints: Vec<Vec3> = if cells.len() == 1 {
        vec![grid.grid_to_world(goal_cell)]
    } else {
        cells
            .iter()
            .skip(1)
            .map(|cell| grid.grid_to_world(*cell))
            .collect()
    };
    debug!(
        start = ?start_cell,
        goal = ?goal_cell,
        waypoint_count = waypoints.len(),
        "path_found"
    );
    waypoints
}

/// A* over 8-connected cells with unit edge cost and a Manhattan heuristic.
///
/// Returns the full cell sequence including `start`. Closed cells are never reopened, and
/// among open cells with equal `f` the one inserted first is expanded first. The start
/// cell's own walkability is not checked; unwalkable neighbours are never entered.
pub fn find_cell_path(
    grid: &TileGrid,
    start: GridCoord,
    goal: GridCoord,
) -> Option<Vec<GridCoord>> {
    let start_index = grid.index_of(start)?;
    let goal_index = grid.index_of(goal)?;

    let node_count = grid.cell_count();
    let mut closed = vec![false; node_count];
    let mut parent = vec![None::<usize>; node_count];
    let mut open: Vec<OpenNode> = Vec::new();
    let mut next_insertion = 0u64;

    let start_h = manhattan_distance(start, goal);
    open.push(OpenNode {
        index: start_index,
        g_cost: 0,
        h_cost: start_h,
        f_cost: start_h,
        insertion_order: next_insertion,
    });
    next_insertion += 1;

    while !open.is_empty() {
        let best = pick_best_open_node_index(&open);
        let current = open.swap_remove(best);
        closed[current.index] = true;

        if current.index == goal_index {
            return reconstruct_cell_path(grid, &parent, start_index, goal_index);
        }

        let Some(current_coord) = grid.coord_of(current.index) else {
            continue;
        };
        for (dx, dz) in NEIGHBOR_OFFSETS {
            let neighbor = GridCoord::new(current_coord.x + dx, current_coord.z + dz);
            let Some(neighbor_index) = grid.index_of(neighbor) else {
                continue;
            };
            if closed[neighbor_index] || !grid.is_walkable(neighbor) {
                continue;
            }

            let tentative_g = current.g_cost + 1;
            match open.iter_mut().find(|node| node.index == neighbor_index) {
                Some(existing) => {
                    if tentative_g < existing.g_cost {
                        existing.g_cost = tentative_g;
                        existing.f_cost = tentative_g + existing.h_cost;
                        parent[neighbor_index] = Some(current.index);
                    }
                }
                None => {
                    let h_cost = manhattan_distance(neighbor, goal);
                    parent[neighbor_index] = Some(current.index);
                    open.push(OpenNode {
                        index: neighbor_index,
                        g_cost: tentative_g,
                        h_cost,
                        f_cost: tentative_g + h_cost,
                        insertion_order: next_insertion,
                    });
                    next_insertion += 1;
                }
            }
        }
    }

    None
}

#[derive(Debug, Clone, Copy)]
struct OpenNode {
    index: usize,
    g_cost: u32,
    h_cost: u32,
    f_cost: u32,
    insertion_order: u64,
}

fn pick_best_open_node_index(open: &[OpenNode]) -> usize {
    let mut best_index = 0usize;
    for index in 1..open.len() {
        if open_node_order_key(&open[index]) < open_node_order_key(&open[best_index]) {
            best_index = index;
        }
    }
    best_index
}

// An updated node keeps its original insertion order.
fn open_node_order_key(node: &OpenNode) -> (u32, u64) {
    (node.f_cost, node.insertion_order)
}

fn reconstruct_cell_path(
    grid: &TileGrid,
    parent: &[Option<usize>],
    start_index: usize,
    goal_index: usize,
) -> Option<Vec<GridCoord>> {
    let mut cursor = goal_index;
    let mut indices = vec![cursor];
    while cursor != start_index {
        cursor = parent.get(cursor).copied().flatten()?;
        indices.push(cursor);
    }
    indices.reverse();
    indices
        .into_iter()
        .map(|index| grid.coord_of(index))
        .collect()
}

fn manhattan_distance(a: GridCoord, b: GridCoord) -> u32 {
    a.x.abs_diff(b.x) + a.z.abs_diff(b.z)
}
