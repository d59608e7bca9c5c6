/*
 * Continuous Space Module
 *
 * Owns the authoritative position of every agent on a bounded W x H plane
 * and answers radius queries through a uniform bucket grid, so a query only
 * looks at the cells its radius can reach instead of every agent.
 *
 * The plane is either toroidal (positions wrap, distances take the shortest
 * way round) or bounded (positions outside [0, W) x [0, H) are rejected).
 *
 * Cells are sized so they tile the plane exactly; each cell is at least
 * `cell_size` wide, which keeps a query of radius <= cell_size inside the
 * 3x3 block around its own cell. Tiny cell sizes are widened so neither axis
 * has more than `MAX_CELLS_PER_AXIS` cells.
 */

use glam::{dvec2, DVec2};
use std::collections::BTreeMap;

use crate::agent::AgentId;
use crate::error::SpaceError;

pub const MAX_CELLS_PER_AXIS: usize = 1024;

#[derive(Debug, Clone, Copy)]
struct Entry {
    position: DVec2,
    cell: usize,
}

#[derive(Debug, Clone)]
pub struct ContinuousSpace {
    width: f64,
    height: f64,
    toroidal: bool,
    cell_width: f64,
    cell_height: f64,
    columns: usize,
    rows: usize,
    // Row-major buckets of agent ids
    grid: Vec<Vec<AgentId>>,
    entries: BTreeMap<AgentId, Entry>,
}

impl ContinuousSpace {
    pub fn new(width: f64, height: f64, toroidal: bool, cell_size: f64) -> Result<Self, SpaceError> {
        if !(width.is_finite() && width > 0.0 && height.is_finite() && height > 0.0) {
            return Err(SpaceError::InvalidConfig("width and height must be positive"));
        }
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(SpaceError::InvalidConfig("cell_size must be positive"));
        }

        let cell_size = cell_size.max(width.max(height) / MAX_CELLS_PER_AXIS as f64);
        let columns = ((width / cell_size).floor() as usize).clamp(1, MAX_CELLS_PER_AXIS);
        let rows = ((height / cell_size).floor() as usize).clamp(1, MAX_CELLS_PER_AXIS);

        let mut grid = Vec::with_capacity(columns * rows);
        for _ in 0..(columns * rows) {
            grid.push(Vec::new());
        }

        Ok(Self {
            width,
            height,
            toroidal,
            cell_width: width / columns as f64,
            cell_height: height / rows as f64,
            columns,
            rows,
            grid,
            entries: BTreeMap::new(),
        })
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn is_toroidal(&self) -> bool {
        self.toroidal
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, agent: AgentId) -> bool {
        self.entries.contains_key(&agent)
    }

    pub fn position(&self, agent: AgentId) -> Option<DVec2> {
        self.entries.get(&agent).map(|entry| entry.position)
    }

    // All indexed agents in id order
    pub fn agents(&self) -> impl Iterator<Item = (AgentId, DVec2)> + '_ {
        self.entries.iter().map(|(&id, entry)| (id, entry.position))
    }

    /// True iff the space is bounded and `pos` lies outside it.
    ///
    /// Non-finite positions are out of bounds in either topology.
    pub fn is_out_of_bounds(&self, pos: DVec2) -> bool {
        if !pos.is_finite() {
            return true;
        }
        if self.toroidal {
            return false;
        }
        pos.x < 0.0 || pos.x >= self.width || pos.y < 0.0 || pos.y >= self.height
    }

    // Wrap a position onto the torus; bounded spaces return it unchanged
    pub fn wrap(&self, pos: DVec2) -> DVec2 {
        if !self.toroidal {
            return pos;
        }
        dvec2(wrap_coordinate(pos.x, self.width), wrap_coordinate(pos.y, self.height))
    }

    pub fn place(&mut self, agent: AgentId, pos: DVec2) -> Result<DVec2, SpaceError> {
        if self.entries.contains_key(&agent) {
            return Err(SpaceError::AlreadyPlaced(agent));
        }
        let position = self.admit(pos)?;
        let cell = self.cell_index(position);
        self.grid[cell].push(agent);
        self.entries.insert(agent, Entry { position, cell });
        Ok(position)
    }

    pub fn move_agent(&mut self, agent: AgentId, pos: DVec2) -> Result<DVec2, SpaceError> {
        let position = self.admit(pos)?;
        let cell = self.cell_index(position);

        let entry = self
            .entries
            .get_mut(&agent)
            .ok_or(SpaceError::UnknownAgent(agent))?;
        let old_cell = entry.cell;
        entry.position = position;
        entry.cell = cell;

        if old_cell != cell {
            detach(&mut self.grid[old_cell], agent);
            self.grid[cell].push(agent);
        }
        Ok(position)
    }

    pub fn remove(&mut self, agent: AgentId) -> Result<DVec2, SpaceError> {
        let entry = self
            .entries
            .remove(&agent)
            .ok_or(SpaceError::UnknownAgent(agent))?;
        detach(&mut self.grid[entry.cell], agent);
        Ok(entry.position)
    }

    /// Agents whose (wrap-aware) distance to `pos` is at most `radius`.
    ///
    /// Agents sitting exactly on `pos` are left out unless `include_center`
    /// is set. Order follows the bucket scan and carries no meaning.
    pub fn neighbors_within(&self, pos: DVec2, radius: f64, include_center: bool) -> Vec<AgentId> {
        let mut result = Vec::new();
        if !pos.is_finite() || radius.is_nan() || radius < 0.0 {
            return result;
        }
        let pos = self.wrap(pos);

        let columns = cell_span(pos.x, radius, self.cell_width, self.columns, self.toroidal);
        let rows = cell_span(pos.y, radius, self.cell_height, self.rows, self.toroidal);

        for &row in &rows {
            let row_start = row * self.columns;
            for &column in &columns {
                for &agent in &self.grid[row_start + column] {
                    let Some(entry) = self.entries.get(&agent) else {
                        continue;
                    };
                    let distance = self.distance(pos, entry.position);
                    if distance <= radius && (include_center || distance > 0.0) {
                        result.push(agent);
                    }
                }
            }
        }

        result
    }

    /// Displacement from `from` to `to`, taking the short way round on a torus.
    pub fn heading_vector(&self, from: DVec2, to: DVec2) -> DVec2 {
        let mut delta = to - from;
        if self.toroidal {
            delta.x = shortest_offset(delta.x, self.width);
            delta.y = shortest_offset(delta.y, self.height);
        }
        delta
    }

    /// Euclidean distance; on a torus the shortest way round, for any two points.
    pub fn distance(&self, a: DVec2, b: DVec2) -> f64 {
        if self.toroidal {
            self.heading_vector(a, b).length()
        } else {
            a.distance(b)
        }
    }

    fn admit(&self, pos: DVec2) -> Result<DVec2, SpaceError> {
        if self.is_out_of_bounds(pos) {
            return Err(SpaceError::OutOfBounds {
                x: pos.x,
                y: pos.y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(self.wrap(pos))
    }

    #[inline]
    fn cell_index(&self, pos: DVec2) -> usize {
        let column = ((pos.x / self.cell_width) as usize).min(self.columns - 1);
        let row = ((pos.y / self.cell_height) as usize).min(self.rows - 1);
        row * self.columns + column
    }
}

fn wrap_coordinate(value: f64, max: f64) -> f64 {
    let wrapped = value.rem_euclid(max);
    // rem_euclid can round up to `max` for tiny negative inputs
    if wrapped >= max {
        0.0
    } else {
        wrapped
    }
}

// Fold a displacement into [-extent/2, extent/2]; inputs need not be wrapped
fn shortest_offset(delta: f64, extent: f64) -> f64 {
    let delta = if delta.abs() > extent {
        delta.rem_euclid(extent)
    } else {
        delta
    };
    if delta.abs() > extent / 2.0 {
        delta - extent * delta.signum()
    } else {
        delta
    }
}

fn detach(bucket: &mut Vec<AgentId>, agent: AgentId) {
    if let Some(index) = bucket.iter().position(|&id| id == agent) {
        bucket.remove(index);
    }
}

// Cell indices along one axis that a query of `radius` around `coordinate` can touch
fn cell_span(coordinate: f64, radius: f64, cell: f64, count: usize, toroidal: bool) -> Vec<usize> {
    if toroidal {
        // one extra cell absorbs rounding at cell borders
        let reach = (radius / cell).floor().min(count as f64) as isize + 1;
        if 2 * reach + 1 >= count as isize {
            return (0..count).collect();
        }
        let center = (coordinate / cell).floor() as isize;
        let count = count as isize;
        ((center - reach)..=(center + reach))
            .map(|index| index.rem_euclid(count) as usize)
            .collect()
    } else {
        // the query point may lie off the plane, so bound the range from both ends
        let low = (((coordinate - radius) / cell).floor() as isize).saturating_sub(1).max(0);
        let high = (((coordinate + radius) / cell).floor() as isize)
            .saturating_add(1)
            .min(count as isize - 1);
        if low > high {
            return Vec::new();
        }
        (low..=high).map(|index| index as usize).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn brute_force(space: &ContinuousSpace, pos: DVec2, radius: f64, include_center: bool) -> Vec<AgentId> {
        let mut found: Vec<AgentId> = space
            .agents()
            .filter(|&(_, p)| {
                let d = space.distance(pos, p);
                d <= radius && (include_center || d > 0.0)
            })
            .map(|(id, _)| id)
            .collect();
        found.sort();
        found
    }

    fn sorted(mut ids: Vec<AgentId>) -> Vec<AgentId> {
        ids.sort();
        ids
    }

    #[test]
    fn rejects_bad_geometry() {
        assert!(ContinuousSpace::new(0.0, 10.0, false, 1.0).is_err());
        assert!(ContinuousSpace::new(10.0, f64::NAN, false, 1.0).is_err());
        assert!(ContinuousSpace::new(10.0, 10.0, false, 0.0).is_err());
        // cell bigger than the plane still gives one cell
        let space = ContinuousSpace::new(10.0, 10.0, true, 50.0).unwrap();
        assert_eq!(space.columns, 1);
        assert_eq!(space.rows, 1);
    }

    #[test]
    fn bounded_place_rejects_outside_positions() {
        let mut space = ContinuousSpace::new(10.0, 5.0, false, 2.0).unwrap();
        assert!(matches!(
            space.place(AgentId(1), dvec2(10.0, 1.0)),
            Err(SpaceError::OutOfBounds { .. })
        ));
        assert!(matches!(
            space.place(AgentId(1), dvec2(1.0, -0.1)),
            Err(SpaceError::OutOfBounds { .. })
        ));
        assert_eq!(space.place(AgentId(1), dvec2(0.0, 0.0)), Ok(dvec2(0.0, 0.0)));
        assert_eq!(
            space.place(AgentId(1), dvec2(1.0, 1.0)),
            Err(SpaceError::AlreadyPlaced(AgentId(1)))
        );
        assert!(space.is_out_of_bounds(dvec2(f64::NAN, 1.0)));
    }

    #[test]
    fn toroidal_place_and_move_wrap() {
        let mut space = ContinuousSpace::new(10.0, 10.0, true, 3.0).unwrap();
        assert_eq!(space.place(AgentId(1), dvec2(12.0, -1.0)), Ok(dvec2(2.0, 9.0)));
        assert_eq!(space.move_agent(AgentId(1), dvec2(-0.5, 10.0)), Ok(dvec2(9.5, 0.0)));
        assert_eq!(space.position(AgentId(1)), Some(dvec2(9.5, 0.0)));
        assert!(!space.is_out_of_bounds(dvec2(-100.0, 300.0)));
    }

    #[test]
    fn move_and_remove_unknown_agent_fail() {
        let mut space = ContinuousSpace::new(10.0, 10.0, false, 2.0).unwrap();
        assert_eq!(
            space.move_agent(AgentId(3), dvec2(1.0, 1.0)),
            Err(SpaceError::UnknownAgent(AgentId(3)))
        );
        assert_eq!(space.remove(AgentId(3)), Err(SpaceError::UnknownAgent(AgentId(3))));

        space.place(AgentId(3), dvec2(1.0, 1.0)).unwrap();
        assert_eq!(space.remove(AgentId(3)), Ok(dvec2(1.0, 1.0)));
        assert!(space.is_empty());
        assert!(space.neighbors_within(dvec2(1.0, 1.0), 5.0, true).is_empty());
    }

    #[test]
    fn failed_move_leaves_agent_in_place() {
        let mut space = ContinuousSpace::new(10.0, 10.0, false, 2.0).unwrap();
        space.place(AgentId(1), dvec2(5.0, 5.0)).unwrap();
        assert!(space.move_agent(AgentId(1), dvec2(11.0, 5.0)).is_err());
        assert_eq!(space.position(AgentId(1)), Some(dvec2(5.0, 5.0)));
        assert_eq!(space.neighbors_within(dvec2(5.0, 5.0), 0.0, true), vec![AgentId(1)]);
    }

    #[test]
    fn neighbors_respect_center_flag() {
        let mut space = ContinuousSpace::new(10.0, 10.0, false, 2.0).unwrap();
        space.place(AgentId(1), dvec2(5.0, 5.0)).unwrap();
        space.place(AgentId(2), dvec2(6.0, 5.0)).unwrap();
        space.place(AgentId(3), dvec2(8.0, 5.0)).unwrap();

        assert_eq!(space.neighbors_within(dvec2(5.0, 5.0), 1.0, false), vec![AgentId(2)]);
        assert_eq!(
            sorted(space.neighbors_within(dvec2(5.0, 5.0), 1.0, true)),
            vec![AgentId(1), AgentId(2)]
        );
        assert_eq!(
            sorted(space.neighbors_within(dvec2(5.0, 5.0), 3.0, false)),
            vec![AgentId(2), AgentId(3)]
        );
    }

    #[test]
    fn toroidal_neighbors_cross_the_seam() {
        let mut space = ContinuousSpace::new(10.0, 10.0, true, 2.0).unwrap();
        space.place(AgentId(1), dvec2(0.2, 0.2)).unwrap();
        space.place(AgentId(2), dvec2(9.8, 9.8)).unwrap();
        space.place(AgentId(3), dvec2(5.0, 5.0)).unwrap();

        assert_eq!(space.neighbors_within(dvec2(0.2, 0.2), 1.0, false), vec![AgentId(2)]);
        let offset = space.heading_vector(dvec2(0.2, 0.2), dvec2(9.8, 9.8));
        assert!((offset.x + 0.4).abs() < 1e-9 && (offset.y + 0.4).abs() < 1e-9);
        assert!((space.distance(dvec2(0.2, 0.2), dvec2(9.8, 9.8)) - 0.32f64.sqrt()).abs() < 1e-9);

        let bounded = ContinuousSpace::new(10.0, 10.0, false, 2.0).unwrap();
        assert_eq!(
            bounded.heading_vector(dvec2(0.2, 0.2), dvec2(9.8, 9.8)),
            dvec2(9.8, 9.8) - dvec2(0.2, 0.2)
        );
    }

    #[test]
    fn grid_query_matches_brute_force() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for toroidal in [false, true] {
            let mut space = ContinuousSpace::new(37.0, 23.0, toroidal, 4.0).unwrap();
            for i in 0..300 {
                let pos = dvec2(rng.gen::<f64>() * 37.0, rng.gen::<f64>() * 23.0);
                space.place(AgentId(i), pos).unwrap();
            }
            // shuffle some agents around so buckets change
            for i in 0..150 {
                let pos = dvec2(rng.gen::<f64>() * 37.0, rng.gen::<f64>() * 23.0);
                space.move_agent(AgentId(i), pos).unwrap();
            }
            for i in (0..300).step_by(7) {
                space.remove(AgentId(i)).unwrap();
            }

            for _ in 0..200 {
                let pos = dvec2(rng.gen::<f64>() * 37.0, rng.gen::<f64>() * 23.0);
                // radii both below and well above the cell size
                let radius = rng.gen::<f64>() * 15.0;
                let include_center = rng.gen::<bool>();
                assert_eq!(
                    sorted(space.neighbors_within(pos, radius, include_center)),
                    brute_force(&space, pos, radius, include_center),
                    "toroidal={toroidal} pos={pos:?} radius={radius}"
                );
            }

            // query points off the plane, some with radii reaching back onto it
            for _ in 0..200 {
                let pos = dvec2(rng.gen_range(-60.0..100.0), rng.gen_range(-40.0..70.0));
                let radius = rng.gen::<f64>() * 80.0;
                assert_eq!(
                    sorted(space.neighbors_within(pos, radius, false)),
                    brute_force(&space, pos, radius, false),
                    "toroidal={toroidal} pos={pos:?} radius={radius}"
                );
            }
        }
    }

    #[test]
    fn far_outside_query_still_reaches_the_plane() {
        let mut space = ContinuousSpace::new(100.0, 100.0, false, 10.0).unwrap();
        space.place(AgentId(1), dvec2(95.0, 5.0)).unwrap();

        assert_eq!(space.neighbors_within(dvec2(-50.0, 5.0), 200.0, false), vec![AgentId(1)]);
        assert!(space.neighbors_within(dvec2(-50.0, 5.0), 144.0, false).is_empty());
    }

    #[test]
    fn tiny_cell_size_is_widened() {
        let mut space = ContinuousSpace::new(100.0, 60.0, false, 1e-6).unwrap();
        assert!(space.columns <= MAX_CELLS_PER_AXIS && space.rows <= MAX_CELLS_PER_AXIS);
        assert!(space.cell_width >= 1e-6);

        space.place(AgentId(1), dvec2(10.0, 10.0)).unwrap();
        space.place(AgentId(2), dvec2(10.0, 10.5)).unwrap();
        assert!(space.neighbors_within(dvec2(10.0, 10.0), 1e-6, false).is_empty());
        assert_eq!(space.neighbors_within(dvec2(10.0, 10.0), 0.5, false), vec![AgentId(2)]);
    }

    #[test]
    fn toroidal_distance_wraps_unwrapped_points() {
        let space = ContinuousSpace::new(10.0, 10.0, true, 2.0).unwrap();
        assert!((space.distance(dvec2(25.0, 0.0), dvec2(0.0, 0.0)) - 5.0).abs() < 1e-12);
        assert!((space.distance(dvec2(-3.0, 0.0), dvec2(1.0, 0.0)) - 4.0).abs() < 1e-12);
        assert!((space.distance(dvec2(0.5, -19.0), dvec2(0.5, 0.5)) - 0.5).abs() < 1e-12);

        let offset = space.heading_vector(dvec2(31.0, 4.0), dvec2(0.0, 4.0));
        assert!((offset.x + 1.0).abs() < 1e-12 && offset.y == 0.0);
    }

    #[test]
    fn toroidal_distance_is_bounded_by_half_extent() {
        let space = ContinuousSpace::new(20.0, 8.0, true, 2.0).unwrap();
        let half_diagonal = (10.0f64 * 10.0 + 4.0 * 4.0).sqrt();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..1000 {
            let a = dvec2(rng.gen::<f64>() * 20.0, rng.gen::<f64>() * 8.0);
            let b = dvec2(rng.gen::<f64>() * 20.0, rng.gen::<f64>() * 8.0);
            let d = space.distance(a, b);
            assert!(d <= half_diagonal + 1e-12);
            let offset = space.heading_vector(a, b);
            assert!(offset.x.abs() <= 10.0 && offset.y.abs() <= 4.0);
            assert!((offset.length() - d).abs() < 1e-9);
        }
    }
}
