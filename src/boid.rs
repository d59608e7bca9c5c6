/*
 * Boid Module
 *
 * This module defines the Boid struct and its per-tick behaviour.
 * Each tick a boid looks at the other boids within its vision and picks
 * exactly one of two responses based on its nearest neighbour:
 * 1. Separate: the nearest neighbour is too close, turn away from its heading
 * 2. Flock: turn towards the neighbours' mean direction (align), then towards
 *    their mean position (cohere)
 * Every turn is limited to a per-rule number of degrees per tick. The boid
 * then moves `speed` units along its heading, reflecting once off the edge
 * of a bounded space.
 */

use glam::DVec2;
use std::collections::BTreeMap;
use tracing::trace;

use crate::agent::{Activation, Agent, AgentId};
use crate::error::{FlockError, SpaceError};
use crate::geometry::{angle_of, heading_to_vector, normalize_angle, turn_away, turn_towards};
use crate::params::FlockParams;
use crate::space::ContinuousSpace;

#[derive(Debug, Clone, PartialEq)]
pub struct Boid {
    pub id: AgentId,
    // Cached copy of the position held by the space, refreshed each activation
    pub position: DVec2,
    pub speed: f64,
    // Degrees in (-180, 180]
    pub heading: f64,
    // Derived from `heading`; not unit length
    pub direction: DVec2,
    pub vision: f64,
    pub separation: f64,
    pub cohere_factor: f64,
    pub separate_factor: f64,
    pub match_factor: f64,
}

// What a boid saw of one neighbour this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub id: AgentId,
    pub distance: f64,
    // Shortest displacement from the sensing boid to this neighbour
    pub offset: DVec2,
    pub heading: f64,
    pub direction: DVec2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    // nobody in sight
    Idle,
    Separate,
    Flock,
}

impl Boid {
    pub fn new(id: AgentId, position: DVec2, heading: f64, params: &FlockParams) -> Self {
        let heading = normalize_angle(heading);
        Self {
            id,
            position,
            speed: params.speed,
            heading,
            direction: heading_to_vector(heading),
            vision: params.vision,
            separation: params.separation,
            cohere_factor: params.cohere,
            separate_factor: params.separate,
            match_factor: params.match_factor,
        }
    }

    /// Run one activation: sense, steer, move.
    ///
    /// `others` must hold every registered agent except this one. An agent
    /// the space knows about but `others` does not is a bookkeeping fault.
    pub fn step(
        &mut self,
        space: &mut ContinuousSpace,
        others: &BTreeMap<AgentId, Agent>,
        params: &FlockParams,
    ) -> Result<Activation, FlockError> {
        self.position = space
            .position(self.id)
            .ok_or(SpaceError::UnknownAgent(self.id))?;

        let neighbors = self.sense(space, others)?;
        self.steer(&neighbors, params);
        let position = self.advance(space)?;

        if params.trace_agents {
            Ok(Activation::LeaveTrace(position))
        } else {
            Ok(Activation::Idle)
        }
    }

    // Collect the boids within vision; traces share the space but are ignored
    pub fn sense(
        &self,
        space: &ContinuousSpace,
        others: &BTreeMap<AgentId, Agent>,
    ) -> Result<Vec<Neighbor>, FlockError> {
        let mut neighbors = Vec::new();

        for id in space.neighbors_within(self.position, self.vision, false) {
            let other = match others.get(&id) {
                Some(Agent::Boid(boid)) => boid,
                Some(Agent::Trace(_)) => continue,
                None => return Err(FlockError::Unregistered(id)),
            };
            let position = space
                .position(id)
                .ok_or(SpaceError::UnknownAgent(id))?;

            neighbors.push(Neighbor {
                id,
                distance: space.distance(self.position, position),
                offset: space.heading_vector(self.position, position),
                heading: other.heading,
                direction: other.direction,
            });
        }

        Ok(neighbors)
    }

    /// Pick and apply this tick's rule, then re-derive the direction vector.
    pub fn steer(&mut self, neighbors: &[Neighbor], params: &FlockParams) -> Rule {
        let rule = match nearest(neighbors) {
            None => Rule::Idle,
            Some(closest) if closest.distance < params.minimum_separation => {
                let old_heading = self.heading;
                self.separate(closest, params.max_separate_angle);
                trace!(boid = %self.id, from = old_heading, to = self.heading, "heading separate");
                Rule::Separate
            }
            Some(_) => {
                let old_heading = self.heading;
                self.align(neighbors, params.max_align_angle);
                trace!(boid = %self.id, from = old_heading, to = self.heading, "heading align");

                let old_heading = self.heading;
                self.cohere(neighbors, params.max_cohere_angle);
                trace!(boid = %self.id, from = old_heading, to = self.heading, "heading cohere");
                Rule::Flock
            }
        };

        self.heading = normalize_angle(self.heading);
        self.direction = heading_to_vector(self.heading);
        rule
    }

    // Turn away from the nearest neighbour's heading. A neighbour on the same
    // heading gives a zero turn, and align/cohere still stay off this tick.
    fn separate(&mut self, closest: &Neighbor, max_angle: f64) {
        self.heading += turn_away(self.heading, closest.heading, max_angle);
    }

    // Turn towards the mean of the neighbours' direction vectors
    fn align(&mut self, neighbors: &[Neighbor], max_angle: f64) {
        let mut mean = DVec2::ZERO;
        for neighbor in neighbors {
            mean += neighbor.direction;
        }
        mean = mean / neighbors.len() as f64;

        let target = angle_of(mean.x, mean.y);
        self.heading += turn_towards(self.heading, target, max_angle);
    }

    // Turn towards the neighbours' centre of mass
    fn cohere(&mut self, neighbors: &[Neighbor], max_angle: f64) {
        let mut mean = DVec2::ZERO;
        for neighbor in neighbors {
            mean += neighbor.offset;
        }
        mean = mean / neighbors.len() as f64;

        let target = angle_of(mean.x, mean.y);
        self.heading += turn_towards(self.heading, target, max_angle);
    }

    /// Move `speed` units along the current direction and commit the move.
    ///
    /// In a bounded space a move that would leave the plane is tried once
    /// more in the opposite direction (heading flipped by 180 degrees). If
    /// that also leaves the plane, which only happens right in a corner,
    /// the boid holds its position for this tick.
    pub fn advance(&mut self, space: &mut ContinuousSpace) -> Result<DVec2, FlockError> {
        let origin = self.position;
        let length = self.direction.length();
        let mut candidate = origin + self.direction / length * self.speed;

        if !space.is_toroidal() && space.is_out_of_bounds(candidate) {
            self.direction = -self.direction;
            self.heading = normalize_angle(self.heading - 180.0);
            candidate = origin + self.direction / length * self.speed;

            if space.is_out_of_bounds(candidate) {
                trace!(boid = %self.id, "reflection blocked, holding position");
                candidate = origin;
            }
        }

        self.position = space.move_agent(self.id, candidate)?;
        Ok(self.position)
    }
}

// First neighbour with the strictly smallest distance
pub fn nearest(neighbors: &[Neighbor]) -> Option<&Neighbor> {
    let mut best: Option<&Neighbor> = None;
    for neighbor in neighbors {
        if best.map_or(true, |current| neighbor.distance < current.distance) {
            best = Some(neighbor);
        }
    }
    best
}
