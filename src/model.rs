/*
 * Flock Model Module
 *
 * Composition root for one simulation run. The Flock owns its parameters,
 * the continuous space, the scheduler, the agent registry and the random
 * number generator, and advances everything by one tick per `step()`.
 *
 * Activations are strictly sequential in the scheduler's shuffled order:
 * an agent activated later in a tick sees the neighbours that already
 * moved at their new positions and headings.
 */

use glam::{dvec2, DVec2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::agent::{Activation, Agent, AgentId};
use crate::boid::Boid;
use crate::error::FlockError;
use crate::geometry::normalize_angle;
use crate::params::FlockParams;
use crate::schedule::RandomActivation;
use crate::space::ContinuousSpace;
use crate::trace::Trace;

pub struct Flock {
    params: FlockParams,
    seed: u64,
    rng: ChaCha8Rng,
    space: ContinuousSpace,
    schedule: RandomActivation,
    agents: BTreeMap<AgentId, Agent>,
    // Last trace id handed out
    trace_counter: u64,
    tick: u64,
    pub running: bool,
}

// Per-agent state a visualiser or recorder needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    pub id: AgentId,
    pub position: DVec2,
    #[serde(flatten)]
    pub kind: AgentStateKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AgentStateKind {
    Boid { heading: f64 },
    Trace { age: i64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlockSnapshot {
    pub tick: u64,
    pub agents: Vec<AgentState>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlockStats {
    pub tick: u64,
    pub boids: usize,
    pub traces: usize,
    // Length of the mean unit heading: 1 when every boid points the same way
    pub polarization: f64,
    pub mean_nearest_distance: Option<f64>,
}

impl Flock {
    /// Build a flock with boids at random positions and headings.
    pub fn new(params: FlockParams) -> Result<Self, FlockError> {
        let mut flock = Self::empty(params)?;

        for index in 0..flock.params.population {
            let position = dvec2(
                flock.rng.gen::<f64>() * flock.params.width,
                flock.rng.gen::<f64>() * flock.params.height,
            );
            let heading = normalize_angle(flock.rng.gen_range(-180.0..180.0));
            flock.add_boid(AgentId(index as u64), position, heading)?;
        }

        Ok(flock)
    }

    /// Build a flock from explicit `(position, heading)` pairs.
    ///
    /// `params.population` is replaced by the number of placements.
    pub fn with_placements(mut params: FlockParams, placements: &[(DVec2, f64)]) -> Result<Self, FlockError> {
        params.population = placements.len();
        let mut flock = Self::empty(params)?;

        for (index, &(position, heading)) in placements.iter().enumerate() {
            flock.add_boid(AgentId(index as u64), position, heading)?;
        }

        Ok(flock)
    }

    fn empty(params: FlockParams) -> Result<Self, FlockError> {
        params.validate()?;

        let seed = params.seed.unwrap_or_else(rand::random);
        let space = ContinuousSpace::new(params.width, params.height, params.toroidal, params.cell_size())?;

        info!(
            seed,
            population = params.population,
            width = params.width,
            height = params.height,
            toroidal = params.toroidal,
            "creating flock"
        );

        Ok(Self {
            trace_counter: params.first_trace_id(),
            params,
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            space,
            schedule: RandomActivation::new(),
            agents: BTreeMap::new(),
            tick: 0,
            running: true,
        })
    }

    fn add_boid(&mut self, id: AgentId, position: DVec2, heading: f64) -> Result<(), FlockError> {
        let position = self.space.place(id, position)?;
        let boid = Boid::new(id, position, heading, &self.params);
        self.schedule.add(id);
        self.agents.insert(id, Agent::Boid(boid));
        Ok(())
    }

    /// Advance the simulation by one tick.
    ///
    /// Returns false without doing anything once `running` is cleared.
    ///
    /// # Panics
    ///
    /// If the scheduler, the registry and the space disagree about which
    /// agents exist. That is an internal bookkeeping bug, not a runtime
    /// condition to recover from.
    pub fn step(&mut self) -> bool {
        if !self.running {
            return false;
        }

        let order = self.schedule.begin_step(&mut self.rng);
        for id in order {
            // Removed earlier in this tick
            let Some(mut agent) = self.agents.remove(&id) else {
                continue;
            };

            let activation = match &mut agent {
                Agent::Boid(boid) => boid
                    .step(&mut self.space, &self.agents, &self.params)
                    .unwrap_or_else(|err| panic!("consistency fault while activating boid {id}: {err}")),
                Agent::Trace(trace) => trace.step(),
            };

            match activation {
                Activation::Idle => {
                    self.agents.insert(id, agent);
                }
                Activation::LeaveTrace(position) => {
                    self.agents.insert(id, agent);
                    self.spawn_trace(position);
                }
                Activation::Expired => self.retire(id),
            }
        }

        self.tick += 1;
        debug!(tick = self.tick, agents = self.agents.len(), "tick complete");
        true
    }

    fn spawn_trace(&mut self, position: DVec2) {
        self.trace_counter += 1;
        let id = AgentId(self.trace_counter);
        let position = self
            .space
            .place(id, position)
            .unwrap_or_else(|err| panic!("consistency fault while placing trace {id}: {err}"));
        self.schedule.add(id);
        self.agents.insert(id, Agent::Trace(Trace::new(id, position, self.params.initial_age)));
    }

    // Drop an agent from the scheduler and the space; already-gone is fine
    fn retire(&mut self, id: AgentId) {
        self.schedule.remove(id);
        self.agents.remove(&id);
        let _ = self.space.remove(id);
    }

    pub fn params(&self) -> &FlockParams {
        &self.params
    }

    // Seed actually used, so an unseeded run can be replayed
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn space(&self) -> &ContinuousSpace {
        &self.space
    }

    pub fn schedule(&self) -> &RandomActivation {
        &self.schedule
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(&id)
    }

    pub fn agents(&self) -> impl Iterator<Item = &Agent> + '_ {
        self.agents.values()
    }

    pub fn boids(&self) -> impl Iterator<Item = &Boid> + '_ {
        self.agents.values().filter_map(Agent::as_boid)
    }

    pub fn snapshot(&self) -> FlockSnapshot {
        let agents = self
            .agents
            .values()
            .map(|agent| {
                let id = agent.id();
                let position = self.space.position(id).unwrap_or_else(|| agent.position());
                let kind = match agent {
                    Agent::Boid(boid) => AgentStateKind::Boid { heading: boid.heading },
                    Agent::Trace(trace) => AgentStateKind::Trace { age: trace.age },
                };
                AgentState { id, position, kind }
            })
            .collect();

        FlockSnapshot {
            tick: self.tick,
            agents,
        }
    }

    /// Read-only summary of the current state.
    ///
    /// The nearest-neighbour mean is a brute-force pass over all boid pairs.
    pub fn stats(&self) -> FlockStats {
        let boids: Vec<&Boid> = self.boids().collect();
        let traces = self.agents.len() - boids.len();

        let mut heading_sum = DVec2::ZERO;
        for boid in &boids {
            let radians = boid.heading.to_radians();
            heading_sum += dvec2(radians.cos(), radians.sin());
        }
        let polarization = if boids.is_empty() {
            0.0
        } else {
            (heading_sum / boids.len() as f64).length()
        };

        let mean_nearest_distance = if boids.len() < 2 {
            None
        } else {
            let mut total = 0.0;
            for (i, boid) in boids.iter().enumerate() {
                let mut closest = f64::INFINITY;
                for (j, other) in boids.iter().enumerate() {
                    if i != j {
                        closest = closest.min(self.space.distance(boid.position, other.position));
                    }
                }
                total += closest;
            }
            Some(total / boids.len() as f64)
        };

        FlockStats {
            tick: self.tick,
            boids: boids.len(),
            traces,
            polarization,
            mean_nearest_distance,
        }
    }
}
