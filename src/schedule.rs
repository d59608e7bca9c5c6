/*
 * Schedule Module
 *
 * Random activation: every registered agent runs once per tick, in a fresh
 * uniformly random order each tick. The order is fixed when the tick starts,
 * so agents added during a tick wait for the next one.
 */

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeSet;

use crate::agent::AgentId;

#[derive(Debug, Clone, Default)]
pub struct RandomActivation {
    // Ids are handed out in increasing order, so this is also insertion order
    agents: BTreeSet<AgentId>,
    steps: u64,
    time: u64,
}

impl RandomActivation {
    pub fn new() -> Self {
        Self::default()
    }

    // Returns false if the agent was already registered
    pub fn add(&mut self, agent: AgentId) -> bool {
        self.agents.insert(agent)
    }

    // Removing an agent that is not registered is a no-op
    pub fn remove(&mut self, agent: AgentId) -> bool {
        self.agents.remove(&agent)
    }

    pub fn contains(&self, agent: AgentId) -> bool {
        self.agents.contains(&agent)
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn agents(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.agents.iter().copied()
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn time(&self) -> u64 {
        self.time
    }

    /// Start a tick: snapshot the registry and shuffle it.
    ///
    /// The caller activates the returned ids in order, skipping any that were
    /// removed earlier in the same tick.
    pub fn begin_step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Vec<AgentId> {
        let mut order: Vec<AgentId> = self.agents.iter().copied().collect();
        order.shuffle(rng);
        self.steps += 1;
        self.time += 1;
        order
    }
}
