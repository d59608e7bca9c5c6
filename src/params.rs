/*
 * Flock Parameters Module
 *
 * This module defines the FlockParams struct holding everything a flock is
 * constructed from. Parameters are fixed once a Flock exists; the viewer's
 * control panel edits a copy and rebuilds the flock from it. Slider ranges
 * for the control panel live here too, next to the values they bound.
 */

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use tracing::warn;

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlockParams {
    pub population: usize,
    pub width: f64,
    pub height: f64,
    pub toroidal: bool,
    // Distance a boid covers per tick
    pub speed: f64,
    pub vision: f64,
    // Per-boid preferred distance; carried on every boid, steering uses minimum_separation
    pub separation: f64,
    // Rule weights. Carried on every boid but the steering rules are
    // selected, not blended, so they do not change behaviour.
    pub cohere: f64,
    pub separate: f64,
    #[serde(rename = "match")]
    pub match_factor: f64,
    pub trace_agents: bool,
    pub initial_age: u32,
    pub minimum_separation: f64,
    // Degrees of turn allowed per tick for each rule
    pub max_separate_angle: f64,
    pub max_cohere_angle: f64,
    pub max_align_angle: f64,
    pub seed: Option<u64>,
}

impl Default for FlockParams {
    fn default() -> Self {
        Self {
            population: 100,
            width: 100.0,
            height: 100.0,
            toroidal: false,
            speed: 1.0,
            vision: 10.0,
            separation: 2.0,
            cohere: 0.025,
            separate: 0.25,
            match_factor: 0.04,
            trace_agents: false,
            initial_age: 5,
            minimum_separation: 1.0,
            max_separate_angle: 1.5,
            max_cohere_angle: 3.0,
            max_align_angle: 5.0,
            seed: None,
        }
    }
}

impl FlockParams {
    /// Check every parameter, reporting the first bad one.
    ///
    /// `minimum_separation` larger than `vision` is allowed (the separate
    /// rule can then never fire on its own threshold) but logged.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population == 0 {
            return Err(ConfigError::EmptyPopulation);
        }

        positive("width", self.width)?;
        positive("height", self.height)?;
        positive("speed", self.speed)?;
        positive("max_separate_angle", self.max_separate_angle)?;
        positive("max_cohere_angle", self.max_cohere_angle)?;
        positive("max_align_angle", self.max_align_angle)?;

        non_negative("vision", self.vision)?;
        non_negative("separation", self.separation)?;
        non_negative("minimum_separation", self.minimum_separation)?;
        non_negative("cohere", self.cohere)?;
        non_negative("separate", self.separate)?;
        non_negative("match", self.match_factor)?;

        if self.minimum_separation > self.vision {
            warn!(
                minimum_separation = self.minimum_separation,
                vision = self.vision,
                "minimum separation exceeds vision; neighbours are sensed only inside vision"
            );
        }

        Ok(())
    }

    // Bucket size for the space index: queries never exceed the vision radius
    pub fn cell_size(&self) -> f64 {
        if self.vision > 0.0 {
            self.vision
        } else {
            self.width.max(self.height)
        }
    }

    // Boid ids run 0..population; trace ids are handed out above this
    pub fn first_trace_id(&self) -> u64 {
        self.population as u64 + 100
    }

    // Get parameter ranges for UI sliders
    pub fn population_range() -> RangeInclusive<usize> {
        10..=1000
    }

    pub fn extent_range() -> RangeInclusive<f64> {
        10.0..=1000.0
    }

    pub fn initial_age_range() -> RangeInclusive<u32> {
        1..=9
    }

    pub fn speed_range() -> RangeInclusive<f64> {
        1.0..=20.0
    }

    pub fn minimum_separation_range() -> RangeInclusive<f64> {
        0.1..=2.0
    }

    pub fn max_angle_range() -> RangeInclusive<f64> {
        0.5..=20.0
    }

    pub fn vision_range() -> RangeInclusive<f64> {
        1.0..=30.0
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { name, value })
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { name, value })
    }
}
