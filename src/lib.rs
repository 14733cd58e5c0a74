//! Stochastic SEIRS epidemic on a square grid population.
//!
//! [`population::create_population`] builds the grid and seeds patient zero,
//! [`engine::advance_round`] moves the population forward one round and
//! [`stats::compute_statistics`] reduces it to a [`model::StatsRecord`].
//! The driver owns the population and the record series between rounds.

pub mod analysis;
pub mod config;
pub mod engine;
pub mod error;
pub mod manager;
pub mod model;
pub mod params;
pub mod population;
pub mod stats;
