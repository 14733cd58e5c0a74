use crate::error::SimError;
use crate::model::{HealthState, Individual, Population};
use rand::prelude::*;
use rand_distr::Uniform;

/// Side of the square the grid is scaled into.
pub const GRID_EXTENT: f64 = 100.0;

/// Create a healthy population on a square grid with a single patient zero.
///
/// Individual `i` is placed at cell `(i mod s, i div s)` scaled into
/// `[0, GRID_EXTENT)`, where `s` is the side of the grid. One individual,
/// drawn uniformly from `rng`, starts infected.
///
/// # Errors
/// Returns [`SimError::InvalidSize`] if `size` is zero or not a perfect square.
pub fn create_population<R: Rng + ?Sized>(size: usize, rng: &mut R) -> Result<Population, SimError> {
    let side = grid_side(size).ok_or(SimError::InvalidSize { size })?;
    let spacing = GRID_EXTENT / side as f64;

    let ind_vec = (0..size)
        .map(|id| {
            let x = (id % side) as f64 * spacing;
            let y = (id / side) as f64 * spacing;
            Individual::new(id, x, y)
        })
        .collect();
    let mut pop = Population::new(ind_vec);

    let id_dist = Uniform::new(0, size).map_err(|_| SimError::InvalidSize { size })?;
    let patient_zero = id_dist.sample(rng);
    pop.set_state(patient_zero, HealthState::Infected)?;
    log::debug!("patient zero is individual {patient_zero}");

    Ok(pop)
}

/// Side of the square grid holding `size` individuals, if there is one.
pub fn grid_side(size: usize) -> Option<usize> {
    if size == 0 {
        return None;
    }
    let side = size.isqrt();
    (side * side == size).then_some(side)
}
