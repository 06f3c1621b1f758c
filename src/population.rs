use crate::model::Agent;
use rand::Rng;
use rand_distr::{Distribution, Uniform};

/// Create a population of `size` agents laid out on a square grid.
///
/// The grid has `ceil(sqrt(size))` columns, so sizes that are not perfect
/// squares leave the last row incomplete. Coordinates lie in `[0, 100)`.
/// Exactly one agent, chosen uniformly at random, starts infected.
pub fn create_population<R: Rng + ?Sized>(size: usize, rng: &mut R) -> Vec<Agent> {
    let side = grid_side(size);

    let mut agt_vec = Vec::with_capacity(size);
    for i_agt in 0..size {
        let x = 100.0 * (i_agt % side) as f64 / side as f64;
        let y = 100.0 * (i_agt / side) as f64 / side as f64;
        agt_vec.push(Agent::new(i_agt, x, y));
    }

    // Infect patient zero.
    if let Ok(zero_dist) = Uniform::new(0, size) {
        let i_zero: usize = zero_dist.sample(rng);
        agt_vec[i_zero].infected = true;
        log::debug!("patient zero is agent {i_zero}");
    }

    agt_vec
}

fn grid_side(size: usize) -> usize {
    let mut side = (size as f64).sqrt() as usize;
    while side * side < size {
        side += 1;
    }
    side.max(1)
}
