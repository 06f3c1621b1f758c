use crate::contact::{ContactRule, Pairing};
use crate::model::Agent;
use anyhow::{Context, Result};
use rand::{Rng, RngCore};
use rand_distr::{Distribution, Uniform};
use serde::{Deserialize, Serialize};

/// Knobs of the disease model.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelParams {
    /// Percent chance that an infected agent infects a healthy contact.
    pub infection_chance: f64,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            infection_chance: 50.0,
        }
    }
}

/// Transmission rule: one draw in `[0, 100)` per exposure, compared against
/// the infection chance.
pub struct Transmission {
    chance: f64,
    draw_dist: Uniform<f64>,
}

impl Transmission {
    pub fn new(params: &ModelParams) -> Result<Self> {
        let draw_dist = Uniform::new(0.0, 100.0).context("failed to construct draw_dist")?;
        Ok(Self {
            chance: params.infection_chance,
            draw_dist,
        })
    }

    pub fn transmits<R: Rng + ?Sized>(&self, rng: &mut R) -> bool {
        self.draw_dist.sample(rng) < self.chance
    }
}

/// Advance the population by one round.
///
/// Agents keep their order. Returns the contacts of this round.
pub fn update_population(
    agt_vec: &mut [Agent],
    rule: &dyn ContactRule,
    params: &ModelParams,
    rng: &mut dyn RngCore,
) -> Result<Pairing> {
    let transmission = Transmission::new(params)?;

    // No one is newly infected any more.
    for agt in agt_vec.iter_mut() {
        agt.newly_infected = false;
    }

    let n_agt = agt_vec.len();
    let pairing = Pairing::new(n_agt, rule.pair(n_agt, rng), rule.is_partition());

    if rule.is_partition() {
        for &(i_a, i_b) in pairing.pairs() {
            meet(agt_vec, i_a, i_b, rng);
        }
    }

    // Only agents infected before this round are contagious.
    let was_infected: Vec<_> = agt_vec.iter().map(|agt| agt.infected).collect();

    for &(i_a, i_b) in pairing.pairs() {
        let i_target = match (was_infected[i_a], was_infected[i_b]) {
            (true, false) => i_b,
            (false, true) => i_a,
            _ => continue,
        };
        if transmission.transmits(rng) && agt_vec[i_target].infect() {
            log::trace!("agent {} infected by contact", agt_vec[i_target].id);
        }
    }

    Ok(pairing)
}

/// Move agent `i_b` next to agent `i_a`.
fn meet(agt_vec: &mut [Agent], i_a: usize, i_b: usize, rng: &mut dyn RngCore) {
    let (x_a, y_a) = {
        let agt_a = &mut agt_vec[i_a];

        // Keep room on both sides at the edges.
        if agt_a.x < 1.0 {
            agt_a.x += f64::from(rng.random_range(1..=5_u8));
        }
        if agt_a.x > 99.0 {
            agt_a.x -= f64::from(rng.random_range(1..=5_u8));
        }
        agt_a.x = (agt_a.x - 1.0).clamp(0.0, 100.0);
        (agt_a.x, agt_a.y)
    };

    let agt_b = &mut agt_vec[i_b];
    agt_b.x = (x_a + 2.0).clamp(0.0, 100.0);
    agt_b.y = y_a;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact::{Adjacent, Handshake};
    use crate::population::create_population;
    use crate::shuffle::ShuffleMode;
    use crate::stats::compute_statistics;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    const HANDSHAKE: Handshake = Handshake {
        shuffle: ShuffleMode::Uniform,
    };

    fn params(infection_chance: f64) -> ModelParams {
        ModelParams { infection_chance }
    }

    fn n_infected(agt_vec: &[Agent]) -> usize {
        agt_vec.iter().filter(|agt| agt.infected).count()
    }

    #[test]
    fn zero_chance_never_spreads() {
        let mut rng = ChaCha12Rng::seed_from_u64(21);
        let mut agt_vec = create_population(100, &mut rng);
        for rule in [&HANDSHAKE as &dyn ContactRule, &Adjacent] {
            for _ in 0..20 {
                update_population(&mut agt_vec, rule, &params(0.0), &mut rng).unwrap();
                assert_eq!(n_infected(&agt_vec), 1);
            }
        }
    }

    #[test]
    fn full_chance_infects_every_partner() {
        let mut rng = ChaCha12Rng::seed_from_u64(22);
        let mut agt_vec = create_population(64, &mut rng);
        for _ in 0..5 {
            let before: Vec<_> = agt_vec.iter().map(|agt| agt.infected).collect();
            let pairing =
                update_population(&mut agt_vec, &HANDSHAKE, &params(100.0), &mut rng).unwrap();
            for &(i_a, i_b) in pairing.pairs() {
                if before[i_a] || before[i_b] {
                    assert!(agt_vec[i_a].infected && agt_vec[i_b].infected);
                }
            }
        }
    }

    #[test]
    fn four_agents_one_round_infects_exactly_one_partner() {
        let mut rng = ChaCha12Rng::seed_from_u64(23);
        let mut agt_vec = create_population(4, &mut rng);
        update_population(&mut agt_vec, &HANDSHAKE, &params(100.0), &mut rng).unwrap();

        let stats = compute_statistics(&agt_vec, 0);
        assert_eq!(stats.infected, 2);
        assert_eq!(stats.newly_infected, 1);
    }

    #[test]
    fn newly_infected_flags_last_one_round() {
        let mut rng = ChaCha12Rng::seed_from_u64(24);
        let mut agt_vec = create_population(4, &mut rng);
        update_population(&mut agt_vec, &HANDSHAKE, &params(100.0), &mut rng).unwrap();
        update_population(&mut agt_vec, &HANDSHAKE, &params(0.0), &mut rng).unwrap();
        assert!(agt_vec.iter().all(|agt| !agt.newly_infected));
        assert_eq!(n_infected(&agt_vec), 2);
    }

    #[test]
    fn adjacent_rule_infects_both_neighbours() {
        let mut rng = ChaCha12Rng::seed_from_u64(25);
        let mut agt_vec = create_population(9, &mut rng);
        let i_zero = agt_vec.iter().position(|agt| agt.infected).unwrap();
        let pos_before: Vec<_> = agt_vec.iter().map(|agt| (agt.x, agt.y)).collect();

        update_population(&mut agt_vec, &Adjacent, &params(100.0), &mut rng).unwrap();

        let mut expected = vec![i_zero, (i_zero + 1) % 9, (i_zero + 8) % 9];
        expected.sort_unstable();
        let infected: Vec<_> = (0..9).filter(|&i| agt_vec[i].infected).collect();
        assert_eq!(infected, expected);
        assert_eq!(compute_statistics(&agt_vec, 0).newly_infected, 2);

        let pos_after: Vec<_> = agt_vec.iter().map(|agt| (agt.x, agt.y)).collect();
        assert_eq!(pos_before, pos_after);
    }

    #[test]
    fn tiny_populations_are_no_ops() {
        let mut rng = ChaCha12Rng::seed_from_u64(26);
        for size in [0, 1] {
            let mut agt_vec = create_population(size, &mut rng);
            let before = agt_vec.clone();
            let pairing =
                update_population(&mut agt_vec, &HANDSHAKE, &params(100.0), &mut rng).unwrap();
            assert!(pairing.pairs().is_empty());
            assert_eq!(agt_vec, before);
        }
    }

    #[test]
    fn odd_agent_out_is_unchanged() {
        let mut rng = ChaCha12Rng::seed_from_u64(27);
        let mut agt_vec = create_population(5, &mut rng);
        let before = agt_vec.clone();
        let pairing =
            update_population(&mut agt_vec, &HANDSHAKE, &params(0.0), &mut rng).unwrap();

        let unpaired: Vec<_> = (0..5).filter(|&i| pairing.partner(i).is_none()).collect();
        assert_eq!(unpaired.len(), 1);
        assert_eq!(agt_vec[unpaired[0]], before[unpaired[0]]);
    }

    #[test]
    fn order_and_bounds_are_preserved() {
        let mut rng = ChaCha12Rng::seed_from_u64(28);
        let mut agt_vec = create_population(36, &mut rng);
        for _ in 0..50 {
            let pairing =
                update_population(&mut agt_vec, &HANDSHAKE, &params(30.0), &mut rng).unwrap();
            for (i_agt, agt) in agt_vec.iter().enumerate() {
                assert_eq!(agt.id, i_agt);
                assert!((0.0..=100.0).contains(&agt.x));
                assert!((0.0..=100.0).contains(&agt.y));
            }
            for &(i_a, i_b) in pairing.pairs() {
                assert_eq!(agt_vec[i_a].y, agt_vec[i_b].y);
            }
        }
    }

    #[test]
    fn out_of_range_chances_follow_the_comparison() {
        let mut rng = ChaCha12Rng::seed_from_u64(29);
        assert!(Transmission::new(&params(150.0)).unwrap().transmits(&mut rng));
        assert!(!Transmission::new(&params(-5.0)).unwrap().transmits(&mut rng));
    }
}
