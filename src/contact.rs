//! Contact rules: who meets whom in a round.

use crate::shuffle::{ShuffleMode, shuffle_in_place};
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Rule assigning agents to contact pairs for one round.
pub trait ContactRule {
    /// Return the contact pairs among `n_agt` agents, as index pairs.
    fn pair(&self, n_agt: usize, rng: &mut dyn RngCore) -> Vec<(usize, usize)>;

    /// Whether every agent belongs to at most one pair.
    fn is_partition(&self) -> bool;
}

/// Random handshakes: shuffle everyone, then pair off consecutive agents.
pub struct Handshake {
    pub shuffle: ShuffleMode,
}

impl ContactRule for Handshake {
    fn pair(&self, n_agt: usize, rng: &mut dyn RngCore) -> Vec<(usize, usize)> {
        let mut order: Vec<_> = (0..n_agt).collect();
        shuffle_in_place(&mut order, self.shuffle, rng);

        // An odd agent out is left unpaired.
        order
            .chunks_exact(2)
            .map(|pair| (pair[0], pair[1]))
            .collect()
    }

    fn is_partition(&self) -> bool {
        true
    }
}

/// Fixed line: each agent meets its successor, wrapping around at the end.
pub struct Adjacent;

impl ContactRule for Adjacent {
    fn pair(&self, n_agt: usize, _rng: &mut dyn RngCore) -> Vec<(usize, usize)> {
        match n_agt {
            0 | 1 => Vec::new(),
            2 => vec![(0, 1)],
            _ => (0..n_agt).map(|i_agt| (i_agt, (i_agt + 1) % n_agt)).collect(),
        }
    }

    fn is_partition(&self) -> bool {
        false
    }
}

/// Name of a contact rule, as written in the config file.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactKind {
    #[default]
    Handshake,
    Adjacent,
}

impl ContactKind {
    /// Build the rule this name refers to.
    pub fn build(self, shuffle: ShuffleMode) -> Box<dyn ContactRule> {
        match self {
            ContactKind::Handshake => Box::new(Handshake { shuffle }),
            ContactKind::Adjacent => Box::new(Adjacent),
        }
    }
}

/// Contacts of a single round.
///
/// Holds the pairs and, for partition rules, the partner of each agent.
/// Only meaningful for the round that produced it.
#[derive(Debug)]
pub struct Pairing {
    pairs: Vec<(usize, usize)>,
    partner: Vec<Option<usize>>,
}

impl Pairing {
    pub fn new(n_agt: usize, pairs: Vec<(usize, usize)>, is_partition: bool) -> Self {
        let mut partner = vec![None; n_agt];
        if is_partition {
            for &(i_a, i_b) in &pairs {
                partner[i_a] = Some(i_b);
                partner[i_b] = Some(i_a);
            }
        }
        Self { pairs, partner }
    }

    pub fn pairs(&self) -> &[(usize, usize)] {
        &self.pairs
    }

    /// Partner of an agent in a partition round.
    pub fn partner(&self, i_agt: usize) -> Option<usize> {
        self.partner.get(i_agt).copied().flatten()
    }

    /// Every agent an agent was in contact with this round.
    pub fn contacts(&self, i_agt: usize) -> impl Iterator<Item = usize> + '_ {
        self.pairs.iter().filter_map(move |&(i_a, i_b)| {
            if i_a == i_agt {
                Some(i_b)
            } else if i_b == i_agt {
                Some(i_a)
            } else {
                None
            }
        })
    }
}
