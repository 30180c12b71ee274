use std::str::FromStr;

use once_cell::sync::Lazy;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub const ALPHABET: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Letter frequency distribution for English (approximate)
pub static LETTER_DISTRIBUTION: Lazy<Vec<(char, f32)>> = Lazy::new(|| {
    vec![
        ('E', 12.70),
        ('T', 9.05),
        ('A', 8.16),
        ('O', 7.50),
        ('I', 6.96),
        ('N', 6.74),
        ('S', 6.32),
        ('H', 6.09),
        ('R', 5.98),
        ('D', 4.25),
        ('L', 4.02),
        ('C', 2.78),
        ('U', 2.75),
        ('M', 2.40),
        ('W', 2.36),
        ('F', 2.22),
        ('G', 2.01),
        ('Y', 1.97),
        ('P', 1.92),
        ('B', 1.49),
        ('V', 0.97),
        ('K', 0.77),
        ('J', 0.15),
        ('X', 0.15),
        ('Q', 0.09),
        ('Z', 0.07),
    ]
});

static CUMULATIVE_DISTRIBUTION: Lazy<Vec<(char, f32)>> = Lazy::new(get_cumulative_distribution);

/// Calculate the cumulative distribution for weighted random selection
pub fn get_cumulative_distribution() -> Vec<(char, f32)> {
    let mut cumulative = 0.0;
    LETTER_DISTRIBUTION
        .iter()
        .map(|(ch, freq)| {
            cumulative += freq;
            (*ch, cumulative)
        })
        .collect()
}

/// How filler cells pick their letters
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum FillerDistribution {
    /// Every letter A-Z equally likely
    #[default]
    Uniform,
    /// Weighted by English letter frequency
    English,
}

impl FillerDistribution {
    pub fn random_letter(self, rng: &mut impl Rng) -> char {
        match self {
            FillerDistribution::Uniform => ALPHABET[rng.random_range(0..ALPHABET.len())] as char,
            FillerDistribution::English => weighted_letter(&CUMULATIVE_DISTRIBUTION, rng),
        }
    }
}

impl FromStr for FillerDistribution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "uniform" => Ok(FillerDistribution::Uniform),
            "english" => Ok(FillerDistribution::English),
            other => Err(format!(
                "unknown filler distribution '{}' (expected 'uniform' or 'english')",
                other
            )),
        }
    }
}

fn weighted_letter(cumulative_dist: &[(char, f32)], rng: &mut impl Rng) -> char {
    let total = cumulative_dist.last().map(|(_, c)| *c).unwrap_or(0.0);
    let random_value = rng.random::<f32>() * total;

    for (letter, cumulative) in cumulative_dist {
        if random_value <= *cumulative {
            return *letter;
        }
    }

    'E' // Fallback
}
