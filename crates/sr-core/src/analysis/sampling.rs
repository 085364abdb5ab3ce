//! Bounded, seeded sample of (sentiment, rating) pairs for rank correlation.
//!
//! Each stratum (rating class, or a single stratum when stratification is
//! off) keeps an Algorithm R reservoir of up to `cap` pairs. At the end the
//! sample is cut to exactly `min(cap, n)` pairs using largest-remainder
//! quotas proportional to the observed stratum sizes. The sampler is fed
//! sequentially, so a fixed seed gives the same sample on every run.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use sr_config::AnalysisConfig;

#[derive(Debug, Default)]
struct Reservoir {
    seen: u64,
    items: Vec<(f64, f64)>,
}

/// Streaming stratified reservoir sampler.
#[derive(Debug)]
pub struct PairSampler {
    cap: usize,
    stratify: bool,
    rng: StdRng,
    strata: BTreeMap<u8, Reservoir>,
    seen: u64,
}

/// The final sample and the number of pairs it was drawn from.
#[derive(Debug, Clone, PartialEq)]
pub struct SampledPairs {
    pub pairs: Vec<(f64, f64)>,
    pub population: u64,
}

impl PairSampler {
    pub fn new(cap: usize, seed: u64, stratify: bool) -> Self {
        Self {
            cap: cap.max(1),
            stratify,
            rng: StdRng::seed_from_u64(seed),
            strata: BTreeMap::new(),
            seen: 0,
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(
            config.correlation_buffer_cap,
            config.sampling_seed,
            config.stratify_by_rating,
        )
    }

    /// Offer one pair; `stratum` is the rating class.
    pub fn offer(&mut self, x: f64, y: f64, stratum: u8) {
        self.seen += 1;
        let key = if self.stratify { stratum } else { 0 };
        let reservoir = self.strata.entry(key).or_default();
        reservoir.seen += 1;

        if reservoir.items.len() < self.cap {
            reservoir.items.push((x, y));
        } else {
            let j = self.rng.random_range(0..reservoir.seen);
            if j < self.cap as u64 {
                reservoir.items[j as usize] = (x, y);
            }
        }
    }

    /// Pairs currently buffered across all strata.
    pub fn buffered(&self) -> usize {
        self.strata.values().map(|r| r.items.len()).sum()
    }

    pub fn finish(mut self) -> SampledPairs {
        let population = self.seen;
        if population <= self.cap as u64 {
            let pairs = self
                .strata
                .into_values()
                .flat_map(|r| r.items)
                .collect();
            return SampledPairs { pairs, population };
        }

        let quotas = largest_remainder_quotas(&self.strata, self.cap as u64, population);
        let mut pairs = Vec::with_capacity(self.cap);
        for (key, mut reservoir) in std::mem::take(&mut self.strata) {
            let quota = quotas.get(&key).copied().unwrap_or(0) as usize;
            reservoir.items.shuffle(&mut self.rng);
            reservoir.items.truncate(quota);
            pairs.extend(reservoir.items);
        }
        SampledPairs { pairs, population }
    }
}

/// Per-stratum share of `cap`, proportional to stratum size.
///
/// Floors first, then one extra slot each to the largest remainders
/// (ties to the lower stratum key). Quotas sum to exactly `cap`.
fn largest_remainder_quotas(
    strata: &BTreeMap<u8, Reservoir>,
    cap: u64,
    total: u64,
) -> BTreeMap<u8, u64> {
    let mut quotas = BTreeMap::new();
    let mut remainders = Vec::with_capacity(strata.len());
    let mut assigned = 0;

    for (&key, reservoir) in strata {
        let scaled = u128::from(cap) * u128::from(reservoir.seen);
        let floor = (scaled / u128::from(total)) as u64;
        let remainder = scaled % u128::from(total);
        quotas.insert(key, floor);
        remainders.push((remainder, key));
        assigned += floor;
    }

    remainders.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    for (_, key) in remainders.into_iter().take((cap - assigned) as usize) {
        if let Some(q) = quotas.get_mut(&key) {
            *q += 1;
        }
    }
    quotas
}
