//! Seeded synthetic demand generator.

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::config::{MwRange, WorkloadConfig};
use crate::grid::{DemandRequest, GridError, PriorityClass};
use crate::sim::clock::Timestamp;

/// Produces a reproducible stream of demand requests.
///
/// Class is drawn by weight; size is drawn uniformly from the class's MW
/// range. Consumer ids are sequential (`C0001`, `C0002`, ...), so two
/// generators with the same seed and config emit identical streams.
#[derive(Debug)]
pub struct DemandGenerator {
    requests_per_cycle: usize,
    weights: [f64; 3],
    ranges: [MwRange; 3],
    next_consumer: u64,
    rng: StdRng,
}

impl DemandGenerator {
    /// Creates a generator from workload parameters.
    ///
    /// # Arguments
    ///
    /// * `config` - Class weights, MW ranges and batch size
    /// * `seed` - Random seed for reproducible request streams
    ///
    /// # Panics
    ///
    /// Panics if any weight is negative, the weights sum to zero, or a range
    /// has `min <= 0` or `min > max`.
    pub fn new(config: &WorkloadConfig, seed: u64) -> Self {
        let weights = [
            config.residential_weight,
            config.commercial_weight,
            config.industrial_weight,
        ];
        let ranges = [
            config.residential_mw,
            config.commercial_mw,
            config.industrial_mw,
        ];
        assert!(weights.iter().all(|w| *w >= 0.0));
        assert!(weights.iter().sum::<f64>() > 0.0);
        assert!(ranges.iter().all(|r| r.min > 0.0 && r.min <= r.max));

        Self {
            requests_per_cycle: config.requests_per_cycle,
            weights,
            ranges,
            next_consumer: 1,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generates one cycle's batch of requests stamped with `at`.
    ///
    /// # Errors
    ///
    /// Propagates [`GridError::InvalidDemand`]; cannot occur for ranges
    /// accepted by [`DemandGenerator::new`].
    pub fn generate(&mut self, at: Timestamp) -> Result<Vec<DemandRequest>, GridError> {
        (0..self.requests_per_cycle)
            .map(|_| self.next_request(at))
            .collect()
    }

    fn next_request(&mut self, at: Timestamp) -> Result<DemandRequest, GridError> {
        let class = self.pick_class();
        let range = self.ranges[class.rank() as usize - 1];
        let megawatts = if range.min < range.max {
            self.rng.random_range(range.min..=range.max)
        } else {
            range.min
        };
        let consumer_id = format!("C{:04}", self.next_consumer);
        self.next_consumer += 1;
        DemandRequest::new(consumer_id, class, round_mw(megawatts), at)
    }

    fn pick_class(&mut self) -> PriorityClass {
        let total: f64 = self.weights.iter().sum();
        let mut draw = self.rng.random::<f64>() * total;
        for (class, weight) in PriorityClass::ALL.into_iter().zip(self.weights) {
            if draw < weight {
                return class;
            }
            draw -= weight;
        }
        // Float slack at the top end lands on the last class with weight.
        PriorityClass::ALL
            .into_iter()
            .zip(self.weights)
            .rev()
            .find(|(_, w)| *w > 0.0)
            .map_or(PriorityClass::Industrial, |(c, _)| c)
    }
}

/// Rounds to 0.1 MW so generated values print cleanly.
fn round_mw(mw: f64) -> f64 {
    ((mw * 10.0).round() / 10.0).max(0.1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(seed: u64, cycles: usize) -> Vec<(String, PriorityClass, f64)> {
        let cfg = WorkloadConfig::default();
        let mut generator = DemandGenerator::new(&cfg, seed);
        (0..cycles)
            .flat_map(|c| generator.generate(c as i64).unwrap_or_default())
            .map(|r| (r.consumer_id().to_string(), r.class(), r.megawatts()))
            .collect()
    }

    #[test]
    fn same_seed_same_stream() {
        assert_eq!(batch(7, 10), batch(7, 10));
    }

    #[test]
    fn different_seed_differs() {
        assert_ne!(batch(1, 10), batch(2, 10));
    }

    #[test]
    fn ids_are_sequential() {
        let reqs = batch(3, 2);
        assert_eq!(reqs.len(), 6);
        assert_eq!(reqs[0].0, "C0001");
        assert_eq!(reqs[5].0, "C0006");
    }

    #[test]
    fn sizes_stay_in_class_range() {
        let cfg = WorkloadConfig::default();
        for (_, class, mw) in batch(11, 50) {
            let range = match class {
                PriorityClass::Residential => cfg.residential_mw,
                PriorityClass::Commercial => cfg.commercial_mw,
                PriorityClass::Industrial => cfg.industrial_mw,
            };
            assert!(mw >= range.min - 0.05 && mw <= range.max + 0.05, "{class}: {mw}");
        }
    }

    #[test]
    fn zero_weight_class_never_drawn() {
        let cfg = WorkloadConfig {
            residential_weight: 0.0,
            commercial_weight: 0.0,
            industrial_weight: 1.0,
            ..WorkloadConfig::default()
        };
        let mut generator = DemandGenerator::new(&cfg, 5);
        let reqs = generator.generate(0).unwrap_or_default();
        assert!(reqs.iter().all(|r| r.class() == PriorityClass::Industrial));
    }

    #[test]
    fn generated_requests_are_created() {
        let mut generator = DemandGenerator::new(&WorkloadConfig::default(), 9);
        let reqs = generator.generate(42).unwrap_or_default();
        assert!(reqs.iter().all(|r| r.created_at() == 42));
        assert!(
            reqs.iter()
                .all(|r| r.state() == crate::grid::RequestState::Created)
        );
    }

    #[test]
    #[should_panic]
    fn zero_weights_panic() {
        let cfg = WorkloadConfig {
            residential_weight: 0.0,
            commercial_weight: 0.0,
            industrial_weight: 0.0,
            ..WorkloadConfig::default()
        };
        let _ = DemandGenerator::new(&cfg, 1);
    }
}
