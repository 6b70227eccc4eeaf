use rand::rngs::SmallRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Exp};

/// Per-cache-entry exponential interarrival sampler, mean 60_000ms by
/// default. Drives the Poisson recycle schedule in §4.2.2: owned by one
/// connection cache entry, never shared across workers (sharing a sampler
/// would serialize sampling between otherwise-independent workers).
pub struct InterarrivalSampler {
	rng: SmallRng,
	dist: Exp<f64>,
}

impl InterarrivalSampler {
	pub const DEFAULT_MEAN_MS: f64 = 60_000.0;

	pub fn new(mean_ms: f64) -> Self {
		assert!(mean_ms > 0.0, "interarrival mean must be positive");
		Self {
			rng: SmallRng::from_os_rng(),
			dist: Exp::new(1.0 / mean_ms).expect("rate must be finite and positive"),
		}
	}

	/// Draw the next interarrival interval, in whole milliseconds (at
	/// least 1, so a degenerate draw never produces a no-op recycle).
	pub fn sample_ms(&mut self) -> u64 {
		let draw = self.dist.sample(&mut self.rng);
		(draw.round() as u64).max(1)
	}
}

impl Default for InterarrivalSampler {
	fn default() -> Self {
		Self::new(Self::DEFAULT_MEAN_MS)
	}
}
