use std::f64::consts::PI;

use super::types::{SimulationOutcome, SimulationParams, YearBand};

/// Risk score reported when the final-year median is zero or negative and the
/// coefficient of variation is undefined.
const FALLBACK_RISK_SCORE: f64 = 5.0;

/// Mulberry32: a 32-bit mix-function generator. For a fixed seed and a fixed
/// sequence of draws the output is bit-for-bit reproducible, which is what makes
/// projection charts stable across page loads.
pub struct Mulberry32 {
    state: u32,
}

impl Mulberry32 {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Advances the state and returns the next value in [0, 1).
    pub fn next_f64(&mut self) -> f64 {
        self.state = self.state.wrapping_add(0x6D2B_79F5);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        f64::from(t ^ (t >> 14)) / 4_294_967_296.0
    }
}

/// Box-Muller transform. Consumes exactly two draws, u1 then u2; the draw order
/// is part of the simulator's reproducibility contract, so the second variate is
/// never cached. The 1e-10 term guards ln(0).
pub fn sample_normal(rng: &mut Mulberry32, mean: f64, std_dev: f64) -> f64 {
    let u1 = rng.next_f64();
    let u2 = rng.next_f64();
    let z = (-2.0 * (u1 + 1e-10).ln()).sqrt() * (2.0 * PI * u2).cos();
    mean + std_dev * z
}

/// Runs the full Monte Carlo wealth projection.
///
/// One RNG stream is shared across the whole nested loop, iteration-major and
/// year-minor, two draws per sampled annual return. Changing that order changes
/// every output value, so it is fixed here and mirrored by the regression tests.
/// Callers must validate `years >= 1` and `iterations >= 1` at the boundary.
pub fn run_monte_carlo(params: &SimulationParams) -> SimulationOutcome {
    let years = params.years as usize;
    let iterations = params.iterations as usize;
    let annual_contribution = params.monthly_contribution * 12.0;

    let mut yearly_data: Vec<Vec<f64>> = (0..=years)
        .map(|_| Vec::with_capacity(iterations))
        .collect();

    let mut rng = Mulberry32::new(params.seed);

    for _ in 0..iterations {
        let mut wealth = params.initial_wealth;
        yearly_data[0].push(wealth);

        for year in 1..=years {
            let annual_return =
                sample_normal(&mut rng, params.mean_return, params.return_volatility);
            wealth = wealth * (1.0 + annual_return) + annual_contribution;
            yearly_data[year].push(wealth);
        }
    }

    let mut results = Vec::with_capacity(years + 1);
    for (index, samples) in yearly_data.iter_mut().enumerate() {
        samples.sort_by(|a, b| a.total_cmp(b));
        results.push(YearBand {
            year: params.start_year + index as i32,
            p10: samples[rank_index(iterations, 0.10)],
            p50: samples[rank_index(iterations, 0.50)],
            p90: samples[rank_index(iterations, 0.90)],
        });
    }

    let risk_score = risk_score_from_final_band(results.last().copied());

    SimulationOutcome {
        results,
        risk_score,
    }
}

/// Floor-indexed rank order statistic, no interpolation between ranks.
fn rank_index(iterations: usize, p: f64) -> usize {
    (iterations as f64 * p).floor() as usize
}

/// Maps final-year dispersion to a 1.0..9.9 score. The coefficient of variation
/// is approximated as (p90 - p10) / p50; a multiplier of 5 puts CV 0.2 at score
/// 1 and CV 1.8 at score 9. Undefined medians fall back to the midpoint score.
fn risk_score_from_final_band(final_band: Option<YearBand>) -> f64 {
    match final_band {
        Some(band) if band.p50 > 0.0 => {
            let spread = band.p90 - band.p10;
            let cv = spread / band.p50;
            let score = (cv * 5.0).clamp(1.0, 9.9);
            round_to_tenth(score)
        }
        _ => FALLBACK_RISK_SCORE,
    }
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
