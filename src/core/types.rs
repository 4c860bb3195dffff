use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};

/// City cost tier used to scale expense baselines and inflation assumptions.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CityTier {
    Tier1,
    Tier2,
    Tier3,
}

impl CityTier {
    pub fn label(self) -> &'static str {
        match self {
            CityTier::Tier1 => "Tier 1 (Metro)",
            CityTier::Tier2 => "Tier 2 (City)",
            CityTier::Tier3 => "Tier 3 (Town)",
        }
    }

    /// Multiplier applied to metro-baseline expense figures.
    pub fn inflation_factor(self) -> f64 {
        match self {
            CityTier::Tier1 => 1.0,
            CityTier::Tier2 => 0.82,
            CityTier::Tier3 => 0.65,
        }
    }

    /// Assumed annual cost-of-living inflation, in percent.
    pub fn inflation_rate(self) -> f64 {
        match self {
            CityTier::Tier1 => 8.0,
            CityTier::Tier2 => 7.0,
            CityTier::Tier3 => 6.0,
        }
    }
}

/// Monthly expense breakdown across the ten "Financial DNA" categories.
///
/// All amounts are monthly rupees. The vice subtotal (shopping, subscriptions,
/// trips, party, habits) feeds the expense risk score.
#[derive(Copy, Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExpenseDna {
    pub rent: f64,
    pub food: f64,
    pub shopping: f64,
    pub subscriptions: f64,
    pub trips: f64,
    pub commute: f64,
    pub party: f64,
    pub habits: f64,
    pub sips: f64,
    pub investments: f64,
}

impl ExpenseDna {
    pub fn total(&self) -> f64 {
        self.rent
            + self.food
            + self.shopping
            + self.subscriptions
            + self.trips
            + self.commute
            + self.party
            + self.habits
            + self.sips
            + self.investments
    }
}

impl Default for ExpenseDna {
    fn default() -> Self {
        Self {
            rent: 12_000.0,
            food: 5_000.0,
            shopping: 3_000.0,
            subscriptions: 1_000.0,
            trips: 2_000.0,
            commute: 2_000.0,
            party: 1_500.0,
            habits: 500.0,
            sips: 5_000.0,
            investments: 3_000.0,
        }
    }
}

/// A user's financial snapshot as collected during onboarding.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FinancialProfile {
    pub monthly_income: f64,
    pub monthly_expenses: f64,
    pub current_investments: f64,
    pub term_cover: f64,
    pub health_cover: f64,
    pub dna: ExpenseDna,
    pub city_tier: CityTier,
}

impl Default for FinancialProfile {
    fn default() -> Self {
        Self {
            monthly_income: 50_000.0,
            monthly_expenses: 20_000.0,
            current_investments: 500_000.0,
            term_cover: 10_000_000.0,
            health_cover: 1_000_000.0,
            dna: ExpenseDna::default(),
            city_tier: CityTier::Tier1,
        }
    }
}

/// Fixed seed so projections are reproducible across runs for identical inputs.
pub const DEFAULT_SEED: u32 = 1337;

pub const DEFAULT_YEARS: u32 = 20;
pub const DEFAULT_ITERATIONS: u32 = 1000;
pub const DEFAULT_MEAN_RETURN: f64 = 0.12;
pub const DEFAULT_RETURN_VOLATILITY: f64 = 0.15;

/// Immutable inputs for one Monte Carlo run.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationParams {
    pub initial_wealth: f64,
    pub monthly_contribution: f64,
    pub years: u32,
    pub iterations: u32,
    pub mean_return: f64,
    pub return_volatility: f64,
    pub seed: u32,
    pub start_year: i32,
}

impl SimulationParams {
    pub fn new(initial_wealth: f64, monthly_contribution: f64) -> Self {
        Self {
            initial_wealth,
            monthly_contribution,
            years: DEFAULT_YEARS,
            iterations: DEFAULT_ITERATIONS,
            mean_return: DEFAULT_MEAN_RETURN,
            return_volatility: DEFAULT_RETURN_VOLATILITY,
            seed: DEFAULT_SEED,
            start_year: Utc::now().year(),
        }
    }
}

/// Percentile band for one projected calendar year.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearBand {
    pub year: i32,
    pub p10: f64,
    pub p50: f64,
    pub p90: f64,
}

/// The simulator's only output: one band per year plus a derived risk score.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationOutcome {
    pub results: Vec<YearBand>,
    pub risk_score: f64,
}
