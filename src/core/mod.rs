mod engine;
mod formulas;
mod types;

pub use engine::{Mulberry32, run_monte_carlo, sample_normal};
pub use formulas::{
    MONTHLY_RATE, expense_risk_score, format_inr, projected_wealth, vice_spend,
};
pub use types::{
    CityTier, DEFAULT_ITERATIONS, DEFAULT_MEAN_RETURN, DEFAULT_RETURN_VOLATILITY, DEFAULT_SEED,
    DEFAULT_YEARS, ExpenseDna, FinancialProfile, SimulationOutcome, SimulationParams, YearBand,
};
