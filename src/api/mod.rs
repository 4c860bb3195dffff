use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::core::{
    FinancialProfile, SimulationOutcome, SimulationParams, YearBand, expense_risk_score,
    format_inr, projected_wealth, run_monte_carlo, vice_spend,
};

#[derive(Parser, Debug)]
#[command(
    name = "chronowealth",
    about = "Monte Carlo wealth projection (seeded RNG + percentile bands + risk score)"
)]
pub struct Cli {
    #[arg(long, help = "Current invested wealth in rupees")]
    initial_wealth: f64,
    #[arg(long, help = "Monthly contribution in rupees")]
    monthly_contribution: f64,
    #[arg(long, default_value_t = 20, help = "Projection horizon in years")]
    years: u32,
    #[arg(long, default_value_t = 1000, help = "Monte Carlo iteration count")]
    iterations: u32,
    #[arg(long, default_value_t = 1337)]
    seed: u32,
    #[arg(
        long,
        default_value_t = 12.0,
        help = "Expected annual equity return in percent"
    )]
    mean_return: f64,
    #[arg(
        long,
        default_value_t = 15.0,
        help = "Annual return volatility in percent"
    )]
    return_volatility: f64,
    #[arg(long, help = "Calendar year for the first band; defaults to today")]
    start_year: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SimulatePayload {
    initial_wealth: Option<f64>,
    monthly_contribution: Option<f64>,
    years: Option<u32>,
    iterations: Option<u32>,
    seed: Option<u32>,
    mean_return: Option<f64>,
    return_volatility: Option<f64>,
    start_year: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProjectionPayload {
    current_wealth: Option<f64>,
    monthly_contribution: Option<f64>,
    months: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulateResponse {
    initial_wealth: f64,
    monthly_contribution: f64,
    years: u32,
    iterations: u32,
    seed: u32,
    mean_return: f64,
    return_volatility: f64,
    start_year: i32,
    results: Vec<YearBand>,
    risk_score: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectionResponse {
    current_wealth: f64,
    monthly_contribution: f64,
    months: u32,
    projected_wealth: f64,
    display: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProfileResponse {
    city_tier: String,
    inflation_factor: f64,
    inflation_rate: f64,
    dna_total: f64,
    monthly_vices: f64,
    expense_risk_score: f64,
    monthly_surplus: f64,
    projected_wealth: f64,
    projected_wealth_display: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn build_params(cli: Cli) -> Result<SimulationParams, String> {
    if !cli.initial_wealth.is_finite() || cli.initial_wealth < 0.0 {
        return Err("--initial-wealth must be finite and >= 0".to_string());
    }

    if !cli.monthly_contribution.is_finite() || cli.monthly_contribution < 0.0 {
        return Err("--monthly-contribution must be finite and >= 0".to_string());
    }

    if cli.years == 0 {
        return Err("--years must be > 0".to_string());
    }

    if cli.years > 100 {
        return Err("--years must be <= 100".to_string());
    }

    if cli.iterations == 0 {
        return Err("--iterations must be > 0".to_string());
    }

    if cli.iterations > 1_000_000 {
        return Err("--iterations must be <= 1000000".to_string());
    }

    if !cli.mean_return.is_finite() || cli.mean_return <= -100.0 || cli.mean_return > 100.0 {
        return Err("--mean-return must be between -100 and 100".to_string());
    }

    if !(0.0..=100.0).contains(&cli.return_volatility) {
        return Err("--return-volatility must be between 0 and 100".to_string());
    }

    if let Some(year) = cli.start_year {
        if !(1900..=3000).contains(&year) {
            return Err("--start-year must be between 1900 and 3000".to_string());
        }
    }

    let mut params = SimulationParams::new(cli.initial_wealth, cli.monthly_contribution);
    params.years = cli.years;
    params.iterations = cli.iterations;
    params.seed = cli.seed;
    params.mean_return = cli.mean_return / 100.0;
    params.return_volatility = cli.return_volatility / 100.0;
    if let Some(year) = cli.start_year {
        params.start_year = year;
    }
    Ok(params)
}

fn params_from_payload(payload: SimulatePayload) -> Result<SimulationParams, String> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.initial_wealth {
        cli.initial_wealth = v;
    }
    if let Some(v) = payload.monthly_contribution {
        cli.monthly_contribution = v;
    }
    if let Some(v) = payload.years {
        cli.years = v;
    }
    if let Some(v) = payload.iterations {
        cli.iterations = v;
    }
    if let Some(v) = payload.seed {
        cli.seed = v;
    }
    if let Some(v) = payload.mean_return {
        cli.mean_return = v;
    }
    if let Some(v) = payload.return_volatility {
        cli.return_volatility = v;
    }
    if let Some(v) = payload.start_year {
        cli.start_year = Some(v);
    }

    build_params(cli)
}

fn default_cli_for_api() -> Cli {
    Cli {
        initial_wealth: 500_000.0,
        monthly_contribution: 5_000.0,
        years: 20,
        iterations: 1_000,
        seed: 1337,
        mean_return: 12.0,
        return_volatility: 15.0,
        start_year: None,
    }
}

fn validate_projection(payload: ProjectionPayload) -> Result<(f64, f64, u32), String> {
    let current_wealth = payload.current_wealth.unwrap_or(500_000.0);
    let monthly_contribution = payload.monthly_contribution.unwrap_or(5_000.0);
    let months = payload.months.unwrap_or(240);

    if !current_wealth.is_finite() || current_wealth < 0.0 {
        return Err("currentWealth must be finite and >= 0".to_string());
    }
    if !monthly_contribution.is_finite() || monthly_contribution < 0.0 {
        return Err("monthlyContribution must be finite and >= 0".to_string());
    }
    if months > 1_200 {
        return Err("months must be <= 1200".to_string());
    }

    Ok((current_wealth, monthly_contribution, months))
}

fn validate_profile(profile: &FinancialProfile) -> Result<(), String> {
    let amounts = [
        ("monthlyIncome", profile.monthly_income),
        ("monthlyExpenses", profile.monthly_expenses),
        ("currentInvestments", profile.current_investments),
        ("termCover", profile.term_cover),
        ("healthCover", profile.health_cover),
        ("dna.rent", profile.dna.rent),
        ("dna.food", profile.dna.food),
        ("dna.shopping", profile.dna.shopping),
        ("dna.subscriptions", profile.dna.subscriptions),
        ("dna.trips", profile.dna.trips),
        ("dna.commute", profile.dna.commute),
        ("dna.party", profile.dna.party),
        ("dna.habits", profile.dna.habits),
        ("dna.sips", profile.dna.sips),
        ("dna.investments", profile.dna.investments),
    ];

    for (name, value) in amounts {
        if !value.is_finite() || value < 0.0 {
            return Err(format!("{name} must be finite and >= 0"));
        }
    }

    Ok(())
}

fn build_simulate_response(params: &SimulationParams, outcome: SimulationOutcome) -> SimulateResponse {
    SimulateResponse {
        initial_wealth: params.initial_wealth,
        monthly_contribution: params.monthly_contribution,
        years: params.years,
        iterations: params.iterations,
        seed: params.seed,
        mean_return: params.mean_return,
        return_volatility: params.return_volatility,
        start_year: params.start_year,
        results: outcome.results,
        risk_score: outcome.risk_score,
    }
}

fn build_profile_response(profile: &FinancialProfile) -> ProfileResponse {
    let dna_total = profile.dna.total();
    let monthly_vices = vice_spend(&profile.dna);
    let monthly_surplus = profile.monthly_income - dna_total;
    let projection = projected_wealth(
        profile.current_investments,
        monthly_surplus.max(0.0),
        240,
    );

    ProfileResponse {
        city_tier: profile.city_tier.label().to_string(),
        inflation_factor: profile.city_tier.inflation_factor(),
        inflation_rate: profile.city_tier.inflation_rate(),
        dna_total,
        monthly_vices,
        expense_risk_score: expense_risk_score(&profile.dna, profile.monthly_income),
        monthly_surplus,
        projected_wealth: projection,
        projected_wealth_display: format_inr(projection),
    }
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route(
            "/api/simulate",
            get(simulate_get_handler).post(simulate_post_handler),
        )
        .route(
            "/api/projection",
            get(projection_get_handler).post(projection_post_handler),
        )
        .route("/api/profile", post(profile_handler))
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    println!("Chronowealth HTTP API listening on http://{addr}");
    println!("Local access: http://127.0.0.1:{port}/api/simulate");

    axum::serve(listener, app).await
}

/// One-shot projection from the command line, printed as a band table.
pub fn run_simulate_cli(args: &[String]) -> Result<(), String> {
    let cli = Cli::try_parse_from(args).map_err(|e| e.to_string())?;
    let params = build_params(cli)?;
    let outcome = run_monte_carlo(&params);

    println!(
        "Projection: start {} over {} years, {} iterations, seed {}",
        format_inr(params.initial_wealth),
        params.years,
        params.iterations,
        params.seed
    );
    println!("{:<6} {:>16} {:>16} {:>16}", "Year", "P10", "P50", "P90");
    for band in &outcome.results {
        println!(
            "{:<6} {:>16} {:>16} {:>16}",
            band.year,
            format_inr(band.p10),
            format_inr(band.p50),
            format_inr(band.p90)
        );
    }
    println!("Risk score: {:.1}", outcome.risk_score);

    Ok(())
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn simulate_get_handler(Query(payload): Query<SimulatePayload>) -> Response {
    simulate_handler_impl(payload)
}

async fn simulate_post_handler(Json(payload): Json<SimulatePayload>) -> Response {
    simulate_handler_impl(payload)
}

fn simulate_handler_impl(payload: SimulatePayload) -> Response {
    let params = match params_from_payload(payload) {
        Ok(params) => params,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };

    let outcome = run_monte_carlo(&params);
    json_response(StatusCode::OK, build_simulate_response(&params, outcome))
}

async fn projection_get_handler(Query(payload): Query<ProjectionPayload>) -> Response {
    projection_handler_impl(payload)
}

async fn projection_post_handler(Json(payload): Json<ProjectionPayload>) -> Response {
    projection_handler_impl(payload)
}

fn projection_handler_impl(payload: ProjectionPayload) -> Response {
    let (current_wealth, monthly_contribution, months) = match validate_projection(payload) {
        Ok(validated) => validated,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };

    let value = projected_wealth(current_wealth, monthly_contribution, months);
    json_response(
        StatusCode::OK,
        ProjectionResponse {
            current_wealth,
            monthly_contribution,
            months,
            projected_wealth: value,
            display: format_inr(value),
        },
    )
}

async fn profile_handler(Json(profile): Json<FinancialProfile>) -> Response {
    if let Err(msg) = validate_profile(&profile) {
        return error_response(StatusCode::BAD_REQUEST, &msg);
    }

    json_response(StatusCode::OK, build_profile_response(&profile))
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CityTier;

    const EPS: f64 = 1e-9;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn params_from_json(json: &str) -> Result<SimulationParams, String> {
        let payload = serde_json::from_str::<SimulatePayload>(json)
            .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
        params_from_payload(payload)
    }

    #[test]
    fn empty_payload_uses_api_defaults() {
        let params = params_from_json("{}").expect("valid params");
        assert_approx(params.initial_wealth, 500_000.0);
        assert_approx(params.monthly_contribution, 5_000.0);
        assert_eq!(params.years, 20);
        assert_eq!(params.iterations, 1_000);
        assert_eq!(params.seed, 1337);
        assert_approx(params.mean_return, 0.12);
        assert_approx(params.return_volatility, 0.15);
    }

    #[test]
    fn payload_fields_override_defaults() {
        let params = params_from_json(
            r#"{
                "initialWealth": 1000000,
                "monthlyContribution": 20000,
                "years": 10,
                "iterations": 500,
                "seed": 7,
                "meanReturn": 8.0,
                "returnVolatility": 12.0,
                "startYear": 2030
            }"#,
        )
        .expect("valid params");

        assert_approx(params.initial_wealth, 1_000_000.0);
        assert_approx(params.monthly_contribution, 20_000.0);
        assert_eq!(params.years, 10);
        assert_eq!(params.iterations, 500);
        assert_eq!(params.seed, 7);
        assert_approx(params.mean_return, 0.08);
        assert_approx(params.return_volatility, 0.12);
        assert_eq!(params.start_year, 2030);
    }

    #[test]
    fn rejects_zero_iterations() {
        let err = params_from_json(r#"{"iterations": 0}"#).expect_err("must reject");
        assert!(err.contains("--iterations"));
    }

    #[test]
    fn rejects_zero_years() {
        let err = params_from_json(r#"{"years": 0}"#).expect_err("must reject");
        assert!(err.contains("--years"));
    }

    #[test]
    fn rejects_negative_initial_wealth() {
        let err = params_from_json(r#"{"initialWealth": -1}"#).expect_err("must reject");
        assert!(err.contains("--initial-wealth"));
    }

    #[test]
    fn rejects_negative_contribution() {
        let err = params_from_json(r#"{"monthlyContribution": -500}"#).expect_err("must reject");
        assert!(err.contains("--monthly-contribution"));
    }

    #[test]
    fn rejects_out_of_range_volatility() {
        let err = params_from_json(r#"{"returnVolatility": 150}"#).expect_err("must reject");
        assert!(err.contains("--return-volatility"));

        let err = params_from_json(r#"{"returnVolatility": -5}"#).expect_err("must reject");
        assert!(err.contains("--return-volatility"));
    }

    #[test]
    fn rejects_excessive_iteration_count() {
        let err = params_from_json(r#"{"iterations": 2000000}"#).expect_err("must reject");
        assert!(err.contains("--iterations"));
    }

    #[test]
    fn rejects_implausible_start_year() {
        let err = params_from_json(r#"{"startYear": 1684}"#).expect_err("must reject");
        assert!(err.contains("--start-year"));
    }

    #[test]
    fn simulate_response_echoes_params_and_bands() {
        let params = params_from_json(r#"{"years": 5, "iterations": 50, "startYear": 2026}"#)
            .expect("valid params");
        let outcome = run_monte_carlo(&params);
        let response = build_simulate_response(&params, outcome);

        assert_eq!(response.results.len(), 6);
        assert_eq!(response.results[0].year, 2026);
        assert_eq!(response.start_year, 2026);
        assert!(!response.risk_score.is_nan());
    }

    #[test]
    fn projection_validation_applies_defaults() {
        let (wealth, monthly, months) =
            validate_projection(ProjectionPayload::default()).expect("valid");
        assert_approx(wealth, 500_000.0);
        assert_approx(monthly, 5_000.0);
        assert_eq!(months, 240);
    }

    #[test]
    fn projection_validation_rejects_negative_wealth() {
        let payload = ProjectionPayload {
            current_wealth: Some(-1.0),
            ..ProjectionPayload::default()
        };
        let err = validate_projection(payload).expect_err("must reject");
        assert!(err.contains("currentWealth"));
    }

    #[test]
    fn profile_validation_rejects_negative_dna_amounts() {
        let mut profile = FinancialProfile::default();
        profile.dna.habits = -10.0;
        let err = validate_profile(&profile).expect_err("must reject");
        assert!(err.contains("dna.habits"));
    }

    #[test]
    fn profile_response_summarizes_dna_and_projection() {
        let profile = FinancialProfile::default();
        let response = build_profile_response(&profile);

        assert_approx(response.dna_total, 35_000.0);
        assert_approx(response.monthly_vices, 8_000.0);
        assert_approx(response.expense_risk_score, 16.0);
        assert_approx(response.monthly_surplus, 15_000.0);
        assert_approx(response.inflation_factor, 1.0);
        assert_eq!(response.city_tier, "Tier 1 (Metro)");
        assert_approx(
            response.projected_wealth,
            projected_wealth(500_000.0, 15_000.0, 240),
        );
        assert!(response.projected_wealth_display.starts_with('\u{20B9}'));
    }

    #[test]
    fn profile_response_ignores_negative_surplus_for_projection() {
        let profile = FinancialProfile {
            monthly_income: 10_000.0,
            city_tier: CityTier::Tier3,
            ..FinancialProfile::default()
        };
        let response = build_profile_response(&profile);

        assert!(response.monthly_surplus < 0.0);
        assert_approx(
            response.projected_wealth,
            projected_wealth(500_000.0, 0.0, 240),
        );
        assert_approx(response.inflation_factor, 0.65);
    }
}
