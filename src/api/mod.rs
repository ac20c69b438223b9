use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::core::{
    CalculationResult, CrossoverResult, CrossoverYear, CrossoverYearRecord, EnduranceMetrics,
    FilingStatus, Inputs, PlanConfig, adjusted_projection, effective_tax_rate, run_session,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliFilingStatus {
    Single,
    MarriedJointly,
    MarriedSeparately,
    HeadOfHousehold,
}

impl From<CliFilingStatus> for FilingStatus {
    fn from(value: CliFilingStatus) -> Self {
        match value {
            CliFilingStatus::Single => FilingStatus::Single,
            CliFilingStatus::MarriedJointly => FilingStatus::MarriedJointly,
            CliFilingStatus::MarriedSeparately => FilingStatus::MarriedSeparately,
            CliFilingStatus::HeadOfHousehold => FilingStatus::HeadOfHousehold,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiFilingStatus {
    Single,
    #[serde(alias = "marriedJointly", alias = "married_jointly")]
    MarriedJointly,
    #[serde(alias = "marriedSeparately", alias = "married_separately")]
    MarriedSeparately,
    #[serde(alias = "headOfHousehold", alias = "head_of_household")]
    HeadOfHousehold,
}

impl From<ApiFilingStatus> for CliFilingStatus {
    fn from(value: ApiFilingStatus) -> Self {
        match value {
            ApiFilingStatus::Single => CliFilingStatus::Single,
            ApiFilingStatus::MarriedJointly => CliFilingStatus::MarriedJointly,
            ApiFilingStatus::MarriedSeparately => CliFilingStatus::MarriedSeparately,
            ApiFilingStatus::HeadOfHousehold => CliFilingStatus::HeadOfHousehold,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CalculatePayload {
    pre_tax_income: Option<f64>,
    filing_status: Option<ApiFilingStatus>,
    state_income_tax: Option<f64>,
    wealth_account: Option<f64>,
    adjusted_saving: Option<f64>,

    savings_rate: Option<f64>,
    spending_rate: Option<f64>,
    wealth_spending_rate: Option<f64>,
    return_rate: Option<f64>,
    withdrawal_rate: Option<f64>,
    projection_years: Option<u32>,
    crossover_horizon: Option<u32>,
}

#[derive(Parser, Debug)]
#[command(
    name = "crossover",
    about = "Worker-versus-investor savings comparison (federal brackets + 15-year projection + crossover search)"
)]
struct Cli {
    #[arg(long, help = "Gross annual income before any tax")]
    pre_tax_income: f64,
    #[arg(long, value_enum)]
    filing_status: CliFilingStatus,
    #[arg(long, default_value_t = 0.0, help = "Flat annual state income tax")]
    state_income_tax: f64,
    #[arg(
        long,
        help = "Current investable wealth; omit to treat the field as blank (zero)"
    )]
    wealth_account: Option<f64>,
    #[arg(
        long,
        help = "Slider override for the adjusted projection, clamped to after-tax income"
    )]
    adjusted_saving: Option<f64>,
    #[arg(
        long,
        default_value_t = 10.0,
        help = "Worker baseline savings rate in percent of gross income"
    )]
    savings_rate: f64,
    #[arg(
        long,
        default_value_t = 50.0,
        help = "Investor spending rate in percent of after-tax income"
    )]
    spending_rate: f64,
    #[arg(
        long,
        default_value_t = 5.0,
        help = "Investor spending rate in percent of existing wealth"
    )]
    wealth_spending_rate: f64,
    #[arg(
        long,
        default_value_t = 7.0,
        help = "Blended annual investment return in percent"
    )]
    return_rate: f64,
    #[arg(
        long,
        default_value_t = 5.0,
        help = "Passive-income withdrawal rate in percent"
    )]
    withdrawal_rate: f64,
    #[arg(long, default_value_t = 15)]
    projection_years: u32,
    #[arg(long, default_value_t = 50, help = "Crossover search horizon in years")]
    crossover_horizon: u32,
}

#[derive(Debug)]
struct ApiRequest {
    inputs: Inputs,
    config: PlanConfig,
    adjusted_saving: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiCrossover {
    /// `null` means independence is never reached within the horizon.
    crossover_year: Option<u32>,
    already_financially_independent: bool,
    yearly_records: Vec<CrossoverYearRecord>,
}

impl From<&CrossoverResult> for ApiCrossover {
    fn from(value: &CrossoverResult) -> Self {
        ApiCrossover {
            crossover_year: value.crossover_year.year(),
            already_financially_independent: value.crossover_year
                == CrossoverYear::Achieved(0),
            yearly_records: value.yearly_records.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiEndurance {
    /// `null` means the assets sustain the spending indefinitely, which is
    /// a different statement from a `null` crossover year.
    worker_current_endurance_years: Option<u32>,
    investor_current_endurance_years: Option<u32>,
    worker_future_endurance_years: Option<u32>,
    investor_future_endurance_years: Option<u32>,
    #[serde(rename = "workerWealth15Yr")]
    worker_wealth_at_horizon: f64,
    #[serde(rename = "investorWealth15Yr")]
    investor_wealth_at_horizon: f64,
}

impl From<&EnduranceMetrics> for ApiEndurance {
    fn from(value: &EnduranceMetrics) -> Self {
        ApiEndurance {
            worker_current_endurance_years: value.worker_current.years(),
            investor_current_endurance_years: value.investor_current.years(),
            worker_future_endurance_years: value.worker_future.years(),
            investor_future_endurance_years: value.investor_future.years(),
            worker_wealth_at_horizon: value.worker_wealth_at_horizon,
            investor_wealth_at_horizon: value.investor_wealth_at_horizon,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CalculateResponse {
    tax_year: u16,
    calculation: CalculationResult,
    effective_tax_rate: f64,
    worker_projection: Vec<f64>,
    investor_projection: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    adjusted_projection: Option<Vec<f64>>,
    worker_crossover: ApiCrossover,
    investor_crossover: ApiCrossover,
    endurance: ApiEndurance,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn build_request(cli: Cli) -> Result<ApiRequest, String> {
    if !cli.pre_tax_income.is_finite() || cli.pre_tax_income <= 0.0 {
        return Err("--pre-tax-income must be > 0".to_string());
    }

    if !cli.state_income_tax.is_finite() || cli.state_income_tax < 0.0 {
        return Err("--state-income-tax must be >= 0".to_string());
    }

    if cli.state_income_tax > cli.pre_tax_income {
        return Err("--state-income-tax cannot exceed --pre-tax-income".to_string());
    }

    if let Some(wealth) = cli.wealth_account {
        if !wealth.is_finite() || wealth < 0.0 {
            return Err("--wealth-account must be >= 0".to_string());
        }
    }

    if let Some(saving) = cli.adjusted_saving {
        if !saving.is_finite() || saving < 0.0 {
            return Err("--adjusted-saving must be >= 0".to_string());
        }
    }

    for (name, rate) in [
        ("--savings-rate", cli.savings_rate),
        ("--spending-rate", cli.spending_rate),
        ("--wealth-spending-rate", cli.wealth_spending_rate),
        ("--withdrawal-rate", cli.withdrawal_rate),
    ] {
        if !(0.0..=100.0).contains(&rate) {
            return Err(format!("{name} must be between 0 and 100"));
        }
    }

    if !cli.return_rate.is_finite() || cli.return_rate <= -100.0 {
        return Err("--return-rate must be > -100".to_string());
    }

    if cli.projection_years == 0 {
        return Err("--projection-years must be > 0".to_string());
    }

    if cli.crossover_horizon == 0 {
        return Err("--crossover-horizon must be > 0".to_string());
    }

    let mut config = PlanConfig::tax_year_2024();
    config.default_savings_rate = cli.savings_rate / 100.0;
    config.after_tax_spending_rate = cli.spending_rate / 100.0;
    config.wealth_spending_rate = cli.wealth_spending_rate / 100.0;
    config.investment_return_rate = cli.return_rate / 100.0;
    config.withdrawal_rate = cli.withdrawal_rate / 100.0;
    config.projection_years = cli.projection_years;
    config.crossover_horizon_years = cli.crossover_horizon;

    Ok(ApiRequest {
        inputs: Inputs {
            pre_tax_income: cli.pre_tax_income,
            wealth_account: cli.wealth_account,
            state_income_tax: cli.state_income_tax,
            filing_status: cli.filing_status.into(),
        },
        config,
        adjusted_saving: cli.adjusted_saving,
    })
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route(
            "/api/calculate",
            get(calculate_get_handler).post(calculate_post_handler),
        )
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    info!("crossover HTTP API listening on http://{addr}");
    info!("Local access: http://127.0.0.1:{port}/api/calculate");

    axum::serve(listener, app).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn calculate_get_handler(Query(payload): Query<CalculatePayload>) -> Response {
    calculate_handler_impl(payload).await
}

async fn calculate_post_handler(Json(payload): Json<CalculatePayload>) -> Response {
    calculate_handler_impl(payload).await
}

async fn calculate_handler_impl(payload: CalculatePayload) -> Response {
    let request = match api_request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => {
            warn!("rejected calculation request: {msg}");
            return error_response(StatusCode::BAD_REQUEST, &msg);
        }
    };

    json_response(StatusCode::OK, build_calculate_response(&request))
}

fn build_calculate_response(request: &ApiRequest) -> CalculateResponse {
    let config = &request.config;
    let session = run_session(&request.inputs, config);
    let adjusted = request
        .adjusted_saving
        .map(|saving| adjusted_projection(&session.result, saving, config));

    CalculateResponse {
        tax_year: config.tax_year,
        effective_tax_rate: effective_tax_rate(
            session.result.total_tax,
            request.inputs.pre_tax_income,
        ),
        worker_projection: session.worker_projection,
        investor_projection: session.investor_projection,
        adjusted_projection: adjusted,
        worker_crossover: (&session.crossover.worker).into(),
        investor_crossover: (&session.crossover.investor).into(),
        endurance: (&session.endurance).into(),
        calculation: session.result,
    }
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
fn api_request_from_json(json: &str) -> Result<ApiRequest, String> {
    let payload = serde_json::from_str::<CalculatePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    api_request_from_payload(payload)
}

fn api_request_from_payload(payload: CalculatePayload) -> Result<ApiRequest, String> {
    let Some(pre_tax_income) = payload.pre_tax_income else {
        return Err("preTaxIncome is required".to_string());
    };
    let Some(filing_status) = payload.filing_status else {
        return Err("filingStatus is required".to_string());
    };

    let mut cli = Cli {
        pre_tax_income,
        filing_status: filing_status.into(),
        state_income_tax: 0.0,
        wealth_account: None,
        adjusted_saving: None,
        savings_rate: 10.0,
        spending_rate: 50.0,
        wealth_spending_rate: 5.0,
        return_rate: 7.0,
        withdrawal_rate: 5.0,
        projection_years: 15,
        crossover_horizon: 50,
    };

    if let Some(v) = payload.state_income_tax {
        cli.state_income_tax = v;
    }
    if let Some(v) = payload.wealth_account {
        cli.wealth_account = Some(v);
    }
    if let Some(v) = payload.adjusted_saving {
        cli.adjusted_saving = Some(v);
    }
    if let Some(v) = payload.savings_rate {
        cli.savings_rate = v;
    }
    if let Some(v) = payload.spending_rate {
        cli.spending_rate = v;
    }
    if let Some(v) = payload.wealth_spending_rate {
        cli.wealth_spending_rate = v;
    }
    if let Some(v) = payload.return_rate {
        cli.return_rate = v;
    }
    if let Some(v) = payload.withdrawal_rate {
        cli.withdrawal_rate = v;
    }
    if let Some(v) = payload.projection_years {
        cli.projection_years = v;
    }
    if let Some(v) = payload.crossover_horizon {
        cli.crossover_horizon = v;
    }

    build_request(cli)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn sample_cli() -> Cli {
        Cli {
            pre_tax_income: 100_000.0,
            filing_status: CliFilingStatus::Single,
            state_income_tax: 3_000.0,
            wealth_account: None,
            adjusted_saving: None,
            savings_rate: 10.0,
            spending_rate: 50.0,
            wealth_spending_rate: 5.0,
            return_rate: 7.0,
            withdrawal_rate: 5.0,
            projection_years: 15,
            crossover_horizon: 50,
        }
    }

    #[test]
    fn build_request_accepts_sample_inputs() {
        let request = build_request(sample_cli()).expect("valid inputs");
        assert_approx(request.inputs.pre_tax_income, 100_000.0);
        assert_eq!(request.inputs.filing_status, FilingStatus::Single);
        assert_eq!(request.inputs.wealth_account, None);
        assert_approx(request.config.investment_return_rate, 0.07);
        assert_eq!(request.config.projection_years, 15);
    }

    #[test]
    fn build_request_rejects_non_positive_income() {
        let mut cli = sample_cli();
        cli.pre_tax_income = 0.0;
        let err = build_request(cli).expect_err("must reject zero income");
        assert!(err.contains("--pre-tax-income"));
    }

    #[test]
    fn build_request_rejects_state_tax_above_income() {
        let mut cli = sample_cli();
        cli.state_income_tax = 150_000.0;
        let err = build_request(cli).expect_err("must reject excessive state tax");
        assert!(err.contains("--state-income-tax"));
    }

    #[test]
    fn build_request_rejects_negative_wealth() {
        let mut cli = sample_cli();
        cli.wealth_account = Some(-1.0);
        let err = build_request(cli).expect_err("must reject negative wealth");
        assert!(err.contains("--wealth-account"));
    }

    #[test]
    fn build_request_rejects_out_of_range_rates() {
        let mut cli = sample_cli();
        cli.withdrawal_rate = 120.0;
        let err = build_request(cli).expect_err("must reject rate above 100");
        assert!(err.contains("--withdrawal-rate"));

        let mut cli = sample_cli();
        cli.return_rate = -100.0;
        let err = build_request(cli).expect_err("must reject -100 return");
        assert!(err.contains("--return-rate"));
    }

    #[test]
    fn build_request_rejects_zero_horizons() {
        let mut cli = sample_cli();
        cli.projection_years = 0;
        assert!(build_request(cli).is_err());

        let mut cli = sample_cli();
        cli.crossover_horizon = 0;
        assert!(build_request(cli).is_err());
    }

    #[test]
    fn api_request_from_json_parses_web_keys() {
        let json = r#"{
          "preTaxIncome": 100000,
          "filingStatus": "married-jointly",
          "stateIncomeTax": 3000,
          "wealthAccount": 25000,
          "adjustedSaving": 12000,
          "returnRate": 6.5,
          "projectionYears": 20
        }"#;
        let request = api_request_from_json(json).expect("json should parse");

        assert_approx(request.inputs.pre_tax_income, 100_000.0);
        assert_eq!(request.inputs.filing_status, FilingStatus::MarriedJointly);
        assert_approx(request.inputs.state_income_tax, 3_000.0);
        assert_eq!(request.inputs.wealth_account, Some(25_000.0));
        assert_eq!(request.adjusted_saving, Some(12_000.0));
        assert_approx(request.config.investment_return_rate, 0.065);
        assert_eq!(request.config.projection_years, 20);
    }

    #[test]
    fn api_request_from_json_accepts_filing_status_aliases() {
        for status in ["head-of-household", "headOfHousehold", "head_of_household"] {
            let json = format!(r#"{{"preTaxIncome": 50000, "filingStatus": "{status}"}}"#);
            let request = api_request_from_json(&json).expect("alias should parse");
            assert_eq!(request.inputs.filing_status, FilingStatus::HeadOfHousehold);
        }
    }

    #[test]
    fn api_request_from_json_requires_income_and_status() {
        let err = api_request_from_json(r#"{"filingStatus": "single"}"#)
            .expect_err("must require income");
        assert!(err.contains("preTaxIncome"));

        let err = api_request_from_json(r#"{"preTaxIncome": 50000}"#)
            .expect_err("must require filing status");
        assert!(err.contains("filingStatus"));
    }

    #[test]
    fn api_request_from_json_rejects_unknown_filing_status() {
        let err = api_request_from_json(r#"{"preTaxIncome": 50000, "filingStatus": "royalty"}"#)
            .expect_err("must reject unknown status");
        assert!(err.contains("Invalid API JSON payload"));
    }

    #[test]
    fn absent_wealth_field_is_treated_as_blank() {
        let request =
            api_request_from_json(r#"{"preTaxIncome": 80000, "filingStatus": "single"}"#)
                .expect("json should parse");
        assert_eq!(request.inputs.wealth_account, None);

        let response = build_calculate_response(&request);
        assert_approx(response.calculation.wealth_account, 0.0);
    }

    #[test]
    fn response_serialization_exposes_documented_fields() {
        let request = build_request(sample_cli()).expect("valid inputs");
        let response = build_calculate_response(&request);
        let json = serde_json::to_string(&response).expect("response should serialize");

        assert!(json.contains("\"taxYear\":2024"));
        assert!(json.contains("\"calculation\""));
        assert!(json.contains("\"afterTaxIncome\""));
        assert!(json.contains("\"targetSaving\""));
        assert!(json.contains("\"estimatedSpending\""));
        assert!(json.contains("\"workerProjection\""));
        assert!(json.contains("\"investorProjection\""));
        assert!(json.contains("\"crossoverYear\""));
        assert!(json.contains("\"alreadyFinanciallyIndependent\""));
        assert!(json.contains("\"yearlyRecords\""));
        assert!(json.contains("\"passiveIncome\""));
        assert!(json.contains("\"workerWealth15Yr\""));
        assert!(json.contains("\"investorWealth15Yr\""));
        // No slider in the request, so no adjusted series in the response.
        assert!(!json.contains("\"adjustedProjection\""));
    }

    #[test]
    fn adjusted_projection_appears_only_when_requested() {
        let mut cli = sample_cli();
        cli.adjusted_saving = Some(20_000.0);
        let request = build_request(cli).expect("valid inputs");
        let response = build_calculate_response(&request);

        let adjusted = response.adjusted_projection.clone().expect("series expected");
        assert_eq!(adjusted.len(), 15);
        let json = serde_json::to_string(&response).expect("response should serialize");
        assert!(json.contains("\"adjustedProjection\""));
    }

    #[test]
    fn response_reports_effective_rate_on_total_tax() {
        let request = build_request(sample_cli()).expect("valid inputs");
        let response = build_calculate_response(&request);
        // 16,914 federal + 3,000 state over 100,000 gross.
        assert_approx(response.effective_tax_rate, 0.19914);
    }

    #[test]
    fn endurance_nulls_encode_indefinite_not_never() {
        let mut cli = sample_cli();
        cli.wealth_account = Some(50_000_000.0);
        let request = build_request(cli).expect("valid inputs");
        let response = build_calculate_response(&request);

        // Wealth this size sustains either path's spending forever and
        // already clears the passive-income bar at year zero.
        assert_eq!(response.endurance.worker_current_endurance_years, None);
        assert_eq!(response.endurance.investor_current_endurance_years, None);
        assert_eq!(response.worker_crossover.crossover_year, Some(0));
        assert!(response.worker_crossover.already_financially_independent);
    }
}
