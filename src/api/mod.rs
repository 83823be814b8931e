use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::net::SocketAddr;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::core::{
    Projection, ProjectionInput, ProjectionSummary, format_inr, format_percent, project,
    summarize,
};

/// Upper bound on `years` accepted from callers; each year is twelve
/// iterations of the monthly loop.
pub const MAX_YEARS: i32 = 1_000;

const DEFAULT_CURRENT_INVESTMENTS: f64 = 5_000_000.0;
const DEFAULT_RATE_OF_RETURN: f64 = 8.0;
const DEFAULT_SIP_MONTHLY: f64 = 100_000.0;
const DEFAULT_CURRENT_SAVINGS: f64 = 1_000_000.0;
const DEFAULT_SALARY_MONTHLY: f64 = 500_000.0;
const DEFAULT_YEARLY_SALARY_INCREMENT: f64 = 5.0;
const DEFAULT_INFLATION: f64 = 2.0;
const DEFAULT_YEARS: i32 = 20;

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub key: &'static str,
    pub label: &'static str,
    pub default_value: f64,
}

/// Input fields in the order a form should render them.
pub const INPUT_FIELDS: [FieldDescriptor; 8] = [
    FieldDescriptor {
        key: "currentInvestments",
        label: "Current Investments (₹)",
        default_value: DEFAULT_CURRENT_INVESTMENTS,
    },
    FieldDescriptor {
        key: "rateOfReturn",
        label: "Rate of Return (%)",
        default_value: DEFAULT_RATE_OF_RETURN,
    },
    FieldDescriptor {
        key: "sipMonthly",
        label: "Monthly SIP (₹)",
        default_value: DEFAULT_SIP_MONTHLY,
    },
    FieldDescriptor {
        key: "currentSavings",
        label: "Current Savings (₹)",
        default_value: DEFAULT_CURRENT_SAVINGS,
    },
    FieldDescriptor {
        key: "salaryMonthly",
        label: "Monthly Salary (₹)",
        default_value: DEFAULT_SALARY_MONTHLY,
    },
    FieldDescriptor {
        key: "yearlySalaryIncrement",
        label: "Yearly Salary & SIP Increment (%)",
        default_value: DEFAULT_YEARLY_SALARY_INCREMENT,
    },
    FieldDescriptor {
        key: "inflation",
        label: "Inflation Rate (%)",
        default_value: DEFAULT_INFLATION,
    },
    FieldDescriptor {
        key: "years",
        label: "Investment Period (Years)",
        default_value: DEFAULT_YEARS as f64,
    },
];

#[derive(Debug, Error, PartialEq)]
pub enum InputError {
    #[error("{field} must be a finite number")]
    NonFinite { field: &'static str },
    #[error("years must be at most {max}, got {years}")]
    YearsOutOfRange { years: i32, max: i32 },
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("failed to encode projection: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "wealth",
    about = "Future wealth calculator (INR): SIP contributions, salary growth and inflation",
    after_help = "Run `wealth serve [port]` to start the HTTP API instead."
)]
pub struct Cli {
    #[arg(long, default_value_t = DEFAULT_CURRENT_INVESTMENTS, help = "Current investments (₹)")]
    pub current_investments: f64,
    #[arg(long, default_value_t = DEFAULT_CURRENT_SAVINGS, help = "Current savings (₹)")]
    pub current_savings: f64,
    #[arg(
        long,
        default_value_t = DEFAULT_RATE_OF_RETURN,
        allow_negative_numbers = true,
        help = "Annual rate of return in percent, e.g. 8"
    )]
    pub rate_of_return: f64,
    #[arg(long, default_value_t = DEFAULT_SIP_MONTHLY, help = "Monthly SIP contribution (₹)")]
    pub sip_monthly: f64,
    #[arg(
        long,
        default_value_t = DEFAULT_SALARY_MONTHLY,
        help = "Monthly salary (₹), reported only"
    )]
    pub salary_monthly: f64,
    #[arg(
        long,
        default_value_t = DEFAULT_YEARLY_SALARY_INCREMENT,
        allow_negative_numbers = true,
        help = "Yearly salary and SIP increment in percent"
    )]
    pub yearly_salary_increment: f64,
    #[arg(
        long,
        default_value_t = DEFAULT_INFLATION,
        allow_negative_numbers = true,
        help = "Annual inflation in percent"
    )]
    pub inflation: f64,
    #[arg(
        long,
        default_value_t = DEFAULT_YEARS,
        allow_negative_numbers = true,
        help = "Investment period in years"
    )]
    pub years: i32,
    #[arg(long, help = "Print the JSON response instead of a table")]
    pub json: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProjectPayload {
    current_investments: Option<f64>,
    current_savings: Option<f64>,
    rate_of_return: Option<f64>,
    sip_monthly: Option<f64>,
    salary_monthly: Option<f64>,
    yearly_salary_increment: Option<f64>,
    inflation: Option<f64>,
    years: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplaySummary {
    pub starting_wealth: String,
    pub final_total_wealth: String,
    pub final_real_wealth: String,
    pub total_growth: String,
    pub real_growth: String,
    pub final_monthly_sip: String,
    pub final_monthly_salary: String,
}

impl From<&ProjectionSummary> for DisplaySummary {
    fn from(summary: &ProjectionSummary) -> Self {
        Self {
            starting_wealth: format_inr(summary.starting_wealth),
            final_total_wealth: format_inr(summary.final_total_wealth),
            final_real_wealth: format_inr(summary.final_real_wealth),
            total_growth: format_percent(summary.total_growth),
            real_growth: format_percent(summary.real_growth),
            final_monthly_sip: format_inr(summary.final_monthly_sip),
            final_monthly_salary: format_inr(summary.final_monthly_salary),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResponse {
    #[serde(flatten)]
    pub projection: Projection,
    pub summary: Option<ProjectionSummary>,
    pub display: Option<DisplaySummary>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn build_input(cli: &Cli) -> Result<ProjectionInput, InputError> {
    for (field, value) in [
        ("currentInvestments", cli.current_investments),
        ("currentSavings", cli.current_savings),
        ("rateOfReturn", cli.rate_of_return),
        ("sipMonthly", cli.sip_monthly),
        ("salaryMonthly", cli.salary_monthly),
        ("yearlySalaryIncrement", cli.yearly_salary_increment),
        ("inflation", cli.inflation),
    ] {
        if !value.is_finite() {
            return Err(InputError::NonFinite { field });
        }
    }

    if cli.years > MAX_YEARS {
        return Err(InputError::YearsOutOfRange {
            years: cli.years,
            max: MAX_YEARS,
        });
    }

    Ok(ProjectionInput {
        current_investments: cli.current_investments,
        current_savings: cli.current_savings,
        rate_of_return: cli.rate_of_return,
        sip_monthly: cli.sip_monthly,
        salary_monthly: cli.salary_monthly,
        yearly_salary_increment: cli.yearly_salary_increment,
        inflation: cli.inflation,
        years: cli.years,
    })
}

pub fn build_project_response(input: &ProjectionInput) -> ProjectResponse {
    let projection = project(input);
    let summary = summarize(&projection);
    let display = summary.as_ref().map(DisplaySummary::from);
    ProjectResponse {
        projection,
        summary,
        display,
    }
}

/// Output for a one-shot CLI run: a table, or the API JSON with `--json`.
pub fn run_cli(cli: &Cli) -> Result<String, CliError> {
    let input = build_input(cli)?;
    let response = build_project_response(&input);
    if cli.json {
        Ok(serde_json::to_string_pretty(&response)?)
    } else {
        Ok(render_report(&response))
    }
}

pub fn render_report(response: &ProjectResponse) -> String {
    let series = &response.projection.series;
    let Some(display) = &response.display else {
        return format!(
            "No years projected. Starting wealth: {}\n",
            format_inr(response.projection.starting_wealth)
        );
    };

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>4}  {:>14}  {:>14}  {:>12}  {:>14}",
        "Year", "Total Wealth", "Real Wealth", "Monthly SIP", "Monthly Salary"
    );
    for snapshot in series {
        let _ = writeln!(
            out,
            "{:>4}  {:>14}  {:>14}  {:>12}  {:>14}",
            snapshot.year,
            format_inr(snapshot.total_wealth),
            format_inr(snapshot.real_wealth),
            format_inr(snapshot.monthly_sip),
            format_inr(snapshot.monthly_salary),
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Final Results (after {} years):", series.len());
    for (label, value) in [
        ("Starting Wealth", &display.starting_wealth),
        ("Final Total Wealth", &display.final_total_wealth),
        ("Final Real Wealth", &display.final_real_wealth),
        ("Wealth Growth (Total)", &display.total_growth),
        ("Wealth Growth (Real)", &display.real_growth),
        ("Final Monthly SIP", &display.final_monthly_sip),
        ("Final Monthly Salary", &display.final_monthly_salary),
    ] {
        let _ = writeln!(out, "  {label}: {value}");
    }
    out
}

pub fn router() -> Router {
    Router::new()
        .route("/api/fields", get(fields_handler))
        .route(
            "/api/project",
            get(project_get_handler).post(project_post_handler),
        )
        .fallback(not_found_handler)
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    log::info!("wealth HTTP API listening on http://{addr}");
    log::info!("Local access: http://127.0.0.1:{port}/api/project");

    axum::serve(listener, router()).await
}

async fn fields_handler() -> Response {
    json_response(StatusCode::OK, INPUT_FIELDS)
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn project_get_handler(Query(payload): Query<ProjectPayload>) -> Response {
    project_handler_impl(payload)
}

async fn project_post_handler(Json(payload): Json<ProjectPayload>) -> Response {
    project_handler_impl(payload)
}

fn project_handler_impl(payload: ProjectPayload) -> Response {
    let input = match input_from_payload(payload) {
        Ok(input) => input,
        Err(err) => {
            log::warn!("rejected projection request: {err}");
            return error_response(StatusCode::BAD_REQUEST, &err.to_string());
        }
    };

    log::debug!(
        "projecting {} years from starting wealth {}",
        input.years,
        input.starting_wealth()
    );
    json_response(StatusCode::OK, build_project_response(&input))
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
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
fn input_from_json(json: &str) -> Result<ProjectionInput, String> {
    let payload = serde_json::from_str::<ProjectPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    input_from_payload(payload).map_err(|e| e.to_string())
}

fn input_from_payload(payload: ProjectPayload) -> Result<ProjectionInput, InputError> {
    let mut cli = default_cli();

    if let Some(v) = payload.current_investments {
        cli.current_investments = v;
    }
    if let Some(v) = payload.current_savings {
        cli.current_savings = v;
    }
    if let Some(v) = payload.rate_of_return {
        cli.rate_of_return = v;
    }
    if let Some(v) = payload.sip_monthly {
        cli.sip_monthly = v;
    }
    if let Some(v) = payload.salary_monthly {
        cli.salary_monthly = v;
    }
    if let Some(v) = payload.yearly_salary_increment {
        cli.yearly_salary_increment = v;
    }
    if let Some(v) = payload.inflation {
        cli.inflation = v;
    }
    if let Some(v) = payload.years {
        // A fractional period runs the whole years below it. The cast
        // saturates, and NaN becomes zero.
        cli.years = v.floor() as i32;
    }

    build_input(&cli)
}

fn default_cli() -> Cli {
    Cli {
        current_investments: DEFAULT_CURRENT_INVESTMENTS,
        current_savings: DEFAULT_CURRENT_SAVINGS,
        rate_of_return: DEFAULT_RATE_OF_RETURN,
        sip_monthly: DEFAULT_SIP_MONTHLY,
        salary_monthly: DEFAULT_SALARY_MONTHLY,
        yearly_salary_increment: DEFAULT_YEARLY_SALARY_INCREMENT,
        inflation: DEFAULT_INFLATION,
        years: DEFAULT_YEARS,
        json: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    const EPS: f64 = 1e-9;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn sample_cli() -> Cli {
        default_cli()
    }

    #[test]
    fn defaults_match_field_descriptors() {
        let input = build_input(&sample_cli()).expect("defaults are valid");
        let by_key = |key: &str| {
            INPUT_FIELDS
                .iter()
                .find(|f| f.key == key)
                .map(|f| f.default_value)
                .expect("descriptor present")
        };

        assert_approx(input.current_investments, by_key("currentInvestments"));
        assert_approx(input.current_savings, by_key("currentSavings"));
        assert_approx(input.rate_of_return, by_key("rateOfReturn"));
        assert_approx(input.sip_monthly, by_key("sipMonthly"));
        assert_approx(input.salary_monthly, by_key("salaryMonthly"));
        assert_approx(input.yearly_salary_increment, by_key("yearlySalaryIncrement"));
        assert_approx(input.inflation, by_key("inflation"));
        assert_approx(f64::from(input.years), by_key("years"));
    }

    #[test]
    fn field_descriptors_follow_form_order() {
        let keys: Vec<&str> = INPUT_FIELDS.iter().map(|f| f.key).collect();
        assert_eq!(
            keys,
            [
                "currentInvestments",
                "rateOfReturn",
                "sipMonthly",
                "currentSavings",
                "salaryMonthly",
                "yearlySalaryIncrement",
                "inflation",
                "years",
            ]
        );
    }

    #[test]
    fn field_descriptors_serialize_camel_case() {
        let json = serde_json::to_value(INPUT_FIELDS).expect("descriptors serialize");
        assert_eq!(json[0]["key"], "currentInvestments");
        assert_eq!(json[0]["label"], "Current Investments (₹)");
        assert_eq!(json[7]["defaultValue"], 20.0);
    }

    #[test]
    fn build_input_rejects_non_finite_rate() {
        let mut cli = sample_cli();
        cli.rate_of_return = f64::NAN;

        let err = build_input(&cli).expect_err("must reject NaN");
        assert_eq!(
            err,
            InputError::NonFinite {
                field: "rateOfReturn"
            }
        );
        assert!(err.to_string().contains("rateOfReturn"));
    }

    #[test]
    fn build_input_rejects_years_above_limit() {
        let mut cli = sample_cli();
        cli.years = MAX_YEARS + 1;

        let err = build_input(&cli).expect_err("must reject oversized period");
        assert!(matches!(err, InputError::YearsOutOfRange { .. }));
    }

    #[test]
    fn build_input_keeps_negative_and_zero_years() {
        for years in [-5, 0] {
            let mut cli = sample_cli();
            cli.years = years;
            let input = build_input(&cli).expect("non-positive years are allowed");
            assert_eq!(input.years, years);
        }
    }

    #[test]
    fn input_from_json_merges_web_keys_over_defaults() {
        let json = r#"{
          "currentInvestments": 250000,
          "rateOfReturn": 12,
          "sipMonthly": 15000,
          "inflation": 6,
          "years": 15
        }"#;
        let input = input_from_json(json).expect("json should parse");

        assert_approx(input.current_investments, 250_000.0);
        assert_approx(input.rate_of_return, 12.0);
        assert_approx(input.sip_monthly, 15_000.0);
        assert_approx(input.inflation, 6.0);
        assert_eq!(input.years, 15);
        assert_approx(input.current_savings, DEFAULT_CURRENT_SAVINGS);
        assert_approx(input.salary_monthly, DEFAULT_SALARY_MONTHLY);
        assert_approx(input.yearly_salary_increment, DEFAULT_YEARLY_SALARY_INCREMENT);
    }

    #[test]
    fn input_from_json_truncates_fractional_years() {
        let input = input_from_json(r#"{"years": 2.5}"#).expect("json should parse");
        assert_eq!(input.years, 2);
        let input = input_from_json(r#"{"years": -0.5}"#).expect("json should parse");
        assert_eq!(input.years, -1);
    }

    #[test]
    fn input_from_json_rejects_huge_years() {
        let err = input_from_json(r#"{"years": 1e12}"#).expect_err("must reject");
        assert!(err.contains("years must be at most"));
    }

    #[test]
    fn input_from_json_rejects_wrong_types() {
        let err = input_from_json(r#"{"sipMonthly": "lots"}"#).expect_err("must reject");
        assert!(err.contains("Invalid API JSON payload"));
    }

    #[test]
    fn response_for_flat_contributions_serializes_expected_shape() {
        let input = ProjectionInput {
            current_investments: 0.0,
            current_savings: 0.0,
            rate_of_return: 0.0,
            sip_monthly: 1_000.0,
            salary_monthly: 0.0,
            yearly_salary_increment: 0.0,
            inflation: 0.0,
            years: 2,
        };

        let response = build_project_response(&input);
        let actual = serde_json::to_value(&response).expect("response should serialize");
        let expected = json!({
            "startingWealth": 0.0,
            "results": [
                {"year": 1, "totalWealth": 12000.0, "realWealth": 12000.0, "monthlySIP": 1000.0, "monthlySalary": 0.0},
                {"year": 2, "totalWealth": 24000.0, "realWealth": 24000.0, "monthlySIP": 1000.0, "monthlySalary": 0.0}
            ],
            "summary": {
                "startingWealth": 0.0,
                "finalTotalWealth": 24000.0,
                "finalRealWealth": 24000.0,
                "totalGrowth": Value::Null,
                "realGrowth": Value::Null,
                "finalMonthlySip": 1000.0,
                "finalMonthlySalary": 0.0
            },
            "display": {
                "startingWealth": "₹0",
                "finalTotalWealth": "₹24,000",
                "finalRealWealth": "₹24,000",
                "totalGrowth": "∞%",
                "realGrowth": "∞%",
                "finalMonthlySip": "₹1,000",
                "finalMonthlySalary": "₹0"
            }
        });
        assert_eq!(actual, expected);
    }

    #[test]
    fn response_for_empty_series_has_null_summary() {
        let mut cli = sample_cli();
        cli.years = 0;
        let input = build_input(&cli).expect("valid inputs");

        let json = serde_json::to_value(build_project_response(&input))
            .expect("response should serialize");
        assert_eq!(json["results"], json!([]));
        assert_eq!(json["summary"], Value::Null);
        assert_eq!(json["display"], Value::Null);
        assert_eq!(json["startingWealth"], 6_000_000.0);
    }

    #[test]
    fn project_handler_returns_no_store_json() {
        let response = project_handler_impl(ProjectPayload::default());
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::CACHE_CONTROL)
                .and_then(|v| v.to_str().ok()),
            Some("no-store")
        );
    }

    #[test]
    fn project_handler_rejects_oversized_period() {
        let payload = ProjectPayload {
            years: Some(f64::from(MAX_YEARS) + 1.0),
            ..ProjectPayload::default()
        };
        let response = project_handler_impl(payload);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn run_cli_renders_table_and_final_results() {
        let mut cli = sample_cli();
        cli.years = 3;

        let report = run_cli(&cli).expect("report renders");
        assert!(report.contains("Total Wealth"));
        assert!(report.contains("Final Results (after 3 years):"));
        assert!(report.contains("Starting Wealth: ₹60.00 L"));
        assert!(report.lines().any(|l| l.contains(" Cr")));
    }

    #[test]
    fn run_cli_json_matches_api_response() {
        let mut cli = sample_cli();
        cli.years = 2;
        cli.json = true;

        let out = run_cli(&cli).expect("json renders");
        let parsed: Value = serde_json::from_str(&out).expect("valid json");
        assert_eq!(parsed["results"].as_array().map(Vec::len), Some(2));
        assert!(parsed["summary"]["finalTotalWealth"].is_number());
    }

    #[test]
    fn run_cli_reports_empty_projection() {
        let mut cli = sample_cli();
        cli.years = 0;

        let report = run_cli(&cli).expect("report renders");
        assert_eq!(report, "No years projected. Starting wealth: ₹60.00 L\n");
    }

    #[test]
    fn cli_parses_flags_over_defaults() {
        let cli = Cli::try_parse_from([
            "wealth",
            "--sip-monthly",
            "25000",
            "--inflation",
            "-1.5",
            "--years",
            "10",
            "--json",
        ])
        .expect("flags parse");

        assert_approx(cli.sip_monthly, 25_000.0);
        assert_approx(cli.inflation, -1.5);
        assert_eq!(cli.years, 10);
        assert!(cli.json);
        assert_approx(cli.current_investments, DEFAULT_CURRENT_INVESTMENTS);
    }
}
