use serde::Serialize;

/// Parameters for a single projection run. Rates are percentages, so
/// `rate_of_return: 8.0` means 8% a year.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionInput {
    pub current_investments: f64,
    pub current_savings: f64,
    pub rate_of_return: f64,
    pub sip_monthly: f64,
    /// Tracked for display; never feeds into wealth.
    pub salary_monthly: f64,
    /// Applied to both salary and SIP at the end of every year.
    pub yearly_salary_increment: f64,
    pub inflation: f64,
    /// Zero or negative produces an empty series.
    pub years: i32,
}

impl ProjectionInput {
    pub fn starting_wealth(&self) -> f64 {
        self.current_investments + self.current_savings
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlySnapshot {
    pub year: i32,
    pub total_wealth: f64,
    pub real_wealth: f64,
    /// Contribution rate that applies from the following year.
    #[serde(rename = "monthlySIP")]
    pub monthly_sip: f64,
    /// Salary rate that applies from the following year.
    pub monthly_salary: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Projection {
    pub starting_wealth: f64,
    #[serde(rename = "results")]
    pub series: Vec<YearlySnapshot>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionSummary {
    pub starting_wealth: f64,
    pub final_total_wealth: f64,
    pub final_real_wealth: f64,
    /// `final_total_wealth / starting_wealth - 1`.
    pub total_growth: f64,
    /// `final_real_wealth / starting_wealth - 1`.
    pub real_growth: f64,
    pub final_monthly_sip: f64,
    pub final_monthly_salary: f64,
}
