use super::types::{Projection, ProjectionInput, ProjectionSummary, YearlySnapshot};

const MONTHS_PER_YEAR: u32 = 12;

pub fn project(input: &ProjectionInput) -> Projection {
    let starting_wealth = input.starting_wealth();
    let annual_growth = growth_factor(input.rate_of_return);
    let monthly_growth = annual_growth.powf(1.0 / f64::from(MONTHS_PER_YEAR));
    let escalation = growth_factor(input.yearly_salary_increment);
    let price_growth = growth_factor(input.inflation);

    let mut wealth = starting_wealth;
    let mut salary = input.salary_monthly;
    let mut sip = input.sip_monthly;
    let mut series = Vec::with_capacity(usize::try_from(input.years).unwrap_or(0));

    for year in 1..=input.years {
        // The annual factor and the monthly factors both come from the same
        // nominal rate, so a year compounds it twice.
        wealth *= annual_growth;
        for _ in 0..MONTHS_PER_YEAR {
            wealth += sip;
            wealth *= monthly_growth;
        }

        salary *= escalation;
        sip *= escalation;

        let real_wealth = wealth / price_growth.powf(f64::from(year));
        series.push(YearlySnapshot {
            year,
            total_wealth: wealth.round(),
            real_wealth: real_wealth.round(),
            monthly_sip: sip.round(),
            monthly_salary: salary.round(),
        });
    }

    Projection {
        starting_wealth,
        series,
    }
}

/// Final-year figures and growth relative to starting wealth. `None` when
/// the projection covers no years.
pub fn summarize(projection: &Projection) -> Option<ProjectionSummary> {
    let last = projection.series.last()?;
    let starting_wealth = projection.starting_wealth;
    Some(ProjectionSummary {
        starting_wealth,
        final_total_wealth: last.total_wealth,
        final_real_wealth: last.real_wealth,
        total_growth: last.total_wealth / starting_wealth - 1.0,
        real_growth: last.real_wealth / starting_wealth - 1.0,
        final_monthly_sip: last.monthly_sip,
        final_monthly_salary: last.monthly_salary,
    })
}

fn growth_factor(percent: f64) -> f64 {
    1.0 + percent / 100.0
}
