use super::engine::{Expansion, round_half_up};
use super::error::CalcError;
use super::types::{
    BeatInflation, ContributionEstimate, DurationSplit, MonthlyDataPoint, SummaryStats,
    YearMonth, YearVerdict,
};

/// Verdicts need strictly more emitted months than this.
pub const MIN_MONTHS_FOR_VERDICTS: usize = 24;
/// Number of calendar years, ending with the calculation year, that get a verdict.
pub const VERDICT_YEARS: i32 = 5;

pub fn lifetime_earnings(series: &[MonthlyDataPoint]) -> f64 {
    series.iter().map(|point| point.nominal).sum()
}

impl DurationSplit {
    pub fn from_months(months: u32) -> Self {
        Self {
            years: months / 12,
            months: months % 12,
        }
    }

    /// Splits a fractional month count, rounding the leftover months.
    pub fn from_fractional_months(months: f64) -> Self {
        let months = months.max(0.0);
        Self {
            years: (months / 12.0).floor() as u32,
            months: round_half_up(months % 12.0) as u32,
        }
    }
}

pub fn summarize(
    expansion: &Expansion,
    contribution: &ContributionEstimate,
) -> Result<SummaryStats, CalcError> {
    let Some(last) = expansion.series.last() else {
        return Err(CalcError::NoOverlappingData);
    };

    Ok(SummaryStats {
        lifetime_earnings: lifetime_earnings(&expansion.series),
        initial_basket_cost_today: round_half_up(
            expansion.initial_salary * expansion.final_inflation_factor,
        ),
        final_nominal: last.nominal,
        final_maintain_power_target: last.maintain_power_target,
        final_adjusted: last.adjusted,
        final_purchasing_power_loss: last.purchasing_power_loss,
        total_government_contribution: contribution.total_contribution,
        state_months_equivalent: contribution.state_months_equivalent,
        total_months: contribution.total_months,
        worked_duration: DurationSplit::from_months(contribution.total_months),
        state_duration: DurationSplit::from_fractional_months(contribution.state_months_equivalent),
    })
}

fn year_verdict(series: &[MonthlyDataPoint], year: i32) -> Option<YearVerdict> {
    let points: Vec<_> = series
        .iter()
        .filter(|point| point.year_month.year() == year)
        .collect();
    let first = points.first()?.nominal;
    let last = points.last()?.nominal;
    if first == 0.0 || last == 0.0 {
        return None;
    }

    let salary_increase_percent = (last / first - 1.0) * 100.0;
    let average_inflation =
        points.iter().map(|point| point.rate).sum::<f64>() / points.len() as f64;

    Some(YearVerdict {
        year,
        salary_increase_percent,
        average_inflation,
        beat_inflation: salary_increase_percent > average_inflation,
    })
}

/// Compares each recent year's raise with that year's mean published rate.
pub fn beat_inflation_verdicts(series: &[MonthlyDataPoint], as_of: YearMonth) -> BeatInflation {
    if series.len() <= MIN_MONTHS_FOR_VERDICTS {
        return BeatInflation::InsufficientHistory;
    }

    let current = as_of.year();
    let years = (current - VERDICT_YEARS + 1..=current)
        .filter_map(|year| year_verdict(series, year))
        .collect();
    BeatInflation::Verdicts { years }
}
