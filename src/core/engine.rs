use std::collections::BTreeMap;
use std::iter;

use tracing::debug;

use super::error::CalcError;
use super::stats::{beat_inflation_verdicts, summarize};
use super::tax::estimate_contribution;
use super::types::{
    Computation, ComputeOptions, InflationRecord, MonthlyDataPoint, SalaryEvent, YearMonth,
};
use super::validate::{validate_amount, validate_event, validate_record};

/// Dense monthly series produced from a sparse salary history.
#[derive(Debug, Clone, PartialEq)]
pub struct Expansion {
    pub series: Vec<MonthlyDataPoint>,
    /// Salary of the earliest event, after duplicate months are resolved.
    pub initial_salary: f64,
    /// Cumulative inflation factor from the first month to the last emitted one.
    pub final_inflation_factor: f64,
}

/// Inflation anchors carried from one emitted month to the next.
#[derive(Debug, Clone, Copy)]
struct CumulativeState {
    factor_since_start: f64,
    factor_at_last_raise: f64,
    last_known_salary: f64,
    /// Index of the latest salary event already in effect.
    current_event: usize,
}

impl CumulativeState {
    fn new(first_salary: f64) -> Self {
        Self {
            factor_since_start: 1.0,
            factor_at_last_raise: 1.0,
            last_known_salary: first_salary,
            current_event: 0,
        }
    }

    fn nominal_at(&mut self, events: &[SalaryEvent], month: YearMonth) -> f64 {
        while self
            .current_event
            .checked_add(1)
            .and_then(|next| events.get(next))
            .is_some_and(|next| next.year_month <= month)
        {
            self.current_event += 1;
        }
        events[self.current_event].net_salary
    }

    fn advance(mut self, events: &[SalaryEvent], month: YearMonth, rate: f64) -> (Self, MonthlyDataPoint) {
        self.factor_since_start *= monthly_factor(rate);

        let nominal = self.nominal_at(events, month);
        if nominal != self.last_known_salary {
            self.last_known_salary = nominal;
            self.factor_at_last_raise = self.factor_since_start;
        }

        let inflation_since_last_raise = self.factor_since_start / self.factor_at_last_raise;
        let real_value = nominal / self.factor_since_start;
        let purchasing_power_loss = if nominal == 0.0 {
            0.0
        } else {
            round_tenth((nominal - real_value) / nominal * 100.0)
        };

        let point = MonthlyDataPoint {
            year_month: month,
            nominal,
            adjusted: round_half_up(real_value),
            maintain_power_target: round_half_up(nominal * inflation_since_last_raise),
            purchasing_power_loss,
            rate,
        };
        (self, point)
    }
}

/// Monthly growth from an annualized rate in percent.
///
/// Linear split of the annual figure, not a geometric monthly rate.
pub fn monthly_factor(annual_rate_percent: f64) -> f64 {
    1.0 + annual_rate_percent / 100.0 / 12.0
}

pub(crate) fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

pub(crate) fn round_tenth(value: f64) -> f64 {
    round_half_up(value * 10.0) / 10.0
}

/// Sorts events chronologically; for a month entered twice the later entry wins.
fn normalize_events(events: &[SalaryEvent]) -> Vec<SalaryEvent> {
    let mut sorted = events.to_vec();
    sorted.sort_by_key(|event| event.year_month);

    let mut normalized: Vec<SalaryEvent> = Vec::with_capacity(sorted.len());
    for event in sorted {
        match normalized.last_mut() {
            Some(last) if last.year_month == event.year_month => {
                debug!(
                    month = %event.year_month,
                    replaced = last.net_salary,
                    salary = event.net_salary,
                    "duplicate salary month, keeping the later entry"
                );
                *last = event;
            }
            _ => normalized.push(event),
        }
    }
    normalized
}

/// Month to rate lookup; the first record published for a month wins.
fn rate_lookup(inflation: &[InflationRecord]) -> BTreeMap<YearMonth, f64> {
    let mut rates = BTreeMap::new();
    for record in inflation {
        rates
            .entry(record.year_month)
            .or_insert(record.annual_rate_percent);
    }
    rates
}

fn months_between(start: YearMonth, end: YearMonth) -> impl Iterator<Item = YearMonth> {
    iter::successors(Some(start), |month| Some(month.next())).take_while(move |month| *month <= end)
}

pub fn expand(events: &[SalaryEvent], inflation: &[InflationRecord]) -> Result<Expansion, CalcError> {
    for event in events {
        validate_amount(event)?;
    }
    for record in inflation {
        validate_record(record)?;
    }

    let events = normalize_events(events);
    let (Some(first), Some(last)) = (events.first(), events.last()) else {
        return Err(CalcError::NoSalaryHistory);
    };
    let rates = rate_lookup(inflation);
    let Some((&last_rate_month, _)) = rates.last_key_value() else {
        return Err(CalcError::NoInflationData);
    };

    let start = first.year_month;
    let end = last.year_month.max(last_rate_month);

    let (state, series) = months_between(start, end)
        .filter_map(|month| rates.get(&month).map(|&rate| (month, rate)))
        .fold(
            (CumulativeState::new(first.net_salary), Vec::new()),
            |(state, mut series), (month, rate)| {
                let (state, point) = state.advance(&events, month, rate);
                series.push(point);
                (state, series)
            },
        );

    if series.is_empty() {
        return Err(CalcError::NoOverlappingData);
    }

    Ok(Expansion {
        series,
        initial_salary: first.net_salary,
        final_inflation_factor: state.factor_since_start,
    })
}

pub fn compute(
    events: &[SalaryEvent],
    inflation: &[InflationRecord],
    options: ComputeOptions,
) -> Result<Computation, CalcError> {
    if events.is_empty() {
        return Err(CalcError::NoSalaryHistory);
    }
    if inflation.is_empty() {
        return Err(CalcError::NoInflationData);
    }
    for event in events {
        validate_event(event, options.as_of)?;
    }
    for record in inflation {
        validate_record(record)?;
    }

    let expansion = expand(events, inflation)?;
    let contribution = estimate_contribution(&expansion.series, options.tax_exempt);
    let summary = summarize(&expansion, &contribution)?;
    let beat_inflation = beat_inflation_verdicts(&expansion.series, options.as_of);

    debug!(
        events = events.len(),
        records = inflation.len(),
        months = expansion.series.len(),
        tax_exempt = options.tax_exempt,
        "salary series computed"
    );

    Ok(Computation {
        series: expansion.series,
        summary,
        beat_inflation,
    })
}
