mod engine;
mod error;
mod history;
mod stats;
mod tax;
mod types;
mod validate;

pub use engine::{Expansion, compute, expand, monthly_factor};
pub use error::CalcError;
pub use history::SalaryHistory;
pub use stats::{beat_inflation_verdicts, lifetime_earnings, summarize};
pub use tax::{EXEMPT_RATE, FLAT_RATE, TaxRegime, estimate_contribution};
pub use types::{
    BeatInflation, Computation, ComputeOptions, ContributionEstimate, DurationSplit,
    InflationRecord, MonthlyDataPoint, SalaryEvent, SummaryStats, YearMonth, YearVerdict,
};
pub use validate::{parse_event, parse_salary, validate_amount, validate_event, validate_record};
