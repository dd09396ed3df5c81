use super::types::YearMonth;

/// Everything that can stop a computation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CalcError {
    #[error("at least one salary entry is required")]
    NoSalaryHistory,

    #[error("inflation data is not available")]
    NoInflationData,

    #[error("no month of the salary history has inflation data")]
    NoOverlappingData,

    #[error("invalid date {0:?}, expected YYYY-MM")]
    InvalidDateFormat(String),

    #[error("salary date {0} is in the future")]
    FutureDateRejected(YearMonth),

    #[error("salary for {0} must not be negative")]
    NegativeSalaryRejected(YearMonth),

    #[error("invalid salary amount {0:?}")]
    InvalidSalaryAmount(String),

    #[error("inflation rate for {0} is not a usable number")]
    InvalidInflationRate(YearMonth),
}

impl CalcError {
    /// Stable machine-readable name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            CalcError::NoSalaryHistory => "noSalaryHistory",
            CalcError::NoInflationData => "noInflationData",
            CalcError::NoOverlappingData => "noOverlappingData",
            CalcError::InvalidDateFormat(_) => "invalidDateFormat",
            CalcError::FutureDateRejected(_) => "futureDateRejected",
            CalcError::NegativeSalaryRejected(_) => "negativeSalaryRejected",
            CalcError::InvalidSalaryAmount(_) => "invalidSalaryAmount",
            CalcError::InvalidInflationRate(_) => "invalidInflationRate",
        }
    }

    /// True for errors caused by malformed input rather than by the data itself.
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            CalcError::InvalidDateFormat(_) | CalcError::InvalidSalaryAmount(_)
        )
    }
}
