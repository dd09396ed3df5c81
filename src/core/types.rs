use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::error::CalcError;

/// A calendar month, ordered chronologically.
///
/// The only textual form accepted is the strict `YYYY-MM` pattern with a
/// month between `01` and `12`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct YearMonth {
    year: i32,
    month: u8,
}

impl YearMonth {
    pub fn new(year: i32, month: u8) -> Option<Self> {
        if (1..=12).contains(&month) && (0..=9999).contains(&year) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    pub fn parse(raw: &str) -> Result<Self, CalcError> {
        let invalid = || CalcError::InvalidDateFormat(raw.to_string());
        let bytes = raw.as_bytes();
        if bytes.len() != 7 || bytes[4] != b'-' {
            return Err(invalid());
        }
        let digits = |range: std::ops::Range<usize>| {
            bytes[range]
                .iter()
                .try_fold(0u32, |acc, b| b.is_ascii_digit().then(|| acc * 10 + u32::from(b - b'0')))
        };
        let year = digits(0..4).ok_or_else(invalid)?;
        let month = digits(5..7).ok_or_else(invalid)?;
        Self::new(year as i32, month as u8).ok_or_else(invalid)
    }

    pub fn year(self) -> i32 {
        self.year
    }

    pub fn month(self) -> u8 {
        self.month
    }

    /// The month that follows, rolling December over into January.
    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// A salary change taking effect in a given month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SalaryEvent {
    #[serde(rename = "date")]
    pub year_month: YearMonth,
    #[serde(rename = "salary")]
    pub net_salary: f64,
}

impl SalaryEvent {
    pub fn new(year_month: YearMonth, net_salary: f64) -> Self {
        Self {
            year_month,
            net_salary,
        }
    }
}

/// One published inflation figure. The rate is annualized, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InflationRecord {
    #[serde(rename = "date")]
    pub year_month: YearMonth,
    #[serde(rename = "rate")]
    pub annual_rate_percent: f64,
}

impl InflationRecord {
    pub fn new(year_month: YearMonth, annual_rate_percent: f64) -> Self {
        Self {
            year_month,
            annual_rate_percent,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyDataPoint {
    pub year_month: YearMonth,
    pub nominal: f64,
    pub adjusted: f64,
    pub maintain_power_target: f64,
    pub purchasing_power_loss: f64,
    pub rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionEstimate {
    pub total_contribution: f64,
    /// Sum of the monthly tax fractions, i.e. months of work that went to the state.
    pub state_months_equivalent: f64,
    pub total_months: u32,
}

/// Whole years plus the remaining months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DurationSplit {
    pub years: u32,
    pub months: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStats {
    pub lifetime_earnings: f64,
    pub initial_basket_cost_today: f64,
    pub final_nominal: f64,
    pub final_maintain_power_target: f64,
    pub final_adjusted: f64,
    pub final_purchasing_power_loss: f64,
    pub total_government_contribution: f64,
    pub state_months_equivalent: f64,
    pub total_months: u32,
    pub worked_duration: DurationSplit,
    pub state_duration: DurationSplit,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearVerdict {
    pub year: i32,
    pub salary_increase_percent: f64,
    pub average_inflation: f64,
    pub beat_inflation: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum BeatInflation {
    InsufficientHistory,
    Verdicts { years: Vec<YearVerdict> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComputeOptions {
    pub tax_exempt: bool,
    /// The calculation month. Later salary events are rejected and the
    /// beat-inflation window ends here.
    pub as_of: YearMonth,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Computation {
    pub series: Vec<MonthlyDataPoint>,
    pub summary: SummaryStats,
    pub beat_inflation: BeatInflation,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_strict_year_month() {
        let ym = YearMonth::parse("2021-11").expect("valid month");
        assert_eq!(ym.year(), 2021);
        assert_eq!(ym.month(), 11);
        assert_eq!(ym.to_string(), "2021-11");
    }

    #[test]
    fn parse_rejects_loose_or_out_of_range_input() {
        for raw in ["2021-1", "21-11", "2021/11", "2021-13", "2021-00", "2021-11-01", "abcd-ef", ""] {
            let err = YearMonth::parse(raw).expect_err("must reject");
            assert_eq!(err, CalcError::InvalidDateFormat(raw.to_string()));
        }
    }

    #[test]
    fn next_rolls_over_december() {
        let dec = YearMonth::new(2023, 12).expect("valid");
        assert_eq!(dec.next(), YearMonth::new(2024, 1).expect("valid"));
        assert!(dec < dec.next());
    }

    #[test]
    fn salary_event_uses_date_and_salary_keys() {
        let event: SalaryEvent =
            serde_json::from_str(r#"{"date":"2020-02","salary":4500}"#).expect("json should parse");
        assert_eq!(event.year_month, YearMonth::new(2020, 2).expect("valid"));
        assert_eq!(event.net_salary, 4500.0);

        let bad = serde_json::from_str::<SalaryEvent>(r#"{"date":"2020-2","salary":4500}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn beat_inflation_serializes_with_status_tag() {
        let json = serde_json::to_string(&BeatInflation::InsufficientHistory).expect("serialize");
        assert_eq!(json, r#"{"status":"insufficientHistory"}"#);
    }
}
