use super::types::{ContributionEstimate, MonthlyDataPoint, YearMonth};

/// Share of net salary owed to the state under the standard regime.
pub const FLAT_RATE: f64 = 0.415;
/// Share of net salary owed to the state under the income-tax exemption.
pub const EXEMPT_RATE: f64 = 0.35;

const EXEMPT_GROSS_UP: f64 = 1.35;
const EXEMPT_GROSS_CEILING: f64 = 10_000.0;

/// Historical regime deciding how net salary is grossed up in a given month.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TaxRegime {
    /// 41.5% of net salary.
    Flat,
    /// 35% of net salary (income-tax exempt, 2004 to October 2023).
    Exempt,
    /// Exemption capped at 10,000 RON gross (November 2023 to December 2024).
    CappedExempt,
}

impl TaxRegime {
    pub fn for_month(year_month: YearMonth, tax_exempt: bool) -> Self {
        if !tax_exempt {
            return TaxRegime::Flat;
        }
        match (year_month.year(), year_month.month()) {
            (year, _) if year >= 2025 => TaxRegime::Flat,
            (2024, _) | (2023, 11..=12) => TaxRegime::CappedExempt,
            (year, _) if year >= 2004 => TaxRegime::Exempt,
            _ => TaxRegime::Flat,
        }
    }

    /// Fraction of `nominal` that goes to the state.
    pub fn rate(self, nominal: f64) -> f64 {
        match self {
            TaxRegime::Flat => FLAT_RATE,
            TaxRegime::Exempt => EXEMPT_RATE,
            TaxRegime::CappedExempt => {
                if nominal * EXEMPT_GROSS_UP <= EXEMPT_GROSS_CEILING {
                    return EXEMPT_RATE;
                }
                let exempt_net = EXEMPT_GROSS_CEILING / EXEMPT_GROSS_UP;
                let remaining_net = nominal - exempt_net;
                (exempt_net * EXEMPT_RATE + remaining_net * FLAT_RATE) / nominal
            }
        }
    }
}

pub fn estimate_contribution(series: &[MonthlyDataPoint], tax_exempt: bool) -> ContributionEstimate {
    series.iter().fold(
        ContributionEstimate {
            total_contribution: 0.0,
            state_months_equivalent: 0.0,
            total_months: 0,
        },
        |acc, point| {
            let rate = TaxRegime::for_month(point.year_month, tax_exempt).rate(point.nominal);
            ContributionEstimate {
                total_contribution: acc.total_contribution + point.nominal * rate,
                state_months_equivalent: acc.state_months_equivalent + rate,
                total_months: acc.total_months + 1,
            }
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn ym(raw: &str) -> YearMonth {
        YearMonth::parse(raw).expect("valid month")
    }

    fn point(raw: &str, nominal: f64) -> MonthlyDataPoint {
        MonthlyDataPoint {
            year_month: ym(raw),
            nominal,
            adjusted: nominal,
            maintain_power_target: nominal,
            purchasing_power_loss: 0.0,
            rate: 0.0,
        }
    }

    #[test]
    fn regime_table_boundaries() {
        let cases = [
            ("2003-12", true, TaxRegime::Flat),
            ("2004-01", true, TaxRegime::Exempt),
            ("2023-10", true, TaxRegime::Exempt),
            ("2023-11", true, TaxRegime::CappedExempt),
            ("2024-12", true, TaxRegime::CappedExempt),
            ("2025-01", true, TaxRegime::Flat),
            ("2010-06", false, TaxRegime::Flat),
            ("2024-03", false, TaxRegime::Flat),
        ];
        for (raw, tax_exempt, expected) in cases {
            assert_eq!(TaxRegime::for_month(ym(raw), tax_exempt), expected, "{raw}");
        }
    }

    #[test]
    fn flat_regime_takes_41_5_percent() {
        let estimate = estimate_contribution(&[point("2015-03", 3000.0)], false);
        assert_approx(estimate.total_contribution, 1245.0);
        assert_approx(estimate.state_months_equivalent, 0.415);
        assert_eq!(estimate.total_months, 1);
    }

    #[test]
    fn exempt_regime_takes_35_percent() {
        let estimate = estimate_contribution(&[point("2010-01", 3000.0)], true);
        assert_approx(estimate.total_contribution, 1050.0);
        assert_approx(estimate.state_months_equivalent, 0.35);
    }

    #[test]
    fn capped_exemption_below_ceiling_stays_at_35_percent() {
        // 7000 * 1.35 = 9450 gross, under the ceiling.
        assert_approx(TaxRegime::CappedExempt.rate(7000.0), EXEMPT_RATE);
        assert_approx(TaxRegime::CappedExempt.rate(0.0), EXEMPT_RATE);
    }

    #[test]
    fn capped_exemption_blends_rates_above_ceiling() {
        let rate = TaxRegime::CappedExempt.rate(10_000.0);
        let exempt_net = 10_000.0 / 1.35;
        let expected = (exempt_net * 0.35 + (10_000.0 - exempt_net) * 0.415) / 10_000.0;
        assert_approx(rate, expected);
        assert!((rate - 0.366_851_851_851_851_8).abs() < 1e-12);
        assert!(rate > EXEMPT_RATE && rate < FLAT_RATE);
    }

    #[test]
    fn contributions_accumulate_across_regimes() {
        let series = [
            point("2003-12", 1000.0),
            point("2004-01", 1000.0),
            point("2025-01", 2000.0),
        ];
        let estimate = estimate_contribution(&series, true);
        assert_approx(estimate.total_contribution, 415.0 + 350.0 + 830.0);
        assert_approx(estimate.state_months_equivalent, 0.415 + 0.35 + 0.415);
        assert_eq!(estimate.total_months, 3);
    }

    #[test]
    fn empty_series_contributes_nothing() {
        let estimate = estimate_contribution(&[], true);
        assert_eq!(estimate.total_months, 0);
        assert_approx(estimate.total_contribution, 0.0);
    }
}
