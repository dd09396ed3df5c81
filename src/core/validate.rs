use super::engine::monthly_factor;
use super::error::CalcError;
use super::types::{InflationRecord, SalaryEvent, YearMonth};

/// Amount checks that hold regardless of the calculation month.
pub fn validate_amount(event: &SalaryEvent) -> Result<(), CalcError> {
    if !event.net_salary.is_finite() {
        return Err(CalcError::InvalidSalaryAmount(event.net_salary.to_string()));
    }
    if event.net_salary < 0.0 {
        return Err(CalcError::NegativeSalaryRejected(event.year_month));
    }
    Ok(())
}

pub fn validate_event(event: &SalaryEvent, as_of: YearMonth) -> Result<(), CalcError> {
    validate_amount(event)?;
    if event.year_month > as_of {
        return Err(CalcError::FutureDateRejected(event.year_month));
    }
    Ok(())
}

/// A rate must be finite and keep the monthly factor positive.
pub fn validate_record(record: &InflationRecord) -> Result<(), CalcError> {
    let rate = record.annual_rate_percent;
    if rate.is_finite() && monthly_factor(rate) > 0.0 {
        Ok(())
    } else {
        Err(CalcError::InvalidInflationRate(record.year_month))
    }
}

/// Parses a raw salary amount entered for `year_month`.
pub fn parse_salary(raw: &str, year_month: YearMonth) -> Result<f64, CalcError> {
    let amount = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| CalcError::InvalidSalaryAmount(raw.to_string()))?;
    if !amount.is_finite() {
        return Err(CalcError::InvalidSalaryAmount(raw.to_string()));
    }
    if amount < 0.0 {
        return Err(CalcError::NegativeSalaryRejected(year_month));
    }
    Ok(amount)
}

/// Parses and validates a raw `(date, salary)` pair.
pub fn parse_event(date: &str, salary: &str, as_of: YearMonth) -> Result<SalaryEvent, CalcError> {
    let year_month = YearMonth::parse(date.trim())?;
    let event = SalaryEvent::new(year_month, parse_salary(salary, year_month)?);
    validate_event(&event, as_of)?;
    Ok(event)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ym(raw: &str) -> YearMonth {
        YearMonth::parse(raw).expect("valid month")
    }

    #[test]
    fn validate_event_rejects_future_month() {
        let event = SalaryEvent::new(ym("2026-11"), 5000.0);
        let err = validate_event(&event, ym("2026-10")).expect_err("future month");
        assert_eq!(err, CalcError::FutureDateRejected(ym("2026-11")));
        assert!(validate_event(&event, ym("2026-11")).is_ok());
    }

    #[test]
    fn validate_event_rejects_negative_and_non_finite_amounts() {
        let as_of = ym("2026-10");
        let negative = SalaryEvent::new(ym("2020-01"), -1.0);
        assert_eq!(
            validate_event(&negative, as_of),
            Err(CalcError::NegativeSalaryRejected(ym("2020-01")))
        );

        let nan = SalaryEvent::new(ym("2020-01"), f64::NAN);
        assert!(matches!(
            validate_event(&nan, as_of),
            Err(CalcError::InvalidSalaryAmount(_))
        ));
    }

    #[test]
    fn zero_salary_is_allowed() {
        let event = SalaryEvent::new(ym("2020-01"), 0.0);
        assert!(validate_event(&event, ym("2026-10")).is_ok());
    }

    #[test]
    fn validate_record_rejects_nan_rate() {
        let record = InflationRecord::new(ym("2020-01"), f64::NAN);
        assert_eq!(
            validate_record(&record),
            Err(CalcError::InvalidInflationRate(ym("2020-01")))
        );
    }

    #[test]
    fn validate_record_rejects_rates_that_wipe_out_prices() {
        assert_eq!(
            validate_record(&InflationRecord::new(ym("2020-01"), -1200.0)),
            Err(CalcError::InvalidInflationRate(ym("2020-01")))
        );
        assert_eq!(
            validate_record(&InflationRecord::new(ym("2020-01"), -5000.0)),
            Err(CalcError::InvalidInflationRate(ym("2020-01")))
        );
        assert!(validate_record(&InflationRecord::new(ym("2020-01"), -1199.0)).is_ok());
        assert!(validate_record(&InflationRecord::new(ym("2020-01"), -3.5)).is_ok());
    }

    #[test]
    fn parse_event_checks_date_then_amount() {
        let as_of = ym("2026-10");
        assert!(matches!(
            parse_event("2020-1", "100", as_of),
            Err(CalcError::InvalidDateFormat(_))
        ));
        assert!(matches!(
            parse_event("2020-01", "abc", as_of),
            Err(CalcError::InvalidSalaryAmount(_))
        ));
        assert_eq!(
            parse_event("2020-01", "-5", as_of),
            Err(CalcError::NegativeSalaryRejected(ym("2020-01")))
        );
        let event = parse_event("2020-01", " 4200 ", as_of).expect("valid event");
        assert_eq!(event.net_salary, 4200.0);
    }
}
