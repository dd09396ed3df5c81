use super::error::CalcError;
use super::types::{SalaryEvent, YearMonth};
use super::validate::validate_event;

/// A user's salary changes, kept in chronological order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SalaryHistory {
    events: Vec<SalaryEvent>,
}

impl SalaryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps events as given. They are validated again when computed.
    pub fn from_events(events: Vec<SalaryEvent>) -> Self {
        Self { events }
    }

    /// Validates `event` and inserts it after every entry of the same or earlier month.
    pub fn add(&mut self, event: SalaryEvent, as_of: YearMonth) -> Result<(), CalcError> {
        validate_event(&event, as_of)?;
        let position = self
            .events
            .partition_point(|existing| existing.year_month <= event.year_month);
        self.events.insert(position, event);
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Option<SalaryEvent> {
        (index < self.events.len()).then(|| self.events.remove(index))
    }

    pub fn events(&self) -> &[SalaryEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ym(raw: &str) -> YearMonth {
        YearMonth::parse(raw).expect("valid month")
    }

    #[test]
    fn add_keeps_chronological_order() {
        let as_of = ym("2026-10");
        let mut history = SalaryHistory::new();
        history.add(SalaryEvent::new(ym("2022-05"), 5000.0), as_of).expect("valid");
        history.add(SalaryEvent::new(ym("2020-01"), 3000.0), as_of).expect("valid");
        history.add(SalaryEvent::new(ym("2021-03"), 4000.0), as_of).expect("valid");
        history.add(SalaryEvent::new(ym("2020-01"), 3100.0), as_of).expect("valid");

        let salaries: Vec<_> = history.events().iter().map(|e| e.net_salary).collect();
        assert_eq!(salaries, vec![3000.0, 3100.0, 4000.0, 5000.0]);
    }

    #[test]
    fn add_rejects_invalid_events_without_mutating() {
        let as_of = ym("2026-10");
        let mut history = SalaryHistory::new();
        assert_eq!(
            history.add(SalaryEvent::new(ym("2026-11"), 1.0), as_of),
            Err(CalcError::FutureDateRejected(ym("2026-11")))
        );
        assert_eq!(
            history.add(SalaryEvent::new(ym("2020-01"), -1.0), as_of),
            Err(CalcError::NegativeSalaryRejected(ym("2020-01")))
        );
        assert!(history.is_empty());
    }

    #[test]
    fn remove_by_index() {
        let mut history = SalaryHistory::from_events(vec![
            SalaryEvent::new(ym("2020-01"), 1.0),
            SalaryEvent::new(ym("2021-01"), 2.0),
        ]);
        assert_eq!(history.remove(5), None);
        assert_eq!(
            history.remove(0),
            Some(SalaryEvent::new(ym("2020-01"), 1.0))
        );
        assert_eq!(history.len(), 1);
    }
}
