use std::collections::HashMap;

use axum::extract::Query;
use axum::http::Uri;

use crate::core::{CalcError, SalaryEvent, YearMonth, parse_salary};

/// Encodes a salary history as the `date0=..&salary0=..` query of a share link.
pub fn encode(events: &[SalaryEvent]) -> String {
    events
        .iter()
        .enumerate()
        .map(|(i, event)| format!("date{i}={}&salary{i}={}", event.year_month, event.net_salary))
        .collect::<Vec<_>>()
        .join("&")
}

/// Reads `date{i}`/`salary{i}` pairs for `i = 0, 1, ..` until a date key is missing.
///
/// Pairs with an empty date or salary are skipped, like the web form does.
pub fn decode(params: &HashMap<String, String>) -> Result<Vec<SalaryEvent>, CalcError> {
    let mut events = Vec::new();
    for i in 0.. {
        let Some(date) = params.get(&format!("date{i}")) else {
            break;
        };
        let Some(salary) = params.get(&format!("salary{i}")) else {
            continue;
        };
        if date.is_empty() || salary.is_empty() {
            continue;
        }
        let year_month = YearMonth::parse(date)?;
        events.push(SalaryEvent::new(year_month, parse_salary(salary, year_month)?));
    }
    Ok(events)
}

/// Extracts query parameters from a full share link or a bare query string.
pub fn params_from_link(link: &str) -> Result<HashMap<String, String>, String> {
    let link = link.trim();
    let uri = if link.contains("://") {
        link.to_string()
    } else {
        format!("/?{}", link.trim_start_matches('?'))
    };
    let uri: Uri = uri
        .parse()
        .map_err(|e| format!("Invalid share link: {e}"))?;
    let Query(params) = Query::<HashMap<String, String>>::try_from_uri(&uri)
        .map_err(|e| format!("Invalid share link query: {e}"))?;
    Ok(params)
}
