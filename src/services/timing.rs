use crate::types::{ClockTime, MINUTES_PER_DAY};

/// Used when a duration label cannot be parsed.
pub const DEFAULT_DURATION_MINUTES: u32 = 60;

const MINUTE_UNITS: [&str; 3] = ["phút", "minutes", "min"];
const HOUR_UNITS: [&str; 3] = ["giờ", "hours", "hour"];

/// Parses labels such as "45 phút", "2 giờ", "1.5 giờ" or "1-2 giờ" into minutes.
///
/// A range takes its lower bound. Hours and minutes in the same label are summed
/// ("1 giờ 30 phút" is 90). The total is capped at one day. Returns `None` when no
/// quantity is recognised.
pub fn parse_duration_label(label: &str) -> Option<u32> {
    let text = label.trim().to_lowercase();
    let hours = HOUR_UNITS
        .iter()
        .find_map(|unit| quantity_before(&text, unit))
        .map(|hours| (hours * 60.0).round() as u32);
    let minutes = MINUTE_UNITS
        .iter()
        .find_map(|unit| quantity_before(&text, unit))
        .map(|minutes| minutes.round() as u32);

    match (hours, minutes) {
        (None, None) => None,
        (h, m) => Some(h.unwrap_or(0).saturating_add(m.unwrap_or(0)).min(MINUTES_PER_DAY))
            .filter(|total| *total > 0),
    }
}

/// The number written immediately before `unit`, taking the lower bound of an `N-M` range.
fn quantity_before(text: &str, unit: &str) -> Option<f64> {
    let position = text.find(unit)?;
    let head = text[..position].trim_end();
    let start = head
        .char_indices()
        .rev()
        .take_while(|(_, ch)| ch.is_ascii_digit() || *ch == '.' || *ch == '-' || *ch == ',')
        .last()
        .map(|(idx, _)| idx)?;
    let token = head[start..].replace(',', ".");
    let lower = token.split('-').find(|part| !part.is_empty())?;
    lower.parse::<f64>().ok().filter(|value| value.is_finite() && *value >= 0.0)
}

/// Adds a duration label to a wall-clock time, wrapping past midnight.
pub fn advance_time(current: ClockTime, label: &str) -> ClockTime {
    current.add_minutes(parse_duration_label(label).unwrap_or(DEFAULT_DURATION_MINUTES))
}
