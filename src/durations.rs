use chrono::NaiveTime;

const MINUTES_PER_DAY: i64 = 24 * 60;

/// Parses a user-typed duration into minutes.
///
/// Accepts `H:MM`, unit notation (`1h 30m`, `1h30m`, `2h`, `45m`, `1.5h`) and
/// bare decimal hours (`7.5`). Returns `None` for anything else.
pub fn parse_duration(input: &str) -> Option<u32> {
    let value = input.trim().to_lowercase();
    if value.is_empty() {
        return None;
    }

    if let Some((hours, minutes)) = value.split_once(':') {
        let hours: u32 = hours.trim().parse().ok()?;
        let minutes: u32 = minutes.trim().parse().ok()?;
        if minutes >= 60 {
            return None;
        }
        return hours.checked_mul(60)?.checked_add(minutes);
    }

    if value.contains(['h', 'm']) {
        return parse_unit_duration(&value);
    }

    let hours: f64 = value.parse().ok()?;
    hours_to_minutes(hours)
}

/// Minutes between two wall-clock times (`HH:MM` or `HH:MM:SS`).
///
/// An end time before the start time is taken to be on the following day.
pub fn elapsed_minutes(start_time: &str, end_time: &str) -> Option<u32> {
    let start = parse_clock(start_time)?;
    let end = parse_clock(end_time)?;
    let mut minutes = end.signed_duration_since(start).num_minutes();
    if minutes < 0 {
        minutes += MINUTES_PER_DAY;
    }
    u32::try_from(minutes).ok()
}

pub fn format_duration(minutes: u32) -> String {
    format!("{}:{:02}", minutes / 60, minutes % 60)
}

pub fn format_hours(minutes: u32) -> String {
    match (minutes / 60, minutes % 60) {
        (0, rest) => format!("{rest}m"),
        (hours, 0) => format!("{hours}h"),
        (hours, rest) => format!("{hours}h {rest}m"),
    }
}

fn parse_unit_duration(value: &str) -> Option<u32> {
    let mut total: u32 = 0;
    let mut number = String::new();
    let mut last_unit = None;

    for ch in value.chars() {
        match ch {
            '0'..='9' | '.' => number.push(ch),
            'h' | 'm' => {
                let amount: f64 = number.parse().ok()?;
                number.clear();
                let minutes = if ch == 'h' {
                    hours_to_minutes(amount)?
                } else {
                    hours_to_minutes(amount / 60.0)?
                };
                total = total.checked_add(minutes)?;
                last_unit = Some(ch);
            }
            ' ' => {}
            _ => return None,
        }
    }

    // "1h30" reads as one hour thirty minutes.
    if !number.is_empty() {
        if last_unit != Some('h') {
            return None;
        }
        let minutes: u32 = number.parse().ok()?;
        total = total.checked_add(minutes)?;
    }

    last_unit.map(|_| total)
}

fn hours_to_minutes(hours: f64) -> Option<u32> {
    if !hours.is_finite() || hours < 0.0 {
        return None;
    }
    let minutes = (hours * 60.0).round();
    if minutes > f64::from(u32::MAX) {
        return None;
    }
    Some(minutes as u32)
}

fn parse_clock(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .ok()
}
