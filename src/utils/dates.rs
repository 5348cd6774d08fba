use chrono::NaiveDate;

/// Textual formats tried against the whole cell before numeric parsing.
const TEXTUAL_FORMATS: [&str; 3] = ["%d %b %Y", "%d %B %Y", "%b %d, %Y"];

/// Parse a store date cell leniently.
///
/// Accepts ISO (`2024-05-01`, `2024/05/01`) and day-first
/// (`01/05/2024`, `01-05-2024`, `01.05.2024`, `01/05/24`) dates, with or
/// without a trailing time component. Returns `None` for anything else.
pub fn parse_lenient_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    for format in TEXTUAL_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date);
        }
    }

    let date_part = trimmed
        .split(|c: char| c == 'T' || c.is_whitespace())
        .next()
        .unwrap_or(trimmed);

    let parts: Vec<&str> = date_part.split(['-', '/', '.']).collect();
    if parts.len() != 3 || parts.iter().any(|p| p.is_empty() || !p.chars().all(|c| c.is_ascii_digit())) {
        return None;
    }

    if parts[0].len() == 4 {
        let year = parts[0].parse::<i32>().ok()?;
        let month = parts[1].parse::<u32>().ok()?;
        let day = parts[2].parse::<u32>().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    let day = parts[0].parse::<u32>().ok()?;
    let month = parts[1].parse::<u32>().ok()?;
    let year = match parts[2].len() {
        4 => parts[2].parse::<i32>().ok()?,
        2 => expand_two_digit_year(parts[2].parse::<i32>().ok()?),
        _ => return None,
    };

    NaiveDate::from_ymd_opt(year, month, day)
}

/// Same pivot as `%y`: 00-68 is 20xx, 69-99 is 19xx.
fn expand_two_digit_year(year: i32) -> i32 {
    if year < 69 {
        2000 + year
    } else {
        1900 + year
    }
}
