use crate::error::AlertsError;

/// Split a rule entry of the form `"<start>-<end>"` into its bounds.
pub fn split_range(entry: &str) -> Option<(&str, &str)> {
    let (start, end) = entry.split_once('-')?;
    Some((start.trim(), end.trim()))
}

/// Enumerate every ICD-10-style code from `start` to `end`, inclusive.
///
/// Codes are one uppercase letter followed by two or three digits. The numeric
/// suffix is swept first; when it runs out of digits the letter advances, so
/// `"A98"..="B01"` yields `A98, A99, B00, B01`.
pub fn expand_range(start: &str, end: &str) -> Result<Vec<String>, AlertsError> {
    if start.len() != end.len() {
        return Err(AlertsError::RangeLengthMismatch {
            start: start.to_string(),
            end: end.to_string(),
        });
    }

    let malformed = |reason: &str| AlertsError::MalformedRange {
        start: start.to_string(),
        end: end.to_string(),
        reason: reason.to_string(),
    };

    let (first, width) = parse_code(start).ok_or_else(|| malformed("invalid start code"))?;
    let (last, _) = parse_code(end).ok_or_else(|| malformed("invalid end code"))?;
    if first > last {
        return Err(malformed("start is after end"));
    }

    let base = 10u32.pow(width as u32);
    Ok((first..=last)
        .map(|ordinal| {
            let letter = char::from(b'A' + (ordinal / base) as u8);
            format!("{letter}{:0width$}", ordinal % base, width = width)
        })
        .collect())
}

/// Map a code to its position in the letter-major enumeration, plus its digit width.
fn parse_code(code: &str) -> Option<(u32, usize)> {
    let mut chars = code.chars();
    let letter = chars.next().filter(|c| c.is_ascii_uppercase())?;
    let digits = chars.as_str();
    if !(2..=3).contains(&digits.len()) || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let base = 10u32.pow(digits.len() as u32);
    let number: u32 = digits.parse().ok()?;
    Some(((letter as u32 - 'A' as u32) * base + number, digits.len()))
}
