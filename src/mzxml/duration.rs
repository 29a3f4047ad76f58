//! `xs:duration` parsing for mzXML retention times.

/// Parse an `xs:duration` such as `PT60S`, `PT1M30.5S` or `P1DT2H`, in seconds.
///
/// Plain numbers are accepted as seconds since some writers omit the duration syntax.
/// Year and month components are rejected because their length in seconds is not
/// fixed.
pub fn parse_duration(text: &str) -> Option<f64> {
    let text = text.trim();
    if let Ok(seconds) = text.parse::<f64>() {
        return Some(seconds);
    }

    let (sign, rest) = match text.strip_prefix('-') {
        Some(rest) => (-1.0, rest),
        None => (1.0, text),
    };
    let rest = rest.strip_prefix('P')?;
    let (date, time) = match rest.split_once('T') {
        Some((date, time)) => {
            if time.is_empty() {
                return None;
            }
            (date, time)
        }
        None => (rest, ""),
    };
    if date.is_empty() && time.is_empty() {
        return None;
    }

    let mut total = 0.0;
    for (value, designator) in components(date)? {
        match designator {
            'D' => total += value * 86_400.0,
            _ => return None,
        }
    }
    for (value, designator) in components(time)? {
        total += match designator {
            'H' => value * 3_600.0,
            'M' => value * 60.0,
            'S' => value,
            _ => return None,
        };
    }
    Some(sign * total)
}

/// Split `1H2M3.5S` into `[(1, 'H'), (2, 'M'), (3.5, 'S')]`
fn components(mut text: &str) -> Option<Vec<(f64, char)>> {
    let mut parts = Vec::new();
    while !text.is_empty() {
        let end = text.find(|c: char| c.is_ascii_alphabetic())?;
        if end == 0 {
            return None;
        }
        let value: f64 = text[..end].parse().ok()?;
        let designator = text[end..].chars().next()?;
        parts.push((value, designator));
        text = &text[end + designator.len_utf8()..];
    }
    Some(parts)
}
