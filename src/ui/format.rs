/// Format a money amount the way the dashboard shows it (es-ES): `,` before
/// the decimals, `.` between thousands. Like the browser's es-ES locale,
/// four-digit amounts are not grouped (`1234,50` but `12.345,00`).
pub fn format_money(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((int_part, frac)) => (int_part, Some(frac)),
        None => (formatted.as_str(), None),
    };

    let mut out = String::with_capacity(formatted.len() + 4);
    // No sign on values that round to zero
    if value < 0.0 && formatted.bytes().any(|b| b.is_ascii_digit() && b != b'0') {
        out.push('-');
    }
    if int_part.len() >= 5 {
        out.push_str(&group_thousands(int_part));
    } else {
        out.push_str(int_part);
    }
    if let Some(frac) = frac_part {
        out.push(',');
        out.push_str(frac);
    }
    out
}

/// `€ 1.234,56`-style amount with two decimals.
pub fn format_eur(value: f64) -> String {
    format!("€ {}", format_money(value, 2))
}

/// Percentage with a fixed number of decimals, e.g. `12.3%`.
pub fn format_pct(value: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, value)
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}
