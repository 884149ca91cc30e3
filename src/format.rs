//! Number formatting shared by narratives, answers and tables.

/// Formats with thousands separators and at most two decimals, trimming
/// trailing zeros: `1234.5` becomes `1,234.5`, `158.3333` becomes `158.33`.
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return "N/A".to_string();
    }
    // Past 1e15 an f64 has no fractional digits left, and scaling by 100
    // could overflow.
    let rounded = if value.abs() < 1e15 {
        (value * 100.0).round() / 100.0
    } else {
        value
    };
    let negative = rounded < 0.0;
    let text = format!("{:.2}", rounded.abs());
    let (integer, fraction) = text.split_once('.').unwrap_or((text.as_str(), ""));
    let fraction = fraction.trim_end_matches('0');

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (idx, ch) in integer.chars().enumerate() {
        if idx > 0 && (integer.len() - idx).is_multiple_of(3) {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let mut output = String::new();
    if negative {
        output.push('-');
    }
    output.push_str(&grouped);
    if !fraction.is_empty() {
        output.push('.');
        output.push_str(fraction);
    }
    output
}

/// One-decimal percentage, e.g. `12.5%`.
pub fn format_percent(value: f64) -> String {
    if !value.is_finite() {
        return "0%".to_string();
    }
    format!("{value:.1}%")
}

/// One-decimal percentage with an explicit `+` for growth.
pub fn format_signed_percent(value: f64) -> String {
    if value > 0.0 {
        format!("+{}", format_percent(value))
    } else {
        format_percent(value)
    }
}

/// Renders an optional percent change; `None` marks growth from a zero
/// baseline, which has no finite percentage.
pub fn format_change(value: Option<f64>) -> String {
    match value {
        Some(v) => format_signed_percent(v),
        None => "n/a (grew from zero)".to_string(),
    }
}

pub fn quoted_list<'a>(items: impl IntoIterator<Item = &'a str>) -> String {
    items
        .into_iter()
        .map(|item| format!("\"{item}\""))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_number_groups_thousands_and_trims_decimals() {
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(158.333_333), "158.33");
        assert_eq!(format_number(1_234.5), "1,234.5");
        assert_eq!(format_number(1_000_000.0), "1,000,000");
        assert_eq!(format_number(-12_345.678), "-12,345.68");
        assert_eq!(format_number(f64::NAN), "N/A");
    }

    #[test]
    fn format_number_keeps_huge_values_finite() {
        let text = format_number(1.5e307);
        assert!(!text.contains("inf"));
        assert_eq!(text.replace(',', "").len(), 308);
        assert_eq!(format_number(-2.5e15), "-2,500,000,000,000,000");
        assert!(format_number(f64::MAX).starts_with("179,769,313"));
    }

    #[test]
    fn percent_helpers_render_sign_and_zero_baseline() {
        assert_eq!(format_percent(12.345), "12.3%");
        assert_eq!(format_signed_percent(125.0), "+125.0%");
        assert_eq!(format_signed_percent(-4.0), "-4.0%");
        assert_eq!(format_change(None), "n/a (grew from zero)");
        assert_eq!(quoted_list(["a", "b"]), "\"a\", \"b\"");
    }
}
