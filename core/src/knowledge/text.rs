//! Formatting helpers shared by the generators

/// First letter upper case, the rest lower case
pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Human label for an identifier: `professional_services` -> `Professional services`
pub fn display_name(id: &str) -> String {
    capitalize(&id.replace('_', " "))
}

pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Two decimals with thousands separators: `1234567.8` -> `1,234,567.80`
pub fn format_amount(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (whole, fraction) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && formatted != "0.00" { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, fraction)
}

/// A heading followed by an `=` underline of the same width
pub fn underlined(title: &str) -> String {
    format!("{}\n{}", title, "=".repeat(title.chars().count()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("retail"), "Retail");
        assert_eq!(capitalize("ENTERPRISE"), "Enterprise");
        assert_eq!(capitalize(""), "");
        assert_eq!(display_name("professional_services"), "Professional services");
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(7000.0), "7,000.00");
        assert_eq!(format_amount(1234567.891), "1,234,567.89");
        assert_eq!(format_amount(999.5), "999.50");
        assert_eq!(format_amount(0.0), "0.00");
        assert_eq!(format_amount(-2500.0), "-2,500.00");
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(85.714285, 2), 85.71);
        assert_eq!(round_to(6.66666, 1), 6.7);
    }

    #[test]
    fn test_underlined() {
        assert_eq!(underlined("ROI"), "ROI\n===");
    }
}
