// Money formatting for receipts

// Groups an integer digit string: `first` digits on the right, then runs of `rest`
fn group_digits(digits: &str, first: usize, rest: usize) -> String {
    if digits.len() <= first {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - first);

    let mut groups = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(rest);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    groups.push(tail);
    groups.join(",")
}

/// Renders an amount with two decimals.
///
/// With `indian` set the integer part uses lakh/crore grouping
/// (`12,34,567.50`); otherwise thousands grouping (`1,234,567.50`).
pub fn format_amount(value: f64, indian: bool) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let grouped = if indian {
        group_digits(&whole, 3, 2)
    } else {
        group_digits(&whole, 3, 3)
    };
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}{}.{:02}", sign, grouped, cents % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indian_grouping() {
        assert_eq!(format_amount(1234567.5, true), "12,34,567.50");
        assert_eq!(format_amount(123456789.0, true), "12,34,56,789.00");
        assert_eq!(format_amount(1000.0, true), "1,000.00");
        assert_eq!(format_amount(999.0, true), "999.00");
    }

    #[test]
    fn test_western_grouping() {
        assert_eq!(format_amount(1234567.5, false), "1,234,567.50");
        assert_eq!(format_amount(12.0, false), "12.00");
    }

    #[test]
    fn test_rounding_and_sign() {
        assert_eq!(format_amount(5.9, true), "5.90");
        assert_eq!(format_amount(10.756, false), "10.76");
        assert_eq!(format_amount(-1500.25, true), "-1,500.25");
        assert_eq!(format_amount(0.0, true), "0.00");
    }
}
