//! Display formatting for rupiah and bitcoin amounts.

/// Format an IDR amount the Indonesian way: whole rupiah, `.` as the
/// thousands separator, e.g. `Rp 1.250.000` or `-Rp 30.000`.
pub fn format_idr(amount: f64) -> String {
    if !amount.is_finite() {
        return "Rp -".to_string();
    }
    let rounded = amount.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    let digits = format!("{:.0}", rounded.abs());
    format!("{sign}Rp {}", group_thousands(&digits, '.'))
}

/// Format a BTC amount with the bitcoin sign and 8 decimals, e.g. `₿0.00500000`.
pub fn format_btc(amount: f64) -> String {
    if amount < 0.0 {
        format!("-₿{:.8}", amount.abs())
    } else {
        format!("₿{amount:.8}")
    }
}

/// Signed percentage with two decimals, e.g. `+12.50%`.
pub fn format_pct(pct: f64) -> String {
    format!("{pct:+.2}%")
}

fn group_thousands(digits: &str, separator: char) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idr_groups_thousands() {
        assert_eq!(format_idr(1_250_000.0), "Rp 1.250.000");
        assert_eq!(format_idr(999.0), "Rp 999");
        assert_eq!(format_idr(0.0), "Rp 0");
    }

    #[test]
    fn idr_negative_and_rounding() {
        assert_eq!(format_idr(-30_000.4), "-Rp 30.000");
        assert_eq!(format_idr(1_000.6), "Rp 1.001");
    }

    #[test]
    fn btc_has_eight_decimals() {
        assert_eq!(format_btc(0.005), "₿0.00500000");
        assert_eq!(format_btc(-0.5), "-₿0.50000000");
    }

    #[test]
    fn pct_is_signed() {
        assert_eq!(format_pct(12.5), "+12.50%");
        assert_eq!(format_pct(-3.0), "-3.00%");
    }
}
