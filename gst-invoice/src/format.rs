use time::macros::format_description;
use time::Date;

/// Two decimals with Indian digit grouping (`12,34,567.89`).
pub fn format_money(v: f64) -> String {
    let s = format!("{:.2}", v.abs());
    let (int_part, dec_part) = s.split_once('.').unwrap_or((s.as_str(), "00"));

    let digits: Vec<char> = int_part.chars().collect();
    let mut out: Vec<char> = Vec::with_capacity(digits.len() + digits.len() / 2);
    for (cnt, ch) in digits.iter().rev().enumerate() {
        // first separator after three digits, then every two (lakh, crore)
        if cnt == 3 || (cnt > 3 && (cnt - 3) % 2 == 0) {
            out.push(',');
        }
        out.push(*ch);
    }
    let int_with_sep: String = out.into_iter().rev().collect();

    let negative = v < 0.0 && s.chars().any(|c| c != '0' && c != '.');
    format!("{}{}.{}", if negative { "-" } else { "" }, int_with_sep, dec_part)
}

/// Rates and quantities are shown the way they were typed: `18`, `9`, `4.5`.
pub fn format_number(v: f64) -> String {
    format!("{v}")
}

pub fn format_rate(v: f64) -> String {
    format!("{}%", format_number(v))
}

/// `d/m/yyyy`, as Indian English locales print dates.
pub fn format_date(d: Date) -> String {
    format!("{}/{}/{}", d.day(), u8::from(d.month()), d.year())
}

/// Parses the `YYYY-MM-DD` value of a date field.
pub fn parse_date(input: &str) -> Option<Date> {
    Date::parse(input.trim(), format_description!("[year]-[month]-[day]")).ok()
}

/// `YYYY-MM-DD`, the inverse of [`parse_date`].
pub fn iso_date(d: Date) -> String {
    format!("{:04}-{:02}-{:02}", d.year(), u8::from(d.month()), d.day())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Month;

    #[test]
    fn money_uses_lakh_grouping() {
        assert_eq!(format_money(0.0), "0.00");
        assert_eq!(format_money(999.5), "999.50");
        assert_eq!(format_money(23600.0), "23,600.00");
        assert_eq!(format_money(1234567.891), "12,34,567.89");
        assert_eq!(format_money(123456789.0), "12,34,56,789.00");
    }

    #[test]
    fn negative_money_keeps_sign() {
        assert_eq!(format_money(-1500.0), "-1,500.00");
        assert_eq!(format_money(-0.001), "0.00");
    }

    #[test]
    fn rates_print_without_trailing_zeros() {
        assert_eq!(format_rate(18.0), "18%");
        assert_eq!(format_rate(9.0), "9%");
        assert_eq!(format_rate(2.5), "2.5%");
        assert_eq!(format_number(20.0), "20");
    }

    #[test]
    fn dates_parse_and_print() {
        let d = parse_date("2025-01-05").unwrap();
        assert_eq!(d, Date::from_calendar_date(2025, Month::January, 5).unwrap());
        assert_eq!(format_date(d), "5/1/2025");
        assert_eq!(iso_date(d), "2025-01-05");
        assert!(parse_date("").is_none());
        assert!(parse_date("2025-13-01").is_none());
        assert!(parse_date("05/01/2025").is_none());
    }
}
