//! Amounts in words using the Indian scale (thousand, lakh, crore).

const ONES: [&str; 10] = [
    "", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine",
];
const TEENS: [&str; 10] = [
    "Ten", "Eleven", "Twelve", "Thirteen", "Fourteen", "Fifteen", "Sixteen", "Seventeen",
    "Eighteen", "Nineteen",
];
const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

const THOUSAND: u64 = 1_000;
const LAKH: u64 = 100_000;
const CRORE: u64 = 10_000_000;

/// `23600.0` becomes `"Twenty Three Thousand Six Hundred Rupees Only"`.
///
/// Zero short-circuits to `"Zero"` without the currency suffix. Negative amounts
/// get a `"Minus "` prefix, and non-finite input is treated as zero.
pub fn amount_in_words(amount: f64) -> String {
    if !amount.is_finite() || amount == 0.0 {
        return "Zero".to_string();
    }
    if amount < 0.0 {
        return format!("Minus {}", amount_in_words(-amount));
    }

    let mut rupees = amount.floor() as u64;
    let mut paise = ((amount - amount.floor()) * 100.0).round() as u64;
    if paise >= 100 {
        rupees += paise / 100;
        paise %= 100;
    }

    let rupee_words = if rupees == 0 {
        "Zero".to_string()
    } else {
        integer_words(rupees)
    };

    let mut out = format!("{rupee_words} Rupees");
    if paise > 0 {
        out.push_str(" and ");
        out.push_str(&integer_words(paise));
        out.push_str(" Paise");
    }
    out.push_str(" Only");
    out
}

/// Words for a whole number; `0` yields an empty string.
pub fn integer_words(n: u64) -> String {
    match n {
        0..=9 => ONES[n as usize].to_string(),
        10..=19 => TEENS[(n - 10) as usize].to_string(),
        20..=99 => {
            let tens = TENS[(n / 10) as usize];
            match n % 10 {
                0 => tens.to_string(),
                ones => format!("{tens} {}", ONES[ones as usize]),
            }
        }
        100..=999 => with_remainder(format!("{} Hundred", ONES[(n / 100) as usize]), n % 100),
        _ if n < LAKH => scaled(n, THOUSAND, "Thousand"),
        _ if n < CRORE => scaled(n, LAKH, "Lakh"),
        _ => scaled(n, CRORE, "Crore"),
    }
}

fn scaled(n: u64, unit: u64, name: &str) -> String {
    with_remainder(format!("{} {name}", integer_words(n / unit)), n % unit)
}

fn with_remainder(head: String, remainder: u64) -> String {
    if remainder == 0 {
        head
    } else {
        format!("{head} {}", integer_words(remainder))
    }
}
