use bonsplit_core::within_limit;
use rust_decimal::Decimal;
use std::str::FromStr;

re!(re_price, r"-?\d+[.,]\d{1,2}");

/// The first price-shaped substring of a line and its value.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceMatch {
    /// The substring exactly as printed, e.g. `"2,39"`.
    pub span: String,
    pub amount: Decimal,
}

/// Find the leftmost amount in `line`: optional minus, digits, `.` or `,`,
/// then one or two digits.
///
/// Only the first candidate is considered. If it does not parse, or lies
/// beyond [`bonsplit_core::MAX_AMOUNT`], the line has no price; later
/// candidates are not tried.
pub fn find_price(line: &str) -> Option<PriceMatch> {
    let m = re_price().find(line)?;
    let span = m.as_str();
    let amount = Decimal::from_str(&span.replace(',', "."))
        .ok()
        .filter(|a| within_limit(*a))?;
    Some(PriceMatch { span: span.to_string(), amount })
}
