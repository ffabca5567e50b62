//! Currency helpers shared by the cheque and settlement workflows.
//!
//! Amounts are AED with two minor digits. Every arithmetic result is rounded
//! half-up (away from zero on a tie) before it is stored or compared.

use rust_decimal::{Decimal, RoundingStrategy};

pub const CURRENCY_SCALE: u32 = 2;

/// Round to two decimal places, half-up.
pub fn round(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(CURRENCY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Sum rounding every partial total, so the result matches a running ledger.
pub fn sum<I>(amounts: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    amounts
        .into_iter()
        .fold(Decimal::ZERO, |total, amount| round(total + round(amount)))
}

pub fn subtract(left: Decimal, right: Decimal) -> Decimal {
    round(round(left) - round(right))
}

/// Format with the two fixed minor digits used on receipts and audit payloads.
pub fn display(amount: Decimal) -> String {
    let mut rounded = round(amount);
    rounded.rescale(CURRENCY_SCALE);
    rounded.to_string()
}
