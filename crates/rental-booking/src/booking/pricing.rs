use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

/// Days counted as one contract month.
pub const DAYS_PER_MONTH: i64 = 30;

/// Deposit share of the contract total (20%).
pub const DEPOSIT_RATE: Decimal = Decimal::from_parts(20, 0, 0, false, 2);

/// Contract length in whole months: `ceil(days / 30)`.
///
/// Thirty-day months are an approximation that can drift from calendar months near month
/// boundaries; validation and pricing both call this so they always agree. Ranges where
/// `end <= start` yield zero or a negative count.
pub fn duration_months(start_date: NaiveDate, end_date: NaiveDate) -> i64 {
    let days = (end_date - start_date).num_days();
    let whole = days.div_euclid(DAYS_PER_MONTH);
    if days.rem_euclid(DAYS_PER_MONTH) == 0 {
        whole
    } else {
        whole + 1
    }
}

/// Contract amounts that cannot be represented as a `Decimal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PricingError {
    #[error("The contract total for {duration_months} months exceeds the supported amount.")]
    AmountOutOfRange { duration_months: i64 },
}

/// Derived amounts for a date range at a given monthly rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ContractQuote {
    pub duration_months: i64,
    pub total_amount: Decimal,
    pub deposit_amount: Decimal,
}

impl ContractQuote {
    pub fn remaining_amount(&self) -> Decimal {
        self.total_amount - self.deposit_amount
    }
}

/// Price a contract. No rounding is applied beyond what `Decimal` arithmetic carries.
pub fn price(
    start_date: NaiveDate,
    end_date: NaiveDate,
    monthly_rate: Decimal,
) -> Result<ContractQuote, PricingError> {
    let duration_months = duration_months(start_date, end_date);
    let out_of_range = PricingError::AmountOutOfRange { duration_months };

    let total_amount = Decimal::from(duration_months)
        .checked_mul(monthly_rate)
        .ok_or(out_of_range)?;
    let deposit_amount = total_amount
        .checked_mul(DEPOSIT_RATE)
        .ok_or(out_of_range)?;

    Ok(ContractQuote {
        duration_months,
        total_amount,
        deposit_amount,
    })
}
