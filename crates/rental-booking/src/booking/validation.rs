use chrono::NaiveDate;

use super::domain::{DateRange, UnitSnapshot};
use super::pricing;

/// Booking input rejected before anything reaches the store. The message is user facing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Start date is required.")]
    MissingStartDate,
    #[error("End date is required.")]
    MissingEndDate,
    #[error("Invalid date format. Please use YYYY-MM-DD format.")]
    InvalidDateFormat,
    #[error("Start date cannot be in the past")]
    PastStartDate,
    #[error("End date must be after start date")]
    InvalidRange,
    #[error("Minimum contract duration is {required} months")]
    DurationTooShort { required: u32 },
}

/// Check a requested range against "today" and the unit's minimum contract.
///
/// Rules run in order and the first failure is returned.
pub fn validate(
    range: &DateRange,
    unit: &UnitSnapshot,
    today: NaiveDate,
) -> Result<(), ValidationError> {
    if range.start_date < today {
        return Err(ValidationError::PastStartDate);
    }

    if range.end_date <= range.start_date {
        return Err(ValidationError::InvalidRange);
    }

    let months = pricing::duration_months(range.start_date, range.end_date);
    if months < i64::from(unit.min_contract_months) {
        return Err(ValidationError::DurationTooShort {
            required: unit.min_contract_months,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::domain::{UnitId, UserId};
    use rust_decimal::Decimal;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn unit(min_contract_months: u32) -> UnitSnapshot {
        UnitSnapshot {
            id: UnitId("garden-2".to_string()),
            title: "Cozy Garden Apartment".to_string(),
            address: "456 Oak Avenue".to_string(),
            monthly_rate: Decimal::new(180000, 2),
            min_contract_months,
            is_available: true,
            owner_id: UserId("sarah".to_string()),
        }
    }

    #[test]
    fn accepts_range_meeting_minimum() {
        let range = DateRange::new(date(2025, 1, 1), date(2025, 7, 15));
        assert_eq!(validate(&range, &unit(6), date(2024, 12, 1)), Ok(()));
    }

    #[test]
    fn accepts_start_date_of_today() {
        let range = DateRange::new(date(2025, 1, 1), date(2025, 1, 2));
        assert_eq!(validate(&range, &unit(1), date(2025, 1, 1)), Ok(()));
    }

    #[test]
    fn past_start_wins_over_every_other_rule() {
        let inverted = DateRange::new(date(2024, 11, 1), date(2024, 10, 1));
        assert_eq!(
            validate(&inverted, &unit(6), date(2024, 12, 1)),
            Err(ValidationError::PastStartDate)
        );
    }

    #[test]
    fn end_equal_to_start_is_invalid_range() {
        let range = DateRange::new(date(2025, 1, 1), date(2025, 1, 1));
        assert_eq!(
            validate(&range, &unit(6), date(2024, 12, 1)),
            Err(ValidationError::InvalidRange)
        );
    }

    #[test]
    fn short_contract_reports_required_months() {
        let range = DateRange::new(date(2025, 1, 1), date(2025, 3, 1));
        let err = validate(&range, &unit(6), date(2024, 12, 1)).expect_err("too short");
        assert_eq!(err, ValidationError::DurationTooShort { required: 6 });
        assert_eq!(err.to_string(), "Minimum contract duration is 6 months");
    }

    #[test]
    fn thirty_day_approximation_counts_partial_month() {
        // 151 days rounds up to six months.
        let range = DateRange::new(date(2025, 1, 1), date(2025, 6, 1));
        assert_eq!(validate(&range, &unit(6), date(2024, 12, 1)), Ok(()));
    }
}
