use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};

use super::domain::{Booking, BookingId, UnitId, UserId};

/// Two fractional digits for display; full precision stays on the booking.
pub fn format_amount(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp(2))
}

fn serialize_date<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(&date.format("%Y-%m-%d"))
}

/// Public representation of a booking for API responses and the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingView {
    pub booking_id: BookingId,
    pub tenant_id: UserId,
    pub unit_id: UnitId,
    #[serde(serialize_with = "serialize_date")]
    pub start_date: NaiveDate,
    #[serde(serialize_with = "serialize_date")]
    pub end_date: NaiveDate,
    pub duration_months: i64,
    pub total_amount: String,
    pub deposit_amount: String,
    pub remaining_amount: String,
    pub deposit_paid: bool,
    pub full_payment_paid: bool,
    pub status: &'static str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Booking> for BookingView {
    fn from(booking: &Booking) -> Self {
        Self {
            booking_id: booking.id,
            tenant_id: booking.tenant_id.clone(),
            unit_id: booking.unit_id.clone(),
            start_date: booking.start_date,
            end_date: booking.end_date,
            duration_months: booking.duration_months(),
            total_amount: format_amount(booking.total_amount),
            deposit_amount: format_amount(booking.deposit_amount),
            remaining_amount: format_amount(booking.remaining_amount()),
            deposit_paid: booking.deposit_paid,
            full_payment_paid: booking.full_payment_paid,
            status: booking.status.label(),
            created_at: booking.created_at,
            updated_at: booking.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::domain::BookingStatus;
    use std::str::FromStr;

    #[test]
    fn formats_amounts_with_two_digits() {
        assert_eq!(format_amount(Decimal::from(7000)), "7000.00");
        assert_eq!(format_amount(Decimal::from_str("246.914").expect("decimal")), "246.91");
        assert_eq!(format_amount(Decimal::from_str("0.5").expect("decimal")), "0.50");
    }

    #[test]
    fn view_serializes_boundary_formats() {
        let created_at = Utc::now();
        let booking = Booking {
            id: BookingId(12),
            tenant_id: UserId("mike".to_string()),
            unit_id: UnitId("loft-1".to_string()),
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid"),
            end_date: NaiveDate::from_ymd_opt(2025, 7, 15).expect("valid"),
            total_amount: Decimal::from(7000),
            deposit_amount: Decimal::from(1400),
            deposit_paid: true,
            full_payment_paid: false,
            status: BookingStatus::Confirmed,
            created_at,
            updated_at: created_at,
        };

        let json = serde_json::to_value(BookingView::from(&booking)).expect("serializes");
        assert_eq!(json["booking_id"], 12);
        assert_eq!(json["start_date"], "2025-01-01");
        assert_eq!(json["end_date"], "2025-07-15");
        assert_eq!(json["duration_months"], 7);
        assert_eq!(json["total_amount"], "7000.00");
        assert_eq!(json["deposit_amount"], "1400.00");
        assert_eq!(json["remaining_amount"], "5600.00");
        assert_eq!(json["status"], "confirmed");
    }
}
