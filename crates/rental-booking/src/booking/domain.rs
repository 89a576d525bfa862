use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::pricing;

/// Identifier of a user as supplied by the identity collaborator.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a rentable unit owned by the listing subsystem.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnitId(pub String);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Store-assigned booking identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BookingId(pub u64);

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The acting user for a request. Trusted as given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
    pub is_owner: bool,
}

impl Principal {
    pub fn tenant(user_id: impl Into<String>) -> Self {
        Self {
            user_id: UserId(user_id.into()),
            is_owner: false,
        }
    }

    pub fn owner(user_id: impl Into<String>) -> Self {
        Self {
            user_id: UserId(user_id.into()),
            is_owner: true,
        }
    }
}

/// Read-only view of a listing at the moment a booking is requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitSnapshot {
    pub id: UnitId,
    pub title: String,
    pub address: String,
    pub monthly_rate: Decimal,
    pub min_contract_months: u32,
    pub is_available: bool,
    pub owner_id: UserId,
}

/// Inclusive start, exclusive end calendar range requested by a tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl DateRange {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
        }
    }

    pub fn days(&self) -> i64 {
        (self.end_date - self.start_date).num_days()
    }

    pub fn duration_months(&self) -> i64 {
        pricing::duration_months(self.start_date, self.end_date)
    }
}

/// Reservation status tracked by the lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub const fn label(self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }

    /// Whether the lifecycle permits moving from `self` to `next`.
    ///
    /// `Confirmed -> Confirmed` is allowed so that a repeated deposit confirmation is a no-op
    /// rather than an error.
    pub const fn can_transition_to(self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (BookingStatus::Pending, BookingStatus::Confirmed)
                | (BookingStatus::Pending, BookingStatus::Cancelled)
                | (BookingStatus::Confirmed, BookingStatus::Confirmed)
                | (BookingStatus::Confirmed, BookingStatus::Cancelled)
                | (BookingStatus::Confirmed, BookingStatus::Completed)
        )
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A priced and validated reservation that the store has not yet assigned an id to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingDraft {
    pub tenant_id: UserId,
    pub unit_id: UnitId,
    pub range: DateRange,
    pub total_amount: Decimal,
    pub deposit_amount: Decimal,
    pub created_at: DateTime<Utc>,
}

impl BookingDraft {
    /// Materialize the draft once the store has picked an id.
    pub fn into_booking(self, id: BookingId) -> Booking {
        Booking {
            id,
            tenant_id: self.tenant_id,
            unit_id: self.unit_id,
            start_date: self.range.start_date,
            end_date: self.range.end_date,
            total_amount: self.total_amount,
            deposit_amount: self.deposit_amount,
            deposit_paid: false,
            full_payment_paid: false,
            status: BookingStatus::Pending,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

/// A tenant's reservation of a unit.
///
/// Identity, range, and amount fields are fixed at creation. Only the lifecycle functions
/// change `status`, `deposit_paid`, and `updated_at`. `full_payment_paid` is carried for the
/// store's schema but nothing in the engine sets it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub tenant_id: UserId,
    pub unit_id: UnitId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_amount: Decimal,
    pub deposit_amount: Decimal,
    pub deposit_paid: bool,
    pub full_payment_paid: bool,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn range(&self) -> DateRange {
        DateRange::new(self.start_date, self.end_date)
    }

    pub fn duration_months(&self) -> i64 {
        self.range().duration_months()
    }

    /// Balance still owed once the deposit has been collected.
    pub fn remaining_amount(&self) -> Decimal {
        self.total_amount - self.deposit_amount
    }

    pub fn is_held_by(&self, user_id: &UserId) -> bool {
        &self.tenant_id == user_id
    }
}
