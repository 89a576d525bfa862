//! Booking state machine.
//!
//! `pending -> confirmed -> completed`, with `cancelled` reachable from `pending` or
//! `confirmed`. Every transition returns an updated copy so the caller can persist it and
//! discard it on failure; the stored row is never touched here. Tenant-facing transitions also
//! name the event to publish once the copy has been persisted.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{
    Booking, BookingDraft, BookingStatus, DateRange, Principal, UnitId, UnitSnapshot, UserId,
};
use super::pricing::ContractQuote;

/// Transition rejected by the state machine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    #[error("unit {0} is not available for booking")]
    UnitUnavailable(UnitId),
    #[error("booking belongs to another tenant")]
    Forbidden,
    #[error("booking is {from} and cannot become {to}")]
    IllegalTransition {
        from: BookingStatus,
        to: BookingStatus,
    },
}

/// Which lifecycle step produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingEventKind {
    Created,
    Confirmed,
}

impl BookingEventKind {
    pub const fn label(self) -> &'static str {
        match self {
            BookingEventKind::Created => "created",
            BookingEventKind::Confirmed => "confirmed",
        }
    }
}

/// Emitted after a transition has been persisted, for downstream notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingEvent {
    pub kind: BookingEventKind,
    pub booking: Booking,
    pub unit: UnitSnapshot,
    pub tenant_id: UserId,
}

impl BookingEvent {
    pub fn new(kind: BookingEventKind, booking: Booking, unit: UnitSnapshot) -> Self {
        let tenant_id = booking.tenant_id.clone();
        Self {
            kind,
            booking,
            unit,
            tenant_id,
        }
    }
}

/// Next state produced by a transition, with the event owed once it is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition<T> {
    pub next: T,
    pub event: BookingEventKind,
}

impl<T> Transition<T> {
    /// Build the event for the persisted form of `next`.
    pub fn event_for(&self, persisted: Booking, unit: UnitSnapshot) -> BookingEvent {
        BookingEvent::new(self.event, persisted, unit)
    }
}

/// Initial state: a pending, unpaid booking held by the acting principal.
pub fn create(
    principal: &Principal,
    unit: &UnitSnapshot,
    range: DateRange,
    quote: &ContractQuote,
    now: DateTime<Utc>,
) -> Result<Transition<BookingDraft>, LifecycleError> {
    if !unit.is_available {
        return Err(LifecycleError::UnitUnavailable(unit.id.clone()));
    }

    Ok(Transition {
        next: BookingDraft {
            tenant_id: principal.user_id.clone(),
            unit_id: unit.id.clone(),
            range,
            total_amount: quote.total_amount,
            deposit_amount: quote.deposit_amount,
            created_at: now,
        },
        event: BookingEventKind::Created,
    })
}

/// Record the deposit and confirm the booking.
///
/// Re-confirming an already confirmed booking repeats the transition and succeeds.
pub fn confirm_deposit(
    principal: &Principal,
    booking: &Booking,
    now: DateTime<Utc>,
) -> Result<Transition<Booking>, LifecycleError> {
    if !booking.is_held_by(&principal.user_id) {
        return Err(LifecycleError::Forbidden);
    }

    let mut next = transition(booking, BookingStatus::Confirmed, now)?;
    next.deposit_paid = true;
    Ok(Transition {
        next,
        event: BookingEventKind::Confirmed,
    })
}

/// Administrative cancellation. Payment flags are left as they were.
pub fn cancel(booking: &Booking, now: DateTime<Utc>) -> Result<Booking, LifecycleError> {
    transition(booking, BookingStatus::Cancelled, now)
}

/// Administrative completion at the end of the tenancy.
pub fn complete(booking: &Booking, now: DateTime<Utc>) -> Result<Booking, LifecycleError> {
    transition(booking, BookingStatus::Completed, now)
}

fn transition(
    booking: &Booking,
    to: BookingStatus,
    now: DateTime<Utc>,
) -> Result<Booking, LifecycleError> {
    if !booking.status.can_transition_to(to) {
        return Err(LifecycleError::IllegalTransition {
            from: booking.status,
            to,
        });
    }

    let mut next = booking.clone();
    next.status = to;
    next.updated_at = now;
    Ok(next)
}
