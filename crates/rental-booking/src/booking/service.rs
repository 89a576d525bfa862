use std::sync::Arc;

use tracing::{error, info, warn};

use super::clock::Clock;
use super::domain::{Booking, BookingId, BookingStatus, Principal, UnitId, UnitSnapshot, UserId};
use super::lifecycle::{self, BookingEvent, LifecycleError};
use super::notify::BookingNotifier;
use super::pricing::{self, PricingError};
use super::repository::{BookingRepository, RepositoryError, UnitDirectory};
use super::request::BookingRequest;
use super::validation::{self, ValidationError};

/// Error raised by the booking service.
///
/// Everything except [`BookingError::Persistence`] is an expected outcome that carries exactly
/// one user-facing reason; persistence failures are infrastructure faults.
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Pricing(#[from] PricingError),
    #[error("unit {0} not found")]
    UnitNotFound(UnitId),
    #[error("booking {0} not found")]
    BookingNotFound(BookingId),
    #[error("This unit is not available for booking.")]
    UnitUnavailable(UnitId),
    #[error("Access denied.")]
    Forbidden,
    #[error("Booking is {from} and can no longer become {to}.")]
    IllegalTransition {
        from: BookingStatus,
        to: BookingStatus,
    },
    #[error("persistence failure: {0}")]
    Persistence(#[from] RepositoryError),
}

impl BookingError {
    /// True for outcomes the caller should surface to the user as-is.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, BookingError::Persistence(_))
    }

    /// The single message to show the acting user.
    pub fn user_message(&self) -> String {
        match self {
            BookingError::Persistence(_) => {
                "An error occurred while processing the booking. Please try again.".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<LifecycleError> for BookingError {
    fn from(value: LifecycleError) -> Self {
        match value {
            LifecycleError::UnitUnavailable(unit_id) => BookingError::UnitUnavailable(unit_id),
            LifecycleError::Forbidden => BookingError::Forbidden,
            LifecycleError::IllegalTransition { from, to } => {
                BookingError::IllegalTransition { from, to }
            }
        }
    }
}

/// Orchestrates validation, pricing, persistence, and lifecycle events for bookings.
///
/// Overlapping reservations on the same unit are not detected; two tenants can hold
/// intersecting ranges.
pub struct BookingService<R, U, N> {
    repository: Arc<R>,
    units: Arc<U>,
    notifier: Arc<N>,
    clock: Arc<dyn Clock>,
}

impl<R, U, N> BookingService<R, U, N>
where
    R: BookingRepository + 'static,
    U: UnitDirectory + 'static,
    N: BookingNotifier + 'static,
{
    pub fn new(repository: Arc<R>, units: Arc<U>, notifier: Arc<N>, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository,
            units,
            notifier,
            clock,
        }
    }

    /// The unit behind `unit_id`, provided it exists and is open for booking.
    ///
    /// `create_booking` runs this before looking at the submitted dates; boundaries that reject
    /// a form before it reaches the service call it first to keep the same precedence.
    pub fn bookable_unit(&self, unit_id: &UnitId) -> Result<UnitSnapshot, BookingError> {
        let unit = self.require_unit(unit_id)?;
        if !unit.is_available {
            return Err(BookingError::UnitUnavailable(unit.id));
        }
        Ok(unit)
    }

    /// Reserve `unit_id` for the acting tenant.
    pub fn create_booking(
        &self,
        principal: &Principal,
        unit_id: &UnitId,
        request: &BookingRequest,
    ) -> Result<Booking, BookingError> {
        let unit = self.bookable_unit(unit_id)?;

        let range = request.parse()?;
        validation::validate(&range, &unit, self.clock.today())?;

        let quote = pricing::price(range.start_date, range.end_date, unit.monthly_rate)?;
        let created = lifecycle::create(principal, &unit, range, &quote, self.clock.now())?;

        let booking = self.repository.insert(created.next.clone()).map_err(|err| {
            error!(
                unit_id = %unit.id,
                tenant_id = %principal.user_id,
                error = %err,
                "failed to persist booking"
            );
            BookingError::from(err)
        })?;

        info!(
            booking_id = %booking.id,
            unit_id = %booking.unit_id,
            tenant_id = %booking.tenant_id,
            duration_months = quote.duration_months,
            total_amount = %booking.total_amount,
            "booking created"
        );

        self.emit(created.event_for(booking.clone(), unit));

        Ok(booking)
    }

    /// Record the deposit payment for a booking held by the acting tenant.
    pub fn confirm_booking(
        &self,
        principal: &Principal,
        booking_id: BookingId,
    ) -> Result<Booking, BookingError> {
        let current = self.require_booking(booking_id)?;
        let confirmation = lifecycle::confirm_deposit(principal, &current, self.clock.now())?;
        let confirmed = &confirmation.next;

        self.repository.update(confirmed).map_err(|err| {
            error!(
                booking_id = %booking_id,
                error = %err,
                "failed to persist deposit confirmation"
            );
            BookingError::from(err)
        })?;

        info!(
            booking_id = %confirmed.id,
            tenant_id = %confirmed.tenant_id,
            previous_status = current.status.label(),
            "booking deposit confirmed"
        );

        match self.units.unit(&confirmed.unit_id) {
            Ok(Some(unit)) => self.emit(confirmation.event_for(confirmed.clone(), unit)),
            Ok(None) => warn!(
                booking_id = %confirmed.id,
                unit_id = %confirmed.unit_id,
                "unit missing; skipping confirmation notice"
            ),
            Err(err) => warn!(
                booking_id = %confirmed.id,
                error = %err,
                "unit lookup failed; skipping confirmation notice"
            ),
        }

        Ok(confirmation.next)
    }

    /// Every booking held by `tenant_id`, most recently created first.
    pub fn list_bookings_for_tenant(&self, tenant_id: &UserId) -> Result<Vec<Booking>, BookingError> {
        let mut bookings = self.repository.for_tenant(tenant_id)?;
        bookings.retain(|booking| booking.is_held_by(tenant_id));
        sort_newest_first(&mut bookings);
        Ok(bookings)
    }

    /// Bookings on every unit owned by the acting owner, most recently created first.
    pub fn list_bookings_for_owner(&self, principal: &Principal) -> Result<Vec<Booking>, BookingError> {
        if !principal.is_owner {
            return Err(BookingError::Forbidden);
        }

        let unit_ids: Vec<UnitId> = self
            .units
            .owned_by(&principal.user_id)?
            .into_iter()
            .map(|unit| unit.id)
            .collect();
        if unit_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut bookings = self.repository.for_units(&unit_ids)?;
        sort_newest_first(&mut bookings);
        Ok(bookings)
    }

    /// Single booking lookup restricted to its tenant.
    pub fn get_booking_for_tenant(
        &self,
        principal: &Principal,
        booking_id: BookingId,
    ) -> Result<Booking, BookingError> {
        let booking = self.require_booking(booking_id)?;
        if !booking.is_held_by(&principal.user_id) {
            return Err(BookingError::Forbidden);
        }
        Ok(booking)
    }

    fn require_unit(&self, unit_id: &UnitId) -> Result<UnitSnapshot, BookingError> {
        self.units
            .unit(unit_id)?
            .ok_or_else(|| BookingError::UnitNotFound(unit_id.clone()))
    }

    fn require_booking(&self, booking_id: BookingId) -> Result<Booking, BookingError> {
        self.repository
            .fetch(booking_id)?
            .ok_or(BookingError::BookingNotFound(booking_id))
    }

    fn emit(&self, event: BookingEvent) {
        let booking_id = event.booking.id;
        let kind = event.kind;
        if let Err(err) = self.notifier.notify(event) {
            warn!(
                booking_id = %booking_id,
                kind = kind.label(),
                error = %err,
                "booking notification dropped"
            );
        }
    }
}

fn sort_newest_first(bookings: &mut [Booking]) {
    bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}
