use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use rental_booking::booking::{
    format_amount, request, Booking, BookingDraft, BookingId, BookingMessage, BookingRepository,
    NotificationError, NotificationSink, RepositoryError, UnitDirectory, UnitId, UnitSnapshot,
    UserId,
};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

fn poisoned<T>(_: T) -> RepositoryError {
    RepositoryError::Unavailable("in-memory store lock poisoned".to_string())
}

/// Process-local booking store. Ids are assigned sequentially from 1.
#[derive(Default, Clone)]
pub(crate) struct InMemoryBookingRepository {
    rows: Arc<Mutex<BTreeMap<BookingId, Booking>>>,
}

impl InMemoryBookingRepository {
    fn rows(&self) -> Result<MutexGuard<'_, BTreeMap<BookingId, Booking>>, RepositoryError> {
        self.rows.lock().map_err(poisoned)
    }
}

impl BookingRepository for InMemoryBookingRepository {
    fn insert(&self, draft: BookingDraft) -> Result<Booking, RepositoryError> {
        let mut rows = self.rows()?;
        let next = rows.keys().next_back().map_or(1, |id| id.0 + 1);
        let booking = draft.into_booking(BookingId(next));
        rows.insert(booking.id, booking.clone());
        Ok(booking)
    }

    fn update(&self, booking: &Booking) -> Result<(), RepositoryError> {
        let mut rows = self.rows()?;
        let row = rows.get_mut(&booking.id).ok_or(RepositoryError::NotFound)?;
        *row = booking.clone();
        Ok(())
    }

    fn fetch(&self, id: BookingId) -> Result<Option<Booking>, RepositoryError> {
        Ok(self.rows()?.get(&id).cloned())
    }

    fn for_tenant(&self, tenant_id: &UserId) -> Result<Vec<Booking>, RepositoryError> {
        Ok(self
            .rows()?
            .values()
            .filter(|booking| &booking.tenant_id == tenant_id)
            .cloned()
            .collect())
    }

    fn for_units(&self, unit_ids: &[UnitId]) -> Result<Vec<Booking>, RepositoryError> {
        Ok(self
            .rows()?
            .values()
            .filter(|booking| unit_ids.contains(&booking.unit_id))
            .cloned()
            .collect())
    }
}

/// Read-only unit catalog.
#[derive(Debug, Default, Clone)]
pub(crate) struct InMemoryUnitDirectory {
    units: BTreeMap<UnitId, UnitSnapshot>,
}

impl InMemoryUnitDirectory {
    pub(crate) fn new(units: Vec<UnitSnapshot>) -> Self {
        Self {
            units: units
                .into_iter()
                .map(|unit| (unit.id.clone(), unit))
                .collect(),
        }
    }

    /// The listings a fresh deployment starts with.
    pub(crate) fn sample() -> Self {
        Self::new(vec![
            sample_unit(
                "downtown-loft",
                "Modern Downtown Loft",
                "123 Main Street, New York, NY 10001",
                Decimal::new(250000, 2),
                12,
                "john_owner",
            ),
            sample_unit(
                "garden-apartment",
                "Cozy Garden Apartment",
                "456 Oak Avenue, Los Angeles, CA 90210",
                Decimal::new(180000, 2),
                6,
                "john_owner",
            ),
            sample_unit(
                "high-rise-condo",
                "Luxury High-Rise Condo",
                "789 Luxury Boulevard, Miami, FL 33101",
                Decimal::new(350000, 2),
                12,
                "sarah_owner",
            ),
            sample_unit(
                "college-studio",
                "Student-Friendly Studio",
                "321 College Drive, Boston, MA 02101",
                Decimal::new(120000, 2),
                9,
                "sarah_owner",
            ),
            sample_unit(
                "family-home",
                "Family Home with Yard",
                "654 Family Circle, Austin, TX 73301",
                Decimal::new(280000, 2),
                12,
                "john_owner",
            ),
        ])
    }
}

fn sample_unit(
    id: &str,
    title: &str,
    address: &str,
    monthly_rate: Decimal,
    min_contract_months: u32,
    owner: &str,
) -> UnitSnapshot {
    UnitSnapshot {
        id: UnitId(id.to_string()),
        title: title.to_string(),
        address: address.to_string(),
        monthly_rate,
        min_contract_months,
        is_available: true,
        owner_id: UserId(owner.to_string()),
    }
}

impl UnitDirectory for InMemoryUnitDirectory {
    fn unit(&self, id: &UnitId) -> Result<Option<UnitSnapshot>, RepositoryError> {
        Ok(self.units.get(id).cloned())
    }

    fn owned_by(&self, owner_id: &UserId) -> Result<Vec<UnitSnapshot>, RepositoryError> {
        Ok(self
            .units
            .values()
            .filter(|unit| &unit.owner_id == owner_id)
            .cloned()
            .collect())
    }
}

/// Mail transport that writes each rendered message to the log instead of a relay.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct LogMailer;

impl NotificationSink for LogMailer {
    fn deliver(&self, message: &BookingMessage) -> Result<(), NotificationError> {
        info!(
            kind = message.kind.label(),
            sender = %message.sender,
            recipient_id = %message.recipient_id,
            subject = %message.subject,
            "booking email sent"
        );
        Ok(())
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    request::parse_date(raw.trim())
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn parse_amount(raw: &str) -> Result<Decimal, String> {
    let amount = Decimal::from_str(raw.trim())
        .map_err(|err| format!("failed to parse '{raw}' as a decimal amount ({err})"))?;
    if amount.is_sign_negative() {
        return Err(format!("amount must not be negative, got {}", format_amount(amount)));
    }
    Ok(amount)
}
