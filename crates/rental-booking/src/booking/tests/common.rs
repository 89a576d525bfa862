use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::booking::clock::FixedClock;
use crate::booking::domain::{Booking, BookingDraft, BookingId, UnitId, UnitSnapshot, UserId};
use crate::booking::lifecycle::BookingEvent;
use crate::booking::notify::{BookingNotifier, NotificationError};
use crate::booking::repository::{BookingRepository, RepositoryError, UnitDirectory};
use crate::booking::{booking_router, BookingService};

pub(super) const LOFT: &str = "loft-1";
pub(super) const GARDEN: &str = "garden-2";
pub(super) const STUDIO: &str = "studio-3";
pub(super) const PENTHOUSE: &str = "penthouse-4";

pub(super) fn date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").expect("valid date")
}

pub(super) fn dec(raw: &str) -> Decimal {
    Decimal::from_str(raw).expect("valid decimal")
}

pub(super) fn today() -> NaiveDate {
    date("2024-12-01")
}

pub(super) fn unit(id: &str, rate: &str, min_contract_months: u32, owner: &str) -> UnitSnapshot {
    UnitSnapshot {
        id: UnitId(id.to_string()),
        title: format!("Unit {id}"),
        address: "123 Main Street".to_string(),
        monthly_rate: dec(rate),
        min_contract_months,
        is_available: true,
        owner_id: UserId(owner.to_string()),
    }
}

/// Loft: 1000.00/month, six month minimum, owned by john.
/// Garden: unavailable, owned by sarah. Studio: 850.50/month, one month minimum, owned by john.
/// Penthouse: priced at `Decimal::MAX`, owned by sarah.
pub(super) fn standard_units() -> MemoryUnits {
    let mut garden = unit(GARDEN, "1800.00", 6, "sarah");
    garden.is_available = false;
    let mut penthouse = unit(PENTHOUSE, "0", 1, "sarah");
    penthouse.monthly_rate = Decimal::MAX;
    MemoryUnits::with_units(vec![
        unit(LOFT, "1000.00", 6, "john"),
        garden,
        unit(STUDIO, "850.50", 1, "john"),
        penthouse,
    ])
}

pub(super) type TestService = BookingService<MemoryRepository, MemoryUnits, MemoryNotifier>;

pub(super) struct Harness {
    pub(super) service: Arc<TestService>,
    pub(super) repository: Arc<MemoryRepository>,
    pub(super) notifier: Arc<MemoryNotifier>,
    pub(super) clock: Arc<FixedClock>,
}

pub(super) fn harness() -> Harness {
    harness_with(MemoryRepository::default(), MemoryNotifier::default())
}

pub(super) fn harness_with(repository: MemoryRepository, notifier: MemoryNotifier) -> Harness {
    let repository = Arc::new(repository);
    let notifier = Arc::new(notifier);
    let clock = Arc::new(FixedClock::on(today()));
    let service = Arc::new(BookingService::new(
        repository.clone(),
        Arc::new(standard_units()),
        notifier.clone(),
        clock.clone(),
    ));
    Harness {
        service,
        repository,
        notifier,
        clock,
    }
}

#[derive(Default)]
pub(super) struct MemoryRepository {
    rows: Mutex<BTreeMap<BookingId, Booking>>,
    fail_writes: bool,
}

impl MemoryRepository {
    pub(super) fn failing_writes() -> Self {
        Self {
            rows: Mutex::default(),
            fail_writes: true,
        }
    }

    pub(super) fn seed(&self, booking: Booking) {
        self.rows
            .lock()
            .expect("repository mutex poisoned")
            .insert(booking.id, booking);
    }

    pub(super) fn len(&self) -> usize {
        self.rows.lock().expect("repository mutex poisoned").len()
    }

    pub(super) fn stored(&self, id: BookingId) -> Option<Booking> {
        self.rows
            .lock()
            .expect("repository mutex poisoned")
            .get(&id)
            .cloned()
    }
}

impl BookingRepository for MemoryRepository {
    fn insert(&self, draft: BookingDraft) -> Result<Booking, RepositoryError> {
        if self.fail_writes {
            return Err(RepositoryError::Unavailable("database offline".to_string()));
        }
        let mut rows = self.rows.lock().expect("repository mutex poisoned");
        let next = rows.keys().next_back().map_or(1, |id| id.0 + 1);
        let booking = draft.into_booking(BookingId(next));
        rows.insert(booking.id, booking.clone());
        Ok(booking)
    }

    fn update(&self, booking: &Booking) -> Result<(), RepositoryError> {
        if self.fail_writes {
            return Err(RepositoryError::Unavailable("database offline".to_string()));
        }
        let mut rows = self.rows.lock().expect("repository mutex poisoned");
        match rows.get_mut(&booking.id) {
            Some(row) => {
                *row = booking.clone();
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: BookingId) -> Result<Option<Booking>, RepositoryError> {
        Ok(self.stored(id))
    }

    fn for_tenant(&self, tenant_id: &UserId) -> Result<Vec<Booking>, RepositoryError> {
        let rows = self.rows.lock().expect("repository mutex poisoned");
        Ok(rows
            .values()
            .filter(|booking| &booking.tenant_id == tenant_id)
            .cloned()
            .collect())
    }

    fn for_units(&self, unit_ids: &[UnitId]) -> Result<Vec<Booking>, RepositoryError> {
        let rows = self.rows.lock().expect("repository mutex poisoned");
        Ok(rows
            .values()
            .filter(|booking| unit_ids.contains(&booking.unit_id))
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub(super) struct MemoryUnits {
    units: BTreeMap<UnitId, UnitSnapshot>,
}

impl MemoryUnits {
    pub(super) fn with_units(units: Vec<UnitSnapshot>) -> Self {
        Self {
            units: units.into_iter().map(|unit| (unit.id.clone(), unit)).collect(),
        }
    }
}

impl UnitDirectory for MemoryUnits {
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

#[derive(Default)]
pub(super) struct MemoryNotifier {
    events: Mutex<Vec<BookingEvent>>,
    offline: bool,
}

impl MemoryNotifier {
    pub(super) fn offline() -> Self {
        Self {
            events: Mutex::default(),
            offline: true,
        }
    }

    pub(super) fn events(&self) -> Vec<BookingEvent> {
        self.events.lock().expect("notifier mutex poisoned").clone()
    }
}

impl BookingNotifier for MemoryNotifier {
    fn notify(&self, event: BookingEvent) -> Result<(), NotificationError> {
        if self.offline {
            return Err(NotificationError::Transport("smtp unreachable".to_string()));
        }
        self.events
            .lock()
            .expect("notifier mutex poisoned")
            .push(event);
        Ok(())
    }
}

pub(super) fn router(harness: &Harness) -> axum::Router {
    booking_router(harness.service.clone())
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
