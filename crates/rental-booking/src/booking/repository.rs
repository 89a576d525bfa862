use super::domain::{Booking, BookingDraft, BookingId, UnitId, UnitSnapshot, UserId};

/// Storage abstraction for bookings.
///
/// Implementations must apply each `insert`/`update` to a single row atomically: a failed call
/// leaves the stored state exactly as it was.
pub trait BookingRepository: Send + Sync {
    /// Persist a new booking and return it with its assigned id.
    fn insert(&self, draft: BookingDraft) -> Result<Booking, RepositoryError>;
    fn update(&self, booking: &Booking) -> Result<(), RepositoryError>;
    fn fetch(&self, id: BookingId) -> Result<Option<Booking>, RepositoryError>;
    fn for_tenant(&self, tenant_id: &UserId) -> Result<Vec<Booking>, RepositoryError>;
    fn for_units(&self, unit_ids: &[UnitId]) -> Result<Vec<Booking>, RepositoryError>;
}

/// Read-only lookup into the listing subsystem.
pub trait UnitDirectory: Send + Sync {
    fn unit(&self, id: &UnitId) -> Result<Option<UnitSnapshot>, RepositoryError>;
    fn owned_by(&self, owner_id: &UserId) -> Result<Vec<UnitSnapshot>, RepositoryError>;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
