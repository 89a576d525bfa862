//! Booking and availability engine: pricing, date validation, the booking state machine,
//! and the service that ties them to storage and notifications.

pub mod clock;
pub mod domain;
pub mod lifecycle;
pub mod notify;
pub mod pricing;
pub mod repository;
pub mod request;
pub mod router;
pub mod service;
pub mod validation;
pub mod views;

#[cfg(test)]
mod tests;

pub use clock::{Clock, FixedClock, SystemClock};
pub use domain::{
    Booking, BookingDraft, BookingId, BookingStatus, DateRange, Principal, UnitId, UnitSnapshot,
    UserId,
};
pub use lifecycle::{BookingEvent, BookingEventKind, LifecycleError, Transition};
pub use notify::{
    notification_queue, BookingMessage, BookingNotifier, NotificationError, NotificationSink,
    NotificationWorker, QueuedNotifier,
};
pub use pricing::{ContractQuote, PricingError};
pub use repository::{BookingRepository, RepositoryError, UnitDirectory};
pub use request::BookingRequest;
pub use router::booking_router;
pub use service::{BookingError, BookingService};
pub use validation::ValidationError;
pub use views::{format_amount, BookingView};
