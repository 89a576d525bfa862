use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::domain::UserId;
use super::lifecycle::{BookingEvent, BookingEventKind};
use super::views::format_amount;
use crate::config::NotificationConfig;

/// Outbound hook for lifecycle events. Implementations must return without waiting on delivery.
pub trait BookingNotifier: Send + Sync {
    fn notify(&self, event: BookingEvent) -> Result<(), NotificationError>;
}

/// Final transport for rendered messages (SMTP relay, log sink, test double).
///
/// Messages name their addressee by user id; resolving that to a mailbox is the transport's job.
pub trait NotificationSink: Send + Sync {
    fn deliver(&self, message: &BookingMessage) -> Result<(), NotificationError>;
}

/// Notification dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification queue is closed")]
    QueueClosed,
    #[error("notification transport unavailable: {0}")]
    Transport(String),
    #[error("notification worker failed: {0}")]
    Worker(String),
}

/// Rendered email for a booking event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingMessage {
    pub kind: BookingEventKind,
    pub sender: String,
    /// User the message is addressed to.
    pub recipient_id: UserId,
    pub subject: String,
    pub body: String,
}

impl BookingMessage {
    pub fn render(event: &BookingEvent, config: &NotificationConfig) -> Self {
        let booking = &event.booking;
        let unit = &event.unit;

        let headline = match event.kind {
            BookingEventKind::Created => {
                "Your booking has been received. Please complete the deposit payment."
            }
            BookingEventKind::Confirmed => "Your booking has been confirmed!",
        };

        let body = format!(
            "Dear {tenant},\n\n\
             {headline}\n\n\
             Unit: {title}\n\
             Address: {address}\n\
             Start Date: {start}\n\
             End Date: {end}\n\
             Total Amount: ${total}\n\
             Deposit Amount: ${deposit}\n\n\
             Thank you for choosing {brand}!\n\n\
             Best regards,\n\
             The {brand} Team\n",
            tenant = event.tenant_id,
            title = unit.title,
            address = unit.address,
            start = booking.start_date.format("%Y-%m-%d"),
            end = booking.end_date.format("%Y-%m-%d"),
            total = format_amount(booking.total_amount),
            deposit = format_amount(booking.deposit_amount),
            brand = config.brand,
        );

        Self {
            kind: event.kind,
            sender: config.sender.clone(),
            recipient_id: event.tenant_id.clone(),
            subject: format!("Booking Confirmation - {}", unit.title),
            body,
        }
    }
}

/// Notifier handle that enqueues events for a background worker.
#[derive(Debug, Clone)]
pub struct QueuedNotifier {
    sender: mpsc::UnboundedSender<BookingEvent>,
}

impl BookingNotifier for QueuedNotifier {
    fn notify(&self, event: BookingEvent) -> Result<(), NotificationError> {
        self.sender
            .send(event)
            .map_err(|_| NotificationError::QueueClosed)
    }
}

/// Background task draining the notification queue.
#[derive(Debug)]
pub struct NotificationWorker {
    handle: JoinHandle<usize>,
}

impl NotificationWorker {
    /// Wait for the queue to drain. Returns once every `QueuedNotifier` clone has been dropped,
    /// yielding the number of delivered messages.
    pub async fn shutdown(self) -> Result<usize, NotificationError> {
        self.handle
            .await
            .map_err(|err| NotificationError::Worker(err.to_string()))
    }
}

/// Spawn the delivery worker on the current tokio runtime.
///
/// Delivery failures are logged and dropped; nothing is retried.
pub fn notification_queue<S>(
    sink: Arc<S>,
    config: NotificationConfig,
) -> (QueuedNotifier, NotificationWorker)
where
    S: NotificationSink + 'static,
{
    let (sender, mut receiver) = mpsc::unbounded_channel::<BookingEvent>();

    let handle = tokio::spawn(async move {
        let mut delivered = 0usize;
        while let Some(event) = receiver.recv().await {
            let message = BookingMessage::render(&event, &config);
            match sink.deliver(&message) {
                Ok(()) => {
                    delivered += 1;
                    debug!(
                        booking_id = %event.booking.id,
                        kind = event.kind.label(),
                        "booking notification delivered"
                    );
                }
                Err(err) => {
                    warn!(
                        booking_id = %event.booking.id,
                        kind = event.kind.label(),
                        error = %err,
                        "failed to deliver booking notification"
                    );
                }
            }
        }
        delivered
    });

    (QueuedNotifier { sender }, NotificationWorker { handle })
}
