use crate::infra::{parse_amount, parse_date, InMemoryBookingRepository, InMemoryUnitDirectory};
use chrono::{Duration, Local, NaiveDate};
use clap::Args;
use rental_booking::booking::{
    format_amount, notification_queue, pricing, Booking, BookingError, BookingMessage,
    BookingRequest, BookingService, FixedClock, NotificationError, NotificationSink, Principal,
    UnitId, ValidationError,
};
use rental_booking::config::NotificationConfig;
use rental_booking::error::AppError;
use rust_decimal::Decimal;
use std::sync::{Arc, Mutex};

#[derive(Args, Debug)]
pub(crate) struct QuoteArgs {
    /// Monthly rate of the unit, e.g. 2500.00
    #[arg(long, value_parser = parse_amount)]
    pub(crate) monthly_rate: Decimal,
    /// Contract start date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub(crate) start: NaiveDate,
    /// Contract end date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub(crate) end: NaiveDate,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Calendar date the walkthrough treats as today (defaults to today).
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

pub(crate) fn run_quote(args: QuoteArgs) -> Result<(), AppError> {
    if args.end <= args.start {
        return Err(BookingError::Validation(ValidationError::InvalidRange).into());
    }

    let quote =
        pricing::price(args.start, args.end, args.monthly_rate).map_err(BookingError::from)?;
    println!("Contract quote");
    println!(
        "  Period: {} to {}",
        args.start.format("%Y-%m-%d"),
        args.end.format("%Y-%m-%d")
    );
    println!("  Monthly rate: ${}", format_amount(args.monthly_rate));
    println!("  Duration: {} month(s)", quote.duration_months);
    println!("  Total: ${}", format_amount(quote.total_amount));
    println!("  Deposit due now: ${}", format_amount(quote.deposit_amount));
    println!(
        "  Remaining after deposit: ${}",
        format_amount(quote.remaining_amount())
    );
    Ok(())
}

/// Collects rendered emails so the walkthrough can print them after the queue drains.
#[derive(Default)]
struct ConsoleOutbox {
    messages: Mutex<Vec<BookingMessage>>,
}

impl ConsoleOutbox {
    fn take(&self) -> Vec<BookingMessage> {
        self.messages
            .lock()
            .map(|mut guard| std::mem::take(&mut *guard))
            .unwrap_or_default()
    }
}

impl NotificationSink for ConsoleOutbox {
    fn deliver(&self, message: &BookingMessage) -> Result<(), NotificationError> {
        self.messages
            .lock()
            .map_err(|_| NotificationError::Transport("outbox lock poisoned".to_string()))?
            .push(message.clone());
        Ok(())
    }
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let outbox = Arc::new(ConsoleOutbox::default());
    let (notifier, worker) = notification_queue(outbox.clone(), NotificationConfig::default());

    let service = BookingService::new(
        Arc::new(InMemoryBookingRepository::default()),
        Arc::new(InMemoryUnitDirectory::sample()),
        Arc::new(notifier),
        Arc::new(FixedClock::on(today)),
    );

    let tenant = Principal::tenant("mike_tenant");
    let owner = Principal::owner("john_owner");
    let loft = UnitId("downtown-loft".to_string());
    let start = today + Duration::days(14);

    println!("Rental booking demo (today is {})", today.format("%Y-%m-%d"));

    let too_short = BookingRequest::new(
        start.format("%Y-%m-%d").to_string(),
        (start + Duration::days(90)).format("%Y-%m-%d").to_string(),
    );
    match service.create_booking(&tenant, &loft, &too_short) {
        Ok(booking) => println!("  Unexpectedly accepted booking {}", booking.id),
        Err(err) => println!("  Three month request rejected: {}", err.user_message()),
    }

    let request = BookingRequest::new(
        start.format("%Y-%m-%d").to_string(),
        (start + Duration::days(365)).format("%Y-%m-%d").to_string(),
    );
    let booking = service.create_booking(&tenant, &loft, &request)?;
    println!("\nBooking created");
    print_booking(&booking);

    let confirmed = service.confirm_booking(&tenant, booking.id)?;
    let again = service.confirm_booking(&tenant, booking.id)?;
    println!(
        "\nDeposit confirmed (status {}, repeat confirmation leaves it {})",
        confirmed.status.label(),
        again.status.label()
    );

    println!("\nBookings for {}", tenant.user_id);
    for booking in service.list_bookings_for_tenant(&tenant.user_id)? {
        print_booking(&booking);
    }

    println!("\nBookings on units owned by {}", owner.user_id);
    for booking in service.list_bookings_for_owner(&owner)? {
        print_booking(&booking);
    }

    drop(service);
    let delivered = worker.shutdown().await?;
    println!("\nNotifications delivered: {delivered}");
    for message in outbox.take() {
        println!(
            "  [{}] to {} from {}: {}",
            message.kind.label(),
            message.recipient_id,
            message.sender,
            message.subject
        );
    }

    Ok(())
}

fn print_booking(booking: &Booking) {
    println!(
        "  #{} {} {} to {} ({} months) total ${} deposit ${} remaining ${} [{}]",
        booking.id,
        booking.unit_id,
        booking.start_date.format("%Y-%m-%d"),
        booking.end_date.format("%Y-%m-%d"),
        booking.duration_months(),
        format_amount(booking.total_amount),
        format_amount(booking.deposit_amount),
        format_amount(booking.remaining_amount()),
        booking.status.label()
    );
}
