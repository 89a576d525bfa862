use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;
use tracing::debug;

use super::domain::{Booking, BookingId, Principal, UnitId, UserId};
use super::notify::BookingNotifier;
use super::repository::{BookingRepository, UnitDirectory};
use super::request::BookingRequest;
use super::service::{BookingError, BookingService};
use super::validation::ValidationError;
use super::views::BookingView;

/// Header carrying the authenticated user id.
pub const USER_ID_HEADER: &str = "x-user-id";
/// Header carrying the user's role; `owner` marks listing owners.
pub const USER_ROLE_HEADER: &str = "x-user-role";

type SharedService<R, U, N> = Arc<BookingService<R, U, N>>;

/// Router builder exposing the booking endpoints.
pub fn booking_router<R, U, N>(service: SharedService<R, U, N>) -> Router
where
    R: BookingRepository + 'static,
    U: UnitDirectory + 'static,
    N: BookingNotifier + 'static,
{
    Router::new()
        .route(
            "/api/v1/units/:unit_id/bookings",
            post(create_handler::<R, U, N>),
        )
        .route("/api/v1/bookings", get(list_handler::<R, U, N>))
        .route(
            "/api/v1/bookings/:booking_id",
            get(detail_handler::<R, U, N>),
        )
        .route(
            "/api/v1/bookings/:booking_id/confirm",
            post(confirm_handler::<R, U, N>),
        )
        .route("/api/v1/owner/bookings", get(owner_handler::<R, U, N>))
        .with_state(service)
}

/// Resolve the acting user from identity headers.
pub(crate) fn principal_from_headers(headers: &HeaderMap) -> Result<Principal, Response> {
    let user_id = headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| {
            let payload = json!({ "error": "authentication required" });
            (StatusCode::UNAUTHORIZED, axum::Json(payload)).into_response()
        })?;

    let is_owner = headers
        .get(USER_ROLE_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(|role| role.trim().eq_ignore_ascii_case("owner"))
        .unwrap_or(false);

    Ok(Principal {
        user_id: UserId(user_id.to_string()),
        is_owner,
    })
}

pub(crate) fn error_response(err: BookingError) -> Response {
    let status = match &err {
        BookingError::Validation(_) | BookingError::Pricing(_) => StatusCode::UNPROCESSABLE_ENTITY,
        BookingError::UnitNotFound(_) | BookingError::BookingNotFound(_) => StatusCode::NOT_FOUND,
        BookingError::Forbidden => StatusCode::FORBIDDEN,
        BookingError::UnitUnavailable(_) | BookingError::IllegalTransition { .. } => {
            StatusCode::CONFLICT
        }
        BookingError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let payload = json!({ "error": err.user_message() });
    (status, axum::Json(payload)).into_response()
}

/// Booking ids that are not numbers cannot name a stored booking.
fn booking_id_from_path(path: Result<Path<u64>, PathRejection>) -> Result<BookingId, Response> {
    match path {
        Ok(Path(raw)) => Ok(BookingId(raw)),
        Err(rejection) => {
            debug!(error = %rejection, "unparseable booking id in path");
            let payload = json!({ "error": "Booking not found." });
            Err((StatusCode::NOT_FOUND, axum::Json(payload)).into_response())
        }
    }
}

fn views(bookings: &[Booking]) -> Vec<BookingView> {
    bookings.iter().map(BookingView::from).collect()
}

pub(crate) async fn create_handler<R, U, N>(
    State(service): State<SharedService<R, U, N>>,
    Path(unit_id): Path<String>,
    headers: HeaderMap,
    payload: Result<axum::Json<BookingRequest>, JsonRejection>,
) -> Response
where
    R: BookingRepository + 'static,
    U: UnitDirectory + 'static,
    N: BookingNotifier + 'static,
{
    let principal = match principal_from_headers(&headers) {
        Ok(principal) => principal,
        Err(response) => return response,
    };

    let unit_id = UnitId(unit_id);
    let request = match payload {
        Ok(axum::Json(request)) => request,
        Err(rejection) => {
            // Unit problems outrank a malformed form.
            if let Err(err) = service.bookable_unit(&unit_id) {
                return error_response(err);
            }
            debug!(unit_id = %unit_id, error = %rejection, "rejected booking form");
            return error_response(ValidationError::InvalidDateFormat.into());
        }
    };

    match service.create_booking(&principal, &unit_id, &request) {
        Ok(booking) => (StatusCode::CREATED, axum::Json(BookingView::from(&booking))).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn list_handler<R, U, N>(
    State(service): State<SharedService<R, U, N>>,
    headers: HeaderMap,
) -> Response
where
    R: BookingRepository + 'static,
    U: UnitDirectory + 'static,
    N: BookingNotifier + 'static,
{
    let principal = match principal_from_headers(&headers) {
        Ok(principal) => principal,
        Err(response) => return response,
    };

    match service.list_bookings_for_tenant(&principal.user_id) {
        Ok(bookings) => (StatusCode::OK, axum::Json(views(&bookings))).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn detail_handler<R, U, N>(
    State(service): State<SharedService<R, U, N>>,
    booking_id: Result<Path<u64>, PathRejection>,
    headers: HeaderMap,
) -> Response
where
    R: BookingRepository + 'static,
    U: UnitDirectory + 'static,
    N: BookingNotifier + 'static,
{
    let principal = match principal_from_headers(&headers) {
        Ok(principal) => principal,
        Err(response) => return response,
    };
    let booking_id = match booking_id_from_path(booking_id) {
        Ok(booking_id) => booking_id,
        Err(response) => return response,
    };

    match service.get_booking_for_tenant(&principal, booking_id) {
        Ok(booking) => (StatusCode::OK, axum::Json(BookingView::from(&booking))).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn confirm_handler<R, U, N>(
    State(service): State<SharedService<R, U, N>>,
    booking_id: Result<Path<u64>, PathRejection>,
    headers: HeaderMap,
) -> Response
where
    R: BookingRepository + 'static,
    U: UnitDirectory + 'static,
    N: BookingNotifier + 'static,
{
    let principal = match principal_from_headers(&headers) {
        Ok(principal) => principal,
        Err(response) => return response,
    };
    let booking_id = match booking_id_from_path(booking_id) {
        Ok(booking_id) => booking_id,
        Err(response) => return response,
    };

    match service.confirm_booking(&principal, booking_id) {
        Ok(booking) => (StatusCode::OK, axum::Json(BookingView::from(&booking))).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn owner_handler<R, U, N>(
    State(service): State<SharedService<R, U, N>>,
    headers: HeaderMap,
) -> Response
where
    R: BookingRepository + 'static,
    U: UnitDirectory + 'static,
    N: BookingNotifier + 'static,
{
    let principal = match principal_from_headers(&headers) {
        Ok(principal) => principal,
        Err(response) => return response,
    };

    match service.list_bookings_for_owner(&principal) {
        Ok(bookings) => (StatusCode::OK, axum::Json(views(&bookings))).into_response(),
        Err(err) => error_response(err),
    }
}
