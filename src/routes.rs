// src/routes.rs
use std::convert::Infallible;
use std::sync::Arc;

use log::{debug, error, info};
use uuid::Uuid;
use warp::filters::body::BodyDeserializeError;
use warp::filters::BoxedFilter;
use warp::http::StatusCode;
use warp::reject::{MethodNotAllowed, PayloadTooLarge, Rejection};
use warp::reply::{Json, WithStatus};
use warp::{Filter, Reply};

use crate::handlers::error::ApiError;
use crate::handlers::placeholder::{self, Resource, RESOURCES};
use crate::handlers::{calculator, contact, newsletter};
use crate::state::AppState;

const MAX_BODY_BYTES: u64 = 16 * 1024;

// Add recovery handling for our custom errors
async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let code;
    let message: String;

    if err.is_not_found() {
        code = StatusCode::NOT_FOUND;
        message = "Not Found".to_string();
    } else if let Some(api_error) = err.find::<ApiError>() {
        code = api_error.status;
        message = api_error.message.clone();
    } else if let Some(e) = err.find::<BodyDeserializeError>() {
        debug!("Rejected request body: {}", e);
        code = StatusCode::BAD_REQUEST;
        message = format!("Invalid request body: {}", e);
    } else if err.find::<PayloadTooLarge>().is_some() {
        code = StatusCode::PAYLOAD_TOO_LARGE;
        message = "Payload Too Large".to_string();
    } else if err.find::<MethodNotAllowed>().is_some() {
        code = StatusCode::METHOD_NOT_ALLOWED;
        message = "Method Not Allowed".to_string();
    } else {
        error!("Unhandled rejection: {:?}", err);
        code = StatusCode::INTERNAL_SERVER_ERROR;
        message = "Internal Server Error".to_string();
    }

    Ok(warp::reply::with_status(
        warp::reply::json(&serde_json::json!({
            "error": message,
        })),
        code,
    ))
}

fn json_body<T>() -> impl Filter<Extract = (T,), Error = Rejection> + Clone
where
    T: serde::de::DeserializeOwned + Send,
{
    warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::json())
}

/// GET/POST/PUT/PATCH/DELETE for one database-backed collection.
fn resource_routes(resource: &'static Resource) -> BoxedFilter<(WithStatus<Json>,)> {
    let resource_filter = warp::any().map(move || resource);
    let base = warp::path("api").and(warp::path(resource.path));
    let item = base.clone().and(warp::path::param::<String>()).and(warp::path::end());

    let list = base
        .clone()
        .and(warp::path::end())
        .and(warp::get())
        .and(resource_filter.clone())
        .and_then(placeholder::list);

    let get = item
        .clone()
        .and(warp::get())
        .and(resource_filter.clone())
        .and_then(placeholder::get);

    let create = base
        .and(warp::path::end())
        .and(warp::post())
        .and(resource_filter.clone())
        .and_then(placeholder::create);

    let update = item
        .clone()
        .and(warp::put().or(warp::patch()).unify())
        .and(resource_filter.clone())
        .and_then(placeholder::update);

    let delete = item
        .and(warp::delete())
        .and(resource_filter)
        .and_then(placeholder::delete);

    list.or(get)
        .unify()
        .or(create)
        .unify()
        .or(update)
        .unify()
        .or(delete)
        .unify()
        .boxed()
}

pub fn routes(state: Arc<AppState>) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    info!("Configuring routes...");

    let state_filter = warp::any().map(move || state.clone());

    // Contact
    let contact_submit_route = warp::path!("api" / "contact" / "submit")
        .and(warp::post())
        .and(json_body())
        .and(state_filter.clone())
        .and_then(contact::submit_contact);

    let contact_list_route = warp::path!("api" / "contact")
        .and(warp::get())
        .and_then(contact::list_contacts);

    let contact_get_route = warp::path!("api" / "contact" / String)
        .and(warp::get())
        .and_then(contact::get_contact);

    let contact_status_route = warp::path!("api" / "contact" / String / "status")
        .and(warp::patch())
        .and_then(contact::update_contact);

    let contact_read_route = warp::path!("api" / "contact" / String / "read")
        .and(warp::patch())
        .and_then(contact::update_contact);

    // Newsletter
    let newsletter_subscribe_route = warp::path!("api" / "newsletter" / "subscribe")
        .and(warp::post())
        .and(json_body())
        .and(state_filter.clone())
        .and_then(newsletter::subscribe);

    let newsletter_list_route = warp::path!("api" / "newsletter")
        .and(warp::get())
        .and_then(newsletter::list_subscribers);

    let newsletter_unsubscribe_route = warp::path!("api" / "newsletter" / "unsubscribe")
        .and(warp::post())
        .and_then(newsletter::unsubscribe);

    // Placeholder collections; `featured` has to win over `/:id`.
    let featured_route = warp::path!("api" / "services" / "featured")
        .and(warp::get())
        .and_then(placeholder::featured_services)
        .boxed();
    let collection_routes = RESOURCES
        .iter()
        .copied()
        .fold(featured_route, |routes, resource| {
            routes.or(resource_routes(resource)).unify().boxed()
        });

    // Calculator
    let session_create_route = warp::path!("api" / "calculator" / "sessions")
        .and(warp::post())
        .and(warp::query::<calculator::SessionQuery>())
        .and(state_filter.clone())
        .and_then(calculator::create_session);

    let session_get_route = warp::path!("api" / "calculator" / "sessions" / Uuid)
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(calculator::get_session);

    let session_calculate_route = warp::path!("api" / "calculator" / "sessions" / Uuid / "calculate")
        .and(warp::post())
        .and(json_body())
        .and(state_filter.clone())
        .and_then(calculator::calculate);

    let session_contact_route = warp::path!("api" / "calculator" / "sessions" / Uuid / "contact")
        .and(warp::post())
        .and(json_body())
        .and(state_filter.clone())
        .and_then(calculator::submit_contact);

    let industries_route = warp::path!("api" / "calculator" / "reference" / "industries")
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(calculator::industries);

    let countries_route = warp::path!("api" / "calculator" / "reference" / "countries")
        .and(warp::get())
        .and(state_filter)
        .and_then(calculator::countries);

    info!("All routes configured successfully.");

    contact_submit_route
        .or(contact_list_route)
        .or(contact_get_route)
        .or(contact_status_route)
        .or(contact_read_route)
        .or(newsletter_subscribe_route)
        .or(newsletter_list_route)
        .or(newsletter_unsubscribe_route)
        .or(collection_routes)
        .or(session_create_route)
        .or(session_get_route)
        .or(session_calculate_route)
        .or(session_contact_route)
        .or(industries_route)
        .or(countries_route)
        .recover(handle_rejection)
}
