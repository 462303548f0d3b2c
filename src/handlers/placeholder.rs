// src/handlers/placeholder.rs
//! Collections the site would serve from a database. None is configured, so
//! listing returns an empty page and everything else answers 404.

use serde_json::json;
use warp::http::StatusCode;
use warp::reply::{Json, WithStatus};
use warp::Rejection;

use super::respond;
use crate::models::{ApiResponse, Pagination};

#[derive(Debug)]
pub struct Resource {
    pub path: &'static str,
    /// Key of the (empty) item list in the listing payload.
    pub collection_key: &'static str,
    pub list_message: &'static str,
    pub item_message: &'static str,
    pub create_message: &'static str,
    pub update_message: &'static str,
    pub delete_message: &'static str,
}

pub static BLOG: Resource = Resource {
    path: "blog",
    collection_key: "posts",
    list_message: "Database-free mode: Blog data not available",
    item_message: "Database-free mode: Blog post data not available",
    create_message: "Database-free mode: Blog post creation not available",
    update_message: "Database-free mode: Blog post updates not available",
    delete_message: "Database-free mode: Blog post deletion not available",
};

pub static PORTFOLIO: Resource = Resource {
    path: "portfolio",
    collection_key: "portfolio",
    list_message: "Database-free mode: Portfolio data not available",
    item_message: "Database-free mode: Portfolio item data not available",
    create_message: "Database-free mode: Portfolio item creation not available",
    update_message: "Database-free mode: Portfolio item updates not available",
    delete_message: "Database-free mode: Portfolio item deletion not available",
};

pub static SERVICES: Resource = Resource {
    path: "services",
    collection_key: "services",
    list_message: "Database-free mode: Services data not available",
    item_message: "Database-free mode: Service data not available",
    create_message: "Database-free mode: Service creation not available",
    update_message: "Database-free mode: Service updates not available",
    delete_message: "Database-free mode: Service deletion not available",
};

pub static TEAM: Resource = Resource {
    path: "team",
    collection_key: "teamMembers",
    list_message: "Database-free mode: Team data not available",
    item_message: "Database-free mode: Team member data not available",
    create_message: "Database-free mode: Team member creation not available",
    update_message: "Database-free mode: Team member updates not available",
    delete_message: "Database-free mode: Team member deletion not available",
};

pub static RESOURCES: [&Resource; 4] = [&BLOG, &PORTFOLIO, &SERVICES, &TEAM];

/// Concrete so the per-resource routes can be unified and boxed.
pub type Response = Result<WithStatus<Json>, Rejection>;

pub async fn list(resource: &'static Resource) -> Response {
    Ok(respond(
        StatusCode::OK,
        &ApiResponse::ok(
            resource.list_message,
            json!({ resource.collection_key: [], "pagination": Pagination::empty() }),
        ),
    ))
}

fn not_available(message: &str) -> WithStatus<Json> {
    respond(StatusCode::NOT_FOUND, &ApiResponse::message(false, message))
}

pub async fn get(_id: String, resource: &'static Resource) -> Response {
    Ok(not_available(resource.item_message))
}

pub async fn create(resource: &'static Resource) -> Response {
    Ok(not_available(resource.create_message))
}

pub async fn update(_id: String, resource: &'static Resource) -> Response {
    Ok(not_available(resource.update_message))
}

pub async fn delete(_id: String, resource: &'static Resource) -> Response {
    Ok(not_available(resource.delete_message))
}

pub async fn featured_services() -> Response {
    Ok(respond(
        StatusCode::OK,
        &ApiResponse::ok("Database-free mode: Featured services not available", json!([])),
    ))
}
