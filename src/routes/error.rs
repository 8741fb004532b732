use crate::error::app_error::ErrorBody;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{Request, catch};

fn body(message: &str) -> Json<ErrorBody> {
    Json(ErrorBody { message: message.to_string() })
}

#[catch(400)]
pub fn bad_request(_: &Request) -> Json<ErrorBody> {
    body("Bad request")
}

#[catch(401)]
pub fn unauthorized(_: &Request) -> Json<ErrorBody> {
    body("Unauthorized")
}

#[catch(403)]
pub fn forbidden(_: &Request) -> Json<ErrorBody> {
    body("Insufficient permissions")
}

#[catch(404)]
pub fn not_found(_: &Request) -> Json<ErrorBody> {
    body("Not found")
}

#[catch(409)]
pub fn conflict(_: &Request) -> Json<ErrorBody> {
    body("Conflict")
}

#[catch(422)]
pub fn unprocessable_entity(_: &Request) -> Json<ErrorBody> {
    body("Request body is not valid JSON for this endpoint")
}

#[catch(500)]
pub fn internal_error(_: &Request) -> Json<ErrorBody> {
    body("Internal server error")
}

#[catch(default)]
pub fn default_catcher(status: Status, _: &Request) -> Json<ErrorBody> {
    body(status.reason().unwrap_or("Unexpected error"))
}
