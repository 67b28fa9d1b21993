use rocket::http::uri::Uri;
use rocket::response::{Flash, Redirect};

/// Redirects to the login page, remembering in a flash cookie where the
/// user wanted to go, so that a successful login can take them back.
pub fn requires_login(message: &str, destination: &str) -> Flash<Redirect> {
    Flash::new(
        Redirect::to(format!("/login?m={}", Uri::percent_encode(message))),
        "callback",
        destination,
    )
}
