use rocket::{
    http::Status,
    response::{self, status, Responder},
    Request,
};
use rocket_contrib::templates::Template;
use serde_json::json;
use tracing::warn;
use yatube_models::Error;

/// Turns a model-layer error into the matching error page, so that
/// handlers can simply use `?`.
#[derive(Debug)]
pub struct ErrorPage(Error);

impl From<Error> for ErrorPage {
    fn from(err: Error) -> ErrorPage {
        ErrorPage(err)
    }
}

impl<'r> Responder<'r> for ErrorPage {
    fn respond_to(self, req: &Request<'_>) -> response::Result<'r> {
        match self.0 {
            Error::NotFound | Error::Db(diesel::result::Error::NotFound) => status::Custom(
                Status::NotFound,
                Template::render("errors/404", json!({ "path": req.uri().path() })),
            )
            .respond_to(req),
            err => {
                warn!("server error: {:?}", err);
                status::Custom(
                    Status::InternalServerError,
                    Template::render("errors/500", json!({})),
                )
                .respond_to(req)
            }
        }
    }
}

#[catch(404)]
pub fn not_found(req: &Request<'_>) -> status::Custom<Template> {
    status::Custom(
        Status::NotFound,
        Template::render("errors/404", json!({ "path": req.uri().path() })),
    )
}

#[catch(500)]
pub fn server_error(_req: &Request<'_>) -> status::Custom<Template> {
    status::Custom(
        Status::InternalServerError,
        Template::render("errors/500", json!({})),
    )
}
