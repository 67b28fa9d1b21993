use rocket::{
    http::RawStr,
    request::{FromFormValue, Request},
    response::{self, NamedFile, Redirect, Responder},
};
use rocket_contrib::templates::Template;
use serde_json::json;
use shrinkwraprs::Shrinkwrap;
use std::path::{Path, PathBuf};
use validator::ValidationErrors;
use yatube_models::{posts::Post, Connection, Result};

pub mod comments;
pub mod errors;
pub mod groups;
pub mod posts;
pub mod session;
pub mod timelines;
pub mod user;

const ITEMS_PER_PAGE: i32 = 10;

/// A `?page=N` query parameter. Invalid or missing values fall back to
/// the first page.
#[derive(Shrinkwrap, Copy, Clone)]
pub struct Page(i32);

impl<'v> FromFormValue<'v> for Page {
    type Error = ();

    fn from_form_value(form_value: &'v RawStr) -> std::result::Result<Page, Self::Error> {
        match form_value.parse::<i32>() {
            Ok(page) if page > 0 => Ok(Page(page)),
            _ => Err(()),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Page(1)
    }
}

impl Page {
    pub fn limits(self) -> (i32, i32) {
        ((self.0 - 1) * ITEMS_PER_PAGE, self.0 * ITEMS_PER_PAGE)
    }

    /// Computes the total number of pages needed to display n_items
    pub fn total(n_items: i32) -> i32 {
        if n_items % ITEMS_PER_PAGE == 0 {
            n_items / ITEMS_PER_PAGE
        } else {
            (n_items / ITEMS_PER_PAGE) + 1
        }
    }
}

/// Joins each post with its author and group for the templates.
pub fn posts_context(conn: &Connection, posts: Vec<Post>) -> Result<serde_json::Value> {
    let mut rendered = Vec::with_capacity(posts.len());
    for post in posts {
        let author = post.get_author(conn)?;
        let group = post.get_group(conn)?;
        rendered.push(json!({ "post": post, "author": author, "group": group }));
    }
    Ok(serde_json::Value::Array(rendered))
}

/// Flattens `validator` errors into a field -> messages map for the
/// templates.
pub fn validation_messages(errors: &ValidationErrors) -> serde_json::Map<String, serde_json::Value> {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let messages = errs
                .iter()
                .filter_map(|err| err.message.as_ref().map(|msg| msg.to_string()))
                .collect::<Vec<_>>();
            (field.to_string(), json!(messages))
        })
        .collect()
}

/// Some routes either render a page or redirect, depending on what the
/// submitted data looked like.
pub enum RespondOrRedirect {
    Response(Template),
    Redirect(Redirect),
}

impl<'r> Responder<'r> for RespondOrRedirect {
    fn respond_to(self, request: &Request<'_>) -> response::Result<'r> {
        match self {
            RespondOrRedirect::Response(template) => template.respond_to(request),
            RespondOrRedirect::Redirect(redirect) => redirect.respond_to(request),
        }
    }
}

impl From<Template> for RespondOrRedirect {
    fn from(template: Template) -> Self {
        RespondOrRedirect::Response(template)
    }
}

impl From<Redirect> for RespondOrRedirect {
    fn from(redirect: Redirect) -> Self {
        RespondOrRedirect::Redirect(redirect)
    }
}

#[get("/static/<file..>", rank = 2)]
pub fn static_files(file: PathBuf) -> Option<NamedFile> {
    NamedFile::open(Path::new("static/").join(file)).ok()
}
