use rocket::response::{Flash, Redirect};
use rocket_contrib::templates::Template;
use serde_json::json;

use crate::routes::{errors::ErrorPage, posts_context, Page};
use crate::utils::requires_login;
use yatube_models::{db_conn::DbConn, posts::Post, users::User};

#[get("/follow?<page>")]
pub fn feed(user: User, page: Option<Page>, conn: DbConn) -> Result<Template, ErrorPage> {
    let page = page.unwrap_or_default();
    let n_pages = Page::total(Post::count_for_feed(&*conn, &user)? as i32);
    let posts = posts_context(&*conn, Post::feed_page(&*conn, &user, page.limits())?)?;

    Ok(Template::render(
        "timelines/feed",
        json!({
            "account": user,
            "posts": posts,
            "page": *page,
            "n_pages": n_pages,
        }),
    ))
}

#[get("/follow", rank = 2)]
pub fn feed_auth() -> Flash<Redirect> {
    requires_login("You need to be logged in to see your feed", "/follow")
}
