use rocket_contrib::templates::Template;
use serde_json::json;

use crate::routes::{errors::ErrorPage, posts_context, Page};
use yatube_models::{db_conn::DbConn, groups::Group, posts::Post, users::User};

#[get("/group/<slug>?<page>")]
pub fn details(
    slug: String,
    page: Option<Page>,
    conn: DbConn,
    account: Option<User>,
) -> Result<Template, ErrorPage> {
    let page = page.unwrap_or_default();
    let group = Group::find_by_slug(&*conn, &slug)?;
    let n_pages = Page::total(Post::count_for_group(&*conn, &group)? as i32);
    let posts = posts_context(&*conn, Post::page_for_group(&*conn, &group, page.limits())?)?;

    Ok(Template::render(
        "groups/details",
        json!({
            "account": account,
            "group": group,
            "posts": posts,
            "page": *page,
            "n_pages": n_pages,
        }),
    ))
}
