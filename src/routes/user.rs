use rocket::response::{Flash, Redirect};
use rocket_contrib::templates::Template;
use serde_json::json;

use crate::routes::{errors::ErrorPage, posts_context, Page};
use crate::utils::requires_login;
use yatube_models::{
    db_conn::DbConn,
    follows::{Follow, NewFollow},
    posts::Post,
    users::User,
};

#[get("/<name>?<page>", rank = 3)]
pub fn details(
    name: String,
    page: Option<Page>,
    conn: DbConn,
    account: Option<User>,
) -> Result<Template, ErrorPage> {
    let page = page.unwrap_or_default();
    let author = User::find_by_name(&*conn, &name)?;
    let following = match &account {
        Some(account) => account.is_following(&*conn, author.id)?,
        None => false,
    };
    let n_posts = Post::count_for_author(&*conn, &author)?;
    let posts = posts_context(&*conn, Post::page_for_author(&*conn, &author, page.limits())?)?;

    Ok(Template::render(
        "users/details",
        json!({
            "account": account,
            "author": author,
            "following": following,
            "posts": posts,
            "n_posts": n_posts,
            "page": *page,
            "n_pages": Page::total(n_posts as i32),
        }),
    ))
}

#[get("/<name>/follow")]
pub fn follow(name: String, user: User, conn: DbConn) -> Result<Redirect, ErrorPage> {
    let target = User::find_by_name(&*conn, &name)?;
    // following yourself or someone twice is a no-op
    if user.id != target.id && Follow::find(&*conn, user.id, target.id).is_err() {
        Follow::insert(
            &*conn,
            NewFollow {
                user_id: user.id,
                author_id: target.id,
            },
        )?;
    }
    Ok(Redirect::to(format!("/{}", target.username)))
}

#[get("/<name>/follow", rank = 2)]
pub fn follow_auth(name: String) -> Flash<Redirect> {
    requires_login(
        "You need to be logged in order to follow someone",
        &format!("/{}/follow", name),
    )
}

#[get("/<name>/unfollow")]
pub fn unfollow(name: String, user: User, conn: DbConn) -> Result<Redirect, ErrorPage> {
    let target = User::find_by_name(&*conn, &name)?;
    if user.id != target.id {
        if let Ok(follow) = Follow::find(&*conn, user.id, target.id) {
            follow.delete(&*conn)?;
        }
    }
    Ok(Redirect::to(format!("/{}", target.username)))
}

#[get("/<name>/unfollow", rank = 2)]
pub fn unfollow_auth(name: String) -> Flash<Redirect> {
    requires_login(
        "You need to be logged in order to unfollow someone",
        &format!("/{}/unfollow", name),
    )
}
