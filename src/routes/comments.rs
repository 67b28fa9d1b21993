use rocket::{
    request::LenientForm,
    response::{Flash, Redirect},
};
use rocket_contrib::templates::Template;
use serde::Serialize;
use validator::Validate;

use crate::routes::{errors::ErrorPage, posts, validation_messages, RespondOrRedirect};
use crate::utils::requires_login;
use yatube_models::{
    comments::{Comment, NewComment},
    db_conn::DbConn,
    posts::Post,
    users::User,
};

#[derive(FromForm, Serialize, Validate)]
pub struct NewCommentForm {
    #[validate(length(min = 1, message = "This field is required."))]
    pub text: String,
}

#[post("/<name>/<post_id>/comment", data = "<form>")]
pub fn create(
    name: String,
    post_id: i32,
    form: LenientForm<NewCommentForm>,
    user: User,
    conn: DbConn,
) -> Result<RespondOrRedirect, ErrorPage> {
    let author = User::find_by_name(&*conn, &name)?;
    let post = Post::find_for_author(&*conn, &author, post_id)?;

    if let Err(errors) = form.validate() {
        let context = posts::details_context(
            &*conn,
            &name,
            post_id,
            &Some(user),
            Some(validation_messages(&errors)),
        )?;
        return Ok(Template::render("posts/details", context).into());
    }

    Comment::insert(
        &*conn,
        NewComment {
            text: form.text.clone(),
            post_id: post.id,
            author_id: user.id,
        },
    )?;
    Ok(Redirect::to(format!("/{}/{}", name, post_id)).into())
}

#[post("/<name>/<post_id>/comment", rank = 2)]
pub fn create_auth(name: String, post_id: i32) -> Flash<Redirect> {
    requires_login(
        "You need to be logged in order to comment",
        &format!("/{}/{}", name, post_id),
    )
}
