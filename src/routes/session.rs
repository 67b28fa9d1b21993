use rocket::{
    http::{Cookie, Cookies},
    request::{FlashMessage, LenientForm},
    response::Redirect,
};
use rocket_contrib::templates::Template;
use serde_json::json;

use crate::routes::RespondOrRedirect;
use yatube_models::{
    db_conn::DbConn,
    users::{User, AUTH_COOKIE},
};

#[get("/login?<m>")]
pub fn new(m: Option<String>, account: Option<User>) -> Template {
    Template::render(
        "session/login",
        json!({
            "account": account,
            "message": m,
        }),
    )
}

#[derive(FromForm)]
pub struct LoginForm {
    pub email_or_name: String,
    pub password: String,
}

#[post("/login", data = "<form>")]
pub fn create(
    conn: DbConn,
    form: LenientForm<LoginForm>,
    flash: Option<FlashMessage<'_, '_>>,
    mut cookies: Cookies<'_>,
) -> RespondOrRedirect {
    match User::login(&*conn, &form.email_or_name, &form.password) {
        Ok(user) => {
            cookies.add_private(Cookie::new(AUTH_COOKIE, user.id.to_string()));
            // take the user back to the page that sent them here
            let destination = flash
                .filter(|flash| flash.name() == "callback")
                .map(|flash| flash.msg().to_owned())
                .unwrap_or_else(|| "/".to_owned());
            Redirect::to(destination).into()
        }
        Err(_) => Template::render(
            "session/login",
            json!({
                "account": null,
                "message": "Invalid username, email, or password",
                "email_or_name": form.email_or_name,
            }),
        )
        .into(),
    }
}

#[get("/logout")]
pub fn delete(mut cookies: Cookies<'_>) -> Redirect {
    if let Some(cookie) = cookies.get_private(AUTH_COOKIE) {
        cookies.remove_private(cookie);
    }
    Redirect::to("/")
}
