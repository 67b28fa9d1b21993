use multipart::server::{
    save::{SaveResult, SavedData},
    Multipart,
};
use rocket::{
    http::ContentType,
    response::{Flash, Redirect},
    Data, State,
};
use rocket_contrib::templates::Template;
use serde::Serialize;
use serde_json::json;
use std::fs;
use validator::Validate;

use crate::cache::PageCache;
use crate::routes::{
    errors::ErrorPage, posts_context, validation_messages, Page, RespondOrRedirect,
};
use crate::utils::requires_login;
use yatube_models::{
    comments::Comment,
    db_conn::DbConn,
    groups::Group,
    medias,
    posts::{NewPost, Post},
    users::User,
    Connection, Result,
};

/// The message shown when an upload doesn't decode as an image.
const INVALID_IMAGE_MSG: &str =
    "Upload a valid image. The file you uploaded was either not an image or a corrupted image.";

#[derive(Default, Serialize, Validate)]
pub struct PostForm {
    #[validate(length(min = 1, message = "This field is required."))]
    pub text: String,
    pub group: Option<i32>,
}

/// A parsed `multipart/form-data` post submission: the text fields plus
/// the raw image part, if one was sent.
pub struct PostUpload {
    pub form: PostForm,
    pub image: Option<(Vec<u8>, Option<String>)>,
}

fn read_text(data: &SavedData) -> Option<String> {
    match data {
        SavedData::Text(text) => Some(text.clone()),
        SavedData::Bytes(bytes) => String::from_utf8(bytes.clone()).ok(),
        SavedData::File(..) => None,
    }
}

fn parse_upload(ct: &ContentType, data: Data) -> Option<PostUpload> {
    if !ct.is_form_data() {
        return None;
    }
    let (_, boundary) = ct.params().find(|&(k, _)| k == "boundary")?;

    let entries = match Multipart::with_body(data.open(), boundary).save().temp() {
        SaveResult::Full(entries) => entries,
        SaveResult::Partial(_, _) | SaveResult::Error(_) => return None,
    };
    let fields = entries.fields;

    let text = fields
        .get("text")
        .and_then(|fields| fields.first())
        .and_then(|field| read_text(&field.data))
        .unwrap_or_default();
    let group = fields
        .get("group")
        .and_then(|fields| fields.first())
        .and_then(|field| read_text(&field.data))
        .and_then(|value| value.parse::<i32>().ok());
    let image = fields.get("image").and_then(|fields| fields.first()).and_then(|field| {
        let bytes = match &field.data {
            SavedData::Bytes(bytes) => bytes.clone(),
            SavedData::File(path, _) => fs::read(path).ok()?,
            SavedData::Text(text) => text.clone().into_bytes(),
        };
        // browsers send an empty part when no file was chosen
        if bytes.is_empty() {
            None
        } else {
            Some((bytes, field.headers.filename.clone()))
        }
    });

    Some(PostUpload {
        form: PostForm { text, group },
        image,
    })
}

/// Validates a submission without persisting anything.
fn check_upload(
    conn: &Connection,
    upload: &PostUpload,
) -> serde_json::Map<String, serde_json::Value> {
    let mut errors = match upload.form.validate() {
        Ok(()) => serde_json::Map::new(),
        Err(errors) => validation_messages(&errors),
    };
    if let Some(group_id) = upload.form.group {
        if Group::get(conn, group_id).is_err() {
            errors.insert(
                "group".to_owned(),
                json!(["Select a valid group. That choice does not exist."]),
            );
        }
    }
    if let Some((bytes, _)) = &upload.image {
        if medias::check_image(bytes).is_err() {
            errors.insert("image".to_owned(), json!([INVALID_IMAGE_MSG]));
        }
    }
    errors
}

#[get("/?<page>")]
pub fn index(
    conn: DbConn,
    page: Option<Page>,
    cache: State<'_, PageCache>,
    account: Option<User>,
) -> std::result::Result<Template, ErrorPage> {
    let page = page.unwrap_or_default();
    let key = format!("/?page={}", *page);
    let mut context = match cache.get(&key) {
        Some(context) => context,
        None => {
            let posts = Post::page(&*conn, page.limits())?;
            let context = json!({
                "posts": posts_context(&*conn, posts)?,
                "page": *page,
                "n_pages": Page::total(Post::count(&*conn)? as i32),
            });
            cache.store(key, context.clone());
            context
        }
    };
    // the signed-in account is per-request, it must not come from the cache
    context["account"] = json!(account);
    Ok(Template::render("posts/index", context))
}

#[get("/new")]
pub fn new(user: User, conn: DbConn) -> std::result::Result<Template, ErrorPage> {
    Ok(Template::render(
        "posts/new",
        json!({
            "account": user,
            "is_edit": false,
            "form": PostForm::default(),
            "errors": {},
            "groups": Group::list(&*conn)?,
        }),
    ))
}

#[get("/new", rank = 2)]
pub fn new_auth() -> Flash<Redirect> {
    requires_login("You need to be logged in order to publish a post", "/new")
}

#[post("/new", data = "<data>")]
pub fn create(
    ct: &ContentType,
    data: Data,
    user: User,
    conn: DbConn,
) -> std::result::Result<RespondOrRedirect, ErrorPage> {
    let upload = match parse_upload(ct, data) {
        Some(upload) => upload,
        None => return Ok(Redirect::to("/new").into()),
    };

    let errors = check_upload(&*conn, &upload);
    if !errors.is_empty() {
        return Ok(Template::render(
            "posts/new",
            json!({
                "account": user,
                "is_edit": false,
                "form": upload.form,
                "errors": errors,
                "groups": Group::list(&*conn)?,
            }),
        )
        .into());
    }

    let image = match upload.image {
        Some((bytes, filename)) => Some(medias::save_image(&bytes, filename.as_deref())?),
        None => None,
    };
    Post::insert(
        &*conn,
        NewPost {
            text: upload.form.text,
            author_id: user.id,
            group_id: upload.form.group,
            image,
        },
    )?;
    Ok(Redirect::to("/").into())
}

#[post("/new", rank = 2)]
pub fn create_auth() -> Flash<Redirect> {
    requires_login("You need to be logged in order to publish a post", "/new")
}

pub(crate) fn details_context(
    conn: &Connection,
    name: &str,
    post_id: i32,
    account: &Option<User>,
    comment_errors: Option<serde_json::Map<String, serde_json::Value>>,
) -> Result<serde_json::Value> {
    let author = User::find_by_name(conn, name)?;
    let post = Post::find_for_author(conn, &author, post_id)?;
    let group = post.get_group(conn)?;
    let comments = Comment::list_by_post(conn, post.id)?;
    let mut rendered_comments = Vec::with_capacity(comments.len());
    for comment in comments {
        let comment_author = comment.get_author(conn)?;
        rendered_comments.push(json!({ "comment": comment, "author": comment_author }));
    }

    Ok(json!({
        "account": account,
        "author": author,
        "n_posts": Post::count_for_author(conn, &author)?,
        "post": post,
        "group": group,
        "comments": rendered_comments,
        "comment_errors": comment_errors.unwrap_or_default(),
    }))
}

#[get("/<name>/<post_id>", rank = 3)]
pub fn details(
    name: String,
    post_id: i32,
    conn: DbConn,
    account: Option<User>,
) -> std::result::Result<Template, ErrorPage> {
    let context = details_context(&*conn, &name, post_id, &account, None)?;
    Ok(Template::render("posts/details", context))
}

#[get("/<name>/<post_id>/edit")]
pub fn edit(
    name: String,
    post_id: i32,
    user: User,
    conn: DbConn,
) -> std::result::Result<RespondOrRedirect, ErrorPage> {
    let author = User::find_by_name(&*conn, &name)?;
    let post = Post::find_for_author(&*conn, &author, post_id)?;
    // only the author may edit, everyone else is sent back to the post
    if post.author_id != user.id {
        return Ok(Redirect::to(format!("/{}/{}", name, post_id)).into());
    }

    let form = PostForm {
        text: post.text.clone(),
        group: post.group_id,
    };
    Ok(Template::render(
        "posts/new",
        json!({
            "account": user,
            "is_edit": true,
            "post": post,
            "form": form,
            "errors": {},
            "groups": Group::list(&*conn)?,
        }),
    )
    .into())
}

#[get("/<name>/<post_id>/edit", rank = 2)]
pub fn edit_auth(name: String, post_id: i32) -> Flash<Redirect> {
    requires_login(
        "You need to be logged in order to edit a post",
        &format!("/{}/{}/edit", name, post_id),
    )
}

#[post("/<name>/<post_id>/edit", data = "<data>")]
pub fn update(
    name: String,
    post_id: i32,
    ct: &ContentType,
    data: Data,
    user: User,
    conn: DbConn,
) -> std::result::Result<RespondOrRedirect, ErrorPage> {
    let author = User::find_by_name(&*conn, &name)?;
    let mut post = Post::find_for_author(&*conn, &author, post_id)?;
    if post.author_id != user.id {
        return Ok(Redirect::to(format!("/{}/{}", name, post_id)).into());
    }

    let upload = match parse_upload(ct, data) {
        Some(upload) => upload,
        None => return Ok(Redirect::to(format!("/{}/{}/edit", name, post_id)).into()),
    };

    let errors = check_upload(&*conn, &upload);
    if !errors.is_empty() {
        return Ok(Template::render(
            "posts/new",
            json!({
                "account": user,
                "is_edit": true,
                "post": post,
                "form": upload.form,
                "errors": errors,
                "groups": Group::list(&*conn)?,
            }),
        )
        .into());
    }

    post.text = upload.form.text;
    post.group_id = upload.form.group;
    if let Some((bytes, filename)) = upload.image {
        post.image = Some(medias::save_image(&bytes, filename.as_deref())?);
    }
    post.update(&*conn)?;

    Ok(Redirect::to(format!("/{}/{}", name, post_id)).into())
}

#[post("/<name>/<post_id>/edit", rank = 2)]
pub fn update_auth(name: String, post_id: i32) -> Flash<Redirect> {
    requires_login(
        "You need to be logged in order to edit a post",
        &format!("/{}/{}/edit", name, post_id),
    )
}

#[cfg(test)]
mod tests {
    use super::PostForm;
    use validator::Validate;

    #[test]
    fn text_is_required() {
        let form = PostForm {
            text: String::new(),
            group: None,
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("text"));

        let form = PostForm {
            text: "TestText".to_owned(),
            group: Some(1),
        };
        assert!(form.validate().is_ok());
    }
}
