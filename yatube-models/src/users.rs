use crate::{db_conn::DbConn, schema::users, Connection, Error, Result};
use chrono::NaiveDateTime;
use diesel::{self, ExpressionMethods, QueryDsl, RunQueryDsl};
use rocket::{
    outcome::IntoOutcome,
    request::{self, FromRequest},
    Request,
};

pub const AUTH_COOKIE: &str = "user_id";

#[derive(Queryable, Identifiable, Clone, Debug, Serialize)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub creation_date: NaiveDateTime,
}

#[derive(Insertable)]
#[table_name = "users"]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub hashed_password: String,
}

impl User {
    insert!(users, NewUser);
    get!(users);
    find_by!(users, find_by_name, username as &str);
    find_by!(users, find_by_email, email as &str);

    pub fn hash_pass(pass: &str) -> Result<String> {
        bcrypt::hash(pass, 10).map_err(Error::from)
    }

    pub fn login(conn: &Connection, ident: &str, password: &str) -> Result<User> {
        let user = User::find_by_email(conn, ident).or_else(|_| User::find_by_name(conn, ident));

        match user {
            Ok(user) => {
                if bcrypt::verify(password, &user.hashed_password).unwrap_or(false) {
                    Ok(user)
                } else {
                    Err(Error::NotFound)
                }
            }
            Err(e) => {
                // fake-verify a password anyway, to keep timing consistent
                // between "unknown user" and "wrong password"
                if let Ok(other) = User::get(conn, 1) {
                    let _ = bcrypt::verify(password, &other.hashed_password);
                }
                Err(e)
            }
        }
    }

    pub fn is_following(&self, conn: &Connection, other_id: i32) -> Result<bool> {
        use crate::schema::follows;
        follows::table
            .filter(follows::user_id.eq(self.id))
            .filter(follows::author_id.eq(other_id))
            .count()
            .get_result::<i64>(conn)
            .map(|n| n > 0)
            .map_err(Error::from)
    }

    pub fn delete(&self, conn: &Connection) -> Result<()> {
        diesel::delete(self).execute(conn)?;
        Ok(())
    }
}

impl NewUser {
    pub fn new_local(
        conn: &Connection,
        username: String,
        email: String,
        password: &str,
    ) -> Result<User> {
        User::insert(
            conn,
            NewUser {
                username,
                email,
                hashed_password: User::hash_pass(password)?,
            },
        )
    }
}

impl<'a, 'r> FromRequest<'a, 'r> for User {
    type Error = ();

    fn from_request(request: &'a Request<'r>) -> request::Outcome<User, ()> {
        let conn = request.guard::<DbConn>()?;
        request
            .cookies()
            .get_private(AUTH_COOKIE)
            .and_then(|cookie| cookie.value().parse().ok())
            .and_then(|id| User::get(&*conn, id).ok())
            .or_forward(())
    }
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for User {}
