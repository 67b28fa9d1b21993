use crate::{posts::Post, schema::comments, users::User, Connection, Error, Result};
use chrono::NaiveDateTime;
use diesel::{ExpressionMethods, QueryDsl, RunQueryDsl};

#[derive(Queryable, Identifiable, Clone, Debug, PartialEq, Serialize)]
pub struct Comment {
    pub id: i32,
    pub text: String,
    pub created: NaiveDateTime,
    pub post_id: i32,
    pub author_id: i32,
}

#[derive(Insertable)]
#[table_name = "comments"]
pub struct NewComment {
    pub text: String,
    pub post_id: i32,
    pub author_id: i32,
}

impl Comment {
    insert!(comments, NewComment);
    get!(comments);

    pub fn list_by_post(conn: &Connection, post_id: i32) -> Result<Vec<Comment>> {
        comments::table
            .filter(comments::post_id.eq(post_id))
            .order((comments::created.desc(), comments::id.desc()))
            .load::<Comment>(conn)
            .map_err(Error::from)
    }

    pub fn get_author(&self, conn: &Connection) -> Result<User> {
        User::get(conn, self.author_id)
    }

    pub fn get_post(&self, conn: &Connection) -> Result<Post> {
        Post::get(conn, self.post_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::posts::tests as post_tests;
    use crate::tests::db;
    use diesel::Connection;

    #[test]
    fn list_by_post_is_newest_first() {
        let conn = &db();
        conn.test_transaction::<_, (), _>(|| {
            let (posts, users, _groups) = post_tests::fill_database(conn);

            let first = Comment::insert(
                conn,
                NewComment {
                    text: "Looks delicious".to_owned(),
                    post_id: posts[1].id,
                    author_id: users[0].id,
                },
            )
            .unwrap();
            let second = Comment::insert(
                conn,
                NewComment {
                    text: "Tried it, can confirm".to_owned(),
                    post_id: posts[1].id,
                    author_id: users[2].id,
                },
            )
            .unwrap();
            Comment::insert(
                conn,
                NewComment {
                    text: "Unrelated".to_owned(),
                    post_id: posts[0].id,
                    author_id: users[2].id,
                },
            )
            .unwrap();

            let comments = Comment::list_by_post(conn, posts[1].id).unwrap();
            assert_eq!(
                comments.iter().map(|c| c.id).collect::<Vec<_>>(),
                vec![second.id, first.id]
            );

            Ok(())
        });
    }

    #[test]
    fn deleting_post_deletes_comments() {
        let conn = &db();
        conn.test_transaction::<_, (), _>(|| {
            let (posts, users, _groups) = post_tests::fill_database(conn);

            let comment = Comment::insert(
                conn,
                NewComment {
                    text: "Gone soon".to_owned(),
                    post_id: posts[0].id,
                    author_id: users[1].id,
                },
            )
            .unwrap();

            posts[0].delete(conn).unwrap();
            assert!(Comment::get(conn, comment.id).is_err());

            Ok(())
        });
    }
}
