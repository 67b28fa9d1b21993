use crate::{schema::follows, users::User, Connection, Error, Result};
use chrono::NaiveDateTime;
use diesel::{self, ExpressionMethods, QueryDsl, RunQueryDsl};

#[derive(Queryable, Identifiable, Associations, Clone, Debug, PartialEq)]
#[belongs_to(User, foreign_key = "author_id")]
pub struct Follow {
    pub id: i32,
    pub user_id: i32,
    pub author_id: i32,
    pub created: NaiveDateTime,
}

#[derive(Insertable)]
#[table_name = "follows"]
pub struct NewFollow {
    pub user_id: i32,
    pub author_id: i32,
}

impl Follow {
    insert!(follows, NewFollow);
    get!(follows);

    pub fn find(conn: &Connection, user_id: i32, author_id: i32) -> Result<Follow> {
        follows::table
            .filter(follows::user_id.eq(user_id))
            .filter(follows::author_id.eq(author_id))
            .first(conn)
            .map_err(Error::from)
    }

    /// Subscriptions of `user_id`, newest first.
    pub fn list_for_user(conn: &Connection, user_id: i32) -> Result<Vec<Follow>> {
        follows::table
            .filter(follows::user_id.eq(user_id))
            .order((follows::created.desc(), follows::id.desc()))
            .load::<Follow>(conn)
            .map_err(Error::from)
    }

    pub fn delete(&self, conn: &Connection) -> Result<()> {
        diesel::delete(self).execute(conn)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::db;
    use crate::users::tests as user_tests;
    use diesel::Connection;

    #[test]
    fn find_insert_delete() {
        let conn = &db();
        conn.test_transaction::<_, (), _>(|| {
            let users = user_tests::fill_database(conn);

            assert!(Follow::find(conn, users[0].id, users[1].id).is_err());

            let follow = Follow::insert(
                conn,
                NewFollow {
                    user_id: users[0].id,
                    author_id: users[1].id,
                },
            )
            .unwrap();
            assert_eq!(follow, Follow::find(conn, users[0].id, users[1].id).unwrap());
            assert!(users[0].is_following(conn, users[1].id).unwrap());
            // the edge is directed
            assert!(!users[1].is_following(conn, users[0].id).unwrap());

            follow.delete(conn).unwrap();
            assert!(Follow::find(conn, users[0].id, users[1].id).is_err());

            Ok(())
        });
    }

    #[test]
    fn pairs_are_unique() {
        let conn = &db();
        conn.test_transaction::<_, (), _>(|| {
            let users = user_tests::fill_database(conn);

            Follow::insert(
                conn,
                NewFollow {
                    user_id: users[0].id,
                    author_id: users[1].id,
                },
            )
            .unwrap();
            assert!(Follow::insert(
                conn,
                NewFollow {
                    user_id: users[0].id,
                    author_id: users[1].id,
                },
            )
            .is_err());

            Ok(())
        });
    }

    #[test]
    fn list_for_user() {
        let conn = &db();
        conn.test_transaction::<_, (), _>(|| {
            let users = user_tests::fill_database(conn);

            let first = Follow::insert(
                conn,
                NewFollow {
                    user_id: users[0].id,
                    author_id: users[1].id,
                },
            )
            .unwrap();
            let second = Follow::insert(
                conn,
                NewFollow {
                    user_id: users[0].id,
                    author_id: users[2].id,
                },
            )
            .unwrap();

            let follows = Follow::list_for_user(conn, users[0].id).unwrap();
            assert_eq!(
                follows.iter().map(|f| f.id).collect::<Vec<_>>(),
                vec![second.id, first.id]
            );

            Ok(())
        });
    }

    #[test]
    fn deleting_user_deletes_follows() {
        let conn = &db();
        conn.test_transaction::<_, (), _>(|| {
            let users = user_tests::fill_database(conn);

            let follow = Follow::insert(
                conn,
                NewFollow {
                    user_id: users[0].id,
                    author_id: users[1].id,
                },
            )
            .unwrap();

            users[1].delete(conn).unwrap();
            assert!(Follow::get(conn, follow.id).is_err());

            Ok(())
        });
    }
}
