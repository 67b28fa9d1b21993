use crate::{groups::Group, schema::posts, users::User, Connection, Error, Result};
use chrono::NaiveDateTime;
use diesel::{self, ExpressionMethods, QueryDsl, RunQueryDsl};

#[derive(Queryable, Identifiable, AsChangeset, Clone, Debug, PartialEq, Serialize)]
#[changeset_options(treat_none_as_null = "true")]
pub struct Post {
    pub id: i32,
    pub text: String,
    pub pub_date: NaiveDateTime,
    pub author_id: i32,
    pub group_id: Option<i32>,
    pub image: Option<String>,
}

#[derive(Insertable)]
#[table_name = "posts"]
pub struct NewPost {
    pub text: String,
    pub author_id: i32,
    pub group_id: Option<i32>,
    pub image: Option<String>,
}

impl Post {
    insert!(posts, NewPost);
    get!(posts);

    /// One page of all posts, newest first. `pub_date` has second
    /// precision, so `id` breaks ties between posts saved together.
    pub fn page(conn: &Connection, (min, max): (i32, i32)) -> Result<Vec<Post>> {
        posts::table
            .order((posts::pub_date.desc(), posts::id.desc()))
            .offset(min.into())
            .limit((max - min).into())
            .load::<Post>(conn)
            .map_err(Error::from)
    }

    pub fn count(conn: &Connection) -> Result<i64> {
        posts::table.count().get_result(conn).map_err(Error::from)
    }

    pub fn page_for_author(
        conn: &Connection,
        author: &User,
        (min, max): (i32, i32),
    ) -> Result<Vec<Post>> {
        posts::table
            .filter(posts::author_id.eq(author.id))
            .order((posts::pub_date.desc(), posts::id.desc()))
            .offset(min.into())
            .limit((max - min).into())
            .load::<Post>(conn)
            .map_err(Error::from)
    }

    pub fn count_for_author(conn: &Connection, author: &User) -> Result<i64> {
        posts::table
            .filter(posts::author_id.eq(author.id))
            .count()
            .get_result(conn)
            .map_err(Error::from)
    }

    pub fn page_for_group(
        conn: &Connection,
        group: &Group,
        (min, max): (i32, i32),
    ) -> Result<Vec<Post>> {
        posts::table
            .filter(posts::group_id.eq(group.id))
            .order((posts::pub_date.desc(), posts::id.desc()))
            .offset(min.into())
            .limit((max - min).into())
            .load::<Post>(conn)
            .map_err(Error::from)
    }

    pub fn count_for_group(conn: &Connection, group: &Group) -> Result<i64> {
        posts::table
            .filter(posts::group_id.eq(group.id))
            .count()
            .get_result(conn)
            .map_err(Error::from)
    }

    /// One page of the personal feed: posts whose author is followed by
    /// `user`, newest first.
    pub fn feed_page(
        conn: &Connection,
        user: &User,
        (min, max): (i32, i32),
    ) -> Result<Vec<Post>> {
        use crate::schema::follows;

        let followed = follows::table
            .filter(follows::user_id.eq(user.id))
            .select(follows::author_id);
        posts::table
            .filter(posts::author_id.eq_any(followed))
            .order((posts::pub_date.desc(), posts::id.desc()))
            .offset(min.into())
            .limit((max - min).into())
            .load::<Post>(conn)
            .map_err(Error::from)
    }

    pub fn count_for_feed(conn: &Connection, user: &User) -> Result<i64> {
        use crate::schema::follows;

        let followed = follows::table
            .filter(follows::user_id.eq(user.id))
            .select(follows::author_id);
        posts::table
            .filter(posts::author_id.eq_any(followed))
            .count()
            .get_result(conn)
            .map_err(Error::from)
    }

    /// A post looked up together with its author, so that
    /// `/<username>/<post_id>` is a 404 when the two don't match.
    pub fn find_for_author(conn: &Connection, author: &User, id: i32) -> Result<Post> {
        posts::table
            .filter(posts::id.eq(id))
            .filter(posts::author_id.eq(author.id))
            .first(conn)
            .map_err(Error::from)
    }

    pub fn update(&self, conn: &Connection) -> Result<Post> {
        diesel::update(self).set(self).execute(conn)?;
        Post::get(conn, self.id)
    }

    pub fn delete(&self, conn: &Connection) -> Result<()> {
        diesel::delete(self).execute(conn)?;
        Ok(())
    }

    pub fn get_author(&self, conn: &Connection) -> Result<User> {
        User::get(conn, self.author_id)
    }

    pub fn get_group(&self, conn: &Connection) -> Result<Option<Group>> {
        self.group_id
            .map(|id| Group::get(conn, id))
            .transpose()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::follows::{Follow, NewFollow};
    use crate::tests::db;
    use crate::{groups::tests as group_tests, users::tests as user_tests};
    use diesel::Connection;

    pub(crate) fn fill_database(
        conn: &crate::Connection,
    ) -> (Vec<Post>, Vec<User>, Vec<Group>) {
        let users = user_tests::fill_database(conn);
        let groups = group_tests::fill_database(conn);
        let posts = vec![
            Post::insert(
                conn,
                NewPost {
                    text: "First!".to_owned(),
                    author_id: users[0].id,
                    group_id: None,
                    image: None,
                },
            )
            .unwrap(),
            Post::insert(
                conn,
                NewPost {
                    text: "A pie that always works".to_owned(),
                    author_id: users[1].id,
                    group_id: Some(groups[0].id),
                    image: None,
                },
            )
            .unwrap(),
            Post::insert(
                conn,
                NewPost {
                    text: "Three days in the mountains".to_owned(),
                    author_id: users[1].id,
                    group_id: Some(groups[1].id),
                    image: None,
                },
            )
            .unwrap(),
        ];
        (posts, users, groups)
    }

    #[test]
    fn pages_are_newest_first() {
        let conn = &db();
        conn.test_transaction::<_, (), _>(|| {
            let (posts, users, _groups) = fill_database(conn);

            let page = Post::page(conn, (0, 10)).unwrap();
            assert_eq!(
                page.iter().map(|p| p.id).collect::<Vec<_>>(),
                vec![posts[2].id, posts[1].id, posts[0].id]
            );
            assert_eq!(Post::count(conn).unwrap(), 3);

            let by_author = Post::page_for_author(conn, &users[1], (0, 10)).unwrap();
            assert_eq!(
                by_author.iter().map(|p| p.id).collect::<Vec<_>>(),
                vec![posts[2].id, posts[1].id]
            );

            // offset/limit follow the (min, max) convention
            let second = Post::page(conn, (1, 2)).unwrap();
            assert_eq!(
                second.iter().map(|p| p.id).collect::<Vec<_>>(),
                vec![posts[1].id]
            );

            Ok(())
        });
    }

    #[test]
    fn group_filtering() {
        let conn = &db();
        conn.test_transaction::<_, (), _>(|| {
            let (posts, _users, groups) = fill_database(conn);

            let cooking = Post::page_for_group(conn, &groups[0], (0, 10)).unwrap();
            assert_eq!(
                cooking.iter().map(|p| p.id).collect::<Vec<_>>(),
                vec![posts[1].id]
            );
            assert_eq!(Post::count_for_group(conn, &groups[0]).unwrap(), 1);

            Ok(())
        });
    }

    #[test]
    fn find_for_author() {
        let conn = &db();
        conn.test_transaction::<_, (), _>(|| {
            let (posts, users, _groups) = fill_database(conn);

            assert_eq!(
                posts[0],
                Post::find_for_author(conn, &users[0], posts[0].id).unwrap()
            );
            // posts[1] belongs to users[1], not users[0]
            assert!(Post::find_for_author(conn, &users[0], posts[1].id).is_err());

            Ok(())
        });
    }

    #[test]
    fn feed_only_contains_followed_authors() {
        let conn = &db();
        conn.test_transaction::<_, (), _>(|| {
            let (posts, users, _groups) = fill_database(conn);
            Follow::insert(
                conn,
                NewFollow {
                    user_id: users[2].id,
                    author_id: users[1].id,
                },
            )
            .unwrap();

            let feed = Post::feed_page(conn, &users[2], (0, 10)).unwrap();
            assert_eq!(
                feed.iter().map(|p| p.id).collect::<Vec<_>>(),
                vec![posts[2].id, posts[1].id]
            );
            assert!(feed.iter().all(|p| p.author_id == users[1].id));
            assert_eq!(Post::count_for_feed(conn, &users[2]).unwrap(), 2);

            // users[0] follows nobody
            assert!(Post::feed_page(conn, &users[0], (0, 10)).unwrap().is_empty());

            Ok(())
        });
    }

    #[test]
    fn update_can_clear_group() {
        let conn = &db();
        conn.test_transaction::<_, (), _>(|| {
            let (posts, _users, _groups) = fill_database(conn);

            let mut post = posts[1].clone();
            post.text = "A pie that almost always works".to_owned();
            post.group_id = None;
            post.update(conn).unwrap();

            let reloaded = Post::get(conn, post.id).unwrap();
            assert_eq!(reloaded.text, "A pie that almost always works");
            assert_eq!(reloaded.group_id, None);

            Ok(())
        });
    }

    #[test]
    fn deleting_author_deletes_posts() {
        let conn = &db();
        conn.test_transaction::<_, (), _>(|| {
            let (posts, users, _groups) = fill_database(conn);

            users[1].delete(conn).unwrap();
            assert!(Post::get(conn, posts[1].id).is_err());
            assert!(Post::get(conn, posts[0].id).is_ok());

            Ok(())
        });
    }

    #[test]
    fn deleting_group_keeps_posts() {
        let conn = &db();
        conn.test_transaction::<_, (), _>(|| {
            let (posts, _users, groups) = fill_database(conn);

            groups[0].delete(conn).unwrap();
            let post = Post::get(conn, posts[1].id).unwrap();
            assert_eq!(post.group_id, None);

            Ok(())
        });
    }
}
