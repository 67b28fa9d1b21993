#[macro_use]
extern crate diesel;
#[macro_use]
extern crate diesel_migrations;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate serde_derive;

#[cfg(all(feature = "sqlite", feature = "postgres"))]
compile_error!("Either feature \"postgres\" or \"sqlite\" must be enabled for this crate, not both.");

#[cfg(all(not(feature = "sqlite"), not(feature = "postgres")))]
compile_error!("Either feature \"postgres\" or \"sqlite\" must be enabled for this crate.");

#[cfg(all(feature = "postgres", not(feature = "sqlite")))]
pub type Connection = diesel::PgConnection;

#[cfg(all(feature = "sqlite", not(feature = "postgres")))]
pub type Connection = diesel::SqliteConnection;

#[cfg(all(feature = "postgres", not(feature = "sqlite")))]
embed_migrations!("migrations/postgres");

#[cfg(all(feature = "sqlite", not(feature = "postgres")))]
embed_migrations!("migrations/sqlite");

/// All the possible errors that can be encountered in this crate
#[derive(Debug)]
pub enum Error {
    Db(diesel::result::Error),
    Hash,
    InvalidImage,
    Io(std::io::Error),
    NotFound,
}

impl From<diesel::result::Error> for Error {
    fn from(err: diesel::result::Error) -> Self {
        Error::Db(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<bcrypt::BcryptError> for Error {
    fn from(_: bcrypt::BcryptError) -> Self {
        Error::Hash
    }
}

impl From<image::ImageError> for Error {
    fn from(_: image::ImageError) -> Self {
        Error::InvalidImage
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Adds a function to a model, that returns the first
/// record matching the given columns
macro_rules! find_by {
    ($table:ident, $fn:ident, $($col:ident as $type:ty),+) => {
        /// Try to find a $table with a given $col
        pub fn $fn(conn: &crate::Connection, $($col: $type),+) -> Result<Self> {
            $table::table
                $(.filter($table::$col.eq($col)))+
                .first(conn)
                .map_err(Error::from)
        }
    };
}

/// Adds a function to a model, that returns the most recent record
macro_rules! last {
    ($table:ident) => {
        #[allow(dead_code)]
        pub fn last(conn: &crate::Connection) -> Result<Self> {
            $table::table
                .order_by($table::id.desc())
                .first(conn)
                .map_err(Error::from)
        }
    };
}

/// Adds a function to a model to retrieve a record by its id
macro_rules! get {
    ($table:ident) => {
        pub fn get(conn: &crate::Connection, id: i32) -> Result<Self> {
            $table::table
                .filter($table::id.eq(id))
                .first(conn)
                .map_err(Error::from)
        }
    };
}

/// Adds a function to a model to insert a new row
///
/// The SQLite backend has no `RETURNING`, so the inserted row is
/// re-read with `last`.
macro_rules! insert {
    ($table:ident, $from:ty) => {
        last!($table);

        pub fn insert(conn: &crate::Connection, new: $from) -> Result<Self> {
            diesel::insert_into($table::table)
                .values(new)
                .execute(conn)?;
            Self::last(conn)
        }
    };
}

lazy_static! {
    pub static ref CONFIG: config::Config = config::Config::new();
}

pub fn run_migrations(conn: &Connection) -> std::result::Result<(), diesel_migrations::RunMigrationsError> {
    embedded_migrations::run_with_output(conn, &mut std::io::stdout())
}

pub mod comments;
pub mod config;
pub mod db_conn;
pub mod follows;
pub mod groups;
pub mod medias;
pub mod posts;
pub mod schema;
pub mod users;

#[cfg(test)]
pub(crate) mod tests {
    use crate::{db_conn, CONFIG};
    use diesel::r2d2::ConnectionManager;

    lazy_static! {
        static ref DB_POOL: db_conn::DbPool = {
            let pool = db_conn::DbPool::builder()
                .connection_customizer(Box::new(db_conn::PragmaForeignKey))
                .build(ConnectionManager::new(CONFIG.database_url.as_str()))
                .expect("tests: database connection error");
            let conn = pool.get().expect("tests: couldn't get a connection");
            crate::embedded_migrations::run(&*conn).expect("tests: migration error");
            pool
        };
    }

    pub fn db() -> db_conn::DbConn {
        db_conn::DbConn((*DB_POOL).get().unwrap())
    }
}
