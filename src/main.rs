#![feature(proc_macro_hygiene, decl_macro)]

#[macro_use]
extern crate rocket;

use diesel::r2d2::ConnectionManager;
use rocket_contrib::templates::Template;
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use yatube_models::{
    db_conn::{DbPool, PragmaForeignKey},
    Connection, CONFIG,
};

mod cache;
mod routes;
mod utils;

/// Initializes a database pool.
fn init_pool() -> Option<DbPool> {
    let manager = ConnectionManager::<Connection>::new(CONFIG.database_url.as_str());
    let mut builder = DbPool::builder().connection_customizer(Box::new(PragmaForeignKey));
    if let Some(max_size) = CONFIG.db_max_size {
        builder = builder.max_size(max_size);
    }
    if let Some(min_idle) = CONFIG.db_min_idle {
        builder = builder.min_idle(Some(min_idle));
    }
    builder.build(manager).ok()
}

fn init_logger() {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("main: couldn't initialize logger");
}

fn main() {
    match dotenv::dotenv() {
        Ok(path) => eprintln!("Configuration read from {}", path.display()),
        Err(ref e) if e.not_found() => eprintln!("no .env was found"),
        e => e.map(|_| ()).unwrap(),
    }
    init_logger();

    let pool = init_pool().expect("main: database pool initialization error");
    let rocket_config = CONFIG
        .rocket
        .clone()
        .expect("main: error building the Rocket config, please check your environment");

    rocket::custom(rocket_config)
        .mount(
            "/",
            routes![
                routes::posts::index,
                routes::posts::new,
                routes::posts::new_auth,
                routes::posts::create,
                routes::posts::create_auth,
                routes::posts::details,
                routes::posts::edit,
                routes::posts::edit_auth,
                routes::posts::update,
                routes::posts::update_auth,
                routes::groups::details,
                routes::comments::create,
                routes::comments::create_auth,
                routes::timelines::feed,
                routes::timelines::feed_auth,
                routes::user::details,
                routes::user::follow,
                routes::user::follow_auth,
                routes::user::unfollow,
                routes::user::unfollow_auth,
                routes::session::new,
                routes::session::create,
                routes::session::delete,
                routes::static_files,
            ],
        )
        .register(catchers![
            routes::errors::not_found,
            routes::errors::server_error
        ])
        .manage(pool)
        .manage(cache::PageCache::new(cache::INDEX_CACHE_TTL))
        .attach(Template::fairing())
        .launch();
}
