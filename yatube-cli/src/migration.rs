use clap::{App, ArgMatches, SubCommand};
use yatube_models::Connection;

pub fn command<'a, 'b>() -> App<'a, 'b> {
    SubCommand::with_name("migration")
        .about("Manage migrations")
        .subcommand(SubCommand::with_name("run").about("Run pending migrations"))
}

pub fn run<'a>(args: &ArgMatches<'a>, conn: &Connection) {
    match args.subcommand() {
        ("run", Some(x)) => run_(x, conn),
        ("", None) => command().print_help().unwrap(),
        _ => println!("Unknown subcommand"),
    }
}

fn run_<'a>(_args: &ArgMatches<'a>, conn: &Connection) {
    yatube_models::run_migrations(conn).expect("Failed to run migrations");
}
