use clap::{App, Arg, ArgMatches, SubCommand};
use yatube_models::{groups::*, Connection};

pub fn command<'a, 'b>() -> App<'a, 'b> {
    SubCommand::with_name("groups")
        .about("Manage groups")
        .subcommand(
            SubCommand::with_name("new")
                .arg(
                    Arg::with_name("title")
                        .short("t")
                        .long("title")
                        .takes_value(true)
                        .help("The title of the new group"),
                )
                .arg(
                    Arg::with_name("slug")
                        .short("s")
                        .long("slug")
                        .takes_value(true)
                        .help("The URL slug of the new group (must be unique)"),
                )
                .arg(
                    Arg::with_name("description")
                        .short("d")
                        .long("description")
                        .takes_value(true)
                        .help("An optional description of the new group"),
                )
                .about("Create a new group"),
        )
        .subcommand(SubCommand::with_name("list").about("List the existing groups"))
}

pub fn run<'a>(args: &ArgMatches<'a>, conn: &Connection) {
    match args.subcommand() {
        ("new", Some(x)) => new(x, conn),
        ("list", _) => list(conn),
        _ => println!("Unknown subcommand"),
    }
}

fn new<'a>(args: &ArgMatches<'a>, conn: &Connection) {
    let title = args
        .value_of("title")
        .map(String::from)
        .unwrap_or_else(|| super::ask_for("Title"));
    let slug = args
        .value_of("slug")
        .map(String::from)
        .unwrap_or_else(|| super::ask_for("Slug"));
    let description = args.value_of("description").map(String::from);

    let group = Group::insert(
        conn,
        NewGroup {
            title,
            slug,
            description,
        },
    )
    .expect("Couldn't save the new group");
    println!("Created group {} (/group/{})", group.title, group.slug);
}

fn list(conn: &Connection) {
    for group in Group::list(conn).expect("Couldn't list groups") {
        println!("{}\t/group/{}", group.title, group.slug);
    }
}
