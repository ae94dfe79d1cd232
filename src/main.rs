use anyhow::{anyhow, Context, Result};
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use folio::build::build_site;
use folio::config::Config;
use folio::index::group_by_month;
use folio::parser::Parser as PostParser;
use folio::theme::{ColorMode, FileStore, ThemeContext};
use log::info;
use std::path::{Path, PathBuf};

fn main() {
    env_logger::init();

    if let Err(err) = run() {
        eprintln!("Error: {:?}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let project_arg = Arg::with_name("project")
        .long("project")
        .short("p")
        .takes_value(true)
        .value_name("DIR")
        .help("The project directory (or any directory below it)");

    let matches = App::new("folio")
        .about("Builds a personal portfolio and blog into a static site")
        .version(env!("CARGO_PKG_VERSION"))
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(
            SubCommand::with_name("build")
                .about("Builds the site")
                .arg(project_arg.clone())
                .arg(
                    Arg::with_name("output")
                        .long("output")
                        .short("o")
                        .takes_value(true)
                        .value_name("DIR")
                        .help("The output directory (defaults to `_output` in the project)"),
                ),
        )
        .subcommand(
            SubCommand::with_name("list")
                .about("Prints the blog index, grouped by month")
                .arg(project_arg.clone()),
        )
        .subcommand(
            SubCommand::with_name("color-mode")
                .about("Sets the color mode the site is built in")
                .arg(project_arg)
                .arg(
                    Arg::with_name("mode")
                        .required(true)
                        .possible_values(&["light", "dark", "toggle"]),
                ),
        )
        .get_matches();

    match matches.subcommand() {
        ("build", Some(m)) => build(m),
        ("list", Some(m)) => list(m),
        ("color-mode", Some(m)) => color_mode(m),
        (other, _) => Err(anyhow!("unknown subcommand `{}`", other)),
    }
}

fn project_dir(matches: &ArgMatches) -> Result<PathBuf> {
    match matches.value_of("project") {
        Some(dir) => Ok(PathBuf::from(dir)),
        None => std::env::current_dir().context("Getting the current directory"),
    }
}

fn build(matches: &ArgMatches) -> Result<()> {
    let config = Config::from_directory(
        &project_dir(matches)?,
        matches.value_of("output").map(Path::new),
    )?;
    let theme = ThemeContext::resolve(
        &FileStore::in_project(&config.project_root),
        config.default_color_mode,
    );
    build_site(&config, theme)?;
    Ok(())
}

fn list(matches: &ArgMatches) -> Result<()> {
    let config = Config::from_directory(&project_dir(matches)?, None)?;
    let parser = PostParser::new(
        &config.blog_url,
        &config.blog_output_directory,
        config.words_per_minute,
    );
    let (posts, _) = parser.parse_posts(&config.posts_source_directory)?;
    for group in group_by_month(&posts) {
        println!("{}", group.label);
        for post in group.posts {
            println!(
                "  {}  {}  ({}){}",
                post.published_at.format("%Y-%m-%d"),
                post.title,
                post.reading_time,
                match &post.banner_link {
                    Some(link) => format!("  [{}]", link.label()),
                    None => String::new(),
                }
            );
        }
    }
    Ok(())
}

fn color_mode(matches: &ArgMatches) -> Result<()> {
    let config = Config::from_directory(&project_dir(matches)?, None)?;
    let mut store = FileStore::in_project(&config.project_root);
    let mut theme = ThemeContext::resolve(&store, config.default_color_mode);
    let mode = match matches.value_of("mode") {
        Some("toggle") => theme.toggle(&mut store)?,
        Some(mode) => theme.set(mode.parse::<ColorMode>()?, &mut store)?,
        None => return Err(anyhow!("missing color mode")),
    };
    info!("stored color mode in `{}`", store.path().display());
    println!("{}", mode);
    Ok(())
}
