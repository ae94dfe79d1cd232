//! Exports the [`build_site`] function which stitches together the high-level
//! steps of building the output static site: parsing the posts
//! ([`crate::parser`]), rendering the pages ([`crate::write`]), copying static
//! assets into the output directory, and generating the feeds.

use crate::config::Config;
use crate::feed::{self, Error as FeedError, FeedConfig};
use crate::parser::{Error as ParseError, Parser as PostParser, StaticFile};
use crate::theme::ThemeContext;
use crate::write::{Error as WriteError, Templates, Writer};
use gtmpl::Template;
use log::info;
use std::fmt;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Builds the site from a [`Config`] object. This calls into
/// [`PostParser::parse_posts`], [`Writer::write_site`], and the
/// [`crate::feed`] writers which do the heavy-lifting. This function also
/// copies the static assets and post-bundle files to the output directory.
///
/// Every post is parsed and every template is loaded before anything is
/// deleted or written, so an invalid post fails the build with the previous
/// output left untouched.
pub fn build_site(config: &Config, theme: ThemeContext) -> Result<()> {
    let post_parser = PostParser::new(
        &config.blog_url,
        &config.blog_output_directory,
        config.words_per_minute,
    );

    // collect all posts
    let (posts, bundle_files) = post_parser.parse_posts(&config.posts_source_directory)?;
    info!("parsed {} posts", posts.len());

    // Parse the template files.
    let templates = Templates {
        home: parse_template(config.home_template.iter())?,
        blog: parse_template(config.blog_template.iter())?,
        post: parse_template(config.post_template.iter())?,
        work: parse_template(config.work_template.iter())?,
    };

    // Blow away the old output directories so we don't have any collisions. We
    // don't delete the whole root output directory in case the user passed
    // the wrong directory.
    rmdir(&config.blog_output_directory)?;
    rmdir(&config.work_output_directory)?;
    rmdir(&config.static_output_directory)?;
    std::fs::create_dir_all(&config.root_output_directory)?;

    let writer = Writer {
        config,
        templates: &templates,
        theme,
    };
    writer.write_site(&posts)?;
    info!("wrote pages in {} color mode", theme.mode);

    if config.static_source_directory.is_dir() {
        copy_dir(
            &config.static_source_directory,
            &config.static_output_directory,
        )?;
    }
    copy_files(&bundle_files)?;

    let feed_config = FeedConfig {
        title: &config.title,
        description: &config.description,
        author: config.author.as_ref(),
        home_page: &config.site_root,
        feed_url: &config.atom_url,
    };
    feed::write_atom(
        &feed_config,
        &posts,
        BufWriter::new(File::create(
            config.root_output_directory.join("feed.atom"),
        )?),
    )?;
    feed::write_json(
        &FeedConfig {
            feed_url: &config.json_feed_url,
            ..feed_config
        },
        &posts,
        BufWriter::new(File::create(
            config.root_output_directory.join("feed.json"),
        )?),
    )?;
    info!(
        "built site into `{}`",
        config.root_output_directory.display()
    );

    Ok(())
}

fn copy_dir(src: &Path, dst: &Path) -> Result<()> {
    for result in WalkDir::new(src) {
        let entry = result?;
        // `src` is always an ancestor of the entry's path.
        let relative = match entry.path().strip_prefix(src) {
            Ok(relative) => relative,
            Err(_) => continue,
        };
        let target = dst.join(relative);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

fn copy_files(files: &[StaticFile]) -> Result<()> {
    for (src, dst) in files {
        if let Some(dir) = dst.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::copy(src, dst)?;
    }
    Ok(())
}

// Loads the template file contents, concatenates them, and parses the result
// into a template.
fn parse_template<P: AsRef<Path>>(template_files: impl Iterator<Item = P>) -> Result<Template> {
    let mut contents = String::new();
    for template_file in template_files {
        let template_file = template_file.as_ref();
        contents.push_str(&std::fs::read_to_string(template_file).map_err(|e| {
            Error::OpenTemplateFile {
                path: template_file.to_owned(),
                err: e,
            }
        })?);
        contents.push(' ');
    }

    let mut template = Template::default();
    template.parse(&contents).map_err(Error::ParseTemplate)?;
    Ok(template)
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can be during parsing, writing,
/// cleaning output directories, parsing template files, and other I/O.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors during parsing.
    Parse(ParseError),

    /// Returned for errors writing pages to disk as HTML files.
    Write(WriteError),

    /// Returned for I/O problems while cleaning output directories.
    Clean { path: PathBuf, err: std::io::Error },

    /// Returned for I/O problems while opening template files.
    OpenTemplateFile { path: PathBuf, err: std::io::Error },

    /// Returned for errors parsing template files.
    ParseTemplate(String),

    /// Returned for errors writing the feeds.
    Feed(FeedError),

    /// Returned for errors walking the static directory.
    WalkDir(walkdir::Error),

    /// Returned for other I/O errors.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Parse(err) => err.fmt(f),
            Error::Write(err) => err.fmt(f),
            Error::Clean { path, err } => {
                write!(f, "Cleaning directory '{}': {}", path.display(), err)
            }
            Error::OpenTemplateFile { path, err } => {
                write!(f, "Opening template file '{}': {}", path.display(), err)
            }
            Error::ParseTemplate(err) => write!(f, "Parsing template: {}", err),
            Error::Feed(err) => err.fmt(f),
            Error::WalkDir(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Parse(err) => Some(err),
            Error::Write(err) => Some(err),
            Error::Clean { path: _, err } => Some(err),
            Error::OpenTemplateFile { path: _, err } => Some(err),
            Error::ParseTemplate(_) => None,
            Error::Feed(err) => Some(err),
            Error::WalkDir(err) => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<ParseError> for Error {
    /// Converts [`ParseError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: ParseError) -> Error {
        Error::Parse(err)
    }
}

impl From<WriteError> for Error {
    /// Converts [`WriteError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: WriteError) -> Error {
        Error::Write(err)
    }
}

impl From<FeedError> for Error {
    /// Converts [`FeedError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: FeedError) -> Error {
        Error::Feed(err)
    }
}

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}

fn rmdir(dir: &Path) -> Result<()> {
    match std::fs::remove_dir_all(dir) {
        Ok(x) => Ok(x),
        Err(e) => match e.kind() {
            std::io::ErrorKind::NotFound => Ok(()),
            _ => Err(Error::Clean {
                path: dir.to_owned(),
                err: e,
            }),
        },
    }
}
