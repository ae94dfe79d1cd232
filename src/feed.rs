//! Support for creating syndication feeds from a list of posts: an Atom feed
//! and a [JSON Feed](https://www.jsonfeed.org/version/1.1/).

use crate::config::Author;
use crate::post::Post;
use atom_syndication::{Entry, Error as AtomError, Feed, Link, Person, Text};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Serialize;
use std::fmt;
use std::io::Write;
use std::time::UNIX_EPOCH;
use url::Url;

const JSON_FEED_VERSION: &str = "https://jsonfeed.org/version/1.1";

/// Bundled configuration for creating a feed.
pub struct FeedConfig<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub author: Option<&'a Author>,
    pub home_page: &'a Url,

    /// The URL the feed itself will be published at.
    pub feed_url: &'a Url,
}

/// Creates an Atom feed from some configuration ([`FeedConfig`]) and a list
/// of [`Post`]s (newest first) and writes the result to a
/// [`std::io::Write`].
pub fn write_atom<W: Write>(config: &FeedConfig, posts: &[Post], w: W) -> Result<()> {
    atom_feed(config, posts).write_to(w)?;
    Ok(())
}

/// Creates a JSON Feed from some configuration ([`FeedConfig`]) and a list of
/// [`Post`]s (newest first) and writes the result to a [`std::io::Write`].
pub fn write_json<W: Write>(config: &FeedConfig, posts: &[Post], w: W) -> Result<()> {
    serde_json::to_writer_pretty(w, &json_feed(config, posts))?;
    Ok(())
}

/// Posts carry calendar dates only; feeds get midnight UTC.
fn midnight_utc(date: NaiveDate) -> DateTime<FixedOffset> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)).into()
}

fn atom_feed(config: &FeedConfig, posts: &[Post]) -> Feed {
    let mut feed = Feed::default();
    feed.set_title(config.title.to_owned());
    feed.set_id(config.home_page.to_string());
    if !config.description.is_empty() {
        feed.set_subtitle(Some(Text::plain(config.description.to_owned())));
    }
    // The newest post's date keeps rebuilds of unchanged content identical.
    feed.set_updated(match posts.first() {
        Some(post) => midnight_utc(post.published_at),
        None => DateTime::<Utc>::from(UNIX_EPOCH).into(),
    });
    feed.set_authors(author_to_people(config.author));
    feed.set_links(vec![
        link(config.home_page.as_str(), "alternate"),
        link(config.feed_url.as_str(), "self"),
    ]);
    feed.set_entries(
        posts
            .iter()
            .map(|post| atom_entry(config, post))
            .collect::<Vec<Entry>>(),
    );
    feed
}

fn atom_entry(config: &FeedConfig, post: &Post) -> Entry {
    let date = midnight_utc(post.published_at);
    let mut entry = Entry::default();
    entry.set_id(post.url.to_string());
    entry.set_title(post.title.clone());
    entry.set_updated(date);
    entry.set_published(Some(date));
    entry.set_authors(author_to_people(config.author));
    entry.set_links(vec![link(post.url.as_str(), "alternate")]);
    entry.set_summary(Some(Text::plain(post.summary.clone())));
    entry
}

fn link(href: &str, rel: &str) -> Link {
    let mut link = Link::default();
    link.set_href(href.to_owned());
    link.set_rel(rel.to_owned());
    link
}

fn author_to_people(author: Option<&Author>) -> Vec<Person> {
    match author {
        Some(author) => {
            let mut person = Person::default();
            person.set_name(author.name.clone());
            person.set_email(author.email.clone());
            vec![person]
        }
        None => Vec::new(),
    }
}

#[derive(Serialize)]
struct JsonFeed {
    version: &'static str,
    title: String,
    home_page_url: String,
    feed_url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    description: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    authors: Vec<JsonAuthor>,
    items: Vec<JsonItem>,
}

#[derive(Serialize)]
struct JsonAuthor {
    name: String,
}

#[derive(Serialize)]
struct JsonItem {
    id: String,
    url: String,
    title: String,
    summary: String,
    content_html: String,
    date_published: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    external_url: Option<String>,
}

fn json_feed(config: &FeedConfig, posts: &[Post]) -> JsonFeed {
    JsonFeed {
        version: JSON_FEED_VERSION,
        title: config.title.to_owned(),
        home_page_url: config.home_page.to_string(),
        feed_url: config.feed_url.to_string(),
        description: config.description.to_owned(),
        authors: config
            .author
            .iter()
            .map(|author| JsonAuthor {
                name: author.name.clone(),
            })
            .collect(),
        items: posts
            .iter()
            .map(|post| JsonItem {
                id: post.url.to_string(),
                url: post.url.to_string(),
                title: post.title.clone(),
                summary: post.summary.clone(),
                content_html: post.body.clone(),
                date_published: midnight_utc(post.published_at).to_rfc3339(),
                image: post.banner.as_ref().map(Url::to_string),
                external_url: post.banner_link.as_ref().map(|l| l.url.clone()),
            })
            .collect(),
    }
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a problem creating a feed. Variants inlude I/O, Atom, and
/// JSON serialization issues.
#[derive(Debug)]
pub enum Error {
    /// Returned when there is a generic I/O error.
    Io(std::io::Error),

    /// Returned when there is an Atom-related error.
    Atom(AtomError),

    /// Returned when the JSON feed can't be serialized or written.
    Json(serde_json::Error),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(err) => err.fmt(f),
            Error::Atom(err) => err.fmt(f),
            Error::Json(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Atom(err) => Some(err),
            Error::Json(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator in fallible feed operations.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<AtomError> for Error {
    /// Converts [`AtomError`]s into [`Error`]. This allows us to use the `?`
    /// operator in fallible feed operations.
    fn from(err: AtomError) -> Error {
        Error::Atom(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Error {
        Error::Json(err)
    }
}
