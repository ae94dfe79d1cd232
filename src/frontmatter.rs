//! The frontmatter schema for post source files. Each post begins with a
//! `---`-fenced YAML block which is deserialized and validated here, so a post
//! with a missing title or an unparseable date fails the build as soon as it is
//! read.

use chrono::{DateTime, NaiveDate, ParseError as DateParseError};
use serde::Deserialize;
use std::fmt;

const FENCE: &str = "---";

/// Overrides for the banner overlay: where the image is anchored and the
/// literal lines of text drawn over it.
#[derive(Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct BannerComponent {
    /// A CSS `object-position` value, e.g. `center top`.
    #[serde(default)]
    pub position: Option<String>,

    #[serde(default)]
    pub overlay: Vec<String>,
}

/// The validated frontmatter of a post.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frontmatter {
    pub title: String,
    pub date: NaiveDate,
    pub description: String,
    pub banner: Option<String>,
    pub external_url: Option<String>,
    pub banner_component: Option<BannerComponent>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFrontmatter {
    title: String,
    date: String,
    #[serde(default)]
    description: String,
    banner: Option<String>,
    external_url: Option<String>,
    banner_component: Option<BannerComponent>,
}

impl Frontmatter {
    /// Splits `input` into its frontmatter and body, returning the parsed
    /// frontmatter and the remaining markdown. For example:
    ///
    /// ```md
    /// ---
    /// title: Hello, world!
    /// date: 2021-04-16
    /// description: A greeting
    /// ---
    /// # Hello
    /// ```
    pub fn parse(input: &str) -> Result<(Frontmatter, &str)> {
        let (yaml, body) = split(input)?;
        let raw: RawFrontmatter = serde_yaml::from_str(yaml)?;
        if raw.title.trim().is_empty() {
            return Err(Error::EmptyTitle);
        }
        Ok((
            Frontmatter {
                title: raw.title,
                date: parse_date(&raw.date)?,
                description: raw.description,
                banner: raw.banner.filter(|b| !b.trim().is_empty()),
                external_url: raw.external_url,
                banner_component: raw.banner_component,
            },
            body,
        ))
    }
}

fn split(input: &str) -> Result<(&str, &str)> {
    let input = input.trim_start_matches('\u{feff}');
    if !input.starts_with(FENCE) {
        return Err(Error::MissingStartFence);
    }
    let yaml_start = FENCE.len();
    // The closing fence must start a line.
    match input[yaml_start..].find(&format!("\n{}", FENCE)) {
        None => Err(Error::MissingEndFence),
        Some(offset) => {
            let yaml_stop = yaml_start + offset;
            let body_start = yaml_stop + 1 + FENCE.len();
            Ok((&input[yaml_start..yaml_stop], &input[body_start..]))
        }
    }
}

/// Parses a frontmatter date. Both plain dates (`2022-09-12`) and RFC 3339
/// timestamps are accepted; timestamps keep their own calendar date with no
/// timezone conversion.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    let value = value.trim();
    match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        Ok(date) => Ok(date),
        Err(err) => match DateTime::parse_from_rfc3339(value) {
            Ok(datetime) => Ok(datetime.naive_local().date()),
            Err(_) => Err(Error::InvalidDate {
                value: value.to_owned(),
                err,
            }),
        },
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem reading a post's frontmatter.
#[derive(Debug)]
pub enum Error {
    /// Returned when a post source file doesn't begin with `---`.
    MissingStartFence,

    /// Returned when the starting fence was found but the closing one wasn't.
    MissingEndFence,

    /// Returned when the YAML is malformed or a required field is missing.
    DeserializeYaml(serde_yaml::Error),

    /// Returned when the title is blank.
    EmptyTitle,

    /// Returned when `date` can't be parsed.
    InvalidDate { value: String, err: DateParseError },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MissingStartFence => write!(f, "Post must begin with `---`"),
            Error::MissingEndFence => write!(f, "Missing closing `---`"),
            Error::DeserializeYaml(err) => err.fmt(f),
            Error::EmptyTitle => write!(f, "`title` must not be empty"),
            Error::InvalidDate { value, err } => {
                write!(f, "invalid date `{}`: {}", value, err)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::MissingStartFence => None,
            Error::MissingEndFence => None,
            Error::DeserializeYaml(err) => Some(err),
            Error::EmptyTitle => None,
            Error::InvalidDate { value: _, err } => Some(err),
        }
    }
}

impl From<serde_yaml::Error> for Error {
    /// Converts a [`serde_yaml::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator for [`serde_yaml`] deserialization functions.
    fn from(err: serde_yaml::Error) -> Error {
        Error::DeserializeYaml(err)
    }
}
