//! Defines the [`Post`] type and its conversion into template values.

use crate::banner::BannerLink;
use crate::frontmatter::BannerComponent;
use chrono::NaiveDate;
use gtmpl::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use url::Url;

/// Represents a blog post.
#[derive(Clone, Debug)]
pub struct Post {
    /// Unique, URL-safe identifier derived from the source file name.
    pub slug: String,

    /// The output location on disk for the post's page.
    pub file_path: PathBuf,

    /// The canonical URL for the post's page.
    pub url: Url,

    pub title: String,

    /// The calendar date the post was published.
    pub published_at: NaiveDate,

    /// The post's description, shown on index pages and in feeds.
    pub summary: String,

    /// A display string such as `5 min read`.
    pub reading_time: String,

    /// The banner image, resolved against the post's URL.
    pub banner: Option<Url>,

    pub banner_link: Option<BannerLink>,
    pub banner_component: Option<BannerComponent>,

    /// The rendered HTML body.
    pub body: String,
}

impl Post {
    /// Long-form date, e.g. `September 12, 2022`.
    pub fn display_date(&self) -> String {
        self.published_at.format("%B %-d, %Y").to_string()
    }

    /// Converts the post into a summary [`Value`] for index pages and listings.
    /// It carries every field but the body.
    pub fn summarize(&self) -> Value {
        Value::Object(self.fields())
    }

    /// Converts the post into a [`Value`] for its own page, including the
    /// rendered `body`.
    pub fn to_value(&self) -> Value {
        let mut m = self.fields();
        m.insert("body".to_owned(), Value::String(self.body.clone()));
        Value::Object(m)
    }

    fn fields(&self) -> HashMap<String, Value> {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("slug".to_owned(), Value::String(self.slug.clone()));
        m.insert("url".to_owned(), Value::String(self.url.to_string()));
        m.insert("title".to_owned(), Value::String(self.title.clone()));
        m.insert(
            "date".to_owned(),
            Value::String(self.published_at.format("%Y-%m-%d").to_string()),
        );
        m.insert("display_date".to_owned(), Value::String(self.display_date()));
        m.insert("summary".to_owned(), Value::String(self.summary.clone()));
        m.insert(
            "reading_time".to_owned(),
            Value::String(self.reading_time.clone()),
        );
        m.insert(
            "banner".to_owned(),
            match &self.banner {
                Some(url) => Value::String(url.to_string()),
                None => Value::Nil,
            },
        );
        m.insert(
            "banner_link".to_owned(),
            match &self.banner_link {
                Some(link) => link.into(),
                None => Value::Nil,
            },
        );
        m.insert(
            "banner_component".to_owned(),
            match &self.banner_component {
                Some(component) => banner_component_value(component),
                None => Value::Nil,
            },
        );
        m
    }
}

fn banner_component_value(component: &BannerComponent) -> Value {
    let mut m: HashMap<String, Value> = HashMap::new();
    m.insert(
        "position".to_owned(),
        match &component.position {
            Some(position) => Value::String(position.clone()),
            None => Value::Nil,
        },
    );
    m.insert(
        "overlay".to_owned(),
        Value::Array(
            component
                .overlay
                .iter()
                .map(|line| Value::String(line.clone()))
                .collect(),
        ),
    );
    Value::Object(m)
}

/// Estimates reading time from the number of words in `markdown`. Always at
/// least one minute.
pub fn reading_time(markdown: &str, words_per_minute: usize) -> String {
    let words = markdown.split_whitespace().count();
    let wpm = words_per_minute.max(1);
    let minutes = ((words + wpm - 1) / wpm).max(1);
    format!("{} min read", minutes)
}
