use crate::config::Config;
use crate::index::{group_by_month, MonthGroup};
use crate::markdown;
use crate::nav;
use crate::post::Post;
use crate::seo::{Kind, Seo};
use crate::theme::ThemeContext;
use gtmpl::{Template, Value};
use log::debug;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::io;
use std::path::PathBuf;
use url::Url;

/// The parsed theme templates, one per kind of page.
pub struct Templates {
    pub home: Template,
    pub blog: Template,
    pub post: Template,
    pub work: Template,
}

/// Responsible for templating and writing HTML pages to disk.
pub struct Writer<'a> {
    /// Site metadata, URLs and output directories.
    pub config: &'a Config,

    pub templates: &'a Templates,

    /// The color mode the pages are rendered in.
    pub theme: ThemeContext,
}

impl Writer<'_> {
    /// Takes a single [`Page`], templates it, and writes it to disk.
    fn write_page(&self, page: &Page) -> Result<()> {
        let mut value = page.to_value();
        if let Value::Object(obj) = &mut value {
            obj.insert("site".to_owned(), self.site_value());
            obj.insert(
                "nav".to_owned(),
                nav::to_value(&self.config.nav, &self.config.site_root, &page.url),
            );
            obj.insert(
                "color_mode".to_owned(),
                Value::String(self.theme.mode.to_string()),
            );
            obj.insert(
                "alternate_color_mode".to_owned(),
                Value::String(self.theme.alternate().to_string()),
            );
            obj.insert(
                "static_url".to_owned(),
                Value::String(self.config.static_url.to_string()),
            );
            obj.insert(
                "atom_url".to_owned(),
                Value::String(self.config.atom_url.to_string()),
            );
            obj.insert(
                "json_feed_url".to_owned(),
                Value::String(self.config.json_feed_url.to_string()),
            );
        }
        debug!("writing `{}`", page.file_path.display());
        page.template.execute(
            &mut std::fs::File::create(&page.file_path)?,
            &gtmpl::Context::from(value)?,
        )?;
        Ok(())
    }

    fn site_value(&self) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("title".to_owned(), Value::String(self.config.title.clone()));
        m.insert(
            "description".to_owned(),
            Value::String(self.config.description.clone()),
        );
        m.insert(
            "author".to_owned(),
            match &self.config.author {
                Some(author) => Value::String(author.name.clone()),
                None => Value::Nil,
            },
        );
        m.insert(
            "root".to_owned(),
            Value::String(self.config.site_root.to_string()),
        );
        Value::Object(m)
    }

    /// Writes the home, blog index, post and work pages for `posts`, which
    /// must be sorted newest first.
    pub fn write_site(&self, posts: &[Post]) -> Result<()> {
        let groups = group_by_month(posts);
        let mut pages = vec![
            self.home_page(posts)?,
            self.blog_page(&groups)?,
            self.work_page()?,
        ];
        for page in self.post_pages(posts) {
            pages.push(page?);
        }

        let mut seen_dirs: HashSet<PathBuf> = HashSet::new();
        for page in &pages {
            if let Some(dir) = page.file_path.parent() {
                if seen_dirs.insert(dir.to_owned()) {
                    std::fs::create_dir_all(dir)?;
                }
            }
            self.write_page(page)?;
        }
        Ok(())
    }

    fn home_page(&self, posts: &[Post]) -> Result<Page<'_>> {
        let config = self.config;
        let mut item: HashMap<String, Value> = HashMap::new();
        item.insert(
            "bio".to_owned(),
            Value::String(markdown::fragment_to_html(&config.bio)),
        );
        item.insert(
            "avatar".to_owned(),
            match &config.avatar {
                Some(avatar) => Value::String(avatar.to_string()),
                None => Value::Nil,
            },
        );
        item.insert(
            "recent".to_owned(),
            Value::Array(
                posts
                    .iter()
                    .take(config.recent_posts)
                    .map(|p| p.summarize())
                    .collect(),
            ),
        );

        let mut seo = Seo::page(&config.title, None, &config.description, &config.site_root);
        seo.image = config.avatar.as_ref();
        Ok(Page {
            item: Value::Object(item),
            file_path: config.root_output_directory.join("index.html"),
            url: config.site_root.clone(),
            seo: seo.to_html()?,
            newer: None,
            older: None,
            template: &self.templates.home,
        })
    }

    fn blog_page(&self, groups: &[MonthGroup<'_>]) -> Result<Page<'_>> {
        let config = self.config;
        let mut item: HashMap<String, Value> = HashMap::new();
        item.insert(
            "groups".to_owned(),
            Value::Array(groups.iter().map(MonthGroup::to_value).collect()),
        );
        Ok(Page {
            item: Value::Object(item),
            file_path: config.blog_output_directory.join("index.html"),
            url: config.blog_url.clone(),
            seo: Seo::page(&config.title, Some("Blog"), &config.description, &config.blog_url)
                .to_html()?,
            newer: None,
            older: None,
            template: &self.templates.blog,
        })
    }

    fn work_page(&self) -> Result<Page<'_>> {
        let config = self.config;
        let mut item: HashMap<String, Value> = HashMap::new();
        item.insert(
            "entries".to_owned(),
            Value::Array(config.work.iter().map(|w| w.to_value()).collect()),
        );
        Ok(Page {
            item: Value::Object(item),
            file_path: config.work_output_directory.join("index.html"),
            url: config.work_url.clone(),
            seo: Seo::page(&config.title, Some("Work"), &config.description, &config.work_url)
                .to_html()?,
            newer: None,
            older: None,
            template: &self.templates.work,
        })
    }

    /// Creates a [`Page`] for each post. `posts` is newest first, so the
    /// previous entry is the newer post and the next one is older.
    fn post_pages<'p>(
        &'p self,
        posts: &'p [Post],
    ) -> impl Iterator<Item = Result<Page<'p>>> + 'p {
        posts.iter().enumerate().map(move |(i, post)| -> Result<Page<'p>> {
            let seo = Seo {
                title: format!("{} | {}", post.title, self.config.title),
                description: &post.summary,
                canonical_url: &post.url,
                image: post.banner.as_ref(),
                kind: Kind::Article,
                published: Some(post.published_at),
            };
            Ok(Page {
                item: post.to_value(),
                file_path: post.file_path.clone(),
                url: post.url.clone(),
                seo: seo.to_html()?,
                newer: match i {
                    0 => None,
                    _ => posts.get(i - 1),
                },
                older: posts.get(i + 1),
                template: &self.templates.post,
            })
        })
    }
}

/// An object representing an output HTML file. A [`Page`] can be converted to a
/// [`Value`] and thus rendered in a template via [`Page::to_value`].
struct Page<'a> {
    /// The main item for the page.
    item: Value,

    /// The target location on disk for the output file.
    file_path: PathBuf,

    /// The page's canonical URL.
    url: Url,

    /// The rendered SEO tags.
    seo: String,

    /// Adjacent posts, for post pages.
    newer: Option<&'a Post>,
    older: Option<&'a Post>,

    /// The template with which the page will be rendered.
    template: &'a Template,
}

impl Page<'_> {
    /// Converts a [`Page`] into a [`Value`]. The result is a [`Value::Object`]
    /// with fields `item`, `url`, `seo`, `newer` and `older` (see [`Page`] for
    /// descriptions; `newer` and `older` are post summaries or nil).
    fn to_value(&self) -> Value {
        let option_to_value = |opt: Option<&Post>| match opt {
            Some(post) => post.summarize(),
            None => Value::Nil,
        };

        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("item".to_owned(), self.item.clone());
        m.insert("url".to_owned(), Value::String(self.url.to_string()));
        m.insert("seo".to_owned(), Value::String(self.seo.clone()));
        m.insert("newer".to_owned(), option_to_value(self.newer));
        m.insert("older".to_owned(), option_to_value(self.older));
        Value::Object(m)
    }
}

/// The result of a fallible page-writing operation.
type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug)]
pub enum Error {
    /// An error during templating.
    Template(String),

    /// An error writing the output files.
    Io(io::Error),
}

impl From<io::Error> for Error {
    /// Converts an [`io::Error`] into an [`Error`]. This allows us to use the
    /// `?` operator for fallible I/O operations.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<String> for Error {
    /// Converts a template error message ([`String`]) into an [`Error`]. This
    /// allows us to use the `?` operator for fallible template operations.
    fn from(err: String) -> Error {
        Error::Template(err)
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Template(err) => write!(f, "rendering template: {}", err),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Template(_) => None,
            Error::Io(err) => Some(err),
        }
    }
}
