//! Defines the [`Parser`] and [`Error`] types: the logic for reading posts from
//! the file system into memory. A post is either a single markdown file
//! (`posts/foo.md`) or a bundle directory (`posts/foo/index.md`) whose other
//! files are copied next to the rendered page.

use std::{
    collections::HashMap,
    fmt,
    fs::read_dir,
    path::{Path, PathBuf},
};

use log::debug;
use url::Url;

use crate::{
    banner::BannerLink,
    frontmatter::{self, Frontmatter},
    index, markdown,
    post::{self, Post},
};

const MARKDOWN_EXTENSION: &str = "md";
const BUNDLE_INDEX: &str = "index.md";

/// Parses [`Post`] objects from source files.
pub struct Parser<'a> {
    /// `blog_url` is the base URL for post pages (i.e., the URL for a post is
    /// `{blog_url}{slug}/`).
    blog_url: &'a Url,

    /// `blog_directory` is the directory in which post pages will be
    /// rendered (i.e., a post's page is `{blog_directory}/{slug}/index.html`).
    blog_directory: &'a Path,

    /// Reading speed used for the reading-time estimate.
    words_per_minute: usize,
}

impl<'a> Parser<'a> {
    /// Constructs a new parser. See fields on [`Parser`] for argument
    /// descriptions.
    pub fn new(
        blog_url: &'a Url,
        blog_directory: &'a Path,
        words_per_minute: usize,
    ) -> Parser<'a> {
        Parser {
            blog_url,
            blog_directory,
            words_per_minute,
        }
    }

    fn parse_post_bundle(
        &self,
        posts_source_directory: &Path,
        relative_path: &Path,
        static_files: &mut Vec<StaticFile>,
    ) -> Result<Post> {
        // We want to make sure we can parse a post before we mutate
        // `static_files`
        let post = self.parse_post(
            posts_source_directory,
            &relative_path.join(BUNDLE_INDEX),
        )?;

        use walkdir::WalkDir;
        let abs = posts_source_directory.join(relative_path);
        let output_directory = self.blog_directory.join(&post.slug);
        for result in WalkDir::new(&abs) {
            let entry = result?;
            if entry.file_type().is_file() && entry.file_name() != BUNDLE_INDEX {
                // `abs` is always an ancestor of the entry's path.
                if let Ok(inner) = entry.path().strip_prefix(&abs) {
                    static_files
                        .push((entry.path().to_owned(), output_directory.join(inner)));
                }
            }
        }

        Ok(post)
    }

    /// Parses a single [`Post`] from the file at `relative_path` (relative to
    /// `posts_source_directory`), annotating any error with the path.
    fn parse_post(
        &self,
        posts_source_directory: &Path,
        relative_path: &Path,
    ) -> Result<Post> {
        match self._parse_post(posts_source_directory, relative_path) {
            Ok(p) => Ok(p),
            Err(e) => Err(Error::Annotated(
                format!("parsing post `{}`", relative_path.display()),
                Box::new(e),
            )),
        }
    }

    fn _parse_post(
        &self,
        posts_source_directory: &Path,
        relative_path: &Path,
    ) -> Result<Post> {
        let contents =
            std::fs::read_to_string(posts_source_directory.join(relative_path))?;
        let (frontmatter, body) = Frontmatter::parse(&contents)?;

        let slug = slug_for(relative_path)?;
        // Relative links resolve against where the page and its bundle files
        // are written, which is named by the slug rather than the source name.
        let source_path = if relative_path.ends_with(BUNDLE_INDEX) {
            format!("{}/{}", slug, BUNDLE_INDEX)
        } else {
            format!("{}.{}", slug, MARKDOWN_EXTENSION)
        };
        let url = self.blog_url.join(&format!("{}/", slug))?;
        debug!("parsed `{}` as `{}`", relative_path.display(), url);

        let mut post = Post {
            file_path: self.blog_directory.join(&slug).join("index.html"),
            banner: match &frontmatter.banner {
                Some(banner) => Some(url.join(banner)?),
                None => None,
            },
            url,
            slug,
            title: frontmatter.title,
            published_at: frontmatter.date,
            summary: frontmatter.description,
            reading_time: post::reading_time(body, self.words_per_minute),
            banner_link: BannerLink::classify(frontmatter.external_url.as_deref()),
            banner_component: frontmatter.banner_component,
            body: String::default(),
        };

        markdown::to_html(&mut post.body, self.blog_url, &source_path, body)?;
        Ok(post)
    }

    /// Searches a provided `source_directory` for post files (extension =
    /// `.md`) and post bundles (directories containing `index.md`) and returns
    /// the posts sorted by date (most recent first) along with the bundle files
    /// that need copying. Each post file must be structured as follows:
    ///
    /// 1. Initial frontmatter fence (`---`)
    /// 2. YAML frontmatter with fields `title`, `date`, and optionally
    ///    `description`, `banner`, `externalUrl` and `bannerComponent`
    /// 3. Terminal frontmatter fence (`---`)
    /// 4. Post body
    ///
    /// Fails on the first invalid post, and when two posts share a slug.
    pub fn parse_posts(&self, source_directory: &Path) -> Result<Posts> {
        let mut posts = Vec::new();
        let mut static_files = Vec::new();
        let mut seen: HashMap<String, PathBuf> = HashMap::new();

        let mut entries = read_dir(source_directory)?.collect::<std::io::Result<Vec<_>>>()?;
        // Deterministic order so that duplicate-slug errors are reproducible.
        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            let path = entry.path();
            let relative_path = match path.strip_prefix(source_directory) {
                Ok(relative_path) => relative_path,
                Err(_) => continue,
            };
            let post = if Self::is_bundle(&entry)? {
                self.parse_post_bundle(source_directory, relative_path, &mut static_files)?
            } else if entry.file_type()?.is_file()
                && path.extension().map_or(false, |ext| ext == MARKDOWN_EXTENSION)
            {
                self.parse_post(source_directory, relative_path)?
            } else {
                continue;
            };

            if let Some(first) = seen.insert(post.slug.clone(), relative_path.to_owned()) {
                return Err(Error::DuplicateSlug {
                    slug: post.slug,
                    first,
                    second: relative_path.to_owned(),
                });
            }
            posts.push(post);
        }

        posts.sort_by(index::newest_first);
        Ok((posts, static_files))
    }

    fn is_bundle(entry: &std::fs::DirEntry) -> std::io::Result<bool> {
        Ok(entry.file_type()?.is_dir() && entry.path().join(BUNDLE_INDEX).is_file())
    }
}

/// Derives a post's slug from its source path: the bundle directory's name for
/// `foo/index.md`, the file stem for `foo.md`.
fn slug_for(relative_path: &Path) -> Result<String> {
    let name = if relative_path.ends_with(BUNDLE_INDEX) {
        relative_path.parent().and_then(Path::file_name)
    } else {
        relative_path.file_stem()
    };
    let slug = name
        .and_then(|name| name.to_str())
        .map(slug::slugify)
        .unwrap_or_default();
    if slug.is_empty() {
        Err(InvalidFileNameError(relative_path.to_owned()).into())
    } else {
        Ok(slug)
    }
}

#[derive(Debug)]
pub struct InvalidFileNameError(PathBuf);

impl fmt::Display for InvalidFileNameError {
    /// Displays an [`InvalidFileNameError`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "invalid file name: {:?}", &self.0)
    }
}

impl std::error::Error for InvalidFileNameError {}

pub type Posts = (Vec<Post>, Vec<StaticFile>);

/// A bundle file to copy: (source, destination).
pub type StaticFile = (PathBuf, PathBuf);

/// Represents the result of a [`Post`]-parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error parsing a [`Post`] object.
#[derive(Debug)]
pub enum Error {
    /// Returned when the frontmatter is missing, malformed or invalid.
    Frontmatter(frontmatter::Error),

    /// Returned when two posts resolve to the same slug.
    DuplicateSlug {
        slug: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// Returned when there is a problem parsing URLs.
    UrlParse(url::ParseError),

    /// Returned for other I/O errors.
    Io(std::io::Error),

    /// Returned for WalkDir I/O errors.
    WalkDir(walkdir::Error),

    /// Returned when a source file name isn't valid UTF-8 or yields an empty
    /// slug.
    InvalidFileName(InvalidFileNameError),

    /// An error with an annotation.
    Annotated(String, Box<Error>),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Frontmatter(err) => err.fmt(f),
            Error::DuplicateSlug {
                slug,
                first,
                second,
            } => write!(
                f,
                "duplicate slug `{}`: `{}` and `{}`",
                slug,
                first.display(),
                second.display()
            ),
            Error::UrlParse(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
            Error::WalkDir(err) => err.fmt(f),
            Error::InvalidFileName(err) => err.fmt(f),
            Error::Annotated(annotation, err) => {
                write!(f, "{}: {}", &annotation, err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Frontmatter(err) => Some(err),
            Error::DuplicateSlug { .. } => None,
            Error::UrlParse(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::WalkDir(err) => Some(err),
            Error::InvalidFileName(err) => Some(err),
            Error::Annotated(_, err) => Some(err),
        }
    }
}

impl From<frontmatter::Error> for Error {
    fn from(err: frontmatter::Error) -> Error {
        Error::Frontmatter(err)
    }
}

impl From<InvalidFileNameError> for Error {
    fn from(err: InvalidFileNameError) -> Error {
        Error::InvalidFileName(err)
    }
}

impl From<markdown::Error> for Error {
    fn from(err: markdown::Error) -> Error {
        match err {
            markdown::Error::UrlParse(e) => Error::UrlParse(e),
        }
    }
}

impl From<url::ParseError> for Error {
    /// Converts a [`url::ParseError`] into an [`Error`]. It allows us to use
    /// the `?` operator for URL parsing and joining functions.
    fn from(err: url::ParseError) -> Error {
        Error::UrlParse(err)
    }
}

impl From<walkdir::Error> for Error {
    /// Converts a [`walkdir::Error`] into an [`Error`]. It allows us to
    /// use the `?` operator for directory walks.
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}

impl From<std::io::Error> for Error {
    /// Converts a [`std::io::Error`] into an [`Error`]. It allows us to
    /// use the `?` operator for fallible I/O functions.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::banner::Platform;
    use chrono::NaiveDate;

    fn write(dir: &Path, relative_path: &str, contents: &str) {
        let path = dir.join(relative_path);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_parse_posts() -> Result<()> {
        let blog_url = Url::parse("https://example.com/blog/")?;
        let blog_directory = Path::new("/out/blog");
        let parser = Parser::new(&blog_url, blog_directory, 200);
        let (posts, static_files) =
            parser.parse_posts(Path::new("./testdata/site/posts/"))?;

        let slugs: Vec<&str> = posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(
            vec!["rust-for-typescript-devs", "hello-world", "first-post"],
            slugs
        );

        let rust = &posts[0];
        assert_eq!(NaiveDate::from_ymd_opt(2022, 9, 12).unwrap(), rust.published_at);
        assert_eq!(
            "https://example.com/blog/rust-for-typescript-devs/",
            rust.url.as_str()
        );
        assert_eq!(
            Path::new("/out/blog/rust-for-typescript-devs/index.html"),
            rust.file_path
        );
        assert_eq!(
            Some("https://example.com/blog/rust-for-typescript-devs/banner.svg"),
            rust.banner.as_ref().map(Url::as_str)
        );
        assert_eq!(
            Some(Platform::LogRocket),
            rust.banner_link.as_ref().map(|l| l.platform)
        );
        assert!(rust
            .body
            .contains("href=\"https://example.com/blog/hello-world/\""));

        assert_eq!(None, posts[1].banner_link);
        assert_eq!(
            Some(Platform::External),
            posts[2].banner_link.as_ref().map(|l| l.platform)
        );

        assert_eq!(
            vec![(
                PathBuf::from("./testdata/site/posts/rust-for-typescript-devs/banner.svg"),
                PathBuf::from("/out/blog/rust-for-typescript-devs/banner.svg"),
            )],
            static_files
        );
        Ok(())
    }

    #[test]
    fn test_invalid_date_fails_with_path() -> Result<()> {
        let dir = tempfile::tempdir()?;
        write(dir.path(), "good.md", "---\ntitle: Good\ndate: 2021-01-01\n---\n");
        write(dir.path(), "bad.md", "---\ntitle: Bad\ndate: 2021-02-30\n---\n");

        let blog_url = Url::parse("https://example.com/blog/")?;
        let parser = Parser::new(&blog_url, Path::new("/out/blog"), 200);
        match parser.parse_posts(dir.path()) {
            Err(err @ Error::Annotated(..)) => {
                assert!(err.to_string().contains("bad.md"));
            }
            Err(err) => panic!("unexpected error: {}", err),
            Ok(_) => panic!("expected the build to fail"),
        }
        Ok(())
    }

    #[test]
    fn test_duplicate_slug() -> Result<()> {
        let dir = tempfile::tempdir()?;
        write(dir.path(), "hello.md", "---\ntitle: A\ndate: 2021-01-01\n---\n");
        write(
            dir.path(),
            "hello/index.md",
            "---\ntitle: B\ndate: 2021-01-02\n---\n",
        );

        let blog_url = Url::parse("https://example.com/blog/")?;
        let parser = Parser::new(&blog_url, Path::new("/out/blog"), 200);
        assert!(matches!(
            parser.parse_posts(dir.path()),
            Err(Error::DuplicateSlug { slug, .. }) if slug == "hello"
        ));
        Ok(())
    }

    #[test]
    fn test_ignores_other_files() -> Result<()> {
        let dir = tempfile::tempdir()?;
        write(dir.path(), "notes.txt", "not a post");
        write(dir.path(), "drafts/idea.txt", "no index.md here");
        write(dir.path(), "only.md", "---\ntitle: Only\ndate: 2021-01-01\n---\nhi\n");

        let blog_url = Url::parse("https://example.com/blog/")?;
        let parser = Parser::new(&blog_url, Path::new("/out/blog"), 200);
        let (posts, static_files) = parser.parse_posts(dir.path())?;
        assert_eq!(1, posts.len());
        assert_eq!("only", posts[0].slug);
        assert_eq!("1 min read", posts[0].reading_time);
        assert!(static_files.is_empty());
        Ok(())
    }

    #[test]
    fn test_bundle_links_follow_slug() -> Result<()> {
        let dir = tempfile::tempdir()?;
        write(
            dir.path(),
            "My Post/index.md",
            "---\ntitle: Mine\ndate: 2021-01-01\n---\n![d](./diagram.png) [next](../other.md)\n",
        );
        write(dir.path(), "My Post/diagram.png", "png");
        write(dir.path(), "other.md", "---\ntitle: Other\ndate: 2020-01-01\n---\n");

        let blog_url = Url::parse("https://example.com/blog/")?;
        let parser = Parser::new(&blog_url, Path::new("/out/blog"), 200);
        let (posts, static_files) = parser.parse_posts(dir.path())?;

        let mine = &posts[0];
        assert_eq!("my-post", mine.slug);
        assert!(mine
            .body
            .contains("src=\"https://example.com/blog/my-post/diagram.png\""));
        assert!(mine
            .body
            .contains("href=\"https://example.com/blog/other/\""));
        assert_eq!(
            vec![(
                dir.path().join("My Post/diagram.png"),
                PathBuf::from("/out/blog/my-post/diagram.png"),
            )],
            static_files
        );
        Ok(())
    }

    #[test]
    fn test_slug_for() -> Result<()> {
        assert_eq!("hello-world", slug_for(Path::new("Hello World.md"))?);
        assert_eq!("bundle", slug_for(Path::new("bundle/index.md"))?);
        Ok(())
    }
}
