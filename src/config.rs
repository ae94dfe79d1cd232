//! Loads the project configuration (`folio.yaml`) and the theme configuration
//! (`theme/theme.yaml`) into a single resolved [`Config`].

use crate::nav::{self, NavEntry, NavLink};
use crate::theme::ColorMode;
use crate::work::WorkEntry;
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use url::Url;

/// The name of the project file.
pub const PROJECT_FILE: &str = "folio.yaml";

/// When set, overrides `site_root` from the project file.
pub const SITE_URL_VAR: &str = "FOLIO_SITE_URL";

#[derive(Deserialize)]
struct WordsPerMinute(usize);
impl Default for WordsPerMinute {
    fn default() -> Self {
        WordsPerMinute(200)
    }
}

#[derive(Deserialize)]
struct RecentPosts(usize);
impl Default for RecentPosts {
    fn default() -> Self {
        RecentPosts(3)
    }
}

/// The author credited on pages and in feeds.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Author {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Deserialize)]
struct Project {
    title: String,
    #[serde(default)]
    description: String,
    site_root: String,
    #[serde(default)]
    author: Option<Author>,
    #[serde(default)]
    avatar: Option<String>,
    #[serde(default)]
    bio: String,
    #[serde(default)]
    color_mode: ColorMode,
    #[serde(default)]
    words_per_minute: WordsPerMinute,
    #[serde(default)]
    recent_posts: RecentPosts,
    #[serde(default)]
    nav: Option<Vec<NavEntry>>,
    #[serde(default)]
    work: Vec<WorkEntry>,
}

#[derive(Deserialize)]
struct Theme {
    home_template: Vec<PathBuf>,
    blog_template: Vec<PathBuf>,
    post_template: Vec<PathBuf>,
    work_template: Vec<PathBuf>,
}

/// The resolved configuration for a build.
pub struct Config {
    pub project_root: PathBuf,

    pub title: String,
    pub description: String,
    pub author: Option<Author>,
    pub avatar: Option<Url>,

    /// The bio, as markdown.
    pub bio: String,

    pub default_color_mode: ColorMode,
    pub words_per_minute: usize,

    /// The number of posts shown on the home page.
    pub recent_posts: usize,
    pub nav: Vec<NavLink>,
    pub work: Vec<WorkEntry>,

    pub site_root: Url,
    pub blog_url: Url,
    pub work_url: Url,
    pub static_url: Url,
    pub atom_url: Url,
    pub json_feed_url: Url,

    pub posts_source_directory: PathBuf,
    pub static_source_directory: PathBuf,

    pub root_output_directory: PathBuf,
    pub blog_output_directory: PathBuf,
    pub work_output_directory: PathBuf,
    pub static_output_directory: PathBuf,

    pub home_template: Vec<PathBuf>,
    pub blog_template: Vec<PathBuf>,
    pub post_template: Vec<PathBuf>,
    pub work_template: Vec<PathBuf>,
}

impl Config {
    /// Searches `dir` and then each of its ancestors for `folio.yaml` and loads
    /// it. `output_directory` defaults to `_output` beside the project file.
    pub fn from_directory(dir: &Path, output_directory: Option<&Path>) -> Result<Config> {
        let path = find_project_file(dir)?;
        Config::from_project_file(&path, output_directory)
            .with_context(|| format!("Loading configuration `{}`", path.display()))
    }

    /// Loads the project file at `path`, honoring a `FOLIO_SITE_URL` override.
    pub fn from_project_file(path: &Path, output_directory: Option<&Path>) -> Result<Config> {
        let site_url = std::env::var(SITE_URL_VAR).ok();
        Config::load(path, output_directory, site_url.as_deref())
    }

    /// Loads the project file at `path`. A non-blank `site_url` replaces the
    /// project's `site_root`.
    pub fn load(
        path: &Path,
        output_directory: Option<&Path>,
        site_url: Option<&str>,
    ) -> Result<Config> {
        let project: Project = serde_yaml::from_reader(open(path, "project")?)?;
        let project_root = path.parent().ok_or_else(|| {
            anyhow!(
                "Can't get parent directory for provided project file path '{:?}'",
                path
            )
        })?;
        let theme_dir = project_root.join("theme");
        let theme: Theme =
            serde_yaml::from_reader(open(&theme_dir.join("theme.yaml"), "theme")?)?;

        let site_root = match site_url {
            Some(value) if !value.trim().is_empty() => parse_site_root(value)?,
            _ => parse_site_root(&project.site_root)?,
        };
        let output_directory = match output_directory {
            Some(dir) => dir.to_owned(),
            None => project_root.join("_output"),
        };
        let nav = project
            .nav
            .unwrap_or_else(nav::default_entries)
            .iter()
            .map(|entry| NavLink::resolve(&site_root, entry))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let in_theme = |paths: Vec<PathBuf>| -> Vec<PathBuf> {
            paths.iter().map(|relpath| theme_dir.join(relpath)).collect()
        };

        Ok(Config {
            project_root: project_root.to_owned(),
            title: project.title,
            description: project.description,
            author: project.author,
            avatar: match project.avatar {
                Some(avatar) => Some(site_root.join(&avatar)?),
                None => None,
            },
            bio: project.bio,
            default_color_mode: project.color_mode,
            words_per_minute: project.words_per_minute.0,
            recent_posts: project.recent_posts.0,
            nav,
            work: project.work,
            blog_url: site_root.join("blog/")?,
            work_url: site_root.join("work/")?,
            static_url: site_root.join("static/")?,
            atom_url: site_root.join("feed.atom")?,
            json_feed_url: site_root.join("feed.json")?,
            site_root,
            posts_source_directory: project_root.join("posts"),
            static_source_directory: project_root.join("static"),
            blog_output_directory: output_directory.join("blog"),
            work_output_directory: output_directory.join("work"),
            static_output_directory: output_directory.join("static"),
            root_output_directory: output_directory,
            home_template: in_theme(theme.home_template),
            blog_template: in_theme(theme.blog_template),
            post_template: in_theme(theme.post_template),
            work_template: in_theme(theme.work_template),
        })
    }
}

/// Returns the first `folio.yaml` found in `dir` or its ancestors. Relative
/// directories are resolved first so the search reaches past them.
fn find_project_file(dir: &Path) -> Result<PathBuf> {
    let dir = dir
        .canonicalize()
        .with_context(|| format!("Resolving directory `{}`", dir.display()))?;
    dir.ancestors()
        .map(|ancestor| ancestor.join(PROJECT_FILE))
        .find(|path| path.is_file())
        .ok_or_else(|| anyhow!("Could not find `{}` in any parent directory", PROJECT_FILE))
}

fn open(path: &Path, kind: &str) -> Result<File> {
    File::open(path).with_context(|| format!("Opening {} file `{}`", kind, path.display()))
}

/// Parses the site root, making sure it ends in a slash so that joining
/// relative paths onto it appends rather than replaces the last segment.
pub fn parse_site_root(value: &str) -> Result<Url> {
    let value = value.trim();
    let url = if value.ends_with('/') {
        Url::parse(value)
    } else {
        Url::parse(&format!("{}/", value))
    }
    .with_context(|| format!("Invalid site root `{}`", value))?;
    if url.cannot_be_a_base() {
        return Err(anyhow!("Site root `{}` can't be used as a base URL", value));
    }
    Ok(url)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_site_root_adds_trailing_slash() -> Result<()> {
        assert_eq!(
            "https://example.com/jane/",
            parse_site_root("https://example.com/jane")?.as_str()
        );
        assert_eq!(
            "https://example.com/",
            parse_site_root("https://example.com/")?.as_str()
        );
        assert!(parse_site_root("not a url").is_err());
        assert!(parse_site_root("mailto:jane@example.com").is_err());
        Ok(())
    }

    #[test]
    fn test_from_directory() -> Result<()> {
        let root = Path::new("./testdata/site").canonicalize()?;
        let config = Config::from_directory(Path::new("./testdata/site/posts"), None)?;
        assert_eq!(root, config.project_root);
        assert_eq!("Jane Doe", config.title);
        assert_eq!(ColorMode::Dark, config.default_color_mode);
        assert_eq!(200, config.words_per_minute);
        assert_eq!(2, config.work.len());
        assert_eq!(
            vec!["Home", "Blog", "Work"],
            config.nav.iter().map(|l| l.label.as_str()).collect::<Vec<_>>()
        );
        assert_eq!(root.join("_output/blog"), config.blog_output_directory);
        assert_eq!(
            vec![root.join("theme/base.html"), root.join("theme/post.html")],
            config.post_template
        );
        Ok(())
    }

    #[test]
    fn test_find_project_file_searches_ancestors() -> Result<()> {
        let wanted = Path::new("./testdata/site").canonicalize()?.join(PROJECT_FILE);
        assert_eq!(wanted, find_project_file(Path::new("testdata/site"))?);
        assert_eq!(
            wanted,
            find_project_file(Path::new("testdata/site/posts/rust-for-typescript-devs"))?
        );
        Ok(())
    }

    #[test]
    fn test_site_url_override() -> Result<()> {
        let path = Path::new("./testdata/site").join(PROJECT_FILE);
        let config = Config::load(&path, None, Some("https://preview.example/jane"))?;
        assert_eq!("https://preview.example/jane/", config.site_root.as_str());
        assert_eq!("https://preview.example/jane/blog/", config.blog_url.as_str());
        assert_eq!(
            "https://preview.example/jane/feed.atom",
            config.atom_url.as_str()
        );
        assert_eq!(
            "https://preview.example/jane/feed.json",
            config.json_feed_url.as_str()
        );
        assert_eq!(
            Some("https://preview.example/jane/static/avatar.svg"),
            config.avatar.as_ref().map(Url::as_str)
        );
        assert_eq!("https://preview.example/jane/", config.nav[0].url.as_str());

        // A blank override keeps the project's own root.
        let config = Config::load(&path, None, Some("  "))?;
        assert_eq!("https://jane.example/", config.site_root.as_str());
        Ok(())
    }

    #[test]
    fn test_missing_project_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::from_directory(dir.path(), None).is_err());
    }
}
