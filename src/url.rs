//! Rewrites links found in post markdown into links to rendered pages. Posts
//! link to one another by source file (`other.md` or `other/index.md`) and
//! those links have to point at the rendered page (`{blog_url}other/`)
//! instead. Everything else is made absolute so that it resolves the same way
//! from any page.

use url::{ParseError, Url};

const MARKDOWN_EXTENSION: &str = ".md";
const BUNDLE_INDEX: &str = "/index.md";

pub struct Converter<'a> {
    blog_root: &'a Url,
    base: Url,
}

impl<'a> Converter<'a> {
    /// Constructs a new `Converter`
    ///
    /// # Arguments
    ///
    /// * `blog_root` - the URL prefix for posts. This should end in a trailing
    ///   slash.
    /// * `source_path` - the path of the post's source file relative to the
    ///   posts directory (e.g. `foo.md` or `foo/index.md`). Relative links are
    ///   resolved against it.
    pub fn new(blog_root: &'a Url, source_path: &str) -> Result<Converter<'a>> {
        Ok(Converter {
            blog_root,
            base: blog_root.join(source_path)?,
        })
    }

    /// Returns the slug for a posts-relative source path, or `None` if the
    /// path doesn't name a post.
    fn post_slug(relative: &str) -> Option<String> {
        let stem = match relative.strip_suffix(BUNDLE_INDEX) {
            Some(bundle) => bundle,
            None => relative.strip_suffix(MARKDOWN_EXTENSION)?,
        };
        if stem.is_empty() || stem.contains('/') {
            None
        } else {
            Some(slug::slugify(stem))
        }
    }

    fn convert_absolute(&self, mut absolute: Url) -> Result<Url> {
        let fragment = absolute.fragment().map(str::to_owned);
        absolute.set_fragment(None);
        if let Some(relative) = self.blog_root.make_relative(&absolute) {
            if !relative.starts_with("../") {
                if let Some(slug) = Self::post_slug(&relative) {
                    let mut page = self.blog_root.join(&format!("{}/", slug))?;
                    page.set_fragment(fragment.as_deref());
                    return Ok(page);
                }
            }
        }
        absolute.set_fragment(fragment.as_deref());
        Ok(absolute)
    }

    pub fn convert(&self, url: &str) -> Result<String> {
        // In-page anchors stay as they are.
        if url.starts_with('#') {
            return Ok(url.to_owned());
        }
        let absolute = match Url::parse(url) {
            Ok(absolute) => absolute,
            Err(ParseError::RelativeUrlWithoutBase) => self.base.join(url)?,
            Err(e) => return Err(e),
        };
        Ok(self.convert_absolute(absolute)?.to_string())
    }
}

type Result<T> = std::result::Result<T, ParseError>;
