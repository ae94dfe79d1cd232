use crate::url::Converter as LinkConverter;
use pulldown_cmark::*;
use std::fmt;
use url::{ParseError as UrlParseError, Url};

/// Converts markdown to HTML, appending the result to `out`.
///
/// * `blog_url` is the prefix for post URLs (e.g.,
///   https://example.org/blog/). This should end in a trailing slash.
/// * `source_path` is the relative path to the source file from the posts
///   directory.
/// * `markdown` is the markdown to convert.
pub fn to_html(
    out: &mut String,
    blog_url: &Url,
    source_path: &str,
    markdown: &str,
) -> Result<(), Error> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_SMART_PUNCTUATION);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    let event_converter = EventConverter {
        link_converter: LinkConverter::new(blog_url, source_path)?,
    };
    let events = Parser::new_ext(markdown, options)
        .map(|ev| event_converter.convert(ev))
        .collect::<Result<Vec<Event>, UrlParseError>>()?;
    html::push_html(out, events.into_iter());
    Ok(())
}

/// Converts markdown that isn't part of a post (the bio, work summaries) to
/// HTML. Headings and links are left alone.
pub fn fragment_to_html(markdown: &str) -> String {
    let mut out = String::new();
    html::push_html(&mut out, Parser::new(markdown));
    out
}

struct EventConverter<'a> {
    link_converter: LinkConverter<'a>,
}

impl<'a> EventConverter<'a> {
    fn convert_url<'b>(&self, url: CowStr<'b>) -> Result<CowStr<'b>, UrlParseError> {
        Ok(CowStr::Boxed(
            self.link_converter.convert(&url)?.into_boxed_str(),
        ))
    }

    fn convert_tag<'b>(&self, tag: Tag<'b>) -> Result<Tag<'b>, UrlParseError> {
        Ok(match tag {
            // The post title is the page's h1, so the post's own headings are
            // demoted one level: `#` becomes h2.
            Tag::Heading(s) => Tag::Heading((s + 1).min(6)),

            // Internal links (links from posts to other posts or to bundle
            // assets) need to be converted from their source formats to their
            // output locations (e.g., a post linking to another post as
            // `foo.md` will need to link to `{blog_url}foo/`). Email links
            // are left alone.
            Tag::Link(link, url, title) if link != LinkType::Email => {
                Tag::Link(link, self.convert_url(url)?, title)
            }
            Tag::Image(link, url, title) => {
                Tag::Image(link, self.convert_url(url)?, title)
            }
            _ => tag,
        })
    }

    fn convert<'b>(&self, ev: Event<'b>) -> Result<Event<'b>, UrlParseError> {
        Ok(match ev {
            Event::Start(tag) => Event::Start(self.convert_tag(tag)?),
            Event::End(tag) => Event::End(self.convert_tag(tag)?),
            _ => ev,
        })
    }
}

/// Represents an error converting markdown to HTML.
#[derive(Debug)]
pub enum Error {
    /// Returned when there is a problem parsing URLs.
    UrlParse(UrlParseError),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::UrlParse(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::UrlParse(err) => Some(err),
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

#[cfg(test)]
mod test {
    use super::*;

    fn render(source_path: &str, markdown: &str) -> Result<String, Error> {
        let blog_url = Url::parse("https://example.org/blog/")?;
        let mut out = String::new();
        to_html(&mut out, &blog_url, source_path, markdown)?;
        Ok(out)
    }

    #[test]
    fn test_headings_are_demoted() -> Result<(), Error> {
        assert_eq!(
            "<h2>Intro</h2>\n<h6>Deep</h6>\n",
            render("post.md", "# Intro\n\n###### Deep\n")?
        );
        Ok(())
    }

    #[test]
    fn test_links_to_posts_are_rewritten() -> Result<(), Error> {
        assert_eq!(
            "<p><a href=\"https://example.org/blog/other/\">other</a></p>\n",
            render("post.md", "[other](other.md)")?
        );
        Ok(())
    }

    #[test]
    fn test_bundle_images_are_absolute() -> Result<(), Error> {
        assert_eq!(
            "<p><img src=\"https://example.org/blog/post/diagram.png\" alt=\"diagram\" /></p>\n",
            render("post/index.md", "![diagram](./diagram.png)")?
        );
        Ok(())
    }

    #[test]
    fn test_fragment_to_html() {
        assert_eq!("<h1>Hi</h1>\n", fragment_to_html("# Hi"));
    }
}
