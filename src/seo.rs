//! Search-engine and social-card metadata for every page. Themes drop the
//! rendered tags straight into `<head>` via the `seo` template field.

use chrono::NaiveDate;
use pulldown_cmark::escape::escape_html;
use std::io;
use url::Url;

/// What kind of page the metadata describes (`og:type`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    Website,
    Article,
}

impl Kind {
    fn as_str(self) -> &'static str {
        match self {
            Kind::Website => "website",
            Kind::Article => "article",
        }
    }
}

/// The metadata for one page.
#[derive(Clone, Debug)]
pub struct Seo<'a> {
    /// The full document title, already combined with the site title.
    pub title: String,
    pub description: &'a str,
    pub canonical_url: &'a Url,
    pub image: Option<&'a Url>,
    pub kind: Kind,
    pub published: Option<NaiveDate>,
}

impl<'a> Seo<'a> {
    /// Metadata for a top-level page. The site's own title is used alone for
    /// the home page and as a suffix everywhere else.
    pub fn page(
        site_title: &str,
        page_title: Option<&str>,
        description: &'a str,
        canonical_url: &'a Url,
    ) -> Seo<'a> {
        Seo {
            title: match page_title {
                Some(page_title) => format!("{} | {}", page_title, site_title),
                None => site_title.to_owned(),
            },
            description,
            canonical_url,
            image: None,
            kind: Kind::Website,
            published: None,
        }
    }

    /// Renders the `<title>`, `<meta>` and canonical `<link>` tags.
    pub fn to_html(&self) -> io::Result<String> {
        let mut tags = Vec::new();
        tags.push(format!("<title>{}</title>", escape(&self.title)?));
        tags.push(meta_name("description", self.description)?);
        tags.push(format!(
            "<link rel=\"canonical\" href=\"{}\" />",
            escape(self.canonical_url.as_str())?
        ));
        tags.push(meta_property("og:title", &self.title)?);
        tags.push(meta_property("og:description", self.description)?);
        tags.push(meta_property("og:url", self.canonical_url.as_str())?);
        tags.push(meta_property("og:type", self.kind.as_str())?);
        if let Some(image) = self.image {
            tags.push(meta_property("og:image", image.as_str())?);
        }
        if let Some(published) = self.published {
            tags.push(meta_property(
                "article:published_time",
                &published.format("%Y-%m-%d").to_string(),
            )?);
        }
        tags.push(meta_name(
            "twitter:card",
            match self.image {
                Some(_) => "summary_large_image",
                None => "summary",
            },
        )?);
        Ok(tags.join("\n"))
    }
}

fn meta_name(name: &str, content: &str) -> io::Result<String> {
    Ok(format!(
        "<meta name=\"{}\" content=\"{}\" />",
        name,
        escape(content)?
    ))
}

fn meta_property(property: &str, content: &str) -> io::Result<String> {
    Ok(format!(
        "<meta property=\"{}\" content=\"{}\" />",
        property,
        escape(content)?
    ))
}

fn escape(s: &str) -> io::Result<String> {
    let mut out = String::with_capacity(s.len());
    escape_html(&mut out, s)?;
    Ok(out)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_page() -> Result<(), Box<dyn std::error::Error>> {
        let url = Url::parse("https://example.com/work/")?;
        let html = Seo::page("Jane Doe", Some("Work"), "Where I've worked", &url)
            .to_html()?;
        assert!(html.contains("<title>Work | Jane Doe</title>"));
        assert!(html.contains(
            "<link rel=\"canonical\" href=\"https://example.com/work/\" />"
        ));
        assert!(html.contains("<meta property=\"og:type\" content=\"website\" />"));
        assert!(html.contains("<meta name=\"twitter:card\" content=\"summary\" />"));
        assert!(!html.contains("og:image"));
        Ok(())
    }

    #[test]
    fn test_article_with_image_is_escaped() -> Result<(), Box<dyn std::error::Error>> {
        let url = Url::parse("https://example.com/blog/quotes/")?;
        let image = Url::parse("https://example.com/blog/quotes/banner.png")?;
        let seo = Seo {
            title: String::from("\"Quotes\" & <tags> | Jane"),
            description: "Tom & Jerry",
            canonical_url: &url,
            image: Some(&image),
            kind: Kind::Article,
            published: Some(NaiveDate::from_ymd_opt(2022, 9, 12).unwrap()),
        };
        let html = seo.to_html()?;
        assert!(html.contains(
            "<title>&quot;Quotes&quot; &amp; &lt;tags&gt; | Jane</title>"
        ));
        assert!(html.contains("content=\"Tom &amp; Jerry\""));
        assert!(html.contains(
            "<meta property=\"article:published_time\" content=\"2022-09-12\" />"
        ));
        assert!(html.contains(
            "<meta name=\"twitter:card\" content=\"summary_large_image\" />"
        ));
        Ok(())
    }
}
