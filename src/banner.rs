//! Classifies a post's outbound banner link into one of a handful of known
//! publishing platforms. Posts that were cross-posted elsewhere carry an
//! `externalUrl` in their frontmatter, and the banner shows a small badge
//! naming the platform.

use gtmpl::Value;
use std::collections::HashMap;
use std::fmt;

/// A publishing platform a post may have been syndicated to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Platform {
    LogRocket,
    Medium,
    FreeCodeCamp,

    /// Any URL that doesn't match a known platform.
    External,
}

/// Ordered classification table; the first matching needle wins.
const KNOWN_PLATFORMS: &[(&str, Platform)] = &[
    ("blog.logrocket.com", Platform::LogRocket),
    ("javascript.plainenglish.io", Platform::Medium),
    ("freecodecamp.org", Platform::FreeCodeCamp),
];

impl Platform {
    /// Classifies a URL by substring match against [`KNOWN_PLATFORMS`].
    pub fn classify(url: &str) -> Platform {
        KNOWN_PLATFORMS
            .iter()
            .find(|(needle, _)| url.contains(needle))
            .map(|(_, platform)| *platform)
            .unwrap_or(Platform::External)
    }

    /// The badge text.
    pub fn label(self) -> &'static str {
        match self {
            Platform::LogRocket => "LogRocket",
            Platform::Medium => "Medium",
            Platform::FreeCodeCamp => "FreeCodeCamp",
            Platform::External => "external",
        }
    }

    /// The icon identifier themes use to pick an icon. The generic fallback
    /// has none.
    pub fn icon(self) -> Option<&'static str> {
        match self {
            Platform::LogRocket => Some("rocket"),
            Platform::Medium => Some("medium"),
            Platform::FreeCodeCamp => Some("freecodecamp"),
            Platform::External => None,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A classified outbound link rendered over a post's banner image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BannerLink {
    pub url: String,
    pub platform: Platform,
}

impl BannerLink {
    /// Returns `None` when there is no URL (or only whitespace), in which case
    /// no link is rendered at all.
    pub fn classify(external_url: Option<&str>) -> Option<BannerLink> {
        let url = external_url?.trim();
        if url.is_empty() {
            return None;
        }
        Some(BannerLink {
            url: url.to_owned(),
            platform: Platform::classify(url),
        })
    }

    pub fn label(&self) -> &'static str {
        self.platform.label()
    }

    pub fn icon(&self) -> Option<&'static str> {
        self.platform.icon()
    }
}

impl From<&BannerLink> for Value {
    /// Converts a [`BannerLink`] into a template object with `url`, `label`
    /// and `icon` (nil for the generic fallback) fields.
    fn from(link: &BannerLink) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("url".to_owned(), Value::String(link.url.clone()));
        m.insert("label".to_owned(), Value::String(link.label().to_owned()));
        m.insert(
            "icon".to_owned(),
            match link.icon() {
                Some(icon) => Value::String(icon.to_owned()),
                None => Value::Nil,
            },
        );
        Value::Object(m)
    }
}
