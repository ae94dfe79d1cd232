//! Site navigation.

use gtmpl::Value;
use serde::Deserialize;
use std::collections::HashMap;
use url::Url;

/// A navigation entry as written in `folio.yaml`. `path` is relative to the
/// site root (`""` is the home page).
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct NavEntry {
    pub label: String,
    #[serde(default)]
    pub path: String,
}

/// The entries used when `folio.yaml` doesn't list any.
pub fn default_entries() -> Vec<NavEntry> {
    [("Home", ""), ("Blog", "blog/"), ("Work", "work/")]
        .iter()
        .map(|(label, path)| NavEntry {
            label: (*label).to_owned(),
            path: (*path).to_owned(),
        })
        .collect()
}

/// A resolved navigation link.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavLink {
    pub label: String,
    pub url: Url,
}

impl NavLink {
    pub fn resolve(site_root: &Url, entry: &NavEntry) -> Result<NavLink, url::ParseError> {
        Ok(NavLink {
            label: entry.label.clone(),
            url: site_root.join(&entry.path)?,
        })
    }

    /// A link is active on `page` when it points at the page itself or at one
    /// of its ancestors. The site root only matches itself so that Home isn't
    /// highlighted everywhere.
    pub fn is_active(&self, site_root: &Url, page: &Url) -> bool {
        if self.url == *site_root {
            return page == site_root;
        }
        page.as_str().starts_with(self.url.as_str())
    }
}

/// Converts the navigation into a template array of `{label, url, active}`
/// objects for `page`.
pub fn to_value(links: &[NavLink], site_root: &Url, page: &Url) -> Value {
    Value::Array(
        links
            .iter()
            .map(|link| {
                let mut m: HashMap<String, Value> = HashMap::new();
                m.insert("label".to_owned(), Value::String(link.label.clone()));
                m.insert("url".to_owned(), Value::String(link.url.to_string()));
                m.insert(
                    "active".to_owned(),
                    Value::Bool(link.is_active(site_root, page)),
                );
                Value::Object(m)
            })
            .collect(),
    )
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_active() -> Result<(), url::ParseError> {
        let root = Url::parse("https://example.com/")?;
        let links: Vec<NavLink> = default_entries()
            .iter()
            .map(|e| NavLink::resolve(&root, e))
            .collect::<Result<_, _>>()?;

        let post = root.join("blog/some-post/")?;
        let active: Vec<&str> = links
            .iter()
            .filter(|l| l.is_active(&root, &post))
            .map(|l| l.label.as_str())
            .collect();
        assert_eq!(vec!["Blog"], active);

        let home: Vec<&str> = links
            .iter()
            .filter(|l| l.is_active(&root, &root))
            .map(|l| l.label.as_str())
            .collect();
        assert_eq!(vec!["Home"], home);
        Ok(())
    }
}
