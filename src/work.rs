//! Work history entries listed on the work page.

use crate::markdown;
use gtmpl::Value;
use serde::Deserialize;
use std::collections::HashMap;

/// A position held, as written in `folio.yaml`. Dates are free-form display
/// strings (`2020`, `March 2021`) and an entry without an `end` is current.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct WorkEntry {
    pub company: String,
    pub role: String,
    pub start: String,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub url: Option<String>,

    /// Markdown.
    #[serde(default)]
    pub summary: String,
}

impl WorkEntry {
    /// e.g. `2020 - Present`
    pub fn period(&self) -> String {
        format!(
            "{} - {}",
            self.start,
            self.end.as_deref().unwrap_or("Present")
        )
    }

    pub fn to_value(&self) -> Value {
        let opt = |o: &Option<String>| match o {
            Some(s) => Value::String(s.clone()),
            None => Value::Nil,
        };
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("company".to_owned(), Value::String(self.company.clone()));
        m.insert("role".to_owned(), Value::String(self.role.clone()));
        m.insert("start".to_owned(), Value::String(self.start.clone()));
        m.insert("end".to_owned(), opt(&self.end));
        m.insert("period".to_owned(), Value::String(self.period()));
        m.insert("current".to_owned(), Value::Bool(self.end.is_none()));
        m.insert("location".to_owned(), opt(&self.location));
        m.insert("url".to_owned(), opt(&self.url));
        m.insert(
            "summary".to_owned(),
            Value::String(markdown::fragment_to_html(&self.summary)),
        );
        Value::Object(m)
    }
}
