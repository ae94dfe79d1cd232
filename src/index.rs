//! Builds the blog listing: posts grouped by calendar month, the most recent
//! month first and the most recent post first within each month.

use crate::post::Post;
use chrono::{Datelike, NaiveDate};
use gtmpl::Value;
use std::cmp::Ordering;
use std::collections::HashMap;

/// A run of posts sharing a calendar month.
#[derive(Debug)]
pub struct MonthGroup<'a> {
    /// e.g. `September 2022`
    pub label: String,

    /// The first day of the month the group represents.
    pub month: NaiveDate,

    /// Newest first.
    pub posts: Vec<&'a Post>,
}

impl MonthGroup<'_> {
    /// Converts the group into a template object with `label` and `posts`
    /// (post summaries) fields.
    pub fn to_value(&self) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("label".to_owned(), Value::String(self.label.clone()));
        m.insert(
            "posts".to_owned(),
            Value::Array(self.posts.iter().map(|p| p.summarize()).collect()),
        );
        Value::Object(m)
    }
}

/// Full month name and four-digit year of `date`.
pub fn month_label(date: NaiveDate) -> String {
    date.format("%B %Y").to_string()
}

/// Orders posts newest first. Posts published on the same day are ordered by
/// slug so that repeated builds produce identical output.
pub fn newest_first(a: &Post, b: &Post) -> Ordering {
    b.published_at
        .cmp(&a.published_at)
        .then_with(|| a.slug.cmp(&b.slug))
}

/// Sorts posts with [`newest_first`].
pub fn sort_newest_first(posts: &mut [&Post]) {
    posts.sort_by(|a, b| newest_first(a, b));
}

/// Groups `posts` (in any order) by month.
///
/// The posts are sorted first and then grouped in a single pass: each post
/// joins the most recently opened group when its month label matches and opens
/// a new group otherwise. Sorting is what keeps every month contiguous.
pub fn group_by_month(posts: &[Post]) -> Vec<MonthGroup<'_>> {
    let mut sorted: Vec<&Post> = posts.iter().collect();
    sort_newest_first(&mut sorted);

    let mut groups: Vec<MonthGroup> = Vec::new();
    for post in sorted {
        let label = month_label(post.published_at);
        if let Some(last) = groups.last_mut() {
            if last.label == label {
                last.posts.push(post);
                continue;
            }
        }
        groups.push(MonthGroup {
            label,
            month: post.published_at.with_day(1).unwrap_or(post.published_at),
            posts: vec![post],
        });
    }
    groups
}
