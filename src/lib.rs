//! The library code for the `folio` static site generator, which builds a
//! personal portfolio and blog. The architecture can be generally broken down
//! into two distinct steps:
//!
//! 1. Parsing posts from source files on disk ([`crate::parser`]), validating
//!    their frontmatter ([`crate::frontmatter`]) and classifying their banner
//!    links ([`crate::banner`])
//! 2. Converting the posts into output files on disk ([`crate::write`] and
//!    [`crate::feed`])
//!
//! The second step renders four kinds of page: the home page, the blog index
//! (posts grouped by month, see [`crate::index`]), one page per post, and the
//! work-history page. Every page is rendered with the same site-wide context:
//! navigation ([`crate::nav`]), SEO tags ([`crate::seo`]) and the active color
//! mode ([`crate::theme`]).

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod banner;
pub mod build;
pub mod config;
pub mod feed;
pub mod frontmatter;
pub mod index;
pub mod markdown;
pub mod nav;
pub mod parser;
pub mod post;
pub mod seo;
pub mod theme;
pub mod url;
pub mod work;
pub mod write;
