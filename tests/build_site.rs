use folio::build::build_site;
use folio::config::Config;
use folio::theme::{ColorMode, MemoryStore, ThemeContext};
use std::fs;
use std::path::Path;

fn build_fixture(output: &Path) -> Config {
    let config = Config::from_directory(Path::new("testdata/site"), Some(output)).unwrap();
    let theme = ThemeContext::resolve(&MemoryStore::default(), config.default_color_mode);
    build_site(&config, theme).unwrap();
    config
}

fn read(output: &Path, relative_path: &str) -> String {
    fs::read_to_string(output.join(relative_path))
        .unwrap_or_else(|e| panic!("reading `{}`: {}", relative_path, e))
}

fn position(haystack: &str, needle: &str) -> usize {
    haystack
        .find(needle)
        .unwrap_or_else(|| panic!("`{}` not found", needle))
}

#[test]
fn test_home_page() {
    let out = tempfile::tempdir().unwrap();
    let config = build_fixture(out.path());
    assert_eq!(ColorMode::Dark, config.default_color_mode);

    let home = read(out.path(), "index.html");
    assert!(home.contains("<html data-theme=\"dark\">"));
    assert!(home.contains("data-switch-to=\"light\""));
    assert!(home.contains("<title>Jane Doe</title>"));
    assert!(home.contains("<strong>developer tools</strong>"));

    // Only the two most recent posts are listed.
    assert!(home.contains("Rust for TypeScript developers"));
    assert!(home.contains("Hello, Rust"));
    assert!(!home.contains("Building accessible React components"));
}

#[test]
fn test_blog_index_is_grouped_by_month() {
    let out = tempfile::tempdir().unwrap();
    build_fixture(out.path());

    let blog = read(out.path(), "blog/index.html");
    let september = position(&blog, "<h2>September 2022</h2>");
    let march = position(&blog, "<h2>March 2022</h2>");
    let october = position(&blog, "<h2>October 2021</h2>");
    assert!(september < march && march < october);
    assert!(blog.contains("September 12, 2022"));
    assert!(blog.contains("class=\"active\">Blog</a>"));
    assert!(blog.contains("<title>Blog | Jane Doe</title>"));
}

#[test]
fn test_post_pages() {
    let out = tempfile::tempdir().unwrap();
    build_fixture(out.path());

    let rust = read(out.path(), "blog/rust-for-typescript-devs/index.html");
    assert!(rust.contains("<i class=\"icon-rocket\"></i>LogRocket</a>"));
    assert!(rust.contains("<span>for TypeScript devs</span>"));
    assert!(rust.contains("<h2>Ownership</h2>"));
    assert!(rust.contains("<meta property=\"og:type\" content=\"article\" />"));
    assert!(rust.contains("rel=\"next\""));
    assert!(!rust.contains("rel=\"prev\""));
    assert!(out
        .path()
        .join("blog/rust-for-typescript-devs/banner.svg")
        .is_file());

    let hello = read(out.path(), "blog/hello-world/index.html");
    assert!(!hello.contains("banner-link"));
    assert!(hello.contains("rel=\"prev\""));

    let first = read(out.path(), "blog/first-post/index.html");
    assert!(first.contains(">external</a>"));
    assert!(!first.contains("<i class=\"icon-"));
}

#[test]
fn test_work_page_and_static_files() {
    let out = tempfile::tempdir().unwrap();
    build_fixture(out.path());

    let work = read(out.path(), "work/index.html");
    assert!(work.contains("Senior Engineer"));
    assert!(work.contains("2021 - Present"));
    assert!(work.contains("2018 - 2021"));
    assert!(work.contains("<em>TPS report</em>"));
    assert!(out.path().join("static/style.css").is_file());
    assert!(out.path().join("static/avatar.svg").is_file());
}

#[test]
fn test_feeds() {
    let out = tempfile::tempdir().unwrap();
    build_fixture(out.path());

    let json: serde_json::Value = serde_json::from_str(&read(out.path(), "feed.json")).unwrap();
    let titles: Vec<&str> = json["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["title"].as_str().unwrap())
        .collect();
    assert_eq!(
        vec![
            "Rust for TypeScript developers",
            "Hello, Rust",
            "Building accessible React components",
        ],
        titles
    );

    let atom = read(out.path(), "feed.atom");
    assert_eq!(3, atom.matches("<entry>").count());
}

#[test]
fn test_rebuild_is_identical() {
    let out = tempfile::tempdir().unwrap();
    build_fixture(out.path());
    let first = (
        read(out.path(), "blog/index.html"),
        read(out.path(), "feed.atom"),
        read(out.path(), "feed.json"),
    );
    build_fixture(out.path());
    let second = (
        read(out.path(), "blog/index.html"),
        read(out.path(), "feed.atom"),
        read(out.path(), "feed.json"),
    );
    assert_eq!(first, second);
}

#[test]
fn test_invalid_post_fails_before_writing() {
    let project = tempfile::tempdir().unwrap();
    let root = project.path();
    fs::create_dir_all(root.join("posts")).unwrap();
    fs::create_dir_all(root.join("theme")).unwrap();
    fs::write(
        root.join("folio.yaml"),
        "title: Broken\nsite_root: https://broken.example/\n",
    )
    .unwrap();
    fs::write(
        root.join("theme/theme.yaml"),
        "home_template: [page.html]\nblog_template: [page.html]\n\
         post_template: [page.html]\nwork_template: [page.html]\n",
    )
    .unwrap();
    fs::write(root.join("theme/page.html"), "{{.url}}").unwrap();
    fs::write(
        root.join("posts/bad.md"),
        "---\ntitle: Bad\ndate: not-a-date\n---\n",
    )
    .unwrap();

    let out = root.join("_output");
    fs::create_dir_all(out.join("blog")).unwrap();
    fs::write(out.join("blog/index.html"), "previous build").unwrap();

    let config = Config::from_directory(root, None).unwrap();
    let theme = ThemeContext::resolve(&MemoryStore::default(), ColorMode::Light);
    let err = build_site(&config, theme).unwrap_err();
    assert!(err.to_string().contains("bad.md"));
    assert_eq!("previous build", read(&out, "blog/index.html"));
}
