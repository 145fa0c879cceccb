//! Document assembly
//!
//! Pure functions that turn an ordered list of generated sections plus
//! metadata into the final [`GeneratedPost`]. No I/O happens here.

pub mod html;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use html::{escape_html, strip_tags};

/// Words per minute used for the read-time estimate.
pub const WORDS_PER_MINUTE: usize = 200;

/// Maximum number of tags derived from the title.
const MAX_TAGS: usize = 5;

const TAG_STOP_WORDS: &[&str] = &[
    "about", "after", "before", "best", "from", "guide", "have", "into", "over", "that", "their",
    "there", "these", "this", "what", "when", "where", "which", "while", "with", "your",
];

/// One generated section, in outline order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub title: String,
    pub content_html: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_caption: Option<String>,
}

impl Section {
    pub fn new(title: impl Into<String>, content_html: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content_html: content_html.into(),
            image_url: None,
            image_caption: None,
        }
    }

    pub fn with_image(mut self, url: impl Into<String>, caption: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self.image_caption = Some(caption.into());
        self
    }
}

/// Table of contents entry; `anchor` matches the section heading's `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    pub anchor: String,
    pub title: String,
}

/// Standalone results that are not sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostMetadata {
    pub excerpt: String,
    pub faq_html: Option<String>,
    pub hero_image_url: Option<String>,
    pub generated_at: DateTime<Utc>,
}

/// The pipeline's output artifact, handed to whatever persists it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedPost {
    pub title: String,
    pub content_html: String,
    pub excerpt: String,
    pub slug: String,
    pub read_time_estimate: String,
    pub meta_description: String,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hero_image_url: Option<String>,
    pub table_of_contents: Vec<TocEntry>,
    pub generated_at: DateTime<Utc>,
}

/// Anchor id for the section at `index`.
pub fn section_anchor(index: usize) -> String {
    format!("section-{}", index)
}

/// Assemble the final post.
///
/// HTML order: hero image, introduction (section 0), table of contents,
/// remaining sections, FAQ. Every section, the introduction included, is listed
/// in the table of contents.
pub fn assemble(title: &str, sections: &[Section], metadata: &PostMetadata) -> GeneratedPost {
    let title = title.trim();
    let table_of_contents: Vec<TocEntry> = sections
        .iter()
        .enumerate()
        .map(|(i, section)| TocEntry {
            anchor: section_anchor(i),
            title: section.title.clone(),
        })
        .collect();

    let mut content = String::new();

    if let Some(url) = &metadata.hero_image_url {
        content.push_str(&format!(
            "<figure class=\"hero-image\"><img src=\"{}\" alt=\"{}\" loading=\"eager\" /></figure>\n",
            escape_html(url),
            escape_html(title)
        ));
    }

    let mut rest = sections.iter().enumerate();
    if let Some((i, intro)) = rest.next() {
        content.push_str(&render_section(i, intro));
    }

    content.push_str(&render_toc(&table_of_contents));

    for (i, section) in rest {
        content.push_str(&render_section(i, section));
    }

    if let Some(faq) = metadata.faq_html.as_deref().filter(|f| !f.trim().is_empty()) {
        content.push_str("<section class=\"faq\">\n<h2>Frequently Asked Questions</h2>\n");
        content.push_str(faq.trim());
        content.push_str("\n</section>\n");
    }

    let excerpt = metadata.excerpt.trim().to_string();

    GeneratedPost {
        title: title.to_string(),
        read_time_estimate: estimate_read_time(&content),
        content_html: content,
        meta_description: excerpt.clone(),
        excerpt,
        slug: slugify(title),
        tags: derive_tags(title),
        hero_image_url: metadata.hero_image_url.clone(),
        table_of_contents,
        generated_at: metadata.generated_at,
    }
}

fn render_section(index: usize, section: &Section) -> String {
    let mut html = format!(
        "<section>\n<h2 id=\"{}\">{}</h2>\n",
        section_anchor(index),
        escape_html(&section.title)
    );
    let body = section.content_html.trim();
    if !body.is_empty() {
        html.push_str(body);
        html.push('\n');
    }
    if let Some(url) = &section.image_url {
        let caption = section.image_caption.as_deref().unwrap_or(&section.title);
        html.push_str(&format!(
            "<figure><img src=\"{}\" alt=\"{}\" loading=\"lazy\" /><figcaption>{}</figcaption></figure>\n",
            escape_html(url),
            escape_html(caption),
            escape_html(caption)
        ));
    }
    html.push_str("</section>\n");
    html
}

fn render_toc(entries: &[TocEntry]) -> String {
    let mut html =
        String::from("<nav class=\"table-of-contents\">\n<h2>Table of Contents</h2>\n<ol>\n");
    for entry in entries {
        html.push_str(&format!(
            "<li><a href=\"#{}\">{}</a></li>\n",
            entry.anchor,
            escape_html(&entry.title)
        ));
    }
    html.push_str("</ol>\n</nav>\n");
    html
}

/// Lowercase, collapse every run of non-alphanumerics to one hyphen, trim hyphens.
///
/// ```
/// assert_eq!(
///     postforge::document::slugify("10 Best SEO Tools for 2025!"),
///     "10-best-seo-tools-for-2025"
/// );
/// ```
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    for c in title.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// Word count of the visible text in `html`.
pub fn count_words(html: &str) -> usize {
    strip_tags(html).split_whitespace().count()
}

/// `ceil(words / 200)` minutes, never less than one.
pub fn estimate_read_time(html: &str) -> String {
    let minutes = count_words(html).div_ceil(WORDS_PER_MINUTE).max(1);
    format!("{} min read", minutes)
}

/// Keyword tags from the title; never empty.
pub fn derive_tags(title: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for word in title.split(|c: char| !c.is_alphanumeric()) {
        let word = word.to_lowercase();
        if word.chars().count() <= 3 || TAG_STOP_WORDS.contains(&word.as_str()) {
            continue;
        }
        if !tags.contains(&word) {
            tags.push(word);
        }
        if tags.len() == MAX_TAGS {
            break;
        }
    }

    if tags.is_empty() {
        let whole = title.trim().to_lowercase();
        tags.push(if whole.is_empty() {
            "blog".to_string()
        } else {
            whole
        });
    }

    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn metadata() -> PostMetadata {
        PostMetadata {
            excerpt: " A short summary. ".to_string(),
            faq_html: Some("<h3>Q?</h3><p>A.</p>".to_string()),
            hero_image_url: Some("https://img.example.com/prompt/tea?seed=1".to_string()),
            generated_at: Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap(),
        }
    }

    fn sections(titles: &[&str]) -> Vec<Section> {
        titles
            .iter()
            .map(|t| Section::new(*t, format!("<p>Body of {}</p>", t)))
            .collect()
    }

    #[test]
    fn test_slug_example() {
        assert_eq!(slugify("10 Best SEO Tools for 2025!"), "10-best-seo-tools-for-2025");
    }

    #[test]
    fn test_slug_trims_and_collapses() {
        assert_eq!(slugify("  --Hello,   World!!  "), "hello-world");
        assert_eq!(slugify("!!!"), "");
        assert_eq!(slugify("Café & Crème"), "caf-cr-me");
    }

    #[test]
    fn test_toc_matches_outline_order_and_ids() {
        let titles = ["Introduction", "Why", "How", "Conclusion"];
        let post = assemble("Tea", &sections(&titles), &metadata());

        assert_eq!(post.table_of_contents.len(), titles.len());
        for (i, (entry, title)) in post.table_of_contents.iter().zip(titles).enumerate() {
            assert_eq!(entry.anchor, format!("section-{}", i));
            assert_eq!(entry.title, title);
            assert!(post
                .content_html
                .contains(&format!("<h2 id=\"section-{}\">{}</h2>", i, title)));
            assert!(post
                .content_html
                .contains(&format!("<a href=\"#section-{}\">", i)));
        }
    }

    #[test]
    fn test_html_order() {
        let post = assemble("Tea", &sections(&["Introduction", "Middle", "Conclusion"]), &metadata());
        let html = &post.content_html;

        let hero = html.find("hero-image").unwrap();
        let intro = html.find("Body of Introduction").unwrap();
        let toc = html.find("table-of-contents").unwrap();
        let middle = html.find("Body of Middle").unwrap();
        let conclusion = html.find("Body of Conclusion").unwrap();
        let faq = html.find("Frequently Asked Questions").unwrap();

        assert!(hero < intro && intro < toc && toc < middle);
        assert!(middle < conclusion && conclusion < faq);
    }

    #[test]
    fn test_optional_blocks_omitted() {
        let meta = PostMetadata {
            faq_html: None,
            hero_image_url: None,
            ..metadata()
        };
        let post = assemble("Tea", &sections(&["Introduction"]), &meta);

        assert!(!post.content_html.contains("hero-image"));
        assert!(!post.content_html.contains("faq"));
        assert!(post.hero_image_url.is_none());
    }

    #[test]
    fn test_section_image_with_escaped_caption() {
        let with_image = vec![
            Section::new("Introduction", "<p>x</p>"),
            Section::new("Tips", "<p>y</p>").with_image("https://img/x", "Tips & \"tricks\""),
        ];
        let post = assemble("Tea", &with_image, &metadata());

        assert!(post.content_html.contains(
            "<figcaption>Tips &amp; &quot;tricks&quot;</figcaption>"
        ));
    }

    #[test]
    fn test_metadata_fields() {
        let post = assemble("  Green Tea Benefits ", &sections(&["Introduction"]), &metadata());

        assert_eq!(post.title, "Green Tea Benefits");
        assert_eq!(post.slug, "green-tea-benefits");
        assert_eq!(post.excerpt, "A short summary.");
        assert_eq!(post.meta_description, post.excerpt);
        assert_eq!(post.tags, vec!["green", "benefits"]);
    }

    #[test]
    fn test_read_time_rounds_up() {
        let words = |n: usize| format!("<p>{}</p>", vec!["word"; n].join(" "));
        assert_eq!(estimate_read_time(""), "1 min read");
        assert_eq!(estimate_read_time(&words(200)), "1 min read");
        assert_eq!(estimate_read_time(&words(201)), "2 min read");
        assert_eq!(estimate_read_time(&words(400)), "2 min read");
    }

    #[test]
    fn test_count_words_ignores_markup() {
        assert_eq!(count_words("<h2 id=\"a\">Two words</h2><p>and three</p>"), 4);
    }

    #[test]
    fn test_tags_never_empty() {
        assert_eq!(derive_tags("AI"), vec!["ai"]);
        assert_eq!(derive_tags("   "), vec!["blog"]);
        assert_eq!(derive_tags("the best tea"), vec!["the best tea"]);
    }

    #[test]
    fn test_tags_dedup_and_cap() {
        let tags = derive_tags("Running running shoes boots socks laces trails hills");
        assert_eq!(tags, vec!["running", "shoes", "boots", "socks", "laces"]);
    }

    #[test]
    fn test_post_serializes_camel_case() {
        let post = assemble("Tea", &sections(&["Introduction"]), &metadata());
        let json = serde_json::to_value(&post).unwrap();

        assert!(json.get("contentHtml").is_some());
        assert!(json.get("readTimeEstimate").is_some());
        assert!(json.get("tableOfContents").is_some());
    }

    proptest! {
        #[test]
        fn prop_slug_is_normalized(title in "\\PC{0,60}") {
            let slug = slugify(&title);
            prop_assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
            prop_assert!(!slug.starts_with('-'));
            prop_assert!(!slug.ends_with('-'));
            prop_assert!(!slug.contains("--"));
        }

        #[test]
        fn prop_slug_is_idempotent(title in "\\PC{0,60}") {
            let slug = slugify(&title);
            prop_assert_eq!(slugify(&slug), slug);
        }

        #[test]
        fn prop_toc_length_matches_sections(count in 1usize..12) {
            let secs: Vec<Section> = (0..count)
                .map(|i| Section::new(format!("Heading {}", i), "<p>text</p>"))
                .collect();
            let post = assemble("Topic", &secs, &metadata());
            prop_assert_eq!(post.table_of_contents.len(), count);
            prop_assert_eq!(&post.table_of_contents[count - 1].anchor, &format!("section-{}", count - 1));
        }
    }
}
