//! Prompt construction for each pipeline stage.

use rand::seq::SliceRandom;

/// System context shared by every text generation call.
pub const SYSTEM_CONTEXT: &str = "You are an experienced blog writer. Write in clear, \
conversational English for a general audience. Return only the requested content with no \
preamble and no commentary about the task.";

/// Phrases the model is told to avoid.
pub const BANNED_PHRASES: &[&str] = &[
    "delve",
    "in today's fast-paced world",
    "in the ever-evolving landscape",
    "unlock the power",
    "game-changer",
    "it's important to note",
    "in conclusion",
    "embark on a journey",
    "navigate the complexities",
    "a testament to",
];

/// Internal tool page a section may link to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolLink {
    pub title: &'static str,
    pub path: &'static str,
}

/// Catalog of internal tool pages.
pub const TOOL_LINKS: &[ToolLink] = &[
    ToolLink {
        title: "CSS Formatter",
        path: "/tools/css-formatter",
    },
    ToolLink {
        title: "HTML Formatter",
        path: "/tools/html-formatter",
    },
    ToolLink {
        title: "SQL Formatter",
        path: "/tools/sql-formatter",
    },
    ToolLink {
        title: "Unit Converter",
        path: "/tools/unit-converter",
    },
    ToolLink {
        title: "Password Strength Checker",
        path: "/tools/password-checker",
    },
    ToolLink {
        title: "Email Validator",
        path: "/tools/email-validator",
    },
    ToolLink {
        title: "Word Counter",
        path: "/tools/word-counter",
    },
];

/// Random subset of the tool catalog, at least one entry.
pub fn sample_tool_links(count: usize) -> Vec<ToolLink> {
    let count = count.clamp(1, TOOL_LINKS.len());
    let mut rng = rand::thread_rng();
    TOOL_LINKS.choose_multiple(&mut rng, count).copied().collect()
}

pub fn outline_prompt(topic: &str) -> String {
    format!(
        "Create an outline for a blog post about \"{topic}\". \
Return ONLY a JSON array of 6 to 8 section titles as strings. \
The first title must be \"Introduction\" and the last must be \"Conclusion\". \
Do not wrap the array in Markdown and do not add any other text."
    )
}

/// Prompt for one section body.
pub fn section_prompt(
    topic: &str,
    section_title: &str,
    index: usize,
    total: usize,
    links: &[ToolLink],
) -> String {
    let link_list = links
        .iter()
        .map(|link| format!("- <a href=\"{}\">{}</a>", link.path, link.title))
        .collect::<Vec<_>>()
        .join("\n");

    let position = if index == 0 {
        "This is the opening section; hook the reader and state what the post covers."
    } else if index + 1 == total {
        "This is the final section; summarize the key takeaways without repeating headings."
    } else {
        "This is a body section; go into practical detail with concrete examples."
    };

    format!(
        "Write the section \"{section_title}\" (section {number} of {total}) for a blog post about \
\"{topic}\".\n\
{position}\n\n\
Rules:\n\
- Output HTML using only <p>, <ul>, <ol>, <li>, <strong>, <em>, <h3> and <a> tags. Do not repeat \
the section title as a heading.\n\
- 200 to 350 words.\n\
- Never use these phrases: {banned}.\n\
- Include at least one of these internal links, using the relative href exactly as given:\n\
{link_list}\n\
- You may cite one reputable external source with <a href=\"https://...\" rel=\"nofollow\">.\n\
- Only if you name a specific, real product, you may add one \"buy\" link for it with \
rel=\"sponsored\". Never invent products.",
        number = index + 1,
        banned = BANNED_PHRASES.join(", "),
    )
}

pub fn faq_prompt(topic: &str) -> String {
    format!(
        "Write 5 to 7 frequently asked questions with answers about \"{topic}\". \
Format each pair as <h3>question</h3><p>answer</p>. Return only the HTML."
    )
}

pub fn excerpt_prompt(topic: &str) -> String {
    format!(
        "Write a plain-text summary of about 150 characters for a blog post about \"{topic}\". \
No HTML, no quotes, no hashtags. Return only the summary."
    )
}

pub fn hero_image_prompt(topic: &str) -> String {
    format!("{topic}, editorial blog header photograph, natural light, high detail")
}

pub fn section_image_prompt(topic: &str, section_title: &str) -> String {
    format!("{section_title}, {topic}, illustrative photograph, clean composition")
}
