use chrono::Utc;
use once_cell::sync::Lazy;
use pulldown_cmark::{html, Event, Options, Parser};
use regex::{Captures, Regex};

use crate::models::{GeneratedPost, RenderedPost};
use crate::post::AFFILIATE_MARKER;

const DEFAULT_CONCLUSION_HEADING: &str = "Conclusion";

/// Stands in for an affiliate marker while its block goes through the
/// Markdown renderer, which would otherwise split it into separate text events.
static AFFILIATE_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\x{E000}(\d+)\x{E001}").expect("Failed to compile affiliate token regex")
});

pub fn render_post(post: &GeneratedPost) -> RenderedPost {
    RenderedPost {
        title: post.title.clone(),
        html: render_html(post),
        markdown: render_markdown(post),
        generated_at: Utc::now(),
    }
}

fn conclusion_heading(post: &GeneratedPost) -> &str {
    if post.conclusion_heading.is_empty() {
        DEFAULT_CONCLUSION_HEADING
    } else {
        &post.conclusion_heading
    }
}

pub fn render_html(post: &GeneratedPost) -> String {
    let mut html = String::with_capacity(post.intro.len() * 4 + 2048);
    html.push_str("<article class=\"post\">\n");

    if !post.title.is_empty() {
        html.push_str(&format!("<h1>{}</h1>\n", inline(&post.title)));
    }
    if !post.intro.is_empty() {
        html.push_str("<div class=\"intro\">\n");
        render_blocks(&post.intro, &mut html);
        html.push_str("</div>\n");
    }
    for section in &post.sections {
        html.push_str("<section>\n");
        html.push_str(&format!("<h2>{}</h2>\n", inline(&section.heading)));
        render_blocks(&section.body, &mut html);
        html.push_str("</section>\n");
    }
    if !post.conclusion.is_empty() {
        html.push_str(&format!(
            "<section class=\"conclusion\">\n<h2>{}</h2>\n",
            inline(conclusion_heading(post))
        ));
        render_blocks(&post.conclusion, &mut html);
        html.push_str("</section>\n");
    }

    html.push_str("</article>\n");
    html
}

/// Canonical Markdown form of the post. Affiliate markers are left as-is.
pub fn render_markdown(post: &GeneratedPost) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(post.sections.len() + 3);

    if !post.title.is_empty() {
        parts.push(format!("# {}", post.title));
    }
    if !post.intro.is_empty() {
        parts.push(post.intro.clone());
    }
    for section in &post.sections {
        if section.body.is_empty() {
            parts.push(format!("## {}", section.heading));
        } else {
            parts.push(format!("## {}\n\n{}", section.heading, section.body));
        }
    }
    if !post.conclusion.is_empty() {
        parts.push(format!("## {}\n\n{}", conclusion_heading(post), post.conclusion));
    }

    let mut markdown = parts.join("\n\n");
    markdown.push('\n');
    markdown
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn affiliate_link(product: &str) -> String {
    let product = escape_html(product.trim());
    format!(
        "<a href=\"#\" class=\"affiliate-link\" rel=\"sponsored nofollow\" data-product=\"{product}\">{product}</a>"
    )
}

/// Escapes a heading and turns affiliate markers into links.
fn inline(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for caps in AFFILIATE_MARKER.captures_iter(text) {
        let Some(marker) = caps.get(0) else { continue };
        out.push_str(&escape_html(&text[last..marker.start()]));
        out.push_str(&affiliate_link(&caps[1]));
        last = marker.end();
    }
    out.push_str(&escape_html(&text[last..]));
    out
}

/// CommonMark (with tables and strikethrough) to HTML. Raw HTML from the
/// model is shown as text, never passed through.
fn render_blocks(text: &str, out: &mut String) {
    let mut products: Vec<String> = Vec::new();
    let source = AFFILIATE_MARKER.replace_all(text, |caps: &Captures| {
        products.push(caps[1].to_string());
        format!("\u{E000}{}\u{E001}", products.len() - 1)
    });

    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    let events = Parser::new_ext(&source, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });
    let mut rendered = String::with_capacity(source.len() * 2);
    html::push_html(&mut rendered, events);

    let linked = AFFILIATE_TOKEN.replace_all(&rendered, |caps: &Captures| {
        caps[1]
            .parse::<usize>()
            .ok()
            .and_then(|idx| products.get(idx))
            .map(|product| affiliate_link(product))
            .unwrap_or_default()
    });
    out.push_str(&linked);
}
