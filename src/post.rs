//! Tolerant parsing of raw model output into a [`GeneratedPost`].
//!
//! The model is asked for Markdown with a `#` title, `##` sections and a
//! closing `## Conclusion`, but nothing guarantees it complies. The parser
//! never fails: it returns whatever structure it can find and lists the
//! expected parts that were missing so callers can decide what to accept.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::models::{GeneratedPost, ParsedPost, PostField, Section};

pub const MIN_SECTIONS: usize = 3;
pub const MAX_SECTIONS: usize = 5;

/// `[Product Name - Affiliate Link Here]`, capturing the product name.
pub(crate) static AFFILIATE_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\[([^\[\]\n]+?)\s+-\s+affiliate link here\]")
        .expect("Failed to compile affiliate marker regex")
});

static HTML_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^<h([12])(?:\s[^>]*)?>(.*?)</h[12]>$").expect("Failed to compile heading regex")
});

static CONCLUSION_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:in conclusion|conclusion|final thoughts|wrapping up|summary|the bottom line|bottom line|final verdict|verdict)(?:\s*[.!]|\s*:.{0,60})?$",
    )
    .expect("Failed to compile conclusion regex")
});

/// Level and text of an H1/H2 line. Deeper headings stay part of the body.
fn heading(line: &str) -> Option<(u8, String)> {
    let trimmed = line.trim();

    if let Some(caps) = HTML_HEADING.captures(trimmed) {
        let level = if &caps[1] == "1" { 1 } else { 2 };
        return Some((level, clean_heading(&caps[2])));
    }

    let hashes = trimmed.chars().take_while(|c| *c == '#').count();
    if hashes == 0 || hashes > 2 {
        return None;
    }
    let rest = &trimmed[hashes..];
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let text = clean_heading(rest.trim_end_matches('#'));
    if text.is_empty() {
        return None;
    }
    Some((hashes as u8, text))
}

fn clean_heading(text: &str) -> String {
    let text = text.trim();
    let text = text
        .strip_prefix("**")
        .and_then(|t| t.strip_suffix("**"))
        .unwrap_or(text);
    text.trim().to_string()
}

fn join_block(lines: &[&str]) -> String {
    lines.join("\n").trim().to_string()
}

fn is_fence(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("```") || trimmed.starts_with("~~~")
}

/// Strips a Markdown/plain fence wrapped around the whole post, together with
/// any chatter outside it. Code blocks inside the post are left alone.
fn unwrap_reply(raw: &str) -> Vec<&str> {
    let lines: Vec<&str> = raw.lines().collect();

    let open = lines.iter().position(|line| is_fence(line));
    let close = lines
        .iter()
        .rposition(|line| matches!(line.trim(), "```" | "~~~"));
    let (Some(open), Some(close)) = (open, close) else {
        return lines;
    };
    if close <= open {
        return lines;
    }

    let info = lines[open]
        .trim()
        .trim_start_matches(['`', '~'])
        .trim()
        .to_ascii_lowercase();
    let is_wrapper = matches!(info.as_str(), "" | "markdown" | "md")
        && lines[..open].iter().all(|line| heading(line).is_none())
        && lines[close + 1..].iter().all(|line| heading(line).is_none())
        && lines[open + 1..close].iter().any(|line| heading(line).is_some());

    if is_wrapper {
        debug!("Unwrapping fenced reply");
        lines[open + 1..close].to_vec()
    } else {
        lines
    }
}

/// Heading of each line, with lines inside code fences never counting.
fn line_headings(lines: &[&str]) -> Vec<Option<(u8, String)>> {
    let mut in_fence = false;
    lines
        .iter()
        .map(|line| {
            if is_fence(line) {
                in_fence = !in_fence;
                None
            } else if in_fence {
                None
            } else {
                heading(line)
            }
        })
        .collect()
}

pub fn parse_post(raw: &str) -> ParsedPost {
    let lines = unwrap_reply(raw);
    let headings = line_headings(&lines);
    let mut missing = Vec::new();

    // An H1 ahead of the first H2 is the title; chatter before it is dropped.
    let first_h1 = headings
        .iter()
        .take_while(|h| !matches!(h, Some((2, _))))
        .position(|h| matches!(h, Some((1, _))));

    let (title, body_start) = match first_h1 {
        Some(idx) => {
            if idx > 0 {
                debug!(skipped_lines = idx, "Dropping text before the title");
            }
            let title = headings[idx].clone().map(|(_, text)| text).unwrap_or_default();
            (title, idx + 1)
        }
        None => {
            missing.push(PostField::Title);
            match lines.iter().position(|line| !line.trim().is_empty()) {
                Some(idx) => {
                    let title = headings[idx]
                        .clone()
                        .map(|(_, text)| text)
                        .unwrap_or_else(|| lines[idx].trim().to_string());
                    (title, idx + 1)
                }
                None => (String::new(), lines.len()),
            }
        }
    };

    let mut intro: Vec<&str> = Vec::new();
    let mut raw_sections: Vec<(String, Vec<&str>)> = Vec::new();
    for (&line, mark) in lines.iter().zip(&headings).skip(body_start) {
        match mark {
            Some((_, text)) => raw_sections.push((text.clone(), Vec::new())),
            None => match raw_sections.last_mut() {
                Some((_, body)) => body.push(line),
                None => intro.push(line),
            },
        }
    }

    let (conclusion_heading, conclusion) = match raw_sections.last() {
        Some((heading, _)) if CONCLUSION_HEADING.is_match(heading) => raw_sections
            .pop()
            .map(|(heading, body)| (heading, join_block(&body)))
            .unwrap_or_default(),
        _ => (String::new(), String::new()),
    };

    let sections: Vec<Section> = raw_sections
        .into_iter()
        .map(|(heading, body)| Section {
            heading,
            body: join_block(&body),
        })
        .collect();

    let intro = join_block(&intro);

    // Markers are only collected from text that made it into the post.
    let mut kept: Vec<&str> = vec![title.as_str(), intro.as_str()];
    for section in &sections {
        kept.push(&section.heading);
        kept.push(&section.body);
    }
    kept.push(&conclusion);
    let affiliate_placeholders: Vec<String> = kept
        .into_iter()
        .flat_map(|text| AFFILIATE_MARKER.find_iter(text))
        .map(|m| m.as_str().to_string())
        .collect();

    if intro.is_empty() {
        missing.push(PostField::Intro);
    }
    if sections.len() < MIN_SECTIONS {
        missing.push(PostField::Sections);
    } else if sections.len() > MAX_SECTIONS {
        warn!(sections = sections.len(), "Model wrote more sections than requested");
    }
    if conclusion.is_empty() {
        missing.push(PostField::Conclusion);
    }
    if affiliate_placeholders.is_empty() {
        missing.push(PostField::AffiliatePlaceholders);
    }

    ParsedPost {
        post: GeneratedPost {
            title,
            intro,
            sections,
            conclusion,
            conclusion_heading,
            affiliate_placeholders,
        },
        missing,
    }
}
