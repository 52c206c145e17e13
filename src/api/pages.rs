use crate::format::escape_html;
use crate::models::PostDraft;

const STYLE: &str = "body{font-family:system-ui,sans-serif;max-width:760px;margin:2rem auto;padding:0 1rem;line-height:1.6}\
form{display:flex;gap:.5rem}input[type=text]{flex:1;padding:.5rem}button{padding:.5rem 1rem}\
.error{color:#b00020}.notice{color:#8a6d3b}.affiliate-link{background:#fff3cd;padding:0 .2rem}";

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n{body}</body>\n</html>\n",
        escape_html(title)
    )
}

fn keyword_form(value: &str) -> String {
    format!(
        "<form method=\"post\" action=\"/\">\n\
         <input type=\"text\" name=\"keyword\" placeholder=\"e.g. best running shoes\" value=\"{}\" required>\n\
         <button type=\"submit\">Generate post</button>\n</form>\n",
        escape_html(value)
    )
}

pub fn index_page() -> String {
    let body = format!(
        "<h1>SEO Blog Post Generator</h1>\n\
         <p>Enter a keyword to research the search results and draft a blog post.</p>\n{}",
        keyword_form("")
    );
    layout("SEO Blog Post Generator", &body)
}

pub fn post_page(draft: &PostDraft) -> String {
    let mut body = format!(
        "<p><a href=\"/\">&larr; New post</a> &middot; keyword: <strong>{}</strong></p>\n",
        escape_html(draft.keyword.as_str())
    );
    if !draft.missing.is_empty() {
        body.push_str(&format!(
            "<p class=\"notice\">The draft is incomplete (missing: {}).</p>\n",
            draft.missing_summary()
        ));
    }
    body.push_str(&draft.rendered.html);
    layout(&draft.rendered.title, &body)
}

pub fn error_page(message: &str) -> String {
    let body = format!(
        "<h1>Something went wrong</h1>\n<p class=\"error\">{}</p>\n{}",
        escape_html(message),
        keyword_form("")
    );
    layout("Generation failed", &body)
}
