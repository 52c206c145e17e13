use crate::models::{HeadingSet, Keyword, Prompt, SearchSignals};

/// System message sent alongside every generation prompt.
pub const SYSTEM_PROMPT: &str = "You are an expert SEO content writer.";

/// Marker format the model is told to use for product recommendations.
pub const AFFILIATE_MARKER_FORMAT: &str = "[Product Name - Affiliate Link Here]";

const EMPTY_LIST: &str = "- (none found)";

/// Builds the generation prompt. Same inputs, same bytes.
pub fn assemble_prompt(keyword: &Keyword, signals: &SearchSignals, headings: &HeadingSet) -> Prompt {
    let estimated = 1500
        + keyword.as_str().len()
        + list_len(&signals.questions)
        + list_len(&signals.related)
        + list_len(headings);
    let mut prompt = String::with_capacity(estimated);

    prompt.push_str("You are an expert SEO content writer. Your task is to write a blog post.\n\n");

    prompt.push_str("Primary Keyword: \"");
    prompt.push_str(keyword.as_str());
    prompt.push_str("\"\n\n");

    prompt.push_str(
        "Structure Requirements:\n\
         - Create a compelling, SEO-friendly title.\n\
         - Write a brief introduction that hooks the reader.\n\
         - Write 3-5 main sections using H2 headings.\n\
         - Write a concluding summary.\n\
         - The tone should be helpful, informative, and slightly casual.\n\n",
    );

    prompt.push_str("Directly answer these \"People Also Ask\" questions within the content:\n");
    push_list(&mut prompt, &signals.questions);

    prompt.push_str("Naturally include some of these related searches:\n");
    push_list(&mut prompt, &signals.related);

    prompt.push_str(
        "Draw inspiration from these headings found on competing pages and cover similar themes:\n",
    );
    push_list(&mut prompt, headings);

    prompt.push_str("Affiliate Link Placeholders:\n");
    prompt.push_str(
        "- Where it makes sense to recommend a product or service, insert a placeholder in this exact format: ",
    );
    prompt.push_str(AFFILIATE_MARKER_FORMAT);
    prompt.push_str(".\n- Insert at least 2-3 of these placeholders.\n\n");

    prompt.push_str(
        "Output Format:\n\
         - Respond in Markdown only, without code fences.\n\
         - Put the title on the first line as a level-1 heading (# Title).\n\
         - Start each main section with a level-2 heading (## Heading).\n\
         - End with a level-2 heading named \"Conclusion\" followed by the summary.\n\n",
    );

    prompt.push_str("Now, please write the blog post draft.");

    Prompt::new(prompt)
}

fn push_list(prompt: &mut String, items: &[String]) {
    if items.is_empty() {
        prompt.push_str(EMPTY_LIST);
        prompt.push('\n');
    }
    for item in items {
        prompt.push_str("- ");
        prompt.push_str(item);
        prompt.push('\n');
    }
    prompt.push('\n');
}

fn list_len(items: &[String]) -> usize {
    items.iter().map(|i| i.len() + 3).sum()
}
