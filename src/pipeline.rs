use std::time::Instant;

use tracing::{info, info_span, warn};

use crate::error::PipelineError;
use crate::format::render_post;
use crate::llm::TextGenerator;
use crate::models::{Keyword, PostDraft};
use crate::post::parse_post;
use crate::prompt::assemble_prompt;
use crate::scraper::CompetitorScraper;
use crate::search::SearchProvider;

/// Keyword in, rendered post out. Holds no per-run state, so one instance
/// can serve the web routes and the scheduler at the same time.
pub struct Pipeline {
    search: Box<dyn SearchProvider>,
    scraper: CompetitorScraper,
    generator: Box<dyn TextGenerator>,
}

impl Pipeline {
    pub fn new(
        search: Box<dyn SearchProvider>,
        scraper: CompetitorScraper,
        generator: Box<dyn TextGenerator>,
    ) -> Self {
        Self {
            search,
            scraper,
            generator,
        }
    }

    /// Runs every stage in order. Search and generation failures abort the
    /// run; missing competitor data and a loosely structured reply do not.
    pub fn run(&self, keyword: &Keyword) -> Result<PostDraft, PipelineError> {
        let _span = info_span!("pipeline", keyword = keyword.as_str()).entered();
        let start = Instant::now();

        info!("Performing SEO research");
        let results = self.search.search(keyword)?;
        let headings = self.scraper.scrape(&results.result_urls);
        info!(headings = headings.len(), "Competitor analysis done");

        let prompt = assemble_prompt(keyword, &results.signals, &headings);
        info!(prompt_chars = prompt.as_str().len(), "Generating blog post");
        let raw = self.generator.generate(&prompt)?;

        let parsed = parse_post(&raw);
        if parsed.is_degraded() {
            warn!(
                missing = ?parsed.missing,
                sections = parsed.post.sections.len(),
                "Generated post is incomplete, keeping what was parsed"
            );
        }

        let rendered = render_post(&parsed.post);
        info!(
            title = rendered.title.as_str(),
            sections = parsed.post.sections.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Blog post generated"
        );

        Ok(PostDraft {
            keyword: keyword.clone(),
            signals: results.signals,
            headings,
            post: parsed.post,
            missing: parsed.missing,
            rendered,
        })
    }

    /// Validates raw user input before running.
    pub fn run_raw(&self, keyword: &str) -> Result<PostDraft, PipelineError> {
        let keyword = Keyword::new(keyword)?;
        self.run(&keyword)
    }
}
