use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, error, info};

use crate::models::{Keyword, PostDraft};
use crate::pipeline::Pipeline;

/// What the daily job runs and how often. Built by the config layer.
#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    pub keywords: Vec<Keyword>,
    pub interval: Duration,
}

/// Cycles through the keyword list, wrapping back to the start.
#[derive(Debug)]
pub struct KeywordRotation {
    keywords: Vec<Keyword>,
    cursor: usize,
}

impl KeywordRotation {
    pub fn new(keywords: Vec<Keyword>) -> Self {
        Self { keywords, cursor: 0 }
    }

    pub fn next_keyword(&mut self) -> Option<&Keyword> {
        if self.keywords.is_empty() {
            return None;
        }
        let idx = self.cursor % self.keywords.len();
        self.cursor = self.cursor.wrapping_add(1);
        self.keywords.get(idx)
    }
}

/// One scheduled run. Failures are logged and the slot is skipped.
pub fn run_scheduled_once(pipeline: &Pipeline, rotation: &mut KeywordRotation) -> Option<PostDraft> {
    let Some(keyword) = rotation.next_keyword() else {
        error!("Scheduled job has no keywords configured");
        return None;
    };

    info!(keyword = keyword.as_str(), "Kicking off scheduled post generation");
    match pipeline.run(keyword) {
        Ok(draft) => {
            info!(
                keyword = draft.keyword.as_str(),
                title = draft.rendered.title.as_str(),
                words = draft.word_count(),
                "Scheduled post generated"
            );
            debug!(markdown = draft.rendered.markdown.as_str(), "Generated post");
            Some(draft)
        }
        Err(e) => {
            error!(keyword = keyword.as_str(), error = %e, "Scheduled post generation failed, skipping");
            None
        }
    }
}

/// Starts the recurring job on its own thread. The first run happens one
/// interval after startup.
pub fn start_daily_job(pipeline: Arc<Pipeline>, schedule: ScheduleConfig) -> std::io::Result<JoinHandle<()>> {
    info!(
        keywords = schedule.keywords.len(),
        interval_secs = schedule.interval.as_secs(),
        "Starting scheduled post job"
    );

    thread::Builder::new()
        .name("post-scheduler".to_string())
        .spawn(move || {
            let mut rotation = KeywordRotation::new(schedule.keywords);
            loop {
                let next_run = Utc::now()
                    + chrono::Duration::from_std(schedule.interval).unwrap_or_else(|_| chrono::Duration::days(1));
                info!(next_run = %next_run.to_rfc3339(), "Scheduler sleeping until next run");
                thread::sleep(schedule.interval);
                run_scheduled_once(&pipeline, &mut rotation);
            }
        })
}
