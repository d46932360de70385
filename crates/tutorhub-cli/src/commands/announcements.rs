//! announcements <course>

use async_trait::async_trait;
use tutorhub_course::{Announcement, AnnouncementStore, FetchOutcome};

use crate::commands::Command;
use crate::context::AppContext;
use crate::error::{CliError, CliResult};
use crate::output::OutputStyle;

pub struct AnnouncementsCommand {
    course_id: String,
    page: Option<u32>,
    page_size: Option<u32>,
}

impl AnnouncementsCommand {
    pub fn new(course_id: impl Into<String>) -> Self {
        Self {
            course_id: course_id.into(),
            page: None,
            page_size: None,
        }
    }

    pub fn with_page(mut self, page: Option<u32>, page_size: Option<u32>) -> Self {
        self.page = page;
        self.page_size = page_size;
        self
    }
}

#[async_trait]
impl Command for AnnouncementsCommand {
    async fn execute(&self, ctx: &AppContext) -> CliResult<()> {
        let store = AnnouncementStore::new(ctx.authorized()?);
        let outcome = store
            .fetch(&self.course_id, self.page, self.page_size)
            .await?;
        if outcome == FetchOutcome::Skipped {
            return Err(CliError::invalid("course id is required"));
        }

        let style = OutputStyle::default();
        let items = store.cached(&self.course_id).unwrap_or_default();
        println!(
            "{}",
            style.header(&format!(
                "Announcements ({} unseen)",
                store.unseen_count(&self.course_id)
            ))
        );
        if items.is_empty() {
            println!("  {}", style.dim("none"));
        }
        for item in &items {
            println!("{}", announcement_line(&style, item));
        }
        Ok(())
    }
}

fn announcement_line(style: &OutputStyle, item: &Announcement) -> String {
    let pin = if item.is_pinned { "📌 " } else { "" };
    let author = item
        .author
        .as_ref()
        .map(|a| a.display_name())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "unknown".to_string());
    format!(
        "  {}{}  {}\n    {}",
        pin,
        item.title,
        style.dim(&format!("{} · {}", author, item.created_at)),
        item.body
    )
}
