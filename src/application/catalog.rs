use super::session::BookingSession;
use crate::domain::ports::LessonCatalogBox;
use crate::domain::query::LessonQuery;
use crate::error::Result;
use tracing::info;

/// Fetches lesson listings into a session.
pub struct LessonBrowser {
    catalog: LessonCatalogBox,
}

impl LessonBrowser {
    pub fn new(catalog: LessonCatalogBox) -> Self {
        Self { catalog }
    }

    /// Fetches lessons for `query` and replaces the session's listing with them.
    ///
    /// On error the previous listing is left untouched.
    pub async fn refresh(&self, session: &mut BookingSession, query: &LessonQuery) -> Result<usize> {
        let lessons = self.catalog.list_lessons(query).await?;
        info!(count = lessons.len(), search = ?query.search_text(), "lesson listing refreshed");
        let count = lessons.len();
        session.replace_lessons(lessons);
        Ok(count)
    }
}
