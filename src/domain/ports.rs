use super::lesson::{Lesson, LessonId};
use super::order::{CreatedOrder, NewOrder};
use super::query::LessonQuery;
use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait LessonCatalog: Send + Sync {
    /// Lessons matching `query`, already filtered and sorted by the service.
    async fn list_lessons(&self, query: &LessonQuery) -> Result<Vec<Lesson>>;
    /// Overwrites the lesson's remaining capacity with an absolute value.
    async fn update_spaces(&self, id: &LessonId, spaces: u32) -> Result<()>;
}

#[async_trait]
pub trait OrderGateway: Send + Sync {
    async fn create_order(&self, order: &NewOrder) -> Result<CreatedOrder>;
}

#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn load(&self, key: &str) -> Result<Option<String>>;
    async fn save(&self, key: &str, value: &str) -> Result<()>;
}

pub type LessonCatalogBox = Box<dyn LessonCatalog>;
pub type OrderGatewayBox = Box<dyn OrderGateway>;
pub type PreferenceStoreBox = Box<dyn PreferenceStore>;
