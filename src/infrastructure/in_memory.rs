use crate::domain::lesson::{Lesson, LessonId};
use crate::domain::order::{CreatedOrder, NewOrder, OrderId};
use crate::domain::ports::{LessonCatalog, OrderGateway, PreferenceStore};
use crate::domain::query::{LessonQuery, SortDirection, SortField};
use crate::error::{BookingError, Result};
use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// A request observed by [`InMemoryBookingApi`], in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedRequest {
    ListLessons(Vec<(&'static str, String)>),
    CreateOrder(NewOrder),
    UpdateSpaces { lesson_id: LessonId, spaces: u32 },
}

#[derive(Default)]
struct Backend {
    lessons: Vec<Lesson>,
    orders: Vec<(OrderId, NewOrder)>,
    order_rejection: Option<String>,
    failing_updates: HashSet<LessonId>,
    stalled_updates: HashSet<LessonId>,
    latency: Option<Duration>,
    requests: Vec<RecordedRequest>,
}

/// An in-process stand-in for the lesson and order services.
///
/// Filters and sorts listings the way the real service does, checks capacity on
/// order creation, and can be told to reject orders, fail specific capacity
/// updates, or respond slowly. Clones share the same backend.
#[derive(Default, Clone)]
pub struct InMemoryBookingApi {
    backend: Arc<RwLock<Backend>>,
}

impl InMemoryBookingApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lessons(lessons: Vec<Lesson>) -> Self {
        Self {
            backend: Arc::new(RwLock::new(Backend {
                lessons,
                ..Backend::default()
            })),
        }
    }

    /// Makes every order creation fail with HTTP 400 and `message`.
    pub async fn reject_orders(&self, message: impl Into<String>) {
        self.backend.write().await.order_rejection = Some(message.into());
    }

    /// Makes capacity updates for `id` fail until [`heal_updates`](Self::heal_updates).
    pub async fn fail_updates_for(&self, id: LessonId) {
        self.backend.write().await.failing_updates.insert(id);
    }

    pub async fn heal_updates(&self) {
        let mut backend = self.backend.write().await;
        backend.failing_updates.clear();
        backend.stalled_updates.clear();
    }

    /// Makes capacity updates for `id` never answer, as a hung service would.
    pub async fn stall_updates_for(&self, id: LessonId) {
        self.backend.write().await.stalled_updates.insert(id);
    }

    /// Delays every response by `latency`.
    pub async fn set_latency(&self, latency: Duration) {
        self.backend.write().await.latency = Some(latency);
    }

    pub async fn lesson(&self, id: &LessonId) -> Option<Lesson> {
        let backend = self.backend.read().await;
        backend.lessons.iter().find(|l| &l.id == id).cloned()
    }

    pub async fn orders(&self) -> Vec<(OrderId, NewOrder)> {
        self.backend.read().await.orders.clone()
    }

    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.backend.read().await.requests.clone()
    }

    async fn record(&self, request: RecordedRequest) {
        let latency = {
            let mut backend = self.backend.write().await;
            backend.requests.push(request);
            backend.latency
        };
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }
}

fn matches_search(lesson: &Lesson, text: &str) -> bool {
    let needle = text.to_lowercase();
    lesson.subject.to_lowercase().contains(&needle)
        || lesson.location.to_lowercase().contains(&needle)
}

fn compare(a: &Lesson, b: &Lesson, field: SortField) -> Ordering {
    match field {
        SortField::Subject => a.subject.cmp(&b.subject),
        SortField::Location => a.location.cmp(&b.location),
        SortField::Price => a.price.cmp(&b.price),
        SortField::Spaces => a.spaces.cmp(&b.spaces),
    }
}

fn rejected(status: u16, message: impl Into<String>) -> BookingError {
    BookingError::Transport {
        status: Some(status),
        message: message.into(),
    }
}

#[async_trait]
impl LessonCatalog for InMemoryBookingApi {
    async fn list_lessons(&self, query: &LessonQuery) -> Result<Vec<Lesson>> {
        self.record(RecordedRequest::ListLessons(query.params())).await;

        let backend = self.backend.read().await;
        let mut lessons: Vec<Lesson> = backend
            .lessons
            .iter()
            .filter(|lesson| query.search_text().is_none_or(|text| matches_search(lesson, text)))
            .cloned()
            .collect();

        if let Some((field, direction)) = query.sort() {
            lessons.sort_by(|a, b| {
                let ordering = compare(a, b, field);
                match direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                }
            });
        }
        Ok(lessons)
    }

    async fn update_spaces(&self, id: &LessonId, spaces: u32) -> Result<()> {
        self.record(RecordedRequest::UpdateSpaces {
            lesson_id: id.clone(),
            spaces,
        })
        .await;

        let stalled = self.backend.read().await.stalled_updates.contains(id);
        if stalled {
            std::future::pending::<()>().await;
        }

        let mut backend = self.backend.write().await;
        if backend.failing_updates.contains(id) {
            return Err(rejected(500, "Failed to update lesson"));
        }
        let lesson = backend
            .lessons
            .iter_mut()
            .find(|l| &l.id == id)
            .ok_or_else(|| rejected(404, "Lesson not found"))?;
        lesson.spaces = spaces;
        Ok(())
    }
}

#[async_trait]
impl OrderGateway for InMemoryBookingApi {
    async fn create_order(&self, order: &NewOrder) -> Result<CreatedOrder> {
        self.record(RecordedRequest::CreateOrder(order.clone())).await;

        let mut backend = self.backend.write().await;
        if let Some(message) = &backend.order_rejection {
            return Err(rejected(400, message.clone()));
        }
        for item in &order.items {
            let lesson = backend
                .lessons
                .iter()
                .find(|l| l.id == item.lesson_id)
                .ok_or_else(|| rejected(404, format!("Lesson {} not found", item.lesson_id)))?;
            if item.quantity > lesson.spaces {
                return Err(rejected(
                    400,
                    format!("Not enough spaces for lesson {}", item.lesson_id),
                ));
            }
        }

        let id = OrderId::from(format!("O{}", backend.orders.len() + 1));
        backend.orders.push((id.clone(), order.clone()));
        Ok(CreatedOrder { id })
    }
}

/// A thread-safe in-memory preference store. Nothing survives the process.
#[derive(Default, Clone)]
pub struct InMemoryPreferenceStore {
    values: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PreferenceStore for InMemoryPreferenceStore {
    async fn load(&self, key: &str) -> Result<Option<String>> {
        let values = self.values.read().await;
        Ok(values.get(key).cloned())
    }

    async fn save(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.write().await;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
