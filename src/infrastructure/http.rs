use crate::config::ApiConfig;
use crate::domain::lesson::{Lesson, LessonId};
use crate::domain::order::{CreatedOrder, NewOrder};
use crate::domain::ports::{LessonCatalog, OrderGateway};
use crate::domain::query::LessonQuery;
use crate::error::{BookingError, ORDER_FALLBACK_MESSAGE, Result};
use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// HTTP client for the lesson and order services.
///
/// Implements both [`LessonCatalog`] and [`OrderGateway`] against a single base URL.
/// Cloning is cheap: `reqwest::Client` shares its connection pool.
#[derive(Debug, Clone)]
pub struct HttpBookingApi {
    http: Client,
    base_url: Url,
}

#[derive(Serialize)]
struct SpacesBody {
    spaces: u32,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl HttpBookingApi {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            BookingError::Config(format!("invalid base URL '{}': {e}", config.base_url))
        })?;
        Ok(Self { http, base_url })
    }

    /// Appends `segments` to the base URL, percent-encoding each one.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                BookingError::Config(format!("base URL '{}' cannot take a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Turns a non-2xx response into a transport error, preferring the body's `message`.
    async fn check(response: Response, fallback: &str) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(|body| body.message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| fallback.to_string());

        Err(BookingError::Transport {
            status: Some(status.as_u16()),
            message,
        })
    }
}

#[async_trait]
impl LessonCatalog for HttpBookingApi {
    async fn list_lessons(&self, query: &LessonQuery) -> Result<Vec<Lesson>> {
        let params = query.params();
        debug!(?params, "GET /lessons");

        let response = self
            .http
            .get(self.url(&["lessons"])?)
            .query(&params)
            .send()
            .await?;
        let response = Self::check(response, "Failed to load lessons").await?;

        Ok(response.json().await?)
    }

    async fn update_spaces(&self, id: &LessonId, spaces: u32) -> Result<()> {
        debug!(lesson = %id, spaces, "PUT /lessons");

        let response = self
            .http
            .put(self.url(&["lessons", id.as_str()])?)
            .json(&SpacesBody { spaces })
            .send()
            .await?;
        Self::check(response, "Failed to update lesson").await?;
        Ok(())
    }
}

#[async_trait]
impl OrderGateway for HttpBookingApi {
    async fn create_order(&self, order: &NewOrder) -> Result<CreatedOrder> {
        debug!(items = order.items.len(), "POST /orders");

        let response = self
            .http
            .post(self.url(&["orders"])?)
            .json(order)
            .send()
            .await
            .map_err(order_failure)?;
        let response = Self::check(response, ORDER_FALLBACK_MESSAGE).await?;

        response.json().await.map_err(order_failure)
    }
}

/// Connection and decoding faults are logged in full; the error keeps only the
/// generic order message.
fn order_failure(err: reqwest::Error) -> BookingError {
    warn!(error = %err, "order request failed");
    BookingError::Transport {
        status: err.status().map(|s| s.as_u16()),
        message: ORDER_FALLBACK_MESSAGE.to_string(),
    }
}
