use super::cart::{Cart, CartLine};
use super::lesson::{LessonId, Price};
use super::validation::CustomerDetails;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier assigned to an order by the order service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for OrderId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for OrderId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub lesson_id: LessonId,
    pub quantity: u32,
}

/// Body of the order-creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    pub name: String,
    pub phone: String,
    pub items: Vec<OrderItem>,
}

impl NewOrder {
    pub fn from_cart(customer: &CustomerDetails, cart: &Cart) -> Self {
        Self {
            name: customer.name.trim().to_string(),
            phone: customer.phone.trim().to_string(),
            items: cart
                .lines()
                .iter()
                .map(|line| OrderItem {
                    lesson_id: line.lesson_id().clone(),
                    quantity: line.quantity,
                })
                .collect(),
        }
    }
}

/// The part of the order service's response the session cares about.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedOrder {
    #[serde(alias = "_id", alias = "orderId")]
    pub id: OrderId,
}

/// Absolute remaining capacity to write back for one lesson.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapacityUpdate {
    pub lesson_id: LessonId,
    pub spaces: u32,
}

impl CapacityUpdate {
    /// Computed from the line's pre-order snapshot, never from a fresher read.
    pub fn for_line(line: &CartLine) -> Self {
        Self {
            lesson_id: line.lesson_id().clone(),
            spaces: line.lesson.spaces.saturating_sub(line.quantity),
        }
    }
}

/// What the customer is shown once an order has fully gone through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderConfirmation {
    pub order_id: OrderId,
    pub total: Price,
    pub lessons_booked: u32,
}

/// An order that exists server-side but whose capacity updates did not all land.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReconciliation {
    pub confirmation: OrderConfirmation,
    pub outstanding: Vec<CapacityUpdate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting,
    ReconcilingCapacity,
    Succeeded,
    Failed,
}

impl SubmissionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    /// Whether a request is in flight and the cart must be treated as frozen.
    pub fn is_processing(&self) -> bool {
        matches!(self, Self::Submitting | Self::ReconcilingCapacity)
    }
}
