//! Application layer: the booking session and the workflows that act on it.
//!
//! [`session::BookingSession`] owns the cart, customer details, validation and
//! submission state. [`catalog::LessonBrowser`] fills its lesson listing and
//! [`checkout::CheckoutWorkflow`] turns its cart into an order.

pub mod cancel;
pub mod catalog;
pub mod checkout;
pub mod session;
