use crate::domain::cart::{AddOutcome, Cart};
use crate::domain::lesson::{Lesson, LessonId};
use crate::domain::order::{PendingReconciliation, SubmissionState};
use crate::domain::validation::{self, CustomerDetails, Field, ValidationState};
use tracing::debug;

/// All mutable state of one customer's booking session.
///
/// Components receive the session (or the slice they need) explicitly; there is
/// no shared global state. While a submission is in flight the workflow holds
/// `&mut BookingSession`, so the cart cannot be edited underneath it.
#[derive(Debug, Default)]
pub struct BookingSession {
    lessons: Vec<Lesson>,
    cart: Cart,
    customer: CustomerDetails,
    validation: ValidationState,
    pub(crate) state: SubmissionState,
    pub(crate) last_error: Option<String>,
    pub(crate) pending: Option<PendingReconciliation>,
}

impl BookingSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }

    /// Discards the current listing wholesale.
    pub fn replace_lessons(&mut self, lessons: Vec<Lesson>) {
        self.lessons = lessons;
    }

    pub fn lesson(&self, id: &LessonId) -> Option<&Lesson> {
        self.lessons.iter().find(|lesson| &lesson.id == id)
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn add_to_cart(&mut self, lesson: &Lesson) -> AddOutcome {
        let outcome = self.cart.add(lesson);
        debug!(lesson = %lesson.id, ?outcome, "add to cart");
        outcome
    }

    /// Adds the listed lesson with identifier `id`, if the current listing has it.
    pub fn add_listed(&mut self, id: &LessonId) -> Option<AddOutcome> {
        let lesson = self.lesson(id)?.clone();
        Some(self.add_to_cart(&lesson))
    }

    pub fn remove_from_cart(&mut self, id: &LessonId) -> bool {
        self.cart.remove(id)
    }

    pub fn increase(&mut self, id: &LessonId) -> bool {
        self.cart.increase(id)
    }

    pub fn decrease(&mut self, id: &LessonId) -> bool {
        self.cart.decrease(id)
    }

    pub fn customer(&self) -> &CustomerDetails {
        &self.customer
    }

    pub fn validation(&self) -> &ValidationState {
        &self.validation
    }

    /// Records a keystroke in the name field and revalidates it.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.customer.name = name.into();
        self.validation.revalidate(Field::Name, &self.customer);
    }

    /// Records a keystroke in the phone field and revalidates it.
    pub fn set_phone(&mut self, phone: impl Into<String>) {
        self.customer.phone = phone.into();
        self.validation.revalidate(Field::Phone, &self.customer);
    }

    /// Authoritative validation pass over both fields.
    pub fn validate(&mut self) -> bool {
        self.validation = ValidationState::check(&self.customer);
        self.validation.is_valid()
    }

    pub fn is_form_valid(&self) -> bool {
        validation::is_form_valid(&self.customer)
    }

    pub fn state(&self) -> SubmissionState {
        self.state
    }

    pub fn is_processing(&self) -> bool {
        self.state.is_processing()
    }

    /// Error text from the most recent failed submission.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn pending_reconciliation(&self) -> Option<&PendingReconciliation> {
        self.pending.as_ref()
    }

    /// Clears the cart, details, validation and any pending reconciliation.
    ///
    /// Also returns the workflow to `Idle`, which recovers a session whose
    /// submission future was dropped mid-flight.
    pub fn reset(&mut self) {
        self.clear_after_order();
        self.pending = None;
        self.state = SubmissionState::Idle;
    }

    pub(crate) fn clear_after_order(&mut self) {
        self.cart.clear();
        self.customer = CustomerDetails::default();
        self.validation = ValidationState::default();
        self.last_error = None;
    }
}
