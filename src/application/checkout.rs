use super::cancel::CancelToken;
use super::session::BookingSession;
use crate::domain::order::{
    CapacityUpdate, NewOrder, OrderConfirmation, PendingReconciliation, SubmissionState,
};
use crate::domain::ports::{LessonCatalogBox, OrderGatewayBox};
use crate::error::{BookingError, PreconditionError, Result};
use futures::future::join_all;
use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};

/// Drives a session's cart through order creation and capacity reconciliation.
///
/// State machine: `Idle -> Submitting -> ReconcilingCapacity -> {Succeeded, Failed}`.
/// Terminal states go back to `Idle` when the next submission starts.
///
/// Every collaborator call is bounded by `request_timeout` and aborts early when
/// the supplied [`CancelToken`] fires; either way the session lands in `Failed`.
pub struct CheckoutWorkflow {
    catalog: LessonCatalogBox,
    orders: OrderGatewayBox,
    request_timeout: Duration,
}

impl CheckoutWorkflow {
    pub fn new(
        catalog: LessonCatalogBox,
        orders: OrderGatewayBox,
        request_timeout: Duration,
    ) -> Self {
        Self {
            catalog,
            orders,
            request_timeout,
        }
    }

    /// Places an order for the session's cart.
    ///
    /// Preconditions are checked before any request is made: no submission in
    /// flight, no reconciliation pending, a valid form and a non-empty cart.
    /// A refused submission leaves the session in `Idle`.
    ///
    /// Once the order exists, one capacity update per cart line is sent
    /// concurrently, each carrying `snapshot.spaces - quantity`. If any of them
    /// fails the order is not rolled back: the session records the outstanding
    /// updates so [`retry_reconciliation`](Self::retry_reconciliation) can resend them.
    pub async fn submit(
        &self,
        session: &mut BookingSession,
        cancel: &CancelToken,
    ) -> Result<OrderConfirmation> {
        if let Err(refusal) = Self::begin(session) {
            warn!(reason = %refusal, "submission refused");
            session.last_error = Some(refusal.to_string());
            return Err(refusal.into());
        }

        let order = NewOrder::from_cart(session.customer(), session.cart());
        let total = session.cart().total();
        let lessons_booked = session.cart().count();
        info!(lines = order.items.len(), %total, "creating order");

        let created = match self.guarded(cancel, self.orders.create_order(&order)).await {
            Ok(created) => created,
            Err(err) => return Err(Self::fail(session, err)),
        };
        info!(order_id = %created.id, "order created");

        let confirmation = OrderConfirmation {
            order_id: created.id,
            total,
            lessons_booked,
        };
        let updates: Vec<CapacityUpdate> = session
            .cart()
            .lines()
            .iter()
            .map(CapacityUpdate::for_line)
            .collect();

        Self::transition(session, SubmissionState::ReconcilingCapacity);
        self.reconcile(session, confirmation, updates, cancel).await
    }

    /// Resends the capacity updates that failed after an order was created.
    ///
    /// Updates carry absolute values, so resending one that did land is harmless.
    pub async fn retry_reconciliation(
        &self,
        session: &mut BookingSession,
        cancel: &CancelToken,
    ) -> Result<OrderConfirmation> {
        if session.state.is_processing() {
            return Err(PreconditionError::SubmissionInProgress.into());
        }
        let Some(pending) = session.pending.take() else {
            return Err(PreconditionError::NothingToReconcile.into());
        };

        info!(
            order_id = %pending.confirmation.order_id,
            outstanding = pending.outstanding.len(),
            "retrying capacity reconciliation"
        );
        Self::transition(session, SubmissionState::ReconcilingCapacity);
        self.reconcile(session, pending.confirmation, pending.outstanding, cancel)
            .await
    }

    fn begin(session: &mut BookingSession) -> std::result::Result<(), PreconditionError> {
        if session.state.is_terminal() {
            Self::transition(session, SubmissionState::Idle);
        }
        if session.state != SubmissionState::Idle {
            return Err(PreconditionError::SubmissionInProgress);
        }
        if session.pending.is_some() {
            return Err(PreconditionError::ReconciliationPending);
        }
        if !session.validate() || !session.is_form_valid() {
            return Err(PreconditionError::InvalidForm(session.validation().clone()));
        }
        if session.cart().is_empty() {
            return Err(PreconditionError::EmptyCart);
        }

        session.last_error = None;
        Self::transition(session, SubmissionState::Submitting);
        Ok(())
    }

    async fn reconcile(
        &self,
        session: &mut BookingSession,
        confirmation: OrderConfirmation,
        updates: Vec<CapacityUpdate>,
        cancel: &CancelToken,
    ) -> Result<OrderConfirmation> {
        let outstanding = self.apply_updates(&updates, cancel).await;

        if outstanding.is_empty() {
            session.clear_after_order();
            session.pending = None;
            Self::transition(session, SubmissionState::Succeeded);
            info!(order_id = %confirmation.order_id, total = %confirmation.total, "order completed");
            return Ok(confirmation);
        }

        let err = BookingError::PartialFailure {
            order_id: confirmation.order_id.clone(),
            failed: outstanding.iter().map(|u| u.lesson_id.clone()).collect(),
        };
        session.pending = Some(PendingReconciliation {
            confirmation,
            outstanding,
        });
        Err(Self::fail(session, err))
    }

    /// Sends all updates concurrently and returns the ones that did not succeed.
    async fn apply_updates(
        &self,
        updates: &[CapacityUpdate],
        cancel: &CancelToken,
    ) -> Vec<CapacityUpdate> {
        let requests = updates.iter().map(|update| async move {
            let outcome = self
                .guarded(
                    cancel,
                    self.catalog.update_spaces(&update.lesson_id, update.spaces),
                )
                .await;
            (update, outcome)
        });

        join_all(requests)
            .await
            .into_iter()
            .filter_map(|(update, outcome)| match outcome {
                Ok(()) => None,
                Err(err) => {
                    warn!(lesson = %update.lesson_id, spaces = update.spaces, error = %err, "capacity update failed");
                    Some(update.clone())
                }
            })
            .collect()
    }

    async fn guarded<T, F>(&self, cancel: &CancelToken, request: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(BookingError::Cancelled),
            outcome = tokio::time::timeout(self.request_timeout, request) => {
                outcome.map_err(|_elapsed| BookingError::Timeout(self.request_timeout))?
            }
        }
    }

    fn fail(session: &mut BookingSession, err: BookingError) -> BookingError {
        warn!(error = %err, "submission failed");
        session.last_error = Some(err.user_message());
        Self::transition(session, SubmissionState::Failed);
        err
    }

    fn transition(session: &mut BookingSession, to: SubmissionState) {
        info!(from = ?session.state, ?to, "submission state");
        session.state = to;
    }
}
