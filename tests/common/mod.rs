#![allow(dead_code)]

use lesson_booking::application::checkout::CheckoutWorkflow;
use lesson_booking::application::session::BookingSession;
use lesson_booking::domain::lesson::{Lesson, LessonId, Price};
use lesson_booking::infrastructure::in_memory::InMemoryBookingApi;
use rust_decimal::Decimal;
use std::time::Duration;

pub fn lesson(id: &str, price: Decimal, spaces: u32) -> Lesson {
    Lesson {
        id: LessonId::from(id),
        subject: format!("Lesson {id}"),
        location: "Leeds".to_string(),
        price: Price::new(price).unwrap(),
        spaces,
        image: format!("{id}.png"),
    }
}

pub fn workflow(api: &InMemoryBookingApi, timeout: Duration) -> CheckoutWorkflow {
    CheckoutWorkflow::new(Box::new(api.clone()), Box::new(api.clone()), timeout)
}

/// A session with a valid form and `quantity` units of `lesson` in the cart.
pub fn session_with(lesson: &Lesson, quantity: u32) -> BookingSession {
    let mut session = BookingSession::new();
    for _ in 0..quantity {
        session.add_to_cart(lesson);
    }
    session.set_name("Ann Lee");
    session.set_phone("0712345678");
    session
}
