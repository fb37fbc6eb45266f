use lesson_booking::application::cancel::CancelToken;
use lesson_booking::application::checkout::CheckoutWorkflow;
use lesson_booking::application::session::BookingSession;
use lesson_booking::config::ApiConfig;
use lesson_booking::domain::lesson::{LessonId, Price};
use lesson_booking::domain::order::{NewOrder, OrderItem, SubmissionState};
use lesson_booking::domain::ports::{LessonCatalog, OrderGateway};
use lesson_booking::domain::query::{LessonQuery, SortDirection, SortField};
use lesson_booking::error::BookingError;
use lesson_booking::infrastructure::http::HttpBookingApi;
use rust_decimal_macros::dec;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api_for(server: &MockServer) -> HttpBookingApi {
    let config = ApiConfig::new(server.uri(), Duration::from_secs(5)).unwrap();
    HttpBookingApi::new(&config).unwrap()
}

fn lessons_json() -> serde_json::Value {
    json!([
        {"_id": "L1", "subject": "Motorway", "location": "Leeds", "price": 50, "spaces": 5, "image": "motorway.png"},
        {"_id": "L2", "subject": "Parking", "location": "York", "price": 30.5, "spaces": 0, "image": "parking.png"}
    ])
}

#[tokio::test]
async fn test_listing_sends_search_and_sort_params() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/lessons"))
        .and(query_param("q", "leeds"))
        .and(query_param("sortBy", "price"))
        .and(query_param("order", "desc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(lessons_json()))
        .expect(1)
        .mount(&server)
        .await;

    let api = api_for(&server);
    let query = LessonQuery::new()
        .search("leeds")
        .sort_by(SortField::Price, SortDirection::Descending);
    let lessons = api.list_lessons(&query).await.unwrap();

    assert_eq!(lessons.len(), 2);
    assert_eq!(lessons[0].id, LessonId::from("L1"));
    assert_eq!(lessons[1].price, Price::new(dec!(30.5)).unwrap());
}

#[tokio::test]
async fn test_listing_omits_empty_params() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/lessons"))
        .and(query_param_is_missing("q"))
        .and(query_param_is_missing("sortBy"))
        .and(query_param_is_missing("order"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let api = api_for(&server);
    let query = LessonQuery::build(Some(""), None, Some(SortDirection::Descending));
    assert!(api.list_lessons(&query).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_order_rejection_prefers_body_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/orders"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"message": "Lesson unavailable"})),
        )
        .mount(&server)
        .await;

    let order = NewOrder {
        name: "Ann Lee".to_string(),
        phone: "0712345678".to_string(),
        items: vec![OrderItem {
            lesson_id: LessonId::from("L1"),
            quantity: 2,
        }],
    };
    let err = api_for(&server).create_order(&order).await.unwrap_err();

    match err {
        BookingError::Transport { status, message } => {
            assert_eq!(status, Some(400));
            assert_eq!(message, "Lesson unavailable");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_order_rejection_without_message_uses_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/orders"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let order = NewOrder {
        name: "Ann Lee".to_string(),
        phone: "0712345678".to_string(),
        items: vec![],
    };
    let err = api_for(&server).create_order(&order).await.unwrap_err();
    assert_eq!(err.user_message(), "Failed to place order");
}

#[tokio::test]
async fn test_update_spaces_sends_absolute_value() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/lessons/L1"))
        .and(body_json(json!({"spaces": 3})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    api_for(&server)
        .update_spaces(&LessonId::from("L1"), 3)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_checkout_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/orders"))
        .and(body_json(json!({
            "name": "Ann Lee",
            "phone": "0712345678",
            "items": [{"lessonId": "L1", "quantity": 2}]
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"_id": "O1"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/lessons/L1"))
        .and(body_json(json!({"spaces": 3})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/lessons"))
        .respond_with(ResponseTemplate::new(200).set_body_json(lessons_json()))
        .mount(&server)
        .await;

    let api = api_for(&server);
    let mut session = BookingSession::new();
    session.replace_lessons(api.list_lessons(&LessonQuery::new()).await.unwrap());
    session.add_listed(&LessonId::from("L1"));
    session.add_listed(&LessonId::from("L1"));
    session.set_name("Ann Lee");
    session.set_phone("0712345678");

    let checkout = CheckoutWorkflow::new(
        Box::new(api.clone()),
        Box::new(api),
        Duration::from_secs(5),
    );
    let confirmation = checkout
        .submit(&mut session, &CancelToken::new())
        .await
        .unwrap();

    assert_eq!(confirmation.order_id.as_str(), "O1");
    assert_eq!(confirmation.total, Price::new(dec!(100)).unwrap());
    assert_eq!(session.state(), SubmissionState::Succeeded);
    assert!(session.cart().is_empty());
}

#[tokio::test]
async fn test_slow_order_service_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/orders"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({"id": "O1"}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let api = api_for(&server);
    let lesson = lesson_booking::domain::lesson::Lesson {
        id: LessonId::from("L1"),
        subject: "Motorway".to_string(),
        location: "Leeds".to_string(),
        price: Price::new(dec!(50)).unwrap(),
        spaces: 5,
        image: String::new(),
    };
    let mut session = BookingSession::new();
    session.add_to_cart(&lesson);
    session.set_name("Ann Lee");
    session.set_phone("0712345678");

    let checkout = CheckoutWorkflow::new(
        Box::new(api.clone()),
        Box::new(api),
        Duration::from_millis(200),
    );
    let err = checkout
        .submit(&mut session, &CancelToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, BookingError::Timeout(_)));
    assert_eq!(session.state(), SubmissionState::Failed);
    assert_eq!(session.cart().count(), 1);
}

#[tokio::test]
async fn test_update_spaces_encodes_lesson_id_as_one_segment() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/lessons/L%231"))
        .and(body_json(json!({"spaces": 2})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/lessons/L%2F1"))
        .and(body_json(json!({"spaces": 7})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let api = api_for(&server);
    api.update_spaces(&LessonId::from("L#1"), 2).await.unwrap();
    api.update_spaces(&LessonId::from("L/1"), 7).await.unwrap();
}

fn one_item_order() -> NewOrder {
    NewOrder {
        name: "Ann Lee".to_string(),
        phone: "0712345678".to_string(),
        items: vec![OrderItem {
            lesson_id: LessonId::from("L1"),
            quantity: 1,
        }],
    }
}

#[tokio::test]
async fn test_unreachable_order_service_uses_fallback() {
    // Nothing listens on the discard port.
    let config = ApiConfig::new("http://127.0.0.1:9", Duration::from_secs(5)).unwrap();
    let api = HttpBookingApi::new(&config).unwrap();

    let err = api.create_order(&one_item_order()).await.unwrap_err();

    assert!(matches!(err, BookingError::Transport { status: None, .. }));
    assert_eq!(err.user_message(), "Failed to place order");
}

#[tokio::test]
async fn test_undecodable_order_response_uses_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/orders"))
        .respond_with(ResponseTemplate::new(201).set_body_string("<html>ok</html>"))
        .mount(&server)
        .await;

    let err = api_for(&server)
        .create_order(&one_item_order())
        .await
        .unwrap_err();

    assert_eq!(err.user_message(), "Failed to place order");
}
