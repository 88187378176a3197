// Integration tests for Lens Watch

use async_trait::async_trait;
use lens_watch::core::{Matcher, PollOutcome, Poller};
use lens_watch::models::{Mailbox, Notification, SearchResponse};
use lens_watch::services::{
    decode_listing, FetchError, ListingSource, NotificationError, Notifier, SearchClient,
    SendGridClient,
};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};

const MATCHING_BODY: &str = r#"{"result": [{
    "inStock": "yes",
    "keh_coverage": "aps-c & dx",
    "keh_mount": "sony e mount",
    "keh_manufacturer": "sigma",
    "url": "https://example.com/item/1"
}]}"#;

const EMPTY_BODY: &str = r#"{"result": []}"#;

/// Port 1 is reserved and nothing listens there
const REFUSED_URL: &str = "http://127.0.0.1:1/search";

/// Replays raw bodies through the real decoder
struct BodySequence {
    bodies: Mutex<VecDeque<&'static str>>,
}

impl BodySequence {
    fn new(bodies: Vec<&'static str>) -> Self {
        Self {
            bodies: Mutex::new(bodies.into()),
        }
    }
}

#[async_trait]
impl ListingSource for BodySequence {
    async fn fetch(&self) -> Result<SearchResponse, FetchError> {
        let body = self.bodies.lock().unwrap().pop_front().unwrap_or(EMPTY_BODY);
        decode_listing(body.as_bytes())
    }
}

/// Captures the rendered messages instead of sending them
#[derive(Default)]
struct OutboxNotifier {
    outbox: Mutex<Vec<Notification>>,
}

impl OutboxNotifier {
    fn outbox(&self) -> Vec<Notification> {
        self.outbox.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for OutboxNotifier {
    async fn notify_available(&self, item_url: &str) -> Result<(), NotificationError> {
        let message = Notification::item_available(
            Mailbox::new("alerts@example.com", "Lens Watch"),
            Mailbox::new("me@example.com", "Photographer"),
            item_url,
        );
        self.outbox.lock().unwrap().push(message);
        Ok(())
    }
}

fn create_sendgrid(base_url: String) -> SendGridClient {
    SendGridClient::new(
        base_url,
        "SG.test".to_string(),
        Mailbox::new("alerts@example.com", "Lens Watch"),
        Mailbox::new("me@example.com", "Photographer"),
    )
    .unwrap()
}

#[tokio::test]
async fn test_fetch_empty_listing() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/search")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(EMPTY_BODY)
        .create_async()
        .await;

    let client = SearchClient::new(format!("{}/search", server.url()), Duration::from_secs(5)).unwrap();
    let listing = assert_ok!(client.search().await);

    assert!(listing.is_empty());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_fetch_malformed_body_is_decode_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/search")
        .with_status(200)
        .with_body("{\"result\": [")
        .create_async()
        .await;

    let client = SearchClient::new(format!("{}/search", server.url()), Duration::from_secs(5)).unwrap();
    let err = assert_err!(client.search().await);

    assert!(err.is_decode());
}

#[tokio::test]
async fn test_fetch_missing_key_is_decode_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/search")
        .with_status(200)
        .with_body(r#"{"meta": {"totalResultsFound": 0}}"#)
        .create_async()
        .await;

    let client = SearchClient::new(format!("{}/search", server.url()), Duration::from_secs(5)).unwrap();
    let err = assert_err!(client.search().await);

    assert!(err.is_decode());
}

#[tokio::test]
async fn test_fetch_error_page_is_decode_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/search")
        .with_status(503)
        .with_body("<html>Service Unavailable</html>")
        .create_async()
        .await;

    let client = SearchClient::new(format!("{}/search", server.url()), Duration::from_secs(5)).unwrap();
    let err = assert_err!(client.search().await);

    assert!(err.is_decode());
}

#[tokio::test]
async fn test_fetch_connection_refused_is_transport_error() {
    let client = SearchClient::new(REFUSED_URL, Duration::from_secs(5)).unwrap();
    let err = assert_err!(client.search().await);

    assert!(err.is_transport());
    assert!(!err.is_decode());
}

#[tokio::test]
async fn test_sendgrid_rejection() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/v3/mail/send")
        .with_status(401)
        .with_body(r#"{"errors": [{"message": "Permission denied"}]}"#)
        .create_async()
        .await;

    let client = create_sendgrid(server.url());
    let err = assert_err!(client.notify_available("https://example.com/item/1").await);

    match err {
        NotificationError::Rejected { status, body } => {
            assert_eq!(status.as_u16(), 401);
            assert!(body.contains("Permission denied"));
        }
        other => panic!("expected a rejection, got {:?}", other),
    }
}

// Scenario A: one matching record, notify once, stop
#[tokio::test]
async fn test_end_to_end_match_sends_email() {
    let mut server = mockito::Server::new_async().await;
    let search_mock = server
        .mock("GET", "/search")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(MATCHING_BODY)
        .expect(1)
        .create_async()
        .await;
    let mail_mock = server
        .mock("POST", "/v3/mail/send")
        .match_header("authorization", "Bearer SG.test")
        .match_body(mockito::Matcher::Regex(r"https://example\.com/item/1".to_string()))
        .with_status(202)
        .expect(1)
        .create_async()
        .await;

    let search = SearchClient::new(format!("{}/search", server.url()), Duration::from_secs(5)).unwrap();
    let poller = Poller::new(
        search,
        create_sendgrid(server.url()),
        Matcher::with_default_criteria(),
        Duration::from_secs(30),
    );

    let outcome = poller.run().await.unwrap();

    match outcome {
        PollOutcome::Matched(report) => {
            assert_eq!(report.attempts, 1);
            assert_eq!(report.record.url, "https://example.com/item/1");
            assert!(report.delivery.is_delivered());
        }
        other => panic!("expected a match, got {:?}", other),
    }
    search_mock.assert_async().await;
    mail_mock.assert_async().await;
}

// Scenario A with a failing mail service: still a match
#[tokio::test]
async fn test_end_to_end_notification_failure_is_not_fatal() {
    let mut server = mockito::Server::new_async().await;
    let _search = server
        .mock("GET", "/search")
        .with_status(200)
        .with_body(MATCHING_BODY)
        .create_async()
        .await;
    let mail_mock = server
        .mock("POST", "/v3/mail/send")
        .with_status(500)
        .expect(1)
        .create_async()
        .await;

    let search = SearchClient::new(format!("{}/search", server.url()), Duration::from_secs(5)).unwrap();
    let poller = Poller::new(
        search,
        create_sendgrid(server.url()),
        Matcher::with_default_criteria(),
        Duration::from_secs(30),
    );

    let outcome = poller.run().await.unwrap();

    assert!(matches!(outcome, PollOutcome::Matched(ref r) if !r.delivery.is_delivered()));
    mail_mock.assert_async().await;
}

// Scenario B: empty first, then the match after exactly one delay
#[tokio::test(start_paused = true)]
async fn test_end_to_end_match_after_one_delay() {
    let poller = Poller::new(
        BodySequence::new(vec![EMPTY_BODY, MATCHING_BODY]),
        OutboxNotifier::default(),
        Matcher::with_default_criteria(),
        Duration::from_secs(30),
    );

    let start = tokio::time::Instant::now();
    let outcome = poller.run().await.unwrap();

    assert_eq!(start.elapsed(), Duration::from_secs(30));
    assert!(matches!(outcome, PollOutcome::Matched(ref r) if r.attempts == 2));

    let outbox = poller.notifier().outbox();
    assert_eq!(outbox.len(), 1);
    assert!(outbox[0].html.contains(r#"<a href="https://example.com/item/1">"#));
}

// Scenario C: connection failure aborts without notifying
#[tokio::test]
async fn test_end_to_end_connection_failure_aborts() {
    let search = SearchClient::new(REFUSED_URL, Duration::from_secs(5)).unwrap();
    let poller = Poller::new(
        search,
        OutboxNotifier::default(),
        Matcher::with_default_criteria(),
        Duration::from_secs(30),
    );

    let err = poller.run().await.unwrap_err();

    assert_eq!(err.attempts, 1);
    assert!(err.source.is_transport());
    assert!(poller.notifier().outbox().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_decode_failure_mid_run_aborts() {
    let poller = Poller::new(
        BodySequence::new(vec![EMPTY_BODY, "<html></html>", MATCHING_BODY]),
        OutboxNotifier::default(),
        Matcher::with_default_criteria(),
        Duration::from_secs(30),
    );

    let err = poller.run().await.unwrap_err();

    assert_eq!(err.attempts, 2);
    assert!(err.source.is_decode());
    assert!(poller.notifier().outbox().is_empty());
}
