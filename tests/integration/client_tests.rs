use crate::common::{calendar_response, listing_detail, request_variable, reviews_page, test_config};
use rental_harvest::api::{CalendarApi, ExistenceProbe, ExploreApi, ListingApi, MarketplaceClient, ReviewsApi};
use rental_harvest::listing::Geography;
use rental_harvest::state::SectionCache;
use rental_harvest::url::SearchParams;
use rental_harvest::ApiError;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> MarketplaceClient {
    let dir = std::env::temp_dir();
    let config = test_config(&server.uri(), &dir.join("unused.db"));
    MarketplaceClient::new(&config).unwrap()
}

#[tokio::test]
async fn test_reviews_paged_until_count_reached() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/PdpReviews"))
        .and(request_variable("offset", 0))
        .respond_with(ResponseTemplate::new(200).set_body_json(reviews_page(&[1, 2], 4)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v3/PdpReviews"))
        .and(request_variable("offset", 2))
        .respond_with(ResponseTemplate::new(200).set_body_json(reviews_page(&[3, 4], 4)))
        .expect(1)
        .mount(&server)
        .await;

    let reviews = client(&server).get_reviews("42").await.unwrap();

    let ids: Vec<&str> = reviews.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3", "4"]);
    assert_eq!(reviews[0].author.as_deref(), Some("Ana"));
}

#[tokio::test]
async fn test_reviews_stop_on_empty_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/PdpReviews"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reviews_page(&[], 10)))
        .expect(1)
        .mount(&server)
        .await;

    let reviews = client(&server).get_reviews("42").await.unwrap();
    assert!(reviews.is_empty());
}

#[tokio::test]
async fn test_forbidden_is_classified() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/PdpAvailabilityCalendar"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let error = client(&server).get_calendar("42").await.unwrap_err();
    assert!(error.is_forbidden());
}

#[tokio::test]
async fn test_other_statuses_are_not_forbidden() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/PdpAvailabilityCalendar"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let error = client(&server).get_calendar("42").await.unwrap_err();
    assert!(matches!(error, ApiError::Status { status: 404, .. }));
}

#[tokio::test]
async fn test_calendar_stay_limits() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/PdpAvailabilityCalendar"))
        .and(request_variable("count", 12))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(calendar_response(&[(true, 2), (false, 3)], 3, 21)),
        )
        .mount(&server)
        .await;

    let fetch = client(&server).get_calendar("42").await.unwrap();
    assert_eq!(fetch.calendar.len(), 5);
    assert_eq!(fetch.min_nights, 3);
    assert_eq!(fetch.max_nights, 21);
}

#[tokio::test]
async fn test_calendar_without_stay_limits_uses_defaults() {
    let server = MockServer::start().await;

    let body = json!({"data": {"pdp": {"availabilityCalendar": {"calendarMonths": [
        {"days": [{"calendarDate": "2030-01-01", "available": true}]}
    ]}}}});
    Mock::given(method("GET"))
        .and(path("/api/v3/PdpAvailabilityCalendar"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let fetch = client(&server).get_calendar("42").await.unwrap();
    assert_eq!(fetch.min_nights, 1);
    assert_eq!(fetch.max_nights, 1125);
}

#[tokio::test]
async fn test_missing_payload_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/PdpAvailabilityCalendar"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {}})))
        .mount(&server)
        .await;

    let error = client(&server).get_calendar("42").await.unwrap_err();
    assert!(matches!(error, ApiError::Payload { .. }));
}

#[tokio::test]
async fn test_search_sends_api_key_and_reads_pagination() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/ExploreSearch"))
        .and(header("x-api-key", "test-key"))
        .and(request_variable("query", "Lisbon"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"dora": {"exploreV3": {
                "metadata": {"paginationMetadata": {"hasNextPage": true, "itemsOffset": 2}},
                "sections": []
            }}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let url = client.search_url("Lisbon", &SearchParams::default());
    let page = client.search(&url).await.unwrap();

    assert!(page.pagination.has_next_page);
    assert_eq!(page.pagination.items_offset, 2);
    assert!(page.geography().is_none());
}

#[tokio::test]
async fn test_probe_returns_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rooms/42"))
        .respond_with(ResponseTemplate::new(410))
        .mount(&server)
        .await;

    let status = client(&server).probe_listing("42").await.unwrap();
    assert_eq!(status, 410);
}

#[tokio::test]
async fn test_non_json_body_is_payload_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/PdpAvailabilityCalendar"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>captcha</html>"))
        .mount(&server)
        .await;

    let error = client(&server).get_calendar("42").await.unwrap_err();
    assert!(matches!(error, ApiError::Payload { .. }));
}

#[tokio::test]
async fn test_unreadable_search_item_falls_back_to_detail() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/PdpListingDetail"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing_detail()))
        .mount(&server)
        .await;

    let mut cache = SectionCache::new();
    cache.insert("42".to_string(), json!({"listing": {"name": 17}}));

    let listing = client(&server)
        .get_listing("42", &cache, &Geography::default(), Vec::new())
        .await
        .unwrap();

    assert!(listing.name.is_none());
    assert_eq!(listing.host_id.as_deref(), Some("777"));
}
