use crate::common::{explore_page, listing_detail, request_variable, reviews_page, test_config, WithoutQueryParam};
use rental_harvest::crawler::{run_search, CrawlReport};
use rental_harvest::storage::{RunKind, RunStatus, SqliteStorage};
use rental_harvest::url::SearchParams;
use rental_harvest::{ApiError, HarvestError};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_listing_endpoints(server: &MockServer, expected_details: u64) {
    Mock::given(method("GET"))
        .and(path("/api/v3/PdpListingDetail"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing_detail()))
        .expect(expected_details)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v3/PdpReviews"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reviews_page(&[1], 1)))
        .expect(expected_details)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_search_deduplicates_across_pages() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("listings.db");

    Mock::given(method("GET"))
        .and(path("/api/v3/ExploreSearch"))
        .and(WithoutQueryParam("itemsOffset"))
        .and(header("x-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(explore_page(
            &["101", "102"],
            true,
            2,
            Some("Lisbon"),
        )))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v3/ExploreSearch"))
        .and(query_param("itemsOffset", "2"))
        .and(request_variable("priceMax", 200))
        .respond_with(ResponseTemplate::new(200).set_body_json(explore_page(
            &["102", "103"],
            true,
            4,
            Some("Madrid"),
        )))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v3/ExploreSearch"))
        .and(query_param("itemsOffset", "4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(explore_page(&[], false, 4, None)))
        .expect(1)
        .mount(&server)
        .await;

    // 102 appears on two pages but is only fetched once
    mount_listing_endpoints(&server, 3).await;

    let config = test_config(&server.uri(), &db_path);
    let params = SearchParams {
        price_max: Some(200),
        ..SearchParams::default()
    };
    let report = run_search(&config, "hash", "Lisbon", params).await.unwrap();

    assert_eq!(
        report,
        CrawlReport {
            pages: 3,
            new_listings: 3,
            duplicates: 1
        }
    );

    let storage = SqliteStorage::new(&db_path).unwrap();
    assert_eq!(
        rental_harvest::storage::ListingStore::get_all_index_ids(&storage).unwrap(),
        vec!["101", "102", "103"]
    );

    let listing = storage.get_listing("103").unwrap().unwrap();
    assert_eq!(listing.name.as_deref(), Some("Listing 103"));
    assert_eq!(listing.city.as_deref(), Some("Lisbon"));
    assert_eq!(listing.country.as_deref(), Some("Portugal"));
    assert_eq!(listing.host_id.as_deref(), Some("777"));
    assert_eq!(listing.amenities, vec!["Wifi"]);
    assert_eq!(listing.price_rate, Some(95.0));
    assert_eq!(listing.reviews.len(), 1);
    assert_eq!(listing.url, format!("{}/rooms/103", server.uri()));

    let run = storage.get_latest_run().unwrap().unwrap();
    assert_eq!(run.kind, RunKind::Search);
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.items, 3);
    assert_eq!(run.config_hash, "hash");
}

#[tokio::test]
async fn test_search_single_page_saves_nothing() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("listings.db");

    Mock::given(method("GET"))
        .and(path("/api/v3/ExploreSearch"))
        .respond_with(ResponseTemplate::new(200).set_body_json(explore_page(
            &["101", "102"],
            false,
            2,
            None,
        )))
        .expect(1)
        .mount(&server)
        .await;

    mount_listing_endpoints(&server, 0).await;

    let config = test_config(&server.uri(), &db_path);
    let report = run_search(&config, "hash", "Nowhere", SearchParams::default())
        .await
        .unwrap();

    assert_eq!(report.pages, 1);
    assert_eq!(report.new_listings, 0);

    let storage = SqliteStorage::new(&db_path).unwrap();
    assert!(storage.get_listing("101").unwrap().is_none());
    assert_eq!(storage.get_latest_run().unwrap().unwrap().status, RunStatus::Completed);
}

#[tokio::test]
async fn test_search_server_error_fails_run() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("listings.db");

    Mock::given(method("GET"))
        .and(path("/api/v3/ExploreSearch"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let config = test_config(&server.uri(), &db_path);
    let result = run_search(&config, "hash", "Lisbon", SearchParams::default()).await;

    assert!(matches!(
        result,
        Err(HarvestError::Api(ApiError::Status { status: 500, .. }))
    ));

    let storage = SqliteStorage::new(&db_path).unwrap();
    let run = storage.get_latest_run().unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Failed);
    assert!(run.error_message.unwrap().contains("500"));
}
