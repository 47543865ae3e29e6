use std::collections::BTreeSet;

use serde_json::{json, Value};

use crate::helpers::spawn_app;

fn ids(body: &Value) -> Vec<i64> {
    body["data"]
        .as_array()
        .expect("data is not an array")
        .iter()
        .map(|book| book["id"].as_i64().expect("id is not an integer"))
        .collect()
}

#[tokio::test]
#[ignore = "needs a MySQL server in TEST_DB_DSN"]
async fn sorting_by_rating_paginates_the_catalog() {
    let app = spawn_app().await;

    let body = app
        .get_json("/books?sort_by=average_rating&sort_order=desc&per_page=2&page=1")
        .await;

    assert_eq!(ids(&body), vec![3, 1]);
    assert_eq!(body["total"], 3);
    assert_eq!(body["last_page"], 2);
    assert_eq!(body["current_page"], 1);
    assert_eq!(body["per_page"], 2);
}

#[tokio::test]
#[ignore = "needs a MySQL server in TEST_DB_DSN"]
async fn year_range_filters_books() {
    let app = spawn_app().await;

    let body = app.get_json("/books?year_min=1970&year_max=2000").await;

    assert_eq!(ids(&body), vec![2]);
    assert_eq!(body["total"], 1);
}

#[tokio::test]
#[ignore = "needs a MySQL server in TEST_DB_DSN"]
async fn search_and_category_filters() {
    let app = spawn_app().await;

    let body = app.get_json("/books?search=neuro").await;
    assert_eq!(ids(&body), vec![2]);
    assert_eq!(body["total"], 1);

    let body = app.get_json("/books?search=asimov").await;
    assert_eq!(ids(&body), vec![3]);

    let body = app.get_json("/books?search=0441013593").await;
    assert_eq!(ids(&body), vec![1]);

    let body = app.get_json("/books?categories=classic").await;
    assert_eq!(ids(&body), vec![1, 3]);
    assert_eq!(body["total"], 2);
}

#[tokio::test]
#[ignore = "needs a MySQL server in TEST_DB_DSN"]
async fn show_returns_names_in_stored_order() {
    let app = spawn_app().await;

    let body = app.get_json("/books/2").await;

    assert_eq!(body["title"], "Neuromancer");
    assert_eq!(body["isbn13"], "9780441569595");
    assert_eq!(body["authors"], json!(["Gibson"]));
    assert_eq!(body["categories"], json!(["scifi", "cyberpunk"]));
}

#[tokio::test]
#[ignore = "needs a MySQL server in TEST_DB_DSN"]
async fn unknown_book_is_404() {
    let app = spawn_app().await;

    let response = app.get("/books/999").await;

    assert_eq!(response.status().as_u16(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Book not found" }));
}

#[tokio::test]
#[ignore = "needs a MySQL server in TEST_DB_DSN"]
async fn stats_summarize_the_catalog() {
    let app = spawn_app().await;

    let body = app.get_json("/books/stats").await;

    assert_eq!(body["total_books"], 3);
    assert_eq!(body["average_rating"], 4.2);
    assert_eq!(body["total_authors"], 3);
    // scifi, classic, cyberpunk
    assert_eq!(body["total_categories"], 3);
    assert_eq!(body["top_rated_book"]["id"], 3);
    assert_eq!(body["top_rated_book"]["authors"], json!(["Asimov"]));
    assert_eq!(body["most_popular_book"]["id"], 1);
    assert_eq!(body["most_popular_book"]["authors"], json!(["Herbert"]));
}

#[tokio::test]
#[ignore = "needs a MySQL server in TEST_DB_DSN"]
async fn hostile_input_is_matched_literally() {
    let app = spawn_app().await;

    for term in ["'; DROP TABLE books; --", "%", "_", "\\", "x' OR '1'='1"] {
        let response = app
            .client
            .get(format!("{}/books", app.address))
            .query(&[("search", term), ("categories", term)])
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 200, "search {:?}", term);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["total"], 0, "search {:?}", term);
    }

    let body = app.get_json("/books").await;
    assert_eq!(body["total"], 3);
}

#[tokio::test]
#[ignore = "needs a MySQL server in TEST_DB_DSN"]
async fn every_page_agrees_with_the_count() {
    let app = spawn_app().await;

    let first = app.get_json("/books?per_page=1&sort_by=title&sort_order=asc").await;
    let total = first["total"].as_u64().unwrap();
    let last_page = first["last_page"].as_u64().unwrap();
    assert_eq!(last_page, total);

    let mut seen = BTreeSet::new();
    let mut titles = Vec::new();
    for page in 1..=last_page + 1 {
        let body = app
            .get_json(&format!("/books?per_page=1&sort_by=title&sort_order=asc&page={}", page))
            .await;
        let data = body["data"].as_array().unwrap();
        let remaining = total.saturating_sub(page - 1);
        assert!(data.len() as u64 <= remaining.min(1));
        for book in data {
            seen.insert(book["id"].as_i64().unwrap());
            titles.push(book["title"].as_str().unwrap().to_string());
        }
    }

    assert_eq!(seen.len() as u64, total);
    let mut sorted = titles.clone();
    sorted.sort();
    assert_eq!(titles, sorted);
}

#[tokio::test]
#[ignore = "needs a MySQL server in TEST_DB_DSN"]
async fn filters_hold_for_every_row() {
    let app = spawn_app().await;

    let body = app
        .get_json("/books?min_rating=4.15&min_pages=256&categories=scifi&sort_by=num_pages&sort_order=asc")
        .await;

    let data = body["data"].as_array().unwrap();
    assert_eq!(ids(&body), vec![1]);
    for book in data {
        assert!(book["average_rating"].as_f64().unwrap() >= 4.15);
        assert!(book["num_pages"].as_i64().unwrap() >= 256);
        assert!(book["categories"]
            .as_array()
            .unwrap()
            .contains(&json!("scifi")));
    }
}

#[tokio::test]
#[ignore = "needs a MySQL server in TEST_DB_DSN"]
async fn identical_requests_return_identical_bodies() {
    let app = spawn_app().await;
    let path = "/books?categories=scifi&sort_by=published_year";

    let first = app.get(path).await.text().await.unwrap();
    let second = app.get(path).await.text().await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
#[ignore = "needs a MySQL server in TEST_DB_DSN"]
async fn non_get_methods_are_rejected() {
    let app = spawn_app().await;

    let response = app
        .client
        .delete(format!("{}/books/1", app.address))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 405);
}
