//! Integration tests for the HTTP content API client.

use std::time::Duration;

use anyhow::Result;
use cms_content::api::{ContentApi, HttpContentApi, SubSectionQuery};
use cms_content::core::ContentError;
use serde_json::json;

use crate::common::{Route, TestServer, query_param};

fn client(server: &TestServer) -> Result<HttpContentApi> {
    Ok(HttpContentApi::new(server.base_url(), Duration::from_secs(5))?)
}

#[tokio::test]
async fn test_bare_array_and_envelope_responses() -> Result<()> {
    let server = TestServer::start(vec![
        Route::ok("/api/websites", json!([{ "_id": "w1", "name": "Main" }])),
        Route::ok(
            "/api/languages/website/w1",
            json!({ "data": [
                { "languageID": "en", "language": "English", "isDefault": true },
                { "languageID": "ar", "language": "Arabic" }
            ]}),
        ),
    ])
    .await?;
    let api = client(&server)?;

    let websites = api.websites().await?;
    assert_eq!(websites.len(), 1);
    assert_eq!(websites[0].id, "w1");

    let languages = api.languages("w1").await?;
    assert_eq!(languages.len(), 2);
    assert!(languages[0].is_default);
    assert_eq!(languages[1].language_id, "ar");
    Ok(())
}

#[tokio::test]
async fn test_sections_pass_include_inactive() -> Result<()> {
    let server = TestServer::start(vec![Route::ok(
        "/api/sections/website/w1",
        json!([{ "_id": "s1", "name": "Hero", "type": "hero", "order": 1 }]),
    )])
    .await?;
    let api = client(&server)?;

    let sections = api.sections("w1", true).await?;
    assert_eq!(sections[0].section_type.as_deref(), Some("hero"));

    let requests = server.requests();
    assert_eq!(query_param(&requests[0], "includeInactive").as_deref(), Some("true"));
    Ok(())
}

#[tokio::test]
async fn test_subsections_batch_query() -> Result<()> {
    let server = TestServer::start(vec![Route::ok(
        "/api/subsections/section-items",
        json!([{
            "_id": "sub-1",
            "order": 1,
            "contentElements": [
                { "name": "Title", "type": "text", "defaultContent": "Hello" }
            ]
        }]),
    )])
    .await?;
    let api = client(&server)?;

    let ids = vec!["i1".to_string(), "i2".to_string()];
    let query = SubSectionQuery {
        active_only: true,
        limit: Some(20),
        skip: None,
        include_content_count: true,
    };
    let subsections = api.subsections(&ids, query).await?;
    assert_eq!(subsections.len(), 1);
    assert_eq!(subsections[0].element("Title").and_then(|e| e.default_content.as_deref()), Some("Hello"));

    let target = &server.requests()[0];
    assert_eq!(query_param(target, "ids").as_deref(), Some("i1,i2"));
    assert_eq!(query_param(target, "activeOnly").as_deref(), Some("true"));
    assert_eq!(query_param(target, "limit").as_deref(), Some("20"));
    assert_eq!(query_param(target, "includeContentCount").as_deref(), Some("true"));
    assert!(query_param(target, "skip").is_none());
    Ok(())
}

#[tokio::test]
async fn test_http_status_error() -> Result<()> {
    let server = TestServer::start(vec![Route::raw("/api/section-items/section/s1", 503, "{}")]).await?;
    let api = client(&server)?;

    let err = api.section_items("s1").await.unwrap_err();
    match &err {
        ContentError::HttpStatus { status, url } => {
            assert_eq!(*status, 503);
            assert!(url.ends_with("/api/section-items/section/s1"));
        }
        other => panic!("expected HttpStatus, got {other:?}"),
    }
    assert!(err.is_retryable());

    let missing = api.section_items("unknown").await.unwrap_err();
    assert!(matches!(missing, ContentError::HttpStatus { status: 404, .. }));
    assert!(!missing.is_retryable());
    Ok(())
}

#[tokio::test]
async fn test_unexpected_body_is_decode_error() -> Result<()> {
    let server = TestServer::start(vec![Route::raw("/api/websites", 200, r#"{"websites": "nope"}"#)]).await?;
    let api = client(&server)?;

    let err = api.websites().await.unwrap_err();
    assert!(matches!(err, ContentError::Decode { .. }));
    Ok(())
}
