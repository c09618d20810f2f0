//! Cached section loading over the in-memory API.

use std::sync::Arc;
use std::time::Duration;

use cms_content::cache::CacheConfig;
use cms_content::content::FieldMapping;
use cms_content::core::ContentError;
use cms_content::loader::{SectionContentLoader, SectionRequest};
use cms_content::test_utils::{MockContentApi, SubSectionBuilder};

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn services_api() -> MockContentApi {
    MockContentApi::new()
        .with_language("w1", "en", true)
        .with_language("w1", "ar", false)
        .with_section("w1", "s1", "Services")
        .with_item("s1", "i1")
        .with_item("s1", "i2")
        .with_subsection(
            "i1",
            SubSectionBuilder::new("a").order(2).translated("Title", "Support", &[("ar", "الدعم")]).build(),
        )
        .with_subsection(
            "i2",
            SubSectionBuilder::new("b").order(1).translated("Title", "Consulting", &[("ar", "استشارات")]).build(),
        )
        .with_subsection("i2", SubSectionBuilder::new("hidden").order(0).inactive().text("Title", "Draft").build())
}

fn request() -> SectionRequest {
    SectionRequest::by_id("w1", "s1", FieldMapping::new().field("title", "Title"))
}

fn loader(api: &Arc<MockContentApi>, config: CacheConfig) -> SectionContentLoader {
    SectionContentLoader::new(api.clone(), config, "en")
}

#[tokio::test(start_paused = true)]
async fn test_language_is_part_of_the_cache_key() -> TestResult {
    let api = Arc::new(services_api());
    let loader = loader(&api, CacheConfig::default());

    let en = loader.load(&request().language("en")).await.into_result()?;
    let ar = loader.load(&request().language("ar")).await.into_result()?;

    assert_eq!(en[0].text("title"), "Consulting");
    assert_eq!(ar[0].text("title"), "استشارات");
    assert_eq!(api.subsection_calls(), 2);
    assert_eq!(loader.content_cache().len(), 2);

    // Both entries are independent and still fresh
    let en_again = loader.load(&request().language("en")).await.into_result()?;
    assert!(Arc::ptr_eq(&en, &en_again));
    assert_eq!(api.subsection_calls(), 2);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_inactive_subsections_are_not_requested() -> TestResult {
    let api = Arc::new(services_api());
    let loader = loader(&api, CacheConfig::default());

    let items = loader.load(&request()).await.into_result()?;
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|item| item.text("title") != "Draft"));

    let (ids, query) = api.last_subsection_query().ok_or("no subsection query")?;
    assert_eq!(ids, vec!["i1".to_string(), "i2".to_string()]);
    assert!(query.active_only);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_loads_share_one_fetch() -> TestResult {
    let api = Arc::new(services_api().with_latency(Duration::from_millis(200)));
    let loader = loader(&api, CacheConfig::default());
    let request = request();

    let (first, second, third) = tokio::join!(loader.load(&request), loader.load(&request), loader.load(&request));
    let first = first.into_result()?;
    assert!(Arc::ptr_eq(&first, &second.into_result()?));
    assert!(Arc::ptr_eq(&first, &third.into_result()?));
    assert_eq!(api.section_item_calls(), 1);
    assert_eq!(api.subsection_calls(), 1);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_stale_content_is_served_while_revalidating() -> TestResult {
    let api = Arc::new(services_api());
    let config = CacheConfig {
        stale_time: Duration::from_secs(60),
        gc_time: Duration::from_secs(600),
        ..CacheConfig::default()
    };
    let loader = loader(&api, config);

    let fresh = loader.load(&request()).await.into_result()?;
    tokio::time::advance(Duration::from_secs(61)).await;

    let stale = loader.load(&request()).await.into_result()?;
    assert!(Arc::ptr_eq(&fresh, &stale));

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(api.subsection_calls(), 2);

    let revalidated = loader.load(&request()).await.into_result()?;
    assert!(!Arc::ptr_eq(&fresh, &revalidated));
    assert_eq!(*fresh, *revalidated);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_failures_surface_after_one_retry() -> TestResult {
    let api = Arc::new(services_api());
    let loader = loader(&api, CacheConfig::default());

    api.fail_next(2);
    let state = loader.load(&request()).await;
    assert!(matches!(state.error(), Some(ContentError::Fetch { .. })));
    assert_eq!(api.section_item_calls(), 2);

    // The error entry is refetched on the next access
    let items = loader.load(&request()).await.into_result()?;
    assert_eq!(items.len(), 2);
    assert_eq!(api.section_item_calls(), 3);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_failure_of_one_key_does_not_affect_another() -> TestResult {
    let api = Arc::new(services_api().with_latency(Duration::from_millis(50)));
    let loader = loader(&api, CacheConfig::default());

    let en = loader.load(&request().language("en")).await.into_result()?;

    api.fail_next(2);
    let ar = loader.load(&request().language("ar")).await;
    assert!(ar.error().is_some());

    let en_again = loader.load(&request().language("en")).await.into_result()?;
    assert!(Arc::ptr_eq(&en, &en_again));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_observer_follows_language_switch() -> TestResult {
    let api = Arc::new(services_api().with_latency(Duration::from_millis(100)));
    let loader = loader(&api, CacheConfig::default());

    let observer = loader.observe(&request().language("en")).await?;
    let switch = async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        loader.rebind(&observer, &request().language("ar")).await
    };

    // The English result arrives after the switch and is discarded
    let (english, switched) = tokio::join!(observer.load(), switch);
    switched?;
    assert!(english.is_none());

    let arabic = observer.load().await.ok_or("observer moved")?.into_result()?;
    assert_eq!(arabic[0].text("title"), "استشارات");
    assert_eq!(observer.key().language_code(), Some("ar"));

    assert!(observer.invalidate());
    let reloaded = observer.refetch().await.ok_or("observer moved")?.into_result()?;
    assert_eq!(reloaded[1].text("title"), "الدعم");
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_lookup_by_name_and_website_invalidation() -> TestResult {
    let api = Arc::new(services_api());
    let loader = loader(&api, CacheConfig::default());
    let by_name = SectionRequest::by_name("w1", "services", FieldMapping::new().field("title", "Title"));

    loader.load(&by_name).await.into_result()?;
    loader.load(&by_name.clone().language("ar")).await.into_result()?;
    assert_eq!(api.section_calls(), 1);

    let missing = SectionRequest::by_name("w1", "blog", FieldMapping::new().field("title", "Title"));
    assert!(matches!(
        loader.load(&missing).await.error(),
        Some(ContentError::SectionNotFound { name }) if name == "blog"
    ));

    // Two content entries plus the section list
    assert_eq!(loader.invalidate_website("w1"), 3);
    loader.load(&by_name).await.into_result()?;
    assert_eq!(api.section_calls(), 2);
    assert_eq!(api.subsection_calls(), 3);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_unobserved_entries_are_collected() -> TestResult {
    let api = Arc::new(services_api());
    let config = CacheConfig {
        stale_time: Duration::from_secs(10),
        gc_time: Duration::from_secs(30),
        ..CacheConfig::default()
    };
    let loader = loader(&api, config);

    let observer = loader.observe(&request().language("ar")).await?;
    observer.load().await.ok_or("observer moved")?.into_result()?;
    loader.load(&request().language("en")).await.into_result()?;

    tokio::time::advance(Duration::from_secs(31)).await;
    assert_eq!(loader.collect_garbage(), 1);
    assert_eq!(loader.content_cache().len(), 1);

    drop(observer);
    tokio::time::advance(Duration::from_secs(31)).await;
    assert_eq!(loader.collect_garbage(), 1);
    assert!(loader.content_cache().is_empty());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_request_filter_and_language_pick() -> TestResult {
    let api = Arc::new(services_api());
    let loader = loader(&api, CacheConfig::default());

    let only_support = request().view("support-only").filter(|item| item.text("title") == "Support");
    let items = loader.load(&only_support).await.into_result()?;
    assert_eq!(items.len(), 1);

    assert_eq!(loader.pick_language("w1", Some("ar")).await?, "ar");
    assert_eq!(loader.pick_language("w1", Some("fr")).await?, "en");
    assert_eq!(loader.pick_language("unknown", None).await?, "en");
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_unmounted_view_does_not_stall_its_key() -> TestResult {
    let api = Arc::new(services_api().with_latency(Duration::from_millis(100)));
    let config = CacheConfig {
        stale_time: Duration::from_secs(60),
        gc_time: Duration::from_secs(120),
        ..CacheConfig::default()
    };
    let loader = loader(&api, config);

    // The view goes away while its first fetch is still running
    let observer = loader.observe(&request()).await?;
    let unmounted = tokio::time::timeout(Duration::from_millis(50), observer.load()).await;
    assert!(unmounted.is_err());
    drop(observer);

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(api.subsection_calls(), 1);
    let cached = loader.load(&request()).await.into_result()?;
    assert_eq!(api.subsection_calls(), 1);

    // A reload abandoned mid-flight does not block later revalidation
    let abandoned = tokio::time::timeout(Duration::from_millis(50), loader.reload(&request())).await;
    assert!(abandoned.is_err());
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(api.subsection_calls(), 2);

    tokio::time::advance(Duration::from_secs(61)).await;
    let stale = loader.load(&request()).await.into_result()?;
    assert_eq!(*stale, *cached);
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(api.subsection_calls(), 3);

    tokio::time::advance(Duration::from_secs(121)).await;
    assert_eq!(loader.collect_garbage(), 1);
    assert!(loader.content_cache().is_empty());
    Ok(())
}
