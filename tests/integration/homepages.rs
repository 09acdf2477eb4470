use crate::common::{generated_service, memory_service};
use serde_json::json;
use sitegen_onboarding::core::SiteGenError;
use sitegen_onboarding::palette::transform;
use sitegen_onboarding::test_utils::{fixtures, init_test_logging};

#[tokio::test]
async fn test_generate_end_to_end() {
    init_test_logging(None);
    let (service, backend) = memory_service(7);
    let prompt = fixtures::prompt();
    service.set_prompt(&prompt).await.unwrap();

    let batch = service.generate(&prompt, false).await.unwrap();

    let slugs: Vec<&str> = batch.iter().map(|v| v.slug.as_str()).collect();
    let titles: Vec<&str> = batch.iter().map(|v| v.title.as_str()).collect();
    assert_eq!(slugs, ["version1", "version2", "version3"]);
    assert_eq!(titles, ["Version 1", "Version 2", "Version 3"]);

    let candidates: Vec<_> =
        fixtures::raw_palettes().iter().enumerate().map(|(i, raw)| transform(raw, i)).collect();
    for variant in &batch {
        assert!(!variant.content.is_empty());
        assert!(!variant.content.contains("null"));
        assert!(!variant.is_favorite);
        assert!(candidates.contains(&variant.color), "unexpected palette {:?}", variant.color);
    }
    assert_eq!(batch[0].content, "<p>X</p>");

    assert_eq!(service.variants().unwrap(), batch);
    assert_eq!(backend.site_meta_calls(), 1);
    assert_eq!(backend.home_page_calls(), 1);
}

#[tokio::test]
async fn test_backend_failure_keeps_existing_set() {
    let (service, backend) = generated_service(7).await;
    let before = service.variants().unwrap();
    backend.fail_home_pages("We are unable to process the request at this moment");

    let err = service.generate(&fixtures::prompt(), false).await.unwrap_err();

    assert!(matches!(err, SiteGenError::GenerationFailed { .. }));
    assert_eq!(service.variants().unwrap(), before);
}

#[tokio::test]
async fn test_palettes_are_cached_per_prompt() {
    let (service, backend) = generated_service(7).await;

    service.generate(&fixtures::prompt(), false).await.unwrap();
    service.palettes().await.unwrap();
    assert_eq!(backend.site_meta_calls(), 1);

    let mut changed = fixtures::prompt();
    changed.content_style = "playful".to_string();
    service.set_prompt(&changed).await.unwrap();
    service.palettes().await.unwrap();
    assert_eq!(backend.site_meta_calls(), 2);
}

#[tokio::test]
async fn test_buffer_drains_before_backend_is_called() {
    let (service, backend) = generated_service(5).await;
    let prompt = fixtures::prompt();

    service.generate(&prompt, true).await.unwrap();
    assert_eq!(backend.regenerate_flags(), [false, true]);
    let buffered = service.buffered().unwrap().len();
    assert_eq!(buffered, 3);

    for _ in 0..buffered {
        service.regenerate_one(&prompt).await.unwrap();
    }
    assert_eq!(backend.home_page_calls(), 2);
    assert!(service.buffered().unwrap().is_empty());

    let variant = service.regenerate_one(&prompt).await.unwrap();
    assert_eq!(backend.home_page_calls(), 3);
    assert_eq!(variant.slug, "version7");

    let slugs: Vec<String> = service.variants().unwrap().into_iter().map(|v| v.slug).collect();
    assert_eq!(
        slugs,
        ["version1", "version2", "version3", "version4", "version5", "version6", "version7"]
    );
}

#[tokio::test]
async fn test_initial_generate_discards_buffer() {
    let (service, _) = generated_service(5).await;
    let prompt = fixtures::prompt();
    service.generate(&prompt, true).await.unwrap();

    service.generate(&prompt, false).await.unwrap();

    assert!(service.buffered().unwrap().is_empty());
    assert_eq!(service.variants().unwrap().len(), 3);
}

#[tokio::test]
async fn test_single_page_batches() {
    let (service, backend) = generated_service(5).await;
    backend.set_home_pages(json!({"solo": {"content": "<p>Solo</p>", "header": "<header/>"}}));

    let variant = service.regenerate_one(&fixtures::prompt()).await.unwrap();

    assert_eq!(variant.slug, "version4");
    assert_eq!(variant.header.as_deref(), Some("<header/>"));
    assert!(service.buffered().unwrap().is_empty());
}

#[tokio::test]
async fn test_favorite_and_duplicate_flow() {
    let (service, _) = generated_service(9).await;

    let favorite = service.toggle_favorite("version2").await.unwrap();
    assert!(favorite.is_favorite);

    let first = service.duplicate_favorite("version2", None).await.unwrap();
    let second = service.duplicate_favorite("version2", None).await.unwrap();

    assert_eq!((first.title.as_str(), first.slug.as_str()), ("Version 2 (Copy)", "version2-copy"));
    assert_eq!(
        (second.title.as_str(), second.slug.as_str()),
        ("Version 2 (Copy) (Copy)", "version2-copy-copy")
    );
    assert!(!first.color.same_colors(&favorite.color));
    assert!(!second.color.same_colors(&favorite.color));
    assert_eq!(first.content, favorite.content);
    assert!(!first.is_favorite);

    let variants = service.variants().unwrap();
    assert_eq!(variants.len(), 5);
    assert_eq!(variants.iter().filter(|v| v.is_favorite).count(), 1);

    // The copy keeps its slug when more versions arrive
    service.regenerate_one(&fixtures::prompt()).await.unwrap();
    assert!(service.variant("version2-copy").is_ok());
}

#[tokio::test]
async fn test_unknown_slug_is_not_found() {
    let (service, _) = generated_service(9).await;

    assert!(matches!(
        service.toggle_favorite("version9").await.unwrap_err(),
        SiteGenError::NotFound { .. }
    ));
    assert!(matches!(
        service.duplicate_favorite("version9", None).await.unwrap_err(),
        SiteGenError::NotFound { .. }
    ));
}
