use sitegen_onboarding::constants::HOMEPAGES_KEY;
use sitegen_onboarding::core::SiteGenError;
use sitegen_onboarding::homepages::HomepageService;
use sitegen_onboarding::models::HomepageVariant;
use sitegen_onboarding::store::{FileStore, SessionStore, Transaction, load};
use sitegen_onboarding::test_utils::{StubBackend, fixtures};
use std::sync::Arc;
use tempfile::TempDir;

fn file_service(dir: &std::path::Path, seed: u64) -> HomepageService {
    let store = FileStore::open(dir, "shop").unwrap();
    HomepageService::with_seed(Arc::new(store), Arc::new(StubBackend::new()), seed)
}

#[tokio::test]
async fn test_session_survives_reopen() {
    let temp = TempDir::new().unwrap();
    let prompt = fixtures::prompt();
    let generated = {
        let service = file_service(temp.path(), 1);
        service.set_prompt(&prompt).await.unwrap();
        let batch = service.generate(&prompt, false).await.unwrap();
        service.toggle_favorite("version1").await.unwrap();
        batch
    };

    let reopened = file_service(temp.path(), 2);

    assert_eq!(reopened.prompt().unwrap(), prompt);
    let variants = reopened.variants().unwrap();
    assert_eq!(variants.len(), generated.len());
    assert!(variants[0].is_favorite);
    assert_eq!(variants[1], generated[1]);
}

#[tokio::test]
async fn test_sessions_are_isolated() {
    let temp = TempDir::new().unwrap();
    let service = file_service(temp.path(), 1);
    let prompt = fixtures::prompt();
    service.set_prompt(&prompt).await.unwrap();
    service.generate(&prompt, false).await.unwrap();

    let other = FileStore::open(temp.path(), "other").unwrap();
    let other = HomepageService::new(Arc::new(other), Arc::new(StubBackend::new()));

    assert!(other.variants().unwrap().is_empty());
    assert!(matches!(other.prompt().unwrap_err(), SiteGenError::NotFound { .. }));
}

#[tokio::test]
async fn test_stale_commit_is_rejected() {
    let temp = TempDir::new().unwrap();
    let a = FileStore::open(temp.path(), "shop").unwrap();
    let b = FileStore::open(temp.path(), "shop").unwrap();

    let seen = load::<Vec<HomepageVariant>>(&a, HOMEPAGES_KEY).unwrap();
    let mut tx = Transaction::new();
    tx.put(HOMEPAGES_KEY, seen.version, &vec![fixtures::variant("version1", "Version 1")]).unwrap();
    tx.commit(&b).unwrap();

    let mut stale = Transaction::new();
    stale.put(HOMEPAGES_KEY, seen.version, &Vec::<HomepageVariant>::new()).unwrap();
    let err = stale.commit(&a).unwrap_err();

    assert!(matches!(err, SiteGenError::StoreConflict { ref key } if key == HOMEPAGES_KEY));
    assert_eq!(load::<Vec<HomepageVariant>>(&a, HOMEPAGES_KEY).unwrap().value.len(), 1);
    assert!(a.get(HOMEPAGES_KEY).unwrap().is_some());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_writers_lose_nothing() {
    let temp = TempDir::new().unwrap();
    let setup = file_service(temp.path(), 1);
    let prompt = fixtures::prompt();
    setup.set_prompt(&prompt).await.unwrap();
    setup.generate(&prompt, false).await.unwrap();

    let mut handles = Vec::new();
    for (i, slug) in ["version2", "version3"].into_iter().enumerate() {
        let service = file_service(temp.path(), 10 + i as u64);
        handles.push(tokio::spawn(async move { service.toggle_favorite(slug).await }));
    }
    for i in 0..2 {
        let service = file_service(temp.path(), 20 + i);
        handles.push(tokio::spawn(async move { service.duplicate_favorite("version1", None).await }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let variants = setup.variants().unwrap();
    assert_eq!(variants.len(), 5);
    assert_eq!(variants.iter().filter(|v| v.is_favorite).count(), 2);

    let mut slugs: Vec<&str> = variants.iter().map(|v| v.slug.as_str()).collect();
    slugs.sort_unstable();
    slugs.dedup();
    assert_eq!(slugs.len(), 5, "duplicate slugs in {slugs:?}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_double_submitted_regenerate_adds_two_variants() {
    let temp = TempDir::new().unwrap();
    let store: Arc<dyn SessionStore> = Arc::new(FileStore::open(temp.path(), "shop").unwrap());
    let backend = Arc::new(StubBackend::new());
    let prompt = fixtures::prompt();

    let setup = HomepageService::with_seed(store.clone(), backend.clone(), 1);
    setup.set_prompt(&prompt).await.unwrap();
    setup.generate(&prompt, false).await.unwrap();
    backend.set_home_pages(serde_json::json!({"solo": ["<p>Solo</p>"]}));
    setup.generate(&prompt, true).await.unwrap();
    assert_eq!(setup.buffered().unwrap().len(), 1);
    let before = setup.variants().unwrap().len();

    let first = HomepageService::with_seed(store.clone(), backend.clone(), 2);
    let second = HomepageService::with_seed(store.clone(), backend.clone(), 3);
    let (a, b) = tokio::join!(
        tokio::spawn(async move {
            let prompt = fixtures::prompt();
            first.regenerate_one(&prompt).await
        }),
        tokio::spawn(async move {
            let prompt = fixtures::prompt();
            second.regenerate_one(&prompt).await
        }),
    );
    let a = a.unwrap().unwrap();
    let b = b.unwrap().unwrap();

    assert_ne!(a.slug, b.slug);
    let variants = setup.variants().unwrap();
    assert_eq!(variants.len(), before + 2);

    let mut slugs: Vec<&str> = variants.iter().map(|v| v.slug.as_str()).collect();
    slugs.sort_unstable();
    slugs.dedup();
    assert_eq!(slugs.len(), variants.len(), "duplicate slugs in {slugs:?}");
    assert!(slugs.contains(&a.slug.as_str()));
    assert!(slugs.contains(&b.slug.as_str()));
}
