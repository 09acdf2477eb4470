use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;
use sitegen_onboarding::config::SiteConfig;
use sitegen_onboarding::core::SiteGenError;
use sitegen_onboarding::finalize::{FinalizeStage, Finalizer};
use sitegen_onboarding::homepages::HomepageService;
use sitegen_onboarding::site::{ShowOnFront, SiteSettings, StoreSite};
use sitegen_onboarding::store::{MemoryStore, SessionStore};
use sitegen_onboarding::test_utils::{StubBackend, StubPublisher, fixtures};
use sitegen_onboarding::theme::{LocalThemes, ThemeHost};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

struct Onboarding {
    temp: TempDir,
    service: HomepageService,
    site: Arc<StoreSite>,
    publisher: Arc<StubPublisher>,
    themes: Arc<LocalThemes>,
    finalizer: Finalizer,
}

async fn onboarding(with_parent: bool) -> Onboarding {
    let temp = TempDir::new().unwrap();
    if with_parent {
        fixtures::install_parent_theme(temp.path(), "yith-wonder");
    }

    let store: Arc<dyn SessionStore> = Arc::new(MemoryStore::new());
    let service = HomepageService::with_seed(store.clone(), Arc::new(StubBackend::new()), 21);
    let prompt = fixtures::prompt();
    service.set_prompt(&prompt).await.unwrap();
    service.generate(&prompt, false).await.unwrap();

    let site = Arc::new(StoreSite::new(store.clone()));
    site.set_site_title("Nata & Co").unwrap();
    site.set_site_url("https://example.com").unwrap();
    let publisher = Arc::new(StubPublisher::new());
    let themes = Arc::new(LocalThemes::new(temp.path()));
    let finalizer =
        Finalizer::new(store, site.clone(), publisher.clone(), themes.clone(), SiteConfig::default());

    Onboarding {
        temp,
        service,
        site,
        publisher,
        themes,
        finalizer,
    }
}

#[tokio::test]
async fn test_finalize_favorites_end_to_end() {
    let o = onboarding(true).await;
    o.service.toggle_favorite("version3").await.unwrap();
    let active = o.service.variant("version1").unwrap();
    let all = o.service.variants().unwrap();
    let screenshot = STANDARD.encode(b"\x89PNG active");

    let report = o.finalizer.finalize(&active, &all, Some(&screenshot)).unwrap();

    assert_eq!(report.child_slug, "yith-wonder-version1");
    assert_eq!(o.publisher.published_titles(), ["Version 1", "Version 3"]);
    assert_eq!(o.site.show_on_front().unwrap(), ShowOnFront::Page);
    assert_eq!(o.site.front_page().unwrap().as_deref(), Some(report.front_page.as_str()));
    assert_eq!(o.themes.active_theme().unwrap().as_deref(), Some("yith-wonder-version1"));

    let active_dir = o.temp.path().join("yith-wonder-version1");
    let favorite_dir = o.temp.path().join("yith-wonder-version3");
    assert_eq!(fs::read(active_dir.join("screenshot.png")).unwrap(), b"\x89PNG active");
    assert_eq!(fs::read(favorite_dir.join("screenshot.png")).unwrap(), b"\x89PNG parent");

    let theme_json: Value =
        serde_json::from_str(&fs::read_to_string(active_dir.join("theme.json")).unwrap()).unwrap();
    let palette = theme_json["settings"]["color"]["palette"].as_array().unwrap();
    let expected: Vec<&str> = active.color.entries.iter().map(|e| e.color.as_str()).collect();
    let written: Vec<&str> = palette.iter().map(|e| e["color"].as_str().unwrap()).collect();
    assert_eq!(written, expected);
    assert_eq!(theme_json["settings"]["typography"]["fluid"], true);

    let css = fs::read_to_string(active_dir.join("style.css")).unwrap();
    assert!(css.contains("Template: yith-wonder"));
    assert!(css.contains("generated for Nata & Co"));
}

#[tokio::test]
async fn test_placeholder_title_falls_back_to_url_hash() {
    let o = onboarding(true).await;
    o.site.set_site_title("My WordPress Site").unwrap();
    let all = o.service.variants().unwrap();

    o.finalizer.finalize(&all[1], &all, None).unwrap();

    let css =
        fs::read_to_string(o.temp.path().join("yith-wonder-version2").join("style.css")).unwrap();
    assert!(css.contains("generated for bluehost-100680ad"), "{css}");
}

#[tokio::test]
async fn test_missing_parent_publishes_but_never_activates() {
    let o = onboarding(false).await;
    let all = o.service.variants().unwrap();

    let err = o.finalizer.finalize(&all[0], &all, None).unwrap_err();

    assert!(matches!(err, SiteGenError::ParentThemeMissing { ref slug } if slug == "yith-wonder"));
    assert_eq!(o.publisher.published_titles(), ["Version 1"]);
    assert_eq!(o.themes.active_theme().unwrap(), None);
    let checkpoint = o.finalizer.checkpoint("yith-wonder-version1").unwrap().unwrap();
    assert_eq!(checkpoint.stage, FinalizeStage::Theming);

    // Installing the parent lets a rerun finish without publishing twice
    fixtures::install_parent_theme(o.temp.path(), "yith-wonder");
    let report = o.finalizer.finalize(&all[0], &all, None).unwrap();

    assert_eq!(report.reused_documents, 1);
    assert_eq!(o.publisher.publish_calls(), 1);
    assert_eq!(o.themes.active_theme().unwrap().as_deref(), Some("yith-wonder-version1"));
}

#[tokio::test]
async fn test_deleted_document_is_published_again() {
    let o = onboarding(true).await;
    let all = o.service.variants().unwrap();
    let first = o.finalizer.finalize(&all[0], &all, None).unwrap();

    o.publisher.delete(&first.front_page);
    let second = o.finalizer.finalize(&all[0], &all, None).unwrap();

    assert_eq!(second.reused_documents, 0);
    assert_ne!(second.front_page, first.front_page);
    assert_eq!(o.site.front_page().unwrap().as_deref(), Some(second.front_page.as_str()));
}

#[tokio::test]
async fn test_fresh_generation_publishes_new_content() {
    let temp = TempDir::new().unwrap();
    fixtures::install_parent_theme(temp.path(), "yith-wonder");
    let store: Arc<dyn SessionStore> = Arc::new(MemoryStore::new());
    let backend = Arc::new(StubBackend::new());
    let service = HomepageService::with_seed(store.clone(), backend.clone(), 8);
    let site = Arc::new(StoreSite::new(store.clone()));
    let finalizer = Finalizer::new(
        store,
        site.clone(),
        site.clone(),
        Arc::new(LocalThemes::new(temp.path())),
        SiteConfig::default(),
    );
    let prompt = fixtures::prompt();
    service.set_prompt(&prompt).await.unwrap();

    service.generate(&prompt, false).await.unwrap();
    let all = service.variants().unwrap();
    finalizer.finalize(&all[0], &all, None).unwrap();

    backend.set_home_pages(serde_json::json!({
        "a": ["<p>NEW</p>"],
        "b": ["<p>Y</p>"],
        "c": ["<p>Z</p>"]
    }));
    service.generate(&prompt, false).await.unwrap();
    let active = service.variant("version1").unwrap();
    let all = service.variants().unwrap();
    let report = finalizer.finalize(&active, &all, None).unwrap();

    assert_eq!(report.reused_documents, 0);
    let front = site.front_page().unwrap().unwrap();
    assert_eq!(front, report.front_page);
    let document = site.document(&front).unwrap().unwrap();
    assert_eq!(document.content, active.content);
    assert!(document.content.contains("NEW"));
}
