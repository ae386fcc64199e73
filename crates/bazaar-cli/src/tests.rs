use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use bazaar_core::config::CatalogConfig;
use bazaar_core::{Error, NewProduct, Product, ProductId};

use crate::cli::CompletionShell;
use crate::commands::common::{
    format_product_lines, format_relative_time, list_products, normalize_product_identifier,
    normalize_search_query, resolve_product_id, search_products, truncate_chars, StoreSettings,
};
use crate::commands::completions::run_completions;
use crate::commands::delete::run_delete;
use crate::commands::publish::run_publish;
use crate::commands::sync::run_sync;
use crate::error::CliError;

fn product(id: &str, name: &str, seller: &str) -> Product {
    Product {
        id: ProductId::new(id),
        created_at: 0,
        name: name.to_string(),
        price: "12.5".to_string(),
        description: String::new(),
        seller_username: seller.to_string(),
        images: Vec::new(),
    }
}

fn draft(name: &str, seller: &str) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        price: "40".to_string(),
        description: format!("{name} in good condition"),
        seller_username: seller.to_string(),
        images: vec!["https://img.example.com/1.png".to_string()],
    }
}

#[test]
fn normalize_search_query_trims_and_rejects_empty() {
    assert_eq!(normalize_search_query("  lamp ").unwrap(), "lamp");
    assert!(matches!(
        normalize_search_query(" \t "),
        Err(CliError::EmptySearchQuery)
    ));
}

#[test]
fn normalize_product_identifier_rejects_blank() {
    assert_eq!(normalize_product_identifier(" abc ").unwrap(), "abc");
    assert!(matches!(
        normalize_product_identifier(""),
        Err(CliError::EmptyProductId)
    ));
}

#[test]
fn hints_only_for_unreachable_store() {
    let unreachable = CliError::Core(Error::Transport("connection refused".to_string()));
    assert!(unreachable.hint().is_some_and(|hint| hint.contains("--db-path")));

    let refused = CliError::Core(Error::NotFound("0190-aaaa".to_string()));
    assert_eq!(refused.hint(), None);
    assert_eq!(CliError::EmptySearchQuery.hint(), None);
}

#[test]
fn format_relative_time_buckets() {
    let now = 10 * 365 * 24 * 60 * 60 * 1000_i64;
    assert_eq!(format_relative_time(now - 5_000, now), "just now");
    assert_eq!(format_relative_time(now - 5 * 60_000, now), "5m ago");
    assert_eq!(format_relative_time(now - 3 * 3_600_000, now), "3h ago");
    assert_eq!(format_relative_time(now - 2 * 86_400_000, now), "2d ago");
    assert_eq!(format_relative_time(now - 400 * 86_400_000, now), "1y ago");
}

#[test]
fn truncate_chars_collapses_whitespace_and_adds_ellipsis() {
    assert_eq!(truncate_chars("Oak   desk", 32), "Oak desk");
    assert_eq!(truncate_chars("abcdefghij", 6), "abc...");
}

#[test]
fn resolve_product_id_prefers_exact_match() {
    let products = vec![product("abc", "A", "ana"), product("abcd", "B", "ana")];
    assert_eq!(resolve_product_id("abc", &products).unwrap().as_str(), "abc");
    assert_eq!(resolve_product_id("abcd", &products).unwrap().as_str(), "abcd");
}

#[test]
fn resolve_product_id_by_unique_prefix() {
    let products = vec![product("0190-aaaa", "A", "ana"), product("0190-bbbb", "B", "ana")];
    assert_eq!(
        resolve_product_id("0190-b", &products).unwrap().as_str(),
        "0190-bbbb"
    );
}

#[test]
fn resolve_product_id_reports_ambiguity_and_absence() {
    let products = vec![product("0190-aaaa", "A", "ana"), product("0190-bbbb", "B", "ana")];
    let error = resolve_product_id("0190", &products).unwrap_err();
    assert!(matches!(error, CliError::AmbiguousProductId(_)));
    assert!(error.to_string().contains("0190-aaaa"));

    assert!(matches!(
        resolve_product_id("zzz", &products),
        Err(CliError::ProductNotFound(_))
    ));
}

#[test]
fn format_product_lines_show_price_and_seller() {
    let lines = format_product_lines(&[product("0190-aaaa", "Road bike", "ana")]);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("0190-aaaa"));
    assert!(lines[0].contains("Road bike"));
    assert!(lines[0].contains("12.50"));
    assert!(lines[0].contains("@ana"));
}

#[test]
fn store_settings_prefer_cli_path_over_config() {
    let config = CatalogConfig {
        db_path: Some(PathBuf::from("/from/config.db")),
        ..Default::default()
    };

    let from_cli = StoreSettings::from_config(Some(PathBuf::from("/from/cli.db")), &config);
    assert_eq!(from_cli.db_path, PathBuf::from("/from/cli.db"));

    let from_config = StoreSettings::from_config(None, &config);
    assert_eq!(from_config.db_path, PathBuf::from("/from/config.db"));
    assert!(from_config.sync.is_none());
}

#[test]
fn store_settings_carry_sync_config() {
    let config = CatalogConfig {
        sync_url: Some("libsql://shop.turso.io".to_string()),
        sync_auth_token: Some("token".to_string()),
        ..Default::default()
    };
    let settings = StoreSettings::from_config(None, &config);
    assert!(settings.sync.is_some_and(|sync| sync.is_configured()));
}

#[cfg_attr(windows, ignore = "libsql integration is flaky on windows CI")]
#[tokio::test(flavor = "current_thread")]
async fn published_listings_are_listed_newest_first() {
    let db_path = unique_test_db_path();
    let settings = StoreSettings::local(db_path.clone());

    let lamp = run_publish(draft("Desk lamp", "ana"), &settings).await.unwrap();
    let bike = run_publish(draft("Road bike", "bob"), &settings).await.unwrap();

    let all = list_products(10, None, &settings).await.unwrap();
    let ids = all.iter().map(|product| product.id.clone()).collect::<Vec<_>>();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&lamp.id));
    assert!(ids.contains(&bike.id));

    let limited = list_products(1, None, &settings).await.unwrap();
    assert_eq!(limited.len(), 1);

    let from_bob = list_products(10, Some(" bob "), &settings).await.unwrap();
    assert_eq!(from_bob.len(), 1);
    assert_eq!(from_bob[0].id, bike.id);
    assert_eq!(from_bob[0].images, vec!["https://img.example.com/1.png"]);

    cleanup_db_files(&db_path);
}

#[cfg_attr(windows, ignore = "libsql integration is flaky on windows CI")]
#[tokio::test(flavor = "current_thread")]
async fn search_matches_descriptions() {
    let db_path = unique_test_db_path();
    let settings = StoreSettings::local(db_path.clone());

    run_publish(draft("Desk lamp", "ana"), &settings).await.unwrap();
    run_publish(draft("Road bike", "bob"), &settings).await.unwrap();

    let hits = search_products("BIKE IN GOOD", 10, &settings).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "Road bike");

    cleanup_db_files(&db_path);
}

#[cfg_attr(windows, ignore = "libsql integration is flaky on windows CI")]
#[tokio::test(flavor = "current_thread")]
async fn run_publish_rejects_too_many_images() {
    let db_path = unique_test_db_path();
    let settings = StoreSettings::local(db_path.clone());

    let mut crowded = draft("Tent", "ana");
    crowded.images = (0..4).map(|index| format!("img-{index}")).collect();
    let error = run_publish(crowded, &settings).await.unwrap_err();
    assert!(matches!(error, CliError::Core(Error::InvalidInput(_))));
    assert!(list_products(10, None, &settings).await.unwrap().is_empty());

    cleanup_db_files(&db_path);
}

#[cfg_attr(windows, ignore = "libsql integration is flaky on windows CI")]
#[tokio::test(flavor = "current_thread")]
async fn run_delete_removes_listing_by_prefix() {
    let db_path = unique_test_db_path();
    let settings = StoreSettings::local(db_path.clone());

    let record = run_publish(draft("Desk lamp", "ana"), &settings).await.unwrap();
    let prefix = record.id.as_str().chars().take(13).collect::<String>();

    let deleted = run_delete(&prefix, &settings).await.unwrap();
    assert_eq!(deleted, record.id);
    assert!(list_products(10, None, &settings).await.unwrap().is_empty());

    cleanup_db_files(&db_path);
}

#[cfg_attr(windows, ignore = "libsql integration is flaky on windows CI")]
#[tokio::test(flavor = "current_thread")]
async fn run_delete_unknown_id_is_not_found() {
    let db_path = unique_test_db_path();
    let settings = StoreSettings::local(db_path.clone());

    let error = run_delete("does-not-exist", &settings).await.unwrap_err();
    assert!(matches!(error, CliError::ProductNotFound(_)));

    cleanup_db_files(&db_path);
}

#[cfg_attr(windows, ignore = "libsql integration is flaky on windows CI")]
#[tokio::test(flavor = "current_thread")]
async fn run_sync_requires_sync_configuration() {
    let db_path = unique_test_db_path();

    let error = run_sync(&StoreSettings::local(db_path.clone()))
        .await
        .unwrap_err();
    assert!(matches!(error, CliError::SyncNotConfigured));

    cleanup_db_files(&db_path);
}

#[test]
fn run_completions_writes_bash_script_file() {
    let output_path = std::env::temp_dir().join(format!(
        "bazaar-completions-test-{}.bash",
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |duration| duration.as_nanos())
    ));

    run_completions(CompletionShell::Bash, Some(&output_path)).unwrap();

    let script = std::fs::read_to_string(&output_path).unwrap();
    assert!(script.contains("_bazaar()"));
    assert!(script.contains("complete -F _bazaar"));

    let _ = std::fs::remove_file(output_path);
}

fn unique_test_db_path() -> PathBuf {
    static NEXT_TEST_DB_ID: AtomicU64 = AtomicU64::new(0);

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_nanos());
    let sequence = NEXT_TEST_DB_ID.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!("bazaar-cli-test-{timestamp}-{sequence}.db"))
}

fn cleanup_db_files(path: &PathBuf) {
    // On Windows, libsql can keep file handles alive briefly after drop.
    if cfg!(windows) {
        return;
    }

    let _ = std::fs::remove_file(path);
    let _ = std::fs::remove_file(path.with_extension("db-shm"));
    let _ = std::fs::remove_file(path.with_extension("db-wal"));
}
