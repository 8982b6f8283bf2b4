//! End-to-end behaviour of the record stores over real files.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Barrier};
use std::thread;

use flatstore_core::{
    App, Catalog, CatalogPaths, FlatError, MatchAll, PageRequest, Price, RecordStore, Review,
    ReviewFilter,
};
use tempfile::{TempDir, tempdir};

const APP_HEADER: &str = "App,Category,Rating,Reviews,Size,Installs,Type,Price,Content Rating,Genres,Last Updated,Current Ver,Android Ver\n";
const REVIEW_HEADER: &str =
    "App,Translated_Review,Sentiment,Sentiment_Polarity,Sentiment_Subjectivity\n";

fn app_line(name: &str, price: &str) -> String {
    format!(
        "{name},TOOLS,4.0,\"1,000\",5M,\"50,000+\",Paid,{price},Everyone,Tools,\"March 3, 2018\",1.0,4.0 and up\n"
    )
}

fn write_apps(path: &Path, lines: &[String]) {
    let mut text = APP_HEADER.to_owned();
    for line in lines {
        text.push_str(line);
    }
    fs::write(path, text).expect("write apps");
}

fn write_reviews(path: &Path, count: usize) {
    let mut text = REVIEW_HEADER.to_owned();
    for i in 0..count {
        let polarity = f64::from(u32::try_from(i % 21).expect("small")) / 10.0 - 1.0;
        writeln!(text, "App {},review {i},Positive,{polarity},0.5", i % 7).expect("fmt");
    }
    fs::write(path, text).expect("write reviews");
}

fn catalog_with(apps: &[String], reviews: usize) -> (TempDir, Catalog, CatalogPaths) {
    let dir = tempdir().expect("tempdir");
    let paths = CatalogPaths {
        app_file: dir.path().join("googleplaystore.csv"),
        review_file: dir.path().join("googleplaystore_user_reviews.csv"),
    };
    write_apps(&paths.app_file, apps);
    write_reviews(&paths.review_file, reviews);
    (dir, Catalog::open(paths.clone()), paths)
}

fn fresh_apps(path: &Path) -> Vec<App> {
    RecordStore::<App>::new(path).snapshot().expect("fresh load")
}

#[test]
fn added_review_is_returned_exactly_once() {
    let (_dir, catalog, _paths) = catalog_with(&[], 10);
    let review = Review {
        app: "Brand New".to_owned(),
        translated_review: "Love it, truly".to_owned(),
        sentiment: "Positive".to_owned(),
        sentiment_polarity: 0.9,
        sentiment_subjectivity: 0.6,
    };
    catalog.add_review(review.clone()).expect("add");

    let found = catalog
        .list_reviews(Some("brand new"), Some("Positive"), 0.9, 0.9)
        .expect("list");
    assert_eq!(found, vec![review]);
}

#[test]
fn added_app_is_listed_exactly_once() {
    let lines = vec![app_line("Alpha", "0"), app_line("Beta", "$2.50")];
    let (_dir, catalog, paths) = catalog_with(&lines, 0);
    let app = App {
        name: "Gamma".to_owned(),
        category: "GAME".to_owned(),
        rating: Some(3.9),
        reviews: 12,
        installs: "1000+".to_owned(),
        app_type: "Paid".to_owned(),
        price: Price::from_cents(250),
        ..App::default()
    };
    catalog.add_app(app.clone()).expect("add");

    let names = catalog.list_apps(30, 1, "2.5").expect("list");
    assert_eq!(names, ["Beta", "Gamma"]);
    let on_disk = fresh_apps(&paths.app_file);
    assert_eq!(on_disk.iter().filter(|a| a.name == "Gamma").count(), 1);
    assert_eq!(on_disk.last(), Some(&app));
}

#[test]
fn added_app_is_cached_as_a_reload_would_see_it() {
    let (_dir, catalog, paths) = catalog_with(&[app_line("Alpha", "0")], 0);
    let app = App {
        name: "Counted".to_owned(),
        category: "TOOLS".to_owned(),
        reviews: 3,
        installs: "1,000+".to_owned(),
        price: Price::from_cents(99),
        ..App::default()
    };
    catalog.add_app(app).expect("add");

    let cached = catalog.query_apps(10, 1, "").expect("query");
    assert_eq!(cached, fresh_apps(&paths.app_file));
    assert_eq!(cached.last().map(|a| a.installs.as_str()), Some("1000+"));
}

#[test]
fn deleted_app_is_gone_from_cache_and_file() {
    let lines = vec![
        app_line("Keep", "0"),
        app_line("Drop Me", "1.00"),
        app_line("Also Keep", "0"),
    ];
    let (_dir, catalog, paths) = catalog_with(&lines, 0);
    assert_eq!(catalog.list_apps(30, 1, "").expect("warm").len(), 3);

    assert_eq!(catalog.delete_app("  drop me ").expect("delete"), 1);
    assert_eq!(
        catalog.list_apps(30, 1, "").expect("list"),
        ["Keep", "Also Keep"]
    );
    let on_disk = fresh_apps(&paths.app_file);
    assert!(on_disk.iter().all(|a| a.name != "Drop Me"));
    assert_eq!(on_disk.len(), 2);

    let err = catalog.delete_app("Drop Me").unwrap_err();
    assert!(matches!(err, FlatError::NotFound { .. }), "{err}");
}

#[test]
fn pagination_boundary_over_twenty_five_matches() {
    let lines: Vec<String> = (1..=25).map(|i| app_line(&format!("App {i:02}"), "0")).collect();
    let (_dir, catalog, _paths) = catalog_with(&lines, 0);

    let page3 = catalog.list_apps(10, 3, "").expect("page 3");
    let expected: Vec<String> = (21..=25).map(|i| format!("App {i:02}")).collect();
    assert_eq!(page3, expected);
    assert!(catalog.list_apps(10, 4, "").expect("page 4").is_empty());
}

#[test]
fn price_filter_compares_numerically() {
    let lines = vec![
        app_line("Exact", "4.99"),
        app_line("Dollar", "$4.99"),
        app_line("Five", "5.00"),
        app_line("Free", "0"),
    ];
    let (_dir, catalog, _paths) = catalog_with(&lines, 0);

    assert_eq!(
        catalog.list_apps(30, 1, "4.99").expect("list"),
        ["Exact", "Dollar"]
    );
    assert_eq!(catalog.list_apps(30, 1, "5.0").expect("list"), ["Five"]);
    assert_eq!(catalog.list_apps(30, 1, "0").expect("list"), ["Free"]);
    assert!(catalog.list_apps(30, 1, "7").expect("list").is_empty());
}

#[test]
fn sub_cent_price_filter_is_refused() {
    let lines = vec![app_line("Exact", "4.99"), app_line("Five", "5.00")];
    let (_dir, catalog, _paths) = catalog_with(&lines, 0);

    let err = catalog.list_apps(30, 1, "4.994").unwrap_err();
    assert!(matches!(err, FlatError::InvalidArgument { .. }), "{err}");
    assert_eq!(catalog.list_apps(30, 1, "4.990").expect("list"), ["Exact"]);
}

#[test]
fn one_malformed_row_among_a_hundred_leaves_ninety_nine() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("reviews.csv");
    let mut text = REVIEW_HEADER.to_owned();
    for i in 0..100 {
        if i == 42 {
            text.push_str("Broken,stray \"quote,Positive,0.1,0.1\n");
            continue;
        }
        writeln!(text, "App {i},fine,Positive,0.1,0.1").expect("fmt");
    }
    fs::write(&path, text).expect("write");

    let store = RecordStore::<Review>::new(&path);
    let loaded = store.snapshot().expect("load");
    assert_eq!(loaded.len(), 99);
    assert!(loaded.iter().all(|r| r.app != "Broken"));
    let stats = store.last_load_stats().expect("stats");
    assert_eq!(stats.malformed_rows, 1);
    assert_eq!(stats.skipped(), 1);
}

#[test]
fn unclosed_quote_among_a_hundred_leaves_ninety_nine() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("reviews.csv");
    let mut text = REVIEW_HEADER.to_owned();
    for i in 0..100 {
        if i == 42 {
            text.push_str("Broken,\"never closed,Positive,0.1,0.1\n");
            continue;
        }
        writeln!(text, "App {i},fine,Positive,0.1,0.1").expect("fmt");
    }
    fs::write(&path, text).expect("write");

    let store = RecordStore::<Review>::new(&path);
    let loaded = store.snapshot().expect("load");
    assert_eq!(loaded.len(), 99);
    assert_eq!(loaded.last().map(|r| r.app.as_str()), Some("App 99"));
    let stats = store.last_load_stats().expect("stats");
    assert_eq!(stats.malformed_rows, 1);
    assert_eq!(stats.skipped(), 1);
}

#[test]
fn one_short_row_among_a_hundred_leaves_ninety_nine() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("reviews.csv");
    let mut text = REVIEW_HEADER.to_owned();
    for i in 0..100 {
        if i == 57 {
            text.push_str("Short,row\n");
            continue;
        }
        writeln!(text, "App {i},fine,Positive,0.1,0.1").expect("fmt");
    }
    fs::write(&path, text).expect("write");

    let store = RecordStore::<Review>::new(&path);
    assert_eq!(store.snapshot().expect("load").len(), 99);
    let stats = store.last_load_stats().expect("stats");
    assert_eq!(stats.column_mismatch, 1);
    assert_eq!(stats.skipped(), 1);
}

#[test]
fn concurrent_queries_against_a_warm_store() {
    let (_dir, catalog, _paths) = catalog_with(&[], 500);
    let catalog = Arc::new(catalog);
    let baseline = catalog.list_reviews(Some("App 3"), None, -0.5, 0.5).expect("baseline");
    assert!(!baseline.is_empty());

    let n_threads = 100;
    let barrier = Arc::new(Barrier::new(n_threads));
    let handles: Vec<_> = (0..n_threads)
        .map(|_| {
            let catalog = Arc::clone(&catalog);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                catalog
                    .list_reviews(Some("App 3"), None, -0.5, 0.5)
                    .expect("query")
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().expect("thread"), baseline);
    }
    assert_eq!(catalog.reviews().load_count(), 1);
}

#[test]
fn concurrent_first_access_reads_the_file_once() {
    let (_dir, catalog, _paths) = catalog_with(&[], 200);
    let catalog = Arc::new(catalog);
    let n_threads = 32;
    let barrier = Arc::new(Barrier::new(n_threads));
    let handles: Vec<_> = (0..n_threads)
        .map(|_| {
            let catalog = Arc::clone(&catalog);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                catalog.reviews().count(&MatchAll).expect("count")
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().expect("thread"), 200);
    }
    assert_eq!(catalog.reviews().load_count(), 1);
}

#[test]
fn writers_and_readers_interleave_safely() {
    let (_dir, catalog, paths) = catalog_with(&[], 20);
    let catalog = Arc::new(catalog);
    let barrier = Arc::new(Barrier::new(8));

    let mut handles = Vec::new();
    for writer in 0..4 {
        let catalog = Arc::clone(&catalog);
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            for n in 0..10 {
                catalog
                    .add_review(Review {
                        app: format!("Writer {writer}"),
                        translated_review: format!("entry {n}"),
                        sentiment: "Neutral".to_owned(),
                        sentiment_polarity: 0.0,
                        sentiment_subjectivity: 0.0,
                    })
                    .expect("add");
            }
        }));
    }
    for _ in 0..4 {
        let catalog = Arc::clone(&catalog);
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            for _ in 0..10 {
                let all = catalog.list_reviews(None, None, -1.0, 1.0).expect("list");
                assert!(all.len() >= 20 && all.len() <= 60, "{}", all.len());
            }
        }));
    }
    for handle in handles {
        handle.join().expect("thread");
    }

    let on_disk = RecordStore::<Review>::new(&paths.review_file)
        .snapshot()
        .expect("fresh");
    assert_eq!(on_disk.len(), 60);
    assert_eq!(catalog.reviews().snapshot().expect("cache"), on_disk);
}

#[test]
fn rejected_mutations_leave_the_file_untouched() {
    let lines = vec![app_line("Only", "0")];
    let (_dir, catalog, paths) = catalog_with(&lines, 3);
    let apps_before = fs::read(&paths.app_file).expect("read");
    let reviews_before = fs::read(&paths.review_file).expect("read");

    let bad_rating = App {
        name: "Bad".to_owned(),
        rating: Some(7.0),
        ..App::default()
    };
    assert!(matches!(
        catalog.add_app(bad_rating),
        Err(FlatError::Validation { .. })
    ));
    assert!(matches!(
        catalog.add_app(App {
            name: "nan".to_owned(),
            ..App::default()
        }),
        Err(FlatError::Validation { .. })
    ));
    assert!(matches!(
        catalog.delete_reviews_by_app("Nobody"),
        Err(FlatError::NotFound { .. })
    ));

    assert_eq!(fs::read(&paths.app_file).expect("read"), apps_before);
    assert_eq!(fs::read(&paths.review_file).expect("read"), reviews_before);
}

#[test]
fn zero_matches_is_not_an_error() {
    let (_dir, catalog, _paths) = catalog_with(&[], 5);
    let filter = ReviewFilter::new(Some("Missing"), None, -1.0, 1.0).expect("filter");
    let page = PageRequest::new(10, 1).expect("page");
    assert!(catalog.reviews().query(&filter, Some(page)).expect("query").is_empty());
}
