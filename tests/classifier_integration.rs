use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use rstest::rstest;
use tempfile::TempDir;

use uas_classifier::{
    Classifier, ClassifierError, ClassifierResult, ResultFields, TableOrigin,
    config::Config,
    signatures::{SignatureCompiler, SignatureTable},
    sources::{SignatureSource, StaticSignatureSource},
    storage::{FileTableStore, MemoryTableStore, TableStore},
};

const SAMPLE_DB: &str = include_str!("fixtures/uas_sample.ini");

const PROBES: &[&str] = &[
    "Mozilla/5.0 compatible; Googlebot/2.1",
    "Mozilla/5.0 (compatible; bingbot/2.0; +http://www.bing.com/bingbot.htm)",
    "Mozilla/5.0 (Windows NT 6.1; WOW64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    "Mozilla/5.0 (Linux; U; Android 4.0.3; en-us) AppleWebKit/534.30 (KHTML, like Gecko) Version/4.0 Mobile Safari/534.30",
    "mozilla/5.0 (x11; LINUX x86_64) firefox/89.0",
    "Wget/1.21",
    "totally unknown agent",
];

/// Source whose text can be replaced between refreshes
struct SwappableSource {
    text: Mutex<Option<String>>,
    fetches: AtomicUsize,
}

impl SwappableSource {
    fn new(text: Option<&str>) -> Self {
        Self {
            text: Mutex::new(text.map(str::to_string)),
            fetches: AtomicUsize::new(0),
        }
    }

    fn set(&self, text: Option<&str>) {
        *self.text.lock().unwrap() = text.map(str::to_string);
    }

    fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SignatureSource for SwappableSource {
    async fn fetch(&self) -> ClassifierResult<String> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.text
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| ClassifierError::fetch("swappable", "offline"))
    }

    fn describe(&self) -> String {
        "swappable".to_string()
    }
}

fn compiled_sample() -> SignatureTable {
    SignatureCompiler::new(Config::default().source.info_url)
        .compile(SAMPLE_DB)
        .unwrap()
}

fn sample_classifier() -> Classifier {
    Classifier::from_table(
        compiled_sample(),
        &Config::default(),
        Arc::new(StaticSignatureSource::unavailable()),
        Arc::new(MemoryTableStore::new()),
    )
    .unwrap()
}

fn classify_probes(classifier: &Classifier) -> Vec<ResultFields> {
    PROBES
        .iter()
        .map(|probe| classifier.classify(probe).unwrap())
        .collect()
}

#[rstest]
#[case::googlebot(PROBES[0], "Robot", "Googlebot", "Googlebot/2.1", "unknown")]
#[case::bingbot_with_os(PROBES[1], "Robot", "bingbot", "bingbot/2.0", "Windows 7")]
#[case::chrome_on_windows_7(PROBES[2], "Browser", "Chrome", "Chrome 91.0.4472.124", "Windows 7")]
#[case::android_webkit(PROBES[3], "Mobile Browser", "Android Webkit", "unknown", "Android")]
#[case::case_insensitive(PROBES[4], "Browser", "Firefox", "Firefox 89.0", "Linux")]
#[case::no_capture_group(PROBES[5], "Offline Browser", "Wget", "unknown", "unknown")]
fn classifies_sample_probes(
    #[case] user_agent: &str,
    #[case] typ: &str,
    #[case] ua_family: &str,
    #[case] ua_name: &str,
    #[case] os_name: &str,
) {
    let result = sample_classifier().classify(user_agent).unwrap();

    assert_eq!(result.typ, typ);
    assert_eq!(result.ua_family, ua_family);
    assert_eq!(result.ua_name, ua_name);
    assert_eq!(result.os_name, os_name);
}

#[test]
fn wrapped_table_is_provided() {
    assert_eq!(sample_classifier().origin(), TableOrigin::Provided);
}

#[test]
fn unmatched_input_is_exactly_default() {
    let result = sample_classifier().classify("totally unknown agent").unwrap();
    assert_eq!(result, ResultFields::default());
}

#[test]
fn robot_exact_match_beats_patterns() {
    let classifier = sample_classifier();

    let robot = classifier
        .classify("Mozilla/5.0 (X11; Linux x86_64; ExactBot/1.0) Chrome/91.0")
        .unwrap();
    assert_eq!(robot.typ, "Robot");
    assert_eq!(robot.ua_family, "ExactBot");
    assert_eq!(robot.os_family, "unknown");

    let near_miss = classifier
        .classify("Mozilla/5.0 (X11; Linux x86_64; ExactBot/1.0) Chrome/91.0 ")
        .unwrap();
    assert_eq!(near_miss.typ, "Browser");
    assert_eq!(near_miss.ua_name, "Chrome 91.0");
    assert_eq!(near_miss.os_family, "Linux");
}

#[test]
fn info_urls_are_prefixed_once() {
    let result = sample_classifier().classify(PROBES[0]).unwrap();
    assert_eq!(
        result.ua_info_url,
        "http://user-agent-string.info/list-of-ua/bot-detail?bot=Googlebot"
    );
}

#[test]
fn empty_input_is_invalid() {
    assert!(matches!(
        sample_classifier().classify(""),
        Err(ClassifierError::InvalidInput { .. })
    ));
}

#[test]
fn repeat_classification_served_from_cache() {
    let classifier = sample_classifier();

    let first = classifier.classify(PROBES[2]).unwrap();
    let second = classifier.classify(PROBES[2]).unwrap();

    assert_eq!(first, second);
    let stats = classifier.cache_stats();
    assert_eq!(stats.lookups, 2);
    assert_eq!(stats.hits, 1);
}

#[tokio::test]
async fn load_fetches_and_persists_when_store_is_empty() {
    let source = Arc::new(SwappableSource::new(Some(SAMPLE_DB)));
    let store = Arc::new(MemoryTableStore::new());

    let classifier = Classifier::load(&Config::default(), source.clone(), store.clone())
        .await
        .unwrap();

    assert_eq!(source.fetches(), 1);
    assert_eq!(classifier.origin(), TableOrigin::Fetched);
    assert!(store.exists().await.unwrap());
    assert_eq!(classifier.classify(PROBES[0]).unwrap().typ, "Robot");
}

#[tokio::test]
async fn persisted_table_round_trips_through_file_store() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = Config::default();
    config.storage.cache_dir = temp_dir.path().join("cache");

    let first_store = Arc::new(FileTableStore::from_config(&config.storage).await.unwrap());
    let online = Arc::new(SwappableSource::new(Some(SAMPLE_DB)));
    let original = Classifier::load(&config, online, first_store).await.unwrap();

    let second_store = Arc::new(FileTableStore::from_config(&config.storage).await.unwrap());
    let offline = Arc::new(SwappableSource::new(None));
    let reloaded = Classifier::load(&config, offline.clone(), second_store)
        .await
        .unwrap();

    assert_eq!(offline.fetches(), 0, "persisted table should bypass fetching");
    assert_eq!(reloaded.origin(), TableOrigin::Persisted);
    assert_eq!(classify_probes(&original), classify_probes(&reloaded));
}

#[tokio::test]
async fn corrupt_persisted_table_falls_back_to_refresh() {
    let source = Arc::new(SwappableSource::new(Some(SAMPLE_DB)));
    let store = Arc::new(MemoryTableStore::with_blob(b"{\"not\": \"a table\"}".to_vec()));

    let classifier = Classifier::load(&Config::default(), source.clone(), store)
        .await
        .unwrap();

    assert_eq!(source.fetches(), 1);
    assert_eq!(classifier.classify(PROBES[5]).unwrap().ua_family, "Wget");
}

#[tokio::test]
async fn load_without_any_table_fails() {
    let result = Classifier::load(
        &Config::default(),
        Arc::new(StaticSignatureSource::unavailable()),
        Arc::new(MemoryTableStore::new()),
    )
    .await;

    let err = result.err().expect("load should fail");
    assert!(matches!(err, ClassifierError::RefreshFailed { .. }));
}

#[tokio::test]
async fn refresh_swaps_table_and_clears_cache() {
    let source = Arc::new(SwappableSource::new(Some(SAMPLE_DB)));
    let classifier = Classifier::load(
        &Config::default(),
        source.clone(),
        Arc::new(MemoryTableStore::new()),
    )
    .await
    .unwrap();
    assert_eq!(classifier.classify(PROBES[5]).unwrap().ua_family, "Wget");

    source.set(Some(SAMPLE_DB.replace("4[] = \"Wget\"", "4[] = \"GNU Wget\"").as_str()));
    classifier.refresh().await.unwrap();

    assert!(classifier.cache().is_empty());
    assert_eq!(classifier.classify(PROBES[5]).unwrap().ua_family, "GNU Wget");
    assert_eq!(classifier.origin(), TableOrigin::Fetched);
    assert_eq!(source.fetches(), 2);
}

#[tokio::test]
async fn malformed_refresh_keeps_previous_table() {
    let source = Arc::new(SwappableSource::new(Some(SAMPLE_DB)));
    let classifier = Classifier::load(
        &Config::default(),
        source.clone(),
        Arc::new(MemoryTableStore::new()),
    )
    .await
    .unwrap();
    let before = classify_probes(&classifier);

    source.set(Some("[robots]\n1[] = \"only robots\"\n"));
    let err = classifier.refresh().await.unwrap_err();

    assert!(matches!(
        err.refresh_cause(),
        Some(ClassifierError::MalformedDatabase { .. })
    ));
    assert_eq!(classify_probes(&classifier), before);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn classification_continues_during_refresh() {
    let source = Arc::new(SwappableSource::new(Some(SAMPLE_DB)));
    let classifier = Arc::new(
        Classifier::load(
            &Config::default(),
            source.clone(),
            Arc::new(MemoryTableStore::new()),
        )
        .await
        .unwrap(),
    );

    let mut workers = Vec::new();
    for worker in 0..4 {
        let classifier = classifier.clone();
        workers.push(tokio::spawn(async move {
            for round in 0..200 {
                let probe = PROBES[(worker + round) % PROBES.len()];
                let result = classifier.classify(probe).unwrap();
                // every result comes from one complete table
                assert!(result.typ == "Robot" || result.typ.contains("Browser") || result.typ == "unknown");
                tokio::task::yield_now().await;
            }
        }));
    }

    for _ in 0..5 {
        classifier.refresh().await.unwrap();
    }
    for worker in workers {
        worker.await.unwrap();
    }

    assert_eq!(source.fetches(), 6);
}
