use ai_docs_core::contract::{
    CachedArtifactRecord, FunctionSignature, IndexFunction, IndexView, SummaryFunction,
    SummaryView,
};
use ai_docs_core::store::DocsStore;
use std::fs;
use tempfile::tempdir;

fn record(version: &str) -> CachedArtifactRecord {
    CachedArtifactRecord {
        library_name: "@acme/utils".to_string(),
        cached_version: version.to_string(),
        summary: "Assorted helpers.".to_string(),
        functions: vec![
            FunctionSignature {
                name: "clamp".to_string(),
                params: vec!["n".into(), "lo".into(), "hi".into()],
                start: 0,
                end: 42,
                description: Some("Clamp n.".to_string()),
            },
            FunctionSignature {
                name: "noop".to_string(),
                params: vec![],
                start: 43,
                end: 60,
                description: None,
            },
        ],
        code_examples: vec![("clamp".to_string(), "clamp(5, 0, 3)".to_string())],
    }
}

#[test]
fn written_record_reads_back_as_equal_views() {
    let tmp = tempdir().unwrap();
    let store = DocsStore::new(tmp.path().join("docs"));
    store.write_record(&record("1.0.0")).expect("write should succeed");

    let summary = store.read_summary("@acme/utils").unwrap().expect("summary exists");
    assert_eq!(
        summary,
        SummaryView {
            name: "@acme/utils".into(),
            version: "1.0.0".into(),
            summary: "Assorted helpers.".into(),
            functions: vec![
                SummaryFunction {
                    name: "clamp".into(),
                    params: vec!["n".into(), "lo".into(), "hi".into()],
                    start: 0,
                    end: 42,
                },
                SummaryFunction {
                    name: "noop".into(),
                    params: vec![],
                    start: 43,
                    end: 60,
                },
            ],
        }
    );

    let index = store.read_index("@acme/utils").unwrap().expect("index exists");
    assert_eq!(
        index,
        IndexView {
            functions: vec![
                IndexFunction {
                    name: "clamp".into(),
                    params: vec!["n".into(), "lo".into(), "hi".into()],
                    description: Some("Clamp n.".into()),
                    code_example: Some("clamp(5, 0, 3)".into()),
                },
                IndexFunction {
                    name: "noop".into(),
                    params: vec![],
                    description: None,
                    code_example: None,
                },
            ],
        }
    );
}

#[test]
fn rewrite_replaces_whole_document_and_leaves_no_temp_files() {
    let tmp = tempdir().unwrap();
    let store = DocsStore::new(tmp.path());
    store.write_record(&record("1.0.0")).unwrap();

    let mut smaller = record("2.0.0");
    smaller.functions.truncate(1);
    smaller.code_examples.clear();
    store.write_record(&smaller).unwrap();

    let summary = store.read_summary("@acme/utils").unwrap().unwrap();
    assert_eq!(summary.version, "2.0.0");
    assert_eq!(summary.functions.len(), 1);
    let index = store.read_index("@acme/utils").unwrap().unwrap();
    assert_eq!(index.functions.len(), 1);
    assert_eq!(index.functions[0].code_example, None);

    let mut files: Vec<String> = fs::read_dir(tmp.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    files.sort();
    assert_eq!(files, vec!["@acme+utils_index.json", "@acme+utils_summary.json"]);
}

#[test]
fn missing_views_read_as_none_and_list_is_sorted() {
    let tmp = tempdir().unwrap();
    let store = DocsStore::new(tmp.path().join("not-created-yet"));
    assert!(store.read_summary("x").unwrap().is_none());
    assert!(store.read_index("x").unwrap().is_none());
    assert!(store.list_libraries().unwrap().is_empty());

    for name in ["zeta", "@scope/alpha", "mid"] {
        let mut rec = record("1");
        rec.library_name = name.to_string();
        store.write_record(&rec).unwrap();
    }
    assert_eq!(
        store.list_libraries().unwrap(),
        vec!["@scope/alpha", "mid", "zeta"]
    );
}

#[test]
fn summary_json_uses_documented_field_names() {
    let tmp = tempdir().unwrap();
    let store = DocsStore::new(tmp.path());
    store.write_record(&record("1.0.0")).unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(store.summary_path("@acme/utils")).unwrap())
            .unwrap();
    assert_eq!(raw["name"], "@acme/utils");
    assert_eq!(raw["functions"][0]["params"][1], "lo");
    assert_eq!(raw["functions"][0]["end"], 42);

    let raw: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(store.index_path("@acme/utils")).unwrap())
            .unwrap();
    assert_eq!(raw["functions"][0]["codeExample"], "clamp(5, 0, 3)");
}
