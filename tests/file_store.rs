// Tests for FileStore against a StandardContext rooted in a temp directory.
use handykit::context::{AppContext, Directory, SharedContext, StandardContext, TestContext};
use handykit::storage::{FileLocation, FileStore};
use serde_json::{Map, Value, json};
use std::sync::{Arc, Barrier};
use std::thread;

fn object(v: Value) -> Map<String, Value> {
    v.as_object().cloned().unwrap()
}

#[test]
fn test_documents_workflow() {
    let tmp = TestContext::new();
    let ctx = StandardContext::new(Some(tmp.root.clone()));
    let store = FileStore::new(&ctx);

    store.create_folder(Directory::Documents, "notes").unwrap();
    assert!(store.create_folder(Directory::Documents, "notes").is_err());

    let loc = FileLocation::new(Directory::Documents, "todo", "json").in_folder("notes");
    let first = object(json!({"title": "groceries", "done": false}));
    let written = store.write_dictionary(&first, &loc, true).unwrap();
    assert_eq!(written, tmp.root.join("documents").join("notes").join("todo.json"));

    // Keep the original, write a sibling copy
    let second = object(json!({"title": "laundry", "done": true}));
    let copy = store.write_dictionary(&second, &loc, false).unwrap();
    assert!(copy.ends_with("todo copy.json"));

    assert_eq!(
        store.list_files(Directory::Documents, Some("notes")).unwrap(),
        vec!["todo copy.json".to_string(), "todo.json".to_string()]
    );
    assert_eq!(store.read_dictionary(&loc).unwrap(), Some(first.clone()));

    let all = store
        .read_all_dictionaries(Directory::Documents, Some("notes"))
        .unwrap();
    assert_eq!(all.len(), 2);
    assert!(all.contains(&first) && all.contains(&second));

    let archived = store
        .move_file(&loc, Directory::Library, Some("archive"))
        .unwrap();
    assert!(archived.exists());
    assert_eq!(store.read_dictionary(&loc).unwrap(), None);

    store
        .delete_all_files_in_directory(Directory::Documents, "notes")
        .unwrap();
    assert!(store
        .list_files(Directory::Documents, Some("notes"))
        .unwrap()
        .is_empty());

    store.delete_directory(Directory::Documents, "notes").unwrap();
    assert!(store.delete_directory(Directory::Documents, "notes").is_err());
}

#[test]
fn test_bundle_resources_are_readable_not_writable() {
    let tmp = TestContext::new();
    let resources = tmp.root.join("resources");
    std::fs::create_dir_all(&resources).unwrap();
    std::fs::write(resources.join("defaults.json"), r#"{"volume": 7}"#).unwrap();

    let ctx = StandardContext::new(Some(tmp.root.clone())).with_bundle_dir(Some(resources.clone()));
    let store = FileStore::new(&ctx);
    let loc = FileLocation::new(Directory::Bundle, "defaults", "json");

    assert_eq!(store.read_json(&loc).unwrap(), Some(json!({"volume": 7})));
    assert!(store.write_string("{}", &loc, true).is_err());
    assert_eq!(
        store.read_string(&loc).unwrap().as_deref(),
        Some(r#"{"volume": 7}"#)
    );
    assert!(!resources.join(".defaults.json.lock").exists());

    assert!(store.delete_file(&loc).is_err());
    assert!(store.move_file(&loc, Directory::Cache, None).is_err());
    assert!(resources.join("defaults.json").is_file());
}

#[test]
fn test_escaping_paths_are_refused() {
    let tmp = TestContext::new();
    let store = FileStore::new(&tmp);

    let outside = FileLocation::new(Directory::Cache, "passwd", "").in_folder("../../etc");
    assert!(store.read_string(&outside).is_err());
    assert!(store.write_string("x", &outside, true).is_err());
    assert!(store.list_files(Directory::Cache, Some("/etc")).is_err());
}

#[test]
fn test_concurrent_writers_leave_valid_json() {
    let tmp = TestContext::new();
    let ctx: SharedContext = Arc::new(StandardContext::new(Some(tmp.root.clone())));
    ctx.directory_path(Directory::Library).unwrap();

    let thread_count = 8;
    let barrier = Arc::new(Barrier::new(thread_count));
    let mut handles = vec![];

    for i in 0..thread_count {
        let b = barrier.clone();
        let ctx = ctx.clone();
        handles.push(thread::spawn(move || {
            let store = FileStore::new(ctx.as_ref());
            let loc = FileLocation::new(Directory::Library, "shared", "json");
            let payload = object(json!({"writer": i, "padding": "x".repeat(4096)}));
            b.wait();
            store
                .write_dictionary(&payload, &loc, true)
                .expect("write failed");
        }));
    }

    for h in handles {
        h.join().unwrap();
    }

    let store = FileStore::new(ctx.as_ref());
    let loc = FileLocation::new(Directory::Library, "shared", "json");
    let result = store.read_dictionary(&loc).unwrap().unwrap();
    let writer = result["writer"].as_u64().unwrap();
    assert!(writer < thread_count as u64);

    // No lock or temp files show up in listings
    assert_eq!(
        store.list_files(Directory::Library, None).unwrap(),
        vec!["shared.json".to_string()]
    );
}
