/// End-to-end decoding tests
///
/// Every test drives the public `StatusFeed` API with raw bytes, the way a
/// transport would.
use serde_json::Value;
use status_core::{BackupFlags, ClientStatus, DecodeError, Registry, Selection, StatusFeed};

fn snapshot(clients: &[(&str, &str, Vec<(u64, &str)>)]) -> String {
    let clients: Vec<String> = clients
        .iter()
        .map(|(name, status, backups)| {
            let backups: Vec<String> = backups
                .iter()
                .map(|(number, flags)| {
                    let mut fields = vec![format!("\"number\":{}", number), "\"timestamp\":1600000000".to_string()];
                    for flag in flags.split(',').filter(|f| !f.is_empty()) {
                        fields.push(format!("\"{}\":1", flag));
                    }
                    format!("{{{}}}", fields.join(","))
                })
                .collect();
            format!(
                "{{\"name\":\"{}\",\"status\":\"{}\",\"backups\":[{}]}}",
                name,
                status,
                backups.join(",")
            )
        })
        .collect();
    format!("{{\"clients\":[{}]}}", clients.join(","))
}

fn decode(chunks: &[&[u8]]) -> (Registry, StatusFeed) {
    let mut feed = StatusFeed::new();
    let mut registry = Registry::new();
    let mut selection = Selection::new();
    for chunk in chunks {
        feed.feed(chunk, &mut registry, &mut selection).expect("decode failed");
    }
    (registry, feed)
}

fn dump(registry: &Registry) -> Value {
    serde_json::to_value(registry).unwrap()
}

#[test]
fn test_split_anywhere_matches_whole() {
    let doc = snapshot(&[
        ("alpha", "idle", vec![(3, "current,manifest"), (2, "hardlinked"), (1, "deletable")]),
        ("bravo", "running", vec![(7, "working")]),
        ("charlie", "client crashed", vec![]),
    ]);
    let bytes = doc.as_bytes();
    let (whole, _) = decode(&[bytes]);

    for split in 0..=bytes.len() {
        let (left, right) = bytes.split_at(split);
        let (registry, feed) = decode(&[left, right]);
        assert_eq!(dump(&registry), dump(&whole), "split at {}", split);
        assert_eq!(feed.snapshots(), 1);
    }

    let pieces: Vec<&[u8]> = bytes.chunks(3).collect();
    let (registry, _) = decode(&pieces);
    assert_eq!(dump(&registry), dump(&whole));
}

#[test]
fn test_many_snapshots_in_one_chunk() {
    let first = snapshot(&[("alpha", "idle", vec![(2, ""), (1, "")])]);
    let second = snapshot(&[("alpha", "running", vec![(3, "working"), (2, "")])]);
    let joined = format!("{}\n{}\n", first, second);

    let (registry, feed) = decode(&[joined.as_bytes()]);

    assert_eq!(feed.snapshots(), 2);
    let alpha = registry.by_name("alpha").unwrap();
    assert_eq!(alpha.status, ClientStatus::Running);
    assert_eq!(alpha.backups().numbers(), vec![3, 2]);
}

#[test]
fn test_snapshot_boundary_inside_chunk() {
    let first = snapshot(&[("alpha", "idle", vec![(1, "")])]);
    let second = snapshot(&[("bravo", "idle", vec![(5, "")])]);
    let joined = format!("{}{}", first, second);
    let (a, b) = joined.as_bytes().split_at(first.len() + 10);

    let (registry, feed) = decode(&[a, b]);
    assert_eq!(feed.snapshots(), 2);
    assert_eq!(registry.len(), 2);
}

#[test]
fn test_identity_and_selection_across_snapshots() {
    let mut feed = StatusFeed::new();
    let mut registry = Registry::new();
    let mut selection = Selection::new();

    let first = snapshot(&[("alpha", "idle", vec![(9, ""), (8, ""), (7, "")])]);
    feed.feed(first.as_bytes(), &mut registry, &mut selection).unwrap();

    let alpha = registry.by_name("alpha").unwrap();
    let nine = alpha.backups().find_number(9).unwrap().id();
    let eight = alpha.backups().find_number(8).unwrap().id();
    selection.select(nine);

    // 8 disappears, 10 arrives, 9 changes flags.
    let second = snapshot(&[("alpha", "running", vec![(10, "working"), (9, "deletable"), (7, "")])]);
    feed.feed(second.as_bytes(), &mut registry, &mut selection).unwrap();

    let alpha = registry.by_name("alpha").unwrap();
    assert_eq!(alpha.backups().numbers(), vec![10, 9, 7]);
    assert_eq!(alpha.backups().find_number(9).unwrap().id(), nine);
    assert!(alpha.backups().find_number(9).unwrap().flags.contains(BackupFlags::DELETABLE));
    assert_eq!(selection.get(), Some(nine));
    assert!(registry.locate(eight).is_none());

    // Now the selected backup goes away.
    let third = snapshot(&[("alpha", "idle", vec![(10, ""), (7, "")])]);
    feed.feed(third.as_bytes(), &mut registry, &mut selection).unwrap();
    assert_eq!(selection.get(), None);
}

#[test]
fn test_same_snapshot_twice_is_stable() {
    let doc = snapshot(&[("alpha", "idle", vec![(4, "current"), (2, "")]), ("bravo", "idle", vec![(1, "")])]);
    let mut feed = StatusFeed::new();
    let mut registry = Registry::new();
    let mut selection = Selection::new();

    feed.feed(doc.as_bytes(), &mut registry, &mut selection).unwrap();
    let ids_before: Vec<_> = registry.clients().flat_map(|c| c.backups().iter().map(|e| e.id())).collect();
    let before = dump(&registry);

    feed.feed(doc.as_bytes(), &mut registry, &mut selection).unwrap();
    let ids_after: Vec<_> = registry.clients().flat_map(|c| c.backups().iter().map(|e| e.id())).collect();

    assert_eq!(dump(&registry), before);
    assert_eq!(ids_after, ids_before);
}

#[test]
fn test_status_update_with_empty_backups_keeps_other_state() {
    let mut feed = StatusFeed::new();
    let mut registry = Registry::new();
    let mut selection = Selection::new();
    feed.feed(
        snapshot(&[("alpha", "idle", vec![(2, "")]), ("bravo", "idle", vec![(6, ""), (5, "")])]).as_bytes(),
        &mut registry,
        &mut selection,
    )
    .unwrap();

    // bravo is not mentioned; alpha reports a new status and no backups.
    feed.feed(snapshot(&[("alpha", "server crashed", vec![])]).as_bytes(), &mut registry, &mut selection)
        .unwrap();

    assert_eq!(registry.by_name("alpha").unwrap().status, ClientStatus::ServerCrashed);
    let bravo = registry.by_name("bravo").unwrap();
    assert_eq!(bravo.status, ClientStatus::Idle);
    assert_eq!(bravo.backups().numbers(), vec![6, 5]);
}

#[test]
fn test_working_flag_alone() {
    let doc = r#"{"clients":[{"name":"alpha","status":"running","backups":[{"number":1,"working":1}]}]}"#;
    let (registry, _) = decode(&[doc.as_bytes()]);
    let flags = registry.by_name("alpha").unwrap().backups().first().unwrap().flags;
    assert_eq!(flags, BackupFlags::WORKING);
}

#[test]
fn test_schema_error_discards_snapshot_and_recovers() {
    let mut feed = StatusFeed::new();
    let mut registry = Registry::new();
    let mut selection = Selection::new();
    feed.feed(snapshot(&[("alpha", "idle", vec![(1, "")])]).as_bytes(), &mut registry, &mut selection)
        .unwrap();

    let bad = r#"{"clients":[{"name":"zulu","colour":"red","backups":[]}]}"#;
    let err = feed.feed(bad.as_bytes(), &mut registry, &mut selection).unwrap_err();
    assert_eq!(
        err,
        DecodeError::UnexpectedString {
            key: "colour".into(),
            value: "red".into()
        }
    );
    assert!(registry.by_name("zulu").is_none());
    assert!(!feed.in_progress());

    feed.feed(snapshot(&[("alpha", "running", vec![(2, ""), (1, "")])]).as_bytes(), &mut registry, &mut selection)
        .unwrap();
    assert_eq!(registry.by_name("alpha").unwrap().backups().numbers(), vec![2, 1]);
    assert_eq!(feed.snapshots(), 2);
}

#[test]
fn test_syntax_error_mid_stream() {
    let mut feed = StatusFeed::new();
    let mut registry = Registry::new();
    let mut selection = Selection::new();

    feed.feed(br#"{"clients":[{"name":"alpha","status":"idle","backups":[{"number":1"#, &mut registry, &mut selection)
        .unwrap();
    let err = feed.feed(b",,}]}]}", &mut registry, &mut selection).unwrap_err();
    assert!(err.is_syntax());
    assert!(registry.is_empty());
}

#[test]
fn test_client_names_with_invalid_utf8() {
    let mut doc = br#"{"clients":[{"name":"caf"#.to_vec();
    doc.push(0xe9);
    doc.extend_from_slice(br#"","status":"idle","backups":[]}]}"#);

    let (registry, _) = decode(&[doc.as_slice()]);
    assert!(registry.by_name("caf\u{fffd}").is_some());
}

#[test]
fn test_boolean_flag_is_rejected() {
    let doc = r#"{"clients":[{"name":"alpha","backups":[{"number":1,"working":true}]}]}"#;
    let mut feed = StatusFeed::new();
    let err = feed
        .feed(doc.as_bytes(), &mut Registry::new(), &mut Selection::new())
        .unwrap_err();
    assert_eq!(
        err,
        DecodeError::UnexpectedValue {
            key: "working".into(),
            kind: "boolean"
        }
    );
}

#[test]
fn test_clients_keep_first_seen_order() {
    let (registry, _) = decode(&[
        snapshot(&[("bravo", "idle", vec![])]).as_bytes(),
        snapshot(&[("alpha", "idle", vec![]), ("bravo", "idle", vec![])]).as_bytes(),
    ]);
    let names: Vec<&str> = registry.clients().map(|c| c.name()).collect();
    assert_eq!(names, vec!["bravo", "alpha"]);
}

#[test]
fn test_client_without_backups_array() {
    let mut feed = StatusFeed::new();
    let mut registry = Registry::new();
    let mut selection = Selection::new();

    feed.feed(
        br#"{"clients":[{"name":"alpha","status":"idle"}]}"#,
        &mut registry,
        &mut selection,
    )
    .unwrap();
    assert_eq!(registry.by_name("alpha").unwrap().status, ClientStatus::Idle);
    assert!(registry.by_name("alpha").unwrap().backups().is_empty());

    feed.feed(
        br#"{"clients":[{"name":"bravo","status":"idle","backups":[{"number":1}]}]}"#,
        &mut registry,
        &mut selection,
    )
    .unwrap();
    assert_eq!(registry.by_name("bravo").unwrap().backups().numbers(), vec![1]);
    assert_eq!(feed.snapshots(), 2);
    let names: Vec<&str> = registry.clients().map(|c| c.name()).collect();
    assert_eq!(names, vec!["alpha", "bravo"]);
}

#[test]
fn test_status_only_client_between_full_ones() {
    let mut feed = StatusFeed::new();
    let mut registry = Registry::new();
    let mut selection = Selection::new();
    feed.feed(snapshot(&[("alpha", "idle", vec![(3, ""), (2, "")])]).as_bytes(), &mut registry, &mut selection)
        .unwrap();

    let doc = r#"{"clients":[
        {"name":"alpha","status":"running"},
        {"name":"bravo","status":"idle","backups":[{"number":7}]}]}"#;
    feed.feed(doc.as_bytes(), &mut registry, &mut selection).unwrap();

    let alpha = registry.by_name("alpha").unwrap();
    assert_eq!(alpha.status, ClientStatus::Running);
    assert_eq!(alpha.backups().numbers(), vec![3, 2]);
    assert_eq!(registry.by_name("bravo").unwrap().backups().numbers(), vec![7]);
}

#[test]
fn test_top_level_array_is_rejected() {
    let mut feed = StatusFeed::new();
    let mut registry = Registry::new();
    let mut selection = Selection::new();

    let err = feed.feed(b"[1, 2]", &mut registry, &mut selection).unwrap_err();
    assert_eq!(err, DecodeError::NotAnObject { kind: "array" });

    feed.feed(snapshot(&[("alpha", "idle", vec![])]).as_bytes(), &mut registry, &mut selection)
        .unwrap();
    assert_eq!(registry.len(), 1);
}
