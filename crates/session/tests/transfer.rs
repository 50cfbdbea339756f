//! Transfer executor behavior: the temp-then-rename commit protocol,
//! rollback on failure, and connection handling around each call.

mod common;

use std::time::Duration;

use common::{local_file, session};
use ferry::Error;
use ferry_remote::{Error as RemoteError, Op, OpKind};

fn op_index(ops: &[Op], predicate: impl Fn(&Op) -> bool) -> usize {
    ops.iter().position(predicate).unwrap()
}

#[tokio::test]
async fn upload_goes_through_temp_name_and_rename() {
    let (_dir, file) = local_file(b"id,amount\n1,2\n");
    let (session, endpoint) = session(Some("/incoming"));

    session
        .transfer(&file, Some("report.csv"), false)
        .await
        .unwrap();

    assert_eq!(endpoint.files(), vec!["/incoming/report.csv".to_string()]);
    assert_eq!(
        endpoint.file("/incoming/report.csv").unwrap(),
        b"id,amount\n1,2\n"
    );
    assert!(!session.is_connected());

    let ops = endpoint.ops();
    let put = op_index(&ops, |op| matches!(op, Op::Put { .. }));
    let rename = op_index(&ops, |op| matches!(op, Op::Rename { .. }));
    let end = op_index(&ops, |op| matches!(op, Op::End { .. }));
    assert!(put < rename && rename < end);

    match &ops[put] {
        Op::Put { remote, .. } => {
            assert!(remote.starts_with("/incoming/report.csv_tmp_"));
        }
        other => panic!("expected put, got {other:?}"),
    }
    match &ops[rename] {
        Op::Rename { from, to } => {
            assert!(from.starts_with("/incoming/report.csv_tmp_"));
            assert_eq!(to, "/incoming/report.csv");
        }
        other => panic!("expected rename, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_previous_target_is_tolerated() {
    let (_dir, file) = local_file(b"fresh");
    let (session, endpoint) = session(Some("/incoming"));

    // No file exists at the target, so the pre-rename delete misses;
    // the transfer must still succeed.
    session
        .transfer(&file, Some("report.csv"), false)
        .await
        .unwrap();

    let ops = endpoint.ops();
    let delete = op_index(&ops, |op| {
        matches!(op, Op::Delete { path } if path == "/incoming/report.csv")
    });
    let rename = op_index(&ops, |op| matches!(op, Op::Rename { .. }));
    assert!(delete < rename);
}

#[tokio::test]
async fn pre_existing_target_is_replaced() {
    let (_dir, file) = local_file(b"new content");
    let (session, endpoint) = session(Some("/incoming"));
    endpoint.seed_file("/incoming/report.csv", b"old content");

    session
        .transfer(&file, Some("report.csv"), false)
        .await
        .unwrap();

    assert_eq!(endpoint.files(), vec!["/incoming/report.csv".to_string()]);
    assert_eq!(endpoint.file("/incoming/report.csv").unwrap(), b"new content");
}

#[tokio::test]
async fn default_target_derives_from_local_path() {
    let (_dir, file) = local_file(b"payload");
    let (session, endpoint) = session(None);

    session.transfer(&file, None, false).await.unwrap();

    let expected = file.to_str().unwrap().replace('\\', "/");
    assert_eq!(endpoint.files(), vec![expected]);
}

#[tokio::test]
async fn windows_style_target_is_normalized() {
    let (_dir, file) = local_file(b"payload");
    let (session, endpoint) = session(Some("/incoming"));

    session
        .transfer(&file, Some(r"C:\data\file.txt"), false)
        .await
        .unwrap();

    assert_eq!(endpoint.files(), vec!["/incoming/data/file.txt".to_string()]);
    assert!(endpoint.dir_exists("/incoming/data"));
}

#[tokio::test]
async fn leave_connection_open_skips_teardown() {
    let (_dir, file) = local_file(b"payload");
    let (session, endpoint) = session(Some("/incoming"));

    session
        .transfer(&file, Some("report.csv"), true)
        .await
        .unwrap();

    assert!(session.is_connected());
    assert_eq!(endpoint.end_calls(), 0);
}

#[tokio::test]
async fn rename_failure_cleans_up_temp_and_wins() {
    let (_dir, file) = local_file(b"payload");
    let (session, endpoint) = session(Some("/incoming"));
    endpoint.fail_next(
        OpKind::Rename,
        RemoteError::Op {
            op: OpKind::Rename,
            path: "/incoming/report.csv".into(),
            message: "permission denied".into(),
        },
    );

    let err = session
        .transfer(&file, Some("report.csv"), false)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Rename { .. }));
    // The staged temp file was rolled back; nothing is left visible.
    assert_eq!(endpoint.files(), Vec::<String>::new());
    assert!(!session.is_connected());
}

#[tokio::test]
async fn put_failure_attempts_rollback_and_reports_put_error() {
    let (_dir, file) = local_file(b"payload");
    let (session, endpoint) = session(Some("/incoming"));
    endpoint.fail_next(
        OpKind::Put,
        RemoteError::Op {
            op: OpKind::Put,
            path: "/incoming/report.csv".into(),
            message: "quota exceeded".into(),
        },
    );

    let err = session
        .transfer(&file, Some("report.csv"), false)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Put { .. }));
    assert_eq!(endpoint.files(), Vec::<String>::new());

    // Rollback was attempted after the failed put; its own failure
    // (nothing staged) is swallowed.
    let ops = endpoint.ops();
    let put = op_index(&ops, |op| matches!(op, Op::Put { .. }));
    let cleanup = op_index(&ops, |op| {
        matches!(op, Op::Delete { path } if path.contains("_tmp_"))
    });
    assert!(put < cleanup);
}

#[tokio::test]
async fn connect_failure_aborts_before_any_remote_mutation() {
    let (_dir, file) = local_file(b"payload");
    let (session, endpoint) = session(Some("/incoming"));
    endpoint.fail_next(OpKind::Connect, RemoteError::Connect("refused".into()));

    let err = session
        .transfer(&file, Some("report.csv"), false)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Connect { .. }));
    assert!(!endpoint
        .ops()
        .iter()
        .any(|op| matches!(op, Op::Mkdir { .. } | Op::Put { .. })));

    // The transfer flag was released; a later disconnect cannot hang.
    session.disconnect().await.unwrap();
}

#[tokio::test]
async fn transfer_error_takes_priority_over_teardown_error() {
    let (_dir, file) = local_file(b"payload");
    let (session, endpoint) = session(Some("/incoming"));
    endpoint.fail_next(
        OpKind::Rename,
        RemoteError::Op {
            op: OpKind::Rename,
            path: "/incoming/report.csv".into(),
            message: "permission denied".into(),
        },
    );
    endpoint.fail_next(OpKind::End, RemoteError::Close("timed out".into()));

    let err = session
        .transfer(&file, Some("report.csv"), false)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Rename { .. }));
    assert!(!session.is_connected());
}

#[tokio::test]
async fn teardown_error_after_successful_transfer_propagates() {
    let (_dir, file) = local_file(b"payload");
    let (session, endpoint) = session(Some("/incoming"));
    endpoint.fail_next(OpKind::End, RemoteError::Close("timed out".into()));

    let err = session
        .transfer(&file, Some("report.csv"), false)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Disconnect { .. }));
    // The upload itself committed.
    assert_eq!(endpoint.files(), vec!["/incoming/report.csv".to_string()]);
}

#[tokio::test]
async fn disconnect_defers_to_active_transfer() {
    let (_dir, file) = local_file(b"payload");
    let (session, endpoint) = session(Some("/incoming"));
    endpoint.set_latency(Duration::from_millis(10));

    let uploader = session.clone();
    let transfer = tokio::spawn(async move {
        uploader.transfer(&file, Some("report.csv"), true).await
    });

    // Wait until the transfer is past connect and holding the
    // connection open.
    loop {
        if endpoint.ops().iter().any(|op| matches!(op, Op::Mkdir { .. })) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }

    session.disconnect().await.unwrap();
    transfer.await.unwrap().unwrap();

    // Teardown only began once the transfer had committed.
    let ops = endpoint.ops();
    let rename = op_index(&ops, |op| matches!(op, Op::Rename { .. }));
    let end = op_index(&ops, |op| matches!(op, Op::End { .. }));
    assert!(rename < end);
    assert!(!session.is_connected());
    assert_eq!(endpoint.files(), vec!["/incoming/report.csv".to_string()]);
}

#[tokio::test]
async fn remove_deletes_and_leaves_connection_open_when_asked() {
    let (session, endpoint) = session(Some("/incoming"));
    endpoint.seed_file("/incoming/old.csv", b"stale");

    session.remove("old.csv", true).await.unwrap();

    assert!(endpoint.file("/incoming/old.csv").is_none());
    assert!(session.is_connected());
    assert_eq!(endpoint.end_calls(), 0);
}

#[tokio::test]
async fn remove_disconnects_on_both_outcomes() {
    let (session, endpoint) = session(Some("/incoming"));
    endpoint.seed_file("/incoming/old.csv", b"stale");

    session.remove("old.csv", false).await.unwrap();
    assert!(!session.is_connected());
    assert_eq!(endpoint.end_calls(), 1);

    let err = session.remove("missing.csv", false).await.unwrap_err();
    assert!(matches!(err, Error::Remove { .. }));
    assert!(!session.is_connected());
    assert_eq!(endpoint.end_calls(), 2);
}

#[tokio::test]
async fn remove_error_takes_priority_over_teardown_error() {
    let (session, endpoint) = session(Some("/incoming"));
    endpoint.fail_next(OpKind::End, RemoteError::Close("timed out".into()));

    let err = session.remove("missing.csv", false).await.unwrap_err();

    assert!(matches!(err, Error::Remove { .. }));
    assert!(!session.is_connected());
}

#[tokio::test]
async fn remove_connect_failure_aborts_before_delete() {
    let (session, endpoint) = session(Some("/incoming"));
    endpoint.fail_next(OpKind::Connect, RemoteError::Connect("refused".into()));

    let err = session.remove("old.csv", false).await.unwrap_err();

    assert!(matches!(err, Error::Connect { .. }));
    assert!(!endpoint.ops().iter().any(|op| matches!(op, Op::Delete { .. })));
}
