#![cfg(feature = "storage-rocksdb")]

mod common;

use assert_cmd::cargo_bin;
use common::{PARTICIPANTS_CSV, write_requests, write_temp};
use std::process::Command;
use tempfile::tempdir;

#[test]
fn test_rocksdb_persistence_recovery() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("test_db");
    let participants = write_temp(PARTICIPANTS_CSV).unwrap();

    // 1. First run: the trader gets a seed batch
    let requests1 = write_requests(&[r#"{"type":"generate_seeds","trader":"t1"}"#]).unwrap();
    let output1 = Command::new(cargo_bin!("cocoa-chain"))
        .arg(participants.path())
        .arg(requests1.path())
        .arg("--db-path")
        .arg(&db_path)
        .args(["--seed", "3"])
        .output()
        .expect("Failed to execute command");
    assert!(output1.status.success());
    let stdout1 = String::from_utf8_lossy(&output1.stdout);
    assert!(stdout1.contains("f1,farmer,100,0,0,0,0,0"));

    // 2. Second run: same participants file, the farmer buys from the
    // recovered batch. Stored balances win over the CSV.
    let requests2 = write_requests(&[
        r#"{"type":"trade_seed","trader":"t1","farmer":"f1","quantity":3}"#,
        r#"{"type":"harvest","farmer":"f1"}"#,
    ])
    .unwrap();
    let output2 = Command::new(cargo_bin!("cocoa-chain"))
        .arg(participants.path())
        .arg(requests2.path())
        .arg("--db-path")
        .arg(&db_path)
        .output()
        .expect("Failed to execute command");
    assert!(output2.status.success());
    let stdout2 = String::from_utf8_lossy(&output2.stdout);

    assert!(stdout2.contains("f1,farmer,70,0,3,0,0,3"));
    assert!(stdout2.contains("\nt1,trader,30,"));
}
