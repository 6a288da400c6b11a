use std::process::Command;

fn run(inventory: &str, commands: &str) -> (String, String, bool) {
    let output = Command::new(env!("CARGO_BIN_EXE_vend-eng"))
        .arg(format!("tests/fixtures/{inventory}"))
        .arg(format!("tests/fixtures/{commands}"))
        .env("RUST_LOG", "warn")
        .env_remove("VEND_COIN_UNIT")
        .env_remove("VEND_MAX_COINS")
        .env_remove("VEND_SLOT_CAPACITY")
        .env_remove("VEND_INITIAL_COINS")
        .output()
        .expect("failed to run binary");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

#[test]
fn replays_a_session() {
    let (stdout, stderr, success) = run("inventory.csv", "valid.csv");

    assert!(success);
    assert!(stderr.is_empty());

    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[0], "op,slot,status,coins,remaining,body");
    assert_eq!(lines[1], "insert,,204,3,,");
    assert_eq!(lines[2], r#"purchase,1,200,1,4,"{""quantity"":1}""#);
    // drained by the purchase
    assert_eq!(lines[3], "peek,,204,0,,");
    assert_eq!(lines[4], "insert,,204,1,,");
    // insufficient funds
    assert_eq!(lines[5], "purchase,1,400,1,,");
    assert_eq!(lines[6], "insert,,204,2,,");
    // out of stock
    assert_eq!(lines[7], "purchase,3,404,2,,");
    // unknown slot
    assert_eq!(lines[8], "purchase,9,404,,,");
    // too many coins
    assert_eq!(lines[9], "insert,,400,0,,");
    assert_eq!(lines[10], "insert,,204,2,,");
    assert_eq!(lines[11], "drain,,204,2,,");
    assert!(lines[12].starts_with("refill,,200,,,"));
    assert_eq!(lines[12].matches(r#"""count"":5"#).count(), 3);
    assert_eq!(lines.len(), 13);
}

#[test]
fn errors_warn_but_do_not_block() {
    let (stdout, stderr, success) = run("bad_inventory.csv", "with_errors.csv");

    assert!(success);
    assert!(stderr.contains("invalid price"));
    assert!(stderr.contains("slot stock count 9"));
    assert!(stderr.contains("line 5: invalid price '-0.5'"));
    assert!(stderr.contains("unrecognized operation"));
    assert!(stderr.contains("missing slot"));

    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[0], "op,slot,status,coins,remaining,body");
    assert_eq!(lines[1], "insert,,204,2,,");
    assert_eq!(lines[2], r#"purchase,1,200,0,4,"{""quantity"":1}""#);
    assert!(lines[3].starts_with("list,,200,,,"));
    // only slot 1 was provisioned
    assert!(lines[3].contains(r#"""id"":1"#));
    assert!(!lines[3].contains(r#"""id"":2"#));
    assert!(!lines[3].contains(r#"""id"":4"#));
    assert_eq!(lines.len(), 4);
}

#[test]
fn missing_command_file_fails() {
    let (_, stderr, success) = run("inventory.csv", "nope.csv");

    assert!(!success);
    assert!(stderr.contains("failed to open"));
}
