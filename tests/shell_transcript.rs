//! End-to-end tests: run the binary with a scripted stdin and check the
//! transcript it prints.

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/catalog.jsonl")
}

/// Config with short timers so scripts finish quickly, logging into a
/// per-test temp directory.
fn write_config(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("scrollsearch_e2e_{name}"));
    fs::create_dir_all(&dir).expect("create temp dir");
    let config = dir.join("config.toml");
    let log = dir.join("run.log");
    fs::write(
        &config,
        format!(
            "text_debounce_ms = 20\nfilter_debounce_ms = 10\nscroll_threshold = 0.0\nload_cooldown_ms = 0\nlog_file_path = {:?}\n",
            log.display().to_string()
        ),
    )
    .expect("write config");
    config
}

fn run(name: &str, extra_args: &[&str], script: &str) -> (String, String) {
    let config = write_config(name);
    let mut child = Command::new(env!("CARGO_BIN_EXE_scrollsearch"))
        .arg(fixture())
        .args(["--config", &config.display().to_string()])
        .args(["--page-size", "3", "--rows", "1", "--width", "120"])
        .args(extra_args)
        .env_remove("SCROLLSEARCH_PAGE_SIZE")
        .env_remove("SCROLLSEARCH_CONFIG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to execute binary");

    child
        .stdin
        .take()
        .expect("stdin piped")
        .write_all(script.as_bytes())
        .expect("write script");

    let output = child.wait_with_output().expect("binary should exit");
    assert!(
        output.status.success(),
        "binary failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    (
        String::from_utf8_lossy(&output.stdout).into_owned(),
        String::from_utf8_lossy(&output.stderr).into_owned(),
    )
}

#[test]
fn browse_scroll_and_search_transcript() {
    let (stdout, _) = run(
        "browse",
        &[],
        "wait\nscroll end\nwait\nstatus\nquery xi\nwait\nstatus\n",
    );

    insta::assert_snapshot!(stdout, @r#"
    [loading]
    [loaded]
    -- 3 results --
       1. DECO*27 - Ghost Rule
       2. xi - Blue Zenith
       3. Kurokotei - Galaxy Collapse
    featured: DECO*27 - Ghost Rule
    -- 3 more --
       4. xi - Freedom Dive
       5. The Quick Brown Fox - The Big Black
       6. K/DA - Drum Go Dum
    status: s1 exhausted next=page 2 received=6 shown=6 top=2 sessions=1 pages=2 discarded=0 failures=0
    criteria: query="" ruleset=any category=any sort=ranked desc
    [loading]
    [loaded]
    -- 2 results --
       1. xi - Blue Zenith
       2. xi - Freedom Dive
    featured: xi - Blue Zenith
    status: s2 exhausted next=page 1 received=2 shown=2 top=0 sessions=2 pages=3 discarded=0 failures=0
    criteria: query="xi" ruleset=any category=any sort=relevance desc
    "#);
}

#[test]
fn filters_and_sort_commands() {
    let (stdout, _) = run(
        "filters",
        &[],
        "wait\nruleset osu\nsort plays asc\nwait\nstatus\n",
    );

    assert!(
        stdout.contains("criteria: query=\"\" ruleset=osu category=any sort=plays asc"),
        "got:\n{stdout}"
    );
    // Least played osu entry heads the last list
    let last_list = stdout.rfind("-- 3 results --").expect("osu list shown");
    assert!(
        stdout[last_list..].contains("1. DECO*27 - Ghost Rule"),
        "got:\n{stdout}"
    );
}

#[test]
fn initial_query_flag_searches_immediately() {
    let (stdout, _) = run("query_flag", &["--query", "drum"], "status\n");

    assert!(stdout.contains("1. K/DA - Drum Go Dum"), "got:\n{stdout}");
    assert!(stdout.contains("sessions=1"), "got:\n{stdout}");
}

#[test]
fn failing_source_reports_failure_and_exits_cleanly() {
    let (stdout, _) = run("failing", &["--fail-every", "1"], "wait\n");

    assert!(
        stdout.contains("[search failed: data source unavailable: request 1 rejected by catalog]"),
        "got:\n{stdout}"
    );
}

#[test]
fn missing_catalog_file_is_an_error() {
    let config = write_config("missing");
    let output = Command::new(env!("CARGO_BIN_EXE_scrollsearch"))
        .arg("/nonexistent/catalog.jsonl")
        .args(["--config", &config.display().to_string()])
        .stdin(Stdio::null())
        .output()
        .expect("Failed to execute binary");

    assert!(!output.status.success());
    assert!(
        String::from_utf8_lossy(&output.stderr).contains("FileNotFound"),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}
