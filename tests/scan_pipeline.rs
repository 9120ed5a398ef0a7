//! End-to-end tests: log files on disk through scanner, report and the
//! `smtpcheck` binary.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use smtpcheck::config::Config;
use smtpcheck::output::Report;
use smtpcheck::scanner::Scanner;
use tempfile::NamedTempFile;

const CONNECT_A: &str = "Jan 1 00:00:01 host postfix/smtpd[1]: connect from unknown[10.0.0.1]";
const REJECT_B: &str = "Jan 1 00:00:02 host postfix/smtpd[1]: reject: RCPT from unknown[10.0.0.2]: 554 5.7.1 ...; from=<bob@example.com> to=<x@y>";
const CONNECT_B: &str = "Jan 1 00:00:02 host postfix/smtpd[1]: connect from unknown[10.0.0.2]";

fn write_log(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file.flush().unwrap();
    file
}

fn repeat(line: &'static str, n: usize) -> Vec<&'static str> {
    std::iter::repeat(line).take(n).collect()
}

fn scan(paths: &[PathBuf], threshold: u64) -> Report {
    let mut config = Config::default();
    config.input.log_files = paths.to_vec();
    config.detection.threshold = threshold;

    let mut scanner = Scanner::from_config(&config).unwrap();
    scanner.scan_sources(&config.input.log_files).unwrap();
    Report::build(&scanner.finish(), config.detection.threshold)
}

#[test]
fn test_repeated_connects_reported() {
    let log = write_log(&repeat(CONNECT_A, 20));
    let report = scan(&[log.path().to_path_buf()], 20);

    assert_eq!(report.entries.len(), 1);
    assert_eq!(report.entries[0].address, "10.0.0.1");
    assert_eq!(report.entries[0].count, 20);
    assert_eq!(report.entries[0].sender_suffix(), "");
}

#[test]
fn test_rejected_sender_listed_once() {
    let mut lines = Vec::new();
    for _ in 0..20 {
        lines.push(CONNECT_B);
        lines.push(REJECT_B);
    }
    let log = write_log(&lines);
    let report = scan(&[log.path().to_path_buf()], 20);

    assert_eq!(report.entries.len(), 1);
    assert_eq!(report.entries[0].address, "10.0.0.2");
    assert_eq!(report.entries[0].count, 20);
    assert_eq!(report.entries[0].sender_suffix(), "(bob@example.com)");
}

#[test]
fn test_reject_lines_alone_do_not_count() {
    let log = write_log(&repeat(REJECT_B, 20));
    let report = scan(&[log.path().to_path_buf()], 0);
    assert!(report.is_empty());
}

#[test]
fn test_below_threshold_not_reported() {
    let log = write_log(&repeat(CONNECT_A, 19));
    let report = scan(&[log.path().to_path_buf()], 20);
    assert!(report.is_empty());
}

#[test]
fn test_line_without_unknown_marker_ignored() {
    let log = write_log(&[
        "Jan 1 00:00:03 host postfix/smtpd[1]: connect from mail.example.org[10.0.0.3]",
        "Jan 1 00:00:03 host postfix/smtpd[1]: NOQUEUE: reject: RCPT from mail.example.org[10.0.0.3]: 554; from=<a@b> to=<c@d>",
    ]);

    let mut scanner = Scanner::new(smtpcheck::LineClassifier::new().unwrap());
    scanner.scan_sources(&[log.path().to_path_buf()]).unwrap();
    let summary = scanner.finish();

    assert_eq!(summary.stats.lines, 2);
    assert!(summary.counts.is_empty());
    assert!(summary.senders.is_empty());
}

#[test]
fn test_multiple_sources_accumulate_in_order() {
    let first = write_log(&repeat(CONNECT_A, 10));
    let mut second_lines = repeat(CONNECT_A, 10);
    second_lines.extend(repeat(CONNECT_B, 15));
    let second = write_log(&second_lines);

    let report = scan(&[first.path().to_path_buf(), second.path().to_path_buf()], 15);

    let rows: Vec<(u64, &str)> = report
        .entries
        .iter()
        .map(|e| (e.count, e.address.as_str()))
        .collect();
    assert_eq!(rows, vec![(20, "10.0.0.1"), (15, "10.0.0.2")]);
}

#[test]
fn test_binary_prints_report() {
    let log = write_log(&repeat(CONNECT_A, 20));

    let output = Command::new(env!("CARGO_BIN_EXE_smtpcheck"))
        .arg("-f")
        .arg(log.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec![
            "--- Rejected SMTP access over 20 times retry from unknown hosts ---",
            "retry : IP address (From:[, ...])",
            "   20 : 10.0.0.1 ",
            "--- ",
        ]
    );
}

#[test]
fn test_binary_limit_option() {
    let log = write_log(&repeat(CONNECT_A, 3));

    let output = Command::new(env!("CARGO_BIN_EXE_smtpcheck"))
        .args(["-l", "3", "--format", "jsonl", "-f"])
        .arg(log.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let entry: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(entry["address"], "10.0.0.1");
    assert_eq!(entry["count"], 3);
}

#[test]
fn test_binary_missing_file_fails() {
    let output = Command::new(env!("CARGO_BIN_EXE_smtpcheck"))
        .args(["-f", "/nonexistent/mail.log"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("/nonexistent/mail.log"));
}

#[test]
fn test_binary_bad_usage_fails() {
    let output = Command::new(env!("CARGO_BIN_EXE_smtpcheck"))
        .args(["-l", "many"])
        .output()
        .unwrap();

    assert!(!output.status.success());
}

#[test]
fn test_binary_reads_stdin() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_smtpcheck"))
        .args(["-f", "-", "-l", "3"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    {
        let mut stdin = child.stdin.take().unwrap();
        for _ in 0..3 {
            writeln!(stdin, "{}", CONNECT_A).unwrap();
        }
        writeln!(stdin, "{}", REJECT_B).unwrap();
    }

    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec![
            "--- Rejected SMTP access over 3 times retry from unknown hosts ---",
            "retry : IP address (From:[, ...])",
            "    3 : 10.0.0.1 ",
            "--- ",
        ]
    );
}

#[test]
fn test_binary_flags_override_config_file() {
    let log = write_log(&repeat(CONNECT_A, 4));
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("smtpcheck.toml");
    std::fs::write(
        &config_path,
        format!(
            "[input]\nlog_files = [{:?}]\n\n[detection]\nthreshold = 5\n\n[output]\nformat = \"jsonl\"\n",
            log.path().display().to_string()
        ),
    )
    .unwrap();

    // threshold 5 from the file alone hides the address
    let output = Command::new(env!("CARGO_BIN_EXE_smtpcheck"))
        .arg("-c")
        .arg(&config_path)
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(output.stdout.is_empty());

    // -l 3 wins over the file; format still comes from the file
    let output = Command::new(env!("CARGO_BIN_EXE_smtpcheck"))
        .arg("-c")
        .arg(&config_path)
        .args(["-l", "3"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let entry: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(entry["address"], "10.0.0.1");
    assert_eq!(entry["count"], 4);
    assert_eq!(entry["threshold"], 3);
}

#[test]
fn test_binary_write_config() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("written.toml");

    let output = Command::new(env!("CARGO_BIN_EXE_smtpcheck"))
        .args(["-f", "/var/log/other.log", "-l", "7", "--format", "json", "--strict-addresses"])
        .arg("--write-config")
        .arg(&config_path)
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(!stdout.contains("Rejected SMTP access"));

    let config = Config::from_file(&config_path).unwrap();
    assert_eq!(config.input.log_files, vec![PathBuf::from("/var/log/other.log")]);
    assert_eq!(config.detection.threshold, 7);
    assert!(config.detection.strict_addresses);
    assert_eq!(config.output.format, "json");
}

#[test]
fn test_binary_strict_addresses() {
    let log = write_log(&[
        "Jan 1 00:00:01 host postfix/smtpd[1]: connect from unknown[999.0.0.1]",
        CONNECT_A,
    ]);

    let run = |extra: &[&str]| {
        let output = Command::new(env!("CARGO_BIN_EXE_smtpcheck"))
            .args(["-l", "1", "-f"])
            .arg(log.path())
            .args(extra)
            .output()
            .unwrap();
        assert!(output.status.success());
        String::from_utf8(output.stdout).unwrap()
    };

    let lenient = run(&[]);
    assert!(lenient.contains("999.0.0.1"));
    assert!(lenient.contains("10.0.0.1"));

    let strict = run(&["--strict-addresses"]);
    assert!(!strict.contains("999.0.0.1"));
    assert!(strict.contains("10.0.0.1"));
}
