//! Integration tests for the tactician engine binary.
//!
//! Tests the full protocol session flow by spawning the engine process,
//! sending commands via stdin, and verifying stdout responses.

use std::io::{BufRead, Write};
use std::process::{Command, Stdio};

use tactician::protocol::notation::parse_actions;

/// Sends a sequence of commands to the engine and collects stdout lines.
fn run_engine(commands: &[&str]) -> Vec<String> {
    let exe = env!("CARGO_BIN_EXE_tactician");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to start tactician");

    let mut stdin = child.stdin.take().unwrap();
    let stdout = child.stdout.take().unwrap();
    let reader = std::io::BufReader::new(stdout);

    for cmd in commands {
        writeln!(stdin, "{}", cmd).unwrap();
    }
    stdin.flush().unwrap();
    drop(stdin);

    let lines: Vec<String> = reader.lines().map(|l| l.unwrap()).collect();
    let status = child.wait().expect("failed to wait on child");
    assert!(status.success());
    lines
}

fn fixture() -> String {
    format!(
        "position {}/tests/fixtures/skirmish.json",
        env!("CARGO_MANIFEST_DIR")
    )
}

fn line_with<'a>(lines: &'a [String], prefix: &str) -> Option<&'a str> {
    lines
        .iter()
        .find_map(|l| l.strip_prefix(prefix))
}

#[test]
fn isready_response() {
    let lines = run_engine(&["isready", "quit"]);
    assert_eq!(lines, vec!["readyok".to_string()]);
}

#[test]
fn unknown_commands_are_ignored() {
    let lines = run_engine(&["frobnicate", "go sideways", "isready", "quit"]);
    assert_eq!(lines, vec!["readyok".to_string()]);
}

#[test]
fn go_without_position_prints_nothing() {
    let lines = run_engine(&["go", "eval", "isready", "quit"]);
    assert_eq!(lines, vec!["readyok".to_string()]);
}

#[test]
fn go_returns_a_parsable_plan() {
    let pos = fixture();
    let lines = run_engine(&[&pos, "go", "quit"]);

    assert!(
        line_with(&lines, "info lethal ").is_some(),
        "go should report search statistics: {:?}",
        lines
    );
    let best = line_with(&lines, "bestactions ").expect("missing bestactions");
    let plan = parse_actions(best).expect("bestactions must be valid notation");
    assert!(!plan.is_empty());

    let last = lines.last().unwrap();
    assert!(last.starts_with("bestactions "), "bestactions must be last: {}", last);
}

#[test]
fn go_then_replay_applies_the_plan() {
    let pos = fixture();
    let lines = run_engine(&[&pos, "go", "replay", "quit"]);

    let best = line_with(&lines, "bestactions ").unwrap();
    let plan = parse_actions(best).unwrap();
    let applied = plan.iter().filter(|a| !a.is_noop()).count();

    assert_eq!(line_with(&lines, "replayed "), Some(applied.to_string().as_str()));
}

#[test]
fn replay_explicit_actions() {
    let pos = fixture();
    let lines = run_engine(&[&pos, "replay move 2,3>3,3 ; move 1,2>2,2", "quit"]);
    assert_eq!(line_with(&lines, "replayed "), Some("2"));

    let lines = run_engine(&[&pos, "replay move 0,0>0,1", "quit"]);
    assert!(line_with(&lines, "replayfailed ").is_some(), "{:?}", lines);
}

#[test]
fn go_unit_plans_one_unit() {
    let pos = fixture();
    let lines = run_engine(&[&pos, "go unit 1", "go unit 99", "quit"]);

    let plans: Vec<&String> = lines
        .iter()
        .filter(|l| l.starts_with("bestunitplan "))
        .collect();
    assert_eq!(plans.len(), 2, "{:?}", lines);
    assert!(parse_actions(plans[0].strip_prefix("bestunitplan ").unwrap()).is_ok());
    assert_eq!(plans[1], "bestunitplan noop");
}

#[test]
fn eval_prints_breakdown() {
    let pos = fixture();
    let lines = run_engine(&[&pos, "eval", "quit"]);
    let eval = line_with(&lines, "info eval ").expect("missing eval line");
    let parts: Vec<f64> = eval
        .split(" / ")
        .map(|s| s.parse().unwrap())
        .collect();
    assert_eq!(parts.len(), 6);
    let sum: f64 = parts[1..].iter().sum();
    assert!((parts[0] - sum).abs() < 0.05, "total must be the sum of terms: {}", eval);
}

#[test]
fn options_change_the_search() {
    let pos = fixture();
    let lines = run_engine(&[
        &pos,
        "setoption name MaxBucket value 0",
        "go",
        "quit",
    ]);
    let best = line_with(&lines, "bestactions ").unwrap();
    let plan = parse_actions(best).unwrap();
    assert!(
        plan.iter().all(|a| a.is_noop()),
        "with no cost bucket the only plan is doing nothing, got {}",
        best
    );
}

#[test]
fn newgame_clears_position() {
    let pos = fixture();
    let lines = run_engine(&[&pos, "newgame", "go", "isready", "quit"]);
    assert_eq!(lines, vec!["readyok".to_string()]);
}

#[test]
fn bad_position_is_ignored() {
    let lines = run_engine(&["position /nonexistent.json", "go", "isready", "quit"]);
    assert_eq!(lines, vec!["readyok".to_string()]);
}

#[test]
fn quit_stops_processing() {
    let lines = run_engine(&["quit", "isready"]);
    assert!(lines.is_empty());
}
