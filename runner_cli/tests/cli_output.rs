use std::{
    env, fs,
    path::PathBuf,
    process::{Command, Output},
};

const QUESTIONS: &str = r#"[
  {
    "id": "q-sun",
    "question": "Which star is closest to Earth?",
    "sources": [{ "url": "https://example.org/sun", "passage": "The Sun is a star." }],
    "answers": [
      { "id": "sun", "label": "The Sun", "isCorrect": true },
      { "id": "proxima", "label": "Proxima Centauri", "isCorrect": false }
    ]
  },
  {
    "id": "q-water",
    "question": "Water boils at sea level at?",
    "sources": [],
    "answers": [
      { "id": "c90", "label": "90C", "isCorrect": false },
      { "id": "c100", "label": "100C", "isCorrect": true },
      { "id": "c110", "label": "110C", "isCorrect": false },
      { "id": "c120", "label": "120C", "isCorrect": false }
    ]
  }
]"#;

fn norm_newlines(s: &str) -> String {
    s.replace("\r\n", "\n").replace('\r', "")
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = env::temp_dir().join(format!("runner_cli_{name}_{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_questions(name: &str, body: &str) -> PathBuf {
    let path = scratch_dir(name).join("questions.json");
    fs::write(&path, body).unwrap();
    path
}

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_runner")).args(args).output().unwrap()
}

#[test]
fn help_mentions_subcommands() {
    let output = run(&["--help"]);
    assert!(output.status.success());
    let stdout = norm_newlines(&String::from_utf8_lossy(&output.stdout));
    assert!(stdout.contains("simulate"));
    assert!(stdout.contains("generate"));
    assert!(stdout.contains("check"));
}

#[test]
fn check_accepts_valid_file() {
    let path = write_questions("check_ok", QUESTIONS);
    let output = run(&["check", path.to_str().unwrap()]);
    assert!(output.status.success());
    let stdout = norm_newlines(&String::from_utf8_lossy(&output.stdout));
    assert_eq!(stdout.trim(), "ok: 2 question(s)");
}

#[test]
fn check_lists_each_problem() {
    let path = write_questions(
        "check_bad",
        r#"[
          { "id": "dup", "question": "?", "answers": [] },
          { "id": "dup", "question": "?", "answers": [{ "id": "a", "label": "A", "isCorrect": true }] }
        ]"#,
    );
    let output = run(&["check", path.to_str().unwrap()]);
    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(1));

    let stderr = norm_newlines(&String::from_utf8_lossy(&output.stderr));
    assert!(stderr.contains("E2002: question dup has no answers"));
    assert!(stderr.contains("E2003: duplicate question id: dup"));
    assert!(stderr.contains("Error: 2 problem(s) in "));
}

#[test]
fn missing_questions_file_is_reported_stably() {
    let missing = scratch_dir("missing").join("nope.json");
    let _ = fs::remove_file(&missing);

    let output = run(&["simulate", missing.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = norm_newlines(&String::from_utf8_lossy(&output.stderr));
    assert!(stderr.contains("Error: failed to read questions: "));
    assert!(stderr.contains("nope.json"));
    assert!(stderr.contains("Caused by:"));
}

#[test]
fn simulate_prints_timeline_with_a_gate() {
    let path = write_questions("simulate", QUESTIONS);
    let output = run(&["simulate", path.to_str().unwrap(), "--seed", "42", "--duration", "25"]);
    assert!(output.status.success());

    let stdout = norm_newlines(&String::from_utf8_lossy(&output.stdout));
    let lines: Vec<&str> = stdout.lines().collect();
    assert!(lines[0].starts_with("Simulation Start (25.0s at 60 fps)"));
    assert_eq!(lines[1], "Time(s)  | Lanes       | Info");
    assert!(lines.iter().any(|l| l.contains("GATE q-sun (correct A)")));
    assert!(lines.iter().any(|l| l.contains('#')));
    let last = lines.last().unwrap();
    assert!(last.starts_with("Simulation End: "));
    assert!(last.contains(" 0 dropped"));
}

#[test]
fn simulate_is_deterministic_per_seed() {
    let path = write_questions("simulate_seed", QUESTIONS);
    let args = ["simulate", path.to_str().unwrap(), "--seed", "7", "--duration", "12"];
    let a = run(&args);
    let b = run(&args);
    assert!(a.status.success());
    assert_eq!(a.stdout, b.stdout);
}

#[test]
fn simulate_slow_mo_is_logged_in_timeline() {
    let path = write_questions("simulate_slow", QUESTIONS);
    let output = run(&[
        "simulate",
        path.to_str().unwrap(),
        "--duration",
        "6",
        "--slow-mo-at",
        "2",
    ]);
    assert!(output.status.success());
    let stdout = norm_newlines(&String::from_utf8_lossy(&output.stdout));
    assert!(stdout.contains("| slow-mo"));
}

#[test]
fn generate_writes_segments_json() {
    let dir = scratch_dir("generate");
    let path = write_questions("generate", QUESTIONS);
    let out_path = dir.join("level.json");

    let output = run(&[
        "generate",
        path.to_str().unwrap(),
        "-o",
        out_path.to_str().unwrap(),
        "--segments",
        "4",
    ]);
    assert!(output.status.success());

    let json = fs::read_to_string(&out_path).unwrap();
    let v: serde_json::Value = serde_json::from_str(&json).unwrap();
    let segments = v.as_array().unwrap();
    assert_eq!(segments.len(), 4);
    assert_eq!(segments[0]["id"], "segment_0");
    assert_eq!(segments[3]["segment_type"], "rest");
    assert!(segments[0]["notes"].as_array().is_some_and(|n| !n.is_empty()));
}

#[test]
fn invalid_config_is_reported() {
    let dir = scratch_dir("bad_config");
    let path = write_questions("bad_config", QUESTIONS);
    let config = dir.join("config.json");
    fs::write(&config, r#"{ "rhythm": { "level": { "segment_lookahead": 0 } } }"#).unwrap();

    let output = run(&["simulate", path.to_str().unwrap(), "--config", config.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = norm_newlines(&String::from_utf8_lossy(&output.stderr));
    assert!(stderr.contains("E1002: segment_lookahead must be >= 1"));
}

#[test]
fn negative_slow_mo_multiplier_is_reported() {
    let dir = scratch_dir("bad_game_config");
    let path = write_questions("bad_game_config", QUESTIONS);
    let config = dir.join("config.json");
    fs::write(&config, r#"{ "game": { "slow_mo_multiplier": -1.0 } }"#).unwrap();

    let output = run(&["simulate", path.to_str().unwrap(), "--config", config.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = norm_newlines(&String::from_utf8_lossy(&output.stderr));
    assert!(stderr.contains("E1008: slow_mo_multiplier must be in (0, 1]"));
    assert!(String::from_utf8_lossy(&output.stdout).is_empty());
}
