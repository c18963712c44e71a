// integration tests for shell completions and help output

use crate::common::*;

#[test]
fn test_completions_bash() {
    let env = TestEnv::new();

    let output = env.run(&["completions", "bash"]);
    assert!(output.status.success());

    let script = stdout(&output);
    assert!(script.contains("permcalc"));
    assert!(script.contains("preview"));
}

#[test]
fn test_completions_unknown_shell_is_invalid_args() {
    let env = TestEnv::new();

    let output = env.run(&["completions", "tcsh"]);
    assert_eq!(output.status.code(), Some(7));
}

#[test]
fn test_help_exits_zero() {
    let env = TestEnv::new();

    let output = env.run(&["--help"]);
    assert_eq!(output.status.code(), Some(0));
    for command in ["run", "preview", "check", "rate", "config", "completions"] {
        assert!(stdout(&output).contains(command), "help lacks {}", command);
    }
}
