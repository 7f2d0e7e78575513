//! Subprocess execution with captured, line-mirrored output.

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::thread;

use tracing::debug;

use crate::error::CommandError;

/// Outcome of a completed subprocess.
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// Per-invocation overrides and output hooks.
///
/// Line callbacks receive each output line (without the trailing
/// newline) on the calling thread, in the order the lines arrived.
#[derive(Default)]
pub struct RunOptions<'a> {
    pub cwd: Option<PathBuf>,
    pub env: HashMap<String, String>,
    pub on_stdout_line: Option<&'a dyn Fn(&str)>,
    pub on_stderr_line: Option<&'a dyn Fn(&str)>,
}

enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Runs external commands with an owned working directory and
/// environment.
///
/// The environment is seeded from the parent process and edited through
/// the `env_*` helpers, so a tool can stage PATH changes once and run
/// several commands against them.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    cwd: PathBuf,
    env: HashMap<String, String>,
}

impl CommandRunner {
    pub fn new() -> Self {
        Self {
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            env: std::env::vars().collect(),
        }
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn set_cwd(&mut self, cwd: impl Into<PathBuf>) {
        self.cwd = cwd.into();
    }

    pub fn env(&self) -> &HashMap<String, String> {
        &self.env
    }

    pub fn env_var(&self, key: &str) -> Option<&str> {
        self.env.get(key).map(String::as_str)
    }

    pub fn env_var_set(&mut self, key: &str, value: &str) {
        self.env.insert(key.to_string(), value.to_string());
    }

    pub fn env_var_remove(&mut self, key: &str) {
        self.env.remove(key);
    }

    /// Append `entry` to a path-list variable (PATH and friends), using
    /// the platform separator. Creates the variable when absent.
    pub fn env_path_append(&mut self, key: &str, entry: &str) {
        let joined = match self.env.get(key) {
            Some(existing) if !existing.is_empty() => {
                format!("{existing}{}{entry}", path_separator())
            }
            _ => entry.to_string(),
        };
        self.env.insert(key.to_string(), joined);
    }

    /// Prepend `entry` to a path-list variable.
    pub fn env_path_prepend(&mut self, key: &str, entry: &str) {
        let joined = match self.env.get(key) {
            Some(existing) if !existing.is_empty() => {
                format!("{entry}{}{existing}", path_separator())
            }
            _ => entry.to_string(),
        };
        self.env.insert(key.to_string(), joined);
    }

    /// Run `argv` directly (no shell interpretation).
    pub fn run(&self, argv: &[&str]) -> Result<CommandResult, CommandError> {
        self.run_with(argv, &RunOptions::default())
    }

    /// Run a single command line through the platform shell
    /// (`sh -c` / `cmd /C`).
    pub fn run_shell(&self, line: &str) -> Result<CommandResult, CommandError> {
        self.run_shell_with(line, &RunOptions::default())
    }

    pub fn run_shell_with(
        &self,
        line: &str,
        options: &RunOptions<'_>,
    ) -> Result<CommandResult, CommandError> {
        let argv: Vec<&str> = if cfg!(windows) {
            vec!["cmd", "/C", line]
        } else {
            vec!["sh", "-c", line]
        };
        self.run_with(&argv, options)
    }

    /// Run `argv` with per-invocation overrides and line callbacks.
    ///
    /// Both pipes are drained by dedicated threads feeding a channel, so
    /// a child that fills one pipe while the other is being read cannot
    /// deadlock. Callbacks run here, on the calling thread, as lines
    /// arrive.
    pub fn run_with(
        &self,
        argv: &[&str],
        options: &RunOptions<'_>,
    ) -> Result<CommandResult, CommandError> {
        let (program, args) = argv.split_first().ok_or(CommandError::EmptyCommand)?;
        debug!(command = %argv.join(" "), "running subprocess");

        let mut command = Command::new(program);
        command
            .args(args)
            .current_dir(options.cwd.as_deref().unwrap_or(&self.cwd))
            .env_clear()
            .envs(&self.env)
            .envs(&options.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = command.spawn()?;
        let (sender, receiver) = mpsc::channel::<OutputLine>();

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let stdout_drain = stdout.map(|pipe| spawn_drain(pipe, sender.clone(), OutputLine::Stdout));
        let stderr_drain = stderr.map(|pipe| spawn_drain(pipe, sender, OutputLine::Stderr));

        let mut captured_stdout = String::new();
        let mut captured_stderr = String::new();
        for line in receiver {
            match line {
                OutputLine::Stdout(text) => {
                    if let Some(callback) = options.on_stdout_line {
                        callback(&text);
                    }
                    captured_stdout.push_str(&text);
                    captured_stdout.push('\n');
                }
                OutputLine::Stderr(text) => {
                    if let Some(callback) = options.on_stderr_line {
                        callback(&text);
                    }
                    captured_stderr.push_str(&text);
                    captured_stderr.push('\n');
                }
            }
        }

        for drain in [stdout_drain, stderr_drain].into_iter().flatten() {
            let _ = drain.join();
        }
        let status = child.wait()?;

        Ok(CommandResult {
            exit_code: status.code().unwrap_or(-1),
            stdout: captured_stdout,
            stderr: captured_stderr,
        })
    }
}

impl Default for CommandRunner {
    fn default() -> Self {
        Self::new()
    }
}

fn path_separator() -> char {
    if cfg!(windows) { ';' } else { ':' }
}

fn spawn_drain<R, F>(
    pipe: R,
    sender: mpsc::Sender<OutputLine>,
    wrap: F,
) -> thread::JoinHandle<()>
where
    R: Read + Send + 'static,
    F: Fn(String) -> OutputLine + Send + 'static,
{
    thread::spawn(move || {
        let reader = BufReader::new(pipe);
        for line in reader.lines() {
            let Ok(line) = line else { break };
            if sender.send(wrap(line)).is_err() {
                break;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn empty_command_is_rejected() {
        let runner = CommandRunner::new();
        assert!(matches!(runner.run(&[]), Err(CommandError::EmptyCommand)));
    }

    #[test]
    fn missing_program_surfaces_an_io_error() {
        let runner = CommandRunner::new();
        assert!(matches!(
            runner.run(&["plugkit-no-such-program"]),
            Err(CommandError::Io(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn captures_stdout_and_exit_code() {
        let runner = CommandRunner::new();
        let result = runner.run_shell("echo hello").unwrap();
        assert_eq!(result.exit_code, 0);
        assert_eq!(result.stdout, "hello\n");
        assert_eq!(result.stderr, "");
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_exit_codes_are_reported_not_errored() {
        let runner = CommandRunner::new();
        let result = runner.run_shell("exit 3").unwrap();
        assert_eq!(result.exit_code, 3);
    }

    #[cfg(unix)]
    #[test]
    fn line_callbacks_run_in_order_on_the_calling_thread() {
        let runner = CommandRunner::new();
        let lines: RefCell<Vec<String>> = RefCell::new(Vec::new());
        let collect = |line: &str| lines.borrow_mut().push(line.to_string());
        let options = RunOptions {
            on_stdout_line: Some(&collect),
            ..RunOptions::default()
        };
        let result = runner
            .run_shell_with("printf 'one\\ntwo\\nthree\\n'", &options)
            .unwrap();
        assert_eq!(result.exit_code, 0);
        assert_eq!(*lines.borrow(), vec!["one", "two", "three"]);
    }

    #[cfg(unix)]
    #[test]
    fn stderr_is_captured_separately() {
        let runner = CommandRunner::new();
        let result = runner.run_shell("echo out; echo err >&2").unwrap();
        assert_eq!(result.stdout, "out\n");
        assert_eq!(result.stderr, "err\n");
    }

    #[cfg(unix)]
    #[test]
    fn env_vars_reach_the_child() {
        let mut runner = CommandRunner::new();
        runner.env_var_set("PLUGKIT_TEST_VALUE", "marker");
        let result = runner.run_shell("echo $PLUGKIT_TEST_VALUE").unwrap();
        assert_eq!(result.stdout, "marker\n");

        runner.env_var_remove("PLUGKIT_TEST_VALUE");
        let result = runner.run_shell("echo ${PLUGKIT_TEST_VALUE:-gone}").unwrap();
        assert_eq!(result.stdout, "gone\n");
    }

    #[test]
    fn path_helpers_join_with_the_platform_separator() {
        let mut runner = CommandRunner::new();
        runner.env_var_remove("PLUGKIT_TEST_PATH");
        runner.env_path_append("PLUGKIT_TEST_PATH", "/a");
        runner.env_path_append("PLUGKIT_TEST_PATH", "/b");
        runner.env_path_prepend("PLUGKIT_TEST_PATH", "/z");

        let sep = super::path_separator();
        assert_eq!(
            runner.env_var("PLUGKIT_TEST_PATH"),
            Some(format!("/z{sep}/a{sep}/b").as_str())
        );
    }

    #[cfg(unix)]
    #[test]
    fn per_invocation_cwd_override() {
        let temp = tempfile::tempdir().unwrap();
        let runner = CommandRunner::new();
        let options = RunOptions {
            cwd: Some(temp.path().to_path_buf()),
            ..RunOptions::default()
        };
        let result = runner.run_shell_with("pwd", &options).unwrap();
        let reported = result.stdout.trim();
        assert_eq!(
            std::fs::canonicalize(reported).unwrap(),
            std::fs::canonicalize(temp.path()).unwrap()
        );
    }
}
