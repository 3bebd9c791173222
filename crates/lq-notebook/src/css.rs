//! Notebook CSS scoping.
//!
//! Notebook stylesheets are wrapped in a `div#<id> { ... }` rule and compiled
//! with an external LESS compiler, which prefixes every selector with the
//! wrapper. This keeps notebook styles from leaking into the page theme.

use std::io::{self, Write};
use std::process::{Command, Stdio};
use std::thread;

use lq_renderer::TagError;

/// Default LESS compiler executable.
pub const DEFAULT_COMPILER: &str = "lessc";

/// Default id of the element wrapping notebook HTML.
pub const DEFAULT_WRAPPER_ID: &str = "nb-wrapper";

/// Arguments of the first attempt.
const ARGS_CLEAN: &[&str] = &["-", "--clean-css"];

/// Arguments of the retry, without the optional clean-css plugin.
const ARGS_PLAIN: &[&str] = &["-"];

/// Captured result of an external command.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// The command exited with status zero.
    pub success: bool,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

/// Runs external commands with text on standard input.
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args`, writing `input` to its standard input.
    fn run(&self, program: &str, args: &[&str], input: &str) -> io::Result<CommandOutput>;
}

/// [`CommandRunner`] that spawns real processes.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[&str], input: &str) -> io::Result<CommandOutput> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| io::Error::other("child process has no stdin"))?;
        let input = input.to_owned();
        // Feed stdin from another thread so a full stdout pipe cannot deadlock us.
        let writer = thread::spawn(move || stdin.write_all(input.as_bytes()));

        let output = child.wait_with_output()?;

        match writer.join() {
            Ok(Err(err)) if err.kind() != io::ErrorKind::BrokenPipe => return Err(err),
            Err(_) => return Err(io::Error::other("stdin writer thread panicked")),
            _ => {}
        }

        Ok(CommandOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Outcome of a single compiler invocation.
enum Attempt {
    Compiled(String),
    Empty,
    Failed(String),
}

/// LESS compiler invoked as a subprocess.
///
/// The compiler is first run as `<tool> - --clean-css`. If that exits with a
/// failure (or cannot be started) it is run once more as `<tool> -`. Empty
/// output is treated as a failure and is not retried.
pub struct CssCompiler {
    tool: String,
    runner: Box<dyn CommandRunner>,
}

impl CssCompiler {
    /// Create a compiler that runs `tool` as a real process.
    #[must_use]
    pub fn new(tool: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            runner: Box::new(SystemRunner),
        }
    }

    /// Replace the process runner.
    #[must_use]
    pub fn with_runner(mut self, runner: impl CommandRunner + 'static) -> Self {
        self.runner = Box::new(runner);
        self
    }

    /// Compiler executable name.
    #[must_use]
    pub fn tool(&self) -> &str {
        &self.tool
    }

    /// Compile LESS `source` to CSS.
    pub fn compile(&self, source: &str) -> Result<String, TagError> {
        let outcome = match self.attempt(ARGS_CLEAN, source) {
            Attempt::Failed(detail) => {
                tracing::debug!(
                    tool = %self.tool,
                    %detail,
                    "CSS compiler failed, retrying without --clean-css"
                );
                self.attempt(ARGS_PLAIN, source)
            }
            outcome => outcome,
        };

        match outcome {
            Attempt::Compiled(css) => Ok(css),
            Attempt::Empty => Err(self.failure("compiler produced no output".to_owned())),
            Attempt::Failed(detail) => Err(self.failure(detail)),
        }
    }

    fn attempt(&self, args: &[&str], source: &str) -> Attempt {
        tracing::debug!(tool = %self.tool, ?args, "Running CSS compiler");
        match self.runner.run(&self.tool, args, source) {
            Ok(output) if !output.success => {
                let stderr = output.stderr.trim();
                if stderr.is_empty() {
                    Attempt::Failed("exited with a failure status".to_owned())
                } else {
                    Attempt::Failed(format!("exited with a failure status: {stderr}"))
                }
            }
            Ok(output) if output.stdout.is_empty() => Attempt::Empty,
            Ok(output) => Attempt::Compiled(output.stdout),
            Err(err) => Attempt::Failed(format!("could not be started: {err}")),
        }
    }

    fn failure(&self, detail: String) -> TagError {
        TagError::CssCompilationFailed {
            tool: self.tool.clone(),
            detail,
        }
    }
}

impl Default for CssCompiler {
    fn default() -> Self {
        Self::new(DEFAULT_COMPILER)
    }
}

impl std::fmt::Debug for CssCompiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CssCompiler")
            .field("tool", &self.tool)
            .finish_non_exhaustive()
    }
}

/// Wrap stylesheets in a LESS rule scoped to `div#<wrapper_id>`.
///
/// ```
/// use lq_notebook::scope_css;
///
/// let less = scope_css("nb", &["p { margin: 0 }".to_owned(), "h1 { }".to_owned()]);
/// assert_eq!(less, "div#nb { p { margin: 0 }\nh1 { } }");
/// ```
#[must_use]
pub fn scope_css(wrapper_id: &str, sheets: &[String]) -> String {
    format!("div#{wrapper_id} {{ {} }}", sheets.join("\n"))
}

/// Wrap compiled CSS in a `<style>` element.
#[must_use]
pub fn style_block(css: &str) -> String {
    format!("<style type=\"text/css\">\n{css}\n</style>\n")
}
