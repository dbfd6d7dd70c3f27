//! Git subprocess backend.
//!
//! Every operation shells out to the `git` binary found on `PATH`. Repository
//! arguments always point at a bare clone and are passed with `--git-dir`.

use std::ffi::OsStr;
use std::path::Path;
use std::process::{Command, Output};

use tracing::debug;

/// `git log` arguments producing the layout the commit parser reads.
const LOG_FORMAT: [&str; 6] = [
    "log",
    "--reverse",
    "--pretty=medium",
    "--no-decorate",
    "--no-show-signature",
    "--no-color",
];

/// Errors raised by git invocations.
#[derive(Debug, thiserror::Error)]
pub enum GitError {
    /// The `git` process could not be started.
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        /// Rendered command line.
        command: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// `git` exited with a non-zero status.
    #[error("`{command}` exited with {status}: {stderr}")]
    CommandFailed {
        /// Rendered command line.
        command: String,
        /// Exit status as reported by the OS.
        status: String,
        /// Trimmed standard error output.
        stderr: String,
    },
}

/// Runs `git` commands, echoing them (and their stderr) at debug level when
/// `debug` is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct Git {
    debug: bool,
}

impl Git {
    /// Creates a backend. With `debug`, executed commands are logged.
    #[must_use]
    pub const fn new(debug: bool) -> Self {
        Self { debug }
    }

    /// `git clone --bare <url> <dest>`.
    pub fn clone_bare(&self, url: &str, dest: &Path) -> Result<(), GitError> {
        self.run([OsStr::new("clone"), OsStr::new("--bare"), OsStr::new(url), dest.as_os_str()])
            .map(drop)
    }

    /// Full history, oldest first, in the medium format, optionally
    /// restricted to `pathspec`.
    ///
    /// The format flags override any `format.pretty`, `log.decorate` or
    /// `log.showSignature` the user has configured.
    pub fn log(&self, repo: &Path, pathspec: Option<&str>) -> Result<Vec<u8>, GitError> {
        let git_dir = git_dir_arg(repo);
        let mut args = vec![git_dir.as_os_str()];
        args.extend(LOG_FORMAT.map(OsStr::new));
        push_pathspec(&mut args, pathspec);
        self.run(args)
    }

    /// Parent hashes of `commit`, in order.
    pub fn parents(&self, repo: &Path, commit: &str) -> Result<Vec<String>, GitError> {
        let git_dir = git_dir_arg(repo);
        let stdout = self.run([
            git_dir.as_os_str(),
            OsStr::new("rev-list"),
            OsStr::new("--parents"),
            OsStr::new("-n"),
            OsStr::new("1"),
            OsStr::new(commit),
        ])?;

        Ok(parse_parent_line(&String::from_utf8_lossy(&stdout)))
    }

    /// Unified diff between two commits, optionally limited to `pathspec`.
    pub fn diff(&self, repo: &Path, buggy: &str, fixed: &str, pathspec: Option<&str>) -> Result<Vec<u8>, GitError> {
        let git_dir = git_dir_arg(repo);
        let mut args = vec![
            git_dir.as_os_str(),
            OsStr::new("diff"),
            OsStr::new("--no-color"),
            OsStr::new(buggy),
            OsStr::new(fixed),
        ];
        push_pathspec(&mut args, pathspec);
        self.run(args)
    }

    fn run<I, S>(&self, args: I) -> Result<Vec<u8>, GitError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut command = Command::new("git");
        command.args(args);
        let rendered = render(&command);

        if self.debug {
            debug!(command = %rendered, "running git");
        }

        let Output { status, stdout, stderr } = command.output().map_err(|source| GitError::Spawn {
            command: rendered.clone(),
            source,
        })?;

        let stderr = String::from_utf8_lossy(&stderr).trim().to_string();
        if self.debug && !stderr.is_empty() {
            debug!(command = %rendered, %stderr, "git stderr");
        }

        if !status.success() {
            return Err(GitError::CommandFailed {
                command: rendered,
                status: status.to_string(),
                stderr,
            });
        }

        Ok(stdout)
    }
}

fn push_pathspec<'a>(args: &mut Vec<&'a OsStr>, pathspec: Option<&'a str>) {
    if let Some(pathspec) = pathspec {
        args.extend([OsStr::new("--"), OsStr::new(pathspec)]);
    }
}

fn git_dir_arg(repo: &Path) -> std::ffi::OsString {
    let mut arg = std::ffi::OsString::from("--git-dir=");
    arg.push(repo.as_os_str());
    arg
}

fn render(command: &Command) -> String {
    std::iter::once(command.get_program())
        .chain(command.get_args())
        .map(OsStr::to_string_lossy)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parses `rev-list --parents` output: the commit followed by its parents.
fn parse_parent_line(output: &str) -> Vec<String> {
    output
        .lines()
        .next()
        .map(|line| line.split_whitespace().skip(1).map(String::from).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parent_line_drops_the_commit_itself() {
        assert_eq!(parse_parent_line("c p1\n"), vec!["p1"]);
        assert_eq!(parse_parent_line("c p1 p2\n"), vec!["p1", "p2"]);
    }

    #[test]
    fn root_commit_has_no_parents() {
        assert!(parse_parent_line("c\n").is_empty());
        assert!(parse_parent_line("").is_empty());
    }

    #[test]
    fn git_dir_argument_is_a_single_token() {
        let arg = git_dir_arg(Path::new("/tmp/repo with space.git"));
        assert_eq!(arg, "--git-dir=/tmp/repo with space.git");
    }

    #[test]
    fn pathspec_is_appended_after_a_separator() {
        let mut args = vec![OsStr::new("diff")];
        push_pathspec(&mut args, Some("core/src"));
        assert_eq!(args, ["diff", "--", "core/src"]);

        let mut args = vec![OsStr::new("diff")];
        push_pathspec(&mut args, None);
        assert_eq!(args, ["diff"]);
    }

    #[test]
    fn log_format_pins_the_medium_layout() {
        assert!(LOG_FORMAT.contains(&"--pretty=medium"));
        assert!(LOG_FORMAT.contains(&"--no-show-signature"));
    }

    #[test]
    fn render_joins_program_and_args() {
        let mut command = Command::new("git");
        command.args(["log", "--reverse"]);
        assert_eq!(render(&command), "git log --reverse");
    }
}
