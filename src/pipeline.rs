use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, error};

use crate::rubric::{Rubric, RubricItem};
use crate::runner_file_utils::remove_best_effort;

/// State shared by every check in one grading run.
///
/// `binary` stays `None` until the compile check succeeds.
#[derive(Debug)]
pub struct Context {
    src_dir: PathBuf,
    binary: Option<PathBuf>,
}

impl Context {
    pub fn new(src_dir: impl Into<PathBuf>) -> Self {
        Self {
            src_dir: src_dir.into(),
            binary: None,
        }
    }

    pub fn src_dir(&self) -> &Path {
        &self.src_dir
    }

    pub fn binary(&self) -> Option<&Path> {
        self.binary.as_deref()
    }

    pub fn set_binary(&mut self, path: PathBuf) {
        self.binary = Some(path);
    }

    fn take_binary(&mut self) -> Option<PathBuf> {
        self.binary.take()
    }
}

#[derive(Error, Debug)]
pub enum CheckError {
    #[error("binary not found")]
    BinaryMissing,
    #[error("{program} not found in PATH")]
    ToolchainNotFound { program: String },
    #[error("build exited with {status}")]
    BuildFailed { status: String },
    #[error("failed to start process: {0}")]
    Spawn(#[source] io::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("{flag} scheduler exited with {status}")]
    SchedulerFailed { flag: String, status: String },
    #[error("{flag} scheduler did not finish within {limit:?}")]
    TimedOut { flag: String, limit: Duration },
    #[error("{flag} output does not match expected (first difference at byte {offset})")]
    OutputMismatch { flag: String, offset: usize },
    #[error("{name} not found")]
    ArtifactMissing {
        name: String,
        #[source]
        source: io::Error,
    },
}

/// A scored rubric line together with the error that zeroed it.
#[derive(Error, Debug)]
#[error("{}: {source}", .item.label())]
pub struct CheckFailure {
    pub item: RubricItem,
    #[source]
    pub source: CheckError,
}

impl CheckFailure {
    pub fn new(item: RubricItem, source: CheckError) -> Self {
        Self { item, source }
    }
}

pub type CheckResult = Result<RubricItem, CheckFailure>;

/// One unit of verification.
///
/// `Ok` with zero points means the check was graded and failed without an
/// error worth reporting; `Err` carries both the score and the cause.
pub trait Check {
    fn run(&self, ctx: &mut Context) -> CheckResult;
}

impl<F> Check for F
where
    F: Fn(&mut Context) -> CheckResult,
{
    fn run(&self, ctx: &mut Context) -> CheckResult {
        self(ctx)
    }
}

/// Ordered list of checks run against a single [`Context`].
#[derive(Default)]
pub struct Pipeline<'a> {
    checks: Vec<Box<dyn Check + 'a>>,
}

impl<'a> Pipeline<'a> {
    pub fn new() -> Self {
        Self { checks: Vec::new() }
    }

    pub fn then(mut self, check: impl Check + 'a) -> Self {
        self.checks.push(Box::new(check));
        self
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Runs every check in order, keeping each result even when it failed,
    /// then removes the compiled binary.
    pub fn execute(&self, ctx: &mut Context) -> Rubric {
        let mut rubric = Rubric::default();

        for check in &self.checks {
            let item = match check.run(ctx) {
                Ok(item) => item,
                Err(CheckFailure { item, source }) => {
                    error!(label = item.label(), err = %source, "check failed");
                    item
                }
            };
            rubric.push(item);
        }

        if let Some(binary) = ctx.take_binary() {
            debug!(path = %binary.display(), "removing compiled binary");
            remove_best_effort(&binary);
        }

        rubric
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passing(label: &'static str, points: u32) -> impl Fn(&mut Context) -> CheckResult {
        move |_ctx: &mut Context| {
            let mut item = RubricItem::new(label, points);
            item.award_full();
            Ok(item)
        }
    }

    fn failing(label: &'static str, points: u32) -> impl Fn(&mut Context) -> CheckResult {
        move |_ctx: &mut Context| {
            let mut item = RubricItem::new(label, points);
            item.set_message("broken");
            Err(CheckFailure::new(item, CheckError::BinaryMissing))
        }
    }

    #[test]
    fn keeps_every_result_in_order() {
        let pipeline = Pipeline::new()
            .then(failing("first", 10))
            .then(passing("second", 20))
            .then(failing("third", 5))
            .then(passing("fourth", 1));

        let rubric = pipeline.execute(&mut Context::new("."));

        let labels: Vec<_> = rubric.items().iter().map(RubricItem::label).collect();
        assert_eq!(labels, ["first", "second", "third", "fourth"]);
        assert_eq!(rubric.len(), pipeline.len());
        assert_eq!(rubric.awarded(), 21);
        assert_eq!(rubric.possible(), 36);
        assert_eq!(rubric.items()[0].message(), "broken");
    }

    #[test]
    fn empty_pipeline_yields_empty_rubric() {
        let rubric = Pipeline::new().execute(&mut Context::new("."));
        assert!(rubric.is_empty());
    }

    #[test]
    fn later_checks_see_earlier_context_changes() {
        let pipeline = Pipeline::new()
            .then(|ctx: &mut Context| -> CheckResult {
                ctx.set_binary(PathBuf::from("/nonexistent/gradebot-test.bin"));
                Ok(RubricItem::new("producer", 1))
            })
            .then(|ctx: &mut Context| -> CheckResult {
                let mut item = RubricItem::new("consumer", 1);
                if ctx.binary().is_some() {
                    item.award_full();
                }
                Ok(item)
            });

        let mut ctx = Context::new(".");
        let rubric = pipeline.execute(&mut ctx);

        assert_eq!(rubric.items()[1].awarded(), 1);
        assert!(ctx.binary().is_none(), "binary is cleared after cleanup");
    }
}
