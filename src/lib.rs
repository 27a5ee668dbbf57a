use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{info, warn};

use crate::checks::{algorithm_check, compile_check, readme_check, screenshot_check};
use crate::config::{Cli, GradeConfig};
use crate::fixtures::Algorithm;
use crate::pipeline::{Context, Pipeline};
use crate::report::{write_report, OutputMode};
use crate::rubric::Rubric;

pub mod checks;
pub mod config;
pub mod fixtures;
pub mod logging;
pub mod pipeline;
pub mod report;
pub mod rubric;
pub mod runner;
pub mod runner_file_utils;

/// The full rubric, in grading order.
pub fn default_pipeline(config: &GradeConfig) -> Pipeline<'static> {
    let pipeline = Pipeline::new()
        .then(compile_check(config.build.clone()))
        .then(screenshot_check())
        .then(readme_check());

    Algorithm::ALL
        .into_iter()
        .fold(pipeline, |pipeline, algorithm| {
            pipeline.then(algorithm_check(algorithm, config.timeout))
        })
}

/// Grades the submission in `src_dir`. Individual check failures are scored,
/// never returned.
pub fn grade(src_dir: &Path, config: &GradeConfig) -> Rubric {
    let mut ctx = Context::new(src_dir);
    default_pipeline(config).execute(&mut ctx)
}

/// Absolute form of `path` when it can be resolved. An unresolvable path is
/// kept as given so the compile check fails on it and the rubric still prints.
pub fn resolve_dir(path: &Path) -> PathBuf {
    match path.canonicalize() {
        Ok(dir) => dir,
        Err(e) => {
            warn!(dir = %path.display(), err = %e, "cannot resolve submission directory");
            path.to_path_buf()
        }
    }
}

pub fn run(cli: &Cli) -> Result<()> {
    let src_dir = resolve_dir(&cli.path);
    info!(dir = %src_dir.display(), "grading submission");

    let rubric = grade(&src_dir, &GradeConfig::from(cli));
    write_report(&mut io::stdout().lock(), OutputMode::from(cli), &rubric)
}

pub fn pause_for_input(w: &mut impl Write, r: impl BufRead) {
    let _ = write!(w, "press any key to continue...");
    let _ = w.flush();
    let _ = r.lines().next();
}
