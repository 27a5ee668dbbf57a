use std::time::Duration;

use colored::Colorize;
use tracing::{debug, warn};

use crate::config::BuildCommand;
use crate::fixtures::{Algorithm, Fixture};
use crate::pipeline::{Check, CheckError, CheckFailure, CheckResult, Context};
use crate::rubric::RubricItem;
use crate::runner::{self, first_difference};
use crate::runner_file_utils::artifact_exists;

pub const NOT_COMPILEABLE: &str = "scheduler was not compileable";

fn fail(mut item: RubricItem, message: &str, source: CheckError) -> CheckResult {
    item.set_message(message);
    Err(CheckFailure::new(item, source))
}

/// Builds the submission and records the binary path in the context.
pub fn compile_check(build: BuildCommand) -> impl Check {
    move |ctx: &mut Context| -> CheckResult {
        let mut item = RubricItem::new("Compilable", 10);

        let binary = match runner::build(ctx.src_dir(), &build) {
            Ok(binary) => binary,
            Err(e @ CheckError::ToolchainNotFound { .. }) => {
                return fail(item, "toolchain not found", e)
            }
            Err(e) => return fail(item, "scheduler is not compileable", e),
        };
        ctx.set_binary(binary);

        item.award_full();
        debug!(pts = item.awarded(), "scheduler is compileable");
        Ok(item)
    }
}

/// Awards points when `name` exists in the submission root. Gated on a
/// successful build even though the binary itself is never used.
pub fn artifact_check(label: &'static str, name: &'static str, possible: u32) -> impl Check {
    move |ctx: &mut Context| -> CheckResult {
        let mut item = RubricItem::new(label, possible);
        if ctx.binary().is_none() {
            return fail(item, NOT_COMPILEABLE, CheckError::BinaryMissing);
        }

        if let Err(source) = artifact_exists(ctx.src_dir(), name) {
            let message = format!("{name} not found");
            let name = name.to_string();
            return fail(item, &message, CheckError::ArtifactMissing { name, source });
        }

        item.award_full();
        debug!(pts = item.awarded(), "{name} exists");
        Ok(item)
    }
}

pub fn screenshot_check() -> impl Check {
    artifact_check("Screenshot exists", "screenshot.png", 10)
}

pub fn readme_check() -> impl Check {
    artifact_check("README.md exists", "README.md", 10)
}

/// Runs the compiled scheduler with `flag`, feeding it the fixture input, and
/// awards the template's points only for byte-identical output.
///
/// Empty output scores zero but is not reported as an error; a crash or a
/// mismatch is.
pub fn scheduler_check(
    template: RubricItem,
    flag: &'static str,
    fixture: Fixture,
    limit: Option<Duration>,
) -> impl Check {
    move |ctx: &mut Context| -> CheckResult {
        let mut item = template.clone();
        let Some(binary) = ctx.binary() else {
            return fail(item, NOT_COMPILEABLE, CheckError::BinaryMissing);
        };

        let actual = match runner::run_scheduler(binary, flag, fixture.input, limit) {
            Ok(actual) => actual,
            Err(e) => return fail(item, "scheduler exited with error", e),
        };

        if actual.is_empty() {
            item.set_message("scheduler ran with no output");
            return Ok(item);
        }

        if let Some(offset) = first_difference(&actual, fixture.expected) {
            dump_mismatch(flag, fixture.expected, &actual);
            let flag = flag.to_string();
            return fail(
                item,
                "output does not match expected",
                CheckError::OutputMismatch { flag, offset },
            );
        }

        item.award_full();
        debug!(pts = item.awarded(), "{flag} scheduler output matches expected");
        Ok(item)
    }
}

pub fn algorithm_check(algorithm: Algorithm, limit: Option<Duration>) -> impl Check {
    scheduler_check(
        RubricItem::new(algorithm.label(), algorithm.possible()),
        algorithm.flag(),
        algorithm.fixture(),
        limit,
    )
}

/// Logged, so it is silenced along with everything else in total-only mode.
fn dump_mismatch(flag: &str, expected: &[u8], actual: &[u8]) {
    warn!(
        "{flag} output mismatch\n{} {}\n{}{} {}\n{}",
        flag,
        "expected:".green(),
        String::from_utf8_lossy(expected),
        flag,
        "actual:".red(),
        String::from_utf8_lossy(actual),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tempdir::TempDir;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn logged_dump(debug: bool, total_only: bool) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(logging::level(debug, total_only))
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            dump_mismatch("-fcfs", b"First-come, first-serve\n", b"wrong\n");
        });

        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn mismatch_dump_goes_to_the_log() {
        let log = logged_dump(false, false);
        assert!(log.contains("-fcfs output mismatch"), "{log}");
        assert!(log.contains("First-come, first-serve"), "{log}");
        assert!(log.contains("wrong"), "{log}");
    }

    #[test]
    fn mismatch_dump_is_silent_in_total_mode() {
        assert_eq!(logged_dump(true, true), "");
    }

    #[test]
    fn artifact_checks_require_a_build() {
        let dir = TempDir::new("gradebot_gate").unwrap();
        std::fs::write(dir.path().join("README.md"), "# hi").unwrap();
        let mut ctx = Context::new(dir.path());

        let failure = readme_check().run(&mut ctx).unwrap_err();
        assert_eq!(failure.item.awarded(), 0);
        assert_eq!(failure.item.message(), NOT_COMPILEABLE);
        assert!(matches!(failure.source, CheckError::BinaryMissing));
    }

    #[test]
    fn artifact_found_after_build() {
        let dir = TempDir::new("gradebot_found").unwrap();
        std::fs::write(dir.path().join("screenshot.png"), [0x89, b'P', b'N', b'G']).unwrap();
        let mut ctx = Context::new(dir.path());
        ctx.set_binary(dir.path().join("scheduler.bin"));

        let item = screenshot_check().run(&mut ctx).unwrap();
        assert_eq!(item.awarded(), 10);
        assert!(item.message().is_empty());
    }

    #[test]
    fn missing_artifact_propagates_io_error() {
        let dir = TempDir::new("gradebot_missing").unwrap();
        let mut ctx = Context::new(dir.path());
        ctx.set_binary(dir.path().join("scheduler.bin"));

        let failure = screenshot_check().run(&mut ctx).unwrap_err();
        assert_eq!(failure.item.awarded(), 0);
        assert_eq!(failure.item.message(), "screenshot.png not found");
        assert!(matches!(failure.source, CheckError::ArtifactMissing { .. }));
    }

    #[test]
    fn scheduler_check_without_binary_spawns_nothing() {
        let mut ctx = Context::new(".");
        for algorithm in Algorithm::ALL {
            let failure = algorithm_check(algorithm, None).run(&mut ctx).unwrap_err();
            assert_eq!(failure.item.label(), algorithm.label());
            assert_eq!(failure.item.possible(), algorithm.possible());
            assert_eq!(failure.item.awarded(), 0);
            assert_eq!(failure.item.message(), NOT_COMPILEABLE);
        }
    }

    #[test]
    fn missing_toolchain_leaves_binary_unset() {
        let build = BuildCommand {
            program: "gradebot-no-such-toolchain".to_string(),
            ..BuildCommand::default()
        };
        let mut ctx = Context::new(".");

        let failure = compile_check(build).run(&mut ctx).unwrap_err();
        assert_eq!(failure.item.message(), "toolchain not found");
        assert_eq!(failure.item.possible(), 10);
        assert!(ctx.binary().is_none());
    }
}
