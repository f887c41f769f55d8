use alloc::sync::Arc;
use std::path::Path;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::discover;
use crate::logger::Log;

// Bounded parallelism for directory runs; each worker owns one file
// at a time.
const WORKER_COUNT: usize = 10;

/// A per-file failure, rendered in the fixed envelope the logger
/// prints for every failing file.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("an error occurred with file \"{file}\" : {message}")]
pub struct ProcessFileError {
    pub file: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Replace,
    Check,
}

/// Applies the formatting pipeline to a file or to every `.feature`
/// file under a directory, reporting each outcome through the
/// logger.
pub struct FileManager<'a> {
    indent: usize,
    logger: &'a dyn Log,
}

impl<'a> FileManager<'a> {
    pub fn new(indent: usize, logger: &'a dyn Log) -> Self {
        Self { indent, logger }
    }

    /// Format the target in place. Returns `true` when any file
    /// failed.
    pub async fn format_and_replace(&self, path: &str) -> bool {
        self.process(path, Mode::Replace).await
    }

    /// Compare the target against its canonical form. Returns
    /// `true` when any file mismatched or failed.
    pub async fn check(&self, path: &str) -> bool {
        self.process(path, Mode::Check).await
    }

    async fn process(&self, path: &str, mode: Mode) -> bool {
        let metadata = match tokio::fs::metadata(path).await {
            Ok(metadata) => metadata,
            Err(e) => {
                self.logger.error(&format!("stat {path}: {e}"));
                return true;
            }
        };

        if metadata.is_dir() {
            return self.process_dir(path, mode).await;
        }

        match process_file(path.to_string(), self.indent, mode).await {
            Ok(line) => {
                self.logger.success(&line);
                false
            }
            Err(e) => {
                self.logger.error(&e);
                true
            }
        }
    }

    async fn process_dir(&self, path: &str, mode: Mode) -> bool {
        let files = match discover::find_feature_files(Path::new(path)) {
            Ok(files) => files,
            Err(e) => {
                self.logger.error(&format!("{e:#}"));
                return true;
            }
        };
        if files.is_empty() {
            return false;
        }

        let semaphore = Arc::new(Semaphore::new(WORKER_COUNT));
        let mut workers = JoinSet::new();
        for file in files {
            let semaphore = Arc::clone(&semaphore);
            let indent = self.indent;
            workers.spawn(async move {
                let _permit = semaphore.acquire().await.expect("semaphore closed");
                process_file(file.display().to_string(), indent, mode).await
            });
        }

        // Workers never touch the logger; results are reported here
        // once each worker finishes. Completion order is arbitrary.
        let mut had_errors = false;
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(Ok(line)) => self.logger.success(&line),
                Ok(Err(e)) => {
                    had_errors = true;
                    self.logger.error(&e);
                }
                Err(e) => {
                    had_errors = true;
                    self.logger.error(&format!("worker failed: {e}"));
                }
            }
        }
        had_errors
    }
}

async fn process_file(
    path: String,
    indent: usize,
    mode: Mode,
) -> Result<String, ProcessFileError> {
    let envelope = |message: String| ProcessFileError {
        file: path.clone(),
        message,
    };

    let original = tokio::fs::read(&path)
        .await
        .map_err(|e| envelope(e.to_string()))?;
    let canonical = crate::format_bytes(&original, indent).map_err(|e| envelope(e.to_string()))?;

    match mode {
        Mode::Replace => {
            tokio::fs::write(&path, &canonical)
                .await
                .map_err(|e| envelope(e.to_string()))?;
            Ok(format!("formatted: {path}"))
        }
        Mode::Check => {
            if canonical == original {
                Ok(format!("checked: {path}"))
            } else {
                Err(envelope("file is not properly formatted".to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::logger::BufferLog;

    const UNFORMATTED: &str = "Feature: test\n  test\n\nScenario:            scenario1\n  Given       whatever\n  Then                  whatever\n\"\"\"\nhello world\n\"\"\"\n";
    const FORMATTED: &str = "Feature: test\n  test\n\n  Scenario: scenario1\n    Given whatever\n    Then whatever\n      \"\"\"\n      hello world\n      \"\"\"\n";

    #[tokio::test]
    async fn format_rewrites_a_single_file() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("file1.feature");
        fs::write(&file, UNFORMATTED).unwrap();

        let log = BufferLog::new();
        let manager = FileManager::new(2, &log);
        let had_errors = manager.format_and_replace(file.to_str().unwrap()).await;

        assert!(!had_errors);
        assert_eq!(fs::read_to_string(&file).unwrap(), FORMATTED);
        assert_eq!(log.lines(), vec![format!("formatted: {}", file.display())]);
    }

    #[tokio::test]
    async fn check_reports_the_mismatch_envelope() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("file1.feature");
        fs::write(&file, UNFORMATTED).unwrap();

        let log = BufferLog::new();
        let manager = FileManager::new(2, &log);
        let had_errors = manager.check(file.to_str().unwrap()).await;

        assert!(had_errors);
        assert_eq!(
            log.lines(),
            vec![format!(
                "an error occurred with file \"{}\" : file is not properly formatted",
                file.display()
            )]
        );
        // Check never writes.
        assert_eq!(fs::read_to_string(&file).unwrap(), UNFORMATTED);
    }

    #[tokio::test]
    async fn check_passes_a_canonical_file() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("file1.feature");
        fs::write(&file, FORMATTED).unwrap();

        let log = BufferLog::new();
        let manager = FileManager::new(2, &log);
        assert!(!manager.check(file.to_str().unwrap()).await);
        assert_eq!(log.lines(), vec![format!("checked: {}", file.display())]);
    }

    #[tokio::test]
    async fn directory_runs_isolate_failures_per_file() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("nested");
        fs::create_dir_all(&nested).unwrap();
        fs::write(tmp.path().join("good.feature"), FORMATTED).unwrap();
        fs::write(nested.join("bad.feature"), UNFORMATTED).unwrap();
        fs::write(
            nested.join("broken.feature"),
            format!("whatever{UNFORMATTED}"),
        )
        .unwrap();

        let log = BufferLog::new();
        let manager = FileManager::new(2, &log);
        let had_errors = manager.check(tmp.path().to_str().unwrap()).await;

        assert!(had_errors);
        let lines = log.lines();
        assert_eq!(lines.len(), 3);

        let bad = nested.join("bad.feature");
        let broken = nested.join("broken.feature");
        assert!(lines.contains(&format!(
            "an error occurred with file \"{}\" : file is not properly formatted",
            bad.display()
        )));
        assert!(lines.iter().any(|l| {
            l.starts_with(&format!(
                "an error occurred with file \"{}\" : Parser errors:",
                broken.display()
            )) && l.contains(
                "(1:1): expected: #EOF, #Language, #TagLine, #FeatureLine, #Comment, #Empty, \
                 got 'whateverFeature: test'",
            )
        }));
        assert!(
            lines
                .iter()
                .any(|l| l.starts_with("checked: ") && l.ends_with("good.feature"))
        );
    }

    #[tokio::test]
    async fn directory_format_rewrites_every_file() {
        let tmp = tempfile::tempdir().unwrap();
        for name in ["a.feature", "b.feature", "c.feature"] {
            fs::write(tmp.path().join(name), UNFORMATTED).unwrap();
        }

        let log = BufferLog::new();
        let manager = FileManager::new(2, &log);
        assert!(!manager.format_and_replace(tmp.path().to_str().unwrap()).await);

        for name in ["a.feature", "b.feature", "c.feature"] {
            assert_eq!(
                fs::read_to_string(tmp.path().join(name)).unwrap(),
                FORMATTED
            );
        }
        assert_eq!(log.lines().len(), 3);
    }

    #[tokio::test]
    async fn empty_directory_is_a_clean_run() {
        let tmp = tempfile::tempdir().unwrap();
        let log = BufferLog::new();
        let manager = FileManager::new(2, &log);
        assert!(!manager.check(tmp.path().to_str().unwrap()).await);
        assert!(log.lines().is_empty());
    }

    #[tokio::test]
    async fn missing_path_reports_the_stat_failure() {
        let log = BufferLog::new();
        let manager = FileManager::new(2, &log);
        assert!(manager.check("whatever/whatever").await);
        let lines = log.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("stat whatever/whatever: "));
    }
}
