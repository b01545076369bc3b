use std::fs;
use std::path::Path;

use chrono::NaiveDateTime;
use indicatif::{ProgressBar, ProgressStyle};

use crate::date::{Extraction, ExtractorSet, EXIF_DATETIME_FORMAT};
use crate::exif_writer;

/// Per-outcome counters for one batch run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub patched: usize,
    pub skipped_existing: usize,
    pub skipped_not_file: usize,
    pub no_date: usize,
    pub invalid_date: usize,
    pub failed: usize,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.patched
            + self.skipped_existing
            + self.skipped_not_file
            + self.no_date
            + self.invalid_date
            + self.failed
    }
}

/// Run every entry of `source_dir` through the extract-then-patch pipeline,
/// writing patched copies into `output_dir` (created if absent). One file
/// finishes or fails before the next starts, and a single file's failure
/// never stops the batch. Files already present in `output_dir` are
/// skipped, so re-running over a partial output resumes where it left off.
pub fn process_directory(
    source_dir: &Path,
    output_dir: &Path,
    extractors: &ExtractorSet,
) -> anyhow::Result<BatchReport> {
    fs::create_dir_all(output_dir)?;

    // Lexicographic order keeps output and diagnostics reproducible.
    let mut entries: Vec<fs::DirEntry> = fs::read_dir(source_dir)?.collect::<Result<_, _>>()?;
    entries.sort_by_key(|e| e.file_name());

    let pb = ProgressBar::new(entries.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{bar:40}] {pos}/{len} patching files")
            .unwrap(),
    );

    let mut report = BatchReport::default();

    for entry in &entries {
        let filename = entry.file_name().to_string_lossy().into_owned();

        let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
        if !is_file {
            report.skipped_not_file += 1;
            pb.println(format!("skipped (not a regular file): {filename}"));
            pb.inc(1);
            continue;
        }

        let dest = output_dir.join(entry.file_name());
        if dest.exists() {
            report.skipped_existing += 1;
            pb.println(format!("skipped (already in output): {filename}"));
            pb.inc(1);
            continue;
        }

        match extractors.extract(&filename) {
            Extraction::NoMatch => {
                report.no_date += 1;
                pb.println(format!("no date pattern: {filename}"));
            }
            Extraction::Invalid(detail) => {
                report.invalid_date += 1;
                pb.println(format!("invalid date in name: {filename} ({detail})"));
            }
            Extraction::Dated(taken) => {
                match exif_writer::patch_file(&entry.path(), &dest, taken) {
                    Ok(()) => {
                        report.patched += 1;
                        set_capture_mtime(&dest, taken);
                        pb.println(format!(
                            "patched: {filename} -> {}",
                            taken.format(EXIF_DATETIME_FORMAT)
                        ));
                    }
                    Err(e) => {
                        report.failed += 1;
                        pb.println(format!("error: {e}"));
                    }
                }
            }
        }
        pb.inc(1);
    }

    pb.finish_and_clear();
    Ok(report)
}

/// Mirror the derived timestamp onto the output's file clock, best effort.
fn set_capture_mtime(dest: &Path, taken: NaiveDateTime) {
    // The derived timestamp is local wall time; mtime wants a UTC epoch.
    if let Some(local) = taken.and_local_timezone(chrono::Local).single() {
        let ft = filetime::FileTime::from_unix_time(local.timestamp(), 0);
        filetime::set_file_mtime(dest, ft).ok();
    }
}
