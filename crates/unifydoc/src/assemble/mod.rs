//! Document assembly - turning an ordered file list into one PDF
//!
//! This module orchestrates a run:
//! 1. Check for cancellation
//! 2. Classify each path and render it with the renderer for its kind
//! 3. Check for cancellation again
//! 4. Seal the document and write it to the output path

mod flow;
mod io;

pub(crate) use flow::PageFlow;
pub use io::save_pdf;

use crate::classify::{Classifier, InputFile};
use crate::layout::Document;
use crate::options::{ClassifyOptions, RenderSettings};
use crate::render::renderer_for;
use crate::types::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cancellation flag owned by the caller, polled at the run's checkpoints
pub trait CancelCheck {
    fn is_cancelled(&self) -> bool;
}

impl<F: Fn() -> bool> CancelCheck for F {
    fn is_cancelled(&self) -> bool {
        self()
    }
}

impl CancelCheck for AtomicBool {
    fn is_cancelled(&self) -> bool {
        self.load(Ordering::SeqCst)
    }
}

/// A built, not yet written, document with its per-file report
pub struct Assembly {
    pub document: Document,
    pub files: Vec<FileReport>,
}

/// Pagination engine for one settings record
#[derive(Debug, Clone)]
pub struct Assembler {
    settings: RenderSettings,
    classifier: Classifier,
}

impl Assembler {
    pub fn new(settings: RenderSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            settings,
            classifier: Classifier::default(),
        })
    }

    pub fn with_classifier(mut self, options: ClassifyOptions) -> Self {
        self.classifier = Classifier::new(options);
        self
    }

    /// Render every path, in order, into a new document.
    ///
    /// Per-file failures are logged and reported; they never stop the run.
    pub fn build(&self, paths: &[impl AsRef<Path>]) -> Assembly {
        let (width, height) = self.settings.page_dimensions();
        let mut document = Document::new(width, height);
        let mut files = Vec::with_capacity(paths.len());

        for path in paths {
            let input = self.classifier.input_file(path.as_ref());
            let status = self.render_file(&mut document, &input);
            files.push(FileReport {
                path: input.path,
                status,
            });
        }

        Assembly { document, files }
    }

    fn render_file(&self, document: &mut Document, input: &InputFile) -> FileStatus {
        let kind = match input.classification {
            Classification::Render(kind) => kind,
            Classification::Skip(reason) => {
                log::debug!("Skipping {} ({})", input.path.display(), reason);
                return FileStatus::Skipped(reason);
            }
        };

        let mark = document.page_count();
        let mut flow = PageFlow::new(document, &self.settings, input);
        let result = renderer_for(kind).render(input, &mut flow);

        match result {
            Ok(()) => FileStatus::Rendered {
                pages: document.page_count() - mark,
            },
            Err(e) => {
                log::warn!("Error processing {}: {}", input.path.display(), e);
                document.truncate(mark);
                FileStatus::Failed(e.to_string())
            }
        }
    }

    /// Build the document and write it to `output`.
    ///
    /// `cancel` is consulted before generation starts and right before the
    /// file is written; a cancelled run writes nothing.
    pub fn run(
        &self,
        paths: &[impl AsRef<Path>],
        output: &Path,
        cancel: &dyn CancelCheck,
    ) -> Result<RunOutcome> {
        if cancel.is_cancelled() {
            log::info!("Run cancelled before generation");
            return Ok(RunOutcome::Cancelled);
        }

        log::info!("Assembling {} files into {}", paths.len(), output.display());
        let Assembly { document, files } = self.build(paths);
        let page_count = document.page_count();
        let pdf = document.seal()?;

        if cancel.is_cancelled() {
            log::info!("Run cancelled before save");
            return Ok(RunOutcome::Cancelled);
        }

        save_pdf(pdf, output)?;

        let report = RunReport {
            output: output.to_path_buf(),
            page_count,
            files,
        };
        log::info!(
            "Wrote {} pages from {} files ({} failed) to {}",
            report.page_count,
            report.rendered_count(),
            report.failed_count(),
            output.display()
        );
        Ok(RunOutcome::Completed(report))
    }
}

/// Run an assembly on the blocking pool.
///
/// Setting `cancel` marks the run cancelled; it takes effect at the next
/// checkpoint.
pub async fn assemble(
    paths: Vec<PathBuf>,
    settings: RenderSettings,
    classify: ClassifyOptions,
    output: PathBuf,
    cancel: Arc<AtomicBool>,
) -> Result<RunOutcome> {
    let assembler = Assembler::new(settings)?.with_classifier(classify);

    tokio::task::spawn_blocking(move || assembler.run(&paths, &output, &*cancel)).await?
}
