mod counter;
mod inputs;
mod logger;
mod naming;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use counter::{ConversionCounter, DEFAULT_COUNTER_FILE, JsonFileCounter};
use inputs::{InputGroup, gather_inputs};
use logger::CliLogger;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use unifydoc::{
    ClassifyOptions, FileStatus, FileTree, FolderNode, RenderSettings, RunOutcome,
};

#[derive(Parser)]
#[command(
    name = "unifydoc",
    about = "Combine source files, documents, images and PDFs into one PDF",
    version
)]
struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Also append log lines to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert files, directories and zip archives into a single PDF
    Convert {
        /// Input files, directories or .zip archives, in output order
        #[arg(required = true, num_args = 1..)]
        inputs: Vec<PathBuf>,

        /// Directory the PDF is written to
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Output file name (random UnifyDoc-<hex>.pdf when omitted)
        #[arg(short, long)]
        name: Option<String>,

        /// Settings JSON file; flags below override its values
        #[arg(long)]
        settings: Option<PathBuf>,

        /// Page margin in points
        #[arg(long)]
        margin: Option<f32>,

        /// Note printed at the top of every content page
        #[arg(long)]
        header_note: Option<String>,

        /// Note printed at the bottom of every content page
        #[arg(long)]
        footer_note: Option<String>,

        #[arg(long, value_enum)]
        orientation: Option<OrientationArg>,

        #[arg(long, value_enum)]
        page_size: Option<PageSizeArg>,

        /// Characters per wrapped text line
        #[arg(long)]
        max_chars: Option<usize>,

        /// Leave out the File: / File Path: banner
        #[arg(long)]
        hide_file_info: bool,

        /// Conversion counter to bump after a successful run
        #[arg(long)]
        counter: Option<PathBuf>,
    },

    /// Show which files a conversion would include
    Tree {
        #[arg(required = true, num_args = 1..)]
        inputs: Vec<PathBuf>,

        /// Print the tree as JSON
        #[arg(long)]
        json: bool,
    },

    /// Extract a zip archive, skipping entries that escape the destination
    Extract {
        archive: PathBuf,
        dest: PathBuf,
    },

    /// Print the number of completed conversions
    Count {
        #[arg(long, default_value = DEFAULT_COUNTER_FILE)]
        counter: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OrientationArg {
    Portrait,
    Landscape,
}

#[derive(Clone, Copy, ValueEnum)]
enum PageSizeArg {
    Letter,
    A4,
    Legal,
}

impl From<OrientationArg> for unifydoc::Orientation {
    fn from(arg: OrientationArg) -> Self {
        match arg {
            OrientationArg::Portrait => Self::Portrait,
            OrientationArg::Landscape => Self::Landscape,
        }
    }
}

impl From<PageSizeArg> for unifydoc::PageSize {
    fn from(arg: PageSizeArg) -> Self {
        match arg {
            PageSizeArg::Letter => Self::Letter,
            PageSizeArg::A4 => Self::A4,
            PageSizeArg::Legal => Self::Legal,
        }
    }
}

/// Per-run scratch directory, removed when dropped
fn work_dir() -> Result<tempfile::TempDir> {
    tempfile::Builder::new()
        .prefix("unifydoc-run-")
        .tempdir()
        .context("Failed to create work directory")
}

fn watch_ctrl_c(cancel: Arc<AtomicBool>) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupt received, cancelling run");
            cancel.store(true, Ordering::SeqCst);
        }
    });
}

fn print_folder(folder: &FolderNode) {
    println!("{:width$}{}", "", folder.name, width = folder.level * 2 - 2);
    for sub in &folder.folders {
        print_folder(sub);
    }
    for file in &folder.files {
        println!("{:width$}{}", "", file.name, width = file.level * 2 - 2);
    }
}

fn print_tree(root: &Path, tree: &FileTree) {
    println!("{}", root.display());
    if tree.is_empty() {
        println!("  (nothing to convert)");
        return;
    }
    for folder in &tree.folders {
        print_folder(folder);
    }
    for file in &tree.files {
        println!("{}", file.name);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut logger = CliLogger::new(CliLogger::level_for(cli.verbose));
    if let Some(path) = &cli.log_file {
        logger = logger
            .with_file(path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
    }
    logger.init()?;

    match cli.command {
        Commands::Convert {
            inputs,
            output_dir,
            name,
            settings,
            margin,
            header_note,
            footer_note,
            orientation,
            page_size,
            max_chars,
            hide_file_info,
            counter,
        } => {
            let mut render = match &settings {
                Some(path) => RenderSettings::load(path)
                    .await
                    .with_context(|| format!("Failed to load settings {}", path.display()))?,
                None => RenderSettings::default(),
            };
            if let Some(margin) = margin {
                render.margin_pt = margin;
            }
            if header_note.is_some() {
                render.header_note = header_note;
            }
            if footer_note.is_some() {
                render.footer_note = footer_note;
            }
            if let Some(orientation) = orientation {
                render.orientation = orientation.into();
            }
            if let Some(page_size) = page_size {
                render.page_size = page_size.into();
            }
            if let Some(max_chars) = max_chars {
                render.max_chars_per_line = max_chars;
            }
            if hide_file_info {
                render.show_file_info = false;
            }

            let work = work_dir()?;
            let groups = gather_inputs(&inputs, work.path())?;
            let upload_root = match groups.as_slice() {
                [only] => only.root.clone(),
                _ => work.path().to_path_buf(),
            };
            let classify = ClassifyOptions::default().with_upload_root(upload_root);

            tokio::fs::create_dir_all(&output_dir)
                .await
                .with_context(|| format!("Failed to create {}", output_dir.display()))?;
            let output = output_dir.join(naming::output_file_name(name.as_deref()));

            let cancel = Arc::new(AtomicBool::new(false));
            watch_ctrl_c(Arc::clone(&cancel));

            let outcome = unifydoc::assemble(
                inputs::flatten(&groups),
                render,
                classify,
                output.clone(),
                cancel,
            )
            .await
            .with_context(|| format!("Failed to create {}", output.display()))?;

            work.close().context("Failed to remove work directory")?;

            match outcome {
                RunOutcome::Completed(report) => {
                    for file in &report.files {
                        match &file.status {
                            FileStatus::Failed(reason) => {
                                println!("  failed   {} ({})", file.path.display(), reason);
                            }
                            FileStatus::Skipped(reason) => {
                                log::debug!("skipped {} ({})", file.path.display(), reason);
                            }
                            FileStatus::Rendered { .. } => {}
                        }
                    }
                    println!(
                        "Converted {} files ({} pages) → {}",
                        report.rendered_count(),
                        report.page_count,
                        report.output.display()
                    );

                    if let Some(path) = counter {
                        let counter = JsonFileCounter::new(path);
                        let total = counter.increment()?;
                        log::info!("Conversion count in {} is now {}", counter.path().display(), total);
                    }
                }
                RunOutcome::Cancelled => {
                    println!("Cancelled; nothing was written");
                }
            }
        }

        Commands::Tree { inputs, json } => {
            let work = work_dir()?;
            let groups = gather_inputs(&inputs, work.path())?;
            let options = ClassifyOptions::default();

            let trees: Vec<(&InputGroup, FileTree)> = groups
                .iter()
                .map(|g| (g, unifydoc::build_file_tree(&g.files, &g.root, &options)))
                .collect();

            if json {
                let values: Vec<&FileTree> = trees.iter().map(|(_, tree)| tree).collect();
                println!("{}", serde_json::to_string_pretty(&values)?);
            } else {
                for (group, tree) in &trees {
                    print_tree(&group.root, tree);
                }
            }
            work.close().context("Failed to remove work directory")?;
        }

        Commands::Extract { archive, dest } => {
            let files = unifydoc::expand_zip(&archive, &dest)
                .with_context(|| format!("Failed to extract {}", archive.display()))?;
            for file in &files {
                println!("{}", file.display());
            }
        }

        Commands::Count { counter } => {
            let counter = JsonFileCounter::new(counter);
            println!("{}", counter.current()?);
        }
    }

    Ok(())
}
