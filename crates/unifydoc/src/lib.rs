pub mod assemble;
mod archive;
mod classify;
pub mod constants;
mod layout;
mod options;
mod render;
mod tree;
mod types;
mod wrap;

pub use archive::{expand_zip, list_files};
pub use assemble::{Assembler, Assembly, CancelCheck, assemble, save_pdf};
pub use classify::{Classifier, InputFile, extension_of};
pub use layout::{
    Document, Font, ImageItem, Page, PageItem, Rect, SourcePageItem, TextRun, encode_win_ansi,
};
pub use options::*;
pub use render::{extract_paragraph_text, read_text};
pub use tree::{FileNode, FileTree, FolderNode, build_file_tree};
pub use types::*;
pub use wrap::{wrap_line, wrap_text};
