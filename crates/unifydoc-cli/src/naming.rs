//! Output file naming

pub const DEFAULT_OUTPUT_NAME: &str = "UnifyDoc.pdf";
const UNIQUE_PREFIX: &str = "UnifyDoc-";
const UNIQUE_HEX_LEN: usize = 16;

/// File name for the combined PDF.
///
/// No name (or the stock default) gets a random `UnifyDoc-<hex>.pdf` so runs
/// never overwrite each other; anything else is sanitized and given a `.pdf`
/// extension.
pub fn output_file_name(requested: Option<&str>) -> String {
    let requested = requested
        .map(str::trim)
        .filter(|name| !name.is_empty() && *name != DEFAULT_OUTPUT_NAME);

    let Some(name) = requested else {
        return unique_name();
    };

    let clean = sanitize_filename::sanitize(name);
    let clean = clean.trim_start_matches('.');
    if clean.is_empty() {
        return unique_name();
    }

    if clean.to_ascii_lowercase().ends_with(".pdf") {
        clean.to_string()
    } else {
        format!("{}.pdf", clean)
    }
}

fn unique_name() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("{}{}.pdf", UNIQUE_PREFIX, &id[..UNIQUE_HEX_LEN])
}
