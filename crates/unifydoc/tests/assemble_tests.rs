use lopdf::{Dictionary, Object, Stream};
use std::cell::Cell;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tempfile::TempDir;
use unifydoc::*;

fn create_test_pdf(num_pages: usize) -> lopdf::Document {
    let mut doc = lopdf::Document::with_version("1.7");

    let pages_id = doc.new_object_id();

    let mut kids = Vec::new();
    for _ in 0..num_pages {
        let content_id = doc.add_object(Stream::new(Dictionary::new(), b"q Q".to_vec()));

        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(612),
                    Object::Integer(792),
                ]),
            ),
            ("Resources", Object::Dictionary(Dictionary::new())),
            ("Contents", Object::Reference(content_id)),
        ]));
        kids.push(Object::Reference(page_id));
    }

    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(kids)),
        ("Count", Object::Integer(num_pages as i64)),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));

    doc.trailer.set("Root", catalog_id);

    doc
}

fn write_pdf(dir: &Path, name: &str, num_pages: usize) -> PathBuf {
    let path = dir.join(name);
    let mut writer = Vec::new();
    create_test_pdf(num_pages).save_to(&mut writer).unwrap();
    std::fs::write(&path, writer).unwrap();
    path
}

fn write_text(dir: &Path, name: &str, num_lines: usize) -> PathBuf {
    let path = dir.join(name);
    let content: String = (1..=num_lines).map(|i| format!("line {}\n", i)).collect();
    std::fs::write(&path, content).unwrap();
    path
}

fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    image::RgbImage::from_pixel(width, height, image::Rgb([200, 30, 30]))
        .save(&path)
        .unwrap();
    path
}

fn write_docx(dir: &Path, name: &str, paragraphs: &[&str]) -> PathBuf {
    let path = dir.join(name);
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", p))
        .collect();
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
        body
    );

    let mut zip = zip::ZipWriter::new(std::fs::File::create(&path).unwrap());
    zip.start_file("word/document.xml", zip::write::SimpleFileOptions::default())
        .unwrap();
    zip.write_all(xml.as_bytes()).unwrap();
    zip.finish().unwrap();
    path
}

fn body_lines(page: &Page) -> Vec<&str> {
    page.text_runs()
        .filter(|run| run.font == Font::Regular)
        .map(|run| run.text.as_str())
        .collect()
}

fn never_cancelled() -> bool {
    false
}

#[test]
fn test_text_file_pages() {
    let dir = TempDir::new().unwrap();
    let path = write_text(dir.path(), "notes.txt", 200);

    let assembler = Assembler::new(RenderSettings::default()).unwrap();
    let assembly = assembler.build(&[&path]);
    let pages = assembly.document.pages();

    // 60 body lines fit below the file banner on a Letter page
    assert_eq!(pages.len(), 4);
    assert_eq!(body_lines(&pages[0]).len(), 60);
    assert_eq!(body_lines(&pages[1]).len(), 60);
    assert_eq!(body_lines(&pages[2]).len(), 60);
    assert_eq!(body_lines(&pages[3]).len(), 20);

    assert_eq!(body_lines(&pages[0])[0], "line 1");
    assert_eq!(body_lines(&pages[1])[0], "line 61");
    assert_eq!(body_lines(&pages[3]).last(), Some(&"line 200"));

    assert_eq!(assembly.files.len(), 1);
    assert_eq!(assembly.files[0].status, FileStatus::Rendered { pages: 4 });
}

#[test]
fn test_header_block_repeats_on_every_page() {
    let dir = TempDir::new().unwrap();
    let path = write_text(dir.path(), "notes.txt", 130);

    let settings = RenderSettings {
        header_note: Some("Batch 7".to_string()),
        ..Default::default()
    };
    let assembly = Assembler::new(settings)
        .unwrap()
        .with_classifier(ClassifyOptions::default().with_upload_root(dir.path()))
        .build(&[&path]);
    let pages = assembly.document.pages();

    // The note line costs 2 line heights, leaving 58 body lines per page
    assert_eq!(pages.len(), 3);
    for page in pages {
        let lines = page.lines();
        assert_eq!(lines[0], "Batch 7");
        assert_eq!(lines[1], "File: notes.txt");
        assert_eq!(lines[2], "File Path: notes.txt");
    }
    assert_eq!(body_lines(&pages[0]).len(), 58);
    assert_eq!(body_lines(&pages[2]).len(), 14);

    let first = pages[0].text_runs().next().unwrap();
    assert_eq!(first.font, Font::Bold);
    assert_eq!(first.size, 12.0);
    assert_eq!(first.y, 10.0);
}

#[test]
fn test_page_break_boundary() {
    let dir = TempDir::new().unwrap();
    let exact = write_text(dir.path(), "exact.txt", 60);
    let over = write_text(dir.path(), "over.txt", 61);

    let assembler = Assembler::new(RenderSettings::default()).unwrap();

    let assembly = assembler.build(&[&exact]);
    assert_eq!(assembly.document.page_count(), 1);
    let last = assembly.document.pages()[0].text_runs().last().unwrap();
    assert_eq!(last.y, 766.0);

    let assembly = assembler.build(&[&over]);
    assert_eq!(assembly.document.page_count(), 2);
    assert_eq!(body_lines(&assembly.document.pages()[1]), vec!["line 61"]);
}

#[test]
fn test_no_file_info_starts_at_margin() {
    let dir = TempDir::new().unwrap();
    let path = write_text(dir.path(), "notes.txt", 64);

    let settings = RenderSettings {
        show_file_info: false,
        ..Default::default()
    };
    let assembly = Assembler::new(settings).unwrap().build(&[&path]);
    let page = &assembly.document.pages()[0];

    assert_eq!(assembly.document.page_count(), 1);
    assert_eq!(page.lines().len(), 64);
    assert_eq!(page.text_runs().next().unwrap().y, 10.0);
}

#[test]
fn test_carriage_return_only_line_endings() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mac.txt");
    std::fs::write(&path, "alpha\rbeta\rgamma\r").unwrap();

    let settings = RenderSettings {
        show_file_info: false,
        ..Default::default()
    };
    let assembly = Assembler::new(settings).unwrap().build(&[&path]);
    let page = &assembly.document.pages()[0];

    assert_eq!(page.lines(), vec!["alpha", "beta", "gamma"]);
}

#[test]
fn test_footer_on_last_allowed_line() {
    let dir = TempDir::new().unwrap();
    let path = write_text(dir.path(), "notes.txt", 58);

    let settings = RenderSettings {
        footer_note: Some("Confidential".to_string()),
        ..Default::default()
    };
    let assembly = Assembler::new(settings).unwrap().build(&[&path]);
    let pages = assembly.document.pages();

    assert_eq!(pages.len(), 1);
    assert_eq!(body_lines(&pages[0]).len(), 58);

    let footer = pages[0].text_runs().last().unwrap();
    assert_eq!(footer.text, "Confidential");
    assert_eq!(footer.font, Font::Oblique);
    assert_eq!(footer.y, 770.0);
}

#[test]
fn test_footer_moves_with_overflow_line() {
    let dir = TempDir::new().unwrap();
    let path = write_text(dir.path(), "notes.txt", 59);

    let settings = RenderSettings {
        footer_note: Some("Confidential".to_string()),
        ..Default::default()
    };
    let assembly = Assembler::new(settings).unwrap().build(&[&path]);
    let pages = assembly.document.pages();

    assert_eq!(pages.len(), 2);
    for page in pages {
        let footers: Vec<_> = page
            .text_runs()
            .filter(|run| run.text == "Confidential")
            .collect();
        assert_eq!(footers.len(), 1);
    }
    assert_eq!(body_lines(&pages[1]), vec!["line 59"]);
    assert_eq!(pages[1].lines()[0], "File: notes.txt");
}

#[test]
fn test_long_lines_are_wrapped() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("wide.py");
    std::fs::write(&path, format!("{}\n", "word ".repeat(40))).unwrap();

    let settings = RenderSettings {
        max_chars_per_line: 50,
        ..Default::default()
    };
    let assembly = Assembler::new(settings).unwrap().build(&[&path]);
    let lines = body_lines(&assembly.document.pages()[0]);

    assert_eq!(lines.len(), 4);
    assert!(lines.iter().all(|line| line.chars().count() <= 50));
}

#[test]
fn test_image_file() {
    let dir = TempDir::new().unwrap();
    let path = write_png(dir.path(), "photo.png", 40, 30);

    let assembly = Assembler::new(RenderSettings::default())
        .unwrap()
        .build(&[&path]);
    let pages = assembly.document.pages();

    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].lines()[0], "File: photo.png");

    let images: Vec<_> = pages[0].images().collect();
    assert_eq!(images.len(), 1);

    let frame = images[0].frame;
    assert_eq!(frame.width, 296.0);
    assert_eq!(frame.height, 222.0);
    assert_eq!(frame.x, 158.0);
    assert_eq!(frame.y, 58.0);

    // 4:3 bitmap fills the 4:3 frame
    let drawn = images[0].drawn;
    assert!((drawn.width - frame.width).abs() < 0.01);
    assert!((drawn.height - frame.height).abs() < 0.01);
}

#[test]
fn test_image_keeps_aspect_ratio_in_frame() {
    let dir = TempDir::new().unwrap();
    let path = write_png(dir.path(), "tall.png", 10, 40);

    let assembly = Assembler::new(RenderSettings::default())
        .unwrap()
        .build(&[&path]);
    let image = assembly.document.pages()[0].images().next().unwrap().clone();

    assert!((image.drawn.height - image.frame.height).abs() < 0.01);
    assert!((image.drawn.width - image.frame.height / 4.0).abs() < 0.01);
    let frame_center = image.frame.x + image.frame.width / 2.0;
    let drawn_center = image.drawn.x + image.drawn.width / 2.0;
    assert!((frame_center - drawn_center).abs() < 0.01);
}

#[test]
fn test_embedded_pdf_pages() {
    let dir = TempDir::new().unwrap();
    let path = write_pdf(dir.path(), "source.pdf", 3);

    let assembly = Assembler::new(RenderSettings::default())
        .unwrap()
        .build(&[&path]);
    let pages = assembly.document.pages();

    assert_eq!(pages.len(), 3);
    for (i, page) in pages.iter().enumerate() {
        assert_eq!(page.text_runs().count(), 0);
        assert_eq!(page.images().count(), 0);
        let source = page.source_page().unwrap();
        assert_eq!(source.source_index, i);
        assert_eq!(source.scale, 1.0);
        assert_eq!(source.offset, (0.0, 0.0));
    }
}

#[test]
fn test_embedded_pdf_ignores_notes() {
    let dir = TempDir::new().unwrap();
    let path = write_pdf(dir.path(), "source.pdf", 2);

    let settings = RenderSettings {
        header_note: Some("Header".to_string()),
        footer_note: Some("Footer".to_string()),
        ..Default::default()
    };
    let assembly = Assembler::new(settings).unwrap().build(&[&path]);

    assert_eq!(assembly.document.page_count(), 2);
    assert!(assembly.document.pages().iter().all(|p| p.lines().is_empty()));
}

#[test]
fn test_word_document() {
    let dir = TempDir::new().unwrap();
    let path = write_docx(dir.path(), "report.docx", &["First paragraph", "Second"]);

    let assembly = Assembler::new(RenderSettings::default())
        .unwrap()
        .build(&[&path]);
    let pages = assembly.document.pages();

    assert_eq!(pages.len(), 1);
    assert_eq!(body_lines(&pages[0]), vec!["First paragraph", "Second"]);
}

#[test]
fn test_skipped_files_contribute_nothing() {
    let dir = TempDir::new().unwrap();
    let venv = dir.path().join(".venv").join("lib");
    std::fs::create_dir_all(&venv).unwrap();

    let hidden = write_text(dir.path(), ".secret.txt", 3);
    let fork = write_text(dir.path(), "._notes.txt", 3);
    let unsupported = write_text(dir.path(), "data.xyz", 3);
    let env = write_text(&venv, "site.py", 3);

    let assembly = Assembler::new(RenderSettings::default())
        .unwrap()
        .build(&[&hidden, &fork, &unsupported, &env]);

    assert_eq!(assembly.document.page_count(), 0);
    let statuses: Vec<_> = assembly.files.iter().map(|f| f.status.clone()).collect();
    assert_eq!(
        statuses,
        vec![
            FileStatus::Skipped(SkipReason::Hidden),
            FileStatus::Skipped(SkipReason::ResourceFork),
            FileStatus::Skipped(SkipReason::Unsupported),
            FileStatus::Skipped(SkipReason::TempEnvironment),
        ]
    );
}

#[test]
fn test_failed_file_is_rolled_back() {
    let dir = TempDir::new().unwrap();
    let before = write_text(dir.path(), "before.txt", 2);
    let broken_pdf = dir.path().join("broken.pdf");
    std::fs::write(&broken_pdf, b"not a pdf").unwrap();
    let broken_png = dir.path().join("broken.png");
    std::fs::write(&broken_png, b"not a png").unwrap();
    let missing = dir.path().join("missing.txt");
    let after = write_text(dir.path(), "after.txt", 2);

    let assembly = Assembler::new(RenderSettings::default())
        .unwrap()
        .build(&[&before, &broken_pdf, &broken_png, &missing, &after]);
    let pages = assembly.document.pages();

    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0].lines()[0], "File: before.txt");
    assert_eq!(pages[1].lines()[0], "File: after.txt");

    assert!(matches!(assembly.files[1].status, FileStatus::Failed(_)));
    assert!(matches!(assembly.files[2].status, FileStatus::Failed(_)));
    assert!(matches!(assembly.files[3].status, FileStatus::Failed(_)));
}

#[test]
fn test_output_follows_input_order() {
    let dir = TempDir::new().unwrap();
    let a = write_text(dir.path(), "a.txt", 1);
    let pic = write_png(dir.path(), "pic.png", 8, 6);
    let doc = write_pdf(dir.path(), "doc.pdf", 2);
    let b = write_text(dir.path(), "b.txt", 1);

    let assembly = Assembler::new(RenderSettings::default())
        .unwrap()
        .build(&[&a, &pic, &doc, &b]);
    let pages = assembly.document.pages();

    assert_eq!(pages.len(), 5);
    assert_eq!(pages[0].lines()[0], "File: a.txt");
    assert_eq!(pages[1].lines()[0], "File: pic.png");
    assert_eq!(pages[2].source_page().unwrap().source_index, 0);
    assert_eq!(pages[3].source_page().unwrap().source_index, 1);
    assert_eq!(pages[4].lines()[0], "File: b.txt");
}

#[test]
fn test_build_is_repeatable() {
    let dir = TempDir::new().unwrap();
    let text = write_text(dir.path(), "a.txt", 75);
    let pic = write_png(dir.path(), "pic.png", 8, 6);

    let assembler = Assembler::new(RenderSettings::default()).unwrap();
    let first = assembler.build(&[&text, &pic]);
    let second = assembler.build(&[&text, &pic]);

    assert_eq!(first.document.pages(), second.document.pages());
    assert_eq!(first.files, second.files);
}

#[test]
fn test_landscape_page_size() {
    let dir = TempDir::new().unwrap();
    let path = write_text(dir.path(), "a.txt", 1);

    let settings = RenderSettings {
        page_size: PageSize::A4,
        orientation: Orientation::Landscape,
        ..Default::default()
    };
    let assembly = Assembler::new(settings).unwrap().build(&[&path]);

    assert_eq!(assembly.document.page_size(), (842.0, 595.0));
    assert_eq!(assembly.document.pages()[0].width, 842.0);
}

#[test]
fn test_run_writes_pdf() {
    let dir = TempDir::new().unwrap();
    let text = write_text(dir.path(), "notes.txt", 200);
    let pdf = write_pdf(dir.path(), "source.pdf", 3);
    let output = dir.path().join("out.pdf");

    let outcome = Assembler::new(RenderSettings::default())
        .unwrap()
        .run(&[&text, &pdf], &output, &never_cancelled)
        .unwrap();

    let report = match outcome {
        RunOutcome::Completed(report) => report,
        RunOutcome::Cancelled => panic!("Expected completed run"),
    };
    assert_eq!(report.page_count, 7);
    assert_eq!(report.rendered_count(), 2);
    assert_eq!(report.failed_count(), 0);

    let loaded = lopdf::Document::load(&output).unwrap();
    assert_eq!(loaded.get_pages().len(), 7);
}

#[test]
fn test_run_without_pages_fails() {
    let dir = TempDir::new().unwrap();
    let hidden = write_text(dir.path(), ".hidden.txt", 3);
    let output = dir.path().join("out.pdf");

    let result = Assembler::new(RenderSettings::default())
        .unwrap()
        .run(&[&hidden], &output, &never_cancelled);

    assert!(matches!(result, Err(AssembleError::NoPages)));
    assert!(!output.exists());
}

#[test]
fn test_cancelled_before_generation() {
    let dir = TempDir::new().unwrap();
    let text = write_text(dir.path(), "notes.txt", 10);
    let output = dir.path().join("out.pdf");

    let outcome = Assembler::new(RenderSettings::default())
        .unwrap()
        .run(&[&text], &output, &|| true)
        .unwrap();

    assert!(matches!(outcome, RunOutcome::Cancelled));
    assert!(!output.exists());
}

#[test]
fn test_cancelled_before_save() {
    let dir = TempDir::new().unwrap();
    let text = write_text(dir.path(), "notes.txt", 10);
    let output = dir.path().join("out.pdf");

    let checks = Cell::new(0);
    let is_cancelled = || {
        checks.set(checks.get() + 1);
        checks.get() > 1
    };

    let outcome = Assembler::new(RenderSettings::default())
        .unwrap()
        .run(&[&text], &output, &is_cancelled)
        .unwrap();

    assert!(matches!(outcome, RunOutcome::Cancelled));
    assert_eq!(checks.get(), 2);
    assert!(!output.exists());
}

#[test]
fn test_cancel_flag() {
    let dir = TempDir::new().unwrap();
    let text = write_text(dir.path(), "notes.txt", 10);
    let output = dir.path().join("out.pdf");
    let assembler = Assembler::new(RenderSettings::default()).unwrap();

    let flag = AtomicBool::new(true);
    let outcome = assembler.run(&[&text], &output, &flag).unwrap();
    assert!(matches!(outcome, RunOutcome::Cancelled));
    assert!(!output.exists());

    flag.store(false, Ordering::SeqCst);
    let outcome = assembler.run(&[&text], &output, &flag).unwrap();
    assert!(matches!(outcome, RunOutcome::Completed(_)));
    assert!(output.exists());
}

#[test]
fn test_invalid_settings_rejected() {
    let settings = RenderSettings {
        margin_pt: 400.0,
        ..Default::default()
    };
    assert!(matches!(
        Assembler::new(settings),
        Err(AssembleError::Config(_))
    ));
}

#[tokio::test]
async fn test_assemble_async() {
    let dir = TempDir::new().unwrap();
    let text = write_text(dir.path(), "notes.txt", 10);
    let output = dir.path().join("out.pdf");

    let outcome = assemble(
        vec![text],
        RenderSettings::default(),
        ClassifyOptions::default(),
        output.clone(),
        Arc::new(AtomicBool::new(false)),
    )
    .await
    .unwrap();

    assert!(matches!(outcome, RunOutcome::Completed(ref r) if r.page_count == 1));
    assert!(output.exists());
}

#[tokio::test]
async fn test_assemble_async_cancelled() {
    let dir = TempDir::new().unwrap();
    let text = write_text(dir.path(), "notes.txt", 10);
    let output = dir.path().join("out.pdf");

    let outcome = assemble(
        vec![text],
        RenderSettings::default(),
        ClassifyOptions::default(),
        output.clone(),
        Arc::new(AtomicBool::new(true)),
    )
    .await
    .unwrap();

    assert!(matches!(outcome, RunOutcome::Cancelled));
    assert!(!output.exists());
}
