//! Export tests against an in-process renderer.
//!
//! The fake renderer records what it was asked to do and writes a real raster
//! (or a stub PDF), so the scratch-file lifecycle and the re-encoding steps
//! run exactly as they do with wkhtmltopdf.

use std::cell::RefCell;
use std::fs;
use std::path::Path;

use image::{DynamicImage, Rgba, RgbaImage};
use tempfile::TempDir;
use wordbook::export::{PngEncoding, RenderOptions, Renderer, write_png};
use wordbook::{
    Error, ExportConfig, ExportOptions, Exporter, ImageFormat, MemoryDictionary, Result,
    WordList, parse_text,
};

#[derive(Default)]
struct FakeRenderer {
    calls: RefCell<Vec<(String, RenderOptions)>>,
    fail: bool,
}

impl FakeRenderer {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    fn last_options(&self) -> RenderOptions {
        self.calls.borrow().last().expect("Renderer not called").1.clone()
    }

    fn last_page(&self) -> String {
        self.calls.borrow().last().expect("Renderer not called").0.clone()
    }
}

impl Renderer for FakeRenderer {
    fn render(&self, input: &Path, output: &Path, options: &RenderOptions) -> Result<()> {
        let page = fs::read_to_string(input)?;
        self.calls.borrow_mut().push((page, options.clone()));

        if self.fail {
            return Err(Error::RendererFailed {
                program: "fake".into(),
                status: "exit status: 2".into(),
                stderr: "boom".into(),
            });
        }

        match options.get("format").map(String::as_str) {
            Some("png") => rendered().save_with_format(output, image::ImageFormat::Png)?,
            Some("jpg") => {
                let rgb = DynamicImage::ImageRgb8(rendered().to_rgb8());
                rgb.save_with_format(output, image::ImageFormat::Jpeg)?
            }
            Some(other) => fs::write(output, format!("raster:{other}"))?,
            None => fs::write(output, b"%PDF-1.4 fake")?,
        }
        Ok(())
    }
}

fn rendered() -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_fn(16, 9, |x, y| {
        Rgba([(x * 15) as u8, (y * 25) as u8, 128, 255])
    }))
}

fn dictionary() -> MemoryDictionary {
    MemoryDictionary::new().with_entry("apple", "<div>fruit</div>")
}

fn words() -> WordList {
    parse_text("#Lesson1\napple\nbanana")
}

fn scratch_config(dir: &TempDir) -> ExportConfig {
    ExportConfig {
        scratch_dir: Some(dir.path().join("scratch")),
        ..Default::default()
    }
}

fn scratch_is_empty(dir: &TempDir) -> bool {
    fs::read_dir(dir.path().join("scratch"))
        .map(|mut entries| entries.next().is_none())
        .unwrap_or(true)
}

// ============================================================================
// Raster output
// ============================================================================

#[test]
fn test_png_reencoded_with_requested_settings() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.png");
    let dict = dictionary();
    let renderer = FakeRenderer::default();

    let options = ExportOptions::Image {
        format: ImageFormat::Png {
            optimize: true,
            compress_level: 9,
        },
        renderer: None,
        options: RenderOptions::new(),
    };
    let report = Exporter::new(&dict)
        .with_config(scratch_config(&dir))
        .with_renderer(&renderer)
        .export(&words(), &options, &output)
        .unwrap();

    let expected = dir.path().join("expected.png");
    write_png(&rendered(), &expected, PngEncoding::new(true, 9)).unwrap();
    assert_eq!(fs::read(&output).unwrap(), fs::read(&expected).unwrap());

    assert_eq!(renderer.last_options()["format"], "png");
    assert!(scratch_is_empty(&dir), "intermediate files left behind");
    assert_eq!(report.stats.found, 1);
    assert_eq!(report.stats.not_found, 1);
}

#[test]
fn test_webp_reencoded() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.webp");
    let dict = dictionary();
    let renderer = FakeRenderer::default();

    let options = ExportOptions::for_path(&output).unwrap();
    Exporter::new(&dict)
        .with_config(scratch_config(&dir))
        .with_renderer(&renderer)
        .export(&words(), &options, &output)
        .unwrap();

    let bytes = fs::read(&output).unwrap();
    assert_eq!(&bytes[..4], b"RIFF");
    assert_eq!(&bytes[8..12], b"WEBP");
    assert!(scratch_is_empty(&dir));
}

#[test]
fn test_jpeg_rendered_directly_with_quality() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.jpg");
    let dict = dictionary();
    let renderer = FakeRenderer::default();

    let options = ExportOptions::for_path(&output).unwrap();
    Exporter::new(&dict)
        .with_renderer(&renderer)
        .export(&words(), &options, &output)
        .unwrap();

    let opts = renderer.last_options();
    assert_eq!(opts["quality"], "90");
    assert_eq!(opts["encoding"], "UTF-8");
    assert!(opts.contains_key("enable-local-file-access"));
    assert_eq!(&fs::read(&output).unwrap()[..2], &[0xFF, 0xD8]);
}

#[test]
fn test_other_raster_passes_format() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.bmp");
    let dict = dictionary();
    let renderer = FakeRenderer::default();

    let options = ExportOptions::for_path(&output).unwrap();
    Exporter::new(&dict)
        .with_renderer(&renderer)
        .export(&words(), &options, &output)
        .unwrap();

    assert_eq!(fs::read_to_string(&output).unwrap(), "raster:bmp");
}

// ============================================================================
// PDF output
// ============================================================================

#[test]
fn test_pdf_options_and_page() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.pdf");
    let dict = dictionary();
    let renderer = FakeRenderer::default();

    let mut overrides = RenderOptions::new();
    overrides.insert("page-size".into(), "Letter".into());
    let options = ExportOptions::Pdf {
        renderer: None,
        options: overrides,
    };
    Exporter::new(&dict)
        .with_config(scratch_config(&dir))
        .with_renderer(&renderer)
        .export(&words(), &options, &output)
        .unwrap();

    let opts = renderer.last_options();
    assert_eq!(opts["page-size"], "Letter");
    assert_eq!(opts["margin-top"], "15mm");
    assert_eq!(opts["footer-center"], "[page]/[topage]");

    // Paged output has no navigation pane
    let page = renderer.last_page();
    assert!(!page.contains("class=\"toc\""));
    assert!(page.contains("<div id=\"word_apple\" class=\"entry\"><div>fruit</div></div>"));

    assert!(fs::read(&output).unwrap().starts_with(b"%PDF"));
    assert!(scratch_is_empty(&dir));
}

#[test]
fn test_unresolvable_renderer_removes_scratch() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.pdf");
    let dict = dictionary();

    let options = ExportOptions::Pdf {
        renderer: Some(dir.path().join("bin/not-a-renderer")),
        options: RenderOptions::new(),
    };
    let result = Exporter::new(&dict)
        .with_config(scratch_config(&dir))
        .export(&words(), &options, &output);

    match result {
        Err(Error::RendererNotFound { program, .. }) => assert_eq!(program, "wkhtmltopdf"),
        other => panic!("expected RendererNotFound, got {other:?}"),
    }
    assert!(scratch_is_empty(&dir), "scratch page left behind");
    assert!(!output.exists());
}

#[test]
fn test_renderer_failure_removes_scratch() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.png");
    let dict = dictionary();
    let renderer = FakeRenderer::failing();

    let options = ExportOptions::for_path(&output).unwrap();
    let result = Exporter::new(&dict)
        .with_config(scratch_config(&dir))
        .with_renderer(&renderer)
        .export(&words(), &options, &output);

    assert!(matches!(result, Err(Error::RendererFailed { .. })));
    assert!(scratch_is_empty(&dir));
}

#[test]
fn test_unsupported_output_extension() {
    assert!(matches!(
        ExportOptions::for_path(Path::new("out.docx")),
        Err(Error::UnsupportedFormat(_))
    ));
}
