//! Export of assembled word books to HTML, PDF and raster images.
//!
//! The target format is resolved once from the output extension into an
//! [`OutputFormat`], and the caller's settings travel as [`ExportOptions`].
//!
//! # Architecture
//!
//! [`Exporter`] uses a builder pattern:
//! - `new()` creates an exporter with default configuration
//! - `with_config()` allows customization
//! - `with_renderer()` replaces the external renderer
//! - `export()` writes the artifact and reports the lookup counts
//!
//! HTML is written directly. PDF and image formats go through a scratch HTML
//! file and an external [`Renderer`]; PNG and WebP are rendered to an
//! intermediate PNG first and re-encoded with the requested settings. Scratch
//! files are removed on every path, including errors.
//!
//! # Example
//!
//! ```no_run
//! use wordbook::dict::SourceDictionary;
//! use wordbook::export::{ExportOptions, Exporter};
//! use wordbook::wordlist::parse_word_list;
//! use std::path::Path;
//!
//! let list = parse_word_list("words.txt")?;
//! let dict = SourceDictionary::open("dict.txt")?;
//! let output = Path::new("words.pdf");
//!
//! let options = ExportOptions::for_path(output)?;
//! let report = Exporter::new(&dict).export(&list, &options, output)?;
//! println!("{} found, {} not found", report.stats.found, report.stats.not_found);
//! # Ok::<(), wordbook::Error>(())
//! ```

mod raster;
mod renderer;

pub use raster::{PngEncoding, reencode_png, reencode_webp, write_png, write_webp};
pub use renderer::{
    RenderOptions, RenderTarget, Renderer, Wkhtml, image_options, option_args, pdf_options,
};

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, info};
use tempfile::NamedTempFile;

use crate::assemble::{AssembleConfig, Assembler, Assembly, LookupStats};
use crate::dict::Dictionary;
use crate::error::{Error, Result};
use crate::wordlist::{InvalidWordLog, WordList};

/// Default JPEG quality passed to the renderer.
pub const DEFAULT_JPEG_QUALITY: u8 = 90;
/// Default lossy WebP quality.
pub const DEFAULT_WEBP_QUALITY: f32 = 80.0;
/// Default PNG compression level.
pub const DEFAULT_PNG_LEVEL: u8 = 6;

/// Raster formats with their encoding settings.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageFormat {
    Jpeg { quality: u8 },
    Png { optimize: bool, compress_level: u8 },
    Webp { quality: f32, lossless: bool },
    /// Anything else the renderer writes natively, by extension.
    Other(String),
}

/// Output format, resolved from the output extension.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputFormat {
    Html,
    Pdf,
    Image(ImageFormat),
}

impl OutputFormat {
    /// Resolve the format of `path` by extension, case-insensitively.
    /// Image formats carry their default settings.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        let format = match ext.as_str() {
            "html" | "htm" => OutputFormat::Html,
            "pdf" => OutputFormat::Pdf,
            "jpg" | "jpeg" => OutputFormat::Image(ImageFormat::Jpeg {
                quality: DEFAULT_JPEG_QUALITY,
            }),
            "png" => OutputFormat::Image(ImageFormat::Png {
                optimize: false,
                compress_level: DEFAULT_PNG_LEVEL,
            }),
            "webp" => OutputFormat::Image(ImageFormat::Webp {
                quality: DEFAULT_WEBP_QUALITY,
                lossless: false,
            }),
            "bmp" | "svg" => OutputFormat::Image(ImageFormat::Other(ext)),
            _ => return Err(Error::UnsupportedFormat(path.display().to_string())),
        };
        Ok(format)
    }
}

/// Per-call export settings.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportOptions {
    Html {
        with_toc: bool,
    },
    Pdf {
        /// Renderer executable; located automatically when `None`.
        renderer: Option<PathBuf>,
        /// Overrides for the base PDF options.
        options: RenderOptions,
    },
    Image {
        format: ImageFormat,
        renderer: Option<PathBuf>,
        options: RenderOptions,
    },
}

impl ExportOptions {
    /// Default options for the format of `path`.
    pub fn for_path(path: &Path) -> Result<Self> {
        Ok(Self::for_format(OutputFormat::from_path(path)?))
    }

    pub fn for_format(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Html => ExportOptions::Html { with_toc: true },
            OutputFormat::Pdf => ExportOptions::Pdf {
                renderer: None,
                options: RenderOptions::new(),
            },
            OutputFormat::Image(format) => ExportOptions::Image {
                format,
                renderer: None,
                options: RenderOptions::new(),
            },
        }
    }
}

/// Configuration shared by every export call of one [`Exporter`].
#[derive(Debug, Clone, Default)]
pub struct ExportConfig {
    pub assemble: AssembleConfig,
    /// Where scratch files go; the system temp directory when `None`.
    pub scratch_dir: Option<PathBuf>,
    /// Write missing words to `<output-stem>.invalid.txt`.
    pub write_invalid_words: bool,
}

/// Outcome of one export call.
#[derive(Debug, Clone)]
pub struct ExportReport {
    pub stats: LookupStats,
    pub invalid_words: InvalidWordLog,
    pub output: PathBuf,
    /// Companion file holding the missing words, when one was written.
    pub invalid_words_file: Option<PathBuf>,
}

/// Drives assembly and rendering for one dictionary.
pub struct Exporter<'d> {
    dict: &'d dyn Dictionary,
    config: ExportConfig,
    renderer: Option<Box<dyn Renderer + 'd>>,
}

impl<'d> Exporter<'d> {
    pub fn new(dict: &'d dyn Dictionary) -> Self {
        Self {
            dict,
            config: ExportConfig::default(),
            renderer: None,
        }
    }

    /// Configure the exporter with custom settings.
    pub fn with_config(mut self, config: ExportConfig) -> Self {
        self.config = config;
        self
    }

    /// Use `renderer` instead of locating wkhtmltopdf.
    pub fn with_renderer(mut self, renderer: impl Renderer + 'd) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Export `list` to `output`.
    pub fn export(
        &self,
        list: &WordList,
        options: &ExportOptions,
        output: &Path,
    ) -> Result<ExportReport> {
        create_parent(output)?;

        let assembly = match options {
            ExportOptions::Html { with_toc } => {
                let assembly = self.assemble(list, *with_toc)?;
                fs::write(output, &assembly.html)?;
                assembly
            }
            ExportOptions::Pdf { renderer, options } => {
                let assembly = self.assemble(list, false)?;
                let page = self.scratch_file(".html")?;
                write_scratch(&page, &assembly.html)?;

                let mut merged = pdf_options();
                merged.extend(options.clone());
                self.render(RenderTarget::Pdf, renderer.as_deref(), page.path(), output, &merged)?;
                assembly
            }
            ExportOptions::Image {
                format,
                renderer,
                options,
            } => {
                let assembly = self.assemble(list, false)?;
                let page = self.scratch_file(".html")?;
                write_scratch(&page, &assembly.html)?;
                self.export_image(format, renderer.as_deref(), options, page.path(), output)?;
                assembly
            }
        };

        let invalid_words_file = self.write_invalid_words(&assembly.invalid_words, output)?;
        info!("Exported {}", output.display());

        Ok(ExportReport {
            stats: assembly.stats,
            invalid_words: assembly.invalid_words,
            output: output.to_path_buf(),
            invalid_words_file,
        })
    }

    fn assemble(&self, list: &WordList, toc: bool) -> Result<Assembly> {
        let config = self.config.assemble.clone().with_toc(toc);
        Assembler::new(self.dict).with_config(config).assemble(list)
    }

    fn export_image(
        &self,
        format: &ImageFormat,
        renderer: Option<&Path>,
        overrides: &RenderOptions,
        page: &Path,
        output: &Path,
    ) -> Result<()> {
        let mut options = image_options();

        match format {
            ImageFormat::Jpeg { quality } => {
                options.insert("format".into(), "jpg".into());
                options.insert("quality".into(), quality.to_string());
                options.extend(overrides.clone());
                self.render(RenderTarget::Image, renderer, page, output, &options)
            }
            ImageFormat::Png {
                optimize,
                compress_level,
            } => {
                let raw = self.render_intermediate(renderer, options, overrides, page)?;
                reencode_png(
                    raw.path(),
                    output,
                    PngEncoding::new(*optimize, *compress_level),
                )
            }
            ImageFormat::Webp { quality, lossless } => {
                let raw = self.render_intermediate(renderer, options, overrides, page)?;
                reencode_webp(raw.path(), output, *quality, *lossless)
            }
            ImageFormat::Other(ext) => {
                options.insert("format".into(), ext.clone());
                options.extend(overrides.clone());
                self.render(RenderTarget::Image, renderer, page, output, &options)
            }
        }
    }

    /// Render `page` to a scratch PNG, removed when the returned handle drops.
    fn render_intermediate(
        &self,
        renderer: Option<&Path>,
        mut options: RenderOptions,
        overrides: &RenderOptions,
        page: &Path,
    ) -> Result<NamedTempFile> {
        let raw = self.scratch_file(".png")?;
        options.extend(overrides.clone());
        options.insert("format".into(), "png".into());
        self.render(RenderTarget::Image, renderer, page, raw.path(), &options)?;
        Ok(raw)
    }

    fn render(
        &self,
        target: RenderTarget,
        explicit: Option<&Path>,
        input: &Path,
        output: &Path,
        options: &RenderOptions,
    ) -> Result<()> {
        let located;
        let renderer: &dyn Renderer = match &self.renderer {
            Some(renderer) => renderer.as_ref(),
            None => {
                located = Wkhtml::locate(target, explicit)?;
                &located
            }
        };
        renderer.render(input, output, options)
    }

    fn scratch_file(&self, suffix: &str) -> Result<NamedTempFile> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("wordbook-").suffix(suffix);
        let file = match &self.config.scratch_dir {
            Some(dir) => {
                fs::create_dir_all(dir)?;
                builder.tempfile_in(dir)?
            }
            None => builder.tempfile()?,
        };
        debug!("Scratch file {}", file.path().display());
        Ok(file)
    }

    fn write_invalid_words(&self, log: &InvalidWordLog, output: &Path) -> Result<Option<PathBuf>> {
        if !self.config.write_invalid_words || log.is_empty() {
            return Ok(None);
        }
        let path = invalid_words_path(output);
        log.write_to(&path)?;
        info!("Wrote {} missing words to {}", log.word_count(), path.display());
        Ok(Some(path))
    }
}

/// `<output-stem>.invalid.txt` next to `output`.
pub fn invalid_words_path(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    output.with_file_name(format!("{stem}.invalid.txt"))
}

fn write_scratch(file: &NamedTempFile, bytes: &[u8]) -> Result<()> {
    let mut handle = file.as_file();
    handle.write_all(bytes)?;
    handle.flush()?;
    Ok(())
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            OutputFormat::from_path(Path::new("a/b.HTM")).unwrap(),
            OutputFormat::Html
        );
        assert_eq!(
            OutputFormat::from_path(Path::new("b.pdf")).unwrap(),
            OutputFormat::Pdf
        );
        assert_eq!(
            OutputFormat::from_path(Path::new("b.jpeg")).unwrap(),
            OutputFormat::Image(ImageFormat::Jpeg { quality: 90 })
        );
        assert_eq!(
            OutputFormat::from_path(Path::new("b.webp")).unwrap(),
            OutputFormat::Image(ImageFormat::Webp {
                quality: 80.0,
                lossless: false
            })
        );
        assert_eq!(
            OutputFormat::from_path(Path::new("b.svg")).unwrap(),
            OutputFormat::Image(ImageFormat::Other("svg".into()))
        );
    }

    #[test]
    fn test_unsupported_format() {
        assert!(matches!(
            OutputFormat::from_path(Path::new("b.docx")),
            Err(Error::UnsupportedFormat(_))
        ));
        assert!(matches!(
            OutputFormat::from_path(Path::new("noext")),
            Err(Error::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_invalid_words_path() {
        assert_eq!(
            invalid_words_path(Path::new("out/words.pdf")),
            Path::new("out/words.invalid.txt")
        );
    }

    #[test]
    fn test_options_for_html() {
        assert_eq!(
            ExportOptions::for_path(Path::new("x.html")).unwrap(),
            ExportOptions::Html { with_toc: true }
        );
    }
}
