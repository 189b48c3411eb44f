//! External renderers that turn an HTML file into a PDF or raster file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, info, warn};

use crate::error::{Error, Result};

/// Renderer options, turned into `--key value` arguments in key order.
/// An empty value yields a bare `--key` flag.
pub type RenderOptions = BTreeMap<String, String>;

/// Converts an HTML document on disk into the file at `output`.
pub trait Renderer {
    fn render(&self, input: &Path, output: &Path, options: &RenderOptions) -> Result<()>;
}

impl<R: Renderer + ?Sized> Renderer for &R {
    fn render(&self, input: &Path, output: &Path, options: &RenderOptions) -> Result<()> {
        (**self).render(input, output, options)
    }
}

/// What the renderer is asked to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderTarget {
    Pdf,
    Image,
}

impl RenderTarget {
    /// Executable name of the wkhtmltopdf tool for this target.
    pub fn program(self) -> &'static str {
        match self {
            RenderTarget::Pdf => "wkhtmltopdf",
            RenderTarget::Image => "wkhtmltoimage",
        }
    }
}

/// The `wkhtmltopdf` / `wkhtmltoimage` command-line renderer.
#[derive(Debug, Clone)]
pub struct Wkhtml {
    program: PathBuf,
}

impl Wkhtml {
    /// Find and validate the executable for `target`.
    ///
    /// An explicit path is used as given. Otherwise the program is looked up on
    /// `PATH`, then in the usual install locations for this OS.
    pub fn locate(target: RenderTarget, explicit: Option<&Path>) -> Result<Self> {
        let name = target.program();
        let program = match explicit {
            Some(path) => path.to_path_buf(),
            None => which::which(name)
                .ok()
                .or_else(|| candidates(name).into_iter().find(|p| p.is_file()))
                .ok_or(Error::RendererNotFound {
                    program: name,
                    tried: None,
                })?,
        };

        let renderer = Self { program };
        if !renderer.validate() {
            return Err(Error::RendererNotFound {
                program: name,
                tried: Some(renderer.program),
            });
        }
        info!("Using {}", renderer.program.display());
        Ok(renderer)
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Whether `<program> --version` runs and succeeds.
    pub fn validate(&self) -> bool {
        match Command::new(&self.program).arg("--version").output() {
            Ok(output) => output.status.success(),
            Err(e) => {
                debug!("{} failed to run: {e}", self.program.display());
                false
            }
        }
    }
}

impl Renderer for Wkhtml {
    fn render(&self, input: &Path, output: &Path, options: &RenderOptions) -> Result<()> {
        let args = option_args(options);
        debug!(
            "Running {} {} {} {}",
            self.program.display(),
            args.join(" "),
            input.display(),
            output.display()
        );

        let result = Command::new(&self.program)
            .arg("--quiet")
            .args(&args)
            .arg(input)
            .arg(output)
            .output()?;

        if result.status.success() {
            return Ok(());
        }

        // Exit code 1 is also used when some page resources failed to load
        // but the output was still written
        let written = output.metadata().map(|m| m.len() > 0).unwrap_or(false);
        let stderr = String::from_utf8_lossy(&result.stderr).trim().to_string();
        if result.status.code() == Some(1) && written {
            warn!("{} reported errors: {stderr}", self.program.display());
            return Ok(());
        }

        Err(Error::RendererFailed {
            program: self.program.display().to_string(),
            status: result.status.to_string(),
            stderr,
        })
    }
}

fn candidates(name: &str) -> Vec<PathBuf> {
    let dirs: &[&str] = if cfg!(windows) {
        &[
            r"C:\Program Files\wkhtmltopdf\bin",
            r"C:\Program Files (x86)\wkhtmltopdf\bin",
        ]
    } else if cfg!(target_os = "macos") {
        &[
            "/usr/local/bin",
            "/opt/homebrew/bin",
            "/Applications/wkhtmltopdf.app/Contents/MacOS",
        ]
    } else {
        &["/usr/local/bin", "/usr/bin", "/opt/wkhtmltox/bin"]
    };

    let file = if cfg!(windows) {
        format!("{name}.exe")
    } else {
        name.to_string()
    };
    dirs.iter().map(|dir| Path::new(dir).join(&file)).collect()
}

/// Command-line arguments for `options`.
pub fn option_args(options: &RenderOptions) -> Vec<String> {
    let mut args = Vec::with_capacity(options.len() * 2);
    for (key, value) in options {
        let key = key.trim().trim_start_matches('-');
        if key.is_empty() {
            continue;
        }
        args.push(format!("--{key}"));
        if !value.is_empty() {
            args.push(value.clone());
        }
    }
    args
}

fn options(pairs: &[(&str, &str)]) -> RenderOptions {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Base options for PDF output: A4 pages with a title header and page footer.
pub fn pdf_options() -> RenderOptions {
    options(&[
        ("page-size", "A4"),
        ("margin-top", "15mm"),
        ("margin-bottom", "15mm"),
        ("margin-left", "15mm"),
        ("margin-right", "15mm"),
        ("dpi", "300"),
        ("encoding", "UTF-8"),
        ("header-center", "[title]"),
        ("header-font-size", "8"),
        ("footer-center", "[page]/[topage]"),
        ("footer-font-size", "8"),
        ("enable-local-file-access", ""),
    ])
}

/// Base options for raster output.
pub fn image_options() -> RenderOptions {
    options(&[("encoding", "UTF-8"), ("enable-local-file-access", "")])
}
