//! wordbook - Build word books from dictionary lookups

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Parser, ValueEnum};

use wordbook::export::RenderOptions;
use wordbook::{
    AssembleConfig, ExportConfig, ExportOptions, ExportReport, Exporter, ImageFormat,
    InvalidWordPolicy, OutputFormat, SourceDictionary, parse_word_list,
};

#[derive(Parser)]
#[command(name = "wordbook")]
#[command(version, about = "Build word books from dictionary lookups", long_about = None)]
#[command(after_help = "EXAMPLES:
    wordbook words.txt oald.txt words.html          Two-pane HTML page
    wordbook words.json oald.txt words.pdf          Paged PDF (needs wkhtmltopdf)
    wordbook words.xlsx oald.txt words.png --optimize
                                                    PNG with best compression")]
struct Cli {
    /// Word list (.txt, .md, .json, .xlsx, .xls, .ods)
    #[arg(value_name = "WORDLIST")]
    wordlist: PathBuf,

    /// Dictionary source file
    #[arg(value_name = "DICTIONARY")]
    dictionary: PathBuf,

    /// Output file (.html, .pdf, .jpg, .png, .webp, .bmp, .svg)
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Leave out the navigation pane (HTML only)
    #[arg(long)]
    no_toc: bool,

    /// What to do with words missing from the dictionary
    #[arg(long, value_enum, default_value_t = Policy::Collect)]
    policy: Policy,

    /// Extra CSS file appended to the dictionary stylesheet
    #[arg(long, value_name = "FILE")]
    css: Option<PathBuf>,

    /// Document title
    #[arg(long)]
    title: Option<String>,

    /// Path to wkhtmltopdf / wkhtmltoimage
    #[arg(long, value_name = "PATH")]
    renderer: Option<PathBuf>,

    /// Renderer option, repeatable (e.g. -O page-size=Letter)
    #[arg(short = 'O', value_name = "KEY=VALUE", value_parser = parse_option)]
    option: Vec<(String, String)>,

    /// JPEG or WebP quality (0-100)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    quality: Option<u8>,

    /// PNG: best compression with adaptive filtering
    #[arg(long)]
    optimize: bool,

    /// PNG compression level (0-9)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=9))]
    compress_level: Option<u8>,

    /// WebP: encode losslessly
    #[arg(long)]
    lossless: bool,

    /// Dictionary resource directory (images, stylesheets)
    #[arg(long, value_name = "DIR")]
    resources: Option<PathBuf>,

    /// Write missing words to <OUTPUT-STEM>.invalid.txt
    #[arg(long)]
    invalid_words: bool,

    /// Suppress output messages
    #[arg(short, long)]
    quiet: bool,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
enum Policy {
    Collect,
    Warn,
    Abort,
}

impl From<Policy> for InvalidWordPolicy {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::Collect => InvalidWordPolicy::Collect,
            Policy::Warn => InvalidWordPolicy::Warn,
            Policy::Abort => InvalidWordPolicy::Abort,
        }
    }
}

fn parse_option(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        Some(_) => Err(format!("missing option name in {s:?}")),
        None => Ok((s.trim().to_string(), String::new())),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(report) => {
            if !cli.quiet {
                print_report(&report);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn run(cli: &Cli) -> Result<ExportReport, String> {
    let list = parse_word_list(&cli.wordlist).map_err(|e| e.to_string())?;
    let dict = match &cli.resources {
        Some(dir) => SourceDictionary::open_with_resources(&cli.dictionary, Some(dir.clone())),
        None => SourceDictionary::open(&cli.dictionary),
    }
    .map_err(|e| e.to_string())?;

    let mut assemble = AssembleConfig::default().with_policy(cli.policy.into());
    if let Some(css) = &cli.css {
        let text = fs::read_to_string(css).map_err(|e| format!("{}: {e}", css.display()))?;
        assemble = assemble.with_extra_css(text);
    }
    if let Some(title) = &cli.title {
        assemble = assemble.with_title(title.clone());
    }

    let config = ExportConfig {
        assemble,
        scratch_dir: None,
        write_invalid_words: cli.invalid_words,
    };
    let options = export_options(cli, &cli.output)?;

    Exporter::new(&dict)
        .with_config(config)
        .export(&list, &options, &cli.output)
        .map_err(|e| e.to_string())
}

fn export_options(cli: &Cli, output: &Path) -> Result<ExportOptions, String> {
    let format = OutputFormat::from_path(output).map_err(|e| e.to_string())?;
    let renderer = cli.renderer.clone();
    let options: RenderOptions = cli.option.iter().cloned().collect();

    let options = match format {
        OutputFormat::Html => ExportOptions::Html {
            with_toc: !cli.no_toc,
        },
        OutputFormat::Pdf => ExportOptions::Pdf { renderer, options },
        OutputFormat::Image(format) => ExportOptions::Image {
            format: image_format(cli, format),
            renderer,
            options,
        },
    };
    Ok(options)
}

fn image_format(cli: &Cli, format: ImageFormat) -> ImageFormat {
    match format {
        ImageFormat::Jpeg { quality } => ImageFormat::Jpeg {
            quality: cli.quality.unwrap_or(quality),
        },
        ImageFormat::Png {
            optimize,
            compress_level,
        } => ImageFormat::Png {
            optimize: optimize || cli.optimize,
            compress_level: cli.compress_level.unwrap_or(compress_level),
        },
        ImageFormat::Webp { quality, lossless } => ImageFormat::Webp {
            quality: cli.quality.map(f32::from).unwrap_or(quality),
            lossless: lossless || cli.lossless,
        },
        other => other,
    }
}

fn print_report(report: &ExportReport) {
    let stats = report.stats;
    println!("Output: {}", report.output.display());
    println!("Found: {}", stats.found);
    println!("Not found: {}", stats.not_found);
    println!("Success rate: {:.1}%", stats.success_rate() * 100.0);

    if !report.invalid_words.is_empty() {
        println!();
        print!("{}", report.invalid_words.to_text());
    }
    if let Some(path) = &report.invalid_words_file {
        println!("Missing words written to {}", path.display());
    }
}
