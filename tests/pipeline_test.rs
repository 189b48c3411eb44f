//! End-to-end tests: word list in, assembled document out.

use std::fs;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use tempfile::TempDir;
use wordbook::{
    AssembleConfig, Assembler, Dictionary, ExportConfig, ExportOptions, Exporter,
    InvalidWordPolicy, Lookup, MemoryDictionary, SourceDictionary, WordList, parse_text,
    parse_word_list,
};

const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

fn fixture_path(name: &str) -> String {
    format!("{}/{}", FIXTURES_DIR, name)
}

fn fixture_dict() -> SourceDictionary {
    SourceDictionary::open(fixture_path("dict.txt")).expect("Failed to open dictionary")
}

fn html_of(bytes: &[u8]) -> String {
    String::from_utf8(bytes.to_vec()).expect("Output is not UTF-8")
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_collect_counts_missing_words() {
    let list = parse_text("#Lesson1\napple\nbanana");
    let dict = MemoryDictionary::new().with_entry("apple", "<div>fruit</div>");

    let assembly = Assembler::new(&dict).assemble(&list).unwrap();

    assert_eq!(assembly.stats.found, 1);
    assert_eq!(assembly.stats.not_found, 1);
    assert_eq!(assembly.invalid_words.iter().count(), 1);
    assert_eq!(assembly.invalid_words.get("Lesson1").unwrap(), ["banana"]);
}

#[test]
fn test_redirect_content_under_source_anchor() {
    let list = parse_word_list(fixture_path("words.json")).unwrap();
    let dict = MemoryDictionary::new()
        .with_entry("x", "@@@LINK=y")
        .with_entry("y", "<div>Y</div>");

    let assembly = Assembler::new(&dict).assemble(&list).unwrap();
    let html = html_of(&assembly.html);

    assert!(html.contains(r#"<div id="word_x" class="entry"><div>Y</div></div>"#));
    assert!(!html.contains("@@@LINK"));
}

// ============================================================================
// Fixture dictionary
// ============================================================================

#[test]
fn test_fixture_pipeline() {
    let list = parse_word_list(fixture_path("words.txt")).unwrap();
    let dict = fixture_dict();

    let assembly = Assembler::new(&dict).assemble(&list).unwrap();
    let html = html_of(&assembly.html);

    assert_eq!(assembly.stats.found, 4);
    assert_eq!(assembly.stats.not_found, 2);
    assert_eq!(assembly.stats.total(), list.word_count());

    // Fallbacks: hyphen, redirect, case
    assert!(html.contains(r#"<div id="word_pre-school" class="entry">"#));
    assert!(html.contains(r#"<div id="word_color" class="entry"><div class="def">hue</div>"#));
    assert!(html.contains(r#"<div id="word_pear" class="entry">"#));

    // Stylesheet from the resource directory, inlined
    assert!(html.contains(".def { font-family: serif; }"));
    assert!(!html.contains("dict.css"));

    // Both references to the same image are embedded
    assert_eq!(html.matches("data:image/png;base64,").count(), 2);
    assert!(!html.contains("img/apple.png"));
}

#[test]
fn test_found_plus_missing_is_total() {
    let dict = fixture_dict();
    let inputs = [
        "#A\napple\nbanana\ncolor",
        "loose\n#B\n#C\nPEAR\npre-school",
        "",
        "#only\n\n\n",
    ];

    for input in inputs {
        let list = parse_text(input);
        let assembly = Assembler::new(&dict).assemble(&list).unwrap();
        assert_eq!(
            assembly.stats.total(),
            list.word_count(),
            "input {input:?}"
        );
    }
}

#[test]
fn test_lookup_properties_on_fixture() {
    let dict = fixture_dict();
    let lookup = Lookup::new(&dict);

    assert_eq!(lookup.lookup("color"), lookup.lookup("colour"));
    assert_eq!(lookup.lookup("PEAR"), lookup.lookup("Pear"));
    assert!(!lookup.lookup("pre-school").is_empty());
    assert!(lookup.lookup("cherry").is_empty());
    assert!(dict.resource("\\img\\apple.png").is_some());
}

// ============================================================================
// Policies and cancellation
// ============================================================================

#[test]
fn test_warn_policy_keeps_going() {
    let list = parse_word_list(fixture_path("words.txt")).unwrap();
    let dict = fixture_dict();
    let config = AssembleConfig::default().with_policy(InvalidWordPolicy::Warn);

    let assembly = Assembler::new(&dict).with_config(config).assemble(&list).unwrap();
    let html = html_of(&assembly.html);

    assert!(html.contains(r#""banana" not found"#));
    assert!(html.contains(r#""cherry" not found"#));
    assert_eq!(assembly.invalid_words.word_count(), 2);
}

#[test]
fn test_abort_policy_fails_export_without_output() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.html");
    let list = parse_word_list(fixture_path("words.txt")).unwrap();
    let dict = fixture_dict();

    let config = ExportConfig {
        assemble: AssembleConfig::default().with_policy(InvalidWordPolicy::Abort),
        ..Default::default()
    };
    let result = Exporter::new(&dict)
        .with_config(config)
        .export(&list, &ExportOptions::Html { with_toc: true }, &output);

    assert!(matches!(result, Err(wordbook::Error::WordNotFound { .. })));
    assert!(!output.exists());
}

#[test]
fn test_cancelled_before_first_lesson() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.html");
    let list = parse_word_list(fixture_path("words.txt")).unwrap();
    let dict = fixture_dict();

    let flag = Arc::new(AtomicBool::new(true));
    let config = ExportConfig {
        assemble: AssembleConfig::default().with_cancel(flag),
        ..Default::default()
    };
    let result = Exporter::new(&dict)
        .with_config(config)
        .export(&list, &ExportOptions::Html { with_toc: true }, &output);

    assert!(matches!(result, Err(wordbook::Error::Cancelled)));
    assert!(!output.exists());
}

// ============================================================================
// HTML export
// ============================================================================

#[test]
fn test_html_export_with_invalid_words_file() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("nested/out/words.html");
    let list = parse_word_list(fixture_path("words.txt")).unwrap();
    let dict = fixture_dict();

    let config = ExportConfig {
        write_invalid_words: true,
        ..Default::default()
    };
    let options = ExportOptions::for_path(&output).unwrap();
    let report = Exporter::new(&dict)
        .with_config(config)
        .export(&list, &options, &output)
        .unwrap();

    let html = fs::read_to_string(&output).unwrap();
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains(r#"<div class="toc">"#));

    let companion = report.invalid_words_file.expect("Missing words file");
    assert_eq!(companion, dir.path().join("nested/out/words.invalid.txt"));

    // The log reads back as the same lessons
    let reread = parse_word_list(&companion).unwrap();
    assert_eq!(reread, report.invalid_words.to_word_list());
    assert_eq!(
        fs::read_to_string(&companion).unwrap(),
        "#Lesson1\nbanana\n\n#Lesson2\ncherry\n"
    );
}

#[test]
fn test_no_invalid_words_file_when_all_found() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("all.html");
    let list = parse_text("#L\napple\ncolor");

    let config = ExportConfig {
        write_invalid_words: true,
        ..Default::default()
    };
    let report = Exporter::new(&fixture_dict())
        .with_config(config)
        .export(&list, &ExportOptions::Html { with_toc: false }, &output)
        .unwrap();

    assert!(report.invalid_words_file.is_none());
    assert!(!dir.path().join("all.invalid.txt").exists());
    assert!(!fs::read_to_string(&output).unwrap().contains("class=\"toc\""));
}

#[test]
fn test_empty_word_list() {
    let dict = MemoryDictionary::new();
    let assembly = Assembler::new(&dict).assemble(&WordList::default()).unwrap();
    assert_eq!(assembly.stats.total(), 0);
    assert!(assembly.invalid_words.is_empty());
    assert!(html_of(&assembly.html).contains("<body>"));
}
