//! Integration tests for the visible-markdown CLI.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn cli() -> Command {
    Command::new(env!("CARGO_BIN_EXE_visible-markdown"))
}

#[test]
fn test_basic_stdin() {
    cli()
        .write_stdin("<h1>Title</h1><p>Content</p>")
        .assert()
        .success()
        .stdout("# Title\n\nContent\n");
}

#[test]
fn test_file_input() {
    let temp_dir = TempDir::new().unwrap();
    let input_path = temp_dir.path().join("input.html");
    fs::write(&input_path, "<p>Test content</p>").unwrap();

    cli()
        .arg(input_path.to_str().unwrap())
        .assert()
        .success()
        .stdout("Test content\n");
}

#[test]
fn test_file_output() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().join("output.md");

    cli()
        .arg("-o")
        .arg(output_path.to_str().unwrap())
        .write_stdin("<p>Output test</p>")
        .assert()
        .success()
        .stdout("");

    let output = fs::read_to_string(&output_path).unwrap();
    assert_eq!(output, "Output test\n");
}

#[test]
fn test_dash_reads_stdin() {
    cli()
        .arg("-")
        .write_stdin("<p>From stdin</p>")
        .assert()
        .success()
        .stdout("From stdin\n");
}

#[test]
fn test_scope_all_includes_offscreen_content() {
    let html = "<p>Near</p><p style=\"top: 5000px\">Far away</p>";

    cli().write_stdin(html).assert().success().stdout("Near\n");

    cli()
        .arg("--scope")
        .arg("all")
        .write_stdin(html)
        .assert()
        .success()
        .stdout("Near\n\nFar away\n");
}

#[test]
fn test_viewport_height_moves_the_fold() {
    cli()
        .arg("--viewport-height")
        .arg("6000")
        .write_stdin("<p>Near</p><p style=\"top: 5000px\">Far away</p>")
        .assert()
        .success()
        .stdout("Near\n\nFar away\n");
}

#[test]
fn test_invalid_scope() {
    cli()
        .arg("--scope")
        .arg("everything")
        .write_stdin("<p>Test</p>")
        .assert()
        .failure();
}

#[test]
fn test_base_url() {
    cli()
        .arg("--base-url")
        .arg("https://example.com/docs/")
        .write_stdin("<p><a href=\"guide\">Guide</a></p>")
        .assert()
        .success()
        .stdout("[Guide](https://example.com/docs/guide)\n");
}

#[test]
fn test_invalid_base_url() {
    cli()
        .arg("--base-url")
        .arg("not a url")
        .write_stdin("<p>Test</p>")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error loading HTML"));
}

#[test]
fn test_min_visible_ratio_validation() {
    cli()
        .arg("--min-visible-ratio")
        .arg("1.5")
        .write_stdin("<p>Test</p>")
        .assert()
        .failure()
        .stderr(predicate::str::contains("min_visible_ratio"));
}

#[test]
fn test_max_depth_validation() {
    cli()
        .arg("--max-depth")
        .arg("0")
        .write_stdin("<p>Test</p>")
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_depth"));
}

#[test]
fn test_viewport_validation() {
    cli()
        .arg("--viewport-width")
        .arg("0")
        .write_stdin("<p>Test</p>")
        .assert()
        .failure()
        .stderr(predicate::str::contains("viewport"));
}

#[test]
fn test_snapshot_input() {
    let snapshot = r#"{
        "url": "https://example.com/articles/1",
        "viewport": {"width": 800, "height": 600},
        "root": {
            "type": "element",
            "tag": "body",
            "style": {"display": "block"},
            "rect": {"x": 0, "y": 0, "width": 800, "height": 2000},
            "children": [
                {
                    "type": "element",
                    "tag": "p",
                    "style": {"display": "block"},
                    "rect": {"x": 0, "y": 10, "width": 800, "height": 40},
                    "children": [{"type": "text", "text": "On screen"}]
                },
                {
                    "type": "element",
                    "tag": "p",
                    "style": {"display": "block"},
                    "rect": {"x": 0, "y": 1500, "width": 800, "height": 40},
                    "children": [{"type": "text", "text": "Below the fold"}]
                }
            ]
        }
    }"#;

    cli()
        .arg("--snapshot")
        .write_stdin(snapshot)
        .assert()
        .success()
        .stdout("On screen\n");
}

#[test]
fn test_invalid_snapshot() {
    cli()
        .arg("--snapshot")
        .write_stdin("<p>Not JSON</p>")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error loading snapshot"));
}

#[test]
fn test_hidden_content_and_chrome_are_skipped() {
    cli()
        .write_stdin("<nav><p>Menu</p></nav><p>Article</p><p style=\"display:none\">Secret</p>")
        .assert()
        .success()
        .stdout("Article\n");
}

#[test]
fn test_debug_flag() {
    cli().arg("--debug").write_stdin("<p>Test</p>").assert().success();
}

#[test]
fn test_encoding_utf8() {
    let temp_dir = TempDir::new().unwrap();
    let input_path = temp_dir.path().join("test.html");
    fs::write(&input_path, "<p>Test UTF-8: 你好</p>").unwrap();

    cli()
        .arg("--encoding")
        .arg("utf-8")
        .arg(input_path.to_str().unwrap())
        .assert()
        .success()
        .stdout(predicate::str::contains("你好"));
}

#[test]
fn test_encoding_windows_1252() {
    let temp_dir = TempDir::new().unwrap();
    let input_path = temp_dir.path().join("latin.html");
    fs::write(&input_path, b"<p>Caf\xe9 cr\xe8me</p>").unwrap();

    cli()
        .arg("--encoding")
        .arg("windows-1252")
        .arg(input_path.to_str().unwrap())
        .assert()
        .success()
        .stdout("Café crème\n");
}

#[test]
fn test_encoding_invalid() {
    cli()
        .arg("--encoding")
        .arg("invalid-encoding")
        .write_stdin("<p>Test</p>")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown encoding"));
}

#[test]
fn test_nonexistent_file() {
    cli()
        .arg("/nonexistent/file.html")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error reading file"));
}

#[test]
fn test_invalid_html() {
    cli().write_stdin("<p>Unclosed paragraph<p>Another").assert().success();
}

#[test]
fn test_empty_input() {
    cli().write_stdin("").assert().success().stdout("");
}

#[test]
fn test_complex_document() {
    let html = r#"
        <html>
            <head><title>Test Document</title></head>
            <body>
                <h1>Main Title</h1>
                <p>Introduction with <strong>bold</strong> and <em>italic</em>.</p>
                <ul>
                    <li>Item 1</li>
                    <li>Item 2
                        <ul>
                            <li>Nested item</li>
                        </ul>
                    </li>
                </ul>
                <pre><code class="language-rust">fn main() {
    println!("Hello");
}</code></pre>
                <p>Link: <a href="https://example.com/home">Example</a></p>
            </body>
        </html>
    "#;

    cli()
        .write_stdin(html)
        .assert()
        .success()
        .stdout(predicate::str::contains("# Main Title"))
        .stdout(predicate::str::contains("**bold**"))
        .stdout(predicate::str::contains("*italic*"))
        .stdout(predicate::str::contains("- Item 1"))
        .stdout(predicate::str::contains("  - Nested item"))
        .stdout(predicate::str::contains("```rust\nfn main() {\n    println!(\"Hello\");\n}\n```"))
        .stdout(predicate::str::contains("[Example](https://example.com/home)"))
        .stdout(predicate::str::contains("Test Document").not());
}

#[test]
fn test_version_flag() {
    cli()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_help_flag() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("Options:"));
}

#[test]
fn test_generate_completion_bash() {
    cli()
        .arg("--generate-completion")
        .arg("bash")
        .assert()
        .success()
        .stdout(predicate::str::contains("_visible__markdown()"));
}

#[test]
fn test_generate_completion_zsh() {
    cli()
        .arg("--generate-completion")
        .arg("zsh")
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_generate_man() {
    cli()
        .arg("--generate-man")
        .assert()
        .success()
        .stdout(predicate::str::contains(".TH"))
        .stdout(predicate::str::contains("visible-markdown"));
}
