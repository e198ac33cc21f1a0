use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use a2l::parser::ParseError;
use decoder::Document;

const FIXTURE_SUFFIX: &str = ".test.a2l";

#[derive(Debug, Deserialize)]
pub struct ExpectedWarning {
    /// Substring that must appear in the warning message.
    pub contains: String,

    /// If set, the warning's span must start on this 1-based line of the
    /// comment-stripped source.
    #[serde(default)]
    pub line: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestConfig {
    /// Human-readable test description.
    #[serde(default)]
    pub description: Option<String>,

    /// Expected first argument of the PROJECT block.
    #[serde(default)]
    pub expect_project: Option<String>,

    /// Expected first argument of the MODULE block.
    #[serde(default)]
    pub expect_module: Option<String>,

    /// Expected entity counts, keyed by the labels of `Document::entity_counts`.
    /// Labels that are not listed are not checked.
    #[serde(default)]
    pub expect_counts: BTreeMap<String, usize>,

    /// Expected structural warnings. If present (even empty), warning count
    /// and content are checked.
    #[serde(default)]
    pub expect_warnings: Option<Vec<ExpectedWarning>>,
}

/// Split a `.test.a2l` file into its TOML front matter and A2L source.
fn parse_test_file(content: &str) -> Result<(TestConfig, &str), String> {
    let content = content.trim_start_matches('\u{feff}'); // strip BOM

    let after_open = content
        .strip_prefix("---")
        .ok_or("missing opening --- front matter delimiter")?;
    let after_open = after_open
        .strip_prefix('\n')
        .or_else(|| after_open.strip_prefix("\r\n"))
        .unwrap_or(after_open);

    let close_pos = after_open
        .find("\n---")
        .ok_or("missing closing --- front matter delimiter")?;

    let toml_str = after_open[..close_pos].trim_end_matches('\r');
    let rest = &after_open[close_pos + 4..]; // skip \n---
    let source = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))
        .unwrap_or(rest);

    let config: TestConfig =
        toml::from_str(toml_str).map_err(|e| format!("TOML parse error: {}", e))?;

    Ok((config, source))
}

pub enum TestOutcome {
    Pass,
    Fail(String),
}

pub struct TestResult {
    pub path: PathBuf,
    pub description: Option<String>,
    pub outcome: TestOutcome,
}

impl TestResult {
    fn label(&self) -> &str {
        self.description.as_deref().unwrap_or_else(|| {
            self.path
                .file_name()
                .and_then(|s| s.to_str())
                .map_or("?", |name| name.trim_end_matches(FIXTURE_SUFFIX))
        })
    }
}

fn run_single_test(path: &Path) -> TestResult {
    let (description, outcome) = match std::fs::read_to_string(path) {
        Ok(content) => match parse_test_file(&content) {
            Ok((config, source)) => (config.description.clone(), evaluate(&config, source)),
            Err(e) => (None, Err(format!("front matter error: {}", e))),
        },
        Err(e) => (None, Err(format!("cannot read file: {}", e))),
    };

    TestResult {
        path: path.to_path_buf(),
        description,
        outcome: match outcome {
            Ok(()) => TestOutcome::Pass,
            Err(reason) => TestOutcome::Fail(reason),
        },
    }
}

/// Parse and decode `source`, then check every expectation in `config`.
fn evaluate(config: &TestConfig, source: &str) -> Result<(), String> {
    let program = a2l::parser::Parser::new(source.to_string(), 0).parse();
    let document = decoder::decode_program(&program);

    check_name("project", &config.expect_project, &document.project_name)?;
    check_name("module", &config.expect_module, &document.module_name)?;
    check_counts(&document, &config.expect_counts)?;

    if let Some(expected_warnings) = &config.expect_warnings {
        check_warnings(&program.source, &program.warnings, expected_warnings)?;
    }

    Ok(())
}

fn check_name(what: &str, expected: &Option<String>, actual: &Option<String>) -> Result<(), String> {
    match expected {
        Some(expected) if actual.as_deref() != Some(expected.as_str()) => Err(format!(
            "expected {} \"{}\", got: {}",
            what,
            expected,
            actual.as_deref().unwrap_or("(none)")
        )),
        _ => Ok(()),
    }
}

fn check_counts(document: &Document, expected: &BTreeMap<String, usize>) -> Result<(), String> {
    let actual: BTreeMap<&str, usize> = document.entity_counts().into_iter().collect();

    let mut mismatches = Vec::new();
    for (label, expected_count) in expected {
        match actual.get(label.as_str()) {
            None => mismatches.push(format!(
                "unknown entity label \"{}\" (known: {})",
                label,
                actual.keys().copied().collect::<Vec<_>>().join(", ")
            )),
            Some(count) if count != expected_count => mismatches.push(format!(
                "{}: expected {}, got {}",
                label, expected_count, count
            )),
            Some(_) => {}
        }
    }

    if mismatches.is_empty() {
        Ok(())
    } else {
        Err(format!("count mismatch\n  {}", mismatches.join("\n  ")))
    }
}

/// Convert a byte offset in `source` to a 1-based line number.
fn byte_offset_to_line(source: &str, offset: usize) -> usize {
    source.as_bytes()[..offset.min(source.len())]
        .iter()
        .filter(|&&b| b == b'\n')
        .count()
        + 1
}

/// Check that actual warnings match expectations, in order.
fn check_warnings(
    source: &str,
    warnings: &[ParseError],
    expected: &[ExpectedWarning],
) -> Result<(), String> {
    if warnings.len() != expected.len() {
        let actual_msgs: Vec<String> = warnings.iter().map(|w| format!("  - {}", w)).collect();
        return Err(format!(
            "expected {} warning(s), got {}\n  actual warnings:\n{}",
            expected.len(),
            warnings.len(),
            if actual_msgs.is_empty() {
                "    (none)".to_string()
            } else {
                actual_msgs.join("\n")
            }
        ));
    }

    for (i, (actual, expected)) in warnings.iter().zip(expected).enumerate() {
        if !actual.message.contains(&expected.contains) {
            return Err(format!(
                "warning[{}]: expected message containing \"{}\", got: {}",
                i, expected.contains, actual.message
            ));
        }

        if let Some(expected_line) = expected.line {
            let actual_line = byte_offset_to_line(source, actual.span.start);
            if actual_line != expected_line {
                return Err(format!(
                    "warning[{}]: expected on line {}, but span is on line {}",
                    i, expected_line, actual_line
                ));
            }
        }
    }

    Ok(())
}

/// Discover fixture files grouped by category (subfolder relative to root).
/// Files directly in `root` get category "" (uncategorized).
fn discover_categorized(root: &Path) -> BTreeMap<String, Vec<PathBuf>> {
    let mut categories: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    collect_tests(root, root, &mut categories);
    for files in categories.values_mut() {
        files.sort();
    }
    categories
}

fn collect_tests(dir: &Path, root: &Path, out: &mut BTreeMap<String, Vec<PathBuf>>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_tests(&path, root, out);
        } else if path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| name.ends_with(FIXTURE_SUFFIX))
        {
            let category = path
                .parent()
                .and_then(|p| p.strip_prefix(root).ok())
                .map(|p| p.to_string_lossy().replace('\\', "/"))
                .unwrap_or_default();
            out.entry(category).or_default().push(path);
        }
    }
}

fn category_label(category: &str) -> &str {
    if category.is_empty() { "(root)" } else { category }
}

/// List available categories for the given test path.
pub fn list_categories(path: &Path) {
    if path.is_file() {
        eprintln!("(single file, no categories)");
        return;
    }

    let categories = discover_categorized(path);
    if categories.is_empty() {
        eprintln!("no {} files found in {}", FIXTURE_SUFFIX, path.display());
        return;
    }

    eprintln!("available categories:");
    for (category, files) in &categories {
        eprintln!("  {} ({} tests)", category_label(category), files.len());
    }
}

/// Keep the categories named in `requested`, including their subcategories.
/// An empty request keeps everything.
fn select_categories<'a>(
    all: &'a BTreeMap<String, Vec<PathBuf>>,
    requested: &[String],
) -> BTreeMap<&'a str, &'a Vec<PathBuf>> {
    if requested.is_empty() {
        return all.iter().map(|(k, v)| (k.as_str(), v)).collect();
    }

    let mut selected = BTreeMap::new();
    for request in requested {
        let request = request.trim_matches('/');
        let prefix = format!("{}/", request);
        let before = selected.len();
        for (category, files) in all {
            if category == request || category.starts_with(&prefix) {
                selected.insert(category.as_str(), files);
            }
        }
        if selected.len() == before {
            eprintln!(
                "warning: category '{}' not found (available: {})",
                request,
                all.keys()
                    .map(|k| category_label(k))
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
    }
    selected
}

struct Style {
    no_color: bool,
}

impl Style {
    fn paint(&self, text: &str, code: &str) -> String {
        if self.no_color {
            text.to_string()
        } else {
            format!("\x1b[{}m{}\x1b[0m", code, text)
        }
    }

    fn pass(&self) -> String {
        self.paint("PASS", "32")
    }

    fn fail(&self) -> String {
        self.paint("FAIL", "31")
    }

    fn bold(&self, text: &str) -> String {
        self.paint(text, "1")
    }
}

/// Run every fixture under `path` (or a single file).
/// If `categories` is non-empty, only run tests in those categories.
/// Returns exit code: 0 = all pass, 1 = any failure.
pub fn run_tests(path: &Path, no_color: bool, categories: &[String]) -> i32 {
    let style = Style { no_color };

    let groups: Vec<(String, Vec<PathBuf>)> = if path.is_file() {
        vec![(String::new(), vec![path.to_path_buf()])]
    } else {
        let all = discover_categorized(path);
        if all.is_empty() {
            eprintln!("no {} files found in {}", FIXTURE_SUFFIX, path.display());
            return 1;
        }
        let selected = select_categories(&all, categories);
        if selected.is_empty() {
            eprintln!("no matching categories found");
            return 1;
        }
        selected
            .into_iter()
            .map(|(category, files)| (category.to_string(), files.clone()))
            .collect()
    };
    let single_file = path.is_file();

    let mut passed = 0usize;
    let mut failures: Vec<TestResult> = Vec::new();

    for (category, files) in &groups {
        if !single_file {
            eprintln!();
            eprintln!("{}", style.bold(category_label(category)));
        }

        for file in files {
            let result = run_single_test(file);
            match &result.outcome {
                TestOutcome::Pass => {
                    passed += 1;
                    eprintln!("  {}  {}", style.pass(), result.label());
                }
                TestOutcome::Fail(_) => {
                    eprintln!("  {}  {}", style.fail(), result.label());
                    failures.push(result);
                }
            }
        }
    }

    if !failures.is_empty() {
        eprintln!();
        eprintln!("failures:");
        for failure in &failures {
            eprintln!();
            eprintln!("  --- {} ---", failure.path.display());
            if let TestOutcome::Fail(reason) = &failure.outcome {
                for line in reason.lines() {
                    eprintln!("  {}", line);
                }
            }
        }
    }

    eprintln!();
    if failures.is_empty() {
        eprintln!(
            "test result: {}. {} passed, 0 failed",
            style.paint("ok", "32"),
            passed
        );
        0
    } else {
        eprintln!(
            "test result: {}. {} passed, {} failed (of {})",
            style.paint("FAILED", "31"),
            passed,
            failures.len(),
            passed + failures.len()
        );
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    const PASSING: &str = "---\n\
        description = \"minimal project\"\n\
        expect_project = \"P\"\n\
        expect_module = \"M\"\n\
        expect_counts = { measurements = 1, groups = 0 }\n\
        expect_warnings = []\n\
        ---\n\
        /begin PROJECT P\n\
        /begin MODULE M\n\
        /begin MEASUREMENT m\n\"d\"\nUBYTE\nNO_COMPU_METHOD\n/end MEASUREMENT\n\
        /end MODULE\n\
        /end PROJECT\n";

    fn write(dir: &Path, relative: &str, content: &str) -> PathBuf {
        let path = dir.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create fixture dir");
        }
        fs::write(&path, content).expect("write fixture");
        path
    }

    #[test]
    fn splits_front_matter_from_source() {
        let (config, source) = parse_test_file(PASSING).expect("valid fixture");
        assert_eq!(config.description.as_deref(), Some("minimal project"));
        assert_eq!(config.expect_counts.get("measurements"), Some(&1));
        assert!(source.starts_with("/begin PROJECT P\n"));
    }

    #[test]
    fn missing_delimiters_are_reported() {
        let err = parse_test_file("/begin PROJECT P\n").err().expect("no front matter");
        assert!(err.contains("opening"));
        let err = parse_test_file("---\ndescription = \"x\"\n").err().expect("unclosed");
        assert!(err.contains("closing"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = parse_test_file("---\nexpect_output = \"x\"\n---\n").err().expect("unknown key");
        assert!(err.contains("TOML"));
    }

    #[test]
    fn passing_fixture() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write(dir.path(), "ok.test.a2l", PASSING);
        let result = run_single_test(&path);
        assert!(matches!(result.outcome, TestOutcome::Pass));
        assert_eq!(result.label(), "minimal project");
    }

    #[test]
    fn count_and_name_mismatches_fail() {
        let dir = tempfile::tempdir().expect("tempdir");
        let fixture = PASSING
            .replace("measurements = 1", "measurements = 3")
            .replace("expect_project = \"P\"", "expect_project = \"Q\"");
        let path = write(dir.path(), "bad.test.a2l", &fixture);
        match run_single_test(&path).outcome {
            TestOutcome::Fail(reason) => assert!(reason.contains("project"), "{}", reason),
            TestOutcome::Pass => panic!("expected failure"),
        }

        let fixture = PASSING.replace("measurements = 1", "widgets = 1");
        let path = write(dir.path(), "label.test.a2l", &fixture);
        match run_single_test(&path).outcome {
            TestOutcome::Fail(reason) => assert!(reason.contains("unknown entity label")),
            TestOutcome::Pass => panic!("expected failure"),
        }
    }

    #[test]
    fn warnings_are_matched_by_message_and_line() {
        let source = "/begin PROJECT P\n/end MODULE\n/end PROJECT\n";
        let program = a2l::parser::Parser::new(source.to_string(), 0).parse();
        assert_eq!(program.warnings.len(), 2);

        let expected = vec![
            ExpectedWarning { contains: "closes block `PROJECT`".to_string(), line: Some(2) },
            ExpectedWarning { contains: "unmatched".to_string(), line: Some(3) },
        ];
        assert!(check_warnings(&program.source, &program.warnings, &expected).is_ok());

        let wrong_line = vec![
            ExpectedWarning { contains: "closes".to_string(), line: Some(1) },
            ExpectedWarning { contains: "unmatched".to_string(), line: None },
        ];
        let err = check_warnings(&program.source, &program.warnings, &wrong_line).unwrap_err();
        assert!(err.contains("line 2"));

        let err = check_warnings(&program.source, &program.warnings, &[]).unwrap_err();
        assert!(err.contains("expected 0 warning(s), got 2"));
    }

    #[test]
    fn discovers_fixtures_by_category() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(dir.path(), "root.test.a2l", PASSING);
        write(dir.path(), "xcp/daq.test.a2l", PASSING);
        write(dir.path(), "xcp/can/fd.test.a2l", PASSING);
        write(dir.path(), "xcp/notes.md", "not a fixture");

        let all = discover_categorized(dir.path());
        let names: Vec<&str> = all.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["", "xcp", "xcp/can"]);

        let selected = select_categories(&all, &["xcp/".to_string()]);
        assert_eq!(selected.keys().copied().collect::<Vec<_>>(), vec!["xcp", "xcp/can"]);

        assert_eq!(run_tests(dir.path(), true, &[]), 0);
        assert_eq!(run_tests(dir.path(), true, &["missing".to_string()]), 1);
    }

    #[test]
    fn bundled_fixtures_pass() {
        let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
        assert_eq!(run_tests(&fixtures, true, &[]), 0);
    }
}
