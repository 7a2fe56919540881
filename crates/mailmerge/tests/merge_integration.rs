//! End-to-end merge runs against real files in temporary directories.

use std::fs;
use std::path::PathBuf;

use mailmerge::{
    FieldSelector, MailMerge, MergeError, MergeOptions, TableError, Transliteration,
};
use tempfile::TempDir;

const PEOPLE: &str = "\
Guest list, exported from the planning notes.

| name   | file |
|--------+------|
| Anna   | out1 |
| Bert   | out2 |

| later | block |
| is    | ignored |
";

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let ws = Self {
            dir: tempfile::tempdir().unwrap(),
        };
        fs::create_dir(ws.out()).unwrap();
        ws
    }

    fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn out(&self) -> PathBuf {
        self.dir.path().join("out")
    }

    fn read_out(&self, name: &str) -> String {
        fs::read_to_string(self.out().join(name)).unwrap()
    }

    fn out_names(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.out())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    fn merge(&self, options: MergeOptions) -> MailMerge {
        MailMerge::new(options.with_output_dir(self.out()))
    }
}

fn names(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

// ============================================================================
// Basic runs
// ============================================================================

#[test]
fn run_path_writes_one_file_per_row() {
    let ws = Workspace::new();
    let table = ws.write("people.org", PEOPLE);
    let template = ws.write("letter.txt", "Dear {{ name }}, see {{ file }}.");

    let report = ws.merge(MergeOptions::new()).run_path(&table, &template).unwrap();

    assert_eq!(names(&report.files), vec!["Anna.txt", "Bert.txt"]);
    assert_eq!(ws.read_out("Anna.txt"), "Dear Anna, see out1.");
    assert_eq!(ws.read_out("Bert.txt"), "Dear Bert, see out2.");
    assert_eq!(ws.out_names(), vec!["Anna.txt", "Bert.txt"]);
}

#[test]
fn run_lines_accepts_in_memory_table() {
    let ws = Workspace::new();
    let template = ws.write("letter.org", "* {{ name }}");
    let lines = ["x", "|name|file|", "|--|--|", "|Anna|out1|", "|Bert|out2|"];

    let options = MergeOptions::new().with_selector(FieldSelector::Name("file".into()));
    let report = ws.merge(options).run_lines(lines, &template).unwrap();

    assert_eq!(names(&report.files), vec!["out1.org", "out2.org"]);
    assert_eq!(ws.read_out("out2.org"), "* Bert");
}

#[test]
fn malformed_rows_are_skipped() {
    let ws = Workspace::new();
    let table = ws.write("t.org", "|name|file|\n|Anna|out1|\n|OnlyOneField|\n|Bert|out2|\n");
    let template = ws.write("t.txt", "{{ name }}");

    let report = ws.merge(MergeOptions::new()).run_path(&table, &template).unwrap();
    assert_eq!(names(&report.files), vec!["Anna.txt", "Bert.txt"]);
}

#[test]
fn header_only_table_writes_nothing() {
    let ws = Workspace::new();
    let table = ws.write("t.org", "|name|file|\n|----+----|\n");
    let template = ws.write("t.txt", "{{ name }}");

    let report = ws.merge(MergeOptions::new()).run_path(&table, &template).unwrap();
    assert!(report.is_empty());
    assert!(ws.out_names().is_empty());
}

#[test]
fn existing_files_are_overwritten() {
    let ws = Workspace::new();
    fs::write(ws.out().join("Anna.txt"), "stale content that is longer").unwrap();
    let table = ws.write("t.org", "|name|\n|Anna|\n");
    let template = ws.write("t.txt", "fresh");

    ws.merge(MergeOptions::new()).run_path(&table, &template).unwrap();
    assert_eq!(ws.read_out("Anna.txt"), "fresh");
}

#[test]
fn runs_are_idempotent() {
    let ws = Workspace::new();
    let table = ws.write("people.org", PEOPLE);
    let template = ws.write("letter.txt", "{% for k in ['a', 'b'] %}{{ k }}={{ name }}\n{% endfor %}");
    let merge = ws.merge(MergeOptions::new());

    merge.run_path(&table, &template).unwrap();
    let first: Vec<Vec<u8>> = ws
        .out_names()
        .iter()
        .map(|n| fs::read(ws.out().join(n)).unwrap())
        .collect();

    merge.run_path(&table, &template).unwrap();
    let second: Vec<Vec<u8>> = ws
        .out_names()
        .iter()
        .map(|n| fs::read(ws.out().join(n)).unwrap())
        .collect();

    assert_eq!(first, second);
}

// ============================================================================
// File naming
// ============================================================================

#[test]
fn transliteration_controls_file_names() {
    let ws = Workspace::new();
    let table = ws.write("t.org", "|name|\n|Müller|\n");
    let template = ws.write("t.txt", "{{ name }}");

    ws.merge(MergeOptions::new()).run_path(&table, &template).unwrap();
    ws.merge(MergeOptions::new().with_transliteration(Transliteration::Ascii))
        .run_path(&table, &template)
        .unwrap();
    ws.merge(MergeOptions::new().with_transliteration(Transliteration::German))
        .run_path(&table, &template)
        .unwrap();

    assert_eq!(ws.out_names(), vec!["Mueller.txt", "Muller.txt", "Müller.txt"]);
    // Only the name is transliterated, never the content.
    assert_eq!(ws.read_out("Muller.txt"), "Müller");
}

#[test]
fn extension_override_wins_over_template() {
    let ws = Workspace::new();
    let table = ws.write("t.org", "|name|\n|Anna|\n");
    let template = ws.write("t.j2", "{{ name }}");

    let report = ws
        .merge(MergeOptions::new().with_extension("html"))
        .run_path(&table, &template)
        .unwrap();
    assert_eq!(names(&report.files), vec!["Anna.html"]);
}

#[test]
fn template_without_extension_gives_bare_names() {
    let ws = Workspace::new();
    let table = ws.write("t.org", "|name|\n|Anna|\n");
    let template = ws.write("Template", "{{ name }}");

    let report = ws.merge(MergeOptions::new()).run_path(&table, &template).unwrap();
    assert_eq!(names(&report.files), vec!["Anna"]);
}

#[test]
fn duplicate_header_names_use_last_value() {
    let ws = Workspace::new();
    let table = ws.write("t.org", "|id|name|id|\n|first|Anna|second|\n");
    let template = ws.write("t.txt", "{{ id }}");

    let options = MergeOptions::new().with_selector(FieldSelector::Name("id".into()));
    ws.merge(options).run_path(&table, &template).unwrap();

    assert_eq!(ws.read_out("second.txt"), "second");
}

// ============================================================================
// Helpers and includes
// ============================================================================

#[test]
fn listdir_helper_lists_directory() {
    let ws = Workspace::new();
    let assets = ws.dir.path().join("assets");
    fs::create_dir(&assets).unwrap();
    fs::write(assets.join("b.png"), "").unwrap();
    fs::write(assets.join("a.png"), "").unwrap();

    let table = ws.write("t.org", &format!("|name|dir|\n|Anna|{}|\n", assets.display()));
    let template = ws.write("t.txt", "{{ listdir(dir) | join(',') }}");

    ws.merge(MergeOptions::new()).run_path(&table, &template).unwrap();
    assert_eq!(ws.read_out("Anna.txt"), "a.png,b.png");
}

#[test]
fn now_helper_is_a_utc_timestamp() {
    let ws = Workspace::new();
    let table = ws.write("t.org", "|name|\n|Anna|\n");
    let template = ws.write("t.txt", "{{ now }}");

    ws.merge(MergeOptions::new()).run_path(&table, &template).unwrap();

    let stamp = ws.read_out("Anna.txt");
    assert!(chrono::DateTime::parse_from_rfc3339(&stamp).is_ok(), "{stamp}");
}

#[test]
fn include_resolves_next_to_template() {
    let ws = Workspace::new();
    ws.write("footer.txt", "-- {{ name | upper }}");
    let table = ws.write("t.org", "|name|\n|Anna|\n");
    let template = ws.write("letter.txt", "Hello\n{% include 'footer.txt' %}");

    ws.merge(MergeOptions::new()).run_path(&table, &template).unwrap();
    assert_eq!(ws.read_out("Anna.txt"), "Hello\n-- ANNA");
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn unknown_field_is_fatal() {
    let ws = Workspace::new();
    let table = ws.write("people.org", PEOPLE);
    let template = ws.write("t.txt", "x");

    let options = MergeOptions::new().with_selector(FieldSelector::Name("email".into()));
    let err = ws.merge(options).run_path(&table, &template).unwrap_err();

    assert!(matches!(err, MergeError::UnknownField(ref f) if f == "email"));
    assert!(ws.out_names().is_empty());
}

#[test]
fn table_without_header_is_fatal() {
    let ws = Workspace::new();
    let table = ws.write("t.org", "no table here\n");
    let template = ws.write("t.txt", "x");

    let err = ws.merge(MergeOptions::new()).run_path(&table, &template).unwrap_err();
    assert!(matches!(err, MergeError::Table(TableError::MissingHeader { .. })));
}

#[test]
fn missing_table_file_is_fatal() {
    let ws = Workspace::new();
    let template = ws.write("t.txt", "x");

    let err = ws
        .merge(MergeOptions::new())
        .run_path(ws.dir.path().join("absent.org"), &template)
        .unwrap_err();
    assert!(matches!(err, MergeError::Table(TableError::Io { .. })));
}

#[test]
fn undefined_variable_is_fatal() {
    let ws = Workspace::new();
    let table = ws.write("people.org", PEOPLE);
    let template = ws.write("t.txt", "{{ surname }}");

    let err = ws.merge(MergeOptions::new()).run_path(&table, &template).unwrap_err();
    assert!(matches!(err, MergeError::Template(_)));
    assert!(ws.out_names().is_empty());
}

#[test]
fn template_syntax_error_is_fatal() {
    let ws = Workspace::new();
    let table = ws.write("people.org", PEOPLE);
    let template = ws.write("t.txt", "{% if name %}unterminated");

    let err = ws.merge(MergeOptions::new()).run_path(&table, &template).unwrap_err();
    assert!(matches!(err, MergeError::Template(_)));
}

#[test]
fn write_failure_is_fatal() {
    let ws = Workspace::new();
    fs::create_dir(ws.out().join("Anna.txt")).unwrap();
    let table = ws.write("t.org", "|name|\n|Anna|\n");
    let template = ws.write("t.txt", "x");

    let err = ws.merge(MergeOptions::new()).run_path(&table, &template).unwrap_err();
    match err {
        MergeError::Write { path, .. } => assert_eq!(path, ws.out().join("Anna.txt")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn absolute_field_value_cannot_escape_output_dir() {
    let ws = Workspace::new();
    let elsewhere = ws.dir.path().join("elsewhere");
    fs::create_dir(&elsewhere).unwrap();
    let table = ws.write("t.org", &format!("|name|\n|{}|\n", elsewhere.join("pwned").display()));
    let template = ws.write("t.txt", "x");

    let err = ws.merge(MergeOptions::new()).run_path(&table, &template).unwrap_err();

    assert!(matches!(err, MergeError::InvalidFileName(_)));
    assert!(!elsewhere.join("pwned.txt").exists());
    assert!(ws.out_names().is_empty());
}

#[test]
fn relative_field_value_cannot_escape_output_dir() {
    let ws = Workspace::new();
    let table = ws.write("t.org", "|name|\n|Anna|\n|../x|\n");
    let template = ws.write("t.txt", "x");

    let err = ws.merge(MergeOptions::new()).run_path(&table, &template).unwrap_err();

    assert!(matches!(err, MergeError::InvalidFileName(ref n) if n == "../x.txt"));
    assert!(!ws.dir.path().join("x.txt").exists());
    // Records before the bad one are already written.
    assert_eq!(ws.out_names(), vec!["Anna.txt"]);
}
