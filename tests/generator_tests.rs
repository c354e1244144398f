//! End-to-end runs over parsed sources, reusing one session across runs
use attribute_validator::diagnostics::{Diagnostic, Span};
use attribute_validator::{Compilation, Generator, Session};

fn run(session: &mut Session, source: &str, file_path: &str) -> Vec<Diagnostic> {
    let compilation = Compilation::from_sources([(file_path, source)]);
    session
        .advance(&compilation)
        .expect("run succeeds")
        .diagnostics
        .clone()
}

fn verify_diagnostics(expected: &[(&str, usize, Option<&str>)], actual: &[Diagnostic]) {
    assert_eq!(expected.len(), actual.len(), "diagnostics: {:?}", actual);

    for ((path, start, message), diagnostic) in expected.iter().zip(actual) {
        assert_eq!(diagnostic.location.path, *path);
        assert_eq!(diagnostic.location.span, Span::new(*start, 1));
        if let Some(message) = message {
            assert_eq!(diagnostic.message, *message);
        }
    }
}

#[test]
fn test_simple() {
    let mut session = Session::new(Generator::default());

    let diagnostics = run(&mut session, "[Error(\"Hello?\")]\nclass C { }", "file.cs");
    verify_diagnostics(
        &[("file.cs", 0, Some(r#"Illegal character '?' in message "Hello?""#))],
        &diagnostics,
    );

    let diagnostics = run(&mut session, "[Error(\"Hello??\")]\nclass C { }", "file.cs");
    verify_diagnostics(&[("file.cs", 0, None), ("file.cs", 1, None)], &diagnostics);

    let diagnostics = run(&mut session, "[Error(\"Hello\")]\nclass C { }", "file.cs");
    verify_diagnostics(&[], &diagnostics);

    assert_eq!(session.runs(), 3);
}

#[test]
fn test_boundary() {
    let code = r#"// See https://aka.ms/new-console-template for more information
using System;

Console.WriteLine("Hello, World!");

[Error("hello???")]
class C { }
"#;
    let mut session = Session::new(Generator::default());
    let diagnostics = run(&mut session, code, "program.cs");

    let start = code.find("[Error").unwrap();
    verify_diagnostics(
        &[
            ("program.cs", start, None),
            ("program.cs", start + 1, None),
            ("program.cs", start + 2, None),
        ],
        &diagnostics,
    );
}

#[test]
fn test_attribute_spellings() {
    let code = r#"
[ErrorAttribute("a?")]
class A { }

[My.Namespace.Error(@"b?")]
class B { }

[Obsolete("c?")]
class C { }
"#;
    let mut session = Session::new(Generator::default());
    let diagnostics = run(&mut session, code, "file.cs");

    assert_eq!(diagnostics.len(), 2);
    assert_eq!(diagnostics[0].location.span.start, code.find("[ErrorAttribute").unwrap());
    assert_eq!(diagnostics[1].location.span.start, code.find("[My.").unwrap());
}

#[test]
fn test_multiple_attributes_on_one_target() {
    let code = "[Error(\"??\")]\n[Error(\"x?\")]\nclass C { }";
    let mut session = Session::new(Generator::default());
    let diagnostics = run(&mut session, code, "file.cs");

    // Both usages share the target's start and restart the count
    let starts: Vec<_> = diagnostics.iter().map(|d| d.location.span.start).collect();
    assert_eq!(starts, vec![0, 1, 0]);
}

#[test]
fn test_malformed_usages_are_skipped() {
    let code = r#"
[Error]
class A { }

[Error("a?", "b?")]
class B { }

[Error(42)]
class C { }
"#;
    let mut session = Session::new(Generator::default());
    assert!(run(&mut session, code, "file.cs").is_empty());
}

#[test]
fn test_named_message_argument() {
    let mut session = Session::new(Generator::default());
    let diagnostics = run(&mut session, "[Error(message: \"Hello?\")] class C { }", "f.cs");

    verify_diagnostics(
        &[("f.cs", 0, Some(r#"Illegal character '?' in message "Hello?""#))],
        &diagnostics,
    );
}

#[test]
fn test_constant_concatenation() {
    let mut session = Session::new(Generator::default());
    let diagnostics = run(&mut session, "[Error(\"Hello\" + \"?\")] class C { }", "f.cs");

    verify_diagnostics(
        &[("f.cs", 0, Some(r#"Illegal character '?' in message "Hello?""#))],
        &diagnostics,
    );
}

#[test]
fn test_enum_members_and_parameters() {
    let code = r#"
enum E { A, [Error("x?")] B }

class C { void M([Error("y?")] int a) { } }
"#;
    let mut session = Session::new(Generator::default());
    let diagnostics = run(&mut session, code, "f.cs");

    verify_diagnostics(
        &[
            ("f.cs", code.find("[Error(\"x").unwrap(), None),
            ("f.cs", code.find("[Error(\"y").unwrap(), None),
        ],
        &diagnostics,
    );
}

#[test]
fn test_files_report_in_registration_order() {
    let compilation = Compilation::from_sources([
        ("b.cs", "[Error(\"?\")] class B { }"),
        ("a.cs", "[Error(\"?\")] class A { }"),
    ]);
    let result = Generator::default().run(&compilation).unwrap();

    let paths: Vec<_> = result
        .diagnostics
        .iter()
        .map(|d| d.location.path.as_str())
        .collect();
    assert_eq!(paths, vec!["b.cs", "a.cs"]);
}

#[test]
fn test_generated_attribute_declaration() {
    let result = Generator::default().run(&Compilation::new()).unwrap();

    assert!(result.diagnostics.is_empty());
    assert_eq!(result.generated_sources.len(), 1);
    let generated = &result.generated_sources[0];
    assert_eq!(generated.hint_name, "ErrorAttribute.cs");
    assert!(generated
        .text
        .contains("public ErrorAttribute(string message) => Message = message;"));
}

#[test]
fn test_offsets_count_utf8_bytes() {
    let code = "// café\n[Error(\"?\")] class C { }";
    let mut session = Session::new(Generator::default());
    let diagnostics = run(&mut session, code, "f.cs");

    // 'é' takes two bytes, so the list opens at byte 9, not column 8
    verify_diagnostics(&[("f.cs", 9, None)], &diagnostics);
}
