use super::*;

use crate::options::LoaderKind;
use crate::refs::SourceIndex;
use crate::source::Source;

#[test]
fn errors_set_the_error_flag() {
    let log = Log::default();
    assert!(!log.has_errors());
    log.add_warning("a.js", Span::new(0, 1), "something odd");
    assert!(!log.has_errors());
    log.add_error("a.js", Span::new(0, 1), "something broken");
    assert!(log.has_errors());
}

#[test]
fn identical_diagnostics_are_deduplicated() {
    let log = Log::default();
    log.add_error("a.js", Span::new(0, 1), "boom");
    log.add_error("a.js", Span::new(0, 1), "boom");
    log.add_error("a.js", Span::new(0, 2), "boom");
    assert_eq!(log.take().len(), 2);
}

#[test]
fn error_limit_drops_overflow() {
    let log = Log::new(2);
    for i in 0..5 {
        log.add_error("a.js", Span::new(i, i + 1), format!("error {i}"));
    }
    assert_eq!(log.take().len(), 2);
    assert_eq!(log.errors_omitted(), 3);
}

#[test]
fn warnings_are_not_limited() {
    let log = Log::new(1);
    for i in 0..4 {
        log.add_warning("a.js", Span::new(i, i + 1), format!("warning {i}"));
    }
    assert_eq!(log.take().len(), 4);
}

#[test]
fn take_orders_by_path_then_span() {
    let log = Log::default();
    log.add_error("b.js", Span::new(0, 1), "later file");
    log.add_error("a.js", Span::new(9, 10), "later span");
    log.add_error("a.js", Span::new(2, 3), "earlier span");
    let all = log.take();
    assert_eq!(all[0].text, "earlier span");
    assert_eq!(all[1].text, "later span");
    assert_eq!(all[2].text, "later file");
}

#[test]
fn render_includes_caret_line() {
    let source = Source::new(SourceIndex(1), "/src/app.js", "let x = ;", LoaderKind::Js);
    let diagnostic = Diagnostic {
        level: LogLevel::Error,
        kind: DiagnosticKind::Syntax,
        path: "/src/app.js".to_string(),
        span: Span::new(8, 9),
        text: "unexpected \";\"".to_string(),
    };
    let rendered = render_diagnostic(&diagnostic, Some(&source), false);
    assert!(rendered.contains("/src/app.js:1:9: error: unexpected \";\""));
    assert!(rendered.contains("let x = ;"));
    assert!(rendered.ends_with("        ~"));
}
