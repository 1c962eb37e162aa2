// src/errors/report.rs
//! Rendering utilities for miette diagnostics.

use miette::{Diagnostic, GraphicalReportHandler, GraphicalTheme, NamedSource, ThemeCharacters, ThemeStyles};

use crate::sema::TypeError;

/// Plain ascii output, stable enough to compare in tests.
fn plain_handler() -> GraphicalReportHandler {
    let theme = GraphicalTheme {
        characters: ThemeCharacters::ascii(),
        styles: ThemeStyles::none(),
    };
    GraphicalReportHandler::new_themed(theme)
}

/// Render one diagnostic without colors.
pub fn render_to_string(report: &dyn Diagnostic) -> String {
    let mut output = String::new();
    let handler = plain_handler();
    let _ = handler.render_report(&mut output, report);
    output
}

/// Render every analyzer diagnostic against `source`, in report order.
pub fn render_type_errors(errors: &[TypeError], file_name: &str, source: &str) -> String {
    errors
        .iter()
        .map(|error| {
            let report = miette::Report::new(error.error.clone())
                .with_source_code(NamedSource::new(file_name, source.to_string()));
            render_to_string(report.as_ref())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SemanticError;
    use miette::NamedSource;

    #[test]
    fn render_semantic_error_to_string() {
        let err = SemanticError::UndefinedVariable {
            name: "y".to_string(),
            span: (8, 1).into(),
        };
        let report = miette::Report::new(err)
            .with_source_code(NamedSource::new("test.lark", "var x = y;".to_string()));

        let output = render_to_string(report.as_ref());
        assert!(output.contains("E2002"), "should contain error code");
        assert!(
            output.contains("undefined variable 'y'"),
            "should contain message"
        );
    }

    #[test]
    fn render_with_help() {
        let err = SemanticError::CannotInferVar {
            name: "x".to_string(),
            span: (4, 1).into(),
        };
        let report = miette::Report::new(err)
            .with_source_code(NamedSource::new("test.lark", "var x;".to_string()));

        let output = render_to_string(report.as_ref());
        assert!(output.contains("E2004"), "should contain error code");
        assert!(output.contains("help"), "should contain help text");
    }

    #[test]
    fn render_collected_type_errors() {
        use crate::frontend::{NodeId, Span};

        let source = "bool b = 1;\nbreak;";
        let errors = vec![
            TypeError::new(
                SemanticError::TypeMismatch {
                    expected: "bool".to_string(),
                    found: "int".to_string(),
                    span: (9, 1).into(),
                },
                NodeId(1),
                Span::new(9, 10, 1, 10),
            ),
            TypeError::new(
                SemanticError::InvalidBreak { span: (12, 5).into() },
                NodeId(2),
                Span::new(12, 17, 2, 1),
            ),
        ];

        let output = render_type_errors(&errors, "test.lark", source);
        assert!(output.contains("E2001"));
        assert!(output.contains("E2008"));
        assert!(output.find("E2001") < output.find("E2008"));
    }
}
