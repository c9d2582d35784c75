//! Replay a declaration trace through the scope analyzer

use super::error::TraceResult;
use super::format::{DeclarationTrace, StepKind, TraceStep};
use super::loader::load_trace;
use crate::analysis::{AnalysisReport, ScopeAnalyzer};
use crate::config::runtime::RuntimeConfig;
use crate::logging::{self, codes};
use crate::symbols::LayoutPolicy;
use crate::{log_debug, log_success};
use chrono::{DateTime, Utc};
use std::fmt::Write;
use std::path::Path;

/// Outcome of replaying one trace
#[derive(Debug, Clone)]
pub struct ReplayReport {
    pub source: String,
    pub generated_at: DateTime<Utc>,
    pub steps_total: usize,
    pub steps_executed: usize,
    /// Replay stopped early because `stop_on_first_error` is set
    pub halted: bool,
    /// Scopes still open when the trace ended
    pub open_scopes: usize,
    pub analysis: AnalysisReport,
}

impl ReplayReport {
    pub fn is_clean(&self) -> bool {
        !self.analysis.has_errors() && !self.halted && self.open_scopes == 0
    }

    /// Scope listings in closing order followed by diagnostics
    pub fn format_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Trace {} ({} of {} steps replayed, {})",
            self.source,
            self.steps_executed,
            self.steps_total,
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        );

        for scope in &self.analysis.scopes {
            let _ = writeln!(out);
            let _ = write!(out, "{}", scope);
        }

        if !self.analysis.diagnostics.is_empty() {
            let _ = writeln!(out);
            for diagnostic in &self.analysis.diagnostics {
                let _ = writeln!(out, "{}", diagnostic);
            }
        }

        if self.open_scopes > 0 {
            let _ = writeln!(out, "note: {} scope(s) left open", self.open_scopes);
        }
        if self.halted {
            let _ = writeln!(out, "note: replay halted on first error");
        }
        let _ = write!(out, "{}", self.analysis.summary());
        out
    }
}

fn apply_step(analyzer: &mut ScopeAnalyzer, step: &TraceStep) {
    let span = step.span();
    match step.kind {
        StepKind::Program => {
            analyzer.begin_program(step.name(), span);
        }
        StepKind::Procedure => {
            analyzer.begin_procedure(step.name(), span);
        }
        StepKind::Block => {
            analyzer.begin_block(span);
        }
        StepKind::End => {
            if analyzer.at_program_level() {
                analyzer.end_program(span);
            } else {
                analyzer.end_scope(span);
            }
        }
        StepKind::Declare => {
            if let Some(declaration) = step.declaration() {
                analyzer.declare(declaration, span);
            }
        }
        StepKind::Resolve => {
            analyzer.resolve(step.name(), span);
        }
    }
}

/// Replay an already-loaded trace
pub fn replay(trace: &DeclarationTrace, config: &RuntimeConfig) -> ReplayReport {
    let mut analyzer = ScopeAnalyzer::with_config(
        LayoutPolicy::from(&config.layout),
        config.analysis.clone(),
    );

    let mut executed = 0;
    for step in &trace.steps {
        if analyzer.is_halted() {
            break;
        }
        log_debug!("Replaying step", "index" => executed, "kind" => step.kind.as_str());
        apply_step(&mut analyzer, step);
        executed += 1;
    }

    let halted = analyzer.is_halted();
    let open_scopes = analyzer.open_scope_count();
    let analysis = analyzer.into_report();

    log_success!(codes::success::REPLAY_COMPLETE, "Trace replay complete",
        "trace" => trace.display_name(),
        "steps" => executed,
        "scopes" => analysis.scopes.len(),
        "errors" => analysis.error_count(),
        "warnings" => analysis.warning_count());

    ReplayReport {
        source: trace.display_name().to_string(),
        generated_at: Utc::now(),
        steps_total: trace.steps.len(),
        steps_executed: executed,
        halted,
        open_scopes,
        analysis,
    }
}

/// Load and replay a trace file with the file set as the logging context
pub fn replay_file(path: &Path, config: &RuntimeConfig) -> TraceResult<ReplayReport> {
    logging::with_file_context(path.to_path_buf(), 0, || {
        let trace = load_trace(path)?;
        let mut report = replay(&trace, config);
        report.source = path.display().to_string();
        Ok(report)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::runtime::{AnalysisPreferences, LayoutPreferences};
    use crate::symbols::{Category, Entry};
    use crate::trace::parse_trace;
    use std::io::Write as _;

    fn unit_config() -> RuntimeConfig {
        RuntimeConfig {
            layout: LayoutPreferences {
                base_offset: 0,
                int_unit_size: 1,
                boolean_unit_size: 1,
                char_unit_size: 1,
            },
            analysis: AnalysisPreferences {
                warn_on_shadowing: false,
                log_scope_transitions: false,
                stop_on_first_error: false,
            },
            ..RuntimeConfig::default()
        }
    }

    const NESTED: &str = r#"
        name = "nested"

        [[step]]
        kind = "program"
        name = "main"

        [[step]]
        kind = "declare"
        name = "x"
        type = "int"

        [[step]]
        kind = "procedure"
        name = "p"

        [[step]]
        kind = "declare"
        name = "x"
        type = "boolean"

        [[step]]
        kind = "declare"
        name = "buf"
        type = "array"
        base_type = "char"
        bounds = [1, 4]

        [[step]]
        kind = "resolve"
        name = "x"

        [[step]]
        kind = "end"

        [[step]]
        kind = "end"
    "#;

    #[test]
    fn test_replay_nested_program() {
        let trace = parse_trace(NESTED).unwrap();
        let report = replay(&trace, &unit_config());

        assert!(report.is_clean(), "{}", report.format_text());
        assert_eq!(report.steps_executed, 8);
        assert_eq!(report.analysis.scopes.len(), 2);

        let proc_scope = &report.analysis.scopes[0];
        assert_eq!(proc_scope.owner(), Some("p"));
        assert_eq!(proc_scope.frame_size(), 5);

        let program = report.analysis.program_scope().unwrap();
        assert_eq!(program.entry("p").and_then(Entry::frame_size), Some(5));
        assert_eq!(
            program.entry("x").map(Entry::category),
            Some(Category::Int)
        );
    }

    #[test]
    fn test_replay_reports_undeclared_and_open_scopes() {
        let trace = parse_trace(
            r#"
            [[step]]
            kind = "program"
            name = "main"

            [[step]]
            kind = "block"

            [[step]]
            kind = "resolve"
            name = "ghost"
            line = 7
            column = 3
            "#,
        )
        .unwrap();

        let report = replay(&trace, &unit_config());
        assert_eq!(report.open_scopes, 2);
        assert_eq!(report.analysis.unresolved, 1);
        assert!(!report.is_clean());

        let text = report.format_text();
        assert!(text.contains("error[E110]"));
        assert!(text.contains("at 7:3"));
        assert!(text.contains("2 scope(s) left open"));
    }

    #[test]
    fn test_replay_halts_on_first_error() {
        let trace = parse_trace(
            r#"
            [[step]]
            kind = "program"
            name = "main"

            [[step]]
            kind = "resolve"
            name = "a"

            [[step]]
            kind = "resolve"
            name = "b"
            "#,
        )
        .unwrap();

        let mut config = unit_config();
        config.analysis.stop_on_first_error = true;
        let report = replay(&trace, &config);

        assert!(report.halted);
        assert_eq!(report.steps_executed, 2);
        assert_eq!(report.analysis.error_count(), 1);
    }

    #[test]
    fn test_replay_file_uses_path_as_source() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(NESTED.as_bytes()).unwrap();

        let report = replay_file(file.path(), &unit_config()).unwrap();
        assert_eq!(report.source, file.path().display().to_string());
        assert!(report.format_text().contains("Scope level 0"));
    }
}
