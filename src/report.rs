//! Structured diagnostics accumulated while an assembly runs.
//!
//! Recoverable problems drop a descriptor or a single connection and land
//! here as [`Warning`] entries, in the order they were detected. Fatal
//! problems abort the run through [`crate::error::AssemblyError`] instead.

use std::fmt;

/// Classes of recoverable assembly problems.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// A later descriptor reused an already-seen dynamic id.
    DuplicateId,
    /// The model requires a newer engine than the target version.
    VersionTooNew,
    /// The model was retired at or before the target version.
    VersionTooOld,
    /// A topology simplifier removed the model.
    SimplifierDropped,
    /// A connection request named a target no accepted model answers to.
    UnresolvedTarget,
    /// An event was dropped before wiring, with the cause in the detail.
    EventSkipped,
}

impl WarningKind {
    /// Short machine-friendly label used in exports.
    pub fn label(&self) -> &'static str {
        match self {
            WarningKind::DuplicateId => "duplicate_id",
            WarningKind::VersionTooNew => "version_too_new",
            WarningKind::VersionTooOld => "version_too_old",
            WarningKind::SimplifierDropped => "simplifier_dropped",
            WarningKind::UnresolvedTarget => "unresolved_target",
            WarningKind::EventSkipped => "event_skipped",
        }
    }
}

/// One recoverable problem, tied to the descriptor that caused it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub kind: WarningKind,
    /// Dynamic id of the offending descriptor.
    pub id: String,
    /// Library tag of the offending descriptor.
    pub library: String,
    /// Human-readable specifics: the failing bound, the dead terminal, the
    /// unresolved target id.
    pub detail: String,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} ({}): {}",
            self.kind.label(),
            self.id,
            self.library,
            self.detail
        )
    }
}

/// Ordered warning list produced by one assembly run.
#[derive(Debug, Clone, Default)]
pub struct AssemblyReport {
    warnings: Vec<Warning>,
}

impl AssemblyReport {
    pub fn new() -> Self {
        AssemblyReport::default()
    }

    /// Records a warning and mirrors it to the log.
    pub fn warn(&mut self, kind: WarningKind, id: &str, library: &str, detail: String) {
        tracing::warn!(kind = kind.label(), id, library, "{detail}");
        self.warnings.push(Warning {
            kind,
            id: id.to_string(),
            library: library.to_string(),
            detail,
        });
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn of_kind(&self, kind: WarningKind) -> impl Iterator<Item = &Warning> {
        self.warnings.iter().filter(move |w| w.kind == kind)
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }
}

impl fmt::Display for AssemblyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.warnings.is_empty() {
            return writeln!(f, "--- Assembly Report: clean ---");
        }
        writeln!(f, "--- Assembly Report: {} warning(s) ---", self.warnings.len())?;
        for warning in &self.warnings {
            writeln!(f, "{warning}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warnings_keep_detection_order() {
        let mut report = AssemblyReport::new();
        report.warn(WarningKind::DuplicateId, "a", "LibA", "first".into());
        report.warn(WarningKind::VersionTooOld, "b", "LibB", "second".into());
        let ids: Vec<_> = report.warnings().iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(!report.is_clean());
    }

    #[test]
    fn filtering_by_kind() {
        let mut report = AssemblyReport::new();
        report.warn(WarningKind::DuplicateId, "a", "LibA", "dup".into());
        report.warn(WarningKind::EventSkipped, "e", "EventDisconnection", "skip".into());
        report.warn(WarningKind::DuplicateId, "b", "LibB", "dup".into());
        assert_eq!(report.of_kind(WarningKind::DuplicateId).count(), 2);
        assert_eq!(report.of_kind(WarningKind::UnresolvedTarget).count(), 0);
    }

    #[test]
    fn display_lists_every_warning() {
        let mut report = AssemblyReport::new();
        assert!(report.to_string().contains("clean"));
        report.warn(
            WarningKind::UnresolvedTarget,
            "g1",
            "GeneratorFourWindings",
            "no model answers to \"T9\"".into(),
        );
        let text = report.to_string();
        assert!(text.contains("1 warning(s)"));
        assert!(text.contains("[unresolved_target] g1 (GeneratorFourWindings)"));
    }
}
