//! Stable acceptance filters applied before any model reaches the registry.
//!
//! Both filters keep the first acceptable occurrence and preserve input
//! order, so reordering nothing and re-running an assembly yields the same
//! accepted set.

use std::collections::HashSet;

use crate::model::Descriptor;
use crate::report::{AssemblyReport, WarningKind};
use crate::version::{VersionGate, VersionTag};

/// Drops descriptors whose dynamic id was already seen.
///
/// `seen` is shared between the model pass and the event pass so an event
/// cannot reuse a model's id.
pub fn retain_unique<D: Descriptor>(
    input: Vec<D>,
    seen: &mut HashSet<String>,
    report: &mut AssemblyReport,
) -> Vec<D> {
    input
        .into_iter()
        .filter(|d| {
            if seen.insert(d.dynamic_id().to_string()) {
                return true;
            }
            report.warn(
                WarningKind::DuplicateId,
                d.dynamic_id(),
                d.library(),
                "dynamic id already declared; first occurrence kept".to_string(),
            );
            false
        })
        .collect()
}

/// Drops descriptors whose support interval excludes the target version.
pub fn retain_supported<D: Descriptor>(
    input: Vec<D>,
    target: &VersionTag,
    report: &mut AssemblyReport,
) -> Vec<D> {
    input
        .into_iter()
        .filter(|d| match d.version().gate(target) {
            VersionGate::Supported => true,
            VersionGate::TooNew => {
                report.warn(
                    WarningKind::VersionTooNew,
                    d.dynamic_id(),
                    d.library(),
                    format!(
                        "requires engine {} or later, target is {target}",
                        d.version().min
                    ),
                );
                false
            }
            VersionGate::TooOld => {
                let mut detail = match d.version().max {
                    Some(max) => format!("retired from engine {max} on, target is {target}"),
                    None => format!("unsupported at {target}"),
                };
                if let Some(cause) = &d.version().end_cause {
                    detail.push_str(&format!(" ({cause})"));
                }
                report.warn(WarningKind::VersionTooOld, d.dynamic_id(), d.library(), detail);
                false
            }
        })
        .collect()
}
