//! Engine version tags and per-model support intervals.
//!
//! Model libraries evolve with the external simulation engine: a model may
//! require a minimum engine version, and may later be retired in favor of a
//! replacement. Both facts are expressed as a half-open [`VersionInterval`]
//! checked against the run's target [`VersionTag`].

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A dotted engine version with up to four numeric components.
///
/// Missing trailing components compare as zero, so `1.2` and `1.2.0` are
/// equal. Ordering is lexicographic over the (zero-padded) components.
#[derive(Debug, Clone, Copy)]
pub struct VersionTag {
    pub major: u32,
    pub minor: u32,
    pub patch: Option<u32>,
    pub build: Option<u32>,
}

impl VersionTag {
    /// Two-component tag `major.minor`, the common form in scenario files.
    pub fn new(major: u32, minor: u32) -> Self {
        VersionTag {
            major,
            minor,
            patch: None,
            build: None,
        }
    }

    fn components(&self) -> [u32; 4] {
        [
            self.major,
            self.minor,
            self.patch.unwrap_or(0),
            self.build.unwrap_or(0),
        ]
    }
}

impl PartialEq for VersionTag {
    fn eq(&self, other: &Self) -> bool {
        self.components() == other.components()
    }
}

impl Eq for VersionTag {}

impl PartialOrd for VersionTag {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VersionTag {
    fn cmp(&self, other: &Self) -> Ordering {
        self.components().cmp(&other.components())
    }
}

impl fmt::Display for VersionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)?;
        if let Some(patch) = self.patch {
            write!(f, ".{patch}")?;
        }
        if let Some(build) = self.build {
            write!(f, ".{build}")?;
        }
        Ok(())
    }
}

/// Error returned when a version string does not parse.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid version \"{0}\": expected 1 to 4 dot-separated numbers")]
pub struct VersionParseError(pub String);

impl FromStr for VersionTag {
    type Err = VersionParseError;

    /// Parses `"1"`, `"1.2"`, `"1.2.3"` or `"1.2.3.4"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || VersionParseError(s.to_string());
        let mut parts = s.split('.');
        let mut next = |required: bool| -> Result<Option<u32>, VersionParseError> {
            match parts.next() {
                Some(p) => p.parse::<u32>().map(Some).map_err(|_| bad()),
                None if required => Err(bad()),
                None => Ok(None),
            }
        };
        let major = next(true)?.ok_or_else(bad)?;
        let minor = next(false)?.unwrap_or(0);
        let patch = next(false)?;
        let build = next(false)?;
        if parts.next().is_some() {
            return Err(bad());
        }
        Ok(VersionTag {
            major,
            minor,
            patch,
            build,
        })
    }
}

/// Outcome of gating one support interval against a target engine version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionGate {
    /// The target version falls inside the interval.
    Supported,
    /// The model needs a newer engine than the target.
    TooNew,
    /// The model was retired at or before the target.
    TooOld,
}

/// Half-open support interval `[min, max)` for one model declaration.
///
/// `max` is exclusive: a model retired at `2.0` is still accepted when the
/// target is `1.9` and rejected from `2.0` on. An absent `max` means the
/// model is supported indefinitely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInterval {
    pub min: VersionTag,
    pub max: Option<VersionTag>,
    /// Optional note naming what replaced the model, surfaced when the
    /// interval rejects a target past `max`.
    pub end_cause: Option<String>,
}

impl Default for VersionInterval {
    /// Unbounded interval starting at `0.0`.
    fn default() -> Self {
        VersionInterval::from(VersionTag::new(0, 0))
    }
}

impl VersionInterval {
    /// Interval with a lower bound only.
    pub fn from(min: VersionTag) -> Self {
        VersionInterval {
            min,
            max: None,
            end_cause: None,
        }
    }

    /// Bounded interval `[min, max)`.
    pub fn until(min: VersionTag, max: VersionTag) -> Self {
        VersionInterval {
            min,
            max: Some(max),
            end_cause: None,
        }
    }

    pub fn with_end_cause(mut self, cause: impl Into<String>) -> Self {
        self.end_cause = Some(cause.into());
        self
    }

    /// Gates `target` against the interval, naming the failing bound.
    pub fn gate(&self, target: &VersionTag) -> VersionGate {
        if *target < self.min {
            VersionGate::TooNew
        } else if self.max.is_some_and(|max| *target >= max) {
            VersionGate::TooOld
        } else {
            VersionGate::Supported
        }
    }

    pub fn contains(&self, target: &VersionTag) -> bool {
        self.gate(target) == VersionGate::Supported
    }
}

impl fmt::Display for VersionInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "[{}, {})", self.min, max),
            None => write!(f, "[{}, )", self.min),
        }
    }
}
