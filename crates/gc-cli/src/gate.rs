//! Environment gate.
//!
//! A project can pin the lowest `gallery-gen` release it works with through
//! `engine.minimumVersion`. Older binaries refuse to run unless the check is
//! bypassed, either explicitly or because the run happens on CI.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use color_eyre::eyre::{eyre, Result};
use tracing::debug;

/// A `major.minor.patch` release number.
///
/// Missing components read as zero and a pre-release or build suffix is
/// ignored, so `"1.4"` equals `"1.4.0"` and `"v1.4.0-beta.1"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version {
    major: u64,
    minor: u64,
    patch: u64,
}

impl FromStr for Version {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let core = trimmed
            .strip_prefix('v')
            .unwrap_or(trimmed)
            .split(['-', '+'])
            .next()
            .unwrap_or_default();
        if core.is_empty() {
            return Err(format!("invalid version {s:?}"));
        }

        let mut parts = [0_u64; 3];
        for (i, part) in core.split('.').enumerate() {
            let slot = parts
                .get_mut(i)
                .ok_or_else(|| format!("invalid version {s:?}: too many components"))?;
            *slot = part
                .parse()
                .map_err(|_| format!("invalid version {s:?}: {part:?} is not a number"))?;
        }

        Ok(Self {
            major: parts[0],
            minor: parts[1],
            patch: parts[2],
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Outcome of a gate check that allowed the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// No requirement, or the running version satisfies it.
    Satisfied,
    /// The running version is too old but the check was bypassed.
    Bypassed {
        /// Version the project requires.
        required: Version,
        /// Version of this binary.
        running: Version,
    },
}

/// Returns `true` if `value` of the `CI` variable means "running on CI".
pub fn ci_enabled(value: Option<&str>) -> bool {
    matches!(value.map(str::trim), Some("true" | "1"))
}

/// Reads the `CI` environment variable.
pub fn ci_from_env() -> bool {
    ci_enabled(std::env::var("CI").ok().as_deref())
}

/// Compares `running` against the project's `minimum`.
///
/// # Errors
///
/// Returns an error if either version is malformed, or if `running` is
/// older than `minimum` and `bypass` is not set.
pub fn check(minimum: Option<&str>, running: &str, bypass: bool) -> Result<Gate> {
    let Some(minimum) = minimum else {
        return Ok(Gate::Satisfied);
    };
    let required: Version = minimum
        .parse()
        .map_err(|e| eyre!("engine.minimumVersion: {e}"))?;
    let running: Version = running.parse().map_err(|e| eyre!("{e}"))?;

    match running.cmp(&required) {
        Ordering::Less if bypass => Ok(Gate::Bypassed { required, running }),
        Ordering::Less => Err(eyre!(
            "gallery-gen {running} is older than the required {required}; \
             upgrade, or pass --skip-version-check (CI=true also bypasses)"
        )),
        Ordering::Equal | Ordering::Greater => {
            debug!(%required, %running, "version requirement satisfied");
            Ok(Gate::Satisfied)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version(s: &str) -> Version {
        s.parse().expect("valid version")
    }

    #[test]
    fn test_parse_versions() {
        assert_eq!(version("1.4.2").to_string(), "1.4.2");
        assert_eq!(version("1.4"), version("1.4.0"));
        assert_eq!(version("v2.0.0-beta.1"), version("2.0.0"));
        assert!("".parse::<Version>().is_err());
        assert!("1.x.0".parse::<Version>().is_err());
        assert!("1.2.3.4".parse::<Version>().is_err());
    }

    #[test]
    fn test_ordering_is_numeric() {
        assert!(version("0.10.0") > version("0.9.9"));
        assert!(version("1.0.0") > version("0.99.99"));
    }

    #[test]
    fn test_no_requirement_passes() {
        assert_eq!(check(None, "0.1.0", false).expect("gate"), Gate::Satisfied);
    }

    #[test]
    fn test_newer_or_equal_passes() {
        assert_eq!(check(Some("0.1.0"), "0.1.0", false).expect("gate"), Gate::Satisfied);
        assert_eq!(check(Some("0.1.0"), "0.2.0", false).expect("gate"), Gate::Satisfied);
    }

    #[test]
    fn test_older_is_refused() {
        let err = check(Some("1.0.0"), "0.1.0", false).expect_err("refused");
        assert!(err.to_string().contains("older than the required 1.0.0"));
    }

    #[test]
    fn test_bypass_allows_older() {
        let gate = check(Some("1.0.0"), "0.1.0", true).expect("bypassed");
        assert!(matches!(gate, Gate::Bypassed { required, .. } if required == version("1.0.0")));
    }

    #[test]
    fn test_malformed_requirement_is_an_error() {
        assert!(check(Some("latest"), "0.1.0", true).is_err());
    }

    #[test]
    fn test_ci_values() {
        assert!(ci_enabled(Some("true")));
        assert!(ci_enabled(Some("1")));
        assert!(!ci_enabled(Some("false")));
        assert!(!ci_enabled(Some("0")));
        assert!(!ci_enabled(None));
    }
}
