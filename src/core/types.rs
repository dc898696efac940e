//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`Mark`] - Positive integer identifier assigned by the export producer
//! - [`RefName`] - Validated Git reference name
//! - [`FileMode`] - File mode recorded on a modify line
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, preventing entire classes of bugs.
//!
//! # Examples
//!
//! ```
//! use git2p4::core::types::{FileMode, Mark, RefName};
//!
//! // Valid constructions
//! let mark = Mark::new(7).unwrap();
//! let refname = RefName::new("refs/heads/main").unwrap();
//! let mode = FileMode::from_octal("100755").unwrap();
//!
//! assert_eq!(mark.get(), 7);
//! assert_eq!(refname.shorthand(), "main");
//! assert!(mode.is_executable());
//!
//! // Invalid constructions fail at creation time
//! assert!(Mark::new(0).is_err());
//! assert!(RefName::new("refs/heads/bad..name").is_err());
//! assert!(FileMode::from_octal("123456").is_err());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid mark: {0}")]
    InvalidMark(String),

    #[error("invalid ref name: {0}")]
    InvalidRefName(String),

    #[error("invalid file mode: {0}")]
    InvalidFileMode(String),

    #[error("invalid author/committer: {0}")]
    InvalidPerson(String),
}

/// A mark assigned by the export producer.
///
/// Marks are positive integers that identify blobs and commits before
/// they have a name in the destination system. They appear in the stream
/// as `:<n>` and are unique across the whole stream, not per kind.
///
/// # Example
///
/// ```
/// use git2p4::core::types::Mark;
///
/// let mark = Mark::parse_dataref(":42").unwrap();
/// assert_eq!(mark.get(), 42);
/// assert_eq!(mark.dataref(), ":42");
///
/// // Zero is reserved and never emitted by a producer
/// assert!(Mark::new(0).is_err());
/// assert!(Mark::parse_dataref("42").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct Mark(u64);

impl Mark {
    /// Create a mark from its integer value.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidMark` if the value is zero.
    pub fn new(value: u64) -> Result<Self, TypeError> {
        if value == 0 {
            return Err(TypeError::InvalidMark("mark must be positive".into()));
        }
        Ok(Self(value))
    }

    /// Parse a `:<n>` data reference as it appears in the stream.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidMark` if the token lacks the leading
    /// colon or the number is missing, malformed, or zero.
    pub fn parse_dataref(token: &str) -> Result<Self, TypeError> {
        let digits = token
            .strip_prefix(':')
            .ok_or_else(|| TypeError::InvalidMark(format!("missing ':' in '{token}'")))?;
        let value = digits
            .parse::<u64>()
            .map_err(|_| TypeError::InvalidMark(format!("not a number: '{token}'")))?;
        Self::new(value)
    }

    /// The integer value of this mark.
    pub fn get(self) -> u64 {
        self.0
    }

    /// Render this mark as a `:<n>` data reference.
    pub fn dataref(self) -> String {
        format!(":{}", self.0)
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u64> for Mark {
    type Error = TypeError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Mark> for u64 {
    fn from(value: Mark) -> Self {
        value.0
    }
}

/// A validated Git reference name.
///
/// Ref names must conform to Git's refname rules (see `git check-ref-format`):
/// - Cannot be empty or exactly `@`
/// - Cannot start with `.`, `-`, or `/`
/// - Cannot end with `/`, `.`, or `.lock`
/// - Cannot contain `..`, `@{`, `//`, or ASCII control characters
/// - Cannot contain spaces, `~`, `^`, `:`, `\`, `?`, `*`, `[`
///
/// # Example
///
/// ```
/// use git2p4::core::types::RefName;
///
/// let main = RefName::new("refs/heads/main").unwrap();
/// assert_eq!(main.as_str(), "refs/heads/main");
/// assert_eq!(main.shorthand(), "main");
/// assert!(main.is_branch());
///
/// let tag = RefName::new("refs/tags/v1.0").unwrap();
/// assert_eq!(tag.shorthand(), "v1.0");
/// assert!(!tag.is_branch());
///
/// assert!(RefName::new("").is_err());
/// assert!(RefName::new("refs/heads/has space").is_err());
/// assert!(RefName::new("refs/heads/a..b").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RefName(String);

impl RefName {
    /// Create a new validated ref name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidRefName` if the name violates Git's
    /// refname rules.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    /// Validate a ref name against Git's refname rules.
    fn validate(name: &str) -> Result<(), TypeError> {
        if name.is_empty() {
            return Err(TypeError::InvalidRefName("ref name cannot be empty".into()));
        }

        if name == "@" {
            return Err(TypeError::InvalidRefName(
                "ref name cannot be '@' (reserved)".into(),
            ));
        }

        if name.starts_with('.') || name.starts_with('-') || name.starts_with('/') {
            return Err(TypeError::InvalidRefName(format!(
                "ref name cannot start with '{}'",
                &name[..1]
            )));
        }

        if name.ends_with('/') || name.ends_with('.') {
            return Err(TypeError::InvalidRefName(
                "ref name cannot end with '/' or '.'".into(),
            ));
        }

        if name.ends_with(".lock") {
            return Err(TypeError::InvalidRefName(
                "ref name cannot end with '.lock'".into(),
            ));
        }

        for pattern in ["..", "@{", "//"] {
            if name.contains(pattern) {
                return Err(TypeError::InvalidRefName(format!(
                    "ref name cannot contain '{pattern}'"
                )));
            }
        }

        for ch in name.chars() {
            if ch.is_ascii_control() {
                return Err(TypeError::InvalidRefName(
                    "ref name cannot contain control characters".into(),
                ));
            }
            if matches!(ch, ' ' | '~' | '^' | ':' | '\\' | '?' | '*' | '[') {
                return Err(TypeError::InvalidRefName(format!(
                    "ref name cannot contain '{ch}'"
                )));
            }
        }

        Ok(())
    }

    /// The full ref name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The short form: `refs/heads/` and `refs/tags/` prefixes stripped.
    ///
    /// Other refs (e.g. `refs/notes/commits`) are returned in full.
    pub fn shorthand(&self) -> &str {
        self.0
            .strip_prefix("refs/heads/")
            .or_else(|| self.0.strip_prefix("refs/tags/"))
            .unwrap_or(&self.0)
    }

    /// Whether this ref names a branch (`refs/heads/*`).
    pub fn is_branch(&self) -> bool {
        self.0.starts_with("refs/heads/")
    }
}

impl fmt::Display for RefName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for RefName {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RefName> for String {
    fn from(value: RefName) -> Self {
        value.0
    }
}

/// File mode recorded on a modify line.
///
/// The export format uses five octal mode values. A gitlink references a
/// commit (submodule pointer) rather than a blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileMode {
    /// Regular file (`100644`).
    Normal,
    /// Executable file (`100755`).
    Executable,
    /// Symbolic link (`120000`).
    Symlink,
    /// Submodule commit pointer (`160000`).
    Gitlink,
    /// Subdirectory tree (`040000`), only valid with tree-referencing
    /// producers.
    Tree,
}

impl FileMode {
    /// Parse an octal mode string as it appears on an `M` line.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidFileMode` for any value outside the
    /// five modes the format defines.
    pub fn from_octal(mode: &str) -> Result<Self, TypeError> {
        match mode {
            "100644" | "644" => Ok(Self::Normal),
            "100755" | "755" => Ok(Self::Executable),
            "120000" => Ok(Self::Symlink),
            "160000" => Ok(Self::Gitlink),
            "040000" | "40000" => Ok(Self::Tree),
            other => Err(TypeError::InvalidFileMode(other.to_string())),
        }
    }

    /// The canonical six-digit octal rendering.
    pub fn as_octal(self) -> &'static str {
        match self {
            Self::Normal => "100644",
            Self::Executable => "100755",
            Self::Symlink => "120000",
            Self::Gitlink => "160000",
            Self::Tree => "040000",
        }
    }

    /// Whether this mode carries the executable bit.
    pub fn is_executable(self) -> bool {
        matches!(self, Self::Executable)
    }

    /// Whether this mode references a commit instead of a blob.
    pub fn is_gitlink(self) -> bool {
        matches!(self, Self::Gitlink)
    }
}

impl fmt::Display for FileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_octal())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_rejects_zero() {
        assert_eq!(
            Mark::new(0),
            Err(TypeError::InvalidMark("mark must be positive".into()))
        );
    }

    #[test]
    fn mark_dataref_round_trip() {
        let mark = Mark::parse_dataref(":123").unwrap();
        assert_eq!(mark.get(), 123);
        assert_eq!(mark.dataref(), ":123");
    }

    #[test]
    fn mark_dataref_requires_colon() {
        assert!(Mark::parse_dataref("123").is_err());
        assert!(Mark::parse_dataref(":").is_err());
        assert!(Mark::parse_dataref(":x12").is_err());
        assert!(Mark::parse_dataref(":0").is_err());
    }

    #[test]
    fn refname_accepts_standard_refs() {
        for name in [
            "refs/heads/main",
            "refs/heads/feature/deep/nesting",
            "refs/tags/v1.0.2",
            "refs/notes/commits",
            "HEAD",
        ] {
            assert!(RefName::new(name).is_ok(), "expected '{name}' to be valid");
        }
    }

    #[test]
    fn refname_rejects_invalid_refs() {
        for name in [
            "",
            "@",
            "/leading",
            "trailing/",
            "refs/heads/a..b",
            "refs/heads/a b",
            "refs/heads/a@{b",
            "refs/heads/a.lock",
            "refs//heads",
            "refs/heads/a^b",
            ".hidden",
            "-dash",
        ] {
            assert!(RefName::new(name).is_err(), "expected '{name}' to be invalid");
        }
    }

    #[test]
    fn refname_shorthand_strips_known_prefixes() {
        assert_eq!(RefName::new("refs/heads/main").unwrap().shorthand(), "main");
        assert_eq!(RefName::new("refs/tags/v2").unwrap().shorthand(), "v2");
        assert_eq!(
            RefName::new("refs/notes/commits").unwrap().shorthand(),
            "refs/notes/commits"
        );
    }

    #[test]
    fn file_mode_octal_round_trip() {
        for octal in ["100644", "100755", "120000", "160000", "040000"] {
            let mode = FileMode::from_octal(octal).unwrap();
            assert_eq!(mode.as_octal(), octal);
        }
    }

    #[test]
    fn file_mode_rejects_unknown_values() {
        assert!(FileMode::from_octal("100600").is_err());
        assert!(FileMode::from_octal("").is_err());
        assert!(FileMode::from_octal("rwxr-xr-x").is_err());
    }
}
