//! Format rules for the registration fields.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

const NAME_MIN_CHARS: usize = 2;
const NAME_MAX_CHARS: usize = 100;
const ID_MIN_CHARS: usize = 4;
const ID_MAX_CHARS: usize = 20;

static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\p{L}\p{M} ]+$").expect("name pattern is valid"));

static ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]+$").expect("academic id pattern is valid"));

/// Which registration field failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    AcademicId,
}

/// A field value that does not follow its format rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidFormat {
    pub field: Field,
    pub reason: &'static str,
}

impl fmt::Display for InvalidFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = match self.field {
            Field::Name => "name",
            Field::AcademicId => "academic id",
        };
        write!(f, "invalid {}: {}", field, self.reason)
    }
}

impl std::error::Error for InvalidFormat {}

fn invalid(field: Field, reason: &'static str) -> InvalidFormat {
    InvalidFormat { field, reason }
}

/// Validate a display name. Returns the trimmed name.
pub fn validate_name(text: &str) -> Result<String, InvalidFormat> {
    let name = text.trim();
    let len = name.chars().count();

    if len == 0 {
        return Err(invalid(Field::Name, "empty"));
    }
    if len < NAME_MIN_CHARS {
        return Err(invalid(Field::Name, "too short"));
    }
    if len > NAME_MAX_CHARS {
        return Err(invalid(Field::Name, "too long"));
    }
    if !NAME_PATTERN.is_match(name) {
        return Err(invalid(Field::Name, "only letters and spaces are allowed"));
    }

    Ok(name.to_string())
}

/// Validate an academic ID (RA). Returns the trimmed ID, case preserved.
pub fn validate_academic_id(text: &str) -> Result<String, InvalidFormat> {
    let id = text.trim();
    let len = id.chars().count();

    if len == 0 {
        return Err(invalid(Field::AcademicId, "empty"));
    }
    if !ID_PATTERN.is_match(id) {
        return Err(invalid(Field::AcademicId, "only letters and digits are allowed"));
    }
    if !(ID_MIN_CHARS..=ID_MAX_CHARS).contains(&len) {
        return Err(invalid(Field::AcademicId, "must have between 4 and 20 characters"));
    }
    if !id.chars().any(|c| c.is_ascii_digit()) {
        return Err(invalid(Field::AcademicId, "must contain a digit"));
    }

    Ok(id.to_string())
}
