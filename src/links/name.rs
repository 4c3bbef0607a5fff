//! Link names

use std::fmt;

use crate::error::LinkError;

/// Name under which a link appears in the web root.
///
/// Always a single path component: non-empty, no separators, not `.`/`..`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LinkName(String);

impl LinkName {
    pub fn parse(raw: &str) -> Result<Self, LinkError> {
        let name = raw.trim();

        if name.is_empty() {
            return Err(LinkError::InvalidName("name cannot be empty".into()));
        }

        if name == "." || name == ".." {
            return Err(LinkError::InvalidName(name.to_string()));
        }

        if name.contains(['/', '\\', '\0']) {
            return Err(LinkError::InvalidName(format!(
                "{} (must not contain path separators)",
                name
            )));
        }

        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LinkName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(LinkName::parse("  projectA ").unwrap().as_str(), "projectA");
    }

    #[test]
    fn rejects_empty_and_relative_components() {
        for raw in ["", "   ", ".", ".."] {
            assert!(matches!(
                LinkName::parse(raw),
                Err(LinkError::InvalidName(_))
            ));
        }
    }

    #[test]
    fn rejects_separators() {
        assert!(LinkName::parse("a/b").is_err());
        assert!(LinkName::parse(r"a\b").is_err());
    }
}
