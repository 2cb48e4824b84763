//! Heuristic `yarn.lock` extraction.
//!
//! Entry headers start at column zero (`lodash@^4.17.21:`), their fields are
//! indented. Taking the leading word at the start of each unindented line is
//! enough to recover the names without parsing the lockfile grammar.

use super::ManifestParser;
use crate::types::Result;
use regex::Regex;
use std::sync::LazyLock;

static ENTRY_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?m)^"?([\w-]+)"#).expect("valid yarn.lock regex"));

/// Parser for Yarn lockfiles.
#[derive(Debug, Clone, Copy, Default)]
pub struct YarnLockParser;

impl ManifestParser for YarnLockParser {
    fn extract(&self, content: &str) -> Result<Vec<String>> {
        Ok(ENTRY_NAME_RE
            .captures_iter(content)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_entry_names() {
        let content = r#"# THIS IS AN AUTOGENERATED FILE. DO NOT EDIT THIS FILE DIRECTLY.
# yarn lockfile v1


left-pad@^1.3.0:
  version "1.3.0"
  resolved "https://registry.yarnpkg.com/left-pad/-/left-pad-1.3.0.tgz"

"internal-utils@^2.0.0", "internal-utils@^2.1.0":
  version "2.1.0"

lodash@4.17.21:
  version "4.17.21"
"#;

        let names = YarnLockParser.extract(content).unwrap();
        assert_eq!(names, vec!["left-pad", "internal-utils", "lodash"]);
    }

    #[test]
    fn test_comments_and_indented_lines_are_skipped() {
        let content = "# comment-line\n  dependencies:\n    nested-dep \"^1.0.0\"\n";
        assert!(YarnLockParser.extract(content).unwrap().is_empty());
    }

    #[test]
    fn test_scoped_entries_are_partial() {
        // Scoped names do not start with a word character and are not recovered.
        let content = "\"@babel/core@^7.0.0\":\n  version \"7.24.0\"\n";
        assert!(YarnLockParser.extract(content).unwrap().is_empty());
    }
}
