//! Include directive parsing.
//!
//! `?include=manufacturer,dealer` becomes the set `{"dealer", "manufacturer"}`.
//! Empty segments are dropped, so `include=,` and `include=` both mean
//! "nothing requested".

use std::collections::BTreeSet;

/// Name of the query parameter carrying the include directive.
pub const INCLUDE_PARAM: &str = "include";

/// Set of relation names requested for expansion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncludeSpec {
    names: BTreeSet<String>,
}

impl IncludeSpec {
    /// Parse a raw include value such as `"a,,b,"`.
    pub fn parse(raw: Option<&str>) -> Self {
        let mut spec = Self::default();
        if let Some(raw) = raw {
            spec.extend_from(raw);
        }
        spec
    }

    /// Extract the include directive from a raw URL query string.
    ///
    /// Repeated `include` parameters are merged.
    pub fn from_query(query: Option<&str>) -> Self {
        let mut spec = Self::default();
        let Some(query) = query else {
            return spec;
        };

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            if key == INCLUDE_PARAM {
                spec.extend_from(&value);
            }
        }
        spec
    }

    fn extend_from(&mut self, raw: &str) {
        self.names.extend(
            raw.split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_owned),
        );
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(spec: &IncludeSpec) -> Vec<&str> {
        spec.iter().collect()
    }

    #[test]
    fn absent_or_empty_is_empty() {
        assert!(IncludeSpec::parse(None).is_empty());
        assert!(IncludeSpec::parse(Some("")).is_empty());
        assert!(IncludeSpec::parse(Some(",")).is_empty());
        assert!(IncludeSpec::parse(Some(" , ,, ")).is_empty());
    }

    #[test]
    fn drops_empty_segments() {
        let spec = IncludeSpec::parse(Some("a,,b,"));
        assert_eq!(names(&spec), vec!["a", "b"]);
    }

    #[test]
    fn duplicates_collapse() {
        let spec = IncludeSpec::parse(Some("dealer,manufacturer,dealer"));
        assert_eq!(spec.len(), 2);
        assert!(spec.contains("dealer"));
        assert!(spec.contains("manufacturer"));
    }

    #[test]
    fn segments_are_trimmed() {
        let spec = IncludeSpec::parse(Some(" manufacturer , dealer"));
        assert_eq!(names(&spec), vec!["dealer", "manufacturer"]);
    }

    #[test]
    fn from_query_reads_include_param() {
        let spec = IncludeSpec::from_query(Some("page=2&include=manufacturer%2Cdealer"));
        assert_eq!(names(&spec), vec!["dealer", "manufacturer"]);

        let spec = IncludeSpec::from_query(Some("include=a&include=b,"));
        assert_eq!(names(&spec), vec!["a", "b"]);

        assert!(IncludeSpec::from_query(Some("page=2")).is_empty());
        assert!(IncludeSpec::from_query(Some("include=")).is_empty());
        assert!(IncludeSpec::from_query(None).is_empty());
    }
}
