//! Symbol inclusion/exclusion filtering.

/// A parsed symbol filter in the vendor's pattern language.
///
/// The pattern is a comma-separated list of glob terms (`*` matches any run
/// of characters); a term prefixed with `!` excludes matching names. A name
/// passes if it matches at least one include term and no exclude term.
///
/// The exporter's fixed pattern `"*, !*.*"` selects every symbol except
/// dotted composite/synthetic listings.
#[derive(Debug, Clone, Default)]
pub struct SymbolFilter {
    include: Vec<String>,
    exclude: Vec<String>,
}

impl SymbolFilter {
    /// Parses a pattern string.
    ///
    /// Empty terms are ignored; an empty include list matches every name.
    #[must_use]
    pub fn parse(pattern: &str) -> Self {
        let mut include = Vec::new();
        let mut exclude = Vec::new();

        for term in pattern.split(',') {
            let term = term.trim();
            if term.is_empty() {
                continue;
            }
            if let Some(stripped) = term.strip_prefix('!') {
                exclude.push(stripped.trim().to_string());
            } else {
                include.push(term.to_string());
            }
        }

        Self { include, exclude }
    }

    /// Returns true if `name` passes the filter.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        let included = self.include.is_empty() || self.include.iter().any(|p| glob_match(p, name));
        included && !self.exclude.iter().any(|p| glob_match(p, name))
    }
}

/// Matches `name` against a glob pattern where `*` matches any run of
/// characters (including none).
fn glob_match(pattern: &str, name: &str) -> bool {
    fn matches(pattern: &[char], name: &[char]) -> bool {
        match pattern.split_first() {
            None => name.is_empty(),
            Some((&'*', rest)) => (0..=name.len()).any(|i| matches(rest, &name[i..])),
            Some((ch, rest)) => name
                .split_first()
                .is_some_and(|(first, tail)| first == ch && matches(rest, tail)),
        }
    }

    let pattern: Vec<char> = pattern.chars().collect();
    let name: Vec<char> = name.chars().collect();
    matches(&pattern, &name)
}
