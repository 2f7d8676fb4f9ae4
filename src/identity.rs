use crate::error::Result;
use crate::model::Profile;
use regex::Regex;
use tracing::debug;

const NOREPLY_DOMAIN: &str = "users.noreply.github.com";

/// Matches commit authors against the identity facets of a profile.
///
/// Patterns are kept as plain strings alongside the compiled forms so they
/// can cross the analysis-worker boundary as text; workers recompile them.
pub struct IdentityMatcher {
    sources: Vec<String>,
    patterns: Vec<Regex>,
}

impl IdentityMatcher {
    pub fn from_profile(profile: &Profile) -> Result<Self> {
        let sources = pattern_sources(profile);
        let patterns = sources
            .iter()
            .map(|s| Regex::new(s))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        debug!(count = patterns.len(), "built identity patterns");
        Ok(Self { sources, patterns })
    }

    /// The plain-text pattern strings, suitable for handing to workers.
    pub fn pattern_strings(&self) -> Vec<String> {
        self.sources.clone()
    }

    /// True when any pattern matches `"{name} <{email}>"`.
    pub fn matches(&self, author_name: &str, author_email: &str) -> bool {
        let haystack = format!("{author_name} <{author_email}>");
        self.patterns.iter().any(|p| p.is_match(&haystack))
    }
}

/// Derive the pattern strings for a profile. Absent fields contribute none.
fn pattern_sources(profile: &Profile) -> Vec<String> {
    let mut sources = Vec::new();

    if let Some(email) = profile.email.as_deref().filter(|e| !e.is_empty()) {
        sources.push(format!("(?i){}", regex::escape(email)));
        // Same local part at a different provider still counts.
        if let Some((local, _)) = email.split_once('@') {
            sources.push(format!("(?i){}@.*", regex::escape(local)));
        }
    }

    sources.push(format!(
        "(?i){}@{}",
        regex::escape(&profile.login),
        regex::escape(NOREPLY_DOMAIN)
    ));
    sources.push(format!(r"(?i)\b{}\b", regex::escape(&profile.login)));

    if let Some(name) = profile.name.as_deref().filter(|n| !n.is_empty()) {
        sources.push(format!(r"(?i)\b{}\b", regex::escape(name)));
        for part in name.split_whitespace() {
            // Skip initials and short particles to avoid false matches.
            if part.chars().count() > 2 {
                sources.push(format!(r"(?i)\b{}\b", regex::escape(part)));
            }
        }
    }

    sources
}
