//! Known-version set maintenance.
//!
//! Version strings are opaque: they are compared for equality only and never
//! parsed or ordered. A service's known-version set keeps insertion order,
//! never holds blank entries and never holds the same string twice.

/// Version assigned to every environment when a service is created without one.
pub const DEFAULT_VERSION: &str = "0.1.0";

/// True when `version` has visible content.
pub fn is_blank(version: &str) -> bool {
    version.trim().is_empty()
}

/// Drop blank entries and later duplicates, keeping first-seen order.
pub fn normalize<I, S>(versions: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for v in versions {
        let v = v.as_ref();
        if is_blank(v) || out.iter().any(|seen| seen == v) {
            continue;
        }
        out.push(v.to_string());
    }
    out
}

/// Reconcile the known-version set after an environment version changed.
///
/// The result is the union of `previous` and the current environment triple
/// (`bau`, `uat`, `prod`), previous entries first. Nothing is pruned.
pub fn reconcile(previous: &[String], current: [&str; 3]) -> Vec<String> {
    normalize(previous.iter().map(String::as_str).chain(current))
}
