//! Static access-tier table and the pure classifier over it.

/// RouteClass
///
/// Access tier of a request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteClass {
    /// Login and registration surfaces. Hidden from visitors who already hold a session cookie.
    Public,
    /// Profile-editing surfaces. Require a session cookie.
    Protected,
    /// No gate applied.
    Neutral,
}

/// Prefixes of routes that only make sense for anonymous visitors.
pub const PUBLIC_ROUTES: &[&str] = &["/login", "/register"];

/// Prefixes of routes that require an authenticated visitor.
pub const PROTECTED_ROUTES: &[&str] = &["/experience", "/skills", "/cover-letters"];

/// Framework-internal and asset prefixes. Never classified.
pub const EXCLUDED_ROUTES: &[&str] = &["/api", "/static", "/assets", "/favicon.ico"];

/// RouteTable
///
/// The `prefix -> tier` mapping consumed by [`RouteTable::classify`].
/// Built once at startup from the constants above; tests may build their own.
#[derive(Debug, Clone)]
pub struct RouteTable {
    entries: Vec<(String, RouteClass)>,
    excluded: Vec<String>,
}

impl Default for RouteTable {
    fn default() -> Self {
        let entries = PUBLIC_ROUTES
            .iter()
            .map(|prefix| (prefix.to_string(), RouteClass::Public))
            .chain(
                PROTECTED_ROUTES
                    .iter()
                    .map(|prefix| (prefix.to_string(), RouteClass::Protected)),
            )
            .collect();

        Self {
            entries,
            excluded: EXCLUDED_ROUTES.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl RouteTable {
    /// Builds a table from explicit entries and exclusions.
    pub fn new<I, E>(entries: I, excluded: E) -> Self
    where
        I: IntoIterator<Item = (String, RouteClass)>,
        E: IntoIterator<Item = String>,
    {
        Self {
            entries: entries.into_iter().collect(),
            excluded: excluded.into_iter().collect(),
        }
    }

    /// classify
    ///
    /// Maps a request path to its tier. Total and side-effect free.
    ///
    /// Matching is on the unmodified path. `Protected` entries are plain string
    /// prefixes, so `/skills`, `/skills/rust` and `/skillset` are all gated.
    /// `Public` entries and exclusions match whole segments only: `/loginx` is
    /// not a login surface. Excluded prefixes short-circuit to `Neutral` before
    /// the table is consulted.
    pub fn classify(&self, path: &str) -> RouteClass {
        if self
            .excluded
            .iter()
            .any(|prefix| matches_segment(path, prefix))
        {
            return RouteClass::Neutral;
        }

        self.entries
            .iter()
            .find(|(prefix, class)| match class {
                RouteClass::Protected => path.starts_with(prefix.as_str()),
                _ => matches_segment(path, prefix),
            })
            .map(|(_, class)| *class)
            .unwrap_or(RouteClass::Neutral)
    }
}

fn matches_segment(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_surfaces_are_public() {
        let table = RouteTable::default();
        assert_eq!(table.classify("/login"), RouteClass::Public);
        assert_eq!(table.classify("/register"), RouteClass::Public);
        assert_eq!(table.classify("/login/"), RouteClass::Public);
    }

    #[test]
    fn profile_surfaces_are_protected() {
        let table = RouteTable::default();
        for path in ["/experience", "/skills", "/cover-letters", "/skills/rust", "/experience/3/edit"] {
            assert_eq!(table.classify(path), RouteClass::Protected, "{path}");
        }
    }

    #[test]
    fn protected_prefixes_match_without_a_segment_boundary() {
        let table = RouteTable::default();
        for path in ["/skillset", "/experiences", "/cover-letters-archive"] {
            assert_eq!(table.classify(path), RouteClass::Protected, "{path}");
        }
    }

    #[test]
    fn unlisted_routes_are_neutral() {
        let table = RouteTable::default();
        for path in ["/", "/upload-cv", "/health", "/loginx", "/register-help", ""] {
            assert_eq!(table.classify(path), RouteClass::Neutral, "{path}");
        }
    }

    #[test]
    fn excluded_prefixes_are_never_classified() {
        let table = RouteTable::new(
            vec![("/static".to_string(), RouteClass::Protected)],
            vec!["/static".to_string()],
        );
        assert_eq!(table.classify("/static/app.css"), RouteClass::Neutral);

        let table = RouteTable::default();
        assert_eq!(table.classify("/favicon.ico"), RouteClass::Neutral);
        assert_eq!(table.classify("/api/skills"), RouteClass::Neutral);
    }

    #[test]
    fn matching_uses_the_unmodified_path() {
        let table = RouteTable::default();
        assert_eq!(table.classify("/Skills"), RouteClass::Neutral);
        assert_eq!(table.classify("/SKILLS/rust"), RouteClass::Neutral);
    }
}
