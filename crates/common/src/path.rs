use std::path::{Path, PathBuf};

/// Upper bound on decode rounds when looking for a hidden traversal.
const MAX_DECODE_ROUNDS: usize = 4;

/// A requested path would land outside the shared root.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("path escapes the shared root: {requested:?}")]
pub struct PathTraversal {
    pub requested: String,
}

impl PathTraversal {
    fn new(requested: &str) -> Self {
        Self {
            requested: requested.to_string(),
        }
    }
}

/// Maps request paths onto the shared root.
///
/// Checks are lexical and always run on the decoded and normalized form of the
/// input, never on the raw request text. The root is expected to be absolute
/// and canonical; the service state takes care of that at startup.
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
}

impl PathResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a percent-encoded path taken from a request URL.
    pub fn resolve(&self, requested: &str) -> Result<PathBuf, PathTraversal> {
        let decoded = self.decode(requested)?;
        self.resolve_decoded(&decoded)
            .map_err(|_| PathTraversal::new(requested))
    }

    /// Decode a request path exactly once, into the plain name the stores use.
    ///
    /// The path is additionally decoded to a fixed point, and if that form would
    /// traverse the request is rejected as well, so `%252e%252e%252f` fails the
    /// same way `../` does.
    pub fn decode(&self, requested: &str) -> Result<String, PathTraversal> {
        let decoded = urlencoding::decode(requested)
            .map_err(|_| PathTraversal::new(requested))?
            .into_owned();
        if hides_traversal(&decoded) {
            return Err(PathTraversal::new(requested));
        }
        Ok(decoded)
    }

    /// Resolve a path that is already in plain form, such as a filename taken
    /// from a multipart header. No percent-decoding is applied.
    pub fn resolve_decoded(&self, relative: &str) -> Result<PathBuf, PathTraversal> {
        let trimmed = relative.trim();
        if trimmed.is_empty() || trimmed == "." || trimmed == ".." {
            return Err(PathTraversal::new(relative));
        }

        let segments = normalize(relative).ok_or_else(|| PathTraversal::new(relative))?;
        let candidate = segments
            .iter()
            .fold(self.root.clone(), |acc, segment| acc.join(segment));

        // Component-wise, so `/srv/shared-other` is not inside `/srv/shared`
        if !candidate.starts_with(&self.root) {
            return Err(PathTraversal::new(relative));
        }

        Ok(candidate)
    }

    /// Like [`resolve_decoded`](Self::resolve_decoded) but refuses the root
    /// itself, for callers that are about to create a file.
    pub fn resolve_name(&self, name: &str) -> Result<PathBuf, PathTraversal> {
        let resolved = self.resolve_decoded(name)?;
        if resolved == self.root {
            return Err(PathTraversal::new(name));
        }
        Ok(resolved)
    }

    /// The path of `absolute` relative to the root, if it is inside it.
    pub fn relative<'a>(&self, absolute: &'a Path) -> Option<&'a Path> {
        absolute.strip_prefix(&self.root).ok()
    }
}

/// Lexically normalize a relative path into its segments.
///
/// Both `/` and `\` separate segments. Returns `None` for absolute paths,
/// drive-prefixed paths, NUL bytes, and anything whose normal form climbs above
/// its starting point.
fn normalize(path: &str) -> Option<Vec<&str>> {
    if path.contains('\0') {
        return None;
    }
    if path.starts_with('/') || path.starts_with('\\') || has_drive_prefix(path) {
        return None;
    }

    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            other => segments.push(other),
        }
    }
    Some(segments)
}

/// Whether decoding `plain` any further would yield a path that climbs out.
///
/// Stored names must pass this too, or their own download URL would be refused.
pub fn hides_traversal(plain: &str) -> bool {
    let mut deepest = plain.to_string();
    for _ in 1..MAX_DECODE_ROUNDS {
        match urlencoding::decode(&deepest) {
            Ok(next) if next != deepest => deepest = next.into_owned(),
            _ => break,
        }
    }
    deepest != plain && normalize(&deepest).is_none()
}

fn has_drive_prefix(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> PathResolver {
        PathResolver::new("/srv/shared")
    }

    #[test]
    fn test_resolve_plain_name() {
        let path = resolver().resolve("report.pdf").unwrap();
        assert_eq!(path, PathBuf::from("/srv/shared/report.pdf"));
    }

    #[test]
    fn test_resolve_decodes_once() {
        let path = resolver().resolve("my%20notes.txt").unwrap();
        assert_eq!(path, PathBuf::from("/srv/shared/my notes.txt"));

        // A literal percent survives a single decode
        let path = resolver().resolve("100%25.txt").unwrap();
        assert_eq!(path, PathBuf::from("/srv/shared/100%.txt"));
    }

    #[test]
    fn test_resolve_keeps_unicode() {
        let path = resolver().resolve("%E6%97%A5%E6%9C%AC.txt").unwrap();
        assert_eq!(path, PathBuf::from("/srv/shared/日本.txt"));
    }

    #[test]
    fn test_resolve_inner_dot_segments() {
        let path = resolver().resolve("docs/./old/../report.pdf").unwrap();
        assert_eq!(path, PathBuf::from("/srv/shared/docs/report.pdf"));

        // Climbing back to the root is not an escape
        let path = resolver().resolve("docs/..").unwrap();
        assert_eq!(path, PathBuf::from("/srv/shared"));
    }

    #[test]
    fn test_reject_raw_traversal() {
        for input in ["../etc/passwd", "docs/../../etc/passwd", "..\\secret.txt", ".."] {
            assert!(resolver().resolve(input).is_err(), "{input} was accepted");
        }
    }

    #[test]
    fn test_reject_encoded_traversal() {
        for input in [
            "%2e%2e%2fetc%2fpasswd",
            "%2E%2E/secret.txt",
            "..%2f..%2fsecret.txt",
            "%252e%252e%252fsecret.txt",
            "%25252e%25252e%25252fsecret.txt",
            "docs%2f%2e%2e%2f%2e%2e%2fsecret.txt",
        ] {
            assert!(resolver().resolve(input).is_err(), "{input} was accepted");
        }
    }

    #[test]
    fn test_reject_absolute_and_empty() {
        for input in ["", " ", ".", "/etc/passwd", "%2fetc%2fpasswd", "C:/Windows", "a\0b"] {
            assert!(resolver().resolve(input).is_err(), "{input:?} was accepted");
        }
    }

    #[test]
    fn test_resolve_name_refuses_root() {
        assert!(resolver().resolve_name("docs/..").is_err());
        assert!(resolver().resolve_name("notes.txt").is_ok());
    }

    #[test]
    fn test_resolve_decoded_does_not_decode() {
        let path = resolver().resolve_decoded("a%20b.txt").unwrap();
        assert_eq!(path, PathBuf::from("/srv/shared/a%20b.txt"));
    }

    #[test]
    fn test_decode_returns_plain_name() {
        assert_eq!(resolver().decode("a%2520b.txt").unwrap(), "a%20b.txt");
        assert_eq!(resolver().decode("100%25.txt").unwrap(), "100%.txt");
        assert!(resolver().decode("%252e%252e%252fx.txt").is_err());
    }

    #[test]
    fn test_hides_traversal() {
        assert!(hides_traversal("%2e%2e%2fx.txt"));
        assert!(hides_traversal("..%252fx.txt"));
        assert!(!hides_traversal("a%20b.txt"));
        assert!(!hides_traversal("a%2fb.txt"));
        assert!(!hides_traversal("100%.txt"));
        // Plain traversal is for the resolver itself to catch
        assert!(!hides_traversal("../x.txt"));
    }

    #[test]
    fn test_relative() {
        let r = resolver();
        let inside = PathBuf::from("/srv/shared/docs/a.txt");
        assert_eq!(r.relative(&inside), Some(Path::new("docs/a.txt")));
        assert_eq!(r.relative(Path::new("/srv/other/a.txt")), None);
    }
}
