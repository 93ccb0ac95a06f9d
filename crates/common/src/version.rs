use serde::Serialize;

/// Name and version of a binary, as reported at startup and on `/version`.
///
/// Built by the binary itself so the package name is the binary's own and
/// not this library's.
#[derive(Debug, Clone, Serialize)]
pub struct BuildInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub build_profile: &'static str,
}

impl BuildInfo {
    pub fn new(name: &'static str, version: &'static str) -> Self {
        Self {
            name,
            version,
            build_profile: if cfg!(debug_assertions) {
                "debug"
            } else {
                "release"
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_info_serializes() {
        let json = serde_json::to_value(BuildInfo::new("fileshare-daemon", "1.2.3")).unwrap();
        assert_eq!(json["name"], "fileshare-daemon");
        assert_eq!(json["version"], "1.2.3");
        assert!(json["build_profile"].is_string());
    }
}
