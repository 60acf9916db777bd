//! # Hashed Hostname Module
//!
//! Pure functions for deriving a stable, collision-free DNS label from a
//! service name and an absolute working directory, and for recovering the
//! two from a fully qualified hostname.
//!
//! The hash is a deliberate collision-likelihood/brevity trade: 24 bits is
//! plenty for the number of worktrees a single developer runs at once, and
//! keeps `<service>-<hash>` well inside the 63-byte DNS label limit.

use sha2::{Digest, Sha256};
use std::path::{Component, Path, PathBuf};

/// Number of hex characters kept from the digest (24 bits).
const HASH_LEN: usize = 6;

/// Resolve a relative path against the process's current directory, then
/// collapse `.`/`..` components and duplicate separators without touching
/// the filesystem (no symlink resolution — this is a naming scheme, not a
/// security boundary). Resolving to absolute first is what makes the hash
/// independent of which directory a caller happened to invoke from — two
/// invocations naming the same directory via different relative paths must
/// still collide on the same hash (§4.1, §8 determinism invariant).
pub fn normalize(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    let mut out = Vec::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out.into_iter().collect()
}

/// Compute the 6-hex-char hash of a (possibly relative) directory path.
/// The path is normalized first so that `hash(d) == hash(normalize(d))`
/// always holds.
pub fn hash(dir: &Path) -> String {
    let normalized = normalize(dir);
    let bytes = normalized.to_string_lossy();
    let digest = Sha256::digest(bytes.as_bytes());
    digest[..HASH_LEN / 2]
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// Compose a hashed FQDN: `<service>-<hash(dir)>.<base>`.
pub fn compose(service: &str, dir: &Path, base: &str) -> String {
    format!("{service}-{}.{base}", hash(dir))
}

/// Parse a hashed FQDN back into `(service, hash)`. Returns `None` unless
/// the name is `<service>-<6 lowercase hex chars>.<base>`, optionally with
/// a trailing dot.
pub fn parse<'a>(fqdn: &'a str, base: &str) -> Option<(&'a str, &'a str)> {
    let fqdn = fqdn.strip_suffix('.').unwrap_or(fqdn);
    let suffix = format!(".{base}");
    let label = fqdn.strip_suffix(suffix.as_str())?;

    let dash = label.rfind('-')?;
    let (service, rest) = (&label[..dash], &label[dash + 1..]);
    if service.is_empty() {
        return None;
    }
    if rest.len() != HASH_LEN || !rest.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase()) {
        return None;
    }
    Some((service, rest))
}

/// True iff `parse` succeeds.
pub fn validate(fqdn: &str, base: &str) -> bool {
    parse(fqdn, base).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn hash_is_deterministic_and_normalized() {
        let a = hash(Path::new("/u/dev/proj-main"));
        let b = hash(Path::new("/u/dev/proj-main"));
        assert_eq!(a, b);

        let raw = Path::new("/u/dev/../dev/./proj-main/");
        assert_eq!(hash(raw), a);
    }

    #[test]
    fn hash_is_collision_free_for_sibling_worktrees() {
        let paths = [
            "/u/dev/proj-main",
            "/u/dev/proj-dev",
            "/u/dev/proj-feature",
        ];
        let hashes: Vec<String> = paths.iter().map(|p| hash(Path::new(p))).collect();
        assert_eq!(hashes[0].len(), HASH_LEN);
        assert_ne!(hashes[0], hashes[1]);
        assert_ne!(hashes[0], hashes[2]);
        assert_ne!(hashes[1], hashes[2]);
    }

    #[test]
    fn compose_and_parse_round_trip() {
        let dir = PathBuf::from("/u/dev/proj-main");
        let fqdn = compose("api", &dir, "space.local");
        assert!(fqdn.starts_with("api-"));
        assert!(fqdn.ends_with(".space.local"));

        let (service, h) = parse(&fqdn, "space.local").unwrap();
        assert_eq!(service, "api");
        assert_eq!(h, hash(&dir));
        assert!(validate(&fqdn, "space.local"));
    }

    #[test]
    fn parse_rejects_non_hashed_names() {
        assert_eq!(parse("api.space.local", "space.local"), None);
        assert!(!validate("api.space.local", "space.local"));

        assert_eq!(parse("api-ZZZZZZ.space.local", "space.local"), None);
        assert_eq!(parse("api-abc.space.local", "space.local"), None);
        assert_eq!(parse("api-abcdef.other.domain", "space.local"), None);
    }

    #[test]
    fn parse_allows_hyphenated_service_names() {
        let (service, h) = parse("snark-worker-a1b2c3.space.local", "space.local").unwrap();
        assert_eq!(service, "snark-worker");
        assert_eq!(h, "a1b2c3");
    }

    #[test]
    fn parse_tolerates_trailing_dot() {
        assert!(validate("api-a1b2c3.space.local.", "space.local"));
    }
}
