//! # Compose Rewriter (C7)
//!
//! Strips host-port publishing from every service and replaces it with
//! container-internal `expose` entries, so services stay reachable from
//! the host only via their hashed DNS name rather than a bound port.
//! Applied only when DNS mode is active (§4.7) — without it, removing the
//! port binding would make the service unreachable.

use crate::compose::doc::ComposeDocument;
use std::path::Path;

const HEADER: &str = "# Auto-generated by space-dns. Do not edit directly — \
this file is derived from your compose file(s) and is safe to delete.\n";

/// Rewrite every service's `ports` into `expose`, merging with any
/// `expose` entries the service already declared. Returns the number of
/// services touched.
pub fn rewrite(doc: &mut ComposeDocument) -> usize {
    let mut touched = 0;
    for service in doc.services.values_mut() {
        let Some(ports) = service.ports.take() else {
            continue;
        };
        touched += 1;

        let mut exposed = service.expose.take().unwrap_or_default();
        for mapping in &ports {
            let container_port = container_side(mapping);
            if !exposed.contains(&container_port) {
                exposed.push(container_port);
            }
        }
        service.expose = Some(exposed);
    }
    touched
}

/// The container-side of a port mapping: the portion after the last `:`,
/// or the whole value if there is no `:`.
fn container_side(mapping: &str) -> String {
    match mapping.rsplit_once(':') {
        Some((_, container_port)) => container_port.to_string(),
        None => mapping.to_string(),
    }
}

/// Load the compose documents at `sources`, merge them in order (later
/// documents' services overlay earlier ones, matching compose's own
/// multi-file semantics), apply the rewrite, and write the result to
/// `destination` with a provenance header.
pub fn rewrite_to_file(sources: &[std::path::PathBuf], destination: &Path) -> std::io::Result<()> {
    let mut merged = ComposeDocument::default();
    for source in sources {
        let contents = std::fs::read_to_string(source)?;
        let doc = ComposeDocument::parse(&contents)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        if merged.version.is_none() {
            merged.version = doc.version;
        }
        merged.extra.extend(doc.extra);
        merged.services.extend(doc.services);
    }

    rewrite(&mut merged);

    let yaml = merged
        .to_yaml()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    std::fs::write(destination, format!("{HEADER}{yaml}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn doc_with_ports(ports: Vec<&str>) -> ComposeDocument {
        let mut services = HashMap::new();
        services.insert(
            "db".to_string(),
            crate::compose::doc::ComposeService {
                ports: Some(ports.into_iter().map(String::from).collect()),
                expose: None,
                extra: HashMap::new(),
            },
        );
        ComposeDocument {
            version: Some("3.8".to_string()),
            services,
            extra: HashMap::new(),
        }
    }

    #[test]
    fn rewrite_moves_container_side_ports_into_expose() {
        let mut doc = doc_with_ports(vec!["5432:5432"]);
        let touched = rewrite(&mut doc);
        assert_eq!(touched, 1);

        let db = doc.services.get("db").unwrap();
        assert!(db.ports.is_none());
        assert_eq!(db.expose, Some(vec!["5432".to_string()]));
    }

    #[test]
    fn rewrite_handles_bare_port_with_no_colon() {
        let mut doc = doc_with_ports(vec!["8080"]);
        rewrite(&mut doc);
        assert_eq!(doc.services.get("db").unwrap().expose, Some(vec!["8080".to_string()]));
    }

    #[test]
    fn rewrite_merges_with_existing_expose_without_duplicates() {
        let mut doc = doc_with_ports(vec!["5432:5432", "127.0.0.1:5433:5432"]);
        doc.services.get_mut("db").unwrap().expose = Some(vec!["5432".to_string()]);
        rewrite(&mut doc);
        assert_eq!(doc.services.get("db").unwrap().expose, Some(vec!["5432".to_string()]));
    }

    #[test]
    fn rewrite_to_file_writes_header_and_strips_ports() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("docker-compose.yml");
        std::fs::write(
            &source,
            "version: \"3.8\"\nservices:\n  db:\n    image: postgres\n    ports:\n      - \"5432:5432\"\n",
        )
        .unwrap();

        let destination = dir.path().join(".space-dns-compose.yml");
        rewrite_to_file(&[source], &destination).unwrap();

        let contents = std::fs::read_to_string(&destination).unwrap();
        assert!(contents.starts_with("# Auto-generated by space-dns"));
        assert!(!contents.contains("ports:"));
        assert!(contents.contains("expose"));
        assert!(contents.contains("5432"));
    }
}
