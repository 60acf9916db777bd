//! Integration tests for rewriting a project's on-disk compose file(s)
//! into the derived, port-free document DNS mode serves from (§4.7).
//!
//! Unlike the unit tests beside `rewrite()` itself, these go through
//! `rewrite_to_file` against real files on disk, including the
//! multi-file merge a project with a base + override compose file would
//! hit in practice.

use space_dns::compose::doc::ComposeDocument;
use space_dns::compose::rewrite::rewrite_to_file;
use tempfile::tempdir;

#[test]
fn rewrite_to_file_strips_ports_for_a_single_source() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("docker-compose.yml");
    std::fs::write(
        &source,
        "version: \"3.8\"\n\
         services:\n\
         \x20\x20web:\n\
         \x20\x20\x20\x20image: nginx\n\
         \x20\x20\x20\x20ports:\n\
         \x20\x20\x20\x20\x20\x20- \"8080:80\"\n",
    )
    .unwrap();

    let destination = dir.path().join(".space-dns-compose.yml");
    rewrite_to_file(&[source], &destination).unwrap();

    let contents = std::fs::read_to_string(&destination).unwrap();
    assert!(contents.starts_with("# Auto-generated by space-dns"));

    let rewritten = ComposeDocument::parse(&contents).unwrap();
    let web = rewritten.services.get("web").unwrap();
    assert!(web.ports.is_none());
    assert_eq!(web.expose, Some(vec!["80".to_string()]));
    assert!(web.extra.contains_key("image"));
}

#[test]
fn rewrite_to_file_merges_a_base_and_an_override_file() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("docker-compose.yml");
    std::fs::write(
        &base,
        "version: \"3.8\"\n\
         services:\n\
         \x20\x20web:\n\
         \x20\x20\x20\x20image: nginx\n\
         \x20\x20\x20\x20ports:\n\
         \x20\x20\x20\x20\x20\x20- \"8080:80\"\n\
         \x20\x20db:\n\
         \x20\x20\x20\x20image: postgres\n\
         \x20\x20\x20\x20ports:\n\
         \x20\x20\x20\x20\x20\x20- \"5432:5432\"\n",
    )
    .unwrap();

    let override_file = dir.path().join("docker-compose.override.yml");
    std::fs::write(
        &override_file,
        "services:\n\
         \x20\x20web:\n\
         \x20\x20\x20\x20image: nginx:1.27\n\
         \x20\x20\x20\x20ports:\n\
         \x20\x20\x20\x20\x20\x20- \"9090:80\"\n",
    )
    .unwrap();

    let destination = dir.path().join(".space-dns-compose.yml");
    rewrite_to_file(&[base, override_file], &destination).unwrap();

    let rewritten = ComposeDocument::parse(&std::fs::read_to_string(&destination).unwrap()).unwrap();

    // The override's `web` entirely replaces the base's `web` (compose's
    // own multi-file service-level overlay semantics), so only the
    // override's image and port survive the rewrite.
    let web = rewritten.services.get("web").unwrap();
    assert_eq!(web.expose, Some(vec!["80".to_string()]));
    assert_eq!(
        web.extra.get("image").and_then(|v| v.as_str()),
        Some("nginx:1.27")
    );

    // `db` only appears in the base file and survives untouched aside
    // from the port rewrite.
    let db = rewritten.services.get("db").unwrap();
    assert!(db.ports.is_none());
    assert_eq!(db.expose, Some(vec!["5432".to_string()]));
}

#[test]
fn rewrite_to_file_is_idempotent_when_applied_to_its_own_output() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("docker-compose.yml");
    std::fs::write(
        &source,
        "services:\n\
         \x20\x20web:\n\
         \x20\x20\x20\x20image: nginx\n\
         \x20\x20\x20\x20ports:\n\
         \x20\x20\x20\x20\x20\x20- \"8080:80\"\n",
    )
    .unwrap();

    let first_pass = dir.path().join(".space-dns-compose.yml");
    rewrite_to_file(&[source], &first_pass).unwrap();

    let second_pass = dir.path().join(".space-dns-compose-again.yml");
    rewrite_to_file(&[first_pass], &second_pass).unwrap();

    let rewritten = ComposeDocument::parse(&std::fs::read_to_string(&second_pass).unwrap()).unwrap();
    let web = rewritten.services.get("web").unwrap();
    assert!(web.ports.is_none());
    assert_eq!(web.expose, Some(vec!["80".to_string()]));
}

#[test]
fn rewrite_to_file_surfaces_an_io_error_for_a_missing_source() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("does-not-exist.yml");
    let destination = dir.path().join(".space-dns-compose.yml");

    let result = rewrite_to_file(&[missing], &destination);
    assert!(result.is_err());
}
