//! sameAs link files and canonical URI lists on disk.

use std::fs::File;
use std::io::BufReader;
use std::sync::Arc;

use hashbrown::HashSet;
use ldfusion_graph_ir::vocab::owl;
use ldfusion_nquads::{NQuadsReader, RdfFormat};
use ldfusion_uri_mapping::{
    load_same_as_links, read_canonical_uris, write_canonical_uris, MappingError, UriMapping,
    UriMappingBuilder,
};

fn same_as_types() -> HashSet<Arc<str>> {
    [Arc::from(owl::SAME_AS)].into_iter().collect()
}

#[test]
fn test_links_from_ntriples_file() {
    let dir = tempfile::tempdir().unwrap();
    let links = dir.path().join("links.nt");
    std::fs::write(
        &links,
        format!(
            "<http://a/1> <{same}> <http://b/1> .\n\
             <http://b/1> <{same}> <http://c/1> .\n\
             # unrelated statement\n\
             <http://a/2> <http://ex.org/label> \"two\" .\n\
             <http://a/2> <{same}> <http://b/2> .\n",
            same = owl::SAME_AS
        ),
    )
    .unwrap();

    let canonical = dir.path().join("canonical.txt");
    std::fs::write(&canonical, "# preferred\n<http://c/1>\n\nhttp://b/2\n").unwrap();

    let mut builder = UriMappingBuilder::new();
    builder.add_canonical_targets(read_canonical_uris(&canonical).unwrap());

    let file = BufReader::new(File::open(&links).unwrap());
    let reader = NQuadsReader::new(file, RdfFormat::NTriples);
    let loaded = load_same_as_links(&mut builder, "links.nt", reader, &same_as_types()).unwrap();
    assert_eq!(loaded, 3);

    let mapping = builder.build();
    assert_eq!(&*mapping.canonicalize(&Arc::from("http://a/1")), "http://c/1");
    assert_eq!(&*mapping.canonicalize(&Arc::from("http://a/2")), "http://b/2");
    assert!(mapping.is_explicit_target("http://c/1"));
    assert_eq!(mapping.num_classes(), 2);
}

#[test]
fn test_malformed_link_file_propagates_line() {
    let dir = tempfile::tempdir().unwrap();
    let links = dir.path().join("links.nt");
    std::fs::write(&links, format!("<http://a> <{}> <http://b> .\nxyz;\n", owl::SAME_AS)).unwrap();

    let mut builder = UriMappingBuilder::new();
    let file = BufReader::new(File::open(&links).unwrap());
    let reader = NQuadsReader::new(file, RdfFormat::NTriples);
    let err = load_same_as_links(&mut builder, "links.nt", reader, &same_as_types()).unwrap_err();
    assert_eq!(err.line(), 2);
}

#[test]
fn test_canonical_uri_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.txt");

    let written = write_canonical_uris(&path, ["http://x/1", "http://x/2"]).unwrap();
    assert_eq!(written, 2);

    let read = read_canonical_uris(&path).unwrap();
    let read: Vec<&str> = read.iter().map(|s| s.as_ref()).collect();
    assert_eq!(read, vec!["http://x/1", "http://x/2"]);
}

#[test]
fn test_canonical_uri_file_errors() {
    let dir = tempfile::tempdir().unwrap();

    let missing = read_canonical_uris(&dir.path().join("missing.txt")).unwrap_err();
    assert!(matches!(missing, MappingError::Io { .. }));

    let bad = dir.path().join("bad.txt");
    std::fs::write(&bad, "http://ok\n<http://unterminated\n").unwrap();
    match read_canonical_uris(&bad).unwrap_err() {
        MappingError::Parse { line, .. } => assert_eq!(line, 2),
        other => panic!("unexpected error: {other:?}"),
    }
}
