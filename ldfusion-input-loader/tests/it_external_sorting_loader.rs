//! End-to-end tests for the external sorting input loader.

use ldfusion_graph_ir::{ConflictClusters, Quad, Term};
use ldfusion_input_loader::{
    ExternalSortingInputLoader, InputLoader, LoaderConfig, LoaderError, NQuadsFileSource,
    QuadSource, ResolvedStatement, VecQuadSource,
};
use ldfusion_nquads::{NQuadsWriter, RdfFormat};
use ldfusion_uri_mapping::{UriMapping, UriMappingBuilder};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const NS: &str = "http://example.com/";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn iri(local: &str) -> Term {
    Term::iri(format!("{}{}", NS, local))
}

fn quad(s: &str, p: &str, o: &str, g: &str) -> Quad {
    Quad::new(iri(s), iri(p), iri(o), Some(iri(g)))
}

/// sa, sb -> sx; pa, pb -> px; oa, ob -> ox; ga, gb -> gx
fn test_mapping() -> Arc<dyn UriMapping> {
    let mut builder = UriMappingBuilder::new();
    for target in ["sx", "px", "ox", "gx"] {
        builder.add_canonical_target(format!("{}{}", NS, target));
    }
    for (prefix, target) in [("s", "sx"), ("p", "px"), ("o", "ox"), ("g", "gx")] {
        for member in ["a", "b"] {
            builder.add_link(
                format!("{}{}{}", NS, prefix, member),
                format!("{}{}", NS, target),
            );
        }
    }
    Arc::new(builder.build())
}

fn test_quads() -> Vec<Quad> {
    vec![
        quad("sa", "pa", "oa", "g1"),
        quad("sb", "pb", "ob", "g1"),
        quad("sa", "pa", "o2", "ga"),
        quad("s2", "pa", "oa", "g2"),
        quad("s2", "p2", "o2", "g2"),
        quad("s3", "pb", "ob", "gb"),
        Quad::new(iri("sx"), iri("p3"), Term::string("literal"), Some(iri("g3"))),
        quad("s1", "pa", "oa", "g1"),
        quad("sb", "p2", "oa", "g2"),
        quad("s3", "pa", "ob", "g1"),
    ]
}

fn write_input(dir: &Path, name: &str, quads: &[Quad]) -> PathBuf {
    let path = dir.join(name);
    let file = std::fs::File::create(&path).unwrap();
    let mut writer = NQuadsWriter::new(std::io::BufWriter::new(file));
    for q in quads {
        writer.write_quad(q).unwrap();
    }
    writer.flush().unwrap();
    path
}

fn file_source(path: &Path) -> Box<dyn QuadSource> {
    Box::new(NQuadsFileSource::new(path, RdfFormat::NQuads))
}

fn collect_blocks(loader: &mut ExternalSortingInputLoader) -> Vec<Vec<Quad>> {
    let mut blocks = Vec::new();
    while loader.has_next() {
        blocks.push(loader.next_quads().unwrap());
    }
    blocks
}

fn map_all(mapping: &dyn UriMapping, quads: &[Quad]) -> Vec<Quad> {
    let map = |t: &Term| match t {
        Term::Iri(i) => Term::Iri(mapping.canonicalize(i)),
        other => other.clone(),
    };
    quads
        .iter()
        .map(|q| Quad::new(map(&q.s), map(&q.p), map(&q.o), q.g.clone()))
        .collect()
}

fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

fn run_file_scenario(memory_limit_bytes: usize) {
    init_tracing();
    let input_dir = tempfile::tempdir().unwrap();
    let work_dir = tempfile::tempdir().unwrap();
    let input = write_input(input_dir.path(), "input.nq", &test_quads());

    let config = LoaderConfig::new(work_dir.path()).with_memory_limit_bytes(memory_limit_bytes);
    let mut loader = ExternalSortingInputLoader::new(vec![file_source(&input)], config).unwrap();
    let mapping = test_mapping();
    loader.initialize(Arc::clone(&mapping)).unwrap();
    let blocks = collect_blocks(&mut loader);
    loader.close();

    // Everything arrives, mapped and in SPOG order
    let emitted: Vec<Quad> = blocks.iter().flatten().cloned().collect();
    let mut expected = map_all(mapping.as_ref(), &test_quads());
    expected.sort();
    assert_eq!(emitted, expected);

    // One subject per block, no subject in two blocks
    let mut subjects = HashSet::new();
    for block in &blocks {
        assert!(!block.is_empty());
        assert!(block.iter().all(|q| q.s == block[0].s));
        assert!(subjects.insert(block[0].s.clone()));
    }

    // Every (subject, predicate) cluster lies within one block
    let mut clusters = HashSet::new();
    for block in &blocks {
        for (predicate, _) in ConflictClusters::new(block) {
            assert!(clusters.insert((block[0].s.clone(), predicate.clone())));
        }
    }

    assert!(dir_entries(work_dir.path()).is_empty());
}

#[test]
fn test_iterates_all_mapped_quads_in_memory() {
    run_file_scenario(usize::MAX);
}

#[test]
fn test_iterates_all_mapped_quads_with_low_memory() {
    run_file_scenario(1);
}

#[test]
fn test_zero_memory_limit_spills_every_quad() {
    let work_dir = tempfile::tempdir().unwrap();
    let source: Box<dyn QuadSource> = Box::new(VecQuadSource::new("mem", test_quads()));
    let config = LoaderConfig::new(work_dir.path()).with_memory_limit_bytes(0);
    let mut loader = ExternalSortingInputLoader::new(vec![source], config).unwrap();
    loader.initialize(test_mapping()).unwrap();
    assert_eq!(loader.stats().runs_written, test_quads().len() as u64);

    let emitted: usize = collect_blocks(&mut loader).iter().map(Vec::len).sum();
    assert_eq!(emitted, test_quads().len());
}

#[test]
fn test_merged_duplicates_share_one_cluster() {
    let work_dir = tempfile::tempdir().unwrap();
    let quads = vec![quad("sa", "pa", "oa", "g1"), quad("sb", "pb", "ob", "g1")];
    let source: Box<dyn QuadSource> = Box::new(VecQuadSource::new("mem", quads));
    let mut loader =
        ExternalSortingInputLoader::new(vec![source], LoaderConfig::new(work_dir.path())).unwrap();
    loader.initialize(test_mapping()).unwrap();

    let blocks = collect_blocks(&mut loader);
    assert_eq!(blocks.len(), 1);
    let expected = quad("sx", "px", "ox", "g1");
    assert_eq!(blocks[0], vec![expected.clone(), expected]);
    assert_eq!(ConflictClusters::new(&blocks[0]).count(), 1);
}

#[test]
fn test_exact_duplicates_preserved_across_runs() {
    let work_dir = tempfile::tempdir().unwrap();
    let dup = quad("s1", "p1", "o1", "g1");
    let source: Box<dyn QuadSource> =
        Box::new(VecQuadSource::new("mem", vec![dup.clone(), dup.clone(), dup.clone()]));
    let config = LoaderConfig::new(work_dir.path()).with_memory_limit_bytes(1);
    let mut loader = ExternalSortingInputLoader::new(vec![source], config).unwrap();
    loader.initialize(test_mapping()).unwrap();

    assert_eq!(loader.next_quads().unwrap(), vec![dup.clone(), dup.clone(), dup]);
    assert!(!loader.has_next());
}

#[test]
fn test_empty_input() {
    let work_dir = tempfile::tempdir().unwrap();
    for limit in [usize::MAX, 1] {
        let config = LoaderConfig::new(work_dir.path()).with_memory_limit_bytes(limit);
        let mut loader = ExternalSortingInputLoader::new(Vec::new(), config).unwrap();
        loader.initialize(test_mapping()).unwrap();
        assert!(!loader.has_next());
        assert!(matches!(loader.next_quads(), Err(LoaderError::Exhausted)));
        loader.close();
    }
    assert!(dir_entries(work_dir.path()).is_empty());
}

#[test]
fn test_temp_files_cleared_on_early_close() {
    let input_dir = tempfile::tempdir().unwrap();
    let work_dir = tempfile::tempdir().unwrap();
    let input = write_input(input_dir.path(), "input.nq", &test_quads());

    let config = LoaderConfig::new(work_dir.path()).with_memory_limit_bytes(1);
    let mut loader = ExternalSortingInputLoader::new(vec![file_source(&input)], config).unwrap();
    loader.initialize(test_mapping()).unwrap();
    assert_eq!(dir_entries(work_dir.path()).len(), 1);

    loader.next_quads().unwrap();
    loader.close();
    assert!(dir_entries(work_dir.path()).is_empty());
    assert!(input.exists());
}

#[test]
fn test_temp_files_cleared_on_drop() {
    let work_dir = tempfile::tempdir().unwrap();
    let source: Box<dyn QuadSource> = Box::new(VecQuadSource::new("mem", test_quads()));
    let config = LoaderConfig::new(work_dir.path()).with_memory_limit_bytes(1);
    {
        let mut loader = ExternalSortingInputLoader::new(vec![source], config).unwrap();
        loader.initialize(test_mapping()).unwrap();
        assert!(loader.has_next());
    }
    assert!(dir_entries(work_dir.path()).is_empty());
}

#[test]
fn test_temp_files_cleared_on_error() {
    let input_dir = tempfile::tempdir().unwrap();
    let work_dir = tempfile::tempdir().unwrap();
    let input = write_input(input_dir.path(), "input.nq", &test_quads());
    let mut contents = std::fs::read_to_string(&input).unwrap();
    contents.push_str("xyz;\n");
    std::fs::write(&input, contents).unwrap();

    let config = LoaderConfig::new(work_dir.path()).with_memory_limit_bytes(1);
    let mut loader = ExternalSortingInputLoader::new(vec![file_source(&input)], config).unwrap();
    let err = loader.initialize(test_mapping()).unwrap_err();
    assert!(matches!(err, LoaderError::Malformed { .. }));
    assert!(dir_entries(work_dir.path()).is_empty());

    assert!(!loader.has_next());
    loader.close();
    assert!(dir_entries(work_dir.path()).is_empty());
}

#[test]
fn test_temp_files_cleared_on_corrupt_run() {
    init_tracing();
    let work_dir = tempfile::tempdir().unwrap();
    let quads: Vec<Quad> = (0..6000)
        .map(|i| quad(&format!("s{:05}", (i * 7919) % 6000), "p", &format!("o{}", i), "g"))
        .collect();
    let source: Box<dyn QuadSource> = Box::new(VecQuadSource::new("mem", quads));
    let config = LoaderConfig::new(work_dir.path())
        .with_memory_limit_bytes(200_000)
        .with_read_batch_size(1);
    let mut loader = ExternalSortingInputLoader::new(vec![source], config).unwrap();
    loader.initialize(test_mapping()).unwrap();
    assert!(loader.stats().runs_written > 1);

    let session = dir_entries(work_dir.path())
        .into_iter()
        .find(|name| name.starts_with("ldfusion-sort-"))
        .map(|name| work_dir.path().join(name))
        .unwrap();
    for run in dir_entries(&session) {
        std::fs::OpenOptions::new()
            .write(true)
            .open(session.join(run))
            .unwrap()
            .set_len(40)
            .unwrap();
    }

    let err = loop {
        match loader.next_quads() {
            Ok(_) => continue,
            Err(e) => break e,
        }
    };
    assert!(matches!(err, LoaderError::CorruptRun { .. }), "{err:?}");
    assert!(!loader.has_next());
    assert!(matches!(loader.next_quads(), Err(LoaderError::Closed)));
    assert!(dir_entries(work_dir.path()).is_empty());
}

#[test]
fn test_object_mapping_disabled() {
    let work_dir = tempfile::tempdir().unwrap();
    let quads = vec![quad("sa", "pa", "ob", "ga"), quad("sb", "pb", "oa", "g1")];

    for limit in [usize::MAX, 1] {
        let source: Box<dyn QuadSource> = Box::new(VecQuadSource::new("mem", quads.clone()));
        let config = LoaderConfig::new(work_dir.path())
            .with_memory_limit_bytes(limit)
            .with_map_objects(false);
        let mut loader = ExternalSortingInputLoader::new(vec![source], config).unwrap();
        loader.initialize(test_mapping()).unwrap();

        assert_eq!(
            loader.next_quads().unwrap(),
            vec![quad("sx", "px", "oa", "g1"), quad("sx", "px", "ob", "ga")]
        );
        assert!(!loader.has_next());
        loader.close();
    }
    assert!(dir_entries(work_dir.path()).is_empty());
}

#[test]
fn test_missing_source_file() {
    let work_dir = tempfile::tempdir().unwrap();
    let missing = work_dir.path().join("missing.nq");
    let config = LoaderConfig::new(work_dir.path());
    let mut loader = ExternalSortingInputLoader::new(vec![file_source(&missing)], config).unwrap();
    assert!(matches!(
        loader.initialize(test_mapping()),
        Err(LoaderError::SourceRead { .. })
    ));
}

#[test]
fn test_update_with_resolved_statements_never_fails() {
    let work_dir = tempfile::tempdir().unwrap();
    let source: Box<dyn QuadSource> = Box::new(VecQuadSource::new("mem", test_quads()));
    let mut loader =
        ExternalSortingInputLoader::new(vec![source], LoaderConfig::new(work_dir.path())).unwrap();
    loader.update_with_resolved_statements(&[]);
    loader.initialize(test_mapping()).unwrap();

    while loader.has_next() {
        let block = loader.next_quads().unwrap();
        let resolved: Vec<ResolvedStatement> = block
            .iter()
            .map(|q| ResolvedStatement::new(q.clone(), 1.0, q.g.iter().cloned().collect()))
            .collect();
        loader.update_with_resolved_statements(&resolved);
    }
    loader.close();
    loader.update_with_resolved_statements(&[]);
}

#[test]
fn test_multiple_input_files() {
    let input_dir = tempfile::tempdir().unwrap();
    let work_dir = tempfile::tempdir().unwrap();
    let quads = test_quads();
    let (first, second) = quads.split_at(4);
    let a = write_input(input_dir.path(), "a.nq", first);
    let b = write_input(input_dir.path(), "b.nq", second);

    for limit in [usize::MAX, 1] {
        let config = LoaderConfig::new(work_dir.path()).with_memory_limit_bytes(limit);
        let sources = vec![file_source(&a), file_source(&b)];
        let mut loader = ExternalSortingInputLoader::new(sources, config).unwrap();
        let mapping = test_mapping();
        loader.initialize(Arc::clone(&mapping)).unwrap();
        let emitted: Vec<Quad> = collect_blocks(&mut loader).into_iter().flatten().collect();

        let mut expected = map_all(mapping.as_ref(), &quads);
        expected.sort();
        assert_eq!(emitted, expected);
        assert_eq!(loader.stats().quads_read, quads.len() as u64);
    }
}

#[test]
fn test_filters_unmapped_subjects() {
    let work_dir = tempfile::tempdir().unwrap();
    let mut builder = UriMappingBuilder::new();
    builder.add_canonical_target(format!("{}sx", NS));
    builder.add_canonical_target(format!("{}s2", NS));
    builder.add_link(format!("{}s1", NS), format!("{}sx", NS));
    builder.add_link(format!("{}s2", NS), format!("{}sy", NS));
    let mapping: Arc<dyn UriMapping> = Arc::new(builder.build());

    let quads: Vec<Quad> = (1..=4)
        .map(|i| quad(&format!("s{}", i), "p1", "o1", "g1"))
        .collect();

    for limit in [usize::MAX, 1] {
        let source: Box<dyn QuadSource> = Box::new(VecQuadSource::new("mem", quads.clone()));
        let config = LoaderConfig::new(work_dir.path())
            .with_memory_limit_bytes(limit)
            .with_output_mapped_subjects_only(true);
        let mut loader = ExternalSortingInputLoader::new(vec![source], config).unwrap();
        loader.initialize(Arc::clone(&mapping)).unwrap();

        let subjects: Vec<Term> = collect_blocks(&mut loader)
            .into_iter()
            .map(|block| block[0].s.clone())
            .collect();
        assert_eq!(subjects, vec![iri("s2"), iri("sx")]);
        loader.close();
        assert_eq!(loader.stats().quads_filtered, 2);
    }
}

#[test]
fn test_fan_in_consolidation() {
    let work_dir = tempfile::tempdir().unwrap();
    let quads: Vec<Quad> = (0..40)
        .map(|i| quad(&format!("s{}", i % 7), "p", &format!("o{}", i), "g"))
        .collect();
    let source: Box<dyn QuadSource> = Box::new(VecQuadSource::new("mem", quads.clone()));
    let config = LoaderConfig::new(work_dir.path())
        .with_memory_limit_bytes(1)
        .with_max_open_runs(4)
        .with_read_batch_size(3);
    let mut loader = ExternalSortingInputLoader::new(vec![source], config).unwrap();
    loader.initialize(test_mapping()).unwrap();
    assert!(loader.stats().consolidations > 0);

    let blocks = collect_blocks(&mut loader);
    assert_eq!(blocks.len(), 7);
    let emitted: Vec<Quad> = blocks.into_iter().flatten().collect();
    let mut expected = quads;
    expected.sort();
    assert_eq!(emitted, expected);

    loader.close();
    assert!(dir_entries(work_dir.path()).is_empty());
}

#[test]
fn test_default_graph_sorts_first() {
    let work_dir = tempfile::tempdir().unwrap();
    let quads = vec![
        quad("s1", "p1", "o1", "g1"),
        Quad::triple(iri("s1"), iri("p1"), iri("o1")),
    ];
    let source: Box<dyn QuadSource> = Box::new(VecQuadSource::new("mem", quads));
    let mut loader =
        ExternalSortingInputLoader::new(vec![source], LoaderConfig::new(work_dir.path())).unwrap();
    loader.initialize(test_mapping()).unwrap();
    let block = loader.next_quads().unwrap();
    assert_eq!(block[0].g, None);
    assert_eq!(block[1].g, Some(iri("g1")));
}
