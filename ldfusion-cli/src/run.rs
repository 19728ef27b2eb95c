//! The fusion pipeline: mapping, loading, resolution and output.

use crate::config_file::{FusionConfig, SameAsSpec};
use crate::error::{CliError, CliResult};
use crate::output::{write_same_as_links, FusedOutput};
use crate::resolve::ConflictResolver;
use hashbrown::HashSet;
use ldfusion_graph_ir::Term;
use ldfusion_input_loader::{
    ExternalSortingInputLoader, InputLoader, NQuadsFileSource, QuadSource,
};
use ldfusion_nquads::NQuadsReader;
use ldfusion_uri_mapping::{
    load_same_as_links, read_canonical_uris, write_canonical_uris, FrozenUriMapping,
    UriMappingBuilder,
};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// What one run produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub same_as_links: u64,
    pub quads_read: u64,
    pub blocks: u64,
    pub quads_written: u64,
    pub canonical_uris_written: u64,
}

pub fn run(config: &FusionConfig, resolver: &dyn ConflictResolver) -> CliResult<RunSummary> {
    let start = Instant::now();
    let mut summary = RunSummary::default();

    let (mapping, links) = build_mapping(config)?;
    summary.same_as_links = links;

    let sources: Vec<Box<dyn QuadSource>> = config
        .sources
        .iter()
        .map(|spec| {
            let mut source =
                NQuadsFileSource::new(&spec.path, spec.format).with_label(spec.label.clone());
            if let Some(graph) = &spec.default_graph {
                source = source.with_default_graph(Term::iri(graph));
            }
            Box::new(source) as Box<dyn QuadSource>
        })
        .collect();

    let mut loader = ExternalSortingInputLoader::new(sources, config.loader.clone())?;
    loader.initialize(mapping.clone())?;

    let out_file = File::create(&config.output).map_err(|e| output_error(&config.output, e))?;
    let mut output = FusedOutput::new(BufWriter::new(out_file), config.max_output_quads);
    let mut canonical_subjects: Vec<Arc<str>> = Vec::new();

    while loader.has_next() {
        let block = loader.next_quads()?;
        if let Some(subject) = block[0].s.as_iri_arc() {
            canonical_subjects.push(Arc::clone(subject));
        }
        let resolved = resolver.resolve(&block);
        let more = output
            .write_resolved(&resolved)
            .map_err(|e| output_error(&config.output, e))?;
        loader.update_with_resolved_statements(&resolved);
        if !more {
            tracing::info!(
                max_output_quads = ?config.max_output_quads,
                "output limit reached"
            );
            break;
        }
    }

    let stats = loader.stats();
    loader.close();
    summary.quads_read = stats.quads_read;
    summary.blocks = stats.blocks_emitted;
    summary.quads_written = output
        .finish()
        .map_err(|e| output_error(&config.output, e))?;

    if let Some(path) = &config.same_as_output {
        let file = File::create(path).map_err(|e| output_error(path, e))?;
        let written = write_same_as_links(BufWriter::new(file), &mapping)
            .map_err(|e| output_error(path, e))?;
        tracing::debug!(path = %path.display(), links = written, "sameAs links written");
    }

    if let Some(path) = &config.canonical_uri_output {
        summary.canonical_uris_written = write_canonical_uris(path, &canonical_subjects)?;
    }

    tracing::info!(
        same_as_links = summary.same_as_links,
        quads_read = summary.quads_read,
        blocks = summary.blocks,
        quads_written = summary.quads_written,
        canonical_uris = summary.canonical_uris_written,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "fusion finished"
    );
    Ok(summary)
}

/// Explicit targets plus every configured link file, frozen.
fn build_mapping(config: &FusionConfig) -> CliResult<(Arc<FrozenUriMapping>, u64)> {
    let mut builder = UriMappingBuilder::new();

    if let Some(path) = &config.canonical_uri_input {
        let targets = read_canonical_uris(path)?;
        tracing::info!(path = %path.display(), count = targets.len(), "canonical URIs loaded");
        builder.add_canonical_targets(targets);
    }

    let link_types: HashSet<Arc<str>> = config
        .same_as_link_types
        .iter()
        .map(|t| Arc::from(t.as_str()))
        .collect();

    let mut links = 0;
    for spec in &config.same_as_sources {
        links += load_link_file(&mut builder, spec, &link_types)?;
    }

    let mapping = builder.build();
    tracing::info!(
        links,
        classes = mapping.num_classes(),
        elements = mapping.num_elements(),
        explicit_targets = mapping.num_explicit_targets(),
        "URI mapping built"
    );
    Ok((Arc::new(mapping), links))
}

fn load_link_file(
    builder: &mut UriMappingBuilder,
    spec: &SameAsSpec,
    link_types: &HashSet<Arc<str>>,
) -> CliResult<u64> {
    let label = spec.path.display().to_string();
    let file = File::open(&spec.path)
        .map_err(|e| CliError::Input(format!("cannot open sameAs file {label}: {e}")))?;
    let reader = NQuadsReader::new(BufReader::new(file), spec.format);
    load_same_as_links(builder, &label, reader, link_types)
        .map_err(|e| CliError::Input(format!("sameAs file {label}: {e}")))
}

fn output_error(path: &Path, e: std::io::Error) -> CliError {
    CliError::Output(format!("cannot write {}: {e}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config_file::{ConfigOverrides, FusionFileConfig};
    use crate::resolve::AllValuesResolver;

    const NS: &str = "http://example.com/";

    fn write(dir: &Path, name: &str, contents: &str) {
        std::fs::write(dir.join(name), contents).unwrap();
    }

    fn setup(dir: &Path, extra_processing: &str) -> FusionConfig {
        write(
            dir,
            "a.nq",
            &format!(
                "<{NS}berlin> <{NS}name> \"Berlin\" <{NS}g/a> .\n\
                 <{NS}paris> <{NS}name> \"Paris\" <{NS}g/a> .\n"
            ),
        );
        write(
            dir,
            "b.nt",
            &format!(
                "<{NS}berlin_de> <{NS}name> \"Berlin\" .\n\
                 <{NS}berlin_de> <{NS}population> \"3600000\"^^<http://www.w3.org/2001/XMLSchema#integer> .\n"
            ),
        );
        write(
            dir,
            "links.nt",
            &format!("<{NS}berlin_de> <http://www.w3.org/2002/07/owl#sameAs> <{NS}berlin> .\n"),
        );
        write(dir, "canonical.txt", &format!("<{NS}berlin>\n"));

        let toml = format!(
            r#"
[[sources]]
name = "a"
path = "a.nq"

[[sources]]
name = "b"
path = "b.nt"
default_graph = "{NS}g/b"

[[same_as_sources]]
path = "links.nt"

[processing]
work_dir = "."
canonical_uri_input_file = "canonical.txt"
canonical_uri_output_file = "canonical-out.txt"
{extra_processing}

[output]
path = "fused.nq"
same_as_path = "sameas.nt"
"#
        );
        let file: FusionFileConfig = toml::from_str(&toml).unwrap();
        FusionConfig::resolve(file, dir, &ConfigOverrides::default()).unwrap()
    }

    #[test]
    fn test_full_pipeline() {
        let dir = tempfile::tempdir().unwrap();
        let config = setup(dir.path(), "memory_limit_mb = 0");
        let summary = run(&config, &AllValuesResolver).unwrap();

        assert_eq!(summary.same_as_links, 1);
        assert_eq!(summary.quads_read, 4);
        assert_eq!(summary.blocks, 2);
        // berlin name (merged), berlin population, paris name
        assert_eq!(summary.quads_written, 3);
        assert_eq!(summary.canonical_uris_written, 2);

        let fused = std::fs::read_to_string(dir.path().join("fused.nq")).unwrap();
        assert!(!fused.contains("berlin_de"));
        assert_eq!(fused.matches(&format!("<{NS}berlin> <{NS}name>")).count(), 1);

        let same_as = std::fs::read_to_string(dir.path().join("sameas.nt")).unwrap();
        assert_eq!(
            same_as,
            format!("<{NS}berlin_de> <http://www.w3.org/2002/07/owl#sameAs> <{NS}berlin> .\n")
        );

        let canonical = read_canonical_uris(&dir.path().join("canonical-out.txt")).unwrap();
        assert_eq!(canonical.len(), 2);

        // Only inputs, config products and no sort leftovers
        let mut names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "a.nq",
                "b.nt",
                "canonical-out.txt",
                "canonical.txt",
                "fused.nq",
                "links.nt",
                "sameas.nt"
            ]
        );
    }

    #[test]
    fn test_mapped_subjects_only_and_limit() {
        let dir = tempfile::tempdir().unwrap();
        let config = setup(
            dir.path(),
            "output_mapped_subjects_only = true\nmax_output_quads = 1",
        );
        let summary = run(&config, &AllValuesResolver).unwrap();
        assert_eq!(summary.blocks, 1);
        assert_eq!(summary.quads_written, 1);

        let fused = std::fs::read_to_string(dir.path().join("fused.nq")).unwrap();
        assert!(fused.starts_with(&format!("<{NS}berlin> ")));
        assert!(!fused.contains("paris"));
    }

    #[test]
    fn test_missing_link_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = setup(dir.path(), "");
        config.same_as_sources[0].path = dir.path().join("nope.nt");
        assert!(matches!(
            run(&config, &AllValuesResolver),
            Err(CliError::Input(_))
        ));
    }
}
