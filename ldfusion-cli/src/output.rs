//! Writing fused data, sameAs links and canonical URIs.

use ldfusion_graph_ir::{vocab, Quad, Term};
use ldfusion_input_loader::ResolvedStatement;
use ldfusion_nquads::NQuadsWriter;
use ldfusion_uri_mapping::FrozenUriMapping;
use std::io::{self, Write};
use std::sync::Arc;

/// N-Quads sink for resolved statements with an optional quad limit.
pub struct FusedOutput<W: Write> {
    writer: NQuadsWriter<W>,
    max_quads: Option<u64>,
}

impl<W: Write> FusedOutput<W> {
    pub fn new(out: W, max_quads: Option<u64>) -> Self {
        Self {
            writer: NQuadsWriter::new(out),
            max_quads,
        }
    }

    /// Write statements until the limit is hit.
    ///
    /// Returns `false` once the limit has been reached.
    pub fn write_resolved(&mut self, statements: &[ResolvedStatement]) -> io::Result<bool> {
        for statement in statements {
            if self.is_full() {
                return Ok(false);
            }
            self.writer.write_quad(&statement.quad)?;
        }
        Ok(!self.is_full())
    }

    pub fn written(&self) -> u64 {
        self.writer.written()
    }

    fn is_full(&self) -> bool {
        self.max_quads.is_some_and(|max| self.written() >= max)
    }

    /// Flush and return the number of quads written.
    pub fn finish(mut self) -> io::Result<u64> {
        self.writer.flush()?;
        Ok(self.writer.written())
    }
}

/// Write `member owl:sameAs representative` for every non-representative
/// member of every class, sorted.
pub fn write_same_as_links<W: Write>(out: W, mapping: &FrozenUriMapping) -> io::Result<u64> {
    let mut links: Vec<(&Arc<str>, &Arc<str>)> = mapping
        .classes()
        .flat_map(|(root, members)| {
            members
                .iter()
                .filter(move |m| *m != root)
                .map(move |m| (m, root))
        })
        .collect();
    links.sort();

    let same_as = Term::iri(vocab::owl::SAME_AS);
    let mut writer = NQuadsWriter::new(out);
    for (member, root) in links {
        writer.write_quad(&Quad::triple(
            Term::Iri(Arc::clone(member)),
            same_as.clone(),
            Term::Iri(Arc::clone(root)),
        ))?;
    }
    writer.flush()?;
    Ok(writer.written())
}
