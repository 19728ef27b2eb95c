//! N-Quads serialization

use std::io::{self, Write};

use ldfusion_graph_ir::Quad;

/// Writes quads as N-Quads lines and counts them.
pub struct NQuadsWriter<W: Write> {
    out: W,
    written: u64,
}

impl<W: Write> NQuadsWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out, written: 0 }
    }

    pub fn write_quad(&mut self, quad: &Quad) -> io::Result<()> {
        writeln!(self.out, "{}", quad)?;
        self.written += 1;
        Ok(())
    }

    /// Number of quads written so far
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ldfusion_graph_ir::Term;

    #[test]
    fn test_write_quads() {
        let mut writer = NQuadsWriter::new(Vec::new());
        writer
            .write_quad(&Quad::new(
                Term::iri("http://s"),
                Term::iri("http://p"),
                Term::lang_string("hi", "en"),
                Some(Term::iri("http://g")),
            ))
            .unwrap();
        writer
            .write_quad(&Quad::triple(
                Term::iri("http://s"),
                Term::iri("http://p"),
                Term::blank("x"),
            ))
            .unwrap();
        assert_eq!(writer.written(), 2);
        let text = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(
            text,
            "<http://s> <http://p> \"hi\"@en <http://g> .\n<http://s> <http://p> _:x .\n"
        );
    }
}
