//! Statement parser: turns the tokens of one line into a [`Quad`].

use std::str::FromStr;
use std::sync::Arc;

use ldfusion_graph_ir::{Datatype, Quad, Term};

use crate::error::{NQuadsError, Result};
use crate::lex::{tokenize_line, Token, TokenKind};

/// Line-based RDF syntax accepted by the parser.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RdfFormat {
    /// Statements may carry a fourth (graph) term
    #[default]
    NQuads,
    /// Statements must be triples
    NTriples,
}

impl FromStr for RdfFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nquads" | "n-quads" | "nq" => Ok(Self::NQuads),
            "ntriples" | "n-triples" | "nt" => Ok(Self::NTriples),
            other => Err(format!("unknown RDF format '{}'", other)),
        }
    }
}

/// Parse one line.
///
/// Returns `Ok(None)` for blank and comment-only lines.
pub fn parse_line(line: &str, line_number: usize, format: RdfFormat) -> Result<Option<Quad>> {
    let tokens = tokenize_line(line, line_number)?;
    if tokens.is_empty() {
        return Ok(None);
    }
    StatementParser {
        tokens: &tokens,
        pos: 0,
        line: line_number,
    }
    .parse_statement(format)
    .map(Some)
}

struct StatementParser<'t> {
    tokens: &'t [Token],
    pos: usize,
    line: usize,
}

impl<'t> StatementParser<'t> {
    fn parse_statement(&mut self, format: RdfFormat) -> Result<Quad> {
        let s = self.parse_resource("subject")?;
        let p = match self.advance() {
            Some(TokenKind::Iri(iri)) => self.absolute_iri(iri)?,
            _ => return Err(self.error("expected IRI as predicate")),
        };
        let o = self.parse_object()?;

        let g = if matches!(self.peek(), Some(TokenKind::Dot)) {
            None
        } else if format == RdfFormat::NTriples {
            return Err(self.error("graph term not allowed in N-Triples"));
        } else {
            Some(self.parse_resource("graph label")?)
        };

        match self.advance() {
            Some(TokenKind::Dot) => {}
            _ => return Err(self.error("expected '.' at end of statement")),
        }
        if self.pos < self.tokens.len() {
            return Err(self.error("unexpected content after '.'"));
        }

        Ok(Quad::new(s, p, o, g))
    }

    /// IRI or blank node
    fn parse_resource(&mut self, position: &str) -> Result<Term> {
        match self.advance() {
            Some(TokenKind::Iri(iri)) => self.absolute_iri(iri),
            Some(TokenKind::BlankNodeLabel(label)) => Ok(Term::blank(label.as_ref())),
            _ => Err(self.error(format!("expected IRI or blank node as {}", position))),
        }
    }

    fn parse_object(&mut self) -> Result<Term> {
        let value = match self.advance() {
            Some(TokenKind::String(value)) => value.clone(),
            Some(TokenKind::Iri(iri)) => return self.absolute_iri(iri),
            Some(TokenKind::BlankNodeLabel(label)) => return Ok(Term::blank(label.as_ref())),
            _ => return Err(self.error("expected IRI, blank node or literal as object")),
        };

        match self.peek() {
            Some(TokenKind::LangTag(lang)) => {
                let lang = lang.clone();
                self.pos += 1;
                Ok(Term::lang_string(value.as_ref(), lang.as_ref()))
            }
            Some(TokenKind::DoubleCaret) => {
                self.pos += 1;
                match self.advance() {
                    Some(TokenKind::Iri(dt)) => {
                        let datatype = Datatype::from_iri(dt.as_ref());
                        if datatype.is_xsd_string() {
                            Ok(Term::string(value.as_ref()))
                        } else {
                            Ok(Term::typed(value.as_ref(), datatype))
                        }
                    }
                    _ => Err(self.error("expected datatype IRI after '^^'")),
                }
            }
            _ => Ok(Term::string(value.as_ref())),
        }
    }

    fn absolute_iri(&self, iri: &Arc<str>) -> Result<Term> {
        if iri.contains(':') {
            Ok(Term::Iri(Arc::clone(iri)))
        } else {
            Err(self.error(format!("IRI <{}> is not absolute", iri)))
        }
    }

    fn peek(&self) -> Option<&'t TokenKind> {
        self.tokens.get(self.pos).map(|t| &t.kind)
    }

    fn advance(&mut self) -> Option<&'t TokenKind> {
        let kind = self.peek();
        if kind.is_some() {
            self.pos += 1;
        }
        kind
    }

    fn error(&self, message: impl Into<String>) -> NQuadsError {
        NQuadsError::syntax(self.line, message)
    }
}
