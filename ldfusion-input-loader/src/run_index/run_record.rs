//! Binary quad encoding for run files.
//!
//! Records are variable length, little-endian:
//!
//! ```text
//! [term s][term p][term o][graph]
//! term:
//!   tag: u8
//!     0 = blank node   -> [str label]
//!     1 = IRI          -> [str iri]
//!     2 = literal str  -> [str lexical][str datatype][lang]
//!     3 = literal bool -> [u8][str datatype][lang]
//!     4 = literal int  -> [i64][str datatype][lang]
//!     5 = literal f64  -> [u64 bits][str datatype][lang]
//!   str:  len: u32, utf8 bytes (strings over u32::MAX bytes are rejected on write)
//!   lang: present: u8 (0|1), [str tag]
//! graph:
//!   tag: u8 (0xFF = default graph) followed by a term body as above
//! ```
//!
//! Run files are written and read by the same process, so there is no
//! versioning at the record level; the file header carries the version.

use ldfusion_graph_ir::{BlankId, Datatype, LiteralValue, Quad, Term};
use std::io::{self, Read, Write};
use std::sync::Arc;

const TAG_BLANK: u8 = 0;
const TAG_IRI: u8 = 1;
const TAG_LIT_STRING: u8 = 2;
const TAG_LIT_BOOLEAN: u8 = 3;
const TAG_LIT_INTEGER: u8 = 4;
const TAG_LIT_DOUBLE: u8 = 5;
const TAG_DEFAULT_GRAPH: u8 = 0xFF;

/// Encode one quad. Returns the number of bytes written.
pub fn write_quad<W: Write>(out: &mut W, quad: &Quad) -> io::Result<u64> {
    let mut written = write_term(out, &quad.s)?;
    written += write_term(out, &quad.p)?;
    written += write_term(out, &quad.o)?;
    written += match &quad.g {
        Some(g) => write_term(out, g)?,
        None => {
            out.write_all(&[TAG_DEFAULT_GRAPH])?;
            1
        }
    };
    Ok(written)
}

/// Decode one quad.
///
/// Truncated input yields `UnexpectedEof`, undecodable input `InvalidData`.
pub fn read_quad<R: Read>(input: &mut R) -> io::Result<Quad> {
    let s = read_term(input)?;
    let p = read_term(input)?;
    let o = read_term(input)?;
    let g = match read_u8(input)? {
        TAG_DEFAULT_GRAPH => None,
        tag => Some(read_term_body(input, tag)?),
    };
    Ok(Quad::new(s, p, o, g))
}

fn write_term<W: Write>(out: &mut W, term: &Term) -> io::Result<u64> {
    match term {
        Term::BlankNode(id) => {
            out.write_all(&[TAG_BLANK])?;
            Ok(1 + write_str(out, id.as_str())?)
        }
        Term::Iri(iri) => {
            out.write_all(&[TAG_IRI])?;
            Ok(1 + write_str(out, iri)?)
        }
        Term::Literal {
            value,
            datatype,
            language,
        } => {
            let mut written = 1;
            match value {
                LiteralValue::String(s) => {
                    out.write_all(&[TAG_LIT_STRING])?;
                    written += write_str(out, s)?;
                }
                LiteralValue::Boolean(b) => {
                    out.write_all(&[TAG_LIT_BOOLEAN, u8::from(*b)])?;
                    written += 1;
                }
                LiteralValue::Integer(i) => {
                    out.write_all(&[TAG_LIT_INTEGER])?;
                    out.write_all(&i.to_le_bytes())?;
                    written += 8;
                }
                LiteralValue::Double(d) => {
                    out.write_all(&[TAG_LIT_DOUBLE])?;
                    out.write_all(&d.to_bits().to_le_bytes())?;
                    written += 8;
                }
            }
            written += write_str(out, datatype.as_iri())?;
            match language {
                Some(lang) => {
                    out.write_all(&[1])?;
                    written += 1 + write_str(out, lang)?;
                }
                None => {
                    out.write_all(&[0])?;
                    written += 1;
                }
            }
            Ok(written)
        }
    }
}

fn write_str<W: Write>(out: &mut W, s: &str) -> io::Result<u64> {
    let len = u32::try_from(s.len()).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("string of {} bytes too long for run record", s.len()),
        )
    })?;
    out.write_all(&len.to_le_bytes())?;
    out.write_all(s.as_bytes())?;
    Ok(4 + s.len() as u64)
}

fn read_term<R: Read>(input: &mut R) -> io::Result<Term> {
    let tag = read_u8(input)?;
    read_term_body(input, tag)
}

fn read_term_body<R: Read>(input: &mut R, tag: u8) -> io::Result<Term> {
    match tag {
        TAG_BLANK => Ok(Term::BlankNode(BlankId::new(read_str(input)?))),
        TAG_IRI => Ok(Term::Iri(read_str(input)?)),
        TAG_LIT_STRING => {
            let value = LiteralValue::String(read_str(input)?);
            read_literal_tail(input, value)
        }
        TAG_LIT_BOOLEAN => {
            let value = LiteralValue::Boolean(read_u8(input)? != 0);
            read_literal_tail(input, value)
        }
        TAG_LIT_INTEGER => {
            let value = LiteralValue::Integer(i64::from_le_bytes(read_array(input)?));
            read_literal_tail(input, value)
        }
        TAG_LIT_DOUBLE => {
            let bits = u64::from_le_bytes(read_array(input)?);
            read_literal_tail(input, LiteralValue::Double(f64::from_bits(bits)))
        }
        other => Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("run record: unknown term tag {}", other),
        )),
    }
}

fn read_literal_tail<R: Read>(input: &mut R, value: LiteralValue) -> io::Result<Term> {
    let datatype = Datatype::from_iri(read_str(input)?);
    let language = match read_u8(input)? {
        0 => None,
        1 => Some(read_str(input)?),
        other => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("run record: invalid language flag {}", other),
            ))
        }
    };
    Ok(Term::Literal {
        value,
        datatype,
        language,
    })
}

/// Reads through `take` so a corrupt length prefix ends in `UnexpectedEof`
/// instead of a huge up-front allocation.
fn read_str<R: Read>(input: &mut R) -> io::Result<Arc<str>> {
    let len = u32::from_le_bytes(read_array(input)?) as usize;
    let mut bytes = Vec::new();
    (&mut *input).take(len as u64).read_to_end(&mut bytes)?;
    if bytes.len() != len {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("run record: string truncated at {} of {} bytes", bytes.len(), len),
        ));
    }
    let s = String::from_utf8(bytes).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("run record: invalid UTF-8: {}", e),
        )
    })?;
    Ok(Arc::from(s))
}

fn read_u8<R: Read>(input: &mut R) -> io::Result<u8> {
    let [b] = read_array::<R, 1>(input)?;
    Ok(b)
}

fn read_array<R: Read, const N: usize>(input: &mut R) -> io::Result<[u8; N]> {
    let mut buf = [0u8; N];
    input.read_exact(&mut buf)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample_quads() -> Vec<Quad> {
        vec![
            Quad::new(
                Term::iri("http://ex.org/s"),
                Term::iri("http://ex.org/p"),
                Term::lang_string("bonjour", "fr"),
                Some(Term::iri("http://ex.org/g")),
            ),
            Quad::triple(
                Term::blank("b0"),
                Term::iri("http://ex.org/p"),
                Term::integer(-42),
            ),
            Quad::new(
                Term::iri("http://ex.org/s"),
                Term::iri("http://ex.org/p"),
                Term::double(2.5),
                Some(Term::blank("g")),
            ),
            Quad::triple(
                Term::iri("http://ex.org/s"),
                Term::iri("http://ex.org/p"),
                Term::boolean(true),
            ),
        ]
    }

    #[test]
    fn test_encode_decode_stream() {
        let quads = sample_quads();
        let mut buf = Vec::new();
        let mut total = 0;
        for q in &quads {
            total += write_quad(&mut buf, q).unwrap();
        }
        assert_eq!(total, buf.len() as u64);

        let mut cursor = Cursor::new(buf);
        let decoded: Vec<Quad> = (0..quads.len())
            .map(|_| read_quad(&mut cursor).unwrap())
            .collect();
        assert_eq!(decoded, quads);
    }

    #[test]
    fn test_truncated_record_is_eof() {
        let mut buf = Vec::new();
        write_quad(&mut buf, &sample_quads()[0]).unwrap();
        buf.truncate(buf.len() - 3);
        let err = read_quad(&mut Cursor::new(buf)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_large_literal_survives_encoding() {
        let big = "x".repeat(65 << 20);
        let quad = Quad::triple(
            Term::iri("http://ex.org/s"),
            Term::iri("http://ex.org/p"),
            Term::string(big.as_str()),
        );
        let mut buf = Vec::new();
        write_quad(&mut buf, &quad).unwrap();
        assert_eq!(read_quad(&mut Cursor::new(buf)).unwrap(), quad);
    }

    #[test]
    fn test_corrupt_length_prefix_is_eof() {
        let mut buf = vec![TAG_IRI];
        buf.extend_from_slice(&u32::MAX.to_le_bytes());
        buf.extend_from_slice(b"short");
        let err = read_quad(&mut Cursor::new(buf)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_unknown_tag_is_invalid_data() {
        let err = read_quad(&mut Cursor::new(vec![9u8, 0, 0, 0, 0])).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
