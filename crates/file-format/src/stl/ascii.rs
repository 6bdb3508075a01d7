use std::borrow::Cow;

use tracing::{debug, instrument, warn};

use super::{Encoding, RawMeshData};
use crate::errors::FormatError;

/// A whitespace-delimited word and the byte offset where it starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token<'a> {
    pub text: &'a str,
    pub offset: usize,
}

/// Split `source` into whitespace-separated tokens.
pub fn tokenize(source: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;
    for (i, ch) in source.char_indices() {
        match (ch.is_whitespace(), start) {
            (true, Some(s)) => {
                tokens.push(Token {
                    text: &source[s..i],
                    offset: s,
                });
                start = None;
            }
            (false, None) => start = Some(i),
            _ => {}
        }
    }
    if let Some(s) = start {
        tokens.push(Token {
            text: &source[s..],
            offset: s,
        });
    }
    tokens
}

/// Accepts `[+-]? digits? (. digits?)? ([eE] [+-]? digits)?` with at least one
/// mantissa digit.
fn is_number_literal(text: &str) -> bool {
    let bytes = text.as_bytes();
    let mut i = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }
    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        digits += i - frac_start;
    }
    if digits == 0 {
        return false;
    }
    if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
        i += 1;
        if matches!(bytes.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        let exp_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            return false;
        }
    }
    i == bytes.len()
}

fn parse_number(token: &Token<'_>) -> Option<f32> {
    if is_number_literal(token.text) {
        token.text.parse::<f32>().ok()
    } else {
        None
    }
}

/// Why a facet block was rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockProblem {
    BadNumber { keyword: &'static str, found: String },
    MissingNumber { keyword: &'static str },
    NoVertices,
    PartialTriangle { vertices: usize },
    Unterminated,
}

#[derive(Debug, Default)]
struct Facet {
    normal: Option<[f32; 3]>,
    vertices: Vec<[f32; 3]>,
}

struct Grammar<'a> {
    tokens: Vec<Token<'a>>,
    pos: usize,
}

impl<'a> Grammar<'a> {
    fn next(&mut self) -> Option<Token<'a>> {
        let t = self.tokens.get(self.pos).copied();
        self.pos += 1;
        t
    }

    fn triple(&mut self, keyword: &'static str) -> Result<[f32; 3], BlockProblem> {
        let mut out = [0.0f32; 3];
        for slot in &mut out {
            let token = self.next().ok_or(BlockProblem::MissingNumber { keyword })?;
            *slot = parse_number(&token).ok_or_else(|| BlockProblem::BadNumber {
                keyword,
                found: token.text.to_string(),
            })?;
        }
        Ok(out)
    }

    /// Walk one block after its `facet` keyword, through `endfacet`.
    fn facet(&mut self) -> Result<Facet, BlockProblem> {
        let mut facet = Facet::default();
        loop {
            let Some(token) = self.next() else {
                return Err(BlockProblem::Unterminated);
            };
            match token.text {
                "endfacet" => break,
                "normal" if facet.normal.is_none() => facet.normal = Some(self.triple("normal")?),
                "vertex" => facet.vertices.push(self.triple("vertex")?),
                "facet" => {
                    // a new block starts before this one ended
                    self.pos -= 1;
                    return Err(BlockProblem::Unterminated);
                }
                _ => {}
            }
        }
        match facet.vertices.len() {
            0 => Err(BlockProblem::NoVertices),
            n if n % 3 != 0 => Err(BlockProblem::PartialTriangle { vertices: n }),
            _ => Ok(facet),
        }
    }
}

/// Decode a text buffer. Non-UTF-8 bytes are replaced, not rejected.
#[instrument(skip(bytes), fields(len = bytes.len()))]
pub fn parse_text(bytes: &[u8]) -> Result<RawMeshData, FormatError> {
    let source: Cow<'_, str> = String::from_utf8_lossy(bytes);
    let mut grammar = Grammar {
        tokens: tokenize(&source),
        pos: 0,
    };

    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut accepted = 0usize;
    let mut skipped = 0usize;

    while let Some(token) = grammar.next() {
        if token.text != "facet" {
            continue;
        }
        match grammar.facet() {
            Ok(facet) => {
                let normal = facet.normal.unwrap_or([0.0; 3]);
                for v in &facet.vertices {
                    positions.extend_from_slice(v);
                    normals.extend_from_slice(&normal);
                }
                accepted += 1;
            }
            Err(problem) => {
                warn!(offset = token.offset, ?problem, "skipping ill-formed facet");
                skipped += 1;
            }
        }
    }

    if accepted == 0 {
        return Err(FormatError::NoFacets { skipped });
    }

    debug!(facets = accepted, skipped, "decoded text facets");
    Ok(RawMeshData {
        triangle_count: positions.len() / 9,
        positions,
        normals,
        colors: None,
        default_color: None,
        encoding: Encoding::Text,
    })
}
