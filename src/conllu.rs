//! CoNLL-U reading and writing for annotated documents
//!
//! Documents are delimited with `# newdoc` comment lines, sentences with blank
//! lines. Entity types and spacing live in the MISC column
//! (`EntType=DATE|SpaceAfter=No`). Input without any `# newdoc` line is read
//! as a single document.
//!
//! Text columns and `# text =` values use backslash escapes (`\t`, `\n`,
//! `\r`, `\\`) so written documents read back unchanged. A column holding
//! only `_` is the empty string; a literal underscore is written `\_`.
//!
//! CoNLL-U format: https://universaldependencies.org/format.html

use crate::tree::{Document, Features, Sentence, Token, TokenId};
use std::io::{self, BufRead, BufReader, Lines, Write};

const NEWDOC: &str = "newdoc";
const ENT_TYPE: &str = "EntType";
const SPACE_AFTER: &str = "SpaceAfter";

/// Error during CoNLL-U parsing
#[derive(Debug, thiserror::Error)]
#[error("Parse error at line {line_num}: {message}")]
pub struct ParseError {
    pub line_num: usize,
    pub message: String,
}

impl ParseError {
    fn new(line_num: usize, message: impl Into<String>) -> Self {
        Self {
            line_num,
            message: message.into(),
        }
    }
}

/// Token ID field (can be integer, range, or decimal)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldId {
    Single(usize),
    Range(usize, usize),
    Decimal(usize, usize),
}

/// Reader that iterates over documents
pub struct DocumentReader<R: BufRead> {
    lines: Lines<R>,
    line_num: usize,
    /// A `# newdoc` has been seen and its document not yet returned
    open: bool,
    next_id: Option<String>,
    done: bool,
}

impl<R: BufRead> DocumentReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_num: 0,
            open: false,
            next_id: None,
            done: false,
        }
    }
}

impl DocumentReader<BufReader<io::Cursor<String>>> {
    /// Create a reader from a string
    pub fn from_string(text: &str) -> Self {
        Self::new(BufReader::new(io::Cursor::new(text.to_string())))
    }
}

/// Token lines and comments of the sentence being read
#[derive(Default)]
struct SentenceBlock {
    lines: Vec<(usize, String)>,
    text: Option<String>,
}

impl SentenceBlock {
    fn finish_into(&mut self, doc: &mut Document) -> Result<(), ParseError> {
        if !self.lines.is_empty() {
            let lines = std::mem::take(&mut self.lines);
            doc.sentences.push(parse_sentence(lines, self.text.take())?);
        }
        self.text = None;
        Ok(())
    }
}

impl<R: BufRead> Iterator for DocumentReader<R> {
    type Item = Result<Document, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut doc = Document::new();
        doc.id = self.next_id.take();
        let mut block = SentenceBlock::default();

        loop {
            self.line_num += 1;
            match self.lines.next() {
                None => {
                    self.done = true;
                    if let Err(e) = block.finish_into(&mut doc) {
                        return Some(Err(e));
                    }
                    return if self.open { Some(Ok(doc)) } else { None };
                }
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(ParseError::new(
                        self.line_num,
                        format!("IO error: {}", e),
                    )));
                }
                Some(Ok(line)) => {
                    let line = line.trim_end_matches(['\r', '\n']);

                    if let Some(comment) = line.strip_prefix('#') {
                        if let Some(id) = parse_newdoc(comment) {
                            if let Err(e) = block.finish_into(&mut doc) {
                                self.done = true;
                                return Some(Err(e));
                            }
                            if self.open {
                                // The current document ends here
                                self.next_id = id;
                                return Some(Ok(doc));
                            }
                            self.open = true;
                            doc.id = id;
                        } else if let Some(text) = parse_text_comment(comment) {
                            block.text = Some(text);
                        }
                        continue;
                    }

                    if line.trim().is_empty() {
                        // Blank line = sentence boundary
                        if let Err(e) = block.finish_into(&mut doc) {
                            self.done = true;
                            return Some(Err(e));
                        }
                        continue;
                    }

                    self.open = true;
                    block.lines.push((self.line_num, line.to_string()));
                }
            }
        }
    }
}

/// `# newdoc` or `# newdoc id = X`; returns `Some(id)` for newdoc lines
fn parse_newdoc(comment: &str) -> Option<Option<String>> {
    let comment = comment.trim();
    let rest = comment.strip_prefix(NEWDOC)?;
    let rest = rest.trim();
    if rest.is_empty() {
        return Some(None);
    }
    let value = rest.strip_prefix("id")?.trim().strip_prefix('=')?.trim();
    Some(Some(value.to_string()))
}

/// `# text = ...`; only the single space after `=` is dropped
fn parse_text_comment(comment: &str) -> Option<String> {
    let (key, value) = comment.split_once('=')?;
    if key.trim() != "text" {
        return None;
    }
    Some(unescape(value.strip_prefix(' ').unwrap_or(value)))
}

/// Parse accumulated token lines into a Sentence
fn parse_sentence(lines: Vec<(usize, String)>, text: Option<String>) -> Result<Sentence, ParseError> {
    let mut sentence = Sentence::with_text(text);

    for (line_num, line) in &lines {
        match parse_line(line, *line_num, sentence.len())? {
            Some(token) => {
                sentence.tokens.push(token);
            }
            // Multiword tokens and empty nodes carry no syntax
            None => continue,
        }
    }

    let count = sentence.len();
    for token in &sentence.tokens {
        if token.head >= count {
            return Err(ParseError::new(
                lines.first().map(|(n, _)| *n).unwrap_or(0),
                format!("HEAD of token {} points outside the sentence", token.id + 1),
            ));
        }
    }

    Ok(sentence)
}

/// Parse a single CoNLL-U line into a Token
/// Returns None for multiword tokens and empty nodes
fn parse_line(line: &str, line_num: usize, token_id: TokenId) -> Result<Option<Token>, ParseError> {
    let fields: Vec<&str> = line.split('\t').collect();

    if fields.len() != 10 {
        return Err(ParseError::new(
            line_num,
            format!("Expected 10 fields, found {}", fields.len()),
        ));
    }

    match parse_id(fields[0], line_num)? {
        FieldId::Range(_, _) | FieldId::Decimal(_, _) => return Ok(None),
        FieldId::Single(_) => {}
    }

    let form = parse_field(fields[1]);
    let lemma = parse_field(fields[2]);
    let upos = parse_field(fields[3]);
    let xpos = parse_field(fields[4]);
    let feats = if fields[5] == "_" {
        Features::new()
    } else {
        Features::parse(fields[5])
    };
    let head = parse_head(fields[6], line_num)?.unwrap_or(token_id);
    let deprel = parse_field(fields[7]);

    let mut token = Token::new(token_id, &form, &lemma, &upos, &xpos, &deprel)
        .with_head(head)
        .with_feats(feats);
    parse_misc(fields[9], &mut token);

    Ok(Some(token))
}

/// Parse ID field
fn parse_id(s: &str, line_num: usize) -> Result<FieldId, ParseError> {
    let number = |part: &str| {
        part.parse::<usize>()
            .map_err(|_| ParseError::new(line_num, format!("Invalid ID: {}", s)))
    };

    if let Some((start, end)) = s.split_once('-') {
        Ok(FieldId::Range(number(start)?, number(end)?))
    } else if let Some((main, sub)) = s.split_once('.') {
        Ok(FieldId::Decimal(number(main)?, number(sub)?))
    } else {
        Ok(FieldId::Single(number(s)?))
    }
}

/// Parse HEAD field; None for the root
fn parse_head(s: &str, line_num: usize) -> Result<Option<TokenId>, ParseError> {
    if s == "0" || s == "_" {
        return Ok(None);
    }
    let head: usize = s
        .parse()
        .map_err(|_| ParseError::new(line_num, format!("Invalid HEAD: {}", s)))?;
    // HEAD is 1-indexed in CoNLL-U
    Ok(head.checked_sub(1))
}

/// Pull entity type and spacing out of the MISC field
fn parse_misc(s: &str, token: &mut Token) {
    if s == "_" {
        return;
    }
    for pair in s.split('|') {
        match pair.split_once('=') {
            Some((ENT_TYPE, value)) => token.ent_type = value.to_string(),
            Some((SPACE_AFTER, "No")) => token.space_after = false,
            _ => {}
        }
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out
}

/// Inverse of [`escape`]; unknown sequences are kept as written
fn unescape(s: &str) -> String {
    if !s.contains('\\') {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('_') => out.push('_'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Column value for a text attribute
fn field(s: &str) -> String {
    match s {
        "" => "_".to_string(),
        "_" => "\\_".to_string(),
        _ => escape(s),
    }
}

fn parse_field(s: &str) -> String {
    if s == "_" { String::new() } else { unescape(s) }
}

/// Write one document, starting with its `# newdoc` line
pub fn write_document<W: Write>(out: &mut W, doc: &Document) -> io::Result<()> {
    match &doc.id {
        Some(id) => writeln!(out, "# {} id = {}", NEWDOC, id)?,
        None => writeln!(out, "# {}", NEWDOC)?,
    }

    for sentence in &doc.sentences {
        if let Some(text) = &sentence.sentence_text {
            writeln!(out, "# text = {}", escape(text))?;
        }
        for token in &sentence.tokens {
            let head = if token.is_root() { 0 } else { token.head + 1 };
            let feats = if token.feats.is_empty() {
                "_".to_string()
            } else {
                token.feats.to_string()
            };
            let mut misc = Vec::new();
            if !token.ent_type.is_empty() {
                misc.push(format!("{}={}", ENT_TYPE, token.ent_type));
            }
            if !token.space_after {
                misc.push(format!("{}=No", SPACE_AFTER));
            }
            let misc = if misc.is_empty() { "_".to_string() } else { misc.join("|") };

            writeln!(
                out,
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t_\t{}",
                token.id + 1,
                field(&token.form),
                field(&token.lemma),
                field(&token.upos),
                field(&token.xpos),
                feats,
                head,
                field(&token.deprel),
                misc,
            )?;
        }
        writeln!(out)?;
    }

    Ok(())
}

/// Parse a single-document CoNLL-U string (test helper)
#[cfg(test)]
pub(crate) fn doc_from_str(text: &str) -> Document {
    DocumentReader::from_string(text)
        .next()
        .expect("no document")
        .expect("invalid CoNLL-U")
}

/// Parse the first sentence of a CoNLL-U string (test helper)
#[cfg(test)]
pub(crate) fn sentence_from_str(text: &str) -> Sentence {
    doc_from_str(text).sentences.remove(0)
}

/// Build a sentence from compact rows (test helper)
///
/// Each row is `FORM LEMMA UPOS XPOS HEAD DEPREL [FEATS [MISC]]`, separated by
/// single spaces, with 1-based HEAD and `0` for the root.
#[cfg(test)]
pub(crate) fn sentence_from_rows(rows: &[&str]) -> Sentence {
    let mut conllu = String::new();
    for (i, row) in rows.iter().enumerate() {
        let cols: Vec<&str> = row.split(' ').collect();
        assert!(cols.len() >= 6, "short row: {}", row);
        let feats = cols.get(6).copied().unwrap_or("_");
        let misc = cols.get(7).copied().unwrap_or("_");
        conllu.push_str(&format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t_\t{}\n",
            i + 1,
            cols[0],
            cols[1],
            cols[2],
            cols[3],
            feats,
            cols[4],
            cols[5],
            misc
        ));
    }
    sentence_from_str(&conllu)
}
