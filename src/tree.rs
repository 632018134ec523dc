//! Annotated document structures
//!
//! Documents are produced by an external annotation pipeline (or read back
//! from the cache) and consumed read-only by the matcher. Heads are stored as
//! indices into the owning sentence, so a root token simply points at itself.

use std::fmt;

/// Position of a token within its sentence (0-based)
pub type TokenId = usize;

/// Morphological features, kept in the order the annotator produced them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Features(Vec<(String, String)>);

impl Features {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Insert or replace a feature value
    pub fn insert(&mut self, key: String, value: String) {
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// True if `key` is present with `value`
    pub fn has(&self, key: &str, value: &str) -> bool {
        self.get(key) == Some(value)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse `Key=Value|Key=Value`; entries without `=` are ignored
    pub fn parse(s: &str) -> Self {
        let mut feats = Self::new();
        for pair in s.split('|') {
            if let Some((key, value)) = pair.split_once('=') {
                feats.insert(key.to_string(), value.to_string());
            }
        }
        feats
    }
}

impl fmt::Display for Features {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("|")?;
            }
            write!(f, "{}={}", key, value)?;
        }
        Ok(())
    }
}

/// A single annotated token
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub id: TokenId,
    pub form: String,
    pub lemma: String,
    /// Coarse part of speech (UPOS)
    pub upos: String,
    /// Fine-grained tag (e.g. Penn `JJS`), empty if the annotator gave none
    pub xpos: String,
    pub feats: Features,
    /// Head index within the sentence; equal to `id` for the root
    pub head: TokenId,
    pub deprel: String,
    /// Entity type (e.g. `DATE`), empty if none
    pub ent_type: String,
    pub space_after: bool,
}

impl Token {
    /// Create a token with the core attributes; the token is its own head
    pub fn new(id: TokenId, form: &str, lemma: &str, upos: &str, xpos: &str, deprel: &str) -> Self {
        Self {
            id,
            form: form.to_string(),
            lemma: lemma.to_string(),
            upos: upos.to_string(),
            xpos: xpos.to_string(),
            feats: Features::new(),
            head: id,
            deprel: deprel.to_string(),
            ent_type: String::new(),
            space_after: true,
        }
    }

    pub fn with_head(mut self, head: TokenId) -> Self {
        self.head = head;
        self
    }

    pub fn with_feats(mut self, feats: Features) -> Self {
        self.feats = feats;
        self
    }

    pub fn with_ent_type(mut self, ent_type: &str) -> Self {
        self.ent_type = ent_type.to_string();
        self
    }

    pub fn lower(&self) -> String {
        self.form.to_lowercase()
    }

    pub fn lemma_lower(&self) -> String {
        self.lemma.to_lowercase()
    }

    pub fn is_root(&self) -> bool {
        self.head == self.id
    }
}

/// An ordered sequence of tokens
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sentence {
    pub tokens: Vec<Token>,
    /// Original sentence text, if the annotator or cache supplied it
    pub sentence_text: Option<String>,
}

impl Sentence {
    pub fn new() -> Self {
        Self {
            tokens: Vec::new(),
            sentence_text: None,
        }
    }

    pub fn with_text(text: Option<String>) -> Self {
        Self {
            tokens: Vec::new(),
            sentence_text: text,
        }
    }

    /// Append a token; its id is overwritten with its position, its head is kept
    pub fn push(&mut self, mut token: Token) -> TokenId {
        let id = self.tokens.len();
        token.id = id;
        self.tokens.push(token);
        id
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, id: TokenId) -> Option<&Token> {
        self.tokens.get(id)
    }

    /// Index of the head of `id`. Out-of-range heads resolve to the token itself.
    pub fn head_id(&self, id: TokenId) -> TokenId {
        let head = self.tokens[id].head;
        if head < self.tokens.len() { head } else { id }
    }

    pub fn head(&self, id: TokenId) -> &Token {
        &self.tokens[self.head_id(id)]
    }

    /// Sentence text: stored text if present, else rebuilt from the forms
    pub fn text(&self) -> String {
        if let Some(text) = &self.sentence_text {
            return text.clone();
        }
        let mut text = String::new();
        for (i, token) in self.tokens.iter().enumerate() {
            text.push_str(&token.form);
            if token.space_after && i + 1 < self.tokens.len() {
                text.push(' ');
            }
        }
        text
    }
}

/// One annotated input line
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub id: Option<String>,
    pub sentences: Vec<Sentence>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }
}
