//! Per-sentence structure matching
//!
//! A sentence is walked left to right. At each position the rules in
//! [`RULES`] are tried in order and the first one that fires wins; no other
//! rule sees that position. Rules that look ahead may consume the tokens they
//! looked at, which are then skipped by the cursor.
//!
//! Tag values follow spaCy's English models (Penn Treebank fine tags, UD
//! coarse tags, ClearNLP dependency labels).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::projection::{TokenRecord, project};
use crate::tree::{Sentence, Token, TokenId};

/// Entity type of time expressions
pub const DATE: &str = "DATE";

/// Fixed vocabulary of structure labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Structure {
    #[serde(rename = "L1_possessive_marking")]
    PossessiveMarking,
    #[serde(rename = "L1_superlative_definite_article_omission")]
    SuperlativeArticleOmission,
    #[serde(rename = "L2_superlative_form")]
    SuperlativeForm,
    #[serde(rename = "L2_comparative_form")]
    ComparativeForm,
    #[serde(rename = "L2_comparative_more")]
    ComparativeMore,
    #[serde(rename = "L2_superlative_most")]
    SuperlativeMost,
    #[serde(rename = "L1_L2_1st_person_prodrop")]
    FirstPersonProdrop,
    #[serde(rename = "L1_L2_copula_omission")]
    CopulaOmission,
    #[serde(rename = "L1_L2_indefinite_article_omission")]
    IndefiniteArticleOmission,
    #[serde(rename = "no_interference_verb_time_expression_past")]
    VerbTimeExpressionPast,
    #[serde(rename = "no_interference_verb_time_expression_future")]
    VerbTimeExpressionFuture,
    #[serde(rename = "no_interference_quantifier_noun_plural_agreement")]
    QuantifierNounPluralAgreement,
}

impl Structure {
    pub const ALL: [Structure; 12] = [
        Structure::PossessiveMarking,
        Structure::SuperlativeArticleOmission,
        Structure::SuperlativeForm,
        Structure::ComparativeForm,
        Structure::ComparativeMore,
        Structure::SuperlativeMost,
        Structure::FirstPersonProdrop,
        Structure::CopulaOmission,
        Structure::IndefiniteArticleOmission,
        Structure::VerbTimeExpressionPast,
        Structure::VerbTimeExpressionFuture,
        Structure::QuantifierNounPluralAgreement,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Structure::PossessiveMarking => "L1_possessive_marking",
            Structure::SuperlativeArticleOmission => "L1_superlative_definite_article_omission",
            Structure::SuperlativeForm => "L2_superlative_form",
            Structure::ComparativeForm => "L2_comparative_form",
            Structure::ComparativeMore => "L2_comparative_more",
            Structure::SuperlativeMost => "L2_superlative_most",
            Structure::FirstPersonProdrop => "L1_L2_1st_person_prodrop",
            Structure::CopulaOmission => "L1_L2_copula_omission",
            Structure::IndefiniteArticleOmission => "L1_L2_indefinite_article_omission",
            Structure::VerbTimeExpressionPast => "no_interference_verb_time_expression_past",
            Structure::VerbTimeExpressionFuture => "no_interference_verb_time_expression_future",
            Structure::QuantifierNounPluralAgreement => {
                "no_interference_quantifier_noun_plural_agreement"
            }
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.label() == label)
    }
}

impl fmt::Display for Structure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One detected structure
#[derive(Debug, Clone, PartialEq)]
pub struct StructureMatch {
    /// Stem of the source file
    pub fname: String,
    pub sentence: String,
    pub structure: Structure,
    /// Triggering tokens first, then context tokens
    pub data: Vec<TokenRecord>,
}

/// Result of scanning one sentence
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SentenceScan {
    pub matches: Vec<StructureMatch>,
    /// Always 1; summed by callers
    pub sentences: usize,
}

/// What a rule sees at one position
pub struct Cursor<'a> {
    pub sentence: &'a Sentence,
    pub pos: TokenId,
    /// DATE tokens seen so far in this sentence, including the current one
    pub dates: &'a [TokenId],
    pub past_reported: bool,
    pub future_reported: bool,
}

impl<'a> Cursor<'a> {
    pub fn token(&self) -> &'a Token {
        &self.sentence.tokens[self.pos]
    }

    pub fn head_id(&self) -> TokenId {
        self.sentence.head_id(self.pos)
    }

    pub fn head(&self) -> &'a Token {
        self.sentence.head(self.pos)
    }

    /// Token `offset` positions to the right, if the sentence has one
    pub fn nbor(&self, offset: usize) -> Option<&'a Token> {
        self.sentence.get(self.pos + offset)
    }
}

/// A fired rule: which structures, over which tokens
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub structures: &'static [Structure],
    pub tokens: Vec<TokenId>,
    /// Lookahead tokens the cursor skips afterwards
    pub consumed: usize,
}

impl Hit {
    fn new(structures: &'static [Structure], tokens: Vec<TokenId>) -> Self {
        Self {
            structures,
            tokens,
            consumed: 0,
        }
    }

    fn consuming(mut self, consumed: usize) -> Self {
        self.consumed = consumed;
        self
    }
}

/// A named predicate over a cursor position
pub struct Rule {
    pub name: &'static str,
    check: fn(&Cursor) -> Option<Hit>,
}

impl Rule {
    pub fn check(&self, cursor: &Cursor) -> Option<Hit> {
        (self.check)(cursor)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Rule").field(&self.name).finish()
    }
}

const SUPERLATIVE: &[Structure] = &[
    Structure::SuperlativeArticleOmission,
    Structure::SuperlativeForm,
];

const QUANTIFIER_DEPS: [&str; 4] = ["nummod", "num", "number", "quantmod"];

/// Rules in priority order
pub static RULES: [Rule; 12] = [
    Rule {
        name: "possessive_marking",
        check: possessive_marking,
    },
    Rule {
        name: "the_superlative",
        check: the_superlative,
    },
    Rule {
        name: "the_adverb_superlative",
        check: the_adverb_superlative,
    },
    Rule {
        name: "comparative_form",
        check: comparative_form,
    },
    Rule {
        name: "comparative_more",
        check: comparative_more,
    },
    Rule {
        name: "superlative_most",
        check: superlative_most,
    },
    Rule {
        name: "first_person_prodrop",
        check: first_person_prodrop,
    },
    Rule {
        name: "copula_omission",
        check: copula_omission,
    },
    Rule {
        name: "indefinite_article",
        check: indefinite_article,
    },
    Rule {
        name: "verb_time_expression_past",
        check: verb_time_expression_past,
    },
    Rule {
        name: "verb_time_expression_future",
        check: verb_time_expression_future,
    },
    Rule {
        name: "quantifier_noun_plural",
        check: quantifier_noun_plural,
    },
];

fn possessive_marking(c: &Cursor) -> Option<Hit> {
    (c.token().form == "'s" && c.head().deprel == "poss")
        .then(|| Hit::new(&[Structure::PossessiveMarking], vec![c.head_id(), c.pos]))
}

fn the_superlative(c: &Cursor) -> Option<Hit> {
    let next = c.nbor(1)?;
    (c.token().lower() == "the" && next.xpos == "JJS")
        .then(|| Hit::new(SUPERLATIVE, vec![c.pos, c.pos + 1]).consuming(1))
}

fn the_adverb_superlative(c: &Cursor) -> Option<Hit> {
    let (adverb, adjective) = (c.nbor(1)?, c.nbor(2)?);
    (c.token().lower() == "the" && adverb.upos == "ADV" && adjective.xpos == "JJS")
        .then(|| Hit::new(SUPERLATIVE, vec![c.pos, c.pos + 1, c.pos + 2]).consuming(2))
}

fn comparative_form(c: &Cursor) -> Option<Hit> {
    let token = c.token();
    (token.xpos == "JJR" && token.lemma_lower() != "more")
        .then(|| Hit::new(&[Structure::ComparativeForm], vec![c.pos]))
}

fn comparative_more(c: &Cursor) -> Option<Hit> {
    (c.token().lemma_lower() == "more" && c.head().xpos == "JJ")
        .then(|| Hit::new(&[Structure::ComparativeMore], vec![c.pos, c.head_id()]))
}

fn superlative_most(c: &Cursor) -> Option<Hit> {
    let (most, adjective) = (c.nbor(1)?, c.nbor(2)?);
    (c.token().lower() == "the" && most.lower() == "most" && adjective.upos == "ADJ").then(|| {
        Hit::new(
            &[Structure::SuperlativeMost],
            vec![c.pos, c.pos + 1, c.pos + 2],
        )
        .consuming(2)
    })
}

fn first_person_prodrop(c: &Cursor) -> Option<Hit> {
    let lemma = c.token().lemma_lower();
    ((lemma == "i" || lemma == "we") && c.head().upos == "VERB")
        .then(|| Hit::new(&[Structure::FirstPersonProdrop], vec![c.pos, c.head_id()]))
}

fn copula_omission(c: &Cursor) -> Option<Hit> {
    let token = c.token();
    (token.upos == "ADJ" && token.deprel == "acomp" && c.head().lemma == "be")
        .then(|| Hit::new(&[Structure::CopulaOmission], vec![c.pos, c.head_id()]))
}

fn indefinite_article(c: &Cursor) -> Option<Hit> {
    let token = c.token();
    ((token.lemma == "a" || token.lemma == "an") && token.upos == "DET" && token.deprel == "det")
        .then(|| Hit::new(&[Structure::IndefiniteArticleOmission], vec![c.pos]))
}

fn verb_time_expression_past(c: &Cursor) -> Option<Hit> {
    let token = c.token();
    let fires = token.upos == "VERB"
        && token.feats.has("Tense", "Past")
        && !c.dates.is_empty()
        && !c.past_reported;
    fires.then(|| {
        let mut tokens = vec![c.pos];
        tokens.extend_from_slice(c.dates);
        Hit::new(&[Structure::VerbTimeExpressionPast], tokens)
    })
}

fn verb_time_expression_future(c: &Cursor) -> Option<Hit> {
    let token = c.token();
    let lemma = token.lemma_lower();
    let fires = (lemma == "will" || lemma == "shall")
        && token.deprel == "aux"
        && c.head().xpos == "VB"
        && !c.dates.is_empty()
        && !c.future_reported;
    fires.then(|| {
        let mut tokens = vec![c.pos, c.head_id()];
        tokens.extend_from_slice(c.dates);
        Hit::new(&[Structure::VerbTimeExpressionFuture], tokens)
    })
}

fn quantifier_noun_plural(c: &Cursor) -> Option<Hit> {
    let head = c.head();
    let fires = QUANTIFIER_DEPS.contains(&c.token().deprel.as_str())
        && head.upos == "NOUN"
        && head.xpos == "NNS";
    fires.then(|| {
        Hit::new(
            &[Structure::QuantifierNounPluralAgreement],
            vec![c.head_id(), c.pos],
        )
    })
}

/// Scan one sentence for structures
///
/// With `academic` set, everything between `(` and the next `)` is ignored,
/// so dates in citations are not picked up as time expressions. If no `)`
/// follows, the rest of the sentence is ignored.
pub fn scan_sentence(sentence: &Sentence, fname: &str, academic: bool) -> SentenceScan {
    let mut matches = Vec::new();
    let mut dates: Vec<TokenId> = Vec::new();
    let mut past_reported = false;
    let mut future_reported = false;
    let mut text: Option<String> = None;

    let mut pos = 0;
    while pos < sentence.len() {
        if academic && sentence.tokens[pos].form == "(" {
            match sentence.tokens[pos..].iter().position(|t| t.form == ")") {
                Some(offset) => pos += offset,
                None => break,
            }
        }

        if sentence.tokens[pos].ent_type == DATE {
            dates.push(pos);
        }

        let cursor = Cursor {
            sentence,
            pos,
            dates: &dates,
            past_reported,
            future_reported,
        };

        if let Some(hit) = RULES.iter().find_map(|rule| rule.check(&cursor)) {
            let data = project(sentence, &hit.tokens);
            let text = text.get_or_insert_with(|| sentence.text());
            for &structure in hit.structures {
                match structure {
                    Structure::VerbTimeExpressionPast => past_reported = true,
                    Structure::VerbTimeExpressionFuture => future_reported = true,
                    _ => {}
                }
                matches.push(StructureMatch {
                    fname: fname.to_string(),
                    sentence: text.clone(),
                    structure,
                    data: data.clone(),
                });
            }
            pos += hit.consumed;
        }

        pos += 1;
    }

    SentenceScan {
        matches,
        sentences: 1,
    }
}
