//! Token attribute projection
//!
//! Flattens tokens into plain string records for the `data` column of the
//! output. One record per requested token, in the order requested.

use serde::{Deserialize, Serialize};

use crate::tree::{Sentence, TokenId};

/// Selected attributes of a token, all as strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub pos: String,
    pub text: String,
    pub lemma: String,
    pub dep: String,
    pub tag: String,
    /// Text of the head token
    pub head: String,
    pub morph: String,
    pub enttype: String,
}

impl TokenRecord {
    /// Project a single token; an id outside the sentence yields empty values
    pub fn from_token(sentence: &Sentence, id: TokenId) -> Self {
        let Some(token) = sentence.get(id) else {
            return Self::empty();
        };
        Self {
            pos: token.upos.clone(),
            text: token.form.clone(),
            lemma: token.lemma.clone(),
            dep: token.deprel.clone(),
            tag: token.xpos.clone(),
            head: sentence.head(id).form.clone(),
            morph: token.feats.to_string(),
            enttype: token.ent_type.clone(),
        }
    }

    fn empty() -> Self {
        Self {
            pos: String::new(),
            text: String::new(),
            lemma: String::new(),
            dep: String::new(),
            tag: String::new(),
            head: String::new(),
            morph: String::new(),
            enttype: String::new(),
        }
    }
}

/// Project `ids` (duplicates allowed) into records
pub fn project(sentence: &Sentence, ids: &[TokenId]) -> Vec<TokenRecord> {
    ids.iter()
        .map(|&id| TokenRecord::from_token(sentence, id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conllu::sentence_from_str;

    fn sentence() -> Sentence {
        sentence_from_str(
            "1\tJohn\tJohn\tPROPN\tNNP\tNumber=Sing\t3\tposs\t_\tEntType=PERSON
2\t's\t's\tPART\tPOS\t_\t1\tcase\t_\t_
3\tcar\tcar\tNOUN\t_\tNumber=Sing\t0\tROOT\t_\t_
",
        )
    }

    #[test]
    fn test_project_attributes() {
        let sentence = sentence();
        let records = project(&sentence, &[0]);

        assert_eq!(records.len(), 1);
        let john = &records[0];
        assert_eq!(john.pos, "PROPN");
        assert_eq!(john.text, "John");
        assert_eq!(john.lemma, "John");
        assert_eq!(john.dep, "poss");
        assert_eq!(john.tag, "NNP");
        assert_eq!(john.head, "car");
        assert_eq!(john.morph, "Number=Sing");
        assert_eq!(john.enttype, "PERSON");
    }

    #[test]
    fn test_missing_attributes_are_empty() {
        let sentence = sentence();
        let car = &project(&sentence, &[2])[0];
        assert_eq!(car.tag, "");
        assert_eq!(car.enttype, "");
        // Root is its own head
        assert_eq!(car.head, "car");

        let particle = &project(&sentence, &[1])[0];
        assert_eq!(particle.morph, "");
    }

    #[test]
    fn test_order_and_duplicates_preserved() {
        let sentence = sentence();
        let records = project(&sentence, &[2, 0, 2]);
        let texts: Vec<&str> = records.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["car", "John", "car"]);
        assert!(project(&sentence, &[]).is_empty());
    }

    #[test]
    fn test_serialized_keys() {
        let sentence = sentence();
        let json = serde_json::to_string(&project(&sentence, &[1])).unwrap();
        assert_eq!(
            json,
            r#"[{"pos":"PART","text":"'s","lemma":"'s","dep":"case","tag":"POS","head":"John","morph":"","enttype":""}]"#
        );
    }
}
