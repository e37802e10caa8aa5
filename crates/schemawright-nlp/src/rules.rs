//! Relationship phrase rules
//!
//! Rules are evaluated in table order at each word position, so a longer
//! phrase must come before any phrase that is its prefix.

use crate::tokenizer::Sentence;
use schemawright_core::RelationshipType;

/// Which side of the phrase becomes the relationship's `from`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// "Users have many Orders": from = Users, to = Orders
    SubjectToObject,

    /// "Orders are placed by Users": from = Users, to = Orders
    ObjectToSubject,
}

/// One phrase and the relationship it implies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationshipRule {
    /// Lowercase words that must appear consecutively
    pub phrase: &'static [&'static str],

    /// Cardinality assigned on match
    pub relationship_type: RelationshipType,

    /// Which side is `from`
    pub direction: Direction,

    /// Verb used in the relationship name
    pub verb: &'static str,

    /// Non-entity words after the phrase are attributes of the subject
    pub introduces_attributes: bool,
}

const fn rule(
    phrase: &'static [&'static str],
    relationship_type: RelationshipType,
    direction: Direction,
    verb: &'static str,
    introduces_attributes: bool,
) -> RelationshipRule {
    RelationshipRule {
        phrase,
        relationship_type,
        direction,
        verb,
        introduces_attributes,
    }
}

use Direction::{ObjectToSubject, SubjectToObject};
use RelationshipType::{ManyToMany, ManyToOne, OneToMany, OneToOne};

/// Ordered phrase table
pub const RULES: &[RelationshipRule] = &[
    rule(&["has", "a", "many", "to", "many"], ManyToMany, SubjectToObject, "associated_with", false),
    rule(&["have", "a", "many", "to", "many"], ManyToMany, SubjectToObject, "associated_with", false),
    rule(&["many", "to", "many"], ManyToMany, SubjectToObject, "associated_with", false),
    rule(&["can", "have", "many"], OneToMany, SubjectToObject, "has_many", false),
    rule(&["can", "have", "multiple"], OneToMany, SubjectToObject, "has_many", false),
    rule(&["has", "many"], OneToMany, SubjectToObject, "has_many", false),
    rule(&["have", "many"], OneToMany, SubjectToObject, "has_many", false),
    rule(&["has", "multiple"], OneToMany, SubjectToObject, "has_many", false),
    rule(&["have", "multiple"], OneToMany, SubjectToObject, "has_many", false),
    rule(&["has", "several"], OneToMany, SubjectToObject, "has_many", false),
    rule(&["have", "several"], OneToMany, SubjectToObject, "has_many", false),
    rule(&["has", "exactly", "one"], OneToOne, SubjectToObject, "has_one", false),
    rule(&["has", "one"], OneToOne, SubjectToObject, "has_one", false),
    rule(&["have", "one"], OneToOne, SubjectToObject, "has_one", false),
    rule(&["has", "a"], OneToOne, SubjectToObject, "has_one", true),
    rule(&["has", "an"], OneToOne, SubjectToObject, "has_one", true),
    rule(&["have", "a"], OneToOne, SubjectToObject, "has_one", true),
    rule(&["have", "an"], OneToOne, SubjectToObject, "has_one", true),
    rule(&["belongs", "to"], ManyToOne, SubjectToObject, "belongs_to", false),
    rule(&["belong", "to"], ManyToOne, SubjectToObject, "belongs_to", false),
    rule(&["part", "of"], ManyToOne, SubjectToObject, "belongs_to", false),
    rule(&["associated", "with"], ManyToMany, SubjectToObject, "associated_with", false),
    rule(&["linked", "to"], ManyToMany, SubjectToObject, "associated_with", false),
    rule(&["linked", "with"], ManyToMany, SubjectToObject, "associated_with", false),
    rule(&["connected", "to"], ManyToMany, SubjectToObject, "associated_with", false),
    rule(&["related", "to"], ManyToMany, SubjectToObject, "associated_with", false),
    rule(&["placed", "by"], OneToMany, ObjectToSubject, "has_many", false),
    rule(&["created", "by"], OneToMany, ObjectToSubject, "has_many", false),
    rule(&["owned", "by"], OneToMany, ObjectToSubject, "has_many", false),
    rule(&["written", "by"], OneToMany, ObjectToSubject, "has_many", false),
    rule(&["authored", "by"], OneToMany, ObjectToSubject, "has_many", false),
    rule(&["contains"], OneToMany, SubjectToObject, "contains", false),
    rule(&["contain"], OneToMany, SubjectToObject, "contains", false),
    rule(&["includes"], OneToMany, SubjectToObject, "contains", false),
    rule(&["include"], OneToMany, SubjectToObject, "contains", false),
    rule(&["has"], OneToMany, SubjectToObject, "has", true),
    rule(&["have"], OneToMany, SubjectToObject, "has", true),
];

impl RelationshipRule {
    /// Whether the phrase matches the sentence's consecutive words at `start`
    pub fn matches_at(&self, sentence: &Sentence, start: usize) -> bool {
        self.phrase
            .iter()
            .enumerate()
            .all(|(offset, expected)| sentence.lower_at(start + offset) == Some(*expected))
    }
}

/// First rule (in table order) matching at `start`
pub fn match_at(sentence: &Sentence, start: usize) -> Option<&'static RelationshipRule> {
    RULES.iter().find(|rule| rule.matches_at(sentence, start))
}

/// A rule match inside a sentence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleMatch {
    /// First token of the phrase
    pub start: usize,

    /// One past the last token of the phrase
    pub end: usize,

    pub rule: &'static RelationshipRule,
}

impl RuleMatch {
    /// Whether token `index` is part of the matched phrase
    pub fn covers(&self, index: usize) -> bool {
        (self.start..self.end).contains(&index)
    }
}

/// All non-overlapping rule matches, left to right
pub fn find_matches(sentence: &Sentence) -> Vec<RuleMatch> {
    let mut matches = Vec::new();
    let mut index = 0;

    while index < sentence.len() {
        match match_at(sentence, index) {
            Some(rule) => {
                let end = index + rule.phrase.len();
                matches.push(RuleMatch { start: index, end, rule });
                index = end;
            }
            None => index += 1,
        }
    }

    matches
}
