//! Entity and relationship extraction
//!
//! Entities come from capitalized nouns and from table/collection cues
//! ("a products table", "collection named reviews"). Relationships come from
//! the phrase rule table: the subject precedes the phrase, the objects follow it.

use crate::rules::{find_matches, Direction, RuleMatch};
use crate::tokenizer::{tokenize, Sentence, Separator, Token};
use regex::Regex;
use schemawright_core::naming::{entity_name, to_snake_case};
use schemawright_core::{Entity, Relationship, RelationshipType};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::OnceLock;

/// Capitalized words that never name an entity
const STOPWORDS: &[&str] = &[
    "the", "a", "an", "each", "every", "all", "any", "some", "our", "we", "they", "it", "its",
    "this", "that", "these", "those", "there", "when", "if", "but", "also", "in", "for",
    "on", "at", "from", "to", "of", "by", "with", "as", "i", "you", "system", "application",
    "app", "database", "table", "tables", "collection", "collections", "entity", "entities",
    "model", "models", "data", "please", "should", "must", "can", "will", "may", "need",
    "needs", "store", "stores", "track", "tracks", "which", "who", "where", "then", "is",
    "are", "be", "one", "many", "multiple", "name",
];

/// Words skipped inside attribute lists
const FILLERS: &[&str] = &[
    "a", "an", "the", "their", "its", "his", "her", "field", "fields", "attribute",
    "attributes", "column", "columns", "property", "properties", "like", "such", "as",
    "including", "also", "with", "plus", "following", "some", "optional", "each", "every",
];

/// Adjectives captured by the table cue regex that are not table names
const CUE_ADJECTIVES: &[&str] = &[
    "separate", "new", "main", "single", "junction", "join", "lookup", "reference", "same",
    "different", "another", "base", "master", "pivot",
];

/// Result of parsing requirement text
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParsedRequirements {
    pub entities: Vec<Entity>,
    pub relationships: Vec<Relationship>,
}

/// Requirement parser facade
pub struct RequirementParser;

impl RequirementParser {
    /// Extract entities and relationships in one pass over the text
    pub fn parse(text: &str) -> ParsedRequirements {
        let entities = extract_entities(text);
        let relationships = extract_relationships(text, &entities);

        tracing::debug!(
            entities = entities.len(),
            relationships = relationships.len(),
            "parsed requirements"
        );

        ParsedRequirements {
            entities,
            relationships,
        }
    }
}

/// An entity mentioned at a token range of a sentence
#[derive(Debug, Clone, PartialEq, Eq)]
struct Mention {
    start: usize,
    end: usize,
    entity: String,
}

/// Identifiers are ASCII, so words that would lose letters in snake_case are skipped
fn is_candidate_word(text: &str, lower: &str) -> bool {
    let all_upper = text.chars().all(|c| c.is_ascii_uppercase());
    text.chars().all(|c| c.is_ascii_alphabetic())
        && text.len() >= 2
        && !(all_upper && text.len() <= 4)
        && !STOPWORDS.contains(&lower)
}

fn in_phrase(matches: &[RuleMatch], index: usize) -> bool {
    matches.iter().any(|m| m.covers(index))
}

/// Runs of capitalized candidate words ("Order Items" is one mention)
fn capitalized_mentions(sentence: &Sentence) -> Vec<Mention> {
    let matches = find_matches(sentence);
    let mut mentions = Vec::new();
    let mut index = 0;

    while index < sentence.len() {
        let mut end = index;
        let mut words = Vec::new();

        while let Some(word) = sentence.tokens.get(end).and_then(Token::as_word) {
            if !word.capitalized
                || !is_candidate_word(&word.text, &word.lower)
                || in_phrase(&matches, end)
            {
                break;
            }
            words.push(word.text.as_str());
            end += 1;
        }

        if words.is_empty() {
            index += 1;
        } else {
            mentions.push(Mention {
                start: index,
                end,
                entity: entity_name(&words.join(" ")),
            });
            index = end;
        }
    }

    mentions
}

/// Mentions of already-known entities, case-insensitive
fn known_mentions(sentence: &Sentence, known: &HashSet<String>) -> Vec<Mention> {
    let matches = find_matches(sentence);
    let mut mentions = Vec::new();
    let mut index = 0;

    let candidate = |i: usize| {
        sentence
            .tokens
            .get(i)
            .and_then(Token::as_word)
            .filter(|w| w.is_alphabetic() && !STOPWORDS.contains(&w.lower.as_str()))
            .filter(|_| !in_phrase(&matches, i))
    };

    while index < sentence.len() {
        let Some(first) = candidate(index) else {
            index += 1;
            continue;
        };

        if let Some(second) = candidate(index + 1) {
            let joined = entity_name(&format!("{} {}", first.text, second.text));
            if known.contains(&joined) {
                mentions.push(Mention {
                    start: index,
                    end: index + 2,
                    entity: joined,
                });
                index += 2;
                continue;
            }
        }

        let single = entity_name(&first.text);
        if known.contains(&single) {
            mentions.push(Mention {
                start: index,
                end: index + 1,
                entity: single,
            });
        }
        index += 1;
    }

    mentions
}

fn named_cue_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)\b(?:table|collection|entity|model)\s+(?:called|named)\s+["'`]?([a-z][a-z0-9_]*)"#)
            .expect("valid regex")
    })
}

fn suffixed_cue_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(?:a|an|the)\s+([a-z][a-z0-9_]*)\s+(?:table|collection)\b")
            .expect("valid regex")
    })
}

/// Entity names announced with table/collection keywords, in text order
fn cue_entities(text: &str) -> Vec<String> {
    let mut found: Vec<(usize, String)> = Vec::new();

    for re in [named_cue_regex(), suffixed_cue_regex()] {
        for caps in re.captures_iter(text) {
            let Some(capture) = caps.get(1) else {
                continue;
            };
            let raw = capture.as_str().to_lowercase();
            if CUE_ADJECTIVES.contains(&raw.as_str()) || STOPWORDS.contains(&raw.as_str()) {
                tracing::debug!(word = %raw, "dropping table cue adjective");
                continue;
            }
            found.push((capture.start(), entity_name(&raw)));
        }
    }

    found.sort_by_key(|(position, _)| *position);
    found.into_iter().map(|(_, name)| name).collect()
}

fn flush_attribute(current: &mut Vec<&str>, attributes: &mut Vec<String>) {
    if !current.is_empty() && current.len() <= 3 {
        let name = to_snake_case(&current.join(" "));
        if !name.is_empty() && name != "id" {
            attributes.push(name);
        }
    } else if !current.is_empty() {
        tracing::debug!(fragment = %current.join(" "), "dropping long attribute fragment");
    }
    current.clear();
}

/// Read a comma/and separated list of attribute names starting at `start`
fn collect_attribute_list(
    sentence: &Sentence,
    start: usize,
    mentions: &[Mention],
    matches: &[RuleMatch],
) -> Vec<String> {
    let mut attributes = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for index in start..sentence.len() {
        if mentions.iter().any(|m| m.start == index) || matches.iter().any(|m| m.start == index) {
            break;
        }

        match &sentence.tokens[index] {
            Token::Separator(Separator::Comma | Separator::And | Separator::Or) => {
                flush_attribute(&mut current, &mut attributes)
            }
            Token::Separator(Separator::CloseParen) => break,
            Token::Separator(_) => flush_attribute(&mut current, &mut attributes),
            Token::Word(word) => {
                if !FILLERS.contains(&word.lower.as_str()) {
                    current.push(word.lower.as_str());
                }
            }
        }
    }
    flush_attribute(&mut current, &mut attributes);

    attributes
}

/// Attributes introduced right after an entity mention
fn attributes_after(
    sentence: &Sentence,
    mention: &Mention,
    mentions: &[Mention],
    matches: &[RuleMatch],
) -> Vec<String> {
    let pos = mention.end;
    let Some(token) = sentence.tokens.get(pos) else {
        return Vec::new();
    };

    // "User: name, email" / "User (name, email)" / "User with name and email"
    if token.is_separator(Separator::Colon) || token.is_separator(Separator::OpenParen) {
        return collect_attribute_list(sentence, pos + 1, mentions, matches);
    }
    if sentence.lower_at(pos) == Some("with") {
        return collect_attribute_list(sentence, pos + 1, mentions, matches);
    }

    // "User has a name and an email", unless the object is an entity
    if let Some(m) = matches.iter().find(|m| m.start == pos) {
        if m.rule.introduces_attributes && !mentions.iter().any(|x| x.start == m.end) {
            return collect_attribute_list(sentence, m.end, mentions, matches);
        }
    }

    // "User has the following fields: name, email"
    const LEAD_IN: &[&str] = &[
        "has", "have", "with", "the", "following", "fields", "attributes", "columns", "properties",
    ];
    let mut index = pos;
    while index < sentence.len() && index < pos + 5 {
        if sentence.tokens[index].is_separator(Separator::Colon) {
            return collect_attribute_list(sentence, index + 1, mentions, matches);
        }
        match sentence.lower_at(index) {
            Some(word) if LEAD_IN.contains(&word) => index += 1,
            _ => break,
        }
    }

    Vec::new()
}

/// Extract entities from requirement text
///
/// Duplicate names collapse to one entity; attributes from every mention are merged.
pub fn extract_entities(text: &str) -> Vec<Entity> {
    let sentences = tokenize(text);
    let mut names: Vec<String> = Vec::new();

    let capitalized = sentences.iter().flat_map(capitalized_mentions).map(|m| m.entity);
    for name in capitalized.chain(cue_entities(text)) {
        if !names.contains(&name) {
            names.push(name);
        }
    }

    let known: HashSet<String> = names.iter().cloned().collect();
    let table_names: HashSet<String> = names.iter().map(|n| to_snake_case(n)).collect();
    let mut entities: Vec<Entity> = names.iter().map(Entity::new).collect();

    for sentence in &sentences {
        let mentions = known_mentions(sentence, &known);
        let matches = find_matches(sentence);

        for mention in &mentions {
            let attributes = attributes_after(sentence, mention, &mentions, &matches);
            let Some(entity) = entities.iter_mut().find(|e| e.name == mention.entity) else {
                continue;
            };
            for attribute in attributes {
                let singular = to_snake_case(&entity_name(&attribute));
                if table_names.contains(&singular) {
                    tracing::debug!(attribute = %attribute, "attribute names an entity, skipping");
                    continue;
                }
                entity.add_attribute(attribute);
            }
        }
    }

    entities
}

/// Subject and objects resolved for one rule match
struct Clause<'a> {
    rule_match: &'a RuleMatch,
    subject: Option<String>,
    objects: Vec<String>,
    /// Mentions between the previous phrase and this one
    leading: Vec<String>,
}

/// Extract relationships between known entities
///
/// Mentions between two phrases are shared: the last one is the next
/// phrase's subject, the rest are the previous phrase's objects. A single
/// mention between phrases plays both roles ("Users have many Orders which
/// have many Items").
pub fn extract_relationships(text: &str, entities: &[Entity]) -> Vec<Relationship> {
    let known: HashSet<String> = entities.iter().map(|e| entity_name(&e.name)).collect();
    let mut relationships: Vec<Relationship> = Vec::new();

    for sentence in tokenize(text) {
        let mentions = known_mentions(&sentence, &known);
        let matches = find_matches(&sentence);
        if matches.is_empty() {
            continue;
        }

        let mut clauses: Vec<Clause> = matches
            .iter()
            .map(|m| Clause {
                rule_match: m,
                subject: None,
                objects: Vec::new(),
                leading: Vec::new(),
            })
            .collect();

        for k in 0..clauses.len() {
            let region_start = if k == 0 { 0 } else { matches[k - 1].end };
            let region: Vec<&Mention> = mentions
                .iter()
                .filter(|m| m.start >= region_start && m.end <= matches[k].start)
                .collect();

            if k > 0 {
                let shared = match region.len() {
                    0 => Vec::new(),
                    1 => vec![region[0].entity.clone()],
                    n => region[..n - 1].iter().map(|m| m.entity.clone()).collect(),
                };
                clauses[k - 1].objects = shared;
            }

            clauses[k].leading = region.iter().map(|m| m.entity.clone()).collect();
            clauses[k].subject = match region.last() {
                Some(m) => Some(m.entity.clone()),
                None if k > 0 => clauses[k - 1].subject.clone(),
                None => None,
            };
        }

        if let Some(last) = clauses.last_mut() {
            let end = last.rule_match.end;
            last.objects = mentions
                .iter()
                .filter(|m| m.start >= end)
                .map(|m| m.entity.clone())
                .collect();
        }

        for mut clause in clauses {
            let rule = clause.rule_match.rule;

            // "Students and Courses have a many to many relationship"
            if clause.objects.is_empty()
                && rule.relationship_type == RelationshipType::ManyToMany
                && clause.leading.len() >= 2
            {
                clause.subject = Some(clause.leading[0].clone());
                clause.objects = clause.leading[1..].to_vec();
            }

            let Some(subject) = clause.subject else {
                tracing::debug!(phrase = ?rule.phrase, "phrase without subject, skipping");
                continue;
            };
            if clause.objects.is_empty() {
                tracing::debug!(phrase = ?rule.phrase, "phrase without entity object, skipping");
                continue;
            }

            for object in clause.objects {
                let (from, to) = match rule.direction {
                    Direction::SubjectToObject => (subject.clone(), object),
                    Direction::ObjectToSubject => (object, subject.clone()),
                };
                let name = format!("{}_{}_{}", to_snake_case(&from), rule.verb, to_snake_case(&to));
                push_relationship(
                    &mut relationships,
                    Relationship::new(from, to, rule.relationship_type, name),
                );
            }
        }
    }

    relationships
}

/// Add a relationship unless it (or its converse) is already present
///
/// A one-to-many replaces a stored converse many-to-one, so "has many"
/// wins regardless of sentence order.
fn push_relationship(relationships: &mut Vec<Relationship>, candidate: Relationship) {
    let weaker_converse = relationships.iter().position(|r| {
        r.from == candidate.to
            && r.to == candidate.from
            && r.relationship_type == RelationshipType::ManyToOne
            && candidate.relationship_type == RelationshipType::OneToMany
    });
    if let Some(position) = weaker_converse {
        tracing::debug!(name = %candidate.name, "one-to-many replaces converse many-to-one");
        relationships[position] = candidate;
        return;
    }

    let duplicate = relationships.iter().any(|r| {
        let same = r.from == candidate.from
            && r.to == candidate.to
            && r.relationship_type == candidate.relationship_type;
        let converse = r.from == candidate.to
            && r.to == candidate.from
            && matches!(
                (r.relationship_type, candidate.relationship_type),
                (RelationshipType::OneToMany, RelationshipType::ManyToOne)
                    | (RelationshipType::ManyToOne, RelationshipType::OneToMany)
                    | (RelationshipType::ManyToMany, RelationshipType::ManyToMany)
                    | (RelationshipType::OneToOne, RelationshipType::OneToOne)
            );
        same || converse
    });

    if duplicate {
        tracing::debug!(name = %candidate.name, "duplicate relationship collapsed");
    } else {
        relationships.push(candidate);
    }
}
