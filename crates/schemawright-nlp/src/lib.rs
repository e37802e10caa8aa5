//! Requirement parsing
//!
//! This crate handles:
//! - Tokenizing free-form requirement text into sentences
//! - Extracting entities from capitalized nouns and table/collection cues
//! - Extracting relationships with an ordered phrase rule table
//!
//! Extraction is pattern based and never fails: fragments that cannot be
//! resolved are dropped.

pub mod extractor;
pub mod rules;
pub mod tokenizer;

pub use extractor::{extract_entities, extract_relationships, ParsedRequirements, RequirementParser};
pub use rules::{Direction, RelationshipRule, RULES};
pub use tokenizer::{tokenize, Separator, Sentence, Token, Word};
