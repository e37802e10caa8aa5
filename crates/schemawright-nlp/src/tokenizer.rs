//! Sentence and word tokenizer
//!
//! Splits requirement text into sentences of words and list separators.
//! Pure and infallible: any input produces some (possibly empty) token stream.

/// A word with its casing preserved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    /// Text as written
    pub text: String,

    /// Lowercased text used for rule matching
    pub lower: String,

    /// First character is uppercase
    pub capitalized: bool,
}

impl Word {
    fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            lower: text.to_lowercase(),
            capitalized: text.chars().next().map(char::is_uppercase).unwrap_or(false),
        }
    }

    /// Whether the word contains only letters
    pub fn is_alphabetic(&self) -> bool {
        self.text.chars().all(char::is_alphabetic)
    }
}

/// Punctuation and conjunctions that split lists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Separator {
    Comma,
    And,
    Or,
    OpenParen,
    CloseParen,
    Colon,
}

/// A token in a sentence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Word(Word),
    Separator(Separator),
}

impl Token {
    /// The word, if this token is one
    pub fn as_word(&self) -> Option<&Word> {
        match self {
            Self::Word(word) => Some(word),
            Self::Separator(_) => None,
        }
    }

    /// Whether the token is the given separator
    pub fn is_separator(&self, separator: Separator) -> bool {
        matches!(self, Self::Separator(s) if *s == separator)
    }
}

/// Tokens of one sentence
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Sentence {
    pub tokens: Vec<Token>,
}

impl Sentence {
    /// Lowercased word at a token index
    pub fn lower_at(&self, index: usize) -> Option<&str> {
        self.tokens
            .get(index)
            .and_then(Token::as_word)
            .map(|w| w.lower.as_str())
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

fn is_sentence_end(ch: char) -> bool {
    matches!(ch, '.' | '!' | '?' | ';' | '\n')
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '-' || ch == '\''
}

/// Tokenize text into sentences
pub fn tokenize(text: &str) -> Vec<Sentence> {
    let mut sentences = Vec::new();
    let mut current = Sentence::default();
    let mut word = String::new();

    let flush_word = |word: &mut String, sentence: &mut Sentence| {
        let trimmed = word.trim_matches(|c: char| c == '\'' || c == '-');
        if !trimmed.is_empty() {
            let token = match trimmed.to_lowercase().as_str() {
                "and" => Token::Separator(Separator::And),
                "or" => Token::Separator(Separator::Or),
                _ => Token::Word(Word::new(trimmed)),
            };
            sentence.tokens.push(token);
        }
        word.clear();
    };

    for ch in text.chars() {
        if is_word_char(ch) {
            word.push(ch);
            continue;
        }

        flush_word(&mut word, &mut current);

        let separator = match ch {
            ',' => Some(Separator::Comma),
            '(' => Some(Separator::OpenParen),
            ')' => Some(Separator::CloseParen),
            ':' => Some(Separator::Colon),
            '&' => Some(Separator::And),
            '/' => Some(Separator::Or),
            _ => None,
        };
        if let Some(separator) = separator {
            current.tokens.push(Token::Separator(separator));
        }

        if is_sentence_end(ch) && !current.is_empty() {
            sentences.push(std::mem::take(&mut current));
        }
    }

    flush_word(&mut word, &mut current);
    if !current.is_empty() {
        sentences.push(current);
    }

    sentences
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(sentence: &Sentence) -> Vec<&str> {
        sentence
            .tokens
            .iter()
            .filter_map(Token::as_word)
            .map(|w| w.text.as_str())
            .collect()
    }

    #[test]
    fn splits_sentences_and_words() {
        let sentences = tokenize("Users have many Orders. Each Order belongs to a User!");
        assert_eq!(sentences.len(), 2);
        assert_eq!(words(&sentences[0]), vec!["Users", "have", "many", "Orders"]);
        assert_eq!(words(&sentences[1]), vec!["Each", "Order", "belongs", "to", "a", "User"]);
    }

    #[test]
    fn conjunctions_become_separators() {
        let sentences = tokenize("Products with name, price and sku");
        let tokens = &sentences[0].tokens;
        assert!(tokens[3].is_separator(Separator::Comma));
        assert!(tokens[5].is_separator(Separator::And));
    }

    #[test]
    fn capitalization_flag() {
        let sentences = tokenize("the Customer");
        let flags: Vec<bool> = sentences[0]
            .tokens
            .iter()
            .filter_map(Token::as_word)
            .map(|w| w.capitalized)
            .collect();
        assert_eq!(flags, vec![false, true]);
    }

    #[test]
    fn empty_and_punctuation_only_input() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("... ;;; !!").is_empty());
    }

    #[test]
    fn parentheses_and_colons() {
        let sentences = tokenize("Book (title, isbn): done");
        let tokens = &sentences[0].tokens;
        assert!(tokens[1].is_separator(Separator::OpenParen));
        assert!(tokens[5].is_separator(Separator::CloseParen));
        assert!(tokens[6].is_separator(Separator::Colon));
    }
}
