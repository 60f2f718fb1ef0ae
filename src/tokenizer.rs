//! Splits raw text into typed word, punctuation, and whitespace tokens.

use unicode_normalization::char::is_combining_mark;

use crate::glyphs::CaseHint;

/// Lexical class of a [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Alphabetic run (with combining marks and internal apostrophes/hyphens) or numeric run.
    Word,
    /// A single non-word, non-whitespace character.
    Punctuation,
    /// A maximal run of whitespace.
    Whitespace,
}

/// Casing pattern of a word, used for best-effort case restoration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Casing {
    /// No uppercase letters (also digits-only words).
    Lower,
    /// First letter uppercase and no other uppercase letters.
    Capitalized,
    /// At least two cased letters, all uppercase.
    AllCaps,
    /// Anything else; restored as lowercase.
    Mixed,
}

impl Casing {
    /// Classifies the casing pattern of `word`.
    #[must_use]
    pub fn of(word: &str) -> Self {
        let cased: Vec<bool> = word
            .chars()
            .filter(|ch| ch.is_uppercase() || ch.is_lowercase())
            .map(char::is_uppercase)
            .collect();
        let Some((&first_upper, rest)) = cased.split_first() else {
            return Self::Lower;
        };
        let rest_upper = rest.iter().filter(|&&upper| upper).count();
        match (first_upper, rest_upper) {
            (false, 0) => Self::Lower,
            (true, 0) => Self::Capitalized,
            (true, n) if n == rest.len() => Self::AllCaps,
            _ => Self::Mixed,
        }
    }

    /// Hint carried by an encoded symbol, if this casing can be restored.
    #[must_use]
    pub fn hint(self) -> Option<CaseHint> {
        match self {
            Self::Capitalized => Some(CaseHint::Capitalized),
            Self::AllCaps => Some(CaseHint::AllCaps),
            Self::Lower | Self::Mixed => None,
        }
    }
}

/// One token of tokenized text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    kind: TokenKind,
    text: String,
    normalized: String,
    casing: Casing,
}

impl Token {
    fn word(text: &str) -> Self {
        Self {
            kind: TokenKind::Word,
            text: text.to_owned(),
            normalized: text.to_lowercase(),
            casing: Casing::of(text),
        }
    }

    fn other(kind: TokenKind, text: &str) -> Self {
        Self {
            kind,
            text: text.to_owned(),
            normalized: text.to_owned(),
            casing: Casing::Lower,
        }
    }

    /// Lexical class.
    #[must_use]
    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    /// Original surface text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Lowercased form for words; the surface text otherwise.
    #[must_use]
    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    /// Casing pattern of the surface text.
    #[must_use]
    pub fn casing(&self) -> Casing {
        self.casing
    }

    /// Returns `true` for [`TokenKind::Word`].
    #[must_use]
    pub fn is_word(&self) -> bool {
        self.kind == TokenKind::Word
    }

    /// Number of line feeds contained in a whitespace token.
    #[must_use]
    pub fn line_breaks(&self) -> usize {
        match self.kind {
            TokenKind::Whitespace => self.text.matches('\n').count(),
            _ => 0,
        }
    }
}

fn is_joiner(ch: char) -> bool {
    matches!(ch, '\'' | '’' | '-')
}

/// Splits `text` into tokens. Never fails; concatenating every token's text yields `text`.
#[must_use]
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut rest = text;
    while let Some(first) = rest.chars().next() {
        let end = if first.is_alphabetic() {
            alphabetic_run_end(rest)
        } else if first.is_numeric() {
            run_end(rest, char::is_numeric)
        } else if first.is_whitespace() {
            run_end(rest, char::is_whitespace)
        } else {
            first.len_utf8()
        };
        let (piece, tail) = rest.split_at(end);
        let token = if first.is_alphabetic() || first.is_numeric() {
            Token::word(piece)
        } else if first.is_whitespace() {
            Token::other(TokenKind::Whitespace, piece)
        } else {
            Token::other(TokenKind::Punctuation, piece)
        };
        tokens.push(token);
        rest = tail;
    }
    tokens
}

/// Convenience iterator over the lowercased words of `text`.
pub fn words(text: &str) -> impl Iterator<Item = String> {
    tokenize(text)
        .into_iter()
        .filter(Token::is_word)
        .map(|token| token.normalized)
}

fn run_end(text: &str, predicate: impl Fn(char) -> bool) -> usize {
    text.char_indices()
        .find(|&(_, ch)| !predicate(ch))
        .map_or(text.len(), |(idx, _)| idx)
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphabetic() || is_combining_mark(ch)
}

/// End of a word starting at an alphabetic char. Combining marks (accents, viramas, vowel
/// signs) stay attached to the letters they modify.
fn alphabetic_run_end(text: &str) -> usize {
    let mut end = 0usize;
    let mut chars = text.char_indices().peekable();
    while let Some((idx, ch)) = chars.next() {
        if is_word_char(ch) {
            end = idx + ch.len_utf8();
            continue;
        }
        let joins = is_joiner(ch)
            && end == idx
            && chars.peek().is_some_and(|&(_, next)| next.is_alphabetic());
        if !joins {
            break;
        }
    }
    end
}
