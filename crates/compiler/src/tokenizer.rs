//! Lexical analysis for Mint source text.
//!
//! Scans left to right, tracking 1-based line and column positions.
//! Keywords are not distinguished from identifiers here; the parser
//! decides what `if` or `var` mean from context. Characters the scanner
//! does not recognize become `Other` tokens and are reported by the
//! parser, so tokenizing itself never fails.

/// A line/column position in the source text, both 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub line: u32,
    pub column: u32,
}

impl Location {
    /// Wildcard location used by tests to write location-agnostic token
    /// and AST literals. Matches every location through [`Location::matches`].
    pub const ANY: Location = Location {
        line: u32::MAX,
        column: u32::MAX,
    };

    pub fn new(line: u32, column: u32) -> Self {
        Location { line, column }
    }

    /// Equality that treats [`Location::ANY`] on either side as a match.
    /// Plain `==` on real locations stays structural.
    pub fn matches(&self, other: &Location) -> bool {
        *self == Self::ANY || *other == Self::ANY || self == other
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    IntLiteral,
    Identifier,
    Operator,
    Punctuation,
    /// A character no other rule recognized
    Other,
    /// Synthesized by the parser when it reads past the last real token
    End,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub text: String,
    pub kind: TokenKind,
    pub loc: Location,
}

impl Token {
    pub fn new(text: impl Into<String>, kind: TokenKind, loc: Location) -> Self {
        Token {
            text: text.into(),
            kind,
            loc,
        }
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text && self.kind == other.kind && self.loc.matches(&other.loc)
    }
}

/// Multi-character operators must come before their single-character
/// prefixes so `<=` is not read as `<` `=`.
const OPERATORS: &[&str] = &[
    "==", "!=", "<=", ">=", "+", "-", "*", "/", "%", "=", "<", ">",
];

const PUNCTUATION: &[char] = &['(', ')', '{', '}', ',', ';'];

/// Split source text into tokens. The returned sequence contains no `End`
/// token; the parser synthesizes one at the position of the last real
/// token when it reads past the end.
pub fn tokenize(source: &str) -> Vec<Token> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    let mut line: u32 = 1;
    let mut column: u32 = 1;

    while i < chars.len() {
        let c = chars[i];

        if c == '\n' {
            line += 1;
            column = 1;
            i += 1;
            continue;
        }

        if c.is_whitespace() {
            column += 1;
            i += 1;
            continue;
        }

        // Line comments: `//` or `#` to end of line.
        if c == '#' || (c == '/' && chars.get(i + 1) == Some(&'/')) {
            while i < chars.len() && chars[i] != '\n' {
                i += 1;
            }
            continue;
        }

        let loc = Location::new(line, column);

        if c.is_ascii_alphabetic() || c == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            let text: String = chars[start..i].iter().collect();
            column += (i - start) as u32;
            tokens.push(Token::new(text, TokenKind::Identifier, loc));
            continue;
        }

        if c.is_ascii_digit() {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            let text: String = chars[start..i].iter().collect();
            column += (i - start) as u32;
            tokens.push(Token::new(text, TokenKind::IntLiteral, loc));
            continue;
        }

        if let Some(op) = match_operator(&chars[i..]) {
            i += op.len();
            column += op.len() as u32;
            tokens.push(Token::new(op, TokenKind::Operator, loc));
            continue;
        }

        if PUNCTUATION.contains(&c) {
            i += 1;
            column += 1;
            tokens.push(Token::new(c.to_string(), TokenKind::Punctuation, loc));
            continue;
        }

        tokens.push(Token::new(c.to_string(), TokenKind::Other, loc));
        i += 1;
        column += 1;
    }

    tokens
}

fn match_operator(rest: &[char]) -> Option<&'static str> {
    OPERATORS.iter().copied().find(|op| {
        op.chars()
            .enumerate()
            .all(|(k, expected)| rest.get(k) == Some(&expected))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const L: Location = Location::ANY;

    fn token(text: &str, kind: TokenKind) -> Token {
        Token::new(text, kind, L)
    }

    #[test]
    fn test_tokenizer_basics() {
        assert_eq!(
            tokenize("aaa 123 bbb"),
            vec![
                token("aaa", TokenKind::Identifier),
                token("123", TokenKind::IntLiteral),
                token("bbb", TokenKind::Identifier),
            ]
        );
    }

    #[test]
    fn test_tokenizer_operators_and_punctuation() {
        let src = "aaa == { } + - * / % = != <= >= < > ; ,";
        let expected = vec![
            token("aaa", TokenKind::Identifier),
            token("==", TokenKind::Operator),
            token("{", TokenKind::Punctuation),
            token("}", TokenKind::Punctuation),
            token("+", TokenKind::Operator),
            token("-", TokenKind::Operator),
            token("*", TokenKind::Operator),
            token("/", TokenKind::Operator),
            token("%", TokenKind::Operator),
            token("=", TokenKind::Operator),
            token("!=", TokenKind::Operator),
            token("<=", TokenKind::Operator),
            token(">=", TokenKind::Operator),
            token("<", TokenKind::Operator),
            token(">", TokenKind::Operator),
            token(";", TokenKind::Punctuation),
            token(",", TokenKind::Punctuation),
        ];
        assert_eq!(tokenize(src), expected);
    }

    #[test]
    fn test_tokenizer_skips_comments() {
        let src = "aaa 123 // this is a comment\nbbb # another comment";
        let expected = vec![
            token("aaa", TokenKind::Identifier),
            token("123", TokenKind::IntLiteral),
            token("bbb", TokenKind::Identifier),
        ];
        assert_eq!(tokenize(src), expected);
    }

    #[test]
    fn test_tokenizer_if_statement() {
        let source = "if a < 10 then {\n    print_int(3*x);  # this here is a comment\n    }";
        let expected = vec![
            token("if", TokenKind::Identifier),
            token("a", TokenKind::Identifier),
            token("<", TokenKind::Operator),
            token("10", TokenKind::IntLiteral),
            token("then", TokenKind::Identifier),
            token("{", TokenKind::Punctuation),
            token("print_int", TokenKind::Identifier),
            token("(", TokenKind::Punctuation),
            token("3", TokenKind::IntLiteral),
            token("*", TokenKind::Operator),
            token("x", TokenKind::Identifier),
            token(")", TokenKind::Punctuation),
            token(";", TokenKind::Punctuation),
            token("}", TokenKind::Punctuation),
        ];
        assert_eq!(tokenize(source), expected);
    }

    #[test]
    fn test_tokenizer_locations() {
        let tokens = tokenize("aaa 123\n  bbb");
        assert_eq!(tokens[0].loc, Location::new(1, 1));
        assert_eq!(tokens[1].loc, Location::new(1, 5));
        assert_eq!(tokens[2].loc, Location::new(2, 3));
    }

    #[test]
    fn test_tokenizer_token_text_is_source_substring() {
        let src = "var x = 10 <= y; # trailing\nx";
        for t in tokenize(src) {
            assert!(src.contains(&t.text), "token text {:?} not in source", t.text);
        }
    }

    #[test]
    fn test_tokenizer_unknown_character() {
        let tokens = tokenize("a ? b");
        assert_eq!(tokens[1].kind, TokenKind::Other);
        assert_eq!(tokens[1].text, "?");
    }

    #[test]
    fn test_wildcard_location_matches_everything() {
        let real = Location::new(3, 7);
        assert!(Location::ANY.matches(&real));
        assert!(real.matches(&Location::ANY));
        assert!(real.matches(&real));
        assert!(!real.matches(&Location::new(3, 8)));
        // Plain equality on real locations is untouched.
        assert_ne!(real, Location::new(3, 8));
    }
}
