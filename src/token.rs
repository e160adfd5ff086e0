/// Classification of the token currently loaded in the tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    /// No token loaded yet. Never visible after the first `next()`.
    Invalid,
    Identifier,
    Keyword,
    Str,
    Number,
    Operator,
    /// End of line. `\n` is a significant statement terminator.
    Eol,
    Eof,
}

/// Operator tokens.
///
/// `)`, `]` and `}` always terminate as single-character tokens; every other
/// operator is scanned greedily over the operator character set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Not,
    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,
    OpenBrace,
    CloseBrace,
    Dot,
    AndAnd,
    OrOr,
    Assign,
    Equal,
    Semicolon,
    Colon,
    Comma,
}

impl Operator {
    pub fn from_str(text: &str) -> Option<Operator> {
        let op = match text {
            "+" => Operator::Plus,
            "-" => Operator::Minus,
            "*" => Operator::Star,
            "/" => Operator::Slash,
            "%" => Operator::Percent,
            "!" => Operator::Not,
            "(" => Operator::OpenParen,
            ")" => Operator::CloseParen,
            "[" => Operator::OpenBracket,
            "]" => Operator::CloseBracket,
            "{" => Operator::OpenBrace,
            "}" => Operator::CloseBrace,
            "." => Operator::Dot,
            "&&" => Operator::AndAnd,
            "||" => Operator::OrOr,
            "=" => Operator::Assign,
            "==" => Operator::Equal,
            ";" => Operator::Semicolon,
            ":" => Operator::Colon,
            "," => Operator::Comma,
            _ => return None,
        };
        Some(op)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Plus => "+",
            Operator::Minus => "-",
            Operator::Star => "*",
            Operator::Slash => "/",
            Operator::Percent => "%",
            Operator::Not => "!",
            Operator::OpenParen => "(",
            Operator::CloseParen => ")",
            Operator::OpenBracket => "[",
            Operator::CloseBracket => "]",
            Operator::OpenBrace => "{",
            Operator::CloseBrace => "}",
            Operator::Dot => ".",
            Operator::AndAnd => "&&",
            Operator::OrOr => "||",
            Operator::Assign => "=",
            Operator::Equal => "==",
            Operator::Semicolon => ";",
            Operator::Colon => ":",
            Operator::Comma => ",",
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reserved words. Identifiers matching one of these tokenize as keywords.
pub const KEYWORDS: &[&str] = &[
    "for", "if", "else", "in", "new", "null", "true", "false", "return",
];

pub fn is_keyword(text: &str) -> bool {
    KEYWORDS.contains(&text)
}

/// Characters that can start or extend an operator token.
pub const OPERATOR_CHARS: &[char] = &[
    '!', '@', '#', '$', '%', '^', '&', '*', '(', ')', '-', '+', '=', '[', ']', '{', '}', ':', '<',
    '>', ',', '.', '/', '?', '|',
];
