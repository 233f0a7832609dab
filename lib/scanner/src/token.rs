use std::fmt::Display;

use cursor::{Col, Line};

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Identifier name (without the leading `:`), word spelling, decoded string
    /// contents, number spelling or operator spelling.
    pub text: String,
    pub literal: Literal,
    pub line: Line,
    pub col: Col,
}

impl Default for Token {
    fn default() -> Self {
        Self {
            kind: TokenKind::Unknown,
            text: String::new(),
            literal: Literal::None,
            line: Line(1),
            col: Col(1),
        }
    }
}

impl Token {
    /// The spelling of a word-like token: barewords and keywords written as words
    /// (`x`, `lt`, `and`, ...). Identifiers and symbols return `None`.
    pub fn word(&self) -> Option<&str> {
        match self.kind {
            TokenKind::Bareword => Some(&self.text),
            kind if kind.is_keyword() && self.text.starts_with(crate::is_identifier_first) => {
                Some(&self.text)
            }
            _ => None,
        }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            TokenKind::Eof => write!(f, "end of input"),
            TokenKind::Identifier => write!(f, ":{}", self.text),
            TokenKind::String => write!(f, "'{}'", self.text),
            kind if self.text.is_empty() => write!(f, "{}", <&'static str>::from(kind)),
            _ => write!(f, "{}", self.text),
        }
    }
}

/// Numeric payload of `IValue`/`FValue` tokens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Literal {
    None,
    Int(i64),
    Float(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumCount, strum::IntoStaticStr)]
pub enum TokenKind {
    Unknown,
    Eof,
    Error,

    // Names and literals
    Identifier,
    Bareword,
    IValue,
    FValue,
    String,

    // Punctuation
    LBrace,
    RBrace,
    LqBrace,
    RqBrace,
    Comma,
    Question,
    Colon,
    Semicolon,

    // Logic
    And,
    Or,
    Xor,
    Not,
    Band,
    Bor,
    Bxor,
    Bnot,

    // Floating-point arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Fmod,
    Pow,

    // Integer arithmetic
    Iadd,
    Isub,
    Imul,
    Idiv,
    Imod,

    // Floating-point comparison
    Less,
    Greater,
    LessEq,
    GreaterEq,
    NotEq,
    Eq,
    Cmp,

    // Integer comparison
    Iless,
    Igreater,
    IlessEq,
    IgreaterEq,
    InotEq,
    Ieq,
    Icmp,

    // Strings
    Scat,
    Srep,
    Slen,
    Srev,
    Supr,
    Slwr,

    // Casts
    Int,
    Float,
    Str,
    Bool,

    // Special forms
    Ex,
    Db,
    Psign,
    Nsign,

    // Constants
    True,
    False,
    Null,
    Undef,
}

impl TokenKind {
    pub fn is_keyword(self) -> bool {
        !matches!(
            self,
            TokenKind::Unknown
                | TokenKind::Eof
                | TokenKind::Error
                | TokenKind::Identifier
                | TokenKind::Bareword
                | TokenKind::IValue
                | TokenKind::FValue
                | TokenKind::String
                | TokenKind::LBrace
                | TokenKind::RBrace
                | TokenKind::LqBrace
                | TokenKind::RqBrace
                | TokenKind::Comma
                | TokenKind::Question
                | TokenKind::Colon
                | TokenKind::Semicolon
        )
    }
}

// Must stay sorted byte-wise, it is searched with binary_search_by.
const KEYWORDS: &[(&str, TokenKind)] = {
    use TokenKind::*;
    &[
        ("add", Add),
        ("and", And),
        ("band", Band),
        ("bnot", Bnot),
        ("bool", Bool),
        ("bor", Bor),
        ("bxor", Bxor),
        ("cmp", Cmp),
        ("db", Db),
        ("div", Div),
        ("eq", Eq),
        ("ex", Ex),
        ("false", False),
        ("float", Float),
        ("fmod", Fmod),
        ("ge", GreaterEq),
        ("gt", Greater),
        ("iadd", Iadd),
        ("icmp", Icmp),
        ("idiv", Idiv),
        ("ie", Ieq),
        ("ieq", Ieq),
        ("ige", IgreaterEq),
        ("igt", Igreater),
        ("ile", IlessEq),
        ("ilt", Iless),
        ("imod", Imod),
        ("imul", Imul),
        ("ine", InotEq),
        ("inge", Iless),
        ("ingt", IlessEq),
        ("inle", Igreater),
        ("inlt", IgreaterEq),
        ("int", Int),
        ("isub", Isub),
        ("le", LessEq),
        ("lt", Less),
        ("mod", Imod),
        ("mul", Mul),
        ("ne", NotEq),
        ("nge", Less),
        ("ngt", LessEq),
        ("nle", Greater),
        ("nlt", GreaterEq),
        ("not", Not),
        ("nsign", Nsign),
        ("null", Null),
        ("or", Or),
        ("pow", Pow),
        ("psign", Psign),
        ("sc", Scat),
        ("scat", Scat),
        ("slen", Slen),
        ("slwr", Slwr),
        ("sr", Srep),
        ("srep", Srep),
        ("srev", Srev),
        ("str", Str),
        ("sub", Sub),
        ("supr", Supr),
        ("true", True),
        ("undef", Undef),
        ("x", Srep),
        ("xor", Xor),
    ]
};

pub fn keyword(word: &str) -> Option<TokenKind> {
    KEYWORDS.binary_search_by(|(k, _)| (*k).cmp(word)).ok().map(|i| KEYWORDS[i].1)
}
