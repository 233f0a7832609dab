use cursor::{CharSource, Col, Cursor, Line};

mod flags;
pub use flags::Flags;

pub mod token;
pub use token::{keyword, Literal, Token, TokenKind};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ScanErrorType {
    #[error("Unexpected character: {0}")]
    UnexpectedCharacter(char),
    #[error("Unterminated string")]
    UnterminatedString,
    #[error("Invalid escape sequence: \\{0}")]
    InvalidEscape(char),
    #[error("Invalid number: {0}")]
    InvalidNumber(String),
    #[error("Integer literal out of range: {0}")]
    IntegerOverflow(String),
    #[error("Invalid color: {0}")]
    InvalidColor(String),
    #[error("Unknown bareword: {0}")]
    UnknownBareword(String),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("{error}")]
pub struct ScanError {
    pub error: ScanErrorType,
    pub line: Line,
    pub col: Col,
}

impl From<ScanError> for errors::Error {
    fn from(e: ScanError) -> Self {
        errors::Error::Lex { line: e.line, col: e.col, message: e.error.to_string() }
    }
}

pub fn is_identifier_first(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

pub fn is_identifier_next(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

pub fn is_hex(c: char) -> bool {
    c.is_ascii_hexdigit()
}

/// Decodes the digits of a `#RGB`, `#ARGB`, `#RRGGBB` or `#AARRGGBB` color literal.
/// Short forms repeat each digit, so `f80` is `ff8800`.
pub fn lookup_color(hex: &str) -> Option<i64> {
    let digits = hex.chars().map(|c| c.to_digit(16)).collect::<Option<Vec<u32>>>()?;
    let value = match digits.len() {
        3 | 4 => digits.iter().fold(0_u32, |acc, d| (acc << 8) | (d * 0x11)),
        6 | 8 => digits.iter().fold(0_u32, |acc, d| (acc << 4) | d),
        _ => return None,
    };
    Some(i64::from(value))
}

type ScanResult = std::result::Result<TokenKind, ScanErrorType>;

/// Turns a character source into tokens, one at a time.
///
/// The tokenizer owns exactly one token, the current one. Its text and literal
/// are overwritten every time a new token is read, so they have to be copied out
/// before advancing. Once a malformed token was hit, the tokenizer stays in the
/// error state and only returns [`TokenKind::Error`].
#[derive(Debug)]
pub struct Tokenizer<S: CharSource> {
    source: S,
    token: Token,
    unget: usize,
    error: Option<ScanError>,
}

impl<'a> From<&'a str> for Tokenizer<Cursor<'a>> {
    fn from(source: &'a str) -> Self {
        Self::new(Cursor::new(source))
    }
}

impl<S: CharSource> Tokenizer<S> {
    pub fn new(source: S) -> Self {
        Self { source, token: Token::default(), unget: 0, error: None }
    }

    /// Returns the current token, or reads the next one if `flags` contain
    /// [`Flags::GET`] (or no token was read yet). A previous [`unget`](Self::unget)
    /// takes precedence: the current token is served again without reading.
    pub fn get_token(&mut self, flags: Flags) -> TokenKind {
        if self.unget > 0 {
            self.unget -= 1;
            return self.token.kind;
        }

        match self.token.kind {
            TokenKind::Error => TokenKind::Error,
            TokenKind::Unknown => self.scan(flags),
            kind if !flags.contains(Flags::GET) => kind,
            _ => self.scan(flags),
        }
    }

    pub fn unget(&mut self) {
        self.unget += 1;
    }

    pub fn token(&self) -> &Token {
        &self.token
    }

    pub fn text(&self) -> &str {
        &self.token.text
    }

    pub fn literal(&self) -> Literal {
        self.token.literal
    }

    pub fn error(&self) -> Option<&ScanError> {
        self.error.as_ref()
    }

    fn scan(&mut self, flags: Flags) -> TokenKind {
        self.skip_whitespace();

        self.token.text.clear();
        self.token.literal = Literal::None;
        self.token.line = self.source.line();
        self.token.col = self.source.col();

        self.token.kind = match self.lex(flags) {
            Ok(kind) => kind,
            Err(error) => {
                log::debug!("Scan error at {}:{}: {}", self.token.line, self.token.col, error);
                self.error = Some(ScanError { error, line: self.token.line, col: self.token.col });
                TokenKind::Error
            }
        };

        log::trace!("Scanned {:?} `{}`", self.token.kind, self.token.text);
        self.token.kind
    }

    fn lex(&mut self, flags: Flags) -> ScanResult {
        use TokenKind::*;

        let Some(c) = self.source.next_char() else {
            return Ok(Eof);
        };

        match c {
            '\'' | '"' => return self.string(c),
            ':' if self.source.peek().is_some_and(is_identifier_first) => {
                self.read_word();
                return Ok(Identifier);
            }
            '#' => return self.color(),
            '+' | '-'
                if !flags.contains(Flags::XSIGN)
                    && self.source.peek().is_some_and(|c| c.is_ascii_digit()) =>
            {
                return self.number(c)
            }
            c if c.is_ascii_digit() => return self.number(c),
            c if is_identifier_first(c) => return self.word(c, flags),
            _ => self.token.text.push(c),
        }

        Ok(match c {
            '(' => LBrace,
            ')' => RBrace,
            '[' => LqBrace,
            ']' => RqBrace,
            ',' => Comma,
            '?' => Question,
            ':' => Colon,
            ';' => Semicolon,
            '&' => {
                self.eat('&');
                And
            }
            '|' => {
                self.eat('|');
                Or
            }
            '^' => {
                self.eat('^');
                Xor
            }
            '~' => Bnot,
            '!' => {
                if self.eat('=') {
                    NotEq
                } else {
                    Not
                }
            }
            '=' => {
                self.eat('=');
                Eq
            }
            '<' => {
                if self.eat('=') {
                    if self.eat('>') {
                        Cmp
                    } else {
                        LessEq
                    }
                } else if self.eat('>') {
                    NotEq
                } else {
                    Less
                }
            }
            '>' => {
                if self.eat('=') {
                    GreaterEq
                } else {
                    Greater
                }
            }
            '+' => Add,
            '-' => Sub,
            '*' => {
                if self.eat('*') {
                    Pow
                } else {
                    Mul
                }
            }
            '/' => Div,
            '%' => Fmod,
            '.' => Scat,
            c => return Err(ScanErrorType::UnexpectedCharacter(c)),
        })
    }

    fn take(&mut self) -> Option<char> {
        let c = self.source.next_char()?;
        self.token.text.push(c);
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.source.peek() == Some(expected) {
            self.take();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while self.source.peek().is_some_and(char::is_whitespace) {
            self.source.next_char();
        }
    }

    fn read_word(&mut self) {
        while self.source.peek().is_some_and(is_identifier_next) {
            self.take();
        }
    }

    fn word(&mut self, first: char, flags: Flags) -> ScanResult {
        self.token.text.push(first);
        self.read_word();

        if flags.contains(Flags::XKEYWORDS) {
            return Ok(TokenKind::Bareword);
        }
        if let Some(kind) = keyword(&self.token.text) {
            return Ok(kind);
        }
        if flags.contains(Flags::BAREWORD) {
            Ok(TokenKind::Bareword)
        } else {
            Err(ScanErrorType::UnknownBareword(self.token.text.clone()))
        }
    }

    fn digits(&mut self) {
        while self.source.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.take();
        }
    }

    fn number(&mut self, first: char) -> ScanResult {
        self.token.text.push(first);
        let lead = if first.is_ascii_digit() {
            first
        } else {
            // The caller made sure a digit follows the sign
            self.take().ok_or_else(|| ScanErrorType::InvalidNumber(self.token.text.clone()))?
        };

        if lead == '0' {
            if let Some(kind) = self.radix_integer()? {
                return Ok(kind);
            }
        }

        self.digits();

        let mut is_float = false;
        if self.source.peek() == Some('.') && self.source.peek_next().is_some_and(|c| c.is_ascii_digit())
        {
            self.take();
            self.digits();
            is_float = true;
        }

        if matches!(self.source.peek(), Some('e' | 'E')) {
            let mark = self.source.mark();
            let len = self.token.text.len();
            self.take();
            if matches!(self.source.peek(), Some('+' | '-')) {
                self.take();
            }
            if self.source.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.digits();
                is_float = true;
            } else {
                // Not an exponent, leave the `e` for the next token
                self.source.reset(mark);
                self.token.text.truncate(len);
            }
        }

        if is_float {
            let value = self
                .token
                .text
                .parse::<f64>()
                .map_err(|_| ScanErrorType::InvalidNumber(self.token.text.clone()))?;
            self.token.literal = Literal::Float(value);
            Ok(TokenKind::FValue)
        } else {
            let value = self
                .token
                .text
                .parse::<i64>()
                .map_err(|_| ScanErrorType::IntegerOverflow(self.token.text.clone()))?;
            self.token.literal = Literal::Int(value);
            Ok(TokenKind::IValue)
        }
    }

    fn radix_integer(&mut self) -> std::result::Result<Option<TokenKind>, ScanErrorType> {
        let radix = match self.source.peek() {
            Some('x' | 'X') => 16,
            Some('o' | 'O') => 8,
            Some('b' | 'B') => 2,
            _ => return Ok(None),
        };
        if !self.source.peek_next().is_some_and(|c| c.is_digit(radix)) {
            return Ok(None);
        }

        self.take();
        let start = self.token.text.len();
        while self.source.peek().is_some_and(|c| c.is_digit(radix)) {
            self.take();
        }

        // Radix literals cover the full 64 bits, `0xffffffffffffffff` is -1
        let value = u64::from_str_radix(&self.token.text[start..], radix)
            .map_err(|_| ScanErrorType::IntegerOverflow(self.token.text.clone()))?
            as i64;
        let value = if self.token.text.starts_with('-') { value.wrapping_neg() } else { value };

        self.token.literal = Literal::Int(value);
        Ok(Some(TokenKind::IValue))
    }

    fn color(&mut self) -> ScanResult {
        self.token.text.push('#');
        while self.source.peek().is_some_and(is_hex) {
            self.take();
        }

        match lookup_color(&self.token.text[1..]) {
            Some(value) => {
                self.token.literal = Literal::Int(value);
                Ok(TokenKind::IValue)
            }
            None => Err(ScanErrorType::InvalidColor(self.token.text.clone())),
        }
    }

    fn string(&mut self, quote: char) -> ScanResult {
        loop {
            match self.source.next_char() {
                None => return Err(ScanErrorType::UnterminatedString),
                Some(c) if c == quote => return Ok(TokenKind::String),
                Some('\\') => {
                    let c = self.escape()?;
                    self.token.text.push(c);
                }
                Some(c) => self.token.text.push(c),
            }
        }
    }

    fn escape(&mut self) -> std::result::Result<char, ScanErrorType> {
        match self.source.next_char() {
            Some('n') => Ok('\n'),
            Some('r') => Ok('\r'),
            Some('t') => Ok('\t'),
            Some('0') => Ok('\0'),
            Some(c @ ('\\' | '\'' | '"')) => Ok(c),
            Some('u') => {
                let mut code = 0;
                for _ in 0..4 {
                    let digit = self
                        .source
                        .next_char()
                        .and_then(|c| c.to_digit(16))
                        .ok_or(ScanErrorType::InvalidEscape('u'))?;
                    code = (code << 4) | digit;
                }
                char::from_u32(code).ok_or(ScanErrorType::InvalidEscape('u'))
            }
            Some(c) => Err(ScanErrorType::InvalidEscape(c)),
            None => Err(ScanErrorType::UnterminatedString),
        }
    }
}

#[cfg(test)]
mod tests {
    use cursor::CharStream;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;
    use TokenKind::*;

    fn scan_all(source: &str, flags: Flags) -> Vec<(TokenKind, std::string::String)> {
        let mut tokenizer = Tokenizer::from(source);
        let mut tokens = Vec::new();
        loop {
            let kind = tokenizer.get_token(flags | Flags::GET);
            tokens.push((kind, tokenizer.text().to_string()));
            if matches!(kind, Eof | Error) {
                return tokens;
            }
        }
    }

    fn kinds(source: &str, flags: Flags) -> Vec<TokenKind> {
        scan_all(source, flags).into_iter().map(|(kind, _)| kind).collect()
    }

    #[test]
    fn single_char_tokens() {
        assert_eq!(
            kinds("( ) [ ] , ? : ; & | ^ ~ ! = < > + - * / % .", Flags::XSIGN),
            vec![
                LBrace, RBrace, LqBrace, RqBrace, Comma, Question, Colon, Semicolon, And, Or, Xor,
                Bnot, Not, Eq, Less, Greater, Add, Sub, Mul, Div, Fmod, Scat, Eof
            ]
        );
    }

    #[test]
    fn two_char_tokens() {
        assert_eq!(
            scan_all("&& || ^^ != == <= >= <> <=> **", Flags::NONE),
            vec![
                (And, "&&".to_string()),
                (Or, "||".to_string()),
                (Xor, "^^".to_string()),
                (NotEq, "!=".to_string()),
                (Eq, "==".to_string()),
                (LessEq, "<=".to_string()),
                (GreaterEq, ">=".to_string()),
                (NotEq, "<>".to_string()),
                (Cmp, "<=>".to_string()),
                (Pow, "**".to_string()),
                (Eof, "".to_string()),
            ]
        );
    }

    #[test]
    fn keywords() {
        assert_eq!(
            kinds("and or not lt nge ilt idiv mod x sc slen ex db true null undef", Flags::NONE),
            vec![
                And, Or, Not, Less, Less, Iless, Idiv, Imod, Srep, Scat, Slen, Ex, Db, True, Null,
                Undef, Eof
            ]
        );
    }

    #[test]
    fn identifiers_and_barewords() {
        assert_eq!(
            scan_all(":gain :_x1 foo", Flags::BAREWORD),
            vec![
                (Identifier, "gain".to_string()),
                (Identifier, "_x1".to_string()),
                (Bareword, "foo".to_string()),
                (Eof, "".to_string()),
            ]
        );

        // Without the flag, unknown words are errors
        assert_eq!(kinds("foo", Flags::NONE), vec![Error]);

        // Keywords degrade to barewords
        assert_eq!(kinds("and x foo", Flags::XKEYWORDS), vec![Bareword, Bareword, Bareword, Eof]);

        // A lone colon is punctuation
        assert_eq!(kinds("a ? 1 : 2", Flags::BAREWORD), vec![Bareword, Question, IValue, Colon, IValue, Eof]);
    }

    #[test]
    fn numbers() {
        let mut tokenizer = Tokenizer::from("42 3.25 1e3 2.5E-2 0x1F 0b101 0o17 #f80 #11223344");
        let mut literals = Vec::new();
        while tokenizer.get_token(Flags::GET) != Eof {
            literals.push(tokenizer.literal());
        }
        assert_eq!(
            literals,
            vec![
                Literal::Int(42),
                Literal::Float(3.25),
                Literal::Float(1000.0),
                Literal::Float(0.025),
                Literal::Int(31),
                Literal::Int(5),
                Literal::Int(15),
                Literal::Int(0xff8800),
                Literal::Int(0x11223344),
            ]
        );
    }

    #[test]
    fn signed_numbers() {
        assert_eq!(
            scan_all("1 -2 +3", Flags::NONE),
            vec![
                (IValue, "1".to_string()),
                (IValue, "-2".to_string()),
                (IValue, "+3".to_string()),
                (Eof, "".to_string()),
            ]
        );
        assert_eq!(kinds("1 -2 +3", Flags::XSIGN), vec![IValue, Sub, IValue, Add, IValue, Eof]);

        let mut tokenizer = Tokenizer::from("-0x10");
        assert_eq!(tokenizer.get_token(Flags::GET), IValue);
        assert_eq!(tokenizer.literal(), Literal::Int(-16));
    }

    #[test]
    fn number_followed_by_operator_word() {
        // `e` and `.` only belong to the number when digits follow
        assert_eq!(kinds("1eq 1", Flags::NONE), vec![IValue, Eq, IValue, Eof]);
        assert_eq!(kinds("1.'a'", Flags::NONE), vec![IValue, Scat, String, Eof]);
        assert_eq!(kinds("0band 1", Flags::NONE), vec![IValue, Band, IValue, Eof]);
    }

    #[test]
    fn strings() {
        assert_eq!(
            scan_all(r#"'it\'s' "a\tb\n" 'xä' """#, Flags::NONE),
            vec![
                (String, "it's".to_string()),
                (String, "a\tb\n".to_string()),
                (String, "xä".to_string()),
                (String, "".to_string()),
                (Eof, "".to_string()),
            ]
        );
    }

    #[test]
    fn errors_are_sticky() {
        let mut tokenizer = Tokenizer::from("1 + 'abc");
        assert_eq!(tokenizer.get_token(Flags::GET), IValue);
        assert_eq!(tokenizer.get_token(Flags::GET), Add);
        assert_eq!(tokenizer.get_token(Flags::GET), Error);
        assert_eq!(
            tokenizer.error(),
            Some(&ScanError { error: ScanErrorType::UnterminatedString, line: Line(1), col: Col(5) })
        );
        assert_eq!(tokenizer.get_token(Flags::GET), Error);
        assert_eq!(tokenizer.get_token(Flags::NONE), Error);
    }

    #[test]
    fn malformed_tokens() {
        let error = |source: &str| {
            let mut tokenizer = Tokenizer::from(source);
            while !matches!(tokenizer.get_token(Flags::GET), Eof | Error) {}
            tokenizer.error().map(|e| e.error.clone())
        };

        assert_eq!(error("1 @ 2"), Some(ScanErrorType::UnexpectedCharacter('@')));
        assert_eq!(error("'\\q'"), Some(ScanErrorType::InvalidEscape('q')));
        assert_eq!(error("#12345"), Some(ScanErrorType::InvalidColor("#12345".to_string())));
        assert_eq!(
            error("9223372036854775808"),
            Some(ScanErrorType::IntegerOverflow("9223372036854775808".to_string()))
        );
        assert_eq!(error("-9223372036854775808"), None);
        assert_eq!(error("1 2 3"), None);
    }

    #[test]
    fn get_without_flag_returns_current() {
        let mut tokenizer = Tokenizer::from("1 2");

        // The very first call always reads
        assert_eq!(tokenizer.get_token(Flags::NONE), IValue);
        assert_eq!(tokenizer.text(), "1");
        assert_eq!(tokenizer.get_token(Flags::NONE), IValue);
        assert_eq!(tokenizer.text(), "1");

        assert_eq!(tokenizer.get_token(Flags::GET), IValue);
        assert_eq!(tokenizer.text(), "2");
        assert_eq!(tokenizer.get_token(Flags::GET), Eof);
        assert_eq!(tokenizer.get_token(Flags::GET), Eof);
    }

    #[test]
    fn unget() {
        let mut tokenizer = Tokenizer::from(":a + 1");
        assert_eq!(tokenizer.get_token(Flags::GET), Identifier);
        tokenizer.unget();
        assert_eq!(tokenizer.get_token(Flags::GET), Identifier);
        assert_eq!(tokenizer.text(), "a");
        assert_eq!(tokenizer.get_token(Flags::GET), Add);
    }

    #[test]
    fn positions() {
        let mut tokenizer = Tokenizer::from("1 +\n  :x");
        tokenizer.get_token(Flags::GET);
        tokenizer.get_token(Flags::GET);
        assert_eq!((tokenizer.token().line, tokenizer.token().col), (Line(1), Col(3)));
        tokenizer.get_token(Flags::GET);
        assert_eq!((tokenizer.token().line, tokenizer.token().col), (Line(2), Col(3)));
    }

    #[test]
    fn any_char_source() {
        let mut tokenizer = Tokenizer::new(CharStream::new("2.5e+1 x 'ab'".chars()));
        assert_eq!(tokenizer.get_token(Flags::GET), FValue);
        assert_eq!(tokenizer.literal(), Literal::Float(25.0));
        assert_eq!(tokenizer.get_token(Flags::GET), Srep);
        assert_eq!(tokenizer.get_token(Flags::GET), String);
        assert_eq!(tokenizer.text(), "ab");
        assert_eq!(tokenizer.get_token(Flags::GET), Eof);
    }

    #[test]
    fn colors() {
        assert_eq!(lookup_color("fff"), Some(0xffffff));
        assert_eq!(lookup_color("8abc"), Some(0x88aabbcc));
        assert_eq!(lookup_color("00ff00"), Some(0x00ff00));
        assert_eq!(lookup_color("ff00ff00"), Some(0xff00ff00));
        assert_eq!(lookup_color("ff"), None);
        assert_eq!(lookup_color("ggg"), None);
    }

    proptest! {
        #[test]
        fn unget_serves_the_same_token(source in "[-+*/()<=>!&|^~.,?:;a-z0-9'# ]{0,24}") {
            let mut tokenizer = Tokenizer::from(source.as_str());
            loop {
                let kind = tokenizer.get_token(Flags::GET | Flags::BAREWORD);
                let token = tokenizer.token().clone();
                tokenizer.unget();
                prop_assert_eq!(tokenizer.get_token(Flags::GET | Flags::BAREWORD), kind);
                prop_assert_eq!(tokenizer.token(), &token);
                if matches!(kind, Eof | Error) {
                    break;
                }
            }
        }

        #[test]
        fn integer_literals(n in 0..=i64::MAX) {
            let text = n.to_string();
            let mut tokenizer = Tokenizer::from(text.as_str());
            prop_assert_eq!(tokenizer.get_token(Flags::GET), IValue);
            prop_assert_eq!(tokenizer.literal(), Literal::Int(n));
            prop_assert_eq!(tokenizer.get_token(Flags::GET), Eof);
        }
    }
}
