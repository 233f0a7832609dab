mod expr;
pub use expr::{Expr, Op};

use cursor::{CharSource, Col, Line};
use errors::Result;
use scanner::{Flags, Literal, TokenKind, Tokenizer};
use value::Value;

use TokenKind::*;

// Operands may be barewords and carry their own sign (`2 * -3`). After an
// operand, `+`/`-` are always operators (`2 -3` is a subtraction).
const OPERAND: Flags = Flags::GET.union(Flags::BAREWORD);
const OPERATOR: Flags = Flags::GET.union(Flags::XSIGN);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, derive_more::BitOr)]
pub struct ParseFlags(u8);

impl ParseFlags {
    pub const NONE: ParseFlags = ParseFlags(0);
    /// Accept a `;`-separated list of expressions instead of a single one.
    pub const MULTIPLE: ParseFlags = ParseFlags(1);

    pub fn contains(self, other: ParseFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParserError {
    error: ParserErrorType,
    line: Line,
    col: Col,
    found: std::string::String,
}

impl From<ParserError> for errors::Error {
    fn from(error: ParserError) -> Self {
        errors::Error::UnexpectedToken {
            line: error.line,
            col: error.col,
            message: format!("{}, found {}", error.error, error.found),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserErrorType {
    ExpectedOperand,
    ExpectedIdentifier,
    ExpectedColon,
    MissingRightParen,
    MissingRightBracket,
    ExpectedEnd,
}

impl std::fmt::Display for ParserErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                ParserErrorType::ExpectedOperand => "Expected operand",
                ParserErrorType::ExpectedIdentifier => "Expected identifier after `ex`",
                ParserErrorType::ExpectedColon => "Expected `:` in conditional expression",
                ParserErrorType::MissingRightParen => "Missing closing `)`",
                ParserErrorType::MissingRightBracket => "Missing closing `]` after index",
                ParserErrorType::ExpectedEnd => "Expected end of expression",
            }
        )
    }
}

/// Parses exactly one expression that has to span the whole input.
pub fn parse_expression<S: CharSource>(tokenizer: &mut Tokenizer<S>) -> Result<Expr> {
    let mut parser = Parser::new(tokenizer);
    let expr = parser.expression()?;
    parser.expect(Eof, ParserErrorType::ExpectedEnd)?;
    Ok(expr)
}

/// Recursive descent over the operator precedence ladder, one method per level,
/// from `ternary` (binding loosest) down to `primary`.
///
/// The first error aborts parsing. Nothing that was built so far is returned.
#[derive(Debug)]
pub struct Parser<'t, S: CharSource> {
    tokenizer: &'t mut Tokenizer<S>,
}

impl<'t, S: CharSource> Parser<'t, S> {
    pub fn new(tokenizer: &'t mut Tokenizer<S>) -> Self {
        Self { tokenizer }
    }

    /// Parses the whole input. Without [`ParseFlags::MULTIPLE`] this yields
    /// exactly one expression. With it, expressions are separated by `;` and a
    /// trailing `;` is allowed.
    pub fn parse(mut self, flags: ParseFlags) -> Result<Vec<Expr>> {
        let mut exprs = vec![self.expression()?];

        loop {
            match self.advance(OPERATOR)? {
                Eof => break,
                Semicolon if flags.contains(ParseFlags::MULTIPLE) => {
                    if self.advance(OPERAND)? == Eof {
                        break;
                    }
                    self.tokenizer.unget();
                    exprs.push(self.expression()?);
                }
                _ => return Err(self.error(ParserErrorType::ExpectedEnd)),
            }
        }

        log::debug!("Parsed {} expression(s)", exprs.len());
        Ok(exprs)
    }

    pub fn expression(&mut self) -> Result<Expr> {
        let expr = self.ternary()?;
        log::trace!("Parsed expression {}", expr);
        Ok(expr)
    }

    fn ternary(&mut self) -> Result<Expr> {
        let cond = self.or()?;

        if self.operator(|kind| (kind == Question).then_some(Op::Ternary))?.is_none() {
            return Ok(cond);
        }

        let then_branch = self.ternary()?;
        self.expect(Colon, ParserErrorType::ExpectedColon)?;
        let else_branch = self.ternary()?;

        Ok(Expr::ternary(cond, then_branch, else_branch))
    }

    fn or(&mut self) -> Result<Expr> {
        self.binary(Self::xor, |kind| match kind {
            Or => Some(Op::Or),
            _ => None,
        })
    }

    fn xor(&mut self) -> Result<Expr> {
        self.binary(Self::and, |kind| match kind {
            Xor => Some(Op::Xor),
            _ => None,
        })
    }

    fn and(&mut self) -> Result<Expr> {
        self.binary(Self::bit_or, |kind| match kind {
            And => Some(Op::And),
            _ => None,
        })
    }

    fn bit_or(&mut self) -> Result<Expr> {
        self.binary(Self::bit_xor, |kind| match kind {
            Bor => Some(Op::Bor),
            _ => None,
        })
    }

    fn bit_xor(&mut self) -> Result<Expr> {
        self.binary(Self::bit_and, |kind| match kind {
            Bxor => Some(Op::Bxor),
            _ => None,
        })
    }

    fn bit_and(&mut self) -> Result<Expr> {
        self.binary(Self::equality, |kind| match kind {
            Band => Some(Op::Band),
            _ => None,
        })
    }

    fn equality(&mut self) -> Result<Expr> {
        self.binary(Self::comparison, |kind| match kind {
            Eq => Some(Op::Eq),
            NotEq => Some(Op::NotEq),
            Ieq => Some(Op::Ieq),
            InotEq => Some(Op::InotEq),
            _ => None,
        })
    }

    fn comparison(&mut self) -> Result<Expr> {
        self.binary(Self::concat, |kind| match kind {
            Less => Some(Op::Less),
            Greater => Some(Op::Greater),
            LessEq => Some(Op::LessEq),
            GreaterEq => Some(Op::GreaterEq),
            Cmp => Some(Op::Cmp),
            Iless => Some(Op::Iless),
            Igreater => Some(Op::Igreater),
            IlessEq => Some(Op::IlessEq),
            IgreaterEq => Some(Op::IgreaterEq),
            Icmp => Some(Op::Icmp),
            _ => None,
        })
    }

    fn concat(&mut self) -> Result<Expr> {
        self.binary(Self::repeat, |kind| match kind {
            Scat => Some(Op::Scat),
            _ => None,
        })
    }

    fn repeat(&mut self) -> Result<Expr> {
        self.binary(Self::term, |kind| match kind {
            Srep => Some(Op::Srep),
            _ => None,
        })
    }

    fn term(&mut self) -> Result<Expr> {
        self.binary(Self::factor, |kind| match kind {
            Add => Some(Op::Add),
            Sub => Some(Op::Sub),
            Iadd => Some(Op::Iadd),
            Isub => Some(Op::Isub),
            _ => None,
        })
    }

    fn factor(&mut self) -> Result<Expr> {
        self.binary(Self::power, |kind| match kind {
            Mul => Some(Op::Mul),
            Div => Some(Op::Div),
            Fmod => Some(Op::Fmod),
            Imul => Some(Op::Imul),
            Idiv => Some(Op::Idiv),
            Imod => Some(Op::Imod),
            _ => None,
        })
    }

    fn power(&mut self) -> Result<Expr> {
        self.binary(Self::not, |kind| match kind {
            Pow => Some(Op::Pow),
            _ => None,
        })
    }

    fn not(&mut self) -> Result<Expr> {
        let op = match self.advance(OPERAND)? {
            Not => Op::Not,
            Bnot => Op::BitNot,
            _ => {
                self.tokenizer.unget();
                return self.sign();
            }
        };
        Ok(Expr::unary(op, self.not()?))
    }

    fn sign(&mut self) -> Result<Expr> {
        let op = match self.advance(OPERAND)? {
            Add => Op::Pos,
            Sub => Op::Neg,
            Psign => Op::Psign,
            Nsign => Op::Nsign,
            Int => Op::Int,
            Float => Op::Float,
            Str => Op::Str,
            Bool => Op::Bool,
            Slen => Op::Slen,
            Srev => Op::Srev,
            Supr => Op::Supr,
            Slwr => Op::Slwr,
            Db => Op::Db,
            Ex => return Ok(Expr::unary(Op::Ex, self.exists_operand()?)),
            _ => {
                self.tokenizer.unget();
                return self.primary();
            }
        };
        Ok(Expr::unary(op, self.sign()?))
    }

    /// `ex` only applies to variables: `ex :name`, `ex x[1]` or `ex(:name)`.
    fn exists_operand(&mut self) -> Result<Expr> {
        if self.advance(OPERAND)? == LBrace {
            let expr = self.exists_operand()?;
            self.expect(RBrace, ParserErrorType::MissingRightParen)?;
            return Ok(expr);
        }

        match self.name() {
            Some(name) => self.variable(name),
            None => Err(self.error(ParserErrorType::ExpectedIdentifier)),
        }
    }

    fn primary(&mut self) -> Result<Expr> {
        let kind = self.advance(OPERAND)?;
        let expr = match kind {
            IValue | FValue => Expr::Literal(match self.tokenizer.literal() {
                Literal::Int(i) => Value::Int(i),
                Literal::Float(f) => Value::Float(f),
                Literal::None => return Err(self.error(ParserErrorType::ExpectedOperand)),
            }),
            String => Expr::Literal(Value::Str(self.tokenizer.text().to_string())),
            True => Expr::Literal(Value::Bool(true)),
            False => Expr::Literal(Value::Bool(false)),
            Null => Expr::Literal(Value::Null),
            Undef => Expr::Literal(Value::Undef),
            LBrace => {
                let expr = self.ternary()?;
                self.expect(RBrace, ParserErrorType::MissingRightParen)?;
                expr
            }
            _ => match self.name() {
                Some(name) => self.function_or_variable(name)?,
                None => return Err(self.error(ParserErrorType::ExpectedOperand)),
            },
        };
        Ok(expr)
    }

    fn function_or_variable(&mut self, name: std::string::String) -> Result<Expr> {
        if self.advance(OPERATOR)? != LBrace {
            self.tokenizer.unget();
            return self.variable(name);
        }

        let mut args = Vec::new();
        if self.advance(OPERAND)? == RBrace {
            return Ok(Expr::Call { name, args });
        }
        self.tokenizer.unget();

        loop {
            args.push(self.ternary()?);
            match self.advance(OPERATOR)? {
                Comma => continue,
                RBrace => break,
                _ => return Err(self.error(ParserErrorType::MissingRightParen)),
            }
        }

        Ok(Expr::Call { name, args })
    }

    fn variable(&mut self, name: std::string::String) -> Result<Expr> {
        let mut indices = Vec::new();
        while self.advance(OPERATOR)? == LqBrace {
            indices.push(self.ternary()?);
            self.expect(RqBrace, ParserErrorType::MissingRightBracket)?;
        }
        self.tokenizer.unget();

        Ok(Expr::Resolve { name, indices })
    }
}

// Helpers
impl<'t, S: CharSource> Parser<'t, S> {
    /// One left-associative binary level: `operand (op operand)*`.
    fn binary(
        &mut self,
        operand: fn(&mut Self) -> Result<Expr>,
        ops: fn(TokenKind) -> Option<Op>,
    ) -> Result<Expr> {
        let mut expr = operand(self)?;

        while let Some(op) = self.operator(ops)? {
            let right = operand(self)?;
            expr = Expr::binary(op, expr, right);
        }

        Ok(expr)
    }

    /// Consumes the next token if `op` maps it to an operator.
    fn operator(&mut self, op: impl Fn(TokenKind) -> Option<Op>) -> Result<Option<Op>> {
        let op = op(self.advance(OPERATOR)?);
        if op.is_none() {
            self.tokenizer.unget();
        }
        Ok(op)
    }

    /// The name of the current token if it can name a variable or function:
    /// identifiers, barewords and keywords that are spelled as words.
    fn name(&self) -> Option<std::string::String> {
        let token = self.tokenizer.token();
        match token.kind {
            Identifier => Some(token.text.clone()),
            _ => token.word().map(str::to_string),
        }
    }

    fn advance(&mut self, flags: Flags) -> Result<TokenKind> {
        match self.tokenizer.get_token(flags) {
            Error => Err(match self.tokenizer.error() {
                Some(error) => {
                    log::debug!("Parse aborted: {}", error);
                    error.clone().into()
                }
                None => self.error(ParserErrorType::ExpectedOperand),
            }),
            kind => Ok(kind),
        }
    }

    fn expect(&mut self, kind: TokenKind, error: ParserErrorType) -> Result<()> {
        if self.advance(OPERATOR)? == kind {
            Ok(())
        } else {
            Err(self.error(error))
        }
    }

    fn error(&self, error: ParserErrorType) -> errors::Error {
        let token = self.tokenizer.token();
        log::debug!("Parse aborted at {}:{}: {} (found {})", token.line, token.col, error, token);
        ParserError { error, line: token.line, col: token.col, found: token.to_string() }.into()
    }
}
