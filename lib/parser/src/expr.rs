use std::fmt::{self, Display, Formatter};

use itertools::Itertools;
use value::Value;

/// Operator of a [`Expr::Calc`] node. Chosen once by the parser, the
/// interpreter dispatches on it without looking at tokens again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Op {
    #[display(fmt = "?")]
    Ternary,

    #[display(fmt = "and")]
    And,
    #[display(fmt = "or")]
    Or,
    #[display(fmt = "xor")]
    Xor,
    #[display(fmt = "!")]
    Not,

    #[display(fmt = "band")]
    Band,
    #[display(fmt = "bor")]
    Bor,
    #[display(fmt = "bxor")]
    Bxor,
    #[display(fmt = "~")]
    BitNot,

    #[display(fmt = "==")]
    Eq,
    #[display(fmt = "!=")]
    NotEq,
    #[display(fmt = "<")]
    Less,
    #[display(fmt = ">")]
    Greater,
    #[display(fmt = "<=")]
    LessEq,
    #[display(fmt = ">=")]
    GreaterEq,
    #[display(fmt = "<=>")]
    Cmp,

    #[display(fmt = "ieq")]
    Ieq,
    #[display(fmt = "ine")]
    InotEq,
    #[display(fmt = "ilt")]
    Iless,
    #[display(fmt = "igt")]
    Igreater,
    #[display(fmt = "ile")]
    IlessEq,
    #[display(fmt = "ige")]
    IgreaterEq,
    #[display(fmt = "icmp")]
    Icmp,

    #[display(fmt = "+")]
    Add,
    #[display(fmt = "-")]
    Sub,
    #[display(fmt = "*")]
    Mul,
    #[display(fmt = "/")]
    Div,
    #[display(fmt = "%")]
    Fmod,
    #[display(fmt = "**")]
    Pow,
    #[display(fmt = "+")]
    Pos,
    #[display(fmt = "-")]
    Neg,

    #[display(fmt = "iadd")]
    Iadd,
    #[display(fmt = "isub")]
    Isub,
    #[display(fmt = "imul")]
    Imul,
    #[display(fmt = "idiv")]
    Idiv,
    #[display(fmt = "imod")]
    Imod,

    #[display(fmt = ".")]
    Scat,
    #[display(fmt = "x")]
    Srep,
    #[display(fmt = "slen")]
    Slen,
    #[display(fmt = "srev")]
    Srev,
    #[display(fmt = "supr")]
    Supr,
    #[display(fmt = "slwr")]
    Slwr,

    #[display(fmt = "int")]
    Int,
    #[display(fmt = "float")]
    Float,
    #[display(fmt = "str")]
    Str,
    #[display(fmt = "bool")]
    Bool,

    #[display(fmt = "psign")]
    Psign,
    #[display(fmt = "nsign")]
    Nsign,
    #[display(fmt = "db")]
    Db,
    #[display(fmt = "ex")]
    Ex,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Operator application. Unary operators only use `left`. For
    /// [`Op::Ternary`], `cond` is the condition and `left`/`right` the branches.
    Calc { op: Op, left: Box<Expr>, right: Option<Box<Expr>>, cond: Option<Box<Expr>> },
    /// Variable reference, `:gain` or `x[1][2]`.
    Resolve { name: String, indices: Vec<Expr> },
    Call { name: String, args: Vec<Expr> },
    Literal(Value),
}

impl Expr {
    pub fn unary(op: Op, operand: Expr) -> Self {
        Expr::Calc { op, left: Box::new(operand), right: None, cond: None }
    }

    pub fn binary(op: Op, left: Expr, right: Expr) -> Self {
        Expr::Calc { op, left: Box::new(left), right: Some(Box::new(right)), cond: None }
    }

    pub fn ternary(cond: Expr, then_branch: Expr, else_branch: Expr) -> Self {
        Expr::Calc {
            op: Op::Ternary,
            left: Box::new(then_branch),
            right: Some(Box::new(else_branch)),
            cond: Some(Box::new(cond)),
        }
    }

    /// Names of all variables referenced anywhere in the tree, each listed once,
    /// in the order they appear in the source.
    pub fn dependencies(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_dependencies(&mut names);
        names
    }

    fn collect_dependencies<'e>(&'e self, names: &mut Vec<&'e str>) {
        match self {
            Expr::Calc { left, right, cond, .. } => {
                if let Some(cond) = cond {
                    cond.collect_dependencies(names);
                }
                left.collect_dependencies(names);
                if let Some(right) = right {
                    right.collect_dependencies(names);
                }
            }
            Expr::Resolve { name, indices } => {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
                indices.iter().for_each(|index| index.collect_dependencies(names));
            }
            Expr::Call { args, .. } => args.iter().for_each(|arg| arg.collect_dependencies(names)),
            Expr::Literal(_) => {}
        }
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Calc { op, left, right: None, .. } => write!(f, "({} {})", op, left),
            Expr::Calc { op, left, right: Some(right), cond: None } => {
                write!(f, "({} {} {})", op, left, right)
            }
            Expr::Calc { op, left, right: Some(right), cond: Some(cond) } => {
                write!(f, "({} {} {} {})", op, cond, left, right)
            }
            Expr::Resolve { name, indices } => {
                write!(f, ":{}", name)?;
                indices.iter().try_for_each(|index| write!(f, "[{}]", index))
            }
            Expr::Call { name, args } if args.is_empty() => write!(f, "(call {})", name),
            Expr::Call { name, args } => write!(f, "(call {} {})", name, args.iter().join(" ")),
            Expr::Literal(value) => write!(f, "{}", value.clone().cast_string_ext()),
        }
    }
}
