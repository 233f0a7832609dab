/// Options for [`Tokenizer::get_token`](crate::Tokenizer::get_token).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, derive_more::BitOr, derive_more::BitAnd)]
pub struct Flags(u8);

impl Flags {
    pub const NONE: Flags = Flags(0);
    /// Read a new token instead of returning the current one.
    pub const GET: Flags = Flags(1 << 0);
    /// `+`/`-` are always operators, never the sign of a number literal.
    pub const XSIGN: Flags = Flags(1 << 1);
    /// Don't recognize keywords, every word becomes a bareword.
    pub const XKEYWORDS: Flags = Flags(1 << 2);
    /// Words that are not keywords become barewords instead of an error.
    pub const BAREWORD: Flags = Flags(1 << 3);

    /// `|` for constant contexts.
    pub const fn union(self, other: Flags) -> Flags {
        Flags(self.0 | other.0)
    }

    pub fn contains(self, other: Flags) -> bool {
        self.0 & other.0 == other.0
    }
}
