//! C++ operator symbols.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Every overloadable C++ operator.
///
/// Operator declarations carry a parsed symbol rather than the raw spelling, so
/// naming never has to fall through on an unknown operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorSymbol {
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    Amp,
    Pipe,
    Tilde,
    Not,
    Assign,
    Less,
    Greater,
    PlusAssign,
    MinusAssign,
    StarAssign,
    SlashAssign,
    PercentAssign,
    CaretAssign,
    AmpAssign,
    PipeAssign,
    Shl,
    Shr,
    ShlAssign,
    ShrAssign,
    EqEq,
    NotEq,
    LessEq,
    GreaterEq,
    AndAnd,
    OrOr,
    Increment,
    Decrement,
    Comma,
    ArrowStar,
    Arrow,
    Call,
    Index,
    New,
    Delete,
    NewArray,
    DeleteArray,
}

impl OperatorSymbol {
    /// Parse an operator spelling such as `+`, `<<=`, `[]` or `new []`.
    pub fn parse(spelling: &str) -> Option<Self> {
        let compact: String = spelling.split_whitespace().collect();
        let symbol = match compact.as_str() {
            "+" => Self::Plus,
            "-" => Self::Minus,
            "*" => Self::Star,
            "/" => Self::Slash,
            "%" => Self::Percent,
            "^" => Self::Caret,
            "&" => Self::Amp,
            "|" => Self::Pipe,
            "~" => Self::Tilde,
            "!" => Self::Not,
            "=" => Self::Assign,
            "<" => Self::Less,
            ">" => Self::Greater,
            "+=" => Self::PlusAssign,
            "-=" => Self::MinusAssign,
            "*=" => Self::StarAssign,
            "/=" => Self::SlashAssign,
            "%=" => Self::PercentAssign,
            "^=" => Self::CaretAssign,
            "&=" => Self::AmpAssign,
            "|=" => Self::PipeAssign,
            "<<" => Self::Shl,
            ">>" => Self::Shr,
            "<<=" => Self::ShlAssign,
            ">>=" => Self::ShrAssign,
            "==" => Self::EqEq,
            "!=" => Self::NotEq,
            "<=" => Self::LessEq,
            ">=" => Self::GreaterEq,
            "&&" => Self::AndAnd,
            "||" => Self::OrOr,
            "++" => Self::Increment,
            "--" => Self::Decrement,
            "," => Self::Comma,
            "->*" => Self::ArrowStar,
            "->" => Self::Arrow,
            "()" => Self::Call,
            "[]" => Self::Index,
            "new" => Self::New,
            "delete" => Self::Delete,
            "new[]" => Self::NewArray,
            "delete[]" => Self::DeleteArray,
            _ => return None,
        };
        Some(symbol)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::Slash => "/",
            Self::Percent => "%",
            Self::Caret => "^",
            Self::Amp => "&",
            Self::Pipe => "|",
            Self::Tilde => "~",
            Self::Not => "!",
            Self::Assign => "=",
            Self::Less => "<",
            Self::Greater => ">",
            Self::PlusAssign => "+=",
            Self::MinusAssign => "-=",
            Self::StarAssign => "*=",
            Self::SlashAssign => "/=",
            Self::PercentAssign => "%=",
            Self::CaretAssign => "^=",
            Self::AmpAssign => "&=",
            Self::PipeAssign => "|=",
            Self::Shl => "<<",
            Self::Shr => ">>",
            Self::ShlAssign => "<<=",
            Self::ShrAssign => ">>=",
            Self::EqEq => "==",
            Self::NotEq => "!=",
            Self::LessEq => "<=",
            Self::GreaterEq => ">=",
            Self::AndAnd => "&&",
            Self::OrOr => "||",
            Self::Increment => "++",
            Self::Decrement => "--",
            Self::Comma => ",",
            Self::ArrowStar => "->*",
            Self::Arrow => "->",
            Self::Call => "()",
            Self::Index => "[]",
            Self::New => "new",
            Self::Delete => "delete",
            Self::NewArray => "new[]",
            Self::DeleteArray => "delete[]",
        }
    }

    /// Identifier-safe word for this operator.
    ///
    /// Symbols with both a unary and a binary meaning get a distinct word for
    /// each form.
    pub fn word(self, unary: bool) -> &'static str {
        match (self, unary) {
            (Self::Plus, true) => "unary_plus",
            (Self::Plus, false) => "add",
            (Self::Minus, true) => "negate",
            (Self::Minus, false) => "subtract",
            (Self::Star, true) => "dereference",
            (Self::Star, false) => "multiply",
            (Self::Amp, true) => "address_of",
            (Self::Amp, false) => "bitwise_and",
            (Self::Slash, _) => "divide",
            (Self::Percent, _) => "modulo",
            (Self::Caret, _) => "bitwise_xor",
            (Self::Pipe, _) => "bitwise_or",
            (Self::Tilde, _) => "bit_invert",
            (Self::Not, _) => "not",
            (Self::Assign, _) => "assign",
            (Self::Less, _) => "less_than",
            (Self::Greater, _) => "greater_than",
            (Self::PlusAssign, _) => "add_assign",
            (Self::MinusAssign, _) => "subtract_assign",
            (Self::StarAssign, _) => "multiply_assign",
            (Self::SlashAssign, _) => "divide_assign",
            (Self::PercentAssign, _) => "modulo_assign",
            (Self::CaretAssign, _) => "bitwise_xor_assign",
            (Self::AmpAssign, _) => "bitwise_and_assign",
            (Self::PipeAssign, _) => "bitwise_or_assign",
            (Self::Shl, _) => "left_shift",
            (Self::Shr, _) => "right_shift",
            (Self::ShlAssign, _) => "left_shift_assign",
            (Self::ShrAssign, _) => "right_shift_assign",
            (Self::EqEq, _) => "equal",
            (Self::NotEq, _) => "not_equal",
            (Self::LessEq, _) => "less_than_or_equal",
            (Self::GreaterEq, _) => "greater_than_or_equal",
            (Self::AndAnd, _) => "logical_and",
            (Self::OrOr, _) => "logical_or",
            (Self::Increment, _) => "increment",
            (Self::Decrement, _) => "decrement",
            (Self::Comma, _) => "comma",
            (Self::ArrowStar, _) => "member_pointer",
            (Self::Arrow, _) => "arrow",
            (Self::Call, _) => "call",
            (Self::Index, _) => "subscript",
            (Self::New, _) => "new",
            (Self::Delete, _) => "delete",
            (Self::NewArray, _) => "new_array",
            (Self::DeleteArray, _) => "delete_array",
        }
    }

    /// Operators the managed side can overload natively.
    pub fn is_bridgeable(self) -> bool {
        matches!(
            self,
            Self::Plus
                | Self::Minus
                | Self::Not
                | Self::Tilde
                | Self::Increment
                | Self::Decrement
                | Self::Star
                | Self::Slash
                | Self::Percent
                | Self::Amp
                | Self::Pipe
                | Self::Caret
                | Self::Shl
                | Self::Shr
                | Self::NotEq
                | Self::Greater
                | Self::Less
                | Self::GreaterEq
                | Self::LessEq
                | Self::EqEq
        )
    }
}

impl fmt::Display for OperatorSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
