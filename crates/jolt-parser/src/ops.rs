//! Operator precedence table.
//!
//! Levels match the language grammar from lowest to tightest. Binary
//! parsing threads a `Precedence` floor: an operator only binds when its
//! level is above the floor, and right-associative operators re-enter one
//! level lower than their own.

use jolt_lexer::Token;

use crate::ast::BinOp;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Precedence {
    Lowest = 0,
    Comma,
    Spread,
    Yield,
    Assign,
    Conditional,
    NullishCoalescing,
    LogicalOr,
    LogicalAnd,
    BitwiseOr,
    BitwiseXor,
    BitwiseAnd,
    Equals,
    Compare,
    Shift,
    Add,
    Multiply,
    Exponentiation,
    Prefix,
    Postfix,
    New,
    Call,
    Member,
}

impl Precedence {
    /// The next-lower level, used as the right-hand floor for
    /// left-associative operators.
    #[must_use]
    pub fn lower(self) -> Precedence {
        from_level(self as u8 - 1)
    }
}

fn from_level(value: u8) -> Precedence {
    // Values only come from `Precedence as u8 - 1` with Lowest never
    // lowered, so the range is always valid.
    match value {
        0 => Precedence::Lowest,
        1 => Precedence::Comma,
        2 => Precedence::Spread,
        3 => Precedence::Yield,
        4 => Precedence::Assign,
        5 => Precedence::Conditional,
        6 => Precedence::NullishCoalescing,
        7 => Precedence::LogicalOr,
        8 => Precedence::LogicalAnd,
        9 => Precedence::BitwiseOr,
        10 => Precedence::BitwiseXor,
        11 => Precedence::BitwiseAnd,
        12 => Precedence::Equals,
        13 => Precedence::Compare,
        14 => Precedence::Shift,
        15 => Precedence::Add,
        16 => Precedence::Multiply,
        17 => Precedence::Exponentiation,
        18 => Precedence::Prefix,
        19 => Precedence::Postfix,
        20 => Precedence::New,
        21 => Precedence::Call,
        _ => Precedence::Member,
    }
}

/// Binary operator lookup: token → (operator, level, right-associative).
pub fn binary_op_info(token: Token) -> Option<(BinOp, Precedence, bool)> {
    use Precedence as P;
    Some(match token {
        Token::Comma => (BinOp::Comma, P::Comma, false),

        Token::Equals => (BinOp::Assign, P::Assign, true),
        Token::PlusEquals => (BinOp::AddAssign, P::Assign, true),
        Token::MinusEquals => (BinOp::SubAssign, P::Assign, true),
        Token::AsteriskEquals => (BinOp::MulAssign, P::Assign, true),
        Token::SlashEquals => (BinOp::DivAssign, P::Assign, true),
        Token::PercentEquals => (BinOp::RemAssign, P::Assign, true),
        Token::AsteriskAsteriskEquals => (BinOp::PowAssign, P::Assign, true),
        Token::LessThanLessThanEquals => (BinOp::ShlAssign, P::Assign, true),
        Token::GreaterThanGreaterThanEquals => (BinOp::ShrAssign, P::Assign, true),
        Token::GreaterThanGreaterThanGreaterThanEquals => (BinOp::UShrAssign, P::Assign, true),
        Token::AmpersandEquals => (BinOp::BitAndAssign, P::Assign, true),
        Token::BarEquals => (BinOp::BitOrAssign, P::Assign, true),
        Token::CaretEquals => (BinOp::BitXorAssign, P::Assign, true),
        Token::AmpersandAmpersandEquals => (BinOp::LogicalAndAssign, P::Assign, true),
        Token::BarBarEquals => (BinOp::LogicalOrAssign, P::Assign, true),
        Token::QuestionQuestionEquals => (BinOp::NullishAssign, P::Assign, true),

        Token::QuestionQuestion => (BinOp::NullishCoalescing, P::NullishCoalescing, false),
        Token::BarBar => (BinOp::LogicalOr, P::LogicalOr, false),
        Token::AmpersandAmpersand => (BinOp::LogicalAnd, P::LogicalAnd, false),
        Token::Bar => (BinOp::BitOr, P::BitwiseOr, false),
        Token::Caret => (BinOp::BitXor, P::BitwiseXor, false),
        Token::Ampersand => (BinOp::BitAnd, P::BitwiseAnd, false),

        Token::EqualsEquals => (BinOp::LooseEq, P::Equals, false),
        Token::ExclamationEquals => (BinOp::LooseNe, P::Equals, false),
        Token::EqualsEqualsEquals => (BinOp::StrictEq, P::Equals, false),
        Token::ExclamationEqualsEquals => (BinOp::StrictNe, P::Equals, false),

        Token::LessThan => (BinOp::Lt, P::Compare, false),
        Token::LessThanEquals => (BinOp::Le, P::Compare, false),
        Token::GreaterThan => (BinOp::Gt, P::Compare, false),
        Token::GreaterThanEquals => (BinOp::Ge, P::Compare, false),
        Token::In => (BinOp::In, P::Compare, false),
        Token::InstanceOf => (BinOp::InstanceOf, P::Compare, false),

        Token::LessThanLessThan => (BinOp::Shl, P::Shift, false),
        Token::GreaterThanGreaterThan => (BinOp::Shr, P::Shift, false),
        Token::GreaterThanGreaterThanGreaterThan => (BinOp::UShr, P::Shift, false),

        Token::Plus => (BinOp::Add, P::Add, false),
        Token::Minus => (BinOp::Sub, P::Add, false),

        Token::Asterisk => (BinOp::Mul, P::Multiply, false),
        Token::Slash => (BinOp::Div, P::Multiply, false),
        Token::Percent => (BinOp::Rem, P::Multiply, false),

        // Right-associative despite binding tighter than multiply
        Token::AsteriskAsterisk => (BinOp::Pow, P::Exponentiation, true),

        _ => return None,
    })
}

/// Printing precedence of a produced binary operator, mirroring the parse
/// table so the printer can decide when parentheses are required.
pub fn binary_op_precedence(op: BinOp) -> Precedence {
    use Precedence as P;
    match op {
        BinOp::Comma => P::Comma,
        op if op.is_assign() => P::Assign,
        BinOp::NullishCoalescing => P::NullishCoalescing,
        BinOp::LogicalOr => P::LogicalOr,
        BinOp::LogicalAnd => P::LogicalAnd,
        BinOp::BitOr => P::BitwiseOr,
        BinOp::BitXor => P::BitwiseXor,
        BinOp::BitAnd => P::BitwiseAnd,
        BinOp::LooseEq | BinOp::LooseNe | BinOp::StrictEq | BinOp::StrictNe => P::Equals,
        BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge | BinOp::In | BinOp::InstanceOf => P::Compare,
        BinOp::Shl | BinOp::Shr | BinOp::UShr => P::Shift,
        BinOp::Add | BinOp::Sub => P::Add,
        BinOp::Mul | BinOp::Div | BinOp::Rem => P::Multiply,
        BinOp::Pow => P::Exponentiation,
        _ => P::Lowest,
    }
}

/// Right-associative operators re-enter at their own level; everything
/// else re-enters one lower.
pub fn is_right_associative(op: BinOp) -> bool {
    op == BinOp::Pow || op.is_assign()
}
