//! Token discriminators and the keyword table.

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

/// Everything the lexer can hand to the parser.
///
/// Literal payloads (cooked strings, numbers, identifiers with escapes
/// resolved) live on the lexer itself and are valid while the token is
/// current.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Token {
    EndOfFile,
    /// Emitted after an unrecoverable lexical error was logged.
    SyntaxError,

    // Literals
    Identifier,
    PrivateIdentifier,
    NumericLiteral,
    BigIntLiteral,
    StringLiteral,
    NoSubstitutionTemplateLiteral,
    TemplateHead,
    TemplateMiddle,
    TemplateTail,
    RegExpLiteral,
    /// Raw JSX text between an element's children; only produced by
    /// `next_jsx_child_token`.
    JsxText,

    // Punctuation
    Ampersand,
    AmpersandAmpersand,
    AmpersandAmpersandEquals,
    AmpersandEquals,
    Arrow,
    Asterisk,
    AsteriskAsterisk,
    AsteriskAsteriskEquals,
    AsteriskEquals,
    At,
    Bar,
    BarBar,
    BarBarEquals,
    BarEquals,
    Caret,
    CaretEquals,
    CloseBrace,
    CloseBracket,
    CloseParen,
    Colon,
    Comma,
    Dot,
    DotDotDot,
    Equals,
    EqualsEquals,
    EqualsEqualsEquals,
    Exclamation,
    ExclamationEquals,
    ExclamationEqualsEquals,
    GreaterThan,
    GreaterThanEquals,
    GreaterThanGreaterThan,
    GreaterThanGreaterThanEquals,
    GreaterThanGreaterThanGreaterThan,
    GreaterThanGreaterThanGreaterThanEquals,
    LessThan,
    LessThanEquals,
    LessThanLessThan,
    LessThanLessThanEquals,
    Minus,
    MinusEquals,
    MinusMinus,
    OpenBrace,
    OpenBracket,
    OpenParen,
    Percent,
    PercentEquals,
    Plus,
    PlusEquals,
    PlusPlus,
    Question,
    QuestionDot,
    QuestionQuestion,
    QuestionQuestionEquals,
    Semicolon,
    Slash,
    SlashEquals,
    Tilde,

    // Reserved words
    Break,
    Case,
    Catch,
    Class,
    Const,
    Continue,
    Debugger,
    Default,
    Delete,
    Do,
    Else,
    Enum,
    Export,
    Extends,
    False,
    Finally,
    For,
    Function,
    If,
    Import,
    In,
    InstanceOf,
    New,
    Null,
    Return,
    Super,
    Switch,
    This,
    Throw,
    True,
    Try,
    TypeOf,
    Var,
    Void,
    While,
    With,
}

impl Token {
    /// Reserved words that still scan as identifier text. The parser
    /// checks this when a keyword appears where a plain name is legal
    /// (property names, import aliases).
    #[must_use]
    pub const fn is_keyword(self) -> bool {
        matches!(
            self,
            Token::Break
                | Token::Case
                | Token::Catch
                | Token::Class
                | Token::Const
                | Token::Continue
                | Token::Debugger
                | Token::Default
                | Token::Delete
                | Token::Do
                | Token::Else
                | Token::Enum
                | Token::Export
                | Token::Extends
                | Token::False
                | Token::Finally
                | Token::For
                | Token::Function
                | Token::If
                | Token::Import
                | Token::In
                | Token::InstanceOf
                | Token::New
                | Token::Null
                | Token::Return
                | Token::Super
                | Token::Switch
                | Token::This
                | Token::Throw
                | Token::True
                | Token::Try
                | Token::TypeOf
                | Token::Var
                | Token::Void
                | Token::While
                | Token::With
        )
    }

    /// Tokens that may begin an expression. Used for regex-vs-divide
    /// context and arrow-probe decisions.
    #[must_use]
    pub const fn can_start_expression(self) -> bool {
        matches!(
            self,
            Token::Identifier
                | Token::PrivateIdentifier
                | Token::NumericLiteral
                | Token::BigIntLiteral
                | Token::StringLiteral
                | Token::NoSubstitutionTemplateLiteral
                | Token::TemplateHead
                | Token::RegExpLiteral
                | Token::OpenBrace
                | Token::OpenBracket
                | Token::OpenParen
                | Token::Plus
                | Token::Minus
                | Token::Exclamation
                | Token::Tilde
                | Token::PlusPlus
                | Token::MinusMinus
                | Token::LessThan
                | Token::Class
                | Token::Delete
                | Token::False
                | Token::Function
                | Token::Import
                | Token::New
                | Token::Null
                | Token::Super
                | Token::This
                | Token::True
                | Token::TypeOf
                | Token::Void
        )
    }
}

/// Keyword spelling → token. All strict-mode and contextual keywords
/// (`let`, `async`, `of`, ...) are deliberately absent; they lex as
/// identifiers and the parser decides from context.
pub static KEYWORDS: Lazy<FxHashMap<&'static str, Token>> = Lazy::new(|| {
    let mut map = FxHashMap::default();
    map.insert("break", Token::Break);
    map.insert("case", Token::Case);
    map.insert("catch", Token::Catch);
    map.insert("class", Token::Class);
    map.insert("const", Token::Const);
    map.insert("continue", Token::Continue);
    map.insert("debugger", Token::Debugger);
    map.insert("default", Token::Default);
    map.insert("delete", Token::Delete);
    map.insert("do", Token::Do);
    map.insert("else", Token::Else);
    map.insert("enum", Token::Enum);
    map.insert("export", Token::Export);
    map.insert("extends", Token::Extends);
    map.insert("false", Token::False);
    map.insert("finally", Token::Finally);
    map.insert("for", Token::For);
    map.insert("function", Token::Function);
    map.insert("if", Token::If);
    map.insert("import", Token::Import);
    map.insert("in", Token::In);
    map.insert("instanceof", Token::InstanceOf);
    map.insert("new", Token::New);
    map.insert("null", Token::Null);
    map.insert("return", Token::Return);
    map.insert("super", Token::Super);
    map.insert("switch", Token::Switch);
    map.insert("this", Token::This);
    map.insert("throw", Token::Throw);
    map.insert("true", Token::True);
    map.insert("try", Token::Try);
    map.insert("typeof", Token::TypeOf);
    map.insert("var", Token::Var);
    map.insert("void", Token::Void);
    map.insert("while", Token::While);
    map.insert("with", Token::With);
    map
});

/// Names that can never be used as a generated identifier: every spelling
/// above plus the always-reserved strict-mode words.
pub static RESERVED_NAMES: Lazy<Vec<&'static str>> = Lazy::new(|| {
    let mut names: Vec<&'static str> = KEYWORDS.keys().copied().collect();
    names.extend([
        "let",
        "static",
        "yield",
        "await",
        "implements",
        "interface",
        "package",
        "private",
        "protected",
        "public",
        "arguments",
        "eval",
    ]);
    names.sort_unstable();
    names
});
