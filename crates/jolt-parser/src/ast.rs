//! The abstract syntax tree.
//!
//! Nodes are tagged unions: `Expr` and `Stmt` are thin wrappers carrying a
//! span plus an `EData`/`SData` payload enum with one variant per node
//! kind. Every variant owns exactly the fields it needs, and consumers
//! match exhaustively on the discriminator.
//!
//! Once the parser emits a tree it is never mutated in place; downstream
//! phases that need a different shape rebuild the affected fragment.

use jolt_common::refs::Ref;
use jolt_common::span::Span;

// =============================================================================
// Expressions
// =============================================================================

#[derive(Clone, Debug)]
pub struct Expr {
    pub span: Span,
    pub data: EData,
}

impl Expr {
    pub fn new(span: Span, data: EData) -> Self {
        Expr { span, data }
    }

    /// A synthetic `undefined` with no source position.
    pub fn undefined() -> Self {
        Expr {
            span: Span::dummy(),
            data: EData::Undefined,
        }
    }

    /// Whether this expression is a primitive literal (its value is fully
    /// known at compile time).
    pub fn is_primitive_literal(&self) -> bool {
        matches!(
            self.data,
            EData::Null
                | EData::Undefined
                | EData::Boolean(_)
                | EData::Number(_)
                | EData::String(_)
                | EData::BigInt(_)
        )
    }
}

/// Marks an access's position within an optional chain, so `a?.b.c`
/// prints contiguously while `(a?.b).c` starts a fresh chain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OptionalChain {
    /// Not part of an optional chain
    #[default]
    None,
    /// The `?.` link itself
    Start,
    /// A plain link that continues an enclosing chain
    Continue,
}

#[derive(Clone, Debug)]
pub enum EData {
    Array(EArray),
    Arrow(Box<EArrow>),
    Await(Box<Expr>),
    BigInt(String),
    Binary(Box<EBinary>),
    Boolean(bool),
    Call(Box<ECall>),
    Class(Box<Class>),
    Conditional(Box<EConditional>),
    Dot(Box<EDot>),
    Function(Box<Func>),
    Identifier(EIdentifier),
    /// An unresolved reference as parsed by pass 1; pass 2 binds it to a
    /// symbol and rewrites it to `Identifier` or `ImportIdentifier`.
    IdentifierName(String),
    /// An identifier that refers to an import binding. Distinct from
    /// `Identifier` because the linker may attach a namespace alias, and
    /// the printer must then emit a property access instead of a name.
    ImportIdentifier(EIdentifier),
    /// `import.meta`
    ImportMeta,
    /// Dynamic `import(...)`
    ImportCall(Box<EImportCall>),
    Index(Box<EIndex>),
    JsxElement(Box<EJsxElement>),
    /// Placeholder produced by error recovery
    Missing,
    New(Box<ENew>),
    NewTarget,
    Null,
    Number(f64),
    Object(EObject),
    PrivateIdentifier(EIdentifier),
    /// An unresolved `#name`, bound during pass 2.
    PrivateIdentifierName(String),
    RegExp(String),
    /// `require(...)` with a resolved import record
    RequireCall(ERequireCall),
    Spread(Box<Expr>),
    String(EString),
    Super,
    Template(Box<ETemplate>),
    This,
    Unary(Box<EUnary>),
    Undefined,
    Yield(Box<EYield>),
}

#[derive(Clone, Debug, Default)]
pub struct EArray {
    pub items: Vec<Expr>,
}

#[derive(Clone, Debug)]
pub struct EArrow {
    pub args: Vec<Arg>,
    pub has_rest_arg: bool,
    pub is_async: bool,
    /// A `=> expr` body is represented as a single return statement with
    /// `prefer_expr` set.
    pub prefer_expr: bool,
    pub body: Vec<Stmt>,
}

#[derive(Clone, Debug)]
pub struct EBinary {
    pub op: BinOp,
    pub left: Expr,
    pub right: Expr,
}

#[derive(Clone, Debug)]
pub struct ECall {
    pub target: Expr,
    pub args: Vec<Expr>,
    pub optional_chain: OptionalChain,
    /// Call to the unbound name `eval`, which disables renaming in every
    /// enclosing scope.
    pub is_direct_eval: bool,
}

#[derive(Clone, Debug)]
pub struct EConditional {
    pub test: Expr,
    pub yes: Expr,
    pub no: Expr,
}

#[derive(Clone, Debug)]
pub struct EDot {
    pub target: Expr,
    pub name: String,
    pub name_span: Span,
    pub optional_chain: OptionalChain,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EIdentifier {
    pub reference: Ref,
}

#[derive(Clone, Debug)]
pub struct EImportCall {
    pub target: Expr,
    /// Filled when the specifier is a string literal and resolution ran.
    pub import_record_index: Option<u32>,
}

#[derive(Clone, Debug)]
pub struct EIndex {
    pub target: Expr,
    pub index: Expr,
    pub optional_chain: OptionalChain,
}

#[derive(Clone, Debug)]
pub struct ENew {
    pub target: Expr,
    pub args: Vec<Expr>,
}

#[derive(Clone, Debug, Default)]
pub struct EObject {
    pub properties: Vec<Property>,
}

#[derive(Clone, Copy, Debug)]
pub struct ERequireCall {
    pub import_record_index: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct EString {
    pub value: String,
}

impl EString {
    pub fn new(value: impl Into<String>) -> Self {
        EString {
            value: value.into(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ETemplate {
    pub tag: Option<Expr>,
    /// Cooked text before the first substitution.
    pub head: String,
    /// Raw source text of the head, used when printing tagged templates.
    pub head_raw: String,
    pub parts: Vec<TemplatePart>,
}

#[derive(Clone, Debug)]
pub struct TemplatePart {
    pub value: Expr,
    pub tail: String,
    pub tail_raw: String,
}

#[derive(Clone, Debug)]
pub struct EUnary {
    pub op: UnOp,
    pub value: Expr,
}

#[derive(Clone, Debug)]
pub struct EYield {
    pub value: Option<Expr>,
    pub is_star: bool,
}

// =============================================================================
// JSX (present only between pass 1 and the JSX transform)
// =============================================================================

#[derive(Clone, Debug)]
pub struct EJsxElement {
    /// None for fragments (`<>...</>`)
    pub tag: Option<Expr>,
    pub properties: Vec<Property>,
    pub children: Vec<Expr>,
}

// =============================================================================
// Object and class members
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PropertyKind {
    Normal,
    Get,
    Set,
    Spread,
}

#[derive(Clone, Debug)]
pub struct Property {
    pub kind: PropertyKind,
    /// Absent for spread properties.
    pub key: Option<Expr>,
    pub is_computed: bool,
    pub is_method: bool,
    pub is_static: bool,
    /// Shorthand `{x}` keeps the identifier in `value` with this flag set
    /// so the printer can restore the short form.
    pub is_shorthand: bool,
    pub value: Option<Expr>,
    /// Default for destructuring patterns: `{x = 1} = y`
    pub initializer: Option<Expr>,
}

impl Property {
    pub fn spread(value: Expr) -> Self {
        Property {
            kind: PropertyKind::Spread,
            key: None,
            is_computed: false,
            is_method: false,
            is_static: false,
            is_shorthand: false,
            value: Some(value),
            initializer: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Class {
    pub name: Option<Ref>,
    pub extends: Option<Expr>,
    pub members: Vec<ClassMember>,
}

#[derive(Clone, Debug)]
pub enum ClassMember {
    Method(ClassMethod),
    Field(ClassField),
    StaticBlock(Vec<Stmt>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MethodKind {
    Constructor,
    Method,
    Get,
    Set,
}

#[derive(Clone, Debug)]
pub struct ClassMethod {
    pub kind: MethodKind,
    pub key: Expr,
    pub is_computed: bool,
    pub is_static: bool,
    pub func: Func,
}

#[derive(Clone, Debug)]
pub struct ClassField {
    pub key: Expr,
    pub is_computed: bool,
    pub is_static: bool,
    pub value: Option<Expr>,
}

// =============================================================================
// Functions and bindings
// =============================================================================

#[derive(Clone, Debug)]
pub struct Func {
    pub name: Option<Ref>,
    pub args: Vec<Arg>,
    pub has_rest_arg: bool,
    pub is_async: bool,
    pub is_generator: bool,
    pub body: Vec<Stmt>,
}

#[derive(Clone, Debug)]
pub struct Arg {
    pub binding: Binding,
    pub default: Option<Expr>,
    /// TypeScript parameter property modifier (`constructor(public x)`),
    /// expanded into a field assignment during lowering.
    pub is_parameter_property: bool,
}

#[derive(Clone, Debug)]
pub struct Binding {
    pub span: Span,
    pub data: BData,
}

#[derive(Clone, Debug)]
pub enum BData {
    Identifier(Ref),
    Array(BArray),
    Object(BObject),
    /// Elision in an array pattern (`[, x]`)
    Missing,
}

#[derive(Clone, Debug)]
pub struct BArray {
    pub items: Vec<BArrayItem>,
    pub has_spread: bool,
}

#[derive(Clone, Debug)]
pub struct BArrayItem {
    pub binding: Binding,
    pub default: Option<Expr>,
}

#[derive(Clone, Debug)]
pub struct BObject {
    pub properties: Vec<BProperty>,
}

#[derive(Clone, Debug)]
pub struct BProperty {
    pub key: Expr,
    pub is_computed: bool,
    pub is_spread: bool,
    pub binding: Binding,
    pub default: Option<Expr>,
}

// =============================================================================
// Statements
// =============================================================================

#[derive(Clone, Debug)]
pub struct Stmt {
    pub span: Span,
    pub data: SData,
}

impl Stmt {
    pub fn new(span: Span, data: SData) -> Self {
        Stmt { span, data }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LocalKind {
    Var,
    Let,
    Const,
}

#[derive(Clone, Debug)]
pub struct Decl {
    pub binding: Binding,
    pub value: Option<Expr>,
}

#[derive(Clone, Debug)]
pub enum SData {
    Block(Vec<Stmt>),
    Break(Option<Ref>),
    Class(SClass),
    Continue(Option<Ref>),
    Debugger,
    /// A string-literal statement in directive position (`"use strict"`).
    Directive(String),
    DoWhile(Box<SDoWhile>),
    Empty,
    /// TypeScript `enum`, replaced by its lowered form during pass 2.
    Enum(Box<SEnum>),
    /// `export {a, b as c}` with no source
    ExportClause(Vec<ExportItem>),
    ExportDefault(Box<SExportDefault>),
    /// `export {a} from "m"` / `export * as ns from "m"`
    ExportFrom(Box<SExportFrom>),
    /// `export * from "m"`
    ExportStar(SExportStar),
    Expr(Expr),
    For(Box<SFor>),
    ForIn(Box<SForInOf>),
    ForOf(Box<SForInOf>),
    Function(SFunction),
    If(Box<SIf>),
    Import(Box<SImport>),
    Label(Box<SLabel>),
    Local(SLocal),
    /// TypeScript `namespace`, replaced by its lowered form during pass 2.
    Namespace(Box<SNamespace>),
    Return(Option<Expr>),
    Switch(Box<SSwitch>),
    Throw(Expr),
    Try(Box<STry>),
    /// Type-only declaration erased during pass 2.
    TypeScript,
    While(Box<SWhile>),
    With(Box<SWith>),
}

#[derive(Clone, Debug)]
pub struct SClass {
    pub class: Class,
    pub is_export: bool,
}

#[derive(Clone, Debug)]
pub struct SDoWhile {
    pub body: Stmt,
    pub test: Expr,
}

#[derive(Clone, Debug)]
pub struct SEnum {
    pub name: String,
    pub name_ref: Ref,
    pub is_export: bool,
    pub members: Vec<EnumMember>,
}

#[derive(Clone, Debug)]
pub struct EnumMember {
    pub name: String,
    pub value: Option<Expr>,
}

#[derive(Clone, Debug)]
pub struct ExportItem {
    pub name: String,
    pub alias: String,
    pub name_span: Span,
}

#[derive(Clone, Debug)]
pub struct SExportDefault {
    /// The generated symbol holding the default export's identity.
    pub default_name_ref: Ref,
    pub value: ExportDefaultValue,
}

#[derive(Clone, Debug)]
pub enum ExportDefaultValue {
    Expr(Expr),
    Function(Func),
    Class(Class),
}

#[derive(Clone, Debug)]
pub struct SExportFrom {
    pub items: Vec<ExportItem>,
    pub namespace_ref: Ref,
    pub import_record_index: u32,
    /// `export * as ns from "m"` has a star alias instead of items.
    pub star_alias: Option<String>,
}

#[derive(Clone, Debug)]
pub struct SExportStar {
    pub import_record_index: u32,
}

#[derive(Clone, Debug)]
pub struct SFor {
    pub init: Option<Stmt>,
    pub test: Option<Expr>,
    pub update: Option<Expr>,
    pub body: Stmt,
}

#[derive(Clone, Debug)]
pub struct SForInOf {
    /// Either a declaration (`SData::Local`) or an expression target.
    pub init: Stmt,
    pub value: Expr,
    pub body: Stmt,
}

#[derive(Clone, Debug)]
pub struct SFunction {
    pub func: Func,
    pub is_export: bool,
}

#[derive(Clone, Debug)]
pub struct SIf {
    pub test: Expr,
    pub yes: Stmt,
    pub no: Option<Stmt>,
}

#[derive(Clone, Debug)]
pub struct SImport {
    pub import_record_index: u32,
    /// `import def from "m"`
    pub default_name: Option<(Ref, Span)>,
    /// `import {a as b} from "m"`
    pub items: Vec<ImportItem>,
    /// `import * as ns from "m"`; also generated for bare imports so the
    /// linker always has a namespace handle.
    pub namespace_ref: Ref,
    pub star_name_span: Option<Span>,
}

#[derive(Clone, Debug)]
pub struct ImportItem {
    /// Name as exported by the target module.
    pub alias: String,
    pub alias_span: Span,
    /// Local binding.
    pub name_ref: Ref,
}

#[derive(Clone, Debug)]
pub struct SLabel {
    pub name_ref: Ref,
    pub stmt: Stmt,
}

#[derive(Clone, Debug)]
pub struct SLocal {
    pub kind: LocalKind,
    pub decls: Vec<Decl>,
    pub is_export: bool,
}

#[derive(Clone, Debug)]
pub struct SNamespace {
    pub name: String,
    pub name_ref: Ref,
    pub is_export: bool,
    pub body: Vec<Stmt>,
}

#[derive(Clone, Debug)]
pub struct SSwitch {
    pub test: Expr,
    pub cases: Vec<SwitchCase>,
}

#[derive(Clone, Debug)]
pub struct SwitchCase {
    /// None for `default:`
    pub test: Option<Expr>,
    pub body: Vec<Stmt>,
}

#[derive(Clone, Debug)]
pub struct STry {
    pub body: Vec<Stmt>,
    pub catch: Option<Catch>,
    pub finally: Option<Vec<Stmt>>,
}

#[derive(Clone, Debug)]
pub struct Catch {
    pub binding: Option<Binding>,
    pub body: Vec<Stmt>,
}

#[derive(Clone, Debug)]
pub struct SWhile {
    pub test: Expr,
    pub body: Stmt,
}

#[derive(Clone, Debug)]
pub struct SWith {
    pub value: Expr,
    pub body: Stmt,
}

// =============================================================================
// Operators
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnOp {
    Pos,
    Neg,
    Not,
    BitNot,
    TypeOf,
    Void,
    Delete,
    PreInc,
    PreDec,
    PostInc,
    PostDec,
}

impl UnOp {
    #[must_use]
    pub const fn is_prefix(self) -> bool {
        !matches!(self, UnOp::PostInc | UnOp::PostDec)
    }

    /// Operators that read and write their operand.
    #[must_use]
    pub const fn is_update(self) -> bool {
        matches!(
            self,
            UnOp::PreInc | UnOp::PreDec | UnOp::PostInc | UnOp::PostDec
        )
    }

    #[must_use]
    pub const fn text(self) -> &'static str {
        match self {
            UnOp::Pos => "+",
            UnOp::Neg => "-",
            UnOp::Not => "!",
            UnOp::BitNot => "~",
            UnOp::TypeOf => "typeof",
            UnOp::Void => "void",
            UnOp::Delete => "delete",
            UnOp::PreInc | UnOp::PostInc => "++",
            UnOp::PreDec | UnOp::PostDec => "--",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
    Lt,
    Le,
    Gt,
    Ge,
    In,
    InstanceOf,
    Shl,
    Shr,
    UShr,
    LooseEq,
    LooseNe,
    StrictEq,
    StrictNe,
    BitAnd,
    BitOr,
    BitXor,
    LogicalAnd,
    LogicalOr,
    NullishCoalescing,
    Comma,
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    RemAssign,
    PowAssign,
    ShlAssign,
    ShrAssign,
    UShrAssign,
    BitAndAssign,
    BitOrAssign,
    BitXorAssign,
    LogicalAndAssign,
    LogicalOrAssign,
    NullishAssign,
}

impl BinOp {
    #[must_use]
    pub const fn is_assign(self) -> bool {
        matches!(
            self,
            BinOp::Assign
                | BinOp::AddAssign
                | BinOp::SubAssign
                | BinOp::MulAssign
                | BinOp::DivAssign
                | BinOp::RemAssign
                | BinOp::PowAssign
                | BinOp::ShlAssign
                | BinOp::ShrAssign
                | BinOp::UShrAssign
                | BinOp::BitAndAssign
                | BinOp::BitOrAssign
                | BinOp::BitXorAssign
                | BinOp::LogicalAndAssign
                | BinOp::LogicalOrAssign
                | BinOp::NullishAssign
        )
    }

    #[must_use]
    pub const fn text(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Rem => "%",
            BinOp::Pow => "**",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::In => "in",
            BinOp::InstanceOf => "instanceof",
            BinOp::Shl => "<<",
            BinOp::Shr => ">>",
            BinOp::UShr => ">>>",
            BinOp::LooseEq => "==",
            BinOp::LooseNe => "!=",
            BinOp::StrictEq => "===",
            BinOp::StrictNe => "!==",
            BinOp::BitAnd => "&",
            BinOp::BitOr => "|",
            BinOp::BitXor => "^",
            BinOp::LogicalAnd => "&&",
            BinOp::LogicalOr => "||",
            BinOp::NullishCoalescing => "??",
            BinOp::Comma => ",",
            BinOp::Assign => "=",
            BinOp::AddAssign => "+=",
            BinOp::SubAssign => "-=",
            BinOp::MulAssign => "*=",
            BinOp::DivAssign => "/=",
            BinOp::RemAssign => "%=",
            BinOp::PowAssign => "**=",
            BinOp::ShlAssign => "<<=",
            BinOp::ShrAssign => ">>=",
            BinOp::UShrAssign => ">>>=",
            BinOp::BitAndAssign => "&=",
            BinOp::BitOrAssign => "|=",
            BinOp::BitXorAssign => "^=",
            BinOp::LogicalAndAssign => "&&=",
            BinOp::LogicalOrAssign => "||=",
            BinOp::NullishAssign => "??=",
        }
    }
}
