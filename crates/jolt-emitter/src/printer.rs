//! Per-file printing: AST → output text plus a source-map chunk.
//!
//! One printer runs per file, in parallel with the others; nothing here
//! touches shared mutable state. Expression printing threads the parent
//! precedence so parentheses appear only where the tree shape requires
//! them. Statements print without trailing separators; the list printers
//! own the newlines.

use rustc_hash::FxHashMap;

use jolt_common::options::OutputFormat;
use jolt_common::refs::{Ref, SourceIndex};
use jolt_common::source::{LineMap, Source};
use jolt_common::span::Span;

use jolt_lexer::is_valid_identifier;
use jolt_parser::ast::*;
use jolt_parser::ops::Precedence;
use jolt_parser::parts::ImportRecord;
use jolt_parser::symbols::SymbolMap;

use crate::source_map::{Mapping, SourceMapChunk};

#[derive(Clone, Debug, Default)]
pub struct PrintOptions {
    pub minify_whitespace: bool,
    /// Bundle mode strips module statements that the linker rewires and
    /// rewrites `require`/`import()` of bundled modules.
    pub bundle: bool,
    pub format: OutputFormat,
    pub source_map: bool,
}

pub struct PrintArgs<'a> {
    pub symbols: &'a SymbolMap,
    pub import_records: &'a [ImportRecord],
    /// Wrapper closure symbols of bundled CommonJS modules, for
    /// rewriting `require()` into `require_<name>()` calls.
    pub wrappers: &'a FxHashMap<SourceIndex, Ref>,
    /// Replacement specifiers for dynamic imports that now point at
    /// split chunks, keyed by import record index.
    pub dynamic_paths: &'a FxHashMap<u32, String>,
    pub source: Option<&'a Source>,
    pub options: PrintOptions,
}

#[derive(Debug, Default)]
pub struct PrintResult {
    pub text: String,
    pub map: SourceMapChunk,
}

/// Print a statement list (typically one file's live parts).
pub fn print_stmts(stmts: &[&Stmt], args: &PrintArgs<'_>) -> PrintResult {
    let mut printer = Printer::new(args);
    for stmt in stmts {
        let before = printer.out.len();
        printer.print_stmt(stmt);
        if printer.out.len() > before {
            printer.terminate_line();
        }
    }
    printer.finish()
}

pub(crate) struct Printer<'a> {
    pub(crate) out: String,
    pub(crate) map: SourceMapChunk,
    pub(crate) symbols: &'a SymbolMap,
    pub(crate) import_records: &'a [ImportRecord],
    pub(crate) wrappers: &'a FxHashMap<SourceIndex, Ref>,
    pub(crate) dynamic_paths: &'a FxHashMap<u32, String>,
    pub(crate) options: &'a PrintOptions,
    line_map: Option<LineMap>,
    source_text: Option<&'a str>,
    indent: usize,
    line: u32,
    column: u32,
}

impl<'a> Printer<'a> {
    fn new(args: &'a PrintArgs<'a>) -> Self {
        Printer {
            out: String::new(),
            map: SourceMapChunk::new(),
            symbols: args.symbols,
            import_records: args.import_records,
            wrappers: args.wrappers,
            dynamic_paths: args.dynamic_paths,
            options: &args.options,
            line_map: args
                .source
                .filter(|_| args.options.source_map)
                .map(|source| LineMap::new(&source.contents)),
            source_text: args.source.map(|source| source.contents.as_str()),
            indent: 0,
            line: 0,
            column: 0,
        }
    }

    fn finish(self) -> PrintResult {
        PrintResult {
            text: self.out,
            map: self.map,
        }
    }

    // =========================================================================
    // Low-level output
    // =========================================================================

    pub(crate) fn write(&mut self, text: &str) {
        for c in text.chars() {
            if c == '\n' {
                self.line += 1;
                self.column = 0;
            } else {
                self.column += c.len_utf16() as u32;
            }
        }
        self.out.push_str(text);
    }

    pub(crate) fn space(&mut self) {
        if !self.options.minify_whitespace {
            self.write(" ");
        }
    }

    /// Line break plus indentation, inside blocks.
    pub(crate) fn newline(&mut self) {
        if !self.options.minify_whitespace {
            self.write("\n");
            for _ in 0..self.indent {
                self.write("  ");
            }
        }
    }

    /// Line break after a complete top-level statement.
    pub(crate) fn terminate_line(&mut self) {
        if !self.options.minify_whitespace {
            self.write("\n");
        }
    }

    fn indent(&mut self) {
        self.indent += 1;
    }

    fn dedent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    /// Emit a mapping for a source span at the current output position.
    pub(crate) fn map_span(&mut self, span: Span) {
        let (Some(line_map), Some(text)) = (&self.line_map, self.source_text) else {
            return;
        };
        if span.is_dummy() {
            return;
        }
        let position = line_map.position(text, span.start);
        self.map.add(Mapping {
            generated_line: self.line,
            generated_column: self.column,
            original_line: position.line,
            original_column: position.column,
        });
    }

    pub(crate) fn name_of(&self, reference: Ref) -> &'a str {
        // Symbol links are stable by print time; the follow is read-only
        let symbols = self.symbols;
        symbols.name_of(symbols.follow_read(reference))
    }

    // =========================================================================
    // Statements
    // =========================================================================

    pub(crate) fn print_stmt(&mut self, stmt: &Stmt) {
        if !matches!(stmt.data, SData::Empty) {
            self.map_span(stmt.span);
        }
        match &stmt.data {
            SData::Empty => {}
            SData::Debugger => self.write("debugger;"),
            SData::Directive(text) => {
                self.write("\"");
                let escaped = escape_string(text);
                self.write(&escaped);
                self.write("\";");
            }
            SData::Expr(expr) => {
                if starts_statement_ambiguously(expr) {
                    self.write("(");
                    self.print_expr(expr, Precedence::Lowest);
                    self.write(");");
                } else {
                    self.print_expr(expr, Precedence::Lowest);
                    self.write(";");
                }
            }
            SData::Block(stmts) => self.print_block(stmts),
            SData::Local(local) => {
                self.print_local(local);
                self.write(";");
            }
            SData::If(data) => self.print_if(data),
            SData::While(data) => {
                self.write("while");
                self.space();
                self.write("(");
                self.print_expr(&data.test, Precedence::Lowest);
                self.write(")");
                self.print_nested_stmt(&data.body);
            }
            SData::DoWhile(data) => {
                self.write("do");
                match &data.body.data {
                    SData::Block(stmts) => {
                        self.space();
                        self.print_block(stmts);
                        self.space();
                    }
                    _ => {
                        self.write(" ");
                        self.print_stmt(&data.body);
                        self.space();
                    }
                }
                self.write("while");
                self.space();
                self.write("(");
                self.print_expr(&data.test, Precedence::Lowest);
                // The closing semicolon survives whitespace minification:
                // without it a following statement could be pulled into
                // the loop when the output is re-parsed
                self.write(");");
            }
            SData::For(data) => {
                self.write("for");
                self.space();
                self.write("(");
                if let Some(init) = &data.init {
                    self.print_for_init(init);
                }
                self.write(";");
                if let Some(test) = &data.test {
                    self.space();
                    self.print_expr(test, Precedence::Lowest);
                }
                self.write(";");
                if let Some(update) = &data.update {
                    self.space();
                    self.print_expr(update, Precedence::Lowest);
                }
                self.write(")");
                self.print_nested_stmt(&data.body);
            }
            SData::ForIn(data) => {
                self.write("for");
                self.space();
                self.write("(");
                self.print_for_init(&data.init);
                self.write(" in ");
                self.print_expr(&data.value, Precedence::Lowest);
                self.write(")");
                self.print_nested_stmt(&data.body);
            }
            SData::ForOf(data) => {
                self.write("for");
                self.space();
                self.write("(");
                self.print_for_init(&data.init);
                self.write(" of ");
                self.print_expr(&data.value, Precedence::Spread);
                self.write(")");
                self.print_nested_stmt(&data.body);
            }
            SData::Switch(data) => {
                self.write("switch");
                self.space();
                self.write("(");
                self.print_expr(&data.test, Precedence::Lowest);
                self.write(")");
                self.space();
                self.write("{");
                self.indent();
                for case in &data.cases {
                    self.newline();
                    match &case.test {
                        Some(test) => {
                            self.write("case ");
                            self.print_expr(test, Precedence::Lowest);
                            self.write(":");
                        }
                        None => self.write("default:"),
                    }
                    self.indent();
                    for stmt in &case.body {
                        self.newline();
                        self.print_stmt(stmt);
                    }
                    self.dedent();
                }
                self.dedent();
                self.newline();
                self.write("}");
            }
            SData::Try(data) => {
                self.write("try");
                self.space();
                self.print_block(&data.body);
                if let Some(catch) = &data.catch {
                    self.space();
                    self.write("catch");
                    if let Some(binding) = &catch.binding {
                        self.space();
                        self.write("(");
                        self.print_binding(binding);
                        self.write(")");
                    }
                    self.space();
                    self.print_block(&catch.body);
                }
                if let Some(finally) = &data.finally {
                    self.space();
                    self.write("finally");
                    self.space();
                    self.print_block(finally);
                }
            }
            SData::Return(value) => match value {
                Some(value) => {
                    self.write("return ");
                    self.print_expr(value, Precedence::Lowest);
                    self.write(";");
                }
                None => self.write("return;"),
            },
            SData::Throw(value) => {
                self.write("throw ");
                self.print_expr(value, Precedence::Lowest);
                self.write(";");
            }
            SData::Break(label) => match label {
                Some(label) => {
                    self.write("break ");
                    let name = self.name_of(*label);
                    self.write(name);
                    self.write(";");
                }
                None => self.write("break;"),
            },
            SData::Continue(label) => match label {
                Some(label) => {
                    self.write("continue ");
                    let name = self.name_of(*label);
                    self.write(name);
                    self.write(";");
                }
                None => self.write("continue;"),
            },
            SData::Label(data) => {
                let name = self.name_of(data.name_ref);
                self.write(name);
                self.write(":");
                self.space();
                self.print_stmt(&data.stmt);
            }
            SData::With(data) => {
                self.write("with");
                self.space();
                self.write("(");
                self.print_expr(&data.value, Precedence::Lowest);
                self.write(")");
                self.print_nested_stmt(&data.body);
            }
            SData::Function(data) => {
                self.print_fn_decl(&data.func, data.is_export && !self.options.bundle);
            }
            SData::Class(data) => {
                if data.is_export && !self.options.bundle {
                    self.write("export ");
                }
                self.print_class_decl(&data.class);
            }
            SData::Import(data) => self.print_import(stmt.span, data),
            SData::ExportClause(items) => {
                if !self.options.bundle {
                    self.write("export");
                    self.space();
                    self.write("{");
                    for (index, item) in items.iter().enumerate() {
                        if index > 0 {
                            self.write(",");
                        }
                        self.space();
                        self.write(&item.name);
                        if item.alias != item.name {
                            self.write(" as ");
                            self.write(&item.alias);
                        }
                    }
                    self.space();
                    self.write("};");
                }
            }
            SData::ExportDefault(data) => self.print_export_default(data),
            SData::ExportFrom(data) => {
                if !self.options.bundle {
                    self.write("export");
                    self.space();
                    if let Some(alias) = &data.star_alias {
                        self.write("* as ");
                        self.write(alias);
                    } else {
                        self.write("{");
                        for (index, item) in data.items.iter().enumerate() {
                            if index > 0 {
                                self.write(",");
                            }
                            self.space();
                            self.write(&item.name);
                            if item.alias != item.name {
                                self.write(" as ");
                                self.write(&item.alias);
                            }
                        }
                        self.space();
                        self.write("}");
                    }
                    self.write(" from ");
                    self.print_record_specifier(data.import_record_index);
                    self.write(";");
                }
            }
            SData::ExportStar(data) => {
                if !self.options.bundle {
                    self.write("export * from ");
                    self.print_record_specifier(data.import_record_index);
                    self.write(";");
                }
            }
            SData::Enum(_) | SData::Namespace(_) | SData::TypeScript => {
                // Erased or lowered before printing
            }
        }
    }

    /// `for (...)` initializers print without their semicolon.
    fn print_for_init(&mut self, stmt: &Stmt) {
        match &stmt.data {
            SData::Local(local) => self.print_local(local),
            SData::Expr(expr) => self.print_expr(expr, Precedence::Lowest),
            _ => self.print_stmt(stmt),
        }
    }

    fn print_nested_stmt(&mut self, stmt: &Stmt) {
        match &stmt.data {
            SData::Block(stmts) => {
                self.space();
                self.print_block(stmts);
            }
            SData::Empty => self.write(";"),
            _ => {
                self.indent();
                self.newline();
                if self.options.minify_whitespace {
                    // No separator needed after `)` in minified output
                }
                self.print_stmt(stmt);
                self.dedent();
            }
        }
    }

    pub(crate) fn print_block(&mut self, stmts: &[Stmt]) {
        if stmts.is_empty() {
            self.write("{}");
            return;
        }
        self.write("{");
        self.indent();
        for stmt in stmts {
            self.newline();
            self.print_stmt(stmt);
        }
        self.dedent();
        self.newline();
        self.write("}");
    }

    fn print_if(&mut self, data: &SIf) {
        self.write("if");
        self.space();
        self.write("(");
        self.print_expr(&data.test, Precedence::Lowest);
        self.write(")");
        // Brace the branches so dangling-else stays unambiguous
        match &data.yes.data {
            SData::Block(stmts) => {
                self.space();
                self.print_block(stmts);
            }
            _ => {
                self.space();
                let wrapped = [data.yes.clone()];
                self.print_block(&wrapped);
            }
        }
        if let Some(no) = &data.no {
            self.space();
            self.write("else");
            match &no.data {
                SData::Block(stmts) => {
                    self.space();
                    self.print_block(stmts);
                }
                SData::If(nested) => {
                    self.write(" ");
                    self.print_if(nested);
                }
                _ => {
                    self.space();
                    let wrapped = [no.clone()];
                    self.print_block(&wrapped);
                }
            }
        }
    }

    pub(crate) fn print_local(&mut self, local: &SLocal) {
        if local.is_export && !self.options.bundle {
            self.write("export ");
        }
        self.write(match local.kind {
            LocalKind::Var => "var ",
            LocalKind::Let => "let ",
            LocalKind::Const => "const ",
        });
        for (index, decl) in local.decls.iter().enumerate() {
            if index > 0 {
                self.write(",");
                self.space();
            }
            self.print_binding(&decl.binding);
            if let Some(value) = &decl.value {
                self.space();
                self.write("=");
                self.space();
                self.print_expr(value, Precedence::Spread);
            }
        }
    }

    fn print_import(&mut self, span: Span, data: &SImport) {
        let records = self.import_records;
        let record = &records[data.import_record_index as usize];
        if self.options.bundle && !record.is_external && !record.is_unused {
            // Bundled imports are rewired through symbols; nothing prints
            return;
        }
        if record.is_unused {
            return;
        }
        self.map_span(span);

        if self.options.bundle
            && record.is_external
            && self.options.format != OutputFormat::EsModule
        {
            // External import in a require-capable format
            let has_bindings = data.default_name.is_some()
                || data.star_name_span.is_some()
                || !data.items.is_empty();
            if has_bindings {
                self.write("const ");
                let namespace = self.name_of(data.namespace_ref);
                self.write(namespace);
                self.space();
                self.write("=");
                self.space();
            }
            self.write("require(");
            let specifier = record.specifier.clone();
            self.print_string(&specifier);
            self.write(");");
            return;
        }

        self.write("import");
        let mut wrote_binding = false;
        if let Some((default_ref, _)) = data.default_name {
            self.write(" ");
            let name = self.name_of(default_ref);
            self.write(name);
            wrote_binding = true;
        }
        if data.star_name_span.is_some() {
            if wrote_binding {
                self.write(",");
            }
            self.write(" * as ");
            let name = self.name_of(data.namespace_ref);
            self.write(name);
            wrote_binding = true;
        } else if !data.items.is_empty() {
            if wrote_binding {
                self.write(",");
            }
            self.space();
            self.write("{");
            for (index, item) in data.items.iter().enumerate() {
                if index > 0 {
                    self.write(",");
                }
                self.space();
                let local = self.name_of(item.name_ref);
                if local == item.alias {
                    self.write(local);
                } else {
                    self.write(&item.alias);
                    self.write(" as ");
                    self.write(local);
                }
            }
            self.space();
            self.write("}");
            wrote_binding = true;
        }
        if wrote_binding {
            self.write(" from ");
        } else {
            self.write(" ");
        }
        self.print_record_specifier(data.import_record_index);
        self.write(";");
    }

    fn print_export_default(&mut self, data: &SExportDefault) {
        if self.options.bundle {
            // The default value becomes an ordinary declaration; the
            // linker exposes it through the export machinery
            match &data.value {
                ExportDefaultValue::Expr(expr) => {
                    self.write("var ");
                    let name = self.name_of(data.default_name_ref);
                    self.write(name);
                    self.space();
                    self.write("=");
                    self.space();
                    self.print_expr(expr, Precedence::Spread);
                    self.write(";");
                }
                ExportDefaultValue::Function(func) => {
                    if func.name.is_some() {
                        self.print_fn_decl(func, false);
                    } else {
                        let mut named = func.clone();
                        named.name = Some(data.default_name_ref);
                        self.print_fn_decl(&named, false);
                    }
                }
                ExportDefaultValue::Class(class) => {
                    if class.name.is_some() {
                        self.print_class_decl(class);
                    } else {
                        let mut named = class.clone();
                        named.name = Some(data.default_name_ref);
                        self.print_class_decl(&named);
                    }
                }
            }
            return;
        }

        self.write("export default ");
        match &data.value {
            ExportDefaultValue::Expr(expr) => {
                self.print_expr(expr, Precedence::Spread);
                self.write(";");
            }
            ExportDefaultValue::Function(func) => self.print_fn_decl(func, false),
            ExportDefaultValue::Class(class) => self.print_class_decl(class),
        }
    }

    fn print_record_specifier(&mut self, record_index: u32) {
        let records = self.import_records;
        let specifier = records[record_index as usize].specifier.clone();
        self.print_string(&specifier);
    }

    pub(crate) fn print_fn_decl(&mut self, func: &Func, is_export: bool) {
        if is_export {
            self.write("export ");
        }
        if func.is_async {
            self.write("async ");
        }
        self.write("function");
        if func.is_generator {
            self.write("*");
        }
        if let Some(name) = func.name {
            self.write(" ");
            let name = self.name_of(name);
            self.write(name);
        }
        self.print_fn_args_and_body(func);
    }

    pub(crate) fn print_fn_args_and_body(&mut self, func: &Func) {
        self.write("(");
        for (index, arg) in func.args.iter().enumerate() {
            if index > 0 {
                self.write(",");
                self.space();
            }
            if func.has_rest_arg && index == func.args.len() - 1 {
                self.write("...");
            }
            self.print_binding(&arg.binding);
            if let Some(default) = &arg.default {
                self.space();
                self.write("=");
                self.space();
                self.print_expr(default, Precedence::Spread);
            }
        }
        self.write(")");
        self.space();
        self.print_block(&func.body);
    }

    pub(crate) fn print_class_decl(&mut self, class: &Class) {
        self.write("class");
        if let Some(name) = class.name {
            self.write(" ");
            let name = self.name_of(name);
            self.write(name);
        }
        if let Some(extends) = &class.extends {
            self.write(" extends ");
            self.print_expr(extends, Precedence::New);
        }
        self.space();
        if class.members.is_empty() {
            self.write("{}");
            return;
        }
        self.write("{");
        self.indent();
        for member in &class.members {
            self.newline();
            match member {
                ClassMember::Method(method) => {
                    if method.is_static {
                        self.write("static ");
                    }
                    match method.kind {
                        MethodKind::Get => self.write("get "),
                        MethodKind::Set => self.write("set "),
                        _ => {}
                    }
                    if method.func.is_async {
                        self.write("async ");
                    }
                    if method.func.is_generator {
                        self.write("*");
                    }
                    self.print_property_key(&method.key, method.is_computed);
                    self.print_fn_args_and_body(&method.func);
                }
                ClassMember::Field(field) => {
                    if field.is_static {
                        self.write("static ");
                    }
                    self.print_property_key(&field.key, field.is_computed);
                    if let Some(value) = &field.value {
                        self.space();
                        self.write("=");
                        self.space();
                        self.print_expr(value, Precedence::Spread);
                    }
                    self.write(";");
                }
                ClassMember::StaticBlock(body) => {
                    self.write("static");
                    self.space();
                    self.print_block(body);
                }
            }
        }
        self.dedent();
        self.newline();
        self.write("}");
    }

    pub(crate) fn print_property_key(&mut self, key: &Expr, is_computed: bool) {
        if is_computed {
            self.write("[");
            self.print_expr(key, Precedence::Spread);
            self.write("]");
            return;
        }
        match &key.data {
            EData::String(string) if is_valid_identifier(&string.value) => {
                self.write(&string.value);
            }
            EData::String(string) => self.print_string(&string.value),
            EData::Number(value) => self.print_number(*value),
            EData::PrivateIdentifier(identifier) => {
                let name = self.name_of(identifier.reference);
                self.write(name);
            }
            _ => self.print_expr(key, Precedence::Spread),
        }
    }

    pub(crate) fn print_binding(&mut self, binding: &Binding) {
        self.map_span(binding.span);
        match &binding.data {
            BData::Identifier(reference) => {
                let name = self.name_of(*reference);
                self.write(name);
            }
            BData::Missing => {}
            BData::Array(array) => {
                self.write("[");
                for (index, item) in array.items.iter().enumerate() {
                    if index > 0 {
                        self.write(",");
                        self.space();
                    }
                    if array.has_spread && index == array.items.len() - 1 {
                        self.write("...");
                    }
                    self.print_binding(&item.binding);
                    if let Some(default) = &item.default {
                        self.space();
                        self.write("=");
                        self.space();
                        self.print_expr(default, Precedence::Spread);
                    }
                }
                self.write("]");
            }
            BData::Object(object) => {
                self.write("{");
                for (index, property) in object.properties.iter().enumerate() {
                    if index > 0 {
                        self.write(",");
                    }
                    self.space();
                    if property.is_spread {
                        self.write("...");
                        self.print_binding(&property.binding);
                        continue;
                    }
                    // Shorthand when the key names the binding directly
                    let shorthand = match (&property.key.data, &property.binding.data) {
                        (EData::String(key), BData::Identifier(reference)) => {
                            !property.is_computed && self.name_of(*reference) == key.value
                        }
                        _ => false,
                    };
                    if !shorthand {
                        self.print_property_key(&property.key, property.is_computed);
                        self.write(":");
                        self.space();
                    }
                    self.print_binding(&property.binding);
                    if let Some(default) = &property.default {
                        self.space();
                        self.write("=");
                        self.space();
                        self.print_expr(default, Precedence::Spread);
                    }
                }
                self.space();
                self.write("}");
            }
        }
    }
}

/// Expression statements must not begin with tokens that change the
/// statement's meaning (`{`, `function`, `class`).
fn starts_statement_ambiguously(expr: &Expr) -> bool {
    let mut current = expr;
    loop {
        match &current.data {
            EData::Object(_) | EData::Function(_) | EData::Class(_) => return true,
            EData::Binary(binary) => current = &binary.left,
            EData::Call(call) => current = &call.target,
            EData::Dot(dot) => current = &dot.target,
            EData::Index(index) => current = &index.target,
            EData::Conditional(cond) => current = &cond.test,
            EData::Template(template) => match &template.tag {
                Some(tag) => current = tag,
                None => return false,
            },
            _ => return false,
        }
    }
}

pub(crate) fn escape_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{b}' => out.push_str("\\v"),
            '\u{c}' => out.push_str("\\f"),
            '\0' => out.push_str("\\0"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out
}
