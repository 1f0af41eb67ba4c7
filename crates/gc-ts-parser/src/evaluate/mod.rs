//! Static evaluation of a module's default export.
//!
//! Gallery modules are data: a default export built from object and array
//! literals, local `const` tables, template strings, and a handful of array
//! helpers. This module reduces that data to a [`StaticValue`] tree without
//! executing anything. Functions and JSX stay opaque and are returned as
//! handles to their source span.
//!
//! Supported forms:
//!
//! | Form | Example |
//! |------|---------|
//! | Literals | `"a"`, `` `x-${id}` ``, `1`, `true`, `null`, `undefined` |
//! | Object / array literals | `{ a, b: 1, [key]: v, ...base }`, `[...xs, y]` |
//! | Top-level bindings | `const STATES = [..]` (lazy, cycle-checked) |
//! | Wrappers | `(x)`, `x as T`, `x satisfies T`, `x!` |
//! | Identity helpers | `defineGallerySection(x)`, `Object.freeze(x)` |
//! | Member access | `spec.props?.length`, `MAP[key]` |
//! | Operators | `a ?? b`, `a \|\| b`, `a && b`, `a === b`, `c ? a : b`, `!a`, `a + b` |
//! | Array methods | `map`, `flatMap`, `filter`, `find`, `some`, `every`, `concat`, `slice`, `join`, `includes`, `flat` |
//! | `Object` statics | `entries`, `keys`, `values`, `assign`, `fromEntries` |
//!
//! Callbacks passed to array methods may destructure their parameters and
//! use either an expression body or a block of `const` declarations,
//! `if` statements and a `return`.

mod builtins;

use camino::Utf8Path;
use gc_core::RenderHandle;
use rustc_hash::{FxHashMap, FxHashSet};
use tree_sitter::{Node, Tree};

use crate::error::EvalError;
use crate::node::{decode_escape, has_token, node_location, node_text, string_value};
use crate::value::{format_number, ObjectValue, StaticValue};

use self::builtins::{compare, loose_eq, object_static};

/// Maximum nesting of expressions and calls before evaluation gives up.
const MAX_DEPTH: usize = 512;

/// Longest snippet of source text kept in an error.
const SNIPPET_LEN: usize = 60;

/// Evaluates the default export of a parsed module.
///
/// `identity_calls` lists callees (as written, e.g. `Object.freeze`) whose
/// result is their first argument.
///
/// # Errors
///
/// Returns [`EvalError::NoDefaultExport`] if the module has no default
/// export, or the first evaluation failure encountered.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use gc_ts_parser::{evaluate_default_export, ScriptKind, StaticValue, TsParser};
///
/// let source = r#"
/// const TONES = ["neutral", "accent"];
/// export default { id: "misc", tones: TONES.map((tone) => `tone-${tone}`) };
/// "#;
/// let mut parser = TsParser::for_kind(ScriptKind::TypeScript)?;
/// let tree = parser.parse(source)?;
/// let value = evaluate_default_export(&tree, source, Utf8Path::new("a.ts"), &[])
///     .expect("evaluates");
///
/// let tones = value.property("tones").expect("object");
/// assert_eq!(tones.property("1"), Some(StaticValue::String("tone-accent".into())));
/// # Ok::<(), gc_ts_parser::ParseError>(())
/// ```
pub fn evaluate_default_export(
    tree: &Tree,
    source: &str,
    file: &Utf8Path,
    identity_calls: &[String],
) -> Result<StaticValue, EvalError> {
    let mut evaluator = ModuleEvaluator::new(tree.root_node(), source.as_bytes(), file, identity_calls);
    let default = evaluator
        .collect_bindings()
        .ok_or(EvalError::NoDefaultExport)?;
    evaluator.eval(default, &Scope::default())
}

/// What a top-level name is bound to.
#[derive(Debug, Clone, Copy)]
enum Binding<'t> {
    /// `const x = <init>` / `let` / `var`, evaluated on first use.
    Variable(Node<'t>),
    /// `function f() {}` / `class C {}`.
    Callable(Node<'t>),
    /// Any imported name. Evaluation never crosses module boundaries.
    Import,
}

/// Local variables of a function call or block.
#[derive(Debug, Default)]
struct Scope<'p> {
    vars: FxHashMap<String, StaticValue>,
    parent: Option<&'p Scope<'p>>,
}

impl Scope<'_> {
    fn child(&self) -> Scope<'_> {
        Scope {
            vars: FxHashMap::default(),
            parent: Some(self),
        }
    }

    fn lookup(&self, name: &str) -> Option<&StaticValue> {
        let mut scope = Some(self);
        while let Some(current) = scope {
            if let Some(value) = current.vars.get(name) {
                return Some(value);
            }
            scope = current.parent;
        }
        None
    }

    fn declare(&mut self, name: impl Into<String>, value: StaticValue) {
        self.vars.insert(name.into(), value);
    }
}

/// A function ready to be applied, with the scope it closes over.
#[derive(Clone, Copy)]
enum Callback<'t> {
    /// A function written inline at the call site; closes over the caller.
    Inline(Node<'t>),
    /// A function reached through a binding; closes over module scope only.
    Bound(Node<'t>),
    /// The global `Boolean`, as in `.filter(Boolean)`.
    Truthy,
}

struct ModuleEvaluator<'t> {
    root: Node<'t>,
    source: &'t [u8],
    file: &'t Utf8Path,
    identity_calls: &'t [String],
    bindings: FxHashMap<&'t str, Binding<'t>>,
    memo: FxHashMap<&'t str, StaticValue>,
    in_progress: FxHashSet<&'t str>,
    depth: usize,
}

impl<'t> ModuleEvaluator<'t> {
    fn new(root: Node<'t>, source: &'t [u8], file: &'t Utf8Path, identity_calls: &'t [String]) -> Self {
        Self {
            root,
            source,
            file,
            identity_calls,
            bindings: FxHashMap::default(),
            memo: FxHashMap::default(),
            in_progress: FxHashSet::default(),
            depth: 0,
        }
    }

    // =========================================================================
    // Module scope
    // =========================================================================

    /// Records top-level bindings and returns the default export node.
    fn collect_bindings(&mut self) -> Option<Node<'t>> {
        let mut default = None;
        let mut cursor = self.root.walk();
        let statements: Vec<_> = self.root.named_children(&mut cursor).collect();

        for statement in statements {
            match statement.kind() {
                "import_statement" => self.bind_imports(statement),
                "export_statement" => {
                    if has_token(statement, "default") {
                        default = statement
                            .child_by_field_name("declaration")
                            .or_else(|| statement.child_by_field_name("value"));
                        if let Some(declaration) = statement.child_by_field_name("declaration") {
                            self.bind_declaration(declaration);
                        }
                    } else if let Some(declaration) = statement.child_by_field_name("declaration") {
                        self.bind_declaration(declaration);
                    }
                }
                _ => self.bind_declaration(statement),
            }
        }
        default
    }

    fn bind_declaration(&mut self, declaration: Node<'t>) {
        match declaration.kind() {
            "lexical_declaration" | "variable_declaration" => {
                let mut cursor = declaration.walk();
                for declarator in declaration.named_children(&mut cursor) {
                    let (Some(name), Some(value)) = (
                        declarator.child_by_field_name("name"),
                        declarator.child_by_field_name("value"),
                    ) else {
                        continue;
                    };
                    if name.kind() != "identifier" {
                        continue;
                    }
                    if let Some(name) = node_text(name, self.source) {
                        self.bindings.insert(name, Binding::Variable(value));
                    }
                }
            }
            "function_declaration" | "generator_function_declaration" | "class_declaration" => {
                if let Some(name) = declaration
                    .child_by_field_name("name")
                    .and_then(|name| node_text(name, self.source))
                {
                    self.bindings.insert(name, Binding::Callable(declaration));
                }
            }
            _ => {}
        }
    }

    fn bind_imports(&mut self, statement: Node<'t>) {
        let mut cursor = statement.walk();
        let Some(clause) = statement
            .named_children(&mut cursor)
            .find(|child| child.kind() == "import_clause")
        else {
            return;
        };

        let mut locals = Vec::new();
        let mut clause_cursor = clause.walk();
        for binding in clause.named_children(&mut clause_cursor) {
            match binding.kind() {
                "identifier" => locals.push(binding),
                "namespace_import" => {
                    let mut inner = binding.walk();
                    locals.extend(
                        binding
                            .named_children(&mut inner)
                            .filter(|n| n.kind() == "identifier"),
                    );
                }
                "named_imports" => {
                    let mut inner = binding.walk();
                    for specifier in binding.named_children(&mut inner) {
                        if let Some(local) = specifier
                            .child_by_field_name("alias")
                            .or_else(|| specifier.child_by_field_name("name"))
                        {
                            locals.push(local);
                        }
                    }
                }
                _ => {}
            }
        }

        for local in locals {
            if let Some(name) = node_text(local, self.source) {
                self.bindings.insert(name, Binding::Import);
            }
        }
    }

    fn lookup_binding(&mut self, name: &'t str, at: Node<'t>) -> Result<StaticValue, EvalError> {
        if let Some(value) = self.memo.get(name) {
            return Ok(value.clone());
        }
        let Some(binding) = self.bindings.get(name).copied() else {
            return Err(EvalError::Unresolved {
                location: node_location(at),
                name: name.to_owned(),
            });
        };

        match binding {
            Binding::Variable(init) => {
                if !self.in_progress.insert(name) {
                    return Err(EvalError::Cycle {
                        location: node_location(at),
                        name: name.to_owned(),
                    });
                }
                let result = self.eval(init, &Scope::default());
                self.in_progress.remove(name);
                let value = result?;
                self.memo.insert(name, value.clone());
                Ok(value)
            }
            Binding::Callable(node) => Ok(StaticValue::Function(self.handle(node))),
            Binding::Import => Err(EvalError::Unresolved {
                location: node_location(at),
                name: name.to_owned(),
            }),
        }
    }

    fn lookup_identifier(
        &mut self,
        name: &'t str,
        at: Node<'t>,
        scope: &Scope<'_>,
    ) -> Result<StaticValue, EvalError> {
        if let Some(value) = scope.lookup(name) {
            return Ok(value.clone());
        }
        match name {
            "undefined" if !self.bindings.contains_key(name) => Ok(StaticValue::Undefined),
            "NaN" if !self.bindings.contains_key(name) => Ok(StaticValue::Number(f64::NAN)),
            "Infinity" if !self.bindings.contains_key(name) => Ok(StaticValue::Number(f64::INFINITY)),
            _ => self.lookup_binding(name, at),
        }
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn eval(&mut self, node: Node<'t>, scope: &Scope<'_>) -> Result<StaticValue, EvalError> {
        if self.depth >= MAX_DEPTH {
            return Err(type_error(node, "expression nesting too deep"));
        }
        self.depth += 1;
        let result = self.eval_node(node, scope);
        self.depth -= 1;
        result
    }

    fn eval_node(&mut self, node: Node<'t>, scope: &Scope<'_>) -> Result<StaticValue, EvalError> {
        match node.kind() {
            "parenthesized_expression" | "as_expression" | "satisfies_expression" | "non_null_expression" => {
                let inner = first_expression(node).ok_or_else(|| self.unsupported(node))?;
                self.eval(inner, scope)
            }
            // `<T>value`
            "type_assertion" => {
                let mut cursor = node.walk();
                let inner = node
                    .named_children(&mut cursor)
                    .filter(|n| n.kind() != "comment")
                    .last()
                    .ok_or_else(|| self.unsupported(node))?;
                self.eval(inner, scope)
            }
            "string" => string_value(node, self.source)
                .map(StaticValue::String)
                .ok_or_else(|| self.unsupported(node)),
            "template_string" => self.eval_template(node, scope),
            "number" => {
                let text = self.text(node)?;
                parse_number(text)
                    .map(StaticValue::Number)
                    .ok_or_else(|| type_error(node, format!("invalid number literal `{text}`")))
            }
            "true" => Ok(StaticValue::Bool(true)),
            "false" => Ok(StaticValue::Bool(false)),
            "null" => Ok(StaticValue::Null),
            "undefined" => Ok(StaticValue::Undefined),
            "identifier" => {
                let name = self.text(node)?;
                self.lookup_identifier(name, node, scope)
            }
            "object" => self.eval_object(node, scope),
            "array" => self.eval_array(node, scope),
            "arrow_function"
            | "function_expression"
            | "function"
            | "generator_function"
            | "function_declaration"
            | "generator_function_declaration"
            | "class"
            | "class_declaration" => Ok(StaticValue::Function(self.handle(node))),
            "jsx_element" | "jsx_self_closing_element" | "jsx_fragment" => {
                Ok(StaticValue::Element(self.handle(node)))
            }
            "member_expression" => {
                let object = field(node, "object")?;
                let property = self.text(field(node, "property")?)?;
                let receiver = self.eval(object, scope)?;
                read_property(&receiver, property, is_optional_chain(node), node)
            }
            "subscript_expression" => {
                let object = field(node, "object")?;
                let index = field(node, "index")?;
                let receiver = self.eval(object, scope)?;
                let key = self.eval(index, scope)?;
                let key = key_string(&key, index)?;
                read_property(&receiver, &key, is_optional_chain(node), node)
            }
            "call_expression" => self.eval_call(node, scope),
            "ternary_expression" => {
                let condition = self.eval(field(node, "condition")?, scope)?;
                let branch = if condition.is_truthy() {
                    field(node, "consequence")?
                } else {
                    field(node, "alternative")?
                };
                self.eval(branch, scope)
            }
            "unary_expression" => self.eval_unary(node, scope),
            "binary_expression" => self.eval_binary(node, scope),
            _ => Err(self.unsupported(node)),
        }
    }

    fn eval_template(&mut self, node: Node<'t>, scope: &Scope<'_>) -> Result<StaticValue, EvalError> {
        let mut out = String::new();
        // Text between the backticks is copied verbatim, except escapes and
        // substitutions.
        let mut position = node.start_byte() + 1;
        let end = node.end_byte().saturating_sub(1);

        let mut cursor = node.walk();
        let parts: Vec<_> = node.named_children(&mut cursor).collect();
        for part in parts {
            match part.kind() {
                "escape_sequence" => {
                    out.push_str(self.slice(position, part.start_byte(), node)?);
                    decode_escape(self.text(part)?, &mut out);
                    position = part.end_byte();
                }
                "template_substitution" => {
                    out.push_str(self.slice(position, part.start_byte(), node)?);
                    let expression = first_expression(part).ok_or_else(|| self.unsupported(part))?;
                    let value = self.eval(expression, scope)?;
                    let text = value.to_js_string().ok_or_else(|| {
                        type_error(expression, format!("cannot interpolate a {}", value.type_name()))
                    })?;
                    out.push_str(&text);
                    position = part.end_byte();
                }
                _ => {}
            }
        }
        if position < end {
            out.push_str(self.slice(position, end, node)?);
        }
        Ok(StaticValue::String(out))
    }

    fn eval_object(&mut self, node: Node<'t>, scope: &Scope<'_>) -> Result<StaticValue, EvalError> {
        let mut object = ObjectValue::new();
        let mut cursor = node.walk();
        let members: Vec<_> = node.named_children(&mut cursor).collect();

        for member in members {
            match member.kind() {
                "comment" => {}
                "pair" => {
                    let key = self.property_key(field(member, "key")?, scope)?;
                    let value = self.eval(field(member, "value")?, scope)?;
                    object.insert(key, value);
                }
                "shorthand_property_identifier" => {
                    let name = self.text(member)?;
                    let value = self.lookup_identifier(name, member, scope)?;
                    object.insert(name, value);
                }
                "spread_element" => {
                    let inner = first_expression(member).ok_or_else(|| self.unsupported(member))?;
                    match self.eval(inner, scope)? {
                        StaticValue::Object(other) => object.extend_from(&other),
                        StaticValue::Array(items) => {
                            for (index, item) in items.into_iter().enumerate() {
                                object.insert(index.to_string(), item);
                            }
                        }
                        // Spreading primitives copies nothing
                        _ => {}
                    }
                }
                "method_definition" => {
                    let key = self.property_key(field(member, "name")?, scope)?;
                    object.insert(key, StaticValue::Function(self.handle(member)));
                }
                _ => return Err(self.unsupported(member)),
            }
        }
        Ok(StaticValue::Object(object))
    }

    fn eval_array(&mut self, node: Node<'t>, scope: &Scope<'_>) -> Result<StaticValue, EvalError> {
        let mut items = Vec::new();
        let mut cursor = node.walk();
        let elements: Vec<_> = node.named_children(&mut cursor).collect();

        for element in elements {
            match element.kind() {
                "comment" => {}
                "spread_element" => {
                    let inner = first_expression(element).ok_or_else(|| self.unsupported(element))?;
                    match self.eval(inner, scope)? {
                        StaticValue::Array(spread) => items.extend(spread),
                        StaticValue::String(s) => {
                            items.extend(s.chars().map(|c| StaticValue::String(c.to_string())));
                        }
                        other => {
                            return Err(type_error(
                                inner,
                                format!("cannot spread a {} into an array", other.type_name()),
                            ));
                        }
                    }
                }
                _ => items.push(self.eval(element, scope)?),
            }
        }
        Ok(StaticValue::Array(items))
    }

    fn eval_unary(&mut self, node: Node<'t>, scope: &Scope<'_>) -> Result<StaticValue, EvalError> {
        let operator = self.text(field(node, "operator")?)?;
        let argument = self.eval(field(node, "argument")?, scope)?;
        match operator {
            "!" => Ok(StaticValue::Bool(!argument.is_truthy())),
            "-" => Ok(StaticValue::Number(-argument.to_number())),
            "+" => Ok(StaticValue::Number(argument.to_number())),
            "void" => Ok(StaticValue::Undefined),
            _ => Err(self.unsupported(node)),
        }
    }

    fn eval_binary(&mut self, node: Node<'t>, scope: &Scope<'_>) -> Result<StaticValue, EvalError> {
        let operator = self.text(field(node, "operator")?)?;
        let left = self.eval(field(node, "left")?, scope)?;

        // Short-circuit operators evaluate the right side lazily
        match operator {
            "&&" if !left.is_truthy() => return Ok(left),
            "||" if left.is_truthy() => return Ok(left),
            "??" if !left.is_nullish() => return Ok(left),
            "&&" | "||" | "??" => return self.eval(field(node, "right")?, scope),
            _ => {}
        }

        let right = self.eval(field(node, "right")?, scope)?;
        Ok(match operator {
            "+" => {
                let concat = |v: &StaticValue| {
                    matches!(
                        v,
                        StaticValue::String(_) | StaticValue::Array(_) | StaticValue::Object(_)
                    )
                };
                if concat(&left) || concat(&right) {
                    let (Some(l), Some(r)) = (left.to_js_string(), right.to_js_string()) else {
                        return Err(type_error(node, "cannot concatenate a function or JSX element"));
                    };
                    StaticValue::String(l + &r)
                } else {
                    StaticValue::Number(left.to_number() + right.to_number())
                }
            }
            "-" => StaticValue::Number(left.to_number() - right.to_number()),
            "*" => StaticValue::Number(left.to_number() * right.to_number()),
            "/" => StaticValue::Number(left.to_number() / right.to_number()),
            "%" => StaticValue::Number(left.to_number() % right.to_number()),
            "**" => StaticValue::Number(left.to_number().powf(right.to_number())),
            "===" => StaticValue::Bool(left.strict_eq(&right)),
            "!==" => StaticValue::Bool(!left.strict_eq(&right)),
            "==" => StaticValue::Bool(loose_eq(&left, &right)),
            "!=" => StaticValue::Bool(!loose_eq(&left, &right)),
            "<" | ">" | "<=" | ">=" => StaticValue::Bool(compare(operator, &left, &right)),
            _ => return Err(self.unsupported(node)),
        })
    }

    fn property_key(&mut self, key: Node<'t>, scope: &Scope<'_>) -> Result<String, EvalError> {
        match key.kind() {
            "property_identifier" | "identifier" | "private_property_identifier" => {
                Ok(self.text(key)?.to_owned())
            }
            "string" => string_value(key, self.source).ok_or_else(|| self.unsupported(key)),
            "number" => {
                let text = self.text(key)?;
                parse_number(text)
                    .map(format_number)
                    .ok_or_else(|| type_error(key, format!("invalid number literal `{text}`")))
            }
            "computed_property_name" => {
                let inner = first_expression(key).ok_or_else(|| self.unsupported(key))?;
                let value = self.eval(inner, scope)?;
                key_string(&value, inner)
            }
            _ => Err(self.unsupported(key)),
        }
    }

    // =========================================================================
    // Calls
    // =========================================================================

    fn eval_call(&mut self, node: Node<'t>, scope: &Scope<'_>) -> Result<StaticValue, EvalError> {
        let callee = field(node, "function")?;
        let arguments = field(node, "arguments")?;
        // Tagged templates
        if arguments.kind() != "arguments" {
            return Err(self.unsupported(node));
        }
        let args = expressions(arguments);

        let callee_text = self.text(callee)?;
        if self.identity_calls.iter().any(|name| name == callee_text) {
            return match args.first() {
                Some(first) => self.eval(*first, scope),
                None => Ok(StaticValue::Undefined),
            };
        }

        if callee.kind() != "member_expression" {
            let callback = self.resolve_callback(callee, scope)?;
            let values = self.eval_all(&args, scope)?;
            return self.apply(callback, values, scope, node);
        }

        let object = field(callee, "object")?;
        let method = self.text(field(callee, "property")?)?;

        if object.kind() == "identifier"
            && self.text(object)? == "Object"
            && scope.lookup("Object").is_none()
            && !self.bindings.contains_key("Object")
        {
            let values = self.eval_all(&args, scope)?;
            return object_static(method, values, node);
        }

        let receiver = self.eval(object, scope)?;
        if receiver.is_nullish() && is_optional_chain(callee) {
            return Ok(StaticValue::Undefined);
        }
        match receiver {
            StaticValue::Array(items) => self.array_method(items, method, &args, scope, node),
            StaticValue::String(s) => self.string_method(&s, method, &args, scope, node),
            other => Err(type_error(
                node,
                format!("`{method}` is not a supported method of {}", other.type_name()),
            )),
        }
    }

    fn eval_all(&mut self, nodes: &[Node<'t>], scope: &Scope<'_>) -> Result<Vec<StaticValue>, EvalError> {
        nodes.iter().map(|node| self.eval(*node, scope)).collect()
    }

    /// Turns a callee or callback argument into something [`apply`] can run.
    ///
    /// [`apply`]: Self::apply
    fn resolve_callback(&mut self, node: Node<'t>, scope: &Scope<'_>) -> Result<Callback<'t>, EvalError> {
        if is_function_kind(node.kind()) {
            return Ok(Callback::Inline(node));
        }
        if node.kind() == "identifier"
            && self.text(node)? == "Boolean"
            && scope.lookup("Boolean").is_none()
            && !self.bindings.contains_key("Boolean")
        {
            return Ok(Callback::Truthy);
        }
        match self.eval(node, scope)? {
            StaticValue::Function(handle) => self
                .function_node(&handle)
                .map(Callback::Bound)
                .ok_or_else(|| type_error(node, "function is not callable during static evaluation")),
            other => Err(type_error(node, format!("a {} is not callable", other.type_name()))),
        }
    }

    fn apply(
        &mut self,
        callback: Callback<'t>,
        args: Vec<StaticValue>,
        scope: &Scope<'_>,
        call_site: Node<'t>,
    ) -> Result<StaticValue, EvalError> {
        match callback {
            Callback::Truthy => Ok(StaticValue::Bool(
                args.first().is_some_and(StaticValue::is_truthy),
            )),
            Callback::Inline(func) => self.call_function(func, scope, args, call_site),
            Callback::Bound(func) => self.call_function(func, &Scope::default(), args, call_site),
        }
    }

    fn call_function(
        &mut self,
        func: Node<'t>,
        closure: &Scope<'_>,
        args: Vec<StaticValue>,
        call_site: Node<'t>,
    ) -> Result<StaticValue, EvalError> {
        if self.depth >= MAX_DEPTH {
            return Err(type_error(call_site, "call stack too deep"));
        }
        if !matches!(
            func.kind(),
            "arrow_function" | "function_expression" | "function" | "function_declaration"
        ) {
            return Err(type_error(call_site, format!("cannot call a {}", func.kind())));
        }

        let mut frame = closure.child();
        if let Some(param) = func.child_by_field_name("parameter") {
            let name = self.text(param)?;
            frame.declare(name, args.into_iter().next().unwrap_or(StaticValue::Undefined));
        } else if let Some(params) = func.child_by_field_name("parameters") {
            self.bind_parameters(params, args, &mut frame)?;
        }

        let body = field(func, "body")?;
        self.depth += 1;
        let result = if body.kind() == "statement_block" {
            self.exec_block(body, &mut frame)
                .map(|returned| returned.unwrap_or(StaticValue::Undefined))
        } else {
            self.eval(body, &frame)
        };
        self.depth -= 1;
        result
    }

    fn bind_parameters(
        &mut self,
        params: Node<'t>,
        args: Vec<StaticValue>,
        frame: &mut Scope<'_>,
    ) -> Result<(), EvalError> {
        let mut args = args.into_iter();
        for param in expressions(params) {
            let (pattern, default) = match param.kind() {
                "required_parameter" | "optional_parameter" => {
                    (field(param, "pattern")?, param.child_by_field_name("value"))
                }
                _ => (param, None),
            };

            if pattern.kind() == "rest_pattern" {
                let rest = StaticValue::Array(args.by_ref().collect());
                let inner = first_expression(pattern).ok_or_else(|| self.unsupported(pattern))?;
                self.bind_pattern(inner, rest, frame)?;
                continue;
            }

            let mut value = args.next().unwrap_or(StaticValue::Undefined);
            if matches!(value, StaticValue::Undefined) {
                if let Some(default) = default {
                    value = self.eval(default, frame)?;
                }
            }
            self.bind_pattern(pattern, value, frame)?;
        }
        Ok(())
    }

    fn bind_pattern(
        &mut self,
        pattern: Node<'t>,
        value: StaticValue,
        frame: &mut Scope<'_>,
    ) -> Result<(), EvalError> {
        match pattern.kind() {
            "identifier" | "shorthand_property_identifier_pattern" => {
                frame.declare(self.text(pattern)?, value);
            }
            "assignment_pattern" | "object_assignment_pattern" => {
                let left = field(pattern, "left")?;
                let value = if matches!(value, StaticValue::Undefined) {
                    self.eval(field(pattern, "right")?, frame)?
                } else {
                    value
                };
                self.bind_pattern(left, value, frame)?;
            }
            "rest_pattern" => {
                let inner = first_expression(pattern).ok_or_else(|| self.unsupported(pattern))?;
                self.bind_pattern(inner, value, frame)?;
            }
            "object_pattern" => self.bind_object_pattern(pattern, &value, frame)?,
            "array_pattern" => {
                let Some(items) = value.as_array() else {
                    return Err(type_error(
                        pattern,
                        format!("cannot destructure a {} as an array", value.type_name()),
                    ));
                };
                let mut index = 0;
                for element in expressions(pattern) {
                    if element.kind() == "rest_pattern" {
                        let rest = StaticValue::Array(items.get(index..).unwrap_or_default().to_vec());
                        self.bind_pattern(element, rest, frame)?;
                        break;
                    }
                    let item = items.get(index).cloned().unwrap_or(StaticValue::Undefined);
                    self.bind_pattern(element, item, frame)?;
                    index += 1;
                }
            }
            _ => return Err(self.unsupported(pattern)),
        }
        Ok(())
    }

    fn bind_object_pattern(
        &mut self,
        pattern: Node<'t>,
        value: &StaticValue,
        frame: &mut Scope<'_>,
    ) -> Result<(), EvalError> {
        let mut taken: Vec<String> = Vec::new();
        for member in expressions(pattern) {
            match member.kind() {
                "shorthand_property_identifier_pattern" => {
                    let name = self.text(member)?;
                    let item = read_property(value, name, false, member)?;
                    frame.declare(name, item);
                    taken.push(name.to_owned());
                }
                "object_assignment_pattern" => {
                    let left = field(member, "left")?;
                    let name = self.text(left)?;
                    let item = read_property(value, name, false, member)?;
                    taken.push(name.to_owned());
                    self.bind_pattern(member, item, frame)?;
                }
                "pair_pattern" => {
                    let key = self.property_key(field(member, "key")?, frame)?;
                    let item = read_property(value, &key, false, member)?;
                    self.bind_pattern(field(member, "value")?, item, frame)?;
                    taken.push(key);
                }
                "rest_pattern" => {
                    let rest: ObjectValue = value
                        .as_object()
                        .map(|object| {
                            object
                                .iter()
                                .filter(|(key, _)| !taken.iter().any(|t| t == key))
                                .map(|(key, item)| (key.to_owned(), item.clone()))
                                .collect()
                        })
                        .unwrap_or_default();
                    self.bind_pattern(member, StaticValue::Object(rest), frame)?;
                }
                _ => return Err(self.unsupported(member)),
            }
        }
        Ok(())
    }

    // =========================================================================
    // Statements (function bodies)
    // =========================================================================

    /// Runs a block; `Some` carries the value of a `return`.
    fn exec_block(&mut self, block: Node<'t>, frame: &mut Scope<'_>) -> Result<Option<StaticValue>, EvalError> {
        for statement in expressions(block) {
            if let Some(returned) = self.exec_statement(statement, frame)? {
                return Ok(Some(returned));
            }
        }
        Ok(None)
    }

    fn exec_statement(
        &mut self,
        statement: Node<'t>,
        frame: &mut Scope<'_>,
    ) -> Result<Option<StaticValue>, EvalError> {
        match statement.kind() {
            "empty_statement" => Ok(None),
            "lexical_declaration" | "variable_declaration" => {
                for declarator in expressions(statement) {
                    let name = field(declarator, "name")?;
                    let value = match declarator.child_by_field_name("value") {
                        Some(init) => self.eval(init, frame)?,
                        None => StaticValue::Undefined,
                    };
                    self.bind_pattern(name, value, frame)?;
                }
                Ok(None)
            }
            "function_declaration" => {
                let name = self.text(field(statement, "name")?)?;
                frame.declare(name, StaticValue::Function(self.handle(statement)));
                Ok(None)
            }
            "return_statement" => match first_expression(statement) {
                Some(expression) => self.eval(expression, frame).map(Some),
                None => Ok(Some(StaticValue::Undefined)),
            },
            "if_statement" => {
                let condition = self.eval(field(statement, "condition")?, frame)?;
                let branch = if condition.is_truthy() {
                    Some(field(statement, "consequence")?)
                } else {
                    statement
                        .child_by_field_name("alternative")
                        .and_then(first_expression)
                };
                match branch {
                    Some(branch) if branch.kind() == "statement_block" => {
                        let mut inner = frame.child();
                        self.exec_block(branch, &mut inner)
                    }
                    Some(branch) => self.exec_statement(branch, frame),
                    None => Ok(None),
                }
            }
            "statement_block" => {
                let mut inner = frame.child();
                self.exec_block(statement, &mut inner)
            }
            _ => Err(self.unsupported(statement)),
        }
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn text(&self, node: Node<'_>) -> Result<&'t str, EvalError> {
        node_text(node, self.source).ok_or_else(|| self.unsupported(node))
    }

    fn slice(&self, start: usize, end: usize, node: Node<'_>) -> Result<&'t str, EvalError> {
        self.source
            .get(start..end)
            .and_then(|bytes| std::str::from_utf8(bytes).ok())
            .ok_or_else(|| self.unsupported(node))
    }

    fn handle(&self, node: Node<'_>) -> RenderHandle {
        RenderHandle::new(
            self.file,
            node_location(node),
            node_text(node, self.source).unwrap_or_default(),
        )
    }

    /// Finds the function node a handle from this module points at.
    fn function_node(&self, handle: &RenderHandle) -> Option<Node<'t>> {
        if handle.file.as_path() != self.file {
            return None;
        }
        let start = handle.location.start_byte as usize;
        let end = handle.location.end_byte as usize;
        let mut node = self.root.descendant_for_byte_range(start, end)?;
        loop {
            if is_function_kind(node.kind()) || node.kind() == "function_declaration" {
                return Some(node);
            }
            node = node.parent()?;
            if node.start_byte() != start || node.end_byte() != end {
                return None;
            }
        }
    }

    fn unsupported(&self, node: Node<'_>) -> EvalError {
        EvalError::Unsupported {
            location: node_location(node),
            kind: node.kind().to_owned(),
            snippet: snippet(node, self.source),
        }
    }
}

fn field<'a>(node: Node<'a>, name: &str) -> Result<Node<'a>, EvalError> {
    node.child_by_field_name(name)
        .ok_or_else(|| type_error(node, format!("malformed `{}`: missing {name}", node.kind())))
}

/// Named, non-comment children.
fn expressions(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect()
}

fn first_expression(node: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .find(|child| child.kind() != "comment")
}

fn is_function_kind(kind: &str) -> bool {
    matches!(kind, "arrow_function" | "function_expression" | "function")
}

/// Whether a member, subscript or call expression sits in an optional chain
/// (`a?.b`, `a?.[k]`, `a?.b.c`).
fn is_optional_chain(node: Node<'_>) -> bool {
    let mut current = Some(node);
    while let Some(n) = current {
        if n.child_by_field_name("optional_chain").is_some() {
            return true;
        }
        current = match n.kind() {
            "member_expression" | "subscript_expression" => n.child_by_field_name("object"),
            "call_expression" => n.child_by_field_name("function"),
            _ => None,
        };
    }
    false
}

fn read_property(
    receiver: &StaticValue,
    key: &str,
    optional: bool,
    at: Node<'_>,
) -> Result<StaticValue, EvalError> {
    match receiver.property(key) {
        Some(value) => Ok(value),
        None if optional => Ok(StaticValue::Undefined),
        None => Err(type_error(
            at,
            format!("cannot read `{key}` of {}", receiver.type_name()),
        )),
    }
}

fn key_string(value: &StaticValue, at: Node<'_>) -> Result<String, EvalError> {
    match value {
        StaticValue::String(s) => Ok(s.clone()),
        StaticValue::Number(_) | StaticValue::Bool(_) | StaticValue::Null | StaticValue::Undefined => {
            value
                .to_js_string()
                .ok_or_else(|| type_error(at, "invalid property key"))
        }
        other => Err(type_error(
            at,
            format!("a {} cannot be used as a property key", other.type_name()),
        )),
    }
}

/// Parses a numeric literal, including `0x`/`0o`/`0b` prefixes, numeric
/// separators and the bigint suffix.
#[allow(clippy::cast_precision_loss)]
fn parse_number(text: &str) -> Option<f64> {
    let cleaned: String = text.chars().filter(|c| *c != '_').collect();
    let lower = cleaned.to_ascii_lowercase();
    let lower = lower.strip_suffix('n').unwrap_or(&lower);
    let radix = [("0x", 16), ("0o", 8), ("0b", 2)]
        .into_iter()
        .find_map(|(prefix, radix)| lower.strip_prefix(prefix).map(|digits| (digits, radix)));
    match radix {
        Some((digits, radix)) => u64::from_str_radix(digits, radix).ok().map(|v| v as f64),
        None => lower.parse().ok(),
    }
}

fn type_error(node: Node<'_>, message: impl Into<String>) -> EvalError {
    EvalError::Type {
        location: node_location(node),
        message: message.into(),
    }
}

fn snippet(node: Node<'_>, source: &[u8]) -> String {
    let text = node_text(node, source).unwrap_or_default();
    let first_line = text.lines().next().unwrap_or_default().trim();
    if first_line.chars().count() > SNIPPET_LEN {
        let cut: String = first_line.chars().take(SNIPPET_LEN).collect();
        format!("{cut}…")
    } else {
        first_line.to_owned()
    }
}
