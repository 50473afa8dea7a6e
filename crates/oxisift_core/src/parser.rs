use anyhow::{Context, Result};
use dashmap::DashMap;
use log::{debug, trace};
use oxc_allocator::Allocator;
use oxc_ast::ast::*;
use oxc_parser::{Parser as OxcParser, ParserReturn};
use oxc_span::SourceType;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Extract the raw import specifiers from a file, in source order, caching
/// per path.
///
/// Static imports, re-exports with a source, side-effect imports, and
/// `require()`/dynamic `import()` calls with a literal argument all count.
/// Type-only imports and re-exports do not: they are erased at runtime and
/// cannot change test outcomes.
pub fn imports_for(file: &Path, cache: &DashMap<PathBuf, Vec<String>>) -> Result<Vec<String>> {
    if let Some(cached) = cache.get(file) {
        trace!("Cache hit for imports: {}", file.display());
        return Ok(cached.clone());
    }
    trace!("Parsing file for imports: {}", file.display());
    let src =
        fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?;

    let allocator = Allocator::default();
    let ParserReturn { program, .. } =
        OxcParser::new(&allocator, &src, source_type_for(file)).parse();

    let mut specs: Vec<String> = Vec::new();
    let mut expr_roots: Vec<&Expression> = Vec::new();

    for stmt in &program.body {
        match stmt {
            Statement::ImportDeclaration(decl) => {
                if let Some(request) = runtime_import_source(decl) {
                    trace!("Found static import: '{}' in {}", request, file.display());
                    specs.push(request);
                }
            }
            Statement::ExportNamedDeclaration(decl) => {
                // `export { a } from './x'` loads ./x just like an import,
                // so a barrel file's dependents stay reachable through it.
                if let Some(request) = runtime_reexport_source(decl) {
                    trace!("Found re-export: '{}' in {}", request, file.display());
                    specs.push(request);
                }
            }
            Statement::ExportAllDeclaration(decl) => {
                if !decl.export_kind.is_type() {
                    trace!("Found star re-export: '{}' in {}", decl.source.value, file.display());
                    specs.push(decl.source.value.to_string());
                }
            }
            // require() and import() show up as plain expressions; gather
            // the roots here and walk them all in one pass below
            Statement::ExpressionStatement(es) => expr_roots.push(&es.expression),
            Statement::VariableDeclaration(vd) => {
                expr_roots.extend(vd.declarations.iter().filter_map(|d| d.init.as_ref()));
            }
            _ => {}
        }
    }

    collect_call_imports(expr_roots, file, &mut specs);

    debug!("Found {} import specifiers in {}", specs.len(), file.display());
    cache.insert(file.to_path_buf(), specs.clone());
    Ok(specs)
}

/// The source of an import declaration that still loads at runtime.
/// `import type ... from 'x'` and imports whose whole specifier list is
/// type-only are erased by the compiler and yield `None`.
fn runtime_import_source(decl: &ImportDeclaration) -> Option<String> {
    if decl.import_kind.is_type() {
        return None;
    }
    if let Some(specifiers) = &decl.specifiers
        && !specifiers.is_empty()
        && specifiers.iter().all(|spec| match spec {
            ImportDeclarationSpecifier::ImportSpecifier(s) => s.import_kind.is_type(),
            ImportDeclarationSpecifier::ImportDefaultSpecifier(_)
            | ImportDeclarationSpecifier::ImportNamespaceSpecifier(_) => false,
        })
    {
        return None;
    }
    Some(decl.source.value.to_string())
}

/// The source of a re-export that still loads at runtime, by the same
/// erasure rules as [`runtime_import_source`].
fn runtime_reexport_source(decl: &ExportNamedDeclaration) -> Option<String> {
    if decl.export_kind.is_type() {
        return None;
    }
    let source = decl.source.as_ref()?;
    if !decl.specifiers.is_empty() && decl.specifiers.iter().all(|s| s.export_kind.is_type()) {
        return None;
    }
    Some(source.value.to_string())
}

/// Walk expression trees for `require()` and dynamic `import()` calls with
/// a literal argument. Explicit worklist instead of recursion, the same
/// discipline the impact traversal uses; expressions that cannot contain a
/// call are not descended into.
fn collect_call_imports<'a>(roots: Vec<&'a Expression<'a>>, file: &Path, specs: &mut Vec<String>) {
    let mut pending = roots;

    while let Some(expr) = pending.pop() {
        match expr {
            Expression::CallExpression(call) => {
                if let Some(request) = require_argument(call) {
                    trace!("Found require() call: '{}' in {}", request, file.display());
                    specs.push(request.to_string());
                }
                pending.push(&call.callee);
                pending.extend(call.arguments.iter().filter_map(|arg| arg.as_expression()));
            }
            Expression::ImportExpression(import) => {
                if let Expression::StringLiteral(sl) = &import.source {
                    trace!("Found dynamic import(): '{}' in {}", sl.value, file.display());
                    specs.push(sl.value.to_string());
                }
            }
            Expression::ArrayExpression(array) => {
                pending.extend(array.elements.iter().filter_map(|elem| elem.as_expression()));
            }
            Expression::ObjectExpression(object) => {
                let values =
                    object.properties.iter().filter_map(|prop| prop.as_property());
                pending.extend(values.map(|prop| &prop.value));
            }
            Expression::ConditionalExpression(cond) => {
                pending.push(&cond.test);
                pending.push(&cond.consequent);
                pending.push(&cond.alternate);
            }
            Expression::AssignmentExpression(assign) => pending.push(&assign.right),
            Expression::ParenthesizedExpression(paren) => pending.push(&paren.expression),
            _ => {}
        }
    }
}

/// The literal argument of a `require(...)` call, if that is what `call` is.
fn require_argument<'a>(call: &'a CallExpression<'a>) -> Option<&'a str> {
    if let Expression::Identifier(callee) = &call.callee
        && callee.name.as_str() == "require"
        && let Some(Expression::StringLiteral(sl)) =
            call.arguments.first().and_then(|arg| arg.as_expression())
    {
        return Some(sl.value.as_str());
    }
    None
}

fn source_type_for(path: &Path) -> SourceType {
    let base = SourceType::default();
    match path.extension().and_then(|e| e.to_str()) {
        Some("ts") | Some("cts") => base.with_typescript(true),
        Some("tsx") => base.with_typescript(true).with_jsx(true),
        // .mts and .mjs are unambiguously ES modules
        Some("mts") => base.with_typescript(true).with_module(true),
        Some("jsx") => base.with_jsx(true),
        Some("mjs") => base.with_module(true),
        _ => base,
    }
}
