use tracing::debug;

use crate::{
    ast::ast::{Ast, NodeId, NodeKind},
    type_checker::type_checker::ModuleAnalysis,
    Span,
};

/// Name of the module formed by statements outside any `module` block.
pub const MAIN_MODULE: &str = "main";

/// An `import NAME` statement of a module.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportEdge {
    pub name: String,
    pub span: Span,
}

#[derive(Debug)]
pub struct Module {
    pub name: String,
    /// Index of the source the module was parsed from
    pub source: usize,
    /// The `Module` node, or the `Root` node for the implicit main module
    pub node: NodeId,
    pub span: Span,
    /// Top-level statements, in source order
    pub body: Vec<NodeId>,
    pub imports: Vec<ImportEdge>,
    pub is_main: bool,
    /// Filled in once the module has been type-checked
    pub analysis: Option<ModuleAnalysis>,
}

impl Module {
    fn new(name: String, source: usize, node: NodeId, ast: &Ast, body: Vec<NodeId>) -> Self {
        let imports = body
            .iter()
            .filter_map(|statement| match ast.kind(*statement) {
                NodeKind::Import { module } => Some(ImportEdge {
                    name: module.clone(),
                    span: ast.span(*statement).clone(),
                }),
                _ => None,
            })
            .collect();

        let declares_main = body.iter().any(|statement| {
            matches!(ast.kind(*statement), NodeKind::FnDecl { name, .. } if name == "main")
        });

        Module {
            is_main: declares_main || name == MAIN_MODULE,
            name,
            source,
            node,
            span: ast.span(node).clone(),
            body,
            imports,
            analysis: None,
        }
    }

    /// Whether `name` is imported by this module.
    pub fn imports_module(&self, name: &str) -> bool {
        self.imports.iter().any(|import| import.name == name)
    }
}

/// Splits a parsed source into its modules, in source order.
pub fn collect_modules(ast: &Ast, source: usize) -> Vec<Module> {
    let Some(root) = ast.root() else {
        return vec![];
    };

    let mut modules = vec![];
    let mut loose = vec![];

    for child in ast.children(root) {
        match ast.kind(child) {
            NodeKind::Module { name, body } => {
                modules.push(Module::new(name.clone(), source, child, ast, body.clone()));
            }
            _ => loose.push(child),
        }
    }

    if !loose.is_empty() || modules.is_empty() {
        modules.push(Module::new(String::from(MAIN_MODULE), source, root, ast, loose));
    }

    debug!(source, modules = modules.len(), "Collected modules");
    modules
}
