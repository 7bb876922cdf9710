use std::rc::Rc;

use tracing::{debug, info, instrument};

use crate::{
    ast::ast::Ast,
    config::config::FrontOptions,
    diagnostics::diagnostics::{Diagnostic, Diagnostics},
    lexer::lexer::tokenize,
    modules::{
        module::{collect_modules, Module},
        resolver::resolve_order,
    },
    parser::parser::parse,
    type_checker::type_checker::{check_module, ModuleAnalysis},
};

pub const STDLIB_MODULE: &str = "stdlib";
pub const STDLIB_FILE: &str = "<stdlib>";
pub const STDLIB_SOURCE: &str = "module stdlib {\n    fn print(s:string)\n}\n";

/// One source file handed to the front-end.
#[derive(Debug)]
pub struct Source {
    pub file: Rc<String>,
    pub text: String,
    /// `None` when the source did not lex or parse
    pub ast: Option<Ast>,
}

pub struct Front {
    options: FrontOptions,
    sources: Vec<Source>,
    modules: Vec<Module>,
    order: Vec<usize>,
    diagnostics: Diagnostics,
}

impl Front {
    pub fn new(options: FrontOptions) -> Self {
        let mut front = Front {
            options,
            sources: vec![],
            modules: vec![],
            order: vec![],
            diagnostics: Diagnostics::new(),
        };

        if options.with_stdlib {
            front.add_source(STDLIB_SOURCE, STDLIB_FILE);
        }
        front
    }

    /// Lexes and parses `text`. Returns false, and records the syntax error,
    /// when that fails.
    pub fn add_source(&mut self, text: &str, file: &str) -> bool {
        let file_name = Rc::new(file.to_string());

        let ast = tokenize(text.to_string(), Some(file.to_string()))
            .and_then(|tokens| parse(tokens, Rc::clone(&file_name)));

        let ast = match ast {
            Ok(ast) => Some(ast),
            Err(error) => {
                debug!(file, error = error.get_error_name(), "Source failed to parse");
                self.diagnostics.push(Diagnostic::from(error));
                None
            }
        };

        let parsed = ast.is_some();
        self.sources.push(Source {
            file: file_name,
            text: text.to_string(),
            ast,
        });
        parsed
    }

    /// Collects the modules of every parsed source, orders them and
    /// type-checks each one. Returns true when no error was reported.
    #[instrument(skip_all)]
    pub fn analyze(&mut self) -> bool {
        let mut modules: Vec<Module> = self
            .sources
            .iter()
            .enumerate()
            .filter_map(|(index, source)| source.ast.as_ref().map(|ast| collect_modules(ast, index)))
            .flatten()
            .collect();

        let mut order = match resolve_order(&modules) {
            Ok(order) => order,
            Err(error) => {
                self.diagnostics.push(Diagnostic::from(error));
                self.modules = modules;
                return false;
            }
        };

        let stdlib = self.stdlib_index(&modules);
        if let Some(stdlib) = stdlib {
            order.retain(|index| *index != stdlib);
            order.insert(0, stdlib);
        }
        info!(
            order = ?order.iter().map(|index| modules[*index].name.as_str()).collect::<Vec<_>>(),
            "Modules ordered"
        );

        self.check_main(&modules);

        let mut analyses: Vec<Option<ModuleAnalysis>> = modules.iter().map(|_| None).collect();
        for index in &order {
            let module = &modules[*index];
            let Some(ast) = self.sources[module.source].ast.as_ref() else {
                continue;
            };

            let visible: Vec<&ModuleAnalysis> = analyses
                .iter()
                .enumerate()
                .filter(|(other, _)| {
                    let name = &modules[*other].name;
                    *other != *index && (module.imports_module(name) || Some(*other) == stdlib)
                })
                .filter_map(|(_, analysis)| analysis.as_ref())
                .collect();
            debug!(module = %module.name, visible = visible.len(), "Checking module");

            let (analysis, diagnostics) =
                check_module(ast, module.node, &module.body, &module.name, &self.options, visible);
            self.diagnostics.extend(diagnostics);
            analyses[*index] = Some(analysis);
        }

        for (module, analysis) in modules.iter_mut().zip(analyses) {
            module.analysis = analysis;
        }
        self.modules = modules;
        self.order = order;

        info!(
            errors = self.diagnostics.error_count(),
            warnings = self.diagnostics.warnings().len(),
            "Analysis finished"
        );
        !self.diagnostics.has_errors()
    }

    fn stdlib_index(&self, modules: &[Module]) -> Option<usize> {
        if !self.options.with_stdlib {
            return None;
        }
        modules
            .iter()
            .position(|module| module.name == STDLIB_MODULE && self.sources[module.source].file.as_str() == STDLIB_FILE)
    }

    /// Only one module of the program may define `main`.
    fn check_main(&mut self, modules: &[Module]) {
        let mut previous: Option<&Module> = None;

        for module in modules.iter().filter(|module| module.is_main) {
            let Some(first) = previous else {
                previous = Some(module);
                continue;
            };

            let message = format!(
                "Multiple definition of main() detected in \"{}\". Previous definition was in \"{}\".",
                self.sources[module.source].file,
                self.sources[first.source].file
            );
            self.diagnostics.error(message, &module.span);
        }
    }

    pub fn options(&self) -> &FrontOptions {
        &self.options
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    /// Text of the source named `file`.
    pub fn source_text(&self, file: &str) -> Option<&str> {
        self.sources
            .iter()
            .find(|source| source.file.as_str() == file)
            .map(|source| source.text.as_str())
    }

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn module(&self, name: &str) -> Option<&Module> {
        self.modules.iter().find(|module| module.name == name)
    }

    /// Names of the modules in the order they were checked.
    pub fn order(&self) -> Vec<&str> {
        self.order
            .iter()
            .map(|index| self.modules[*index].name.as_str())
            .collect()
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn errors(&self) -> Vec<&Diagnostic> {
        self.diagnostics.errors()
    }

    pub fn warnings(&self) -> Vec<&Diagnostic> {
        self.diagnostics.warnings()
    }
}
