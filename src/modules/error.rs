use thiserror::Error;

use crate::{
    diagnostics::diagnostics::{Diagnostic, DiagnosticKind},
    Span,
};

/// Fatal errors found while ordering modules.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModuleError {
    #[error("Cyclic dependency around module \"{name}\" detected.")]
    Cyclic { name: String, span: Span },
    #[error("Module \"{name}\" already declared")]
    AlreadyDeclared { name: String, span: Span },
    #[error("Requested module \"{name}\" not found for importing.")]
    NotFound { name: String, span: Span },
}

impl ModuleError {
    pub fn span(&self) -> &Span {
        match self {
            ModuleError::Cyclic { span, .. }
            | ModuleError::AlreadyDeclared { span, .. }
            | ModuleError::NotFound { span, .. } => span,
        }
    }
}

impl From<ModuleError> for Diagnostic {
    fn from(error: ModuleError) -> Self {
        Diagnostic::new(DiagnosticKind::SemanticError, error.to_string(), error.span())
    }
}
