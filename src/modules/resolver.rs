use rustc_hash::FxHashMap;
use tracing::{debug, info, instrument};

use super::{error::ModuleError, module::Module};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    White,
    Gray,
    Black,
}

/// Orders `modules` so that every module comes after all of its imports.
///
/// Returns indices into `modules`. Roots are visited in reverse source order
/// and each module's imports in reverse import order.
#[instrument(skip_all, fields(modules = modules.len()))]
pub fn resolve_order(modules: &[Module]) -> Result<Vec<usize>, ModuleError> {
    let mut by_name: FxHashMap<&str, usize> = FxHashMap::default();

    for (index, module) in modules.iter().enumerate() {
        if by_name.insert(module.name.as_str(), index).is_some() {
            return Err(ModuleError::AlreadyDeclared {
                name: module.name.clone(),
                span: module.span.clone(),
            });
        }
    }

    for module in modules {
        for import in &module.imports {
            if !by_name.contains_key(import.name.as_str()) {
                return Err(ModuleError::NotFound {
                    name: import.name.clone(),
                    span: import.span.clone(),
                });
            }
        }
    }

    let mut resolver = Resolver {
        modules,
        by_name,
        marks: vec![Mark::White; modules.len()],
        order: Vec::with_capacity(modules.len()),
    };

    for index in (0..modules.len()).rev() {
        resolver.visit(index)?;
    }

    info!(
        order = ?resolver.order.iter().map(|index| modules[*index].name.as_str()).collect::<Vec<_>>(),
        "Resolved module order"
    );
    Ok(resolver.order)
}

struct Resolver<'a> {
    modules: &'a [Module],
    by_name: FxHashMap<&'a str, usize>,
    marks: Vec<Mark>,
    order: Vec<usize>,
}

impl Resolver<'_> {
    fn visit(&mut self, index: usize) -> Result<(), ModuleError> {
        if self.marks[index] != Mark::White {
            return Ok(());
        }

        self.marks[index] = Mark::Gray;
        let module = &self.modules[index];

        for import in module.imports.iter().rev() {
            let Some(target) = self.by_name.get(import.name.as_str()).copied() else {
                return Err(ModuleError::NotFound {
                    name: import.name.clone(),
                    span: import.span.clone(),
                });
            };

            match self.marks[target] {
                Mark::Gray => {
                    return Err(ModuleError::Cyclic {
                        name: import.name.clone(),
                        span: import.span.clone(),
                    })
                }
                Mark::White => self.visit(target)?,
                Mark::Black => {}
            }
        }

        self.marks[index] = Mark::Black;
        debug!(module = %module.name, "Module ordered");
        self.order.push(index);
        Ok(())
    }
}
