use rustc_hash::FxHashMap;
use tracing::warn;

use crate::{ast::ast::NodeId, types::types::TypeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(u32);

impl ScopeId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Module,
    Block,
    Function,
    Typeclass,
    TypeInstance,
    For,
    MatchCase,
    TypeDescription,
}

/// A declared name.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub name: String,
    /// The node that declared the name.
    pub node: NodeId,
    /// `None` while the declaration has not been analyzed yet.
    pub ty: Option<TypeId>,
}

#[derive(Debug, Clone)]
pub struct SymbolTable {
    pub owner: NodeId,
    pub kind: ScopeKind,
    pub parent: Option<ScopeId>,
    records: FxHashMap<String, Record>,
    sealed: bool,
}

impl SymbolTable {
    pub fn get(&self, name: &str) -> Option<&Record> {
        self.records.get(name)
    }

    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }
}

/// All scopes of one module.
#[derive(Debug, Clone, Default)]
pub struct ScopeTree {
    tables: Vec<SymbolTable>,
}

impl ScopeTree {
    pub fn new() -> Self {
        ScopeTree::default()
    }

    /// Creates an empty table owned by `owner`.
    pub fn init(&mut self, owner: NodeId, kind: ScopeKind, parent: Option<ScopeId>) -> ScopeId {
        self.tables.push(SymbolTable {
            owner,
            kind,
            parent,
            records: FxHashMap::default(),
            sealed: false,
        });
        ScopeId((self.tables.len() - 1) as u32)
    }

    pub fn table(&self, scope: ScopeId) -> &SymbolTable {
        &self.tables[scope.index()]
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Adds `name` to `scope`. Returns false when the name already exists in
    /// this exact scope or the scope is sealed.
    pub fn add(&mut self, scope: ScopeId, name: &str, node: NodeId) -> bool {
        let table = &mut self.tables[scope.index()];
        if table.sealed {
            warn!(name, scope = scope.index(), "Refusing to add to a sealed symbol table");
            return false;
        }
        if table.records.contains_key(name) {
            return false;
        }

        table.records.insert(
            name.to_string(),
            Record {
                name: name.to_string(),
                node,
                ty: None,
            },
        );
        true
    }

    /// Searches `scope` and then its parents. The flag is true only when the
    /// record was found in `scope` itself.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> (Option<&Record>, bool) {
        let mut current = Some(scope);
        while let Some(id) = current {
            let table = &self.tables[id.index()];
            if let Some(record) = table.records.get(name) {
                return (Some(record), id == scope);
            }
            current = table.parent;
        }

        (None, false)
    }

    /// Records the inferred type of a name declared in `scope`.
    pub fn set_type(&mut self, scope: ScopeId, name: &str, ty: TypeId) -> bool {
        let table = &mut self.tables[scope.index()];
        if table.sealed {
            warn!(name, scope = scope.index(), "Refusing to type a record of a sealed symbol table");
            return false;
        }

        match table.records.get_mut(name) {
            Some(record) => {
                record.ty = Some(ty);
                true
            }
            None => false,
        }
    }

    /// Freezes a table once the subtree owning it has been analyzed.
    pub fn seal(&mut self, scope: ScopeId) {
        self.tables[scope.index()].sealed = true;
    }
}
