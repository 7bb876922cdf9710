use rustc_hash::{FxHashMap, FxHashSet};

use super::types::{ElementaryKind, Type, TypeId, TypeOperator};

/// Deduplicated store of the types used by one module.
///
/// Interning is structural: children are interned first, so the shape of a
/// parent (its variant plus child handles) is enough to identify it.
#[derive(Debug, Clone, Default)]
pub struct TypeSet {
    types: Vec<Type>,
    lookup: FxHashMap<Type, TypeId>,
}

impl TypeSet {
    pub fn new() -> Self {
        TypeSet::default()
    }

    /// Returns the handle of `ty`, creating it if no type of that shape exists.
    ///
    /// Operands of an operator that use the same operator are flattened, so
    /// `(a,b),c` and `a,(b,c)` both intern as the 3-ary product `a,b,c`.
    pub fn intern(&mut self, ty: Type) -> TypeId {
        let ty = match ty {
            Type::Operator { op, operands } => Type::Operator {
                op,
                operands: self.flatten(op, operands),
            },
            other => other,
        };

        if let Some(id) = self.lookup.get(&ty) {
            return *id;
        }

        let id = TypeId(self.types.len() as u32);
        self.types.push(ty.clone());
        self.lookup.insert(ty, id);
        id
    }

    fn flatten(&self, op: TypeOperator, operands: Vec<TypeId>) -> Vec<TypeId> {
        // Implication is right-associative and keeps its nesting
        if op == TypeOperator::Implication {
            return operands;
        }

        let mut flat = Vec::with_capacity(operands.len());
        for operand in operands {
            match self.get(operand) {
                Type::Operator {
                    op: inner,
                    operands,
                } if *inner == op => flat.extend(operands.iter().copied()),
                _ => flat.push(operand),
            }
        }
        flat
    }

    pub fn get(&self, id: TypeId) -> &Type {
        &self.types[id.index()]
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TypeId, &Type)> {
        self.types
            .iter()
            .enumerate()
            .map(|(index, ty)| (TypeId(index as u32), ty))
    }

    pub fn elementary(&mut self, kind: ElementaryKind) -> TypeId {
        self.intern(Type::Elementary {
            kind,
            is_constant: false,
        })
    }

    pub fn constant(&mut self, kind: ElementaryKind) -> TypeId {
        self.intern(Type::Elementary {
            kind,
            is_constant: true,
        })
    }

    pub fn operator(&mut self, op: TypeOperator, operands: Vec<TypeId>) -> TypeId {
        if operands.len() == 1 && op != TypeOperator::Implication {
            return operands[0];
        }
        self.intern(Type::Operator { op, operands })
    }

    pub fn sum(&mut self, operands: Vec<TypeId>) -> TypeId {
        self.operator(TypeOperator::Sum, operands)
    }

    pub fn product(&mut self, operands: Vec<TypeId>) -> TypeId {
        self.operator(TypeOperator::Product, operands)
    }

    pub fn array(&mut self, member: TypeId, dimensions: Vec<Option<u64>>) -> TypeId {
        self.intern(Type::Array { member, dimensions })
    }

    pub fn function(&mut self, arg: TypeId, ret: TypeId) -> TypeId {
        self.intern(Type::Function { arg, ret })
    }

    pub fn elementary_kind(&self, id: TypeId) -> Option<ElementaryKind> {
        match self.get(self.strip_leaf(id)) {
            Type::Elementary { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    pub fn is_constant(&self, id: TypeId) -> bool {
        matches!(
            self.get(self.strip_leaf(id)),
            Type::Elementary {
                is_constant: true,
                ..
            }
        )
    }

    /// Unwraps named fields.
    pub fn strip_leaf(&self, mut id: TypeId) -> TypeId {
        while let Type::Leaf { ty, .. } = self.get(id) {
            id = *ty;
        }
        id
    }

    /// Unwraps named fields and defined types down to the structural shape.
    pub fn strip(&self, mut id: TypeId) -> TypeId {
        loop {
            match self.get(id) {
                Type::Leaf { ty, .. } | Type::Defined { ty, .. } => id = *ty,
                _ => return id,
            }
        }
    }

    /// Operands of `op` at the top of `id`, or `id` itself as the single operand.
    pub fn operands(&self, id: TypeId, op: TypeOperator) -> Vec<TypeId> {
        match self.get(id) {
            Type::Operator {
                op: found,
                operands,
            } if *found == op => operands.clone(),
            _ => vec![id],
        }
    }

    /// Rebuilds `id` with every occurrence of `from` replaced by `to`.
    pub fn substitute(&mut self, id: TypeId, from: TypeId, to: TypeId) -> TypeId {
        if id == from {
            return to;
        }

        let ty = match self.get(id).clone() {
            Type::Elementary { .. } | Type::Wildcard => return id,
            Type::Operator { op, operands } => Type::Operator {
                op,
                operands: operands
                    .into_iter()
                    .map(|operand| self.substitute(operand, from, to))
                    .collect(),
            },
            Type::Leaf { name, ty } => Type::Leaf {
                name,
                ty: self.substitute(ty, from, to),
            },
            Type::Defined { name, ty } => Type::Defined {
                name,
                ty: self.substitute(ty, from, to),
            },
            Type::Array { member, dimensions } => Type::Array {
                member: self.substitute(member, from, to),
                dimensions,
            },
            Type::Function { arg, ret } => Type::Function {
                arg: self.substitute(arg, from, to),
                ret: self.substitute(ret, from, to),
            },
        };

        self.intern(ty)
    }

    /// Rebuilds `id` without any field names. Defined types are kept opaque.
    pub fn erase_leaves(&mut self, id: TypeId) -> TypeId {
        let ty = match self.get(id).clone() {
            Type::Leaf { ty, .. } => return self.erase_leaves(ty),
            Type::Elementary { .. } | Type::Wildcard | Type::Defined { .. } => return id,
            Type::Operator { op, operands } => Type::Operator {
                op,
                operands: operands
                    .into_iter()
                    .map(|operand| self.erase_leaves(operand))
                    .collect(),
            },
            Type::Array { member, dimensions } => Type::Array {
                member: self.erase_leaves(member),
                dimensions,
            },
            Type::Function { arg, ret } => Type::Function {
                arg: self.erase_leaves(arg),
                ret: self.erase_leaves(ret),
            },
        };

        self.intern(ty)
    }

    /// Every non-elementary type, ordered so that a type never precedes a
    /// type it refers to.
    pub fn linearize(&self) -> Vec<TypeId> {
        let mut visited = FxHashSet::default();
        let mut order = vec![];

        for (id, _) in self.iter() {
            self.linearize_visit(id, &mut visited, &mut order);
        }

        order
    }

    fn linearize_visit(&self, id: TypeId, visited: &mut FxHashSet<TypeId>, order: &mut Vec<TypeId>) {
        if !visited.insert(id) {
            return;
        }

        let children: Vec<TypeId> = match self.get(id) {
            Type::Elementary { .. } | Type::Wildcard => vec![],
            Type::Operator { operands, .. } => operands.clone(),
            Type::Leaf { ty, .. } | Type::Defined { ty, .. } => vec![*ty],
            Type::Array { member, .. } => vec![*member],
            Type::Function { arg, ret } => vec![*arg, *ret],
        };

        for child in children {
            self.linearize_visit(child, visited, order);
        }

        if !matches!(self.get(id), Type::Elementary { .. }) {
            order.push(id);
        }
    }

    /// Re-interns `id` from another module's set into this one.
    pub fn import(&mut self, other: &TypeSet, id: TypeId) -> TypeId {
        let ty = match other.get(id) {
            Type::Elementary { .. } | Type::Wildcard => other.get(id).clone(),
            Type::Operator { op, operands } => Type::Operator {
                op: *op,
                operands: operands
                    .iter()
                    .map(|operand| self.import(other, *operand))
                    .collect(),
            },
            Type::Leaf { name, ty } => Type::Leaf {
                name: name.clone(),
                ty: self.import(other, *ty),
            },
            Type::Defined { name, ty } => Type::Defined {
                name: name.clone(),
                ty: self.import(other, *ty),
            },
            Type::Array { member, dimensions } => Type::Array {
                member: self.import(other, *member),
                dimensions: dimensions.clone(),
            },
            Type::Function { arg, ret } => Type::Function {
                arg: self.import(other, *arg),
                ret: self.import(other, *ret),
            },
        };

        self.intern(ty)
    }

    /// Canonical rendering used in diagnostics, e.g. `u64,f64` or `i32|string`.
    pub fn to_string(&self, id: TypeId) -> String {
        let mut out = String::new();
        self.render(id, false, &mut out);
        out
    }

    /// Like [`TypeSet::to_string`] but a defined type also shows its contents,
    /// e.g. `foo {i32,bool|string}`.
    pub fn to_string_with_contents(&self, id: TypeId) -> String {
        let mut out = String::new();
        self.render(id, true, &mut out);
        out
    }

    fn render(&self, id: TypeId, contents: bool, out: &mut String) {
        match self.get(id) {
            Type::Elementary { kind, .. } => out.push_str(kind.name()),
            Type::Operator { op, operands } => {
                for (index, operand) in operands.iter().enumerate() {
                    if index > 0 {
                        out.push_str(op.symbol());
                    }
                    self.render_operand(*operand, *op, out);
                }
            }
            Type::Leaf { ty, .. } => self.render(*ty, false, out),
            Type::Defined { name, ty } => {
                out.push_str(name);
                if contents {
                    out.push_str(" {");
                    self.render(*ty, false, out);
                    out.push('}');
                }
            }
            Type::Array { member, dimensions } => {
                if self.binding_operator(*member).is_some() {
                    out.push('(');
                    self.render(*member, false, out);
                    out.push(')');
                } else {
                    self.render(*member, false, out);
                }
                for dimension in dimensions {
                    match dimension {
                        Some(size) => out.push_str(&format!("[{}]", size)),
                        None => out.push_str("[]"),
                    }
                }
            }
            Type::Function { arg, ret } => {
                self.render_operand(*arg, TypeOperator::Implication, out);
                out.push_str("->");
                self.render_operand(*ret, TypeOperator::Implication, out);
            }
            Type::Wildcard => out.push('_'),
        }
    }

    fn render_operand(&self, operand: TypeId, parent: TypeOperator, out: &mut String) {
        let needs_parens = self
            .binding_operator(operand)
            .is_some_and(|inner| inner <= parent);

        if needs_parens {
            out.push('(');
            self.render(operand, false, out);
            out.push(')');
        } else {
            self.render(operand, false, out);
        }
    }

    /// The operator that rendering `id` exposes at its top level, if any.
    fn binding_operator(&self, id: TypeId) -> Option<TypeOperator> {
        match self.get(self.strip_leaf(id)) {
            Type::Operator { op, .. } => Some(*op),
            Type::Function { .. } => Some(TypeOperator::Implication),
            _ => None,
        }
    }
}
