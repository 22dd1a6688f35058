use super::{ReviewContext, ReviewError, ReviewResult, SemanticPass};
use crate::ast::{walk, Ast, AstError, AstVisitor, NodeId, NodeKind, Scope};
use crate::report::Report;
use crate::symtab::Type;

/// Array literals only where an `int[]` is expected
pub struct ArrayInitializers;

impl SemanticPass for ArrayInitializers {
    fn name(&self) -> &'static str {
        "array-initializers"
    }

    fn run(&mut self, cx: &ReviewContext<'_>, reports: &mut Vec<Report>) -> ReviewResult<()> {
        walk(cx.ast, &mut Checker { cx, reports })
    }
}

struct Checker<'c, 'a> {
    cx: &'c ReviewContext<'a>,
    reports: &'c mut Vec<Report>,
}

fn accepts(ty: &Type) -> bool {
    *ty == Type::int_array() || ty.is_unknown()
}

impl Checker<'_, '_> {
    fn allowed(&self, ast: &Ast, id: NodeId, scope: &Scope<'_>) -> ReviewResult<bool> {
        let Some(parent) = ast.parent(id) else { return Ok(false) };
        let table = self.cx.table;
        let method = scope.method_name();
        match ast.kind(parent) {
            NodeKind::Assign => {
                let target = ast.require_attr(parent, "name")?;
                Ok(self.cx.eval.variable_type(method, target).map(|ty| accepts(&ty)).unwrap_or(false))
            }
            NodeKind::Return => Ok(method.and_then(|m| table.return_type(m)).map(accepts).unwrap_or(false)),
            NodeKind::MethodCall => {
                let Some(position) = ast.index_in_parent(id) else { return Ok(false) };
                if position == 0 {
                    return Ok(false);
                }
                let receiver = ast.child(parent, 0)?;
                let name = ast.require_attr(parent, "name")?;
                let on_own_class = ast.kind(receiver) == NodeKind::This
                    || self
                        .cx
                        .eval
                        .expr_type(ast, receiver, method)
                        .map(|ty| table.is_own_class(&ty))
                        .unwrap_or(false);
                if !on_own_class || !table.has_method(name) {
                    // nothing to compare against
                    return Ok(true);
                }
                let params = table.parameters(name);
                let param = params.get(position - 1).or_else(|| params.last().filter(|p| p.varargs));
                Ok(param.map(|p| p.varargs || accepts(&p.ty)).unwrap_or(false))
            }
            _ => Ok(false),
        }
    }
}

impl AstVisitor for Checker<'_, '_> {
    type Error = AstError;

    fn visit_array_literal(&mut self, ast: &Ast, id: NodeId, scope: &Scope<'_>) -> ReviewResult<()> {
        if !self.allowed(ast, id, scope)? {
            self.reports.push(self.cx.error(id, ReviewError::MisplacedArrayInitializer));
            return Ok(());
        }
        if let Some(ty) = self.cx.type_or_report(id, scope, self.reports)? {
            if ty != Type::int_array() {
                self.reports.push(self.cx.error(id, ReviewError::MisplacedArrayInitializer));
            }
        }
        Ok(())
    }
}
