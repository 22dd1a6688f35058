use crate::symtab::{SymbolTable, Type};

/// Whether a value of type `right` may be stored where `left` is declared.
///
/// Identical types are compatible, `unknown` is compatible with anything, and
/// the declared superclass accepts the current class.
pub fn assignable(table: &SymbolTable, left: &Type, right: &Type) -> bool {
    if left.is_unknown() || right.is_unknown() || left == right {
        return true;
    }
    !left.is_array
        && !right.is_array
        && table.has_super()
        && left.name == table.super_name()
        && right.name == table.class_name()
}

/// Return-statement compatibility: assignment rules plus two imported classes
pub fn returnable(table: &SymbolTable, declared: &Type, found: &Type) -> bool {
    assignable(table, declared, found)
        || (declared.is_class() && found.is_class() && table.is_imported(&declared.name) && table.is_imported(&found.name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::AstBuilder;

    fn table() -> SymbolTable {
        let mut b = AstBuilder::new();
        let class = b.class("Dog", Some("Animal"), vec![], 1);
        let ast = b.program(&["zoo.Animal", "io", "util.List"], class);
        SymbolTable::build(&ast).unwrap()
    }

    #[test]
    fn assignment_rules() {
        let t = table();
        assert!(assignable(&t, &Type::int(), &Type::int()));
        assert!(assignable(&t, &Type::int_array(), &Type::int_array()));
        assert!(!assignable(&t, &Type::int(), &Type::int_array()));
        assert!(!assignable(&t, &Type::int(), &Type::boolean()));
        assert!(assignable(&t, &Type::class("Animal"), &Type::class("Dog")));
        assert!(!assignable(&t, &Type::class("Dog"), &Type::class("Animal")));
        assert!(assignable(&t, &Type::boolean(), &Type::unknown()));
    }

    #[test]
    fn returns_allow_two_imports() {
        let t = table();
        assert!(!assignable(&t, &Type::class("List"), &Type::class("io")));
        assert!(returnable(&t, &Type::class("List"), &Type::class("io")));
        assert!(!returnable(&t, &Type::class("List"), &Type::class("Dog")));
    }
}
