use super::{Ast, NodeId};
use std::fmt;

/// AST printer for debugging and output
///
/// One node per line, children indented by two spaces:
///
/// ```text
/// BinaryOp[op=+] @3:5
///   Identifier[name=a] @3:5
///   IntLiteral[value=1] @3:9
/// ```
pub struct AstPrinter {
    indent_level: usize,
    output: String,
}

impl AstPrinter {
    pub fn new() -> Self {
        Self {
            indent_level: 0,
            output: String::new(),
        }
    }

    pub fn print(&mut self, ast: &Ast) -> String {
        self.print_subtree(ast, ast.root())
    }

    pub fn print_subtree(&mut self, ast: &Ast, id: NodeId) -> String {
        self.output.clear();
        self.indent_level = 0;
        self.visit(ast, id);
        std::mem::take(&mut self.output)
    }

    fn visit(&mut self, ast: &Ast, id: NodeId) {
        let node = ast.node(id);
        let mut line = node.kind.to_string();
        if !node.attrs.is_empty() {
            let attrs: Vec<String> = node.attrs.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
            line.push_str(&format!("[{}]", attrs.join(", ")));
        }
        line.push_str(&format!(" @{}", node.location));
        self.writeln(&line);

        self.indent();
        for child in &node.children {
            self.visit(ast, *child);
        }
        self.dedent();
    }

    fn indent(&mut self) {
        self.indent_level += 2;
    }

    fn dedent(&mut self) {
        if self.indent_level >= 2 {
            self.indent_level -= 2;
        }
    }

    fn writeln(&mut self, s: &str) {
        for _ in 0..self.indent_level {
            self.output.push(' ');
        }
        self.output.push_str(s);
        self.output.push('\n');
    }
}

impl Default for AstPrinter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Ast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&AstPrinter::new().print(self))
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::AstBuilder;

    #[test]
    fn prints_nested_nodes_with_attributes() {
        let mut b = AstBuilder::new();
        let a = b.ident("a", 3);
        let one = b.int_lit(1, 3);
        let sum = b.binary("+", a, one, 3);
        let ast = b.finish(sum);
        let text = ast.to_string();
        assert_eq!(
            text,
            "BinaryOp[op=+] @3:1\n  Identifier[name=a] @3:1\n  IntLiteral[value=1] @3:1\n"
        );
    }
}
