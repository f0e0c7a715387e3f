//! Static outline of a parsed program
//!
//! Builds the nested function / loop / branch view shown next to the source.
//! Node ids are `<prefix>_<n>` with one counter per extraction, so the same
//! program always yields the same ids.

use crate::parser::ast::{Block, Expr, FunctionDecl, Program, Stmt};
use serde::Serialize;

/// One node of the outline tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlineNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub label: String,
    pub start_line: usize,
    pub end_line: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<OutlineNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

/// Outline of a whole program
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Outline {
    pub nodes: Vec<OutlineNode>,
}

impl Outline {
    /// Total number of nodes, nested ones included
    pub fn node_count(&self) -> usize {
        fn count(node: &OutlineNode) -> usize {
            1 + node.children.iter().map(count).sum::<usize>()
        }
        self.nodes.iter().map(count).sum()
    }
}

/// Extract the outline of `program`
pub fn extract(program: &Program) -> Outline {
    let mut builder = OutlineBuilder::default();
    let nodes = program
        .functions
        .iter()
        .map(|function| builder.function(function))
        .collect();
    Outline { nodes }
}

#[derive(Default)]
struct OutlineBuilder {
    counter: usize,
}

impl OutlineBuilder {
    fn next_id(&mut self, prefix: &str) -> String {
        self.counter += 1;
        format!("{}_{}", prefix, self.counter)
    }

    fn node(&mut self, prefix: &str, node_type: &str, label: String, stmt: &Stmt, parent: &str) -> OutlineNode {
        OutlineNode {
            id: self.next_id(prefix),
            node_type: node_type.to_string(),
            label,
            start_line: stmt.location().line,
            end_line: stmt.end_line(),
            children: Vec::new(),
            parent_id: Some(parent.to_string()),
        }
    }

    fn function(&mut self, function: &FunctionDecl) -> OutlineNode {
        let mut node = OutlineNode {
            id: self.next_id("func"),
            node_type: "function".to_string(),
            label: format!("func {}()", function.name),
            start_line: function.location.line,
            end_line: function.body.end.line,
            children: Vec::new(),
            parent_id: None,
        };
        node.children = self.block(&function.body, &node.id);
        node
    }

    fn block(&mut self, block: &Block, parent: &str) -> Vec<OutlineNode> {
        let mut children = Vec::new();
        for stmt in &block.statements {
            self.statement(stmt, parent, &mut children);
        }
        children
    }

    fn statement(&mut self, stmt: &Stmt, parent: &str, out: &mut Vec<OutlineNode>) {
        let prefix = match stmt {
            Stmt::For { body, .. } | Stmt::Range { body, .. } => {
                let mut node = self.node("for", "for", stmt.to_string(), stmt, parent);
                node.children = self.block(body, &node.id);
                out.push(node);
                return;
            }
            Stmt::If {
                condition,
                then_block,
                else_branch,
                ..
            } => {
                let node = self.if_node(stmt, condition, then_block, else_branch.as_deref(), parent);
                out.push(node);
                return;
            }
            // Bare blocks contribute their statements to the enclosing node
            Stmt::Block(block) => {
                for inner in &block.statements {
                    self.statement(inner, parent, out);
                }
                return;
            }
            Stmt::Assign { .. } => "assign",
            Stmt::VarDecl { .. } => "decl",
            Stmt::Expr { .. } => "expr",
            Stmt::Return { .. } => "return",
            Stmt::IncDec { .. } => "incdec",
            Stmt::Break { .. } | Stmt::Continue { .. } | Stmt::Unsupported { .. } => return,
        };
        let node = self.node(prefix, "statement", stmt.to_string(), stmt, parent);
        out.push(node);
    }

    fn if_node(
        &mut self,
        stmt: &Stmt,
        condition: &Expr,
        then_block: &Block,
        else_branch: Option<&Stmt>,
        parent: &str,
    ) -> OutlineNode {
        let mut node = self.node("if", "if", format!("if {}", condition), stmt, parent);
        node.children = self.block(then_block, &node.id);

        if let Some(else_branch) = else_branch {
            let mut else_node = self.node("else", "else", "else".to_string(), else_branch, &node.id);
            match else_branch {
                Stmt::Block(block) => else_node.children = self.block(block, &else_node.id),
                nested @ Stmt::If {
                    condition,
                    then_block,
                    else_branch,
                    ..
                } => {
                    let nested =
                        self.if_node(nested, condition, then_block, else_branch.as_deref(), &else_node.id);
                    else_node.children.push(nested);
                }
                _ => {}
            }
            node.children.push(else_node);
        }
        node
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_source;
    use pretty_assertions::assert_eq;

    const SOURCE: &str = "package main

import \"fmt\"

func main() {
	total := 0
	for i := 0; i < 3; i++ {
		if i%2 == 0 {
			total += i
		} else if i == 1 {
			fmt.Println(i)
		} else {
			total--
		}
	}
	return
}
";

    #[test]
    fn test_outline_structure() {
        let outline = extract(&parse_source(SOURCE).unwrap());
        assert_eq!(outline.nodes.len(), 1);

        let main = &outline.nodes[0];
        assert_eq!(main.id, "func_1");
        assert_eq!(main.label, "func main()");
        assert_eq!((main.start_line, main.end_line), (5, 17));
        assert_eq!(main.parent_id, None);

        let labels: Vec<_> = main.children.iter().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec!["total := 0", "for i := 0; i < 3; i++", "return"]);
        assert_eq!(main.children[0].id, "assign_2");

        let for_node = &main.children[1];
        assert_eq!(for_node.node_type, "for");
        assert_eq!((for_node.start_line, for_node.end_line), (7, 15));

        let if_node = &for_node.children[0];
        assert_eq!(if_node.label, "if i % 2 == 0");
        assert_eq!(if_node.parent_id.as_deref(), Some(for_node.id.as_str()));
        assert_eq!(if_node.children.len(), 2);

        let else_node = &if_node.children[1];
        assert_eq!(else_node.node_type, "else");
        let nested = &else_node.children[0];
        assert_eq!(nested.node_type, "if");
        assert_eq!(nested.label, "if i == 1");
        assert_eq!(nested.children[1].children[0].label, "total--");
        assert_eq!(outline.node_count(), 11);
    }

    #[test]
    fn test_outline_serialisation() {
        let outline = extract(&parse_source("package main\nfunc main() {\n x := 1\n}\n").unwrap());
        let json = serde_json::to_value(&outline).unwrap();

        assert_eq!(json["nodes"][0]["type"], "function");
        assert_eq!(json["nodes"][0]["startLine"], 2);
        assert_eq!(json["nodes"][0]["children"][0]["parentId"], "func_1");
        assert!(json["nodes"][0].get("parentId").is_none());
        assert!(json["nodes"][0]["children"][0].get("children").is_none());
    }
}
