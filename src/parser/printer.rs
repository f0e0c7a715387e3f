//! Source printer
//!
//! `Display` implementations that render AST nodes back to canonical Go text.
//! Compound statements (`if`, `for`, blocks) render only their header line;
//! this is the text shown for a step and used for outline labels.

use crate::parser::ast::*;
use std::fmt;

/// Write `items` separated by `", "`
fn comma_separated<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

fn escape_char(c: char, quote: char, out: &mut String) {
    match c {
        '\n' => out.push_str("\\n"),
        '\t' => out.push_str("\\t"),
        '\r' => out.push_str("\\r"),
        '\\' => out.push_str("\\\\"),
        c if c == quote => {
            out.push('\\');
            out.push(c);
        }
        c if c.is_control() => out.push_str(&format!("\\x{:02x}", c as u32)),
        c => out.push(c),
    }
}

/// Go double-quoted string literal for `s`
pub fn quote_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        escape_char(c, '"', &mut out);
    }
    out.push('"');
    out
}

/// Go rune literal for `c`
pub fn quote_rune(c: char) -> String {
    let mut out = String::from("'");
    escape_char(c, '\'', &mut out);
    out.push('\'');
    out
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some(key) => write!(f, "{}: {}", key, self.value),
            None => write!(f, "{}", self.value),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::IntLiteral(n, _) => write!(f, "{}", n),
            Expr::FloatLiteral(n, _) => write!(f, "{:?}", n),
            Expr::StringLiteral(s, _) => write!(f, "{}", quote_string(s)),
            Expr::CharLiteral(c, _) => write!(f, "{}", quote_rune(*c)),
            Expr::Ident(name, _) => write!(f, "{}", name),
            Expr::Binary { op, left, right, .. } => write!(f, "{} {} {}", left, op.symbol(), right),
            Expr::Unary { op, operand, .. } => write!(f, "{}{}", op.symbol(), operand),
            Expr::Paren(inner, _) => write!(f, "({})", inner),
            Expr::Composite {
                literal_type,
                elements,
                ..
            } => {
                write!(f, "{}{{", literal_type)?;
                comma_separated(f, elements)?;
                write!(f, "}}")
            }
            Expr::Index { target, index, .. } => write!(f, "{}[{}]", target, index),
            Expr::Call { callee, args, .. } => {
                write!(f, "{}(", callee)?;
                comma_separated(f, args)?;
                write!(f, ")")
            }
            Expr::Selector { target, field, .. } => write!(f, "{}.{}", target, field),
            Expr::Type(type_expr, _) => write!(f, "{}", type_expr),
        }
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Assign { lhs, op, rhs, .. } => {
                comma_separated(f, lhs)?;
                write!(f, " {} ", op.symbol())?;
                comma_separated(f, rhs)
            }
            Stmt::VarDecl {
                names,
                var_type,
                values,
                is_const,
                ..
            } => {
                write!(f, "{} {}", if *is_const { "const" } else { "var" }, names.join(", "))?;
                if let Some(var_type) = var_type {
                    write!(f, " {}", var_type)?;
                }
                if !values.is_empty() {
                    write!(f, " = ")?;
                    comma_separated(f, values)?;
                }
                Ok(())
            }
            Stmt::If { init, condition, .. } => match init {
                Some(init) => write!(f, "if {}; {}", init, condition),
                None => write!(f, "if {}", condition),
            },
            Stmt::For {
                init,
                condition,
                post,
                ..
            } => {
                if init.is_none() && post.is_none() {
                    return match condition {
                        Some(condition) => write!(f, "for {}", condition),
                        None => write!(f, "for"),
                    };
                }
                write!(f, "for ")?;
                if let Some(init) = init {
                    write!(f, "{}", init)?;
                }
                write!(f, "; ")?;
                if let Some(condition) = condition {
                    write!(f, "{}", condition)?;
                }
                write!(f, ";")?;
                if let Some(post) = post {
                    write!(f, " {}", post)?;
                }
                Ok(())
            }
            Stmt::Range {
                key,
                value,
                define,
                collection,
                ..
            } => {
                let vars: Vec<&str> = key.iter().chain(value.iter()).map(String::as_str).collect();
                if vars.is_empty() {
                    write!(f, "for range {}", collection)
                } else {
                    let op = if *define { ":=" } else { "=" };
                    write!(f, "for {} {} range {}", vars.join(", "), op, collection)
                }
            }
            Stmt::IncDec { target, op, .. } => match op {
                IncDecOp::Inc => write!(f, "{}++", target),
                IncDecOp::Dec => write!(f, "{}--", target),
            },
            Stmt::Return { results, .. } => {
                write!(f, "return")?;
                if !results.is_empty() {
                    write!(f, " ")?;
                    comma_separated(f, results)?;
                }
                Ok(())
            }
            Stmt::Expr { expr, .. } => write!(f, "{}", expr),
            Stmt::Break { .. } => write!(f, "break"),
            Stmt::Continue { .. } => write!(f, "continue"),
            Stmt::Block(_) => write!(f, "{{ ... }}"),
            Stmt::Unsupported { keyword, .. } => write!(f, "{}", keyword),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::ast::*;
    use crate::parser::parse::Parser;
    use pretty_assertions::assert_eq;

    fn printed(statements: &str) -> Vec<String> {
        let source = format!("package main\nfunc main() {{\n{}\n}}\n", statements);
        let program = Parser::new(&source).unwrap().parse_program().unwrap();
        program.functions[0]
            .body
            .statements
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_simple_statements_round_trip() {
        let lines = printed(
            "x := 5\na, b = b, a\ncounts[\"a\"]++\ntotal += xs[i] * 2\nfmt.Println(\"x is\", x)\nreturn",
        );

        assert_eq!(
            lines,
            vec![
                "x := 5",
                "a, b = b, a",
                "counts[\"a\"]++",
                "total += xs[i] * 2",
                "fmt.Println(\"x is\", x)",
                "return",
            ]
        );
    }

    #[test]
    fn test_headers() {
        let lines = printed(
            "for i := 0; i < 3; i++ {\n}\nfor k, v := range m {\n}\nfor n > 0 {\n}\nif x > 1 {\n}\nvar s []string\n",
        );

        assert_eq!(
            lines,
            vec![
                "for i := 0; i < 3; i++",
                "for k, v := range m",
                "for n > 0",
                "if x > 1",
                "var s []string",
            ]
        );
    }

    #[test]
    fn test_literals() {
        let lines = printed("s := \"a\\tb\"\nr := 'x'\nf := 2.0\nm := map[string]int{\"a\": 1}");

        assert_eq!(lines[0], "s := \"a\\tb\"");
        assert_eq!(lines[1], "r := 'x'");
        assert_eq!(lines[2], "f := 2.0");
        assert_eq!(lines[3], "m := map[string]int{\"a\": 1}");
    }

    #[test]
    fn test_type_display() {
        let t = TypeExpr::Map(
            Box::new(TypeExpr::Named("string".to_string())),
            Box::new(TypeExpr::Slice(Box::new(TypeExpr::Named("int".to_string())))),
        );
        assert_eq!(t.to_string(), "map[string][]int");
    }
}
