// AST (Abstract Syntax Tree) definitions for the Go subset

/// Source location information for error reporting and step lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Type syntax as written in the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    /// `int`, `string`, `float64`, ...
    Named(String),
    /// `[]T`
    Slice(Box<TypeExpr>),
    /// `[N]T`
    Array(usize, Box<TypeExpr>),
    /// `map[K]V`
    Map(Box<TypeExpr>, Box<TypeExpr>),
}

impl TypeExpr {
    /// Display label used for bindings (`"[]int"`, `"map[string]int"`)
    pub fn label(&self) -> String {
        match self {
            TypeExpr::Named(name) => name.clone(),
            TypeExpr::Slice(elem) => format!("[]{}", elem.label()),
            TypeExpr::Array(len, elem) => format!("[{}]{}", len, elem.label()),
            TypeExpr::Map(key, value) => format!("map[{}]{}", key.label(), value.label()),
        }
    }

    /// Element type of a slice or array type
    pub fn element(&self) -> Option<&TypeExpr> {
        match self {
            TypeExpr::Slice(elem) | TypeExpr::Array(_, elem) => Some(elem),
            _ => None,
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    // Comparison
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    // Logical
    And,
    Or,
    // Bitwise
    BitAnd,
    BitOr,
    BitXor,
    BitClear,
    Shl,
    Shr,
}

impl BinOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::And => "&&",
            BinOp::Or => "||",
            BinOp::BitAnd => "&",
            BinOp::BitOr => "|",
            BinOp::BitXor => "^",
            BinOp::BitClear => "&^",
            BinOp::Shl => "<<",
            BinOp::Shr => ">>",
        }
    }

    /// Go operator precedence (higher binds tighter)
    pub fn precedence(self) -> u8 {
        match self {
            BinOp::Or => 1,
            BinOp::And => 2,
            BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => 3,
            BinOp::Add | BinOp::Sub | BinOp::BitOr | BinOp::BitXor => 4,
            BinOp::Mul
            | BinOp::Div
            | BinOp::Mod
            | BinOp::BitAnd
            | BinOp::BitClear
            | BinOp::Shl
            | BinOp::Shr => 5,
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,    // -x
    Plus,   // +x
    Not,    // !x
    BitNot, // ^x
}

impl UnOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnOp::Neg => "-",
            UnOp::Plus => "+",
            UnOp::Not => "!",
            UnOp::BitNot => "^",
        }
    }
}

/// Assignment operators (`=`, `:=`, `+=`, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    Define,
    Compound(BinOp),
}

impl AssignOp {
    pub fn symbol(self) -> String {
        match self {
            AssignOp::Assign => "=".to_string(),
            AssignOp::Define => ":=".to_string(),
            AssignOp::Compound(op) => format!("{}=", op.symbol()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncDecOp {
    Inc,
    Dec,
}

/// Function parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub param_type: TypeExpr,
}

/// A `{ ... }` statement list with the positions of both braces
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub location: SourceLocation,
    pub end: SourceLocation,
}

/// Top-level function declaration
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: String,
    pub params: Vec<Param>,
    pub result: Option<TypeExpr>,
    pub body: Block,
    pub location: SourceLocation,
}

/// Element of a composite literal (`key: value` or plain `value`)
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub key: Option<Expr>,
    pub value: Expr,
}

/// Expressions
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    IntLiteral(i64, SourceLocation),
    FloatLiteral(f64, SourceLocation),
    StringLiteral(String, SourceLocation),
    /// Rune literal, kept apart from ints only so the printer can echo it
    CharLiteral(char, SourceLocation),
    Ident(String, SourceLocation),
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
        location: SourceLocation,
    },
    Unary {
        op: UnOp,
        operand: Box<Expr>,
        location: SourceLocation,
    },
    Paren(Box<Expr>, SourceLocation),
    Composite {
        literal_type: TypeExpr,
        elements: Vec<Element>,
        location: SourceLocation,
    },
    Index {
        target: Box<Expr>,
        index: Box<Expr>,
        location: SourceLocation,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        location: SourceLocation,
    },
    Selector {
        target: Box<Expr>,
        field: String,
        location: SourceLocation,
    },
    /// A type used in expression position, e.g. the argument of `make`
    Type(TypeExpr, SourceLocation),
}

impl Expr {
    pub fn location(&self) -> SourceLocation {
        match self {
            Expr::IntLiteral(_, loc)
            | Expr::FloatLiteral(_, loc)
            | Expr::StringLiteral(_, loc)
            | Expr::CharLiteral(_, loc)
            | Expr::Ident(_, loc)
            | Expr::Paren(_, loc)
            | Expr::Type(_, loc) => *loc,
            Expr::Binary { location, .. }
            | Expr::Unary { location, .. }
            | Expr::Composite { location, .. }
            | Expr::Index { location, .. }
            | Expr::Call { location, .. }
            | Expr::Selector { location, .. } => *location,
        }
    }

    /// Identifier name, if this is a bare identifier
    pub fn as_ident(&self) -> Option<&str> {
        match self {
            Expr::Ident(name, _) => Some(name),
            _ => None,
        }
    }
}

/// Statements
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `a, b = x, y`, `x := 1`, `x += 2`
    Assign {
        lhs: Vec<Expr>,
        op: AssignOp,
        rhs: Vec<Expr>,
        location: SourceLocation,
    },
    /// `var x int = 1` / `const n = 3`
    VarDecl {
        names: Vec<String>,
        var_type: Option<TypeExpr>,
        values: Vec<Expr>,
        is_const: bool,
        location: SourceLocation,
    },
    If {
        init: Option<Box<Stmt>>,
        condition: Expr,
        then_block: Block,
        /// Either `Stmt::Block` or a chained `Stmt::If`
        else_branch: Option<Box<Stmt>>,
        location: SourceLocation,
    },
    For {
        init: Option<Box<Stmt>>,
        condition: Option<Expr>,
        post: Option<Box<Stmt>>,
        body: Block,
        location: SourceLocation,
    },
    Range {
        key: Option<String>,
        value: Option<String>,
        define: bool,
        collection: Expr,
        body: Block,
        location: SourceLocation,
    },
    IncDec {
        target: Expr,
        op: IncDecOp,
        location: SourceLocation,
    },
    Return {
        results: Vec<Expr>,
        location: SourceLocation,
    },
    Expr {
        expr: Expr,
        location: SourceLocation,
    },
    Break {
        location: SourceLocation,
    },
    Continue {
        location: SourceLocation,
    },
    Block(Block),
    /// Constructs outside the subset (`switch`, `defer`, `go`, ...), kept only
    /// so the outline and step numbering can skip them
    Unsupported {
        keyword: String,
        location: SourceLocation,
    },
}

impl Stmt {
    pub fn location(&self) -> SourceLocation {
        match self {
            Stmt::Assign { location, .. }
            | Stmt::VarDecl { location, .. }
            | Stmt::If { location, .. }
            | Stmt::For { location, .. }
            | Stmt::Range { location, .. }
            | Stmt::IncDec { location, .. }
            | Stmt::Return { location, .. }
            | Stmt::Expr { location, .. }
            | Stmt::Break { location }
            | Stmt::Continue { location }
            | Stmt::Unsupported { location, .. } => *location,
            Stmt::Block(block) => block.location,
        }
    }

    /// Last source line covered by this statement
    pub fn end_line(&self) -> usize {
        match self {
            Stmt::If {
                then_block,
                else_branch,
                ..
            } => else_branch
                .as_ref()
                .map(|e| e.end_line())
                .unwrap_or(then_block.end.line),
            Stmt::For { body, .. } | Stmt::Range { body, .. } => body.end.line,
            Stmt::Block(block) => block.end.line,
            other => other.location().line,
        }
    }
}

/// Top-level program structure
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub package: String,
    pub imports: Vec<String>,
    pub functions: Vec<FunctionDecl>,
}

impl Program {
    pub fn new() -> Self {
        Program::default()
    }

    pub fn function(&self, name: &str) -> Option<&FunctionDecl> {
        self.functions.iter().find(|f| f.name == name)
    }
}
