use ordered_float::OrderedFloat;

/// Syntax tree of a type expression, before any name resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeNode {
    Identifier(String),
    This,
    Const(ConstExpr),
    Nullable(Box<TypeNode>),
    Union(Vec<TypeNode>),
    Intersection(Vec<TypeNode>),
    Generic { base: Box<TypeNode>, args: Vec<TypeNode> },
    /// `T[]`
    Array(Box<TypeNode>),
    ArrayShape(ArrayShape),
    ObjectShape(Vec<ShapeItem>),
    Callable(CallableSignature),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Array,
    NonEmptyArray,
    List,
    NonEmptyList,
}

impl ShapeKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "array" => Some(ShapeKind::Array),
            "non-empty-array" => Some(ShapeKind::NonEmptyArray),
            "list" => Some(ShapeKind::List),
            "non-empty-list" => Some(ShapeKind::NonEmptyList),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayShape {
    pub kind: ShapeKind,
    pub items: Vec<ShapeItem>,
    pub sealed: bool,
    /// `...<K, V>` tail of an unsealed shape.
    pub unsealed: Option<(Option<Box<TypeNode>>, Box<TypeNode>)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeItem {
    pub key: Option<ShapeKey>,
    pub optional: bool,
    pub value: TypeNode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeKey {
    Name(String),
    Int(i64),
    Str(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallableSignature {
    /// `callable`, `Closure`, `pure-callable`, ...
    pub name: String,
    pub params: Vec<CallableParam>,
    pub return_type: Box<TypeNode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallableParam {
    pub ty: TypeNode,
    pub by_ref: bool,
    pub variadic: bool,
    pub name: Option<String>,
    pub optional: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstExpr {
    Int(i64),
    Float(OrderedFloat<f64>),
    Str(String),
    Array(Vec<ConstArrayItem>),
    /// Bare name inside a constant array (`true`, `null`, `PHP_EOL`).
    Name(String),
    /// `Class::NAME` or `Class::PREFIX_*`
    Fetch { class: String, name: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstArrayItem {
    pub key: Option<ConstExpr>,
    pub value: ConstExpr,
}
