//! Annotation parser.
//!
//! Recursive descent over the on-demand [`lexer`], producing an [`ast::TypeNode`].
//! Precedence, loosest first: `|`, `&`, `?` prefix, then postfix `[]` over an
//! atom (which includes generic application `Name<...>`).
pub mod ast;
pub mod lexer;

use std::collections::VecDeque;

use ast::{
    ArrayShape, CallableParam, CallableSignature, ConstArrayItem, ConstExpr, ShapeItem, ShapeKey, ShapeKind,
    TypeNode,
};
use lexer::{Lexer, Token, TokenKind};

use crate::error::ParseError;

type PResult<T> = Result<T, ParseError>;

const CALLABLE_NAMES: [&str; 5] = ["callable", "Closure", "\\Closure", "pure-callable", "pure-Closure"];

/// Nesting allowed for groups, generics, shapes, callables and constant arrays.
pub const MAX_DEPTH: usize = 128;

/// Parses `src` as a single type expression; the whole input must be consumed.
pub fn parse(src: &str) -> PResult<TypeNode> {
    let mut parser = Parser::new(src);
    let node = parser.parse_type()?;
    if *parser.peek() != TokenKind::Eof {
        return Err(parser.unexpected("end of input"));
    }
    Ok(node)
}

/// Parses the type expression at the start of `src`.
///
/// Returns the node and the byte offset right after it; whatever follows
/// (a variable name, a description) is left unparsed.
pub fn parse_prefix(src: &str) -> PResult<(TypeNode, usize)> {
    let mut parser = Parser::new(src);
    let node = parser.parse_type()?;
    Ok((node, parser.last_end))
}

struct Parser<'a> {
    lexer: Lexer<'a>,
    buffer: VecDeque<Token>,
    last_end: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self { lexer: Lexer::new(src), buffer: VecDeque::new(), last_end: 0, depth: 0 }
    }

    fn peek_nth(&mut self, n: usize) -> &TokenKind {
        while self.buffer.len() <= n {
            let token = self.lexer.next_token();
            self.buffer.push_back(token);
        }
        &self.buffer[n].kind
    }

    fn peek(&mut self) -> &TokenKind {
        self.peek_nth(0)
    }

    fn bump(&mut self) -> Token {
        let token = match self.buffer.pop_front() {
            Some(token) => token,
            None => self.lexer.next_token(),
        };
        self.last_end = token.end;
        token
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek() == kind {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> PResult<Token> {
        if *self.peek() == kind {
            Ok(self.bump())
        } else {
            Err(self.unexpected(&kind.describe()))
        }
    }

    fn unexpected(&mut self, expected: &str) -> ParseError {
        self.peek();
        match self.buffer.front() {
            Some(Token { kind: TokenKind::Invalid(what), start, .. }) => ParseError::new(what.clone(), *start),
            Some(token) => {
                ParseError::new(format!("expected {expected}, found {}", token.kind.describe()), token.start)
            }
            None => ParseError::new(format!("expected {expected}"), self.last_end),
        }
    }

    /// Runs `f` one nesting level deeper, failing past [`MAX_DEPTH`].
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        if self.depth >= MAX_DEPTH {
            let offset = self.current_offset();
            return Err(ParseError::new(format!("nesting deeper than {MAX_DEPTH} levels"), offset));
        }
        self.depth += 1;
        let out = f(self);
        self.depth -= 1;
        out
    }

    // ------------------------------ Types -------------------------------- //

    fn parse_type(&mut self) -> PResult<TypeNode> {
        let first = self.parse_intersection()?;
        if *self.peek() != TokenKind::Pipe {
            return Ok(first);
        }
        let mut members = vec![first];
        while self.eat(&TokenKind::Pipe) {
            members.push(self.parse_intersection()?);
        }
        Ok(TypeNode::Union(members))
    }

    /// `&` directly before `$name` or `...` marks a by-ref callable parameter.
    fn at_intersection(&mut self) -> bool {
        *self.peek() == TokenKind::Amp
            && !matches!(self.peek_nth(1), TokenKind::Variable(_) | TokenKind::Ellipsis)
    }

    fn parse_intersection(&mut self) -> PResult<TypeNode> {
        let first = self.parse_nullable()?;
        if !self.at_intersection() {
            return Ok(first);
        }
        let mut members = vec![first];
        while self.at_intersection() {
            self.bump();
            members.push(self.parse_nullable()?);
        }
        Ok(TypeNode::Intersection(members))
    }

    fn parse_nullable(&mut self) -> PResult<TypeNode> {
        if self.eat(&TokenKind::Question) {
            return Ok(TypeNode::Nullable(Box::new(self.parse_postfix()?)));
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> PResult<TypeNode> {
        let mut node = self.parse_atom()?;
        while *self.peek() == TokenKind::OpenSquare && *self.peek_nth(1) == TokenKind::CloseSquare {
            self.bump();
            self.bump();
            node = TypeNode::Array(Box::new(node));
        }
        Ok(node)
    }

    fn parse_atom(&mut self) -> PResult<TypeNode> {
        self.nested(Self::parse_atom_at_depth)
    }

    fn parse_atom_at_depth(&mut self) -> PResult<TypeNode> {
        match self.peek().clone() {
            TokenKind::OpenParen => {
                self.bump();
                let inner = self.parse_type()?;
                self.expect(TokenKind::CloseParen)?;
                Ok(inner)
            }
            TokenKind::This => {
                self.bump();
                Ok(TypeNode::This)
            }
            TokenKind::Int(_) | TokenKind::Float(_) | TokenKind::Str(_) | TokenKind::OpenSquare => {
                Ok(TypeNode::Const(self.parse_const_expr()?))
            }
            TokenKind::Identifier(name) => {
                self.bump();
                self.parse_after_identifier(name)
            }
            _ => Err(self.unexpected("type")),
        }
    }

    fn parse_after_identifier(&mut self, name: String) -> PResult<TypeNode> {
        match self.peek() {
            TokenKind::OpenAngle => {
                self.bump();
                let args = self.parse_list(TokenKind::CloseAngle, Self::parse_type)?;
                if args.is_empty() {
                    return Err(ParseError::new("generic type requires at least one argument", self.last_end));
                }
                Ok(TypeNode::Generic { base: Box::new(TypeNode::Identifier(name)), args })
            }
            TokenKind::OpenCurly => {
                if let Some(kind) = ShapeKind::from_name(&name) {
                    self.bump();
                    return self.parse_array_shape(kind);
                }
                if name == "object" {
                    self.bump();
                    return self.parse_object_shape();
                }
                Ok(TypeNode::Identifier(name))
            }
            TokenKind::OpenParen if CALLABLE_NAMES.contains(&name.as_str()) => {
                self.bump();
                self.parse_callable(name)
            }
            TokenKind::DoubleColon => {
                self.bump();
                Ok(TypeNode::Const(self.parse_const_fetch(name)?))
            }
            _ => Ok(TypeNode::Identifier(name)),
        }
    }

    /// Comma-separated items up to `close`; a trailing comma is accepted.
    fn parse_list<T>(&mut self, close: TokenKind, mut item: impl FnMut(&mut Self) -> PResult<T>) -> PResult<Vec<T>> {
        let mut items = Vec::new();
        loop {
            if self.eat(&close) {
                return Ok(items);
            }
            items.push(item(self)?);
            if !self.eat(&TokenKind::Comma) {
                self.expect(close.clone())?;
                return Ok(items);
            }
        }
    }

    // ------------------------------ Shapes ------------------------------- //

    fn parse_array_shape(&mut self, kind: ShapeKind) -> PResult<TypeNode> {
        let mut shape = ArrayShape { kind, items: Vec::new(), sealed: true, unsealed: None };
        loop {
            if self.eat(&TokenKind::CloseCurly) {
                break;
            }
            if self.eat(&TokenKind::Ellipsis) {
                shape.sealed = false;
                if self.eat(&TokenKind::OpenAngle) {
                    let mut args = self.parse_list(TokenKind::CloseAngle, Self::parse_type)?;
                    shape.unsealed = match (args.pop(), args.pop(), args.is_empty()) {
                        (Some(value), key, true) => Some((key.map(Box::new), Box::new(value))),
                        _ => return Err(ParseError::new("unsealed shape takes one or two types", self.last_end)),
                    };
                }
                self.eat(&TokenKind::Comma);
                self.expect(TokenKind::CloseCurly)?;
                break;
            }
            shape.items.push(self.parse_shape_item()?);
            if !self.eat(&TokenKind::Comma) {
                self.expect(TokenKind::CloseCurly)?;
                break;
            }
        }
        Ok(TypeNode::ArrayShape(shape))
    }

    fn parse_object_shape(&mut self) -> PResult<TypeNode> {
        let items = self.parse_list(TokenKind::CloseCurly, |p| {
            let offset = p.current_offset();
            let item = p.parse_shape_item()?;
            match item.key {
                Some(_) => Ok(item),
                None => Err(ParseError::new("object shape items require a key", offset)),
            }
        })?;
        Ok(TypeNode::ObjectShape(items))
    }

    fn current_offset(&mut self) -> usize {
        self.peek();
        self.buffer.front().map_or(self.last_end, |t| t.start)
    }

    fn parse_shape_item(&mut self) -> PResult<ShapeItem> {
        let is_key = matches!(self.peek(), TokenKind::Identifier(_) | TokenKind::Int(_) | TokenKind::Str(_));
        let keyed = is_key
            && match self.peek_nth(1) {
                TokenKind::Colon => true,
                TokenKind::Question => *self.peek_nth(2) == TokenKind::Colon,
                _ => false,
            };
        if !keyed {
            return Ok(ShapeItem { key: None, optional: false, value: self.parse_type()? });
        }

        let key = match self.bump().kind {
            TokenKind::Identifier(name) => ShapeKey::Name(name),
            TokenKind::Int(v) => ShapeKey::Int(v),
            TokenKind::Str(s) => ShapeKey::Str(s),
            other => return Err(ParseError::new(format!("invalid shape key {}", other.describe()), self.last_end)),
        };
        let optional = self.eat(&TokenKind::Question);
        self.expect(TokenKind::Colon)?;
        Ok(ShapeItem { key: Some(key), optional, value: self.parse_type()? })
    }

    // ----------------------------- Callables ----------------------------- //

    fn parse_callable(&mut self, name: String) -> PResult<TypeNode> {
        let params = self.parse_list(TokenKind::CloseParen, Self::parse_callable_param)?;
        self.expect(TokenKind::Colon)?;
        let return_type = Box::new(self.parse_nullable()?);
        Ok(TypeNode::Callable(CallableSignature { name, params, return_type }))
    }

    fn parse_callable_param(&mut self) -> PResult<CallableParam> {
        let ty = self.parse_type()?;
        let by_ref = self.eat(&TokenKind::Amp);
        let variadic = self.eat(&TokenKind::Ellipsis);
        let name = match self.peek() {
            TokenKind::Variable(_) => match self.bump().kind {
                TokenKind::Variable(name) => Some(name),
                _ => None,
            },
            _ => None,
        };
        let optional = self.eat(&TokenKind::Equal);
        Ok(CallableParam { ty, by_ref, variadic, name, optional })
    }

    // ---------------------------- Constants ------------------------------ //

    fn parse_const_expr(&mut self) -> PResult<ConstExpr> {
        self.nested(Self::parse_const_expr_at_depth)
    }

    fn parse_const_expr_at_depth(&mut self) -> PResult<ConstExpr> {
        match self.peek().clone() {
            TokenKind::Int(v) => {
                self.bump();
                Ok(ConstExpr::Int(v))
            }
            TokenKind::Float(v) => {
                self.bump();
                Ok(ConstExpr::Float(v))
            }
            TokenKind::Str(s) => {
                self.bump();
                Ok(ConstExpr::Str(s))
            }
            TokenKind::OpenSquare => {
                self.bump();
                let items = self.parse_list(TokenKind::CloseSquare, |p| {
                    let first = p.parse_const_expr()?;
                    if p.eat(&TokenKind::Arrow) {
                        Ok(ConstArrayItem { key: Some(first), value: p.parse_const_expr()? })
                    } else {
                        Ok(ConstArrayItem { key: None, value: first })
                    }
                })?;
                Ok(ConstExpr::Array(items))
            }
            TokenKind::Identifier(name) => {
                self.bump();
                if self.eat(&TokenKind::DoubleColon) {
                    self.parse_const_fetch(name)
                } else {
                    Ok(ConstExpr::Name(name))
                }
            }
            _ => Err(self.unexpected("constant expression")),
        }
    }

    /// Constant name after `Class::`, possibly a `PREFIX_*` wildcard.
    fn parse_const_fetch(&mut self, class: String) -> PResult<ConstExpr> {
        let mut name = match self.peek().clone() {
            TokenKind::Identifier(name) => {
                self.bump();
                name
            }
            TokenKind::Star => String::new(),
            _ => return Err(self.unexpected("constant name")),
        };
        if self.eat(&TokenKind::Star) {
            name.push('*');
        }
        Ok(ConstExpr::Fetch { class, name })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ordered_float::OrderedFloat;

    fn id(name: &str) -> TypeNode {
        TypeNode::Identifier(name.into())
    }

    #[test]
    fn precedence() {
        assert_eq!(
            parse("int|A&B|?string").unwrap(),
            TypeNode::Union(vec![
                id("int"),
                TypeNode::Intersection(vec![id("A"), id("B")]),
                TypeNode::Nullable(Box::new(id("string"))),
            ])
        );
        assert_eq!(
            parse("int|(A&B)").unwrap(),
            TypeNode::Union(vec![id("int"), TypeNode::Intersection(vec![id("A"), id("B")])])
        );
    }

    #[test]
    fn generics_and_array_suffixes() {
        assert_eq!(
            parse("array<string, int>[]").unwrap(),
            TypeNode::Array(Box::new(TypeNode::Generic {
                base: Box::new(id("array")),
                args: vec![id("string"), id("int")],
            }))
        );
        assert_eq!(parse("bool[][]").unwrap(), TypeNode::Array(Box::new(TypeNode::Array(Box::new(id("bool"))))));
        assert_eq!(
            parse("int<-5, max>").unwrap(),
            TypeNode::Generic { base: Box::new(id("int")), args: vec![TypeNode::Const(ConstExpr::Int(-5)), id("max")] }
        );
        assert!(parse("Foo<>").is_err());
    }

    #[test]
    fn array_shapes() {
        let TypeNode::ArrayShape(shape) = parse("array{id: int, 'full name'?: string, 0: bool, ...}").unwrap() else {
            panic!("expected shape");
        };
        assert_eq!(shape.kind, ShapeKind::Array);
        assert!(!shape.sealed);
        assert_eq!(shape.items.len(), 3);
        assert_eq!(shape.items[1].key, Some(ShapeKey::Str("full name".into())));
        assert!(shape.items[1].optional);
        assert_eq!(shape.items[2].key, Some(ShapeKey::Int(0)));

        let TypeNode::ArrayShape(list) = parse("list{int, string}").unwrap() else {
            panic!("expected shape");
        };
        assert_eq!(list.kind, ShapeKind::List);
        assert!(list.items.iter().all(|i| i.key.is_none()));

        let TypeNode::ArrayShape(tail) = parse("array{a: int, ...<string, bool>}").unwrap() else {
            panic!("expected shape");
        };
        assert_eq!(tail.unsealed, Some((Some(Box::new(id("string"))), Box::new(id("bool")))));
    }

    #[test]
    fn object_shapes_require_keys() {
        assert!(matches!(parse("object{a: int, b?: string}").unwrap(), TypeNode::ObjectShape(items) if items.len() == 2));
        assert!(parse("object{int}").is_err());
    }

    #[test]
    fn callables() {
        let TypeNode::Callable(sig) = parse("Closure(int $a, string &...$rest=): ?bool").unwrap() else {
            panic!("expected callable");
        };
        assert_eq!(sig.name, "Closure");
        assert_eq!(sig.params.len(), 2);
        assert_eq!(sig.params[0].name.as_deref(), Some("a"));
        let rest = &sig.params[1];
        assert!(rest.by_ref && rest.variadic && rest.optional);
        assert_eq!(*sig.return_type, TypeNode::Nullable(Box::new(id("bool"))));

        assert!(matches!(
            parse("callable(): int|string").unwrap(),
            TypeNode::Union(members) if matches!(members[0], TypeNode::Callable(_))
        ));
        assert!(parse("callable(int)").is_err());
    }

    #[test]
    fn constants() {
        assert_eq!(parse("1.5").unwrap(), TypeNode::Const(ConstExpr::Float(OrderedFloat(1.5))));
        assert_eq!(parse("\"a\"").unwrap(), TypeNode::Const(ConstExpr::Str("a".into())));
        assert_eq!(
            parse("[1, 'k' => true]").unwrap(),
            TypeNode::Const(ConstExpr::Array(vec![
                ConstArrayItem { key: None, value: ConstExpr::Int(1) },
                ConstArrayItem { key: Some(ConstExpr::Str("k".into())), value: ConstExpr::Name("true".into()) },
            ]))
        );
        assert_eq!(
            parse("Foo::BAR_*").unwrap(),
            TypeNode::Const(ConstExpr::Fetch { class: "Foo".into(), name: "BAR_*".into() })
        );
        assert_eq!(parse("$this").unwrap(), TypeNode::This);
    }

    #[test]
    fn full_input_must_be_consumed() {
        let err = parse("int string").unwrap_err();
        assert_eq!(err.offset, 4);
        assert_eq!(err.message, "expected end of input, found identifier \"string\"");
        assert!(parse("").is_err());
        assert!(parse("int|").is_err());
        assert_eq!(parse("'open").unwrap_err().message, "unterminated string literal");
    }

    #[test]
    fn nesting_is_bounded() {
        let nested = |open: &str, close: &str, n: usize| format!("{}int{}", open.repeat(n), close.repeat(n));

        assert_eq!(parse(&nested("(", ")", MAX_DEPTH - 1)).unwrap(), id("int"));
        for src in [
            nested("(", ")", 10_000),
            nested("list<", ">", 10_000),
            nested("array{a: ", "}", 10_000),
            nested("callable(): ", "", 10_000),
            format!("{}1{}", "[".repeat(10_000), "]".repeat(10_000)),
        ] {
            let err = parse(&src).unwrap_err();
            assert_eq!(err.message, format!("nesting deeper than {MAX_DEPTH} levels"));
        }
    }

    #[test]
    fn prefix_stops_after_the_type() {
        let src = "array<string, int> $map The user's map";
        let (node, end) = parse_prefix(src).unwrap();
        assert!(matches!(node, TypeNode::Generic { .. }));
        assert_eq!(&src[end..], " $map The user's map");

        let (_, end) = parse_prefix("int").unwrap();
        assert_eq!(end, 3);
    }
}
