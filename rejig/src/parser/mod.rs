//! The front-end: parsing source text into the lossless tree.
//!
//! This is the collaborator boundary the engine sits behind: `parse`
//! produces a tree, diagnostics, and an attributed type graph. The engine
//! consumes that output as given and never re-derives name resolution.

pub mod lexer;

use std::path::PathBuf;
use std::sync::Arc;

use compact_str::CompactString;

use crate::semantic::attribution;
use crate::tree::{
    Annotation, Assignment, Binary, BinaryOp, Block, ClassDecl, ClassKeyword, CompilationUnit,
    Container, ControlParens, Else, Empty, Expression, FieldAccess, Identifier, If, Import,
    LeftPadded, Literal, LiteralValue, MethodDecl, MethodInvocation, Modifier, ModifierKind,
    NamedVariable, NewClass, NodeId, Package, ParameterizedType, Parentheses, Return, RightPadded,
    Space, Statement, Throw, Unary, UnaryOp, VariableDecls, While,
};
use crate::visitor::SourceFile;
use lexer::{lex, Token, TokenKind};

/// A syntax error with its 1-indexed source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// What went wrong.
    pub message: String,
    /// 1-indexed line.
    pub line: usize,
    /// 1-indexed column.
    pub column: usize,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.column, self.message)
    }
}

impl std::error::Error for ParseError {}

/// Internal error carrying a byte offset; converted to line/column at the
/// public boundary.
#[derive(Debug)]
struct Issue {
    message: String,
    offset: usize,
}

type R<T> = Result<T, Issue>;

/// Converts a byte offset to a 1-indexed line/column pair.
fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let clamped = offset.min(source.len());
    let before = &source[..clamped];
    let line = before.bytes().filter(|b| *b == b'\n').count() + 1;
    let column = before
        .rfind('\n')
        .map_or(clamped + 1, |pos| clamped - pos);
    (line, column)
}

fn to_parse_error(issue: Issue, source: &str) -> ParseError {
    let (line, column) = line_col(source, issue.offset);
    ParseError {
        message: issue.message,
        line,
        column,
    }
}

/// Parses and attributes a source file. The returned tree round-trips:
/// printing it reproduces `source` exactly.
pub fn parse(source: &str, path: impl Into<PathBuf>) -> Result<SourceFile, ParseError> {
    let tokens = lex(source).map_err(|e| {
        to_parse_error(
            Issue {
                message: e.message,
                offset: e.offset,
            },
            source,
        )
    })?;
    let cu = Parser::new(tokens)
        .compilation_unit(path.into())
        .map_err(|issue| to_parse_error(issue, source))?;
    let (cu, arena) = attribution::attribute(cu);
    Ok(SourceFile {
        cu,
        arena: Arc::new(arena),
    })
}

/// Parses a snippet as a list of statements. Used by the template engine.
pub fn parse_statements_fragment(source: &str) -> Result<Vec<RightPadded<Statement>>, ParseError> {
    fragment(source, |p| p.statement_list_until_eof())
}

/// Parses a snippet as a single expression. Used by the template engine.
pub fn parse_expression_fragment(source: &str) -> Result<Expression, ParseError> {
    fragment(source, |p| {
        let expr = p.expression()?;
        p.expect_eof()?;
        Ok(expr)
    })
}

/// Parses a snippet as a single annotation. Used by the template engine.
pub fn parse_annotation_fragment(source: &str) -> Result<Annotation, ParseError> {
    fragment(source, |p| {
        let annotation = p.annotation()?;
        p.expect_eof()?;
        Ok(annotation)
    })
}

fn fragment<T>(source: &str, f: impl FnOnce(&mut Parser) -> R<T>) -> Result<T, ParseError> {
    let tokens = lex(source).map_err(|e| {
        to_parse_error(
            Issue {
                message: e.message,
                offset: e.offset,
            },
            source,
        )
    })?;
    let mut parser = Parser::new(tokens);
    f(&mut parser).map_err(|issue| to_parse_error(issue, source))
}

const MODIFIER_KEYWORDS: &[(&str, ModifierKind)] = &[
    ("public", ModifierKind::Public),
    ("protected", ModifierKind::Protected),
    ("private", ModifierKind::Private),
    ("static", ModifierKind::Static),
    ("final", ModifierKind::Final),
    ("abstract", ModifierKind::Abstract),
];

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_at(&self, ahead: usize) -> &Token {
        let idx = (self.pos + ahead).min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        self.peek_kind() == TokenKind::Ident && self.peek().text == keyword
    }

    fn bump(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> R<Token> {
        if self.peek_kind() == kind {
            Ok(self.bump())
        } else {
            Err(self.unexpected(what))
        }
    }

    fn unexpected(&self, what: &str) -> Issue {
        let token = self.peek();
        let found = if token.kind == TokenKind::Eof {
            "end of input".to_owned()
        } else {
            format!("{:?}", token.text)
        };
        Issue {
            message: format!("expected {what}, found {found}"),
            offset: token.offset,
        }
    }

    fn expect_eof(&mut self) -> R<()> {
        if self.peek_kind() == TokenKind::Eof {
            Ok(())
        } else {
            Err(self.unexpected("end of input"))
        }
    }

    /// Runs a sub-parse, restoring the position when it fails.
    fn attempt<T>(&mut self, f: impl FnOnce(&mut Self) -> R<T>) -> Option<T> {
        let save = self.pos;
        match f(self) {
            Ok(value) => Some(value),
            Err(_) => {
                self.pos = save;
                None
            }
        }
    }

    fn ident_from(token: Token) -> Identifier {
        Identifier {
            id: NodeId::new_v4(),
            prefix: token.space,
            markers: crate::tree::Markers::EMPTY,
            simple_name: CompactString::from(token.text),
            type_ref: None,
            variable: None,
        }
    }

    /// Moves an expression's prefix out to a wrapping node, so the
    /// wrapper's prefix is the leading trivia of its first token.
    fn hoist(expr: Expression) -> (Space, Expression) {
        let prefix = expr.prefix().clone();
        (prefix, expr.with_prefix(Space::EMPTY))
    }

    // ------------------------------------------------------------------
    // Compilation unit
    // ------------------------------------------------------------------

    fn compilation_unit(&mut self, path: PathBuf) -> R<CompilationUnit> {
        let package = if self.peek_keyword("package") {
            let keyword = self.bump();
            let expression = self.qualified_chain(false)?;
            let semi = self.expect(TokenKind::Semi, "';' after package declaration")?;
            Some(RightPadded::with_after(
                Package {
                    id: NodeId::new_v4(),
                    prefix: keyword.space,
                    markers: crate::tree::Markers::EMPTY,
                    expression,
                },
                semi.space,
            ))
        } else {
            None
        };

        let mut imports = Vec::new();
        while self.peek_keyword("import") {
            let keyword = self.bump();
            let statik = if self.peek_keyword("static") {
                Some(self.bump().space)
            } else {
                None
            };
            let qualid = self.qualified_chain(true)?;
            let semi = self.expect(TokenKind::Semi, "';' after import")?;
            imports.push(RightPadded::with_after(
                Import {
                    id: NodeId::new_v4(),
                    prefix: keyword.space,
                    markers: crate::tree::Markers::EMPTY,
                    statik,
                    qualid,
                },
                semi.space,
            ));
        }

        let mut classes = Vec::new();
        while self.peek_kind() != TokenKind::Eof {
            classes.push(Arc::new(self.type_decl()?));
        }
        let eof = self.peek().space.clone();

        Ok(CompilationUnit {
            id: NodeId::new_v4(),
            prefix: Space::EMPTY,
            markers: crate::tree::Markers::EMPTY,
            source_path: path,
            package,
            imports,
            classes,
            eof,
            diagnostics: Vec::new(),
        })
    }

    /// A dotted name chain, optionally ending in `*` (for imports).
    fn qualified_chain(&mut self, allow_star: bool) -> R<Expression> {
        let first = self.expect(TokenKind::Ident, "a name")?;
        let mut expr = Expression::Identifier(Arc::new(Self::ident_from(first)));
        while self.peek_kind() == TokenKind::Dot {
            let dot = self.bump();
            let name = if allow_star && self.peek_kind() == TokenKind::Star {
                let star = self.bump();
                Identifier {
                    id: NodeId::new_v4(),
                    prefix: star.space,
                    markers: crate::tree::Markers::EMPTY,
                    simple_name: CompactString::const_new("*"),
                    type_ref: None,
                    variable: None,
                }
            } else {
                Self::ident_from(self.expect(TokenKind::Ident, "a name after '.'")?)
            };
            let is_star = name.simple_name == "*";
            let (prefix, target) = Self::hoist(expr);
            expr = Expression::FieldAccess(Arc::new(FieldAccess {
                id: NodeId::new_v4(),
                prefix,
                markers: crate::tree::Markers::EMPTY,
                target,
                name: LeftPadded::with_before(dot.space, name),
                type_ref: None,
            }));
            if is_star {
                break;
            }
        }
        Ok(expr)
    }

    // ------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------

    fn annotations(&mut self) -> R<Vec<Annotation>> {
        let mut out = Vec::new();
        while self.peek_kind() == TokenKind::At
            && self.peek_at(1).kind == TokenKind::Ident
            && self.peek_at(1).text != "interface"
        {
            out.push(self.annotation()?);
        }
        Ok(out)
    }

    fn annotation(&mut self) -> R<Annotation> {
        let at = self.expect(TokenKind::At, "'@'")?;
        let annotation_type = self.qualified_chain(false)?;
        let arguments = if self.peek_kind() == TokenKind::LParen {
            Some(self.expression_arguments()?)
        } else {
            None
        };
        Ok(Annotation {
            id: NodeId::new_v4(),
            prefix: at.space,
            markers: crate::tree::Markers::EMPTY,
            annotation_type,
            arguments,
        })
    }

    fn modifiers(&mut self) -> Vec<Modifier> {
        let mut out = Vec::new();
        while self.peek_kind() == TokenKind::Ident {
            let Some((_, kind)) = MODIFIER_KEYWORDS
                .iter()
                .find(|(kw, _)| self.peek().text == *kw)
            else {
                break;
            };
            let token = self.bump();
            out.push(Modifier {
                id: NodeId::new_v4(),
                prefix: token.space,
                markers: crate::tree::Markers::EMPTY,
                kind: *kind,
            });
        }
        out
    }

    fn type_decl(&mut self) -> R<ClassDecl> {
        let leading_annotations = self.annotations()?;
        let modifiers = self.modifiers();
        self.class_decl_rest(leading_annotations, modifiers)
    }

    fn class_keyword(&mut self) -> Option<(Space, ClassKeyword)> {
        if self.peek_keyword("class") {
            return Some((self.bump().space, ClassKeyword::Class));
        }
        if self.peek_keyword("interface") {
            return Some((self.bump().space, ClassKeyword::Interface));
        }
        if self.peek_keyword("enum") {
            return Some((self.bump().space, ClassKeyword::Enum));
        }
        if self.peek_kind() == TokenKind::At && self.peek_at(1).text == "interface" {
            let at = self.bump();
            self.bump();
            return Some((at.space, ClassKeyword::AnnotationType));
        }
        None
    }

    fn class_decl_rest(
        &mut self,
        mut leading_annotations: Vec<Annotation>,
        mut modifiers: Vec<Modifier>,
    ) -> R<ClassDecl> {
        let Some((kind_space, keyword)) = self.class_keyword() else {
            return Err(self.unexpected("a type declaration"));
        };
        let name = Self::ident_from(self.expect(TokenKind::Ident, "a type name")?);

        let extends = if self.peek_keyword("extends") {
            let kw = self.bump();
            Some(LeftPadded::with_before(kw.space, self.type_tree()?))
        } else {
            None
        };

        let implements = if self.peek_keyword("implements") {
            let kw = self.bump();
            let mut elements = Vec::new();
            loop {
                let element = self.type_tree()?;
                if self.peek_kind() == TokenKind::Comma {
                    let comma = self.bump();
                    elements.push(RightPadded::with_after(element, comma.space));
                } else {
                    elements.push(RightPadded::new(element));
                    break;
                }
            }
            Some(Container {
                before: kw.space,
                elements,
                markers: crate::tree::Markers::EMPTY,
            })
        } else {
            None
        };

        let body = self.class_body()?;

        // The declaration's prefix is the trivia of its very first token.
        let prefix = if let Some(first) = leading_annotations.first_mut() {
            std::mem::replace(&mut first.prefix, Space::EMPTY)
        } else if let Some(first) = modifiers.first_mut() {
            std::mem::replace(&mut first.prefix, Space::EMPTY)
        } else {
            kind_space.clone()
        };
        let kind_before = if leading_annotations.is_empty() && modifiers.is_empty() {
            Space::EMPTY
        } else {
            kind_space
        };

        Ok(ClassDecl {
            id: NodeId::new_v4(),
            prefix,
            markers: crate::tree::Markers::EMPTY,
            leading_annotations,
            modifiers,
            kind: LeftPadded::with_before(kind_before, keyword),
            name,
            extends,
            implements,
            body,
            type_ref: None,
        })
    }

    fn class_body(&mut self) -> R<Block> {
        let lbrace = self.expect(TokenKind::LBrace, "'{'")?;
        let mut statements = Vec::new();
        loop {
            match self.peek_kind() {
                TokenKind::RBrace => break,
                TokenKind::Eof => return Err(self.unexpected("'}'")),
                TokenKind::Semi => {
                    let semi = self.bump();
                    statements.push(RightPadded::new(Statement::Empty(Arc::new(Empty {
                        id: NodeId::new_v4(),
                        prefix: semi.space,
                        markers: crate::tree::Markers::EMPTY,
                    }))));
                }
                _ => {
                    let member = self.member()?;
                    let after = if member.needs_terminator() {
                        self.expect(TokenKind::Semi, "';'")?.space
                    } else {
                        Space::EMPTY
                    };
                    statements.push(RightPadded::with_after(member, after));
                }
            }
        }
        let rbrace = self.bump();
        Ok(Block {
            id: NodeId::new_v4(),
            prefix: lbrace.space,
            markers: crate::tree::Markers::EMPTY,
            statements,
            end: rbrace.space,
        })
    }

    fn member(&mut self) -> R<Statement> {
        let leading_annotations = self.annotations()?;
        let modifiers = self.modifiers();

        if self.class_keyword_ahead() {
            let class = self.class_decl_rest(leading_annotations, modifiers)?;
            return Ok(Statement::ClassDecl(Arc::new(class)));
        }

        let type_tree = self.type_tree()?;

        if self.peek_kind() == TokenKind::LParen {
            // Constructor: the "type" was actually the name.
            let Expression::Identifier(name) = type_tree else {
                return Err(self.unexpected("a constructor name"));
            };
            let name = (*name).clone();
            return self.method_rest(leading_annotations, modifiers, None, name);
        }

        let name = Self::ident_from(self.expect(TokenKind::Ident, "a member name")?);
        if self.peek_kind() == TokenKind::LParen {
            self.method_rest(leading_annotations, modifiers, Some(type_tree), name)
        } else {
            let decls =
                self.variable_decls_rest(leading_annotations, modifiers, Some(type_tree), name)?;
            Ok(Statement::VariableDecls(Arc::new(decls)))
        }
    }

    fn class_keyword_ahead(&self) -> bool {
        self.peek_keyword("class")
            || self.peek_keyword("interface")
            || self.peek_keyword("enum")
            || (self.peek_kind() == TokenKind::At && self.peek_at(1).text == "interface")
    }

    fn method_rest(
        &mut self,
        mut leading_annotations: Vec<Annotation>,
        mut modifiers: Vec<Modifier>,
        mut return_type: Option<Expression>,
        mut name: Identifier,
    ) -> R<Statement> {
        let parameters = self.parameter_list()?;

        let throws = if self.peek_keyword("throws") {
            let kw = self.bump();
            let mut elements = Vec::new();
            loop {
                let element = self.type_tree()?;
                if self.peek_kind() == TokenKind::Comma {
                    let comma = self.bump();
                    elements.push(RightPadded::with_after(element, comma.space));
                } else {
                    elements.push(RightPadded::new(element));
                    break;
                }
            }
            Some(Container {
                before: kw.space,
                elements,
                markers: crate::tree::Markers::EMPTY,
            })
        } else {
            None
        };

        let body = if self.peek_kind() == TokenKind::LBrace {
            Some(self.block()?)
        } else {
            // Bodyless declaration: the caller consumes the ';'.
            None
        };

        let prefix = if let Some(first) = leading_annotations.first_mut() {
            std::mem::replace(&mut first.prefix, Space::EMPTY)
        } else if let Some(first) = modifiers.first_mut() {
            std::mem::replace(&mut first.prefix, Space::EMPTY)
        } else if let Some(rt) = return_type.take() {
            let (space, stripped) = Self::hoist(rt);
            return_type = Some(stripped);
            space
        } else {
            std::mem::replace(&mut name.prefix, Space::EMPTY)
        };

        Ok(Statement::MethodDecl(Arc::new(MethodDecl {
            id: NodeId::new_v4(),
            prefix,
            markers: crate::tree::Markers::EMPTY,
            leading_annotations,
            modifiers,
            return_type,
            name,
            parameters,
            throws,
            body,
            method: None,
        })))
    }

    fn parameter_list(&mut self) -> R<Container<Statement>> {
        let lparen = self.expect(TokenKind::LParen, "'('")?;
        let mut elements = Vec::new();
        if self.peek_kind() == TokenKind::RParen {
            let rparen = self.bump();
            elements.push(RightPadded::new(Statement::Empty(Arc::new(Empty {
                id: NodeId::new_v4(),
                prefix: rparen.space,
                markers: crate::tree::Markers::EMPTY,
            }))));
        } else {
            loop {
                let parameter = self.parameter()?;
                if self.peek_kind() == TokenKind::Comma {
                    let comma = self.bump();
                    elements.push(RightPadded::with_after(parameter, comma.space));
                } else {
                    let rparen = self.expect(TokenKind::RParen, "')'")?;
                    elements.push(RightPadded::with_after(parameter, rparen.space));
                    break;
                }
            }
        }
        Ok(Container {
            before: lparen.space,
            elements,
            markers: crate::tree::Markers::EMPTY,
        })
    }

    fn parameter(&mut self) -> R<Statement> {
        let leading_annotations = self.annotations()?;
        let modifiers = self.modifiers();
        let type_tree = self.type_tree()?;
        let varargs = if self.peek_kind() == TokenKind::Ellipsis {
            Some(self.bump().space)
        } else {
            None
        };
        let name = Self::ident_from(self.expect(TokenKind::Ident, "a parameter name")?);
        let mut decls = self.build_variable_decls(leading_annotations, modifiers, Some(type_tree), name, None);
        decls.varargs = varargs;
        Ok(Statement::VariableDecls(Arc::new(decls)))
    }

    fn variable_decls_rest(
        &mut self,
        leading_annotations: Vec<Annotation>,
        modifiers: Vec<Modifier>,
        type_tree: Option<Expression>,
        first_name: Identifier,
    ) -> R<VariableDecls> {
        let initializer = self.initializer_opt()?;
        let mut decls = self.build_variable_decls(
            leading_annotations,
            modifiers,
            type_tree,
            first_name,
            initializer,
        );
        while self.peek_kind() == TokenKind::Comma {
            let comma = self.bump();
            if let Some(last) = decls.vars.last_mut() {
                last.after = comma.space;
            }
            let name = Self::ident_from(self.expect(TokenKind::Ident, "a variable name")?);
            let initializer = self.initializer_opt()?;
            let mut var = NamedVariable {
                id: NodeId::new_v4(),
                prefix: Space::EMPTY,
                markers: crate::tree::Markers::EMPTY,
                name,
                initializer,
                variable: None,
            };
            var.prefix = std::mem::replace(&mut var.name.prefix, Space::EMPTY);
            decls.vars.push(RightPadded::new(var));
        }
        Ok(decls)
    }

    fn initializer_opt(&mut self) -> R<Option<LeftPadded<Expression>>> {
        if self.peek_kind() == TokenKind::Eq {
            let eq = self.bump();
            Ok(Some(LeftPadded::with_before(eq.space, self.expression()?)))
        } else {
            Ok(None)
        }
    }

    fn build_variable_decls(
        &mut self,
        mut leading_annotations: Vec<Annotation>,
        mut modifiers: Vec<Modifier>,
        mut type_tree: Option<Expression>,
        mut name: Identifier,
        initializer: Option<LeftPadded<Expression>>,
    ) -> VariableDecls {
        let prefix = if let Some(first) = leading_annotations.first_mut() {
            std::mem::replace(&mut first.prefix, Space::EMPTY)
        } else if let Some(first) = modifiers.first_mut() {
            std::mem::replace(&mut first.prefix, Space::EMPTY)
        } else if let Some(tt) = type_tree.take() {
            let (space, stripped) = Self::hoist(tt);
            type_tree = Some(stripped);
            space
        } else {
            std::mem::replace(&mut name.prefix, Space::EMPTY)
        };

        let mut var = NamedVariable {
            id: NodeId::new_v4(),
            prefix: Space::EMPTY,
            markers: crate::tree::Markers::EMPTY,
            name,
            initializer,
            variable: None,
        };
        var.prefix = std::mem::replace(&mut var.name.prefix, Space::EMPTY);

        VariableDecls {
            id: NodeId::new_v4(),
            prefix,
            markers: crate::tree::Markers::EMPTY,
            leading_annotations,
            modifiers,
            type_expr: type_tree,
            varargs: None,
            vars: vec![RightPadded::new(var)],
        }
    }

    // ------------------------------------------------------------------
    // Types
    // ------------------------------------------------------------------

    fn type_tree(&mut self) -> R<Expression> {
        let first = self.expect(TokenKind::Ident, "a type")?;
        if first.text == "new" || !Self::type_start(&first.text) {
            return Err(Issue {
                message: format!("{:?} does not start a type", first.text),
                offset: first.offset,
            });
        }
        let mut expr = Expression::Identifier(Arc::new(Self::ident_from(first)));
        while self.peek_kind() == TokenKind::Dot && self.peek_at(1).kind == TokenKind::Ident {
            let dot = self.bump();
            let name = Self::ident_from(self.bump());
            let (prefix, target) = Self::hoist(expr);
            expr = Expression::FieldAccess(Arc::new(FieldAccess {
                id: NodeId::new_v4(),
                prefix,
                markers: crate::tree::Markers::EMPTY,
                target,
                name: LeftPadded::with_before(dot.space, name),
                type_ref: None,
            }));
        }
        if self.peek_kind() == TokenKind::Lt {
            if let Some(parameterized) = self.attempt(|p| p.generic_suffix(expr.clone())) {
                return Ok(parameterized);
            }
        }
        Ok(expr)
    }

    fn type_start(text: &str) -> bool {
        !matches!(
            text,
            "if" | "else" | "while" | "return" | "throw" | "true" | "false" | "null"
        )
    }

    fn generic_suffix(&mut self, clazz: Expression) -> R<Expression> {
        let lt = self.expect(TokenKind::Lt, "'<'")?;
        let mut elements = Vec::new();
        loop {
            let element = self.type_tree()?;
            if self.peek_kind() == TokenKind::Comma {
                let comma = self.bump();
                elements.push(RightPadded::with_after(element, comma.space));
            } else {
                let gt = self.expect(TokenKind::Gt, "'>'")?;
                elements.push(RightPadded::with_after(element, gt.space));
                break;
            }
        }
        let (prefix, clazz) = Self::hoist(clazz);
        Ok(Expression::ParameterizedType(Arc::new(ParameterizedType {
            id: NodeId::new_v4(),
            prefix,
            markers: crate::tree::Markers::EMPTY,
            clazz,
            type_parameters: Container {
                before: lt.space,
                elements,
                markers: crate::tree::Markers::EMPTY,
            },
            type_ref: None,
        })))
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn block(&mut self) -> R<Block> {
        let lbrace = self.expect(TokenKind::LBrace, "'{'")?;
        let mut statements = Vec::new();
        loop {
            match self.peek_kind() {
                TokenKind::RBrace => break,
                TokenKind::Eof => return Err(self.unexpected("'}'")),
                TokenKind::Semi => {
                    let semi = self.bump();
                    statements.push(RightPadded::new(Statement::Empty(Arc::new(Empty {
                        id: NodeId::new_v4(),
                        prefix: semi.space,
                        markers: crate::tree::Markers::EMPTY,
                    }))));
                }
                _ => {
                    let statement = self.statement()?;
                    let after = if statement.needs_terminator() {
                        self.expect(TokenKind::Semi, "';'")?.space
                    } else {
                        Space::EMPTY
                    };
                    statements.push(RightPadded::with_after(statement, after));
                }
            }
        }
        let rbrace = self.bump();
        Ok(Block {
            id: NodeId::new_v4(),
            prefix: lbrace.space,
            markers: crate::tree::Markers::EMPTY,
            statements,
            end: rbrace.space,
        })
    }

    /// Parses statements until end of input, with terminators. Used for
    /// template fragments.
    fn statement_list_until_eof(&mut self) -> R<Vec<RightPadded<Statement>>> {
        let mut statements = Vec::new();
        loop {
            match self.peek_kind() {
                TokenKind::Eof => break,
                TokenKind::Semi => {
                    let semi = self.bump();
                    statements.push(RightPadded::new(Statement::Empty(Arc::new(Empty {
                        id: NodeId::new_v4(),
                        prefix: semi.space,
                        markers: crate::tree::Markers::EMPTY,
                    }))));
                }
                _ => {
                    let statement = self.statement()?;
                    let after = if statement.needs_terminator() {
                        self.expect(TokenKind::Semi, "';'")?.space
                    } else {
                        Space::EMPTY
                    };
                    statements.push(RightPadded::with_after(statement, after));
                }
            }
        }
        Ok(statements)
    }

    fn statement(&mut self) -> R<Statement> {
        if self.peek_kind() == TokenKind::LBrace {
            return Ok(Statement::Block(Arc::new(self.block()?)));
        }
        if self.peek_keyword("if") {
            return self.if_statement();
        }
        if self.peek_keyword("while") {
            return self.while_statement();
        }
        if self.peek_keyword("return") {
            let keyword = self.bump();
            let expression = if self.peek_kind() == TokenKind::Semi {
                None
            } else {
                Some(self.expression()?)
            };
            return Ok(Statement::Return(Arc::new(Return {
                id: NodeId::new_v4(),
                prefix: keyword.space,
                markers: crate::tree::Markers::EMPTY,
                expression,
            })));
        }
        if self.peek_keyword("throw") {
            let keyword = self.bump();
            let exception = self.expression()?;
            return Ok(Statement::Throw(Arc::new(Throw {
                id: NodeId::new_v4(),
                prefix: keyword.space,
                markers: crate::tree::Markers::EMPTY,
                exception,
            })));
        }

        if let Some(decls) = self.attempt(Self::local_variable_decls) {
            return Ok(Statement::VariableDecls(Arc::new(decls)));
        }

        Ok(Statement::Expression(self.expression()?))
    }

    fn local_variable_decls(&mut self) -> R<VariableDecls> {
        let leading_annotations = self.annotations()?;
        let modifiers = self.modifiers();
        let type_tree = self.type_tree()?;
        if self.peek_kind() != TokenKind::Ident || !Self::type_start(&self.peek().text) {
            return Err(self.unexpected("a variable name"));
        }
        let name = Self::ident_from(self.bump());
        self.variable_decls_rest(leading_annotations, modifiers, Some(type_tree), name)
    }

    fn if_statement(&mut self) -> R<Statement> {
        let keyword = self.bump();
        let condition = self.control_parens()?;
        let then_part = self.controlled_statement()?;
        let else_part = if self.peek_keyword("else") {
            let else_kw = self.bump();
            let body = self.controlled_statement()?;
            Some(Else {
                id: NodeId::new_v4(),
                prefix: else_kw.space,
                markers: crate::tree::Markers::EMPTY,
                body,
            })
        } else {
            None
        };
        Ok(Statement::If(Arc::new(If {
            id: NodeId::new_v4(),
            prefix: keyword.space,
            markers: crate::tree::Markers::EMPTY,
            condition,
            then_part,
            else_part,
        })))
    }

    fn while_statement(&mut self) -> R<Statement> {
        let keyword = self.bump();
        let condition = self.control_parens()?;
        let body = self.controlled_statement()?;
        Ok(Statement::While(Arc::new(While {
            id: NodeId::new_v4(),
            prefix: keyword.space,
            markers: crate::tree::Markers::EMPTY,
            condition,
            body,
        })))
    }

    /// A statement in `if`/`while` body position, consuming its own
    /// terminator into the padding.
    fn controlled_statement(&mut self) -> R<RightPadded<Statement>> {
        if self.peek_kind() == TokenKind::Semi {
            let semi = self.bump();
            return Ok(RightPadded::new(Statement::Empty(Arc::new(Empty {
                id: NodeId::new_v4(),
                prefix: semi.space,
                markers: crate::tree::Markers::EMPTY,
            }))));
        }
        let statement = self.statement()?;
        let after = if statement.needs_terminator() {
            self.expect(TokenKind::Semi, "';'")?.space
        } else {
            Space::EMPTY
        };
        Ok(RightPadded::with_after(statement, after))
    }

    fn control_parens(&mut self) -> R<ControlParens> {
        let lparen = self.expect(TokenKind::LParen, "'('")?;
        let expression = self.expression()?;
        let rparen = self.expect(TokenKind::RParen, "')'")?;
        Ok(ControlParens {
            id: NodeId::new_v4(),
            prefix: lparen.space,
            markers: crate::tree::Markers::EMPTY,
            tree: RightPadded::with_after(expression, rparen.space),
        })
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn expression(&mut self) -> R<Expression> {
        self.assignment()
    }

    fn assignment(&mut self) -> R<Expression> {
        let left = self.or_expr()?;
        if self.peek_kind() == TokenKind::Eq {
            let eq = self.bump();
            let value = self.assignment()?;
            let (prefix, variable) = Self::hoist(left);
            return Ok(Expression::Assignment(Arc::new(Assignment {
                id: NodeId::new_v4(),
                prefix,
                markers: crate::tree::Markers::EMPTY,
                variable,
                assignment: LeftPadded::with_before(eq.space, value),
                type_ref: None,
            })));
        }
        Ok(left)
    }

    fn binary_level(
        &mut self,
        next: impl Fn(&mut Self) -> R<Expression>,
        ops: &[(TokenKind, BinaryOp)],
    ) -> R<Expression> {
        let mut left = next(self)?;
        loop {
            let Some((_, op)) = ops.iter().find(|(kind, _)| self.peek_kind() == *kind) else {
                return Ok(left);
            };
            let token = self.bump();
            let right = next(self)?;
            let (prefix, stripped) = Self::hoist(left);
            left = Expression::Binary(Arc::new(Binary {
                id: NodeId::new_v4(),
                prefix,
                markers: crate::tree::Markers::EMPTY,
                left: stripped,
                operator: LeftPadded::with_before(token.space, *op),
                right,
                type_ref: None,
            }));
        }
    }

    fn or_expr(&mut self) -> R<Expression> {
        self.binary_level(Self::and_expr, &[(TokenKind::OrOr, BinaryOp::Or)])
    }

    fn and_expr(&mut self) -> R<Expression> {
        self.binary_level(Self::equality, &[(TokenKind::AndAnd, BinaryOp::And)])
    }

    fn equality(&mut self) -> R<Expression> {
        self.binary_level(
            Self::relational,
            &[
                (TokenKind::EqEq, BinaryOp::Equal),
                (TokenKind::Ne, BinaryOp::NotEqual),
            ],
        )
    }

    fn relational(&mut self) -> R<Expression> {
        self.binary_level(
            Self::additive,
            &[
                (TokenKind::Le, BinaryOp::LessThanOrEqual),
                (TokenKind::Ge, BinaryOp::GreaterThanOrEqual),
                (TokenKind::Lt, BinaryOp::LessThan),
                (TokenKind::Gt, BinaryOp::GreaterThan),
            ],
        )
    }

    fn additive(&mut self) -> R<Expression> {
        self.binary_level(
            Self::multiplicative,
            &[
                (TokenKind::Plus, BinaryOp::Addition),
                (TokenKind::Minus, BinaryOp::Subtraction),
            ],
        )
    }

    fn multiplicative(&mut self) -> R<Expression> {
        self.binary_level(
            Self::unary,
            &[
                (TokenKind::Star, BinaryOp::Multiplication),
                (TokenKind::Slash, BinaryOp::Division),
                (TokenKind::Percent, BinaryOp::Modulo),
            ],
        )
    }

    fn unary(&mut self) -> R<Expression> {
        let op = match self.peek_kind() {
            TokenKind::Not => Some(UnaryOp::Not),
            TokenKind::Minus => Some(UnaryOp::Negative),
            _ => None,
        };
        if let Some(operator) = op {
            let token = self.bump();
            let expression = self.unary()?;
            return Ok(Expression::Unary(Arc::new(Unary {
                id: NodeId::new_v4(),
                prefix: token.space,
                markers: crate::tree::Markers::EMPTY,
                operator,
                expression,
                type_ref: None,
            })));
        }
        self.postfix()
    }

    fn postfix(&mut self) -> R<Expression> {
        let mut expr = self.primary()?;
        while self.peek_kind() == TokenKind::Dot {
            let dot = self.bump();
            let name = Self::ident_from(self.expect(TokenKind::Ident, "a member name")?);
            if self.peek_kind() == TokenKind::LParen {
                let arguments = self.expression_arguments()?;
                let (prefix, select) = Self::hoist(expr);
                expr = Expression::MethodInvocation(Arc::new(MethodInvocation {
                    id: NodeId::new_v4(),
                    prefix,
                    markers: crate::tree::Markers::EMPTY,
                    select: Some(RightPadded::with_after(select, dot.space)),
                    name,
                    arguments,
                    method: None,
                    type_ref: None,
                }));
            } else {
                let (prefix, target) = Self::hoist(expr);
                expr = Expression::FieldAccess(Arc::new(FieldAccess {
                    id: NodeId::new_v4(),
                    prefix,
                    markers: crate::tree::Markers::EMPTY,
                    target,
                    name: LeftPadded::with_before(dot.space, name),
                    type_ref: None,
                }));
            }
        }
        Ok(expr)
    }

    fn primary(&mut self) -> R<Expression> {
        match self.peek_kind() {
            TokenKind::Number => {
                let token = self.bump();
                Ok(Expression::Literal(Arc::new(number_literal(token))))
            }
            TokenKind::Str => {
                let token = self.bump();
                let inner = token.text[1..token.text.len() - 1].to_owned();
                Ok(Expression::Literal(Arc::new(Literal {
                    id: NodeId::new_v4(),
                    prefix: token.space,
                    markers: crate::tree::Markers::EMPTY,
                    value: LiteralValue::String(unescape(&inner)),
                    value_source: token.text,
                    type_ref: None,
                })))
            }
            TokenKind::Char => {
                let token = self.bump();
                let inner = token.text[1..token.text.len() - 1].to_owned();
                let value = unescape(&inner).chars().next().unwrap_or('\0');
                Ok(Expression::Literal(Arc::new(Literal {
                    id: NodeId::new_v4(),
                    prefix: token.space,
                    markers: crate::tree::Markers::EMPTY,
                    value: LiteralValue::Char(value),
                    value_source: token.text,
                    type_ref: None,
                })))
            }
            TokenKind::LParen => {
                let lparen = self.bump();
                let inner = self.expression()?;
                let rparen = self.expect(TokenKind::RParen, "')'")?;
                Ok(Expression::Parentheses(Arc::new(Parentheses {
                    id: NodeId::new_v4(),
                    prefix: lparen.space,
                    markers: crate::tree::Markers::EMPTY,
                    tree: RightPadded::with_after(inner, rparen.space),
                })))
            }
            TokenKind::Ident => {
                let token = self.bump();
                match token.text.as_str() {
                    "true" | "false" => {
                        let value = token.text == "true";
                        Ok(Expression::Literal(Arc::new(Literal {
                            id: NodeId::new_v4(),
                            prefix: token.space,
                            markers: crate::tree::Markers::EMPTY,
                            value: LiteralValue::Boolean(value),
                            value_source: token.text,
                            type_ref: None,
                        })))
                    }
                    "null" => Ok(Expression::Literal(Arc::new(Literal {
                        id: NodeId::new_v4(),
                        prefix: token.space,
                        markers: crate::tree::Markers::EMPTY,
                        value: LiteralValue::Null,
                        value_source: token.text,
                        type_ref: None,
                    }))),
                    "new" => self.new_class(token),
                    _ => {
                        let ident = Self::ident_from(token);
                        if self.peek_kind() == TokenKind::LParen {
                            let arguments = self.expression_arguments()?;
                            let mut name = ident;
                            let prefix = std::mem::replace(&mut name.prefix, Space::EMPTY);
                            Ok(Expression::MethodInvocation(Arc::new(MethodInvocation {
                                id: NodeId::new_v4(),
                                prefix,
                                markers: crate::tree::Markers::EMPTY,
                                select: None,
                                name,
                                arguments,
                                method: None,
                                type_ref: None,
                            })))
                        } else {
                            Ok(Expression::Identifier(Arc::new(ident)))
                        }
                    }
                }
            }
            _ => Err(self.unexpected("an expression")),
        }
    }

    fn new_class(&mut self, new_token: Token) -> R<Expression> {
        let clazz = self.type_tree()?;
        let arguments = self.expression_arguments()?;
        Ok(Expression::NewClass(Arc::new(NewClass {
            id: NodeId::new_v4(),
            prefix: new_token.space,
            markers: crate::tree::Markers::EMPTY,
            clazz,
            arguments,
            type_ref: None,
        })))
    }

    fn expression_arguments(&mut self) -> R<Container<Expression>> {
        let lparen = self.expect(TokenKind::LParen, "'('")?;
        let mut elements = Vec::new();
        if self.peek_kind() == TokenKind::RParen {
            let rparen = self.bump();
            elements.push(RightPadded::new(Expression::Empty(Arc::new(Empty {
                id: NodeId::new_v4(),
                prefix: rparen.space,
                markers: crate::tree::Markers::EMPTY,
            }))));
        } else {
            loop {
                let element = self.expression()?;
                if self.peek_kind() == TokenKind::Comma {
                    let comma = self.bump();
                    elements.push(RightPadded::with_after(element, comma.space));
                } else {
                    let rparen = self.expect(TokenKind::RParen, "')'")?;
                    elements.push(RightPadded::with_after(element, rparen.space));
                    break;
                }
            }
        }
        Ok(Container {
            before: lparen.space,
            elements,
            markers: crate::tree::Markers::EMPTY,
        })
    }
}

fn number_literal(token: Token) -> Literal {
    let cleaned: String = token
        .text
        .chars()
        .filter(|c| *c != '_')
        .collect();
    let value = if let Some(hex) = cleaned
        .strip_prefix("0x")
        .or_else(|| cleaned.strip_prefix("0X"))
    {
        let digits = hex.trim_end_matches(['l', 'L']);
        LiteralValue::Integer(i64::from_str_radix(digits, 16).unwrap_or(0))
    } else {
        let stripped = cleaned.trim_end_matches(['l', 'L', 'f', 'F', 'd', 'D']);
        if stripped.contains('.') || cleaned.ends_with(['f', 'F', 'd', 'D']) {
            LiteralValue::Double(stripped.parse().unwrap_or(0.0))
        } else {
            LiteralValue::Integer(stripped.parse().unwrap_or(0))
        }
    };
    Literal {
        id: NodeId::new_v4(),
        prefix: token.space,
        markers: crate::tree::Markers::EMPTY,
        value,
        value_source: token.text,
        type_ref: None,
    }
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                Some('0') => out.push('\0'),
                Some(other) => out.push(other),
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}
