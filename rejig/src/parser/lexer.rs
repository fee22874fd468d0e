//! The trivia-capturing lexer.
//!
//! Every token carries the whitespace and comments that precede it, so the
//! parser can hand each node its exact leading trivia and the printed tree
//! reproduces the input byte for byte.

use crate::tree::{Comment, CommentStyle, Space};

/// Token kinds for the supported language subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// An identifier or keyword (keywords are recognized by text).
    Ident,
    /// An integer or floating-point literal.
    Number,
    /// A string literal, text includes the quotes.
    Str,
    /// A character literal, text includes the quotes.
    Char,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    Le,
    /// `>=`
    Ge,
    /// `==`
    EqEq,
    /// `!=`
    Ne,
    /// `=`
    Eq,
    /// `&&`
    AndAnd,
    /// `||`
    OrOr,
    /// `!`
    Not,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `,`
    Comma,
    /// `;`
    Semi,
    /// `.`
    Dot,
    /// `...`
    Ellipsis,
    /// `@`
    At,
    /// End of input; its space is the file's trailing trivia.
    Eof,
}

/// One lexed token with its leading trivia and source offset.
#[derive(Debug, Clone)]
pub struct Token {
    /// The token kind.
    pub kind: TokenKind,
    /// The exact source text of the token (empty for `Eof`).
    pub text: String,
    /// Whitespace and comments preceding the token.
    pub space: Space,
    /// Byte offset of the token in the source.
    pub offset: usize,
}

/// A lexical error with its byte offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    /// What went wrong.
    pub message: String,
    /// Byte offset where it went wrong.
    pub offset: usize,
}

/// Lexes the whole source into tokens ending with `Eof`.
pub fn lex(source: &str) -> Result<Vec<Token>, LexError> {
    Lexer {
        chars: source.char_indices().peekable(),
        source,
        tokens: Vec::new(),
    }
    .run()
}

struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    source: &'a str,
    tokens: Vec<Token>,
}

impl Lexer<'_> {
    fn run(mut self) -> Result<Vec<Token>, LexError> {
        loop {
            let space = self.trivia()?;
            let Some(&(offset, c)) = self.chars.peek() else {
                self.tokens.push(Token {
                    kind: TokenKind::Eof,
                    text: String::new(),
                    space,
                    offset: self.source.len(),
                });
                return Ok(self.tokens);
            };
            let token = self.token(offset, c)?;
            self.tokens.push(Token { space, ..token });
        }
    }

    /// Consumes whitespace and comments into a [`Space`].
    fn trivia(&mut self) -> Result<Space, LexError> {
        let mut space = Space::EMPTY;
        let mut current = String::new();
        loop {
            match self.chars.peek().copied() {
                Some((_, c)) if c.is_whitespace() => {
                    current.push(c);
                    self.chars.next();
                }
                Some((offset, '/')) => {
                    let mut lookahead = self.chars.clone();
                    lookahead.next();
                    match lookahead.peek().map(|&(_, c)| c) {
                        Some('/') => {
                            self.chars.next();
                            self.chars.next();
                            let mut text = String::new();
                            while let Some(&(_, c)) = self.chars.peek() {
                                if c == '\n' {
                                    break;
                                }
                                text.push(c);
                                self.chars.next();
                            }
                            self.flush_trivia(&mut space, &mut current);
                            space.comments.push(Comment::line(text, ""));
                        }
                        Some('*') => {
                            self.chars.next();
                            self.chars.next();
                            let mut text = String::new();
                            let mut closed = false;
                            while let Some((_, c)) = self.chars.next() {
                                if c == '*' {
                                    if let Some(&(_, '/')) = self.chars.peek() {
                                        self.chars.next();
                                        closed = true;
                                        break;
                                    }
                                }
                                text.push(c);
                            }
                            if !closed {
                                return Err(LexError {
                                    message: "unterminated block comment".to_owned(),
                                    offset,
                                });
                            }
                            self.flush_trivia(&mut space, &mut current);
                            space.comments.push(Comment::block(text, ""));
                        }
                        _ => break,
                    }
                }
                _ => break,
            }
        }
        self.flush_trivia(&mut space, &mut current);
        Ok(space)
    }

    /// Attaches accumulated whitespace to the space: before the first
    /// comment it is the leading whitespace, afterwards it is the previous
    /// comment's suffix.
    fn flush_trivia(&mut self, space: &mut Space, current: &mut String) {
        if current.is_empty() {
            return;
        }
        let text = std::mem::take(current);
        match space.comments.last_mut() {
            Some(comment) => comment.suffix.push_str(&text),
            None => space.whitespace.push_str(&text),
        }
    }

    fn token(&mut self, offset: usize, c: char) -> Result<Token, LexError> {
        let simple = |kind, len: usize, this: &mut Self| {
            let end = offset + len;
            for _ in 0..len {
                this.chars.next();
            }
            Ok(Token {
                kind,
                text: this.source[offset..end].to_owned(),
                space: Space::EMPTY,
                offset,
            })
        };

        match c {
            c if c.is_alphabetic() || c == '_' || c == '$' => {
                let mut end = offset;
                while let Some(&(i, c)) = self.chars.peek() {
                    if c.is_alphanumeric() || c == '_' || c == '$' {
                        end = i + c.len_utf8();
                        self.chars.next();
                    } else {
                        break;
                    }
                }
                Ok(Token {
                    kind: TokenKind::Ident,
                    text: self.source[offset..end].to_owned(),
                    space: Space::EMPTY,
                    offset,
                })
            }
            c if c.is_ascii_digit() => {
                let mut end = offset;
                let mut seen_dot = false;
                while let Some(&(i, c)) = self.chars.peek() {
                    let is_digit = c.is_ascii_digit()
                        || c.is_ascii_hexdigit()
                        || matches!(c, 'x' | 'X' | 'l' | 'L' | 'f' | 'F' | 'd' | 'D' | '_');
                    let is_dot = c == '.' && !seen_dot && {
                        // `1.x` is a number only when a digit follows.
                        let mut lookahead = self.chars.clone();
                        lookahead.next();
                        lookahead.peek().is_some_and(|&(_, n)| n.is_ascii_digit())
                    };
                    if is_digit || is_dot {
                        seen_dot |= is_dot;
                        end = i + c.len_utf8();
                        self.chars.next();
                    } else {
                        break;
                    }
                }
                Ok(Token {
                    kind: TokenKind::Number,
                    text: self.source[offset..end].to_owned(),
                    space: Space::EMPTY,
                    offset,
                })
            }
            '"' => self.quoted(offset, '"', TokenKind::Str),
            '\'' => self.quoted(offset, '\'', TokenKind::Char),
            '{' => simple(TokenKind::LBrace, 1, self),
            '}' => simple(TokenKind::RBrace, 1, self),
            '(' => simple(TokenKind::LParen, 1, self),
            ')' => simple(TokenKind::RParen, 1, self),
            ',' => simple(TokenKind::Comma, 1, self),
            ';' => simple(TokenKind::Semi, 1, self),
            '@' => simple(TokenKind::At, 1, self),
            '+' => simple(TokenKind::Plus, 1, self),
            '-' => simple(TokenKind::Minus, 1, self),
            '*' => simple(TokenKind::Star, 1, self),
            '/' => simple(TokenKind::Slash, 1, self),
            '%' => simple(TokenKind::Percent, 1, self),
            '.' => {
                if self.source[offset..].starts_with("...") {
                    simple(TokenKind::Ellipsis, 3, self)
                } else {
                    simple(TokenKind::Dot, 1, self)
                }
            }
            '=' => {
                if self.source[offset..].starts_with("==") {
                    simple(TokenKind::EqEq, 2, self)
                } else {
                    simple(TokenKind::Eq, 1, self)
                }
            }
            '!' => {
                if self.source[offset..].starts_with("!=") {
                    simple(TokenKind::Ne, 2, self)
                } else {
                    simple(TokenKind::Not, 1, self)
                }
            }
            '<' => {
                if self.source[offset..].starts_with("<=") {
                    simple(TokenKind::Le, 2, self)
                } else {
                    simple(TokenKind::Lt, 1, self)
                }
            }
            '>' => {
                if self.source[offset..].starts_with(">=") {
                    simple(TokenKind::Ge, 2, self)
                } else {
                    simple(TokenKind::Gt, 1, self)
                }
            }
            '&' => {
                if self.source[offset..].starts_with("&&") {
                    simple(TokenKind::AndAnd, 2, self)
                } else {
                    Err(LexError {
                        message: "unsupported character '&'".to_owned(),
                        offset,
                    })
                }
            }
            '|' => {
                if self.source[offset..].starts_with("||") {
                    simple(TokenKind::OrOr, 2, self)
                } else {
                    Err(LexError {
                        message: "unsupported character '|'".to_owned(),
                        offset,
                    })
                }
            }
            other => Err(LexError {
                message: format!("unsupported character {other:?}"),
                offset,
            }),
        }
    }

    fn quoted(&mut self, offset: usize, quote: char, kind: TokenKind) -> Result<Token, LexError> {
        self.chars.next();
        let mut end = None;
        while let Some((i, c)) = self.chars.next() {
            match c {
                '\\' => {
                    self.chars.next();
                }
                c if c == quote => {
                    end = Some(i + c.len_utf8());
                    break;
                }
                _ => {}
            }
        }
        let Some(end) = end else {
            return Err(LexError {
                message: "unterminated literal".to_owned(),
                offset,
            });
        };
        Ok(Token {
            kind,
            text: self.source[offset..end].to_owned(),
            space: Space::EMPTY,
            offset,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source)
            .expect("lexes")
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn trivia_attaches_to_following_token() {
        let tokens = lex("  foo").expect("lexes");
        assert_eq!(tokens[0].space.whitespace, "  ");
        assert_eq!(tokens[0].text, "foo");
    }

    #[test]
    fn comments_captured_with_suffixes() {
        let tokens = lex("// note\n  x").expect("lexes");
        let space = &tokens[0].space;
        assert_eq!(space.comments.len(), 1);
        assert_eq!(space.comments[0].text, " note");
        assert_eq!(space.comments[0].suffix, "\n  ");
        assert_eq!(space.print(), "// note\n  ");
    }

    #[test]
    fn eof_keeps_trailing_trivia() {
        let tokens = lex("x  \n").expect("lexes");
        let eof = tokens.last().expect("eof");
        assert_eq!(eof.kind, TokenKind::Eof);
        assert_eq!(eof.space.whitespace, "  \n");
    }

    #[test]
    fn operators_lex_greedily() {
        assert_eq!(
            kinds("a <= b == c"),
            vec![
                TokenKind::Ident,
                TokenKind::Le,
                TokenKind::Ident,
                TokenKind::EqEq,
                TokenKind::Ident,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn ellipsis_vs_dot() {
        assert_eq!(
            kinds("a...b.c"),
            vec![
                TokenKind::Ident,
                TokenKind::Ellipsis,
                TokenKind::Ident,
                TokenKind::Dot,
                TokenKind::Ident,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn string_with_escape_round_trips() {
        let tokens = lex(r#""a\"b""#).expect("lexes");
        assert_eq!(tokens[0].text, r#""a\"b""#);
    }

    #[test]
    fn unterminated_string_is_an_error() {
        assert!(lex("\"abc").is_err());
    }
}
