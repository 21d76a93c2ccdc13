//! Text to expression parsing
//!
//! Grammar (lowest to highest precedence):
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := ('-' | '+') unary | power
//! power   := primary (('**' | '^') unary)?
//! primary := number | ident | ident '(' args? ')' | '(' expr ')'
//! ```
//!
//! Powers are right-associative, and `-x**2` is `-(x**2)`.

use crate::coeff::Coefficient;
use crate::expr::{ElemFunc, SymExpr};
use crate::normalize::canonical;
use crate::{Result, SymbolicError};
use logos::Logos;

#[derive(Logos, Debug, PartialEq, Clone, Copy)]
#[logos(skip r"[ \t\n\r]+")]
enum Token {
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,
    #[regex(r"\d+\.\d*([eE][+-]?\d+)?")]
    #[regex(r"\d+[eE][+-]?\d+")]
    Float,
    #[regex(r"\d+")]
    Integer,
    #[token("**")]
    StarStar,
    #[token("^")]
    Caret,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(",")]
    Comma,
}

#[derive(Debug, Clone)]
struct SpannedToken<'a> {
    token: Token,
    lexeme: &'a str,
    start: usize,
}

fn tokenize(input: &str) -> Result<Vec<SpannedToken<'_>>> {
    let mut lex = Token::lexer(input);
    let mut out = Vec::new();
    while let Some(res) = lex.next() {
        let span = lex.span();
        match res {
            Ok(token) => out.push(SpannedToken {
                token,
                lexeme: lex.slice(),
                start: span.start,
            }),
            Err(_) => {
                return Err(SymbolicError::Parse {
                    position: span.start,
                    message: format!("unexpected character '{}'", lex.slice()),
                })
            }
        }
    }
    Ok(out)
}

struct Parser<'a> {
    tokens: Vec<SpannedToken<'a>>,
    pos: usize,
    end: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).map(|t| t.token)
    }

    fn position(&self) -> usize {
        self.tokens.get(self.pos).map(|t| t.start).unwrap_or(self.end)
    }

    fn next(&mut self) -> Option<SpannedToken<'a>> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn consume(&mut self, token: Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn error<T>(&self, message: impl Into<String>) -> Result<T> {
        Err(SymbolicError::Parse {
            position: self.position(),
            message: message.into(),
        })
    }

    fn expect(&mut self, token: Token, what: &str) -> Result<()> {
        if self.consume(token) {
            Ok(())
        } else {
            self.error(format!("expected {what}"))
        }
    }

    fn parse_expr(&mut self) -> Result<SymExpr> {
        let mut lhs = self.parse_term()?;
        loop {
            if self.consume(Token::Plus) {
                lhs = lhs + self.parse_term()?;
            } else if self.consume(Token::Minus) {
                lhs = lhs - self.parse_term()?;
            } else {
                return Ok(lhs);
            }
        }
    }

    fn parse_term(&mut self) -> Result<SymExpr> {
        let mut lhs = self.parse_unary()?;
        loop {
            if self.consume(Token::Star) {
                lhs = lhs * self.parse_unary()?;
            } else if self.consume(Token::Slash) {
                lhs = lhs / self.parse_unary()?;
            } else {
                return Ok(lhs);
            }
        }
    }

    fn parse_unary(&mut self) -> Result<SymExpr> {
        if self.consume(Token::Minus) {
            return Ok(-self.parse_unary()?);
        }
        if self.consume(Token::Plus) {
            return self.parse_unary();
        }
        self.parse_power()
    }

    fn parse_power(&mut self) -> Result<SymExpr> {
        let base = self.parse_primary()?;
        if self.consume(Token::StarStar) || self.consume(Token::Caret) {
            let exp = self.parse_unary()?;
            return Ok(base.pow_expr(&exp));
        }
        Ok(base)
    }

    fn parse_primary(&mut self) -> Result<SymExpr> {
        let Some(tok) = self.next() else {
            return self.error("unexpected end of input");
        };
        match tok.token {
            Token::Integer => Ok(match tok.lexeme.parse::<i64>() {
                Ok(n) => SymExpr::int(n),
                Err(_) => self.parse_float(&tok)?,
            }),
            Token::Float => self.parse_float(&tok),
            Token::Ident => {
                if self.consume(Token::LParen) {
                    let args = self.parse_args()?;
                    self.call(tok.lexeme, args, tok.start)
                } else {
                    Ok(SymExpr::var(tok.lexeme))
                }
            }
            Token::LParen => {
                let inner = self.parse_expr()?;
                self.expect(Token::RParen, "')'")?;
                Ok(inner)
            }
            _ => Err(SymbolicError::Parse {
                position: tok.start,
                message: format!("unexpected token '{}'", tok.lexeme),
            }),
        }
    }

    fn parse_float(&self, tok: &SpannedToken<'_>) -> Result<SymExpr> {
        tok.lexeme
            .parse::<f64>()
            .map(|f| SymExpr::num(Coefficient::float(f)))
            .map_err(|e| SymbolicError::Parse {
                position: tok.start,
                message: format!("invalid number '{}': {e}", tok.lexeme),
            })
    }

    /// Arguments after an opening parenthesis, through the closing one.
    fn parse_args(&mut self) -> Result<Vec<SymExpr>> {
        let mut args = Vec::new();
        if self.consume(Token::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_expr()?);
            if self.consume(Token::Comma) {
                continue;
            }
            self.expect(Token::RParen, "',' or ')'")?;
            return Ok(args);
        }
    }

    fn call(&self, name: &str, mut args: Vec<SymExpr>, position: usize) -> Result<SymExpr> {
        let known = name == "sqrt" || ElemFunc::from_name(name).is_some();
        if known && args.len() != 1 {
            return Err(SymbolicError::Parse {
                position,
                message: format!("{name} takes 1 argument, got {}", args.len()),
            });
        }
        if name == "sqrt" {
            return Ok(args.remove(0).pow_expr(&SymExpr::rational(1, 2)));
        }
        match ElemFunc::from_name(name) {
            Some(f) => Ok(canonical(&SymExpr::func(f, args.remove(0)))),
            None => Ok(SymExpr::undef(name, args)),
        }
    }
}

/// Parse an expression such as `"1 - a/r"` or `"f1(a, x2)*sin(theta)**2"`.
///
/// Known elementary function names map to their functions, `sqrt(x)` to
/// `x**(1/2)`; any other called name becomes an undefined function, and
/// `f()` is the bare undefined function `f`. The result is canonical.
pub fn parse(input: &str) -> Result<SymExpr> {
    let tokens = tokenize(input)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        end: input.len(),
    };
    let expr = parser.parse_expr()?;
    if parser.pos < parser.tokens.len() {
        return parser.error("unexpected trailing input");
    }
    log::trace!("parsed {input:?} as {expr}");
    Ok(expr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence() {
        let x = SymExpr::var("x");
        let y = SymExpr::var("y");
        assert_eq!(parse("x + 2*y").unwrap(), &x + 2 * &y);
        assert_eq!(parse("-x**2").unwrap(), -x.powi(2));
        assert_eq!(parse("2^3^2").unwrap(), SymExpr::int(512));
        assert_eq!(parse("(x + y)/2").unwrap(), (&x + &y) / 2);
    }

    #[test]
    fn test_numbers() {
        assert_eq!(parse("3/6").unwrap(), SymExpr::rational(1, 2));
        assert_eq!(parse("11.89").unwrap(), SymExpr::num(Coefficient::float(11.89)));
        assert!(parse("99999999999999999999").unwrap().as_coeff().is_some_and(|c| c.is_float()));
    }

    #[test]
    fn test_functions() {
        let theta = SymExpr::var("theta");
        assert_eq!(parse("sin(theta)").unwrap(), SymExpr::sin(theta.clone()));
        assert_eq!(parse("sqrt(theta)").unwrap(), SymExpr::sqrt(theta.clone()));
        assert_eq!(
            parse("f1(a, x2)").unwrap(),
            SymExpr::undef("f1", vec![SymExpr::var("a"), SymExpr::var("x2")])
        );
        assert_eq!(parse("f3()").unwrap(), SymExpr::undef("f3", vec![]));
    }

    #[test]
    fn test_errors() {
        assert!(matches!(parse("x +"), Err(SymbolicError::Parse { position: 3, .. })));
        assert!(matches!(parse("(x"), Err(SymbolicError::Parse { .. })));
        assert!(matches!(parse("x $ y"), Err(SymbolicError::Parse { position: 2, .. })));
        assert!(matches!(parse("sin(x, y)"), Err(SymbolicError::Parse { .. })));
        assert!(matches!(parse("x y"), Err(SymbolicError::Parse { position: 2, .. })));
    }
}
