//! S-expression reader.

use std::fmt;

use super::ParseError;

/// Deepest list nesting the reader accepts.
const MAX_NESTING: usize = 256;

/// A parsed expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    Nil,
    Symbol(String),
    List(Vec<Expr>),
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Int(n) => write!(f, "{n}"),
            Expr::Float(n) => write!(f, "{n:?}"),
            Expr::Str(s) => write!(f, "{s:?}"),
            Expr::Bool(b) => write!(f, "{b}"),
            Expr::Nil => f.write_str("nil"),
            Expr::Symbol(s) => f.write_str(s),
            Expr::List(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(")")
            }
        }
    }
}

/// Top-level forms of one source text, evaluated in order.
pub type Program = Vec<Expr>;

/// Parse every top-level form in `source`.
pub fn parse(source: &str) -> Result<Program, ParseError> {
    let mut reader = Reader {
        src: source,
        pos: 0,
        nesting: 0,
    };
    let mut forms = Vec::new();
    loop {
        reader.skip_trivia();
        if reader.peek().is_none() {
            break;
        }
        forms.push(reader.expr()?);
    }
    if forms.is_empty() {
        return Err(ParseError::new(0, "empty program"));
    }
    Ok(forms)
}

struct Reader<'a> {
    src: &'a str,
    pos: usize,
    nesting: usize,
}

impl Reader<'_> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_trivia(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.bump();
            } else if c == ';' {
                while let Some(c) = self.bump() {
                    if c == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    fn expr(&mut self) -> Result<Expr, ParseError> {
        self.skip_trivia();
        let start = self.pos;
        match self.peek() {
            None => Err(ParseError::new(start, "unexpected end of input")),
            Some('(') => {
                self.bump();
                if self.nesting == MAX_NESTING {
                    return Err(ParseError::new(start, "nesting too deep"));
                }
                self.nesting += 1;
                let mut items = Vec::new();
                loop {
                    self.skip_trivia();
                    match self.peek() {
                        None => return Err(ParseError::new(start, "unclosed '('")),
                        Some(')') => {
                            self.bump();
                            self.nesting -= 1;
                            return Ok(Expr::List(items));
                        }
                        Some(_) => items.push(self.expr()?),
                    }
                }
            }
            Some(')') => Err(ParseError::new(start, "unexpected ')'")),
            Some('\'') => {
                self.bump();
                if self.nesting == MAX_NESTING {
                    return Err(ParseError::new(start, "nesting too deep"));
                }
                self.nesting += 1;
                let quoted = self.expr()?;
                self.nesting -= 1;
                Ok(Expr::List(vec![Expr::Symbol("quote".into()), quoted]))
            }
            Some('"') => self.string(),
            Some(_) => Ok(self.atom()),
        }
    }

    fn string(&mut self) -> Result<Expr, ParseError> {
        let start = self.pos;
        self.bump();
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(ParseError::new(start, "unterminated string")),
                Some('"') => return Ok(Expr::Str(out)),
                Some('\\') => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('"') => out.push('"'),
                    Some('\\') => out.push('\\'),
                    Some(other) => {
                        return Err(ParseError::new(
                            self.pos - other.len_utf8(),
                            format!("unknown escape '\\{other}'"),
                        ))
                    }
                    None => return Err(ParseError::new(start, "unterminated string")),
                },
                Some(c) => out.push(c),
            }
        }
    }

    fn atom(&mut self) -> Expr {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_whitespace() || matches!(c, '(' | ')' | '"' | ';' | '\'') {
                break;
            }
            self.bump();
        }
        let token = &self.src[start..self.pos];
        if let Ok(n) = token.parse::<i64>() {
            return Expr::Int(n);
        }
        if token.starts_with(|c: char| c.is_ascii_digit() || c == '-' || c == '.') {
            if let Ok(n) = token.parse::<f64>() {
                return Expr::Float(n);
            }
        }
        match token {
            "true" => Expr::Bool(true),
            "false" => Expr::Bool(false),
            "nil" => Expr::Nil,
            _ => Expr::Symbol(token.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(s: &str) -> Expr {
        Expr::Symbol(s.into())
    }

    #[test]
    fn test_parse_atoms() {
        let forms = parse("42 -7 2.5 \"hi\" true nil foo").unwrap();
        assert_eq!(
            forms,
            vec![
                Expr::Int(42),
                Expr::Int(-7),
                Expr::Float(2.5),
                Expr::Str("hi".into()),
                Expr::Bool(true),
                Expr::Nil,
                sym("foo"),
            ]
        );
    }

    #[test]
    fn test_parse_nested_list() {
        let forms = parse("(def x (+ 1 2))").unwrap();
        assert_eq!(
            forms,
            vec![Expr::List(vec![
                sym("def"),
                sym("x"),
                Expr::List(vec![sym("+"), Expr::Int(1), Expr::Int(2)]),
            ])]
        );
    }

    #[test]
    fn test_symbols_that_look_numeric() {
        let forms = parse("- + inf").unwrap();
        assert_eq!(forms, vec![sym("-"), sym("+"), sym("inf")]);
    }

    #[test]
    fn test_comments_and_quote() {
        let forms = parse("; leading\n'(1 2) ; trailing").unwrap();
        assert_eq!(
            forms,
            vec![Expr::List(vec![
                sym("quote"),
                Expr::List(vec![Expr::Int(1), Expr::Int(2)]),
            ])]
        );
    }

    #[test]
    fn test_string_escapes() {
        let forms = parse(r#""a\"b\\c\n""#).unwrap();
        assert_eq!(forms, vec![Expr::Str("a\"b\\c\n".into())]);
    }

    #[test]
    fn test_errors() {
        assert_eq!(parse("(+ 1 2").unwrap_err().message, "unclosed '('");
        assert_eq!(parse(")").unwrap_err().offset, 0);
        assert!(parse("\"open").is_err());
        assert!(parse(r#""\q""#).is_err());
        assert!(parse("   ; only a comment").is_err());
    }

    #[test]
    fn test_nesting_limit() {
        let deep = format!("{}{}", "(".repeat(1000), ")".repeat(1000));
        assert_eq!(parse(&deep).unwrap_err().message, "nesting too deep");
        let ok = format!("{}{}", "(".repeat(100), ")".repeat(100));
        assert!(parse(&ok).is_ok());
    }

    #[test]
    fn test_display() {
        let forms = parse("(list 1 \"a\" (x))").unwrap();
        assert_eq!(forms[0].to_string(), "(list 1 \"a\" (x))");
    }
}
