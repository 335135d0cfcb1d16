//! Expression parser
//!
//! A precedence-climbing parser for comparison, arithmetic and logical expressions.
//!
//! Precedence (lowest to highest):
//! 1. `||`
//! 2. `&&`
//! 3. Equality: `=`, `==`, `!=`, `<>`
//! 4. Relational: `<`, `<=`, `>`, `>=`
//! 5. Additive: `+`, `-`
//! 6. Multiplicative: `*`, `/`, `%`
//! 7. Prefix: `-`, `+`, `!`
//! 8. Primary: literals, identifiers, parentheses
//!
//! All binary operators are left-associative.

use crate::ast::{BinaryOperator, Expr, LogicalOperator, UnaryOperator};
use crate::error::{FormulaError, FormulaResult};
use tally_sheets_core::Value;

/// Operator spellings recognised by the scanner, longest first.
///
/// Some of these (`===`, `<<`, `&`, ...) have no meaning here; they are scanned so the
/// parser can reject them by name instead of misreading them as two operators.
const OPERATOR_SYMBOLS: &[&str] = &[
    "===", "!==", "<<", ">>", "**", "&&", "||", "==", "!=", "<>", "<=", ">=", "+", "-", "*",
    "/", "%", "=", "<", ">", "!", "&", "|", "^", "~",
];

/// Parse expression text into an AST
///
/// # Example
/// ```rust
/// use tally_sheets_formula::parse_expression;
///
/// let ast = parse_expression("1 + 2 * 3").unwrap();
/// let ast = parse_expression("\"apple\" <> \"pear\" && 3 >= 2").unwrap();
/// ```
pub fn parse_expression(source: &str) -> FormulaResult<Expr> {
    let mut parser = ExpressionParser::new(source);
    parser.advance_token()?;
    let expr = parser.parse_binary(1)?;

    // Make sure we consumed all input
    if !matches!(parser.current_token(), Token::Eof) {
        return Err(FormulaError::Parse(format!(
            "Unexpected {:?} after expression in '{}'",
            parser.current_token(),
            source
        )));
    }

    Ok(expr)
}

/// Token types
#[derive(Debug, Clone, PartialEq)]
enum Token {
    // Literals
    Number(f64),
    String(String),
    Boolean(bool),
    Null,

    Identifier(String),
    Operator(&'static str),

    // Delimiters
    LeftParen,
    RightParen,

    // End of input
    Eof,
}

/// An operator found between two operands
#[derive(Debug, Clone, Copy)]
enum Infix {
    Binary(BinaryOperator),
    Logical(LogicalOperator),
}

impl Infix {
    fn from_symbol(symbol: &str) -> FormulaResult<Self> {
        if let Some(op) = LogicalOperator::from_symbol(symbol) {
            return Ok(Infix::Logical(op));
        }
        BinaryOperator::from_symbol(symbol)
            .map(Infix::Binary)
            .ok_or_else(|| FormulaError::UnknownOperator(symbol.to_string()))
    }

    fn precedence(self) -> u8 {
        match self {
            Infix::Binary(op) => op.precedence(),
            Infix::Logical(op) => op.precedence(),
        }
    }

    fn combine(self, left: Expr, right: Expr) -> Expr {
        match self {
            Infix::Binary(op) => Expr::binary(op, left, right),
            Infix::Logical(op) => Expr::logical(op, left, right),
        }
    }
}

/// Expression parser
struct ExpressionParser<'a> {
    input: &'a str,
    pos: usize,
    current_token: Token,
}

impl<'a> ExpressionParser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            current_token: Token::Eof,
        }
    }

    // === Token scanning ===

    fn advance_token(&mut self) -> FormulaResult<()> {
        self.current_token = self.scan_token()?;
        Ok(())
    }

    fn scan_token(&mut self) -> FormulaResult<Token> {
        self.skip_whitespace();

        let c = match self.peek_char() {
            Some(c) => c,
            None => return Ok(Token::Eof),
        };

        match c {
            '(' => {
                self.advance();
                return Ok(Token::LeftParen);
            }
            ')' => {
                self.advance();
                return Ok(Token::RightParen);
            }
            '"' | '\'' => return self.scan_string(c),
            _ => {}
        }

        if c.is_ascii_digit()
            || (c == '.' && self.peek_char_at(1).map_or(false, |c| c.is_ascii_digit()))
        {
            return self.scan_number();
        }

        if c.is_alphabetic() || c == '_' || c == '$' {
            return Ok(self.scan_identifier());
        }

        let rest = &self.input[self.pos..];
        if let Some(symbol) = OPERATOR_SYMBOLS.iter().find(|s| rest.starts_with(**s)) {
            self.pos += symbol.len();
            return Ok(Token::Operator(symbol));
        }

        Err(FormulaError::Parse(format!(
            "Unexpected character '{}' at offset {}",
            c, self.pos
        )))
    }

    fn scan_string(&mut self, quote: char) -> FormulaResult<Token> {
        let start = self.pos;
        self.advance(); // Skip opening quote

        let mut s = String::new();
        loop {
            let c = self.peek_char().ok_or_else(|| {
                FormulaError::Parse(format!("Unterminated string starting at offset {}", start))
            })?;
            self.advance();

            if c == quote {
                return Ok(Token::String(s));
            }
            if c != '\\' {
                s.push(c);
                continue;
            }

            let escaped = self.peek_char().ok_or_else(|| {
                FormulaError::Parse(format!("Unterminated string starting at offset {}", start))
            })?;
            self.advance();
            match escaped {
                'n' => s.push('\n'),
                'r' => s.push('\r'),
                't' => s.push('\t'),
                'b' => s.push('\u{8}'),
                'f' => s.push('\u{c}'),
                'u' => s.push(self.scan_unicode_escape()?),
                other => s.push(other),
            }
        }
    }

    fn scan_unicode_escape(&mut self) -> FormulaResult<char> {
        let end = self.pos + 4;
        let hex = self
            .input
            .get(self.pos..end)
            .ok_or_else(|| FormulaError::Parse("Truncated \\u escape".into()))?;
        let code = u32::from_str_radix(hex, 16)
            .map_err(|_| FormulaError::Parse(format!("Invalid \\u escape: {}", hex)))?;
        self.pos = end;
        char::from_u32(code)
            .ok_or_else(|| FormulaError::Parse(format!("Invalid \\u escape: {}", hex)))
    }

    fn scan_number(&mut self) -> FormulaResult<Token> {
        let start = self.pos;

        // Integer part
        while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
            self.advance();
        }

        // Decimal part
        if self.peek_char() == Some('.') {
            self.advance();
            while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        // Exponent part
        if self.peek_char().map_or(false, |c| c == 'e' || c == 'E') {
            self.advance();
            if self.peek_char().map_or(false, |c| c == '+' || c == '-') {
                self.advance();
            }
            while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        let num_str = &self.input[start..self.pos];
        num_str
            .parse::<f64>()
            .map(Token::Number)
            .map_err(|_| FormulaError::Parse(format!("Invalid number: {}", num_str)))
    }

    fn scan_identifier(&mut self) -> Token {
        let start = self.pos;

        while self
            .peek_char()
            .map_or(false, |c| c.is_alphanumeric() || c == '_' || c == '$')
        {
            self.advance();
        }

        let text = &self.input[start..self.pos];
        if text.eq_ignore_ascii_case("true") {
            Token::Boolean(true)
        } else if text.eq_ignore_ascii_case("false") {
            Token::Boolean(false)
        } else if text.eq_ignore_ascii_case("null") {
            Token::Null
        } else {
            Token::Identifier(text.to_string())
        }
    }

    // === Helper methods ===

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_char_at(&self, offset: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(offset)
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek_char().map_or(false, |c| c.is_whitespace()) {
            self.advance();
        }
    }

    fn current_token(&self) -> &Token {
        &self.current_token
    }

    fn consume(&mut self) -> FormulaResult<Token> {
        let token = std::mem::replace(&mut self.current_token, Token::Eof);
        self.advance_token()?;
        Ok(token)
    }

    fn expect(&mut self, expected: &Token) -> FormulaResult<()> {
        if self.current_token() == expected {
            self.consume()?;
            Ok(())
        } else {
            Err(FormulaError::Parse(format!(
                "Expected {:?}, got {:?}",
                expected,
                self.current_token()
            )))
        }
    }

    // === Expression parsing with precedence ===

    fn parse_binary(&mut self, min_precedence: u8) -> FormulaResult<Expr> {
        let mut left = self.parse_unary()?;

        while let Token::Operator(symbol) = *self.current_token() {
            let infix = Infix::from_symbol(symbol)?;
            let precedence = infix.precedence();
            if precedence < min_precedence {
                break;
            }

            self.consume()?;
            let right = self.parse_binary(precedence + 1)?;
            left = infix.combine(left, right);
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> FormulaResult<Expr> {
        if let Token::Operator(symbol) = *self.current_token() {
            let op = UnaryOperator::from_symbol(symbol)
                .ok_or_else(|| FormulaError::UnknownOperator(symbol.to_string()))?;
            self.consume()?;
            let operand = self.parse_unary()?;
            return Ok(Expr::unary(op, operand));
        }

        self.parse_primary()
    }

    fn parse_primary(&mut self) -> FormulaResult<Expr> {
        match self.consume()? {
            Token::Number(n) => Ok(Expr::Literal(Value::Number(n))),
            Token::String(s) => Ok(Expr::Literal(Value::Text(s))),
            Token::Boolean(b) => Ok(Expr::Literal(Value::Boolean(b))),
            Token::Null => Ok(Expr::Literal(Value::Empty)),
            Token::Identifier(name) => Ok(Expr::Identifier(name)),
            Token::LeftParen => {
                let expr = self.parse_binary(1)?;
                self.expect(&Token::RightParen)?;
                Ok(expr)
            }
            Token::Eof => Err(FormulaError::Parse(format!(
                "Unexpected end of expression '{}'",
                self.input
            ))),
            token => Err(FormulaError::Parse(format!("Unexpected token: {:?}", token))),
        }
    }
}
