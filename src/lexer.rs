use crate::token::{Token, TokenKind, lookup_ident};

/// Indentation-aware lexer for the Python-flavored source language.
///
/// Lexing never fails: unknown characters and inconsistent dedents surface as
/// `Illegal` tokens and are turned into errors by the parser. Virtual
/// `Indent`/`Dedent` tokens are synthesized by comparing each line's leading
/// whitespace (space = 1 column, tab = 8) against a stack of open levels, and
/// every open level is closed before the final `Eof` token.
pub struct Lexer {
    src: Vec<char>,
    position: usize,
    line: usize,
    column: usize,

    indent_stack: Vec<usize>,
    at_line_start: bool,
    pending_dedents: usize,
}

impl Lexer {
    pub fn new(src: &str) -> Self {
        Self {
            src: src.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
            indent_stack: vec![0],
            at_line_start: true,
            pending_dedents: 0,
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.src.get(self.position).copied()
    }

    fn read_char(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.position += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
            self.at_line_start = true;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek_char(), Some(' ') | Some('\t') | Some('\r')) {
            self.read_char();
        }
    }

    fn read_string(&mut self, quote: char) -> String {
        let mut result = String::new();

        loop {
            match self.peek_char() {
                None => break,
                Some(ch) if ch == quote => break,
                Some('\\') => {
                    self.read_char();
                    match self.read_char() {
                        Some('n') => result.push('\n'),
                        Some('t') => result.push('\t'),
                        Some('r') => result.push('\r'),
                        Some('\\') => result.push('\\'),
                        Some('\'') => result.push('\''),
                        Some('"') => result.push('"'),
                        Some(other) => result.push(other),
                        None => break,
                    }
                }
                Some(_) => {
                    if let Some(ch) = self.read_char() {
                        result.push(ch);
                    }
                }
            }
        }

        // The closing quote is required, but an unterminated string still
        // yields whatever was read.
        if self.peek_char() == Some(quote) {
            self.read_char();
        }

        result
    }

    fn read_number(&mut self) -> (String, TokenKind) {
        let start = self.position;
        let mut has_decimal = false;

        loop {
            match self.peek_char() {
                Some(ch) if ch.is_ascii_digit() => {
                    self.read_char();
                }
                Some('.') if !has_decimal => {
                    has_decimal = true;
                    self.read_char();
                }
                _ => break,
            }
        }

        let kind = if has_decimal {
            TokenKind::Float
        } else {
            TokenKind::Int
        };
        (self.src[start..self.position].iter().collect(), kind)
    }

    fn read_identifier(&mut self) -> String {
        let start = self.position;
        while let Some(ch) = self.peek_char() {
            if ch.is_alphanumeric() || ch == '_' {
                self.read_char();
            } else {
                break;
            }
        }
        self.src[start..self.position].iter().collect()
    }

    fn skip_comment(&mut self) {
        while let Some(ch) = self.peek_char() {
            if ch == '\n' {
                break;
            }
            self.read_char();
        }
    }

    fn handle_indentation(&mut self) -> Option<Token> {
        if self.pending_dedents > 0 {
            self.pending_dedents -= 1;
            return Some(Token::new(TokenKind::Dedent, "", self.line, self.column));
        }

        if !self.at_line_start {
            return None;
        }

        self.at_line_start = false;
        let start = self.column;
        let mut indent_level = 0;

        loop {
            match self.peek_char() {
                Some(' ') => {
                    indent_level += 1;
                    self.read_char();
                }
                Some('\t') => {
                    indent_level += 8;
                    self.read_char();
                }
                _ => break,
            }
        }

        // Blank and comment-only lines never open or close a block.
        if matches!(self.peek_char(), Some('\n') | Some('#') | None) {
            return None;
        }

        let current_indent = *self.indent_stack.last().expect("indent stack is never empty");

        if indent_level > current_indent {
            self.indent_stack.push(indent_level);
            return Some(Token::new(TokenKind::Indent, "", self.line, start));
        }

        if indent_level < current_indent {
            let mut dedent_count = 0;
            while self.indent_stack.len() > 1
                && *self.indent_stack.last().expect("indent stack is never empty") > indent_level
            {
                self.indent_stack.pop();
                dedent_count += 1;
            }

            if self.indent_stack.last() != Some(&indent_level) {
                return Some(Token::new(
                    TokenKind::Illegal,
                    "indentation error",
                    self.line,
                    start,
                ));
            }

            self.pending_dedents = dedent_count - 1;
            return Some(Token::new(TokenKind::Dedent, "", self.line, start));
        }

        None
    }

    pub fn next_token(&mut self) -> Token {
        if let Some(token) = self.handle_indentation() {
            return token;
        }

        self.skip_whitespace();

        let (line, column) = (self.line, self.column);
        let ch = match self.read_char() {
            Some(ch) => ch,
            None => {
                // Close all remaining indentation levels before Eof.
                if self.indent_stack.len() > 1 {
                    self.indent_stack.pop();
                    return Token::new(TokenKind::Dedent, "", line, column);
                }
                return Token::new(TokenKind::Eof, "", line, column);
            }
        };

        match ch {
            '\n' => Token::new(TokenKind::Newline, "\n", line, column),
            '#' => {
                self.skip_comment();
                self.next_token()
            }
            '=' => {
                if self.peek_char() == Some('=') {
                    self.read_char();
                    Token::new(TokenKind::Eq, "==", line, column)
                } else {
                    Token::new(TokenKind::Assign, "=", line, column)
                }
            }
            '!' => {
                if self.peek_char() == Some('=') {
                    self.read_char();
                    Token::new(TokenKind::NotEq, "!=", line, column)
                } else {
                    Token::new(TokenKind::Illegal, "!", line, column)
                }
            }
            '<' => {
                if self.peek_char() == Some('=') {
                    self.read_char();
                    Token::new(TokenKind::LtEq, "<=", line, column)
                } else {
                    Token::new(TokenKind::Lt, "<", line, column)
                }
            }
            '>' => {
                if self.peek_char() == Some('=') {
                    self.read_char();
                    Token::new(TokenKind::GtEq, ">=", line, column)
                } else {
                    Token::new(TokenKind::Gt, ">", line, column)
                }
            }
            '+' => {
                if self.peek_char() == Some('=') {
                    self.read_char();
                    Token::new(TokenKind::PlusAssign, "+=", line, column)
                } else {
                    Token::new(TokenKind::Plus, "+", line, column)
                }
            }
            '-' => {
                if self.peek_char() == Some('=') {
                    self.read_char();
                    Token::new(TokenKind::MinusAssign, "-=", line, column)
                } else {
                    Token::new(TokenKind::Minus, "-", line, column)
                }
            }
            '*' => Token::new(TokenKind::Star, "*", line, column),
            '/' => Token::new(TokenKind::Slash, "/", line, column),
            '%' => Token::new(TokenKind::Percent, "%", line, column),
            ',' => Token::new(TokenKind::Comma, ",", line, column),
            ':' => Token::new(TokenKind::Colon, ":", line, column),
            ';' => Token::new(TokenKind::Semicolon, ";", line, column),
            '(' => Token::new(TokenKind::LParen, "(", line, column),
            ')' => Token::new(TokenKind::RParen, ")", line, column),
            '[' => Token::new(TokenKind::LBracket, "[", line, column),
            ']' => Token::new(TokenKind::RBracket, "]", line, column),
            '{' => Token::new(TokenKind::LBrace, "{", line, column),
            '}' => Token::new(TokenKind::RBrace, "}", line, column),
            '"' | '\'' => {
                let lexeme = self.read_string(ch);
                Token::new(TokenKind::Str, lexeme, line, column)
            }
            _ => {
                if ch.is_ascii_digit() {
                    self.position -= 1;
                    self.column -= 1;
                    let (lexeme, kind) = self.read_number();
                    Token::new(kind, lexeme, line, column)
                } else if ch.is_alphabetic() || ch == '_' {
                    self.position -= 1;
                    self.column -= 1;
                    let lexeme = self.read_identifier();
                    let kind = lookup_ident(&lexeme);
                    Token::new(kind, lexeme, line, column)
                } else {
                    Token::new(TokenKind::Illegal, ch.to_string(), line, column)
                }
            }
        }
    }

    pub fn all_tokens(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }
}

impl Iterator for Lexer {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_token() {
            token if token.kind == TokenKind::Eof => None,
            token => Some(token),
        }
    }
}

pub fn tokenize(input: &str) -> Vec<Token> {
    Lexer::new(input).all_tokens()
}
