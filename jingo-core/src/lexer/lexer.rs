use crate::utils::prelude::{Position, Span};
use super::error::{LexicalError, LexicalErrorType};
use super::token::{str_to_keyword, Token};

pub type Spanned = (Position, Token, Position);
pub type LexResult = std::result::Result<Vec<Spanned>, LexicalError>;

/// Tokenizes the whole source. Fails atomically: the first lexical error
/// aborts the scan and no partial token list is returned.
pub fn tokenize(source_name: &str, text: &str) -> LexResult {
    Lexer::new(source_name, text).make_tokens()
}

#[derive(Debug)]
pub struct Lexer {
    chars: Vec<char>,
    pos: Position,
    current: Option<char>,
}

impl Lexer {
    pub fn new(source_name: &str, text: &str) -> Self {
        let chars: Vec<char> = text.chars().collect();
        let pos = Position::new(source_name, text);
        let current = chars.first().copied();

        Self { chars, pos, current }
    }

    fn advance(&mut self) {
        self.pos.advance(self.current);
        self.current = self.chars.get(self.pos.offset as usize).copied();
    }

    pub fn make_tokens(mut self) -> LexResult {
        let mut tokens = vec![];

        while let Some(ch) = self.current {
            match ch {
                ' ' | '\t' => self.advance(),
                ';' | '\n' => tokens.push(self.eat_one_char(Token::Newline)),
                '+' => tokens.push(self.eat_one_char(Token::Plus)),
                '*' => tokens.push(self.eat_one_char(Token::Mul)),
                '/' => tokens.push(self.eat_one_char(Token::Div)),
                '^' => tokens.push(self.eat_one_char(Token::Pow)),
                '(' => tokens.push(self.eat_one_char(Token::LParen)),
                ')' => tokens.push(self.eat_one_char(Token::RParen)),
                '[' => tokens.push(self.eat_one_char(Token::LSquare)),
                ']' => tokens.push(self.eat_one_char(Token::RSquare)),
                ',' => tokens.push(self.eat_one_char(Token::Comma)),
                '-' => tokens.push(self.make_minus_or_arrow()),
                '=' => tokens.push(self.make_equals()),
                '<' => tokens.push(self.make_less_than()),
                '>' => tokens.push(self.make_greater_than()),
                '!' => tokens.push(self.make_not_equals()?),
                '"' => tokens.push(self.make_string()),
                '0'..='9' => tokens.push(self.make_number()),
                _ if ch.is_ascii_alphabetic() => tokens.push(self.make_identifier()),
                _ => {
                    let pos_start = self.pos.clone();
                    self.advance();

                    return Err(LexicalError {
                        error: LexicalErrorType::IllegalCharacter { ch },
                        span: Span::new(pos_start, self.pos.clone()),
                    });
                }
            }
        }

        tokens.push((self.pos.clone(), Token::Eof, self.pos.clone()));

        Ok(tokens)
    }

    fn eat_one_char(&mut self, token: Token) -> Spanned {
        let pos_start = self.pos.clone();
        self.advance();

        (pos_start, token, self.pos.clone())
    }

    fn make_number(&mut self) -> Spanned {
        let pos_start = self.pos.clone();

        let mut num_str = String::new();
        let mut dot_count = 0;

        while let Some(ch) = self.current {
            if ch == '.' {
                // A second period ends the literal without being consumed.
                if dot_count > 0 {
                    break;
                }

                dot_count += 1;
                num_str.push(ch);
            } else if ch.is_ascii_digit() {
                num_str.push(ch);
            } else {
                break;
            }

            self.advance();
        }

        let token = if dot_count == 0 {
            match num_str.parse::<i64>() {
                Ok(value) => Token::Int(value),
                // Out of integer range; falls back to the float reading.
                Err(_) => Token::Float(num_str.parse::<f64>().unwrap_or(f64::INFINITY)),
            }
        } else {
            Token::Float(num_str.parse::<f64>().unwrap_or(f64::INFINITY))
        };

        (pos_start, token, self.pos.clone())
    }

    fn make_identifier(&mut self) -> Spanned {
        let pos_start = self.pos.clone();
        let mut ident = String::new();

        while let Some(ch) = self.current {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                ident.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        let token = match str_to_keyword(&ident) {
            Some(keyword) => keyword,
            None => Token::Ident(ident),
        };

        (pos_start, token, self.pos.clone())
    }

    fn make_minus_or_arrow(&mut self) -> Spanned {
        let pos_start = self.pos.clone();
        self.advance();

        let token = if self.current == Some('>') {
            self.advance();
            Token::Arrow
        } else {
            Token::Minus
        };

        (pos_start, token, self.pos.clone())
    }

    fn make_not_equals(&mut self) -> Result<Spanned, LexicalError> {
        let pos_start = self.pos.clone();
        self.advance();

        if self.current == Some('=') {
            self.advance();

            return Ok((pos_start, Token::Ne, self.pos.clone()));
        }

        self.advance();

        Err(LexicalError {
            error: LexicalErrorType::ExpectedCharacter { expected: '=', after: '!' },
            span: Span::new(pos_start, self.pos.clone()),
        })
    }

    fn make_equals(&mut self) -> Spanned {
        let pos_start = self.pos.clone();
        self.advance();

        let token = if self.current == Some('=') {
            self.advance();
            Token::Ee
        } else {
            Token::Eq
        };

        (pos_start, token, self.pos.clone())
    }

    fn make_less_than(&mut self) -> Spanned {
        let pos_start = self.pos.clone();
        self.advance();

        let token = if self.current == Some('=') {
            self.advance();
            Token::Lte
        } else {
            Token::Lt
        };

        (pos_start, token, self.pos.clone())
    }

    fn make_greater_than(&mut self) -> Spanned {
        let pos_start = self.pos.clone();
        self.advance();

        let token = if self.current == Some('=') {
            self.advance();
            Token::Gte
        } else {
            Token::Gt
        };

        (pos_start, token, self.pos.clone())
    }

    // A string that hits end of input before its closing quote simply ends
    // there, with everything collected so far as its value.
    fn make_string(&mut self) -> Spanned {
        let pos_start = self.pos.clone();
        self.advance();

        let mut value = String::new();
        let mut escaped = false;

        while let Some(ch) = self.current {
            if escaped {
                match ch {
                    'n' => value.push('\n'),
                    't' => value.push('\t'),
                    'j' => value.push_str("\tjingo\t"),
                    _ => value.push(ch),
                }

                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                break;
            } else {
                value.push(ch);
            }

            self.advance();
        }

        if self.current.is_some() {
            self.advance();
        }

        (pos_start, Token::Str(value), self.pos.clone())
    }
}
