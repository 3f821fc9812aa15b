use crate::error::NoteholeError;

/// Token types for the LilyPond subset
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Command(String), // \relative, \time, ...
    Word(String),    // note names, r
    Number(u32),
    Text(String), // "2.18.2"

    // Duration and pitch modifiers
    Dot,        // .
    Apostrophe, // '
    Comma,      // ,
    Star,       // *
    Slash,      // /
    Equals,     // =

    // Structure
    LeftBrace,  // {
    RightBrace, // }
    ChordStart, // <
    ChordEnd,   // >
    BarCheck,   // |
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Command(name) => write!(f, "\\{}", name),
            Token::Word(word) => write!(f, "{}", word),
            Token::Number(n) => write!(f, "{}", n),
            Token::Text(text) => write!(f, "\"{}\"", text),
            Token::Dot => write!(f, "."),
            Token::Apostrophe => write!(f, "'"),
            Token::Comma => write!(f, ","),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Equals => write!(f, "="),
            Token::LeftBrace => write!(f, "{{"),
            Token::RightBrace => write!(f, "}}"),
            Token::ChordStart => write!(f, "<"),
            Token::ChordEnd => write!(f, ">"),
            Token::BarCheck => write!(f, "|"),
        }
    }
}

/// A token with its position in the source
#[derive(Debug, Clone)]
pub struct LocatedToken {
    pub token: Token,
    pub line: usize,
    pub column: usize,
}

/// Lexer for tokenizing LilyPond music text
pub struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            line: 1,
            column: 1,
        }
    }

    /// Report positions as if `input` started at `line` of a larger file.
    pub fn starting_at_line(mut self, line: usize) -> Self {
        self.line = line;
        self
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn peek(&mut self) -> Option<&char> {
        self.chars.peek()
    }

    fn error(&self, line: usize, column: usize, message: String) -> NoteholeError {
        NoteholeError::ParseError {
            line,
            column,
            message,
        }
    }

    fn take_while<F: Fn(char) -> bool>(&mut self, pred: F) -> String {
        let mut s = String::new();
        while let Some(&c) = self.peek() {
            if !pred(c) {
                break;
            }
            s.push(c);
            self.advance();
        }
        s
    }

    fn skip_comment(&mut self) {
        // % comments run to the end of the line
        while let Some(&c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
    }

    pub fn tokenize(&mut self) -> Result<Vec<LocatedToken>, NoteholeError> {
        let mut tokens = Vec::new();

        while let Some(&c) = self.peek() {
            let line = self.line;
            let column = self.column;

            let token = match c {
                c if c.is_whitespace() => {
                    self.advance();
                    continue;
                }
                '%' => {
                    self.skip_comment();
                    continue;
                }
                '\\' => {
                    self.advance();
                    let name = self.take_while(|c| c.is_ascii_alphabetic());
                    if name.is_empty() {
                        return Err(self.error(line, column, "expected a command name after '\\'".to_string()));
                    }
                    Token::Command(name)
                }
                '"' => {
                    self.advance();
                    let text = self.take_while(|c| c != '"' && c != '\n');
                    if self.advance() != Some('"') {
                        return Err(self.error(line, column, "unterminated string".to_string()));
                    }
                    Token::Text(text)
                }
                c if c.is_ascii_alphabetic() => Token::Word(self.take_while(|c| c.is_ascii_alphabetic())),
                c if c.is_ascii_digit() => {
                    let digits = self.take_while(|c| c.is_ascii_digit());
                    let value = digits
                        .parse()
                        .map_err(|_| self.error(line, column, format!("number too large: {}", digits)))?;
                    Token::Number(value)
                }
                _ => {
                    let token = match c {
                        '.' => Token::Dot,
                        '\'' => Token::Apostrophe,
                        ',' => Token::Comma,
                        '*' => Token::Star,
                        '/' => Token::Slash,
                        '=' => Token::Equals,
                        '{' => Token::LeftBrace,
                        '}' => Token::RightBrace,
                        '<' => Token::ChordStart,
                        '>' => Token::ChordEnd,
                        '|' => Token::BarCheck,
                        other => {
                            return Err(self.error(line, column, format!("unexpected character '{}'", other)));
                        }
                    };
                    self.advance();
                    token
                }
            };

            tokens.push(LocatedToken {
                token,
                line,
                column,
            });
        }

        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_types(input: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(input);
        lexer.tokenize().unwrap().into_iter().map(|t| t.token).collect()
    }

    #[test]
    fn test_simple_notes() {
        assert_eq!(
            token_types("c4 d8. e"),
            vec![
                Token::Word("c".to_string()),
                Token::Number(4),
                Token::Word("d".to_string()),
                Token::Number(8),
                Token::Dot,
                Token::Word("e".to_string()),
            ]
        );
    }

    #[test]
    fn test_pitch_modifiers() {
        assert_eq!(
            token_types("fis'' bes,"),
            vec![
                Token::Word("fis".to_string()),
                Token::Apostrophe,
                Token::Apostrophe,
                Token::Word("bes".to_string()),
                Token::Comma,
            ]
        );
    }

    #[test]
    fn test_commands_and_structure() {
        assert_eq!(
            token_types("\\relative c' { <c e>2 | \\time 3/4 }"),
            vec![
                Token::Command("relative".to_string()),
                Token::Word("c".to_string()),
                Token::Apostrophe,
                Token::LeftBrace,
                Token::ChordStart,
                Token::Word("c".to_string()),
                Token::Word("e".to_string()),
                Token::ChordEnd,
                Token::Number(2),
                Token::BarCheck,
                Token::Command("time".to_string()),
                Token::Number(3),
                Token::Slash,
                Token::Number(4),
                Token::RightBrace,
            ]
        );
    }

    #[test]
    fn test_strings_and_comments() {
        assert_eq!(
            token_types("\\version \"2.18.2\" % engraver version\nc"),
            vec![
                Token::Command("version".to_string()),
                Token::Text("2.18.2".to_string()),
                Token::Word("c".to_string()),
            ]
        );
    }

    #[test]
    fn test_positions() {
        let mut lexer = Lexer::new("c\n  d");
        let tokens = lexer.tokenize().unwrap();
        assert_eq!((tokens[1].line, tokens[1].column), (2, 3));

        let mut lexer = Lexer::new("c").starting_at_line(5);
        let tokens = lexer.tokenize().unwrap();
        assert_eq!(tokens[0].line, 5);
    }

    #[test]
    fn test_display_matches_source_text() {
        let text: Vec<String> = token_types("\\time 3/4 <c'>")
            .iter()
            .map(Token::to_string)
            .collect();
        assert_eq!(text.concat(), "\\time3/4<c'>");
    }

    #[test]
    fn test_unexpected_character() {
        let mut lexer = Lexer::new("c4 #f");
        match lexer.tokenize() {
            Err(NoteholeError::ParseError { line, column, .. }) => {
                assert_eq!((line, column), (1, 4));
            }
            other => panic!("expected a parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_unterminated_string() {
        let mut lexer = Lexer::new("\\version \"2.18");
        assert!(lexer.tokenize().is_err());
    }
}
