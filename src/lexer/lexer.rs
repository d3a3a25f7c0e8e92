use super::{Instruction, Instructions, Position, SyntaxError};

#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    /** Human Readable positions in file */
    pub cur_line: usize,
    pub cur_col: usize,

    /** 'raw' format / offset within the file (in terms of 'codepoints') */
    pub codepoint_offset: usize,

    chars: std::str::Chars<'a>,
    /// Positions of every `[` that hasn't been closed yet, innermost last
    open_loops: Vec<Position>,
}

impl<'a> Lexer<'a> {
    pub fn new(chars: &'a str) -> Lexer<'a> {
        Lexer {
            cur_col: 1,
            cur_line: 1,

            codepoint_offset: 0,

            chars: chars.chars(),
            open_loops: vec![],
        }
    }

    fn position(&self) -> Position {
        Position {
            offset: self.codepoint_offset,
            line: self.cur_line,
            col: self.cur_col,
        }
    }

    fn consume_char(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.cur_col += 1;
        if c == '\n' {
            self.cur_line += 1;
            self.cur_col = 1;
        }
        self.codepoint_offset += 1;
        Some(c)
    }

    /// Yields the next instruction, skipping comments, or `None` once the source is exhausted
    pub fn next_token(&mut self) -> Result<Option<Instruction>, SyntaxError> {
        loop {
            let position = self.position();
            let Some(c) = self.consume_char() else {
                return match self.open_loops.pop() {
                    Some(position) => Err(SyntaxError::UnmatchedOpen { position }),
                    None => Ok(None),
                };
            };

            match Instruction::from_char(c) {
                Some(Instruction::LoopStart) => {
                    self.open_loops.push(position);
                    return Ok(Some(Instruction::LoopStart));
                }
                Some(Instruction::LoopEnd) => {
                    if self.open_loops.pop().is_none() {
                        return Err(SyntaxError::UnmatchedClose { position });
                    }
                    return Ok(Some(Instruction::LoopEnd));
                }
                Some(instruction) => return Ok(Some(instruction)),
                // comment
                None => continue,
            }
        }
    }

    pub fn collect_results(&mut self) -> Result<Instructions, SyntaxError> {
        let mut v = vec![];
        while let Some(instruction) = self.next_token()? {
            v.push(instruction);
        }
        Ok(Instructions::new_balanced(v))
    }
}

pub fn tokenize(source: &str) -> Result<Instructions, SyntaxError> {
    Lexer::new(source).collect_results()
}
