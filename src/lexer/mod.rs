use std::{fmt, ops::Deref};

use thiserror::Error;

pub mod lexer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instruction {
    // `>`: Increment the `data pointer` by one
    MoveRight,
    // `<`: Decrement the `data pointer` by one
    MoveLeft,

    // `+`: Increment the byte at the `data pointer` by one
    Increment,
    // `-`: Decrement the byte at the `data pointer` by one
    Decrement,

    // `.`: Write the byte at the `data pointer` to the `output device`
    Output,
    // `,`: Read the next byte from the `input device` and write it to the `data pointer`
    Input,

    // `[`: If the byte at the `data pointer` is zero, then jump the `instruction pointer` forward to the instruction after the matching `]`
    LoopStart,
    // `]`: If the byte at the `data pointer` is non-zero then jump the `instruction pointer` back to the instruction after the matching `[`
    LoopEnd,
}

impl Instruction {
    /// Every other character is a comment
    pub fn from_char(c: char) -> Option<Instruction> {
        match c {
            '>' => Some(Instruction::MoveRight),
            '<' => Some(Instruction::MoveLeft),
            '+' => Some(Instruction::Increment),
            '-' => Some(Instruction::Decrement),
            '.' => Some(Instruction::Output),
            ',' => Some(Instruction::Input),
            '[' => Some(Instruction::LoopStart),
            ']' => Some(Instruction::LoopEnd),
            _ => None,
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            Instruction::MoveRight => '>',
            Instruction::MoveLeft => '<',
            Instruction::Increment => '+',
            Instruction::Decrement => '-',
            Instruction::Output => '.',
            Instruction::Input => ',',
            Instruction::LoopStart => '[',
            Instruction::LoopEnd => ']',
        }
    }
}

/// A flat instruction stream whose loop brackets are known to be balanced.
///
/// Only the [`lexer::Lexer`] can build one, so the parser never has to deal with a mismatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instructions(Vec<Instruction>);

impl Instructions {
    pub(crate) fn new_balanced(instructions: Vec<Instruction>) -> Self {
        Self(instructions)
    }
}

impl Deref for Instructions {
    type Target = [Instruction];

    fn deref(&self) -> &[Instruction] {
        &self.0
    }
}

impl fmt::Display for Instructions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for instruction in self.0.iter() {
            write!(f, "{}", instruction.symbol())?;
        }
        Ok(())
    }
}

/// Where in the source a character was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// 0-based offset in codepoints
    pub offset: usize,
    /// 1-based
    pub line: usize,
    /// 1-based
    pub col: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} (offset {})", self.line, self.col, self.offset)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("unmatched `]` at {position}, there is no `[` to close")]
    UnmatchedClose { position: Position },

    #[error("unmatched `[` at {position}, it is never closed by a `]`")]
    UnmatchedOpen { position: Position },
}
