pub mod bytecode;

use std::fmt;

/// A very simple bytecode set of instructions, one per source instruction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ByteCode {
    /// Move the data pointer one cell right, growing the tape if needed
    MoveRight,

    /// Move the data pointer one cell left
    MoveLeft,

    /// Dereference the data pointer and add one to the heap value
    Increment,

    /// Dereference the data pointer and subtract one from the heap value
    Decrement,

    /// Write the byte at the data pointer
    Write,

    /// Read a byte into the heap at the data pointer
    Read,

    /// Jump to the given absolute index if the current cell is zero
    JumpIfZero(usize),

    /// Jump to the given absolute index if the current cell is non-zero
    JumpIfNonZero(usize),
}

impl fmt::Display for ByteCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ByteCode::MoveRight => write!(f, "right"),
            ByteCode::MoveLeft => write!(f, "left"),
            ByteCode::Increment => write!(f, "inc"),
            ByteCode::Decrement => write!(f, "dec"),
            ByteCode::Write => write!(f, "write"),
            ByteCode::Read => write!(f, "read"),
            ByteCode::JumpIfZero(target) => write!(f, "jz {target}"),
            ByteCode::JumpIfNonZero(target) => write!(f, "jnz {target}"),
        }
    }
}
