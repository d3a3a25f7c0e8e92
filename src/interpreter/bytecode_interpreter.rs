use crate::bytecode::ByteCode;

use super::{Runtime, RuntimeError};

pub struct ByteCodeInterpreter {}

impl ByteCodeInterpreter {
    pub fn new() -> Self {
        Self {}
    }

    pub fn run(
        &mut self,
        runtime: &mut Runtime<'_>,
        instructions: &[ByteCode],
    ) -> Result<(), RuntimeError> {
        let mut pc = 0;
        while pc < instructions.len() {
            match instructions[pc] {
                ByteCode::MoveRight => runtime.move_right(),
                ByteCode::MoveLeft => runtime.move_left()?,
                ByteCode::Increment => runtime.increment(),
                ByteCode::Decrement => runtime.decrement(),
                ByteCode::Read => runtime.read()?,
                ByteCode::Write => runtime.write()?,
                ByteCode::JumpIfZero(target) => {
                    if runtime.value_is_zero() {
                        pc = target;
                        // don't do the ++
                        continue;
                    }
                }
                ByteCode::JumpIfNonZero(target) => {
                    if !runtime.value_is_zero() {
                        pc = target;
                        // don't do the ++
                        continue;
                    }
                }
            }
            pc += 1;
        }
        Ok(())
    }
}
