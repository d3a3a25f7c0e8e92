use crate::{
    lexer::Instruction,
    parser::{self, Node},
};

use super::{Runtime, RuntimeError};

/// A block being walked, innermost on top of the stack
struct Frame<'p> {
    nodes: &'p [Node],
    next: usize,
    /// loop bodies repeat while the cell is nonzero, the program itself runs once
    looping: bool,
}

/// Walks the tree directly, with an explicit stack of blocks instead of recursion
pub struct AstInterpreter {}

impl AstInterpreter {
    pub fn new() -> Self {
        Self {}
    }

    pub fn interpret(
        &mut self,
        runtime: &mut Runtime<'_>,
        program: &parser::Program,
    ) -> Result<(), RuntimeError> {
        let mut frames = vec![Frame {
            nodes: &program.nodes,
            next: 0,
            looping: false,
        }];

        while let Some(frame) = frames.last_mut() {
            let nodes = frame.nodes;
            let Some(node) = nodes.get(frame.next) else {
                if frame.looping && !runtime.value_is_zero() {
                    frame.next = 0;
                } else {
                    frames.pop();
                }
                continue;
            };
            frame.next += 1;

            match node {
                Node::Simple(Instruction::MoveRight) => runtime.move_right(),
                Node::Simple(Instruction::MoveLeft) => runtime.move_left()?,
                Node::Simple(Instruction::Increment) => runtime.increment(),
                Node::Simple(Instruction::Decrement) => runtime.decrement(),
                Node::Simple(Instruction::Output) => runtime.write()?,
                Node::Simple(Instruction::Input) => runtime.read()?,
                // never produced by the parser
                Node::Simple(Instruction::LoopStart | Instruction::LoopEnd) => {}
                Node::Loop(body) => {
                    if !runtime.value_is_zero() {
                        frames.push(Frame {
                            nodes: &body.nodes,
                            next: 0,
                            looping: true,
                        });
                    }
                }
            }
        }
        Ok(())
    }
}
