use crate::{
    lexer::Instruction,
    parser::{Block, Node, Program},
};

use super::ByteCode;

/// Flattens the tree without recursing, so any nesting depth compiles.
pub fn to_bytecode(program: &Program) -> Vec<ByteCode> {
    let mut instructions = vec![];
    // blocks still being walked, innermost last
    let mut blocks: Vec<std::slice::Iter<'_, Node>> = vec![program.nodes.iter()];
    // index of the `JumpIfZero` opening each loop in `blocks[1..]`
    let mut loop_starts: Vec<usize> = vec![];

    while let Some(block) = blocks.last_mut() {
        let Some(node) = block.next() else {
            blocks.pop();
            if let Some(start) = loop_starts.pop() {
                // jump back to the first instruction of the body
                instructions.push(ByteCode::JumpIfNonZero(start + 1));
                instructions[start] = ByteCode::JumpIfZero(instructions.len());
            }
            continue;
        };

        match node {
            Node::Simple(instruction) => instructions.push(match instruction {
                Instruction::MoveRight => ByteCode::MoveRight,
                Instruction::MoveLeft => ByteCode::MoveLeft,
                Instruction::Increment => ByteCode::Increment,
                Instruction::Decrement => ByteCode::Decrement,
                Instruction::Output => ByteCode::Write,
                Instruction::Input => ByteCode::Read,
                // the parser folds brackets into `Node::Loop`
                Instruction::LoopStart | Instruction::LoopEnd => continue,
            }),
            Node::Loop(Block { nodes }) => {
                // i.e. for just [+] we get JumpIfZero(3), Increment, JumpIfNonZero(1)
                loop_starts.push(instructions.len());
                // placeholder, patched once we know where the loop ends
                instructions.push(ByteCode::JumpIfZero(usize::MAX));
                blocks.push(nodes.iter());
            }
        }
    }

    instructions
}
