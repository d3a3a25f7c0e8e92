pub mod parser;

use std::{fmt, mem};

use crate::lexer::Instruction;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Any instruction other than `[` / `]`
    Simple(Instruction),

    /// A matched `[` ... `]` pair and everything between them
    Loop(Block),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Block {
    pub nodes: Vec<Node>,
}

pub type Program = Block;

impl Block {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Deepest loop nesting inside this block, 0 when there are no loops
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(self, 0)];
        while let Some((block, depth)) = pending.pop() {
            deepest = deepest.max(depth);
            for node in block.nodes.iter() {
                if let Node::Loop(body) = node {
                    pending.push((body, depth + 1));
                }
            }
        }
        deepest
    }
}

/// One node per line, loop bodies indented under `loop`
impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut blocks = vec![self.nodes.iter()];
        while let Some(block) = blocks.last_mut() {
            let Some(node) = block.next() else {
                blocks.pop();
                continue;
            };
            let indent = 2 * (blocks.len() - 1);
            match node {
                Node::Simple(instruction) => writeln!(f, "{:indent$}{}", "", instruction.symbol())?,
                Node::Loop(body) => {
                    writeln!(f, "{:indent$}loop", "")?;
                    blocks.push(body.nodes.iter());
                }
            }
        }
        Ok(())
    }
}

/// Tears the tree down one level at a time, the derived drop would recurse per loop
impl Drop for Block {
    fn drop(&mut self) {
        if !self.nodes.iter().any(|node| matches!(node, Node::Loop(_))) {
            return;
        }
        let mut pending = vec![mem::take(&mut self.nodes)];
        while let Some(nodes) = pending.pop() {
            for node in nodes {
                if let Node::Loop(mut body) = node {
                    pending.push(mem::take(&mut body.nodes));
                }
            }
        }
    }
}
