use std::mem;

use crate::lexer::{Instruction, Instructions};

use super::{Block, Node, Program};

pub struct Parser<'a> {
    tokens: std::slice::Iter<'a, Instruction>,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a Instructions) -> Parser<'a> {
        Parser {
            tokens: tokens.iter(),
        }
    }

    /// Builds the tree with an explicit stack of open blocks, so nesting depth is only
    /// limited by memory.
    pub fn parse_program(&mut self) -> Program {
        let mut current: Vec<Node> = vec![];
        // the blocks enclosing `current`, outermost first
        let mut enclosing: Vec<Vec<Node>> = vec![];

        for token in self.tokens.by_ref() {
            match *token {
                Instruction::LoopStart => enclosing.push(mem::take(&mut current)),
                Instruction::LoopEnd => {
                    // `Instructions` are balanced so there is always an enclosing block here
                    let parent = enclosing.pop().unwrap_or_default();
                    let body = mem::replace(&mut current, parent);
                    current.push(Node::Loop(Block::new(body)));
                }
                instruction => current.push(Node::Simple(instruction)),
            }
        }

        debug_assert!(enclosing.is_empty(), "lexer let through an unclosed loop");
        Block::new(current)
    }
}

pub fn parse(tokens: &Instructions) -> Program {
    Parser::new(tokens).parse_program()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{lexer::tokenize, Instruction::*};

    fn tree(source: &str) -> Program {
        parse(&tokenize(source).unwrap())
    }

    #[test]
    fn flat_program() {
        assert_eq!(
            tree("+>.,").nodes,
            vec![
                Node::Simple(Increment),
                Node::Simple(MoveRight),
                Node::Simple(Output),
                Node::Simple(Input),
            ]
        );
    }

    #[test]
    fn empty_loop_is_kept() {
        assert_eq!(tree("[]").nodes, vec![Node::Loop(Block::default())]);
    }

    #[test]
    fn nested_and_sibling_loops() {
        let program = tree("+[>[-]<-][.]");
        assert_eq!(
            program.nodes,
            vec![
                Node::Simple(Increment),
                Node::Loop(Block::new(vec![
                    Node::Simple(MoveRight),
                    Node::Loop(Block::new(vec![Node::Simple(Decrement)])),
                    Node::Simple(MoveLeft),
                    Node::Simple(Decrement),
                ])),
                Node::Loop(Block::new(vec![Node::Simple(Output)])),
            ]
        );
        assert_eq!(program.depth(), 2);
    }

    #[test]
    fn display_indents_loop_bodies() {
        assert_eq!(tree("+[>[-]].").to_string(), "+\nloop\n  >\n  loop\n    -\n.\n");
        assert_eq!(tree("").to_string(), "");
    }

    #[test]
    fn deep_nesting_does_not_recurse() {
        let depth = 100_000;
        let source = "[".repeat(depth) + &"]".repeat(depth);
        let program = tree(&source);
        assert_eq!(program.nodes.len(), 1);

        let mut block = &program;
        let mut seen = 0;
        while let Some(Node::Loop(body)) = block.nodes.first() {
            seen += 1;
            block = body;
        }
        assert_eq!(seen, depth);
        assert_eq!(program.depth(), depth);
    }

    #[test]
    fn depth_counts_the_deepest_branch() {
        assert_eq!(tree("+-.").depth(), 0);
        assert_eq!(tree("[][[]]").depth(), 2);
        assert_eq!(tree("[[[-]]>[<]]").depth(), 3);
    }
}
