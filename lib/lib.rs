extern crate proc_macro;
use std::{fmt, fs, path::PathBuf};

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, LitStr};

/// The tree the macros generate code from, built straight from the literal
#[derive(Debug, PartialEq)]
enum Statement {
    MoveRight,
    MoveLeft,
    Increment,
    Decrement,
    Write,
    Read,
    Loop(Vec<Statement>),
}

/// Where a bracket sits, rendered the same way as the runtime lexer's positions
#[derive(Debug, Clone, Copy)]
struct Position {
    offset: usize,
    line: usize,
    col: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} (offset {})", self.line, self.col, self.offset)
    }
}

/// Checks the brackets and builds the tree in one pass.
/// Error messages match the ones `tokenize` gives at runtime.
fn parse_statements(source: &str) -> Result<Vec<Statement>, String> {
    let (mut line, mut col) = (1, 1);
    let mut current = vec![];
    // (position of the `[`, statements before it)
    let mut enclosing: Vec<(Position, Vec<Statement>)> = vec![];

    for (offset, c) in source.chars().enumerate() {
        let position = Position { offset, line, col };
        col += 1;
        if c == '\n' {
            line += 1;
            col = 1;
        }

        match c {
            '>' => current.push(Statement::MoveRight),
            '<' => current.push(Statement::MoveLeft),
            '+' => current.push(Statement::Increment),
            '-' => current.push(Statement::Decrement),
            '.' => current.push(Statement::Write),
            ',' => current.push(Statement::Read),
            '[' => enclosing.push((position, std::mem::take(&mut current))),
            ']' => match enclosing.pop() {
                Some((_, parent)) => {
                    let body = std::mem::replace(&mut current, parent);
                    current.push(Statement::Loop(body));
                }
                None => {
                    return Err(format!(
                        "unmatched `]` at {position}, there is no `[` to close"
                    ))
                }
            },
            _ => {}
        }
    }

    match enclosing.pop() {
        Some((position, _)) => Err(format!(
            "unmatched `[` at {position}, it is never closed by a `]`"
        )),
        None => Ok(current),
    }
}

fn encode_block(statements: &[Statement]) -> proc_macro2::TokenStream {
    statements
        .iter()
        .map(|statement| match statement {
            Statement::MoveRight => quote! { runtime.move_right(); },
            Statement::MoveLeft => quote! { runtime.move_left()?; },
            Statement::Increment => quote! { runtime.increment(); },
            Statement::Decrement => quote! { runtime.decrement(); },
            Statement::Write => quote! { runtime.write()?; },
            Statement::Read => quote! { runtime.read()?; },
            Statement::Loop(body) => {
                let body = encode_block(body);
                quote! {
                    while !runtime.value_is_zero() {
                        #body
                    }
                }
            }
        })
        .collect()
}

/// Expands to a `CompiledUnit` wrapping a generated function, `tracked_file` is
/// passed to `include_bytes!` so the invoking crate rebuilds when it changes
fn encode_unit(statements: &[Statement], tracked_file: Option<String>) -> proc_macro2::TokenStream {
    let body = encode_block(statements);
    let tracked = tracked_file.map(|path| {
        quote! {
            const _: &[u8] = include_bytes!(#path);
        }
    });

    quote! {
        {
            #tracked

            #[allow(unused_variables)]
            fn compiled(
                runtime: &mut crate::interpreter::Runtime<'_>,
            ) -> ::std::result::Result<(), crate::interpreter::RuntimeError> {
                #body
                ::std::result::Result::Ok(())
            }

            crate::compiler::CompiledUnit::native(compiled)
        }
    }
}

/// Translates a source literal at compile time, e.g. `program!(",[.,]")`.
/// Mismatched brackets are a compile error.
#[proc_macro]
pub fn program(stream: TokenStream) -> TokenStream {
    let source = parse_macro_input!(stream as LitStr);

    match parse_statements(&source.value()) {
        Ok(statements) => encode_unit(&statements, None).into(),
        Err(message) => syn::Error::new(source.span(), message)
            .to_compile_error()
            .into(),
    }
}

/// Like `program!` but reads the source from a file relative to the crate root
#[proc_macro]
pub fn include_program(stream: TokenStream) -> TokenStream {
    let relative = parse_macro_input!(stream as LitStr);

    let root = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| String::from("."));
    let path = PathBuf::from(root).join(relative.value());

    let result = fs::read_to_string(&path)
        .map_err(|e| format!("couldn't read {}: {e}", path.display()))
        .and_then(|source| {
            parse_statements(&source).map_err(|e| format!("{}: {e}", path.display()))
        });

    match result {
        Ok(statements) => encode_unit(&statements, Some(path.display().to_string())).into(),
        Err(message) => syn::Error::new(relative.span(), message)
            .to_compile_error()
            .into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_nested_loops() {
        assert_eq!(
            parse_statements("+[>[-]<] comment .").unwrap(),
            vec![
                Statement::Increment,
                Statement::Loop(vec![
                    Statement::MoveRight,
                    Statement::Loop(vec![Statement::Decrement]),
                    Statement::MoveLeft,
                ]),
                Statement::Write,
            ]
        );
    }

    #[test]
    fn reports_bracket_positions() {
        assert_eq!(
            parse_statements("+ ]").unwrap_err(),
            "unmatched `]` at 1:3 (offset 2), there is no `[` to close"
        );
        assert_eq!(
            parse_statements("[ [ ]").unwrap_err(),
            "unmatched `[` at 1:1 (offset 0), it is never closed by a `]`"
        );
        assert!(parse_statements("][").is_err());
    }

    #[test]
    fn positions_count_lines_like_the_lexer() {
        assert_eq!(
            parse_statements("+\n+]").unwrap_err(),
            "unmatched `]` at 2:2 (offset 3), there is no `[` to close"
        );
        // the innermost unclosed `[` is the one reported
        assert_eq!(
            parse_statements("[\n [ [] ").unwrap_err(),
            "unmatched `[` at 2:2 (offset 3), it is never closed by a `]`"
        );
        assert_eq!(
            parse_statements("é\tü\n\n  ]").unwrap_err(),
            "unmatched `]` at 3:3 (offset 7), there is no `[` to close"
        );
    }

    #[test]
    fn loops_become_while_loops() {
        let code = encode_block(&parse_statements("[[-]>]").unwrap()).to_string();
        assert_eq!(code.matches("while").count(), 2);
        assert_eq!(code.matches("value_is_zero").count(), 2);
        assert_eq!(code.matches("move_right").count(), 1);
    }

    #[test]
    fn tracks_included_files() {
        let code = encode_unit(&[], Some(String::from("/tmp/x.bf"))).to_string();
        assert!(code.contains("include_bytes"));
        assert!(!encode_unit(&[], None).to_string().contains("include_bytes"));
    }
}
