use std::{
    fmt,
    io::{Read, Write},
    sync::Arc,
};

use clap::ValueEnum;
use thiserror::Error;

use crate::{
    bytecode::{bytecode::to_bytecode, ByteCode},
    encoding::{decode_latin1, encode_latin1, UnencodableChar},
    interpreter::{
        ast_interpreter::AstInterpreter, bytecode_interpreter::ByteCodeInterpreter, EofPolicy,
        Runtime, RuntimeError,
    },
    lexer::{lexer::tokenize, SyntaxError},
    parser::{parser::parse, Program},
};

/// Signature of the functions generated by `program!` / `include_program!`
pub type NativeFn = fn(&mut Runtime<'_>) -> Result<(), RuntimeError>;

/// How a [`CompiledUnit`] executes its program
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Backend {
    /// Flat bytecode with resolved jumps
    #[default]
    Bytecode,
    /// Walk the tree directly
    Ast,
}

/// A failed invocation, along with everything the program wrote before it failed
#[derive(Error, Debug)]
#[error("{source} (after {len} bytes of output)", len = .output.len())]
pub struct ExecutionError {
    pub source: RuntimeError,
    pub output: Vec<u8>,
}

#[derive(Error, Debug)]
pub enum TextError {
    #[error("input can't be passed to the program: {0}")]
    Unencodable(
        #[from]
        UnencodableChar,
    ),

    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

#[derive(Clone)]
enum Code {
    Bytecode(Vec<ByteCode>),
    Tree(Arc<Program>),
    Native(NativeFn),
}

impl fmt::Debug for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Code::Bytecode(code) => f.debug_tuple("Bytecode").field(code).finish(),
            Code::Tree(program) => write!(f, "Tree(depth {})", program.depth()),
            Code::Native(_) => f.write_str("Native"),
        }
    }
}

/// A translated program.
///
/// Units hold no state between calls: every invocation runs on a fresh tape with its own
/// input cursor and output, so the same input always gives the same output.
#[derive(Debug, Clone)]
pub struct CompiledUnit {
    code: Code,
    eof: EofPolicy,
}

impl CompiledUnit {
    /// Runs the program against arbitrary streams.
    ///
    /// Output is flushed once the program halts. On failure whatever was already written
    /// stays written.
    pub fn run(&self, input: &mut dyn Read, output: &mut dyn Write) -> Result<(), RuntimeError> {
        let mut runtime = Runtime::new(input, output, self.eof);
        match &self.code {
            Code::Bytecode(code) => ByteCodeInterpreter::new().run(&mut runtime, code)?,
            Code::Tree(program) => AstInterpreter::new().interpret(&mut runtime, program)?,
            Code::Native(function) => function(&mut runtime)?,
        }
        runtime.flush()
    }

    /// Runs the program over `input`, returning the bytes it wrote.
    ///
    /// If the program faults, the partial output is handed back inside the error.
    pub fn call(&self, input: &[u8]) -> Result<Vec<u8>, ExecutionError> {
        let mut reader = input;
        let mut output = Vec::<u8>::new();
        match self.run(&mut reader, &mut output) {
            Ok(()) => Ok(output),
            Err(source) => Err(ExecutionError { source, output }),
        }
    }
}

/// Embedding API, used by the generated code and library callers rather than the CLI
#[allow(dead_code)]
impl CompiledUnit {
    /// Wraps a function generated at compile time
    pub fn native(function: NativeFn) -> Self {
        Self {
            code: Code::Native(function),
            eof: EofPolicy::default(),
        }
    }

    pub fn with_eof(mut self, eof: EofPolicy) -> Self {
        self.eof = eof;
        self
    }

    pub fn eof_policy(&self) -> EofPolicy {
        self.eof
    }

    /// The generated code, when this unit runs on the bytecode backend
    pub fn bytecode(&self) -> Option<&[ByteCode]> {
        match &self.code {
            Code::Bytecode(code) => Some(code.as_slice()),
            _ => None,
        }
    }

    /// [`CompiledUnit::call`] with Latin-1 text on both sides, see [`crate::encoding`]
    pub fn call_str(&self, input: &str) -> Result<String, TextError> {
        let input = encode_latin1(input)?;
        Ok(decode_latin1(&self.call(&input)?))
    }
}

/// Turns source text into [`CompiledUnit`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct Compiler {
    backend: Backend,
    eof: EofPolicy,
}

impl Compiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_eof(mut self, eof: EofPolicy) -> Self {
        self.eof = eof;
        self
    }

    pub fn translate(&self, source: &str) -> Result<CompiledUnit, SyntaxError> {
        let tokens = tokenize(source)?;
        Ok(self.compile(parse(&tokens)))
    }

    pub fn compile(&self, program: Program) -> CompiledUnit {
        let code = match self.backend {
            Backend::Bytecode => Code::Bytecode(to_bytecode(&program)),
            Backend::Ast => Code::Tree(Arc::new(program)),
        };
        CompiledUnit {
            code,
            eof: self.eof,
        }
    }
}

/// Translates with the default backend and end-of-input policy
#[allow(dead_code)]
pub fn translate(source: &str) -> Result<CompiledUnit, SyntaxError> {
    Compiler::new().translate(source)
}
