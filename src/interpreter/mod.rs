pub mod ast_interpreter;
pub mod bytecode_interpreter;

use std::io::{self, ErrorKind, Read, Write};

use clap::ValueEnum;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("data pointer moved left of the first cell")]
    PointerUnderflow,

    #[error("I/O error: {0}")]
    Io(
        #[from]
        io::Error,
    ),
}

/// What `,` stores once the input is exhausted
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum EofPolicy {
    /// Store 0
    #[default]
    Zero,
    /// Leave the cell as it was
    Unchanged,
    /// Store 255 (-1 as a byte)
    Max,
}

/// The tape machine a single invocation runs on.
///
/// The tape starts as one zero cell and grows one cell at a time as the pointer moves right.
/// Cells are bytes and wrap on overflow.
pub struct Runtime<'a> {
    /// Pointer into the heap
    data_pointer: usize,

    /// Our growable heap
    heap: Vec<u8>,

    in_stream: &'a mut dyn Read,
    out_stream: &'a mut dyn Write,

    eof: EofPolicy,
}

impl<'a> Runtime<'a> {
    pub fn new(
        in_stream: &'a mut dyn Read,
        out_stream: &'a mut dyn Write,
        eof: EofPolicy,
    ) -> Self {
        Self {
            data_pointer: 0,
            heap: vec![0],
            in_stream,
            out_stream,
            eof,
        }
    }

    /// Read a single byte from the input stream into the current cell
    pub fn read(&mut self) -> Result<(), RuntimeError> {
        let mut byte = [0u8; 1];
        loop {
            match self.in_stream.read(&mut byte) {
                Ok(0) => {
                    match self.eof {
                        EofPolicy::Zero => self.heap[self.data_pointer] = 0,
                        EofPolicy::Unchanged => {}
                        EofPolicy::Max => self.heap[self.data_pointer] = u8::MAX,
                    }
                    return Ok(());
                }
                Ok(_) => {
                    self.heap[self.data_pointer] = byte[0];
                    return Ok(());
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Write the current cell to the output stream
    pub fn write(&mut self) -> Result<(), RuntimeError> {
        self.out_stream
            .write_all(&self.heap[self.data_pointer..=self.data_pointer])?;
        Ok(())
    }

    pub fn increment(&mut self) {
        self.heap[self.data_pointer] = self.heap[self.data_pointer].wrapping_add(1);
    }

    pub fn decrement(&mut self) {
        self.heap[self.data_pointer] = self.heap[self.data_pointer].wrapping_sub(1);
    }

    pub fn move_right(&mut self) {
        self.data_pointer += 1;
        if self.data_pointer == self.heap.len() {
            self.heap.push(0);
        }
    }

    pub fn move_left(&mut self) -> Result<(), RuntimeError> {
        self.data_pointer = self
            .data_pointer
            .checked_sub(1)
            .ok_or(RuntimeError::PointerUnderflow)?;
        Ok(())
    }

    /// is the value at the data pointer zero?
    pub fn value_is_zero(&self) -> bool {
        self.heap[self.data_pointer] == 0
    }

    #[cfg(test)]
    pub fn data_pointer(&self) -> usize {
        self.data_pointer
    }

    #[cfg(test)]
    pub fn heap(&self) -> &[u8] {
        &self.heap
    }

    pub fn flush(&mut self) -> Result<(), RuntimeError> {
        self.out_stream.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_a_single_zero_cell() {
        let (mut input, mut output) = (io::empty(), Vec::<u8>::new());
        let runtime = Runtime::new(&mut input, &mut output, EofPolicy::Zero);
        assert_eq!(runtime.heap(), &[0]);
        assert_eq!(runtime.data_pointer(), 0);
        assert!(runtime.value_is_zero());
    }

    #[test]
    fn cells_wrap() {
        let (mut input, mut output) = (io::empty(), Vec::<u8>::new());
        let mut runtime = Runtime::new(&mut input, &mut output, EofPolicy::Zero);
        runtime.decrement();
        assert_eq!(runtime.heap(), &[255]);
        runtime.increment();
        assert_eq!(runtime.heap(), &[0]);
    }

    #[test]
    fn tape_grows_on_demand() {
        let (mut input, mut output) = (io::empty(), Vec::<u8>::new());
        let mut runtime = Runtime::new(&mut input, &mut output, EofPolicy::Zero);
        for _ in 0..50_000 {
            runtime.move_right();
        }
        runtime.increment();
        assert_eq!(runtime.heap().len(), 50_001);
        assert_eq!(runtime.heap()[50_000], 1);

        // moving back doesn't shrink the tape
        runtime.move_left().unwrap();
        runtime.move_right();
        assert_eq!(runtime.heap().len(), 50_001);
        assert!(!runtime.value_is_zero());
    }

    #[test]
    fn moving_left_of_the_first_cell_fails() {
        let (mut input, mut output) = (io::empty(), Vec::<u8>::new());
        let mut runtime = Runtime::new(&mut input, &mut output, EofPolicy::Zero);
        assert!(matches!(runtime.move_left(), Err(RuntimeError::PointerUnderflow)));
        assert_eq!(runtime.data_pointer(), 0);
    }

    #[test]
    fn read_and_write_bytes() {
        let mut input: &[u8] = &[0xE9, b'x'];
        let mut output = Vec::<u8>::new();
        let mut runtime = Runtime::new(&mut input, &mut output, EofPolicy::Zero);
        runtime.read().unwrap();
        runtime.write().unwrap();
        runtime.read().unwrap();
        runtime.write().unwrap();
        drop(runtime);
        assert_eq!(output, vec![0xE9, b'x']);
    }

    fn cell_after_eof(eof: EofPolicy) -> u8 {
        let (mut input, mut output) = (io::empty(), Vec::<u8>::new());
        let mut runtime = Runtime::new(&mut input, &mut output, eof);
        for _ in 0..7 {
            runtime.increment();
        }
        runtime.read().unwrap();
        runtime.heap()[0]
    }

    #[test]
    fn eof_policies() {
        assert_eq!(cell_after_eof(EofPolicy::Zero), 0);
        assert_eq!(cell_after_eof(EofPolicy::Unchanged), 7);
        assert_eq!(cell_after_eof(EofPolicy::Max), 255);
        assert_eq!(EofPolicy::default(), EofPolicy::Zero);
    }

    struct Interrupting(bool);

    impl Read for Interrupting {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if !self.0 {
                self.0 = true;
                return Err(io::Error::new(ErrorKind::Interrupted, "again"));
            }
            buf[0] = b'k';
            Ok(1)
        }
    }

    #[test]
    fn interrupted_reads_are_retried() {
        let (mut input, mut output) = (Interrupting(false), Vec::<u8>::new());
        let mut runtime = Runtime::new(&mut input, &mut output, EofPolicy::Zero);
        runtime.read().unwrap();
        assert_eq!(runtime.heap(), b"k");
    }
}
