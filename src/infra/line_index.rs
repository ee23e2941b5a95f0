//! Newline index over a whole document.
//!
//! Goals
//! - Single pass over bytes to record '\n' positions.
//! - 1-based external line numbers (what grep-style pickers print).
//! - Line numbers always count from the true document start; viewport
//!   narrowing is the caller's business and never shifts them.
//! - Binary search for byte→line mapping.
//!
//! Notes
//! - An empty buffer still has line 1 (the cursor has to be somewhere).
//! - A byte offset sitting *on* a '\n' belongs to the line that newline
//!   terminates.
//! - For ranges, end is exclusive (Rust slicing convention).

#[derive(Debug, Clone)]
pub struct NewlineIndex
{
    /// Byte positions of every '\n' in the buffer.
    nl_positions: Vec<usize>,
    /// Total byte length of the buffer.
    len: usize,
}

impl NewlineIndex
{
    /// Build an index recording positions of '\n'.
    pub fn build(bytes: &[u8]) -> Self
    {
        let nl_positions: Vec<usize> = memchr::memchr_iter(b'\n', bytes).collect();

        Self { nl_positions, len: bytes.len() }
    }

    /// Total number of logical lines; never less than 1.
    pub fn line_count(&self) -> usize
    {
        self.nl_positions
            .len()
            + 1
    }

    /// 1-based line number of `byte`: one plus the number of '\n'
    /// strictly before it. Offsets past the end clamp to the last line.
    pub fn line_of_byte(
        &self,
        byte: usize,
    ) -> usize
    {
        let byte = byte.min(self.len);
        self.nl_positions
            .partition_point(|&nl| nl < byte)
            + 1
    }

    /// Start byte (inclusive) of a 1-based line.
    /// Returns None if line is out of range.
    pub fn start_byte_of_line(
        &self,
        line1: usize,
    ) -> Option<usize>
    {
        if line1 == 0 || line1 > self.line_count()
        {
            return None;
        }
        if line1 == 1
        {
            return Some(0);
        }
        // For line L>1, start is one past the previous '\n'.
        self.nl_positions
            .get(line1 - 2)
            .map(|&prev_nl| prev_nl + 1)
    }

    /// End byte (exclusive) of a 1-based line, excluding the '\n' and a
    /// trailing '\r' before it.
    pub fn end_byte_of_line(
        &self,
        line1: usize,
        bytes: &[u8],
    ) -> Option<usize>
    {
        if line1 == 0 || line1 > self.line_count()
        {
            return None;
        }

        if let Some(&nl) = self
            .nl_positions
            .get(line1 - 1)
        {
            if nl > 0 && bytes.get(nl - 1) == Some(&b'\r')
            {
                return Some(nl - 1);
            }
            return Some(nl);
        }

        // Last line without trailing '\n' ends at EOF.
        Some(self.len)
    }

    /// First byte of the line after the one holding `byte`, or the
    /// buffer length when `byte` is on the last line.
    pub fn next_line_start(
        &self,
        byte: usize,
    ) -> usize
    {
        let line = self.line_of_byte(byte);
        self.nl_positions
            .get(line - 1)
            .map_or(self.len, |&nl| nl + 1)
    }
}
