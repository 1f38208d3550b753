//! Bounded-time outbound buffering over a non-blocking fd.
//!
//! Keyboard input must reach the shell without ever stalling the frame
//! loop, so a send performs at most two `write` syscalls and never loops
//! until drained: whatever the kernel refuses is queued and retried on the
//! next send or flush.

use std::collections::VecDeque;
use std::io::{self, Write};

#[derive(Debug, Default)]
pub struct WriteQueue {
    pending: VecDeque<u8>,
}

impl WriteQueue {
    pub fn new() -> Self {
        WriteQueue::default()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Bytes accepted but not yet written to the fd.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Hand `text` to the sink, queueing whatever does not fit.
    ///
    /// Older queued bytes are always written before `text` so output stays
    /// FIFO. `WouldBlock` counts as zero bytes written, not an error; any
    /// other error is fatal for the session and propagates.
    pub fn send<W: Write + ?Sized>(&mut self, sink: &mut W, text: &[u8]) -> io::Result<()> {
        if !self.pending.is_empty() {
            self.flush(sink)?;
            if !self.pending.is_empty() {
                // still blocked; keep the new bytes behind the old ones
                self.pending.extend(text);
                return Ok(());
            }
        }

        let written = write_nonblocking(sink, text)?;
        self.pending.extend(&text[written..]);
        Ok(())
    }

    /// One attempt at draining the queue. At most one `write` syscall.
    pub fn flush<W: Write + ?Sized>(&mut self, sink: &mut W) -> io::Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        self.pending.make_contiguous();
        let (front, _) = self.pending.as_slices();
        let written = write_nonblocking(sink, front)?;
        self.pending.drain(..written);
        Ok(())
    }
}

fn write_nonblocking<W: Write + ?Sized>(sink: &mut W, buf: &[u8]) -> io::Result<usize> {
    match sink.write(buf) {
        Ok(n) => Ok(n),
        Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => Ok(0),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Sink that accepts a limited number of bytes per write call.
    struct Throttled {
        /// Byte budget per write call; `0` means `WouldBlock`.
        per_call: Vec<usize>,
        call: usize,
        written: Vec<u8>,
        write_calls: usize,
    }

    impl Throttled {
        fn new(per_call: Vec<usize>) -> Self {
            Throttled {
                per_call,
                call: 0,
                written: Vec::new(),
                write_calls: 0,
            }
        }
    }

    impl Write for Throttled {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.write_calls += 1;
            let budget = self.per_call.get(self.call).copied().unwrap_or(usize::MAX);
            self.call += 1;
            if budget == 0 {
                return Err(io::Error::new(io::ErrorKind::WouldBlock, "full"));
            }
            let n = budget.min(buf.len());
            self.written.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_unobstructed_send_writes_everything() {
        let mut sink = Throttled::new(vec![]);
        let mut queue = WriteQueue::new();
        queue.send(&mut sink, b"ls -l\n").unwrap();
        assert_eq!(sink.written, b"ls -l\n");
        assert!(queue.is_empty());
    }

    #[test]
    fn test_partial_write_queues_remainder() {
        let mut sink = Throttled::new(vec![3]);
        let mut queue = WriteQueue::new();
        queue.send(&mut sink, b"abcdef").unwrap();
        assert_eq!(sink.written, b"abc");
        assert_eq!(queue.pending(), 3);

        queue.flush(&mut sink).unwrap();
        assert_eq!(sink.written, b"abcdef");
        assert!(queue.is_empty());
    }

    #[test]
    fn test_would_block_is_not_an_error() {
        let mut sink = Throttled::new(vec![0]);
        let mut queue = WriteQueue::new();
        queue.send(&mut sink, b"xyz").unwrap();
        assert!(sink.written.is_empty());
        assert_eq!(queue.pending(), 3);
    }

    #[test]
    fn test_fifo_order_preserved_across_sends() {
        let mut sink = Throttled::new(vec![2, 0, 4]);
        let mut queue = WriteQueue::new();
        queue.send(&mut sink, b"first").unwrap(); // writes "fi", queues "rst"
        queue.send(&mut sink, b"second").unwrap(); // blocked, queues all
        assert_eq!(sink.written, b"fi");
        assert_eq!(queue.pending(), 9);

        queue.flush(&mut sink).unwrap();
        queue.flush(&mut sink).unwrap();
        assert_eq!(sink.written, b"firstsecond");
        assert!(queue.is_empty());
    }

    #[test]
    fn test_send_performs_at_most_two_writes() {
        // a non-empty queue plus new text: one flush attempt, one write
        let mut sink = Throttled::new(vec![1]);
        let mut queue = WriteQueue::new();
        queue.send(&mut sink, b"abc").unwrap();
        assert_eq!(sink.write_calls, 1);

        queue.send(&mut sink, b"def").unwrap();
        assert!(sink.write_calls <= 3);
        assert_eq!(sink.written, b"abcdef");
        assert!(queue.is_empty());
    }

    #[test]
    fn test_every_byte_is_eventually_written() {
        let mut sink = Throttled::new(vec![1, 0, 2, 0, 1, 3, 0, 2, 5]);
        let mut queue = WriteQueue::new();
        let chunks: [&[u8]; 4] = [b"echo", b" hello", b" world", b"\n"];

        let mut total = 0;
        for chunk in chunks {
            queue.send(&mut sink, chunk).unwrap();
            total += chunk.len();
        }
        for _ in 0..20 {
            queue.flush(&mut sink).unwrap();
        }

        assert_eq!(sink.written.len(), total);
        assert_eq!(sink.written, b"echo hello world\n");
        assert!(queue.is_empty());
    }

    #[test]
    fn test_real_errors_propagate() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut queue = WriteQueue::new();
        let err = queue.send(&mut Broken, b"data").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }
}
