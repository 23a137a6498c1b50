//! A thread-local diagnostic channel.
//!
//! Per the crate's error handling policy, a failure inside any sub-decoder is
//! caught and translated into a `raw` reinterpretation rather than aborting
//! the packet. That's silent to the caller unless they ask — this module is
//! where the "why" goes instead of stderr. It is intentionally not a logging
//! crate: the teacher this codec is modeled on doesn't pull one in either
//! (it's a wire-format library, not a service), so neither does this.

use std::cell::RefCell;

/// Maximum number of diagnostic messages retained per thread before the oldest
/// are dropped.
const MAX_DIAGNOSTICS: usize = 64;

thread_local! {
    static DIAGNOSTICS: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

/// Records a diagnostic message for the current thread.
pub(crate) fn record(message: impl Into<String>) {
    DIAGNOSTICS.with(|cell| {
        let mut messages = cell.borrow_mut();
        if messages.len() >= MAX_DIAGNOSTICS {
            messages.remove(0);
        }
        messages.push(message.into());
    });
}

/// Drains and returns every diagnostic message recorded on the current thread
/// since the last call to this function.
pub fn drain() -> Vec<String> {
    DIAGNOSTICS.with(|cell| cell.borrow_mut().drain(..).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_empties_the_buffer() {
        // tests run on separate threads, so this thread's buffer starts fresh
        record("first");
        record("second");
        let drained = drain();
        assert_eq!(drained, vec!["first".to_string(), "second".to_string()]);
        assert!(drain().is_empty());
    }

    #[test]
    fn buffer_drops_oldest_past_capacity() {
        for i in 0..MAX_DIAGNOSTICS + 5 {
            record(format!("message {i}"));
        }
        let drained = drain();
        assert_eq!(drained.len(), MAX_DIAGNOSTICS);
        assert_eq!(drained[0], "message 5");
    }
}
