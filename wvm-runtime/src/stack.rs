// WVM - wvm-runtime
// Module: Operand Stack
//
// Copyright (c) 2026 The WVM Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! The operand stack.
//!
//! Every logical value occupies one 64-bit slot regardless of its declared
//! width; the unused high bits of 32-bit values are kept zeroed by the
//! producers that push them. Underflow here means the compiler emitted
//! unbalanced code, which is a bug in this crate rather than a guest
//! condition, so it panics instead of returning an error.

/// The VM operand stack: locals, saved program counters, and temporaries
/// all live here as 64-bit slots.
#[derive(Debug, Default)]
pub struct ValueStack {
    slots: Vec<u64>,
}

impl ValueStack {
    /// Create an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current depth in slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the stack is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Push one slot.
    pub fn push(&mut self, value: u64) {
        self.slots.push(value);
    }

    /// Pop one slot.
    ///
    /// # Panics
    /// Panics on underflow (compiled code cannot underflow).
    pub fn pop(&mut self) -> u64 {
        self.slots.pop().expect("operand stack underflow")
    }

    /// Read the top slot without popping.
    #[must_use]
    pub fn top(&self) -> u64 {
        self.slots[self.slots.len() - 1]
    }

    /// Read the slot `rel` positions below the top (`rel >= 1`).
    #[must_use]
    pub fn from_top(&self, rel: u32) -> u64 {
        self.slots[self.slots.len() - rel as usize]
    }

    /// Overwrite the slot `rel` positions below the top (`rel >= 1`).
    pub fn set_from_top(&mut self, rel: u32, value: u64) {
        let idx = self.slots.len() - rel as usize;
        self.slots[idx] = value;
    }

    /// Drop slots down to the given depth.
    pub fn truncate(&mut self, len: usize) {
        self.slots.truncate(len);
    }

    /// Push `count` zeroed slots.
    pub fn push_zeroed(&mut self, count: usize) {
        self.slots.resize(self.slots.len() + count, 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_pop_from_top() {
        let mut stack = ValueStack::new();
        stack.push(1);
        stack.push(2);
        stack.push(3);
        assert_eq!(stack.len(), 3);
        assert_eq!(stack.top(), 3);
        assert_eq!(stack.from_top(3), 1);
        stack.set_from_top(2, 20);
        assert_eq!(stack.pop(), 3);
        assert_eq!(stack.pop(), 20);
    }

    #[test]
    fn zeroed_and_truncate() {
        let mut stack = ValueStack::new();
        stack.push(9);
        stack.push_zeroed(3);
        assert_eq!(stack.len(), 4);
        assert_eq!(stack.top(), 0);
        stack.truncate(1);
        assert_eq!(stack.pop(), 9);
        assert!(stack.is_empty());
    }

    #[test]
    #[should_panic(expected = "operand stack underflow")]
    fn underflow_panics() {
        let mut stack = ValueStack::new();
        let _ = stack.pop();
    }
}
