// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Operation Context Stack
//!
//! Mirrors a Python context-manager idiom for annotating errors with the
//! stack of operations in progress when they occurred (e.g. `Pipeline 'menu'
//! configuring stages: ...`). Implemented with a thread-local stack and an
//! RAII guard rather than a `contextmanager` decorator.

use std::cell::RefCell;

thread_local! {
    static CONTEXT_STACK: RefCell<Vec<String>> = RefCell::new(Vec::new());
}

/// RAII guard that pushes a context string on construction and pops it on
/// drop, regardless of unwind path.
pub struct OpContext;

impl OpContext {
    pub fn push(message: impl Into<String>) -> Self {
        CONTEXT_STACK.with(|stack| stack.borrow_mut().push(message.into()));
        OpContext
    }

    /// Snapshot of the current context stack, outermost first.
    pub fn stack() -> Vec<String> {
        CONTEXT_STACK.with(|stack| stack.borrow().clone())
    }

    /// Render the stack as a single prefix, e.g. `A > B > C`.
    pub fn prefix() -> String {
        Self::stack().join(" > ")
    }
}

impl Drop for OpContext {
    fn drop(&mut self) {
        CONTEXT_STACK.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_contexts_compose_and_unwind() {
        assert_eq!(OpContext::prefix(), "");
        {
            let _a = OpContext::push("Pipeline 'menu'");
            {
                let _b = OpContext::push("configuring stages");
                assert_eq!(OpContext::prefix(), "Pipeline 'menu' > configuring stages");
            }
            assert_eq!(OpContext::prefix(), "Pipeline 'menu'");
        }
        assert_eq!(OpContext::prefix(), "");
    }
}
