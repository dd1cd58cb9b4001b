// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Human-readable stack reports and the sinks that receive them.
//!
//! A report is plain text: one labelled line per record field, the slot
//! listing, and, when something is violated, one line per violation with the
//! field values involved.

use core::fmt;
use core::panic::Location;

use crate::canary::{self, CANARY};
use crate::condition::Condition;
use crate::element::Element;
use crate::error::ErrorCode;
use crate::hash::func_addr;
use crate::poison;
use crate::stack::GuardStack;

/// One report handed to a [`DiagnosticSink`].
#[derive(Debug, Clone, Copy)]
pub struct Diagnostic<'a> {
    /// Where the failing (or dumping) operation was called from.
    pub caller: &'static Location<'static>,
    /// [`ErrorCode::None`] for plain dumps.
    pub code: ErrorCode,
    /// Violations found; `OK` for plain dumps and allocation failures.
    pub condition: Condition,
    /// Rendered report text.
    pub report: &'a str,
}

/// Destination for diagnostics produced by a [`GuardStack`].
pub trait DiagnosticSink {
    /// Receives one diagnostic.
    fn emit(&mut self, diagnostic: &Diagnostic<'_>);
}

impl<F> DiagnosticSink for F
where
    F: FnMut(&Diagnostic<'_>),
{
    fn emit(&mut self, diagnostic: &Diagnostic<'_>) {
        self(diagnostic)
    }
}

/// Forwards diagnostics as `tracing` events: dumps at `INFO`, failures at
/// `ERROR`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&mut self, diagnostic: &Diagnostic<'_>) {
        let caller = diagnostic.caller;

        if diagnostic.code == ErrorCode::None {
            tracing::info!(
                target: "rampart::dump",
                file = caller.file(),
                line = caller.line(),
                condition = %diagnostic.condition,
                "\n{}",
                diagnostic.report
            );
        } else {
            tracing::error!(
                target: "rampart::diagnostic",
                file = caller.file(),
                line = caller.line(),
                code = ?diagnostic.code,
                condition = %diagnostic.condition,
                "\n{}",
                diagnostic.report
            );
        }
    }
}

/// Full state of a stack: every record field, every slot, and the guards.
///
/// ```text
/// stack                > [0x7ffd...]
/// size                 > 2
/// capacity             > 16
/// data                 > [0x5a3c...]
/// stack prefix canary  > 0xbadc0ffee0ddf00d
/// ...
/// elements:
/// *[0] > 1
/// *[1] > 2
/// clear elements
/// *[2] > NaN (POISONED)
/// ...
/// ```
pub struct StackDump<'a, T: Element> {
    stack: &'a GuardStack<T>,
}

impl<'a, T: Element> StackDump<'a, T> {
    pub(crate) fn new(stack: &'a GuardStack<T>) -> Self {
        Self { stack }
    }
}

impl<T: Element> fmt::Display for StackDump<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stack = self.stack;
        let protection = stack.config.protection;

        writeln!(f, "stack                > [{:p}]", stack)?;
        writeln!(f, "size                 > {}", stack.size)?;
        writeln!(f, "capacity             > {}", stack.capacity)?;
        match stack.data.as_deref() {
            Some(buf) => writeln!(f, "data                 > [{:p}]", buf.as_ptr())?,
            None => writeln!(f, "data                 > [null]")?,
        }

        if protection.canary {
            writeln!(f, "stack prefix canary  > {:#018x}", stack.stack_prefix)?;
            writeln!(f, "stack postfix canary > {:#018x}", stack.stack_postfix)?;
        }

        if protection.hash {
            writeln!(f, "hash function        > [{:#x}]", func_addr(stack.hash_func))?;
            writeln!(f, "::::::EXPECTED HASH::::::")?;
            writeln!(f, "stack hash           > {}", stack.stack_hash)?;
            writeln!(f, "data hash            > {}", stack.data_hash)?;
            writeln!(f, "::::::CURRENT HASH::::::")?;
            writeln!(f, "stack current        > {}", OrNone(stack.compute_record_digest()))?;
            writeln!(f, "data current         > {}", OrNone(stack.compute_data_digest()))?;
        }

        writeln!(f, "elements:")?;
        let Some(buf) = stack.buffer() else {
            writeln!(f, "(buffer unavailable)")?;
            return Ok(());
        };

        let layout = &stack.layout;
        let occupied = stack.size.min(stack.capacity);
        for index in 0..occupied {
            writeln!(f, "*[{index}] > {}", T::read_from(&buf[layout.slot(index)]))?;
        }

        writeln!(f, "clear elements")?;
        for index in occupied..stack.capacity {
            let value = T::read_from(&buf[layout.slot(index)]);
            if poison::is_poisoned::<T>(buf, layout, index) {
                writeln!(f, "*[{index}] > {value} (POISONED)")?;
            } else {
                writeln!(f, "*[{index}] > {value}")?;
            }
        }

        if let Some((prefix, postfix)) = canary::read(buf, layout) {
            writeln!(f, "data prefix canary   > {prefix:#018x}")?;
            writeln!(f, "data postfix canary  > {postfix:#018x}")?;
        }

        Ok(())
    }
}

/// One line per violation, each with the field values involved.
pub struct ConditionReport<'a, T: Element> {
    stack: &'a GuardStack<T>,
    condition: Condition,
}

impl<'a, T: Element> ConditionReport<'a, T> {
    /// Describes `condition` using the current fields of `stack`.
    pub fn new(stack: &'a GuardStack<T>, condition: Condition) -> Self {
        Self { stack, condition }
    }
}

impl<T: Element> fmt::Display for ConditionReport<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.condition.is_ok() {
            return Ok(());
        }

        let stack = self.stack;
        writeln!(f, ">>>>>>>>>>STACK CONDITIONS<<<<<<<<<")?;

        for (name, _) in self.condition.iter_names() {
            match name {
                "INVALID_CAPACITY" => writeln!(
                    f,
                    "INVALID STACK CAPACITY: size = {}, capacity = {}",
                    stack.size, stack.capacity
                )?,
                "EMPTY_STACK" => {
                    writeln!(f, "EMPTY STACK: size = {}", stack.size)?
                }
                "INVALID_SIZE" => writeln!(
                    f,
                    "INVALID STACK SIZE: size = {}, capacity = {}",
                    stack.size, stack.capacity
                )?,
                "INVALID_DATA" => writeln!(
                    f,
                    "INVALID STACK DATA: buffer len = {}, expected len = {}",
                    OrNone(stack.data.as_ref().map(Vec::len)),
                    OrNone(expected_len(stack)),
                )?,
                "POISON_VIOLATION" => {
                    let slot = stack
                        .buffer()
                        .and_then(|buf| {
                            let index = poison::first_violation::<T>(buf, &stack.layout, stack.size)?;
                            Some((index, T::read_from(&buf[stack.layout.slot(index)])))
                        });
                    match slot {
                        Some((index, value)) => writeln!(
                            f,
                            "POISON REGION VIOLATED: slot {index} = {value}, expected {}",
                            T::POISON
                        )?,
                        None => writeln!(f, "POISON REGION VIOLATED")?,
                    }
                }
                "DATA_CANARY" => match stack.data_canaries() {
                    Some((prefix, postfix)) => writeln!(
                        f,
                        "DATA CANARY TRIGGERED: left = {prefix:#018x}, right = {postfix:#018x}, expected = {CANARY:#018x}"
                    )?,
                    None => writeln!(f, "DATA CANARY TRIGGERED: guards unreadable")?,
                },
                "STACK_CANARY" => writeln!(
                    f,
                    "STACK CANARY TRIGGERED: left = {:#018x}, right = {:#018x}, expected = {CANARY:#018x}",
                    stack.stack_prefix, stack.stack_postfix
                )?,
                "INVALID_HASH_FUNC" => writeln!(
                    f,
                    "INVALID HASH FUNCTION: func = [{:#x}]",
                    func_addr(stack.hash_func)
                )?,
                "DATA_HASH_MISMATCH" => writeln!(
                    f,
                    "INCORRECT DATA HASH: expected = {}, current = {}",
                    stack.data_hash,
                    OrNone(stack.compute_data_digest())
                )?,
                "STACK_HASH_MISMATCH" => writeln!(
                    f,
                    "INCORRECT STACK HASH: expected = {}, current = {}",
                    stack.stack_hash,
                    OrNone(stack.compute_record_digest())
                )?,
                _ => {}
            }
        }

        writeln!(f, ">>>>>>>>STACK CONDITIONS END<<<<<<<")
    }
}

fn expected_len<T: Element>(stack: &GuardStack<T>) -> Option<usize> {
    crate::layout::Layout::new(stack.capacity, T::SIZE, stack.config.protection.canary)
        .map(|layout| layout.total_len())
}

struct OrNone<V>(Option<V>);

impl<V: fmt::Display> fmt::Display for OrNone<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(value) => value.fmt(f),
            None => f.write_str("none"),
        }
    }
}
