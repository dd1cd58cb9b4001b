// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use std::io;
use std::sync::{Arc, Mutex};

use super::{capturing, small_config};
use crate::{Condition, ConditionReport, Diagnostic, GuardStack, Protection, StackConfig};

/// Shared buffer a `tracing_subscriber::fmt` layer writes into.
#[derive(Clone, Default)]
struct CapturedOutput(Arc<Mutex<Vec<u8>>>);

impl CapturedOutput {
    fn text(&self) -> String {
        let bytes = self.0.lock().expect("Failed to lock()");
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl io::Write for CapturedOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("Failed to lock()").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Runs `f` under a subscriber that records every event as plain text.
fn traced<F: FnOnce()>(f: F) -> String {
    let output = CapturedOutput::default();
    let writer = output.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_max_level(tracing::Level::TRACE)
        .without_time()
        .finish();

    tracing::subscriber::with_default(subscriber, f);

    output.text()
}

// =============================================================================
// StackDump
// =============================================================================

#[test]
fn test_dump_lists_fields_and_poisoned_slots() {
    let (stack, _sink) = capturing::<f64>(16, small_config(2));
    let dump = stack.report().to_string();

    assert!(dump.starts_with("stack                > [0x"));
    assert!(dump.contains("size                 > 0\n"));
    assert!(dump.contains("capacity             > 16\n"));
    assert!(dump.contains("stack prefix canary  > 0xbadc0ffee0ddf00d\n"));
    assert!(dump.contains("stack postfix canary > 0xbadc0ffee0ddf00d\n"));
    assert!(dump.contains("::::::EXPECTED HASH::::::\n"));
    assert!(dump.contains("::::::CURRENT HASH::::::\n"));
    assert!(dump.contains("data prefix canary   > 0xbadc0ffee0ddf00d\n"));
    assert!(dump.contains("data postfix canary  > 0xbadc0ffee0ddf00d\n"));
    assert_eq!(dump.matches("(POISONED)").count(), 16);
}

#[test]
fn test_dump_separates_occupied_from_clear_slots() {
    let (mut stack, _sink) = capturing::<f64>(4, small_config(2));
    stack.push(1.5).expect("Failed to push()");
    stack.push(-2.0).expect("Failed to push()");

    let dump = stack.report().to_string();
    let elements = dump.find("elements:").expect("Failed to find elements");
    let clear = dump.find("clear elements").expect("Failed to find clear");

    assert!(elements < clear);
    assert!(dump.contains("*[0] > 1.5\n"));
    assert!(dump.contains("*[1] > -2\n"));
    assert!(dump.contains("*[2] > NaN (POISONED)\n"));
    assert!(dump.contains("*[3] > NaN (POISONED)\n"));
}

#[test]
fn test_dump_marks_overwritten_spare_slot() {
    let (mut stack, _sink) = capturing::<i32>(4, small_config(2));
    stack.tamper().slot(2, 42);

    let dump = stack.report().to_string();

    assert!(dump.contains("*[2] > 42\n"));
    assert_eq!(dump.matches("(POISONED)").count(), 3);
}

#[test]
fn test_dump_current_hash_matches_expected_when_clean() {
    let (stack, _sink) = capturing::<f64>(4, small_config(2));
    let dump = stack.report().to_string();

    let stack_line = format!("stack hash           > {}\n", stack.stack_hash());
    let current_line = format!("stack current        > {}\n", stack.stack_hash());
    assert!(dump.contains(&stack_line));
    assert!(dump.contains(&current_line));
}

#[test]
fn test_dump_without_protection_omits_guard_lines() {
    let (stack, _sink) = capturing::<f64>(4, small_config(2).with_protection(Protection::NONE));
    let dump = stack.report().to_string();

    assert!(!dump.contains("canary"));
    assert!(!dump.contains("HASH"));
    assert!(dump.contains("clear elements\n"));
}

#[test]
fn test_dump_of_released_buffer() {
    let (mut stack, _sink) = capturing::<f64>(4, small_config(2));
    stack.tamper().release_buffer();

    let dump = stack.report().to_string();

    assert!(dump.contains("data                 > [null]\n"));
    assert!(dump.contains("(buffer unavailable)\n"));
}

// =============================================================================
// ConditionReport
// =============================================================================

#[test]
fn test_condition_report_is_empty_when_ok() {
    let (stack, _sink) = capturing::<f64>(4, small_config(2));

    assert_eq!(ConditionReport::new(&stack, Condition::OK).to_string(), "");
}

#[test]
fn test_condition_report_stack_canary_values() {
    let (mut stack, _sink) = capturing::<f64>(4, small_config(2));
    stack.tamper().stack_prefix(0);

    let report = ConditionReport::new(&stack, stack.check()).to_string();

    assert!(report.starts_with(">>>>>>>>>>STACK CONDITIONS<<<<<<<<<\n"));
    assert!(report.contains(
        "STACK CANARY TRIGGERED: left = 0x0000000000000000, right = 0xbadc0ffee0ddf00d, expected = 0xbadc0ffee0ddf00d\n"
    ));
    assert!(report.contains("INCORRECT STACK HASH: expected = "));
    assert!(report.ends_with(">>>>>>>>STACK CONDITIONS END<<<<<<<\n"));
}

#[test]
fn test_condition_report_names_violated_slot() {
    let (mut stack, _sink) = capturing::<i64>(4, small_config(2));
    stack.push(1).expect("Failed to push()");
    stack.tamper().slot(3, 5);

    let report = ConditionReport::new(&stack, stack.check()).to_string();

    assert!(report.contains(&format!(
        "POISON REGION VIOLATED: slot 3 = 5, expected {}\n",
        <i64 as crate::Element>::POISON
    )));
    assert!(report.contains("INCORRECT DATA HASH: expected = "));
}

#[test]
fn test_condition_report_size_and_data() {
    let (mut stack, _sink) = capturing::<f64>(4, small_config(2));
    stack.tamper().size(9).capacity(8);

    let report = ConditionReport::new(&stack, stack.check()).to_string();

    assert!(report.contains("INVALID STACK SIZE: size = 9, capacity = 8\n"));
    assert!(report.contains("INVALID STACK DATA: buffer len = 48, expected len = 80\n"));
}

#[test]
fn test_condition_report_missing_hash_func() {
    let (mut stack, _sink) = capturing::<f64>(4, small_config(2));
    stack.tamper().hash_func(None);

    let report = ConditionReport::new(&stack, stack.check()).to_string();

    assert!(report.contains("INVALID HASH FUNCTION: func = [0x0]\n"));
}

#[test]
fn test_condition_report_lines_follow_bit_order() {
    let (mut stack, _sink) = capturing::<f64>(4, small_config(2));
    stack.tamper().data_prefix(1).stack_postfix(1);

    let report = ConditionReport::new(&stack, stack.check()).to_string();
    let data = report.find("DATA CANARY").expect("Failed to find data canary");
    let record = report.find("STACK CANARY").expect("Failed to find stack canary");
    let hash = report.find("INCORRECT DATA HASH").expect("Failed to find hash");

    assert!(data < record);
    assert!(record < hash);
}

// =============================================================================
// Provenance
// =============================================================================

#[test]
fn test_diagnostic_carries_caller_location() {
    let (mut stack, sink) = capturing::<f64>(4, small_config(2));
    stack.tamper().hash_func(None);

    let (_, line) = (stack.push(1.0), line!());

    let diagnostic = sink.last().expect("Failed to last()");
    assert!(diagnostic.caller.file().ends_with("report.rs"));
    assert_eq!(diagnostic.caller.line(), line);
}

#[test]
fn test_build_failure_carries_caller_location() {
    let sink = crate::MemorySink::new();

    let (result, line) = (
        GuardStack::<u64>::build(usize::MAX, StackConfig::default(), sink.clone()), line!(),
    );

    assert!(result.is_err());
    let diagnostic = sink.last().expect("Failed to last()");
    assert_eq!(diagnostic.caller.line(), line);
}

#[test]
fn test_closure_sink_receives_diagnostics() {
    use std::cell::RefCell;
    use std::rc::Rc;

    let codes = Rc::new(RefCell::new(Vec::new()));
    let recorded = Rc::clone(&codes);
    let sink = move |diagnostic: &Diagnostic<'_>| recorded.borrow_mut().push(diagnostic.code);

    let mut stack =
        GuardStack::<f64>::build(4, small_config(2), sink).expect("Failed to build()");
    let _ = stack.pop();
    stack.dump();

    assert_eq!(
        *codes.borrow(),
        vec![crate::ErrorCode::EmptyStack, crate::ErrorCode::None]
    );
}

// =============================================================================
// TracingSink
// =============================================================================

#[test]
fn test_tracing_sink_emits_one_error_event_per_failure() {
    let mut line = 0;
    let output = traced(|| {
        let mut stack =
            GuardStack::<f64>::with_config(4, small_config(2)).expect("Failed to with_config()");
        stack.push(1.0).expect("Failed to push()");
        stack.tamper().slot(3, 5.0);

        let (result, call_line) = (stack.pop(), line!());
        assert!(result.is_err());
        line = call_line;
    });

    assert_eq!(output.matches("ERROR rampart::diagnostic:").count(), 1);
    assert!(output.contains("tests/report.rs"));
    assert!(output.contains(&format!("line={line}")));
    assert!(output.contains("code=InvalidStack"));
    assert!(output.contains("condition=DATA_HASH_MISMATCH | POISON_VIOLATION"));
    assert!(output.contains("POISON REGION VIOLATED: slot 3 = 5, expected NaN"));
}

#[test]
fn test_tracing_sink_emits_dump_at_info() {
    let mut line = 0;
    let output = traced(|| {
        let mut stack =
            GuardStack::<i32>::with_config(2, small_config(2)).expect("Failed to with_config()");
        let ((), call_line) = (stack.dump(), line!());
        line = call_line;
    });

    assert_eq!(output.matches("INFO rampart::dump:").count(), 1);
    assert!(output.contains(&format!("line={line}")));
    assert!(output.contains("condition=OK"));
    assert!(!output.contains("rampart::diagnostic"));
}
