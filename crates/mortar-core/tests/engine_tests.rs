//! End-to-end behaviour of the engine driver.

mod common;

use std::sync::Arc;

use common::{engine, kinds};
use mortar_core::prelude::*;

fn items(values: &[i64]) -> Value {
    Value::from(values.iter().copied().map(Value::from).collect::<Vec<_>>())
}

// ── Plain text and expressions ───────────────────────────────────────────────

#[test]
fn text_without_markers_is_unchanged() {
    let mut engine = engine();
    for template in ["", "plain", "braces { } and % alone", "ünïcödé ✓", "{ {x} }"] {
        let rendered = engine.process(template, Frame::new()).unwrap();
        assert_eq!(rendered.output, template);
        assert!(rendered.is_clean());
    }
}

#[test]
fn hello_world() {
    let rendered = engine()
        .process("Hello {{name}}!", frame([("name", "World")]))
        .unwrap();
    assert_eq!(rendered.output, "Hello World!");
}

#[test]
fn expressions_are_local() {
    let rendered = engine()
        .process("<{{a}}|{{ b }}>", frame([("a", Value::from(1)), ("b", Value::from(2.5))]))
        .unwrap();
    assert_eq!(rendered.output, "<1|2.5>");
}

#[test]
fn dotted_paths_and_pseudo_keys() {
    let user = Value::map_from([("name", "Ada"), ("lang", "en")]);
    let rendered = engine()
        .process(
            "{{user.name}} {{list.1}} {{list.length}}",
            frame([("user", user), ("list", items(&[7, 8, 9]))]),
        )
        .unwrap();
    assert_eq!(rendered.output, "Ada 8 3");
}

#[test]
fn unresolved_variable_is_empty_and_reported() {
    let log = Arc::new(EventLog::new());
    let mut engine = engine();
    engine.add_listener(log.clone());

    let rendered = engine.process("[{{missing}}] after", Frame::new()).unwrap();

    assert_eq!(rendered.output, "[] after");
    assert_eq!(kinds(&rendered), vec![RenderErrorKind::UnresolvedVariable]);
    assert!(rendered.errors[0].continuing);
    assert!(!rendered.halted);
    assert!(matches!(
        log.events().as_slice(),
        [EngineEvent::Error(e), EngineEvent::Finished] if e.kind == RenderErrorKind::UnresolvedVariable
    ));
}

#[test]
fn strict_variables_halt() {
    let mut engine = engine();
    engine.policy_mut().strict_variables = true;

    let rendered = engine.process("a{{missing}}b", Frame::new()).unwrap();

    assert_eq!(rendered.output, "a");
    assert!(rendered.halted);
    assert_eq!(
        rendered.halting_error().map(|e| e.kind),
        Some(RenderErrorKind::UnresolvedVariable)
    );
}

#[test]
fn persistent_values_are_shadowed_by_call_values() {
    let mut engine = engine();
    engine.set("site", "default.org");

    let first = engine.process("{{site}}", Frame::new()).unwrap();
    let second = engine
        .process("{{site}}", frame([("site", "override.org")]))
        .unwrap();
    let third = engine.process("{{site}}", Frame::new()).unwrap();

    assert_eq!(first.output, "default.org");
    assert_eq!(second.output, "override.org");
    assert_eq!(third.output, "default.org");
}

#[test]
fn malformed_marker_is_kept_verbatim() {
    let rendered = engine().process("a{{ }}b", Frame::new()).unwrap();

    assert_eq!(rendered.output, "a{{ }}b");
    assert_eq!(kinds(&rendered), vec![RenderErrorKind::MalformedMarkerArguments]);
}

// ── Filters ──────────────────────────────────────────────────────────────────

#[test]
fn filters_apply_left_to_right() {
    let rendered = engine()
        .process("{{name|suffix: \"-x\"|upper}}", frame([("name", "a")]))
        .unwrap();
    assert_eq!(rendered.output, "A-X");
    assert!(rendered.is_clean());
}

#[test]
fn unknown_filter_leaves_value_unchanged() {
    let rendered = engine()
        .process("{{name|sparkle|upper}}", frame([("name", "a")]))
        .unwrap();

    assert_eq!(rendered.output, "A");
    assert_eq!(kinds(&rendered), vec![RenderErrorKind::UnknownFilterName]);
    assert!(!rendered.halted);
}

#[test]
fn rejected_filter_arguments_are_reported() {
    let rendered = engine()
        .process("{{name|suffix}}", frame([("name", "a")]))
        .unwrap();

    assert_eq!(rendered.output, "a");
    assert_eq!(kinds(&rendered), vec![RenderErrorKind::MalformedMarkerArguments]);
}

#[test]
fn custom_filter_function() {
    let mut engine = engine();
    engine.register_filter_fn("twice", |v: Value, _: &[String]| Ok(Value::from(format!("{v}{v}"))));

    let rendered = engine.process("{{x|twice}}", frame([("x", "ab")])).unwrap();
    assert_eq!(rendered.output, "abab");
}

// ── Blocks ───────────────────────────────────────────────────────────────────

#[test]
fn loop_repeats_body() {
    let rendered = engine()
        .process(
            "{%for x in items%}{{x}}-{%endfor%}",
            frame([("items", items(&[1, 2, 3]))]),
        )
        .unwrap();
    assert_eq!(rendered.output, "1-2-3-");
    assert!(rendered.is_clean());
}

#[test]
fn empty_loop_skips_body() {
    let rendered = engine()
        .process(
            "[{%for x in items%}{{x}}{{nothing}}{%endfor%}]",
            frame([("items", items(&[]))]),
        )
        .unwrap();
    assert_eq!(rendered.output, "[]");
    assert!(rendered.is_clean());
}

#[test]
fn nested_loops_keep_outer_variable() {
    let rendered = engine()
        .process(
            "{%for x in outer%}{%for y in inner%}{{x}}{{y}} {%endfor%}{%endfor%}",
            frame([
                ("outer", Value::from(vec!["a", "b"])),
                ("inner", items(&[1, 2])),
            ]),
        )
        .unwrap();
    assert_eq!(rendered.output, "a1 a2 b1 b2 ");
}

#[test]
fn loop_variable_is_gone_after_the_loop() {
    let rendered = engine()
        .process(
            "{%for x in items%}{%endfor%}{{x}}",
            frame([("items", items(&[1]))]),
        )
        .unwrap();
    assert_eq!(rendered.output, "");
    assert_eq!(kinds(&rendered), vec![RenderErrorKind::UnresolvedVariable]);
}

#[test]
fn else_chain_takes_one_branch() {
    let template = "{%if flag%}yes{%else%}no{%endif%}";
    let mut engine = engine();

    let yes = engine.process(template, frame([("flag", true)])).unwrap();
    let no = engine.process(template, frame([("flag", false)])).unwrap();

    assert_eq!(yes.output, "yes");
    assert_eq!(no.output, "no");
    assert!(yes.is_clean() && no.is_clean());
}

#[test]
fn else_chain_events_close_then_reopen() {
    let log = Arc::new(EventLog::new());
    let mut engine = engine();
    engine.add_listener(log.clone());

    engine
        .process("{%if flag%}yes{%else%}no{%endif%}", frame([("flag", false)]))
        .unwrap();

    let names: Vec<String> = log
        .events()
        .into_iter()
        .map(|event| match event {
            EngineEvent::BlockStarted(info) => format!("+{}", info.name),
            EngineEvent::BlockEnded(info) => format!("-{}", info.name),
            EngineEvent::Error(e) => format!("!{}", e.kind),
            EngineEvent::Finished => "done".into(),
        })
        .collect();
    assert_eq!(names, ["+if", "-if", "+else", "-else", "done"]);
}

#[test]
fn block_started_carries_scope_snapshot() {
    let log = Arc::new(EventLog::new());
    let mut engine = engine();
    engine.add_listener(log.clone());
    engine.set("site", "example.org");

    engine
        .process("{%for x in items%}{%endfor%}", frame([("items", items(&[4]))]))
        .unwrap();

    let Some(EngineEvent::BlockStarted(info)) = log.events().into_iter().next() else {
        panic!("expected a block-started event first");
    };
    assert_eq!(info.name, "for");
    assert_eq!(info.args, ["x", "in", "items"]);
    assert_eq!(info.closing_names, ["endfor"]);
    assert_eq!(info.variables.get("x"), Some(&Value::from(4)));
    assert_eq!(info.variables.get("site"), Some(&Value::from("example.org")));
}

#[test]
fn suppressed_region_reports_nothing() {
    let rendered = engine()
        .process(
            "{%if f%}{{missing|sparkle}}{%for x in nothing%}{%frob%}{%endfor%}{%endif%}done",
            frame([("f", false)]),
        )
        .unwrap();
    assert_eq!(rendered.output, "done");
    assert!(rendered.is_clean());
}

#[test]
fn nested_chain_inside_suppressed_region_stays_balanced() {
    let rendered = engine()
        .process(
            "{%if f%}{%if t%}x{%else%}y{%endif%}{%endif%}z",
            frame([("f", false), ("t", true)]),
        )
        .unwrap();
    assert_eq!(rendered.output, "z");
    assert!(rendered.is_clean());
}

#[test]
fn inline_set_binds_in_innermost_frame() {
    let mut engine = engine();
    let rendered = engine
        .process(
            "{%set greeting \"hi\"%}{{greeting}} {%for x in items%}{%set y x%}{{y}}{%endfor%}{{y}}",
            frame([("items", items(&[1, 2]))]),
        )
        .unwrap();

    assert_eq!(rendered.output, "hi 12");
    assert_eq!(kinds(&rendered), vec![RenderErrorKind::UnresolvedVariable]);
    assert_eq!(engine.get("greeting"), None);
}

#[test]
fn bad_block_arguments_skip_the_body() {
    let rendered = engine()
        .process("{%for%}hidden{%endfor%}after", Frame::new())
        .unwrap();
    assert_eq!(rendered.output, "after");
    assert_eq!(kinds(&rendered), vec![RenderErrorKind::MalformedMarkerArguments]);
}

// ── Structural errors ────────────────────────────────────────────────────────

#[test]
fn mismatched_end_halts_with_partial_output() {
    let rendered = engine()
        .process(
            "A{%for x in items%}B{%endif%}C{%endfor%}",
            frame([("items", items(&[1]))]),
        )
        .unwrap();

    assert_eq!(rendered.output, "AB");
    assert!(rendered.halted);
    assert_eq!(kinds(&rendered), vec![RenderErrorKind::UnmatchedBlockEnd]);
    assert!(!rendered.errors[0].continuing);
}

#[test]
fn lenient_mode_skips_mismatched_end() {
    let mut engine = engine();
    engine.set_policy(ErrorPolicy::lenient());

    let rendered = engine
        .process(
            "A{%for x in items%}B{%endif%}C{%endfor%}",
            frame([("items", items(&[1]))]),
        )
        .unwrap();

    assert_eq!(rendered.output, "ABC");
    assert!(!rendered.halted);
    assert!(rendered.errors[0].continuing);
}

#[test]
fn stray_else_is_an_unmatched_end() {
    let rendered = engine().process("a{%else%}b", Frame::new()).unwrap();

    assert_eq!(rendered.output, "a");
    assert_eq!(kinds(&rendered), vec![RenderErrorKind::UnmatchedBlockEnd]);
}

#[test]
fn unknown_block_is_kept_as_text() {
    let rendered = engine().process("x{%frob 1%}y", Frame::new()).unwrap();

    assert_eq!(rendered.output, "x{%frob 1%}y");
    assert_eq!(kinds(&rendered), vec![RenderErrorKind::UnknownBlockName]);
    assert!(!rendered.halted);
}

#[test]
fn strict_unknown_blocks_halt() {
    let mut engine = engine();
    engine.policy_mut().strict_unknown_blocks = true;

    let rendered = engine.process("x{%frob%}y", Frame::new()).unwrap();

    assert_eq!(rendered.output, "x");
    assert!(rendered.halted);
}

#[test]
fn unclosed_blocks_are_reported_innermost_first() {
    let rendered = engine()
        .process(
            "{%if t%}{%for x in items%}body",
            frame([("t", Value::from(true)), ("items", items(&[1]))]),
        )
        .unwrap();

    assert_eq!(rendered.output, "body");
    assert_eq!(
        kinds(&rendered),
        vec![RenderErrorKind::UnclosedBlock, RenderErrorKind::UnclosedBlock]
    );
    assert!(rendered.errors[0].message.contains("'for'"));
    assert!(rendered.errors[1].message.contains("'if'"));
    assert!(rendered.errors.iter().all(|e| !e.continuing));
}

// ── Literal regions ──────────────────────────────────────────────────────────

#[test]
fn literal_region_is_copied_byte_for_byte() {
    let rendered = engine()
        .process(
            "a{%literal%}{{x}} {%if%} %} }}{%/literal%}b",
            frame([("x", 1)]),
        )
        .unwrap();

    assert_eq!(rendered.output, "a{{x}} {%if%} %} }}b");
    assert!(rendered.is_clean());
}

#[test]
fn literal_region_with_unbalanced_delimiters_ends_at_its_tag() {
    let rendered = engine()
        .process("A{%literal%}{{ }} %}{% {%/literal%}B{{name}}C", frame([("name", "N")]))
        .unwrap();

    assert_eq!(rendered.output, "A{{ }} %}{% BNC");
    assert!(rendered.is_clean());
}

#[test]
fn unterminated_literal_halts_and_keeps_remainder() {
    let rendered = engine()
        .process("a{%literal%}{{x}}", frame([("x", 1)]))
        .unwrap();

    assert_eq!(rendered.output, "a{{x}}");
    assert!(rendered.halted);
    assert_eq!(kinds(&rendered), vec![RenderErrorKind::UnterminatedLiteralEscape]);
}

#[test]
fn unterminated_literal_in_lenient_mode_skips_marker() {
    let mut engine = engine();
    engine.set_policy(ErrorPolicy::lenient());

    let rendered = engine
        .process("a{%literal%}{{x}}", frame([("x", 1)]))
        .unwrap();

    assert_eq!(rendered.output, "a1");
    assert!(!rendered.halted);
}

#[test]
fn stray_literal_end_is_unmatched() {
    let rendered = engine().process("a{%/literal%}", Frame::new()).unwrap();
    assert_eq!(kinds(&rendered), vec![RenderErrorKind::UnmatchedBlockEnd]);
}

// ── Configuration ────────────────────────────────────────────────────────────

#[test]
fn delimiter_changes_apply_on_next_call() {
    let mut engine = engine();
    let vars = || frame([("name", "World")]);

    assert_eq!(engine.process("{{name}} [[name]]", vars()).unwrap().output, "World [[name]]");

    engine.delimiters_mut().expression_start = "[[".into();
    engine.delimiters_mut().expression_end = "]]".into();

    assert_eq!(engine.process("{{name}} [[name]]", vars()).unwrap().output, "{{name}} World");
}

#[test]
fn invalid_delimiters_are_rejected() {
    let mut engine = engine();
    engine.delimiters_mut().expression_start = "{%".into();

    assert!(engine.process("x", Frame::new()).is_err());
}
