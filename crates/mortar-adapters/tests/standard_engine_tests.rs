//! End-to-end tests of the regex scanner with the standard blocks and filters.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use mortar_adapters::{
    RegexScanner, standard_blocks, standard_builder, standard_engine, standard_filters,
    blocks::NowMarker,
};
use mortar_core::prelude::*;

fn render(template: &str, vars: Frame) -> Rendered {
    standard_engine().unwrap().process(template, vars).unwrap()
}

fn kinds(rendered: &Rendered) -> Vec<RenderErrorKind> {
    rendered.errors.iter().map(|e| e.kind).collect()
}

// ============================================================================
// for
// ============================================================================

#[test]
fn for_exposes_loop_variables() {
    let rendered = render(
        "{% for x in items %}{{ loop.index }}:{{ x }}{% if not loop.last %}, {% endif %}{% endfor %}",
        frame([("items", vec!["a", "b", "c"])]),
    );

    assert_eq!(rendered.output, "1:a, 2:b, 3:c");
    assert!(rendered.is_clean());
}

#[test]
fn for_ranges_count_both_ways() {
    assert_eq!(render("{% for i from 1 to 3 %}{{ i }}{% endfor %}", Frame::new()).output, "123");
    assert_eq!(render("{% for i from 3 to 1 %}{{ i }}{% endfor %}", Frame::new()).output, "321");
    assert_eq!(
        render("{% for i from 1 to 3 reversed %}{{ i }}{% endfor %}", Frame::new()).output,
        "321"
    );
}

#[test]
fn for_over_a_map_yields_key_value_pairs() {
    let map = Value::map_from([("a", Value::from(1)), ("b", Value::from(2))]);
    let rendered = render(
        "{% for e in m %}{{ e.key }}={{ e.value }};{% endfor %}",
        frame([("m", map)]),
    );

    assert_eq!(rendered.output, "a=1;b=2;");
}

#[test]
fn for_over_nothing_skips_the_body() {
    let rendered = render(
        "[{% for x in empty %}{{ x }}{% endfor %}]",
        frame([("empty", Value::List(vec![]))]),
    );
    assert_eq!(rendered.output, "[]");
    assert!(rendered.is_clean());
}

#[test]
fn for_over_a_scalar_is_an_argument_error() {
    let rendered = render("{% for x in n %}body{% endfor %}after", frame([("n", 3)]));

    assert_eq!(rendered.output, "after");
    assert_eq!(kinds(&rendered), [RenderErrorKind::MalformedMarkerArguments]);
}

#[test]
fn cycle_alternates_per_pass() {
    let rendered = render(
        "{% for x in items %}{% cycle odd even %} {% endfor %}",
        frame([("items", vec![1, 2, 3])]),
    );
    assert_eq!(rendered.output, "odd even odd ");
}

// ============================================================================
// if / comment / set / now
// ============================================================================

#[test]
fn if_takes_the_first_matching_branch() {
    let template = "{% if n > 5 %}big{% elif n > 2 %}mid{% else %}small{% endif %}";

    assert_eq!(render(template, frame([("n", 7)])).output, "big");
    assert_eq!(render(template, frame([("n", 3)])).output, "mid");
    assert_eq!(render(template, frame([("n", 1)])).output, "small");
}

#[test]
fn nested_if_inside_a_false_branch_stays_silent() {
    let rendered = render(
        "{% if no %}{% if yes %}inner{% endif %}{{ missing }}{% else %}else{% endif %}",
        frame([("no", false), ("yes", true)]),
    );

    assert_eq!(rendered.output, "else");
    assert!(rendered.is_clean());
}

#[test]
fn comment_hides_its_body() {
    let rendered = render("a{% comment %}hidden {{ missing }}{% endcomment %}b", Frame::new());

    assert_eq!(rendered.output, "ab");
    assert!(rendered.is_clean());
}

#[test]
fn set_binds_for_later_markers() {
    let rendered = render("{% set greeting \"hi\" %}{{ greeting | upper }}", Frame::new());
    assert_eq!(rendered.output, "HI");
}

#[test]
fn now_uses_the_configured_clock() {
    fn fixed() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(14, 5, 0)
            .unwrap()
    }

    let blocks = standard_blocks()
        .into_iter()
        .filter(|b| !b.names().contains(&"now"));
    let mut engine = Engine::builder()
        .scanner(Box::new(RegexScanner::new()))
        .blocks(blocks)
        .block(Arc::new(NowMarker::with_clock(fixed)))
        .filters(standard_filters())
        .build()
        .unwrap();

    let rendered = engine
        .process("{% now %} | {% now \"%d/%m/%Y\" %}", Frame::new())
        .unwrap();
    assert_eq!(rendered.output, "2024-03-09 14:05:00 | 09/03/2024");
}

// ============================================================================
// Filters
// ============================================================================

#[test]
fn filters_chain_left_to_right() {
    let vars = frame([
        ("title", Value::from("hello world")),
        ("tags", Value::from(vec!["a", "b"])),
        ("when", Value::from("2024-03-09")),
    ]);

    let rendered = render(
        "{{ title | truncate: 5 | upper }} {{ tags | join: \" / \" }} {{ when | date_format: \"%Y\" }}",
        vars,
    );
    assert_eq!(rendered.output, "HELLO... a / b 2024");
}

#[test]
fn default_filter_still_reports_the_missing_variable() {
    let rendered = render("{{ missing | default: \"n/a\" }}", Frame::new());

    assert_eq!(rendered.output, "n/a");
    assert_eq!(kinds(&rendered), [RenderErrorKind::UnresolvedVariable]);
}

#[test]
fn unknown_filter_is_reported() {
    let rendered = render("{{ name | nosuch }}", frame([("name", "ada")]));
    assert_eq!(kinds(&rendered), [RenderErrorKind::UnknownFilterName]);
}

#[test]
fn color_format_renders_hex_and_rgb() {
    let rendered = render(
        "{{ brand | color_format }} {{ brand | color_format: rgb }}",
        frame([("brand", vec![255, 0, 128])]),
    );
    assert_eq!(rendered.output, "FF0080 rgb(255, 0, 128)");
    assert!(rendered.is_clean());
}

#[test]
fn section_renders_its_body_once() {
    let rendered = render(
        "{% section intro %}[{{ section }}:{{ x }}]{% endsection %}!",
        frame([("x", 1)]),
    );
    assert_eq!(rendered.output, "[intro:1]!");
    assert!(rendered.is_clean());
}

// ============================================================================
// Literals, delimiters, policy
// ============================================================================

#[test]
fn literal_region_is_copied_verbatim() {
    let rendered = render("{% literal %}{{ raw }}{% for %}{% /literal %}!", Frame::new());

    assert_eq!(rendered.output, "{{ raw }}{% for %}!");
    assert!(rendered.is_clean());
}

#[test]
fn literal_region_keeps_lone_openers_and_closers() {
    let rendered = render(
        "A{% literal %}{{ {% /literal %}B{{ name }}C",
        frame([("name", "N")]),
    );
    assert_eq!(rendered.output, "A{{ BNC");
    assert!(rendered.is_clean());

    let rendered = render(
        "{% literal %}}} %} {%{% /literal %}{% literal %}{{{% endfor{%/literal%}.",
        Frame::new(),
    );
    assert_eq!(rendered.output, "}} %} {%{{{% endfor.");
    assert!(rendered.is_clean());
}

#[test]
fn json_variables_render_as_written() {
    let vars: Frame = serde_json::from_str(
        r#"{"big": 1e20, "ratio": 0.5, "count": 3, "tags": ["a", "b"], "none": null}"#,
    )
    .unwrap();

    let rendered = render("{{ big }}|{{ ratio }}|{{ count }}|{{ tags }}|{{ none }}", vars);
    assert_eq!(rendered.output, "100000000000000000000|0.5|3|a, b|");
    assert!(rendered.is_clean());
}

#[test]
fn custom_delimiters_are_honoured() {
    let delimiters = Delimiters {
        marker_start: "<%".into(),
        marker_end: "%>".into(),
        expression_start: "<<".into(),
        expression_end: ">>".into(),
        ..Delimiters::default()
    };
    let mut engine = standard_builder().delimiters(delimiters).build().unwrap();

    let rendered = engine
        .process(
            "<< name >> <% if yes %>ok<% endif %> {{ untouched }}",
            frame([("name", Value::from("ada")), ("yes", Value::from(true))]),
        )
        .unwrap();
    assert_eq!(rendered.output, "ada ok {{ untouched }}");
}

#[test]
fn unknown_blocks_pass_through_by_default() {
    let rendered = render("a{% bogus %}b", Frame::new());

    assert_eq!(rendered.output, "a{% bogus %}b");
    assert_eq!(kinds(&rendered), [RenderErrorKind::UnknownBlockName]);
    assert!(!rendered.halted);
}

#[test]
fn strict_policy_halts_on_unknown_blocks() {
    let mut engine = standard_builder()
        .policy(ErrorPolicy::strict())
        .build()
        .unwrap();
    let rendered = engine.process("a{% bogus %}b", Frame::new()).unwrap();

    assert_eq!(rendered.output, "a");
    assert!(rendered.halted);
}

#[test]
fn stray_end_marker_halts() {
    let rendered = render("a{% endfor %}b", Frame::new());

    assert_eq!(rendered.output, "a");
    assert!(rendered.halted);
    assert_eq!(kinds(&rendered), [RenderErrorKind::UnmatchedBlockEnd]);
}

#[test]
fn persistent_values_survive_between_calls() {
    let mut engine = standard_engine().unwrap();
    engine.set("site", "mortar");

    let first = engine.process("{{ site }}", Frame::new()).unwrap();
    let second = engine
        .process("{{ site }}/{{ page }}", frame([("page", "docs")]))
        .unwrap();

    assert_eq!(first.output, "mortar");
    assert_eq!(second.output, "mortar/docs");
}
