//! Property-based tests for the markup scanners
//!
//! Inputs are generated in canonical form: braces escaped once, cloze groups with an
//! explicit grade, long format names and explicit choice prefixes. For such input,
//! rendering the parsed text must give back the original string.

use proptest::prelude::*;
use qbank_core::model::numeric::parse_numeric;
use qbank_core::text::cloze::{parse_choices, parse_group, CHOICE_ESCAPES};
use qbank_core::text::cursor::{escape, Cursor};
use qbank_core::text::markup::parse;
use qbank_core::{ClozeFormat, Delimiters, Segment, TextFormat};

/// Literal text in canonical escaped form
fn literal_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            4 => "[a-zA-Z0-9 .,?!]{1,8}",
            1 => Just(r"\{".to_string()),
            1 => Just(r"\}".to_string()),
        ],
        0..5,
    )
    .prop_map(|parts| parts.concat())
}

fn format_name_strategy() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        ClozeFormat::ShortAnswer.name(),
        ClozeFormat::ShortAnswerCase.name(),
        ClozeFormat::MultiChoice.name(),
        ClozeFormat::MultiChoiceVertical.name(),
        ClozeFormat::MultiResponse.name(),
        ClozeFormat::MultiChoiceHorizontalShuffled.name(),
    ])
}

fn prefix_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("=".to_string()),
        Just("~".to_string()),
        (-99i32..100)
            .prop_filter("0 and 100 have short prefixes", |n| *n != 0)
            .prop_map(|n| format!("~%{n}%")),
    ]
}

/// One choice: prefix, text, optional feedback
fn choice_strategy() -> impl Strategy<Value = String> {
    (
        prefix_strategy(),
        "[a-z][a-z0-9 ]{0,5}",
        prop::option::of("[a-z][a-z ]{0,5}"),
    )
        .prop_map(|(prefix, text, feedback)| match feedback {
            Some(feedback) => format!("{prefix}{text}#{feedback}"),
            None => format!("{prefix}{text}"),
        })
}

fn group_strategy() -> impl Strategy<Value = String> {
    (
        1u32..5,
        format_name_strategy(),
        prop::collection::vec(choice_strategy(), 1..4),
    )
        .prop_map(|(grade, name, choices)| format!("{{{grade}:{name}:{}}}", choices.concat()))
}

/// Cloze body: literal text interleaved with groups
fn cloze_body_strategy() -> impl Strategy<Value = String> {
    (
        literal_strategy(),
        prop::collection::vec((group_strategy(), literal_strategy()), 0..4),
    )
        .prop_map(|(head, rest)| {
            let mut body = head;
            for (group, text) in rest {
                body.push_str(&group);
                body.push_str(&text);
            }
            body
        })
}

/// Rebuild the cloze source from a parse result
fn render_cloze(raw: &str) -> String {
    let delims = Delimiters::cloze();
    let parsed = parse(raw, TextFormat::Auto, &delims).unwrap();
    parsed
        .text
        .to_source_with(TextFormat::Auto, &delims, |segment| match segment {
            Segment::Cloze(idx) => parsed.groups.get(*idx).map(|group| group.to_cloze()),
            _ => None,
        })
}

proptest! {
    #[test]
    fn cloze_bodies_round_trip(raw in cloze_body_strategy()) {
        prop_assert_eq!(render_cloze(&raw), raw);
    }

    #[test]
    fn marker_count_matches_groups(raw in cloze_body_strategy()) {
        let parsed = parse(&raw, TextFormat::Auto, &Delimiters::cloze()).unwrap();
        prop_assert_eq!(parsed.text.cloze_markers(), parsed.groups.len());
        prop_assert_eq!(raw.matches(":SHORTANSWER").count() + raw.matches(":MULTI").count(), parsed.groups.len());
    }

    #[test]
    fn html_round_trips_through_cdata(words in prop::collection::vec("[a-z]{1,6}", 1..5)) {
        let raw = format!("<![CDATA[<p>{}</p>]]>", words.join(" "));
        let parsed = parse(&raw, TextFormat::Html, &Delimiters::rich()).unwrap();
        prop_assert_eq!(parsed.text.to_source(TextFormat::Html, &Delimiters::rich()), raw);
    }

    #[test]
    fn plain_text_round_trips_without_live_markup(raw in r"[a-zA-Z0-9 {}\\~=#:.]{0,30}") {
        let parsed = parse(&raw, TextFormat::Plain, &Delimiters::NONE).unwrap();
        prop_assert!(parsed.groups.is_empty());
        prop_assert_eq!(parsed.text.to_source(TextFormat::Plain, &Delimiters::NONE), raw);
    }

    #[test]
    fn single_backslash_escapes_every_brace(words in prop::collection::vec("[a-z0-9:=~ ]{0,6}", 1..6)) {
        let raw = words.join(r"\{");
        let raw = format!(r"{raw}\}}");
        let parsed = parse(&raw, TextFormat::Auto, &Delimiters::cloze()).unwrap();
        prop_assert!(parsed.groups.is_empty());
        prop_assert!(parsed.text.segments.iter().all(Segment::is_text));
        let literal = parsed.text.literal_text();
        prop_assert_eq!(literal.matches('{').count(), words.len() - 1);
        prop_assert!(!literal.contains('\\'));
    }

    #[test]
    fn double_backslash_leaves_live_group(head in "[a-z ]{0,8}", answer in "[a-z]{1,6}") {
        let raw = format!(r"{head}\\{{1:SHORTANSWER:={answer}}}");
        let parsed = parse(&raw, TextFormat::Auto, &Delimiters::cloze()).unwrap();
        prop_assert_eq!(parsed.groups.len(), 1);
        prop_assert_eq!(parsed.text.literal_text(), format!(r"{head}\"));
        prop_assert_eq!(&parsed.groups[0].opts[0].text, &answer);
    }

    #[test]
    fn escaped_choice_delimiters_stay_in_text(
        words in prop::collection::vec("[a-z]{0,6}", 1..5),
        delim in prop::sample::select(CHOICE_ESCAPES.to_vec()),
    ) {
        let raw = words.join(&format!(r"\{delim}"));
        let opts = parse_choices(&mut Cursor::new(&format!("={raw}~other"))).unwrap();
        prop_assert_eq!(opts.len(), 2);
        prop_assert_eq!(&opts[0].text, &words.join(&delim.to_string()));
        prop_assert!(opts[0].feedback.is_none());
        prop_assert_eq!(&opts[1].text, "other");
    }

    #[test]
    fn doubled_backslash_leaves_choice_delimiter_live(
        head in "[a-z]{1,6}",
        delim in prop::sample::select(vec!['~', '=', '#']),
        next in "[a-z]{1,6}",
    ) {
        let opts = parse_choices(&mut Cursor::new(&format!(r"={head}\\{delim}{next}"))).unwrap();
        prop_assert_eq!(&opts[0].text, &format!(r"{head}\"));
        if delim == '#' {
            prop_assert_eq!(opts.len(), 1);
            prop_assert_eq!(opts[0].feedback.as_ref().map(|f| f.literal_text()), Some(next));
        } else {
            prop_assert_eq!(opts.len(), 2);
            prop_assert_eq!(&opts[1].text, &next);
            prop_assert_eq!(opts[1].fraction, if delim == '=' { 100.0 } else { 0.0 });
        }
    }

    #[test]
    fn escaped_choice_text_reads_back(text in r"[a-z ~=#{}\\]{0,12}") {
        let escaped = escape(&text, CHOICE_ESCAPES, true);
        let opts = parse_choices(&mut Cursor::new(&format!("={escaped}~x"))).unwrap();
        prop_assert_eq!(opts.len(), 2);
        prop_assert_eq!(&opts[0].text, &text);
    }

    #[test]
    fn choice_fractions(n in -100i32..=100, text in "[a-z]{1,6}") {
        let full = parse_group(&format!("1:MC:={text}"), 0, 0).unwrap();
        prop_assert_eq!(full.opts[0].fraction, 100.0);

        let none = parse_group(&format!("1:MC:~{text}"), 0, 0).unwrap();
        prop_assert_eq!(none.opts[0].fraction, 0.0);

        let weighted = parse_group(&format!("1:MC:~%{n}%{text}"), 0, 0).unwrap();
        prop_assert_eq!(weighted.opts[0].fraction, f64::from(n));
        prop_assert_eq!(&weighted.opts[0].text, &text);
    }

    #[test]
    fn range_normalization(a in -1.0e6f64..1.0e6, b in -1.0e6f64..1.0e6) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        let (value, tolerance) = parse_numeric(&format!("{low}..{high}")).unwrap();
        prop_assert_eq!(value, (low + high) / 2.0);
        prop_assert_eq!(tolerance, value - low);
        prop_assert_eq!(parse_numeric(&format!("{high}..{low}")).unwrap(), (value, tolerance));

        let scale = 1.0 + low.abs().max(high.abs());
        prop_assert!(((value - tolerance) - low).abs() <= 1e-9 * scale);
        prop_assert!(((value + tolerance) - high).abs() <= 1e-9 * scale);
    }
}
