//! `section NAME` ... `endsection`: a named region rendered once.
//!
//! The body is emitted as is. Inside it `section` holds the name, and
//! listeners see the block open and close, so a host can attribute output
//! to the section it came from.

use mortar_core::{
    application::ports::{ArgumentError, BlockHandler, Opening, StartContext},
    domain::{Value, unquote},
};

#[derive(Debug, Default, Clone, Copy)]
pub struct SectionBlock;

impl BlockHandler for SectionBlock {
    fn names(&self) -> &[&str] {
        &["section"]
    }

    fn closing_names(&self, name: &str) -> &[&str] {
        match name {
            "section" => &["endsection"],
            _ => &[],
        }
    }

    fn start(&self, ctx: &StartContext<'_, '_>) -> Result<Opening, ArgumentError> {
        let [name] = ctx.args else {
            return Err(ArgumentError::new("expected 'section NAME'"));
        };
        let name = unquote(name).unwrap_or(name.as_str());
        Ok(Opening::new().bind("section", Value::from(name)))
    }

    fn describe(&self) -> &str {
        "mark a named region; the body renders once with 'section' bound to the name"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mortar_core::domain::{Frame, Scope, Span};

    fn open(args: &[&str]) -> Result<Opening, ArgumentError> {
        let persistent = Frame::new();
        let scope = Scope::new(&persistent, Frame::new());
        let args: Vec<String> = args.iter().map(|a| (*a).to_owned()).collect();
        let ctx = StartContext {
            name: "section",
            args: &args,
            span: Span::new(0, 0),
            scope: &scope,
            previous: None,
        };
        SectionBlock.start(&ctx)
    }

    #[test]
    fn binds_the_section_name() {
        let opening = open(&["intro"]).unwrap();
        assert!(opening.output_enabled);
        assert_eq!(opening.frame.get("section"), Some(&Value::from("intro")));

        let quoted = open(&["\"the end\""]).unwrap();
        assert_eq!(quoted.frame.get("section"), Some(&Value::from("the end")));
    }

    #[test]
    fn needs_exactly_one_name() {
        assert!(open(&[]).is_err());
        assert!(open(&["a", "b"]).is_err());
    }
}
