//! `comment` ... `endcomment`: the body is never emitted.

use mortar_core::application::ports::{ArgumentError, BlockHandler, Opening, StartContext};

#[derive(Debug, Default, Clone, Copy)]
pub struct CommentBlock;

impl BlockHandler for CommentBlock {
    fn names(&self) -> &[&str] {
        &["comment"]
    }

    fn closing_names(&self, name: &str) -> &[&str] {
        match name {
            "comment" => &["endcomment"],
            _ => &[],
        }
    }

    fn start(&self, _ctx: &StartContext<'_, '_>) -> Result<Opening, ArgumentError> {
        Ok(Opening::new().output_if(false))
    }

    fn describe(&self) -> &str {
        "suppress everything up to endcomment"
    }
}
