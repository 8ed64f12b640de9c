//! Standard block handlers.
//!
//! | Marker                                   | Kind   |
//! |------------------------------------------|--------|
//! | `for` ... `endfor`                       | block  |
//! | `if` ... `elif` ... `else` ... `endif`   | block  |
//! | `comment` ... `endcomment`               | block  |
//! | `section` ... `endsection`               | block  |
//! | `set`, `now`, `cycle`                    | inline |

use std::sync::Arc;

use mortar_core::application::ports::BlockHandler;

mod comment;
mod conditional;
mod for_loop;
mod inline;
mod section;

pub use comment::CommentBlock;
pub use conditional::{IfBlock, evaluate};
pub use for_loop::{ForBlock, MAX_RANGE_LEN};
pub use inline::{CycleMarker, DEFAULT_NOW_FORMAT, NowMarker, SetMarker};
pub use section::SectionBlock;

pub(crate) use inline::format_time;

/// Every standard block handler, ready for `EngineBuilder::blocks`.
pub fn standard_blocks() -> Vec<Arc<dyn BlockHandler>> {
    vec![
        Arc::new(ForBlock),
        Arc::new(IfBlock),
        Arc::new(CommentBlock),
        Arc::new(SectionBlock),
        Arc::new(SetMarker),
        Arc::new(NowMarker::new()),
        Arc::new(CycleMarker),
    ]
}
