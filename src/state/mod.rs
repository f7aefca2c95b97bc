//! State management module for Easy Notes
//!
//! - `tab_state`: the tab registry behind the tab strip and notes pager

mod tab_state;

pub use tab_state::*;
