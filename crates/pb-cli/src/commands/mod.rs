//! CLI command implementations.

pub mod event;
pub mod group;
pub mod import;
pub mod player;
pub mod ratings;
pub mod score;

pub use event::{run_create_event, run_generate, run_show_event};
pub use group::run_create_group;
pub use import::run_import;
pub use player::run_add_player;
pub use ratings::{run_rankings, run_recompute};
pub use score::{run_complete, run_score};
