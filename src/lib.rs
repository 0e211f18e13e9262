pub mod activation;
pub mod config;
pub mod coordinator;
pub mod git;
pub mod host;
pub mod inclusion;
pub mod item;
pub mod listeners;
pub mod navigation;
pub mod state;
pub mod toolbar;
pub mod tree;

pub use coordinator::{CommitAuthorListener, CommitReviewCoordinator};
pub use inclusion::{InclusionListener, InclusionModel};
pub use item::{Item, ItemKind};
