//! Client-side catalog state: loads, pushed changes, and optimistic deletes.

mod optimistic;
mod publish;
mod synchronizer;
mod view;


pub use optimistic::{DeleteOutcome, MutationSignal, OptimisticMutationController, PendingDelete};
pub use publish::publish_product;
pub use synchronizer::{CatalogSynchronizer, FeedHandle};
pub use view::{CatalogStatus, CatalogView, LoadOutcome, MergeOutcome};
