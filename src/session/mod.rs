pub mod seen;
pub mod store;
pub mod sweeper;

pub use seen::SeenSet;
pub use store::SessionStore;
pub use sweeper::sweep_loop;
