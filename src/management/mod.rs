mod auth;
mod poller;
mod store;

pub use auth::AuthManager;
pub use poller::DEFAULT_POLL_INTERVAL;
pub use poller::NowPlayingPoller;
pub use store::AuthorizationStore;
pub use store::FileAuthorizationStore;
pub use store::MemoryAuthorizationStore;
