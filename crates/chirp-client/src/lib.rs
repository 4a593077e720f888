//! Client-side application state for the Chirp API: a typed HTTP client,
//! persistent session handling, the feed screen, and the wallet login flow.

pub mod feed;
pub mod http;
pub mod session;
pub mod storage;
pub mod wallet;

pub use feed::{FeedScreen, FeedState};
pub use http::{ApiClient, ClientError};
pub use session::{AuthPhase, Session};
pub use storage::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use wallet::{Detection, WalletConnection, WalletError, WalletProvider, WalletState};
