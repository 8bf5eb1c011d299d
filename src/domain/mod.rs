pub mod agent;
pub mod api_log;
pub mod conversation;
pub mod intent;
pub mod state;
pub mod transaction;
pub mod wallet;

pub use agent::*;
pub use api_log::*;
pub use conversation::*;
pub use intent::*;
pub use state::*;
pub use transaction::*;
pub use wallet::*;
