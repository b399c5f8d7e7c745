pub mod proof;
pub mod protected;
pub mod standby;
pub mod types;

pub use proof::{CredentialSource, PasscodeGate, RequestCookies, has_proof, proof_cookie};
pub use protected::{ChannelPolicy, ProtectedChannels};
pub use standby::{StorageRoot, standby_url_for};
pub use types::{Channel, ChannelKey, NewsItem, Program};
