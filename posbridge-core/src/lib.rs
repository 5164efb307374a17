pub mod credentials;
pub mod pos;
pub mod signature;
pub mod status;
pub mod wire;

pub use credentials::{CredentialOverride, Credentials};
pub use pos::{PosError, PosGateway, PosResult};
pub use signature::{SignatureError, WebhookVerifier};
pub use status::VendorStatus;
