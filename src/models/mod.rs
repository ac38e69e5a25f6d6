mod error;
pub use error::*;

mod signature_status;
pub use signature_status::*;

mod nft;
pub use nft::*;
