mod pipeline;
pub use pipeline::*;

mod signer;
pub use signer::*;
