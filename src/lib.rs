pub mod bench;
pub mod cancel;
pub mod engine;
pub mod error;
pub mod hmac_md5;
pub mod ntlm;
pub mod oracle;
pub mod rc4;
pub mod report;
pub mod targets;
pub mod wordlist;

pub mod prelude {
    pub use crate::engine::{CrackHit, CrackReport, EngineConfig, Outcome, Target};
    pub use crate::error::CrackError;
    pub use crate::oracle::{MessageType, OracleResult};
}
