//! Principal: the local record of an externally authenticated identity.

use serde::{Deserialize, Serialize};

/// Created the first time an external identity completes the handshake.
/// `identifier` (the provider's screen name) is unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
  pub id:         i64,
  pub identifier: String,
}
