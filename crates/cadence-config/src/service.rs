use std::fmt;

use serde::{Deserialize, Serialize};

/// Composite key naming one module of one service.
///
/// Equality is structural; used as a map key when matching services to the
/// workflows they trigger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceIdentity {
  pub service_name: String,
  pub service_module: String,
}

impl ServiceIdentity {
  pub fn new(service_name: impl Into<String>, service_module: impl Into<String>) -> Self {
    Self {
      service_name: service_name.into(),
      service_module: service_module.into(),
    }
  }
}

impl fmt::Display for ServiceIdentity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}-{}", self.service_name, self.service_module)
  }
}
