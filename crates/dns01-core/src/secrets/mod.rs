// # Secret Store Implementations
//
// Built-in SecretStore backends. The Kubernetes backend lives in the
// `dns01-secret-kube` crate.

pub mod file;
pub mod memory;

pub use file::FileSecretStore;
pub use memory::MemorySecretStore;
