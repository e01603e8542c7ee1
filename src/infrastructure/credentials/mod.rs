mod cloud_credential;

pub use cloud_credential::{CloudCredential, CredentialError, bootstrap_cloud_credential};
