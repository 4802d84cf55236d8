//! Service resource implementations

#[cfg(feature = "codearts-deploy")]
pub mod codearts_deploy;
#[cfg(feature = "dns")]
pub mod dns;
