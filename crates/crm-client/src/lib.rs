//! CRM (Bitrix24) integration.
//!
//! - OAuth token exchange and refresh with an explicit token store ([`token`])
//! - The RPA item field codes and write-back payload ([`fields`])
//! - Write-back over an incoming webhook or OAuth bearer calls ([`client`])

pub mod client;
pub mod fields;
pub mod token;

pub use client::{CrmClient, WriteBack};
pub use fields::WriteBackPayload;
pub use token::{OAuthClient, OAuthConfig, TokenPair, TokenStore};
