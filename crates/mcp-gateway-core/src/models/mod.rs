// ABOUTME: Core data models shared by the authorization server and the transport gateway
// ABOUTME: Re-exports OAuth 2.1 records and the tool descriptor
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Data Models
//!
//! - `OAuth2Client`, `AuthorizationCode`, `AccessToken`, `RefreshToken`: records
//!   persisted behind the authorization server's repository traits
//! - `GrantType`, `CodeChallengeMethod`: closed protocol enums
//! - `ToolDescriptor`: read-only tool metadata

mod oauth2_server;
mod tool;

pub use oauth2_server::{
    AccessToken, AuthorizationCode, CodeChallengeMethod, GrantType, OAuth2Client, RefreshToken,
};
pub use tool::ToolDescriptor;
