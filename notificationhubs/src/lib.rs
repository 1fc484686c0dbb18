#![allow(clippy::result_large_err)]
//! # notification-hubs
//!
//! Registration client for push notification hubs.
//!
//! A hub keeps one registration per device and platform: an APNs device token, an FCM v1
//! registration id, a WNS or MPNS channel, an ADM registration id. This crate creates, reads,
//! lists and deletes those registrations, and turns each one into a [`RegisteredDevice`](http::registrations::RegisteredDevice)
//! whatever platform it was made for.
//!
//! ## Quick Start
//!
//! ```
//! use notification_hubs::client::{Client, ClientConfig};
//! use notification_hubs::format::NotificationFormat;
//! use notification_hubs::http::registrations::Registration;
//!
//! async fn run() {
//!     let config = ClientConfig::default().with_env();
//!     let client = Client::new(config).unwrap();
//!
//!     let registration = Registration::new("fcmv1-device-123", NotificationFormat::FcmV1).with_tags("user:42,beta");
//!     let result = client.register(&registration).await.unwrap();
//!     let device = result.registered_device().unwrap();
//!
//!     client.unregister(device).await.unwrap();
//! }
//! ```
//!
//! ### Errors
//!
//! Failed responses are classified into a [`NotificationHubError`](http::error::NotificationHubError)
//! whose [`ErrorCode`](http::error::ErrorCode) tells whether the request may be retried and whether the
//! credentials have to be renewed first.
//!
//! ```
//! use notification_hubs::client::Client;
//! use notification_hubs::http::registrations::get::GetRegistrationRequest;
//! use notification_hubs::http::error::ErrorCode;
//!
//! async fn run(client: Client) {
//!     let req = GetRegistrationRequest { registration_id: "8247220326459738692-7748251457295609952-3".to_string() };
//!     match client.registration(&req).await {
//!         Ok(result) => println!("{:?}", result.registered_device()),
//!         Err(e) if e.code() == Some(ErrorCode::RegistrationNotFound) => println!("gone"),
//!         Err(e) if e.is_retryable() => println!("try again later: {e}"),
//!         Err(e) => println!("{e}"),
//!     }
//! }
//! ```
pub mod api_version;
pub mod client;
pub mod connection;
pub mod format;
pub mod http;
