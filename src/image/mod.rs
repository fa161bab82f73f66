//! Image reference handling
//!
//! The target runtime wants fully qualified references, while Docker users
//! write `nginx` or `myuser/app`. [`ImageResolver`] fills in the registry,
//! namespace and tag the way Docker Hub would.

pub mod resolver;

pub use resolver::ImageResolver;
