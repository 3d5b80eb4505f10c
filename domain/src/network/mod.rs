//! Outbound address safety for remote agent endpoints.

pub mod address;
pub mod endpoint;

pub use address::{AddressClass, classify, is_forbidden};
pub use endpoint::{
    CheckedEndpoint, EndpointHost, EndpointRejection, check_address, check_endpoint_url,
};
