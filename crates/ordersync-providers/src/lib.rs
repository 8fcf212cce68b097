//! # OrderSync Providers
//! Order sources the pipeline can paginate through.

pub mod magento;

pub use magento::MagentoClient;
