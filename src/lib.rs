pub mod data {
    pub mod datasources {
        pub mod billing_client_datasource;
    }
    pub mod models {
        pub mod billing_client {
            pub mod billing_flow_params_model;
            pub mod billing_result_model;
            pub mod product_details_model;
            pub mod purchase_model;
        }
    }
    pub(crate) mod billing {
        pub(crate) mod connection_state_handler;
        pub(crate) mod periodic_purchase_status_checker;
        pub(crate) mod purchases_updated_listener;
    }
    pub(crate) mod mappers {
        pub(crate) mod iap_in_mapper;
        pub(crate) mod iap_out_mapper;
    }
    pub(crate) mod repositories {
        pub(crate) mod iap_repository_impl;
    }
}

pub mod domain {
    pub mod entities {
        pub mod iap_product;
        pub mod iap_product_details;
        pub mod iap_purchase;
        pub mod iap_purchase_result;
    }
    pub mod repositories {
        pub mod iap_repository;
    }
}

pub mod config;
pub mod errors;
pub mod util;

pub use config::IapConfig;
pub use data::billing::{
    connection_state_handler::{BillingClientStateListener, ConnectionState},
    purchases_updated_listener::{PurchasesUpdate, PurchasesUpdatedListener},
};
pub use data::repositories::iap_repository_impl::IapRepositoryImpl;
pub use errors::{IapConfigError, IapError};
pub use util::IapUtil;
