pub mod catalog;
pub mod config;
pub mod contract;
pub mod listing;
pub mod metrics;
pub mod purchase;
pub mod status;
pub mod testing;
pub mod units;
pub mod view;

pub use catalog::{load_catalog, Catalog, CatalogLoader, FetchError, ItemSequence, LoadError};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, ContractConfig,
    SanitizedConfig, ServerConfig,
};
pub use contract::{
    Address, AssetId, CallOptions, CallReceipt, ContractError, ContractHandle, ContractId,
    Forward, GatewayConfig, GatewayContractClient, Identity, Item, Metadata, ProviderHandle,
};
pub use listing::{submit_listing, ListingDraft, ListingError, ListingForm, ListingSubmitter};
pub use purchase::{
    submit_purchase, PurchaseConfig, PurchaseError, PurchaseReceipt, PurchaseSubmitter,
    PurchaseTracker,
};
pub use status::{ListingStatus, LoadStatus, PurchaseStatus, TransitionError};
pub use units::{format_units, parse_units, Units, UnitsError};
pub use view::{CatalogSnapshot, CatalogView, ItemSnapshot, ViewError};
