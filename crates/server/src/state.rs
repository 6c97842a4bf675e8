use std::sync::Arc;

use marketplace_core::{
    CatalogLoader, CatalogView, Config, ContractHandle, ListingSubmitter, ProviderHandle,
    PurchaseSubmitter, SanitizedConfig, Units,
};

/// Shared application state
pub struct AppState {
    config: Config,
    contract: Arc<dyn ContractHandle>,
    provider: Arc<dyn ProviderHandle>,
    view: CatalogView,
    listings: ListingSubmitter,
}

impl AppState {
    pub fn new(
        config: Config,
        contract: Arc<dyn ContractHandle>,
        provider: Arc<dyn ProviderHandle>,
    ) -> Self {
        let view = CatalogView::new(
            CatalogLoader::new(config.units),
            PurchaseSubmitter::new(config.purchase.clone()),
        );
        Self {
            config,
            contract,
            provider,
            view,
            listings: ListingSubmitter::new(),
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn units(&self) -> &Units {
        &self.config.units
    }

    pub fn contract(&self) -> &dyn ContractHandle {
        self.contract.as_ref()
    }

    pub fn provider(&self) -> &dyn ProviderHandle {
        self.provider.as_ref()
    }

    pub fn view(&self) -> &CatalogView {
        &self.view
    }

    pub fn listings(&self) -> &ListingSubmitter {
        &self.listings
    }
}
