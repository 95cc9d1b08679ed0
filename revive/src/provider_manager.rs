use revive_providers::gce::GceConnector;
#[cfg(feature = "provider-mock")]
use revive_providers::mock::MockConnector;
use revive_providers::Connector;

use crate::settings::Settings;

pub struct ProviderManager;

impl ProviderManager {
    pub fn get_connector(settings: &Settings) -> Option<Box<dyn Connector>> {
        match settings.provider.as_str() {
            "gce" => Some(Box::new(GceConnector::new(settings.gce.clone()))),
            #[cfg(feature = "provider-mock")]
            "mock" => Some(Box::new(MockConnector::with_status(
                settings.mock_instance_status.clone(),
            ))),
            _ => None,
        }
    }
}
