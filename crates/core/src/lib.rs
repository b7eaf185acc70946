pub mod config;
pub mod config_loader;
pub mod events;
pub mod offer;
pub mod price;
pub mod trade;
pub mod traits;

pub use config::{
    AccountSettings, BackendSettings, OracleSettings, PluginConfig, TrackingSettings,
};
pub use config_loader::ConfigLoader;
pub use events::OfferEvent;
pub use offer::{OfferKind, OfferSnapshot};
pub use price::LatestPrice;
pub use trade::{ActiveTrade, NextAction, Recommendation, TradeStatus};
pub use traits::{BackendApi, DecisionPrompt, PriceOracle};
