//! Domain layer: fixed-point amounts, the bonding curve, the launch
//! ledger, and the event system.
//!
//! The [`LaunchLedger`] is the single owner of launch state. Everything
//! else in this module is a value type passed in or out of it, plus the
//! [`EventBus`] used to broadcast [`LaunchEvent`]s.

pub mod amount;
pub mod curve;
pub mod event_bus;
pub mod launch;
pub mod launch_event;
pub mod launch_id;
pub mod ledger;
pub mod snapshot;
pub mod trade;

pub use amount::{AmountError, ReferenceRate, TokenAmount, UnitPrice, Valuation, ValueAmount};
pub use curve::{BondingCurve, CurveError, CurveShape};
pub use event_bus::EventBus;
pub use launch::{Launch, LaunchMetadata, LaunchView, PoolState, TradeStats};
pub use launch_event::LaunchEvent;
pub use launch_id::{InvalidLaunchId, LaunchId};
pub use ledger::{LaunchLedger, LedgerConfig};
pub use snapshot::{LedgerSnapshot, SNAPSHOT_VERSION};
pub use trade::{Quote, RateSample, Receipt, TradeSide};
