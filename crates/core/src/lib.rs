pub mod config;
pub mod domain;
pub mod errors;
pub mod refund;

pub use domain::payment::PaymentMethod;
pub use domain::reservation::{ClassCode, Passenger, PnrNumber, ReservationSnapshot, TrainDetails};
pub use domain::scenario::{CancellationScenario, Checkpoint, RefundReport};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use refund::advisory::{advise, Advice, AdvisoryEngine, DeterministicAdvisoryEngine};
pub use refund::catalog::{charges, total_payable, PaymentMethodCatalog};
pub use refund::fare_rules::{flat_rate, FareRuleTable};
pub use refund::scenarios::{
    compute_scenarios, refresh_timeline, sort_for_display, DeterministicScenarioCalculator,
    ScenarioCalculator,
};
pub use refund::{recompute, RefundRuntime};
