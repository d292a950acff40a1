//! Template resolution, customization, selection, and public profiles.

mod customizer;
mod public;
mod resolver;
mod selection;
mod single_flight;

pub use customizer::{CustomizerMode, CustomizerRegistry, OfficerInfo};
pub use public::PublicProfileService;
pub use resolver::TemplateService;
pub use selection::{DEFAULT_SELECTION, SelectionService};
pub use single_flight::{DEFAULT_WAIT_CAP, FlightError, SingleFlight};
