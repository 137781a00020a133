//! Persona system: the simulated participants of a discussion.
//!
//! Personas are read-only identity records (role, tone, energy, empathy,
//! expertise). The catalog validates them at load time so the engine never
//! has to deal with unknown roles or out-of-range traits.

pub mod catalog;
pub mod registry;
pub mod types;

pub use catalog::PersonaCatalog;
pub use registry::{list_roles, RoleListing};
pub use types::{EnergyLevel, Persona, PersonaRole, Tone};
