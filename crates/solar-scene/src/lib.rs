//! The simulated solar system: orbiting bodies, the shared simulation
//! controls, the standard catalogue of bodies, and the spacecraft.

mod body;
mod catalog;
mod ship;
mod simulation;

pub use body::{BodyRole, BodyTransform, OrbitingBody, RingInfo, TextureSlot};
pub use catalog::SolarSystem;
pub use ship::{SHIP_COLOR, Ship};
pub use simulation::{SimulationLimits, SimulationState};
