mod onchain;
mod simulated;
mod traits;

pub use onchain::OnchainStateReader;
pub use simulated::{SimulatedBasket, SimulatedStateReader};
pub use traits::ContractStateReader;
