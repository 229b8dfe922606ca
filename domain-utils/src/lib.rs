mod bid;
mod domain;
mod error;
mod profile;
mod utility;

pub use bid::{Bid, Value};
pub use domain::{AllBids, Domain};
pub use error::Error;
pub use profile::Profile;
pub use utility::LinearAdditiveUtility;
