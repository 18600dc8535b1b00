pub mod catalog;
pub mod profile;
pub mod settings;
pub mod timing;

pub use catalog::*;
pub use profile::*;
pub use settings::*;
pub use timing::*;
