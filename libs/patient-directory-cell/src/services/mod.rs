pub mod csv_export;
pub mod directory;
pub mod export;
pub mod filter;
pub mod pdf_export;
pub mod store;
pub mod vitals;

pub use csv_export::*;
pub use directory::*;
pub use export::*;
pub use filter::*;
pub use pdf_export::*;
pub use store::*;
pub use vitals::*;
