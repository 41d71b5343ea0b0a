pub mod get_entry;
pub mod index_info;
pub mod lookup;

pub use get_entry::*;
pub use index_info::*;
pub use lookup::*;
