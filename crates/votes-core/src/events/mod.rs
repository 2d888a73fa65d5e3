//! Messages exchanged over the bus

mod delete_romances;

pub use delete_romances::DeleteRomancesMessage;
