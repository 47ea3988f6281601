pub mod intent;
pub mod slots;
pub mod taxonomy;
pub mod weather;
