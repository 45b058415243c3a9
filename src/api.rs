pub mod solis;

pub use self::solis::Api as Solis;
