pub mod check;
pub mod derive;
