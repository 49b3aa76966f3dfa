pub mod duration;
pub mod immunization;
