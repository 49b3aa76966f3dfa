pub mod fixed_income;
pub mod time_value;
