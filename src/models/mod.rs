pub mod customer;
pub mod driver;
pub mod location;
pub mod meal;
pub mod order;
pub mod restaurant;
