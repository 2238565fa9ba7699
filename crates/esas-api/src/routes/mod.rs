pub mod accounts;
pub mod education;
pub mod guest_link;
pub mod health;
pub mod patients;
pub mod providers;
pub mod recommendations;
pub mod reports;
pub mod screenings;
pub mod symptoms;
