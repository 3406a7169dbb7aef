pub mod branches;
pub mod common;
pub mod enums;
pub mod pagination;
pub mod schools;
pub mod users;

pub use branches::Branch;
pub use common::Choice;
pub use schools::School;
pub use users::UserSummary;
