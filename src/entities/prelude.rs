pub use super::habit_logs::Entity as HabitLogs;
pub use super::habits::Entity as Habits;
pub use super::users::Entity as Users;
